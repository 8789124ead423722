// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![warn(clippy::all)]
//! Statement grammar tests: scripts, declarations, DML, and DDL.

use matches::assert_matches;
use pretty_assertions::assert_eq;

use squill::ast::*;
use squill::parser::{parse_statement, parse_statements};
use squill::test_utils::*;
use squill::token::Token;

#[test]
fn parse_empty_scripts() {
    assert_eq!(parse_statements("").unwrap(), vec![]);
    assert_eq!(parse_statements("   \n\t").unwrap(), vec![]);
    assert_eq!(parse_statements(";;;").unwrap(), vec![]);
}

#[test]
fn parse_script() {
    let stmts = parse_statements(
        "set odps.sql.submit.mode=script;\n\
         @start_date := '2024-01-01';\n\
         SELECT * FROM tbl WHERE dt >= @start_date;",
    )
    .unwrap();
    assert_eq!(stmts.len(), 3);
    assert_matches!(stmts[0], Statement::Set(_));
    assert_matches!(stmts[1], Statement::Declaration(_));
    assert_matches!(stmts[2], Statement::Select(_));
}

#[test]
fn parse_set_statement() {
    let Statement::Set(set) = parse_statement("set odps.sql.submit.mode=script;").unwrap()
    else {
        panic!("expected set statement");
    };
    assert_eq!(set.key, "odps.sql.submit.mode");
    assert_eq!(set.value, "script");
    assert_eq!(set.to_string(), "SET odps.sql.submit.mode=script");

    let Statement::Set(set) =
        parse_statement("set odps.sql.groupby.orderby.position.alias=true;").unwrap()
    else {
        panic!("expected set statement");
    };
    assert_eq!(set.key, "odps.sql.groupby.orderby.position.alias");
    assert_eq!(set.value, "true");

    verified_stmt("SET odps.sql.submit.mode=script");
}

#[test]
fn parse_declaration_with_type() {
    let Statement::Declaration(decl) = parse_statement("@start_date Date;").unwrap() else {
        panic!("expected declaration");
    };
    assert_eq!(decl.name.name, "@start_date");
    assert_eq!(decl.name.token, Token::Bind);
    assert!(decl.value.is_none());
    assert_matches!(decl.type_expr, Some(Expr::MultiPart(_)));
    assert_eq!(decl.to_string(), "@start_date Date");
}

#[test]
fn parse_declaration_with_value() {
    let Statement::Declaration(decl) =
        parse_statement("@start_date := '{{ .DSTART | Date }}';").unwrap()
    else {
        panic!("expected declaration");
    };
    assert!(decl.type_expr.is_none());
    assert_matches!(decl.value, Some(Expr::String(_)));
    assert_eq!(decl.to_string(), "@start_date := '{{ .DSTART | Date }}'");
}

#[test]
fn parse_declaration_with_type_and_value() {
    let Statement::Declaration(decl) = parse_statement("@count := INT64 5;").unwrap() else {
        panic!("expected declaration");
    };
    assert_matches!(decl.type_expr, Some(Expr::MultiPart(_)));
    assert_matches!(decl.value, Some(Expr::Number(_)));
    assert_eq!(decl.to_string(), "@count := INT64 5");
}

#[test]
fn parse_declaration_with_subquery() {
    // The first token after := is SELECT, so the value is a sub-select.
    let Statement::Declaration(decl) =
        parse_statement("@tmp := SELECT data_date, shop_id FROM shop;").unwrap()
    else {
        panic!("expected declaration");
    };
    assert!(decl.type_expr.is_none());
    assert_matches!(decl.value, Some(Expr::Select(_)));
    assert_eq!(decl.to_string(), "@tmp := SELECT data_date, shop_id FROM shop");
}

#[test]
fn parse_declaration_with_intervals() {
    let Statement::Declaration(decl) =
        parse_statement("@end_ts := TIMESTAMP(@end_date) + INTERVAL 17 HOUR - INTERVAL 1 SECOND;")
            .unwrap()
    else {
        panic!("expected declaration");
    };
    assert_eq!(
        decl.value.as_ref().unwrap().to_string(),
        "TIMESTAMP(@end_date) + INTERVAL 17 HOUR - INTERVAL 1 SECOND"
    );
}

#[test]
fn parse_insert() {
    verified_stmt("INSERT INTO tbl (x, y) VALUES (1, 2)");
    verified_stmt("INSERT INTO tbl VALUES (1, 2), (3, 4)");
    verified_stmt("INSERT INTO tbl AS t (x) VALUES (1)");
    verified_stmt("INSERT INTO tbl (x) SELECT y FROM other");
    verified_stmt("INSERT INTO tbl DEFAULT VALUES");
    verified_stmt("INSERT OVERWRITE TABLE tbl (a) SELECT a FROM b");
    verified_stmt("REPLACE INTO tbl (x) VALUES (1)");
    verified_stmt("WITH cte AS (SELECT 1) INSERT INTO tbl SELECT * FROM cte");
    verified_stmt("INSERT INTO tbl (x) VALUES (1) RETURNING x, y");

    let Statement::Insert(stmt) =
        parse_statement("INSERT OVERWRITE TABLE proj.tbl SELECT 1").unwrap()
    else {
        panic!("expected insert");
    };
    assert!(stmt.overwrite.is_some());
    assert!(stmt.into.is_none());
    assert!(stmt.table_kw.is_some());
    assert_eq!(stmt.table.to_string(), "proj.tbl");
}

#[test]
fn parse_insert_upsert() {
    stmt_parses_to(
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (y) WHERE true DO UPDATE SET foo = 1, (bar, baz) = 2 WHERE false",
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (y) WHERE TRUE DO UPDATE SET foo = 1, (bar, baz) = 2 WHERE FALSE",
    );
    verified_stmt("INSERT INTO tbl (x) VALUES (1) ON CONFLICT DO NOTHING");

    let Statement::Insert(stmt) = parse_statement(
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (y) DO UPDATE SET foo = 1",
    )
    .unwrap() else {
        panic!("expected insert");
    };
    let upsert = stmt.upsert.unwrap();
    assert_eq!(upsert.columns.len(), 1);
    assert!(upsert.do_update.is_some());
    assert_eq!(upsert.assignments.len(), 1);
}

#[test]
fn parse_insert_errors() {
    stmt_err("INSERT", "1:6: expected INTO or OVERWRITE, found 'EOF'");
    stmt_err("INSERT INTO", "1:11: expected table name, found 'EOF'");
    stmt_err("INSERT INTO tbl AS", "1:18: expected alias, found 'EOF'");
    stmt_err(
        "INSERT INTO tbl ",
        "1:16: expected VALUES, SELECT, or DEFAULT VALUES, found 'EOF'",
    );
    stmt_err("INSERT INTO tbl (", "1:17: expected column name, found 'EOF'");
    stmt_err("INSERT INTO tbl (x", "1:18: expected comma or right paren, found 'EOF'");
    stmt_err("INSERT INTO tbl (x) VALUES", "1:26: expected left paren, found 'EOF'");
    stmt_err("INSERT INTO tbl (x) VALUES (", "1:28: expected expression, found 'EOF'");
    stmt_err(
        "INSERT INTO tbl (x) VALUES (1",
        "1:29: expected comma or right paren, found 'EOF'",
    );
    stmt_err("INSERT INTO tbl (x) VALUES (1) ON", "1:33: expected CONFLICT, found 'EOF'");
    stmt_err(
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (x)",
        "1:46: expected DO, found 'EOF'",
    );
    stmt_err(
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (x) DO",
        "1:49: expected NOTHING or UPDATE SET, found 'EOF'",
    );
    stmt_err(
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (x) DO UPDATE",
        "1:56: expected SET, found 'EOF'",
    );
    stmt_err(
        "INSERT INTO tbl (x) VALUES (1) ON CONFLICT (x) DO UPDATE SET foo",
        "1:64: expected =, found 'EOF'",
    );
}

#[test]
fn parse_delete() {
    verified_stmt("DELETE FROM tbl");
    verified_stmt("DELETE FROM tbl WHERE x = 1");
    verified_stmt("DELETE FROM tbl WHERE x = 1 RETURNING x");
    verified_stmt("DELETE FROM tbl ORDER BY x, y LIMIT 1 OFFSET 2");
    verified_stmt("DELETE FROM tbl LIMIT 1");
    stmt_parses_to("DELETE FROM tbl LIMIT 1, 2", "DELETE FROM tbl LIMIT 1 OFFSET 2");
    verified_stmt("WITH cte AS (SELECT y) DELETE FROM tbl");
    verified_stmt("DELETE FROM tbl1 WHERE id IN (SELECT tbl1_id FROM tbl2 WHERE foo = 'bar')");

    stmt_err("DELETE", "1:6: expected FROM, found 'EOF'");
    stmt_err("DELETE FROM", "1:11: expected table name, found 'EOF'");
    stmt_err("DELETE FROM tbl WHERE", "1:21: expected expression, found 'EOF'");
    stmt_err("DELETE FROM tbl ORDER ", "1:22: expected BY, found 'EOF'");
    stmt_err("DELETE FROM tbl ORDER BY x", "1:26: expected LIMIT, found 'EOF'");
    stmt_err("DELETE FROM tbl LIMIT 1,", "1:24: expected expression, found 'EOF'");
}

#[test]
fn parse_merge() {
    let sql = "MERGE INTO tbl1 AS target_table USING source_tbl AS src ON target_table.id = src.id \
               WHEN MATCHED THEN UPDATE SET target_table.place = src.place \
               WHEN NOT MATCHED THEN INSERT (id, place) VALUES (src.id, src.place)";
    verified_stmt(sql);

    let Statement::Merge(stmt) = parse_statement(sql).unwrap() else {
        panic!("expected merge");
    };
    assert_matches!(stmt.target, Source::Table(_));
    assert_matches!(stmt.on_expr, Expr::Binary(_));
    assert_eq!(stmt.matched.len(), 2);

    let update_arm = &stmt.matched[0];
    assert!(update_arm.not.is_none());
    assert!(update_arm.update.is_some());
    assert_eq!(update_arm.assignments.len(), 1);

    let insert_arm = &stmt.matched[1];
    assert!(insert_arm.not.is_some());
    assert!(insert_arm.insert.is_some());
    assert_eq!(insert_arm.col_list.as_ref().unwrap().exprs.len(), 2);
    assert_eq!(insert_arm.value_list.as_ref().unwrap().exprs.len(), 2);
}

#[test]
fn parse_merge_conditional_arms() {
    verified_stmt(
        "MERGE INTO t USING s ON t.k = s.k \
         WHEN MATCHED AND s.op = 'D' THEN DELETE \
         WHEN MATCHED THEN UPDATE SET t.v = s.v \
         WHEN NOT MATCHED THEN INSERT (k, v) VALUES (s.k, s.v)",
    );

    stmt_err("MERGE", "1:5: expected INTO, found 'EOF'");
    stmt_err("MERGE INTO t", "1:12: expected USING, found 'EOF'");
    stmt_err("MERGE INTO t USING s", "1:20: expected ON, found 'EOF'");
    stmt_err(
        "MERGE INTO t USING s ON t.k = s.k WHEN",
        "1:38: expected MATCHED, found 'EOF'",
    );
    stmt_err(
        "MERGE INTO t USING s ON t.k = s.k WHEN MATCHED THEN",
        "1:51: expected UPDATE, DELETE, or INSERT, found 'EOF'",
    );
}

#[test]
fn parse_create_table() {
    verified_stmt("CREATE TABLE tbl (col1 TEXT, col2 DECIMAL(10,5))");
    verified_stmt("CREATE TABLE tbl (col1, col2)");
    verified_stmt("CREATE TABLE tbl (key)");
    verified_stmt("CREATE TABLE IF NOT EXISTS tbl (col1 TEXT)");
    verified_stmt("CREATE TABLE t (c1 CHARACTER VARYING, c2 UUID, c3 TIMESTAMP)");
    verified_stmt("CREATE TABLE t (c1 NULL)");
    verified_stmt("CREATE TABLE proj.sch.tbl (c INT64)");
    verified_stmt("CREATE TABLE tbl AS SELECT foo");
    verified_stmt("CREATE TABLE tbl AS WITH cte (x) AS (SELECT y) SELECT foo");

    let Statement::CreateTable(stmt) =
        parse_statement("CREATE TABLE tbl (col1 TEXT, col2 DECIMAL(10,5))").unwrap()
    else {
        panic!("expected create table");
    };
    assert_eq!(stmt.columns.len(), 2);
    let ty = stmt.columns[1].ty.as_ref().unwrap();
    assert_eq!(ty.precision.as_ref().unwrap().value, "10");
    assert_eq!(ty.scale.as_ref().unwrap().value, "5");
}

#[test]
fn parse_create_table_with_comments() {
    let Statement::CreateTable(stmt) =
        parse_statement("CREATE TABLE tbl ( -- comment\n\tcol1 TEXT, -- comment\n\t  col2 TEXT)")
            .unwrap()
    else {
        panic!("expected create table");
    };
    assert_eq!(stmt.columns.len(), 2);
    assert_eq!(stmt.columns[1].name.pos.line, 3);

    let Statement::CreateTable(stmt) =
        parse_statement("CREATE TABLE tbl\n\t/* test one\ntwo */ (col1 TEXT)").unwrap()
    else {
        panic!("expected create table");
    };
    assert_eq!(stmt.columns.len(), 1);
}

#[test]
fn parse_create_table_errors() {
    stmt_err("CREATE TABLE", "1:12: expected table name, found 'EOF'");
    stmt_err("CREATE TABLE tbl ", "1:17: expected AS or left paren, found 'EOF'");
    stmt_err(
        "CREATE TABLE tbl (",
        "1:18: expected column name, CONSTRAINT, or right paren, found 'EOF'",
    );
    stmt_err(
        "CREATE TABLE tbl (col1 TEXT",
        "1:27: expected column name, CONSTRAINT, or right paren, found 'EOF'",
    );
    stmt_err(
        "CREATE TABLE tbl (col1",
        "1:22: expected column name, CONSTRAINT, or right paren, found 'EOF'",
    );
    stmt_err("CREATE TABLE IF", "1:15: expected NOT, found 'EOF'");
    stmt_err("CREATE TABLE IF NOT", "1:19: expected EXISTS, found 'EOF'");
    stmt_err("CREATE TABLE tbl (col1 DECIMAL(", "1:31: expected precision, found 'EOF'");
    stmt_err("CREATE TABLE tbl (col1 DECIMAL(-12,", "1:35: expected scale, found 'EOF'");
    stmt_err(
        "CREATE TABLE tbl (col1 DECIMAL(1,2",
        "1:34: expected right paren, found 'EOF'",
    );
    stmt_err("CREATE TABLE tbl AS", "1:19: expected SELECT or VALUES, found 'EOF'");
    stmt_err("CREATE TABLE tbl AS WITH", "1:24: expected table name, found 'EOF'");
}

#[test]
fn parse_drop_table() {
    verified_stmt("DROP TABLE vw");
    verified_stmt("DROP TABLE IF EXISTS vw");
    verified_stmt("DROP TABLE proj.sch.tbl");

    let Statement::DropTable(stmt) = parse_statement("DROP TABLE proj.sch.tbl").unwrap()
    else {
        panic!("expected drop table");
    };
    assert_eq!(stmt.name.to_string(), "proj.sch.tbl");

    stmt_err("DROP TABLE", "1:10: expected table name, found 'EOF'");
    stmt_err("DROP TABLE IF", "1:13: expected EXISTS, found 'EOF'");
    stmt_err("DROP TABLE IF EXISTS", "1:20: expected table name, found 'EOF'");
}

#[test]
fn parse_truncate() {
    verified_stmt("TRUNCATE TABLE tbl");
    verified_stmt("TRUNCATE TABLE proj.sch.tbl");

    stmt_err("TRUNCATE", "1:8: expected TABLE, found 'EOF'");
    stmt_err("TRUNCATE TABLE", "1:14: expected table name, found 'EOF'");
}

#[test]
fn parse_function() {
    let sql = "FUNCTION add_one(a INT64) RETURNS r INT64 AS BEGIN a + 1 END";
    verified_stmt(sql);

    let Statement::Function(stmt) = parse_statement(sql).unwrap() else {
        panic!("expected function");
    };
    assert_eq!(stmt.name.last_name(), "add_one");
    assert_eq!(stmt.params.len(), 1);
    assert_eq!(stmt.return_param.name.name, "r");
    assert_matches!(stmt.fn_expr, Expr::Binary(_));

    verified_stmt("FUNCTION f() RETURNS r BOOLEAN AS BEGIN TRUE END");

    stmt_err("FUNCTION f()", "1:12: expected RETURNS, found 'EOF'");
    stmt_err("FUNCTION f() RETURNS r", "1:22: expected AS, found 'EOF'");
    stmt_err("FUNCTION f() RETURNS r AS", "1:25: expected BEGIN, found 'EOF'");
    stmt_err("FUNCTION f() RETURNS r AS BEGIN 1", "1:33: expected END, found 'EOF'");
}

#[test]
fn parse_multi_statement_script() {
    let stmts = parse_statements(
        "@max_updated := SELECT MAX(updated_at) FROM target;\n\
         MERGE INTO target AS t USING staging AS s ON t.id = s.id \
         WHEN MATCHED THEN UPDATE SET t.v = s.v \
         WHEN NOT MATCHED THEN INSERT (id, v) VALUES (s.id, s.v);\n\
         DROP TABLE IF EXISTS staging;",
    )
    .unwrap();
    assert_eq!(stmts.len(), 3);
    assert_matches!(stmts[0], Statement::Declaration(_));
    assert_matches!(stmts[1], Statement::Merge(_));
    assert_matches!(stmts[2], Statement::DropTable(_));
}

#[test]
fn parse_statement_requires_terminator() {
    assert!(parse_statement("SELECT 1").is_ok());
    assert!(parse_statement("SELECT 1;").is_ok());
    assert!(parse_statement(";SELECT 1;").is_ok());
    stmt_err("SELECT 1; SELECT 2", "1:11: expected semicolon or EOF, found 'SELECT'");
}
