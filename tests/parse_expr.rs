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
//! Expression grammar tests: literals, the operator table, multi-word
//! operator fusion, and qualified identifiers.

use matches::assert_matches;
use pretty_assertions::assert_eq;

use squill::ast::*;
use squill::parser::parse_expression;
use squill::test_utils::*;
use squill::token::Token;

#[test]
fn parse_literals() {
    assert_matches!(verified_expr("123"), Expr::Number(_));
    assert_matches!(verified_expr("123.456"), Expr::Number(_));
    assert_matches!(verified_expr(".1E-2"), Expr::Number(_));
    assert_matches!(verified_expr("0xFF"), Expr::Number(_));
    assert_matches!(verified_expr("'foo bar'"), Expr::String(_));
    assert_matches!(verified_expr("x'0123'"), Expr::Blob(_));
    assert_matches!(verified_expr("r'raw text'"), Expr::Raw(_));
    assert_matches!(verified_expr("NULL"), Expr::Null(_));
    assert_matches!(verified_expr("TRUE"), Expr::Bool(_));
    assert_matches!(verified_expr("FALSE"), Expr::Bool(_));
    assert_matches!(verified_expr("@bind_var"), Expr::MultiPart(_));
    assert_matches!(verified_expr("{{ .DSTART | Date }}"), Expr::Template(_));

    expr_parses_to("true", "TRUE");
    expr_parses_to("false", "FALSE");
    expr_parses_to("null", "NULL");
}

#[test]
fn parse_number_positions() {
    let expr = parse_expression("123").unwrap();
    assert_eq!(expr, Expr::Number(NumberLit::new(pos(0), "123")));
}

#[test]
fn parse_string_escapes() {
    // A doubled quote embeds a single quote.
    let Expr::String(lit) = verified_expr("'it''s'") else {
        panic!("expected string literal");
    };
    assert_eq!(lit.value, "it's");
}

#[test]
fn parse_unary_expr() {
    let expr = parse_expression("-123").unwrap();
    assert_eq!(
        expr,
        Expr::Unary(UnaryExpr {
            op_pos: pos(0),
            op: Token::Minus,
            x: Box::new(Expr::Number(NumberLit::new(pos(1), "123"))),
        })
    );

    verified_expr("+100");
    verified_expr("~1");
    verified_expr("NOT foo");
    expr_err("-", "1:1: expected expression, found 'EOF'");
}

#[test]
fn parse_binary_expr() {
    let expr = parse_expression("1 + 2").unwrap();
    assert_eq!(
        expr,
        Expr::Binary(BinaryExpr {
            x: Box::new(Expr::Number(NumberLit::new(pos(0), "1"))),
            op_pos: pos(2),
            op: Token::Plus,
            y: Box::new(Expr::Number(NumberLit::new(pos(4), "2"))),
        })
    );

    for op in [
        "+", "-", "*", "/", "%", "||", "<<", ">>", "&", "|", "<", "<=", "<=>", ">", ">=", "=",
        "!=", "->", "->>",
    ] {
        verified_expr(&format!("1 {op} 2"));
    }
    for op in [
        "IS", "IS NOT", "LIKE", "NOT LIKE", "GLOB", "NOT GLOB", "MATCH", "NOT MATCH", "REGEXP",
        "NOT REGEXP", "RLIKE", "AND", "OR",
    ] {
        verified_expr(&format!("1 {op} 2"));
    }

    expr_parses_to("1 == 2", "1 = 2");
    expr_parses_to("1 <> 2", "1 != 2");
}

#[test]
fn parse_precedence() {
    // `*` binds tighter than `+`.
    let expr = parse_expression("1 + 2 * 3").unwrap();
    let Expr::Binary(add) = expr else {
        panic!("expected binary expression");
    };
    assert_eq!(add.op, Token::Plus);
    let Expr::Binary(mul) = *add.y else {
        panic!("expected binary rhs");
    };
    assert_eq!(mul.op, Token::Star);

    // AND binds tighter than OR; comparison tighter than AND.
    let Expr::Binary(or) = parse_expression("a = 1 OR b = 2 AND c = 3").unwrap() else {
        panic!("expected binary expression");
    };
    assert_eq!(or.op, Token::Or);
    let Expr::Binary(and) = *or.y else {
        panic!("expected AND rhs");
    };
    assert_eq!(and.op, Token::And);

    // Left-associativity.
    let Expr::Binary(outer) = parse_expression("1 - 2 - 3").unwrap() else {
        panic!("expected binary expression");
    };
    assert_matches!(*outer.x, Expr::Binary(_));
    assert_matches!(*outer.y, Expr::Number(_));
}

#[test]
fn parse_paren_expr() {
    verified_expr("(NULL)");
    verified_expr("(1 + 2)");
    verified_expr("(1 + 2) * 3");
    expr_err("(", "1:1: expected expression, found 'EOF'");

    // A comma after the first expression promotes to a list.
    assert_matches!(verified_expr("(1)"), Expr::Paren(_));
    assert_matches!(verified_expr("(1, 2)"), Expr::List(_));
    assert_matches!(verified_expr("(1, 2, 3)"), Expr::List(_));
}

#[test]
fn parse_null_checks() {
    let expr = parse_expression("1 IS NULL").unwrap();
    let Expr::NullCheck(check) = expr else {
        panic!("expected null check");
    };
    assert_eq!(check.op, Token::IsNull);

    expr_parses_to("1 ISNULL", "1 IS NULL");
    expr_parses_to("1 NOTNULL", "1 NOT NULL");
    verified_expr("1 NOT NULL");
    verified_expr("1 IS NULL AND FALSE");
}

#[test]
fn parse_is_not() {
    let Expr::Binary(b) = parse_expression("1 IS NOT 2").unwrap() else {
        panic!("expected binary expression");
    };
    assert_eq!(b.op, Token::IsNot);
    verified_expr("1 IS NOT 2");
}

#[test]
fn parse_in() {
    let Expr::Binary(b) = parse_expression("1 IN (2, 3)").unwrap() else {
        panic!("expected binary expression");
    };
    assert_eq!(b.op, Token::In);
    assert_matches!(*b.y, Expr::List(_));

    verified_expr("1 IN (2, 3)");
    verified_expr("1 NOT IN (2, 3)");
    verified_expr("id IN (SELECT id FROM t)");

    expr_err("1 IN 2", "1:6: expected left paren, found 2");
    expr_err("1 IN (", "1:6: expected expression, found 'EOF'");
    expr_err("1 IN (2 3", "1:9: expected comma or right paren, found 3");
}

#[test]
fn parse_between() {
    let Expr::Binary(b) = parse_expression("1 BETWEEN 2 AND 3").unwrap() else {
        panic!("expected binary expression");
    };
    assert_eq!(b.op, Token::Between);
    assert_matches!(*b.y, Expr::Range(_));

    let Expr::Binary(b) = parse_expression("1 NOT BETWEEN 2 AND 3").unwrap() else {
        panic!("expected binary expression");
    };
    assert_eq!(b.op, Token::NotBetween);
    assert_matches!(*b.y, Expr::Range(_));

    verified_expr("1 BETWEEN 2 AND 3");
    verified_expr("1 NOT BETWEEN 2 AND 3");
    verified_expr("x BETWEEN 1 + 2 AND 3 + 4");

    expr_err("1 BETWEEN", "1:9: expected expression, found 'EOF'");
    expr_err("1 BETWEEN 2", "1:11: expected range expression, found 'EOF'");
    expr_err("1 BETWEEN 2 + 3", "1:15: expected range expression, found 'EOF'");
}

#[test]
fn parse_not_fusion_errors() {
    expr_err(
        "1 NOT TABLE",
        "1:7: expected IN, LIKE, GLOB, REGEXP, MATCH, BETWEEN, IS/NOT NULL, found 'TABLE'",
    );
    expr_err("1 + ", "1:4: expected expression, found 'EOF'");
}

#[test]
fn parse_qualified_idents() {
    let Expr::MultiPart(name) = parse_expression("a.b.c").unwrap() else {
        panic!("expected multi-part identifier");
    };
    assert_eq!(
        name,
        MultiPartIdent {
            first: Some(Ident::with_token(pos(0), "a", Token::Ident)),
            dot1: Some(pos(1)),
            second: Some(Ident::with_token(pos(2), "b", Token::Ident)),
            dot2: Some(pos(3)),
            name: Ident::with_token(pos(4), "c", Token::Ident),
            ..MultiPartIdent::default()
        }
    );

    verified_expr("a.b.c.d");
    verified_expr("tbl.ab.struct1.part1");
    expr_err("a..b", "1:3: Found .. in input");
    expr_err("a.b.c.d.e", "1:8: Found extra . in input");
}

#[test]
fn parse_qualified_ref() {
    let Expr::QualifiedRef(r) = parse_expression("a.*").unwrap() else {
        panic!("expected qualified ref");
    };
    assert_eq!(r.name.last_name(), "a");
    verified_expr("a.*");
    verified_expr("a.b.*");
}

#[test]
fn parse_contextual_ident_keywords() {
    let Expr::MultiPart(name) = parse_expression("rowid").unwrap() else {
        panic!("expected identifier");
    };
    assert_eq!(name.name.token, Token::Rowid);

    verified_expr("rowid");
    verified_expr("current_date");
    verified_expr("CURRENT_TIMESTAMP()");
}

#[test]
fn parse_calls() {
    let Expr::Call(call) = parse_expression("COUNT(*)").unwrap() else {
        panic!("expected call");
    };
    assert!(call.star.is_some());
    assert!(call.distinct.is_none());
    assert!(call.args.is_empty());

    let Expr::Call(call) = parse_expression("COUNT(DISTINCT x)").unwrap() else {
        panic!("expected call");
    };
    assert!(call.star.is_none());
    assert!(call.distinct.is_some());
    assert_eq!(call.args.len(), 1);

    verified_expr("COUNT(*)");
    verified_expr("COUNT(DISTINCT x)");
    verified_expr("NVL(c1, NULL)");
    verified_expr("sch.udf(a, b)");
    verified_expr("FN(a2 AS STRING)");
    verified_expr("TO_DATE('{{ .DSTART | Date }}')");
}

#[test]
fn parse_call_with_over() {
    verified_expr("row_number() OVER (PARTITION BY a ORDER BY b DESC)");
    verified_expr("sum(x) OVER win1");
    verified_expr("rank() OVER (base_win ORDER BY y)");
}

#[test]
fn parse_cast() {
    let Expr::Cast(cast) = parse_expression("CAST(x AS DECIMAL(10,5))").unwrap() else {
        panic!("expected cast");
    };
    assert_eq!(cast.ty.precision.as_ref().unwrap().value, "10");
    assert_eq!(cast.ty.scale.as_ref().unwrap().value, "5");

    verified_expr("CAST(x AS DECIMAL(10,5))");
    verified_expr("CAST(dstart AS TIMESTAMP)");
    verified_expr("CAST(a AS CHARACTER VARYING)");
    verified_expr("CONCAT(LEFT(a.b, 5), CAST(RIGHT(a.b, 2) AS INT))");
}

#[test]
fn parse_case() {
    verified_expr("CASE WHEN x > 0 THEN 1 ELSE 0 END");
    verified_expr("CASE x WHEN 1 THEN 'a' WHEN 2 THEN 'b' END");

    let Expr::Case(case) = parse_expression("CASE x WHEN 1 THEN 'a' END").unwrap() else {
        panic!("expected case");
    };
    assert!(case.operand.is_some());
    assert_eq!(case.blocks.len(), 1);
    assert!(case.else_expr.is_none());
}

#[test]
fn parse_exists() {
    let Expr::Exists(exists) = parse_expression("EXISTS (SELECT 1)").unwrap() else {
        panic!("expected exists");
    };
    assert!(exists.not.is_none());

    let Expr::Exists(exists) = parse_expression("NOT EXISTS (SELECT 1)").unwrap() else {
        panic!("expected exists");
    };
    assert!(exists.not.is_some());

    verified_expr("EXISTS (SELECT 1)");
    verified_expr("NOT EXISTS (SELECT 1)");
}

#[test]
fn parse_index_expr() {
    let Expr::Index(index) = parse_expression("arr[0]").unwrap() else {
        panic!("expected index expression");
    };
    assert_matches!(*index.index, Expr::Number(_));

    verified_expr("arr[0]");
    verified_expr(r#"SPLIT(a.link.url, "/")[SAFE_OFFSET(3)]"#);
}

#[test]
fn parse_interval() {
    let Expr::Interval(interval) = parse_expression("INTERVAL 1 DAY").unwrap() else {
        panic!("expected interval");
    };
    assert_eq!(interval.value, "1");
    assert_eq!(interval.unit, "DAY");

    verified_expr("INTERVAL 1 DAY");
    verified_expr("INTERVAL 17 HOUR");
    expr_parses_to("interval 1 day", "INTERVAL 1 day");

    // A signed interval wraps in a unary expression.
    let Expr::Unary(unary) = parse_expression("-INTERVAL 1 SECOND").unwrap() else {
        panic!("expected unary");
    };
    assert_matches!(*unary.x, Expr::Interval(_));

    verified_expr("TIMESTAMP(@end_date) + INTERVAL 17 HOUR - INTERVAL 1 SECOND");
}

#[test]
fn parse_date_literal_fusion() {
    // A DATE/TIMESTAMP keyword absorbs a following string literal into one
    // identifier, keeping its token kind.
    let Expr::MultiPart(name) = parse_expression("DATE '2025-06-01'").unwrap() else {
        panic!("expected identifier");
    };
    assert_eq!(name.name.name, "DATE '2025-06-01'");
    assert_eq!(name.name.token, Token::Date);

    verified_expr("DATE '2025-06-01'");
    verified_expr("TIMESTAMP '2025-06-01 10:00:00'");
    verified_expr("DATE '{{ .DSTART | Date }}'");

    // Followed by a paren, the same keywords are ordinary call heads.
    assert_matches!(parse_expression("DATE('2023-03-01')").unwrap(), Expr::Call(_));
    verified_expr("DATE('2023-03-01')");
}

#[test]
fn parse_extract_fusion() {
    // DAY|MONTH|YEAR FROM <f> fuses into a single call head.
    let Expr::Call(call) = parse_expression("DAY FROM LAST_DAY(purchase_date)").unwrap() else {
        panic!("expected call");
    };
    assert_eq!(call.name.last_name(), "DAY FROM LAST_DAY");

    verified_expr("EXTRACT(DAY FROM LAST_DAY(purchase_date))");
}

#[test]
fn parse_subquery_expr() {
    assert_matches!(verified_expr("(SELECT 1)"), Expr::Paren(_));
    let Expr::Paren(paren) = parse_expression("(SELECT 1)").unwrap() else {
        panic!("expected paren");
    };
    assert_matches!(*paren.x, Expr::Select(_));
}

#[test]
fn parse_illegal_token() {
    expr_err("^", "1:1: expected expression, found ^");
}

#[test]
fn string_form_reparses() {
    // The canonical form of every parsed expression parses again.
    for sql in [
        "1 + 2 * 3",
        "a.b.c.d",
        "COUNT(DISTINCT x)",
        "x BETWEEN 1 AND 2",
        "CASE WHEN a THEN b ELSE c END",
        "CAST(x AS DECIMAL(10,5))",
        "NOT EXISTS (SELECT 1)",
        "{{ .X }}",
        "sale_date = '{{ .DSTART | Date }}'",
    ] {
        let expr = parse_expression(sql).unwrap();
        parse_expression(&expr.to_string())
            .unwrap_or_else(|err| panic!("{sql} -> {}: {err}", expr));
    }
}

#[test]
fn deep_clone_is_detached() {
    let expr = parse_expression("a + b * COUNT(DISTINCT c.d)").unwrap();
    let clone = expr.clone();
    assert_eq!(expr, clone);
    drop(expr);
    assert_eq!(clone.to_string(), "a + b * COUNT(DISTINCT c.d)");
}
