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

//! Shared helpers for the integration tests in `tests/`.
//!
//! This module is public so the test binaries can use it; it is not part
//! of the crate's stable API.

#[cfg(not(feature = "std"))]
use alloc::string::ToString;

use crate::ast::{Expr, Statement};
use crate::parser::{parse_expression, parse_statement};
use crate::pos::Pos;

/// Parses `sql` as an expression and asserts that its canonical string
/// form is `sql` itself.
pub fn verified_expr(sql: &str) -> Expr {
    expr_parses_to(sql, sql)
}

/// Parses `sql` as an expression and asserts that its canonical string
/// form is `canonical`, which must itself reparse cleanly.
pub fn expr_parses_to(sql: &str, canonical: &str) -> Expr {
    let expr = parse_expression(sql).unwrap_or_else(|err| panic!("{sql}: {err}"));
    assert_eq!(expr.to_string(), canonical);
    parse_expression(canonical).unwrap_or_else(|err| panic!("reparse {canonical}: {err}"));
    expr
}

/// Asserts that parsing `sql` as an expression fails with the given
/// error string.
pub fn expr_err(sql: &str, expected: &str) {
    match parse_expression(sql) {
        Ok(expr) => panic!("{sql}: expected error, parsed {expr}"),
        Err(err) => assert_eq!(err.to_string(), expected, "error for {sql:?}"),
    }
}

/// Parses `sql` as a statement and asserts that its canonical string form
/// is `sql` itself.
pub fn verified_stmt(sql: &str) -> Statement {
    stmt_parses_to(sql, sql)
}

/// Parses `sql` as a statement and asserts that its canonical string form
/// is `canonical`, which must itself reparse cleanly.
pub fn stmt_parses_to(sql: &str, canonical: &str) -> Statement {
    let stmt = parse_statement(sql).unwrap_or_else(|err| panic!("{sql}: {err}"));
    assert_eq!(stmt.to_string(), canonical);
    parse_statement(canonical).unwrap_or_else(|err| panic!("reparse {canonical}: {err}"));
    stmt
}

/// Asserts that parsing `sql` as a statement fails with the given error
/// string.
pub fn stmt_err(sql: &str, expected: &str) {
    match parse_statement(sql) {
        Ok(stmt) => panic!("{sql}: expected error, parsed {stmt}"),
        Err(err) => assert_eq!(err.to_string(), expected, "error for {sql:?}"),
    }
}

/// A single-line position at the given zero-based offset.
pub fn pos(offset: u32) -> Pos {
    Pos::new(offset as i32, 1, offset + 1)
}
