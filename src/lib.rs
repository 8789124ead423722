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

//! SQL lexer and parser for an extended ANSI dialect targeting cloud
//! warehouses: a SQLite-style core plus the MaxCompute/BigQuery/Hive
//! extensions tooling runs into in practice (qualified
//! `project.schema.table` names, lateral views, grouping sets, `QUALIFY`,
//! `WITHIN GROUP`, `EXCEPT` column lists, `{{ ... }}` template
//! placeholders, `@bind` variables, `MERGE`, and multi-statement scripts
//! with `SET` and variable declarations).
//!
//! The produced syntax tree preserves token positions, which makes it
//! suitable for formatters, linters, rewriters, and lineage analysis.
//!
//! Example:
//! ```
//! use squill::parser::parse_statement;
//!
//! let sql = "SELECT a, b FROM proj.schema.tbl WHERE a > 10";
//! let ast = parse_statement(sql).unwrap();
//!
//! assert_eq!(ast.to_string(), sql);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::upper_case_acronyms)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod ast;
pub mod keywords;
pub mod parser;
pub mod pos;
pub mod scanner;
pub mod token;

#[doc(hidden)]
pub mod test_utils;

pub use crate::parser::{parse_expression, parse_statement, parse_statements, ParseError, Parser};
pub use crate::pos::Pos;
pub use crate::scanner::Scanner;
pub use crate::token::Token;
