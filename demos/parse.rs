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

//! A small demo that parses its argument as a SQL script and prints the
//! canonical form of each statement:
//!
//! ```sh
//! cargo run --example parse -- "SELECT a FROM t; DROP TABLE IF EXISTS t;"
//! ```

use std::env;
use std::process;

use squill::parser::parse_statements;

fn main() {
    simple_logger::SimpleLogger::new().init().unwrap();

    let sql = match env::args().nth(1) {
        Some(sql) => sql,
        None => {
            eprintln!("usage: parse <sql>");
            process::exit(2);
        }
    };

    match parse_statements(&sql) {
        Ok(stmts) => {
            for stmt in stmts {
                println!("{stmt};");
            }
        }
        Err(err) => {
            eprintln!("parse error: {err}");
            process::exit(1);
        }
    }
}
