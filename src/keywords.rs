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

//! This module defines
//! 1) a string constant for every keyword the scanner recognizes:
//!    `pub const KEYWORD = "KEYWORD"`
//! 2) an `ALL_KEYWORDS` array pairing each keyword with its [`Token`],
//!    sorted so lookup can binary-search it. `NULL`, `TRUE`, and `FALSE`
//!    map to their literal tokens rather than to keyword tokens.
//! 3) the `TYPE_NAMES` set recognized by the type parser.

use crate::token::Token;

/// Expands to a `kw => Token` table: a string constant per keyword plus the
/// `ALL_KEYWORDS` lookup array of `(text, token)` pairs.
macro_rules! define_keywords {
    ($($kw:ident => $token:ident),* $(,)?) => {
        $(
            pub const $kw: &str = stringify!($kw);
        )*

        /// Every keyword lexeme with its token, sorted for binary search.
        pub const ALL_KEYWORDS: &[(&str, Token)] = &[
            $(($kw, Token::$token)),*
        ];
    };
}

// The following keywords must stay sorted to keep the binary search valid.
define_keywords!(
    ALL => All,
    AND => And,
    AS => As,
    ASC => Asc,
    BEGIN => Begin,
    BETWEEN => Between,
    BY => By,
    CASE => Case,
    CAST => Cast,
    COLLATE => Collate,
    CONFLICT => Conflict,
    CREATE => Create,
    CROSS => Cross,
    CURRENT_DATE => CurrentDate,
    CURRENT_TIME => CurrentTime,
    CURRENT_TIMESTAMP => CurrentTimestamp,
    DATE => Date,
    DELETE => Delete,
    DESC => Desc,
    DISTINCT => Distinct,
    DO => Do,
    DROP => Drop,
    ELSE => Else,
    END => End,
    EXCEPT => Except,
    EXISTS => Exists,
    FALSE => False,
    FIRST => First,
    FROM => From,
    FULL => Full,
    FUNCTION => Function,
    GLOB => Glob,
    GROUP => Group,
    GROUPING => Grouping,
    HAVING => Having,
    IF => If,
    IN => In,
    INNER => Inner,
    INSERT => Insert,
    INTERSECT => Intersect,
    INTERVAL => Interval,
    INTO => Into,
    IS => Is,
    ISNOT => IsNot,
    ISNULL => IsNull,
    JOIN => Join,
    LAST => Last,
    LATERAL => Lateral,
    LEFT => Left,
    LIKE => Like,
    LIMIT => Limit,
    MATCH => Match,
    MATCHED => Matched,
    MERGE => Merge,
    NATURAL => Natural,
    NOT => Not,
    NOTBETWEEN => NotBetween,
    NOTGLOB => NotGlob,
    NOTHING => Nothing,
    NOTIN => NotIn,
    NOTLIKE => NotLike,
    NOTMATCH => NotMatch,
    NOTNULL => NotNull,
    NOTREGEXP => NotRegexp,
    NULL => Null,
    NULLS => Nulls,
    OFFSET => Offset,
    ON => On,
    OR => Or,
    ORDER => Order,
    OUTER => Outer,
    OVER => Over,
    OVERWRITE => Overwrite,
    PARTITION => Partition,
    QUALIFY => Qualify,
    RECURSIVE => Recursive,
    REGEXP => Regexp,
    REPLACE => Replace,
    RETURNING => Returning,
    RETURNS => Returns,
    RIGHT => Right,
    RLIKE => Rlike,
    ROWID => Rowid,
    SELECT => Select,
    SET => Set,
    SETS => Sets,
    TABLE => Table,
    THEN => Then,
    TIMESTAMP => Timestamp,
    TRUE => True,
    TRUNCATE => Truncate,
    UNION => Union,
    UPDATE => Update,
    USING => Using,
    VALUES => Values,
    VIEW => View,
    WHEN => When,
    WHERE => Where,
    WINDOW => Window,
    WITH => With,
    WITHIN => Within,
);

/// Names the type parser accepts, sorted for binary search. Multi-word type
/// names (`CHARACTER VARYING`) are concatenated by the parser before any
/// check against this set. `NULL` doubles as a column type.
pub const TYPE_NAMES: &[&str] = &[
    "BIGINT",
    "BINARY",
    "BOOLEAN",
    "CHARACTER",
    "CLOB",
    "DATE",
    "DATETIME",
    "DECIMAL",
    "DOUBLE",
    "FLOAT",
    "INT",
    "INT64",
    "INTEGER",
    "NCHAR",
    "NULL",
    "NUMERIC",
    "NVARCHAR",
    "REAL",
    "SMALLINT",
    "STRING",
    "TEXT",
    "TIMESTAMP",
    "TIMESTAMP_NTZ",
    "TINYINT",
    "UUID",
    "VARCHAR",
];

/// Returns true if `lit` names a type the type parser recognizes.
pub fn is_type_name(lit: &str) -> bool {
    let upper = lit.to_uppercase();
    TYPE_NAMES.binary_search(&upper.as_str()).is_ok()
}
