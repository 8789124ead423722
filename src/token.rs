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

//! The closed token enumeration produced by the scanner, with the
//! classification predicates and the operator precedence table the parser
//! drives on.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::keywords;

/// Lowest operator precedence; tokens that are not operators sit here and
/// terminate the binary-expression loop.
pub const LOWEST_PREC: u8 = 0;
/// Precedence applied to unary `+`, `-`, and `~`.
pub const UNARY_PREC: u8 = 13;
/// One above every real operator.
pub const HIGHEST_PREC: u8 = 14;

/// The set of lexical tokens.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Token {
    // Special tokens
    #[default]
    Illegal,
    Eof,
    Comment,
    Space,

    // Literals
    Ident,   // ident
    QIdent,  // "ident"
    String,  // 'string'
    TString, // `string`
    RawStr,  // r'string'
    Float,   // 123.45
    Integer, // 123
    Null,    // NULL
    True,    // true
    False,   // false
    Bind,    // @name
    Tmpl,    // {{ content }}
    Blob,    // x'beef'

    // Operators
    Semi,   // ;
    Lp,     // (
    Rp,     // )
    Lsb,    // [
    Rsb,    // ]
    Comma,  // ,
    Ne,     // != or <>
    Eq,     // = or ==
    Le,     // <=
    Lt,     // <
    Gt,     // >
    Ge,     // >=
    Eqn,    // <=>
    BitAnd, // &
    BitOr,  // |
    BitNot, // ~
    Lshift, // <<
    Rshift, // >>
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
    Rem,    // %
    Concat, // ||
    Dot,    // .
    Assign, // :=

    JsonExtractJson, // ->
    JsonExtractSql,  // ->>

    // Keywords
    All,
    And,
    As,
    Asc,
    Begin,
    Between,
    By,
    Case,
    Cast,
    Collate,
    Conflict,
    Create,
    Cross,
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,
    Date,
    Delete,
    Desc,
    Distinct,
    Do,
    Drop,
    Else,
    End,
    Except,
    Exists,
    First,
    From,
    Full,
    Function,
    Glob,
    Group,
    Grouping,
    Having,
    If,
    In,
    Inner,
    Insert,
    Intersect,
    Interval,
    Into,
    Is,
    IsNot,
    IsNull,
    Join,
    Lateral,
    Last,
    Left,
    Like,
    Limit,
    Match,
    Matched,
    Merge,
    Natural,
    Not,
    NotBetween,
    NotGlob,
    Nothing,
    NotIn,
    NotLike,
    NotMatch,
    NotNull,
    NotRegexp,
    Nulls,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Over,
    Overwrite,
    Partition,
    Qualify,
    Recursive,
    Regexp,
    Replace,
    Returns,
    Returning,
    Right,
    Rlike,
    Rowid,
    Select,
    Set,
    Sets,
    Table,
    Then,
    Timestamp,
    Truncate,
    Union,
    Update,
    Using,
    Values,
    View,
    When,
    Where,
    Window,
    With,
    Within,
}

impl Token {
    /// Case-insensitive keyword lookup. `NULL`, `TRUE`, and `FALSE` resolve
    /// to their literal tokens; anything unknown is an [`Token::Ident`].
    pub fn lookup(ident: &str) -> Token {
        let upper = ident.to_uppercase();
        match keywords::ALL_KEYWORDS.binary_search_by(|(kw, _)| kw.cmp(&upper.as_str())) {
            Ok(i) => keywords::ALL_KEYWORDS[i].1,
            Err(_) => Token::Ident,
        }
    }

    /// True for the literal category (identifiers, strings, numbers, binds,
    /// templates, and the literal keywords `NULL`/`TRUE`/`FALSE`).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::Ident
                | Token::QIdent
                | Token::String
                | Token::TString
                | Token::RawStr
                | Token::Float
                | Token::Integer
                | Token::Null
                | Token::True
                | Token::False
                | Token::Bind
                | Token::Tmpl
                | Token::Blob
        )
    }

    /// True for operators and infix keyword operators.
    pub fn is_binary_op(&self) -> bool {
        matches!(
            self,
            Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Rem
                | Token::Concat
                | Token::Not
                | Token::Between
                | Token::Lshift
                | Token::Rshift
                | Token::BitAnd
                | Token::BitOr
                | Token::Lt
                | Token::Le
                | Token::Gt
                | Token::Ge
                | Token::Eq
                | Token::Ne
                | Token::Eqn
                | Token::Is
                | Token::In
                | Token::Like
                | Token::Glob
                | Token::Match
                | Token::Regexp
                | Token::Rlike
                | Token::And
                | Token::Or
                | Token::JsonExtractJson
                | Token::JsonExtractSql
        )
    }

    /// True for keywords the grammar accepts as unquoted identifiers in
    /// identifier position.
    pub fn is_bare_keyword(&self) -> bool {
        matches!(
            self,
            Token::Asc
                | Token::By
                | Token::Cast
                | Token::Conflict
                | Token::Cross
                | Token::CurrentDate
                | Token::CurrentTime
                | Token::CurrentTimestamp
                | Token::Date
                | Token::Desc
                | Token::Do
                | Token::End
                | Token::First
                | Token::Full
                | Token::Glob
                | Token::If
                | Token::Inner
                | Token::Integer
                | Token::Last
                | Token::Left
                | Token::Like
                | Token::Match
                | Token::Natural
                | Token::Nulls
                | Token::Offset
                | Token::Outer
                | Token::Over
                | Token::Partition
                | Token::Recursive
                | Token::Regexp
                | Token::Replace
                | Token::Timestamp
                | Token::View
                | Token::Window
                | Token::With
        )
    }

    /// True for tokens that can begin an identifier expression: identifier
    /// literals plus the contextual keyword identifiers.
    pub fn is_expr_ident(&self) -> bool {
        match self {
            Token::Ident | Token::QIdent | Token::TString | Token::Bind => true,
            Token::Rowid | Token::CurrentDate | Token::CurrentTime | Token::CurrentTimestamp => {
                true
            }
            Token::Grouping | Token::Date | Token::Timestamp | Token::Left | Token::Right => true,
            // Core functions that double as identifiers
            Token::Replace | Token::Like | Token::Glob | Token::If => true,
            _ => false,
        }
    }

    /// True for the token kinds that name things: plain and quoted
    /// identifiers, binds, and templates.
    pub fn is_ident_token(&self) -> bool {
        matches!(
            self,
            Token::Ident | Token::QIdent | Token::TString | Token::Bind | Token::Tmpl
        )
    }

    /// Binding power of the token as an infix operator; `LOWEST_PREC` for
    /// everything else.
    pub fn precedence(&self) -> u8 {
        match self {
            Token::Or => 1,
            Token::And => 2,
            Token::Not => 3,
            Token::Is
            | Token::Match
            | Token::Like
            | Token::Glob
            | Token::Regexp
            | Token::Between
            | Token::In
            | Token::IsNull
            | Token::NotNull
            | Token::Ne
            | Token::Eq
            | Token::Rlike => 4,
            Token::Gt | Token::Le | Token::Lt | Token::Ge | Token::Eqn => 5,
            Token::BitAnd | Token::BitOr | Token::Lshift | Token::Rshift => 7,
            Token::Plus | Token::Minus => 8,
            Token::Star | Token::Slash | Token::Rem => 9,
            Token::Concat | Token::JsonExtractJson | Token::JsonExtractSql | Token::Lsb => 10,
            Token::BitNot => 11,
            _ => LOWEST_PREC,
        }
    }

    /// Canonical name used by diagnostics: the symbol for operators, the
    /// upper-case word for keywords, the category name for literals.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Illegal => "ILLEGAL",
            Token::Eof => "EOF",
            Token::Comment => "COMMENT",
            Token::Space => "SPACE",

            Token::Ident => "IDENT",
            Token::QIdent => "QIDENT",
            Token::String => "STRING",
            Token::TString => "TSTRING",
            Token::RawStr => "RAWSTR",
            Token::Float => "FLOAT",
            Token::Integer => "INTEGER",
            Token::Null => "NULL",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::Bind => "BIND",
            Token::Tmpl => "TMPL",
            Token::Blob => "BLOB",

            Token::Semi => ";",
            Token::Lp => "(",
            Token::Rp => ")",
            Token::Lsb => "[",
            Token::Rsb => "]",
            Token::Comma => ",",
            Token::Ne => "!=",
            Token::Eq => "=",
            Token::Le => "<=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Eqn => "<=>",
            Token::BitAnd => "&",
            Token::BitOr => "|",
            Token::BitNot => "~",
            Token::Lshift => "<<",
            Token::Rshift => ">>",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Rem => "%",
            Token::Concat => "||",
            Token::Dot => ".",
            Token::Assign => ":=",
            Token::JsonExtractJson => "->",
            Token::JsonExtractSql => "->>",

            Token::All => "ALL",
            Token::And => "AND",
            Token::As => "AS",
            Token::Asc => "ASC",
            Token::Begin => "BEGIN",
            Token::Between => "BETWEEN",
            Token::By => "BY",
            Token::Case => "CASE",
            Token::Cast => "CAST",
            Token::Collate => "COLLATE",
            Token::Conflict => "CONFLICT",
            Token::Create => "CREATE",
            Token::Cross => "CROSS",
            Token::CurrentTime => "CURRENT_TIME",
            Token::CurrentDate => "CURRENT_DATE",
            Token::CurrentTimestamp => "CURRENT_TIMESTAMP",
            Token::Date => "DATE",
            Token::Delete => "DELETE",
            Token::Desc => "DESC",
            Token::Distinct => "DISTINCT",
            Token::Do => "DO",
            Token::Drop => "DROP",
            Token::Else => "ELSE",
            Token::End => "END",
            Token::Except => "EXCEPT",
            Token::Exists => "EXISTS",
            Token::First => "FIRST",
            Token::From => "FROM",
            Token::Full => "FULL",
            Token::Function => "FUNCTION",
            Token::Glob => "GLOB",
            Token::Group => "GROUP",
            Token::Grouping => "GROUPING",
            Token::Having => "HAVING",
            Token::If => "IF",
            Token::In => "IN",
            Token::Inner => "INNER",
            Token::Insert => "INSERT",
            Token::Intersect => "INTERSECT",
            Token::Interval => "INTERVAL",
            Token::Into => "INTO",
            Token::Is => "IS",
            Token::IsNot => "ISNOT",
            Token::IsNull => "ISNULL",
            Token::Join => "JOIN",
            Token::Lateral => "LATERAL",
            Token::Last => "LAST",
            Token::Left => "LEFT",
            Token::Like => "LIKE",
            Token::Limit => "LIMIT",
            Token::Match => "MATCH",
            Token::Matched => "MATCHED",
            Token::Merge => "MERGE",
            Token::Natural => "NATURAL",
            Token::Not => "NOT",
            Token::NotBetween => "NOTBETWEEN",
            Token::NotGlob => "NOTGLOB",
            Token::Nothing => "NOTHING",
            Token::NotIn => "NOTIN",
            Token::NotLike => "NOTLIKE",
            Token::NotMatch => "NOTMATCH",
            Token::NotNull => "NOTNULL",
            Token::NotRegexp => "NOTREGEXP",
            Token::Nulls => "NULLS",
            Token::Offset => "OFFSET",
            Token::On => "ON",
            Token::Or => "OR",
            Token::Order => "ORDER",
            Token::Outer => "OUTER",
            Token::Over => "OVER",
            Token::Overwrite => "OVERWRITE",
            Token::Partition => "PARTITION",
            Token::Qualify => "QUALIFY",
            Token::Recursive => "RECURSIVE",
            Token::Regexp => "REGEXP",
            Token::Replace => "REPLACE",
            Token::Returns => "RETURNS",
            Token::Returning => "RETURNING",
            Token::Right => "RIGHT",
            Token::Rlike => "RLIKE",
            Token::Rowid => "ROWID",
            Token::Select => "SELECT",
            Token::Set => "SET",
            Token::Sets => "SETS",
            Token::Table => "TABLE",
            Token::Then => "THEN",
            Token::Timestamp => "TIMESTAMP",
            Token::Truncate => "TRUNCATE",
            Token::Union => "UNION",
            Token::Update => "UPDATE",
            Token::Using => "USING",
            Token::Values => "VALUES",
            Token::View => "VIEW",
            Token::When => "WHEN",
            Token::Where => "WHERE",
            Token::Window => "WINDOW",
            Token::With => "WITH",
            Token::Within => "WITHIN",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Token::lookup("select"), Token::Select);
        assert_eq!(Token::lookup("Select"), Token::Select);
        assert_eq!(Token::lookup("CURRENT_DATE"), Token::CurrentDate);
        assert_eq!(Token::lookup("foo"), Token::Ident);
    }

    #[test]
    fn lookup_literal_keywords() {
        assert_eq!(Token::lookup("null"), Token::Null);
        assert_eq!(Token::lookup("TRUE"), Token::True);
        assert_eq!(Token::lookup("false"), Token::False);
        assert!(Token::Null.is_literal());
    }

    #[test]
    fn precedence_ordering() {
        assert!(Token::Star.precedence() > Token::Plus.precedence());
        assert!(Token::Plus.precedence() > Token::Lt.precedence());
        assert!(Token::And.precedence() > Token::Or.precedence());
        assert_eq!(Token::Select.precedence(), LOWEST_PREC);
        assert_eq!(Token::Lsb.precedence(), Token::Concat.precedence());
    }

    #[test]
    fn classification() {
        assert!(Token::Between.is_binary_op());
        assert!(Token::Rlike.is_binary_op());
        assert!(!Token::Within.is_binary_op());
        assert!(Token::If.is_expr_ident());
        assert!(!Token::Tmpl.is_expr_ident());
        assert!(Token::Tmpl.is_ident_token());
        assert!(Token::Window.is_bare_keyword());
        assert!(!Token::Select.is_bare_keyword());
    }
}
