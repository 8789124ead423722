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

//! SQL Abstract Syntax Tree (AST) types.
//!
//! Every node is immutable after construction, owns its children outright,
//! and implements `Display` as its deterministic string form and `Clone` as
//! a deep copy. Positions record where the node's significant tokens sat in
//! the input; an absent optional token is simply `None`.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};

use core::fmt::{self, Display};

use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::query::{
    Cte, JoinClause, JoinConstraint, JoinOperator, LateralView, OnConstraint, OrderingTerm,
    OverClause, ParenSource, QualifiedTableFunctionName, QualifiedTableName, ResultColumn,
    SelectStatement, Source, UsingConstraint, Window, WindowDefinition, WithClause, Within,
};
pub use self::stmt::{
    Assignment, ColumnDefinition, CreateTableStatement, DeclarationStatement, DeleteStatement,
    DropTableStatement, FunctionStatement, IndexedColumn, InsertStatement, MatchedCondition,
    MergeStatement, ReturningClause, SetStatement, Statement, TruncateStatement, UpsertClause,
};

use crate::pos::Pos;
use crate::token::Token;

mod query;
mod stmt;

struct DisplaySeparated<'a, T>
where
    T: fmt::Display,
{
    slice: &'a [T],
    sep: &'static str,
}

impl<'a, T> fmt::Display for DisplaySeparated<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut delim = "";
        for t in self.slice {
            write!(f, "{delim}")?;
            delim = self.sep;
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

pub(crate) fn display_comma_separated<T>(slice: &[T]) -> impl Display + '_
where
    T: fmt::Display,
{
    DisplaySeparated { slice, sep: ", " }
}

/// A single lexical identifier, remembering which quotation style it had.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ident {
    /// Identifier position.
    pub pos: Pos,
    /// Identifier text without quotes.
    pub name: String,
    /// Token kind the scanner produced: `Ident`, `QIdent`, `TString`,
    /// `Bind`, `Tmpl`, or a contextual keyword.
    pub token: Token,
}

impl Ident {
    /// A plain unquoted identifier with no position.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Ident {
            pos: Pos::default(),
            name: name.into(),
            token: Token::Ident,
        }
    }

    pub fn with_token<S: Into<String>>(pos: Pos, name: S, token: Token) -> Self {
        Ident {
            pos,
            name: name.into(),
            token,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.token {
            Token::QIdent => write!(f, "\"{}\"", self.name.replace('"', "\"\"")),
            Token::String => write!(f, "'{}'", self.name.replace('\'', "''")),
            Token::TString => write!(f, "`{}`", self.name),
            Token::Tmpl => write!(f, "{{{{{}}}}}", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// Up to four dot-separated identifiers naming a column, table, or
/// function: `project.schema.table.name`. The chain is left-filled and
/// `name` always holds the final segment.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultiPartIdent {
    pub first: Option<Ident>,
    pub dot1: Option<Pos>,
    pub second: Option<Ident>,
    pub dot2: Option<Pos>,
    pub third: Option<Ident>,
    pub dot3: Option<Pos>,
    pub name: Ident,
}

impl MultiPartIdent {
    /// A single-segment name.
    pub fn single(name: Ident) -> Self {
        MultiPartIdent {
            name,
            ..MultiPartIdent::default()
        }
    }

    /// The segments present, leading qualifiers first.
    pub fn parts(&self) -> impl Iterator<Item = &Ident> {
        self.first
            .iter()
            .chain(self.second.iter())
            .chain(self.third.iter())
            .chain(core::iter::once(&self.name))
    }

    /// The unquoted text of the final segment.
    pub fn last_name(&self) -> &str {
        &self.name.name
    }
}

impl fmt::Display for MultiPartIdent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.parts().format("."))
    }
}

/// A qualified `x.*` or `x.y.*` reference in result-column position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualifiedRef {
    pub name: MultiPartIdent,
    pub dot: Pos,
    pub star: Pos,
}

impl fmt::Display for QualifiedRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.*", self.name)
    }
}

/// An integer or float literal, kept verbatim.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NumberLit {
    pub pos: Pos,
    pub value: String,
}

impl NumberLit {
    pub fn new<S: Into<String>>(pos: Pos, value: S) -> Self {
        NumberLit {
            pos,
            value: value.into(),
        }
    }
}

impl fmt::Display for NumberLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A single-quoted string literal; the value excludes the quotes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StringLit {
    pub pos: Pos,
    pub value: String,
}

impl fmt::Display for StringLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}'", self.value.replace('\'', "''"))
    }
}

/// A raw string literal `r'...'`; no escape processing applies.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawLit {
    pub pos: Pos,
    pub value: String,
}

impl fmt::Display for RawLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r'{}'", self.value)
    }
}

/// A hex blob literal `x'beef'`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlobLit {
    pub pos: Pos,
    pub value: String,
}

impl fmt::Display for BlobLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x'{}'", self.value)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoolLit {
    pub pos: Pos,
    pub value: bool,
}

impl fmt::Display for BoolLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(if self.value { "TRUE" } else { "FALSE" })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NullLit {
    pub pos: Pos,
}

impl fmt::Display for NullLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("NULL")
    }
}

/// A timestamp literal kept verbatim.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimestampLit {
    pub pos: Pos,
    pub value: String,
}

impl fmt::Display for TimestampLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// `INTERVAL 1 DAY` and friends: the count and its unit, both verbatim.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntervalLit {
    pub interval: Pos,
    pub value: String,
    pub unit: String,
}

impl fmt::Display for IntervalLit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "INTERVAL {} {}", self.value, self.unit)
    }
}

/// A `{{ ... }}` placeholder used in literal position; the body is kept
/// verbatim for the downstream template engine.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemplateStr {
    pub pos: Pos,
    pub template: String,
}

impl fmt::Display for TemplateStr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{{{}}}}}", self.template)
    }
}

/// A prefix operation; `op` is one of `+`, `-`, `NOT`, `~`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnaryExpr {
    pub op_pos: Pos,
    pub op: Token,
    pub x: Box<Expr>,
}

impl fmt::Display for UnaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.op {
            Token::Plus => write!(f, "+{}", self.x),
            Token::Minus => write!(f, "-{}", self.x),
            Token::Not => write!(f, "NOT {}", self.x),
            Token::BitNot => write!(f, "~{}", self.x),
            op => panic!("UnaryExpr: invalid op {op}"),
        }
    }
}

/// An infix operation. `op` satisfies `Token::is_binary_op` or is one of
/// the fused `ISNOT`/`NOT*` tokens the parser synthesizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryExpr {
    pub x: Box<Expr>,
    pub op_pos: Pos,
    pub op: Token,
    pub y: Box<Expr>,
}

impl fmt::Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self.op {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Rem => "%",
            Token::Concat => "||",
            Token::Between => "BETWEEN",
            Token::NotBetween => "NOT BETWEEN",
            Token::Lshift => "<<",
            Token::Rshift => ">>",
            Token::BitAnd => "&",
            Token::BitOr => "|",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Eqn => "<=>",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Eq => "=",
            Token::Ne => "!=",
            Token::JsonExtractJson => "->",
            Token::JsonExtractSql => "->>",
            Token::Is => "IS",
            Token::IsNot => "IS NOT",
            Token::In => "IN",
            Token::NotIn => "NOT IN",
            Token::Like => "LIKE",
            Token::NotLike => "NOT LIKE",
            Token::Glob => "GLOB",
            Token::NotGlob => "NOT GLOB",
            Token::Match => "MATCH",
            Token::NotMatch => "NOT MATCH",
            Token::Regexp => "REGEXP",
            Token::NotRegexp => "NOT REGEXP",
            Token::Rlike => "RLIKE",
            Token::And => "AND",
            Token::Or => "OR",
            op => panic!("BinaryExpr: invalid op {op}"),
        };
        write!(f, "{} {} {}", self.x, op, self.y)
    }
}

/// A postfix null check; `op` is `ISNULL` or `NOTNULL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NullCheck {
    pub x: Box<Expr>,
    pub op_pos: Pos,
    pub op: Token,
}

impl fmt::Display for NullCheck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.op == Token::IsNull {
            write!(f, "{} IS NULL", self.x)
        } else {
            write!(f, "{} NOT NULL", self.x)
        }
    }
}

/// The right-hand side of `BETWEEN`/`NOT BETWEEN`; never appears anywhere
/// else in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Range {
    pub x: Box<Expr>,
    pub and: Pos,
    pub y: Box<Expr>,
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} AND {}", self.x, self.y)
    }
}

/// A single parenthesized expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParenExpr {
    pub lparen: Pos,
    pub x: Box<Expr>,
    pub rparen: Pos,
}

impl fmt::Display for ParenExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.x)
    }
}

/// A parenthesized, comma-separated expression list: the `IN (...)`
/// operand, a `VALUES` row, or a `GROUPING SETS` element.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExprList {
    pub lparen: Pos,
    pub exprs: Vec<Expr>,
    pub rparen: Pos,
}

impl fmt::Display for ExprList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", display_comma_separated(&self.exprs))
    }
}

/// One function-call argument, optionally carrying `AS <type>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Param {
    pub x: Expr,
    pub as_pos: Option<Pos>,
    pub ty: Option<Type>,
}

impl Param {
    pub fn new(x: Expr) -> Self {
        Param {
            x,
            as_pos: None,
            ty: None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.x)?;
        if let Some(ty) = &self.ty {
            write!(f, " AS {ty}")?;
        }
        Ok(())
    }
}

/// A function call. `star` is set iff the call is `f(*)`; `distinct` iff
/// `f(DISTINCT ...)`; the two are mutually exclusive and `star` implies an
/// empty argument list.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Call {
    pub name: MultiPartIdent,
    pub lparen: Pos,
    pub star: Option<Pos>,
    pub distinct: Option<Pos>,
    pub args: Vec<Param>,
    pub rparen: Pos,
    pub over: Option<OverClause>,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.star.is_some() {
            f.write_str("*")?;
        } else {
            if self.distinct.is_some() {
                f.write_str("DISTINCT")?;
                if !self.args.is_empty() {
                    f.write_str(" ")?;
                }
            }
            write!(f, "{}", display_comma_separated(&self.args))?;
        }
        f.write_str(")")?;
        if let Some(over) = &self.over {
            write!(f, " {over}")?;
        }
        Ok(())
    }
}

/// A type reference with optional precision and scale.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Type {
    pub name: Ident,
    pub lparen: Option<Pos>,
    pub precision: Option<NumberLit>,
    pub scale: Option<NumberLit>,
    pub rparen: Option<Pos>,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.precision, &self.scale) {
            (Some(precision), Some(scale)) => {
                write!(f, "{}({},{})", self.name.name, precision, scale)
            }
            (Some(precision), None) => write!(f, "{}({})", self.name.name, precision),
            _ => f.write_str(&self.name.name),
        }
    }
}

/// `CAST(x AS type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastExpr {
    pub cast: Pos,
    pub lparen: Pos,
    pub x: Box<Expr>,
    pub as_pos: Pos,
    pub ty: Type,
    pub rparen: Pos,
}

impl fmt::Display for CastExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CAST({} AS {})", self.x, self.ty)
    }
}

/// A subscript `x[n]` or `x[fn(...)]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexExpr {
    pub x: Box<Expr>,
    pub lbrack: Pos,
    pub index: Box<Expr>,
    pub rbrack: Pos,
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.x, self.index)
    }
}

/// One `WHEN condition THEN body` arm of a CASE expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseBlock {
    pub when: Pos,
    pub condition: Expr,
    pub then: Pos,
    pub body: Expr,
}

impl fmt::Display for CaseBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WHEN {} THEN {}", self.condition, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CaseExpr {
    pub case: Pos,
    pub operand: Option<Box<Expr>>,
    pub blocks: Vec<CaseBlock>,
    pub else_pos: Option<Pos>,
    pub else_expr: Option<Box<Expr>>,
    pub end: Pos,
}

impl fmt::Display for CaseExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("CASE")?;
        if let Some(operand) = &self.operand {
            write!(f, " {operand}")?;
        }
        for block in &self.blocks {
            write!(f, " {block}")?;
        }
        if let Some(else_expr) = &self.else_expr {
            write!(f, " ELSE {else_expr}")?;
        }
        f.write_str(" END")
    }
}

/// `[NOT] EXISTS (select)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Exists {
    pub not: Option<Pos>,
    pub exists: Pos,
    pub lparen: Pos,
    pub select: Box<SelectStatement>,
    pub rparen: Pos,
}

impl fmt::Display for Exists {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.not.is_some() {
            f.write_str("NOT ")?;
        }
        write!(f, "EXISTS ({})", self.select)
    }
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    Ident(Ident),
    MultiPart(MultiPartIdent),
    QualifiedRef(QualifiedRef),
    Number(NumberLit),
    String(StringLit),
    Raw(RawLit),
    Blob(BlobLit),
    Bool(BoolLit),
    Null(NullLit),
    Timestamp(TimestampLit),
    Interval(IntervalLit),
    Template(TemplateStr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    NullCheck(NullCheck),
    Range(Range),
    Paren(ParenExpr),
    List(ExprList),
    Call(Call),
    Cast(CastExpr),
    Index(IndexExpr),
    Case(CaseExpr),
    Exists(Exists),
    /// A `SELECT`/`VALUES` statement in expression position.
    Select(Box<SelectStatement>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Ident(x) => x.fmt(f),
            Expr::MultiPart(x) => x.fmt(f),
            Expr::QualifiedRef(x) => x.fmt(f),
            Expr::Number(x) => x.fmt(f),
            Expr::String(x) => x.fmt(f),
            Expr::Raw(x) => x.fmt(f),
            Expr::Blob(x) => x.fmt(f),
            Expr::Bool(x) => x.fmt(f),
            Expr::Null(x) => x.fmt(f),
            Expr::Timestamp(x) => x.fmt(f),
            Expr::Interval(x) => x.fmt(f),
            Expr::Template(x) => x.fmt(f),
            Expr::Unary(x) => x.fmt(f),
            Expr::Binary(x) => x.fmt(f),
            Expr::NullCheck(x) => x.fmt(f),
            Expr::Range(x) => x.fmt(f),
            Expr::Paren(x) => x.fmt(f),
            Expr::List(x) => x.fmt(f),
            Expr::Call(x) => x.fmt(f),
            Expr::Cast(x) => x.fmt(f),
            Expr::Index(x) => x.fmt(f),
            Expr::Case(x) => x.fmt(f),
            Expr::Exists(x) => x.fmt(f),
            Expr::Select(x) => x.fmt(f),
        }
    }
}
