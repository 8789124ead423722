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

//! Statements other than `SELECT`, plus the top-level [`Statement`] union.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, string::String, vec::Vec};

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::query::{
    OrderingTerm, QualifiedTableName, ResultColumn, SelectStatement, Source, WithClause,
};
use super::{
    display_comma_separated, Expr, ExprList, Ident, MultiPartIdent, Type,
};
use crate::pos::Pos;

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Statement {
    Select(Box<SelectStatement>),
    Insert(Box<InsertStatement>),
    Delete(Box<DeleteStatement>),
    Merge(Box<MergeStatement>),
    CreateTable(Box<CreateTableStatement>),
    DropTable(DropTableStatement),
    Set(SetStatement),
    Declaration(Box<DeclarationStatement>),
    Truncate(TruncateStatement),
    Function(Box<FunctionStatement>),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Select(x) => x.fmt(f),
            Statement::Insert(x) => x.fmt(f),
            Statement::Delete(x) => x.fmt(f),
            Statement::Merge(x) => x.fmt(f),
            Statement::CreateTable(x) => x.fmt(f),
            Statement::DropTable(x) => x.fmt(f),
            Statement::Set(x) => x.fmt(f),
            Statement::Declaration(x) => x.fmt(f),
            Statement::Truncate(x) => x.fmt(f),
            Statement::Function(x) => x.fmt(f),
        }
    }
}

/// `SET key = value` script directive; key and value stay verbatim.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SetStatement {
    pub set: Pos,
    pub key: String,
    pub equal: Pos,
    pub value: String,
}

impl fmt::Display for SetStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SET {}={}", self.key, self.value)
    }
}

/// A script variable declaration: `@name := expr`, `@name := type expr`,
/// or `@name type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeclarationStatement {
    pub name: Ident,
    pub type_expr: Option<Expr>,
    pub value: Option<Expr>,
}

impl fmt::Display for DeclarationStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.value, &self.type_expr) {
            (Some(value), Some(type_expr)) => {
                write!(f, "{} := {} {}", self.name, type_expr, value)
            }
            (Some(value), None) => write!(f, "{} := {}", self.name, value),
            (None, Some(type_expr)) => write!(f, "{} {}", self.name, type_expr),
            (None, None) => write!(f, "{}", self.name),
        }
    }
}

/// `INSERT`/`REPLACE` with a `VALUES` body, a sub-select, or
/// `DEFAULT VALUES`, plus the optional upsert and `RETURNING` tails.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InsertStatement {
    pub with: Option<WithClause>,

    pub insert: Option<Pos>,
    pub replace: Option<Pos>,
    pub into: Option<Pos>,
    pub overwrite: Option<Pos>,
    pub table_kw: Option<Pos>,

    pub table: MultiPartIdent,
    pub as_pos: Option<Pos>,
    pub alias: Option<Ident>,

    pub columns_lparen: Option<Pos>,
    pub columns: Vec<Ident>,
    pub columns_rparen: Option<Pos>,

    pub values: Option<Pos>,
    pub value_lists: Vec<ExprList>,

    pub select: Option<Box<SelectStatement>>,

    pub default: Option<Pos>,
    pub default_values: Option<Pos>,

    pub upsert: Option<UpsertClause>,
    pub returning: Option<ReturningClause>,
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }

        if self.replace.is_some() {
            f.write_str("REPLACE")?;
        } else {
            f.write_str("INSERT")?;
        }
        if self.overwrite.is_some() {
            f.write_str(" OVERWRITE")?;
        } else {
            f.write_str(" INTO")?;
        }
        if self.table_kw.is_some() {
            f.write_str(" TABLE")?;
        }

        write!(f, " {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }

        if !self.columns.is_empty() {
            write!(f, " ({})", display_comma_separated(&self.columns))?;
        }

        if self.default_values.is_some() {
            f.write_str(" DEFAULT VALUES")?;
        } else if let Some(select) = &self.select {
            write!(f, " {select}")?;
        } else {
            write!(f, " VALUES {}", display_comma_separated(&self.value_lists))?;
        }

        if let Some(upsert) = &self.upsert {
            write!(f, " {upsert}")?;
        }
        if let Some(returning) = &self.returning {
            write!(f, " {returning}")?;
        }
        Ok(())
    }
}

/// `ON CONFLICT [(cols) [WHERE ...]] DO NOTHING | DO UPDATE SET ...`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UpsertClause {
    pub on: Pos,
    pub on_conflict: Pos,

    pub lparen: Option<Pos>,
    pub columns: Vec<IndexedColumn>,
    pub rparen: Option<Pos>,
    pub where_pos: Option<Pos>,
    pub where_expr: Option<Expr>,

    pub do_pos: Pos,
    pub do_nothing: Option<Pos>,
    pub do_update: Option<Pos>,
    pub do_update_set: Option<Pos>,
    pub assignments: Vec<Assignment>,
    pub update_where: Option<Pos>,
    pub update_where_expr: Option<Expr>,
}

impl fmt::Display for UpsertClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ON CONFLICT")?;

        if !self.columns.is_empty() {
            write!(f, " ({})", display_comma_separated(&self.columns))?;
            if let Some(where_expr) = &self.where_expr {
                write!(f, " WHERE {where_expr}")?;
            }
        }

        f.write_str(" DO")?;
        if self.do_nothing.is_some() {
            f.write_str(" NOTHING")?;
        } else {
            write!(f, " UPDATE SET {}", display_comma_separated(&self.assignments))?;
            if let Some(update_where_expr) = &self.update_where_expr {
                write!(f, " WHERE {update_where_expr}")?;
            }
        }
        Ok(())
    }
}

/// `RETURNING result-columns`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturningClause {
    pub returning: Pos,
    pub columns: Vec<ResultColumn>,
}

impl fmt::Display for ReturningClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RETURNING {}", display_comma_separated(&self.columns))
    }
}

/// `DELETE FROM tbl [WHERE ...] [ORDER BY ... LIMIT ...] [RETURNING ...]`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeleteStatement {
    pub with: Option<WithClause>,
    pub delete: Pos,
    pub from: Pos,
    pub table: QualifiedTableName,

    pub where_pos: Option<Pos>,
    pub where_expr: Option<Expr>,

    pub order: Option<Pos>,
    pub order_by: Option<Pos>,
    pub ordering_terms: Vec<OrderingTerm>,

    pub limit: Option<Pos>,
    pub limit_expr: Option<Expr>,
    pub offset: Option<Pos>,
    pub offset_comma: Option<Pos>,
    pub offset_expr: Option<Expr>,

    pub returning: Option<ReturningClause>,
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }

        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(where_expr) = &self.where_expr {
            write!(f, " WHERE {where_expr}")?;
        }

        if !self.ordering_terms.is_empty() {
            write!(
                f,
                " ORDER BY {}",
                display_comma_separated(&self.ordering_terms)
            )?;
        }

        if let Some(limit_expr) = &self.limit_expr {
            write!(f, " LIMIT {limit_expr}")?;
            if let Some(offset_expr) = &self.offset_expr {
                write!(f, " OFFSET {offset_expr}")?;
            }
        }

        if let Some(returning) = &self.returning {
            write!(f, " {returning}")?;
        }
        Ok(())
    }
}

/// One assignment of an `UPDATE SET` list: a column or column list and
/// the assigned expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub lparen: Option<Pos>,
    pub columns: Vec<MultiPartIdent>,
    pub rparen: Option<Pos>,
    pub eq: Pos,
    pub expr: Expr,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.columns.len() == 1 {
            write!(f, "{}", self.columns[0])?;
        } else if self.columns.len() > 1 {
            write!(f, "({})", display_comma_separated(&self.columns))?;
        }
        write!(f, " = {}", self.expr)
    }
}

/// A column of an `ON CONFLICT` target list with optional collation and
/// sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedColumn {
    pub x: Expr,
    pub collate: Option<Pos>,
    pub collation: Option<Ident>,
    pub asc: Option<Pos>,
    pub desc: Option<Pos>,
}

impl fmt::Display for IndexedColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.x)?;
        if let Some(collation) = &self.collation {
            write!(f, " COLLATE {collation}")?;
        }
        if self.asc.is_some() {
            f.write_str(" ASC")?;
        } else if self.desc.is_some() {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

/// `CREATE TABLE [IF NOT EXISTS] name (col-defs)` or `... AS select`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CreateTableStatement {
    pub create: Pos,
    pub table: Pos,
    pub if_pos: Option<Pos>,
    pub if_not: Option<Pos>,
    pub if_not_exists: Option<Pos>,
    pub name: MultiPartIdent,

    pub lparen: Option<Pos>,
    pub columns: Vec<ColumnDefinition>,
    pub rparen: Option<Pos>,

    pub as_pos: Option<Pos>,
    pub select: Option<Box<SelectStatement>>,
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("CREATE TABLE")?;
        if self.if_not_exists.is_some() {
            f.write_str(" IF NOT EXISTS")?;
        }
        write!(f, " {}", self.name)?;

        if let Some(select) = &self.select {
            write!(f, " AS {select}")
        } else {
            write!(f, " ({})", display_comma_separated(&self.columns))
        }
    }
}

/// A `name [type]` column definition.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnDefinition {
    pub name: Ident,
    pub ty: Option<Type>,
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ty) = &self.ty {
            write!(f, " {ty}")?;
        }
        Ok(())
    }
}

/// `DROP TABLE [IF EXISTS] name`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DropTableStatement {
    pub drop: Pos,
    pub table: Pos,
    pub if_pos: Option<Pos>,
    pub if_exists: Option<Pos>,
    pub name: MultiPartIdent,
}

impl fmt::Display for DropTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("DROP TABLE")?;
        if self.if_exists.is_some() {
            f.write_str(" IF EXISTS")?;
        }
        write!(f, " {}", self.name)
    }
}

/// One `WHEN [NOT] MATCHED [AND expr] THEN ...` arm of a `MERGE`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchedCondition {
    pub when: Pos,
    pub not: Option<Pos>,
    pub matched: Pos,

    pub and: Option<Pos>,
    pub and_expr: Option<Expr>,
    pub then: Pos,

    pub update: Option<Pos>,
    pub update_set: Option<Pos>,
    pub assignments: Vec<Assignment>,

    pub delete: Option<Pos>,

    pub insert: Option<Pos>,
    pub star: Option<Pos>,
    pub col_list: Option<ExprList>,
    pub values: Option<Pos>,
    pub value_list: Option<ExprList>,
}

impl fmt::Display for MatchedCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("WHEN ")?;
        if self.not.is_some() {
            f.write_str("NOT ")?;
        }
        f.write_str("MATCHED")?;
        if let Some(and_expr) = &self.and_expr {
            write!(f, " AND {and_expr}")?;
        }
        f.write_str(" THEN")?;

        if self.delete.is_some() {
            f.write_str(" DELETE")?;
        } else if self.update.is_some() {
            write!(f, " UPDATE SET {}", display_comma_separated(&self.assignments))?;
        } else if self.insert.is_some() {
            f.write_str(" INSERT")?;
            if self.star.is_some() {
                f.write_str(" *")?;
            } else {
                if let Some(col_list) = &self.col_list {
                    write!(f, " {col_list}")?;
                }
                if let Some(value_list) = &self.value_list {
                    write!(f, " VALUES {value_list}")?;
                }
            }
        }
        Ok(())
    }
}

/// `MERGE INTO target USING source ON expr WHEN ...` arms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergeStatement {
    pub merge: Pos,
    pub into: Pos,

    pub target: Source,
    pub using: Pos,
    pub source: Source,

    pub on: Pos,
    pub on_expr: Expr,

    pub matched: Vec<MatchedCondition>,
}

impl fmt::Display for MergeStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MERGE INTO {} USING {} ON {}",
            self.target, self.source, self.on_expr
        )?;
        for arm in &self.matched {
            write!(f, " {arm}")?;
        }
        Ok(())
    }
}

/// A scripted scalar function definition:
/// `FUNCTION name(params) RETURNS param AS BEGIN expr END`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionStatement {
    pub function: Pos,
    pub name: MultiPartIdent,

    pub lparen: Pos,
    pub params: Vec<ColumnDefinition>,
    pub rparen: Pos,

    pub returns: Pos,
    pub return_param: ColumnDefinition,

    pub as_pos: Pos,
    pub begin: Pos,
    pub fn_expr: Expr,
    pub end: Pos,
}

impl fmt::Display for FunctionStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FUNCTION {}({}) RETURNS {} AS BEGIN {} END",
            self.name,
            display_comma_separated(&self.params),
            self.return_param,
            self.fn_expr
        )
    }
}

/// `TRUNCATE TABLE name`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TruncateStatement {
    pub truncate: Pos,
    pub table: Pos,
    pub name: MultiPartIdent,
}

impl fmt::Display for TruncateStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TRUNCATE TABLE {}", self.name)
    }
}
