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

//! `SELECT` statements and everything that can appear in a `FROM` clause.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use core::fmt;

use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    display_comma_separated, Call, Expr, ExprList, Ident, MultiPartIdent, NumberLit,
};
use crate::pos::Pos;

/// A `SELECT`/`VALUES` statement, possibly compounded with further selects
/// via `UNION`/`INTERSECT`/`EXCEPT`.
///
/// When `compound` is set, exactly one of the `union`, `intersect`, or
/// `except` positions is valid. `ORDER BY` and `LIMIT` belong to the
/// outermost select of a compound chain.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectStatement {
    pub with: Option<WithClause>,

    pub values: Option<Pos>,
    pub value_lists: Vec<ExprList>,

    pub select: Option<Pos>,
    pub distinct: Option<Pos>,
    pub all: Option<Pos>,
    pub columns: Vec<ResultColumn>,

    pub from: Option<Pos>,
    pub source: Option<Source>,

    pub where_pos: Option<Pos>,
    pub where_expr: Option<Expr>,

    pub group: Option<Pos>,
    pub group_by: Option<Pos>,
    pub group_by_all: Option<Pos>,
    pub grouping: Option<Pos>,
    pub grouping_sets: Option<Pos>,
    pub grouping_expr: Option<Expr>,
    pub group_by_exprs: Vec<Expr>,
    pub having: Option<Pos>,
    pub having_expr: Option<Expr>,

    pub qualify: Option<Pos>,
    pub qualify_expr: Option<Expr>,

    pub window: Option<Pos>,
    pub windows: Vec<Window>,

    pub union: Option<Pos>,
    pub union_all: Option<Pos>,
    pub union_dist: Option<Pos>,
    pub intersect: Option<Pos>,
    pub except: Option<Pos>,
    pub compound: Option<Box<SelectStatement>>,

    pub order: Option<Pos>,
    pub order_by: Option<Pos>,
    pub ordering_terms: Vec<OrderingTerm>,

    pub limit: Option<Pos>,
    pub limit_expr: Option<Expr>,
    pub offset: Option<Pos>,
    pub offset_comma: Option<Pos>,
    pub offset_expr: Option<Expr>,
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }

        if !self.value_lists.is_empty() {
            write!(f, "VALUES {}", display_comma_separated(&self.value_lists))?;
        } else {
            f.write_str("SELECT ")?;
            if self.distinct.is_some() {
                f.write_str("DISTINCT ")?;
            } else if self.all.is_some() {
                f.write_str("ALL ")?;
            }
            write!(f, "{}", display_comma_separated(&self.columns))?;

            if let Some(source) = &self.source {
                write!(f, " FROM {source}")?;
            }
            if let Some(where_expr) = &self.where_expr {
                write!(f, " WHERE {where_expr}")?;
            }

            if self.group_by_all.is_some() {
                f.write_str(" GROUP BY ALL")?;
            } else if let Some(grouping_expr) = &self.grouping_expr {
                write!(f, " GROUP BY GROUPING SETS {grouping_expr}")?;
            } else if !self.group_by_exprs.is_empty() {
                write!(
                    f,
                    " GROUP BY {}",
                    display_comma_separated(&self.group_by_exprs)
                )?;
            }
            if let Some(having_expr) = &self.having_expr {
                write!(f, " HAVING {having_expr}")?;
            }
            if let Some(qualify_expr) = &self.qualify_expr {
                write!(f, " QUALIFY {qualify_expr}")?;
            }
            if !self.windows.is_empty() {
                write!(f, " WINDOW {}", display_comma_separated(&self.windows))?;
            }
        }

        if let Some(compound) = &self.compound {
            if self.union.is_some() {
                f.write_str(" UNION")?;
                if self.union_all.is_some() {
                    f.write_str(" ALL")?;
                } else if self.union_dist.is_some() {
                    f.write_str(" DISTINCT")?;
                }
            } else if self.intersect.is_some() {
                f.write_str(" INTERSECT")?;
            } else if self.except.is_some() {
                f.write_str(" EXCEPT")?;
            }
            write!(f, " {compound}")?;
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

        Ok(())
    }
}

/// The `WITH [RECURSIVE]` clause introducing common table expressions.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WithClause {
    pub with: Pos,
    pub recursive: Option<Pos>,
    pub ctes: Vec<Cte>,
}

impl fmt::Display for WithClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("WITH ")?;
        if self.recursive.is_some() {
            f.write_str("RECURSIVE ")?;
        }
        write!(f, "{}", display_comma_separated(&self.ctes))
    }
}

/// A single common table expression: `name [(cols)] AS (select)`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cte {
    pub table_name: Ident,
    pub columns_lparen: Option<Pos>,
    pub columns: Vec<Ident>,
    pub columns_rparen: Option<Pos>,
    pub as_pos: Pos,
    pub select_lparen: Pos,
    pub select: Box<SelectStatement>,
    pub select_rparen: Pos,
}

impl fmt::Display for Cte {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.table_name)?;
        if !self.columns.is_empty() {
            write!(f, " ({})", display_comma_separated(&self.columns))?;
        }
        write!(f, " AS ({})", self.select)
    }
}

/// One result column of a `SELECT`: `*`, `expr`, or a qualified `tbl.*`,
/// each optionally modified by `EXCEPT`, `WITHIN GROUP`, and an alias.
/// A `star` column carries no expression and no alias.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultColumn {
    pub star: Option<Pos>,
    pub expr: Option<Expr>,
    pub except: Option<Pos>,
    pub except_expr: Option<Expr>,
    pub within: Option<Within>,
    pub as_pos: Option<Pos>,
    pub alias: Option<Ident>,
}

impl fmt::Display for ResultColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.star.is_some() {
            f.write_str("*")?;
        } else if let Some(expr) = &self.expr {
            write!(f, "{expr}")?;
        }
        if let Some(except_expr) = &self.except_expr {
            write!(f, " EXCEPT {except_expr}")?;
        }
        if let Some(within) = &self.within {
            write!(f, " {within}")?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

/// The `WITHIN GROUP (ORDER BY ... [LIMIT ...])[index]` suffix of an
/// ordered-set aggregate. Lives on the result column, not on the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Within {
    pub within: Pos,
    pub group: Pos,
    pub lparen: Pos,
    pub order: Pos,
    pub order_by: Pos,
    pub ordering_term: Box<OrderingTerm>,
    pub limit: Option<Pos>,
    pub limit_expr: Option<Expr>,
    pub rparen: Pos,
    pub lbrack: Option<Pos>,
    pub index: Option<NumberLit>,
    pub rbrack: Option<Pos>,
}

impl fmt::Display for Within {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WITHIN GROUP (ORDER BY {}", self.ordering_term)?;
        if let Some(limit_expr) = &self.limit_expr {
            write!(f, " LIMIT {limit_expr}")?;
        }
        f.write_str(")")?;
        if let Some(index) = &self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// A table or subquery: anything that can appear in a `FROM` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Source {
    Table(QualifiedTableName),
    TableFunction(QualifiedTableFunctionName),
    Paren(ParenSource),
    Join(Box<JoinClause>),
    Select(Box<SelectStatement>),
}

impl Source {
    /// Calls `f` for this source and every source nested within it,
    /// stopping early when `f` returns false. Returns whether the walk ran
    /// to completion.
    pub fn for_each<'a>(&'a self, f: &mut impl FnMut(&'a Source) -> bool) -> bool {
        if !f(self) {
            return false;
        }
        match self {
            Source::Join(join) => join.x.for_each(f) && join.y.for_each(f),
            Source::Select(select) => match &select.source {
                Some(source) => source.for_each(f),
                None => true,
            },
            Source::Paren(paren) => paren.source.for_each(f),
            _ => true,
        }
    }

    /// All sources in this scope, outermost first.
    pub fn flatten(&self) -> Vec<&Source> {
        let mut sources = Vec::new();
        self.for_each(&mut |source| {
            sources.push(source);
            true
        });
        sources
    }

    /// Finds the source answering to `name`, either by table name or by
    /// alias.
    pub fn resolve(&self, name: &str) -> Option<&Source> {
        let mut found = None;
        self.for_each(&mut |source| {
            let matches = match source {
                Source::Table(table) => table.table_name() == name,
                Source::Paren(paren) => {
                    paren.alias.as_ref().map(|a| a.name.as_str()) == Some(name)
                }
                Source::TableFunction(func) => func.table_name() == name,
                _ => false,
            };
            if matches {
                found = Some(source);
            }
            found.is_none()
        });
        found
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Table(x) => x.fmt(f),
            Source::TableFunction(x) => x.fmt(f),
            Source::Paren(x) => x.fmt(f),
            Source::Join(x) => x.fmt(f),
            Source::Select(x) => x.fmt(f),
        }
    }
}

/// A named table in a `FROM` clause, with optional alias and lateral views.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualifiedTableName {
    pub name: MultiPartIdent,
    pub as_pos: Option<Pos>,
    pub alias: Option<Ident>,
    pub lateral_views: Vec<LateralView>,
}

impl QualifiedTableName {
    /// The name this table answers to: the alias when one is given,
    /// otherwise the final name segment.
    pub fn table_name(&self) -> &str {
        match &self.alias {
            Some(alias) if !alias.name.is_empty() => &alias.name,
            _ => self.name.last_name(),
        }
    }
}

impl fmt::Display for QualifiedTableName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        for view in &self.lateral_views {
            write!(f, " {view}")?;
        }
        Ok(())
    }
}

/// `LATERAL VIEW [OUTER] udtf(args) table_alias AS col_alias, ...`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LateralView {
    pub lateral: Pos,
    pub view: Pos,
    pub outer: Option<Pos>,
    pub udtf: Call,
    pub table_alias: Ident,
    pub as_pos: Pos,
    pub col_aliases: Vec<Ident>,
}

impl fmt::Display for LateralView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("LATERAL VIEW ")?;
        if self.outer.is_some() {
            f.write_str("OUTER ")?;
        }
        write!(
            f,
            "{} {} AS {}",
            self.udtf,
            self.table_alias,
            self.col_aliases.iter().format(", ")
        )
    }
}

/// A table function in a `FROM` clause: `name(args) [AS alias]`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualifiedTableFunctionName {
    pub name: Ident,
    pub lparen: Pos,
    pub args: Vec<Expr>,
    pub rparen: Pos,
    pub as_pos: Option<Pos>,
    pub alias: Option<Ident>,
}

impl QualifiedTableFunctionName {
    /// The name this source answers to: the alias when one is given,
    /// otherwise the function name.
    pub fn table_name(&self) -> &str {
        match &self.alias {
            Some(alias) if !alias.name.is_empty() => &alias.name,
            _ => &self.name.name,
        }
    }
}

impl fmt::Display for QualifiedTableFunctionName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, display_comma_separated(&self.args))?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

/// A parenthesized source, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParenSource {
    pub lparen: Pos,
    pub source: Box<Source>,
    pub rparen: Pos,
    pub as_pos: Option<Pos>,
    pub alias: Option<Ident>,
}

impl fmt::Display for ParenSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(alias) = &self.alias {
            write!(f, "({}) AS {}", self.source, alias)
        } else {
            write!(f, "({})", self.source)
        }
    }
}

/// A join of two sources. Trees are normalized so that a nested join
/// only ever appears in `y`; `x` is never itself a `JoinClause`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinClause {
    pub x: Source,
    pub operator: JoinOperator,
    pub y: Source,
    pub constraint: Option<JoinConstraint>,
}

impl fmt::Display for JoinClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The right-nested tree prints back in source order: each level's
        // constraint attaches right after its own Y's left-most table.
        fn write_rhs(
            f: &mut fmt::Formatter,
            y: &Source,
            constraint: Option<&JoinConstraint>,
        ) -> fmt::Result {
            match y {
                Source::Join(join) => {
                    write!(f, "{}", join.x)?;
                    if let Some(constraint) = constraint {
                        write!(f, " {constraint}")?;
                    }
                    write!(f, "{}", join.operator)?;
                    write_rhs(f, &join.y, join.constraint.as_ref())
                }
                y => {
                    write!(f, "{y}")?;
                    if let Some(constraint) = constraint {
                        write!(f, " {constraint}")?;
                    }
                    Ok(())
                }
            }
        }

        write!(f, "{}{}", self.x, self.operator)?;
        write_rhs(f, &self.y, self.constraint.as_ref())
    }
}

/// The operator between two joined sources: a bare comma, or some subset
/// of `NATURAL`, `LEFT [OUTER]`, `INNER`, `CROSS`, `FULL [OUTER]`
/// followed by `JOIN`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinOperator {
    pub comma: Option<Pos>,
    pub natural: Option<Pos>,
    pub left: Option<Pos>,
    pub outer: Option<Pos>,
    pub full: Option<Pos>,
    pub inner: Option<Pos>,
    pub cross: Option<Pos>,
    pub join: Option<Pos>,
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.comma.is_some() {
            return f.write_str(", ");
        }

        if self.natural.is_some() {
            f.write_str(" NATURAL")?;
        }
        if self.left.is_some() {
            f.write_str(" LEFT")?;
            if self.outer.is_some() {
                f.write_str(" OUTER")?;
            }
        } else if self.inner.is_some() {
            f.write_str(" INNER")?;
        } else if self.cross.is_some() {
            f.write_str(" CROSS")?;
        } else if self.full.is_some() {
            f.write_str(" FULL")?;
            if self.outer.is_some() {
                f.write_str(" OUTER")?;
            }
        }
        f.write_str(" JOIN ")
    }
}

/// An `ON ...` or `USING (...)` join constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinConstraint {
    On(OnConstraint),
    Using(UsingConstraint),
}

impl fmt::Display for JoinConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JoinConstraint::On(x) => x.fmt(f),
            JoinConstraint::Using(x) => x.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OnConstraint {
    pub on: Pos,
    pub x: Expr,
}

impl fmt::Display for OnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ON {}", self.x)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsingConstraint {
    pub using: Pos,
    pub lparen: Pos,
    pub columns: Vec<Ident>,
    pub rparen: Pos,
}

impl fmt::Display for UsingConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "USING ({})", display_comma_separated(&self.columns))
    }
}

/// The `OVER` suffix of a window function call: either a window name or
/// an inline definition.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverClause {
    pub over: Pos,
    pub name: Option<Ident>,
    pub definition: Option<WindowDefinition>,
}

impl fmt::Display for OverClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "OVER {name}")
        } else if let Some(definition) = &self.definition {
            write!(f, "OVER {definition}")
        } else {
            f.write_str("OVER")
        }
    }
}

/// A named window in the `WINDOW` clause.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Window {
    pub name: Ident,
    pub as_pos: Pos,
    pub definition: WindowDefinition,
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} AS {}", self.name, self.definition)
    }
}

/// `( [base] [PARTITION BY exprs] [ORDER BY terms] )`
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowDefinition {
    pub lparen: Pos,
    pub base: Option<Ident>,
    pub partition: Option<Pos>,
    pub partition_by: Option<Pos>,
    pub partitions: Vec<Expr>,
    pub order: Option<Pos>,
    pub order_by: Option<Pos>,
    pub ordering_terms: Vec<OrderingTerm>,
    pub rparen: Pos,
}

impl fmt::Display for WindowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        let mut wrote = false;
        if let Some(base) = &self.base {
            write!(f, "{base}")?;
            wrote = true;
        }
        if !self.partitions.is_empty() {
            if wrote {
                f.write_str(" ")?;
            }
            write!(f, "PARTITION BY {}", display_comma_separated(&self.partitions))?;
            wrote = true;
        }
        if !self.ordering_terms.is_empty() {
            if wrote {
                f.write_str(" ")?;
            }
            write!(f, "ORDER BY {}", display_comma_separated(&self.ordering_terms))?;
        }
        f.write_str(")")
    }
}

/// One term of an `ORDER BY` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderingTerm {
    pub x: Expr,
    pub asc: Option<Pos>,
    pub desc: Option<Pos>,
    pub nulls: Option<Pos>,
    pub nulls_first: Option<Pos>,
    pub nulls_last: Option<Pos>,
}

impl OrderingTerm {
    pub fn new(x: Expr) -> Self {
        OrderingTerm {
            x,
            asc: None,
            desc: None,
            nulls: None,
            nulls_first: None,
            nulls_last: None,
        }
    }
}

impl fmt::Display for OrderingTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.x)?;
        if self.asc.is_some() {
            f.write_str(" ASC")?;
        } else if self.desc.is_some() {
            f.write_str(" DESC")?;
        }
        if self.nulls_first.is_some() {
            f.write_str(" NULLS FIRST")?;
        } else if self.nulls_last.is_some() {
            f.write_str(" NULLS LAST")?;
        }
        Ok(())
    }
}
