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

//! SQL parser: a Pratt expression parser and a recursive-descent statement
//! parser over a single-token lookahead.
//!
//! The parser stops at the first mismatch and reports it with its position;
//! no recovery is attempted.

#[cfg(not(feature = "std"))]
use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use core::fmt;

use itertools::Itertools;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ast::{
    Assignment, BinaryExpr, BlobLit, BoolLit, Call, CaseBlock, CaseExpr, CastExpr,
    ColumnDefinition,
    CreateTableStatement, Cte, DeclarationStatement, DeleteStatement, DropTableStatement,
    Exists, Expr, ExprList, FunctionStatement, Ident, IndexExpr, IndexedColumn, InsertStatement,
    IntervalLit, JoinClause, JoinConstraint, JoinOperator, LateralView, MatchedCondition,
    MergeStatement, MultiPartIdent, NullCheck, NullLit, NumberLit, OnConstraint, OrderingTerm,
    OverClause, Param, ParenExpr, ParenSource, QualifiedRef, QualifiedTableFunctionName,
    QualifiedTableName, Range, RawLit, ResultColumn, ReturningClause, SelectStatement,
    SetStatement, Source, Statement, StringLit, TemplateStr, TruncateStatement, Type,
    UnaryExpr, UpsertClause, UsingConstraint, Window, WindowDefinition, WithClause, Within,
};
use crate::keywords;
use crate::pos::Pos;
use crate::scanner::Scanner;
use crate::token::{Token, LOWEST_PREC};

/// A positioned syntax error. The message begins with
/// `expected <constructs>, found <token>`; the string form is
/// `line:column: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

impl ParseError {
    pub fn new<S: Into<String>>(pos: Pos, message: S) -> Self {
        ParseError {
            pos,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.pos.is_valid() {
            write!(f, "{}: {}", self.pos, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Parses a single expression from `sql`.
pub fn parse_expression(sql: &str) -> Result<Expr, ParseError> {
    Parser::new(sql).parse_expr()
}

/// Parses exactly one statement; the remainder of the input must be empty
/// apart from semicolons and whitespace.
pub fn parse_statement(sql: &str) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(sql);
    let stmt = parser.parse_statement()?;
    loop {
        match parser.peek() {
            Token::Semi => {
                parser.scan();
            }
            Token::Eof => return Ok(stmt),
            _ => return Err(parser.error_expected(parser.pos, parser.tok, "semicolon or EOF")),
        }
    }
}

/// Parses a semicolon-separated script; empty statements are skipped.
/// Empty input yields an empty list.
pub fn parse_statements(sql: &str) -> Result<Vec<Statement>, ParseError> {
    let mut parser = Parser::new(sql);
    let mut stmts = Vec::new();
    loop {
        while parser.peek() == Token::Semi {
            parser.scan();
        }
        if parser.peek() == Token::Eof {
            return Ok(stmts);
        }
        stmts.push(parser.parse_statement()?);
    }
}

/// The parser. Owns the scanner plus a single lookahead slot; `unscan` is
/// only valid immediately after `scan`, never twice in a row.
pub struct Parser<'a> {
    scanner: Scanner<'a>,

    pos: Pos,
    tok: Token,
    lit: String,
    full: bool,
}

impl<'a> Parser<'a> {
    pub fn new(sql: &'a str) -> Parser<'a> {
        Parser {
            scanner: Scanner::new(sql),
            pos: Pos::default(),
            tok: Token::Illegal,
            lit: String::new(),
            full: false,
        }
    }

    fn scan(&mut self) -> (Pos, Token, String) {
        if self.full {
            self.full = false;
            return (self.pos, self.tok, self.lit.clone());
        }

        // Comments are tokens at the scanner layer but invisible here.
        loop {
            let (pos, tok, lit) = self.scanner.scan();
            if tok != Token::Comment {
                self.pos = pos;
                self.tok = tok;
                self.lit = lit;
                return (self.pos, self.tok, self.lit.clone());
            }
        }
    }

    fn peek(&mut self) -> Token {
        if !self.full {
            self.scan();
            self.unscan();
        }
        self.tok
    }

    fn unscan(&mut self) {
        debug_assert!(!self.full);
        self.full = true;
    }

    fn expect(&mut self, tok: Token, desc: &str) -> Result<Pos, ParseError> {
        if self.peek() == tok {
            Ok(self.scan().0)
        } else {
            Err(self.error_expected(self.pos, self.tok, desc))
        }
    }

    fn error_expected(&self, pos: Pos, tok: Token, msg: &str) -> ParseError {
        let mut message = format!("expected {msg}");
        if pos == self.pos {
            // Literals and illegal tokens surface their collected text.
            if self.tok.is_literal() || self.tok == Token::Illegal {
                message.push_str(&format!(", found {}", self.lit));
            } else {
                message.push_str(&format!(", found '{tok}'"));
            }
        }
        ParseError::new(pos, message)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Parses a single expression.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_expr(LOWEST_PREC + 1)
    }

    fn parse_binary_expr(&mut self, prec1: u8) -> Result<Expr, ParseError> {
        let mut x = self.parse_operand()?;
        loop {
            if self.peek().precedence() < prec1 {
                return Ok(x);
            }

            let (pos, op) = self.scan_binary_op()?;
            match op {
                Token::IsNull | Token::NotNull => {
                    x = Expr::NullCheck(NullCheck {
                        x: Box::new(x),
                        op_pos: pos,
                        op,
                    });
                }
                Token::In | Token::NotIn => {
                    let list = self.parse_expr_list()?;
                    x = Expr::Binary(BinaryExpr {
                        x: Box::new(x),
                        op_pos: pos,
                        op,
                        y: Box::new(Expr::List(list)),
                    });
                }
                Token::Between | Token::NotBetween => {
                    // The range parses as a binary AND; anything else is not
                    // a range. The boolean AND and the ranged AND must not be
                    // conflated, so the result converts to a Range.
                    let rng = self.parse_binary_expr(LOWEST_PREC + 1)?;
                    match rng {
                        Expr::Binary(b) if b.op == Token::And => {
                            let range = Range {
                                x: b.x,
                                and: b.op_pos,
                                y: b.y,
                            };
                            x = Expr::Binary(BinaryExpr {
                                x: Box::new(x),
                                op_pos: pos,
                                op,
                                y: Box::new(Expr::Range(range)),
                            });
                        }
                        _ => {
                            return Err(self.error_expected(
                                self.pos,
                                self.tok,
                                "range expression",
                            ))
                        }
                    }
                }
                Token::Lsb => {
                    let index = self.parse_expr()?;
                    let rbrack = self.expect(Token::Rsb, "right bracket")?;
                    x = Expr::Index(IndexExpr {
                        x: Box::new(x),
                        lbrack: pos,
                        index: Box::new(index),
                        rbrack,
                    });
                }
                _ => {
                    let y = self.parse_binary_expr(op.precedence() + 1)?;
                    x = Expr::Binary(BinaryExpr {
                        x: Box::new(x),
                        op_pos: pos,
                        op,
                        y: Box::new(y),
                    });
                }
            }
        }
    }

    /// Scans the next operator, fusing multi-word operators (`IS NOT`,
    /// `NOT BETWEEN`, ...) into their single synthesized tokens.
    fn scan_binary_op(&mut self) -> Result<(Pos, Token), ParseError> {
        let (pos, tok, _) = self.scan();
        match tok {
            Token::Is => {
                if self.peek() == Token::Not {
                    self.scan();
                    Ok((pos, Token::IsNot))
                } else if self.peek() == Token::Null {
                    self.scan();
                    Ok((pos, Token::IsNull))
                } else {
                    Ok((pos, Token::Is))
                }
            }
            Token::Not => match self.peek() {
                Token::In => {
                    self.scan();
                    Ok((pos, Token::NotIn))
                }
                Token::Like => {
                    self.scan();
                    Ok((pos, Token::NotLike))
                }
                Token::Glob => {
                    self.scan();
                    Ok((pos, Token::NotGlob))
                }
                Token::Regexp => {
                    self.scan();
                    Ok((pos, Token::NotRegexp))
                }
                Token::Match => {
                    self.scan();
                    Ok((pos, Token::NotMatch))
                }
                Token::Between => {
                    self.scan();
                    Ok((pos, Token::NotBetween))
                }
                Token::Null => {
                    self.scan();
                    Ok((pos, Token::NotNull))
                }
                _ => Err(self.error_expected(
                    self.pos,
                    self.tok,
                    "IN, LIKE, GLOB, REGEXP, MATCH, BETWEEN, IS/NOT NULL",
                )),
            },
            _ => Ok((pos, tok)),
        }
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let (pos, tok, lit) = self.scan();
        match tok {
            Token::Interval => self.parse_interval(pos),
            t if t.is_expr_ident() => self.parse_identifier_expr(pos, t, lit),
            Token::String => Ok(Expr::String(StringLit { pos, value: lit })),
            Token::Tmpl => Ok(Expr::Template(TemplateStr {
                pos,
                template: lit,
            })),
            Token::RawStr => Ok(Expr::Raw(RawLit { pos, value: lit })),
            Token::Blob => Ok(Expr::Blob(BlobLit { pos, value: lit })),
            Token::Float | Token::Integer => Ok(Expr::Number(NumberLit { pos, value: lit })),
            Token::Null => Ok(Expr::Null(NullLit { pos })),
            Token::True | Token::False => Ok(Expr::Bool(BoolLit {
                pos,
                value: tok == Token::True,
            })),
            Token::Plus | Token::Minus | Token::BitNot => {
                let x = self.parse_operand()?;
                Ok(Expr::Unary(UnaryExpr {
                    op_pos: pos,
                    op: tok,
                    x: Box::new(x),
                }))
            }
            Token::Lp => {
                self.unscan();
                self.parse_paren_expr()
            }
            Token::Not => {
                if self.peek() == Token::Exists {
                    self.parse_exists(Some(pos))
                } else {
                    let x = self.parse_operand()?;
                    Ok(Expr::Unary(UnaryExpr {
                        op_pos: pos,
                        op: tok,
                        x: Box::new(x),
                    }))
                }
            }
            Token::Case => self.parse_case_expr(pos),
            Token::Cast => self.parse_cast_expr(pos),
            Token::Exists => {
                self.unscan();
                self.parse_exists(None)
            }
            Token::Select | Token::Values => {
                self.unscan();
                let stmt = self.parse_select_statement(false, None)?;
                Ok(Expr::Select(Box::new(stmt)))
            }
            Token::With => {
                self.unscan();
                self.parse_with_expr()
            }
            _ => Err(self.error_expected(self.pos, self.tok, "expression")),
        }
    }

    /// Parses an identifier expression: dialect fusions first
    /// (`DATE '...'`, `DAY FROM f(...)`), then up to three dot-separated
    /// continuations, then `.*` and call promotion.
    fn parse_identifier_expr(
        &mut self,
        pos: Pos,
        tok: Token,
        lit: String,
    ) -> Result<Expr, ParseError> {
        let mut name = lit;
        if matches!(tok, Token::Date | Token::Timestamp) && self.peek() == Token::String {
            let (_, _, s) = self.scan();
            name = format!("{name} '{s}'");
        } else if tok == Token::Ident
            && self.peek() == Token::From
            && matches!(name.to_uppercase().as_str(), "DAY" | "MONTH" | "YEAR")
        {
            self.scan();
            let (_, t2, lit2) = self.scan();
            if !(t2.is_ident_token() || t2.is_expr_ident() || t2.is_bare_keyword()) {
                return Err(self.error_expected(self.pos, self.tok, "expression"));
            }
            name = format!("{name} FROM {lit2}");
        }
        let first = Ident::with_token(pos, name, tok);

        let mut parts = vec![first];
        let mut dots = Vec::new();
        while self.peek() == Token::Dot {
            if parts.len() == 4 {
                return Err(ParseError::new(self.pos, "Found extra . in input"));
            }
            let (dot_pos, _, _) = self.scan();
            match self.peek() {
                Token::Star => {
                    let (star_pos, _, _) = self.scan();
                    return Ok(Expr::QualifiedRef(QualifiedRef {
                        name: assemble_multi_ident(parts, dots),
                        dot: dot_pos,
                        star: star_pos,
                    }));
                }
                Token::Dot => return Err(ParseError::new(self.pos, "Found .. in input")),
                _ => {
                    let part = self.parse_ident_part()?;
                    dots.push(dot_pos);
                    parts.push(part);
                }
            }
        }

        let name = assemble_multi_ident(parts, dots);
        if self.peek() == Token::Lp {
            return self.parse_call(name).map(Expr::Call);
        }
        Ok(Expr::MultiPart(name))
    }

    /// One dotted continuation segment.
    fn parse_ident_part(&mut self) -> Result<Ident, ParseError> {
        let (pos, tok, lit) = self.scan();
        if tok.is_ident_token() || tok.is_expr_ident() || tok.is_bare_keyword() {
            Ok(Ident::with_token(pos, lit, tok))
        } else if tok == Token::Null {
            Ok(Ident::with_token(pos, lit, Token::Ident))
        } else {
            Err(self.error_expected(pos, tok, "identifier"))
        }
    }

    /// A plain identifier: quoted or unquoted, bind, template, `NULL`, or a
    /// bare keyword.
    fn parse_ident(&mut self, desc: &str) -> Result<Ident, ParseError> {
        let (pos, tok, lit) = self.scan();
        if tok.is_ident_token() {
            Ok(Ident::with_token(pos, lit, tok))
        } else if tok == Token::Null || tok.is_bare_keyword() {
            Ok(Ident::with_token(pos, lit, Token::Ident))
        } else {
            Err(self.error_expected(pos, tok, desc))
        }
    }

    /// A multi-part name in table position; `.*` is not allowed here.
    fn parse_multi_ident(&mut self, first: Ident) -> Result<MultiPartIdent, ParseError> {
        let mut parts = vec![first];
        let mut dots = Vec::new();
        while self.peek() == Token::Dot {
            if parts.len() == 4 {
                return Err(ParseError::new(self.pos, "Found extra . in input"));
            }
            let (dot_pos, _, _) = self.scan();
            if self.peek() == Token::Dot {
                return Err(ParseError::new(self.pos, "Found .. in input"));
            }
            let part = self.parse_ident_part()?;
            dots.push(dot_pos);
            parts.push(part);
        }
        Ok(assemble_multi_ident(parts, dots))
    }

    fn parse_interval(&mut self, pos: Pos) -> Result<Expr, ParseError> {
        if self.peek() != Token::Integer {
            return Err(self.error_expected(self.pos, self.tok, "integer"));
        }
        let (_, _, value) = self.scan();
        let (_, _, unit) = self.scan();
        Ok(Expr::Interval(IntervalLit {
            interval: pos,
            value,
            unit,
        }))
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        let (lparen, _, _) = self.scan();

        let x = self.parse_expr()?;

        // No comma: an ordinary parenthesized expression. A comma promotes
        // it to an expression list.
        if self.peek() != Token::Comma {
            let rparen = self.expect(Token::Rp, "right paren")?;
            return Ok(Expr::Paren(ParenExpr {
                lparen,
                x: Box::new(x),
                rparen,
            }));
        }

        let mut list = ExprList {
            lparen,
            exprs: vec![x],
            rparen: Pos::default(),
        };
        while self.peek() == Token::Comma {
            self.scan();
            list.exprs.push(self.parse_expr()?);
        }
        list.rparen = self.expect(Token::Rp, "right paren")?;
        Ok(Expr::List(list))
    }

    fn parse_expr_list(&mut self) -> Result<ExprList, ParseError> {
        if self.peek() != Token::Lp {
            return Err(self.error_expected(self.pos, self.tok, "left paren"));
        }
        let mut list = ExprList {
            lparen: self.scan().0,
            exprs: Vec::new(),
            rparen: Pos::default(),
        };

        while self.peek() != Token::Rp {
            list.exprs.push(self.parse_expr()?);

            if self.peek() == Token::Rp {
                break;
            } else if self.peek() != Token::Comma {
                return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
            }
            self.scan();
        }
        list.rparen = self.scan().0;
        Ok(list)
    }

    fn parse_call(&mut self, name: MultiPartIdent) -> Result<Call, ParseError> {
        let mut call = Call {
            name,
            lparen: self.scan().0,
            ..Call::default()
        };

        if self.peek() == Token::Star {
            call.star = Some(self.scan().0);
        } else {
            // DISTINCT is positional, not an argument.
            if self.peek() == Token::Distinct {
                call.distinct = Some(self.scan().0);
            }
            while self.peek() != Token::Rp {
                let x = self.parse_expr()?;
                let mut param = Param::new(x);
                if self.peek() == Token::As {
                    param.as_pos = Some(self.scan().0);
                    param.ty = Some(self.parse_type()?);
                }
                call.args.push(param);

                if self.peek() == Token::Rp {
                    break;
                } else if self.peek() != Token::Comma {
                    return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
                }
                self.scan();
            }
        }
        call.rparen = self.expect(Token::Rp, "right paren")?;

        if self.peek() == Token::Over {
            call.over = Some(self.parse_over_clause()?);
        }
        Ok(call)
    }

    fn parse_case_expr(&mut self, case: Pos) -> Result<Expr, ParseError> {
        let mut operand = None;
        if self.peek() != Token::When {
            operand = Some(Box::new(self.parse_expr()?));
        }

        let mut blocks = Vec::new();
        while self.peek() == Token::When {
            let when = self.scan().0;
            let condition = self.parse_expr()?;
            let then = self.expect(Token::Then, "THEN")?;
            let body = self.parse_expr()?;
            blocks.push(CaseBlock {
                when,
                condition,
                then,
                body,
            });
        }

        let mut else_pos = None;
        let mut else_expr = None;
        if self.peek() == Token::Else {
            else_pos = Some(self.scan().0);
            else_expr = Some(Box::new(self.parse_expr()?));
        }
        let end = self.expect(Token::End, "END")?;

        Ok(Expr::Case(CaseExpr {
            case,
            operand,
            blocks,
            else_pos,
            else_expr,
            end,
        }))
    }

    fn parse_cast_expr(&mut self, cast: Pos) -> Result<Expr, ParseError> {
        let lparen = self.expect(Token::Lp, "left paren")?;
        let x = self.parse_expr()?;
        let as_pos = self.expect(Token::As, "AS")?;
        let ty = self.parse_type()?;
        let rparen = self.expect(Token::Rp, "right paren")?;
        Ok(Expr::Cast(CastExpr {
            cast,
            lparen,
            x: Box::new(x),
            as_pos,
            ty,
            rparen,
        }))
    }

    fn parse_exists(&mut self, not: Option<Pos>) -> Result<Expr, ParseError> {
        let exists = self.expect(Token::Exists, "EXISTS")?;
        let lparen = self.expect(Token::Lp, "left paren")?;
        let select = self.parse_select_statement(false, None)?;
        let rparen = self.expect(Token::Rp, "right paren")?;
        Ok(Expr::Exists(Exists {
            not,
            exists,
            lparen,
            select: Box::new(select),
            rparen,
        }))
    }

    fn parse_with_expr(&mut self) -> Result<Expr, ParseError> {
        let with = self.parse_with_clause()?;
        match self.peek() {
            Token::Select | Token::Values => {
                let stmt = self.parse_select_statement(false, Some(with))?;
                Ok(Expr::Select(Box::new(stmt)))
            }
            _ => Err(self.error_expected(self.pos, self.tok, "SELECT or VALUES")),
        }
    }

    /// Parses a type reference: a possibly multi-word name plus optional
    /// precision and scale.
    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let (pos, tok, lit) = self.scan();
        let ok = tok == Token::Ident
            || tok == Token::Null
            || tok.is_bare_keyword()
            || keywords::is_type_name(&lit);
        if !ok {
            return Err(self.error_expected(pos, tok, "type name"));
        }

        // Multi-word names (CHARACTER VARYING) concatenate into one.
        let mut name = lit;
        while self.peek() == Token::Ident {
            let (_, _, word) = self.scan();
            name.push(' ');
            name.push_str(&word);
        }

        let mut ty = Type {
            name: Ident::with_token(pos, name, tok),
            ..Type::default()
        };
        if self.peek() == Token::Lp {
            ty.lparen = Some(self.scan().0);
            ty.precision = Some(self.parse_signed_number("precision")?);
            if self.peek() == Token::Comma {
                self.scan();
                ty.scale = Some(self.parse_signed_number("scale")?);
            }
            ty.rparen = Some(self.expect(Token::Rp, "right paren")?);
        }
        Ok(ty)
    }

    fn parse_signed_number(&mut self, desc: &str) -> Result<NumberLit, ParseError> {
        let (pos, mut tok, mut lit) = self.scan();

        // Fold a leading sign into the number value.
        if tok == Token::Plus || tok == Token::Minus {
            let prefix = lit;
            let (_, t2, l2) = self.scan();
            tok = t2;
            lit = format!("{prefix}{l2}");
        }

        match tok {
            Token::Float | Token::Integer => Ok(NumberLit::new(pos, lit)),
            _ => Err(self.error_expected(self.pos, self.tok, desc)),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Parses one statement, skipping leading semicolons and consuming the
    /// single trailing semicolon (or end of input) after it.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        while self.peek() == Token::Semi {
            self.scan();
        }
        debug!("parsing statement at {}", self.pos);
        if self.peek() == Token::Eof {
            return Err(self.error_expected(self.pos, self.tok, "statement"));
        }

        let stmt = self.parse_statement_inner()?;

        match self.peek() {
            Token::Semi | Token::Eof => {
                self.scan();
            }
            _ => return Err(self.error_expected(self.pos, self.tok, "semicolon or EOF")),
        }
        Ok(stmt)
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, ParseError> {
        match self.peek() {
            Token::Bind => self.parse_declaration_statement(),
            Token::Set => self.parse_set_statement(),
            Token::Merge => self.parse_merge_statement(),
            Token::Create => self.parse_create_table_statement(),
            Token::Drop => self.parse_drop_table_statement(),
            Token::Truncate => self.parse_truncate_statement(),
            Token::Function => self.parse_function_statement(),
            Token::Select | Token::Values => {
                let stmt = self.parse_select_statement(false, None)?;
                Ok(Statement::Select(Box::new(stmt)))
            }
            Token::Insert | Token::Replace => self.parse_insert_statement(None),
            Token::Delete => self.parse_delete_statement(None),
            Token::With => self.parse_with_statement(),
            _ => Err(self.error_expected(self.pos, self.tok, "statement")),
        }
    }

    /// The statement kind is unknown until after the CTEs, so the WITH
    /// clause parses first and passes into the statement it introduces.
    fn parse_with_statement(&mut self) -> Result<Statement, ParseError> {
        let with = self.parse_with_clause()?;
        match self.peek() {
            Token::Select | Token::Values => {
                let stmt = self.parse_select_statement(false, Some(with))?;
                Ok(Statement::Select(Box::new(stmt)))
            }
            Token::Insert | Token::Replace => self.parse_insert_statement(Some(with)),
            Token::Delete => self.parse_delete_statement(Some(with)),
            _ => Err(self.error_expected(
                self.pos,
                self.tok,
                "SELECT, VALUES, INSERT, REPLACE, UPDATE, or DELETE",
            )),
        }
    }

    fn parse_declaration_statement(&mut self) -> Result<Statement, ParseError> {
        let (pos, tok, lit) = self.scan();
        let name = Ident::with_token(pos, lit, tok);

        let mut type_expr = None;
        let mut value = None;
        if self.peek() == Token::Assign {
            self.scan();

            let expr = self.parse_expr()?;
            if self.peek() != Token::Semi {
                // Two expressions: the first is the type, the second the
                // value.
                let expr2 = self.parse_expr()?;
                type_expr = Some(expr);
                value = Some(expr2);
            } else {
                value = Some(expr);
            }
        } else {
            type_expr = Some(self.parse_expr()?);
        }

        Ok(Statement::Declaration(Box::new(DeclarationStatement {
            name,
            type_expr,
            value,
        })))
    }

    fn parse_set_statement(&mut self) -> Result<Statement, ParseError> {
        let set = self.scan().0;

        let mut parts: Vec<String> = Vec::new();
        loop {
            match self.peek() {
                Token::Eq => break,
                Token::Eof => {
                    return Err(self.error_expected(self.pos, self.tok, "="));
                }
                Token::Dot => {
                    self.scan();
                    parts.push(".".to_string());
                }
                _ => {
                    let (_, _, lit) = self.scan();
                    parts.push(lit);
                }
            }
        }
        let key = parts.iter().join("");

        let equal = self.scan().0;
        let (_, _, value) = self.scan();

        Ok(Statement::Set(SetStatement {
            set,
            key,
            equal,
            value,
        }))
    }

    fn parse_insert_statement(
        &mut self,
        with: Option<WithClause>,
    ) -> Result<Statement, ParseError> {
        let mut stmt = InsertStatement {
            with,
            ..InsertStatement::default()
        };

        if self.peek() == Token::Insert {
            stmt.insert = Some(self.scan().0);
        } else {
            stmt.replace = Some(self.scan().0);
        }

        match self.peek() {
            Token::Into => stmt.into = Some(self.scan().0),
            Token::Overwrite => stmt.overwrite = Some(self.scan().0),
            _ => return Err(self.error_expected(self.pos, self.tok, "INTO or OVERWRITE")),
        }
        if self.peek() == Token::Table {
            stmt.table_kw = Some(self.scan().0);
        }

        let first = self.parse_ident("table name")?;
        stmt.table = self.parse_multi_ident(first)?;
        if self.peek() == Token::As {
            stmt.as_pos = Some(self.scan().0);
            stmt.alias = Some(self.parse_ident("alias")?);
        }

        // Optional column list.
        if self.peek() == Token::Lp {
            stmt.columns_lparen = Some(self.scan().0);
            loop {
                stmt.columns.push(self.parse_ident("column name")?);

                if self.peek() == Token::Rp {
                    break;
                } else if self.peek() != Token::Comma {
                    return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
                }
                self.scan();
            }
            stmt.columns_rparen = Some(self.scan().0);
        }

        match self.peek() {
            Token::Values => {
                stmt.values = Some(self.scan().0);
                loop {
                    stmt.value_lists.push(self.parse_expr_list()?);
                    if self.peek() != Token::Comma {
                        break;
                    }
                    self.scan();
                }
            }
            Token::Select => {
                stmt.select = Some(Box::new(self.parse_select_statement(false, None)?));
            }
            Token::Ident if self.lit.eq_ignore_ascii_case("DEFAULT") => {
                stmt.default = Some(self.scan().0);
                stmt.default_values = Some(self.expect(Token::Values, "VALUES")?);
            }
            _ => {
                return Err(self.error_expected(
                    self.pos,
                    self.tok,
                    "VALUES, SELECT, or DEFAULT VALUES",
                ))
            }
        }

        if self.peek() == Token::On {
            stmt.upsert = Some(self.parse_upsert_clause()?);
        }
        if self.peek() == Token::Returning {
            stmt.returning = Some(self.parse_returning_clause()?);
        }

        Ok(Statement::Insert(Box::new(stmt)))
    }

    fn parse_upsert_clause(&mut self) -> Result<UpsertClause, ParseError> {
        let mut clause = UpsertClause {
            on: self.scan().0,
            ..UpsertClause::default()
        };
        clause.on_conflict = self.expect(Token::Conflict, "CONFLICT")?;

        // Optional indexed-column list and WHERE conditional.
        if self.peek() == Token::Lp {
            clause.lparen = Some(self.scan().0);
            loop {
                clause.columns.push(self.parse_indexed_column()?);

                if self.peek() == Token::Rp {
                    break;
                } else if self.peek() != Token::Comma {
                    return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
                }
                self.scan();
            }
            clause.rparen = Some(self.scan().0);

            if self.peek() == Token::Where {
                clause.where_pos = Some(self.scan().0);
                clause.where_expr = Some(self.parse_expr()?);
            }
        }

        clause.do_pos = self.expect(Token::Do, "DO")?;

        if self.peek() == Token::Nothing {
            clause.do_nothing = Some(self.scan().0);
            return Ok(clause);
        } else if self.peek() != Token::Update {
            return Err(self.error_expected(self.pos, self.tok, "NOTHING or UPDATE SET"));
        }

        clause.do_update = Some(self.scan().0);
        clause.do_update_set = Some(self.expect(Token::Set, "SET")?);

        loop {
            clause.assignments.push(self.parse_assignment()?);
            if self.peek() != Token::Comma {
                break;
            }
            self.scan();
        }

        if self.peek() == Token::Where {
            clause.update_where = Some(self.scan().0);
            clause.update_where_expr = Some(self.parse_expr()?);
        }

        Ok(clause)
    }

    fn parse_returning_clause(&mut self) -> Result<ReturningClause, ParseError> {
        let mut clause = ReturningClause {
            returning: self.scan().0,
            columns: Vec::new(),
        };
        loop {
            clause.columns.push(self.parse_result_column()?);
            if self.peek() != Token::Comma {
                break;
            }
            self.scan();
        }
        Ok(clause)
    }

    fn parse_indexed_column(&mut self) -> Result<IndexedColumn, ParseError> {
        let x = self.parse_expr()?;
        let mut col = IndexedColumn {
            x,
            collate: None,
            collation: None,
            asc: None,
            desc: None,
        };

        if self.peek() == Token::Collate {
            col.collate = Some(self.scan().0);
            col.collation = Some(self.parse_ident("collation name")?);
        }

        if self.peek() == Token::Asc {
            col.asc = Some(self.scan().0);
        } else if self.peek() == Token::Desc {
            col.desc = Some(self.scan().0);
        }
        Ok(col)
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let mut lparen = None;
        let mut rparen = None;
        let mut columns = Vec::new();

        // Either a single column or a parenthesized column list.
        if self.peek().is_ident_token() {
            let first = self.parse_ident("column name")?;
            columns.push(self.parse_multi_ident(first)?);
        } else if self.peek() == Token::Lp {
            lparen = Some(self.scan().0);
            loop {
                let first = self.parse_ident("table name")?;
                columns.push(self.parse_multi_ident(first)?);

                if self.peek() == Token::Rp {
                    break;
                } else if self.peek() != Token::Comma {
                    return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
                }
                self.scan();
            }
            rparen = Some(self.scan().0);
        } else {
            return Err(self.error_expected(self.pos, self.tok, "column name or column list"));
        }

        let eq = self.expect(Token::Eq, "=")?;
        let expr = self.parse_expr()?;

        Ok(Assignment {
            lparen,
            columns,
            rparen,
            eq,
            expr,
        })
    }

    fn parse_delete_statement(
        &mut self,
        with: Option<WithClause>,
    ) -> Result<Statement, ParseError> {
        let mut stmt = DeleteStatement {
            with,
            ..DeleteStatement::default()
        };

        stmt.delete = self.scan().0;
        stmt.from = self.expect(Token::From, "FROM")?;
        if !self.peek().is_ident_token() {
            return Err(self.error_expected(self.pos, self.tok, "table name"));
        }
        let first = self.parse_ident("table name")?;
        stmt.table = self.parse_qualified_table_name(first)?;

        if self.peek() == Token::Where {
            stmt.where_pos = Some(self.scan().0);
            stmt.where_expr = Some(self.parse_expr()?);
        }

        // An ORDER BY makes the LIMIT mandatory.
        if self.peek() == Token::Order || self.peek() == Token::Limit {
            if self.peek() == Token::Order {
                stmt.order = Some(self.scan().0);
                stmt.order_by = Some(self.expect(Token::By, "BY")?);

                loop {
                    stmt.ordering_terms.push(self.parse_ordering_term()?);
                    if self.peek() != Token::Comma {
                        break;
                    }
                    self.scan();
                }
            }

            if self.peek() != Token::Limit {
                return Err(self.error_expected(self.pos, self.tok, "LIMIT"));
            }
            stmt.limit = Some(self.scan().0);
            stmt.limit_expr = Some(self.parse_expr()?);

            match self.peek() {
                Token::Offset => {
                    stmt.offset = Some(self.scan().0);
                    stmt.offset_expr = Some(self.parse_expr()?);
                }
                Token::Comma => {
                    stmt.offset_comma = Some(self.scan().0);
                    stmt.offset_expr = Some(self.parse_expr()?);
                }
                _ => {}
            }
        }

        if self.peek() == Token::Returning {
            stmt.returning = Some(self.parse_returning_clause()?);
        }

        Ok(Statement::Delete(Box::new(stmt)))
    }

    fn parse_create_table_statement(&mut self) -> Result<Statement, ParseError> {
        let mut stmt = CreateTableStatement {
            create: self.scan().0,
            ..CreateTableStatement::default()
        };
        stmt.table = self.expect(Token::Table, "TABLE")?;

        if self.peek() == Token::If {
            stmt.if_pos = Some(self.scan().0);
            stmt.if_not = Some(self.expect(Token::Not, "NOT")?);
            stmt.if_not_exists = Some(self.expect(Token::Exists, "EXISTS")?);
        }

        let first = self.parse_ident("table name")?;
        stmt.name = self.parse_multi_ident(first)?;

        match self.peek() {
            Token::Lp => {
                stmt.lparen = Some(self.scan().0);
                loop {
                    if !self.at_column_name() {
                        return Err(self.error_expected(
                            self.pos,
                            self.tok,
                            "column name, CONSTRAINT, or right paren",
                        ));
                    }
                    let name = self.parse_ident("column name")?;
                    let mut def = ColumnDefinition { name, ty: None };
                    if !matches!(self.peek(), Token::Comma | Token::Rp) {
                        if self.at_type_name() {
                            def.ty = Some(self.parse_type()?);
                        } else {
                            return Err(self.error_expected(
                                self.pos,
                                self.tok,
                                "column name, CONSTRAINT, or right paren",
                            ));
                        }
                    }
                    stmt.columns.push(def);

                    match self.peek() {
                        Token::Comma => {
                            self.scan();
                        }
                        Token::Rp => break,
                        _ => {
                            return Err(self.error_expected(
                                self.pos,
                                self.tok,
                                "column name, CONSTRAINT, or right paren",
                            ))
                        }
                    }
                }
                stmt.rparen = Some(self.scan().0);
            }
            Token::As => {
                stmt.as_pos = Some(self.scan().0);
                let with = if self.peek() == Token::With {
                    Some(self.parse_with_clause()?)
                } else {
                    None
                };
                match self.peek() {
                    Token::Select | Token::Values => {
                        stmt.select =
                            Some(Box::new(self.parse_select_statement(false, with)?));
                    }
                    _ => {
                        return Err(self.error_expected(self.pos, self.tok, "SELECT or VALUES"))
                    }
                }
            }
            _ => return Err(self.error_expected(self.pos, self.tok, "AS or left paren")),
        }

        Ok(Statement::CreateTable(Box::new(stmt)))
    }

    fn at_column_name(&mut self) -> bool {
        let tok = self.peek();
        tok.is_ident_token() || tok.is_bare_keyword() || tok == Token::Null
    }

    fn at_type_name(&mut self) -> bool {
        let tok = self.peek();
        tok == Token::Ident
            || tok == Token::Null
            || tok.is_bare_keyword()
            || keywords::is_type_name(&self.lit)
    }

    fn parse_drop_table_statement(&mut self) -> Result<Statement, ParseError> {
        let mut stmt = DropTableStatement {
            drop: self.scan().0,
            ..DropTableStatement::default()
        };
        stmt.table = self.expect(Token::Table, "TABLE")?;

        if self.peek() == Token::If {
            stmt.if_pos = Some(self.scan().0);
            stmt.if_exists = Some(self.expect(Token::Exists, "EXISTS")?);
        }

        let first = self.parse_ident("table name")?;
        stmt.name = self.parse_multi_ident(first)?;
        Ok(Statement::DropTable(stmt))
    }

    fn parse_truncate_statement(&mut self) -> Result<Statement, ParseError> {
        let truncate = self.scan().0;
        let table = self.expect(Token::Table, "TABLE")?;
        let first = self.parse_ident("table name")?;
        let name = self.parse_multi_ident(first)?;
        Ok(Statement::Truncate(TruncateStatement {
            truncate,
            table,
            name,
        }))
    }

    fn parse_merge_statement(&mut self) -> Result<Statement, ParseError> {
        let merge = self.scan().0;
        let into = self.expect(Token::Into, "INTO")?;
        let target = self.parse_unary_source()?;
        let using = self.expect(Token::Using, "USING")?;
        let source = self.parse_unary_source()?;
        let on = self.expect(Token::On, "ON")?;
        let on_expr = self.parse_expr()?;

        let mut matched = Vec::new();
        while self.peek() == Token::When {
            matched.push(self.parse_matched_condition()?);
        }

        Ok(Statement::Merge(Box::new(MergeStatement {
            merge,
            into,
            target,
            using,
            source,
            on,
            on_expr,
            matched,
        })))
    }

    fn parse_matched_condition(&mut self) -> Result<MatchedCondition, ParseError> {
        let mut cond = MatchedCondition {
            when: self.scan().0,
            ..MatchedCondition::default()
        };
        if self.peek() == Token::Not {
            cond.not = Some(self.scan().0);
        }
        cond.matched = self.expect(Token::Matched, "MATCHED")?;

        if self.peek() == Token::And {
            cond.and = Some(self.scan().0);
            cond.and_expr = Some(self.parse_expr()?);
        }
        cond.then = self.expect(Token::Then, "THEN")?;

        match self.peek() {
            Token::Update => {
                cond.update = Some(self.scan().0);
                cond.update_set = Some(self.expect(Token::Set, "SET")?);
                loop {
                    cond.assignments.push(self.parse_assignment()?);
                    if self.peek() != Token::Comma {
                        break;
                    }
                    self.scan();
                }
            }
            Token::Delete => {
                cond.delete = Some(self.scan().0);
            }
            Token::Insert => {
                cond.insert = Some(self.scan().0);
                if self.peek() == Token::Star {
                    cond.star = Some(self.scan().0);
                } else {
                    if self.peek() == Token::Lp {
                        cond.col_list = Some(self.parse_expr_list()?);
                    }
                    cond.values = Some(self.expect(Token::Values, "VALUES")?);
                    cond.value_list = Some(self.parse_expr_list()?);
                }
            }
            _ => return Err(self.error_expected(self.pos, self.tok, "UPDATE, DELETE, or INSERT")),
        }
        Ok(cond)
    }

    fn parse_function_statement(&mut self) -> Result<Statement, ParseError> {
        let function = self.scan().0;
        let first = self.parse_ident("function name")?;
        let name = self.parse_multi_ident(first)?;

        let lparen = self.expect(Token::Lp, "left paren")?;
        let mut params = Vec::new();
        while self.peek() != Token::Rp {
            params.push(self.parse_column_definition()?);

            if self.peek() == Token::Rp {
                break;
            } else if self.peek() != Token::Comma {
                return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
            }
            self.scan();
        }
        let rparen = self.scan().0;

        let returns = self.expect(Token::Returns, "RETURNS")?;
        let return_param = self.parse_column_definition()?;

        let as_pos = self.expect(Token::As, "AS")?;
        let begin = self.expect(Token::Begin, "BEGIN")?;
        let fn_expr = self.parse_expr()?;
        let end = self.expect(Token::End, "END")?;

        Ok(Statement::Function(Box::new(FunctionStatement {
            function,
            name,
            lparen,
            params,
            rparen,
            returns,
            return_param,
            as_pos,
            begin,
            fn_expr,
            end,
        })))
    }

    fn parse_column_definition(&mut self) -> Result<ColumnDefinition, ParseError> {
        let name = self.parse_ident("column name")?;
        let mut def = ColumnDefinition { name, ty: None };
        if self.at_type_name() && !matches!(self.peek(), Token::Comma | Token::Rp) {
            def.ty = Some(self.parse_type()?);
        }
        Ok(def)
    }

    // ------------------------------------------------------------------
    // SELECT
    // ------------------------------------------------------------------

    /// Parses a `SELECT`/`VALUES` statement. When `compounded` is true the
    /// statement is the right side of a compound operator and its `WITH`,
    /// `ORDER BY`, and `LIMIT`/`OFFSET` belong to the outermost statement.
    fn parse_select_statement(
        &mut self,
        compounded: bool,
        with: Option<WithClause>,
    ) -> Result<SelectStatement, ParseError> {
        let mut stmt = SelectStatement {
            with,
            ..SelectStatement::default()
        };

        if !compounded && stmt.with.is_none() && self.peek() == Token::With {
            stmt.with = Some(self.parse_with_clause()?);
        }

        match self.peek() {
            Token::Values => {
                stmt.values = Some(self.scan().0);
                loop {
                    stmt.value_lists.push(self.parse_expr_list()?);
                    if self.peek() != Token::Comma {
                        break;
                    }
                    self.scan();
                }
            }
            Token::Select => {
                stmt.select = Some(self.scan().0);

                match self.peek() {
                    Token::Distinct => stmt.distinct = Some(self.scan().0),
                    Token::All => stmt.all = Some(self.scan().0),
                    _ => {}
                }

                loop {
                    stmt.columns.push(self.parse_result_column()?);
                    if self.peek() != Token::Comma {
                        break;
                    }
                    self.scan();
                    // Tolerate a trailing comma right before FROM.
                    if self.peek() == Token::From {
                        break;
                    }
                }

                if self.peek() == Token::From {
                    stmt.from = Some(self.scan().0);
                    stmt.source = Some(self.parse_source()?);
                }

                if self.peek() == Token::Where {
                    stmt.where_pos = Some(self.scan().0);
                    stmt.where_expr = Some(self.parse_expr()?);
                }

                if self.peek() == Token::Group {
                    stmt.group = Some(self.scan().0);
                    stmt.group_by = Some(self.expect(Token::By, "BY")?);

                    if self.peek() == Token::All {
                        stmt.group_by_all = Some(self.scan().0);
                    } else if self.peek() == Token::Grouping {
                        stmt.grouping = Some(self.scan().0);
                        stmt.grouping_sets = Some(self.expect(Token::Sets, "SETS")?);
                        stmt.grouping_expr = Some(self.parse_expr()?);
                    } else {
                        loop {
                            stmt.group_by_exprs.push(self.parse_expr()?);
                            if self.peek() != Token::Comma {
                                break;
                            }
                            self.scan();
                        }
                    }

                    if self.peek() == Token::Having {
                        stmt.having = Some(self.scan().0);
                        stmt.having_expr = Some(self.parse_expr()?);
                    }
                }

                if self.peek() == Token::Qualify {
                    stmt.qualify = Some(self.scan().0);
                    stmt.qualify_expr = Some(self.parse_expr()?);
                }

                if self.peek() == Token::Window {
                    stmt.window = Some(self.scan().0);
                    loop {
                        let name = self.parse_ident("window name")?;
                        let as_pos = self.expect(Token::As, "AS")?;
                        let definition = self.parse_window_definition()?;
                        stmt.windows.push(Window {
                            name,
                            as_pos,
                            definition,
                        });

                        if self.peek() != Token::Comma {
                            break;
                        }
                        self.scan();
                    }
                }
            }
            _ => return Err(self.error_expected(self.pos, self.tok, "SELECT or VALUES")),
        }

        // Optional compound suffix.
        match self.peek() {
            Token::Union => {
                stmt.union = Some(self.scan().0);
                if self.peek() == Token::All {
                    stmt.union_all = Some(self.scan().0);
                } else if self.peek() == Token::Distinct {
                    stmt.union_dist = Some(self.scan().0);
                }
                stmt.compound = Some(Box::new(self.parse_select_statement(true, None)?));
            }
            Token::Intersect => {
                stmt.intersect = Some(self.scan().0);
                stmt.compound = Some(Box::new(self.parse_select_statement(true, None)?));
            }
            Token::Except => {
                stmt.except = Some(self.scan().0);
                stmt.compound = Some(Box::new(self.parse_select_statement(true, None)?));
            }
            _ => {}
        }

        if !compounded && self.peek() == Token::Order {
            stmt.order = Some(self.scan().0);
            stmt.order_by = Some(self.expect(Token::By, "BY")?);

            loop {
                stmt.ordering_terms.push(self.parse_ordering_term()?);
                if self.peek() != Token::Comma {
                    break;
                }
                self.scan();
            }
        }

        // The offset can follow either OFFSET or a comma:
        // "LIMIT 1 OFFSET 2" or "LIMIT 1, 2".
        if !compounded && self.peek() == Token::Limit {
            stmt.limit = Some(self.scan().0);
            stmt.limit_expr = Some(self.parse_expr()?);

            match self.peek() {
                Token::Offset => {
                    stmt.offset = Some(self.scan().0);
                    stmt.offset_expr = Some(self.parse_expr()?);
                }
                Token::Comma => {
                    stmt.offset_comma = Some(self.scan().0);
                    stmt.offset_expr = Some(self.parse_expr()?);
                }
                _ => {}
            }
        }

        Ok(stmt)
    }

    fn parse_result_column(&mut self) -> Result<ResultColumn, ParseError> {
        let mut col = ResultColumn::default();

        // An initial "*" returns all columns, optionally except some.
        if self.peek() == Token::Star {
            col.star = Some(self.scan().0);
            if self.peek() == Token::Except {
                col.except = Some(self.scan().0);
                col.except_expr = Some(self.parse_expr()?);
            }
            return Ok(col);
        }

        col.expr = Some(self.parse_expr()?);

        if self.peek() == Token::Except {
            col.except = Some(self.scan().0);
            col.except_expr = Some(self.parse_expr()?);
        }

        if self.peek() == Token::Within {
            col.within = Some(self.parse_within()?);
        }

        // "AS" requires the alias; a bare alias needs an identifier token.
        if self.peek() == Token::As {
            col.as_pos = Some(self.scan().0);
            if !(self.peek().is_ident_token()
                || self.peek().is_bare_keyword()
                || self.peek() == Token::Null)
            {
                return Err(self.error_expected(self.pos, self.tok, "column alias"));
            }
            col.alias = Some(self.parse_ident("column alias")?);
        } else if self.peek().is_ident_token() {
            col.alias = Some(self.parse_ident("column alias")?);
        }

        Ok(col)
    }

    fn parse_within(&mut self) -> Result<Within, ParseError> {
        let within = self.scan().0;
        let group = self.expect(Token::Group, "GROUP")?;
        let lparen = self.expect(Token::Lp, "left paren")?;
        let order = self.expect(Token::Order, "ORDER")?;
        let order_by = self.expect(Token::By, "BY")?;
        let term = self.parse_ordering_term()?;

        let mut w = Within {
            within,
            group,
            lparen,
            order,
            order_by,
            ordering_term: Box::new(term),
            limit: None,
            limit_expr: None,
            rparen: Pos::default(),
            lbrack: None,
            index: None,
            rbrack: None,
        };

        if self.peek() == Token::Limit {
            w.limit = Some(self.scan().0);
            w.limit_expr = Some(self.parse_expr()?);
        }
        w.rparen = self.expect(Token::Rp, "right paren")?;

        if self.peek() == Token::Lsb {
            w.lbrack = Some(self.scan().0);
            if self.peek() != Token::Integer {
                return Err(self.error_expected(self.pos, self.tok, "integer"));
            }
            let (pos, _, lit) = self.scan();
            w.index = Some(NumberLit::new(pos, lit));
            w.rbrack = Some(self.expect(Token::Rsb, "right bracket")?);
        }
        Ok(w)
    }

    fn parse_ordering_term(&mut self) -> Result<OrderingTerm, ParseError> {
        let mut term = OrderingTerm::new(self.parse_expr()?);

        match self.peek() {
            Token::Asc => term.asc = Some(self.scan().0),
            Token::Desc => term.desc = Some(self.scan().0),
            _ => {}
        }

        if self.peek() == Token::Nulls {
            term.nulls = Some(self.scan().0);
            match self.peek() {
                Token::First => term.nulls_first = Some(self.scan().0),
                Token::Last => term.nulls_last = Some(self.scan().0),
                _ => return Err(self.error_expected(self.pos, self.tok, "FIRST or LAST")),
            }
        }

        Ok(term)
    }

    // ------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------

    fn parse_source(&mut self) -> Result<Source, ParseError> {
        let mut source = self.parse_unary_source()?;

        loop {
            // Exit immediately if not part of a join operator.
            match self.peek() {
                Token::Comma
                | Token::Natural
                | Token::Full
                | Token::Left
                | Token::Inner
                | Token::Cross
                | Token::Join => {}
                _ => return Ok(source),
            }

            let operator = self.parse_join_operator()?;
            let y = self.parse_unary_source()?;
            let constraint = self.parse_join_constraint()?;

            // Nest the new join on the rightmost subtree so the left child
            // of every join stays a non-join.
            source = attach_join(source, operator, y, constraint);
        }
    }

    fn parse_unary_source(&mut self) -> Result<Source, ParseError> {
        match self.peek() {
            Token::Lp => self.parse_paren_source(),
            t if t.is_ident_token() => {
                let first = self.parse_ident("table name")?;
                self.parse_qualified_table(first)
            }
            Token::Values => {
                let stmt = self.parse_select_statement(false, None)?;
                Ok(Source::Select(Box::new(stmt)))
            }
            _ => Err(self.error_expected(self.pos, self.tok, "table name or left paren")),
        }
    }

    fn parse_qualified_table(&mut self, first: Ident) -> Result<Source, ParseError> {
        if self.peek() == Token::Lp {
            return self.parse_table_function(first).map(Source::TableFunction);
        }
        self.parse_qualified_table_name(first).map(Source::Table)
    }

    fn parse_qualified_table_name(
        &mut self,
        first: Ident,
    ) -> Result<QualifiedTableName, ParseError> {
        let mut tbl = QualifiedTableName {
            name: self.parse_multi_ident(first)?,
            ..QualifiedTableName::default()
        };

        // Optional table alias ("AS alias" or just "alias").
        if self.peek() == Token::As || self.peek().is_ident_token() {
            if self.peek() == Token::As {
                tbl.as_pos = Some(self.scan().0);
            }
            tbl.alias = Some(self.parse_ident("table alias")?);
        }

        while self.peek() == Token::Lateral {
            tbl.lateral_views.push(self.parse_lateral_view()?);
        }

        Ok(tbl)
    }

    fn parse_lateral_view(&mut self) -> Result<LateralView, ParseError> {
        let lateral = self.scan().0;
        if self.peek() != Token::View {
            return Err(self.error_expected(self.pos, self.tok, "lateral view"));
        }
        let view = self.scan().0;

        let outer = if self.peek() == Token::Outer {
            Some(self.scan().0)
        } else {
            None
        };

        let expr = self.parse_operand()?;
        let Expr::Call(udtf) = expr else {
            return Err(self.error_expected(self.pos, self.tok, "lateral view udf call"));
        };

        if !self.peek().is_expr_ident() {
            return Err(self.error_expected(self.pos, self.tok, "lateral view table alias"));
        }
        let (pos, tok, lit) = self.scan();
        let table_alias = Ident::with_token(pos, lit, tok);

        let as_pos = self.expect(Token::As, "lateral view AS")?;

        let mut col_aliases = Vec::new();
        loop {
            if !self.peek().is_expr_ident() {
                return Err(self.error_expected(self.pos, self.tok, "lateral view column alias"));
            }
            let (pos, tok, lit) = self.scan();
            col_aliases.push(Ident::with_token(pos, lit, tok));

            if self.peek() != Token::Comma {
                break;
            }
            self.scan();
        }

        Ok(LateralView {
            lateral,
            view,
            outer,
            udtf,
            table_alias,
            as_pos,
            col_aliases,
        })
    }

    fn parse_table_function(
        &mut self,
        name: Ident,
    ) -> Result<QualifiedTableFunctionName, ParseError> {
        let mut tbl = QualifiedTableFunctionName {
            name,
            lparen: self.scan().0,
            ..QualifiedTableFunctionName::default()
        };

        while self.peek() != Token::Rp {
            tbl.args.push(self.parse_expr()?);

            if self.peek() == Token::Rp {
                break;
            } else if self.peek() != Token::Comma {
                return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
            }
            self.scan();
        }
        tbl.rparen = self.scan().0;

        if self.peek() == Token::As || self.peek().is_ident_token() {
            if self.peek() == Token::As {
                tbl.as_pos = Some(self.scan().0);
            }
            tbl.alias = Some(self.parse_ident("table function alias")?);
        }

        Ok(tbl)
    }

    fn parse_paren_source(&mut self) -> Result<Source, ParseError> {
        let lparen = self.scan().0;

        let with = if self.peek() == Token::With {
            Some(self.parse_with_clause()?)
        } else {
            None
        };
        let source = match self.peek() {
            Token::Select | Token::Values => {
                Source::Select(Box::new(self.parse_select_statement(false, with)?))
            }
            _ => {
                if with.is_some() {
                    return Err(self.error_expected(self.pos, self.tok, "SELECT or VALUES"));
                }
                self.parse_source()?
            }
        };

        let rparen = self.expect(Token::Rp, "right paren")?;

        let mut paren = ParenSource {
            lparen,
            source: Box::new(source),
            rparen,
            as_pos: None,
            alias: None,
        };
        if self.peek() == Token::As || self.peek().is_ident_token() {
            if self.peek() == Token::As {
                paren.as_pos = Some(self.scan().0);
            }
            paren.alias = Some(self.parse_ident("table alias")?);
        }

        Ok(Source::Paren(paren))
    }

    fn parse_join_operator(&mut self) -> Result<JoinOperator, ParseError> {
        let mut op = JoinOperator::default();

        // A single comma is a join all by itself.
        if self.peek() == Token::Comma {
            op.comma = Some(self.scan().0);
            return Ok(op);
        }

        if self.peek() == Token::Natural {
            op.natural = Some(self.scan().0);
        }

        match self.peek() {
            Token::Left => {
                op.left = Some(self.scan().0);
                if self.peek() == Token::Outer {
                    op.outer = Some(self.scan().0);
                }
            }
            Token::Inner => {
                op.inner = Some(self.scan().0);
            }
            Token::Cross => {
                op.cross = Some(self.scan().0);
            }
            Token::Full => {
                op.full = Some(self.scan().0);
                if self.peek() == Token::Outer {
                    op.outer = Some(self.scan().0);
                }
            }
            _ => {}
        }

        op.join = Some(self.expect(Token::Join, "JOIN")?);
        Ok(op)
    }

    fn parse_join_constraint(&mut self) -> Result<Option<JoinConstraint>, ParseError> {
        match self.peek() {
            Token::On => {
                let on = self.scan().0;
                let x = self.parse_expr()?;
                Ok(Some(JoinConstraint::On(OnConstraint { on, x })))
            }
            Token::Using => {
                let mut con = UsingConstraint {
                    using: self.scan().0,
                    ..UsingConstraint::default()
                };

                con.lparen = self.expect(Token::Lp, "left paren")?;
                loop {
                    con.columns.push(self.parse_ident("column name")?);

                    if self.peek() == Token::Rp {
                        break;
                    } else if self.peek() != Token::Comma {
                        return Err(self.error_expected(
                            self.pos,
                            self.tok,
                            "comma or right paren",
                        ));
                    }
                    self.scan();
                }
                con.rparen = self.scan().0;

                Ok(Some(JoinConstraint::Using(con)))
            }
            _ => Ok(None),
        }
    }

    fn parse_with_clause(&mut self) -> Result<WithClause, ParseError> {
        let mut clause = WithClause {
            with: self.scan().0,
            ..WithClause::default()
        };
        if self.peek() == Token::Recursive {
            clause.recursive = Some(self.scan().0);
        }

        loop {
            clause.ctes.push(self.parse_cte()?);
            if self.peek() != Token::Comma {
                break;
            }
            self.scan();
        }
        Ok(clause)
    }

    fn parse_cte(&mut self) -> Result<Cte, ParseError> {
        let table_name = self.parse_ident("table name")?;
        let mut cte = Cte {
            table_name,
            ..Cte::default()
        };

        // Optional column list.
        if self.peek() == Token::Lp {
            cte.columns_lparen = Some(self.scan().0);
            loop {
                cte.columns.push(self.parse_ident("column name")?);

                if self.peek() == Token::Rp {
                    break;
                } else if self.peek() != Token::Comma {
                    return Err(self.error_expected(self.pos, self.tok, "comma or right paren"));
                }
                self.scan();
            }
            cte.columns_rparen = Some(self.scan().0);
        }

        cte.as_pos = self.expect(Token::As, "AS")?;
        cte.select_lparen = self.expect(Token::Lp, "left paren")?;
        cte.select = Box::new(self.parse_select_statement(false, None)?);
        cte.select_rparen = self.expect(Token::Rp, "right paren")?;

        Ok(cte)
    }

    fn parse_over_clause(&mut self) -> Result<OverClause, ParseError> {
        let over = self.scan().0;

        // A bare window name, or an inline definition.
        if self.peek().is_ident_token() {
            let (pos, tok, lit) = self.scan();
            return Ok(OverClause {
                over,
                name: Some(Ident::with_token(pos, lit, tok)),
                definition: None,
            });
        }

        let definition = self.parse_window_definition()?;
        Ok(OverClause {
            over,
            name: None,
            definition: Some(definition),
        })
    }

    fn parse_window_definition(&mut self) -> Result<WindowDefinition, ParseError> {
        let mut def = WindowDefinition::default();
        if self.peek() != Token::Lp {
            return Err(self.error_expected(self.pos, self.tok, "left paren"));
        }
        def.lparen = self.scan().0;

        if self.peek().is_ident_token() {
            let (pos, tok, lit) = self.scan();
            def.base = Some(Ident::with_token(pos, lit, tok));
        }

        if self.peek() == Token::Partition {
            def.partition = Some(self.scan().0);
            def.partition_by = Some(self.expect(Token::By, "BY")?);

            loop {
                def.partitions.push(self.parse_expr()?);
                if self.peek() != Token::Comma {
                    break;
                }
                self.scan();
            }
        }

        if self.peek() == Token::Order {
            def.order = Some(self.scan().0);
            def.order_by = Some(self.expect(Token::By, "BY")?);

            loop {
                def.ordering_terms.push(self.parse_ordering_term()?);
                if self.peek() != Token::Comma {
                    break;
                }
                self.scan();
            }
        }

        def.rparen = self.expect(Token::Rp, "right paren")?;
        Ok(def)
    }
}

/// Builds a left-filled [`MultiPartIdent`] from collected parts and dots.
fn assemble_multi_ident(parts: Vec<Ident>, dots: Vec<Pos>) -> MultiPartIdent {
    let mut parts = parts.into_iter();
    let mut dots = dots.into_iter();
    match parts.len() {
        1 => MultiPartIdent::single(parts.next().unwrap()),
        2 => MultiPartIdent {
            first: parts.next(),
            dot1: dots.next(),
            name: parts.next().unwrap(),
            ..MultiPartIdent::default()
        },
        3 => MultiPartIdent {
            first: parts.next(),
            dot1: dots.next(),
            second: parts.next(),
            dot2: dots.next(),
            name: parts.next().unwrap(),
            ..MultiPartIdent::default()
        },
        _ => MultiPartIdent {
            first: parts.next(),
            dot1: dots.next(),
            second: parts.next(),
            dot2: dots.next(),
            third: parts.next(),
            dot3: dots.next(),
            name: parts.next().unwrap(),
        },
    }
}

/// Attaches a new join at the rightmost position of `source`, keeping the
/// left child of every join a non-join.
fn attach_join(
    source: Source,
    operator: JoinOperator,
    y: Source,
    constraint: Option<JoinConstraint>,
) -> Source {
    match source {
        Source::Join(join) => {
            let JoinClause {
                x,
                operator: outer_op,
                y: outer_y,
                constraint: outer_con,
            } = *join;
            Source::Join(Box::new(JoinClause {
                x,
                operator: outer_op,
                y: attach_join(outer_y, operator, y, constraint),
                constraint: outer_con,
            }))
        }
        source => Source::Join(Box::new(JoinClause {
            x: source,
            operator,
            y,
            constraint,
        })),
    }
}
