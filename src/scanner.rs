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

//! Character-stream tokenizer. Turns input text into positioned
//! [`Token`]s; it never fails, every malformed construct comes back as
//! [`Token::Illegal`] carrying the text collected so far.

#[cfg(not(feature = "std"))]
use alloc::{
    format,
    string::{String, ToString},
};

use core::str::Chars;

use crate::pos::Pos;
use crate::token::Token;

/// Scanner tokenizes an input string.
///
/// A one-character unread buffer backs `peek`; the accumulation buffer is
/// reset at the start of each token that collects text.
pub struct Scanner<'a> {
    chars: Chars<'a>,
    buf: String,

    ch: Option<char>,
    pos: Pos,
    full: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Scanner<'a> {
        Scanner {
            chars: input.chars(),
            buf: String::new(),
            ch: None,
            pos: Pos {
                offset: -1,
                line: 1,
                column: 0,
            },
            full: false,
        }
    }

    /// Returns the next token with its position and literal text.
    /// Whitespace is consumed silently; comments come back as
    /// [`Token::Comment`] with the delimiters included.
    pub fn scan(&mut self) -> (Pos, Token, String) {
        loop {
            match self.peek() {
                None => return (self.pos, Token::Eof, String::new()),
                Some(ch) if ch.is_whitespace() => {
                    self.read();
                    continue;
                }
                Some(ch) if ch.is_ascii_digit() || ch == '.' => return self.scan_number(),
                Some('r') => return self.scan_raw(),
                Some('x') | Some('X') => return self.scan_blob(),
                Some(ch) if is_alpha(ch) || ch == '_' => {
                    let pos = self.pos;
                    return self.scan_unquoted_ident(pos, "");
                }
                Some('"') | Some('\'') | Some('`') => return self.scan_quoted(),
                Some('@') => return self.scan_bind(),
                _ => {}
            }

            let (ch, pos) = self.read();
            let ch = match ch {
                Some(ch) => ch,
                None => return (self.pos, Token::Eof, String::new()),
            };
            return match ch {
                ';' => (pos, Token::Semi, ";".to_string()),
                '(' => (pos, Token::Lp, "(".to_string()),
                ')' => (pos, Token::Rp, ")".to_string()),
                '[' => (pos, Token::Lsb, "[".to_string()),
                ']' => (pos, Token::Rsb, "]".to_string()),
                ',' => (pos, Token::Comma, ",".to_string()),
                '!' => {
                    if self.peek() == Some('=') {
                        self.read();
                        (pos, Token::Ne, "!=".to_string())
                    } else {
                        (pos, Token::Illegal, "!".to_string())
                    }
                }
                '{' => {
                    if self.peek() == Some('{') {
                        self.scan_template(pos)
                    } else {
                        (pos, Token::Illegal, "{".to_string())
                    }
                }
                ':' => {
                    if self.peek() == Some('=') {
                        self.read();
                        (pos, Token::Assign, ":=".to_string())
                    } else {
                        (pos, Token::Illegal, ":".to_string())
                    }
                }
                '=' => {
                    if self.peek() == Some('=') {
                        self.read();
                        (pos, Token::Eq, "==".to_string())
                    } else {
                        (pos, Token::Eq, "=".to_string())
                    }
                }
                '<' => {
                    if self.peek() == Some('=') {
                        self.read();
                        if self.peek() == Some('>') {
                            self.read();
                            (pos, Token::Eqn, "<=>".to_string())
                        } else {
                            (pos, Token::Le, "<=".to_string())
                        }
                    } else if self.peek() == Some('<') {
                        self.read();
                        (pos, Token::Lshift, "<<".to_string())
                    } else if self.peek() == Some('>') {
                        self.read();
                        (pos, Token::Ne, "<>".to_string())
                    } else {
                        (pos, Token::Lt, "<".to_string())
                    }
                }
                '>' => {
                    if self.peek() == Some('=') {
                        self.read();
                        (pos, Token::Ge, ">=".to_string())
                    } else if self.peek() == Some('>') {
                        self.read();
                        (pos, Token::Rshift, ">>".to_string())
                    } else {
                        (pos, Token::Gt, ">".to_string())
                    }
                }
                '&' => (pos, Token::BitAnd, "&".to_string()),
                '|' => {
                    if self.peek() == Some('|') {
                        self.read();
                        (pos, Token::Concat, "||".to_string())
                    } else {
                        (pos, Token::BitOr, "|".to_string())
                    }
                }
                '+' => (pos, Token::Plus, "+".to_string()),
                '-' => {
                    if self.peek() == Some('>') {
                        self.read();
                        if self.peek() == Some('>') {
                            self.read();
                            (pos, Token::JsonExtractSql, "->>".to_string())
                        } else {
                            (pos, Token::JsonExtractJson, "->".to_string())
                        }
                    } else if self.peek() == Some('-') {
                        self.read();
                        let lit = self.scan_single_line_comment();
                        (pos, Token::Comment, lit)
                    } else {
                        (pos, Token::Minus, "-".to_string())
                    }
                }
                '*' => (pos, Token::Star, "*".to_string()),
                '/' => {
                    if self.peek() == Some('*') {
                        self.read();
                        let lit = self.scan_multi_line_comment();
                        (pos, Token::Comment, lit)
                    } else {
                        (pos, Token::Slash, "/".to_string())
                    }
                }
                '%' => (pos, Token::Rem, "%".to_string()),
                '~' => (pos, Token::BitNot, "~".to_string()),
                _ => (pos, Token::Illegal, ch.to_string()),
            };
        }
    }

    /// Reads raw characters until `condition` matches, honoring `escape` by
    /// consuming the escaped character verbatim. The terminating character
    /// is left unconsumed. Returns the collected text and whether the
    /// terminator was found (`false` means the input ended first).
    pub fn scan_until(
        &mut self,
        condition: impl Fn(char) -> bool,
        escape: char,
    ) -> (Pos, String, bool) {
        let mut pos = self.pos;
        if pos.offset == -1 {
            // Nothing read yet
            pos = Pos::new(0, 1, 1);
        }

        self.buf.clear();
        loop {
            let (ch, _) = self.read();
            let ch = match ch {
                Some(ch) => ch,
                None => return (pos, self.buf.clone(), false),
            };
            if ch == escape {
                if let (Some(ch2), _) = self.read() {
                    self.buf.push(ch2);
                }
                continue;
            } else if condition(ch) {
                self.full = true;
                return (pos, self.buf.clone(), true);
            }
            self.buf.push(ch);
        }
    }

    fn scan_unquoted_ident(&mut self, pos: Pos, prefix: &str) -> (Pos, Token, String) {
        self.buf.clear();
        self.buf.push_str(prefix);
        while let Some(ch) = self.peek() {
            if !is_unquoted_ident(ch) {
                break;
            }
            self.read();
            self.buf.push(ch);
        }

        let lit = self.buf.clone();
        let tok = Token::lookup(&lit);
        (pos, tok, lit)
    }

    fn scan_template(&mut self, pos: Pos) -> (Pos, Token, String) {
        // The opening "{" is consumed; eat the second one.
        self.read();

        self.buf.clear();
        loop {
            let (ch, _) = self.read();
            let ch = match ch {
                Some(ch) => ch,
                None => return (pos, Token::Illegal, format!("{{{{{}", self.buf)),
            };
            if ch == '}' && self.peek() == Some('}') {
                self.read();
                return (pos, Token::Tmpl, self.buf.clone());
            }
            self.buf.push(ch);
        }
    }

    fn scan_quoted(&mut self) -> (Pos, Token, String) {
        let (ch, pos) = self.read();
        let (end_ch, tok) = match ch {
            Some('\'') => ('\'', Token::String),
            Some('`') => ('`', Token::TString),
            _ => ('"', Token::QIdent),
        };

        self.buf.clear();
        loop {
            let (ch, _) = self.read();
            let ch = match ch {
                Some(ch) => ch,
                None => return (pos, Token::Illegal, format!("{}{}", end_ch, self.buf)),
            };
            if ch == '\\' {
                if let (Some(ch2), _) = self.read() {
                    self.buf.push(ch2);
                }
                continue;
            } else if ch == end_ch {
                // A doubled closing quote embeds one quote character.
                if self.peek() == Some(end_ch) {
                    self.read();
                    self.buf.push(end_ch);
                    continue;
                }
                return (pos, tok, self.buf.clone());
            }
            self.buf.push(ch);
        }
    }

    fn scan_single_line_comment(&mut self) -> String {
        self.buf.clear();
        self.buf.push_str("--");

        loop {
            match self.read() {
                (None, _) | (Some('\n'), _) => return self.buf.clone(),
                (Some(ch), _) => self.buf.push(ch),
            }
        }
    }

    fn scan_multi_line_comment(&mut self) -> String {
        self.buf.clear();
        self.buf.push_str("/*");
        loop {
            let (ch, _) = self.read();
            let ch = match ch {
                Some(ch) => ch,
                None => return self.buf.clone(),
            };
            if ch == '*' && self.peek() == Some('/') {
                self.read();
                self.buf.push_str("*/");
                return self.buf.clone();
            }
            self.buf.push(ch);
        }
    }

    fn scan_bind(&mut self) -> (Pos, Token, String) {
        let (start, pos) = self.read();

        self.buf.clear();
        if let Some(start) = start {
            self.buf.push(start);
        }

        while let Some(ch) = self.peek() {
            if !is_unquoted_ident(ch) {
                break;
            }
            self.read();
            self.buf.push(ch);
        }
        (pos, Token::Bind, self.buf.clone())
    }

    fn scan_raw(&mut self) -> (Pos, Token, String) {
        let (_, pos) = self.read();

        // Anything but a quote after the "r" is an ordinary identifier.
        match self.peek() {
            Some(ch) if is_unquoted_ident(ch) => return self.scan_unquoted_ident(pos, "r"),
            Some('\'') => {}
            _ => return (pos, Token::Ident, "r".to_string()),
        }
        self.read();

        self.buf.clear();
        loop {
            let (ch, _) = self.read();
            match ch {
                Some('\'') => return (pos, Token::RawStr, self.buf.clone()),
                None => return (pos, Token::Illegal, format!("r'{}", self.buf)),
                Some(ch) => self.buf.push(ch),
            }
        }
    }

    fn scan_blob(&mut self) -> (Pos, Token, String) {
        let (start, pos) = self.read();
        let start = start.unwrap_or('x');

        // Not a blob quote: an ordinary identifier starting with x.
        match self.peek() {
            Some(ch) if is_unquoted_ident(ch) => {
                let prefix = start.to_string();
                return self.scan_unquoted_ident(pos, &prefix);
            }
            Some('\'') => {}
            _ => return (pos, Token::Ident, start.to_string()),
        }
        self.read();

        self.buf.clear();
        loop {
            let (ch, _) = self.read();
            match ch {
                Some('\'') => return (pos, Token::Blob, self.buf.clone()),
                None => return (pos, Token::Illegal, format!("{}'{}", start, self.buf)),
                Some(ch) if !ch.is_ascii_hexdigit() => {
                    return (pos, Token::Illegal, format!("{}'{}{}", start, self.buf, ch))
                }
                Some(ch) => self.buf.push(ch),
            }
        }
    }

    fn scan_number(&mut self) -> (Pos, Token, String) {
        let pos = self.pos;
        let mut tok = Token::Integer;

        self.buf.clear();

        if self.peek() == Some('0') {
            self.buf.push('0');
            self.read();
            if matches!(self.peek(), Some('x') | Some('X')) {
                self.read();
                self.buf.push('x');
                while let Some(ch) = self.peek() {
                    if !ch.is_ascii_hexdigit() {
                        break;
                    }
                    self.read();
                    self.buf.push(ch);
                }
                return (pos, tok, self.buf.clone());
            }
        }

        // Whole number.
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.read();
            self.buf.push(ch);
        }

        // Decimal point and fraction digits.
        if self.peek() == Some('.') {
            tok = Token::Float;
            self.read();
            self.buf.push('.');

            while let Some(ch) = self.peek() {
                if !ch.is_ascii_digit() {
                    break;
                }
                self.read();
                self.buf.push(ch);
            }
        }

        // A lone dot with no digits on either side is the DOT operator.
        if self.buf == "." {
            return (pos, Token::Dot, ".".to_string());
        }

        // Exponent with optional sign; the digit run is mandatory.
        if matches!(self.peek(), Some('e') | Some('E')) {
            tok = Token::Float;
            let (ch, _) = self.read();
            self.buf.push(ch.unwrap_or('e'));

            if matches!(self.peek(), Some('+') | Some('-')) {
                let (sign, _) = self.read();
                self.buf.push(sign.unwrap_or('+'));
                if !matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                    return (pos, Token::Illegal, self.buf.clone());
                }
            } else if !matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                return (pos, Token::Illegal, self.buf.clone());
            }
            while let Some(ch) = self.peek() {
                if !ch.is_ascii_digit() {
                    break;
                }
                self.read();
                self.buf.push(ch);
            }
        }

        (pos, tok, self.buf.clone())
    }

    fn read(&mut self) -> (Option<char>, Pos) {
        if self.full {
            self.full = false;
            return (self.ch, self.pos);
        }

        match self.chars.next() {
            None => {
                self.ch = None;
                (None, self.pos)
            }
            Some(ch) => {
                self.pos.offset += 1;
                if ch == '\n' {
                    self.pos.line += 1;
                    self.pos.column = 0;
                } else {
                    self.pos.column += 1;
                }
                self.ch = Some(ch);
                (self.ch, self.pos)
            }
        }
    }

    fn peek(&mut self) -> Option<char> {
        if !self.full {
            self.read();
            self.unread();
        }
        self.ch
    }

    fn unread(&mut self) {
        debug_assert!(!self.full);
        self.full = true;
    }
}

fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_unquoted_ident(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns true if `s` is non-empty and contains only digits.
pub fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_scan(input: &str, tok: Token, lit: &str) {
        let (_, got_tok, got_lit) = Scanner::new(input).scan();
        assert_eq!(got_lit, lit, "literal for {input:?}");
        assert_eq!(got_tok, tok, "token for {input:?}");
    }

    #[test]
    fn unquoted_ident() {
        assert_scan("foo_BAR123", Token::Ident, "foo_BAR123");
        assert_scan("x", Token::Ident, "x");
        assert_scan("xyz", Token::Ident, "xyz");
        assert_scan("r", Token::Ident, "r");
        assert_scan("r2d2", Token::Ident, "r2d2");
    }

    #[test]
    fn quoted_ident() {
        assert_scan(
            r#""crazy ~!#*&# column name"" foo""#,
            Token::QIdent,
            r#"crazy ~!#*&# column name" foo"#,
        );
        assert_scan(r#""unfinished"#, Token::Illegal, r#""unfinished"#);
    }

    #[test]
    fn keyword() {
        assert_scan("BEGIN", Token::Begin, "BEGIN");
        assert_scan("select", Token::Select, "select");
        assert_scan("Null", Token::Null, "Null");
    }

    #[test]
    fn string() {
        assert_scan("'this is ''a'' string'", Token::String, "this is 'a' string");
        assert_scan("`table`", Token::TString, "table");
        assert_scan("'unfinished", Token::Illegal, "'unfinished");
        assert_scan(r"'esc\'aped'", Token::String, "esc'aped");
    }

    #[test]
    fn raw_string() {
        assert_scan("r'raw body'", Token::RawStr, "raw body");
        assert_scan("r'unfinished", Token::Illegal, "r'unfinished");
    }

    #[test]
    fn blob() {
        assert_scan("x'0123456789abcdef'", Token::Blob, "0123456789abcdef");
        assert_scan("X'0123456789ABCDEF'", Token::Blob, "0123456789ABCDEF");
        assert_scan("x'0123", Token::Illegal, "x'0123");
        assert_scan("x'hello", Token::Illegal, "x'h");
        assert_scan("xyz", Token::Ident, "xyz");
    }

    #[test]
    fn template() {
        assert_scan("{{ .DSTART | Date }}", Token::Tmpl, " .DSTART | Date ");
        assert_scan("{{no end", Token::Illegal, "{{no end");
        assert_scan("{", Token::Illegal, "{");
    }

    #[test]
    fn comment() {
        assert_scan("-- foo bar\n--baz", Token::Comment, "-- foo bar");
        assert_scan("-- foo bar", Token::Comment, "-- foo bar");
        assert_scan("--", Token::Comment, "--");
        assert_scan("/* foo bar */", Token::Comment, "/* foo bar */");
        assert_scan("/* foo bar", Token::Comment, "/* foo bar");
        assert_scan("/**/", Token::Comment, "/**/");
    }

    #[test]
    fn integer() {
        assert_scan("012", Token::Integer, "012");
        assert_scan("123", Token::Integer, "123");
        assert_scan("0xe3", Token::Integer, "0xe3");
    }

    #[test]
    fn float() {
        assert_scan("123.456", Token::Float, "123.456");
        assert_scan("123.", Token::Float, "123.");
        assert_scan("0.01", Token::Float, "0.01");
        assert_scan(".1", Token::Float, ".1");
        assert_scan("123e456", Token::Float, "123e456");
        assert_scan("123E456", Token::Float, "123E456");
        assert_scan("123.456E78", Token::Float, "123.456E78");
        assert_scan("123.E45", Token::Float, "123.E45");
        assert_scan("123E+4", Token::Float, "123E+4");
        assert_scan("123E-4", Token::Float, "123E-4");
        assert_scan(".0E-2", Token::Float, ".0E-2");
        assert_scan("123E", Token::Illegal, "123E");
        assert_scan("123E+", Token::Illegal, "123E+");
        assert_scan("123E-", Token::Illegal, "123E-");
    }

    #[test]
    fn bind() {
        assert_scan("@bar'", Token::Bind, "@bar");
        assert_scan("@start_date", Token::Bind, "@start_date");
    }

    #[test]
    fn eof() {
        assert_scan(" \n\t\r", Token::Eof, "");
        assert_scan("", Token::Eof, "");
    }

    #[test]
    fn operators() {
        assert_scan(";", Token::Semi, ";");
        assert_scan("(", Token::Lp, "(");
        assert_scan(")", Token::Rp, ")");
        assert_scan("[", Token::Lsb, "[");
        assert_scan("]", Token::Rsb, "]");
        assert_scan(",", Token::Comma, ",");
        assert_scan("!=", Token::Ne, "!=");
        assert_scan("<>", Token::Ne, "<>");
        assert_scan("!", Token::Illegal, "!");
        assert_scan("~", Token::BitNot, "~");
        assert_scan("=", Token::Eq, "=");
        assert_scan("==", Token::Eq, "==");
        assert_scan("<=", Token::Le, "<=");
        assert_scan("<=>", Token::Eqn, "<=>");
        assert_scan("<<", Token::Lshift, "<<");
        assert_scan("<", Token::Lt, "<");
        assert_scan(">=", Token::Ge, ">=");
        assert_scan(">>", Token::Rshift, ">>");
        assert_scan(">", Token::Gt, ">");
        assert_scan("&", Token::BitAnd, "&");
        assert_scan("||", Token::Concat, "||");
        assert_scan("|", Token::BitOr, "|");
        assert_scan("+", Token::Plus, "+");
        assert_scan("-", Token::Minus, "-");
        assert_scan("*", Token::Star, "*");
        assert_scan("/", Token::Slash, "/");
        assert_scan("%", Token::Rem, "%");
        assert_scan(":=", Token::Assign, ":=");
        assert_scan(":", Token::Illegal, ":");
        assert_scan(".", Token::Dot, ".");
        assert_scan(".E2", Token::Dot, ".");
        assert_scan("->", Token::JsonExtractJson, "->");
        assert_scan("->>", Token::JsonExtractSql, "->>");
        assert_scan("^", Token::Illegal, "^");
    }

    #[test]
    fn positions() {
        let mut s = Scanner::new("ab cd\nef");
        let (pos, _, _) = s.scan();
        assert_eq!(pos, Pos::new(0, 1, 1));
        let (pos, _, _) = s.scan();
        assert_eq!(pos, Pos::new(3, 1, 4));
        let (pos, _, _) = s.scan();
        assert_eq!(pos, Pos::new(6, 2, 1));
        let (_, tok, _) = s.scan();
        assert_eq!(tok, Token::Eof);
    }

    #[test]
    fn scan_until_stops_before_terminator() {
        let mut s = Scanner::new("abc}rest");
        let (pos, body, found) = s.scan_until(|ch| ch == '}', '\\');
        assert_eq!(pos, Pos::new(0, 1, 1));
        assert_eq!(body, "abc");
        assert!(found);

        // The terminator is left unconsumed.
        let (_, tok, lit) = s.scan();
        assert_eq!(tok, Token::Illegal);
        assert_eq!(lit, "}");
    }

    #[test]
    fn scan_until_honors_escape() {
        let mut s = Scanner::new(r"a\}b}");
        let (_, body, found) = s.scan_until(|ch| ch == '}', '\\');
        assert_eq!(body, "a}b");
        assert!(found);
    }

    #[test]
    fn scan_until_reports_eof() {
        let mut s = Scanner::new("abc");
        let (_, body, found) = s.scan_until(|ch| ch == '}', '\\');
        assert_eq!(body, "abc");
        assert!(!found);
    }

    #[test]
    fn is_integer_check() {
        assert!(is_integer("123"));
        assert!(!is_integer(""));
        assert!(!is_integer("12a"));
    }
}
