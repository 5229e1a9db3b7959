//! Recursive-descent parser for Fastly VCL.
//!
//! The parser works over the full token stream, skipping trivia while
//! collecting comments so they can be attached to the next node as leading
//! comments. Parse errors carry a position and abort the current file; the
//! linter records them as fatal.

mod decl;
mod expr;
mod stmt;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::ast::{Comment, Ident, SourceFile, Statement, StringLit};
use crate::lexer::{lex, Token, TokenKind};

/// A positioned parse error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse error: {message}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Where it went wrong.
    pub range: TextRange,
}

impl ParseError {
    fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parses a full VCL source file into declarations.
pub fn parse_file(source: &str) -> Result<SourceFile, ParseError> {
    Parser::new(source).parse_file()
}

/// Parses a snippet as a statement sequence.
///
/// Used for Fastly snippet bodies, which are statement lists rather than
/// full files.
pub fn parse_statements(source: &str) -> Result<Vec<Statement>, ParseError> {
    Parser::new(source).parse_statement_list()
}

/// Hard cap on expression/block nesting. Inputs deeper than this are
/// rejected instead of overflowing the stack.
const MAX_DEPTH: usize = 256;

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    pending: Vec<Comment>,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: lex(source),
            pos: 0,
            pending: Vec::new(),
            depth: 0,
        }
    }

    /// Guards recursive entry points. A failed parse aborts the file, so
    /// the counter is only decremented on the success path.
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_here("nesting too deep"));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_file(mut self) -> Result<SourceFile, ParseError> {
        let mut declarations = Vec::new();
        while !self.at_eof() {
            declarations.push(self.parse_declaration()?);
        }
        Ok(SourceFile { declarations })
    }

    fn parse_statement_list(mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // ===== cursor =====

    /// Advances over trivia, collecting comments into the pending list.
    fn skip_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            if token.kind.is_comment() {
                self.pending.push(Comment {
                    text: SmolStr::new(token.text(self.source)),
                    range: token.range,
                });
            }
            self.pos += 1;
        }
    }

    fn at_eof(&mut self) -> bool {
        self.skip_trivia();
        self.pos >= self.tokens.len()
    }

    /// Returns the kind of the next non-trivia token.
    fn peek(&mut self) -> TokenKind {
        self.skip_trivia();
        self.tokens
            .get(self.pos)
            .map_or(TokenKind::Error, |t| t.kind)
    }

    /// Returns the kind of the non-trivia token after the next one.
    fn peek2(&mut self) -> TokenKind {
        self.skip_trivia();
        self.tokens
            .get(self.pos + 1..)
            .unwrap_or(&[])
            .iter()
            .find(|t| !t.kind.is_trivia())
            .map_or(TokenKind::Error, |t| t.kind)
    }

    /// Consumes and returns the next non-trivia token.
    fn bump(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(*token)
            }
            None => Err(ParseError::new("unexpected end of input", self.eof_range())),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.skip_trivia();
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(*token)
            }
            Some(token) => Err(ParseError::new(
                format!("expected {}, found {}", kind.describe(), token.kind.describe()),
                token.range,
            )),
            None => Err(ParseError::new(
                format!("expected {}, found end of input", kind.describe()),
                self.eof_range(),
            )),
        }
    }

    /// Takes the comments collected since the last take.
    fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.pending)
    }

    fn eof_range(&self) -> TextRange {
        let end = TextSize::from(self.source.len() as u32);
        TextRange::new(end, end)
    }

    fn error_here(&mut self, message: impl Into<String>) -> ParseError {
        self.skip_trivia();
        let range = self
            .tokens
            .get(self.pos)
            .map_or_else(|| self.eof_range(), |t| t.range);
        ParseError::new(message, range)
    }

    // ===== shared terminals =====

    fn parse_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: SmolStr::new(token.text(self.source)),
            range: token.range,
        })
    }

    fn parse_string(&mut self) -> Result<StringLit, ParseError> {
        self.skip_trivia();
        match self.tokens.get(self.pos).copied() {
            Some(token) if token.kind == TokenKind::StringLiteral => {
                self.pos += 1;
                let text = token.text(self.source);
                Ok(StringLit {
                    value: SmolStr::new(&text[1..text.len() - 1]),
                    long: false,
                    range: token.range,
                })
            }
            Some(token) if token.kind == TokenKind::LongStringLiteral => {
                self.pos += 1;
                let text = token.text(self.source);
                let inner = text
                    .strip_prefix("{\"")
                    .and_then(|t| t.strip_suffix("\"}"))
                    .unwrap_or(text);
                Ok(StringLit {
                    value: SmolStr::new(inner),
                    long: true,
                    range: token.range,
                })
            }
            Some(token) => Err(ParseError::new(
                format!("expected string literal, found {}", token.kind.describe()),
                token.range,
            )),
            None => Err(ParseError::new(
                "expected string literal, found end of input",
                self.eof_range(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, Expression};

    #[test]
    fn test_parse_empty_file() {
        let file = parse_file("").unwrap();
        assert!(file.declarations.is_empty());
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse_file("sub foo {").unwrap_err();
        assert!(err.message.contains("end of input"), "{}", err.message);
    }

    #[test]
    fn test_leading_comments_attach_to_declaration() {
        let file = parse_file("//@recv, log\nsub foo {}").unwrap();
        let Declaration::Subroutine(sub) = &file.declarations[0] else {
            panic!("expected subroutine");
        };
        assert_eq!(sub.leading.len(), 1);
        assert_eq!(sub.leading[0].content(), "@recv, log");
    }

    #[test]
    fn test_macro_comment_in_empty_body_is_trailing() {
        let file = parse_file("sub vcl_log {\n  # FASTLY log\n}").unwrap();
        let Declaration::Subroutine(sub) = &file.declarations[0] else {
            panic!("expected subroutine");
        };
        assert!(sub.body.statements.is_empty());
        assert_eq!(sub.body.trailing.len(), 1);
        assert_eq!(sub.body.trailing[0].content(), "FASTLY log");
    }

    #[test]
    fn test_parse_statement_list() {
        let statements = parse_statements(r#"set req.http.Injected = "1";"#).unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_long_string_value() {
        let statements = parse_statements(r#"synthetic {"<html>"body""</html>"};"#).unwrap();
        let Statement::Synthetic(synthetic) = &statements[0] else {
            panic!("expected synthetic");
        };
        let Expression::String(value) = &synthetic.value else {
            panic!("expected string");
        };
        assert!(value.long);
        assert_eq!(value.value.as_str(), r#"<html>"body""</html>"#);
    }
}
