//! Declaration parsing.

use text_size::TextRange;

use crate::ast::{
    AclDecl, AclEntry, BackendDecl, BackendProperty, Declaration, DirectorBackend, DirectorDecl,
    IncludeDecl, IntegerLit, PenaltyboxDecl, PropertyValue, RatecounterDecl, SubroutineDecl,
    TableDecl, TableEntry,
};
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

impl<'src> Parser<'src> {
    pub(crate) fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.skip_trivia();
        let leading = self.take_comments();

        match self.peek() {
            TokenKind::KwAcl => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                self.expect(TokenKind::LBrace)?;
                let mut entries = Vec::new();
                while self.peek() != TokenKind::RBrace {
                    entries.push(self.parse_acl_entry()?);
                }
                let close = self.expect(TokenKind::RBrace)?;
                // Comments inside the body are not attached to anything.
                self.take_comments();
                Ok(Declaration::Acl(AclDecl {
                    leading,
                    name,
                    entries,
                    range: TextRange::new(kw.range.start(), close.range.end()),
                }))
            }
            TokenKind::KwBackend => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                let (properties, end) = self.parse_property_block()?;
                Ok(Declaration::Backend(BackendDecl {
                    leading,
                    name,
                    properties,
                    range: TextRange::new(kw.range.start(), end),
                }))
            }
            TokenKind::KwDirector => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                let kind = self.parse_ident()?;
                self.expect(TokenKind::LBrace)?;
                let mut properties = Vec::new();
                let mut backends = Vec::new();
                loop {
                    match self.peek() {
                        TokenKind::Dot => properties.push(self.parse_property()?),
                        TokenKind::LBrace => {
                            let open = self.bump()?;
                            let mut block = Vec::new();
                            while self.peek() == TokenKind::Dot {
                                block.push(self.parse_property()?);
                            }
                            let close = self.expect(TokenKind::RBrace)?;
                            backends.push(DirectorBackend {
                                properties: block,
                                range: TextRange::new(open.range.start(), close.range.end()),
                            });
                        }
                        _ => break,
                    }
                }
                let close = self.expect(TokenKind::RBrace)?;
                self.take_comments();
                Ok(Declaration::Director(DirectorDecl {
                    leading,
                    name,
                    kind,
                    properties,
                    backends,
                    range: TextRange::new(kw.range.start(), close.range.end()),
                }))
            }
            TokenKind::KwTable => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                let value_type = if self.peek() == TokenKind::Ident {
                    Some(self.parse_ident()?)
                } else {
                    None
                };
                self.expect(TokenKind::LBrace)?;
                let mut entries = Vec::new();
                while self.peek() != TokenKind::RBrace {
                    let key = self.parse_string()?;
                    self.expect(TokenKind::Colon)?;
                    let value = self.parse_operand()?;
                    let range = TextRange::new(key.range.start(), value.range().end());
                    entries.push(TableEntry { key, value, range });
                    if self.peek() == TokenKind::Comma {
                        self.bump()?;
                    } else {
                        break;
                    }
                }
                let close = self.expect(TokenKind::RBrace)?;
                self.take_comments();
                Ok(Declaration::Table(TableDecl {
                    leading,
                    name,
                    value_type,
                    entries,
                    range: TextRange::new(kw.range.start(), close.range.end()),
                }))
            }
            TokenKind::KwSub => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                let return_type = if self.peek() == TokenKind::Ident {
                    Some(self.parse_ident()?)
                } else {
                    None
                };
                let body = self.parse_block()?;
                let range = TextRange::new(kw.range.start(), body.range.end());
                Ok(Declaration::Subroutine(SubroutineDecl {
                    leading,
                    name,
                    return_type,
                    body,
                    range,
                }))
            }
            TokenKind::KwPenaltybox => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                let body = self.parse_block()?;
                let range = TextRange::new(kw.range.start(), body.range.end());
                Ok(Declaration::Penaltybox(PenaltyboxDecl {
                    leading,
                    name,
                    body,
                    range,
                }))
            }
            TokenKind::KwRatecounter => {
                let kw = self.bump()?;
                let name = self.parse_ident()?;
                let body = self.parse_block()?;
                let range = TextRange::new(kw.range.start(), body.range.end());
                Ok(Declaration::Ratecounter(RatecounterDecl {
                    leading,
                    name,
                    body,
                    range,
                }))
            }
            TokenKind::KwInclude => {
                let kw = self.bump()?;
                let module = self.parse_string()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Declaration::Include(IncludeDecl {
                    leading,
                    module,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            _ => Err(self.error_here("expected declaration")),
        }
    }

    fn parse_acl_entry(&mut self) -> Result<AclEntry, ParseError> {
        self.skip_trivia();
        let start = self
            .tokens
            .get(self.pos)
            .map_or_else(|| self.eof_range(), |t| t.range)
            .start();

        let inverse = if self.peek() == TokenKind::Bang {
            self.bump()?;
            true
        } else {
            false
        };
        let address = self.parse_string()?;
        let mask = if self.peek() == TokenKind::Slash {
            self.bump()?;
            let token = self.expect(TokenKind::IntLiteral)?;
            let value = token
                .text(self.source)
                .parse::<i64>()
                .map_err(|_| ParseError::new("CIDR mask out of range", token.range))?;
            Some(IntegerLit {
                value,
                range: token.range,
            })
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(AclEntry {
            inverse,
            address,
            mask,
            range: TextRange::new(start, semi.range.end()),
        })
    }

    /// Parses a `{ .name = value; ... }` block, as used by backends.
    fn parse_property_block(
        &mut self,
    ) -> Result<(Vec<BackendProperty>, text_size::TextSize), ParseError> {
        self.enter()?;
        self.expect(TokenKind::LBrace)?;
        let mut properties = Vec::new();
        while self.peek() == TokenKind::Dot {
            properties.push(self.parse_property()?);
        }
        let close = self.expect(TokenKind::RBrace)?;
        self.take_comments();
        self.leave();
        Ok((properties, close.range.end()))
    }

    /// Parses a single `.name = value;` property. The value is either an
    /// expression operand or a nested object (`.probe = { ... }`).
    fn parse_property(&mut self) -> Result<BackendProperty, ParseError> {
        let dot = self.expect(TokenKind::Dot)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Assign)?;

        if self.peek() == TokenKind::LBrace {
            let open_start = dot.range.start();
            let (nested, end) = self.parse_property_block()?;
            if self.peek() == TokenKind::Semicolon {
                self.bump()?;
            }
            let object_range = TextRange::new(open_start, end);
            return Ok(BackendProperty {
                name,
                value: PropertyValue::Object(nested, object_range),
                range: object_range,
            });
        }

        // Probe request strings may be written as several juxtaposed
        // literals, so property values take a full expression.
        let value = self.parse_expression()?;
        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(BackendProperty {
            name,
            value: PropertyValue::Expr(value),
            range: TextRange::new(dot.range.start(), semi.range.end()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_file;
    use crate::ast::{Declaration, Expression, PropertyValue};

    #[test]
    fn test_parse_acl() {
        let file = parse_file(r#"acl example { !"192.168.0.1"/32; "10.0.0.10"; }"#).unwrap();
        let Declaration::Acl(acl) = &file.declarations[0] else {
            panic!("expected acl");
        };
        assert_eq!(acl.name.name.as_str(), "example");
        assert_eq!(acl.entries.len(), 2);
        assert!(acl.entries[0].inverse);
        assert_eq!(acl.entries[0].mask.as_ref().unwrap().value, 32);
        assert!(acl.entries[1].mask.is_none());
    }

    #[test]
    fn test_parse_backend_with_probe() {
        let file = parse_file(
            r#"
backend foo {
  .host = "example.com";
  .probe = {
    .request = "GET / HTTP/1.1";
    .threshold = 1;
    .initial = 5;
  }
}
"#,
        )
        .unwrap();
        let Declaration::Backend(backend) = &file.declarations[0] else {
            panic!("expected backend");
        };
        assert_eq!(backend.properties.len(), 2);
        let PropertyValue::Object(probe, _) = &backend.properties[1].value else {
            panic!("expected object value for .probe");
        };
        assert_eq!(probe.len(), 3);
    }

    #[test]
    fn test_parse_director() {
        let file = parse_file(
            r#"
director bar client {
    .quorum = 50%;
    { .backend = foo; .weight = 1; }
}
"#,
        )
        .unwrap();
        let Declaration::Director(director) = &file.declarations[0] else {
            panic!("expected director");
        };
        assert_eq!(director.kind.name.as_str(), "client");
        assert_eq!(director.properties.len(), 1);
        assert_eq!(director.backends.len(), 1);
        assert_eq!(director.backends[0].properties.len(), 2);
    }

    #[test]
    fn test_parse_table_with_type() {
        let file = parse_file("table example INTEGER {\n \"foo\": 10,\n}").unwrap();
        let Declaration::Table(table) = &file.declarations[0] else {
            panic!("expected table");
        };
        assert_eq!(table.value_type.as_ref().unwrap().name.as_str(), "INTEGER");
        assert_eq!(table.entries.len(), 1);
        assert!(matches!(table.entries[0].value, Expression::Integer(_)));
    }

    #[test]
    fn test_parse_sub_with_return_type() {
        let file = parse_file("sub returns_one INTEGER { return 1; }").unwrap();
        let Declaration::Subroutine(sub) = &file.declarations[0] else {
            panic!("expected subroutine");
        };
        assert_eq!(sub.return_type.as_ref().unwrap().name.as_str(), "INTEGER");
    }

    #[test]
    fn test_parse_include_declaration() {
        let file = parse_file(r#"include "deps01";"#).unwrap();
        assert!(matches!(file.declarations[0], Declaration::Include(_)));
    }

    #[test]
    fn test_penaltybox_with_comment_body() {
        let file = parse_file("penaltybox ip_pb {\n // This is a comment\n}").unwrap();
        let Declaration::Penaltybox(pb) = &file.declarations[0] else {
            panic!("expected penaltybox");
        };
        assert!(pb.body.statements.is_empty());
        assert_eq!(pb.body.trailing.len(), 1);
    }
}
