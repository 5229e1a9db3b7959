//! Statement parsing.

use smol_str::SmolStr;
use text_size::TextRange;

use crate::ast::{
    AddStmt, Block, BlockStmt, CallStmt, DeclareStmt, ElseIf, ErrorStmt, EsiStmt,
    FunctionCallStmt, GotoStmt, Ident, IfStmt, IncludeStmt, LabelStmt, LogStmt, RemoveStmt,
    RestartStmt, ReturnStmt, SetStmt, Statement, SyntheticStmt, UnsetStmt,
};
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

impl<'src> Parser<'src> {
    /// Parses a `{ ... }` block. Comments between the last statement and the
    /// closing brace become the block's trailing comments.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.enter()?;
        let block = self.parse_block_inner();
        if block.is_ok() {
            self.leave();
        }
        block
    }

    fn parse_block_inner(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while self.peek() != TokenKind::RBrace {
            if self.at_eof() {
                return Err(ParseError::new(
                    "expected '}', found end of input",
                    self.eof_range(),
                ));
            }
            statements.push(self.parse_statement()?);
        }
        self.skip_trivia();
        let trailing = self.take_comments();
        let close = self.expect(TokenKind::RBrace)?;
        Ok(Block {
            statements,
            trailing,
            range: TextRange::new(open.range.start(), close.range.end()),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.skip_trivia();
        let leading = self.take_comments();

        match self.peek() {
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let range = block.range;
                Ok(Statement::Block(BlockStmt {
                    leading,
                    block,
                    range,
                }))
            }
            TokenKind::KwDeclare => {
                let kw = self.bump()?;
                self.expect_keyword_local()?;
                let name = self.parse_ident()?;
                let var_type = self.parse_ident()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Declare(DeclareStmt {
                    leading,
                    name,
                    var_type,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwSet => {
                let kw = self.bump()?;
                let target = self.parse_ident()?;
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expression()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Set(SetStmt {
                    leading,
                    target,
                    value,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwAdd => {
                let kw = self.bump()?;
                let target = self.parse_ident()?;
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expression()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Add(AddStmt {
                    leading,
                    target,
                    value,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwUnset => {
                let kw = self.bump()?;
                let target = self.parse_ident()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Unset(UnsetStmt {
                    leading,
                    target,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwRemove => {
                let kw = self.bump()?;
                let target = self.parse_ident()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Remove(RemoveStmt {
                    leading,
                    target,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwCall => {
                let kw = self.bump()?;
                let subroutine = self.parse_ident()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Call(CallStmt {
                    leading,
                    subroutine,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwError => {
                let kw = self.bump()?;
                let code = if self.peek() == TokenKind::Semicolon {
                    None
                } else {
                    Some(self.parse_operand()?)
                };
                let message = if self.peek() == TokenKind::Semicolon {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Error(ErrorStmt {
                    leading,
                    code,
                    message,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwRestart => {
                let kw = self.bump()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Restart(RestartStmt {
                    leading,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwReturn => self.parse_return(leading),
            TokenKind::KwEsi => {
                let kw = self.bump()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Esi(EsiStmt {
                    leading,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwSynthetic | TokenKind::KwSyntheticBase64 => {
                let kw = self.bump()?;
                let value = self.parse_expression()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Synthetic(SyntheticStmt {
                    leading,
                    value,
                    base64: kw.kind == TokenKind::KwSyntheticBase64,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwLog => {
                let kw = self.bump()?;
                let value = self.parse_expression()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Log(LogStmt {
                    leading,
                    value,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwIf => self.parse_if(leading),
            TokenKind::KwGoto => {
                let kw = self.bump()?;
                let label = self.parse_ident()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Goto(GotoStmt {
                    leading,
                    label,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::KwInclude => {
                let kw = self.bump()?;
                let module = self.parse_string()?;
                let semi = self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Include(IncludeStmt {
                    leading,
                    module,
                    range: TextRange::new(kw.range.start(), semi.range.end()),
                }))
            }
            TokenKind::Ident => {
                // A label destination keeps its trailing colon in the token;
                // anything else in identifier position must be a call.
                let token = {
                    self.skip_trivia();
                    self.tokens[self.pos]
                };
                let text = token.text(self.source);
                if let Some(label) = text.strip_suffix(':') {
                    self.pos += 1;
                    return Ok(Statement::Label(LabelStmt {
                        leading,
                        label: Ident {
                            name: SmolStr::new(label),
                            range: token.range,
                        },
                        range: token.range,
                    }));
                }
                if self.peek2() == TokenKind::LParen {
                    let call = self.parse_call()?;
                    let semi = self.expect(TokenKind::Semicolon)?;
                    let range = TextRange::new(call.range.start(), semi.range.end());
                    return Ok(Statement::FunctionCall(FunctionCallStmt {
                        leading,
                        call,
                        range,
                    }));
                }
                Err(ParseError::new(
                    format!("unexpected identifier '{text}' in statement position"),
                    token.range,
                ))
            }
            _ => Err(self.error_here("expected statement")),
        }
    }

    fn parse_return(&mut self, leading: Vec<crate::ast::Comment>) -> Result<Statement, ParseError> {
        let kw = self.expect(TokenKind::KwReturn)?;

        if self.peek() == TokenKind::Semicolon {
            let semi = self.bump()?;
            return Ok(Statement::Return(ReturnStmt {
                leading,
                expression: None,
                has_parens: false,
                range: TextRange::new(kw.range.start(), semi.range.end()),
            }));
        }

        let (expression, has_parens) = if self.peek() == TokenKind::LParen {
            self.bump()?;
            let inner = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            (Some(inner), true)
        } else {
            (Some(self.parse_expression()?), false)
        };

        let semi = self.expect(TokenKind::Semicolon)?;
        Ok(Statement::Return(ReturnStmt {
            leading,
            expression,
            has_parens,
            range: TextRange::new(kw.range.start(), semi.range.end()),
        }))
    }

    fn parse_if(&mut self, leading: Vec<crate::ast::Comment>) -> Result<Statement, ParseError> {
        let kw = self.expect(TokenKind::KwIf)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        let consequence = self.parse_block()?;

        let mut alternatives = Vec::new();
        let mut alternative = None;
        loop {
            match self.peek() {
                TokenKind::KwElsif | TokenKind::KwElseif => {
                    let arm_kw = self.bump()?;
                    self.expect(TokenKind::LParen)?;
                    let arm_condition = self.parse_expression()?;
                    self.expect(TokenKind::RParen)?;
                    let arm_block = self.parse_block()?;
                    let range = TextRange::new(arm_kw.range.start(), arm_block.range.end());
                    alternatives.push(ElseIf {
                        condition: arm_condition,
                        block: arm_block,
                        range,
                    });
                }
                TokenKind::KwElse => {
                    self.bump()?;
                    if self.peek() == TokenKind::KwIf {
                        let arm_kw = self.bump()?;
                        self.expect(TokenKind::LParen)?;
                        let arm_condition = self.parse_expression()?;
                        self.expect(TokenKind::RParen)?;
                        let arm_block = self.parse_block()?;
                        let range = TextRange::new(arm_kw.range.start(), arm_block.range.end());
                        alternatives.push(ElseIf {
                            condition: arm_condition,
                            block: arm_block,
                            range,
                        });
                    } else {
                        alternative = Some(self.parse_block()?);
                        break;
                    }
                }
                _ => break,
            }
        }

        let end = alternative
            .as_ref()
            .map(|block| block.range.end())
            .or_else(|| alternatives.last().map(|arm| arm.range.end()))
            .unwrap_or_else(|| consequence.range.end());

        Ok(Statement::If(IfStmt {
            leading,
            condition,
            consequence,
            alternatives,
            alternative,
            range: TextRange::new(kw.range.start(), end),
        }))
    }

    fn expect_keyword_local(&mut self) -> Result<(), ParseError> {
        if self.peek() == TokenKind::KwLocal {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error_here("expected 'local' after 'declare'"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_statements;
    use crate::ast::Statement;

    #[test]
    fn test_if_chain() {
        let statements = parse_statements(
            r#"
if (req.http.Host) {
    restart;
} else if (req.http.X-Forwarded-For) {
    error 602;
} else {
    error 601;
}
"#,
        )
        .unwrap();
        let Statement::If(stmt) = &statements[0] else {
            panic!("expected if");
        };
        assert_eq!(stmt.alternatives.len(), 1);
        assert!(stmt.alternative.is_some());
    }

    #[test]
    fn test_goto_and_label() {
        let statements = parse_statements("goto done;\ndone:\nset req.http.X = \"1\";").unwrap();
        assert!(matches!(statements[0], Statement::Goto(_)));
        let Statement::Label(label) = &statements[1] else {
            panic!("expected label");
        };
        assert_eq!(label.label.name.as_str(), "done");
    }

    #[test]
    fn test_return_forms() {
        let statements =
            parse_statements("return;\nreturn (pass);\nreturn 1;\nreturn (1);").unwrap();
        let Statement::Return(bare) = &statements[0] else {
            panic!()
        };
        assert!(bare.expression.is_none());
        let Statement::Return(action) = &statements[1] else {
            panic!()
        };
        assert!(action.has_parens);
        let Statement::Return(value) = &statements[2] else {
            panic!()
        };
        assert!(!value.has_parens);
        let Statement::Return(paren_value) = &statements[3] else {
            panic!()
        };
        assert!(paren_value.has_parens);
    }

    #[test]
    fn test_error_with_message() {
        let statements = parse_statements(r#"error 900 "Forbidden";"#).unwrap();
        let Statement::Error(stmt) = &statements[0] else {
            panic!("expected error");
        };
        assert!(stmt.code.is_some());
        assert!(stmt.message.is_some());
    }

    #[test]
    fn test_nested_blocks() {
        let statements = parse_statements("{ { log \"deep\"; } }").unwrap();
        let Statement::Block(outer) = &statements[0] else {
            panic!("expected block");
        };
        assert!(matches!(outer.block.statements[0], Statement::Block(_)));
    }

    #[test]
    fn test_function_call_statement() {
        let statements = parse_statements(r#"std.collect(req.http.Cookie, "|");"#).unwrap();
        let Statement::FunctionCall(call) = &statements[0] else {
            panic!("expected function call");
        };
        assert_eq!(call.call.function.name.as_str(), "std.collect");
    }
}
