//! Expression parsing.
//!
//! Pratt-style binding powers. Juxtaposed operands (`"foo" req.http.Bar`)
//! fold into concatenation at the same binding power as `+`.

use smol_str::SmolStr;
use text_size::TextRange;

use crate::ast::{
    BinaryExpr, BinaryOp, BoolLit, CallExpr, Expression, FloatLit, GroupExpr, IfExpr, IntegerLit,
    PercentLit, PrefixExpr, PrefixOp, RtimeLit,
};
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

const BP_OR: u8 = 1;
const BP_AND: u8 = 2;
const BP_COMPARE: u8 = 3;
const BP_CONCAT: u8 = 4;

/// Binding power above every infix operator. Parsing at this power yields a
/// single operand, which is what `error` codes and table values need.
pub(crate) const BP_OPERAND: u8 = 5;

impl<'src> Parser<'src> {
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_expr_bp(0)
    }

    /// Parses a single operand with no infix folding.
    pub(crate) fn parse_operand(&mut self) -> Result<Expression, ParseError> {
        self.parse_expr_bp(BP_OPERAND)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expression, ParseError> {
        self.enter()?;
        let lhs = self.parse_expr_bp_inner(min_bp);
        if lhs.is_ok() {
            self.leave();
        }
        lhs
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_unary()?;

        loop {
            let (op, bp, consume) = match self.peek() {
                TokenKind::PipePipe => (BinaryOp::Or, BP_OR, true),
                TokenKind::AmpAmp => (BinaryOp::And, BP_AND, true),
                TokenKind::Eq => (BinaryOp::Eq, BP_COMPARE, true),
                TokenKind::NotEq => (BinaryOp::NotEq, BP_COMPARE, true),
                TokenKind::Tilde => (BinaryOp::Match, BP_COMPARE, true),
                TokenKind::NotTilde => (BinaryOp::NotMatch, BP_COMPARE, true),
                TokenKind::Lt => (BinaryOp::Lt, BP_COMPARE, true),
                TokenKind::Lte => (BinaryOp::Lte, BP_COMPARE, true),
                TokenKind::Gt => (BinaryOp::Gt, BP_COMPARE, true),
                TokenKind::Gte => (BinaryOp::Gte, BP_COMPARE, true),
                TokenKind::Plus => (BinaryOp::Concat, BP_CONCAT, true),
                kind if kind.can_start_operand() => (BinaryOp::Concat, BP_CONCAT, false),
                _ => break,
            };
            if bp < min_bp {
                break;
            }
            if consume {
                self.bump()?;
            }

            let rhs = self.parse_expr_bp(bp + 1)?;
            let range = TextRange::new(lhs.range().start(), rhs.range().end());
            lhs = Expression::Binary(BinaryExpr {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                range,
            });
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let op = match self.peek() {
            TokenKind::Bang => Some(PrefixOp::Not),
            TokenKind::Minus => Some(PrefixOp::Minus),
            TokenKind::Plus => Some(PrefixOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            let token = self.bump()?;
            // Recursing through the binding-power entry keeps the depth
            // guard on chains of prefix operators.
            let right = self.parse_expr_bp(BP_OPERAND)?;
            let range = TextRange::new(token.range.start(), right.range().end());
            return Ok(Expression::Prefix(PrefixExpr {
                op,
                right: Box::new(right),
                range,
            }));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            TokenKind::Ident => {
                if self.peek2() == TokenKind::LParen {
                    return Ok(Expression::Call(self.parse_call()?));
                }
                Ok(Expression::Ident(self.parse_ident()?))
            }
            TokenKind::StringLiteral | TokenKind::LongStringLiteral => {
                Ok(Expression::String(self.parse_string()?))
            }
            TokenKind::IntLiteral => {
                let token = self.bump()?;
                let value = token.text(self.source).parse::<i64>().map_err(|_| {
                    ParseError::new("integer literal out of range", token.range)
                })?;
                Ok(Expression::Integer(IntegerLit {
                    value,
                    range: token.range,
                }))
            }
            TokenKind::FloatLiteral => {
                let token = self.bump()?;
                let value = token.text(self.source).parse::<f64>().map_err(|_| {
                    ParseError::new("malformed float literal", token.range)
                })?;
                Ok(Expression::Float(FloatLit {
                    value,
                    range: token.range,
                }))
            }
            TokenKind::RtimeLiteral => {
                let token = self.bump()?;
                let text = token.text(self.source);
                let seconds = parse_duration_seconds(text)
                    .ok_or_else(|| ParseError::new("malformed duration literal", token.range))?;
                Ok(Expression::Rtime(RtimeLit {
                    text: SmolStr::new(text),
                    seconds,
                    range: token.range,
                }))
            }
            TokenKind::PercentLiteral => {
                let token = self.bump()?;
                let text = token.text(self.source);
                let value = text[..text.len() - 1].parse::<u32>().map_err(|_| {
                    ParseError::new("percentage literal out of range", token.range)
                })?;
                Ok(Expression::Percent(PercentLit {
                    value,
                    range: token.range,
                }))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let token = self.bump()?;
                Ok(Expression::Bool(BoolLit {
                    value: token.kind == TokenKind::KwTrue,
                    range: token.range,
                }))
            }
            TokenKind::KwIf => self.parse_if_expr(),
            TokenKind::LParen => {
                let open = self.bump()?;
                let inner = self.parse_expression()?;
                let close = self.expect(TokenKind::RParen)?;
                Ok(Expression::Group(GroupExpr {
                    inner: Box::new(inner),
                    range: TextRange::new(open.range.start(), close.range.end()),
                }))
            }
            _ => Err(self.error_here("expected expression")),
        }
    }

    /// `if(cond, consequence, alternative)` - the ternary expression.
    fn parse_if_expr(&mut self) -> Result<Expression, ParseError> {
        let kw = self.expect(TokenKind::KwIf)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Comma)?;
        let consequence = self.parse_expression()?;
        self.expect(TokenKind::Comma)?;
        let alternative = self.parse_expression()?;
        let close = self.expect(TokenKind::RParen)?;
        Ok(Expression::IfExpr(IfExpr {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative: Box::new(alternative),
            range: TextRange::new(kw.range.start(), close.range.end()),
        }))
    }

    pub(crate) fn parse_call(&mut self) -> Result<CallExpr, ParseError> {
        let function = self.parse_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek() != TokenKind::RParen {
            loop {
                args.push(self.parse_expression()?);
                if self.peek() != TokenKind::Comma {
                    break;
                }
                self.bump()?;
            }
        }
        let close = self.expect(TokenKind::RParen)?;
        Ok(CallExpr {
            range: TextRange::new(function.range.start(), close.range.end()),
            function,
            args,
        })
    }
}

fn parse_duration_seconds(text: &str) -> Option<f64> {
    let unit_start = text.find(|c: char| c.is_ascii_alphabetic())?;
    let amount = text[..unit_start].parse::<f64>().ok()?;
    let multiplier = match &text[unit_start..] {
        "ms" => 0.001,
        "s" => 1.0,
        "m" => 60.0,
        "h" => 3600.0,
        "d" => 86400.0,
        "y" => 31_536_000.0,
        _ => return None,
    };
    Some(amount * multiplier)
}

#[cfg(test)]
mod tests {
    use super::super::parse_statements;
    use super::*;
    use crate::ast::Statement;

    fn parse_set_value(source: &str) -> Expression {
        let full = format!("set req.http.X = {source};");
        let statements = parse_statements(&full).unwrap();
        let Statement::Set(set) = statements.into_iter().next().unwrap() else {
            panic!("expected set");
        };
        set.value
    }

    #[test]
    fn test_juxtaposition_folds_to_concat() {
        let value = parse_set_value(r#""example" req.http.User-Agent ",com""#);
        let Expression::Binary(outer) = value else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::Concat);
        let Expression::Binary(inner) = *outer.left else {
            panic!("expected nested concat");
        };
        assert_eq!(inner.op, BinaryOp::Concat);
    }

    #[test]
    fn test_plus_is_concat() {
        let value = parse_set_value(r#""foo" "bar" + "baz""#);
        let Expression::Binary(outer) = value else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::Concat);
    }

    #[test]
    fn test_ternary() {
        let value = parse_set_value(r#"if(req.http.H ~ "x", "1", 1)"#);
        let Expression::IfExpr(ternary) = value else {
            panic!("expected if expression");
        };
        assert!(matches!(*ternary.condition, Expression::Binary(_)));
        assert!(matches!(*ternary.alternative, Expression::Integer(_)));
    }

    #[test]
    fn test_logical_precedence() {
        let value = parse_set_value(r#"req.http.A == "x" && req.http.B ~ "y""#);
        let Expression::Binary(outer) = value else {
            panic!("expected binary");
        };
        assert_eq!(outer.op, BinaryOp::And);
        let Expression::Binary(left) = *outer.left else {
            panic!("expected comparison on the left");
        };
        assert_eq!(left.op, BinaryOp::Eq);
    }

    #[test]
    fn test_call_with_duration_argument() {
        let value = parse_set_value(r#"ratelimit.check_rate("k", c, 1, 60, 135, p, 2m)"#);
        let Expression::Call(call) = value else {
            panic!("expected call");
        };
        assert_eq!(call.function.name.as_str(), "ratelimit.check_rate");
        assert_eq!(call.args.len(), 7);
        assert!(matches!(call.args[6], Expression::Rtime(_)));
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(parse_duration_seconds("100ms"), Some(0.1));
        assert_eq!(parse_duration_seconds("2m"), Some(120.0));
        assert_eq!(parse_duration_seconds("0.5h"), Some(1800.0));
        assert_eq!(parse_duration_seconds("1w"), None);
    }
}
