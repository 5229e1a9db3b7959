//! Expression type checking.

use falco_syntax::ast::{BinaryExpr, BinaryOp, CallExpr, Expression, PrefixOp};

use crate::catalog::{self, ArgKind, FunctionEntry, VariableLookup};
use crate::check::{ExprCx, SubContext};
use crate::diagnostics::Rule;
use crate::linter::Linter;
use crate::pattern;
use crate::phase::PhaseSet;
use crate::types::VclType;

impl Linter<'_> {
    /// Assigns a type to an expression, reporting violations along the way.
    /// `Never` marks failed resolution; callers skip follow-up checks on it
    /// to avoid error cascades.
    pub(crate) fn check_expression(
        &mut self,
        expression: &Expression,
        sub_cx: &mut SubContext,
        cx: ExprCx,
    ) -> VclType {
        match expression {
            Expression::Ident(ident) => self.check_ident(ident, sub_cx),
            Expression::String(_) => VclType::String,
            Expression::Integer(_) => VclType::Integer,
            Expression::Float(_) => VclType::Float,
            Expression::Bool(_) => VclType::Bool,
            Expression::Rtime(_) => VclType::Rtime,
            Expression::Percent(_) => VclType::Never,
            Expression::Group(group) => self.check_expression(&group.inner, sub_cx, cx),
            Expression::Prefix(prefix) => self.check_prefix(prefix, sub_cx, cx),
            Expression::Binary(binary) => self.check_binary(binary, sub_cx, cx),
            Expression::IfExpr(ternary) => self.check_ternary(ternary, sub_cx),
            Expression::Call(call) => self.check_call_expr(call, sub_cx),
        }
    }

    fn check_ident(&mut self, ident: &falco_syntax::ast::Ident, sub_cx: &mut SubContext) -> VclType {
        let name = ident.name.as_str();

        if name.starts_with("var.") {
            return match sub_cx.locals.read(name) {
                Some(var) => var.var_type,
                None => {
                    self.report(
                        Rule::UndefinedVariable,
                        ident.range,
                        format!("local variable '{name}' is not declared"),
                    );
                    VclType::Never
                }
            };
        }

        match catalog::lookup_variable(name) {
            VariableLookup::Variable(var) => {
                if var.get.is_empty() {
                    self.report(
                        Rule::VariableScope,
                        ident.range,
                        format!("variable '{name}' is not readable"),
                    );
                } else if !sub_cx.phases.is_subset_of(var.get) {
                    self.report(
                        Rule::VariableScope,
                        ident.range,
                        format!(
                            "variable '{name}' is only available in [{}], not [{}]",
                            var.get, sub_cx.phases
                        ),
                    );
                }
                var.ty
            }
            VariableLookup::ReGroup { index } => {
                if sub_cx.regex_matches == 0 {
                    self.report(
                        Rule::ReGroupWithoutMatch,
                        ident.range,
                        format!("re.group.{index} is read before any regex match"),
                    );
                } else if sub_cx.regex_matches >= 2 {
                    self.report(
                        Rule::ReGroupOverridden,
                        ident.range,
                        format!("re.group.{index} may be overridden by a later regex match"),
                    );
                }
                VclType::String
            }
            VariableLookup::RatecounterBucket { counter, window } => {
                if self.ctx.symbols.use_ratecounter(&counter).is_none() {
                    self.report(
                        Rule::UndefinedVariable,
                        ident.range,
                        format!("ratecounter '{counter}' is not declared"),
                    );
                } else if !catalog::is_valid_bucket_window(&window) {
                    self.report(
                        Rule::RatecounterBucketDuration,
                        ident.range,
                        format!("'{window}' is not a valid bucket window (10s..60s)"),
                    );
                }
                VclType::Integer
            }
            VariableLookup::NotFound => {
                if self.ctx.symbols.use_backend(name).is_some() {
                    return VclType::Backend;
                }
                if self.ctx.symbols.use_acl(name).is_some() {
                    return VclType::Acl;
                }
                if self.ctx.symbols.use_table(name).is_some() {
                    return VclType::Id;
                }
                if self.ctx.symbols.use_penaltybox(name).is_some()
                    || self.ctx.symbols.use_ratecounter(name).is_some()
                {
                    return VclType::Id;
                }
                self.report(
                    Rule::UndefinedVariable,
                    ident.range,
                    format!("variable '{name}' is not defined"),
                );
                VclType::Never
            }
        }
    }

    fn check_prefix(
        &mut self,
        prefix: &falco_syntax::ast::PrefixExpr,
        sub_cx: &mut SubContext,
        cx: ExprCx,
    ) -> VclType {
        match prefix.op {
            PrefixOp::Not => {
                if !cx.condition {
                    self.report(
                        Rule::OperatorConditionOnly,
                        prefix.range,
                        "'!' is only allowed inside a condition",
                    );
                    return VclType::Bool;
                }
                if prefix.right.is_literal() && !matches!(&*prefix.right, Expression::Bool(_)) {
                    self.report(
                        Rule::OperandMismatch,
                        prefix.right.range(),
                        "'!' expects a boolean operand",
                    );
                    return VclType::Bool;
                }
                let ty = self.check_expression(&prefix.right, sub_cx, cx);
                if !matches!(ty, VclType::Bool | VclType::String | VclType::Never) {
                    self.report(
                        Rule::OperandMismatch,
                        prefix.right.range(),
                        format!("'!' expects a boolean operand, got {}", ty.name()),
                    );
                }
                VclType::Bool
            }
            PrefixOp::Minus | PrefixOp::Plus => {
                let ty = self.check_expression(&prefix.right, sub_cx, ExprCx::VALUE);
                if ty.is_comparable_numeric() || ty == VclType::Never {
                    ty
                } else {
                    self.report(
                        Rule::OperandMismatch,
                        prefix.range,
                        format!("'{}' expects a numeric operand, got {}", prefix.op.as_str(), ty.name()),
                    );
                    VclType::Never
                }
            }
        }
    }

    fn check_binary(
        &mut self,
        binary: &BinaryExpr,
        sub_cx: &mut SubContext,
        cx: ExprCx,
    ) -> VclType {
        match binary.op {
            BinaryOp::Concat => {
                self.check_concat_operand(&binary.left, sub_cx);
                self.check_concat_operand(&binary.right, sub_cx);
                VclType::String
            }
            BinaryOp::And | BinaryOp::Or => {
                if !cx.condition {
                    self.report(
                        Rule::OperatorConditionOnly,
                        binary.range,
                        format!("'{}' is only allowed inside a condition", binary.op.as_str()),
                    );
                    return VclType::Bool;
                }
                self.check_logical_operand(&binary.left, sub_cx);
                self.check_logical_operand(&binary.right, sub_cx);
                VclType::Bool
            }
            BinaryOp::Eq | BinaryOp::NotEq => self.check_comparison(binary, sub_cx, cx, false),
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
                self.check_comparison(binary, sub_cx, cx, true)
            }
            BinaryOp::Match | BinaryOp::NotMatch => self.check_match(binary, sub_cx, cx),
        }
    }

    fn check_concat_operand(&mut self, operand: &Expression, sub_cx: &mut SubContext) {
        let ty = self.check_expression(operand, sub_cx, ExprCx::VALUE);
        if matches!(ty, VclType::String | VclType::Never) || self.is_string_viewish(operand) {
            return;
        }
        self.report(
            Rule::ImplicitStringConversion,
            operand.range(),
            format!("concatenation without string type: {} is implicitly converted", ty.name()),
        );
    }

    fn check_logical_operand(&mut self, operand: &Expression, sub_cx: &mut SubContext) {
        if operand.is_literal() && !matches!(operand, Expression::Bool(_)) {
            self.report(
                Rule::LiteralCondition,
                operand.range(),
                "literals cannot be used as conditions",
            );
            return;
        }
        let ty = self.check_expression(operand, sub_cx, ExprCx::CONDITION);
        if !matches!(ty, VclType::Bool | VclType::String | VclType::Never) {
            self.report(
                Rule::InvalidCondition,
                operand.range(),
                format!("condition operand must be BOOL, got {}", ty.name()),
            );
        }
    }

    fn check_comparison(
        &mut self,
        binary: &BinaryExpr,
        sub_cx: &mut SubContext,
        cx: ExprCx,
        ordered: bool,
    ) -> VclType {
        if !cx.condition {
            self.report(
                Rule::OperatorConditionOnly,
                binary.range,
                format!("'{}' is only allowed inside a condition", binary.op.as_str()),
            );
            return VclType::Bool;
        }
        if binary.left.is_literal() {
            self.report(
                Rule::LiteralCondition,
                binary.left.range(),
                "literals cannot be used on the left of a comparison",
            );
            return VclType::Bool;
        }

        let left = self.check_expression(&binary.left, sub_cx, ExprCx::VALUE);
        let right = self.check_expression(&binary.right, sub_cx, ExprCx::VALUE);
        if left == VclType::Never || right == VclType::Never {
            return VclType::Bool;
        }

        let compatible = if ordered {
            let same_numeric = left == right && left.is_comparable_numeric();
            // An integer literal is readable as a duration bound.
            let rtime_bound = left == VclType::Rtime
                && right == VclType::Integer
                && binary.right.is_literal();
            same_numeric || rtime_bound
        } else {
            left == right
        };
        if !compatible {
            self.report(
                Rule::OperandMismatch,
                binary.range,
                format!(
                    "'{}' cannot compare {} with {}",
                    binary.op.as_str(),
                    left.name(),
                    right.name()
                ),
            );
        }
        VclType::Bool
    }

    fn check_match(&mut self, binary: &BinaryExpr, sub_cx: &mut SubContext, cx: ExprCx) -> VclType {
        if !cx.condition {
            self.report(
                Rule::OperatorConditionOnly,
                binary.range,
                format!("'{}' is only allowed inside a condition", binary.op.as_str()),
            );
            return VclType::Bool;
        }

        let left = self.check_expression(&binary.left, sub_cx, ExprCx::VALUE);
        if !matches!(left, VclType::String | VclType::Ip | VclType::Never)
            && !self.is_string_viewish(&binary.left)
        {
            self.report(
                Rule::OperandMismatch,
                binary.left.range(),
                format!(
                    "left side of '{}' must be STRING or IP, got {}",
                    binary.op.as_str(),
                    left.name()
                ),
            );
        }

        match &*binary.right {
            Expression::String(pattern) => {
                if let Err(err) = pattern::validate(&pattern.value) {
                    self.report(
                        Rule::InvalidRegex,
                        pattern.range,
                        format!("invalid regex pattern: {}", err.message),
                    );
                }
                sub_cx.regex_matches += 1;
            }
            Expression::Ident(ident) if self.ctx.symbols.acl(&ident.name).is_some() => {
                self.ctx.symbols.use_acl(&ident.name);
            }
            other => {
                let right = self.check_expression(other, sub_cx, ExprCx::VALUE);
                match right {
                    // A dynamic pattern; captures change at runtime.
                    VclType::String => sub_cx.regex_matches += 1,
                    VclType::Never => {}
                    _ => self.report(
                        Rule::OperandMismatch,
                        other.range(),
                        format!(
                            "right side of '{}' must be a regex STRING or an ACL, got {}",
                            binary.op.as_str(),
                            right.name()
                        ),
                    ),
                }
            }
        }
        VclType::Bool
    }

    fn check_ternary(
        &mut self,
        ternary: &falco_syntax::ast::IfExpr,
        sub_cx: &mut SubContext,
    ) -> VclType {
        self.check_condition(&ternary.condition, sub_cx);
        let consequence = self.check_expression(&ternary.consequence, sub_cx, ExprCx::VALUE);
        let alternative = self.check_expression(&ternary.alternative, sub_cx, ExprCx::VALUE);

        if consequence == VclType::Never {
            return alternative;
        }
        if alternative == VclType::Never {
            return consequence;
        }
        if consequence != alternative {
            self.report(
                Rule::IfExpressionTypes,
                ternary.range,
                format!(
                    "if() branches disagree: {} vs {}",
                    consequence.name(),
                    alternative.name()
                ),
            );
            return VclType::Never;
        }
        consequence
    }

    /// Condition of an `if` statement or ternary expression.
    pub(crate) fn check_condition(&mut self, condition: &Expression, sub_cx: &mut SubContext) {
        if condition.is_literal() {
            self.report(
                Rule::LiteralCondition,
                condition.range(),
                "literals cannot be used as conditions",
            );
            return;
        }
        let ty = self.check_expression(condition, sub_cx, ExprCx::CONDITION);
        // A bare STRING variable is an existence test; everything else must
        // produce a boolean.
        if !matches!(ty, VclType::Bool | VclType::String | VclType::Never) {
            self.report(
                Rule::InvalidCondition,
                condition.range(),
                format!("condition must be BOOL, got {}", ty.name()),
            );
        }
    }

    fn check_call_expr(&mut self, call: &CallExpr, sub_cx: &mut SubContext) -> VclType {
        let name = call.function.name.as_str();

        if let Some(entry) = catalog::function(name) {
            self.check_call_args(entry, call, sub_cx);
            return match entry.returns {
                Some(ty) => ty,
                None => {
                    self.report(
                        Rule::TypeMismatch,
                        call.range,
                        format!("function '{name}' returns no value"),
                    );
                    VclType::Never
                }
            };
        }

        match self.ctx.symbols.subroutine_return_type(name) {
            Some(Some(return_type)) => {
                let callee_phases = self
                    .ctx
                    .symbols
                    .subroutine_phases(name)
                    .unwrap_or_else(PhaseSet::all);
                self.ctx.symbols.use_subroutine(name);
                if !sub_cx.phases.is_subset_of(callee_phases) {
                    self.report(
                        Rule::StatementScope,
                        call.range,
                        format!(
                            "subroutine '{name}' runs in [{callee_phases}] and cannot be called from [{}]",
                            sub_cx.phases
                        ),
                    );
                }
                if !call.args.is_empty() {
                    self.report(
                        Rule::ArgumentCount,
                        call.range,
                        format!("subroutine '{name}' takes no arguments"),
                    );
                }
                return_type
            }
            Some(None) => {
                self.report(
                    Rule::InvalidCallTarget,
                    call.range,
                    format!("subroutine '{name}' has no return type; invoke it with 'call {name};'"),
                );
                VclType::Never
            }
            None => {
                self.report(
                    Rule::UndefinedFunction,
                    call.function.range,
                    format!("function '{name}' is not defined"),
                );
                VclType::Never
            }
        }
    }

    pub(crate) fn check_call_args(
        &mut self,
        entry: &FunctionEntry,
        call: &CallExpr,
        sub_cx: &mut SubContext,
    ) {
        let given = call.args.len();
        if given < entry.required || (given > entry.args.len() && entry.variadic.is_none()) {
            let expected = if entry.variadic.is_some() {
                format!("at least {}", entry.required)
            } else if entry.required == entry.args.len() {
                format!("{}", entry.required)
            } else {
                format!("{} to {}", entry.required, entry.args.len())
            };
            self.report(
                Rule::ArgumentCount,
                call.range,
                format!(
                    "function '{}' expects {expected} argument(s), got {given}",
                    entry.name
                ),
            );
            return;
        }

        for (position, arg) in call.args.iter().enumerate() {
            let kind = if position < entry.args.len() {
                entry.args[position]
            } else {
                match entry.variadic {
                    Some(kind) => kind,
                    None => break,
                }
            };
            self.check_arg(entry.name, position, kind, arg, sub_cx);
        }
    }

    fn check_arg(
        &mut self,
        function: &str,
        position: usize,
        kind: ArgKind,
        arg: &Expression,
        sub_cx: &mut SubContext,
    ) {
        match kind {
            ArgKind::Value(expected) => {
                let actual = self.check_expression(arg, sub_cx, ExprCx::VALUE);
                if actual == expected || actual == VclType::Never {
                    return;
                }
                let accepted = match expected {
                    VclType::String => self.is_string_viewish(arg),
                    VclType::Time => actual == VclType::String,
                    _ => false,
                };
                if !accepted {
                    self.report(
                        Rule::ArgumentType,
                        arg.range(),
                        format!(
                            "argument {} of '{function}' must be {}, got {}",
                            position + 1,
                            expected.name(),
                            actual.name()
                        ),
                    );
                }
            }
            ArgKind::Regex => match arg {
                Expression::String(pattern) => {
                    if let Err(err) = pattern::validate(&pattern.value) {
                        self.report(
                            Rule::InvalidRegex,
                            pattern.range,
                            format!("invalid regex pattern: {}", err.message),
                        );
                    }
                }
                other => {
                    let actual = self.check_expression(other, sub_cx, ExprCx::VALUE);
                    if !matches!(actual, VclType::String | VclType::Never) {
                        self.report(
                            Rule::ArgumentType,
                            other.range(),
                            format!(
                                "argument {} of '{function}' must be a regex STRING",
                                position + 1
                            ),
                        );
                    }
                }
            },
            ArgKind::TableName
            | ArgKind::AclName
            | ArgKind::BackendName
            | ArgKind::PenaltyboxName
            | ArgKind::RatecounterName => self.check_symbol_arg(function, position, kind, arg),
        }
    }

    fn check_symbol_arg(
        &mut self,
        function: &str,
        position: usize,
        kind: ArgKind,
        arg: &Expression,
    ) {
        let Expression::Ident(ident) = arg else {
            self.report(
                Rule::ArgumentType,
                arg.range(),
                format!(
                    "argument {} of '{function}' must be a {}",
                    position + 1,
                    kind.describe()
                ),
            );
            return;
        };
        let name = ident.name.as_str();
        let found = match kind {
            ArgKind::TableName => self.ctx.symbols.use_table(name).is_some(),
            ArgKind::AclName => self.ctx.symbols.use_acl(name).is_some(),
            ArgKind::BackendName => self.ctx.symbols.use_backend(name).is_some(),
            ArgKind::PenaltyboxName => self.ctx.symbols.use_penaltybox(name).is_some(),
            ArgKind::RatecounterName => self.ctx.symbols.use_ratecounter(name).is_some(),
            _ => unreachable!(),
        };
        if !found {
            self.report(
                Rule::UndefinedSymbol,
                ident.range,
                format!("{} '{name}' is not defined", kind.describe()),
            );
        }
    }

    /// True if the expression is a predefined identifier with the fuzzy
    /// string-view capability.
    pub(crate) fn is_string_viewish(&self, expression: &Expression) -> bool {
        let Expression::Ident(ident) = expression else {
            return false;
        };
        match catalog::lookup_variable(&ident.name) {
            VariableLookup::Variable(var) => var.string_view,
            VariableLookup::ReGroup { .. } => true,
            _ => false,
        }
    }
}
