//! Statement checks.

use smol_str::SmolStr;
use text_size::TextRange;

use falco_syntax::ast::{Block, Expression, Statement};
use falco_syntax::parse_statements;

use crate::catalog::{self, VariableLookup, VariableRef};
use crate::check::{ExprCx, SubContext};
use crate::diagnostics::Rule;
use crate::ident::is_protected_header;
use crate::linter::{Fatal, Linter};
use crate::phase::{error_statement_phases, esi_phases, restart_phases, synthetic_phases, Phase, PhaseSet};
use crate::symbols::LocalVar;
use crate::types::VclType;

/// How an assignment-like statement touches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Set,
    Add,
    Unset,
}

impl Access {
    fn verb(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Unset => "unset",
        }
    }
}

impl Linter<'_> {
    /// Collects goto labels declared anywhere in the body, reporting
    /// duplicate destinations.
    pub(crate) fn collect_labels(&mut self, block: &Block, sub_cx: &mut SubContext) {
        let mut found: Vec<(SmolStr, TextRange)> = Vec::new();
        collect_labels_into(block, &mut found);
        for (name, range) in found {
            if !sub_cx.labels.insert(name.clone()) {
                self.report(
                    Rule::DuplicateGotoDestination,
                    range,
                    format!("goto destination '{name}' is declared more than once"),
                );
            }
        }
    }

    pub(crate) fn check_statement(
        &mut self,
        statement: &Statement,
        sub_cx: &mut SubContext,
    ) -> Result<(), Fatal> {
        match statement {
            Statement::Block(stmt) => {
                for nested in &stmt.block.statements {
                    self.check_statement(nested, sub_cx)?;
                }
            }
            Statement::Declare(stmt) => {
                let name = stmt.name.name.as_str();
                if !name.starts_with("var.") {
                    self.report(
                        Rule::DeclareSyntax,
                        stmt.name.range,
                        format!("local variable '{name}' must start with 'var.'"),
                    );
                    return Ok(());
                }
                let Some(var_type) = VclType::from_name(&stmt.var_type.name) else {
                    self.report(
                        Rule::DeclareSyntax,
                        stmt.var_type.range,
                        format!("unknown type '{}' in declare", stmt.var_type.name),
                    );
                    return Ok(());
                };
                let previous = sub_cx.locals.declare(LocalVar {
                    name: stmt.name.name.clone(),
                    var_type,
                    range: stmt.name.range,
                    read: false,
                });
                if let Some(previous) = previous {
                    self.report_related(
                        Rule::DuplicateDeclaration,
                        stmt.name.range,
                        format!("local variable '{name}' is already declared"),
                        previous.range,
                        "first declared here",
                    );
                }
            }
            Statement::Set(stmt) => {
                let target = self.resolve_assignment_target(&stmt.target, sub_cx, Access::Set);
                if let Some(target_type) = target {
                    self.check_assignment_value(&stmt.value, target_type, sub_cx);
                } else {
                    // Still traverse the value so symbol usage and nested
                    // errors surface.
                    self.check_expression(&stmt.value, sub_cx, ExprCx::VALUE);
                }
            }
            Statement::Add(stmt) => {
                let target = self.resolve_assignment_target(&stmt.target, sub_cx, Access::Add);
                if let Some(target_type) = target {
                    self.check_assignment_value(&stmt.value, target_type, sub_cx);
                } else {
                    self.check_expression(&stmt.value, sub_cx, ExprCx::VALUE);
                }
            }
            Statement::Unset(stmt) => {
                self.resolve_assignment_target(&stmt.target, sub_cx, Access::Unset);
            }
            Statement::Remove(stmt) => {
                self.resolve_assignment_target(&stmt.target, sub_cx, Access::Unset);
            }
            Statement::Call(stmt) => self.check_call_statement(stmt, sub_cx),
            Statement::Error(stmt) => {
                self.check_statement_phase(
                    sub_cx,
                    error_statement_phases(),
                    "error",
                    stmt.range,
                );
                if let Some(code) = &stmt.code {
                    if let Expression::Integer(int) = code {
                        if int.value > 699 {
                            self.report(
                                Rule::ErrorCodeRange,
                                int.range,
                                format!("error code {} exceeds the custom range 600..=699", int.value),
                            );
                        }
                    } else {
                        let ty = self.check_expression(code, sub_cx, ExprCx::VALUE);
                        if !matches!(ty, VclType::Integer | VclType::Never) {
                            self.report(
                                Rule::TypeMismatch,
                                code.range(),
                                format!("error code must be INTEGER, got {}", ty.name()),
                            );
                        }
                    }
                }
                if let Some(message) = &stmt.message {
                    self.check_expression(message, sub_cx, ExprCx::VALUE);
                }
            }
            Statement::Restart(stmt) => {
                self.check_statement_phase(sub_cx, restart_phases(), "restart", stmt.range);
            }
            Statement::Return(stmt) => self.check_return(stmt, sub_cx),
            Statement::Esi(stmt) => {
                self.check_statement_phase(sub_cx, esi_phases(), "esi", stmt.range);
            }
            Statement::Synthetic(stmt) => {
                self.check_statement_phase(sub_cx, synthetic_phases(), "synthetic", stmt.range);
                if stmt.value.is_literal() && !matches!(stmt.value, Expression::String(_)) {
                    self.report(
                        Rule::TypeMismatch,
                        stmt.value.range(),
                        "synthetic body must be a string",
                    );
                } else {
                    self.check_expression(&stmt.value, sub_cx, ExprCx::VALUE);
                }
            }
            Statement::Log(stmt) => {
                if stmt.value.is_literal() && !matches!(stmt.value, Expression::String(_)) {
                    self.report(
                        Rule::LogArgument,
                        stmt.value.range(),
                        "log argument must be a string",
                    );
                } else {
                    self.check_expression(&stmt.value, sub_cx, ExprCx::VALUE);
                }
            }
            Statement::If(stmt) => {
                self.check_condition(&stmt.condition, sub_cx);
                for nested in &stmt.consequence.statements {
                    self.check_statement(nested, sub_cx)?;
                }
                for arm in &stmt.alternatives {
                    self.check_condition(&arm.condition, sub_cx);
                    for nested in &arm.block.statements {
                        self.check_statement(nested, sub_cx)?;
                    }
                }
                if let Some(alternative) = &stmt.alternative {
                    for nested in &alternative.statements {
                        self.check_statement(nested, sub_cx)?;
                    }
                }
            }
            Statement::Goto(stmt) => {
                if !sub_cx.labels.contains(&stmt.label.name) {
                    self.report(
                        Rule::UndefinedGotoDestination,
                        stmt.label.range,
                        format!("goto destination '{}' is not declared", stmt.label.name),
                    );
                }
            }
            Statement::Label(_) => {}
            Statement::Include(stmt) => {
                let module = stmt.module.value.clone();
                if self.include_stack.contains(&module) {
                    return Err(self.fatal_at(
                        stmt.range,
                        format!("include cycle detected through '{module}'"),
                    ));
                }
                let resolved = self.resolve_source(&module, stmt.range)?;
                self.include_stack.push(module);
                self.check_included_statements(&resolved.name, &resolved.source, sub_cx)?;
                self.include_stack.pop();
            }
            Statement::FunctionCall(stmt) => {
                let name = stmt.call.function.name.as_str();
                if let Some(entry) = catalog::function(name) {
                    if entry.returns.is_some() {
                        self.report(
                            Rule::FunctionStatement,
                            stmt.range,
                            format!("function '{name}' returns a value and cannot stand alone"),
                        );
                    }
                    self.check_call_args(entry, &stmt.call, sub_cx);
                } else if self.ctx.symbols.subroutine(name).is_some() {
                    self.report(
                        Rule::FunctionStatement,
                        stmt.range,
                        format!("subroutine '{name}' cannot be invoked as a function statement"),
                    );
                } else {
                    self.report(
                        Rule::UndefinedFunction,
                        stmt.call.function.range,
                        format!("function '{name}' is not defined"),
                    );
                }
            }
        }
        Ok(())
    }

    /// Parses and checks a statement sequence from an include or snippet
    /// within the current subroutine context.
    pub(crate) fn check_included_statements(
        &mut self,
        file_name: &str,
        source: &str,
        sub_cx: &mut SubContext,
    ) -> Result<(), Fatal> {
        let statements = parse_statements(source).map_err(|err| Fatal {
            file: SmolStr::new(file_name),
            message: err.message,
            range: err.range,
        })?;
        let file = self.register_file(file_name, source);
        let saved = self.current_file;
        self.current_file = file;
        self.collect_labels(
            &Block {
                statements: statements.clone(),
                trailing: Vec::new(),
                range: TextRange::default(),
            },
            sub_cx,
        );
        for statement in &statements {
            self.check_statement(statement, sub_cx)?;
        }
        self.current_file = saved;
        Ok(())
    }

    fn check_call_statement(
        &mut self,
        stmt: &falco_syntax::ast::CallStmt,
        sub_cx: &mut SubContext,
    ) {
        let name = stmt.subroutine.name.as_str();
        match self.ctx.symbols.subroutine_return_type(name) {
            None => self.report(
                Rule::InvalidCallTarget,
                stmt.subroutine.range,
                format!("subroutine '{name}' is not declared"),
            ),
            Some(Some(_)) => self.report(
                Rule::InvalidCallTarget,
                stmt.subroutine.range,
                format!("subroutine '{name}' has a return type and must be used as a function"),
            ),
            Some(None) => {
                let callee_phases = self
                    .ctx
                    .symbols
                    .subroutine_phases(name)
                    .unwrap_or_else(PhaseSet::all);
                self.ctx.symbols.use_subroutine(name);
                if !sub_cx.phases.is_subset_of(callee_phases) {
                    self.report(
                        Rule::StatementScope,
                        stmt.range,
                        format!(
                            "subroutine '{name}' runs in [{callee_phases}] and cannot be called from [{}]",
                            sub_cx.phases
                        ),
                    );
                }
            }
        }
    }

    fn check_return(&mut self, stmt: &falco_syntax::ast::ReturnStmt, sub_cx: &mut SubContext) {
        match sub_cx.return_type {
            None => self.check_state_return(stmt, sub_cx),
            Some(return_type) => self.check_value_return(stmt, sub_cx, return_type),
        }
    }

    /// Return in a reserved or untyped subroutine: bare, or a state action.
    fn check_state_return(&mut self, stmt: &falco_syntax::ast::ReturnStmt, sub_cx: &mut SubContext) {
        let Some(expression) = &stmt.expression else {
            if sub_cx.reserved.is_some() {
                self.report(
                    Rule::EmptyReturn,
                    stmt.range,
                    "state subroutines cannot use a bare 'return;'",
                );
            }
            return;
        };

        let Expression::Ident(ident) = strip_group(expression) else {
            self.report(
                Rule::InvalidReturnForm,
                expression.range(),
                "return from a state subroutine takes an action keyword",
            );
            return;
        };
        let action = ident.name.as_str();
        let valid = sub_cx
            .phases
            .iter()
            .any(|phase| phase.return_actions().contains(&action));
        if !valid {
            self.report(
                Rule::InvalidReturnAction,
                ident.range,
                format!("'{action}' is not a valid return action in [{}]", sub_cx.phases),
            );
        }
    }

    /// Return in a typed subroutine: a bare value of the declared type.
    fn check_value_return(
        &mut self,
        stmt: &falco_syntax::ast::ReturnStmt,
        sub_cx: &mut SubContext,
        return_type: VclType,
    ) {
        let Some(expression) = &stmt.expression else {
            self.report(
                Rule::InvalidReturnForm,
                stmt.range,
                format!("subroutine must return {}", return_type.name()),
            );
            return;
        };

        if stmt.has_parens {
            if matches!(expression, Expression::Integer(_) | Expression::Float(_)) {
                self.report(
                    Rule::InvalidReturnForm,
                    expression.range(),
                    "parenthesized returns are reserved for state actions",
                );
                return;
            }
            if let Expression::Ident(ident) = expression {
                if is_action_keyword(&ident.name) {
                    self.report(
                        Rule::InvalidReturnForm,
                        ident.range,
                        "state actions cannot be returned from a typed subroutine",
                    );
                    return;
                }
            }
        }

        // Operator expressions in a return value are only meaningful for
        // BOOL subroutines, where the value is a condition.
        if return_type == VclType::Bool {
            let ty = self.check_expression(expression, sub_cx, ExprCx::CONDITION);
            if !matches!(ty, VclType::Bool | VclType::Never) {
                self.report(
                    Rule::InvalidReturnType,
                    expression.range(),
                    format!("return value must be BOOL, got {}", ty.name()),
                );
            }
            return;
        }

        if matches!(expression, Expression::Binary(_) | Expression::Prefix(_)) {
            self.report(
                Rule::InvalidReturnForm,
                expression.range(),
                "return value must be a single operand",
            );
            return;
        }

        let ty = self.check_expression(expression, sub_cx, ExprCx::VALUE);
        if ty != return_type && ty != VclType::Never {
            let compatible = return_type == VclType::Time && ty == VclType::String;
            if !compatible {
                self.report(
                    Rule::InvalidReturnType,
                    expression.range(),
                    format!(
                        "return value must be {}, got {}",
                        return_type.name(),
                        ty.name()
                    ),
                );
            }
        }
    }

    fn check_statement_phase(
        &mut self,
        sub_cx: &SubContext,
        allowed: PhaseSet,
        what: &str,
        range: TextRange,
    ) {
        if !sub_cx.phases.intersects(allowed) {
            self.report(
                Rule::StatementScope,
                range,
                format!("'{what}' is not allowed in [{}]", sub_cx.phases),
            );
        }
    }

    /// Resolves a set/add/unset target. Returns the target's type when the
    /// assignment should be type-checked further.
    fn resolve_assignment_target(
        &mut self,
        target: &falco_syntax::ast::Ident,
        sub_cx: &mut SubContext,
        access: Access,
    ) -> Option<VclType> {
        let name = target.name.as_str();

        if name.starts_with("var.") {
            match access {
                Access::Add => {
                    self.report(
                        Rule::InvalidAddTarget,
                        target.range,
                        "add is only valid on HTTP headers",
                    );
                    return None;
                }
                Access::Unset => {
                    self.report(
                        Rule::NotUnsettable,
                        target.range,
                        format!("local variable '{name}' cannot be unset"),
                    );
                    return None;
                }
                Access::Set => {}
            }
            return match sub_cx.locals.get(name) {
                Some(var) => Some(var.var_type),
                None => {
                    self.report(
                        Rule::UndefinedVariable,
                        target.range,
                        format!("local variable '{name}' is not declared"),
                    );
                    None
                }
            };
        }

        match catalog::lookup_variable(name) {
            VariableLookup::Variable(var) => {
                self.check_variable_target(target, sub_cx, access, &var)
            }
            VariableLookup::ReGroup { .. } => {
                self.report(
                    Rule::NotWritable,
                    target.range,
                    "regex capture variables are read-only",
                );
                None
            }
            VariableLookup::RatecounterBucket { .. } => {
                self.report(
                    Rule::NotWritable,
                    target.range,
                    "ratecounter buckets are read-only",
                );
                None
            }
            VariableLookup::NotFound => {
                self.report(
                    Rule::UndefinedVariable,
                    target.range,
                    format!("variable '{name}' is not defined"),
                );
                None
            }
        }
    }

    fn check_variable_target(
        &mut self,
        target: &falco_syntax::ast::Ident,
        sub_cx: &SubContext,
        access: Access,
        var: &VariableRef,
    ) -> Option<VclType> {
        let name = target.name.as_str();

        if let Some(header) = &var.http_header {
            let bare = header.split(':').next().unwrap_or(header);
            if is_protected_header(bare) {
                self.report(
                    Rule::ProtectedHeader,
                    target.range,
                    format!("HTTP header '{bare}' is protected and cannot be modified"),
                );
                return None;
            }
        } else if access == Access::Add {
            self.report(
                Rule::InvalidAddTarget,
                target.range,
                "add is only valid on HTTP headers",
            );
            return None;
        }

        let (permitted, rule) = match access {
            Access::Set | Access::Add => (var.set, Rule::NotWritable),
            Access::Unset => (var.unset, Rule::NotUnsettable),
        };
        if permitted.is_empty() {
            self.report(
                rule,
                target.range,
                format!("variable '{name}' cannot be {}", access.verb()),
            );
            return None;
        }
        if !sub_cx.phases.is_subset_of(permitted) {
            self.report(
                Rule::VariableScope,
                target.range,
                format!(
                    "variable '{name}' can only be {} in [{permitted}], not [{}]",
                    access.verb(),
                    sub_cx.phases
                ),
            );
            return None;
        }
        (access != Access::Unset).then_some(var.ty)
    }

    /// Checks the right-hand side of set/add against the target type.
    fn check_assignment_value(
        &mut self,
        value: &Expression,
        target_type: VclType,
        sub_cx: &mut SubContext,
    ) {
        let actual = self.check_expression(value, sub_cx, ExprCx::VALUE);
        if actual == VclType::Never || actual == target_type {
            return;
        }
        let accepted = match target_type {
            VclType::String => self.is_string_viewish(value),
            // Absolute times parse from strings.
            VclType::Time => actual == VclType::String,
            _ => false,
        };
        if !accepted {
            self.report(
                Rule::TypeMismatch,
                value.range(),
                format!(
                    "{} is not assignable to {}",
                    actual.name(),
                    target_type.name()
                ),
            );
        }
    }
}

fn collect_labels_into(block: &Block, out: &mut Vec<(SmolStr, TextRange)>) {
    for statement in &block.statements {
        match statement {
            Statement::Label(label) => out.push((label.label.name.clone(), label.range)),
            Statement::Block(stmt) => collect_labels_into(&stmt.block, out),
            Statement::If(stmt) => {
                collect_labels_into(&stmt.consequence, out);
                for arm in &stmt.alternatives {
                    collect_labels_into(&arm.block, out);
                }
                if let Some(alternative) = &stmt.alternative {
                    collect_labels_into(alternative, out);
                }
            }
            _ => {}
        }
    }
}

fn strip_group(expression: &Expression) -> &Expression {
    match expression {
        Expression::Group(group) => strip_group(&group.inner),
        other => other,
    }
}

/// True if the identifier is a state action keyword in any phase.
fn is_action_keyword(name: &str) -> bool {
    Phase::ALL
        .iter()
        .any(|phase| phase.return_actions().contains(&name))
}
