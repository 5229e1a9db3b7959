//! The lint driver.
//!
//! Linting is two passes over the linked declaration list: the first pass
//! hoists declarations into the symbol tables (forward references are
//! legal), the second checks declaration bodies. Declaration-level includes
//! are expanded during linking, so included declarations participate in
//! hoisting like everything else. Phase inference runs between the passes,
//! and the unused-symbol sweep plus the suppression post-filter run at the
//! end.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::TextRange;

use falco_syntax::ast::{Block, Declaration, Expression, IncludeDecl, SourceFile, Statement};
use falco_syntax::{parse_file, LineIndex};

use crate::config::Strictness;
use crate::context::{Context, VclSource};
use crate::diagnostics::{Diagnostic, Rule, Severity};
use crate::ident::reserved_subroutine_phase;
use crate::phase::{annotation_phases, PhaseSet};
use crate::suppress::SuppressIndex;
use crate::symbols::{Symbol, SymbolKind};
use crate::types::VclType;

/// An unrecoverable failure: a parse error, an unresolvable include, or an
/// include cycle. Halts traversal and is returned separately from the
/// diagnostics list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fatal {
    /// The file the failure occurred in.
    pub file: SmolStr,
    /// What failed.
    pub message: String,
    /// Where it failed.
    pub range: TextRange,
}

/// The outcome of a lint run.
#[derive(Debug)]
pub struct LintResult {
    /// Collected diagnostics, in traversal order, after suppression.
    pub diagnostics: Vec<Diagnostic>,
    /// The fatal failure, if traversal was halted.
    pub fatal: Option<Fatal>,
}

impl LintResult {
    fn fatal_only(fatal: Fatal) -> Self {
        Self {
            diagnostics: Vec::new(),
            fatal: Some(fatal),
        }
    }

    /// Diagnostics with the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diag| diag.severity == severity)
    }

    /// True if no error-severity diagnostics were produced.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fatal.is_none() && self.with_severity(Severity::Error).next().is_none()
    }
}

/// Lints the resolver's main VCL.
pub fn lint(context: &mut Context) -> LintResult {
    let main = match context.resolver.as_ref() {
        Some(resolver) => resolver.main_vcl(),
        None => {
            return LintResult::fatal_only(Fatal {
                file: SmolStr::default(),
                message: "no resolver supplied".to_string(),
                range: TextRange::default(),
            })
        }
    };
    match main {
        Ok(vcl) => {
            let name = vcl.name.clone();
            let source = vcl.source;
            lint_source(context, &name, &source)
        }
        Err(err) => LintResult::fatal_only(Fatal {
            file: SmolStr::default(),
            message: err.to_string(),
            range: TextRange::default(),
        }),
    }
}

/// Lints a single named source, resolving includes through the context's
/// resolver when present.
pub fn lint_source(context: &mut Context, name: &str, source: &str) -> LintResult {
    let mut linter = Linter {
        ctx: context,
        files: Vec::new(),
        include_stack: Vec::new(),
        current_file: 0,
    };
    let fatal = linter.run(name, source).err();
    linter.finish(fatal)
}

pub(crate) struct FileInfo {
    pub(crate) name: SmolStr,
    pub(crate) index: LineIndex,
    pub(crate) suppress: SuppressIndex,
}

pub(crate) struct Linter<'ctx> {
    pub(crate) ctx: &'ctx mut Context,
    pub(crate) files: Vec<FileInfo>,
    pub(crate) include_stack: Vec<SmolStr>,
    pub(crate) current_file: usize,
}

impl Linter<'_> {
    fn run(&mut self, name: &str, source: &str) -> Result<(), Fatal> {
        tracing::debug!(file = name, "lint file");
        let decls = self.link(name, source)?;
        self.hoist(&decls);
        self.infer_phases(&decls);
        for (file, decl) in &decls {
            self.current_file = *file;
            self.check_declaration(decl)?;
        }
        self.sweep_unused();
        Ok(())
    }

    // ===== diagnostics =====

    pub(crate) fn report(&mut self, rule: Rule, range: TextRange, message: impl Into<String>) {
        let mut diagnostic = Diagnostic::new(rule, range, message);
        diagnostic.file = self.files[self.current_file].name.clone();
        self.ctx.diagnostics.add(diagnostic);
    }

    pub(crate) fn report_related(
        &mut self,
        rule: Rule,
        range: TextRange,
        message: impl Into<String>,
        related_range: TextRange,
        related: impl Into<String>,
    ) {
        let mut diagnostic = Diagnostic::new(rule, range, message).with_related(related_range, related);
        diagnostic.file = self.files[self.current_file].name.clone();
        self.ctx.diagnostics.add(diagnostic);
    }

    pub(crate) fn fatal_at(&self, range: TextRange, message: impl Into<String>) -> Fatal {
        Fatal {
            file: self.files[self.current_file].name.clone(),
            message: message.into(),
            range,
        }
    }

    // ===== linking =====

    fn link(&mut self, name: &str, source: &str) -> Result<Vec<(usize, Declaration)>, Fatal> {
        let file = self.register_file(name, source);
        self.current_file = file;
        let ast = self.parse(file, source)?;
        let mut decls = Vec::new();
        self.collect_declarations(file, ast, &mut decls)?;
        Ok(decls)
    }

    pub(crate) fn register_file(&mut self, name: &str, source: &str) -> usize {
        self.files.push(FileInfo {
            name: SmolStr::new(name),
            index: LineIndex::new(source),
            suppress: SuppressIndex::new(source),
        });
        self.files.len() - 1
    }

    fn parse(&self, file: usize, source: &str) -> Result<SourceFile, Fatal> {
        parse_file(source).map_err(|err| Fatal {
            file: self.files[file].name.clone(),
            message: err.message,
            range: err.range,
        })
    }

    fn collect_declarations(
        &mut self,
        file: usize,
        ast: SourceFile,
        out: &mut Vec<(usize, Declaration)>,
    ) -> Result<(), Fatal> {
        for decl in ast.declarations {
            match decl {
                Declaration::Include(include) => self.link_include(file, &include, out)?,
                other => out.push((file, other)),
            }
        }
        Ok(())
    }

    fn link_include(
        &mut self,
        file: usize,
        include: &IncludeDecl,
        out: &mut Vec<(usize, Declaration)>,
    ) -> Result<(), Fatal> {
        let module = include.module.value.clone();
        self.current_file = file;
        if self.include_stack.contains(&module) {
            return Err(self.fatal_at(
                include.range,
                format!("include cycle detected through '{module}'"),
            ));
        }
        tracing::debug!(module = module.as_str(), "resolve include");
        let resolved = self.resolve_source(&module, include.range)?;

        self.include_stack.push(module);
        let new_file = self.register_file(&resolved.name, &resolved.source);
        let ast = self.parse(new_file, &resolved.source)?;
        self.collect_declarations(new_file, ast, out)?;
        self.include_stack.pop();
        self.current_file = file;
        Ok(())
    }

    pub(crate) fn resolve_source(
        &self,
        module: &str,
        range: TextRange,
    ) -> Result<VclSource, Fatal> {
        if let Some(name) = module.strip_prefix("snippet::") {
            let item = self
                .ctx
                .snippets
                .as_ref()
                .and_then(|snippets| snippets.include(name));
            return match item {
                Some(item) => Ok(VclSource::new(
                    format!("snippet::{}", item.name),
                    item.source.clone(),
                )),
                None => Err(self.fatal_at(range, format!("snippet '{name}' is not provided"))),
            };
        }
        match self.ctx.resolver.as_ref() {
            Some(resolver) => resolver
                .resolve(module)
                .map_err(|err| self.fatal_at(range, err.to_string())),
            None => Err(self.fatal_at(
                range,
                format!("cannot resolve include '{module}' without a resolver"),
            )),
        }
    }

    // ===== pass 1: hoisting =====

    fn hoist(&mut self, decls: &[(usize, Declaration)]) {
        for (file, decl) in decls {
            let file_name = self.files[*file].name.clone();
            match decl {
                Declaration::Acl(acl) => {
                    if self.ctx.symbols.acl(&acl.name.name).is_none() {
                        self.ctx.symbols.declare_acl(Symbol::new(
                            acl.name.name.clone(),
                            SymbolKind::Acl,
                            file_name,
                            acl.name.range,
                        ));
                    }
                }
                Declaration::Backend(backend) => {
                    if self.ctx.symbols.backend(&backend.name.name).is_none() {
                        self.ctx.symbols.declare_backend(Symbol::new(
                            backend.name.name.clone(),
                            SymbolKind::Backend,
                            file_name,
                            backend.name.range,
                        ));
                    }
                }
                Declaration::Director(director) => {
                    if self.ctx.symbols.backend(&director.name.name).is_none() {
                        self.ctx.symbols.declare_backend(Symbol::new(
                            director.name.name.clone(),
                            SymbolKind::Director,
                            file_name,
                            director.name.range,
                        ));
                    }
                }
                Declaration::Table(table) => {
                    if self.ctx.symbols.table(&table.name.name).is_none() {
                        let value_type = table
                            .value_type
                            .as_ref()
                            .and_then(|ty| VclType::from_name(&ty.name))
                            .unwrap_or(VclType::String);
                        self.ctx.symbols.declare_table(Symbol::new(
                            table.name.name.clone(),
                            SymbolKind::Table { value_type },
                            file_name,
                            table.name.range,
                        ));
                    }
                }
                Declaration::Subroutine(sub) => {
                    if self.ctx.symbols.subroutine(&sub.name.name).is_none() {
                        let reserved = reserved_subroutine_phase(&sub.name.name);
                        let annotation = annotation_phases(&sub.leading);
                        let (phases, annotated) = match (reserved, annotation) {
                            (Some(phase), _) => (PhaseSet::single(phase), true),
                            (None, Some(set)) => (set, true),
                            (None, None) => (PhaseSet::EMPTY, false),
                        };
                        let return_type = sub
                            .return_type
                            .as_ref()
                            .and_then(|ty| VclType::from_name(&ty.name));
                        self.ctx.symbols.declare_subroutine(Symbol::new(
                            sub.name.name.clone(),
                            SymbolKind::Subroutine {
                                return_type,
                                phases,
                                annotated,
                            },
                            file_name,
                            sub.name.range,
                        ));
                    }
                }
                Declaration::Penaltybox(pb) => {
                    if self.ctx.symbols.penaltybox(&pb.name.name).is_none() {
                        self.ctx.symbols.declare_penaltybox(Symbol::new(
                            pb.name.name.clone(),
                            SymbolKind::Penaltybox,
                            file_name,
                            pb.name.range,
                        ));
                    }
                }
                Declaration::Ratecounter(rc) => {
                    if self.ctx.symbols.ratecounter(&rc.name.name).is_none() {
                        self.ctx.symbols.declare_ratecounter(Symbol::new(
                            rc.name.name.clone(),
                            SymbolKind::Ratecounter,
                            file_name,
                            rc.name.range,
                        ));
                    }
                }
                Declaration::Include(_) => {}
            }
        }
    }

    // ===== phase inference =====

    fn infer_phases(&mut self, decls: &[(usize, Declaration)]) {
        let mut edges: Vec<(SmolStr, Vec<SmolStr>)> = Vec::new();
        for (_, decl) in decls {
            if let Declaration::Subroutine(sub) = decl {
                let mut callees = Vec::new();
                block_callees(&sub.body, &mut callees);
                callees.retain(|callee| self.ctx.symbols.subroutine(callee).is_some());
                edges.push((sub.name.name.clone(), callees));
            }
        }

        loop {
            let mut changed = false;
            for (caller, callees) in &edges {
                let Some(caller_phases) = self.ctx.symbols.subroutine_phases(caller) else {
                    continue;
                };
                if caller_phases.is_empty() {
                    continue;
                }
                for callee in callees {
                    let Some(symbol) = self.ctx.symbols.subroutine(callee) else {
                        continue;
                    };
                    let SymbolKind::Subroutine {
                        phases, annotated, ..
                    } = &symbol.kind
                    else {
                        continue;
                    };
                    if *annotated {
                        continue;
                    }
                    let mut merged = *phases;
                    if merged.merge(caller_phases) {
                        self.ctx.symbols.set_subroutine_phases(callee, merged);
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        // Anything still unresolved is never reached from a state
        // subroutine: it may run anywhere.
        let orphans: Vec<SmolStr> = self
            .ctx
            .symbols
            .subroutines()
            .filter_map(|symbol| match &symbol.kind {
                SymbolKind::Subroutine {
                    phases,
                    annotated: false,
                    ..
                } if phases.is_empty() => Some(symbol.name.clone()),
                _ => None,
            })
            .collect();
        for name in orphans {
            self.ctx.symbols.set_subroutine_phases(&name, PhaseSet::all());
        }
    }

    // ===== unused sweep =====

    fn sweep_unused(&mut self) {
        let mut pending: Vec<(SmolStr, TextRange, String)> = Vec::new();
        let symbols = &self.ctx.symbols;
        for symbol in symbols
            .acls()
            .chain(symbols.backends())
            .chain(symbols.tables())
        {
            if !symbol.used {
                pending.push((
                    symbol.file.clone(),
                    symbol.range,
                    format!(
                        "{} '{}' is declared but not used",
                        symbol.kind.describe(),
                        symbol.name
                    ),
                ));
            }
        }
        for symbol in symbols.subroutines() {
            if !symbol.used && reserved_subroutine_phase(&symbol.name).is_none() {
                pending.push((
                    symbol.file.clone(),
                    symbol.range,
                    format!("subroutine '{}' is declared but not used", symbol.name),
                ));
            }
        }

        for (file, range, message) in pending {
            let mut diagnostic = Diagnostic::new(Rule::UnusedDeclaration, range, message);
            diagnostic.file = file;
            self.ctx.diagnostics.add(diagnostic);
        }
    }

    // ===== post-filtering =====

    fn finish(self, fatal: Option<Fatal>) -> LintResult {
        let lookup: FxHashMap<SmolStr, usize> = self
            .files
            .iter()
            .enumerate()
            .map(|(idx, info)| (info.name.clone(), idx))
            .collect();

        let mut diagnostics = std::mem::take(self.ctx.diagnostics.as_mut_vec());
        diagnostics.retain(|diag| {
            if let Some(&idx) = lookup.get(&diag.file) {
                let info = &self.files[idx];
                if info.suppress.suppresses_range(diag.range, &info.index) {
                    return false;
                }
            }
            if self.ctx.config.is_ignored(diag.rule.code()) {
                return false;
            }
            if self.ctx.config.strictness == Strictness::Loose
                && diag.severity == Severity::Info
            {
                return false;
            }
            true
        });

        LintResult { diagnostics, fatal }
    }
}

// ===== call graph walkers =====

fn block_callees(block: &Block, out: &mut Vec<SmolStr>) {
    for statement in &block.statements {
        statement_callees(statement, out);
    }
}

fn statement_callees(statement: &Statement, out: &mut Vec<SmolStr>) {
    match statement {
        Statement::Call(call) => out.push(call.subroutine.name.clone()),
        Statement::Block(block) => block_callees(&block.block, out),
        Statement::If(stmt) => {
            expression_callees(&stmt.condition, out);
            block_callees(&stmt.consequence, out);
            for arm in &stmt.alternatives {
                expression_callees(&arm.condition, out);
                block_callees(&arm.block, out);
            }
            if let Some(alternative) = &stmt.alternative {
                block_callees(alternative, out);
            }
        }
        Statement::Set(stmt) => expression_callees(&stmt.value, out),
        Statement::Add(stmt) => expression_callees(&stmt.value, out),
        Statement::Log(stmt) => expression_callees(&stmt.value, out),
        Statement::Synthetic(stmt) => expression_callees(&stmt.value, out),
        Statement::Error(stmt) => {
            if let Some(code) = &stmt.code {
                expression_callees(code, out);
            }
            if let Some(message) = &stmt.message {
                expression_callees(message, out);
            }
        }
        Statement::Return(stmt) => {
            if let Some(expression) = &stmt.expression {
                expression_callees(expression, out);
            }
        }
        Statement::FunctionCall(stmt) => {
            out.push(stmt.call.function.name.clone());
            for arg in &stmt.call.args {
                expression_callees(arg, out);
            }
        }
        _ => {}
    }
}

fn expression_callees(expression: &Expression, out: &mut Vec<SmolStr>) {
    match expression {
        Expression::Call(call) => {
            out.push(call.function.name.clone());
            for arg in &call.args {
                expression_callees(arg, out);
            }
        }
        Expression::Prefix(prefix) => expression_callees(&prefix.right, out),
        Expression::Group(group) => expression_callees(&group.inner, out),
        Expression::Binary(binary) => {
            expression_callees(&binary.left, out);
            expression_callees(&binary.right, out);
        }
        Expression::IfExpr(ternary) => {
            expression_callees(&ternary.condition, out);
            expression_callees(&ternary.consequence, out);
            expression_callees(&ternary.alternative, out);
        }
        _ => {}
    }
}
