//! The lint context: symbol tables, diagnostics, and the host-supplied
//! resolver/snippet interfaces.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use crate::config::LintConfig;
use crate::diagnostics::DiagnosticBuilder;
use crate::phase::Phase;
use crate::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::types::VclType;

/// A resolved piece of VCL source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VclSource {
    /// Display name (usually the file name).
    pub name: SmolStr,
    /// The source text.
    pub source: String,
}

impl VclSource {
    /// Creates a named source.
    pub fn new(name: impl Into<SmolStr>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Failure to resolve an include.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The include name is not known to the resolver.
    #[error("cannot resolve include '{0}'")]
    NotFound(String),
    /// The resolver failed for another reason (I/O, remote API, ...).
    #[error("{0}")]
    Other(String),
}

/// Supplies VCL source for the main program and its includes.
///
/// Implemented by the host: file-system loaders, in-memory test fixtures,
/// remote service configurations.
pub trait Resolver {
    /// Returns the main VCL source.
    fn main_vcl(&self) -> Result<VclSource, ResolveError>;

    /// Resolves an `include "name";` statement by its literal name
    /// (without any `.vcl` suffix).
    fn resolve(&self, include_name: &str) -> Result<VclSource, ResolveError>;

    /// A display name for the resolver.
    fn name(&self) -> &str;
}

/// A single edge-service snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetItem {
    /// The snippet name.
    pub name: SmolStr,
    /// The snippet body (a statement sequence).
    pub source: String,
}

/// Edge-service snippets injected during linting.
///
/// Scoped snippets are spliced where the matching `#FASTLY <phase>` macro
/// appears; include snippets resolve `include "snippet::NAME";`.
#[derive(Debug, Clone, Default)]
pub struct Snippets {
    scoped: FxHashMap<Phase, Vec<SnippetItem>>,
    include: FxHashMap<SmolStr, SnippetItem>,
}

impl Snippets {
    /// Creates an empty snippet set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scoped snippet for a phase.
    pub fn add_scoped(&mut self, phase: Phase, item: SnippetItem) {
        self.scoped.entry(phase).or_default().push(item);
    }

    /// Adds an include snippet, addressable as `snippet::<name>`.
    pub fn add_include(&mut self, item: SnippetItem) {
        self.include.insert(item.name.clone(), item);
    }

    /// Returns the scoped snippets for a phase.
    #[must_use]
    pub fn scoped(&self, phase: Phase) -> &[SnippetItem] {
        self.scoped.get(&phase).map_or(&[], Vec::as_slice)
    }

    /// Returns an include snippet by name.
    #[must_use]
    pub fn include(&self, name: &str) -> Option<&SnippetItem> {
        self.include.get(name)
    }
}

/// The lint context. Owns the symbol tables and the diagnostics list; only
/// the analyzer mutates it.
#[derive(Default)]
pub struct Context {
    /// Declared symbols.
    pub symbols: SymbolTable,
    /// Collected diagnostics.
    pub diagnostics: DiagnosticBuilder,
    /// Host-supplied include resolver.
    pub resolver: Option<Box<dyn Resolver>>,
    /// Host-supplied snippets.
    pub snippets: Option<Snippets>,
    /// Configuration.
    pub config: LintConfig,
}

impl Context {
    /// Creates an empty context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a context with options.
    #[must_use]
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }
}

/// Builder for [`Context`], covering the enumerated context options.
#[derive(Default)]
pub struct ContextBuilder {
    resolver: Option<Box<dyn Resolver>>,
    snippets: Option<Snippets>,
    config: LintConfig,
    preloaded: Vec<Symbol>,
}

impl ContextBuilder {
    /// Supplies the include resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Supplies edge-service snippets.
    #[must_use]
    pub fn with_snippets(mut self, snippets: Snippets) -> Self {
        self.snippets = Some(snippets);
        self
    }

    /// Preloads an ACL known to exist outside the linted source.
    #[must_use]
    pub fn preload_acl(mut self, name: &str) -> Self {
        self.preloaded.push(Symbol::external(name, SymbolKind::Acl));
        self
    }

    /// Preloads a backend known to exist outside the linted source.
    #[must_use]
    pub fn preload_backend(mut self, name: &str) -> Self {
        self.preloaded
            .push(Symbol::external(name, SymbolKind::Backend));
        self
    }

    /// Preloads a table known to exist outside the linted source.
    #[must_use]
    pub fn preload_table(mut self, name: &str) -> Self {
        self.preloaded.push(Symbol::external(
            name,
            SymbolKind::Table {
                value_type: VclType::String,
            },
        ));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: LintConfig) -> Self {
        self.config = config;
        self
    }

    /// Finishes the context.
    #[must_use]
    pub fn build(self) -> Context {
        let mut context = Context {
            resolver: self.resolver,
            snippets: self.snippets,
            config: self.config,
            ..Context::default()
        };
        for symbol in self.preloaded {
            match symbol.kind {
                SymbolKind::Acl => {
                    context.symbols.declare_acl(symbol);
                }
                SymbolKind::Backend | SymbolKind::Director => {
                    context.symbols.declare_backend(symbol);
                }
                SymbolKind::Table { .. } => {
                    context.symbols.declare_table(symbol);
                }
                _ => {}
            }
        }
        context
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("symbols", &self.symbols)
            .field("diagnostics", &self.diagnostics)
            .field("resolver", &self.resolver.as_ref().map(|r| r.name()))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
