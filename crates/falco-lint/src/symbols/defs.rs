//! Symbol definitions.

use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextRange;

use crate::phase::PhaseSet;
use crate::types::VclType;

/// The kind of a declared symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// An ACL.
    Acl,
    /// A backend.
    Backend,
    /// A director. Directors live in the backend namespace and are usable
    /// wherever a backend is.
    Director,
    /// A table.
    Table {
        /// The declared value type (STRING when omitted).
        value_type: VclType,
    },
    /// A subroutine.
    Subroutine {
        /// The declared return type; `None` for state subroutines.
        return_type: Option<VclType>,
        /// The phases the subroutine may run in, once resolved.
        phases: PhaseSet,
        /// Whether the phases came from an explicit annotation.
        annotated: bool,
    },
    /// A penaltybox.
    Penaltybox,
    /// A ratecounter.
    Ratecounter,
}

impl SymbolKind {
    /// Human-readable kind name for messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Acl => "acl",
            Self::Backend => "backend",
            Self::Director => "director",
            Self::Table { .. } => "table",
            Self::Subroutine { .. } => "subroutine",
            Self::Penaltybox => "penaltybox",
            Self::Ratecounter => "ratecounter",
        }
    }
}

/// A declared top-level symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The symbol's name.
    pub name: SmolStr,
    /// The kind of symbol.
    pub kind: SymbolKind,
    /// The file the declaration came from (empty for external symbols).
    pub file: SmolStr,
    /// The source location of the declaration.
    pub range: TextRange,
    /// Set by any referencing expression or statement.
    pub used: bool,
    /// True for symbols added to the context before linting.
    pub external: bool,
}

impl Symbol {
    /// Creates a declared symbol.
    pub fn new(name: impl Into<SmolStr>, kind: SymbolKind, file: SmolStr, range: TextRange) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            range,
            used: false,
            external: false,
        }
    }

    /// Creates an externally provided symbol (no source position).
    pub fn external(name: impl Into<SmolStr>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            file: SmolStr::default(),
            range: TextRange::default(),
            used: false,
            external: true,
        }
    }
}

/// A `declare local var.*` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVar {
    /// The full variable name, including the `var.` prefix.
    pub name: SmolStr,
    /// The declared type.
    pub var_type: VclType,
    /// The declaration position.
    pub range: TextRange,
    /// Set when the variable is read.
    pub read: bool,
}

/// The local variables of one subroutine body.
///
/// Insertion order is preserved so unused-variable diagnostics come out in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Locals {
    vars: IndexMap<SmolStr, LocalVar>,
}

impl Locals {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable. Returns the previous declaration on duplicates.
    pub fn declare(&mut self, var: LocalVar) -> Option<LocalVar> {
        self.vars.insert(var.name.clone(), var)
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.vars.get(name)
    }

    /// Looks up a variable and marks it read.
    pub fn read(&mut self, name: &str) -> Option<&LocalVar> {
        let var = self.vars.get_mut(name)?;
        var.read = true;
        Some(var)
    }

    /// Iterates variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &LocalVar> {
        self.vars.values()
    }
}
