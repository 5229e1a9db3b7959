//! Declaration, statement and expression checks.
//!
//! The checks are split by concern and all run as methods on the
//! [`Linter`](crate::linter::Linter), sharing its symbol table, diagnostics
//! list and file bookkeeping.

mod decl;
mod expr;
mod stmt;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::phase::{Phase, PhaseSet};
use crate::symbols::Locals;
use crate::types::VclType;

/// Per-subroutine check state.
///
/// Local variables are subroutine-scoped (nested blocks share them), labels
/// are collected up front so `goto` can jump forward, and the regex capture
/// counter drives the `re.group.N` flow rules. Capture state is reset for
/// every subroutine body; a `call` does not carry the caller's captures in.
#[derive(Debug)]
pub(crate) struct SubContext {
    /// Phases the subroutine may run in.
    pub phases: PhaseSet,
    /// Declared return type, if any.
    pub return_type: Option<VclType>,
    /// The bound phase when this is a reserved state subroutine.
    pub reserved: Option<Phase>,
    /// Local `var.*` declarations.
    pub locals: Locals,
    /// Goto labels declared anywhere in the body.
    pub labels: FxHashSet<SmolStr>,
    /// Number of regex matches executed so far on the current path.
    pub regex_matches: u32,
}

impl SubContext {
    pub(crate) fn new(
        phases: PhaseSet,
        return_type: Option<VclType>,
        reserved: Option<Phase>,
    ) -> Self {
        Self {
            phases,
            return_type,
            reserved,
            locals: Locals::new(),
            labels: FxHashSet::default(),
            regex_matches: 0,
        }
    }
}

/// Expression check position.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExprCx {
    /// Inside an `if (...)` condition, a ternary condition, or the returned
    /// expression of a BOOL subroutine - the only places comparison, match
    /// and logical operators may appear.
    pub condition: bool,
}

impl ExprCx {
    pub(crate) const VALUE: Self = Self { condition: false };
    pub(crate) const CONDITION: Self = Self { condition: true };
}
