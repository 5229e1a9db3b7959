//! VCL request-handling phases and per-phase legality tables.
//!
//! Reserved subroutines are bound to a single phase by name. User
//! subroutines carry a set of phases: from a `//@recv, log` annotation, or
//! inferred from the reserved subroutines that transitively call them.

use std::fmt;

use falco_syntax::ast::Comment;

/// A VCL state-machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Phase {
    /// `vcl_recv`
    Recv = 1 << 0,
    /// `vcl_hash`
    Hash = 1 << 1,
    /// `vcl_hit`
    Hit = 1 << 2,
    /// `vcl_miss`
    Miss = 1 << 3,
    /// `vcl_pass`
    Pass = 1 << 4,
    /// `vcl_fetch`
    Fetch = 1 << 5,
    /// `vcl_error`
    Error = 1 << 6,
    /// `vcl_deliver`
    Deliver = 1 << 7,
    /// `vcl_log`
    Log = 1 << 8,
}

impl Phase {
    /// All phases, in state-machine order.
    pub const ALL: [Phase; 9] = [
        Phase::Recv,
        Phase::Hash,
        Phase::Hit,
        Phase::Miss,
        Phase::Pass,
        Phase::Fetch,
        Phase::Error,
        Phase::Deliver,
        Phase::Log,
    ];

    /// Parses a phase name as written in annotations and macros.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "recv" => Some(Self::Recv),
            "hash" => Some(Self::Hash),
            "hit" => Some(Self::Hit),
            "miss" => Some(Self::Miss),
            "pass" => Some(Self::Pass),
            "fetch" => Some(Self::Fetch),
            "error" => Some(Self::Error),
            "deliver" => Some(Self::Deliver),
            "log" => Some(Self::Log),
            _ => None,
        }
    }

    /// The phase's lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recv => "recv",
            Self::Hash => "hash",
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Pass => "pass",
            Self::Fetch => "fetch",
            Self::Error => "error",
            Self::Deliver => "deliver",
            Self::Log => "log",
        }
    }

    /// Return action keywords Fastly documents for this phase.
    #[must_use]
    pub fn return_actions(self) -> &'static [&'static str] {
        match self {
            Self::Recv => &["lookup", "pass", "error", "restart"],
            Self::Hash => &["hash"],
            Self::Hit => &["deliver", "pass", "error", "restart"],
            Self::Miss => &["fetch", "deliver_stale", "pass", "error"],
            Self::Pass => &["pass", "error"],
            Self::Fetch => &["deliver", "deliver_stale", "pass", "error", "restart"],
            Self::Error => &["deliver", "deliver_stale", "restart"],
            Self::Deliver => &["deliver", "restart"],
            Self::Log => &["deliver"],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of phases, stored as a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhaseSet(u16);

impl PhaseSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Builds a set from a raw bit mask. Used by the static catalog tables.
    #[must_use]
    pub(crate) const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Creates a set containing a single phase.
    #[must_use]
    pub fn single(phase: Phase) -> Self {
        Self(phase as u16)
    }

    /// The set of all phases.
    #[must_use]
    pub fn all() -> Self {
        let mut set = Self::EMPTY;
        for phase in Phase::ALL {
            set.insert(phase);
        }
        set
    }

    /// Builds a set from phases.
    #[must_use]
    pub fn from_phases(phases: &[Phase]) -> Self {
        let mut set = Self::EMPTY;
        for &phase in phases {
            set.insert(phase);
        }
        set
    }

    /// Inserts a phase.
    pub fn insert(&mut self, phase: Phase) {
        self.0 |= phase as u16;
    }

    /// Merges another set into this one. Returns true if anything changed.
    pub fn merge(&mut self, other: PhaseSet) -> bool {
        let before = self.0;
        self.0 |= other.0;
        self.0 != before
    }

    /// Returns true if the set contains the phase.
    #[must_use]
    pub fn contains(self, phase: Phase) -> bool {
        self.0 & phase as u16 != 0
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the sets share at least one phase.
    ///
    /// Statement legality uses this: a statement is accepted when any phase
    /// the subroutine can run in permits it.
    #[must_use]
    pub fn intersects(self, other: PhaseSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns true if every phase in `self` is in `other`.
    ///
    /// Variable access uses this: the variable must be available in every
    /// phase the subroutine can run in.
    #[must_use]
    pub fn is_subset_of(self, other: PhaseSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates the phases in state-machine order.
    pub fn iter(self) -> impl Iterator<Item = Phase> {
        Phase::ALL.into_iter().filter(move |&p| self.contains(p))
    }
}

impl fmt::Display for PhaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for phase in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(phase.name())?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<Phase> for PhaseSet {
    fn from_iter<T: IntoIterator<Item = Phase>>(iter: T) -> Self {
        let mut set = Self::EMPTY;
        for phase in iter {
            set.insert(phase);
        }
        set
    }
}

/// Phases in which `restart;` is legal.
#[must_use]
pub fn restart_phases() -> PhaseSet {
    PhaseSet::from_phases(&[
        Phase::Recv,
        Phase::Hit,
        Phase::Fetch,
        Phase::Error,
        Phase::Deliver,
    ])
}

/// Phases in which `error ...;` is legal.
#[must_use]
pub fn error_statement_phases() -> PhaseSet {
    PhaseSet::from_phases(&[
        Phase::Recv,
        Phase::Hit,
        Phase::Miss,
        Phase::Pass,
        Phase::Fetch,
    ])
}

/// Phases in which `esi;` is legal.
#[must_use]
pub fn esi_phases() -> PhaseSet {
    PhaseSet::single(Phase::Fetch)
}

/// Phases in which `synthetic ...;` is legal.
#[must_use]
pub fn synthetic_phases() -> PhaseSet {
    PhaseSet::single(Phase::Error)
}

/// Parses a scope annotation from a subroutine's leading comments.
///
/// Both `//@recv, log` and `//@scope: recv, log` bind the subroutine to an
/// explicit phase set. Unknown phase names are skipped; an annotation with
/// no recognizable phase yields `None`.
#[must_use]
pub fn annotation_phases(leading: &[Comment]) -> Option<PhaseSet> {
    for comment in leading {
        let content = comment.content();
        let Some(rest) = content.strip_prefix('@') else {
            continue;
        };
        let rest = rest.trim_start();
        let rest = rest
            .strip_prefix("scope:")
            .map(str::trim_start)
            .unwrap_or(rest);

        let set: PhaseSet = rest
            .split(',')
            .filter_map(|part| Phase::from_name(part.trim()))
            .collect();
        if !set.is_empty() {
            return Some(set);
        }
    }
    None
}

/// Extracts the phase from a `#FASTLY <phase>` boilerplate macro, if the
/// comment is one. Matching is case-insensitive and tolerates repeated `#`
/// markers and surrounding whitespace.
#[must_use]
pub fn fastly_macro_phase(comment: &Comment) -> Option<Phase> {
    let content = comment.content();
    let mut words = content.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("fastly") {
        return None;
    }
    Phase::from_name(words.next()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_size::TextRange;

    fn comment(text: &str) -> Comment {
        Comment {
            text: text.into(),
            range: TextRange::default(),
        }
    }

    #[test]
    fn test_annotation_without_scope_prefix() {
        let phases = annotation_phases(&[comment("//@recv, log")]).unwrap();
        assert!(phases.contains(Phase::Recv));
        assert!(phases.contains(Phase::Log));
        assert!(!phases.contains(Phase::Deliver));
    }

    #[test]
    fn test_annotation_with_scope_prefix() {
        let phases = annotation_phases(&[comment("//@scope: deliver, log")]).unwrap();
        assert!(phases.contains(Phase::Deliver));
        assert!(phases.contains(Phase::Log));
    }

    #[test]
    fn test_annotation_spacing_variants() {
        assert!(annotation_phases(&[comment("// @log")]).is_some());
        assert!(annotation_phases(&[comment("//@scope:recv")]).is_some());
        assert!(annotation_phases(&[comment("// plain comment")]).is_none());
    }

    #[test]
    fn test_fastly_macro() {
        assert_eq!(fastly_macro_phase(&comment("#FASTLY recv")), Some(Phase::Recv));
        assert_eq!(fastly_macro_phase(&comment("# FASTLY LOG")), Some(Phase::Log));
        assert_eq!(
            fastly_macro_phase(&comment("### FASTLY fetch")),
            Some(Phase::Fetch)
        );
        assert_eq!(fastly_macro_phase(&comment("#Fastly recv")), Some(Phase::Recv));
        assert_eq!(fastly_macro_phase(&comment("# fastly")), None);
        assert_eq!(fastly_macro_phase(&comment("// note")), None);
    }

    #[test]
    fn test_subset_and_intersection() {
        let sub = PhaseSet::from_phases(&[Phase::Recv, Phase::Log]);
        let resp = PhaseSet::from_phases(&[Phase::Deliver, Phase::Log]);
        assert!(sub.intersects(resp));
        assert!(!sub.is_subset_of(resp));
        assert!(PhaseSet::from_phases(&[Phase::Deliver, Phase::Log]).is_subset_of(resp));
    }

    #[test]
    fn test_return_actions_per_phase() {
        assert!(Phase::Recv.return_actions().contains(&"lookup"));
        assert!(Phase::Recv.return_actions().contains(&"restart"));
        assert!(!Phase::Hash.return_actions().contains(&"pass"));
        assert!(Phase::Fetch.return_actions().contains(&"deliver_stale"));
    }
}
