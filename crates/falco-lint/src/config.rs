//! Linter configuration.

use serde::Deserialize;

/// How aggressively advisory diagnostics are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Report everything, including INFO advisories.
    #[default]
    Strict,
    /// Drop INFO advisories; keep errors and warnings.
    Loose,
}

/// Deserializable linter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Advisory reporting level.
    pub strictness: Strictness,
    /// Rule codes to drop from the result (e.g. `"unused-declaration"`).
    pub ignore_rules: Vec<String>,
}

impl LintConfig {
    /// Returns true if the rule code is ignored by configuration.
    #[must_use]
    pub fn is_ignored(&self, code: &str) -> bool {
        self.ignore_rules.iter().any(|rule| rule == code)
    }
}
