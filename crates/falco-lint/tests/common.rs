//! Shared helpers for lint tests.
#![allow(dead_code)]

pub use falco_lint::{
    lint, lint_source, Context, LintResult, Rule, Severity, SnippetItem, Snippets,
};

/// Lints a source string with a default context.
pub fn run(source: &str) -> LintResult {
    let mut context = Context::new();
    lint_source(&mut context, "main.vcl", source)
}

/// Lints a source string with a prepared context.
pub fn run_with(mut context: Context, source: &str) -> LintResult {
    lint_source(&mut context, "main.vcl", source)
}

/// Rules of all diagnostics with the given severity.
pub fn rules(result: &LintResult, severity: Severity) -> Vec<Rule> {
    result.with_severity(severity).map(|d| d.rule).collect()
}

/// Asserts the source produces no parse failure and no errors.
pub fn check_no_errors(source: &str) {
    let result = run(source);
    assert!(result.fatal.is_none(), "unexpected fatal: {:?}", result.fatal);
    let errors = rules(&result, Severity::Error);
    assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
}

/// Asserts the source produces the given error.
pub fn check_has_error(source: &str, expected: Rule) {
    let result = run(source);
    assert!(result.fatal.is_none(), "unexpected fatal: {:?}", result.fatal);
    let errors = rules(&result, Severity::Error);
    assert!(
        errors.contains(&expected),
        "expected {expected:?} in {errors:?}"
    );
}

/// Asserts the source produces the given warning (and no errors).
pub fn check_has_warning(source: &str, expected: Rule) {
    let result = run(source);
    let errors = rules(&result, Severity::Error);
    assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    let warnings = rules(&result, Severity::Warning);
    assert!(
        warnings.contains(&expected),
        "expected {expected:?} in {warnings:?}"
    );
}

/// Asserts the source produces the given advisory (and no errors).
pub fn check_has_info(source: &str, expected: Rule) {
    let result = run(source);
    let errors = rules(&result, Severity::Error);
    assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    let infos = rules(&result, Severity::Info);
    assert!(infos.contains(&expected), "expected {expected:?} in {infos:?}");
}
