//! `falco-ignore` directives and configuration-based filtering.

mod common;
use common::*;

use falco_lint::{LintConfig, Strictness};

#[test]
fn ignore_next_line() {
    check_no_errors(
        r#"
sub vcl_recv {
   #FASTLY RECV
   # falco-ignore-next-line
   set req.http.H2-Fingerprint = fastly_info.h2.undefined; // undefined but ignore
}"#,
    );
}

#[test]
fn ignore_next_line_only_covers_one_line() {
    check_has_error(
        r#"
sub vcl_recv {
   #FASTLY RECV
   # falco-ignore-next-line
   set req.http.H2-Fingerprint = fastly_info.h2.undefined; // undefined but ignore
   set req.http.H2-Fingerprint = fastly_info.h2.undefined; // raise an error
}"#,
        Rule::UndefinedVariable,
    );
}

#[test]
fn ignore_this_line() {
    check_no_errors(
        r#"
sub vcl_recv {
   #FASTLY RECV
   set req.http.H2-Fingerprint = fastly_info.h2.undefined; // falco-ignore
}"#,
    );
}

#[test]
fn ignore_start_end() {
    check_no_errors(
        r#"
sub vcl_recv {
    // falco-ignore-start
   #FASTLY RECV
   set req.http.H2-Fingerprint = fastly_info.h2.undefined;
    // falco-ignore-end
   set req.http.H2-Fingerprint = fastly_info.h2.fingerprint;
}"#,
    );
}

#[test]
fn ignore_start_end_covers_range_only() {
    check_has_error(
        r#"
sub vcl_recv {
    // falco-ignore-start
   #FASTLY RECV
   set req.http.H2-Fingerprint = fastly_info.h2.undefined;
    // falco-ignore-end
   set req.http.H2-Fingerprint = fastly_info.h2.undefined;
}"#,
        Rule::UndefinedVariable,
    );
}

#[test]
fn ignore_start_covers_whole_declaration() {
    check_no_errors(
        r#"
// falco-ignore-start
sub vcl_recv {
   #FASTLY RECV
   set req.http.H2-Fingerprint = fastly_info.h2.undefined;
   set req.http.H2-Fingerprint = fastly_info.h2.fingerprint;
}"#,
    );
}

#[test]
fn every_directive_form_suppresses_the_same_rule() {
    let offending = r#"set req.http.X = fastly_info.h2.undefined;"#;
    let variants = [
        format!("sub vcl_recv {{\n#FASTLY RECV\n# falco-ignore-next-line\n{offending}\n}}"),
        format!("sub vcl_recv {{\n#FASTLY RECV\n{offending} // falco-ignore\n}}"),
        format!(
            "sub vcl_recv {{\n#FASTLY RECV\n// falco-ignore-start\n{offending}\n// falco-ignore-end\n}}"
        ),
    ];
    for source in variants {
        let result = run(&source);
        assert!(
            rules(&result, Severity::Error).is_empty(),
            "directive failed on: {source}"
        );
    }
}

#[test]
fn ignored_rules_from_config() {
    let config = LintConfig {
        ignore_rules: vec!["unused-declaration".to_string()],
        ..LintConfig::default()
    };
    let context = Context::builder().with_config(config).build();
    let result = run_with(context, "acl unused_one {}\n");
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn loose_strictness_drops_advisories() {
    let source = r#"
sub vcl_recv {
    #FASTLY recv
    declare local var.I INTEGER;
    set var.I = 1;
    set req.http.X = "n=" var.I;
    set req.http.Y = var.I "x";
}"#;
    let strict = run(source);
    assert!(!rules(&strict, Severity::Info).is_empty());

    let config = LintConfig {
        strictness: Strictness::Loose,
        ..LintConfig::default()
    };
    let context = Context::builder().with_config(config).build();
    let loose = run_with(context, source);
    assert!(rules(&loose, Severity::Info).is_empty());
}

#[test]
fn suppressed_diagnostics_do_not_leak_across_files() {
    // A suppression in the including file does not hide diagnostics from
    // the included one.
    use falco_lint::{ResolveError, Resolver, VclSource};

    struct OneInclude;
    impl Resolver for OneInclude {
        fn main_vcl(&self) -> Result<VclSource, ResolveError> {
            unreachable!("lint_source drives the main file")
        }
        fn resolve(&self, name: &str) -> Result<VclSource, ResolveError> {
            assert_eq!(name, "dep");
            Ok(VclSource::new("dep.vcl", "set req.http.X = 10;\n"))
        }
        fn name(&self) -> &str {
            "one-include"
        }
    }

    let context = Context::builder().with_resolver(OneInclude).build();
    let result = run_with(
        context,
        r#"
sub vcl_recv {
    #FASTLY recv
    # falco-ignore-next-line
    include "dep";
}"#,
    );
    let errors = rules(&result, Severity::Error);
    assert!(errors.contains(&Rule::TypeMismatch), "{errors:?}");
}
