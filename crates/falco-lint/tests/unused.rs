//! Unused-symbol diagnostics after full traversal.

mod common;
use common::*;

#[test]
fn used_acl_is_not_reported() {
    let result = run(
        r#"
acl foo {}
sub vcl_recv {
    #FASTLY recv
    if (client.ip ~ foo) {
        restart;
    }
}"#,
    );
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn unused_acl_is_reported() {
    check_has_warning("acl foo {}\n", Rule::UnusedDeclaration);
}

#[test]
fn unused_table_is_reported() {
    check_has_warning("table foo {}\n", Rule::UnusedDeclaration);
}

#[test]
fn used_table_is_not_reported() {
    let result = run(
        r#"
table foo {}
sub vcl_recv {
    #FASTLY recv
    set req.http.Foo = table.lookup(foo, "bar");
}"#,
    );
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn unused_backend_is_reported() {
    check_has_warning("backend foo {}\n", Rule::UnusedDeclaration);
}

#[test]
fn used_backend_is_not_reported() {
    let result = run(
        r#"
backend foo {}
sub vcl_recv {
    #FASTLY recv
    set req.backend = foo;
}"#,
    );
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn unused_subroutine_is_reported() {
    check_has_warning("sub foo {}\n", Rule::UnusedDeclaration);
}

#[test]
fn called_subroutine_is_not_reported() {
    let result = run(
        r#"
sub foo {}
sub vcl_recv {
    #FASTLY recv
    call foo;
}"#,
    );
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn unused_external_symbols_are_reported() {
    let context = Context::builder()
        .preload_acl("corporate_ips")
        .build();
    let result = run_with(context, "sub vcl_recv {\n #FASTLY recv\n}\n");
    let warnings = rules(&result, Severity::Warning);
    assert!(warnings.contains(&Rule::UnusedDeclaration), "{warnings:?}");

    let context = Context::builder().preload_table("redirects").build();
    let result = run_with(context, "sub vcl_recv {\n #FASTLY recv\n}\n");
    assert!(rules(&result, Severity::Warning).contains(&Rule::UnusedDeclaration));

    let context = Context::builder().preload_backend("origin_0").build();
    let result = run_with(context, "sub vcl_recv {\n #FASTLY recv\n}\n");
    assert!(rules(&result, Severity::Warning).contains(&Rule::UnusedDeclaration));
}

#[test]
fn used_external_symbol_is_not_reported() {
    let context = Context::builder().preload_backend("origin_0").build();
    let result = run_with(
        context,
        r#"
sub vcl_recv {
    #FASTLY recv
    set req.backend = origin_0;
}"#,
    );
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn unused_local_variable_is_reported() {
    check_has_warning(
        r#"
sub vcl_recv {
    #FASTLY recv
    declare local var.bar STRING;
}"#,
        Rule::UnusedVariable,
    );
    // A write without any read is still unused.
    check_has_warning(
        r#"
sub vcl_recv {
    #FASTLY recv
    declare local var.bar STRING;
    set var.bar = "baz";
}"#,
        Rule::UnusedVariable,
    );
}

#[test]
fn read_local_variable_is_not_reported() {
    let result = run(
        r#"
sub vcl_recv {
    #FASTLY recv
    declare local var.bar STRING;
    set var.bar = "baz";
    set req.http.Bar = var.bar;
}"#,
    );
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn reserved_subroutines_are_never_unused() {
    let result = run("sub vcl_recv {\n #FASTLY recv\n}\n");
    assert!(
        rules(&result, Severity::Warning).is_empty(),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn unused_diagnostics_follow_declaration_order() {
    let result = run("acl zz {}\nacl aa {}\nbackend mm {}\n");
    let names: Vec<_> = result
        .with_severity(Severity::Warning)
        .map(|diag| diag.message.clone())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names[0].contains("zz"));
    assert!(names[1].contains("aa"));
    assert!(names[2].contains("mm"));
}
