//! Phase binding and inference: scope annotations, call-graph propagation
//! and per-phase variable availability.

mod common;
use common::*;

#[test]
fn subroutines_reused_across_state_functions() {
    check_no_errors(
        r#"
//@recv, log
sub example {
    set req.http.Host = "example.com";
}

sub vcl_log {
    # FASTLY log
    call example;
}

sub vcl_recv {
# FASTLY recv
call example;
}"#,
    );
}

#[test]
fn annotated_function_matching_callers_passes() {
    for annotation in ["//@deliver, log", "//@scope:deliver, log"] {
        check_no_errors(&format!(
            r#"
{annotation}
sub example BOOL {{
    log resp.http.bar;
    return true;
}}

sub vcl_log {{
    # FASTLY log
    if (example()) {{
        log "foo";
    }}
}}

sub vcl_deliver {{
# FASTLY deliver
    if (example()) {{
        log "foo";
    }}
}}"#
        ));
    }
}

#[test]
fn annotated_function_reading_unavailable_variable_fails() {
    for annotation in ["//@recv, log", "//@scope: recv, log"] {
        check_has_error(
            &format!(
                r#"
{annotation}
sub example BOOL {{
    log resp.http.bar;
    return true;
}}

sub vcl_log {{
    # FASTLY log
    if (example()) {{
        log "foo";
    }}
}}"#
            ),
            Rule::VariableScope,
        );
    }
}

#[test]
fn inferred_phase_restricts_variables() {
    // helper is only called from vcl_recv, so beresp.* is unavailable.
    check_has_error(
        r#"
sub helper {
    set beresp.ttl = 1m;
}

sub vcl_recv {
    #FASTLY recv
    call helper;
}"#,
        Rule::VariableScope,
    );
    // The same body is fine when reached from vcl_fetch.
    check_no_errors(
        r#"
sub helper {
    set beresp.ttl = 1m;
}

sub vcl_fetch {
    #FASTLY fetch
    call helper;
}"#,
    );
}

#[test]
fn uncalled_subroutine_defaults_to_all_phases() {
    // Phase-restricted statements still pass when any phase allows them.
    check_no_errors(
        r#"
sub foo {
    error 602;
}"#,
    );
    // But variables available in only some phases do not.
    check_has_error(
        r#"
sub foo {
    set req.http.X = resp.status;
}"#,
        Rule::VariableScope,
    );
}

#[test]
fn annotated_callee_incompatible_with_caller_fails() {
    check_has_error(
        r#"
//@recv
sub helper {
    set req.http.X = "1";
}

sub vcl_log {
    #FASTLY log
    call helper;
}"#,
        Rule::StatementScope,
    );
}

#[test]
fn transitive_inference_through_user_subroutines() {
    check_no_errors(
        r#"
sub inner {
    set beresp.ttl = 10s;
}

sub outer {
    call inner;
}

sub vcl_fetch {
    #FASTLY fetch
    call outer;
}"#,
    );
}

#[test]
fn subroutine_hoisting() {
    check_no_errors(
        r#"
sub vcl_recv {
    ### FASTLY recv
    call hoisted_subroutine;
    return(lookup);
}

sub hoisted_subroutine {
    set req.http.X-Subrountine-Hoisted = "yes";
}"#,
    );
}

#[test]
fn reserved_phase_binds_variables() {
    // beresp is a fetch-phase variable; vcl_recv cannot touch it.
    check_has_error(
        r#"
sub vcl_recv {
    #FASTLY recv
    set beresp.ttl = 10s;
}"#,
        Rule::VariableScope,
    );
    check_no_errors(
        r#"
sub vcl_deliver {
    #FASTLY deliver
    set resp.http.X-Served-By = server.identity;
}"#,
    );
}
