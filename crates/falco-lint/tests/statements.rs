//! Statement checks: declare/set/add/unset/call/error/goto/log/return and
//! friends.

mod common;
use common::*;

#[test]
fn declare_all_types() {
    check_no_errors(
        r#"
acl foo {}
backend bar {}
sub baz {
    declare local var.item1 STRING;
    declare local var.item2 INTEGER;
    declare local var.item3 FLOAT;
    declare local var.item4 IP;
    declare local var.item5 BOOL;
    declare local var.item6 ACL;
    declare local var.item7 BACKEND;

    set var.item1 = "1";
    set var.item2 = 1;
    set var.item3 = 1.0;
    set var.item4 = std.ip("192.168.0.1", "192.168.0.2");
    set var.item5 = true;
    set var.item6 = foo;
    set var.item7 = bar;
}"#,
    );
}

#[test]
fn declare_requires_var_prefix() {
    check_has_error(
        r#"
sub foo {
    declare local some.item1 STRING;
}"#,
        Rule::DeclareSyntax,
    );
}

#[test]
fn declare_unknown_type() {
    check_has_error(
        r#"
sub foo {
    declare local var.item1 LIST;
}"#,
        Rule::DeclareSyntax,
    );
}

#[test]
fn declare_duplicate() {
    check_has_error(
        r#"
sub foo {
    declare local var.item1 STRING;
    declare local var.item1 STRING;

    set var.item1 = "bar";
}"#,
        Rule::DuplicateDeclaration,
    );
}

#[test]
fn set_passes() {
    check_no_errors(
        r#"
sub foo {
    set req.http.Host = "example.com";
}"#,
    );
}

#[test]
fn set_with_concatenation() {
    check_no_errors(
        r#"
sub foo {
    set req.http.Host = "example" req.http.User-Agent ",com";
}"#,
    );
}

#[test]
fn set_with_deep_fastly_variable() {
    check_no_errors(
        r#"
sub foo {
    set req.http.Host = client.geo.city.utf8;
}"#,
    );
}

#[test]
fn set_backend_to_req_backend() {
    check_no_errors(
        r#"
backend foo {}
sub bar {
    set req.backend = foo;
}"#,
    );
}

#[test]
fn set_req_backend_as_string() {
    check_no_errors(
        r#"
sub foo {
    set req.http.Debug-Backend = req.backend;
}"#,
    );
}

#[test]
fn set_invalid_variable_name() {
    check_has_error(
        r#"
sub foo {
    set foo_bar_baz = "example.com";
}"#,
        Rule::UndefinedVariable,
    );
}

#[test]
fn set_undefined_variable() {
    check_has_error(
        r#"
sub foo {
    set req.unknwon.Host = "example.com";
}"#,
        Rule::UndefinedVariable,
    );
}

#[test]
fn set_invalid_type() {
    check_has_error(
        r#"
sub foo {
    set req.http.Host = 10;
}"#,
        Rule::TypeMismatch,
    );
}

#[test]
fn unset_passes() {
    check_no_errors(
        r#"
sub foo {
    unset req.http.Host;
}"#,
    );
}

#[test]
fn unset_undefined_variable() {
    check_has_error(
        r#"
sub foo {
    unset req.unknwon.Host;
}"#,
        Rule::UndefinedVariable,
    );
}

#[test]
fn unset_not_unsettable() {
    check_has_error(
        r#"
sub foo {
    unset req.backend;
}"#,
        Rule::NotUnsettable,
    );
}

#[test]
fn remove_is_unset() {
    check_no_errors(
        r#"
sub foo {
    remove req.http.Host;
}"#,
    );
    check_has_error(
        r#"
sub foo {
    remove req.backend;
}"#,
        Rule::NotUnsettable,
    );
}

#[test]
fn add_passes() {
    check_no_errors(
        r#"
sub foo {
    add req.http.Host = "example.com";
}"#,
    );
    check_no_errors(
        r#"
sub foo {
    add req.http.Host = "example" req.http.User-Agent ",com";
}"#,
    );
}

#[test]
fn add_invalid_type() {
    check_has_error(
        r#"
sub foo {
    add req.http.Host = 10;
}"#,
        Rule::TypeMismatch,
    );
}

#[test]
fn add_only_valid_on_headers() {
    check_has_error(
        r#"
sub foo {
    declare local var.FOO STRING;
    add var.FOO = "bar";
}"#,
        Rule::InvalidAddTarget,
    );
    check_has_error(
        r#"
sub foo {
    add req.url = "/path";
}"#,
        Rule::InvalidAddTarget,
    );
}

#[test]
fn call_passes() {
    check_no_errors(
        r#"
sub foo {
    set req.http.Host = "example.com";
}

sub bar {
    call foo;
}"#,
    );
}

#[test]
fn call_undefined_subroutine() {
    check_has_error(
        r#"
sub other {
    call foo;
}"#,
        Rule::InvalidCallTarget,
    );
}

#[test]
fn call_typed_subroutine_is_rejected() {
    check_has_error(
        r#"
sub foo BOOL {
    return true;
}

sub bar {
    call foo;
}"#,
        Rule::InvalidCallTarget,
    );
}

#[test]
fn error_passes() {
    check_no_errors(
        r#"
sub foo {
    error 602;
}"#,
    );
}

#[test]
fn error_with_message() {
    check_no_errors(
        r#"
sub foo {
    error 602 "Not allowed";
}"#,
    );
}

#[test]
fn error_code_out_of_range() {
    check_has_error(
        r#"
sub foo {
    error 700;
}"#,
        Rule::ErrorCodeRange,
    );
}

#[test]
fn error_invalid_phase() {
    check_has_error(
        r#"
// @log
sub foo {
    error 602;
}"#,
        Rule::StatementScope,
    );
}

#[test]
fn error_with_function_code() {
    check_no_errors(
        r#"
sub foo {
    error std.atoi("10");
}"#,
    );
}

#[test]
fn error_with_wrong_function_type() {
    check_has_error(
        r#"
sub foo {
    error std.strrev("error");
}"#,
        Rule::TypeMismatch,
    );
}

#[test]
fn restart_in_log_phase_is_rejected() {
    check_has_error(
        r#"
sub vcl_log {
    # FASTLY log
    restart;
}"#,
        Rule::StatementScope,
    );
}

#[test]
fn goto_passes() {
    check_no_errors(
        r#"
sub foo {
    declare local var.x INTEGER;
    set var.x = 1;

    goto set_and_update;

    if (var.x == 1) {
        set var.x = 2;
    }

    set_and_update:
    set var.x = 3;
}"#,
    );
}

#[test]
fn goto_single_destination_only() {
    check_has_error(
        r#"
sub foo {
    declare local var.x INTEGER;
    set var.x = 1;

    goto set_and_update;

    set_and_update:
    set var.x = 3;
    set_and_update:
}"#,
        Rule::DuplicateGotoDestination,
    );
}

#[test]
fn goto_undefined_destination() {
    check_has_error(
        r#"
sub foo {
    goto set_and_update;
    set var.x = 3;
}"#,
        Rule::UndefinedGotoDestination,
    );
}

#[test]
fn goto_scope_is_one_subroutine() {
    check_has_error(
        r#"
sub some_function {
    goto foo;
}

sub another_function {
    foo:
}"#,
        Rule::UndefinedGotoDestination,
    );
}

#[test]
fn log_accepts_variables_and_strings() {
    check_no_errors("sub foo {\n log req.restarts;\n}");
    check_no_errors("sub foo {\n log \"foo\";\n}");
}

#[test]
fn log_rejects_non_string_literals() {
    check_has_error("sub foo {\n log 42;\n}", Rule::LogArgument);
    check_has_error("sub foo {\n log true;\n}", Rule::LogArgument);
    check_has_error("sub foo {\n log 0.1;\n}", Rule::LogArgument);
}

#[test]
fn builtin_function_statement_passes() {
    check_no_errors(
        r#"
sub foo {
    std.collect(req.http.Cookie, "|");
}"#,
    );
}

#[test]
fn user_subroutine_as_function_statement_is_rejected() {
    check_has_error(
        r#"
sub foo {
    log "123";
}

sub bar {
    foo();
}"#,
        Rule::FunctionStatement,
    );
    check_has_error(
        r#"
sub foo BOOL {
    log "123";
    return true;
}

sub bar {
    foo();
}"#,
        Rule::FunctionStatement,
    );
}

#[test]
fn non_void_builtin_as_statement_is_rejected() {
    check_has_error(
        r#"
sub foo {
    std.strlen("abc");
}"#,
        Rule::FunctionStatement,
    );
}

#[test]
fn block_statements_nest() {
    check_no_errors(
        r#"
sub vcl_recv {
    #Fastly recv
    {
        log "vcl_recv";
    }
}"#,
    );
    check_no_errors(
        r#"
sub vcl_recv {
    #Fastly recv
    {
        {
            log "vcl_recv";
        }
    }
}"#,
    );
}

#[test]
fn protected_headers_cannot_be_touched() {
    let headers = [
        ("Proxy-Authenticate", "Basic realm=\"proxy\""),
        ("Proxy-Authorization", "Basic foo"),
        ("Content-Length", "100"),
        ("Content-Range", "bytes 200-100/12345"),
        ("TE", "gzip"),
        ("Trailer", "Expires"),
        ("Transfer-Encoding", "gzip"),
        ("Expect", "100-continue"),
        ("Upgrade", "example/1"),
        ("Fastly-FF", "chain"),
    ];
    for (header, value) in headers {
        check_has_error(
            &format!(
                "sub vcl_recv {{\n #FASTLY RECV\n set req.http.{header} = \"{value}\";\n}}"
            ),
            Rule::ProtectedHeader,
        );
        check_has_error(
            &format!(
                "sub vcl_recv {{\n #FASTLY RECV\n add req.http.{header} = \"{value}\";\n}}"
            ),
            Rule::ProtectedHeader,
        );
        check_has_error(
            &format!("sub vcl_recv {{\n #FASTLY RECV\n unset req.http.{header};\n}}"),
            Rule::ProtectedHeader,
        );
        check_has_error(
            &format!("sub vcl_recv {{\n #FASTLY RECV\n remove req.http.{header};\n}}"),
            Rule::ProtectedHeader,
        );
    }
}

#[test]
fn empty_return_in_every_state_subroutine() {
    let subs = [
        ("vcl_recv", "#FASTLY RECV"),
        ("vcl_hash", "#FASTLY HASH"),
        ("vcl_hit", "#FASTLY HIT"),
        ("vcl_miss", "#FASTLY MISS"),
        ("vcl_pass", "#FASTLY PASS"),
        ("vcl_fetch", "#FASTLY FETCH"),
        ("vcl_error", "#FASTLY ERROR"),
        ("vcl_deliver", "#FASTLY DELIVER"),
        ("vcl_log", "#FASTLY LOG"),
    ];
    for (name, comment) in subs {
        check_has_error(
            &format!("sub {name} {{\n {comment}\n return;\n}}"),
            Rule::EmptyReturn,
        );
    }
}

#[test]
fn bare_return_in_user_subroutine_passes() {
    check_no_errors(
        r#"
sub foo {
    return;
}
sub vcl_recv {
    #FASTLY RECV
    call foo;
}"#,
    );
}

#[test]
fn return_with_action() {
    check_no_errors(
        r#"
sub vcl_recv {
    #Fastly recv
    return (pass);
}"#,
    );
    check_no_errors(
        r#"
sub vcl_recv {
    #Fastly recv
    return (restart);
}"#,
    );
}

#[test]
fn return_action_invalid_for_phase() {
    check_has_error(
        r#"
sub vcl_hash {
    #FASTLY hash
    return (pass);
}"#,
        Rule::InvalidReturnAction,
    );
}

#[test]
fn typed_subroutine_returns() {
    check_no_errors(
        r#"
sub custom_sub INTEGER {
    return 1;
}
sub use_it {
    declare local var.I INTEGER;
    set var.I = custom_sub();
}"#,
    );
    check_no_errors(
        r#"
sub custom_sub INTEGER {
    declare local var.tmp INTEGER;
    set var.tmp = 10;
    return var.tmp;
}
sub use_it {
    declare local var.I INTEGER;
    set var.I = custom_sub();
}"#,
    );
}

#[test]
fn typed_subroutine_empty_return_is_rejected() {
    check_has_error(
        "sub custom_sub INTEGER {\n return;\n}",
        Rule::InvalidReturnForm,
    );
}

#[test]
fn typed_subroutine_wrong_return_type() {
    check_has_error(
        "sub custom_sub INTEGER {\n return (req.http.foo);\n}",
        Rule::InvalidReturnType,
    );
}

#[test]
fn typed_subroutine_cannot_return_action() {
    check_has_error(
        "sub custom_sub INTEGER {\n return (pass);\n}",
        Rule::InvalidReturnForm,
    );
}

#[test]
fn typed_subroutine_cannot_parenthesize_value() {
    check_has_error(
        "sub custom_sub INTEGER {\n return (1);\n}",
        Rule::InvalidReturnForm,
    );
}

#[test]
fn typed_return_value_must_be_single_operand() {
    check_has_error(
        r#"
sub get_str STRING {
    declare local var.tmp STRING;
    set var.tmp = "foo";
    return var.tmp "bar";
}"#,
        Rule::InvalidReturnForm,
    );
    check_has_error(
        r#"
sub get_str STRING {
    declare local var.tmp STRING;
    set var.tmp = "foo";
    return +-var.tmp;
}"#,
        Rule::InvalidReturnForm,
    );
}

#[test]
fn bool_return_value_may_use_operators() {
    check_no_errors(
        r#"
sub get_bool BOOL {
    declare local var.tmp STRING;
    set var.tmp = "foo";
    return std.strlen(var.tmp) > 5;
}"#,
    );
}
