//! Declaration checks.

use smol_str::SmolStr;
use text_size::TextRange;

use falco_syntax::ast::{
    AclDecl, BackendDecl, BackendProperty, Declaration, DirectorDecl, Expression, PenaltyboxDecl,
    PropertyValue, RatecounterDecl, SubroutineDecl, TableDecl,
};

use crate::check::SubContext;
use crate::diagnostics::Rule;
use crate::ident::{is_valid_declaration_name, reserved_subroutine_phase};
use crate::linter::{Fatal, Linter};
use crate::phase::{fastly_macro_phase, Phase, PhaseSet};
use crate::types::VclType;

/// The shallow type of a declaration property value. Declaration bodies
/// only carry literals, identifiers and string concatenation, so full
/// expression checking is not needed here.
fn property_value_type(expression: &Expression) -> Option<VclType> {
    match expression {
        Expression::String(_) => Some(VclType::String),
        Expression::Integer(_) => Some(VclType::Integer),
        Expression::Float(_) => Some(VclType::Float),
        Expression::Bool(_) => Some(VclType::Bool),
        Expression::Rtime(_) => Some(VclType::Rtime),
        Expression::Ident(_) => Some(VclType::Id),
        Expression::Percent(_) => None,
        Expression::Binary(binary) if binary.op == falco_syntax::ast::BinaryOp::Concat => {
            Some(VclType::String)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropKind {
    Str,
    Int,
    Bool,
    Rtime,
    /// `always` / `never` identifier values.
    CheckCert,
    /// Nested `{ ... }` object.
    Probe,
}

const BACKEND_PROPERTIES: &[(&str, PropKind)] = &[
    ("between_bytes_timeout", PropKind::Rtime),
    ("bypass_local_route_table", PropKind::Bool),
    ("connect_timeout", PropKind::Rtime),
    ("dynamic", PropKind::Bool),
    ("first_byte_timeout", PropKind::Rtime),
    ("host", PropKind::Str),
    ("host_header", PropKind::Str),
    ("keepalive_time", PropKind::Rtime),
    ("max_connections", PropKind::Int),
    ("max_tls_version", PropKind::Str),
    ("min_tls_version", PropKind::Str),
    ("port", PropKind::Str),
    ("prefer_ipv6", PropKind::Bool),
    ("probe", PropKind::Probe),
    ("share_key", PropKind::Str),
    ("shield", PropKind::Str),
    ("ssl", PropKind::Bool),
    ("ssl_cert_hostname", PropKind::Str),
    ("ssl_check_cert", PropKind::CheckCert),
    ("ssl_ciphers", PropKind::Str),
    ("ssl_client_cert", PropKind::Str),
    ("ssl_client_key", PropKind::Str),
    ("ssl_sni_hostname", PropKind::Str),
    ("weight", PropKind::Int),
];

const PROBE_PROPERTIES: &[(&str, PropKind)] = &[
    ("dummy", PropKind::Bool),
    ("expected_response", PropKind::Int),
    ("initial", PropKind::Int),
    ("interval", PropKind::Rtime),
    ("request", PropKind::Str),
    ("threshold", PropKind::Int),
    ("timeout", PropKind::Rtime),
    ("url", PropKind::Str),
    ("window", PropKind::Int),
];

struct DirectorSpec {
    kind: &'static str,
    properties: &'static [&'static str],
    backend_required: &'static [&'static str],
    backend_optional: &'static [&'static str],
}

const DIRECTOR_SPECS: &[DirectorSpec] = &[
    DirectorSpec {
        kind: "random",
        properties: &["quorum", "retries"],
        backend_required: &["weight"],
        backend_optional: &[],
    },
    DirectorSpec {
        kind: "hash",
        properties: &["quorum"],
        backend_required: &["weight"],
        backend_optional: &[],
    },
    DirectorSpec {
        kind: "client",
        properties: &["quorum"],
        backend_required: &["weight"],
        backend_optional: &[],
    },
    DirectorSpec {
        kind: "chash",
        properties: &["key", "seed", "vnodes_per_node", "quorum"],
        backend_required: &["id"],
        backend_optional: &["weight"],
    },
    DirectorSpec {
        kind: "fallback",
        properties: &[],
        backend_required: &[],
        backend_optional: &[],
    },
];

impl Linter<'_> {
    pub(crate) fn check_declaration(&mut self, decl: &Declaration) -> Result<(), Fatal> {
        match decl {
            Declaration::Acl(acl) => self.check_acl(acl),
            Declaration::Backend(backend) => self.check_backend(backend),
            Declaration::Director(director) => self.check_director(director),
            Declaration::Table(table) => self.check_table(table),
            Declaration::Subroutine(sub) => return self.check_subroutine(sub),
            Declaration::Penaltybox(pb) => self.check_penaltybox(pb),
            Declaration::Ratecounter(rc) => self.check_ratecounter(rc),
            Declaration::Include(_) => {}
        }
        Ok(())
    }

    /// Reports a duplicate when `name_range` is not the hoisted original.
    /// Returns true if a duplicate was reported.
    fn check_duplicate(
        &mut self,
        original: Option<(TextRange, SmolStr)>,
        kind: &str,
        name: &str,
        name_range: TextRange,
    ) -> bool {
        let Some((range, file)) = original else {
            return false;
        };
        if range == name_range && file == self.files[self.current_file].name {
            return false;
        }
        self.report_related(
            Rule::DuplicateDeclaration,
            name_range,
            format!("{kind} '{name}' is already declared"),
            range,
            "first declared here",
        );
        true
    }

    fn check_name(&mut self, kind: &str, name: &str, range: TextRange) {
        if !is_valid_declaration_name(name) {
            self.report(
                Rule::InvalidName,
                range,
                format!("invalid {kind} name '{name}'"),
            );
        }
    }

    fn check_acl(&mut self, acl: &AclDecl) {
        let name = acl.name.name.as_str();
        self.check_name("acl", name, acl.name.range);
        let original = self
            .ctx
            .symbols
            .acl(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "acl", name, acl.name.range);

        for entry in &acl.entries {
            let address = entry.address.value.as_str();
            let parsed = address.parse::<std::net::IpAddr>();
            match parsed {
                Err(_) => self.report(
                    Rule::AclSyntax,
                    entry.address.range,
                    format!("'{address}' is not a valid IP address"),
                ),
                Ok(addr) => {
                    if let Some(mask) = &entry.mask {
                        let limit: i64 = if addr.is_ipv4() { 32 } else { 128 };
                        if mask.value < 0 || mask.value > limit {
                            self.report(
                                Rule::AclSyntax,
                                mask.range,
                                format!("CIDR mask /{} is out of range", mask.value),
                            );
                        }
                    }
                }
            }
        }
    }

    fn check_backend(&mut self, backend: &BackendDecl) {
        let name = backend.name.name.as_str();
        self.check_name("backend", name, backend.name.range);
        let original = self
            .ctx
            .symbols
            .backend(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "backend", name, backend.name.range);

        for property in &backend.properties {
            self.check_backend_property(property, BACKEND_PROPERTIES, "backend");
        }
    }

    fn check_backend_property(
        &mut self,
        property: &BackendProperty,
        table: &[(&str, PropKind)],
        owner: &str,
    ) {
        let prop_name = property.name.name.as_str();
        let Some(&(_, kind)) = table.iter().find(|(name, _)| *name == prop_name) else {
            self.report(
                Rule::BackendSyntax,
                property.name.range,
                format!("unexpected {owner} property '.{prop_name}'"),
            );
            return;
        };

        match (&property.value, kind) {
            (PropertyValue::Object(probe, range), PropKind::Probe) => {
                for nested in probe {
                    self.check_backend_property(nested, PROBE_PROPERTIES, "probe");
                }
                self.check_probe_health(probe, *range);
            }
            (PropertyValue::Expr(_), PropKind::Probe) => {
                self.report(
                    Rule::BackendSyntax,
                    property.range,
                    format!("'.{prop_name}' must be an object"),
                );
            }
            (PropertyValue::Object(..), _) => {
                self.report(
                    Rule::BackendSyntax,
                    property.range,
                    format!("'.{prop_name}' cannot be an object"),
                );
            }
            (PropertyValue::Expr(value), kind) => {
                let expected = match kind {
                    PropKind::Str => VclType::String,
                    PropKind::Int => VclType::Integer,
                    PropKind::Bool => VclType::Bool,
                    PropKind::Rtime => VclType::Rtime,
                    PropKind::CheckCert => VclType::Id,
                    PropKind::Probe => unreachable!(),
                };
                let actual = property_value_type(value);
                if actual != Some(expected) {
                    self.report(
                        Rule::BackendSyntax,
                        value.range(),
                        format!("'.{prop_name}' must be {}", expected.name()),
                    );
                } else if kind == PropKind::CheckCert {
                    if let Expression::Ident(ident) = value {
                        if ident.name != "always" && ident.name != "never" {
                            self.report(
                                Rule::BackendSyntax,
                                ident.range,
                                "'.ssl_check_cert' must be always or never",
                            );
                        }
                    }
                }
            }
        }
    }

    /// A probe whose `.threshold` exceeds `.initial` marks the backend
    /// unhealthy until enough probes pass.
    fn check_probe_health(&mut self, probe: &[BackendProperty], range: TextRange) {
        let int_of = |name: &str| {
            probe.iter().find_map(|property| {
                if property.name.name != name {
                    return None;
                }
                match &property.value {
                    PropertyValue::Expr(Expression::Integer(int)) => Some(int.value),
                    _ => None,
                }
            })
        };
        if let (Some(threshold), Some(initial)) = (int_of("threshold"), int_of("initial")) {
            if threshold > initial {
                self.report(
                    Rule::BackendStartsUnhealthy,
                    range,
                    format!(
                        "probe threshold {threshold} exceeds initial {initial}: the backend would start unhealthy"
                    ),
                );
            }
        }
    }

    fn check_director(&mut self, director: &DirectorDecl) {
        let name = director.name.name.as_str();
        self.check_name("director", name, director.name.range);
        let original = self
            .ctx
            .symbols
            .backend(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "director", name, director.name.range);

        let kind_name = director.kind.name.as_str();
        let Some(spec) = DIRECTOR_SPECS.iter().find(|spec| spec.kind == kind_name) else {
            self.report(
                Rule::DirectorSyntax,
                director.kind.range,
                format!("unknown director type '{kind_name}'"),
            );
            return;
        };

        for property in &director.properties {
            let prop_name = property.name.name.as_str();
            if !spec.properties.contains(&prop_name) {
                self.report(
                    Rule::DirectorSyntax,
                    property.name.range,
                    format!("unexpected director property '.{prop_name}' for type {kind_name}"),
                );
                continue;
            }
            if prop_name == "quorum" {
                if let PropertyValue::Expr(value) = &property.value {
                    if !matches!(value, Expression::Percent(_)) {
                        self.report(
                            Rule::DirectorSyntax,
                            value.range(),
                            "'.quorum' must be a percentage",
                        );
                    }
                }
            }
        }

        if director.backends.is_empty() {
            self.report(
                Rule::DirectorBackendRequired,
                director.range,
                format!("director '{name}' declares no backends"),
            );
        }

        for block in &director.backends {
            let mut has_backend = false;
            for property in &block.properties {
                let prop_name = property.name.name.as_str();
                if prop_name == "backend" {
                    has_backend = true;
                    match &property.value {
                        PropertyValue::Expr(Expression::Ident(ident)) => {
                            let backend_name = ident.name.clone();
                            if self.ctx.symbols.use_backend(&backend_name).is_none() {
                                self.report(
                                    Rule::UndefinedSymbol,
                                    ident.range,
                                    format!("backend '{backend_name}' is not declared"),
                                );
                            }
                        }
                        other => {
                            let range = other.range();
                            self.report(
                                Rule::DirectorSyntax,
                                range,
                                "'.backend' must reference a backend by name",
                            );
                        }
                    }
                    continue;
                }
                if !spec.backend_required.contains(&prop_name)
                    && !spec.backend_optional.contains(&prop_name)
                {
                    self.report(
                        Rule::DirectorSyntax,
                        property.name.range,
                        format!(
                            "unexpected director property '.{prop_name}' for type {kind_name}"
                        ),
                    );
                }
            }
            if !has_backend {
                self.report(
                    Rule::DirectorSyntax,
                    block.range,
                    "director backend block is missing '.backend'",
                );
            }
            for required in spec.backend_required {
                if !block
                    .properties
                    .iter()
                    .any(|property| property.name.name == *required)
                {
                    self.report(
                        Rule::DirectorSyntax,
                        block.range,
                        format!("director backend block requires '.{required}' for type {kind_name}"),
                    );
                }
            }
        }
    }

    fn check_table(&mut self, table: &TableDecl) {
        let name = table.name.name.as_str();
        self.check_name("table", name, table.name.range);
        let original = self
            .ctx
            .symbols
            .table(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "table", name, table.name.range);

        let value_type = match &table.value_type {
            None => VclType::String,
            Some(ident) => match VclType::from_name(&ident.name) {
                Some(ty) => ty,
                None => {
                    self.report(
                        Rule::TableSyntax,
                        ident.range,
                        format!("unknown table value type '{}'", ident.name),
                    );
                    VclType::String
                }
            },
        };

        for entry in &table.entries {
            let actual = property_value_type(&entry.value);
            let matches_type = match value_type {
                // Backends and ACLs are referenced by identifier.
                VclType::Backend | VclType::Acl => actual == Some(VclType::Id),
                other => actual == Some(other),
            };
            if !matches_type {
                self.report(
                    Rule::TableSyntax,
                    entry.value.range(),
                    format!("table value must be {}", value_type.name()),
                );
            }
        }
    }

    fn check_penaltybox(&mut self, pb: &PenaltyboxDecl) {
        let name = pb.name.name.as_str();
        self.check_name("penaltybox", name, pb.name.range);
        let original = self
            .ctx
            .symbols
            .penaltybox(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "penaltybox", name, pb.name.range);

        if !pb.body.statements.is_empty() {
            self.report(
                Rule::NonEmptyBody,
                pb.body.range,
                "penaltybox body must be empty",
            );
        }
    }

    fn check_ratecounter(&mut self, rc: &RatecounterDecl) {
        let name = rc.name.name.as_str();
        self.check_name("ratecounter", name, rc.name.range);
        let original = self
            .ctx
            .symbols
            .ratecounter(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "ratecounter", name, rc.name.range);

        if !rc.body.statements.is_empty() {
            self.report(
                Rule::NonEmptyBody,
                rc.body.range,
                "ratecounter body must be empty",
            );
        }
    }

    fn check_subroutine(&mut self, sub: &SubroutineDecl) -> Result<(), Fatal> {
        let name = sub.name.name.as_str();
        let reserved = reserved_subroutine_phase(name);
        if reserved.is_none() {
            self.check_name("subroutine", name, sub.name.range);
        }
        let original = self
            .ctx
            .symbols
            .subroutine(name)
            .map(|symbol| (symbol.range, symbol.file.clone()));
        self.check_duplicate(original, "subroutine", name, sub.name.range);

        if let Some(phase) = reserved {
            if sub.return_type.is_some() {
                self.report(
                    Rule::ReservedSubroutineReturnType,
                    sub.name.range,
                    format!("reserved subroutine '{name}' cannot declare a return type"),
                );
            }
            if !self.has_fastly_macro(sub, phase) {
                self.report(
                    Rule::MissingFastlyMacro,
                    sub.name.range,
                    format!("'{name}' is missing the '#FASTLY {}' boilerplate comment", phase.name()),
                );
            }
        }

        let return_type = match &sub.return_type {
            None => None,
            Some(ident) => match VclType::from_name(&ident.name) {
                Some(ty) => Some(ty),
                None => {
                    self.report(
                        Rule::InvalidReturnType,
                        ident.range,
                        format!("unknown return type '{}'", ident.name),
                    );
                    None
                }
            },
        };

        let phases = self
            .ctx
            .symbols
            .subroutine_phases(name)
            .unwrap_or_else(PhaseSet::all);
        let mut sub_cx = SubContext::new(phases, return_type, reserved);

        self.collect_labels(&sub.body, &mut sub_cx);

        if let Some(phase) = reserved {
            if self.has_fastly_macro(sub, phase) {
                self.inject_scoped_snippets(phase, &mut sub_cx)?;
            }
        }

        for statement in &sub.body.statements {
            self.check_statement(statement, &mut sub_cx)?;
        }

        // Locals never read are dead weight.
        let unused: Vec<(SmolStr, TextRange)> = sub_cx
            .locals
            .iter()
            .filter(|var| !var.read)
            .map(|var| (var.name.clone(), var.range))
            .collect();
        for (var_name, range) in unused {
            self.report(
                Rule::UnusedVariable,
                range,
                format!("local variable '{var_name}' is never read"),
            );
        }
        Ok(())
    }

    fn has_fastly_macro(&self, sub: &SubroutineDecl, phase: Phase) -> bool {
        let matches_phase =
            |comment: &falco_syntax::ast::Comment| fastly_macro_phase(comment) == Some(phase);
        sub.body
            .statements
            .iter()
            .any(|statement| statement.leading().iter().any(matches_phase))
            || sub.body.trailing.iter().any(matches_phase)
    }

    fn inject_scoped_snippets(
        &mut self,
        phase: Phase,
        sub_cx: &mut SubContext,
    ) -> Result<(), Fatal> {
        let items: Vec<_> = match self.ctx.snippets.as_ref() {
            Some(snippets) => snippets.scoped(phase).to_vec(),
            None => return Ok(()),
        };
        for item in items {
            let name = format!("snippet::{}", item.name);
            self.check_included_statements(&name, &item.source, sub_cx)?;
        }
        Ok(())
    }
}
