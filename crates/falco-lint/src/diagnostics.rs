//! Diagnostic types for semantic errors, warnings and advisories.

use smol_str::SmolStr;
use text_size::TextRange;

use falco_syntax::LineIndex;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Violates a language rule; the service would misbehave or fail to
    /// compile.
    Error,
    /// Probable bug that might still work at runtime.
    Warning,
    /// Stylistic or advisory notice.
    Info,
}

impl Severity {
    /// Lowercase label used in rendered output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A lint rule, identifying the type of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    // Declarations
    /// Declared name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    InvalidName,
    /// Name already declared in the same namespace.
    DuplicateDeclaration,
    /// ACL entry address is not a valid IP or CIDR mask.
    AclSyntax,
    /// Unknown or mistyped backend property.
    BackendSyntax,
    /// Probe threshold exceeds the initial health count.
    BackendStartsUnhealthy,
    /// Unknown director type, unexpected or missing property.
    DirectorSyntax,
    /// Director declares no member backends.
    DirectorBackendRequired,
    /// Table value does not match the declared value type.
    TableSyntax,
    /// Penaltybox/ratecounter body must be empty.
    NonEmptyBody,
    /// Reserved subroutine is missing its `#FASTLY <phase>` macro.
    MissingFastlyMacro,
    /// Reserved subroutine declares a return type.
    ReservedSubroutineReturnType,

    // Name resolution
    /// Reference to an undeclared object.
    UndefinedSymbol,
    /// Unknown variable for the current scope.
    UndefinedVariable,
    /// Unknown function.
    UndefinedFunction,
    /// Ratecounter bucket window is not one of the supported durations.
    RatecounterBucketDuration,

    // Statements
    /// Malformed `declare local` (name or type).
    DeclareSyntax,
    /// Assignment target is not writable.
    NotWritable,
    /// Unset/remove target cannot be unset.
    NotUnsettable,
    /// Mutation of an edge-controlled HTTP header.
    ProtectedHeader,
    /// `add` target is not an HTTP header.
    InvalidAddTarget,
    /// `call` target is missing or has a return type.
    InvalidCallTarget,
    /// `error` code outside the custom range.
    ErrorCodeRange,
    /// Statement is not allowed in the subroutine's phase.
    StatementScope,
    /// Variable is not available in the subroutine's phase.
    VariableScope,
    /// `goto` to an undeclared label.
    UndefinedGotoDestination,
    /// More than one destination for a label.
    DuplicateGotoDestination,
    /// `log` argument is not a string.
    LogArgument,
    /// Calling a user subroutine as a bare function statement.
    FunctionStatement,
    /// Bare `return;` inside a reserved subroutine.
    EmptyReturn,
    /// Return action keyword is not valid for the phase.
    InvalidReturnAction,
    /// Returned value type does not match the declared return type.
    InvalidReturnType,
    /// Return expression form is not allowed (operators, missing value,
    /// parenthesized plain value).
    InvalidReturnForm,

    // Expressions
    /// Assigned or passed value has the wrong type.
    TypeMismatch,
    /// Condition is not a usable boolean expression.
    InvalidCondition,
    /// Condition is a literal.
    LiteralCondition,
    /// Comparison/match operator used outside a condition.
    OperatorConditionOnly,
    /// Operand types do not agree for the operator.
    OperandMismatch,
    /// Regex literal does not parse.
    InvalidRegex,
    /// Wrong number of arguments in a function call.
    ArgumentCount,
    /// Wrong argument type in a function call.
    ArgumentType,
    /// `re.group.N` read with no regex match before it.
    ReGroupWithoutMatch,
    /// `re.group.N` read after a later match overrode the captures.
    ReGroupOverridden,
    /// Non-string operand implicitly coerced in concatenation.
    ImplicitStringConversion,
    /// Ternary branches disagree in type.
    IfExpressionTypes,

    // Post-traversal
    /// Declared object is never referenced.
    UnusedDeclaration,
    /// Local variable is never read.
    UnusedVariable,
}

impl Rule {
    /// Returns the stable string code for the rule.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName => "invalid-name",
            Self::DuplicateDeclaration => "duplicate-declaration",
            Self::AclSyntax => "acl-syntax",
            Self::BackendSyntax => "backend-syntax",
            Self::BackendStartsUnhealthy => "backend-starts-unhealthy",
            Self::DirectorSyntax => "director-syntax",
            Self::DirectorBackendRequired => "director-backend-required",
            Self::TableSyntax => "table-syntax",
            Self::NonEmptyBody => "non-empty-body",
            Self::MissingFastlyMacro => "missing-fastly-macro",
            Self::ReservedSubroutineReturnType => "reserved-subroutine-return-type",
            Self::UndefinedSymbol => "undefined-symbol",
            Self::UndefinedVariable => "undefined-variable",
            Self::UndefinedFunction => "undefined-function",
            Self::RatecounterBucketDuration => "ratecounter-bucket-duration",
            Self::DeclareSyntax => "declare-syntax",
            Self::NotWritable => "not-writable",
            Self::NotUnsettable => "not-unsettable",
            Self::ProtectedHeader => "protected-header",
            Self::InvalidAddTarget => "invalid-add-target",
            Self::InvalidCallTarget => "invalid-call-target",
            Self::ErrorCodeRange => "error-code-range",
            Self::StatementScope => "statement-scope",
            Self::VariableScope => "variable-scope",
            Self::UndefinedGotoDestination => "undefined-goto-destination",
            Self::DuplicateGotoDestination => "duplicate-goto-destination",
            Self::LogArgument => "log-argument",
            Self::FunctionStatement => "function-statement",
            Self::EmptyReturn => "empty-return",
            Self::InvalidReturnAction => "invalid-return-action",
            Self::InvalidReturnType => "invalid-return-type",
            Self::InvalidReturnForm => "invalid-return-form",
            Self::TypeMismatch => "type-mismatch",
            Self::InvalidCondition => "invalid-condition",
            Self::LiteralCondition => "literal-condition",
            Self::OperatorConditionOnly => "operator-condition-only",
            Self::OperandMismatch => "operand-mismatch",
            Self::InvalidRegex => "invalid-regex",
            Self::ArgumentCount => "argument-count",
            Self::ArgumentType => "argument-type",
            Self::ReGroupWithoutMatch => "re-group-without-match",
            Self::ReGroupOverridden => "re-group-overridden",
            Self::ImplicitStringConversion => "implicit-string-conversion",
            Self::IfExpressionTypes => "if-expression-types",
            Self::UnusedDeclaration => "unused-declaration",
            Self::UnusedVariable => "unused-variable",
        }
    }

    /// Returns the default severity for this rule.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::IfExpressionTypes | Self::UnusedDeclaration | Self::UnusedVariable => {
                Severity::Warning
            }
            Self::ImplicitStringConversion | Self::ReGroupOverridden => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// Related information for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// The location of the related information.
    pub range: TextRange,
    /// The message.
    pub message: String,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The rule that produced the diagnostic.
    pub rule: Rule,
    /// The severity level.
    pub severity: Severity,
    /// The file the diagnostic belongs to.
    pub file: SmolStr,
    /// The primary source range.
    pub range: TextRange,
    /// The diagnostic message.
    pub message: String,
    /// Secondary ranges (e.g. "also declared here").
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Creates a new diagnostic with the rule's default severity.
    pub fn new(rule: Rule, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            severity: rule.severity(),
            rule,
            file: SmolStr::default(),
            range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Adds related information to the diagnostic.
    #[must_use]
    pub fn with_related(mut self, range: TextRange, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            range,
            message: message.into(),
        });
        self
    }

    /// Returns true if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Renders the diagnostic in the line-oriented output format, with a
    /// source snippet and caret.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        let index = LineIndex::new(source);
        let pos = index.line_col(self.range.start());
        let mut out = format!(
            "{}: {} at {}:{}:{}: {}",
            self.severity.label(),
            self.rule.code(),
            self.file,
            pos.line,
            pos.column,
            self.message,
        );
        if let Some(line_text) = source.lines().nth(pos.line as usize - 1) {
            let caret_offset = pos.column as usize - 1;
            out.push_str(&format!(
                "\n  {}\n  {}^",
                line_text,
                " ".repeat(caret_offset.min(line_text.len()))
            ));
        }
        out
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {} (at {}..{})",
            self.severity.label(),
            self.rule.code(),
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

/// Collects diagnostics in traversal order.
#[derive(Debug, Default)]
pub struct DiagnosticBuilder {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBuilder {
    /// Creates a new diagnostic builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds a diagnostic for the rule at its default severity.
    pub fn report(&mut self, rule: Rule, range: TextRange, message: impl Into<String>) {
        self.add(Diagnostic::new(rule, range, message));
    }

    /// Returns true if any errors have been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Number of diagnostics collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The diagnostics collected so far.
    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Mutable access for the suppression post-filter.
    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<Diagnostic> {
        &mut self.diagnostics
    }

    /// Consumes the builder and returns the diagnostics.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::new(
            Rule::UndefinedVariable,
            TextRange::new(10.into(), 15.into()),
            "undefined variable 'req.unknwon.Host'",
        );

        assert!(diag.is_error());
        assert_eq!(diag.rule.code(), "undefined-variable");
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(Rule::TypeMismatch.severity(), Severity::Error);
        assert_eq!(Rule::IfExpressionTypes.severity(), Severity::Warning);
        assert_eq!(Rule::ImplicitStringConversion.severity(), Severity::Info);
        assert_eq!(Rule::ReGroupOverridden.severity(), Severity::Info);
    }

    #[test]
    fn test_render_format() {
        let source = "sub foo {\n  set req.http.X = 1;\n}";
        let mut diag = Diagnostic::new(
            Rule::TypeMismatch,
            TextRange::new(12.into(), 31.into()),
            "INTEGER is not assignable to STRING",
        );
        diag.file = SmolStr::new("main.vcl");

        let rendered = diag.render(source);
        assert!(rendered.starts_with("error: type-mismatch at main.vcl:2:3:"));
        assert!(rendered.contains("set req.http.X = 1;"));
        assert!(rendered.ends_with('^'));
    }

    #[test]
    fn test_builder_order_preserved() {
        let mut builder = DiagnosticBuilder::new();
        builder.report(
            Rule::TypeMismatch,
            TextRange::new(0.into(), 1.into()),
            "first",
        );
        builder.report(
            Rule::UnusedVariable,
            TextRange::new(2.into(), 3.into()),
            "second",
        );

        let diagnostics = builder.finish();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].message, "first");
        assert_eq!(diagnostics[1].severity, Severity::Warning);
    }
}
