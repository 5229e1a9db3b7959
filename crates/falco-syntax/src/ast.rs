//! Abstract syntax tree for Fastly VCL.
//!
//! Tagged enums with one variant per declaration, statement and expression
//! form. Every node carries its byte range; declarations and statements
//! carry their leading comments because the analyzer reads them (scope
//! annotations such as `//@recv, log` and the `#FASTLY <phase>` macro).

use smol_str::SmolStr;
use text_size::TextRange;

/// A comment attached to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Raw comment text including the marker.
    pub text: SmolStr,
    /// Byte range in the source.
    pub range: TextRange,
}

impl Comment {
    /// Returns the comment content with markers and surrounding whitespace
    /// stripped: `// foo` -> `foo`, `### bar` -> `bar`, `/* baz */` -> `baz`.
    #[must_use]
    pub fn content(&self) -> &str {
        let text = self.text.as_str();
        if let Some(inner) = text.strip_prefix("/*") {
            return inner.strip_suffix("*/").unwrap_or(inner).trim();
        }
        text.trim_start_matches(['/', '#']).trim()
    }
}

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The identifier text.
    pub name: SmolStr,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A string literal. `long` is set for `{"..."}` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    /// The string contents without delimiters.
    pub value: SmolStr,
    /// Whether the literal used the `{"..."}` form.
    pub long: bool,
    /// Byte range in the source.
    pub range: TextRange,
}

/// An integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerLit {
    /// Parsed value.
    pub value: i64,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A float literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLit {
    /// Parsed value.
    pub value: f64,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A boolean literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolLit {
    /// Parsed value.
    pub value: bool,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A duration literal such as `1s` or `0.5m`, typed RTIME.
#[derive(Debug, Clone, PartialEq)]
pub struct RtimeLit {
    /// Raw literal text.
    pub text: SmolStr,
    /// Value converted to seconds.
    pub seconds: f64,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A percentage literal such as `50%`, used for director quorum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentLit {
    /// Percentage value (the `50` in `50%`).
    pub value: u32,
    /// Byte range in the source.
    pub range: TextRange,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    /// `!`
    Not,
    /// `-`
    Minus,
    /// `+`
    Plus,
}

impl PrefixOp {
    /// Returns the operator's source text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Minus => "-",
            Self::Plus => "+",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `~`
    Match,
    /// `!~`
    NotMatch,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `&&`
    And,
    /// `||`
    Or,
    /// String concatenation, written as `+` or by juxtaposition.
    Concat,
}

impl BinaryOp {
    /// Returns `true` for `==`, `!=`, `<`, `<=`, `>`, `>=`.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::Lte | Self::Gt | Self::Gte
        )
    }

    /// Returns `true` for `~` and `!~`.
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Self::Match | Self::NotMatch)
    }

    /// Returns `true` for `&&` and `||`.
    #[must_use]
    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Returns the operator's source text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Match => "~",
            Self::NotMatch => "!~",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Concat => "+",
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An identifier reference.
    Ident(Ident),
    /// A string literal.
    String(StringLit),
    /// An integer literal.
    Integer(IntegerLit),
    /// A float literal.
    Float(FloatLit),
    /// A boolean literal.
    Bool(BoolLit),
    /// A duration literal.
    Rtime(RtimeLit),
    /// A percentage literal.
    Percent(PercentLit),
    /// A prefix expression such as `!cond`.
    Prefix(PrefixExpr),
    /// A parenthesized expression.
    Group(GroupExpr),
    /// An infix expression.
    Binary(BinaryExpr),
    /// The ternary `if(cond, consequence, alternative)` expression.
    IfExpr(IfExpr),
    /// A function call expression.
    Call(CallExpr),
}

impl Expression {
    /// Returns the expression's byte range.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Ident(node) => node.range,
            Self::String(node) => node.range,
            Self::Integer(node) => node.range,
            Self::Float(node) => node.range,
            Self::Bool(node) => node.range,
            Self::Rtime(node) => node.range,
            Self::Percent(node) => node.range,
            Self::Prefix(node) => node.range,
            Self::Group(node) => node.range,
            Self::Binary(node) => node.range,
            Self::IfExpr(node) => node.range,
            Self::Call(node) => node.range,
        }
    }

    /// Returns `true` for literal nodes (not identifiers or composites).
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::String(_)
                | Self::Integer(_)
                | Self::Float(_)
                | Self::Bool(_)
                | Self::Rtime(_)
                | Self::Percent(_)
        )
    }
}

/// A prefix expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    /// The operator.
    pub op: PrefixOp,
    /// The operand.
    pub right: Box<Expression>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupExpr {
    /// The inner expression.
    pub inner: Box<Expression>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// An infix expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// The operator.
    pub op: BinaryOp,
    /// Left operand.
    pub left: Box<Expression>,
    /// Right operand.
    pub right: Box<Expression>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// The ternary `if(cond, a, b)` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    /// The condition.
    pub condition: Box<Expression>,
    /// Value when the condition holds.
    pub consequence: Box<Expression>,
    /// Value when the condition does not hold.
    pub alternative: Box<Expression>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// The function name (dotted path allowed).
    pub function: Ident,
    /// Argument expressions.
    pub args: Vec<Expression>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A braced block of statements. Trailing comments are the comments between
/// the last statement and the closing brace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// The statements.
    pub statements: Vec<Statement>,
    /// Comments before the closing brace.
    pub trailing: Vec<Comment>,
    /// Byte range including the braces.
    pub range: TextRange,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A nested `{ ... }` block.
    Block(BlockStmt),
    /// `declare local var.NAME TYPE;`
    Declare(DeclareStmt),
    /// `set LHS = EXPR;`
    Set(SetStmt),
    /// `add LHS = EXPR;`
    Add(AddStmt),
    /// `unset LHS;`
    Unset(UnsetStmt),
    /// `remove LHS;`
    Remove(RemoveStmt),
    /// `call NAME;`
    Call(CallStmt),
    /// `error CODE [MESSAGE];`
    Error(ErrorStmt),
    /// `restart;`
    Restart(RestartStmt),
    /// `return;`, `return EXPR;` or `return (ACTION);`
    Return(ReturnStmt),
    /// `esi;`
    Esi(EsiStmt),
    /// `synthetic EXPR;` or `synthetic.base64 EXPR;`
    Synthetic(SyntheticStmt),
    /// `log EXPR;`
    Log(LogStmt),
    /// `if (...) { ... } else ...`
    If(IfStmt),
    /// `goto LABEL;`
    Goto(GotoStmt),
    /// `LABEL:`
    Label(LabelStmt),
    /// `include "name";` in statement position.
    Include(IncludeStmt),
    /// A bare function call statement: `name(args);`
    FunctionCall(FunctionCallStmt),
}

impl Statement {
    /// Returns the statement's byte range.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Block(node) => node.range,
            Self::Declare(node) => node.range,
            Self::Set(node) => node.range,
            Self::Add(node) => node.range,
            Self::Unset(node) => node.range,
            Self::Remove(node) => node.range,
            Self::Call(node) => node.range,
            Self::Error(node) => node.range,
            Self::Restart(node) => node.range,
            Self::Return(node) => node.range,
            Self::Esi(node) => node.range,
            Self::Synthetic(node) => node.range,
            Self::Log(node) => node.range,
            Self::If(node) => node.range,
            Self::Goto(node) => node.range,
            Self::Label(node) => node.range,
            Self::Include(node) => node.range,
            Self::FunctionCall(node) => node.range,
        }
    }

    /// Returns the statement's leading comments.
    #[must_use]
    pub fn leading(&self) -> &[Comment] {
        match self {
            Self::Block(node) => &node.leading,
            Self::Declare(node) => &node.leading,
            Self::Set(node) => &node.leading,
            Self::Add(node) => &node.leading,
            Self::Unset(node) => &node.leading,
            Self::Remove(node) => &node.leading,
            Self::Call(node) => &node.leading,
            Self::Error(node) => &node.leading,
            Self::Restart(node) => &node.leading,
            Self::Return(node) => &node.leading,
            Self::Esi(node) => &node.leading,
            Self::Synthetic(node) => &node.leading,
            Self::Log(node) => &node.leading,
            Self::If(node) => &node.leading,
            Self::Goto(node) => &node.leading,
            Self::Label(node) => &node.leading,
            Self::Include(node) => &node.leading,
            Self::FunctionCall(node) => &node.leading,
        }
    }
}

/// A nested block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The block.
    pub block: Block,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `declare local var.NAME TYPE;`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The variable name (must begin with `var.`).
    pub name: Ident,
    /// The declared type name.
    pub var_type: Ident,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `set LHS = EXPR;`
#[derive(Debug, Clone, PartialEq)]
pub struct SetStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// Assignment target.
    pub target: Ident,
    /// Assigned value.
    pub value: Expression,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `add LHS = EXPR;`
#[derive(Debug, Clone, PartialEq)]
pub struct AddStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// Assignment target (must be an HTTP header).
    pub target: Ident,
    /// Assigned value.
    pub value: Expression,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `unset LHS;`
#[derive(Debug, Clone, PartialEq)]
pub struct UnsetStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The target variable.
    pub target: Ident,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `remove LHS;` (alias of unset)
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The target variable.
    pub target: Ident,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `call NAME;`
#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The subroutine name.
    pub subroutine: Ident,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `error CODE [MESSAGE];`
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The status code expression, if present.
    pub code: Option<Expression>,
    /// The optional response message expression.
    pub message: Option<Expression>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `restart;`
#[derive(Debug, Clone, PartialEq)]
pub struct RestartStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `return;`, `return EXPR;` or `return (ACTION);`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The returned expression, if present. For `return (x);` this is the
    /// inner expression with `has_parens` set.
    pub expression: Option<Expression>,
    /// Whether the argument was parenthesized.
    pub has_parens: bool,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `esi;`
#[derive(Debug, Clone, PartialEq)]
pub struct EsiStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `synthetic EXPR;` / `synthetic.base64 EXPR;`
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The response body expression.
    pub value: Expression,
    /// Whether the `synthetic.base64` form was used.
    pub base64: bool,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `log EXPR;`
#[derive(Debug, Clone, PartialEq)]
pub struct LogStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The logged expression.
    pub value: Expression,
    /// Byte range in the source.
    pub range: TextRange,
}

/// An `else if`/`elsif`/`elseif` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    /// The arm's condition.
    pub condition: Expression,
    /// The arm's block.
    pub block: Block,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `if (...) { ... } else if ... else { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The condition.
    pub condition: Expression,
    /// The consequence block.
    pub consequence: Block,
    /// Zero or more `else if` arms.
    pub alternatives: Vec<ElseIf>,
    /// The final `else` block, if present.
    pub alternative: Option<Block>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `goto LABEL;`
#[derive(Debug, Clone, PartialEq)]
pub struct GotoStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The destination label.
    pub label: Ident,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `LABEL:` - a goto destination.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The label name, without the trailing colon.
    pub label: Ident,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `include "name";` in statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The include module name.
    pub module: StringLit,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A bare function call statement.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallStmt {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The call.
    pub call: CallExpr,
    /// Byte range in the source.
    pub range: TextRange,
}

/// An ACL entry: `[!] "addr" [/mask];`
#[derive(Debug, Clone, PartialEq)]
pub struct AclEntry {
    /// Whether the entry is negated.
    pub inverse: bool,
    /// The address literal.
    pub address: StringLit,
    /// The CIDR mask, if present.
    pub mask: Option<IntegerLit>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `acl NAME { entries }`
#[derive(Debug, Clone, PartialEq)]
pub struct AclDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The ACL name.
    pub name: Ident,
    /// The entries.
    pub entries: Vec<AclEntry>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A backend property value: an expression or a nested `{ ... }` object
/// (the `.probe` form).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A plain expression value.
    Expr(Expression),
    /// A nested object value.
    Object(Vec<BackendProperty>, TextRange),
}

impl PropertyValue {
    /// Returns the value's byte range.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Expr(expr) => expr.range(),
            Self::Object(_, range) => *range,
        }
    }
}

/// A single `.name = value;` backend property.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendProperty {
    /// The property name, without the leading dot.
    pub name: Ident,
    /// The property value.
    pub value: PropertyValue,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `backend NAME { properties }`
#[derive(Debug, Clone, PartialEq)]
pub struct BackendDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The backend name.
    pub name: Ident,
    /// The properties.
    pub properties: Vec<BackendProperty>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// One `{ .backend = name; ... }` block inside a director.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorBackend {
    /// The block's properties (`.backend`, `.weight`, `.id`, ...).
    pub properties: Vec<BackendProperty>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `director NAME TYPE { properties; backend blocks }`
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The director name.
    pub name: Ident,
    /// The director type (`random`, `hash`, `client`, `chash`, `fallback`).
    pub kind: Ident,
    /// Director-level properties such as `.quorum`.
    pub properties: Vec<BackendProperty>,
    /// Member backend blocks.
    pub backends: Vec<DirectorBackend>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// One `"key": value` table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// The key literal.
    pub key: StringLit,
    /// The value expression.
    pub value: Expression,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `table NAME [TYPE] { entries }`
#[derive(Debug, Clone, PartialEq)]
pub struct TableDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The table name.
    pub name: Ident,
    /// The declared value type, if present (defaults to STRING).
    pub value_type: Option<Ident>,
    /// The entries.
    pub entries: Vec<TableEntry>,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `sub NAME [RETURN_TYPE] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct SubroutineDecl {
    /// Leading comments (scope annotations live here).
    pub leading: Vec<Comment>,
    /// The subroutine name.
    pub name: Ident,
    /// The declared return type, if any.
    pub return_type: Option<Ident>,
    /// The body.
    pub body: Block,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `penaltybox NAME { }`
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyboxDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The penaltybox name.
    pub name: Ident,
    /// The body (must be empty apart from comments).
    pub body: Block,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `ratecounter NAME { }`
#[derive(Debug, Clone, PartialEq)]
pub struct RatecounterDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The ratecounter name.
    pub name: Ident,
    /// The body (must be empty apart from comments).
    pub body: Block,
    /// Byte range in the source.
    pub range: TextRange,
}

/// `include "name";` at declaration level.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDecl {
    /// Leading comments.
    pub leading: Vec<Comment>,
    /// The include module name.
    pub module: StringLit,
    /// Byte range in the source.
    pub range: TextRange,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// An ACL declaration.
    Acl(AclDecl),
    /// A backend declaration.
    Backend(BackendDecl),
    /// A director declaration.
    Director(DirectorDecl),
    /// A table declaration.
    Table(TableDecl),
    /// A subroutine declaration.
    Subroutine(SubroutineDecl),
    /// A penaltybox declaration.
    Penaltybox(PenaltyboxDecl),
    /// A ratecounter declaration.
    Ratecounter(RatecounterDecl),
    /// A declaration-level include.
    Include(IncludeDecl),
}

impl Declaration {
    /// Returns the declaration's byte range.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Acl(node) => node.range,
            Self::Backend(node) => node.range,
            Self::Director(node) => node.range,
            Self::Table(node) => node.range,
            Self::Subroutine(node) => node.range,
            Self::Penaltybox(node) => node.range,
            Self::Ratecounter(node) => node.range,
            Self::Include(node) => node.range,
        }
    }

    /// Returns the declared name, if the declaration has one.
    #[must_use]
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Self::Acl(node) => Some(&node.name),
            Self::Backend(node) => Some(&node.name),
            Self::Director(node) => Some(&node.name),
            Self::Table(node) => Some(&node.name),
            Self::Subroutine(node) => Some(&node.name),
            Self::Penaltybox(node) => Some(&node.name),
            Self::Ratecounter(node) => Some(&node.name),
            Self::Include(_) => None,
        }
    }

    /// Returns the declaration's leading comments.
    #[must_use]
    pub fn leading(&self) -> &[Comment] {
        match self {
            Self::Acl(node) => &node.leading,
            Self::Backend(node) => &node.leading,
            Self::Director(node) => &node.leading,
            Self::Table(node) => &node.leading,
            Self::Subroutine(node) => &node.leading,
            Self::Penaltybox(node) => &node.leading,
            Self::Ratecounter(node) => &node.leading,
            Self::Include(node) => &node.leading,
        }
    }
}

/// A parsed VCL source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    /// The top-level declarations, in source order.
    pub declarations: Vec<Declaration>,
}
