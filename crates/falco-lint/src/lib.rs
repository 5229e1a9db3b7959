//! `falco-lint` - Semantic analysis for the Fastly VCL dialect.
//!
//! This crate lints the AST produced by `falco-syntax`:
//!
//! - **Symbol tables**: ACLs, backends, directors, tables, subroutines,
//!   penaltyboxes, ratecounters, with hoisting and unused tracking
//! - **Type checking**: the closed VCL type set with Fastly's fuzzy
//!   string-view coercions
//! - **Phase analysis**: which state functions a subroutine may run in,
//!   from annotations or call-graph inference
//! - **Includes & snippets**: nested parse+lint into one shared context
//! - **Diagnostics**: ordered, coded, suppressible with `falco-ignore`
//!   comments
//!
//! # Example
//!
//! ```
//! use falco_lint::{lint_source, Context};
//!
//! let mut context = Context::new();
//! let result = lint_source(&mut context, "main.vcl", r#"
//! sub vcl_recv {
//!     #FASTLY recv
//!     set req.http.X-Forwarded-Host = req.http.Host;
//!     return (lookup);
//! }
//! "#);
//! assert!(result.is_clean());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
mod check;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod ident;
mod linter;
pub mod pattern;
pub mod phase;
pub mod suppress;
pub mod symbols;
pub mod types;

pub use config::{LintConfig, Strictness};
pub use context::{Context, ContextBuilder, ResolveError, Resolver, SnippetItem, Snippets, VclSource};
pub use diagnostics::{Diagnostic, Rule, Severity};
pub use linter::{lint, lint_source, Fatal, LintResult};
pub use phase::{Phase, PhaseSet};
pub use types::VclType;
