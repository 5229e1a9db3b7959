//! In-source suppression directives.
//!
//! A single lexical scan collects `falco-ignore` comments and turns them
//! into suppressed line sets applied as a post-filter over collected
//! diagnostics:
//!
//! - `falco-ignore-next-line` suppresses the following source line
//! - a trailing `falco-ignore` suppresses its own line
//! - `falco-ignore-start` / `falco-ignore-end` suppress the enclosed range
//!   (an unclosed start runs to the end of the file)
//!
//! All three comment markers (`#`, `//`, `/* ... */`) are recognized, since
//! the scan runs over lexed comment tokens.

use rustc_hash::FxHashSet;
use text_size::TextRange;

use falco_syntax::lexer::{lex, TokenKind};
use falco_syntax::LineIndex;

/// Suppressed lines for one source file.
#[derive(Debug, Clone, Default)]
pub struct SuppressIndex {
    lines: FxHashSet<u32>,
    ranges: Vec<(u32, u32)>,
}

impl SuppressIndex {
    /// Scans a source file for suppression directives.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let index = LineIndex::new(source);
        let mut lines = FxHashSet::default();
        let mut ranges = Vec::new();
        let mut open_start: Option<u32> = None;

        for token in lex(source) {
            if !token.kind.is_comment() {
                continue;
            }
            let text = token.text(source);
            let content = comment_content(text, token.kind);
            let Some(directive) = Directive::parse(content) else {
                continue;
            };
            let line = index.line_of(token.range);
            match directive {
                Directive::NextLine => {
                    lines.insert(line + 1);
                }
                Directive::ThisLine => {
                    lines.insert(line);
                }
                Directive::Start => {
                    if open_start.is_none() {
                        open_start = Some(line);
                    }
                }
                Directive::End => {
                    if let Some(start) = open_start.take() {
                        ranges.push((start, line));
                    }
                }
            }
        }

        if let Some(start) = open_start {
            ranges.push((start, u32::MAX));
        }

        Self { lines, ranges }
    }

    /// Returns true if diagnostics on this 1-based line are suppressed.
    #[must_use]
    pub fn is_suppressed(&self, line: u32) -> bool {
        self.lines.contains(&line)
            || self
                .ranges
                .iter()
                .any(|&(start, end)| line >= start && line <= end)
    }

    /// Returns true if the diagnostic range's primary line is suppressed.
    #[must_use]
    pub fn suppresses_range(&self, range: TextRange, index: &LineIndex) -> bool {
        self.is_suppressed(index.line_of(range))
    }

    /// Returns true if no directives were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.ranges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    NextLine,
    ThisLine,
    Start,
    End,
}

impl Directive {
    fn parse(content: &str) -> Option<Self> {
        let rest = content.trim().strip_prefix("falco-ignore")?;
        match rest.split_whitespace().next().unwrap_or("") {
            "-next-line" => Some(Self::NextLine),
            "-start" => Some(Self::Start),
            "-end" => Some(Self::End),
            "" => Some(Self::ThisLine),
            _ => None,
        }
    }
}

fn comment_content(text: &str, kind: TokenKind) -> &str {
    match kind {
        TokenKind::BlockComment => text
            .strip_prefix("/*")
            .map(|t| t.strip_suffix("*/").unwrap_or(t))
            .unwrap_or(text),
        _ => text.trim_start_matches(['/', '#']),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_line() {
        let index = SuppressIndex::new("# falco-ignore-next-line\nset req.http.X = y;\n");
        assert!(!index.is_suppressed(1));
        assert!(index.is_suppressed(2));
        assert!(!index.is_suppressed(3));
    }

    #[test]
    fn test_trailing_same_line() {
        let index = SuppressIndex::new("sub x {\n  set req.http.X = y; // falco-ignore\n}\n");
        assert!(index.is_suppressed(2));
        assert!(!index.is_suppressed(1));
    }

    #[test]
    fn test_start_end_range() {
        let source = "a\n// falco-ignore-start\nb\nc\n// falco-ignore-end\nd\n";
        let index = SuppressIndex::new(source);
        assert!(!index.is_suppressed(1));
        assert!(index.is_suppressed(2));
        assert!(index.is_suppressed(4));
        assert!(index.is_suppressed(5));
        assert!(!index.is_suppressed(6));
    }

    #[test]
    fn test_unclosed_start_runs_to_eof() {
        let index = SuppressIndex::new("// falco-ignore-start\nsub x {}\n");
        assert!(index.is_suppressed(2));
        assert!(index.is_suppressed(9999));
    }

    #[test]
    fn test_block_comment_marker() {
        let index = SuppressIndex::new("/* falco-ignore-next-line */\nx\n");
        assert!(index.is_suppressed(2));
    }

    #[test]
    fn test_directive_parsing_is_exact() {
        assert_eq!(Directive::parse(" falco-ignore "), Some(Directive::ThisLine));
        assert_eq!(
            Directive::parse("falco-ignore-next-line trailing words"),
            Some(Directive::NextLine)
        );
        assert_eq!(Directive::parse("falco-ignored"), None);
        assert_eq!(Directive::parse("not falco-ignore"), None);
    }

    #[test]
    fn test_directives_inside_strings_are_not_directives() {
        let index = SuppressIndex::new("set req.http.X = \"# falco-ignore\";\n");
        assert!(index.is_empty());
    }
}
