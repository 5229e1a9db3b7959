//! Token definitions for the Fastly VCL dialect.
//!
//! The token kinds are designed to work with the `logos` lexer generator.
//! Comments are lexed as trivia but preserved: the semantic analyzer reads
//! them (scope annotations, Fastly boilerplate macros, ignore directives).

use logos::Logos;

fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0usize;

    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            lex.bump(i + 2);
            return true;
        }
        i += 1;
    }

    lex.bump(bytes.len());
    false
}

fn lex_long_string(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0usize;

    while i + 1 < bytes.len() {
        if bytes[i] == b'"' && bytes[i + 1] == b'}' {
            lex.bump(i + 2);
            return true;
        }
        i += 1;
    }

    lex.bump(bytes.len());
    false
}

/// All token kinds in Fastly VCL.
///
/// Identifiers deliberately swallow `.`, `-` and `:` so that dotted variable
/// paths (`req.http.Edge-Control:cache-maxage`) and goto labels (`done:`)
/// arrive as single tokens, the way the language reads them.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[derive(Default)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Whitespace (spaces, tabs, newlines)
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Line comment: `// ...` or `# ...`
    #[regex(r"//[^\r\n]*")]
    #[regex(r"#[^\r\n]*")]
    LineComment,

    /// Block comment: `/* ... */`
    #[token("/*", lex_block_comment)]
    BlockComment,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    /// `;`
    #[token(";")]
    Semicolon,

    /// `:`
    #[token(":")]
    Colon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `/`
    #[token("/")]
    Slash,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    /// `=`
    #[token("=")]
    Assign,

    /// `==`
    #[token("==")]
    Eq,

    /// `!=`
    #[token("!=")]
    NotEq,

    /// `~`
    #[token("~")]
    Tilde,

    /// `!~`
    #[token("!~")]
    NotTilde,

    /// `<`
    #[token("<")]
    Lt,

    /// `<=`
    #[token("<=")]
    Lte,

    /// `>`
    #[token(">")]
    Gt,

    /// `>=`
    #[token(">=")]
    Gte,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `!`
    #[token("!")]
    Bang,

    /// `&&`
    #[token("&&")]
    AmpAmp,

    /// `||`
    #[token("||")]
    PipePipe,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    /// `acl`
    #[token("acl")]
    KwAcl,

    /// `backend`
    #[token("backend")]
    KwBackend,

    /// `director`
    #[token("director")]
    KwDirector,

    /// `table`
    #[token("table")]
    KwTable,

    /// `sub`
    #[token("sub")]
    KwSub,

    /// `penaltybox`
    #[token("penaltybox")]
    KwPenaltybox,

    /// `ratecounter`
    #[token("ratecounter")]
    KwRatecounter,

    /// `include`
    #[token("include")]
    KwInclude,

    /// `declare`
    #[token("declare")]
    KwDeclare,

    /// `local`
    #[token("local")]
    KwLocal,

    /// `set`
    #[token("set")]
    KwSet,

    /// `add`
    #[token("add")]
    KwAdd,

    /// `unset`
    #[token("unset")]
    KwUnset,

    /// `remove`
    #[token("remove")]
    KwRemove,

    /// `call`
    #[token("call")]
    KwCall,

    /// `error`
    #[token("error")]
    KwError,

    /// `restart`
    #[token("restart")]
    KwRestart,

    /// `return`
    #[token("return")]
    KwReturn,

    /// `esi`
    #[token("esi")]
    KwEsi,

    /// `synthetic`
    #[token("synthetic")]
    KwSynthetic,

    /// `synthetic.base64`
    #[token("synthetic.base64")]
    KwSyntheticBase64,

    /// `log`
    #[token("log")]
    KwLog,

    /// `if`
    #[token("if")]
    KwIf,

    /// `else`
    #[token("else")]
    KwElse,

    /// `elsif`
    #[token("elsif")]
    KwElsif,

    /// `elseif`
    #[token("elseif")]
    KwElseif,

    /// `goto`
    #[token("goto")]
    KwGoto,

    /// `true`
    #[token("true")]
    KwTrue,

    /// `false`
    #[token("false")]
    KwFalse,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// String literal: `"..."` (no escapes; a VCL string cannot contain `"`)
    #[regex(r#""[^"\r\n]*""#, priority = 1)]
    StringLiteral,

    /// Long string literal: `{"..."}`
    #[token("{\"", lex_long_string)]
    LongStringLiteral,

    /// Duration literal: `1s`, `0.5m`, `100ms`
    #[regex(r"[0-9]+(\.[0-9]+)?(ms|s|m|h|d|y)")]
    RtimeLiteral,

    /// Percentage literal: `50%`
    #[regex(r"[0-9]+%")]
    PercentLiteral,

    /// Float literal: `10.5`
    #[regex(r"[0-9]+\.[0-9]+")]
    FloatLiteral,

    /// Integer literal: `10`
    #[regex(r"[0-9]+")]
    IntLiteral,

    // =========================================================================
    // IDENTIFIERS
    // =========================================================================
    /// Identifier, including dotted paths, header names and trailing label
    /// colons: `req.http.User-Agent`, `var.foo`, `done:`
    #[regex(r"[A-Za-z_][A-Za-z0-9_.:-]*")]
    Ident,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    /// Lexing error
    #[default]
    Error,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace or comments).
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }

    /// Returns `true` if this token is a comment.
    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns `true` if this token can begin an expression operand.
    ///
    /// Used by the parser to fold juxtaposed operands into concatenation.
    #[must_use]
    pub fn can_start_operand(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::StringLiteral
                | Self::LongStringLiteral
                | Self::IntLiteral
                | Self::FloatLiteral
                | Self::RtimeLiteral
                | Self::PercentLiteral
                | Self::KwTrue
                | Self::KwFalse
                | Self::KwIf
        )
    }

    /// Human-readable description used in parse errors.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LineComment | Self::BlockComment => "comment",
            Self::Semicolon => "';'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Slash => "'/'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Assign => "'='",
            Self::Eq => "'=='",
            Self::NotEq => "'!='",
            Self::Tilde => "'~'",
            Self::NotTilde => "'!~'",
            Self::Lt => "'<'",
            Self::Lte => "'<='",
            Self::Gt => "'>'",
            Self::Gte => "'>='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Bang => "'!'",
            Self::AmpAmp => "'&&'",
            Self::PipePipe => "'||'",
            Self::KwAcl => "'acl'",
            Self::KwBackend => "'backend'",
            Self::KwDirector => "'director'",
            Self::KwTable => "'table'",
            Self::KwSub => "'sub'",
            Self::KwPenaltybox => "'penaltybox'",
            Self::KwRatecounter => "'ratecounter'",
            Self::KwInclude => "'include'",
            Self::KwDeclare => "'declare'",
            Self::KwLocal => "'local'",
            Self::KwSet => "'set'",
            Self::KwAdd => "'add'",
            Self::KwUnset => "'unset'",
            Self::KwRemove => "'remove'",
            Self::KwCall => "'call'",
            Self::KwError => "'error'",
            Self::KwRestart => "'restart'",
            Self::KwReturn => "'return'",
            Self::KwEsi => "'esi'",
            Self::KwSynthetic => "'synthetic'",
            Self::KwSyntheticBase64 => "'synthetic.base64'",
            Self::KwLog => "'log'",
            Self::KwIf => "'if'",
            Self::KwElse => "'else'",
            Self::KwElsif => "'elsif'",
            Self::KwElseif => "'elseif'",
            Self::KwGoto => "'goto'",
            Self::KwTrue => "'true'",
            Self::KwFalse => "'false'",
            Self::StringLiteral => "string literal",
            Self::LongStringLiteral => "string literal",
            Self::RtimeLiteral => "duration literal",
            Self::PercentLiteral => "percentage literal",
            Self::FloatLiteral => "float literal",
            Self::IntLiteral => "integer literal",
            Self::Ident => "identifier",
            Self::Error => "invalid token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn kinds(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source)
            .map(|k| k.unwrap_or(TokenKind::Error))
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(kinds("acl"), vec![TokenKind::KwAcl]);
        assert_eq!(kinds("acl_list"), vec![TokenKind::Ident]);
        assert_eq!(kinds("table.lookup"), vec![TokenKind::Ident]);
    }

    #[test]
    fn dotted_identifiers_are_single_tokens() {
        assert_eq!(kinds("req.http.User-Agent"), vec![TokenKind::Ident]);
        assert_eq!(
            kinds("beresp.http.Edge-Control:cache-maxage"),
            vec![TokenKind::Ident]
        );
    }

    #[test]
    fn label_keeps_trailing_colon() {
        assert_eq!(kinds("done:"), vec![TokenKind::Ident]);
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(kinds("10"), vec![TokenKind::IntLiteral]);
        assert_eq!(kinds("10.5"), vec![TokenKind::FloatLiteral]);
        assert_eq!(kinds("10s"), vec![TokenKind::RtimeLiteral]);
        assert_eq!(kinds("0.5m"), vec![TokenKind::RtimeLiteral]);
        assert_eq!(kinds("100ms"), vec![TokenKind::RtimeLiteral]);
        assert_eq!(kinds("50%"), vec![TokenKind::PercentLiteral]);
    }

    #[test]
    fn strings_keep_backslashes_verbatim() {
        let mut lexer = TokenKind::lexer(r#""foo\.(bar)""#);
        assert_eq!(lexer.next(), Some(Ok(TokenKind::StringLiteral)));
        assert_eq!(lexer.slice(), r#""foo\.(bar)""#);
    }

    #[test]
    fn long_string() {
        let mut lexer = TokenKind::lexer(r#"{"contains "quotes" inside"}"#);
        assert_eq!(lexer.next(), Some(Ok(TokenKind::LongStringLiteral)));
        assert_eq!(lexer.slice(), r#"{"contains "quotes" inside"}"#);
    }

    #[test]
    fn hash_and_slash_comments_are_trivia() {
        let all: Vec<_> = TokenKind::lexer("#FASTLY recv\n// note\n/* block */")
            .map(|k| k.unwrap_or(TokenKind::Error))
            .collect();
        assert!(all.iter().all(|k| k.is_trivia()));
    }

    #[test]
    fn acl_entry_tokens() {
        assert_eq!(
            kinds(r#"!"192.168.0.1"/32;"#),
            vec![
                TokenKind::Bang,
                TokenKind::StringLiteral,
                TokenKind::Slash,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("== != ~ !~ < <= > >= && || !"),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Tilde,
                TokenKind::NotTilde,
                TokenKind::Lt,
                TokenKind::Lte,
                TokenKind::Gt,
                TokenKind::Gte,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Bang,
            ]
        );
    }
}
