//! Identifier validation helpers for VCL declarations.

use crate::phase::Phase;

/// Returns true if the name is valid for a top-level declaration.
///
/// Declared names match `[A-Za-z_][A-Za-z0-9_]*`; the dots, dashes and
/// colons that variable paths allow are rejected here.
#[must_use]
pub fn is_valid_declaration_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Returns the phase a reserved Fastly subroutine name is bound to.
#[must_use]
pub fn reserved_subroutine_phase(name: &str) -> Option<Phase> {
    match name {
        "vcl_recv" => Some(Phase::Recv),
        "vcl_hash" => Some(Phase::Hash),
        "vcl_hit" => Some(Phase::Hit),
        "vcl_miss" => Some(Phase::Miss),
        "vcl_pass" => Some(Phase::Pass),
        "vcl_fetch" => Some(Phase::Fetch),
        "vcl_error" => Some(Phase::Error),
        "vcl_deliver" => Some(Phase::Deliver),
        "vcl_log" => Some(Phase::Log),
        _ => None,
    }
}

/// HTTP headers the edge runtime controls. Mutating them is an error.
const PROTECTED_HEADERS: &[&str] = &[
    "proxy-authenticate",
    "proxy-authorization",
    "content-length",
    "content-range",
    "te",
    "trailer",
    "transfer-encoding",
    "expect",
    "upgrade",
    "fastly-ff",
];

/// Returns true if the header name is protected (case-insensitive).
#[must_use]
pub fn is_protected_header(header: &str) -> bool {
    PROTECTED_HEADERS
        .iter()
        .any(|protected| header.eq_ignore_ascii_case(protected))
}

/// Splits a variable path into the header name if it is an HTTP header
/// access: `req.http.Host` -> `Some("Host")`.
///
/// Subfield access (`req.http.Edge-Control:cache-maxage`) returns the full
/// header:subfield tail; callers that need the bare header split on `:`.
#[must_use]
pub fn http_header_name(path: &str) -> Option<&str> {
    let (_, rest) = path.split_once(".http.")?;
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_declaration_names() {
        assert!(is_valid_declaration_name("example"));
        assert!(is_valid_declaration_name("_internal"));
        assert!(is_valid_declaration_name("counter_60"));
        assert!(is_valid_declaration_name("F_origin0"));
    }

    #[test]
    fn test_invalid_declaration_names() {
        assert!(!is_valid_declaration_name(""));
        assert!(!is_valid_declaration_name("invalid-acl-name"));
        assert!(!is_valid_declaration_name("foo.bar"));
        assert!(!is_valid_declaration_name("0day"));
    }

    #[test]
    fn test_reserved_subroutines() {
        assert_eq!(reserved_subroutine_phase("vcl_recv"), Some(Phase::Recv));
        assert_eq!(reserved_subroutine_phase("vcl_log"), Some(Phase::Log));
        assert_eq!(reserved_subroutine_phase("vcl_recl"), None);
        assert_eq!(reserved_subroutine_phase("recv"), None);
    }

    #[test]
    fn test_protected_headers_case_insensitive() {
        assert!(is_protected_header("Content-Length"));
        assert!(is_protected_header("content-length"));
        assert!(is_protected_header("FASTLY-FF"));
        assert!(!is_protected_header("Content-Type"));
    }

    #[test]
    fn test_http_header_name() {
        assert_eq!(http_header_name("req.http.Host"), Some("Host"));
        assert_eq!(
            http_header_name("beresp.http.Edge-Control:cache-maxage"),
            Some("Edge-Control:cache-maxage")
        );
        assert_eq!(http_header_name("req.url"), None);
        assert_eq!(http_header_name("req.http."), None);
    }
}
