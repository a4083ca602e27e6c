//! Utility functions for parent-domain validation and token handling.

use crate::error::ExtractError;

/// Wildcard marker used in certificate names.
pub const WILDCARD_PREFIX: &str = "*.";

/// Validate a parent domain and return it trimmed.
///
/// Only rejects input that can never produce a match: an empty string, or one
/// containing whitespace (tokens are whitespace-delimited, so such a value
/// would never appear inside a token).
///
/// # Returns
///
/// The trimmed domain, or `ExtractError::InvalidInput`.
pub fn validate_parent_domain(domain: &str) -> Result<&str, ExtractError> {
    let trimmed = domain.trim();

    if trimmed.is_empty() {
        return Err(ExtractError::invalid_input(
            domain,
            "Parent domain cannot be empty",
        ));
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(ExtractError::invalid_input(
            domain,
            "Parent domain cannot contain whitespace",
        ));
    }

    Ok(trimmed)
}

/// Strip one leading `*.` from a certificate name.
pub fn strip_wildcard(token: &str) -> &str {
    token.strip_prefix(WILDCARD_PREFIX).unwrap_or(token)
}

/// Whether a token should be kept for the given parent domain.
///
/// Literal, case-sensitive substring match. "notexample.com" passes for
/// "example.com"; "WWW.EXAMPLE.COM" does not.
pub fn matches_parent(token: &str, parent_domain: &str) -> bool {
    token.contains(parent_domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_parent_domain() {
        assert_eq!(validate_parent_domain("example.com").unwrap(), "example.com");
        assert_eq!(
            validate_parent_domain("  example.com\n").unwrap(),
            "example.com"
        );
        assert!(validate_parent_domain("").is_err());
        assert!(validate_parent_domain("   ").is_err());
        assert!(validate_parent_domain("example .com").is_err());
    }

    #[test]
    fn test_validate_reports_invalid_input() {
        let err = validate_parent_domain("").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidInput { .. }));
    }

    #[test]
    fn test_strip_wildcard() {
        assert_eq!(strip_wildcard("*.example.com"), "example.com");
        assert_eq!(strip_wildcard("www.example.com"), "www.example.com");
        // Only the leading marker goes
        assert_eq!(strip_wildcard("*.*.example.com"), "*.example.com");
        assert_eq!(strip_wildcard("a.*.example.com"), "a.*.example.com");
    }

    #[test]
    fn test_matches_parent_is_literal_substring() {
        assert!(matches_parent("www.example.com", "example.com"));
        assert!(matches_parent("example.com.evil.org", "example.com"));
        assert!(!matches_parent("WWW.EXAMPLE.COM", "example.com"));
        assert!(!matches_parent("unrelated.org", "example.com"));
    }
}
