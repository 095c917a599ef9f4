//! Input validation primitives.
//!
//! Artifact identifiers double as file names and URL path segments, so they
//! are checked once at the edge instead of inside every store.

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None))
    } else {
        Ok(trimmed)
    }
}

/// Require an artifact identifier that is safe to use as a single path segment.
pub fn require_identifier<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let id = require_non_empty(value, field, "Identifier cannot be empty")?;

    if id == "." || id == ".." || id.contains(['/', '\\']) || id.chars().any(char::is_whitespace) {
        return Err(Error::validation_invalid_argument(
            field,
            "Identifier must be a single name without path separators or whitespace",
            Some(id.to_string()),
        ));
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_non_empty_trims_whitespace() {
        let result = require_non_empty("  hello  ", "field", "msg");
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn require_non_empty_fails_for_whitespace_only() {
        let result = require_non_empty("   ", "field", "Cannot be empty");
        assert!(result.is_err());
    }

    #[test]
    fn require_identifier_accepts_saved_search_names() {
        assert_eq!(
            require_identifier("prod_dashboard_name", "dashboard").unwrap(),
            "prod_dashboard_name"
        );
        assert_eq!(require_identifier("a-b_1", "dashboard").unwrap(), "a-b_1");
    }

    #[test]
    fn require_identifier_rejects_paths() {
        for bad in ["../etc/passwd", "a/b", "a\\b", "..", "two words", ""] {
            let err = require_identifier(bad, "dashboard").unwrap_err();
            assert_eq!(err.code.as_str(), "validation.invalid_argument", "{}", bad);
        }
    }
}
