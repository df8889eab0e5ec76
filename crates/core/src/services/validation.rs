//! Shared input checks.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError};
use yatube_common::{AppResult, FieldErrors};

/// Group slugs: ASCII letters, digits, hyphens and underscores.
#[allow(clippy::expect_used)]
pub static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

/// Usernames: word characters plus `.`, `@`, `+` and `-`.
#[allow(clippy::expect_used)]
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

pub const REQUIRED: &str = "This field is required.";

/// Reject empty or whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed(REQUIRED));
        return Err(err);
    }
    Ok(())
}

/// Run derived validation and return the per-field messages.
pub fn field_errors<T: Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => FieldErrors::from(&e),
    }
}

/// Run derived validation, failing with [`yatube_common::AppError::Validation`].
pub fn check<T: Validate>(input: &T) -> AppResult<()> {
    input.validate()?;
    Ok(())
}

/// Treat an empty or blank optional form value as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_pattern() {
        assert!(SLUG_RE.is_match("cats_and-dogs-2"));
        assert!(!SLUG_RE.is_match("cats and dogs"));
        assert!(!SLUG_RE.is_match("котики"));
        assert!(!SLUG_RE.is_match(""));
    }

    #[test]
    fn test_username_pattern() {
        assert!(USERNAME_RE.is_match("leo.tolstoy+1@mail"));
        assert!(!USERNAME_RE.is_match("leo tolstoy"));
        assert!(!USERNAME_RE.is_match("leo/tolstoy"));
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(" g1 ".to_string())), Some("g1".to_string()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }
}
