//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest free-text input (search query, guess) accepted from clients.
pub const MAX_TEXT_LENGTH: usize = 200;

/// Validates that a catalog identifier can be embedded in a catalog URL path.
///
/// # Examples
///
/// ```ignore
/// validate_catalog_id("4tZwfgrHOc3mvqYlEYSvVi") // Ok
/// validate_catalog_id("")                       // Err - empty
/// validate_catalog_id("../albums")              // Err - path separator
/// ```
pub fn validate_catalog_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("catalog_id_empty");
        err.message = Some("Catalog ID must not be empty".into());
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("catalog_id_format");
        err.message =
            Some("Catalog ID must contain only ASCII letters, digits, '-' or '_'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a free-text field holds something besides whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a free-text field stays within [`MAX_TEXT_LENGTH`] characters.
pub fn validate_text_length(value: &str) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length > MAX_TEXT_LENGTH {
        let mut err = ValidationError::new("text_length");
        err.message = Some(
            format!("Value must be at most {MAX_TEXT_LENGTH} characters (got {length})").into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids() {
        assert!(validate_catalog_id("4tZwfgrHOc3mvqYlEYSvVi").is_ok());
        assert!(validate_catalog_id("daft-punk_01").is_ok());
        assert!(validate_catalog_id("").is_err());
        assert!(validate_catalog_id("   ").is_err());
        assert!(validate_catalog_id("../albums").is_err());
        assert!(validate_catalog_id("a b").is_err());
    }

    #[test]
    fn blank_values() {
        assert!(validate_not_blank("air").is_ok());
        assert!(validate_not_blank(" \t").is_err());
    }

    #[test]
    fn text_length_counts_characters() {
        assert!(validate_text_length(&"é".repeat(MAX_TEXT_LENGTH)).is_ok());
        assert!(validate_text_length(&"a".repeat(MAX_TEXT_LENGTH + 1)).is_err());
    }
}
