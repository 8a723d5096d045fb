//! Field validation shared by all records.
//!
//! # Invariants
//! - Required text fields must be non-blank after trimming.
//! - Length limits count Unicode scalar values, not bytes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length of short names (categories, products, ingredients, markers).
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum length of supplier legacy/brand names.
pub const SUPPLIER_NAME_MAX_CHARS: usize = 200;
/// Maximum length of usernames.
pub const USERNAME_MAX_CHARS: usize = 150;

/// Validation failure for one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    BlankField { field: &'static str },
    /// Text field exceeds its maximum length.
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { field } => write!(f, "{field} must not be blank"),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} must be at most {max_chars} characters, got {actual_chars}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks a required, length-limited text field.
pub fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }

    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_rejects_whitespace_only() {
        let err = require_text("category.name", " \t ", 10).unwrap_err();
        assert_eq!(
            err,
            ValidationError::BlankField {
                field: "category.name"
            }
        );
    }

    #[test]
    fn require_text_counts_chars_not_bytes() {
        // 5 Cyrillic letters are 10 bytes in UTF-8.
        assert!(require_text("marker.name", "Прибы", 5).is_ok());
        let err = require_text("marker.name", "Прибыл", 5).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooLong {
                max_chars: 5,
                actual_chars: 6,
                ..
            }
        ));
    }
}
