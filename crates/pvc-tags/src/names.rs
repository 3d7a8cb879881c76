//! Label validation.
//!
//! Valid labels:
//! - Must be non-empty and at most [`MAX_LABEL_LEN`] characters
//! - Must not contain whitespace or control characters
//! - If the label starts like a version (`v` followed by a digit) it must be
//!   a complete `vMAJOR.MINOR.PATCH` label

use pvc_types::Version;

use crate::error::{Result, TagError};

/// Longest accepted label, in characters.
pub const MAX_LABEL_LEN: usize = 64;

/// Validate label text, returning `Ok(())` if it may be stored.
///
/// # Examples
///
/// ```
/// use pvc_tags::names::validate_label;
///
/// assert!(validate_label("PROD").is_ok());
/// assert!(validate_label("v1.2.3").is_ok());
/// assert!(validate_label("needs review").is_err());
/// assert!(validate_label("v1.2").is_err());
/// ```
pub fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(invalid(label, "label must not be empty"));
    }

    if label.chars().count() > MAX_LABEL_LEN {
        return Err(invalid(
            label,
            &format!("label must be at most {MAX_LABEL_LEN} characters"),
        ));
    }

    if let Some(ch) = label
        .chars()
        .find(|c| c.is_whitespace() || c.is_control())
    {
        return Err(invalid(
            label,
            &format!("contains forbidden character: {ch:?}"),
        ));
    }

    if Version::looks_like(label) && Version::parse(label).is_none() {
        return Err(invalid(label, "malformed version label, expected vMAJOR.MINOR.PATCH"));
    }

    Ok(())
}

fn invalid(label: &str, reason: &str) -> TagError {
    TagError::InvalidLabel {
        label: label.to_string(),
        reason: reason.to_string(),
    }
}
