//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

/// Trim and NFC-normalize a required name.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}

/// Category labels are free text; blank means "uncategorized".
pub(crate) fn normalize_category(value: &str) -> String {
    let trimmed: String = value.trim().nfc().collect();
    if trimmed.is_empty() {
        "uncategorized".to_string()
    } else {
        trimmed
    }
}
