//! Storage-side schema rules for confession documents.
//!
//! The API validates text before it ever reaches a store, but the store checks
//! again so that no writer can persist a document outside these bounds.

use crate::confessions::Confession;
use super::StoreError;

pub const TEXT_MIN_CHARS: usize = 5;
pub const TEXT_MAX_CHARS: usize = 500;

/// Trim the text and check its length in characters.
pub fn normalize_text(raw: &str) -> Result<String, StoreError> {
    let text = raw.trim();
    let len = text.chars().count();
    if len < TEXT_MIN_CHARS {
        return Err(StoreError::Validation(format!("Text must be at least {TEXT_MIN_CHARS} characters")));
    }
    if len > TEXT_MAX_CHARS {
        return Err(StoreError::Validation(format!("Text cannot be more than {TEXT_MAX_CHARS} characters")));
    }
    Ok(text.to_string())
}

/// Checks for a full document about to be written over `previous`.
pub fn check_replacement(previous: &Confession, next: &Confession) -> Result<(), StoreError> {
    if previous.owner_id != next.owner_id {
        return Err(StoreError::Validation("ownerId is immutable".into()));
    }
    if previous.created_at != next.created_at {
        return Err(StoreError::Validation("createdAt is immutable".into()));
    }
    if next.updated_at < next.created_at {
        return Err(StoreError::Validation("updatedAt cannot precede createdAt".into()));
    }
    Ok(())
}
