use crate::error::{AppError, AppResult};
use crate::storage::schema::{TEXT_MAX_CHARS, TEXT_MIN_CHARS};

/// API-boundary text check: trim, then require 5..=500 characters.
/// `None` covers a missing field or an unreadable body.
pub fn validate_text(raw: Option<&str>) -> AppResult<String> {
    let Some(raw) = raw else {
        return Err(AppError::invalid("invalid_input", "Confession text is required"));
    };
    let text = raw.trim();
    let len = text.chars().count();
    if len == 0 {
        return Err(AppError::invalid("invalid_input", "Confession text is required"));
    }
    if len < TEXT_MIN_CHARS {
        return Err(AppError::invalid(
            "invalid_input".to_string(),
            format!("Text must be at least {TEXT_MIN_CHARS} non-space characters"),
        ));
    }
    if len > TEXT_MAX_CHARS {
        return Err(AppError::invalid(
            "invalid_input".to_string(),
            format!("Text cannot be more than {TEXT_MAX_CHARS} characters"),
        ));
    }
    Ok(text.to_string())
}
