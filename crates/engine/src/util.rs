//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub(crate) const MIN_TIER: i32 = 1;
pub(crate) const MAX_TIER: i32 = 5;
const MAX_TITLE_LEN: usize = 80;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidValue(format!("invalid {label} id")))
}

/// Trim a title and check it is non-empty and within length.
pub(crate) fn normalize_title(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidValue(format!(
            "{label} title must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(EngineError::InvalidValue(format!(
            "{label} title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn validate_tier(tier: i32) -> ResultEngine<i32> {
    if !(MIN_TIER..=MAX_TIER).contains(&tier) {
        return Err(EngineError::InvalidValue(format!(
            "tier must be between {MIN_TIER} and {MAX_TIER}, got {tier}"
        )));
    }
    Ok(tier)
}

pub(crate) fn validate_minutes(minutes: i32, label: &str) -> ResultEngine<i32> {
    if minutes <= 0 {
        return Err(EngineError::InvalidValue(format!("{label} must be > 0")));
    }
    Ok(minutes)
}

/// Whether a database error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
