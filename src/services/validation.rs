//! Input checks shared by the services. Every failure is a `ValidationError`
//! naming the offending field by its wire name.

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::to_column_scale;
use crate::error::{ApiError, ApiResult};

/// Largest magnitude `numeric(10, 2)` can hold, exclusive
const NUMERIC_LIMIT: i64 = 100_000_000;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn parse_uuid(field: &str, raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::invalid_field(field, "must be a UUID"))
}

pub fn required_text(field: &str, value: Option<String>) -> ApiResult<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::invalid_field(field, "must be a non-empty string")),
    }
}

/// Decimal strictly greater than zero once rounded to the column scale.
pub fn positive_decimal(field: &str, value: Option<&Value>) -> ApiResult<Decimal> {
    let number = match value {
        Some(Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| ApiError::invalid_field(field, "must be a number"))?
        }
        _ => return Err(ApiError::invalid_field(field, "must be a number")),
    };

    let rounded = to_column_scale(number);
    if rounded <= Decimal::ZERO {
        return Err(ApiError::invalid_field(field, "must be at least 0.01"));
    }
    if rounded >= Decimal::from(NUMERIC_LIMIT) {
        return Err(ApiError::invalid_field(field, "is too large"));
    }
    Ok(rounded)
}

/// Calendar date from `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn date(field: &str, value: Option<&Value>) -> ApiResult<NaiveDate> {
    let text = match value {
        Some(Value::String(s)) => s.trim(),
        _ => return Err(ApiError::invalid_field(field, "must be an ISO 8601 date string")),
    };

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| ApiError::invalid_field(field, "must be an ISO 8601 date string"))
}

/// Like [`date`], but JSON `null` (and absence) mean no date.
pub fn optional_date(field: &str, value: Option<&Value>) -> ApiResult<Option<NaiveDate>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        present => date(field, present).map(Some),
    }
}

pub fn optional_text(field: &str, value: Option<Value>) -> ApiResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ApiError::invalid_field(field, "must be a string")),
    }
}

/// Shape check only; the identity provider has the final word.
pub fn email(field: &str, value: Option<String>) -> ApiResult<String> {
    let value = required_text(field, value)?;
    let valid = value
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.chars().any(char::is_whitespace)
        })
        .unwrap_or(false);

    if valid {
        Ok(value)
    } else {
        Err(ApiError::invalid_field(field, "must be an email"))
    }
}

pub fn password(field: &str, value: Option<String>) -> ApiResult<String> {
    match value {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => Ok(p),
        _ => Err(ApiError::invalid_field(
            field,
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        )),
    }
}

/// Serde helper: keep explicit `null` distinct from an absent field.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Value as serde::Deserialize>::deserialize(deserializer).map(Some)
}
