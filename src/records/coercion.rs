use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Deserialize;

use super::{FieldValue, Status};
use crate::errors::{CoreError, CoreResult};
use crate::schema::{ColumnKind, ColumnSpec, RecordType};

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// What happens when a date or numeric field fails to parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Dates fall back to null, numbers keep the raw string.
    #[default]
    Lenient,
    /// The submission is rejected, naming the field.
    Strict,
}

/// Converts raw form data into typed values for every non-`id` column.
///
/// Missing and blank inputs become null and text is trimmed. A blank
/// `status` defaults to `Valid` on types that carry one.
pub fn coerce_form(
    rtype: RecordType,
    form: &HashMap<String, String>,
    policy: CoercionPolicy,
) -> CoreResult<IndexMap<String, FieldValue>> {
    let mut values = IndexMap::new();

    for column in rtype.columns().iter().filter(|c| !c.is_primary_key()) {
        let raw = form.get(column.name).map(String::as_str).unwrap_or("");
        let value = coerce_value(column, raw, policy)?;
        values.insert(column.name.to_string(), value);
    }

    if let Some(status) = values.get_mut("status") {
        if status.is_null() {
            *status = FieldValue::Text(Status::Valid.to_string());
        }
    }

    Ok(values)
}

pub fn coerce_value(column: &ColumnSpec, raw: &str, policy: CoercionPolicy) -> CoreResult<FieldValue> {
    if raw.trim().is_empty() {
        return Ok(FieldValue::Null);
    }

    match column.kind {
        ColumnKind::Date => match parse_date(raw) {
            Some(date) => Ok(FieldValue::Date(date)),
            None => match policy {
                CoercionPolicy::Lenient => Ok(FieldValue::Null),
                CoercionPolicy::Strict => Err(rejection(column, "is not a valid date")),
            },
        },
        ColumnKind::Integer => match raw.trim().parse::<i64>() {
            Ok(value) => Ok(FieldValue::Integer(value)),
            Err(_) => numeric_fallback(column, raw, policy),
        },
        ColumnKind::Float => match raw.trim().parse::<f64>() {
            Ok(value) => Ok(FieldValue::Float(value)),
            Err(_) => numeric_fallback(column, raw, policy),
        },
        ColumnKind::Text { .. } => Ok(FieldValue::Text(raw.trim().to_string())),
    }
}

/// `YYYY-MM-DD` first, then common date-time shapes truncated to the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.date_naive());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|date_time| date_time.date())
}

fn numeric_fallback(column: &ColumnSpec, raw: &str, policy: CoercionPolicy) -> CoreResult<FieldValue> {
    match policy {
        CoercionPolicy::Lenient => Ok(FieldValue::Text(raw.to_string())),
        CoercionPolicy::Strict => Err(rejection(column, "must be a number")),
    }
}

fn rejection(column: &ColumnSpec, reason: &str) -> CoreError {
    CoreError::invalid_field(
        column.name,
        format!("{} {}", crate::schema::introspect::humanize(column.name), reason),
    )
}
