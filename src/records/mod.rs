//! Typed record values flowing between forms, the database, and exports.

pub mod coercion;
pub mod query;
pub mod status;

use chrono::NaiveDate;
use indexmap::IndexMap;
use sea_orm::{QueryResult, Value};
use serde::Serialize;

use crate::schema::{ColumnKind, ColumnSpec, RecordType};

pub use coercion::{coerce_form, CoercionPolicy};
pub use query::{Page, PageRequest, RecordFilter, SortOrder, PAGE_SIZE};
pub use status::Status;

/// Fields consulted, in order, when a record needs a human-readable label.
pub const DISPLAY_NAME_FIELDS: [&str; 6] = [
    "name",
    "full_name",
    "username",
    "first_name",
    "resident_name",
    "title",
];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Rendering used by tables, forms, and CSV: ISO dates, empty for null.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::Float(value) => value.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn into_db_value(self, kind: ColumnKind) -> Value {
        match self {
            FieldValue::Null => match kind {
                ColumnKind::Integer => Value::BigInt(None),
                ColumnKind::Float => Value::Double(None),
                ColumnKind::Text { .. } => Value::String(None),
                ColumnKind::Date => Value::from(None::<NaiveDate>),
            },
            FieldValue::Integer(value) => value.into(),
            FieldValue::Float(value) => value.into(),
            FieldValue::Text(text) => text.into(),
            FieldValue::Date(date) => date.into(),
        }
    }

    /// Reads one column of a dynamic row. Values that do not decode as the
    /// declared kind (lenient coercion leftovers) come back as text.
    pub fn read(row: &QueryResult, column: &ColumnSpec) -> Self {
        let name = column.name;
        let typed = match column.kind {
            ColumnKind::Integer => row
                .try_get::<Option<i64>>("", name)
                .map(|value| value.map(FieldValue::Integer)),
            ColumnKind::Float => row
                .try_get::<Option<f64>>("", name)
                .map(|value| value.map(FieldValue::Float)),
            ColumnKind::Date => row
                .try_get::<Option<NaiveDate>>("", name)
                .map(|value| value.map(FieldValue::Date)),
            ColumnKind::Text { .. } => row
                .try_get::<Option<String>>("", name)
                .map(|value| value.map(FieldValue::Text)),
        };

        match typed {
            Ok(value) => value.unwrap_or(FieldValue::Null),
            Err(_) => row
                .try_get::<Option<String>>("", name)
                .ok()
                .flatten()
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Null),
        }
    }
}

/// A row of one of the managed record types.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub record_type: RecordType,
    pub id: i32,
    pub values: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn from_row(record_type: RecordType, row: &QueryResult) -> Result<Self, sea_orm::DbErr> {
        let id: i32 = row.try_get("", "id")?;
        let values = record_type
            .columns()
            .iter()
            .filter(|column| !column.is_primary_key())
            .map(|column| (column.name.to_string(), FieldValue::read(row, column)))
            .collect();

        Ok(Self {
            record_type,
            id,
            values,
        })
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.get(field).and_then(FieldValue::as_date)
    }

    /// Value of a column by name, `id` included, rendered for display.
    pub fn display_value(&self, field: &str) -> String {
        if field == "id" {
            return self.id.to_string();
        }
        self.get(field).map(FieldValue::display).unwrap_or_default()
    }

    /// Cells in registry column order, `id` first.
    pub fn cells(&self) -> Vec<String> {
        self.record_type
            .columns()
            .iter()
            .map(|column| self.display_value(column.name))
            .collect()
    }

    pub fn display_name(&self) -> String {
        resolve_display_name(
            |field| self.get(field).filter(|v| !v.is_null()).map(FieldValue::display),
            Some(i64::from(self.id)),
            || format!("{} record", self.record_type.title()),
        )
    }

    /// `"12 - Juan Dela Cruz"`; stored on audit entries so they stay
    /// readable after the row is deleted.
    pub fn snapshot_label(&self) -> String {
        format!("{} - {}", self.id, self.display_name())
    }

    /// Recomputes the derived status in place. No-op for types without a
    /// `status` column or rows without an issue date.
    pub fn refresh_status(&mut self, today: NaiveDate) {
        if !self.record_type.has_column("status") {
            return;
        }
        if let Some(issued) = self.date("date_issued") {
            let derived = status::derive_status(issued, self.text("purpose"), today);
            self.values
                .insert("status".to_string(), FieldValue::Text(derived.to_string()));
        }
    }
}

/// Resolves a label using [`DISPLAY_NAME_FIELDS`], then the numeric id, then
/// the fallback conversion.
pub fn resolve_display_name<L, F>(lookup: L, id: Option<i64>, fallback: F) -> String
where
    L: Fn(&str) -> Option<String>,
    F: FnOnce() -> String,
{
    DISPLAY_NAME_FIELDS
        .iter()
        .find_map(|field| lookup(field).filter(|value| !value.trim().is_empty()))
        .or_else(|| id.map(|id| id.to_string()))
        .unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[(&str, FieldValue)]) -> Record {
        Record {
            record_type: RecordType::Indigency,
            id: 12,
            values: values
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    #[test]
    fn snapshot_uses_name_first() {
        let record = record(&[("name", FieldValue::Text("Juan Dela Cruz".into()))]);
        assert_eq!(record.snapshot_label(), "12 - Juan Dela Cruz");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let record = record(&[("name", FieldValue::Null)]);
        assert_eq!(record.display_name(), "12");
    }

    #[test]
    fn resolution_order_is_respected() {
        let lookup = |field: &str| match field {
            "username" => Some("captain".to_string()),
            "title" => Some("Kapitan".to_string()),
            _ => None,
        };
        assert_eq!(resolve_display_name(lookup, Some(3), String::new), "captain");
        assert_eq!(
            resolve_display_name(|_| None, None, || "user record".to_string()),
            "user record"
        );
    }

    #[test]
    fn dates_render_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(FieldValue::Date(date).display(), "2024-03-09");
        assert_eq!(FieldValue::Null.display(), "");
    }

    #[test]
    fn refresh_status_skips_types_without_status() {
        let mut record = Record {
            record_type: RecordType::FirstJobSeeker,
            id: 1,
            values: IndexMap::new(),
        };
        record.values.insert(
            "date_issued".into(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
        );
        record.refresh_status(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(record.get("status").is_none());
    }
}
