//! Declarative schema registry for the managed record types.
//!
//! Every record type owns a static column table. Forms, search predicates,
//! CSV headers, and the table DDL are all derived from it, so adding a column
//! is a one-line change in [`registry`].

pub mod introspect;
pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use introspect::{field_descriptors, options_for, FieldDescriptor, InputKind};

/// Storage kind of a column as declared in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text { max_len: u32 },
    Date,
}

impl ColumnKind {
    pub fn is_date(&self) -> bool {
        matches!(self, ColumnKind::Date)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ColumnKind::Text { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub default: Option<&'static str>,
}

impl ColumnSpec {
    pub const fn primary_key() -> Self {
        Self {
            name: "id",
            kind: ColumnKind::Integer,
            nullable: false,
            default: None,
        }
    }

    pub const fn required_text(name: &'static str, max_len: u32) -> Self {
        Self {
            name,
            kind: ColumnKind::Text { max_len },
            nullable: false,
            default: None,
        }
    }

    pub const fn text(name: &'static str, max_len: u32) -> Self {
        Self {
            name,
            kind: ColumnKind::Text { max_len },
            nullable: true,
            default: None,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Date,
            nullable: true,
            default: None,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
            nullable: true,
            default: None,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.name == "id"
    }

    /// Not nullable and no default value.
    pub fn is_required(&self) -> bool {
        !self.nullable && self.default.is_none()
    }
}

/// The five document types handled by the records office.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    BarangayId,
    Clearance,
    Indigency,
    GoodMoral,
    FirstJobSeeker,
}

impl RecordType {
    pub const ALL: [RecordType; 5] = [
        RecordType::BarangayId,
        RecordType::Clearance,
        RecordType::Indigency,
        RecordType::GoodMoral,
        RecordType::FirstJobSeeker,
    ];

    /// Path segment used in routes and in the `rtype` query parameter.
    pub fn slug(&self) -> &'static str {
        match self {
            RecordType::BarangayId => "barangay_id",
            RecordType::Clearance => "clearance",
            RecordType::Indigency => "indigency",
            RecordType::GoodMoral => "goodmoral",
            RecordType::FirstJobSeeker => "firstjob",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rtype| rtype.slug() == slug)
    }

    pub fn title(&self) -> &'static str {
        match self {
            RecordType::BarangayId => "Barangay ID",
            RecordType::Clearance => "Clearance",
            RecordType::Indigency => "Indigency",
            RecordType::GoodMoral => "Good Moral",
            RecordType::FirstJobSeeker => "First Job Seeker",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            RecordType::BarangayId => "barangay_id",
            RecordType::Clearance => "clearance",
            RecordType::Indigency => "indigency",
            RecordType::GoodMoral => "good_moral",
            RecordType::FirstJobSeeker => "first_job_seeker",
        }
    }

    /// Ordered column table, `id` first.
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            RecordType::BarangayId => registry::BARANGAY_ID,
            RecordType::Clearance => registry::CLEARANCE,
            RecordType::Indigency => registry::INDIGENCY,
            RecordType::GoodMoral => registry::GOOD_MORAL,
            RecordType::FirstJobSeeker => registry::FIRST_JOB_SEEKER,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns().iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|column| column.name).collect()
    }

    pub fn text_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        self.columns().iter().filter(|column| column.kind.is_text())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
