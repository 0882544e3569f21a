use serde::Serialize;

use super::{ColumnSpec, RecordType};

const GENDER_OPTIONS: &[&str] = &["Male", "Female"];
const CIVIL_STATUS_OPTIONS: &[&str] = &["Single", "Married", "Widowed", "Separated", "Divorced"];
const RESIDENCY_OPTIONS: &[&str] = &[
    "Less than 1 year",
    "1-5 years",
    "6-10 years",
    "More than 10 years",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Date,
    Number,
    Select,
}

/// Form field derived from a registry column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: String,
    pub input_kind: InputKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub options: Vec<&'static str>,
}

/// Fixed option sets keyed by field name. These override the inferred kind.
pub fn options_for(field: &str) -> Option<&'static [&'static str]> {
    match field {
        "gender" => Some(GENDER_OPTIONS),
        "civil_status" => Some(CIVIL_STATUS_OPTIONS),
        "years_of_residency" | "length_of_residency" => Some(RESIDENCY_OPTIONS),
        _ => None,
    }
}

pub fn field_descriptors(rtype: RecordType) -> Vec<FieldDescriptor> {
    rtype
        .columns()
        .iter()
        .filter(|column| !column.is_primary_key())
        .map(describe)
        .collect()
}

fn describe(column: &ColumnSpec) -> FieldDescriptor {
    let (input_kind, options) = match options_for(column.name) {
        Some(options) => (InputKind::Select, options.to_vec()),
        None if column.kind.is_date() => (InputKind::Date, Vec::new()),
        None if column.kind.is_numeric() => (InputKind::Number, Vec::new()),
        None => (InputKind::Text, Vec::new()),
    };

    FieldDescriptor {
        name: column.name,
        label: humanize(column.name),
        input_kind,
        required: column.is_required(),
        default: column.default,
        options,
    }
}

/// `date_of_birth` -> `Date Of Birth`
pub fn humanize(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
