use anyhow::Result;

use super::csv_common::export_to_csv;
use crate::records::Record;
use crate::schema::RecordType;

/// Header of column names (`id` included), then one row per record as given.
/// Dates are ISO strings and nulls are empty.
pub fn render(rtype: RecordType, records: &[Record]) -> Result<String> {
    export_to_csv(records, &rtype.column_names(), Record::cells)
}

/// `clearance_3_2025.csv`, or `clearance_all_all.csv` without a filter.
pub fn filename(rtype: RecordType, month: Option<&str>, year: Option<&str>) -> String {
    let part = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("all")
            .to_string()
    };
    format!("{}_{}_{}.csv", rtype.slug(), part(month), part(year))
}
