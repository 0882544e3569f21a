use anyhow::Result;
use csv::Writer;

/// Writes a header row, then one row per item.
///
/// ```rust
/// use barangay::export::csv_common::export_to_csv;
///
/// let csv = export_to_csv(vec![(1, "Ana")], &["id", "name"], |(id, name)| {
///     vec![id.to_string(), name.to_string()]
/// })
/// .unwrap();
/// assert_eq!(csv, "id,name\n1,Ana\n");
/// ```
pub fn export_to_csv<T, F>(
    items: impl IntoIterator<Item = T>,
    headers: &[&str],
    row_fn: F,
) -> Result<String>
where
    F: Fn(T) -> Vec<String>,
{
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_record(headers)?;

    for item in items {
        let row = row_fn(item);
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner()?;
    Ok(String::from_utf8(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_empty() {
        let items: Vec<(i32, String)> = vec![];

        let result = export_to_csv(items, &["id", "name"], |(id, name)| vec![id.to_string(), name])
            .expect("Empty CSV export should succeed");

        assert_eq!(result, "id,name\n");
    }

    #[test]
    fn test_fields_are_quoted_when_needed() {
        let result = export_to_csv(
            vec!["Purok 3, Poblacion".to_string()],
            &["address"],
            |address| vec![address],
        )
        .expect("CSV export should succeed");

        assert_eq!(result, "address\n\"Purok 3, Poblacion\"\n");
    }
}
