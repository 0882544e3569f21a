use rust_xlsxwriter::*;

use crate::database::entities::activity_log;
use crate::errors::{CoreError, CoreResult};

pub const FILENAME: &str = "activity_logs.xlsx";
const HEADERS: [&str; 6] = ["ID", "User", "Action", "Table", "Record", "Timestamp"];

/// Single-sheet workbook of the given entries, in the order given.
pub fn render(entries: &[activity_log::Model]) -> CoreResult<Vec<u8>> {
    build_workbook(entries).map_err(|err| {
        CoreError::internal(format!("Failed to build activity log workbook: {}", err))
    })
}

fn build_workbook(entries: &[activity_log::Model]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Activity Log")?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, entry) in entries.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_number(row, 0, entry.id as f64)?;
        worksheet.write_string(row, 1, &entry.user)?;
        worksheet.write_string(row, 2, &entry.action)?;
        worksheet.write_string(row, 3, &entry.table_name)?;
        worksheet.write_string(row, 4, entry.record_id.as_deref().unwrap_or(""))?;
        worksheet.write_string(
            row,
            5,
            &entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        )?;
    }

    worksheet.set_column_width(4, 40)?;
    worksheet.set_column_width(5, 20)?;

    workbook.save_to_buffer()
}
