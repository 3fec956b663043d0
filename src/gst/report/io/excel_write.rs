use std::collections::BTreeSet;
use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use tracing::debug;

use crate::gst::report::config::RESULT_HEADER_ROWS;
use crate::gst::report::error::Result;
use crate::gst::report::model::{Cell, ResultSheet};

const COLUMN_WIDTH: f64 = 12.0;
const AMOUNT_FORMAT: &str = "0.00";

/// Writes the consolidated sheet to `path` as a single-sheet workbook.
pub fn write_result(path: &Path, sheet: &ResultSheet) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    let heading_format = Format::new().set_bold().set_align(FormatAlign::Center);
    let label_format = Format::new().set_bold();
    let amount_format = Format::new().set_num_format(AMOUNT_FORMAT);

    let mut merged_cells = BTreeSet::new();
    for range in sheet.merges() {
        let text = sheet.text(range.row, range.first_column).unwrap_or_default();
        worksheet.merge_range(
            range.row - 1,
            range.first_column - 1,
            range.row - 1,
            range.last_column - 1,
            text,
            &heading_format,
        )?;
        merged_cells.extend(
            (range.first_column..=range.last_column).map(|column| (range.row, column)),
        );
    }

    for ((row, column), cell) in sheet.cells() {
        if merged_cells.contains(&(row, column)) {
            continue;
        }
        let (row_idx, col_idx) = (row - 1, column - 1);
        match cell {
            Cell::Text(value) if row <= RESULT_HEADER_ROWS => {
                worksheet.write_string_with_format(
                    row_idx,
                    col_idx,
                    value.as_str(),
                    &label_format,
                )?;
            }
            Cell::Text(value) => {
                worksheet.write_string(row_idx, col_idx, value.as_str())?;
            }
            Cell::Number(value) => {
                let number = value.to_f64().unwrap_or_default();
                worksheet.write_number_with_format(row_idx, col_idx, number, &amount_format)?;
            }
        }
    }

    for col_idx in 0..sheet.last_column() {
        worksheet.set_column_width(col_idx, COLUMN_WIDTH)?;
    }

    workbook_writer.save(path)?;
    debug!(path = %path.display(), rows = sheet.last_row(), "result workbook saved");
    Ok(())
}
