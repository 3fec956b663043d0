use std::path::Path;

use chrono::NaiveDate;

use crate::gst::report::config::ReportConfig;
use crate::gst::report::error::{Result, ReportError};
use crate::gst::report::io::excel_read::{InputWorkbook, cell_at, cell_to_string};

/// File name without its extension, e.g. `March` for `data/March.xlsx`.
pub fn label_from_file_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// Renders a return period written as `MMYYYY` (leading zero optional) as
/// `Mon-YYYY`, e.g. `052020` becomes `May-2020`.
pub fn format_period(raw: &str) -> Option<String> {
    let digits = raw.trim();
    if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{digits:0>6}");
    let month: u32 = padded[..2].parse().ok()?;
    let year: i32 = padded[2..].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.format("%b-%Y").to_string())
}

/// Determines the label for the output row of `workbook`.
///
/// An explicit label on the workbook wins. Otherwise the file name is used
/// when `filename_as_month` is set, then the configured month cell, and
/// finally the 1-based `position` of the workbook in the run.
pub fn month_label(
    workbook: &InputWorkbook,
    config: &ReportConfig,
    position: usize,
) -> Result<String> {
    if let Some(label) = workbook.label() {
        return Ok(label.to_string());
    }

    if config.filename_as_month {
        return label_from_file_name(workbook.path()).ok_or_else(|| ReportError::InvalidMonth {
            path: workbook.path().to_path_buf(),
            value: workbook.path().display().to_string(),
        });
    }

    let Some(month_cell) = &config.month_cell else {
        return Ok(position.to_string());
    };

    let range = workbook
        .sheet(&month_cell.sheet)
        .ok_or_else(|| ReportError::MissingSheet {
            path: workbook.path().to_path_buf(),
            sheet: month_cell.sheet.clone(),
            context: "the month label".to_string(),
        })?;
    let raw = cell_to_string(cell_at(range, month_cell.row, month_cell.column));
    format_period(&raw).ok_or_else(|| ReportError::InvalidMonth {
        path: workbook.path().to_path_buf(),
        value: raw,
    })
}
