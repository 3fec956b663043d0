use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::gst::report::aggregate::calculator;
use crate::gst::report::config::{MONTH_COLUMN, RESULT_HEADER_ROWS, RESULT_SHEET, ReportConfig};
use crate::gst::report::error::{Result, ReportError};
use crate::gst::report::headings::resolve_headings;
use crate::gst::report::io::excel_read::InputWorkbook;
use crate::gst::report::io::excel_write;
use crate::gst::report::model::ResultSheet;
use crate::gst::report::month::month_label;

/// Location of the report written for `output_name` inside `output_dir`.
pub fn output_path(output_dir: &Path, output_name: &str) -> PathBuf {
    output_dir.join(format!("{output_name}.xlsx"))
}

/// Builds the result sheet from a sequence of input workbooks.
///
/// Workbooks are pulled one at a time, so a lazily opening iterator keeps at
/// most one of them in memory. The first error ends the run.
pub fn consolidate_workbooks<I>(workbooks: I, config: &ReportConfig) -> Result<ResultSheet>
where
    I: IntoIterator<Item = Result<InputWorkbook>>,
{
    config.validate()?;

    let mut sheet = ResultSheet::new(RESULT_SHEET);
    resolve_headings(&mut sheet, config);

    let mut row = RESULT_HEADER_ROWS + 1;
    for (index, workbook) in workbooks.into_iter().enumerate() {
        let workbook = workbook?;
        append_workbook(&workbook, index + 1, config, &mut sheet, row)?;
        row += 1;
    }

    Ok(sheet)
}

/// Opens and consolidates the workbooks at `inputs`, in the given order.
pub fn consolidate_files(inputs: &[PathBuf], config: &ReportConfig) -> Result<ResultSheet> {
    let sheets = config.required_sheets();
    consolidate_workbooks(
        inputs.iter().map(|path| InputWorkbook::open(path, &sheets)),
        config,
    )
}

/// Consolidates `inputs` and saves the report as `<output_name>.xlsx` in
/// `output_dir`. Nothing is written unless every input was processed.
#[instrument(
    level = "info",
    skip_all,
    fields(inputs = inputs.len(), output_dir = %output_dir.display(), %output_name)
)]
pub fn run(
    inputs: &[PathBuf],
    output_dir: &Path,
    output_name: &str,
    config: &ReportConfig,
) -> Result<PathBuf> {
    if !output_dir.is_dir() {
        return Err(ReportError::MissingOutputDir(output_dir.to_path_buf()));
    }

    let sheet = consolidate_files(inputs, config)?;
    let output = output_path(output_dir, output_name);
    excel_write::write_result(&output, &sheet)?;
    info!(
        rows = sheet.last_row().saturating_sub(RESULT_HEADER_ROWS),
        output = %output.display(),
        "report written"
    );
    Ok(output)
}

#[instrument(
    level = "debug",
    skip(workbook, config, sheet),
    fields(input = %workbook.path().display())
)]
fn append_workbook(
    workbook: &InputWorkbook,
    position: usize,
    config: &ReportConfig,
    sheet: &mut ResultSheet,
    row: u32,
) -> Result<()> {
    let label = month_label(workbook, config, position)?;
    debug!(%label, "month label resolved");
    sheet.set_text(row, MONTH_COLUMN, label);

    for category in &config.categories {
        calculator(workbook, category, sheet, row)?;
    }
    Ok(())
}
