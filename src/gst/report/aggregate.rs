//! Row selection and column summing for a single category.
//!
//! Source positions are 1-based, as spreadsheet users count them. Sums are
//! accumulated as [`Decimal`] so that thousands of two-decimal amounts add up
//! to exactly the figure a ledger would show.

use std::str::FromStr;

use calamine::{DataType, Range};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, instrument};

use crate::gst::report::config::{Category, CheckMap, ColumnMap};
use crate::gst::report::error::{Result, ReportError};
use crate::gst::report::io::excel_read::{InputWorkbook, cell_at, cell_to_string, last_row};
use crate::gst::report::model::ResultSheet;

/// Column-wise sums of the rows that satisfied a category's checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotals {
    /// One sum per [`ColumnMap`] entry, in map order.
    pub sums: Vec<Decimal>,
    pub matched_rows: usize,
}

/// Why a summed cell could not be added to its column total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountFault {
    /// The cell content is not a number.
    NonNumeric { row: u32, column: u16, value: String },
    /// Adding the cell pushed the column total past what [`Decimal`] holds.
    Overflow { row: u32, column: u16 },
}

/// Whether the 1-based `row` holds every value `checks` requires.
pub fn row_matches(range: &Range<DataType>, row: u32, checks: &CheckMap) -> bool {
    checks
        .iter()
        .all(|(column, expected)| cell_to_string(cell_at(range, row, column)) == expected)
}

/// Numeric value of a summed cell. Blank cells count as zero and numeric
/// text is parsed; anything else is rejected.
pub fn cell_amount(cell: Option<&DataType>) -> std::result::Result<Decimal, String> {
    match cell {
        Some(DataType::Empty) | None => Ok(Decimal::ZERO),
        Some(DataType::Int(value)) => Ok(Decimal::from(*value)),
        Some(DataType::Float(value)) => {
            Decimal::from_f64(*value).ok_or_else(|| value.to_string())
        }
        Some(DataType::String(value)) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(Decimal::ZERO);
            }
            Decimal::from_str(trimmed).map_err(|_| value.clone())
        }
        Some(other) => Err(other.to_string()),
    }
}

/// Sums the mapped columns over every data row below `header_rows` that
/// satisfies `checks`.
pub fn sum_matching_rows(
    range: &Range<DataType>,
    header_rows: u32,
    columns: &ColumnMap,
    checks: &CheckMap,
) -> std::result::Result<CategoryTotals, AmountFault> {
    let mut sums = vec![Decimal::ZERO; columns.len()];
    let mut matched_rows = 0;

    for row in header_rows.saturating_add(1)..=last_row(range) {
        if !row_matches(range, row, checks) {
            continue;
        }
        matched_rows += 1;
        for (sum, (column, _label)) in sums.iter_mut().zip(columns.iter()) {
            let cell = cell_at(range, row, column);
            let amount = cell_amount(cell)
                .map_err(|value| AmountFault::NonNumeric { row, column, value })?;
            *sum = sum
                .checked_add(amount)
                .ok_or(AmountFault::Overflow { row, column })?;
        }
    }

    Ok(CategoryTotals { sums, matched_rows })
}

/// Totals one category for one input workbook and writes them into
/// `target_row` of the result sheet, starting at the category's start column.
///
/// Only the category's own output columns are written. A missing sheet, a
/// non-numeric summed cell or a column total that overflows fails the call.
#[instrument(
    level = "debug",
    skip_all,
    fields(input = %workbook.path().display(), category = %category.heading, row = target_row)
)]
pub fn calculator(
    workbook: &InputWorkbook,
    category: &Category,
    output: &mut ResultSheet,
    target_row: u32,
) -> Result<()> {
    let range = workbook
        .sheet(&category.sheet)
        .ok_or_else(|| ReportError::MissingSheet {
            path: workbook.path().to_path_buf(),
            sheet: category.sheet.clone(),
            context: format!("category '{}'", category.heading),
        })?;

    let totals = sum_matching_rows(
        range,
        category.header_rows,
        &category.columns,
        &category.checks,
    )
    .map_err(|fault| match fault {
        AmountFault::NonNumeric { row, column, value } => ReportError::NonNumericCell {
            path: workbook.path().to_path_buf(),
            sheet: category.sheet.clone(),
            category: category.heading.clone(),
            row,
            column,
            value,
        },
        AmountFault::Overflow { row, column } => ReportError::AmountOverflow {
            path: workbook.path().to_path_buf(),
            sheet: category.sheet.clone(),
            category: category.heading.clone(),
            row,
            column,
        },
    })?;
    debug!(matched_rows = totals.matched_rows, "category totalled");

    for (column, sum) in category.output_columns().zip(totals.sums) {
        output.set_number(target_row, column, sum);
    }
    Ok(())
}
