use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::gst::report::error::{Result, ReportError};

/// Name of the single sheet written to the consolidated workbook.
pub const RESULT_SHEET: &str = "Result";
/// Number of header rows above the first data row of the result sheet.
pub const RESULT_HEADER_ROWS: u32 = 2;
/// Column holding the month label of every output row.
pub const MONTH_COLUMN: u16 = 1;
/// Highest column index Excel accepts.
pub const EXCEL_MAX_COLUMNS: u32 = 16_384;

/// Ordered mapping from a 1-based source column to the label of the output
/// column it is summed into. Iteration follows ascending source column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMap(BTreeMap<u16, String>);

impl ColumnMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Yields `(source_column, label)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.0.iter().map(|(column, label)| (*column, label.as_str()))
    }

    pub fn source_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.keys().copied()
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, label)| (column, label.into()))
                .collect(),
        )
    }
}

/// Row-qualification predicate: every 1-based source column listed must hold
/// exactly the given text. An empty map accepts every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckMap(BTreeMap<u16, String>);

impl CheckMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.0.iter().map(|(column, value)| (*column, value.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for CheckMap {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, value)| (column, value.into()))
                .collect(),
        )
    }
}

/// One tax-line classification and the output block it fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Group label written above the block in the first header row.
    pub heading: String,
    /// Sheet scanned in every input workbook.
    pub sheet: String,
    /// Rows at the top of `sheet` that precede the data.
    #[serde(default = "default_header_rows")]
    pub header_rows: u32,
    /// First (1-based) output column of the block.
    pub start_column: u16,
    pub columns: ColumnMap,
    #[serde(default)]
    pub checks: CheckMap,
}

impl Category {
    pub fn new(
        heading: impl Into<String>,
        sheet: impl Into<String>,
        header_rows: u32,
        start_column: u16,
        columns: ColumnMap,
        checks: CheckMap,
    ) -> Self {
        Self {
            heading: heading.into(),
            sheet: sheet.into(),
            header_rows,
            start_column,
            columns,
            checks,
        }
    }

    /// Last (1-based) output column of the block.
    pub fn end_column(&self) -> u16 {
        let width = u16::try_from(self.columns.len()).unwrap_or(u16::MAX);
        self.start_column.saturating_add(width.saturating_sub(1))
    }

    /// Output columns owned exclusively by this category.
    pub fn output_columns(&self) -> RangeInclusive<u16> {
        self.start_column..=self.end_column()
    }
}

/// Cell holding the return period when month labels are not taken from file
/// names. Row and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCell {
    pub sheet: String,
    pub row: u32,
    pub column: u16,
}

/// Static configuration for a consolidation run. Built once at startup and
/// passed by reference to every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Label each output row with the input file name (extension stripped).
    #[serde(default)]
    pub filename_as_month: bool,
    /// Width of every category block.
    #[serde(default = "default_column_count")]
    pub column_count: usize,
    /// Header written above the month column.
    #[serde(default = "default_month_heading")]
    pub month_heading: String,
    /// Second-row labels repeated under each category block.
    #[serde(default = "default_sub_labels")]
    pub sub_labels: Vec<String>,
    /// Where to read the period from when `filename_as_month` is off.
    #[serde(default = "default_month_cell")]
    pub month_cell: Option<MonthCell>,
    pub categories: Vec<Category>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let b2b_columns = || -> ColumnMap {
            [
                (10_u16, "B2B Taxable values"),
                (11, "B2B Integrated tax"),
                (12, "B2B Central tax"),
                (13, "B2B State tax"),
                (14, "B2B Cess"),
            ]
            .into_iter()
            .collect()
        };
        let cdnr_columns = |kind: &str| -> ColumnMap {
            [
                (11_u16, "Taxable values"),
                (12, "Integrated tax"),
                (13, "Central tax"),
                (14, "State tax"),
                (15, "Cess"),
            ]
            .into_iter()
            .map(|(column, label)| (column, format!("CDNR {kind} {label}")))
            .collect()
        };

        Self {
            filename_as_month: false,
            column_count: default_column_count(),
            month_heading: default_month_heading(),
            sub_labels: default_sub_labels(),
            month_cell: default_month_cell(),
            categories: vec![
                Category::new(
                    "B2B",
                    "B2B",
                    DEFAULT_HEADER_ROWS,
                    2,
                    b2b_columns(),
                    [(9_u16, "-")].into_iter().collect(),
                ),
                Category::new(
                    "B2B (supply Y)",
                    "B2B",
                    DEFAULT_HEADER_ROWS,
                    7,
                    b2b_columns(),
                    [(8_u16, "Y"), (9, "-")].into_iter().collect(),
                ),
                Category::new(
                    "CDNR Debit",
                    "CDNR",
                    DEFAULT_HEADER_ROWS,
                    12,
                    cdnr_columns("Debit"),
                    [(3_u16, "Debit note"), (10, "-")].into_iter().collect(),
                ),
                Category::new(
                    "CDNR Credit",
                    "CDNR",
                    DEFAULT_HEADER_ROWS,
                    17,
                    cdnr_columns("Credit"),
                    [(3_u16, "Credit note"), (10, "-")].into_iter().collect(),
                ),
            ],
        }
    }
}

/// Title and two-tier column header rows above the data in GSTR-2B sheets.
pub const DEFAULT_HEADER_ROWS: u32 = 6;

fn default_header_rows() -> u32 {
    DEFAULT_HEADER_ROWS
}

fn default_column_count() -> usize {
    5
}

fn default_month_heading() -> String {
    "Month".to_string()
}

fn default_sub_labels() -> Vec<String> {
    ["Value", "IGST", "CGST", "SGST", "Cess"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_month_cell() -> Option<MonthCell> {
    Some(MonthCell {
        sheet: "Read me".to_string(),
        row: 2,
        column: 5,
    })
}

impl ReportConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sheets every input workbook must provide for this configuration.
    pub fn required_sheets(&self) -> BTreeSet<&str> {
        let mut sheets: BTreeSet<&str> = self
            .categories
            .iter()
            .map(|category| category.sheet.as_str())
            .collect();
        if let Some(cell) = self.month_cell.as_ref().filter(|_| !self.filename_as_month) {
            sheets.insert(cell.sheet.as_str());
        }
        sheets
    }

    /// Checks the configuration for mistakes that would otherwise surface
    /// halfway through a run.
    pub fn validate(&self) -> Result<()> {
        if self.column_count == 0 {
            return invalid("column_count must be at least 1".to_string());
        }
        if self.sub_labels.len() != self.column_count {
            return invalid(format!(
                "expected {} sub-labels, found {}",
                self.column_count,
                self.sub_labels.len()
            ));
        }
        if self.categories.is_empty() {
            return invalid("at least one category is required".to_string());
        }
        if let Some(cell) = &self.month_cell {
            if cell.sheet.trim().is_empty() || cell.row == 0 || cell.column == 0 {
                return invalid(format!(
                    "month cell {}!R{}C{} is not a valid 1-based position",
                    cell.sheet, cell.row, cell.column
                ));
            }
        }

        for category in &self.categories {
            validate_category(category, self.column_count)?;
        }

        let mut blocks: Vec<&Category> = self.categories.iter().collect();
        blocks.sort_by_key(|category| category.start_column);
        for pair in blocks.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if left.end_column() >= right.start_column {
                return invalid(format!(
                    "output columns of '{}' ({}..={}) overlap '{}' ({}..={})",
                    left.heading,
                    left.start_column,
                    left.end_column(),
                    right.heading,
                    right.start_column,
                    right.end_column()
                ));
            }
        }

        Ok(())
    }
}

fn validate_category(category: &Category, column_count: usize) -> Result<()> {
    let name = &category.heading;
    if name.trim().is_empty() {
        return invalid("category heading must not be empty".to_string());
    }
    if category.sheet.trim().is_empty() {
        return invalid(format!("category '{name}' has no sheet name"));
    }
    if category.columns.len() != column_count {
        return invalid(format!(
            "category '{name}' maps {} columns, expected {column_count}",
            category.columns.len()
        ));
    }
    if category.columns.source_columns().any(|column| column == 0) {
        return invalid(format!("category '{name}' sums column 0; columns are 1-based"));
    }
    if category.checks.iter().any(|(column, _)| column == 0) {
        return invalid(format!("category '{name}' checks column 0; columns are 1-based"));
    }
    if category.start_column < 2 {
        return invalid(format!(
            "category '{name}' starts at column {}, which overlaps the month column",
            category.start_column
        ));
    }
    let end = u32::from(category.start_column) + column_count as u32 - 1;
    if end > EXCEL_MAX_COLUMNS {
        return invalid(format!(
            "category '{name}' ends at column {end}, beyond the last Excel column"
        ));
    }
    Ok(())
}

fn invalid(message: String) -> Result<()> {
    Err(ReportError::InvalidConfig(message))
}
