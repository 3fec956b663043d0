use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::gst::report::error::Result;

/// A read-only input workbook reduced to the sheets a run needs.
///
/// Sheets absent from the file are simply not present here; the stage that
/// needs one reports the omission with its own context.
#[derive(Debug, Clone)]
pub struct InputWorkbook {
    path: PathBuf,
    label: Option<String>,
    sheets: BTreeMap<String, Range<DataType>>,
}

impl InputWorkbook {
    /// Opens the workbook at `path` and loads every sheet in `sheet_names`
    /// that the file contains.
    pub fn open(path: &Path, sheet_names: &BTreeSet<&str>) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;

        let mut sheets = BTreeMap::new();
        for name in sheet_names {
            if let Some(range) = workbook.worksheet_range(name) {
                sheets.insert((*name).to_string(), range?);
            }
        }
        debug!(path = %path.display(), sheet_count = sheets.len(), "loaded input workbook");

        Ok(Self {
            path: path.to_path_buf(),
            label: None,
            sheets,
        })
    }

    /// Builds a workbook from already materialised sheets.
    pub fn from_sheets<I, S>(path: impl Into<PathBuf>, sheets: I) -> Self
    where
        I: IntoIterator<Item = (S, Range<DataType>)>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            label: None,
            sheets: sheets
                .into_iter()
                .map(|(name, range)| (name.into(), range))
                .collect(),
        }
    }

    /// Overrides the month label otherwise derived from the configuration.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn sheet(&self, name: &str) -> Option<&Range<DataType>> {
        self.sheets.get(name)
    }
}

/// Cell at a 1-based position, `None` outside the used range or for column 0.
pub fn cell_at(range: &Range<DataType>, row: u32, column: u16) -> Option<&DataType> {
    if row == 0 || column == 0 {
        return None;
    }
    range.get_value((row - 1, u32::from(column) - 1))
}

/// Last 1-based row holding data, 0 for an empty sheet.
pub fn last_row(range: &Range<DataType>) -> u32 {
    range.end().map(|(row, _)| row + 1).unwrap_or(0)
}

pub fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
