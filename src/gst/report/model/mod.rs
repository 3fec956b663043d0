use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

/// Content of one output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Header label or month label.
    Text(String),
    /// Category sum.
    Number(Decimal),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            Cell::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(_) => None,
        }
    }
}

/// A horizontal span of header cells rendered as one merged cell.
/// Positions are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergedRange {
    pub row: u32,
    pub first_column: u16,
    pub last_column: u16,
}

/// In-memory rendition of the consolidated sheet.
///
/// Every stage of a run writes here; nothing reaches disk until the whole
/// sheet has been built and is handed to
/// [`excel_write`](crate::io::excel_write).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSheet {
    pub name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: BTreeSet<MergedRange>,
}

impl ResultSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            merges: BTreeSet::new(),
        }
    }

    /// Stores a text cell at the 1-based position, replacing any previous value.
    pub fn set_text(&mut self, row: u32, column: u16, value: impl Into<String>) {
        self.cells.insert((row, column), Cell::Text(value.into()));
    }

    /// Stores a numeric cell at the 1-based position, replacing any previous value.
    pub fn set_number(&mut self, row: u32, column: u16, value: Decimal) {
        self.cells.insert((row, column), Cell::Number(value));
    }

    pub fn merge(&mut self, range: MergedRange) {
        self.merges.insert(range);
    }

    pub fn get(&self, row: u32, column: u16) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    pub fn text(&self, row: u32, column: u16) -> Option<&str> {
        self.get(row, column).and_then(Cell::as_text)
    }

    pub fn number(&self, row: u32, column: u16) -> Option<Decimal> {
        self.get(row, column).and_then(Cell::as_number)
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u16), &Cell)> {
        self.cells.iter().map(|(position, cell)| (*position, cell))
    }

    pub fn merges(&self) -> impl Iterator<Item = &MergedRange> {
        self.merges.iter()
    }

    /// Values of `row` across `columns`, `None` where a cell is unset or text.
    pub fn row_numbers(
        &self,
        row: u32,
        columns: impl IntoIterator<Item = u16>,
    ) -> Vec<Option<Decimal>> {
        columns
            .into_iter()
            .map(|column| self.number(row, column))
            .collect()
    }

    pub fn last_row(&self) -> u32 {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    pub fn last_column(&self) -> u16 {
        self.cells
            .keys()
            .map(|(_, column)| *column)
            .chain(self.merges.iter().map(|range| range.last_column))
            .max()
            .unwrap_or(0)
    }
}
