use std::collections::BTreeMap;

use crate::gst::report::config::{MONTH_COLUMN, ReportConfig};
use crate::gst::report::model::{MergedRange, ResultSheet};

const PRIMARY_ROW: u32 = 1;
const SECONDARY_ROW: u32 = 2;

/// Group label for every category, keyed by the category's start column.
pub fn primary_headings(config: &ReportConfig) -> BTreeMap<u16, &str> {
    config
        .categories
        .iter()
        .map(|category| (category.start_column, category.heading.as_str()))
        .collect()
}

/// Sub-label for every absolute output column covered by a category block.
pub fn secondary_headings(config: &ReportConfig) -> BTreeMap<u16, &str> {
    let mut headings = BTreeMap::new();
    for category in &config.categories {
        for (column, label) in category.output_columns().zip(&config.sub_labels) {
            headings.insert(column, label.as_str());
        }
    }
    headings
}

/// Writes the two header rows of the result sheet.
///
/// Only rows 1 and 2 are touched, so calling this again before data is
/// written leaves the sheet unchanged.
pub fn resolve_headings(sheet: &mut ResultSheet, config: &ReportConfig) {
    sheet.set_text(PRIMARY_ROW, MONTH_COLUMN, config.month_heading.as_str());

    for category in &config.categories {
        if category.end_column() > category.start_column {
            sheet.merge(MergedRange {
                row: PRIMARY_ROW,
                first_column: category.start_column,
                last_column: category.end_column(),
            });
        }
    }
    for (column, heading) in primary_headings(config) {
        sheet.set_text(PRIMARY_ROW, column, heading);
    }
    for (column, label) in secondary_headings(config) {
        sheet.set_text(SECONDARY_ROW, column, label);
    }
}
