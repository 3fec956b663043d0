use std::fs;
use std::path::{Path, PathBuf};

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use gst_report::ReportError;
use gst_report::config::{DEFAULT_HEADER_ROWS, ReportConfig};
use gst_report::consolidate::{self, consolidate_workbooks, output_path};
use gst_report::headings::resolve_headings;
use gst_report::io::discover::discover_inputs;
use gst_report::io::excel_read::InputWorkbook;
use gst_report::model::ResultSheet;
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

/// One data row of a fixture sheet: `(1-based column, value)` pairs.
type FixtureRow = Vec<(u16, Fixture)>;

#[derive(Clone)]
enum Fixture {
    Text(&'static str),
    Number(f64),
}

fn b2b(supply: &'static str, marker: &'static str, amounts: [f64; 5]) -> FixtureRow {
    let mut row = vec![
        (1, Fixture::Text("27ABCDE1234F1Z5")),
        (8, Fixture::Text(supply)),
        (9, Fixture::Text(marker)),
    ];
    row.extend((10..).zip(amounts.map(Fixture::Number)));
    row
}

fn cdnr(note: &'static str, marker: &'static str, amounts: [f64; 5]) -> FixtureRow {
    let mut row = vec![
        (1, Fixture::Text("29PQRSX6789K1Z2")),
        (3, Fixture::Text(note)),
        (10, Fixture::Text(marker)),
    ];
    row.extend((11..).zip(amounts.map(Fixture::Number)));
    row
}

struct InputFixture {
    period: Option<&'static str>,
    b2b: Vec<FixtureRow>,
    cdnr: Option<Vec<FixtureRow>>,
}

fn write_input(path: &Path, input: &InputFixture) {
    let mut workbook = Workbook::new();

    if let Some(period) = input.period {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Read me").expect("sheet named");
        sheet.write_string(0, 0, "Goods and Services Tax - GSTR-2B").expect("title");
        sheet.write_string(1, 4, period).expect("period written");
    }

    let mut sheets = vec![("B2B", &input.b2b)];
    if let Some(rows) = &input.cdnr {
        sheets.push(("CDNR", rows));
    }
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).expect("sheet named");
        for header in 0..DEFAULT_HEADER_ROWS {
            sheet
                .write_string(header, 0, &format!("{name} heading {header}"))
                .expect("heading written");
        }
        for (offset, row) in rows.iter().enumerate() {
            let row_idx = DEFAULT_HEADER_ROWS + offset as u32;
            for (column, value) in row {
                let col_idx = column - 1;
                let written = match value {
                    Fixture::Text(text) => sheet.write_string(row_idx, col_idx, *text),
                    Fixture::Number(number) => sheet.write_number(row_idx, col_idx, *number),
                };
                written.expect("cell written");
            }
        }
    }

    workbook.save(path).expect("input saved");
}

fn read_result(path: &Path) -> Range<DataType> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("report opened");
    workbook
        .worksheet_range("Result")
        .expect("Result sheet present")
        .expect("Result sheet readable")
}

fn numbers(range: &Range<DataType>, row: u32, first_col: u32) -> Vec<f64> {
    (first_col..first_col + 5)
        .map(|col| match range.get_value((row, col)) {
            Some(DataType::Float(value)) => *value,
            Some(DataType::Int(value)) => *value as f64,
            other => panic!("expected a number at ({row}, {col}), found {other:?}"),
        })
        .collect()
}

fn string_at(range: &Range<DataType>, row: u32, col: u32) -> Option<String> {
    match range.get_value((row, col)) {
        Some(DataType::String(value)) => Some(value.clone()),
        _ => None,
    }
}

fn march_fixture() -> InputFixture {
    InputFixture {
        period: Some("032024"),
        b2b: vec![
            b2b("N", "-", [100.0, 10.0, 5.0, 5.0, 0.0]),
            b2b("Y", "-", [50.0, 5.0, 2.0, 2.0, 0.0]),
            b2b("N", "Y", [400.0, 40.0, 20.0, 20.0, 4.0]),
        ],
        cdnr: Some(vec![
            cdnr("Debit note", "-", [20.0, 2.0, 1.0, 1.0, 0.0]),
            cdnr("Credit note", "-", [30.0, 3.0, 1.5, 1.5, 0.0]),
            cdnr("Credit note", "Y", [70.0, 7.0, 3.5, 3.5, 0.0]),
        ]),
    }
}

fn april_fixture() -> InputFixture {
    InputFixture {
        period: Some("42024"),
        b2b: vec![
            b2b("N", "-", [10.25, 1.0, 0.5, 0.5, 0.0]),
            b2b("N", "-", [0.5, 0.0, 0.0, 0.0, 0.0]),
        ],
        cdnr: Some(Vec::new()),
    }
}

#[test]
fn consolidates_each_workbook_into_one_row() {
    let temp_dir = tempdir().expect("temporary directory");
    let march = temp_dir.path().join("March.xlsx");
    let april = temp_dir.path().join("April.xlsx");
    write_input(&march, &march_fixture());
    write_input(&april, &april_fixture());

    let config = ReportConfig {
        filename_as_month: true,
        ..ReportConfig::default()
    };
    let output = consolidate::run(&[march, april], temp_dir.path(), "summary", &config)
        .expect("report written");
    assert_eq!(output, temp_dir.path().join("summary.xlsx"));

    let result = read_result(&output);
    assert_eq!(string_at(&result, 2, 0).as_deref(), Some("March"));
    assert_eq!(string_at(&result, 3, 0).as_deref(), Some("April"));

    assert_eq!(numbers(&result, 2, 1), vec![150.0, 15.0, 7.0, 7.0, 0.0]);
    assert_eq!(numbers(&result, 2, 6), vec![50.0, 5.0, 2.0, 2.0, 0.0]);
    assert_eq!(numbers(&result, 2, 11), vec![20.0, 2.0, 1.0, 1.0, 0.0]);
    assert_eq!(numbers(&result, 2, 16), vec![30.0, 3.0, 1.5, 1.5, 0.0]);

    assert_eq!(numbers(&result, 3, 1), vec![10.75, 1.0, 0.5, 0.5, 0.0]);
    assert_eq!(numbers(&result, 3, 6), vec![0.0; 5]);
    assert_eq!(numbers(&result, 3, 16), vec![0.0; 5]);
    assert_eq!(result.end().map(|(row, _)| row), Some(3));
}

#[test]
fn writes_two_tier_header() {
    let temp_dir = tempdir().expect("temporary directory");
    let march = temp_dir.path().join("March.xlsx");
    write_input(&march, &march_fixture());

    let output = consolidate::run(&[march], temp_dir.path(), "summary", &ReportConfig::default())
        .expect("report written");
    let result = read_result(&output);

    assert_eq!(string_at(&result, 0, 0).as_deref(), Some("Month"));
    assert_eq!(string_at(&result, 0, 1).as_deref(), Some("B2B"));
    assert_eq!(string_at(&result, 0, 6).as_deref(), Some("B2B (supply Y)"));
    assert_eq!(string_at(&result, 0, 11).as_deref(), Some("CDNR Debit"));
    assert_eq!(string_at(&result, 0, 16).as_deref(), Some("CDNR Credit"));
    for start in [1_u32, 6, 11, 16] {
        let labels: Vec<Option<String>> =
            (start..start + 5).map(|col| string_at(&result, 1, col)).collect();
        let expected: Vec<Option<String>> = ["Value", "IGST", "CGST", "SGST", "Cess"]
            .into_iter()
            .map(|label| Some(label.to_string()))
            .collect();
        assert_eq!(labels, expected);
    }
}

#[test]
fn month_label_comes_from_period_cell() {
    let temp_dir = tempdir().expect("temporary directory");
    let march = temp_dir.path().join("gstr2b-first.xlsx");
    let april = temp_dir.path().join("gstr2b-second.xlsx");
    write_input(&march, &march_fixture());
    write_input(&april, &april_fixture());

    let output = consolidate::run(
        &[march, april],
        temp_dir.path(),
        "summary",
        &ReportConfig::default(),
    )
    .expect("report written");
    let result = read_result(&output);

    assert_eq!(string_at(&result, 2, 0).as_deref(), Some("Mar-2024"));
    assert_eq!(string_at(&result, 3, 0).as_deref(), Some("Apr-2024"));
}

#[test]
fn missing_sheet_aborts_without_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let march = temp_dir.path().join("March.xlsx");
    let broken = temp_dir.path().join("April.xlsx");
    write_input(&march, &march_fixture());
    write_input(
        &broken,
        &InputFixture {
            cdnr: None,
            ..april_fixture()
        },
    );

    let error = consolidate::run(
        &[march, broken.clone()],
        temp_dir.path(),
        "summary",
        &ReportConfig::default(),
    )
    .expect_err("run aborted");

    match error {
        ReportError::MissingSheet { path, sheet, .. } => {
            assert_eq!(path, broken);
            assert_eq!(sheet, "CDNR");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output_path(temp_dir.path(), "summary").exists());
}

#[test]
fn non_numeric_amount_aborts_without_output() {
    let temp_dir = tempdir().expect("temporary directory");
    let march = temp_dir.path().join("March.xlsx");
    let mut fixture = march_fixture();
    fixture.b2b[1].push((12, Fixture::Text("two")));
    write_input(&march, &fixture);

    let error = consolidate::run(&[march], temp_dir.path(), "summary", &ReportConfig::default())
        .expect_err("run aborted");

    match error {
        ReportError::NonNumericCell {
            sheet,
            category,
            row,
            column,
            value,
            ..
        } => {
            assert_eq!(sheet, "B2B");
            assert_eq!(category, "B2B");
            assert_eq!(row, DEFAULT_HEADER_ROWS + 2);
            assert_eq!(column, 12);
            assert_eq!(value, "two");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output_path(temp_dir.path(), "summary").exists());
}

#[test]
fn missing_output_folder_is_reported_before_reading_inputs() {
    let temp_dir = tempdir().expect("temporary directory");
    let absent = temp_dir.path().join("absent");

    let error = consolidate::run(&[], &absent, "summary", &ReportConfig::default())
        .expect_err("run aborted");

    assert!(matches!(error, ReportError::MissingOutputDir(path) if path == absent));
}

#[test]
fn rows_follow_input_order() {
    let config = ReportConfig::default();
    let workbooks = ["Jun", "Jan", "Mar"].into_iter().map(|label| {
        Ok(InputWorkbook::from_sheets(
            format!("{label}.xlsx"),
            [("B2B", Range::new((0, 0), (0, 0))), ("CDNR", Range::new((0, 0), (0, 0)))],
        )
        .with_label(label))
    });

    let sheet = consolidate_workbooks(workbooks, &config).expect("sheet built");

    let labels: Vec<&str> = (3..=5).filter_map(|row| sheet.text(row, 1)).collect();
    assert_eq!(labels, vec!["Jun", "Jan", "Mar"]);
    assert_eq!(sheet.row_numbers(4, 2..=21), vec![Some(Decimal::ZERO); 20]);
    assert_eq!(sheet.last_row(), 5);
}

#[test]
fn positional_labels_when_no_month_source_is_configured() {
    let config = ReportConfig {
        month_cell: None,
        ..ReportConfig::default()
    };
    let workbooks = (0..2).map(|_| {
        Ok(InputWorkbook::from_sheets(
            "input.xlsx",
            [("B2B", Range::new((0, 0), (0, 0))), ("CDNR", Range::new((0, 0), (0, 0)))],
        ))
    });

    let sheet = consolidate_workbooks(workbooks, &config).expect("sheet built");

    assert_eq!(sheet.text(3, 1), Some("1"));
    assert_eq!(sheet.text(4, 1), Some("2"));
}

#[test]
fn resolving_headings_twice_changes_nothing() {
    let config = ReportConfig::default();
    let mut once = ResultSheet::new("Result");
    resolve_headings(&mut once, &config);
    let mut twice = once.clone();
    resolve_headings(&mut twice, &config);

    assert_eq!(once, twice);
    assert_eq!(once.merges().count(), 4);
    assert_eq!(once.last_row(), 2);
}

#[test]
fn discovers_workbooks_recursively() {
    let temp_dir = tempdir().expect("temporary directory");
    let nested = temp_dir.path().join("2024").join("q1");
    fs::create_dir_all(&nested).expect("nested folder");
    write_input(&temp_dir.path().join("March.xlsx"), &march_fixture());
    write_input(&nested.join("April.xlsx"), &april_fixture());
    fs::write(temp_dir.path().join("notes.txt"), "not a workbook").expect("text file");
    fs::write(temp_dir.path().join("~$March.xlsx"), "lock").expect("lock file");

    let mut found: Vec<PathBuf> = discover_inputs(temp_dir.path()).expect("inputs listed");
    found.sort();

    let mut expected = vec![
        temp_dir.path().join("March.xlsx"),
        nested.join("April.xlsx"),
    ];
    expected.sort();
    assert_eq!(found, expected);
}

#[test]
fn discovery_requires_an_existing_folder() {
    let temp_dir = tempdir().expect("temporary directory");
    let absent = temp_dir.path().join("absent");

    let error = discover_inputs(&absent).expect_err("missing folder");
    assert!(matches!(error, ReportError::MissingInput(path) if path == absent));
}
