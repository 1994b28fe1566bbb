// Raw grid access for workbooks and CSV files.
//
// Everything downstream works on a plain grid of optional strings so the
// Excel and CSV paths share the same cleaning code. `None` marks an empty
// cell.
use crate::error::{DashboardError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;

pub type Grid = Vec<Vec<Option<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Workbook,
}

pub fn source_kind(path: &Path) -> Result<SourceKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Ok(SourceKind::Csv),
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceKind::Workbook),
        other => Err(DashboardError::UnsupportedFormat(other.to_string())),
    }
}

/// Read every row of the first sheet (or the whole CSV file) without
/// interpreting any of them as a header.
pub fn read_grid(path: &Path) -> Result<Grid> {
    match source_kind(path)? {
        SourceKind::Csv => read_csv_grid(path),
        SourceKind::Workbook => read_workbook_grid(path),
    }
}

fn read_workbook_grid(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DashboardError::EmptyWorkbook(path.display().to_string()))?;
    let range = workbook.worksheet_range(&first)?;
    log::debug!(
        "{}: sheet '{}' is {}x{}",
        path.display(),
        first,
        range.height(),
        range.width()
    );
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn read_csv_grid(path: &Path) -> Result<Grid> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut grid = Grid::new();
    for record in rdr.records() {
        let record = record?;
        grid.push(record.iter().map(non_empty).collect());
    }
    Ok(grid)
}

/// Cell text that spreadsheet exports use for "no value".
pub const MISSING_MARKERS: [&str; 19] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "",
];

fn non_empty(s: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

/// Whole numbers keep a `.0` (`1250.0`, not `1250`). Never uses exponent
/// notation, which the number parser would reject.
fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(v) => non_empty(v),
        Data::Float(v) => Some(float_text(*v)),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        Data::DateTime(v) => Some(v.to_string()),
        Data::DateTimeIso(v) => Some(v.to_string()),
        Data::DurationIso(v) => Some(v.to_string()),
        Data::Error(_) => None,
        Data::Empty => None,
    }
}
