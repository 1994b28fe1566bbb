// Merging raw monthly station exports into one dataset.
//
// Each export is a sheet with a five-row header. The header is flattened,
// replaced by the reference column list, stamped with the month the user
// picked and given a region. The combined table then loses its
// local-currency columns and every row with a missing value.
use crate::error::{DashboardError, Result};
use crate::month::FiscalMonth;
use crate::region::classify;
use crate::sheet::{read_grid, Grid};
use crate::types::{COL_MONTH, COL_POS, COL_REGION};
use std::path::{Path, PathBuf};

pub const HEADER_ROWS: usize = 5;
pub const SHEET_COLUMNS: usize = 18;

/// Column names every export is renamed to, in sheet order. Spacing is
/// kept exactly as the exports spell it.
pub const REFERENCE_COLUMNS: [&str; SHEET_COLUMNS] = [
    "POINT OF SALE",
    "CCY",
    "ACT -LC",
    " TGT-LC",
    "VAR %-LC (ACT vsTGT)",
    "LYR-LC (2023/24)",
    "VAR %-LC (ACT vs LYR)",
    "ACT -USD",
    " TGT-USD",
    "VAR %-USD (ACT vsTGT)",
    "LYR-USD (2023/24)",
    "VAR %-USD (ACT vs LYR)",
    "Act. Using-Bgt. ex. Rates",
    "Exchange - gain/( loss)",
    "Act. Using- LY. Ex. Rates",
    "Exchange  -gain/(loss)",
    "REVENUE CONT. % - Actual",
    "REVENUE CONT. %-LYR",
];

pub const LOCAL_CURRENCY_COLUMNS: [&str; 6] = [
    "CCY",
    "ACT -LC",
    " TGT-LC",
    "VAR %-LC (ACT vsTGT)",
    "LYR-LC (2023/24)",
    "VAR %-LC (ACT vs LYR)",
];

/// A string table with a single header row. `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Set `name` to `value` on every row, adding the column if needed.
    pub fn set_constant_column(&mut self, name: &str, value: &str) {
        let idx = self.ensure_column(name);
        for row in &mut self.rows {
            row[idx] = Some(value.to_string());
        }
    }

    /// Fill the region column from the point-of-sale column. Unknown
    /// stations get no region.
    pub fn assign_region(&mut self) -> Result<()> {
        let pos_idx = self
            .column_index(COL_POS)
            .ok_or_else(|| DashboardError::MissingColumn(COL_POS.to_string()))?;
        let region_idx = self.ensure_column(COL_REGION);
        for row in &mut self.rows {
            row[region_idx] = row[pos_idx]
                .as_deref()
                .and_then(classify)
                .map(|r| r.label().to_string());
        }
        Ok(())
    }

    /// Append `other`'s rows, lining columns up by name. Columns only one
    /// side has are added and left empty on the other side's rows.
    pub fn append(&mut self, other: Frame) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }
        let mapping: Vec<usize> = other.columns.iter().map(|c| self.ensure_column(c)).collect();
        let width = self.columns.len();
        for row in other.rows {
            let mut aligned = vec![None; width];
            for (cell, &idx) in row.into_iter().zip(&mapping) {
                aligned[idx] = cell;
            }
            self.rows.push(aligned);
        }
    }

    /// Remove the named columns; names that are not present are ignored.
    /// Returns how many columns were removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> usize {
        let keep: Vec<bool> = self.columns.iter().map(|c| !names.contains(&c.as_str())).collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }
        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_by_mask(std::mem::take(row), &keep);
        }
        removed
    }

    /// Drop every row that has a missing value. Returns the number dropped.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| r.iter().all(Option::is_some));
        before - self.rows.len()
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, k)| k.then_some(item))
        .collect()
}

/// Flatten a multi-row header into one label per column. Levels are
/// trimmed and joined with `_`; blank cells in the top level repeat the
/// label to their left, as merged title cells do.
pub fn flatten_header(header: &[Vec<Option<String>>], width: usize) -> Vec<String> {
    let last_level = header.len().saturating_sub(1);
    let mut filled: Vec<Vec<Option<String>>> = Vec::with_capacity(header.len());
    for (level, row) in header.iter().enumerate() {
        let mut carry: Option<String> = None;
        let cells = (0..width)
            .map(|j| {
                let cell = row
                    .get(j)
                    .and_then(|c| c.as_deref())
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);
                match cell {
                    Some(c) => {
                        carry = Some(c.clone());
                        Some(c)
                    }
                    None if level == 0 && last_level > 0 => carry.clone(),
                    None => None,
                }
            })
            .collect();
        filled.push(cells);
    }

    (0..width)
        .map(|j| {
            let parts: Vec<&str> = filled.iter().filter_map(|lvl| lvl[j].as_deref()).collect();
            if parts.is_empty() {
                format!("Unnamed: {j}")
            } else {
                parts.join("_")
            }
        })
        .collect()
}

/// Turn a raw export grid into a frame: flatten the header, keep the first
/// `SHEET_COLUMNS` columns, rename to `reference` and stamp the month.
pub fn normalize_sheet(
    grid: &Grid,
    source: &str,
    reference: Option<&[&str]>,
    month: Option<FiscalMonth>,
) -> Result<Frame> {
    if grid.len() < HEADER_ROWS {
        return Err(DashboardError::HeaderTooShort(source.to_string(), HEADER_ROWS));
    }
    let (header, body) = grid.split_at(HEADER_ROWS);
    let width = grid.iter().map(Vec::len).max().unwrap_or(0).min(SHEET_COLUMNS);

    let mut columns = flatten_header(header, width);
    if let Some(reference) = reference {
        if reference.len() != columns.len() {
            return Err(DashboardError::ColumnMismatch {
                path: source.to_string(),
                expected: reference.len(),
                found: columns.len(),
            });
        }
        columns = reference.iter().map(|c| c.to_string()).collect();
    }

    let rows = body
        .iter()
        .filter(|r| r.iter().any(Option::is_some))
        .map(|r| {
            let mut row: Vec<Option<String>> = r.iter().take(width).cloned().collect();
            row.resize(width, None);
            row
        })
        .collect();

    let mut frame = Frame { columns, rows };
    if let Some(month) = month {
        frame.set_constant_column(COL_MONTH, month.name());
    }
    Ok(frame)
}

#[derive(Debug, Clone)]
pub struct MergeInput {
    pub path: PathBuf,
    pub month: FiscalMonth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileMergeStats {
    pub source: String,
    pub month: FiscalMonth,
    pub raw_rows: usize,
    pub kept_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub files: Vec<FileMergeStats>,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

/// Read each export from disk and merge them.
pub fn merge_exports(inputs: &[MergeInput]) -> Result<(Frame, MergeReport)> {
    let mut sheets = Vec::with_capacity(inputs.len());
    for input in inputs {
        log::info!("Processing file: {} ({})", input.path.display(), input.month);
        let grid = read_grid(&input.path)?;
        sheets.push((display_name(&input.path), grid, input.month));
    }
    merge_sheets(sheets)
}

/// Merge already-read export grids, in order.
pub fn merge_sheets(sheets: Vec<(String, Grid, FiscalMonth)>) -> Result<(Frame, MergeReport)> {
    let mut combined = Frame::default();
    let mut report = MergeReport::default();

    for (source, grid, month) in sheets {
        let mut frame = normalize_sheet(&grid, &source, Some(&REFERENCE_COLUMNS[..]), Some(month))?;
        frame.assign_region()?;
        frame.drop_columns(&LOCAL_CURRENCY_COLUMNS);
        let raw_rows = frame.len();
        let dropped = frame.drop_incomplete_rows();
        if dropped > 0 {
            log::debug!("{source}: dropped {dropped} incomplete rows");
        }
        report.dropped_rows += dropped;
        report.files.push(FileMergeStats {
            source,
            month,
            raw_rows,
            kept_rows: frame.len(),
        });
        combined.append(frame);
    }

    // Only matters if the exports disagreed on their columns.
    report.dropped_rows += combined.drop_incomplete_rows();
    report.total_rows = combined.len();
    log::info!(
        "merged {} files into {} rows ({} dropped)",
        report.files.len(),
        report.total_rows,
        report.dropped_rows
    );
    Ok((combined, report))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::cell_to_string;
    use calamine::{CellErrorType, Data};
    use rust_xlsxwriter::Workbook;
    use std::fs;

    fn column<'a>(frame: &'a Frame, name: &str) -> Vec<Option<&'a str>> {
        let idx = frame.column_index(name).expect("column exists");
        frame.rows.iter().map(|r| r[idx].as_deref()).collect()
    }

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    fn export_header() -> Vec<Vec<Option<String>>> {
        let mut top = vec![""; SHEET_COLUMNS];
        top[0] = "STATION PERFORMANCE";
        top[7] = "USD";
        let level2: Vec<String> = REFERENCE_COLUMNS.iter().map(|c| c.trim().to_string()).collect();
        vec![
            cells(&top),
            cells(&[""; SHEET_COLUMNS]),
            cells(&[""; SHEET_COLUMNS]),
            level2.iter().map(|c| Some(c.clone())).collect(),
            cells(&[""; SHEET_COLUMNS]),
        ]
    }

    fn data_row(pos: &str, blank_at: Option<usize>) -> Vec<Option<String>> {
        let mut row: Vec<Option<String>> = (0..SHEET_COLUMNS).map(|i| Some(format!("{}", i * 10))).collect();
        row[0] = Some(pos.to_string());
        row[1] = Some("LKR".to_string());
        if let Some(i) = blank_at {
            row[i] = None;
        }
        // Trailing notes beyond the 18 report columns are ignored.
        row.push(Some("note".to_string()));
        row
    }

    fn export(rows: Vec<Vec<Option<String>>>) -> Grid {
        let mut grid = export_header();
        grid.extend(rows);
        grid
    }

    #[test]
    fn flattens_multi_level_header() {
        let header = vec![
            cells(&["Revenue", "", "FX"]),
            cells(&["ACT", "TGT", ""]),
            cells(&["", "", "gain"]),
        ];
        let cols = flatten_header(&header, 4);
        assert_eq!(cols, vec!["Revenue_ACT", "Revenue_TGT", "FX_gain", "FX"]);

        let blank = vec![cells(&["", ""]), cells(&["", ""])];
        assert_eq!(flatten_header(&blank, 2), vec!["Unnamed: 0", "Unnamed: 1"]);
    }

    #[test]
    fn normalizes_to_reference_columns_with_month() {
        let grid = export(vec![data_row("JAPAN", None), cells(&[""; 3])]);
        let month: FiscalMonth = "June".parse().unwrap();
        let frame = normalize_sheet(&grid, "june.xlsx", Some(&REFERENCE_COLUMNS[..]), Some(month))
            .expect("should normalize");
        assert_eq!(frame.columns.len(), SHEET_COLUMNS + 1);
        assert_eq!(frame.columns[8], " TGT-USD");
        assert_eq!(frame.columns.last().unwrap(), COL_MONTH);
        // Blank row is skipped, trailing note column cut.
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.rows[0].len(), SHEET_COLUMNS + 1);
        assert_eq!(frame.rows[0][SHEET_COLUMNS].as_deref(), Some("June"));
    }

    #[test]
    fn reference_length_must_match() {
        let grid = export(vec![data_row("JAPAN", None)]);
        let short = &REFERENCE_COLUMNS[..10];
        match normalize_sheet(&grid, "x.xlsx", Some(short), None) {
            Err(DashboardError::ColumnMismatch { expected, found, .. }) => {
                assert_eq!(expected, 10);
                assert_eq!(found, SHEET_COLUMNS);
            }
            other => panic!("expected column mismatch, got {other:?}"),
        }
    }

    #[test]
    fn short_grid_is_an_error() {
        let grid = vec![cells(&["a"]), cells(&["b"])];
        assert!(matches!(
            normalize_sheet(&grid, "x", None, None),
            Err(DashboardError::HeaderTooShort(_, HEADER_ROWS))
        ));
    }

    #[test]
    fn dropping_local_currency_columns_removes_exactly_those() {
        let grid = export(vec![data_row("JAPAN", None)]);
        let mut frame = normalize_sheet(&grid, "x", Some(&REFERENCE_COLUMNS[..]), None).unwrap();
        let before = frame.columns.clone();
        let removed = frame.drop_columns(&LOCAL_CURRENCY_COLUMNS);
        assert_eq!(removed, LOCAL_CURRENCY_COLUMNS.len());
        let expected: Vec<String> = before
            .into_iter()
            .filter(|c| !LOCAL_CURRENCY_COLUMNS.contains(&c.as_str()))
            .collect();
        assert_eq!(frame.columns, expected);
        assert!(frame.rows.iter().all(|r| r.len() == expected.len()));
        // Second pass finds nothing left to drop.
        assert_eq!(frame.drop_columns(&LOCAL_CURRENCY_COLUMNS), 0);
    }

    #[test]
    fn assigns_regions_and_leaves_unknown_blank() {
        let grid = export(vec![data_row("Dubai", None), data_row("ATLANTIS", None)]);
        let mut frame = normalize_sheet(&grid, "x", Some(&REFERENCE_COLUMNS[..]), None).unwrap();
        frame.assign_region().expect("POS column exists");
        let regions = column(&frame, COL_REGION);
        assert_eq!(regions, vec![Some("M. EAST AND S. AFRICA"), None]);
    }

    #[test]
    fn merged_row_count_is_sum_of_valid_rows() {
        let april = export(vec![
            data_row("JAPAN", None),
            data_row("FRANCE", None),
            // Missing USD actual: dropped.
            data_row("SRI LANKA", Some(7)),
            // Unknown station has no region: dropped.
            data_row("ATLANTIS", None),
        ]);
        let may = export(vec![
            data_row("NEPAL", None),
            // Missing local-currency value only: kept once LC columns go.
            data_row("INDIA GOA", Some(2)),
        ]);
        let (frame, report) = merge_sheets(vec![
            ("april.xlsx".into(), april, "April".parse().unwrap()),
            ("may.xlsx".into(), may, "May".parse().unwrap()),
        ])
        .expect("should merge");

        assert_eq!(report.files[0].raw_rows, 4);
        assert_eq!(report.files[0].kept_rows, 2);
        assert_eq!(report.files[1].kept_rows, 2);
        assert_eq!(frame.len(), 4);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.dropped_rows, 2);

        let months = column(&frame, COL_MONTH);
        assert_eq!(months, vec![Some("April"), Some("April"), Some("May"), Some("May")]);
        assert!(frame.columns.iter().all(|c| !LOCAL_CURRENCY_COLUMNS.contains(&c.as_str())));
        assert_eq!(frame.columns.len(), SHEET_COLUMNS - LOCAL_CURRENCY_COLUMNS.len() + 2);
    }

    #[test]
    fn error_cells_and_na_text_count_as_missing() {
        let mut div0 = data_row("JAPAN", None);
        div0[9] = cell_to_string(&Data::Error(CellErrorType::Div0));
        let mut na_text = data_row("FRANCE", None);
        na_text[9] = cell_to_string(&Data::String("N/A".into()));
        let grid = export(vec![data_row("NEPAL", None), div0, na_text]);

        let (frame, report) =
            merge_sheets(vec![("june.xlsx".into(), grid, "June".parse().unwrap())]).expect("should merge");
        assert_eq!(report.files[0].raw_rows, 3);
        assert_eq!(report.files[0].kept_rows, 1);
        assert_eq!(report.dropped_rows, 2);
        assert_eq!(column(&frame, "POINT OF SALE"), vec![Some("NEPAL")]);
    }

    #[test]
    fn append_aligns_columns_by_name() {
        let mut a = Frame { columns: vec!["x".into(), "y".into()], rows: vec![cells(&["1", "2"])] };
        let b = Frame { columns: vec!["y".into(), "z".into()], rows: vec![cells(&["3", "4"])] };
        a.append(b);
        assert_eq!(a.columns, vec!["x", "y", "z"]);
        assert_eq!(a.rows[0], cells(&["1", "2", ""]));
        assert_eq!(a.rows[1], cells(&["", "3", "4"]));
        assert_eq!(a.drop_incomplete_rows(), 2);
    }

    #[test]
    fn merges_csv_exports_from_disk() {
        let dir = std::env::temp_dir().join(format!("station-merge-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join("july.csv");
        let mut text = String::new();
        for row in export(vec![data_row("QATAR", None)]) {
            let line: Vec<String> = row.into_iter().map(|c| c.unwrap_or_default()).collect();
            text.push_str(&line.join(","));
            text.push('\n');
        }
        fs::write(&path, text).expect("should write csv");

        let inputs = vec![MergeInput { path: path.clone(), month: "July".parse().unwrap() }];
        let (frame, report) = merge_exports(&inputs).expect("should merge");
        assert_eq!(frame.len(), 1);
        assert_eq!(report.files[0].source, "july.csv");
        assert_eq!(column(&frame, COL_REGION), vec![Some("M. EAST AND S. AFRICA")]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn merges_xlsx_exports_from_disk() {
        let dir = std::env::temp_dir().join(format!("station-merge-xlsx-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join("august.xlsx");

        let mut na_row = data_row("FRANCE", None);
        na_row[9] = Some("#N/A".to_string());
        let grid = export(vec![data_row("JAPAN", None), na_row, data_row("NEPAL", Some(10))]);

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("August").expect("valid sheet name");
        for (r, row) in grid.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let Some(text) = cell else { continue };
                let (r, c) = (r as u32, c as u16);
                let written = match text.parse::<f64>() {
                    Ok(n) if r as usize >= HEADER_ROWS => sheet.write_number(r, c, n),
                    _ => sheet.write_string(r, c, text.as_str()),
                };
                written.expect("should write cell");
            }
        }
        // Only the first sheet is read.
        workbook
            .add_worksheet()
            .write_string(0, 0, "ignored")
            .expect("should write cell");
        workbook.save(&path).expect("should save workbook");

        let inputs = vec![MergeInput { path: path.clone(), month: "August".parse().unwrap() }];
        let (frame, report) = merge_exports(&inputs).expect("should merge xlsx");
        assert_eq!(report.files[0].source, "august.xlsx");
        assert_eq!(report.files[0].raw_rows, 3);
        assert_eq!(report.files[0].kept_rows, 1);
        assert_eq!(column(&frame, "POINT OF SALE"), vec![Some("JAPAN")]);
        assert_eq!(column(&frame, COL_REGION), vec![Some("FAR EAST")]);
        assert_eq!(column(&frame, COL_MONTH), vec![Some("August")]);
        // Numeric cells come back with a decimal point.
        assert_eq!(column(&frame, "ACT -USD"), vec![Some("70.0")]);
        let _ = fs::remove_dir_all(&dir);
    }
}
