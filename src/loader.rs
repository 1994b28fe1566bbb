use crate::error::{DashboardError, Result};
use crate::month::FiscalMonth;
use crate::region::{classify, Region};
use crate::sheet::{read_grid, Grid};
use crate::types::{RawRow, StationRecord, REQUIRED_COLUMNS};
use crate::util::{clean_text, parse_f64_safe};
use csv::StringRecord;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    pub derived_regions: usize,
    pub unassigned_regions: usize,
}

/// Load the station dataset from a CSV or Excel file. The first row is the
/// header.
pub fn load_station_data(path: &Path) -> Result<(Vec<StationRecord>, LoadReport)> {
    let grid = read_grid(path)?;
    log::info!("{}: read {} rows", path.display(), grid.len());
    records_from_grid(&grid)
}

pub fn records_from_grid(grid: &Grid) -> Result<(Vec<StationRecord>, LoadReport)> {
    let Some((header_row, data_rows)) = grid.split_first() else {
        return Err(DashboardError::MissingColumn(REQUIRED_COLUMNS[0].to_string()));
    };
    let headers: StringRecord = header_row
        .iter()
        .map(|h| h.as_deref().unwrap_or("").trim())
        .collect();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(DashboardError::MissingColumn(required.to_string()));
        }
    }

    let mut report = LoadReport::default();
    let mut records = Vec::with_capacity(data_rows.len());

    for (idx, row) in data_rows.iter().enumerate() {
        // 1-based spreadsheet row, counting the header.
        let row_no = idx + 2;
        if row.iter().all(Option::is_none) {
            continue;
        }
        report.total_rows += 1;

        let mut fields: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
        fields.resize(headers.len(), "");
        let record = StringRecord::from(fields);
        let raw: RawRow = match record.deserialize(Some(&headers)) {
            Ok(r) => r,
            Err(e) => {
                log::debug!("row {row_no}: {e}");
                report.skipped_rows += 1;
                continue;
            }
        };

        match clean_row(raw, row_no, &mut report)? {
            Some(rec) => records.push(rec),
            None => report.skipped_rows += 1,
        }
    }

    report.loaded_rows = records.len();
    log::info!(
        "loaded {} records ({} skipped, {} regions derived from POS)",
        report.loaded_rows,
        report.skipped_rows,
        report.derived_regions
    );
    Ok((records, report))
}

fn clean_row(raw: RawRow, row_no: usize, report: &mut LoadReport) -> Result<Option<StationRecord>> {
    let Some(point_of_sale) = clean_text(raw.point_of_sale.as_deref()) else {
        log::debug!("row {row_no}: no point of sale");
        return Ok(None);
    };
    let Some(month_text) = clean_text(raw.month.as_deref()) else {
        log::debug!("row {row_no}: no month");
        return Ok(None);
    };
    let month: FiscalMonth = month_text
        .parse()
        .map_err(|_| DashboardError::UnknownMonth {
            value: month_text.clone(),
            row: row_no,
        })?;

    let region = match clean_text(raw.region.as_deref()).map(|r| r.parse::<Region>()) {
        Some(Ok(region)) => Some(region),
        Some(Err(e)) => {
            log::warn!("row {row_no}: {e}, deriving from point of sale");
            report.derived_regions += 1;
            classify(&point_of_sale)
        }
        None => {
            report.derived_regions += 1;
            classify(&point_of_sale)
        }
    };
    if region.is_none() {
        report.unassigned_regions += 1;
    }

    Ok(Some(StationRecord {
        point_of_sale,
        region,
        month,
        act_usd: parse_f64_safe(raw.act_usd.as_deref()),
        tgt_usd: parse_f64_safe(raw.tgt_usd.as_deref()),
        lyr_usd: parse_f64_safe(raw.lyr_usd.as_deref()),
        var_pct_vs_target: parse_f64_safe(raw.var_pct_vs_target.as_deref()),
        var_pct_vs_last_year: parse_f64_safe(raw.var_pct_vs_last_year.as_deref()),
        act_at_budget_rates: parse_f64_safe(raw.act_at_budget_rates.as_deref()),
        fx_gain_loss_budget: parse_f64_safe(raw.fx_gain_loss_budget.as_deref()),
        act_at_last_year_rates: parse_f64_safe(raw.act_at_last_year_rates.as_deref()),
        fx_gain_loss_last_year: parse_f64_safe(raw.fx_gain_loss_last_year.as_deref()),
        revenue_cont_pct: parse_f64_safe(raw.revenue_cont_pct.as_deref()),
        revenue_cont_pct_last_year: parse_f64_safe(raw.revenue_cont_pct_last_year.as_deref()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::fs;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    fn header() -> Vec<Option<String>> {
        row(&[
            "POINT OF SALE",
            " TGT-USD",
            "ACT -USD",
            "LYR-USD (2023/24)",
            "Exchange - gain/( loss)",
            "Exchange  -gain/(loss)",
            "Month",
            "Region",
        ])
    }

    #[test]
    fn loads_records_and_trims_headers() {
        let grid = vec![
            header(),
            row(&["JAPAN", "1,000", "1200", "900", "-15", "(20)", "April", "FAR EAST"]),
            row(&["Dubai", "500", "450", "", "3", "4", "May", ""]),
        ];
        let (records, report) = records_from_grid(&grid).expect("should load");
        assert_eq!(records.len(), 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.derived_regions, 1);

        let japan = &records[0];
        assert_eq!(japan.tgt_usd, Some(1000.0));
        assert_eq!(japan.act_usd, Some(1200.0));
        assert_eq!(japan.fx_gain_loss_last_year, Some(-20.0));
        assert_eq!(japan.region, Some(Region::FarEast));
        assert_eq!(japan.month.name(), "April");

        let dubai = &records[1];
        assert_eq!(dubai.region, Some(Region::MiddleEastAndSouthAfrica));
        assert_eq!(dubai.lyr_usd, None);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let grid = vec![row(&["POINT OF SALE", "Month", "ACT -USD"])];
        match records_from_grid(&grid) {
            Err(DashboardError::MissingColumn(col)) => assert_eq!(col, "TGT-USD"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn unknown_month_is_rejected_with_row_number() {
        let grid = vec![
            header(),
            row(&["JAPAN", "1", "1", "1", "0", "0", "April", ""]),
            row(&["JAPAN", "1", "1", "1", "0", "0", "Smarch", ""]),
        ];
        match records_from_grid(&grid) {
            Err(DashboardError::UnknownMonth { value, row }) => {
                assert_eq!(value, "Smarch");
                assert_eq!(row, 3);
            }
            other => panic!("expected unknown month, got {other:?}"),
        }
    }

    #[test]
    fn rows_without_pos_or_month_are_skipped() {
        let grid = vec![
            header(),
            row(&["", "1", "1", "1", "0", "0", "April", ""]),
            row(&["JAPAN", "1", "1", "1", "0", "0", "", ""]),
            row(&["", "", "", "", "", "", "", ""]),
            row(&["ATLANTIS", "1", "1", "1", "0", "0", "June", ""]),
        ];
        let (records, report) = records_from_grid(&grid).expect("should load");
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.skipped_rows, 2);
        assert_eq!(report.unassigned_regions, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region, None);
    }

    #[test]
    fn loads_csv_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("station-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join("stations.csv");
        fs::write(
            &path,
            "POINT OF SALE,ACT -USD, TGT-USD,LYR-USD (2023/24),Exchange - gain/( loss),Exchange  -gain/(loss),Month\n\
             SRI LANKA,100,120,90,1,2,Jul\n",
        )
        .expect("should write csv");

        let (records, _) = load_station_data(&path).expect("should load csv");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region, Some(Region::SriLanka));
        assert_eq!(records[0].month.name(), "July");
        let _ = fs::remove_dir_all(&dir);
    }
    #[test]
    fn loads_first_sheet_of_xlsx_workbook() {
        let dir = std::env::temp_dir().join(format!("station-loader-xlsx-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("should create temp dir");
        let path = dir.join("stations.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Stations").expect("valid sheet name");
        let headers = [
            "POINT OF SALE ",
            "ACT -USD",
            " TGT-USD",
            "LYR-USD (2023/24)",
            "Exchange - gain/( loss)",
            "Exchange  -gain/(loss)",
            "Month",
        ];
        for (c, h) in headers.iter().enumerate() {
            sheet.write_string(0, c as u16, *h).expect("should write header");
        }
        let rows: [(&str, [f64; 5], &str); 2] = [
            ("JAPAN", [1250.0, 1000.0, 900.0, -15.5, 20.0], "Sep"),
            ("MALDIVES-MALE", [300.0, 310.0, 280.0, 0.0, 1.0], "March"),
        ];
        for (r, (pos, values, month)) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            sheet.write_string(r, 0, *pos).expect("should write pos");
            for (c, v) in values.iter().enumerate() {
                sheet.write_number(r, c as u16 + 1, *v).expect("should write value");
            }
            sheet.write_string(r, 6, *month).expect("should write month");
        }
        // A spreadsheet error marker reads as a missing number.
        sheet.write_string(2, 3, "#N/A").expect("should write marker");
        workbook
            .add_worksheet()
            .set_name("Notes")
            .expect("valid sheet name")
            .write_string(0, 0, "not station data")
            .expect("should write note");
        workbook.save(&path).expect("should save workbook");

        let (records, report) = load_station_data(&path).expect("should load xlsx");
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(records[0].point_of_sale, "JAPAN");
        assert_eq!(records[0].act_usd, Some(1250.0));
        assert_eq!(records[0].fx_gain_loss_budget, Some(-15.5));
        assert_eq!(records[0].month.name(), "September");
        assert_eq!(records[0].region, Some(Region::FarEast));
        assert_eq!(records[1].lyr_usd, None);
        assert_eq!(records[1].month.name(), "March");
        let _ = fs::remove_dir_all(&dir);
    }
}
