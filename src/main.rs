// Entry point and high-level CLI flow.
//
// A numbered menu stands in for a dashboard sidebar:
// - [1] loads the station dataset named in the config,
// - [2] picks the POS / Region / Month filters,
// - [3] writes the chart datasets for the current filters,
// - [4] merges raw monthly exports into one cleaned CSV.
mod config;
mod error;
mod filter;
mod loader;
mod merge;
mod month;
mod output;
mod region;
mod reports;
mod sheet;
mod types;
mod util;

use config::AppConfig;
use error::{DashboardError, Result};
use filter::{apply_filters, filter_options, FilterSpec};
use month::FiscalMonth;
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use types::StationRecord;

// The loaded table and the current filter selection survive between menu
// actions; every report is recomputed from them.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    data: Option<Vec<StationRecord>>,
    filters: FilterSpec,
}

fn state() -> MutexGuard<'static, AppState> {
    // A poisoned lock still holds usable state.
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Read one trimmed line. `None` once input is closed.
fn read_input<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut buf = String::new();
    match reader.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();
    read_input(&mut io::stdin().lock())
}

fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

/// Offer `options` with a leading `[0] All` entry. Returns `None` for All.
fn select_option<T: Clone>(title: &str, options: &[T], label: impl Fn(&T) -> String) -> Option<T> {
    loop {
        println!("{title}");
        println!("  [0] All");
        for (i, opt) in options.iter().enumerate() {
            println!("  [{}] {}", i + 1, label(opt));
        }
        let Some(resp) = prompt("Enter choice (blank = All): ") else {
            return None;
        };
        if resp.is_empty() {
            return None;
        }
        match resp.parse::<usize>() {
            Ok(0) => return None,
            Ok(n) if n <= options.len() => return Some(options[n - 1].clone()),
            _ => println!("Invalid choice. Please enter a number from 0 to {}.", options.len()),
        }
    }
}

fn handle_load(cfg: &AppConfig) {
    let path = &cfg.dataset_path;
    match loader::load_station_data(path) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} records loaded)",
                util::format_int(report.total_rows),
                util::format_int(report.loaded_rows)
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped (no point of sale or month).",
                    util::format_int(report.skipped_rows)
                );
            }
            if report.derived_regions > 0 {
                println!(
                    "Info: Region derived from point of sale for {} rows.",
                    util::format_int(report.derived_regions)
                );
            }
            if report.unassigned_regions > 0 {
                println!(
                    "Warning: {} rows have a point of sale with no known region.",
                    util::format_int(report.unassigned_regions)
                );
            }
            println!();
            let mut st = state();
            st.data = Some(data);
            st.filters = FilterSpec::default();
        }
        Err(e) => {
            log::error!("load of {} failed: {e}", path.display());
            eprintln!("Failed to load {}: {}\n", path.display(), e);
        }
    }
}

fn handle_select_filters() {
    let data = state().data.clone();
    let Some(data) = data else {
        println!("Error: {}\n", DashboardError::NoData);
        return;
    };
    let opts = filter_options(&data);

    let point_of_sale = select_option("Select POS", &opts.points_of_sale, |p| p.clone());
    let region = select_option("Select Region", &opts.regions, |r| r.label().to_string());
    let month = select_option("Select Month", &opts.months, |m| m.name().to_string());
    let spec = FilterSpec { point_of_sale, region, month };

    let matched = apply_filters(&data, &spec).len();
    println!("Filters set ({spec}): {} matching records.\n", util::format_int(matched));
    state().filters = spec;
}

fn handle_generate_reports(cfg: &AppConfig) -> Result<()> {
    let (data, filters) = {
        let st = state();
        (st.data.clone(), st.filters.clone())
    };
    let data = data.ok_or(DashboardError::NoData)?;
    let filtered = apply_filters(&data, &filters);

    println!("Generating chart datasets...");
    if filters.is_unfiltered() {
        println!("Filters: none ({} records)\n", util::format_int(filtered.len()));
    } else {
        println!("Filters: {filters} ({} records)\n", util::format_int(filtered.len()));
    }
    let rows = cfg.preview_rows;

    let details = reports::station_details(&filtered);
    let file = cfg.output_path("filtered_records.csv");
    output::write_csv(&file, &details)?;
    println!("Filtered Records\n");
    output::preview_table_rows(&details, rows);
    println!("(Full table exported to {})\n", file.display());

    let trend = reports::revenue_trend(&filtered);
    let file = cfg.output_path("revenue_trend.csv");
    output::write_csv(&file, &trend)?;
    println!("Overall Revenue Trend by Month\n");
    output::preview_table_rows(&trend, rows);
    println!("(Full table exported to {})\n", file.display());

    let fx = reports::exchange_trend(&filtered);
    let file = cfg.output_path("exchange_gain_loss.csv");
    output::write_csv(&file, &fx)?;
    println!("Overall Exchange Rate Gain/Loss by Month\n");
    output::preview_table_rows(&fx, rows);
    println!("(Full table exported to {})\n", file.display());

    let share = reports::region_share(&filtered);
    let file = cfg.output_path("region_share.csv");
    output::write_csv(&file, &share)?;
    println!("Revenue Share by Region\n");
    output::preview_table_rows(&share, rows);
    println!("(Full table exported to {})\n", file.display());

    let ranking = reports::pos_ranking(&filtered, cfg.top_pos);
    let file = cfg.output_path("pos_ranking.csv");
    output::write_csv(&file, &ranking)?;
    println!("Top {} Points of Sale by Actual Revenue\n", cfg.top_pos);
    output::preview_table_rows(&ranking, rows);
    println!("(Full table exported to {})\n", file.display());

    let pivot = reports::monthly_pivot(&filtered);
    let file = cfg.output_path("monthly_pivot.csv");
    output::write_pivot_csv(&file, &pivot)?;
    println!("Actual Revenue (USD) by Region and Month\n");
    output::preview_pivot(&pivot);
    println!("(Full table exported to {})\n", file.display());

    let summary = reports::generate_summary(&filtered, &filters);
    let file = cfg.output_path("summary.json");
    output::write_json(&file, &summary)?;
    println!("Summary Stats ({}):", file.display());
    println!(
        "{{\"total_actual_usd\": {}, \"var_pct_vs_target\": {}}}\n",
        util::format_number(summary.total_actual_usd, 2),
        util::display_opt_pct(&summary.var_pct_vs_target)
    );
    Ok(())
}

/// A menu number (1-based into `months`) or a month name.
fn parse_month_choice(resp: &str, months: &[FiscalMonth]) -> Option<FiscalMonth> {
    match resp.parse::<usize>() {
        Ok(n) if (1..=months.len()).contains(&n) => Some(months[n - 1]),
        Ok(_) => None,
        Err(_) => resp.parse::<FiscalMonth>().ok(),
    }
}

/// `None` when input closes before a month is picked.
fn select_month_for(file: &str) -> Option<FiscalMonth> {
    let months = FiscalMonth::calendar();
    loop {
        println!("Select the Month for {file}");
        for (i, m) in months.iter().enumerate() {
            println!("  [{}] {}", i + 1, m);
        }
        let resp = prompt("Enter choice (number or name): ")?;
        if let Some(month) = parse_month_choice(&resp, &months) {
            return Some(month);
        }
        println!("Invalid month. Please try again.");
    }
}

fn handle_merge(cfg: &AppConfig) -> Result<()> {
    let Some(line) = prompt("Enter export files to merge (comma-separated): ") else {
        return Ok(());
    };
    let paths: Vec<PathBuf> = line
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();
    if paths.is_empty() {
        println!("No files given.\n");
        return Ok(());
    }

    let mut inputs: Vec<merge::MergeInput> = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(month) = select_month_for(&path.display().to_string()) else {
            println!("Input closed; merge cancelled.\n");
            return Ok(());
        };
        inputs.push(merge::MergeInput { path, month });
    }

    let (combined, report) = merge::merge_exports(&inputs)?;
    if combined.is_empty() {
        log::warn!("merge produced no complete rows");
    }
    for f in &report.files {
        println!(
            "Processed {} ({}): {} rows, {} kept",
            f.source,
            f.month,
            util::format_int(f.raw_rows),
            util::format_int(f.kept_rows)
        );
    }
    println!("\nCombined Dataset:\n");
    output::preview_string_table(&combined.columns, &combined.rows, cfg.preview_rows);

    let file = cfg.output_path(&cfg.merged_file_name);
    output::write_table_csv(&file, &combined.columns, &combined.rows)?;
    println!(
        "({} rows exported to {})\n",
        util::format_int(report.total_rows),
        file.display()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let cfg = match config::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("Config load error: {e}");
            eprintln!("Config load error: {e}");
            return;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&cfg.output_dir) {
        eprintln!("Cannot create output directory {}: {e}", cfg.output_dir.display());
        return;
    }

    loop {
        println!("Revenue Analysis Dashboard");
        println!("[1] Load the station dataset ({})", cfg.dataset_path.display());
        println!("[2] Select filters");
        println!("[3] Generate chart datasets");
        println!("[4] Merge monthly exports");
        println!("[5] Exit\n");
        let Some(choice) = read_choice() else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&cfg),
            "2" => handle_select_filters(),
            "3" => {
                println!();
                if let Err(e) = handle_generate_reports(&cfg) {
                    eprintln!("Error: {e}\n");
                }
            }
            "4" => {
                if let Err(e) = handle_merge(&cfg) {
                    eprintln!("Merge failed: {e}\n");
                }
            }
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 1 to 5.\n"),
        }
    }
}
