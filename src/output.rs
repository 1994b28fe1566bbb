use crate::error::Result;
use crate::types::MonthlyPivot;
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a header row followed by string rows. Missing cells are written
/// empty.
pub fn write_table_csv(path: &Path, header: &[String], rows: &[Vec<Option<String>>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_pivot_csv(path: &Path, pivot: &MonthlyPivot) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(pivot_header(pivot))?;
    for row in &pivot.rows {
        let mut rec = vec![row.label.clone()];
        rec.extend(row.values.iter().map(|v| v.to_string()));
        rec.push(row.total.to_string());
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

fn pivot_header(pivot: &MonthlyPivot) -> Vec<String> {
    let mut header = vec!["Region".to_string()];
    header.extend(pivot.months.iter().map(|m| m.name().to_string()));
    header.push("Total".to_string());
    header
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("({} more rows not shown)\n", rows.len() - max_rows);
    }
}

pub fn render_pivot(pivot: &MonthlyPivot) -> String {
    let mut builder = Builder::default();
    builder.push_record(pivot_header(pivot));
    for row in &pivot.rows {
        let mut rec = vec![row.label.clone()];
        rec.extend(row.values.iter().map(|v| format_number(*v, 2)));
        rec.push(format_number(row.total, 2));
        builder.push_record(rec);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_pivot(pivot: &MonthlyPivot) {
    if pivot.rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_pivot(pivot));
}

/// Markdown preview of a plain string table.
pub fn preview_string_table(header: &[String], rows: &[Vec<Option<String>>], max_rows: usize) {
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(header.iter().cloned());
    for row in rows.iter().take(max_rows) {
        builder.push_record(row.iter().map(|c| c.clone().unwrap_or_default()));
    }
    println!("{}\n", builder.build().with(Style::markdown()));
    if rows.len() > max_rows {
        println!("({} more rows not shown)\n", rows.len() - max_rows);
    }
}
