// Chart datasets built from the filtered station records.
//
// Each generator reshapes records the way a chart consumes them: long
// (melted) rows for the line and bar charts, grouped totals for the pie and
// ranking charts, and a region × month pivot.
use crate::filter::FilterSpec;
use crate::month::FiscalMonth;
use crate::types::{
    ExchangeTrendRow, MonthlyPivot, PivotRow, PosRankingRow, RegionShareRow, RevenueTrendRow,
    StationDetailRow, StationRecord, SummaryStats, COL_ACT_USD, COL_FX_BUDGET, COL_FX_LAST_YEAR,
    COL_LYR_USD, COL_TGT_USD,
};
use crate::util::{sum_present, variance_pct};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const PIVOT_TOTAL_LABEL: &str = "TOTAL";

/// Melt actual, last-year and target revenue into one row per month and
/// revenue type, summed over the records of that month.
pub fn revenue_trend(data: &[StationRecord]) -> Vec<RevenueTrendRow> {
    let mut by_month: BTreeMap<FiscalMonth, [f64; 3]> = BTreeMap::new();
    for r in data {
        let e = by_month.entry(r.month).or_default();
        e[0] += r.act_usd.unwrap_or(0.0);
        e[1] += r.lyr_usd.unwrap_or(0.0);
        e[2] += r.tgt_usd.unwrap_or(0.0);
    }
    let types = [COL_ACT_USD, COL_LYR_USD, COL_TGT_USD];
    by_month
        .into_iter()
        .flat_map(|(month, sums)| {
            types.into_iter().zip(sums).map(move |(ty, revenue)| RevenueTrendRow {
                month,
                revenue_type: ty.to_string(),
                revenue,
            })
        })
        .collect()
}

/// Melt the two exchange gain/loss columns by month.
pub fn exchange_trend(data: &[StationRecord]) -> Vec<ExchangeTrendRow> {
    let mut by_month: BTreeMap<FiscalMonth, [f64; 2]> = BTreeMap::new();
    for r in data {
        let e = by_month.entry(r.month).or_default();
        e[0] += r.fx_gain_loss_budget.unwrap_or(0.0);
        e[1] += r.fx_gain_loss_last_year.unwrap_or(0.0);
    }
    let types = [COL_FX_BUDGET, COL_FX_LAST_YEAR];
    by_month
        .into_iter()
        .flat_map(|(month, sums)| {
            types.into_iter().zip(sums).map(move |(ty, gain_loss)| ExchangeTrendRow {
                month,
                exchange_type: ty.to_string(),
                gain_loss,
            })
        })
        .collect()
}

#[derive(Default)]
struct Totals {
    records: usize,
    actual: f64,
    target: f64,
    last_year: f64,
}

impl Totals {
    fn add(&mut self, r: &StationRecord) {
        self.records += 1;
        self.actual += r.act_usd.unwrap_or(0.0);
        self.target += r.tgt_usd.unwrap_or(0.0);
        self.last_year += r.lyr_usd.unwrap_or(0.0);
    }
}

/// Per-region totals with each region's share of actual revenue, largest
/// first. Records without a region are grouped as unassigned.
pub fn region_share(data: &[StationRecord]) -> Vec<RegionShareRow> {
    let mut map: HashMap<&'static str, Totals> = HashMap::new();
    for r in data {
        map.entry(r.region_label()).or_default().add(r);
    }
    let grand_total: f64 = map.values().map(|t| t.actual).sum();

    let mut rows: Vec<RegionShareRow> = map
        .into_iter()
        .map(|(region, t)| RegionShareRow {
            region: region.to_string(),
            records: t.records,
            actual: t.actual,
            target: t.target,
            last_year: t.last_year,
            var_pct_vs_target: variance_pct(t.actual, t.target),
            var_pct_vs_last_year: variance_pct(t.actual, t.last_year),
            share_pct: if grand_total.abs() < f64::EPSILON {
                0.0
            } else {
                t.actual / grand_total * 100.0
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.actual
            .partial_cmp(&a.actual)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    rows
}

/// Top `top_n` points of sale by actual revenue.
pub fn pos_ranking(data: &[StationRecord], top_n: usize) -> Vec<PosRankingRow> {
    let mut map: HashMap<&str, (Totals, &'static str)> = HashMap::new();
    for r in data {
        let e = map
            .entry(r.point_of_sale.as_str())
            .or_insert_with(|| (Totals::default(), r.region_label()));
        e.0.add(r);
    }
    let mut tmp: Vec<(&str, Totals, &'static str)> =
        map.into_iter().map(|(pos, (t, region))| (pos, t, region)).collect();
    tmp.sort_by(|a, b| {
        b.1.actual
            .partial_cmp(&a.1.actual)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    tmp.into_iter()
        .take(top_n)
        .enumerate()
        .map(|(idx, (pos, t, region))| PosRankingRow {
            rank: idx + 1,
            point_of_sale: pos.to_string(),
            region: region.to_string(),
            actual: t.actual,
            target: t.target,
            achievement_pct: if t.target.abs() < f64::EPSILON {
                None
            } else {
                Some(t.actual / t.target * 100.0)
            },
            var_pct_vs_last_year: variance_pct(t.actual, t.last_year),
        })
        .collect()
}

/// Actual revenue per region and month, with a total row and column.
pub fn monthly_pivot(data: &[StationRecord]) -> MonthlyPivot {
    let months: Vec<FiscalMonth> = data
        .iter()
        .map(|r| r.month)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    let col: HashMap<FiscalMonth, usize> = months.iter().enumerate().map(|(i, m)| (*m, i)).collect();

    let mut by_region: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
    for r in data {
        let values = by_region
            .entry(r.region_label())
            .or_insert_with(|| vec![0.0; months.len()]);
        values[col[&r.month]] += r.act_usd.unwrap_or(0.0);
    }

    let mut rows: Vec<PivotRow> = by_region
        .into_iter()
        .map(|(label, values)| PivotRow {
            label: label.to_string(),
            total: values.iter().sum(),
            values,
        })
        .collect();
    if !rows.is_empty() {
        let column_totals: Vec<f64> = (0..months.len())
            .map(|i| rows.iter().map(|r| r.values[i]).sum())
            .collect();
        rows.push(PivotRow {
            label: PIVOT_TOTAL_LABEL.to_string(),
            total: column_totals.iter().sum(),
            values: column_totals,
        });
    }
    MonthlyPivot { months, rows }
}

/// The filtered records themselves, ordered by month then point of sale.
pub fn station_details(data: &[StationRecord]) -> Vec<StationDetailRow> {
    let mut rows: Vec<StationDetailRow> = data
        .iter()
        .map(|r| StationDetailRow {
            month: r.month,
            point_of_sale: r.point_of_sale.clone(),
            region: r.region_label().to_string(),
            act_usd: r.act_usd,
            tgt_usd: r.tgt_usd,
            var_pct_vs_target: r.var_pct_vs_target,
            lyr_usd: r.lyr_usd,
            var_pct_vs_last_year: r.var_pct_vs_last_year,
            act_at_budget_rates: r.act_at_budget_rates,
            fx_gain_loss_budget: r.fx_gain_loss_budget,
            act_at_last_year_rates: r.act_at_last_year_rates,
            fx_gain_loss_last_year: r.fx_gain_loss_last_year,
            revenue_cont_pct: r.revenue_cont_pct,
            revenue_cont_pct_last_year: r.revenue_cont_pct_last_year,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then_with(|| a.point_of_sale.cmp(&b.point_of_sale))
    });
    rows
}

pub fn generate_summary(data: &[StationRecord], filters: &FilterSpec) -> SummaryStats {
    let points_of_sale: HashSet<&str> = data.iter().map(|r| r.point_of_sale.as_str()).collect();
    let total_actual_usd = sum_present(data.iter().map(|r| r.act_usd));
    let total_target_usd = sum_present(data.iter().map(|r| r.tgt_usd));
    let total_last_year_usd = sum_present(data.iter().map(|r| r.lyr_usd));
    SummaryStats {
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        filters: filters.to_string(),
        total_records: data.len(),
        total_points_of_sale: points_of_sale.len(),
        total_actual_usd,
        total_target_usd,
        total_last_year_usd,
        var_pct_vs_target: variance_pct(total_actual_usd, total_target_usd),
        var_pct_vs_last_year: variance_pct(total_actual_usd, total_last_year_usd),
        total_act_at_budget_rates: sum_present(data.iter().map(|r| r.act_at_budget_rates)),
        total_fx_gain_loss_budget: sum_present(data.iter().map(|r| r.fx_gain_loss_budget)),
        total_act_at_last_year_rates: sum_present(data.iter().map(|r| r.act_at_last_year_rates)),
        total_fx_gain_loss_last_year: sum_present(data.iter().map(|r| r.fx_gain_loss_last_year)),
    }
}
