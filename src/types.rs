use crate::month::FiscalMonth;
use crate::region::Region;
use crate::util::{display_opt_pct, display_opt_usd, display_pct, display_usd};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const COL_POS: &str = "POINT OF SALE";
pub const COL_REGION: &str = "Region";
pub const COL_MONTH: &str = "Month";
pub const COL_ACT_USD: &str = "ACT -USD";
pub const COL_TGT_USD: &str = "TGT-USD";
pub const COL_LYR_USD: &str = "LYR-USD (2023/24)";
pub const COL_FX_BUDGET: &str = "Exchange - gain/( loss)";
pub const COL_FX_LAST_YEAR: &str = "Exchange  -gain/(loss)";

/// Columns the dashboard cannot work without. Header names are compared
/// after trimming surrounding whitespace.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_POS,
    COL_MONTH,
    COL_ACT_USD,
    COL_TGT_USD,
    COL_LYR_USD,
    COL_FX_BUDGET,
    COL_FX_LAST_YEAR,
];

/// One row of the station dataset as it appears in the file.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "POINT OF SALE")]
    pub point_of_sale: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "ACT -USD")]
    pub act_usd: Option<String>,
    #[serde(rename = "TGT-USD")]
    pub tgt_usd: Option<String>,
    #[serde(rename = "VAR %-USD (ACT vsTGT)")]
    pub var_pct_vs_target: Option<String>,
    #[serde(rename = "LYR-USD (2023/24)")]
    pub lyr_usd: Option<String>,
    #[serde(rename = "VAR %-USD (ACT vs LYR)")]
    pub var_pct_vs_last_year: Option<String>,
    #[serde(rename = "Act. Using-Bgt. ex. Rates")]
    pub act_at_budget_rates: Option<String>,
    #[serde(rename = "Exchange - gain/( loss)")]
    pub fx_gain_loss_budget: Option<String>,
    #[serde(rename = "Act. Using- LY. Ex. Rates")]
    pub act_at_last_year_rates: Option<String>,
    #[serde(rename = "Exchange  -gain/(loss)")]
    pub fx_gain_loss_last_year: Option<String>,
    #[serde(rename = "REVENUE CONT. % - Actual")]
    pub revenue_cont_pct: Option<String>,
    #[serde(rename = "REVENUE CONT. %-LYR")]
    pub revenue_cont_pct_last_year: Option<String>,
}

/// A cleaned station record: one point of sale for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub point_of_sale: String,
    pub region: Option<Region>,
    pub month: FiscalMonth,
    pub act_usd: Option<f64>,
    pub tgt_usd: Option<f64>,
    pub lyr_usd: Option<f64>,
    pub var_pct_vs_target: Option<f64>,
    pub var_pct_vs_last_year: Option<f64>,
    pub act_at_budget_rates: Option<f64>,
    pub fx_gain_loss_budget: Option<f64>,
    pub act_at_last_year_rates: Option<f64>,
    pub fx_gain_loss_last_year: Option<f64>,
    pub revenue_cont_pct: Option<f64>,
    pub revenue_cont_pct_last_year: Option<f64>,
}

impl StationRecord {
    pub fn region_label(&self) -> &'static str {
        self.region.map(Region::label).unwrap_or(UNASSIGNED_REGION)
    }
}

pub const UNASSIGNED_REGION: &str = "UNASSIGNED";

/// Long-format row for the revenue line chart.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RevenueTrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: FiscalMonth,
    #[serde(rename = "Revenue Type")]
    #[tabled(rename = "Revenue Type")]
    pub revenue_type: String,
    #[serde(rename = "Revenue (USD)")]
    #[tabled(rename = "Revenue (USD)", display_with = "display_usd")]
    pub revenue: f64,
}

/// Long-format row for the exchange gain/loss bar chart.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct ExchangeTrendRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: FiscalMonth,
    #[serde(rename = "Exchange Rate Type")]
    #[tabled(rename = "Exchange Rate Type")]
    pub exchange_type: String,
    #[serde(rename = "Gain/Loss (USD)")]
    #[tabled(rename = "Gain/Loss (USD)", display_with = "display_usd")]
    pub gain_loss: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RegionShareRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
    #[serde(rename = "ACT -USD")]
    #[tabled(rename = "ACT -USD", display_with = "display_usd")]
    pub actual: f64,
    #[serde(rename = "TGT-USD")]
    #[tabled(rename = "TGT-USD", display_with = "display_usd")]
    pub target: f64,
    #[serde(rename = "LYR-USD (2023/24)")]
    #[tabled(rename = "LYR-USD (2023/24)", display_with = "display_usd")]
    pub last_year: f64,
    #[serde(rename = "VAR % (ACT vs TGT)")]
    #[tabled(rename = "VAR % (ACT vs TGT)", display_with = "display_opt_pct")]
    pub var_pct_vs_target: Option<f64>,
    #[serde(rename = "VAR % (ACT vs LYR)")]
    #[tabled(rename = "VAR % (ACT vs LYR)", display_with = "display_opt_pct")]
    pub var_pct_vs_last_year: Option<f64>,
    #[serde(rename = "Revenue Share %")]
    #[tabled(rename = "Revenue Share %", display_with = "display_pct")]
    pub share_pct: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct PosRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "POINT OF SALE")]
    #[tabled(rename = "POINT OF SALE")]
    pub point_of_sale: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "ACT -USD")]
    #[tabled(rename = "ACT -USD", display_with = "display_usd")]
    pub actual: f64,
    #[serde(rename = "TGT-USD")]
    #[tabled(rename = "TGT-USD", display_with = "display_usd")]
    pub target: f64,
    #[serde(rename = "Achievement %")]
    #[tabled(rename = "Achievement %", display_with = "display_opt_pct")]
    pub achievement_pct: Option<f64>,
    #[serde(rename = "VAR % (ACT vs LYR)")]
    #[tabled(rename = "VAR % (ACT vs LYR)", display_with = "display_opt_pct")]
    pub var_pct_vs_last_year: Option<f64>,
}

/// A filtered record as shown in the detail table.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StationDetailRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: FiscalMonth,
    #[serde(rename = "POINT OF SALE")]
    #[tabled(rename = "POINT OF SALE")]
    pub point_of_sale: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "ACT -USD")]
    #[tabled(rename = "ACT -USD", display_with = "display_opt_usd")]
    pub act_usd: Option<f64>,
    #[serde(rename = "TGT-USD")]
    #[tabled(rename = "TGT-USD", display_with = "display_opt_usd")]
    pub tgt_usd: Option<f64>,
    #[serde(rename = "VAR %-USD (ACT vsTGT)")]
    #[tabled(rename = "VAR % TGT", display_with = "display_opt_pct")]
    pub var_pct_vs_target: Option<f64>,
    #[serde(rename = "LYR-USD (2023/24)")]
    #[tabled(rename = "LYR-USD", display_with = "display_opt_usd")]
    pub lyr_usd: Option<f64>,
    #[serde(rename = "VAR %-USD (ACT vs LYR)")]
    #[tabled(rename = "VAR % LYR", display_with = "display_opt_pct")]
    pub var_pct_vs_last_year: Option<f64>,
    #[serde(rename = "Act. Using-Bgt. ex. Rates")]
    #[tabled(skip)]
    pub act_at_budget_rates: Option<f64>,
    #[serde(rename = "Exchange - gain/( loss)")]
    #[tabled(rename = "FX vs Bgt", display_with = "display_opt_usd")]
    pub fx_gain_loss_budget: Option<f64>,
    #[serde(rename = "Act. Using- LY. Ex. Rates")]
    #[tabled(skip)]
    pub act_at_last_year_rates: Option<f64>,
    #[serde(rename = "Exchange  -gain/(loss)")]
    #[tabled(rename = "FX vs LY", display_with = "display_opt_usd")]
    pub fx_gain_loss_last_year: Option<f64>,
    #[serde(rename = "REVENUE CONT. % - Actual")]
    #[tabled(rename = "Cont. %", display_with = "display_opt_pct")]
    pub revenue_cont_pct: Option<f64>,
    #[serde(rename = "REVENUE CONT. %-LYR")]
    #[tabled(rename = "Cont. % LYR", display_with = "display_opt_pct")]
    pub revenue_cont_pct_last_year: Option<f64>,
}

/// Region × month pivot of actual revenue. Months are the fiscal months
/// present in the data, in fiscal order.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPivot {
    pub months: Vec<FiscalMonth>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub label: String,
    pub values: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: String,
    pub filters: String,
    pub total_records: usize,
    pub total_points_of_sale: usize,
    pub total_actual_usd: f64,
    pub total_target_usd: f64,
    pub total_last_year_usd: f64,
    pub var_pct_vs_target: Option<f64>,
    pub var_pct_vs_last_year: Option<f64>,
    pub total_act_at_budget_rates: f64,
    pub total_fx_gain_loss_budget: f64,
    pub total_act_at_last_year_rates: f64,
    pub total_fx_gain_loss_last_year: f64,
}
