use crate::month::FiscalMonth;
use crate::region::Region;
use crate::types::StationRecord;
use std::collections::BTreeSet;
use std::fmt;

/// Current selection for each filterable column. `None` means "All", i.e.
/// no constraint on that column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub point_of_sale: Option<String>,
    pub region: Option<Region>,
    pub month: Option<FiscalMonth>,
}

impl FilterSpec {
    pub fn is_unfiltered(&self) -> bool {
        self.point_of_sale.is_none() && self.region.is_none() && self.month.is_none()
    }

    /// A record passes when it matches every active selection.
    pub fn matches(&self, record: &StationRecord) -> bool {
        if let Some(pos) = &self.point_of_sale {
            if &record.point_of_sale != pos {
                return false;
            }
        }
        if let Some(region) = self.region {
            if record.region != Some(region) {
                return false;
            }
        }
        if let Some(month) = self.month {
            if record.month != month {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "POS: {}, Region: {}, Month: {}",
            self.point_of_sale.as_deref().unwrap_or("All"),
            self.region.map(Region::label).unwrap_or("All"),
            self.month.map(FiscalMonth::name).unwrap_or("All"),
        )
    }
}

pub fn apply_filters(records: &[StationRecord], spec: &FilterSpec) -> Vec<StationRecord> {
    records.iter().filter(|r| spec.matches(r)).cloned().collect()
}

/// Values offered for each filter, as presented in the selection menu.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub points_of_sale: Vec<String>,
    pub regions: Vec<Region>,
    pub months: Vec<FiscalMonth>,
}

/// Points of sale and regions come from the data (sorted, unique); months
/// are every fiscal month in fiscal order.
pub fn filter_options(records: &[StationRecord]) -> FilterOptions {
    let points_of_sale: BTreeSet<&str> = records.iter().map(|r| r.point_of_sale.as_str()).collect();
    let mut regions: Vec<Region> = records
        .iter()
        .filter_map(|r| r.region)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    regions.sort_by_key(|r| r.label());
    FilterOptions {
        points_of_sale: points_of_sale.into_iter().map(str::to_string).collect(),
        regions,
        months: FiscalMonth::ALL.to_vec(),
    }
}
