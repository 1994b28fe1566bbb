// Month handling for station data.
//
// Station reports follow the airline fiscal year, so months order from
// April through March rather than by calendar number.
use chrono::Month;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiscalMonth(Month);

impl FiscalMonth {
    /// All twelve months in fiscal order.
    pub const ALL: [FiscalMonth; 12] = [
        FiscalMonth(Month::April),
        FiscalMonth(Month::May),
        FiscalMonth(Month::June),
        FiscalMonth(Month::July),
        FiscalMonth(Month::August),
        FiscalMonth(Month::September),
        FiscalMonth(Month::October),
        FiscalMonth(Month::November),
        FiscalMonth(Month::December),
        FiscalMonth(Month::January),
        FiscalMonth(Month::February),
        FiscalMonth(Month::March),
    ];

    /// Position within the fiscal year, April = 0 .. March = 11.
    pub fn fiscal_index(self) -> u32 {
        (self.0.number_from_month() + 8) % 12
    }

    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Calendar order, used when offering the month picker for raw exports.
    pub fn calendar() -> Vec<FiscalMonth> {
        let mut months = Self::ALL.to_vec();
        months.sort_by_key(|m| m.0.number_from_month());
        months
    }
}

impl Ord for FiscalMonth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fiscal_index().cmp(&other.fiscal_index())
    }
}

impl PartialOrd for FiscalMonth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FiscalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FiscalMonth {
    type Err = chrono::ParseMonthError;

    /// Accepts full names and three-letter abbreviations in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Month>().map(FiscalMonth)
    }
}

impl Serialize for FiscalMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
