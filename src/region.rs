// Point-of-sale to region classification.
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    FarEast,
    Europe,
    SriLanka,
    India,
    MiddleEastAndSouthAfrica,
    Isc,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::FarEast,
        Region::Europe,
        Region::SriLanka,
        Region::India,
        Region::MiddleEastAndSouthAfrica,
        Region::Isc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::FarEast => "FAR EAST",
            Region::Europe => "EUROPE",
            Region::SriLanka => "SRI LANKA",
            Region::India => "INDIA",
            Region::MiddleEastAndSouthAfrica => "M. EAST AND S. AFRICA",
            Region::Isc => "ISC",
        }
    }

    /// Points of sale belonging to this region.
    pub fn points_of_sale(self) -> &'static [&'static str] {
        match self {
            Region::FarEast => FAR_EAST,
            Region::Europe => EUROPE,
            Region::SriLanka => SRI_LANKA,
            Region::India => INDIA,
            Region::MiddleEastAndSouthAfrica => M_EAST_AND_AFRICA,
            Region::Isc => ISC,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown region '{s}'"))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

const FAR_EAST: &[&str] = &[
    "AUSTRALIA", "CHINA EAST", "CHINA REST", "CHINA SOUTH", "HONG KONG", "INDONESIA", "JAPAN",
    "MALAYSIA", "NEW ZEALAND", "PHILIPPINES", "SINGAPORE", "SOUTH KOREA", "TAIWAN", "THAILAND",
    "UNION OF MYANMAR", "VIETNAM",
];

const EUROPE: &[&str] = &[
    "AUSTRIA", "BELGIUM", "CANADA", "CYPRUS", "CZECH REPUBLIC", "DENMARK", "FINLAND", "FRANCE",
    "GERMANY", "GREECE", "ICELAND", "IRELAND", "ISRAEL", "ITALY", "LUXEMBOURG", "NETHERLANDS",
    "NORWAY", "POLAND", "PORTUGAL", "RUSSIAN FEDERATION", "SLOVAKIA", "SPAIN", "SWEDEN",
    "SWITZERLAND", "TURKEY", "UNITED KINGDOM", "UNITED STATES OF AMERICA",
];

const SRI_LANKA: &[&str] = &["SRI LANKA"];

const INDIA: &[&str] = &[
    "INDIA AHMEDABAD", "INDIA GOA", "INDIA HYDERABAD", "INDIA VISHAKHAPATNAM", "INDIA KARNATAKA",
    "INDIA KERALA - COCHIN", "INDIA KERALA CALICUT", "INDIA EASTERN KOLKATA", "INDIA NORTHERN",
    "INDIA TAMILNADU - CHENNAI", "INDIA TAMILNADU COIMBATORE", "INDIA TAMILNADU-MADURAI",
    "INDIA TAMILNADU TIRICHI", "INDIA TRIVANDRUM", "INDIA WESTERN",
];

// Exports spell the Dubai stations in mixed case.
const M_EAST_AND_AFRICA: &[&str] = &[
    "ABU DHABI & AL AIN", "Dubai", "Dubai - SHARJAH", "Dubai - NORTHERN EMIRATES", "BAHRAIN",
    "KUWAIT", "OMAN", "QATAR", "SEYCHELLES", "SAUDI CENTRAL", "SAUDI EASTERN", "SAUDI JEDDAH",
    "SOUTH AFRICA",
];

const ISC: &[&str] = &[
    "BANGLADESH", "NEPAL", "PAKISTAN-LAHORE", "PAKISTAN-KARACHI", "MALDIVES-GAN", "MALDIVES-MALE",
];

static LOOKUP: Lazy<HashMap<&'static str, Region>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for region in Region::ALL {
        for pos in region.points_of_sale() {
            map.insert(*pos, region);
        }
    }
    map
});

/// Map a point of sale to its region. Matching is exact apart from
/// surrounding whitespace; unknown stations have no region.
pub fn classify(point_of_sale: &str) -> Option<Region> {
    LOOKUP.get(point_of_sale.trim()).copied()
}
