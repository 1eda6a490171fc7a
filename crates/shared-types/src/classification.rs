//! Building classification types
//!
//! Construction type selects the table column, occupancy selects the row.
//! Occupancy groups stay free-form strings ("B", "R-2", "A-1") because the
//! rule tables decide which ones exist; construction types are a closed set.

use serde::{Deserialize, Serialize};

/// Construction types recognized by the building code tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConstructionType {
    // Type I: noncombustible, protected
    IA,
    IB,
    // Type II: noncombustible
    IIA,
    IIB,
    // Type III: noncombustible exterior walls
    IIIA,
    IIIB,
    // Type IV: heavy timber
    IV,
    // Type V: any permitted material
    VA,
    VB,
}

impl ConstructionType {
    /// Every canonical construction type, in table column order
    pub const ALL: [ConstructionType; 9] = [
        ConstructionType::IA,
        ConstructionType::IB,
        ConstructionType::IIA,
        ConstructionType::IIB,
        ConstructionType::IIIA,
        ConstructionType::IIIB,
        ConstructionType::IV,
        ConstructionType::VA,
        ConstructionType::VB,
    ];

    /// Canonical table code
    pub fn code(&self) -> &'static str {
        match self {
            ConstructionType::IA => "IA",
            ConstructionType::IB => "IB",
            ConstructionType::IIA => "IIA",
            ConstructionType::IIB => "IIB",
            ConstructionType::IIIA => "IIIA",
            ConstructionType::IIIB => "IIIB",
            ConstructionType::IV => "IV",
            ConstructionType::VA => "VA",
            ConstructionType::VB => "VB",
        }
    }

    /// Parse a canonical code (case-insensitive, surrounding whitespace ignored)
    ///
    /// Anything other than the nine canonical codes is rejected rather than
    /// coerced: "II-B", "Type IIB" and "5B" all return `None`.
    pub fn parse_code(s: &str) -> Option<Self> {
        let code = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|ct| ct.code() == code)
    }
}

impl std::fmt::Display for ConstructionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Occupant load factor categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyCategory {
    Assembly,
    Business,
    Educational,
    Industrial,
    Residential,
    Mercantile,
    Storage,
    Warehouse,
}

impl OccupancyCategory {
    pub fn name(&self) -> &'static str {
        match self {
            OccupancyCategory::Assembly => "assembly",
            OccupancyCategory::Business => "business",
            OccupancyCategory::Educational => "educational",
            OccupancyCategory::Industrial => "industrial",
            OccupancyCategory::Residential => "residential",
            OccupancyCategory::Mercantile => "mercantile",
            OccupancyCategory::Storage => "storage",
            OccupancyCategory::Warehouse => "warehouse",
        }
    }
}

impl std::fmt::Display for OccupancyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
