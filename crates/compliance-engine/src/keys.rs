//! Occupancy key resolution
//!
//! Maps a caller's occupancy group onto the keys the egress tables use.
//! These mappings are fixed by the code tables; fallbacks are named
//! constants so every default is visible in one place.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{OccupancyCategory, ResolvedKeys};

lazy_static! {
    /// Residential subtypes share one travel distance row
    static ref RESIDENTIAL_SUBTYPE: Regex = Regex::new(r"^R-[1-4]$").unwrap();

    /// Assembly subtypes share one travel distance row
    static ref ASSEMBLY_SUBTYPE: Regex = Regex::new(r"^A-[1-5]$").unwrap();
}

/// Common path group for business, factory and storage occupancies
pub const COMMON_PATH_GROUP_B_F_S: &str = "B_F_S";
/// Common path group for residential occupancies and I-1
pub const COMMON_PATH_GROUP_I1_R: &str = "I-1_R";
/// Common path group for everything else
pub const COMMON_PATH_GROUP_DEFAULT: &str = "default";

/// Category used when no occupancy prefix matches
pub const DEFAULT_OCCUPANCY_CATEGORY: OccupancyCategory = OccupancyCategory::Business;

/// Occupancy prefixes in match order; more specific prefixes first
const CATEGORY_PREFIXES: &[(&str, OccupancyCategory)] = &[
    ("A", OccupancyCategory::Assembly),
    ("B", OccupancyCategory::Business),
    ("E", OccupancyCategory::Educational),
    ("F", OccupancyCategory::Industrial),
    ("H", OccupancyCategory::Industrial),
    ("M", OccupancyCategory::Mercantile),
    ("R", OccupancyCategory::Residential),
    ("S-1", OccupancyCategory::Warehouse),
    ("S", OccupancyCategory::Storage),
];

/// Trim and uppercase a caller-supplied occupancy group
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Travel distance table key: R-1..R-4 collapse to "R", A-1..A-5 to "A"
pub fn travel_distance_key(occupancy: &str) -> String {
    if RESIDENTIAL_SUBTYPE.is_match(occupancy) {
        "R".to_string()
    } else if ASSEMBLY_SUBTYPE.is_match(occupancy) {
        "A".to_string()
    } else {
        occupancy.to_string()
    }
}

/// Common path of egress travel group
pub fn common_path_group(occupancy: &str) -> &'static str {
    if occupancy == "B" || occupancy.starts_with('F') || occupancy.starts_with('S') {
        COMMON_PATH_GROUP_B_F_S
    } else if occupancy.starts_with('R') || occupancy == "I-1" {
        COMMON_PATH_GROUP_I1_R
    } else {
        COMMON_PATH_GROUP_DEFAULT
    }
}

/// Occupant load factor category, by occupancy prefix
pub fn occupant_load_category(occupancy: &str) -> OccupancyCategory {
    CATEGORY_PREFIXES
        .iter()
        .find(|(prefix, _)| occupancy.starts_with(prefix))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_OCCUPANCY_CATEGORY)
}

/// Resolve every derived key for a normalized occupancy group
pub fn resolve(occupancy: &str) -> ResolvedKeys {
    ResolvedKeys {
        travel_distance_key: travel_distance_key(occupancy),
        common_path_group: common_path_group(occupancy).to_string(),
        occupant_load_category: occupant_load_category(occupancy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  r-2 "), "R-2");
        assert_eq!(normalize("b"), "B");
    }

    #[test]
    fn test_travel_distance_key_collapses_subtypes() {
        assert_eq!(travel_distance_key("R-2"), "R");
        assert_eq!(travel_distance_key("R-4"), "R");
        assert_eq!(travel_distance_key("A-1"), "A");
        assert_eq!(travel_distance_key("A-5"), "A");
        assert_eq!(travel_distance_key("B"), "B");
        assert_eq!(travel_distance_key("S-1"), "S-1");
        // Outside the defined subtype ranges
        assert_eq!(travel_distance_key("A-6"), "A-6");
        assert_eq!(travel_distance_key("R-12"), "R-12");
    }

    #[test]
    fn test_common_path_groups() {
        assert_eq!(common_path_group("B"), "B_F_S");
        assert_eq!(common_path_group("F-1"), "B_F_S");
        assert_eq!(common_path_group("S-2"), "B_F_S");
        assert_eq!(common_path_group("R-2"), "I-1_R");
        assert_eq!(common_path_group("I-1"), "I-1_R");
        assert_eq!(common_path_group("I-2"), "default");
        assert_eq!(common_path_group("A-1"), "default");
        assert_eq!(common_path_group("M"), "default");
    }

    #[test]
    fn test_occupant_load_categories() {
        assert_eq!(occupant_load_category("A-2"), OccupancyCategory::Assembly);
        assert_eq!(occupant_load_category("B"), OccupancyCategory::Business);
        assert_eq!(occupant_load_category("E"), OccupancyCategory::Educational);
        assert_eq!(occupant_load_category("F-1"), OccupancyCategory::Industrial);
        assert_eq!(occupant_load_category("M"), OccupancyCategory::Mercantile);
        assert_eq!(occupant_load_category("R-3"), OccupancyCategory::Residential);
        assert_eq!(occupant_load_category("S-1"), OccupancyCategory::Warehouse);
        assert_eq!(occupant_load_category("S-2"), OccupancyCategory::Storage);
    }

    #[test]
    fn test_occupant_load_category_default() {
        assert_eq!(occupant_load_category("I-2"), DEFAULT_OCCUPANCY_CATEGORY);
        assert_eq!(occupant_load_category("U"), OccupancyCategory::Business);
    }

    #[test]
    fn test_resolve_scenarios() {
        let a1 = resolve("A-1");
        assert_eq!(a1.travel_distance_key, "A");
        assert_eq!(a1.common_path_group, "default");

        let r2 = resolve("R-2");
        assert_eq!(r2.travel_distance_key, "R");
        assert_eq!(r2.common_path_group, "I-1_R");
        assert_eq!(r2.occupant_load_category, OccupancyCategory::Residential);
    }
}
