//! Serialized layout of a rule table document
//!
//! These types mirror the JSON exactly and are only used to parse it;
//! [`super::RuleTableSet::from_document`] turns them into checked tables.

use serde::Deserialize;
use shared_types::{ConstructionType, OccupancyCategory};
use std::collections::BTreeMap;

/// A table cell: a number, or a text sentinel such as "UL" or "HT"
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCell {
    Number(f64),
    Text(String),
}

/// One occupancy row keyed by construction type
pub(crate) type RawRow = BTreeMap<ConstructionType, RawCell>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawDocument {
    pub edition: String,
    pub units: String,
    pub unlimited_sentinel: String,
    pub allowable_height_ft: BTreeMap<String, RawRow>,
    pub allowable_stories: BTreeMap<String, RawRow>,
    pub allowable_area_sqft: BTreeMap<String, RawRow>,
    pub fire_resistance_hours: BTreeMap<ConstructionType, RawFireElements>,
    pub occupant_load_factors: BTreeMap<OccupancyCategory, f64>,
    pub egress: RawEgress,
    pub sprinkler_increase: RawSprinklerIncrease,
    pub frontage_increase: RawFrontageIncrease,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawFireElements {
    pub structural_frame: RawCell,
    pub bearing_wall_exterior: RawCell,
    pub bearing_wall_interior: RawCell,
    pub floor: RawCell,
    pub roof: RawCell,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawEgress {
    pub exit_width_per_occupant_in: RawExitWidthFactors,
    pub minimum_exit_width_in: f64,
    pub minimum_corridor_width_in: RawCorridorWidths,
    pub low_occupancy_threshold: u32,
    pub max_travel_distance_ft: RawBySprinkler<BTreeMap<String, f64>>,
    pub max_common_path_ft: RawBySprinkler<RawCommonPathGroups>,
    pub exit_count_bands: Vec<RawExitBand>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawExitWidthFactors {
    pub stairway: f64,
    pub other: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawCorridorWidths {
    pub low_occupancy: f64,
    pub standard: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawBySprinkler<T> {
    pub sprinklered: T,
    pub unsprinklered: T,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawCommonPathGroups {
    #[serde(rename = "B_F_S")]
    pub business_factory_storage: f64,
    #[serde(rename = "I-1_R")]
    pub residential: f64,
    pub default: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawExitBand {
    pub max_occupant_load: Option<u32>,
    pub exits: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSprinklerIncrease {
    pub height_ft: f64,
    pub stories: u32,
    pub area_multiplier: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawFrontageIncrease {
    pub max_increase_percent: f64,
    pub min_frontage_ratio: f64,
}
