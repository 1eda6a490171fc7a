//! Input and output contracts for building code compliance checks

use crate::classification::{ConstructionType, OccupancyCategory};
use serde::{Deserialize, Serialize};

// ============================================================================
// Input
// ============================================================================

/// A proposed building design submitted for review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignInput {
    pub occupancy_group: String,
    /// One of the nine canonical construction codes, any case
    pub construction_type: String,
    pub building_data: BuildingData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress_data: Option<EgressInput>,
    /// Rule table edition; the latest supported edition when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_edition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingData {
    pub stories: u32,
    pub height_m: f64,
    pub area_per_floor_sqm: f64,
    pub sprinklered: bool,
    /// Percentage of the perimeter fronting a public way (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontage_percentage: Option<f64>,
}

/// Egress data; every field is independently optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EgressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant_load: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_widths_mm: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_distances_m: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_path_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corridor_widths_mm: Option<Vec<f64>>,
}

// ============================================================================
// Statuses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, CheckStatus::Pass)
    }
}

/// Outcome of an egress sub-check; `NotChecked` when its input was absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EgressStatus {
    Pass,
    Fail,
    NotChecked,
}

impl EgressStatus {
    pub fn is_fail(&self) -> bool {
        matches!(self, EgressStatus::Fail)
    }
}

impl From<CheckStatus> for EgressStatus {
    fn from(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Pass => EgressStatus::Pass,
            CheckStatus::Fail => EgressStatus::Fail,
        }
    }
}

// ============================================================================
// Check results
// ============================================================================

/// A value reported in both unit systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub imperial: f64,
    pub metric: f64,
}

/// Allowable value of a dimensioned limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Allowance {
    NotPermitted,
    Unlimited,
    Limited(Measure),
}

/// Allowable number of stories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoryLimit {
    NotPermitted,
    Unlimited,
    Limited { stories: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightCheck {
    pub status: CheckStatus,
    /// Proposed height; imperial in feet, metric in meters
    pub proposed_height: Measure,
    pub allowable_height: Allowance,
    pub proposed_stories: u32,
    pub allowable_stories: StoryLimit,
    /// Set when the flat sprinkler increase raised either limit
    pub sprinkler_increase_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCheck {
    pub status: CheckStatus,
    /// Proposed area per floor; imperial in sqft, metric in sqm
    pub proposed_area: Measure,
    pub base_allowable_area: Allowance,
    pub allowable_area: Allowance,
    pub sprinkler_increase_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontage_increase_percent: Option<f64>,
}

/// Required fire-resistance rating of one building element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireRating {
    Hours(f64),
    HeavyTimber,
}

impl std::fmt::Display for FireRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FireRating::Hours(h) => write!(f, "{} hr", h),
            FireRating::HeavyTimber => f.write_str("HT"),
        }
    }
}

/// Fire-resistance requirements for a construction type (informational)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireResistance {
    pub construction_type: ConstructionType,
    pub structural_frame: FireRating,
    pub bearing_wall_exterior: FireRating,
    pub bearing_wall_interior: FireRating,
    pub floor: FireRating,
    pub roof: FireRating,
}

// ============================================================================
// Egress
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupantLoadSource {
    Supplied,
    Calculated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupantLoad {
    pub value: u32,
    pub source: OccupantLoadSource,
    pub category: OccupancyCategory,
    /// Square feet per occupant; present when the load was calculated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_sqft: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitCountCheck {
    pub status: EgressStatus,
    pub required: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided: Option<u32>,
}

/// Exit width check; imperial in inches, metric in millimeters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitWidthCheck {
    pub status: EgressStatus,
    pub width_per_occupant_in: f64,
    pub stairway_factor_applied: bool,
    pub required: Measure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided: Option<Measure>,
}

/// One measured value checked against a limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredEntry {
    /// 1-based position in the submitted list
    pub index: usize,
    pub value: Measure,
    pub status: CheckStatus,
}

/// Travel distance check; imperial in feet, metric in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDistanceCheck {
    pub status: EgressStatus,
    pub key: String,
    pub limit: Measure,
    pub entries: Vec<MeasuredEntry>,
}

/// Common path check; imperial in feet, metric in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonPathCheck {
    pub status: EgressStatus,
    pub group: String,
    pub limit: Measure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided: Option<Measure>,
}

/// Corridor width check; imperial in inches, metric in millimeters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorCheck {
    pub status: EgressStatus,
    pub required: Measure,
    pub entries: Vec<MeasuredEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EgressReport {
    pub status: CheckStatus,
    pub occupant_load: OccupantLoad,
    pub exits: ExitCountCheck,
    pub exit_width: ExitWidthCheck,
    pub travel_distance: TravelDistanceCheck,
    pub common_path: CommonPathCheck,
    pub corridors: CorridorCheck,
}

// ============================================================================
// Report
// ============================================================================

/// Which check produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Height,
    Stories,
    Area,
    Exits,
    ExitWidth,
    TravelDistance,
    CommonPath,
    CorridorWidth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub check: CheckKind,
    pub message: String,
}

impl Issue {
    pub fn new(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

/// Table keys derived from the occupancy group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedKeys {
    pub travel_distance_key: String,
    pub common_path_group: String,
    pub occupant_load_category: OccupancyCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub code_edition: String,
    pub occupancy_group: String,
    pub construction_type: ConstructionType,
    pub resolved_keys: ResolvedKeys,
    pub overall_status: CheckStatus,
    pub height: HeightCheck,
    pub area: AreaCheck,
    pub fire_resistance: FireResistance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress: Option<EgressReport>,
    /// Height, then area, then egress issues, in check order
    pub issues: Vec<Issue>,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.overall_status.is_pass()
    }

    /// One line per issue, for logs and quick display
    pub fn summary(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| format!("[{:?}] {}", issue.check, issue.message))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_input_minimal_json() {
        let json = r#"{
            "occupancy_group": "B",
            "construction_type": "iib",
            "building_data": {
                "stories": 3,
                "height_m": 12.0,
                "area_per_floor_sqm": 1000.0,
                "sprinklered": true
            }
        }"#;
        let input: DesignInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.building_data.stories, 3);
        assert!(input.egress_data.is_none());
        assert!(input.code_edition.is_none());
        assert!(input.building_data.frontage_percentage.is_none());
    }

    #[test]
    fn test_design_input_missing_required_field() {
        let json = r#"{
            "occupancy_group": "B",
            "construction_type": "IIB",
            "building_data": { "stories": 3, "height_m": 12.0, "sprinklered": true }
        }"#;
        let err = serde_json::from_str::<DesignInput>(json).unwrap_err();
        assert!(err.to_string().contains("area_per_floor_sqm"));
    }

    #[test]
    fn test_egress_input_partial() {
        let json = r#"{ "exit_count": 2, "travel_distances_m": [30.0, 45.5] }"#;
        let egress: EgressInput = serde_json::from_str(json).unwrap();
        assert_eq!(egress.exit_count, Some(2));
        assert_eq!(egress.travel_distances_m, Some(vec![30.0, 45.5]));
        assert!(egress.occupant_load.is_none());
        assert!(egress.corridor_widths_mm.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&CheckStatus::Pass).unwrap(), "\"PASS\"");
        assert_eq!(
            serde_json::to_string(&EgressStatus::NotChecked).unwrap(),
            "\"NOT_CHECKED\""
        );
        assert_eq!(EgressStatus::from(CheckStatus::Fail), EgressStatus::Fail);
    }

    #[test]
    fn test_allowance_serialization() {
        let limited = Allowance::Limited(Measure {
            imperial: 75.0,
            metric: 22.86,
        });
        let json = serde_json::to_value(limited).unwrap();
        assert_eq!(json["kind"], "limited");
        assert_eq!(json["imperial"], 75.0);

        let json = serde_json::to_value(StoryLimit::Unlimited).unwrap();
        assert_eq!(json["kind"], "unlimited");
    }

    #[test]
    fn test_fire_rating_display() {
        assert_eq!(FireRating::Hours(1.5).to_string(), "1.5 hr");
        assert_eq!(FireRating::HeavyTimber.to_string(), "HT");
    }
}
