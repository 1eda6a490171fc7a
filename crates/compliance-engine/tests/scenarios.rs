//! End-to-end evaluations against the embedded IBC-2021 edition

use compliance_engine::{ComplianceEngine, EngineError, TableStore, ValidationError};
use pretty_assertions::assert_eq;
use shared_types::{
    Allowance, CheckKind, CheckStatus, DesignInput, EgressStatus, Measure, OccupancyCategory,
    OccupantLoadSource, StoryLimit,
};
use std::sync::Arc;

fn engine() -> ComplianceEngine {
    ComplianceEngine::new(Arc::new(TableStore::embedded()))
}

fn parse(json: &str) -> DesignInput {
    serde_json::from_str(json).expect("valid design document")
}

#[test]
fn business_iib_sprinklered_uses_both_increases() {
    let input = parse(
        r#"{
            "occupancy_group": "B",
            "construction_type": "IIB",
            "building_data": {
                "stories": 3,
                "height_m": 12,
                "area_per_floor_sqm": 1000,
                "sprinklered": true
            }
        }"#,
    );

    let report = engine().evaluate(&input).unwrap();

    assert_eq!(report.overall_status, CheckStatus::Pass);
    // 55 ft + 20 ft flat increase, 3 + 1 stories
    assert_eq!(
        report.height.allowable_height,
        Allowance::Limited(Measure {
            imperial: 75.0,
            metric: 22.86
        })
    );
    assert_eq!(report.height.allowable_stories, StoryLimit::Limited { stories: 4 });
    assert!(report.height.sprinkler_increase_applied);
    // 23,000 sqft tripled
    assert_eq!(
        report.area.base_allowable_area,
        Allowance::Limited(Measure {
            imperial: 23000.0,
            metric: 2136.77
        })
    );
    match report.area.allowable_area {
        Allowance::Limited(m) => assert_eq!(m.imperial, 69000.0),
        other => panic!("expected a limited area, got {:?}", other),
    }
    assert!(report.egress.is_none());
    assert!(report.issues.is_empty());
}

#[test]
fn occupancy_keys_resolve_for_assembly_and_residential() {
    let engine = engine();

    let a1 = parse(
        r#"{
            "occupancy_group": "a-1",
            "construction_type": "IA",
            "building_data": { "stories": 1, "height_m": 8, "area_per_floor_sqm": 400, "sprinklered": true }
        }"#,
    );
    let report = engine.evaluate(&a1).unwrap();
    assert_eq!(report.occupancy_group, "A-1");
    assert_eq!(report.resolved_keys.travel_distance_key, "A");
    assert_eq!(report.resolved_keys.common_path_group, "default");
    assert_eq!(report.resolved_keys.occupant_load_category, OccupancyCategory::Assembly);

    let r2 = parse(
        r#"{
            "occupancy_group": "R-2",
            "construction_type": "VA",
            "building_data": { "stories": 3, "height_m": 10, "area_per_floor_sqm": 800, "sprinklered": true }
        }"#,
    );
    let report = engine.evaluate(&r2).unwrap();
    assert_eq!(report.resolved_keys.travel_distance_key, "R");
    assert_eq!(report.resolved_keys.common_path_group, "I-1_R");
    assert_eq!(report.resolved_keys.occupant_load_category, OccupancyCategory::Residential);
}

#[test]
fn egress_occupant_load_calculated_from_area() {
    let input = parse(
        r#"{
            "occupancy_group": "B",
            "construction_type": "IIB",
            "building_data": { "stories": 2, "height_m": 8, "area_per_floor_sqm": 500, "sprinklered": true },
            "egress_data": {}
        }"#,
    );

    let report = engine().evaluate(&input).unwrap();
    let egress = report.egress.expect("egress report");

    // ceil(500 * 10.7639 * 2 / 150) = ceil(71.76)
    assert_eq!(egress.occupant_load.value, 72);
    assert_eq!(egress.occupant_load.source, OccupantLoadSource::Calculated);
    assert_eq!(egress.exits.status, EgressStatus::NotChecked);
    assert_eq!(egress.exit_width.status, EgressStatus::NotChecked);
    assert_eq!(egress.travel_distance.status, EgressStatus::NotChecked);
    assert_eq!(egress.common_path.status, EgressStatus::NotChecked);
    assert_eq!(egress.corridors.status, EgressStatus::NotChecked);
    assert_eq!(egress.status, CheckStatus::Pass);
    assert_eq!(report.overall_status, CheckStatus::Pass);
}

#[test]
fn unsupported_construction_type_is_rejected_before_tables_load() {
    let input = parse(
        r#"{
            "occupancy_group": "B",
            "construction_type": "ZZ",
            "building_data": { "stories": 1, "height_m": 4, "area_per_floor_sqm": 100, "sprinklered": false }
        }"#,
    );

    let engine = engine();
    let err = engine.evaluate(&input).unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation(ValidationError::UnsupportedConstructionType("ZZ".to_string()))
    );
    assert!(engine.store().cached_editions().is_empty());
}

#[test]
fn not_permitted_combination_fails_with_issue() {
    let input = parse(
        r#"{
            "occupancy_group": "H-1",
            "construction_type": "VB",
            "building_data": { "stories": 1, "height_m": 4, "area_per_floor_sqm": 50, "sprinklered": true }
        }"#,
    );

    let report = engine().evaluate(&input).unwrap();

    assert_eq!(report.overall_status, CheckStatus::Fail);
    assert_eq!(report.height.allowable_height, Allowance::NotPermitted);
    assert_eq!(report.area.allowable_area, Allowance::NotPermitted);
    let kinds: Vec<CheckKind> = report.issues.iter().map(|i| i.check).collect();
    assert_eq!(kinds, vec![CheckKind::Height, CheckKind::Area]);
    assert!(report.issues.iter().all(|i| i.message.contains("not permitted")));
}

#[test]
fn failing_design_reports_issues_in_check_order() {
    let input = parse(
        r#"{
            "occupancy_group": "M",
            "construction_type": "VB",
            "building_data": { "stories": 3, "height_m": 14, "area_per_floor_sqm": 1200, "sprinklered": false },
            "egress_data": {
                "occupant_load": 700,
                "exit_count": 2,
                "travel_distances_m": [40, 70],
                "corridor_widths_mm": [1200, 1000]
            }
        }"#,
    );

    let report = engine().evaluate(&input).unwrap();

    assert_eq!(report.overall_status, CheckStatus::Fail);
    let kinds: Vec<CheckKind> = report.issues.iter().map(|i| i.check).collect();
    assert_eq!(
        kinds,
        vec![
            CheckKind::Height,
            CheckKind::Stories,
            CheckKind::Area,
            CheckKind::Exits,
            CheckKind::TravelDistance,
            CheckKind::CorridorWidth,
        ]
    );

    let egress = report.egress.expect("egress report");
    assert_eq!(egress.exits.required, 3);
    assert_eq!(egress.exit_width.status, EgressStatus::NotChecked);
    assert_eq!(egress.common_path.status, EgressStatus::NotChecked);
    assert_eq!(egress.travel_distance.entries.len(), 2);
    assert_eq!(egress.travel_distance.entries[0].status, CheckStatus::Pass);
    assert_eq!(egress.travel_distance.entries[1].status, CheckStatus::Fail);
}

#[test]
fn report_serializes_with_wire_names() {
    let input = parse(
        r#"{
            "occupancy_group": "S-1",
            "construction_type": "iv",
            "building_data": { "stories": 2, "height_m": 9, "area_per_floor_sqm": 2000, "sprinklered": true },
            "egress_data": { "exit_count": 2 }
        }"#,
    );

    let report = engine().evaluate(&input).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["construction_type"], "IV");
    assert_eq!(json["overall_status"], "PASS");
    assert_eq!(json["egress"]["common_path"]["status"], "NOT_CHECKED");
    assert_eq!(json["fire_resistance"]["structural_frame"], "heavy_timber");
}

#[test]
fn explicit_unknown_edition_is_never_substituted() {
    let input = parse(
        r#"{
            "occupancy_group": "B",
            "construction_type": "IIB",
            "building_data": { "stories": 1, "height_m": 4, "area_per_floor_sqm": 100, "sprinklered": false },
            "code_edition": "IBC-2015"
        }"#,
    );

    let err = engine().evaluate(&input).unwrap_err();
    assert_eq!(err.to_string(), "No rule tables found for edition 'IBC-2015'");
}
