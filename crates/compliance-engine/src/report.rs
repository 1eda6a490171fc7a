//! Result aggregation
//!
//! Fire resistance is carried in the report but never affects the overall
//! status. Issue order is height, area, then egress.

use crate::checks::Outcome;
use crate::input::NormalizedDesign;
use shared_types::{
    AreaCheck, CheckStatus, ComplianceReport, EgressReport, FireResistance, HeightCheck,
    ResolvedKeys,
};

/// Everything a single evaluation produced, before aggregation
pub struct CheckResults {
    pub height: Outcome<HeightCheck>,
    pub area: Outcome<AreaCheck>,
    pub fire_resistance: FireResistance,
    pub egress: Option<Outcome<EgressReport>>,
}

pub fn aggregate(
    edition: &str,
    design: &NormalizedDesign,
    keys: ResolvedKeys,
    results: CheckResults,
) -> ComplianceReport {
    let CheckResults {
        height,
        area,
        fire_resistance,
        egress,
    } = results;

    let egress_passed = egress
        .as_ref()
        .map_or(true, |outcome| outcome.result.status.is_pass());
    let overall_status = CheckStatus::from_passed(
        height.result.status.is_pass() && area.result.status.is_pass() && egress_passed,
    );

    let mut issues = height.issues;
    issues.extend(area.issues);
    let egress = egress.map(|outcome| {
        issues.extend(outcome.issues);
        outcome.result
    });

    ComplianceReport {
        code_edition: edition.to_string(),
        occupancy_group: design.occupancy.clone(),
        construction_type: design.construction,
        resolved_keys: keys,
        overall_status,
        height: height.result,
        area: area.result,
        fire_resistance,
        egress,
        issues,
    }
}
