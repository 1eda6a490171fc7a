//! Allowable area per floor
//!
//! Increases compound multiplicatively and in a fixed order: the sprinkler
//! multiplier first, then the frontage increase on the sprinklered value.
//! The final allowable area is floored.

use super::{missing_row, not_permitted_message, Outcome};
use crate::error::ValidationError;
use crate::input::NormalizedDesign;
use crate::tables::{FrontageIncrease, Limit, RuleTableSet};
use crate::units::{area_sqft, round2, sqft_to_sqm, sqm_to_sqft};
use shared_types::{Allowance, AreaCheck, CheckKind, CheckStatus, Issue};

/// Frontage increase in percent, or `None` below the minimum frontage ratio
pub fn frontage_increase_percent(
    frontage_percentage: f64,
    params: &FrontageIncrease,
) -> Option<f64> {
    let ratio = frontage_percentage / 100.0;
    if ratio < params.min_frontage_ratio {
        return None;
    }
    let increase = 100.0 * (ratio - params.min_frontage_ratio) / params.min_frontage_ratio;
    Some(increase.min(params.max_increase_percent))
}

pub fn check_area(
    design: &NormalizedDesign,
    tables: &RuleTableSet,
) -> Result<Outcome<AreaCheck>, ValidationError> {
    let base = tables
        .area_limit_sqft(&design.occupancy, design.construction)
        .ok_or_else(|| missing_row(design, tables))?;

    let proposed_sqft = sqm_to_sqft(design.area_per_floor_sqm);
    let proposed_area = area_sqft(proposed_sqft);

    let base_sqft = match base {
        Limit::NotPermitted => {
            return Ok(Outcome {
                result: AreaCheck {
                    status: CheckStatus::Fail,
                    proposed_area,
                    base_allowable_area: Allowance::NotPermitted,
                    allowable_area: Allowance::NotPermitted,
                    sprinkler_increase_applied: false,
                    frontage_increase_percent: None,
                },
                issues: vec![Issue::new(
                    CheckKind::Area,
                    not_permitted_message(design, "area"),
                )],
            });
        }
        Limit::Unlimited => {
            return Ok(Outcome {
                result: AreaCheck {
                    status: CheckStatus::Pass,
                    proposed_area,
                    base_allowable_area: Allowance::Unlimited,
                    allowable_area: Allowance::Unlimited,
                    sprinkler_increase_applied: false,
                    frontage_increase_percent: None,
                },
                issues: Vec::new(),
            });
        }
        Limit::Limited(sqft) => sqft,
    };

    let mut allowable = base_sqft;
    if design.sprinklered {
        allowable *= tables.sprinkler.area_multiplier;
    }
    let frontage_increase = design
        .frontage_percentage
        .and_then(|pct| frontage_increase_percent(pct, &tables.frontage));
    if let Some(increase) = frontage_increase {
        allowable *= 1.0 + increase / 100.0;
    }
    let allowable = allowable.floor();

    tracing::debug!(
        occupancy = %design.occupancy,
        construction = %design.construction,
        base_sqft,
        allowable,
        ?frontage_increase,
        "area check"
    );

    let mut issues = Vec::new();
    if proposed_sqft > allowable {
        issues.push(Issue::new(
            CheckKind::Area,
            format!(
                "Floor area {:.2} sqft ({:.2} sqm) exceeds allowable {:.2} sqft ({:.2} sqm) for {} in Type {} construction",
                proposed_sqft,
                design.area_per_floor_sqm,
                allowable,
                sqft_to_sqm(allowable),
                design.occupancy,
                design.construction
            ),
        ));
    }

    Ok(Outcome {
        result: AreaCheck {
            status: CheckStatus::from_passed(issues.is_empty()),
            proposed_area,
            base_allowable_area: Allowance::Limited(area_sqft(base_sqft)),
            allowable_area: Allowance::Limited(area_sqft(allowable)),
            sprinkler_increase_applied: design.sprinklered,
            frontage_increase_percent: frontage_increase.map(round2),
        },
        issues,
    })
}
