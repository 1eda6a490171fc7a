//! Allowable building height and number of stories
//!
//! The sprinkler increase here is a flat addition to each limit, applied
//! independently to height and to stories.

use super::{missing_row, not_permitted_message, Outcome};
use crate::error::ValidationError;
use crate::input::NormalizedDesign;
use crate::tables::{Limit, RuleTableSet};
use crate::units::{feet_to_meters, length_ft, meters_to_feet};
use shared_types::{Allowance, CheckKind, CheckStatus, HeightCheck, Issue, StoryLimit};

pub fn check_height(
    design: &NormalizedDesign,
    tables: &RuleTableSet,
) -> Result<Outcome<HeightCheck>, ValidationError> {
    let base_height = tables
        .height_limit_ft(&design.occupancy, design.construction)
        .ok_or_else(|| missing_row(design, tables))?;
    let base_stories = tables
        .stories_limit(&design.occupancy, design.construction)
        .ok_or_else(|| missing_row(design, tables))?;

    let proposed_ft = meters_to_feet(design.height_m);
    let proposed_height = length_ft(proposed_ft);

    // NP short-circuits before any increase is considered
    if base_height == Limit::NotPermitted || base_stories == Limit::NotPermitted {
        let what = if base_height == Limit::NotPermitted {
            "height"
        } else {
            "number of stories"
        };
        tracing::debug!(
            occupancy = %design.occupancy,
            construction = %design.construction,
            "height check: not permitted"
        );
        return Ok(Outcome {
            result: HeightCheck {
                status: CheckStatus::Fail,
                proposed_height,
                allowable_height: present_height(base_height),
                proposed_stories: design.stories,
                allowable_stories: present_stories(base_stories),
                sprinkler_increase_applied: false,
            },
            issues: vec![Issue::new(
                CheckKind::Height,
                not_permitted_message(design, what),
            )],
        });
    }

    let increase = tables.sprinkler;
    let allowed_ft = match base_height {
        Limit::Limited(ft) if design.sprinklered => Some(ft + increase.height_ft),
        Limit::Limited(ft) => Some(ft),
        _ => None,
    };
    let allowed_stories = match base_stories {
        Limit::Limited(n) if design.sprinklered => {
            Some((n as u32).saturating_add(increase.stories))
        }
        Limit::Limited(n) => Some(n as u32),
        _ => None,
    };
    let sprinkler_increase_applied =
        design.sprinklered && (allowed_ft.is_some() || allowed_stories.is_some());

    tracing::debug!(
        occupancy = %design.occupancy,
        construction = %design.construction,
        ?allowed_ft,
        ?allowed_stories,
        sprinkler_increase_applied,
        "height check"
    );

    let mut issues = Vec::new();
    if let Some(allowed) = allowed_ft {
        if proposed_ft > allowed {
            issues.push(Issue::new(
                CheckKind::Height,
                format!(
                    "Building height {:.2} ft ({:.2} m) exceeds allowable {:.2} ft ({:.2} m) for {} in Type {} construction",
                    proposed_ft,
                    design.height_m,
                    allowed,
                    feet_to_meters(allowed),
                    design.occupancy,
                    design.construction
                ),
            ));
        }
    }
    if let Some(allowed) = allowed_stories {
        if design.stories > allowed {
            issues.push(Issue::new(
                CheckKind::Stories,
                format!(
                    "{} stories exceeds allowable {} stories for {} in Type {} construction",
                    design.stories, allowed, design.occupancy, design.construction
                ),
            ));
        }
    }

    Ok(Outcome {
        result: HeightCheck {
            status: CheckStatus::from_passed(issues.is_empty()),
            proposed_height,
            allowable_height: allowed_ft
                .map(|ft| Allowance::Limited(length_ft(ft)))
                .unwrap_or(Allowance::Unlimited),
            proposed_stories: design.stories,
            allowable_stories: allowed_stories
                .map(|stories| StoryLimit::Limited { stories })
                .unwrap_or(StoryLimit::Unlimited),
            sprinkler_increase_applied,
        },
        issues,
    })
}

fn present_height(limit: Limit) -> Allowance {
    match limit {
        Limit::NotPermitted => Allowance::NotPermitted,
        Limit::Unlimited => Allowance::Unlimited,
        Limit::Limited(ft) => Allowance::Limited(length_ft(ft)),
    }
}

fn present_stories(limit: Limit) -> StoryLimit {
    match limit {
        Limit::NotPermitted => StoryLimit::NotPermitted,
        Limit::Unlimited => StoryLimit::Unlimited,
        Limit::Limited(n) => StoryLimit::Limited { stories: n as u32 },
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::input::{normalize, tests::design};
    use crate::tables::tests::embedded_tables;
    use proptest::prelude::*;

    fn allowable(outcome: &Outcome<HeightCheck>) -> (f64, u32) {
        let ft = match outcome.result.allowable_height {
            Allowance::Limited(m) => m.imperial,
            other => panic!("expected a limited height, got {:?}", other),
        };
        let stories = match outcome.result.allowable_stories {
            StoryLimit::Limited { stories } => stories,
            other => panic!("expected limited stories, got {:?}", other),
        };
        (ft, stories)
    }

    proptest! {
        /// Property: NP combinations fail whatever the proposed dimensions
        #[test]
        fn not_permitted_always_fails(
            stories in 1u32..40,
            height_m in 0.5f64..200.0,
            sprinklered in any::<bool>(),
            pair in prop::sample::select(vec![("H-1", "VB"), ("I-2", "IIB"), ("I-2", "IIIB")]),
        ) {
            let tables = embedded_tables();
            let mut input = design(pair.0, pair.1);
            input.building_data.stories = stories;
            input.building_data.height_m = height_m;
            input.building_data.sprinklered = sprinklered;
            let outcome = check_height(&normalize(&input, &tables).unwrap(), &tables).unwrap();

            prop_assert_eq!(outcome.result.status, CheckStatus::Fail);
            prop_assert_eq!(outcome.issues.len(), 1);
            prop_assert!(outcome.issues[0].message.contains("not permitted"));
        }

        /// Property: sprinklers add exactly the flat increase to both limits
        #[test]
        fn sprinkler_increase_is_additive(
            occupancy in prop::sample::select(vec!["A-1", "B", "E", "M", "R-2", "S-1"]),
            construction in prop::sample::select(vec!["IIA", "IIB", "IIIA", "IIIB", "IV", "VA", "VB"]),
        ) {
            let tables = embedded_tables();
            let mut input = design(occupancy, construction);
            input.building_data.sprinklered = false;
            let off = check_height(&normalize(&input, &tables).unwrap(), &tables).unwrap();
            input.building_data.sprinklered = true;
            let on = check_height(&normalize(&input, &tables).unwrap(), &tables).unwrap();

            let (off_ft, off_stories) = allowable(&off);
            let (on_ft, on_stories) = allowable(&on);
            prop_assert!((on_ft - off_ft - tables.sprinkler.height_ft).abs() < 1e-9);
            prop_assert_eq!(on_stories, off_stories + tables.sprinkler.stories);
        }
    }
}
