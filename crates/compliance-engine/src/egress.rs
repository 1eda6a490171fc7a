//! Means of egress checks
//!
//! Runs only when the design carries egress data. The occupant load is
//! always established first; every other sub-check is `NotChecked` unless
//! its own input was supplied, and only sub-checks that ran can fail the
//! egress result.

use crate::checks::Outcome;
use crate::input::NormalizedDesign;
use crate::tables::RuleTableSet;
use crate::units::{
    feet_to_meters, inches_to_mm, length_ft, meters_to_feet, mm_to_inches, sqm_to_sqft, width_in,
};
use shared_types::{
    CheckKind, CheckStatus, CommonPathCheck, CorridorCheck, EgressInput, EgressReport,
    EgressStatus, ExitCountCheck, ExitWidthCheck, Issue, Measure, MeasuredEntry, OccupantLoad,
    OccupantLoadSource, ResolvedKeys, TravelDistanceCheck,
};

pub fn evaluate_egress(
    design: &NormalizedDesign,
    input: &EgressInput,
    keys: &ResolvedKeys,
    tables: &RuleTableSet,
) -> Outcome<EgressReport> {
    let mut issues = Vec::new();

    let occupant_load = occupant_load(design, input, keys, tables);
    let load = occupant_load.value;

    let exits = check_exit_count(input, load, tables, &mut issues);
    let exit_width = check_exit_width(design, input, load, tables, &mut issues);
    let travel_distance = check_travel_distance(design, input, keys, tables, &mut issues);
    let common_path = check_common_path(design, input, keys, tables, &mut issues);
    let corridors = check_corridors(input, load, tables, &mut issues);

    let any_failed = [
        exits.status,
        exit_width.status,
        travel_distance.status,
        common_path.status,
        corridors.status,
    ]
    .iter()
    .any(EgressStatus::is_fail);

    tracing::debug!(
        occupant_load = load,
        failed = any_failed,
        issues = issues.len(),
        "egress evaluated"
    );

    Outcome {
        result: EgressReport {
            status: CheckStatus::from_passed(!any_failed),
            occupant_load,
            exits,
            exit_width,
            travel_distance,
            common_path,
            corridors,
        },
        issues,
    }
}

/// Supplied load when positive, otherwise gross area over the load factor
fn occupant_load(
    design: &NormalizedDesign,
    input: &EgressInput,
    keys: &ResolvedKeys,
    tables: &RuleTableSet,
) -> OccupantLoad {
    let category = keys.occupant_load_category;
    match input.occupant_load {
        Some(value) if value > 0 => OccupantLoad {
            value,
            source: OccupantLoadSource::Supplied,
            category,
            factor_sqft: None,
        },
        _ => {
            let factor = tables.occupant_load_factor(category);
            let total_sqft = sqm_to_sqft(design.area_per_floor_sqm) * f64::from(design.stories);
            OccupantLoad {
                value: (total_sqft / factor).ceil() as u32,
                source: OccupantLoadSource::Calculated,
                category,
                factor_sqft: Some(factor),
            }
        }
    }
}

fn check_exit_count(
    input: &EgressInput,
    load: u32,
    tables: &RuleTableSet,
    issues: &mut Vec<Issue>,
) -> ExitCountCheck {
    let required = tables.egress.required_exits(load);
    let status = match input.exit_count {
        None => EgressStatus::NotChecked,
        Some(provided) if provided >= required => EgressStatus::Pass,
        Some(provided) => {
            issues.push(Issue::new(
                CheckKind::Exits,
                format!(
                    "{} exits provided; an occupant load of {} requires at least {}",
                    provided, load, required
                ),
            ));
            EgressStatus::Fail
        }
    };

    ExitCountCheck {
        status,
        required,
        provided: input.exit_count,
    }
}

/// Required width uses the stairway factor for any multi-story building
fn check_exit_width(
    design: &NormalizedDesign,
    input: &EgressInput,
    load: u32,
    tables: &RuleTableSet,
    issues: &mut Vec<Issue>,
) -> ExitWidthCheck {
    let egress = &tables.egress;
    let stairway = design.stories > 1;
    let factor = if stairway {
        egress.stairway_width_per_occupant_in
    } else {
        egress.other_width_per_occupant_in
    };
    let required_in = (f64::from(load) * factor).max(egress.minimum_exit_width_in);

    let provided_in = supplied(&input.exit_widths_mm)
        .map(|widths| widths.iter().map(|mm| mm_to_inches(*mm)).sum::<f64>());

    let status = match provided_in {
        None => EgressStatus::NotChecked,
        Some(total) if total >= required_in => EgressStatus::Pass,
        Some(total) => {
            issues.push(Issue::new(
                CheckKind::ExitWidth,
                format!(
                    "Total exit width {:.2} in ({:.2} mm) is less than the required {:.2} in ({:.2} mm) for {} occupants",
                    total,
                    inches_to_mm(total),
                    required_in,
                    inches_to_mm(required_in),
                    load
                ),
            ));
            EgressStatus::Fail
        }
    };

    ExitWidthCheck {
        status,
        width_per_occupant_in: factor,
        stairway_factor_applied: stairway,
        required: width_in(required_in),
        provided: provided_in.map(width_in),
    }
}

fn check_travel_distance(
    design: &NormalizedDesign,
    input: &EgressInput,
    keys: &ResolvedKeys,
    tables: &RuleTableSet,
    issues: &mut Vec<Issue>,
) -> TravelDistanceCheck {
    let (limit_ft, row) = tables
        .egress
        .max_travel_distance_ft(design.sprinklered, &keys.travel_distance_key);

    let (entries, status) = check_each(
        &input.travel_distances_m,
        meters_to_feet,
        length_ft,
        |ft| ft <= limit_ft,
    );
    for entry in entries.iter().filter(|e| !e.status.is_pass()) {
        let ft = meters_to_feet(input_value(&input.travel_distances_m, entry.index));
        issues.push(Issue::new(
            CheckKind::TravelDistance,
            format!(
                "Travel distance #{} of {:.2} ft ({:.2} m) exceeds the maximum {:.2} ft ({:.2} m)",
                entry.index,
                ft,
                feet_to_meters(ft),
                limit_ft,
                feet_to_meters(limit_ft)
            ),
        ));
    }

    TravelDistanceCheck {
        status,
        key: row,
        limit: length_ft(limit_ft),
        entries,
    }
}

fn check_common_path(
    design: &NormalizedDesign,
    input: &EgressInput,
    keys: &ResolvedKeys,
    tables: &RuleTableSet,
    issues: &mut Vec<Issue>,
) -> CommonPathCheck {
    let limit_ft = tables
        .egress
        .max_common_path_ft(design.sprinklered, &keys.common_path_group);
    let provided_ft = input.common_path_m.map(meters_to_feet);

    let status = match provided_ft {
        None => EgressStatus::NotChecked,
        Some(ft) if ft <= limit_ft => EgressStatus::Pass,
        Some(ft) => {
            issues.push(Issue::new(
                CheckKind::CommonPath,
                format!(
                    "Common path of egress travel {:.2} ft ({:.2} m) exceeds the maximum {:.2} ft ({:.2} m)",
                    ft,
                    feet_to_meters(ft),
                    limit_ft,
                    feet_to_meters(limit_ft)
                ),
            ));
            EgressStatus::Fail
        }
    };

    CommonPathCheck {
        status,
        group: keys.common_path_group.clone(),
        limit: length_ft(limit_ft),
        provided: provided_ft.map(length_ft),
    }
}

fn check_corridors(
    input: &EgressInput,
    load: u32,
    tables: &RuleTableSet,
    issues: &mut Vec<Issue>,
) -> CorridorCheck {
    let egress = &tables.egress;
    let required_in = if load > egress.low_occupancy_threshold {
        egress.standard_corridor_width_in
    } else {
        egress.low_occupancy_corridor_width_in
    };

    let (entries, status) = check_each(
        &input.corridor_widths_mm,
        mm_to_inches,
        width_in,
        |inches| inches >= required_in,
    );
    for entry in entries.iter().filter(|e| !e.status.is_pass()) {
        let mm = input_value(&input.corridor_widths_mm, entry.index);
        issues.push(Issue::new(
            CheckKind::CorridorWidth,
            format!(
                "Corridor #{} width {:.2} in ({:.2} mm) is less than the required {:.2} in ({:.2} mm)",
                entry.index,
                mm_to_inches(mm),
                mm,
                required_in,
                inches_to_mm(required_in)
            ),
        ));
    }

    CorridorCheck {
        status,
        required: width_in(required_in),
        entries,
    }
}

/// A list input counts as supplied only when it has at least one value
fn supplied(values: &Option<Vec<f64>>) -> Option<&[f64]> {
    values.as_deref().filter(|v| !v.is_empty())
}

fn input_value(values: &Option<Vec<f64>>, index: usize) -> f64 {
    values
        .as_deref()
        .and_then(|v| v.get(index - 1))
        .copied()
        .unwrap_or_default()
}

/// Check every supplied value on its own; the list passes only if all do
fn check_each(
    values: &Option<Vec<f64>>,
    to_imperial: impl Fn(f64) -> f64,
    present: impl Fn(f64) -> Measure,
    passes: impl Fn(f64) -> bool,
) -> (Vec<MeasuredEntry>, EgressStatus) {
    let Some(values) = supplied(values) else {
        return (Vec::new(), EgressStatus::NotChecked);
    };

    let entries: Vec<MeasuredEntry> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let imperial = to_imperial(*value);
            MeasuredEntry {
                index: i + 1,
                value: present(imperial),
                status: CheckStatus::from_passed(passes(imperial)),
            }
        })
        .collect();
    let all_pass = entries.iter().all(|e| e.status.is_pass());

    (entries, CheckStatus::from_passed(all_pass).into())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::input::{normalize, tests::design};
    use crate::keys;
    use crate::tables::tests::embedded_tables;
    use proptest::prelude::*;

    proptest! {
        /// Property: sub-checks without input always report NOT_CHECKED
        #[test]
        fn missing_inputs_never_checked(
            occupant_load in prop::option::of(0u32..5000),
            stories in 1u32..6,
            area in 50.0f64..5000.0,
            sprinklered in any::<bool>(),
        ) {
            let tables = embedded_tables();
            let mut input = design("M", "IIA");
            input.building_data.stories = stories;
            input.building_data.area_per_floor_sqm = area;
            input.building_data.sprinklered = sprinklered;
            let design = normalize(&input, &tables).unwrap();
            let keys = keys::resolve(&design.occupancy);
            let egress = EgressInput { occupant_load, ..Default::default() };

            let outcome = evaluate_egress(&design, &egress, &keys, &tables);
            let report = outcome.result;
            prop_assert_eq!(report.exits.status, EgressStatus::NotChecked);
            prop_assert_eq!(report.exit_width.status, EgressStatus::NotChecked);
            prop_assert_eq!(report.travel_distance.status, EgressStatus::NotChecked);
            prop_assert_eq!(report.common_path.status, EgressStatus::NotChecked);
            prop_assert_eq!(report.corridors.status, EgressStatus::NotChecked);
            prop_assert_eq!(report.status, CheckStatus::Pass);
            prop_assert!(outcome.issues.is_empty());
        }
    }
}
