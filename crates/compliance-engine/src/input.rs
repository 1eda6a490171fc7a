//! Design input validation and normalization
//!
//! Everything here runs before any check; a design that gets through
//! [`normalize`] can be evaluated without further error paths.

use crate::error::ValidationError;
use crate::keys;
use crate::tables::RuleTableSet;
use shared_types::{ConstructionType, DesignInput, EgressInput};

/// A validated design in canonical form
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDesign {
    pub occupancy: String,
    pub construction: ConstructionType,
    pub stories: u32,
    pub height_m: f64,
    pub area_per_floor_sqm: f64,
    pub sprinklered: bool,
    pub frontage_percentage: Option<f64>,
    pub egress: Option<EgressInput>,
}

/// Parse the construction type without touching any tables
pub fn parse_construction_type(raw: &str) -> Result<ConstructionType, ValidationError> {
    ConstructionType::parse_code(raw)
        .ok_or_else(|| ValidationError::UnsupportedConstructionType(raw.to_string()))
}

/// Check the fields that do not depend on tables
pub fn precheck(input: &DesignInput) -> Result<ConstructionType, ValidationError> {
    if input.occupancy_group.trim().is_empty() {
        return Err(ValidationError::MissingField("occupancy_group"));
    }
    if input.construction_type.trim().is_empty() {
        return Err(ValidationError::MissingField("construction_type"));
    }
    let construction = parse_construction_type(&input.construction_type)?;

    let building = &input.building_data;
    if building.stories == 0 {
        return Err(invalid("building_data.stories", "must be at least 1"));
    }
    require_positive("building_data.height_m", building.height_m)?;
    require_positive("building_data.area_per_floor_sqm", building.area_per_floor_sqm)?;
    if let Some(frontage) = building.frontage_percentage {
        if !frontage.is_finite() || !(0.0..=100.0).contains(&frontage) {
            return Err(invalid(
                "building_data.frontage_percentage",
                format!("must be between 0 and 100, found {}", frontage),
            ));
        }
    }

    if let Some(egress) = &input.egress_data {
        check_egress(egress)?;
    }

    Ok(construction)
}

/// Validate a design against the loaded tables and put it in canonical form
pub fn normalize(
    input: &DesignInput,
    tables: &RuleTableSet,
) -> Result<NormalizedDesign, ValidationError> {
    let construction = precheck(input)?;
    normalize_prechecked(input, construction, tables)
}

/// Finish normalizing a design that already passed [`precheck`]
pub fn normalize_prechecked(
    input: &DesignInput,
    construction: ConstructionType,
    tables: &RuleTableSet,
) -> Result<NormalizedDesign, ValidationError> {
    let occupancy = keys::normalize(&input.occupancy_group);
    if !tables.has_occupancy(&occupancy) {
        return Err(ValidationError::UnknownOccupancy {
            occupancy,
            edition: tables.edition().to_string(),
        });
    }

    let building = &input.building_data;
    Ok(NormalizedDesign {
        occupancy,
        construction,
        stories: building.stories,
        height_m: building.height_m,
        area_per_floor_sqm: building.area_per_floor_sqm,
        sprinklered: building.sprinklered,
        frontage_percentage: building.frontage_percentage,
        egress: input.egress_data.clone(),
    })
}

fn check_egress(egress: &EgressInput) -> Result<(), ValidationError> {
    if let Some(widths) = &egress.exit_widths_mm {
        require_all_non_negative("egress_data.exit_widths_mm", widths)?;
    }
    if let Some(distances) = &egress.travel_distances_m {
        require_all_non_negative("egress_data.travel_distances_m", distances)?;
    }
    if let Some(common_path) = egress.common_path_m {
        require_non_negative("egress_data.common_path_m", common_path)?;
    }
    if let Some(widths) = &egress.corridor_widths_mm {
        require_all_non_negative("egress_data.corridor_widths_mm", widths)?;
    }
    Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, found {}", value)))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a non-negative number, found {}", value)))
    }
}

fn require_all_non_negative(field: &'static str, values: &[f64]) -> Result<(), ValidationError> {
    values
        .iter()
        .try_for_each(|value| require_non_negative(field, *value))
}
