//! Allowable height, area and fire-resistance checks
//!
//! Each check reads the shared tables and a normalized design, and returns
//! its result together with the issues it raised, in the order raised.

pub mod area;
pub mod fire;
pub mod height;

pub use area::{check_area, frontage_increase_percent};
pub use fire::lookup_fire_resistance;
pub use height::check_height;

use crate::error::ValidationError;
use crate::input::NormalizedDesign;
use crate::tables::RuleTableSet;
use shared_types::Issue;

/// A check result and the issues behind it
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub result: T,
    pub issues: Vec<Issue>,
}

fn missing_row(design: &NormalizedDesign, tables: &RuleTableSet) -> ValidationError {
    ValidationError::UnknownOccupancy {
        occupancy: design.occupancy.clone(),
        edition: tables.edition().to_string(),
    }
}

fn not_permitted_message(design: &NormalizedDesign, what: &str) -> String {
    format!(
        "Occupancy {} is not permitted in Type {} construction ({} is NP)",
        design.occupancy, design.construction, what
    )
}
