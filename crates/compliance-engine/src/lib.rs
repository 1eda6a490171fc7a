pub mod checks;
pub mod egress;
pub mod error;
pub mod input;
pub mod keys;
pub mod report;
pub mod tables;
pub mod units;

pub use error::{DataError, EngineError, Result, ValidationError};
pub use tables::{
    DirectorySource, EmbeddedSource, RuleTableSet, TableSource, TableStore, LATEST_EDITION,
};

use input::NormalizedDesign;
use report::CheckResults;
use shared_types::{ComplianceReport, DesignInput};
use std::sync::Arc;

/// ComplianceEngine entry point
///
/// Holds no state beyond the injected table store, so one engine can serve
/// any number of concurrent evaluations.
pub struct ComplianceEngine {
    store: Arc<TableStore>,
}

impl ComplianceEngine {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Evaluate a design against its requested edition (or the latest)
    ///
    /// A failing design is still `Ok`; errors mean no report could be built.
    pub fn evaluate(&self, input: &DesignInput) -> Result<ComplianceReport> {
        // Reject malformed input before paying for a table load
        let construction = input::precheck(input)?;

        let edition = input
            .code_edition
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(LATEST_EDITION);
        let tables = self.store.load(edition)?;

        let design = input::normalize_prechecked(input, construction, &tables)?;
        evaluate_design(&design, &tables)
    }
}

/// Evaluate a design against an already loaded table set
pub fn evaluate_with_tables(
    input: &DesignInput,
    tables: &RuleTableSet,
) -> Result<ComplianceReport> {
    let design = input::normalize(input, tables)?;
    evaluate_design(&design, tables)
}

fn evaluate_design(design: &NormalizedDesign, tables: &RuleTableSet) -> Result<ComplianceReport> {
    let keys = keys::resolve(&design.occupancy);

    let height = checks::check_height(design, tables)?;
    let area = checks::check_area(design, tables)?;
    let fire_resistance = checks::lookup_fire_resistance(design.construction, tables);
    let egress = design
        .egress
        .as_ref()
        .map(|egress| egress::evaluate_egress(design, egress, &keys, tables));

    let report = report::aggregate(
        tables.edition(),
        design,
        keys,
        CheckResults {
            height,
            area,
            fire_resistance,
            egress,
        },
    );

    tracing::info!(
        edition = %report.code_edition,
        occupancy = %report.occupancy_group,
        construction = %report.construction_type,
        status = ?report.overall_status,
        issues = report.issues.len(),
        "design evaluated"
    );

    Ok(report)
}
