//! Error types for evaluation and rule table loading
//!
//! A FAIL verdict is not an error: it comes back as an `Ok` report.

use thiserror::Error;

/// Problems with the submitted design, raised before any check runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported construction type '{0}' (expected one of IA, IB, IIA, IIB, IIIA, IIIB, IV, VA, VB)")]
    UnsupportedConstructionType(String),

    #[error("Occupancy group '{occupancy}' has no entry in the {edition} tables")]
    UnknownOccupancy { occupancy: String, edition: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Problems producing a rule table set for an edition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("No rule tables found for edition '{0}'")]
    EditionNotFound(String),

    #[error("Failed to read rule tables for edition '{edition}': {reason}")]
    Read { edition: String, reason: String },

    #[error("Failed to parse rule tables for edition '{edition}': {reason}")]
    Parse { edition: String, reason: String },

    #[error("Rule tables for edition '{edition}' failed validation: {reason}")]
    Schema { edition: String, reason: String },
}

impl DataError {
    pub(crate) fn schema(edition: &str, reason: impl Into<String>) -> Self {
        DataError::Schema {
            edition: edition.to_string(),
            reason: reason.into(),
        }
    }
}

/// Any error that aborts an evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
