//! Tamper-evident audit records for compliance evaluations
//!
//! A record pins an evaluation to the exact input and report it covered by
//! SHA-256 digests of their canonical JSON. Records appended to an
//! [`AuditLog`] are hash-linked, so editing any earlier record breaks the
//! chain.

use crate::types::{CheckStatus, ComplianceReport, DesignInput};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to serialize audit payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chain broken at record {index}: expected prev {expected:?}, got {found:?}")]
    ChainBroken {
        index: usize,
        expected: Option<String>,
        found: Option<String>,
    },
}

/// Audit summary of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub record_id: String,
    pub evaluated_at: String,
    pub code_edition: String,
    pub input_digest: String,
    pub report_digest: String,
    pub overall_status: CheckStatus,
    pub issue_count: u32,
    pub previous_hash: Option<String>,
}

impl AuditRecord {
    /// Create a record for an evaluation
    pub fn new(
        input: &DesignInput,
        report: &ComplianceReport,
        previous_hash: Option<String>,
    ) -> Result<Self, AuditError> {
        Ok(Self {
            record_id: Uuid::new_v4().to_string(),
            evaluated_at: Utc::now().to_rfc3339(),
            code_edition: report.code_edition.clone(),
            input_digest: digest_json(input)?,
            report_digest: digest_json(report)?,
            overall_status: report.overall_status,
            issue_count: report.issues.len() as u32,
            previous_hash,
        })
    }

    /// Hash of this record (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.record_id.as_bytes());
        hasher.update(self.evaluated_at.as_bytes());
        hasher.update(self.code_edition.as_bytes());
        hasher.update(self.input_digest.as_bytes());
        hasher.update(self.report_digest.as_bytes());
        hasher.update(format!("{:?}", self.overall_status).as_bytes());
        hasher.update(self.issue_count.to_le_bytes());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Whether this record describes exactly this input and report
    pub fn covers(
        &self,
        input: &DesignInput,
        report: &ComplianceReport,
    ) -> Result<bool, AuditError> {
        Ok(self.input_digest == digest_json(input)?
            && self.report_digest == digest_json(report)?)
    }
}

/// Hash-linked sequence of audit records
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_hash(&self) -> Option<String> {
        self.records.last().map(|r| r.compute_hash())
    }

    /// Record an evaluation, linking it to the previous record
    pub fn append(
        &mut self,
        input: &DesignInput,
        report: &ComplianceReport,
    ) -> Result<&AuditRecord, AuditError> {
        let record = AuditRecord::new(input, report, self.last_hash())?;
        self.records.push(record);
        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> Result<(), AuditError> {
        let mut expected_prev: Option<String> = None;

        for (index, record) in self.records.iter().enumerate() {
            if record.previous_hash != expected_prev {
                return Err(AuditError::ChainBroken {
                    index,
                    expected: expected_prev,
                    found: record.previous_hash.clone(),
                });
            }
            expected_prev = Some(record.compute_hash());
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// SHA-256 of a value's JSON encoding, hex encoded
pub fn digest_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
