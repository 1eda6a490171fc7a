//! Building code compliance command line
//!
//! Composition root for the engine: picks a table source, builds the shared
//! store and evaluates one design document per run.

use anyhow::{Context, Result};
use clap::Parser;
use compliance_engine::{ComplianceEngine, DirectorySource, TableStore};
use serde::Serialize;
use shared_types::audit::AuditRecord;
use shared_types::{ComplianceReport, DesignInput};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "code-check")]
#[command(
    version,
    about = "Evaluate a building design against versioned building code tables"
)]
pub struct Args {
    /// Design document (JSON); "-" reads from stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Code edition, overriding the document's code_edition
    #[arg(short, long)]
    pub edition: Option<String>,

    /// Directory of <edition>.json table documents instead of the built-in editions
    #[arg(long)]
    pub tables_dir: Option<PathBuf>,

    /// Emit an audit record alongside the report
    #[arg(long)]
    pub audit: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// What one run writes to stdout
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Report(ComplianceReport),
    Audited {
        report: ComplianceReport,
        audit: AuditRecord,
    },
}

impl Output {
    pub fn report(&self) -> &ComplianceReport {
        match self {
            Output::Report(report) | Output::Audited { report, .. } => report,
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("Failed to serialize output")
    }
}

pub fn build_store(tables_dir: Option<&PathBuf>) -> TableStore {
    match tables_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using rule tables from directory");
            TableStore::new(DirectorySource::new(dir))
        }
        None => TableStore::embedded(),
    }
}

pub fn read_design(input: &str) -> Result<DesignInput> {
    let raw = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read design from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read design file {}", input))?
    };
    parse_design(&raw)
}

pub fn parse_design(raw: &str) -> Result<DesignInput> {
    serde_json::from_str(raw).context("Design document is not valid JSON for a design input")
}

/// Evaluate one design, applying the edition override first
pub fn evaluate(
    engine: &ComplianceEngine,
    mut design: DesignInput,
    edition: Option<&str>,
    audit: bool,
) -> Result<Output> {
    if let Some(edition) = edition {
        design.code_edition = Some(edition.to_string());
    }

    let report = engine.evaluate(&design)?;
    if !audit {
        return Ok(Output::Report(report));
    }

    let audit =
        AuditRecord::new(&design, &report, None).context("Failed to build audit record")?;
    Ok(Output::Audited { report, audit })
}

pub fn run(args: &Args) -> Result<Output> {
    let engine = ComplianceEngine::new(Arc::new(build_store(args.tables_dir.as_ref())));
    let design = read_design(&args.input)?;
    evaluate(&engine, design, args.edition.as_deref(), args.audit)
}
