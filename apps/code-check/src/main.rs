//! code-check binary
//!
//! Reads a design document, evaluates it and prints the JSON report on
//! stdout. Logs go to stderr so stdout stays machine readable.

use clap::Parser;
use code_check::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting code-check v{}", env!("CARGO_PKG_VERSION"));

    let output = code_check::run(&args)?;
    println!("{}", output.to_json(args.pretty)?);

    // Non-compliant designs still print their report but exit non-zero
    if !output.report().is_compliant() {
        std::process::exit(2);
    }

    Ok(())
}
