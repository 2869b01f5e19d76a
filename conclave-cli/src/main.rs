//! Conclave CLI — runs the multi-model deep-research pipeline.
//!
//! Loads layered configuration, collects API keys from the environment,
//! builds the client registry, and drives the four-stage pipeline against a
//! research specification document.

mod templates;

use anyhow::Context;
use clap::Parser;
use conclave_core::{ApiKeys, ClientRegistry, ResearchPipeline, RunReport, load_config};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Conclave: multi-model deep research with meta-review and chairman synthesis
#[derive(Parser, Debug)]
#[command(name = "conclave", version, about, long_about = None)]
struct Cli {
    /// Research specification document to investigate
    spec: PathBuf,

    /// Output directory for run artifacts (default: runs/<timestamp>)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Workspace directory searched for .conclave/config.toml
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "conclave", "conclave")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "conclave.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = load_config(Some(&cli.workspace), None)?;
    config.validate()?;

    // Credentials come from the process environment; the core only ever sees
    // the resulting mapping.
    let keys = ApiKeys::collect(|var| std::env::var(var).ok());
    let registry = ClientRegistry::build(&config, &keys)?;
    tracing::info!(clients = registry.len(), "Client registry ready");

    let spec_text = std::fs::read_to_string(&cli.spec)
        .with_context(|| format!("Failed to read specification '{}'", cli.spec.display()))?;

    let out_dir = cli.out.unwrap_or_else(|| {
        PathBuf::from("runs").join(chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string())
    });

    let pipeline = ResearchPipeline::new(config, registry, templates::default_templates())?;
    let report = pipeline.run(&spec_text, &out_dir).await?;

    print_summary(&report, &out_dir);
    Ok(())
}

/// Print the run summary: who contributed, who did not, and where the
/// artifacts landed.
fn print_summary(report: &RunReport, out_dir: &std::path::Path) {
    println!("Run complete. Artifacts in {}", out_dir.display());
    println!(
        "  contributed: {}",
        join_ids(&report.contributed).unwrap_or_else(|| "(none)".to_string())
    );
    if let Some(failed) = join_ids(&report.failed) {
        println!("  failed:      {failed}");
    }
    if let Some(skipped) = join_ids(&report.skipped) {
        println!("  skipped:     {skipped}");
    }
    println!();
    for record in report.artifacts.iter() {
        println!("  {}", record.path.display());
    }
}

fn join_ids(ids: &[conclave_core::ModelId]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}
