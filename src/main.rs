use anyhow::{Context, Result};
use clap::Parser;
use funnelscope::cli::{Cli, OutputFormat};
use funnelscope::clock::SystemClock;
use funnelscope::config::AnalysisConfig;
use funnelscope::pipeline::{run_from_files, DiagnosisReport, RunOptions};
use funnelscope::{csv_output, json_output, text_output};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
///
/// Active with `--debug` (everything down to DEBUG) or when `RUST_LOG` is set.
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

fn render(report: &DiagnosisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text_output::render(report),
        OutputFormat::Json => json_output::render(report),
        OutputFormat::Csv => csv_output::render(report),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let options = RunOptions {
        funnel: args.funnel.clone(),
        min_severity: args.min_severity.map(Into::into),
    };

    let report = run_from_files(
        &args.events,
        args.changes.as_deref(),
        &config,
        &options,
        &SystemClock,
    )?;

    let rendered = render(&report, args.format)?;

    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
