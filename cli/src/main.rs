//! CLI entrypoint for investa
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod scenario;
mod simulate;

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use investa_application::{AuditLog, NoAuditLog};
use investa_domain::OutputFormat;
use investa_infrastructure::{ConfigLoader, FileConfig, JsonlAuditLog};
use investa_presentation::{Cli, Command, ConsoleFormatter, OutputFormatter};
use scenario::Scenario;
use simulate::Simulation;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    // Held until exit so the file writer drains
    let _log_guard = init_tracing(cli.verbose, config.logging.file.as_deref())?;

    info!("Starting investa");

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue.message);
        } else {
            warn!("{}", issue.message);
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("Configuration has errors; run with -v for details");
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    match cli.command {
        Command::ShowConfig => {
            ConfigLoader::print_config_sources(cli.config.as_deref());
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Simulate { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            simulate(scenario, &config, format).await
        }
    }
}

async fn simulate(scenario: Scenario, config: &FileConfig, format: OutputFormat) -> Result<()> {
    let audit: Arc<dyn AuditLog> = match &config.logging.audit_file {
        Some(path) => match JsonlAuditLog::new(path) {
            Some(log) => {
                info!("Audit trail: {}", log.path().display());
                Arc::new(log)
            }
            None => Arc::new(NoAuditLog),
        },
        None => Arc::new(NoAuditLog),
    };

    let sim = Simulation::new(scenario, config, audit).await;
    let (room_id, halted) = sim.run().await?;

    let report = sim.report(&room_id).await?;
    println!("{}", ConsoleFormatter.render(&report, format));

    if let Some(err) = halted {
        eprintln!("{} {}", "Scenario stopped:".red().bold(), err);
        bail!(err);
    }
    Ok(())
}

/// Stderr logging at the `-v` level, plus a plain-text file when
/// `[logging] file` is set.
fn init_tracing(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("logging.file has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}
