mod capture;
mod config;
mod input;
mod logging;
mod report;
mod runner;

use clap::Parser;
use config::{Config, EXAMPLE_JSON, SCHEMA_JSON};
use edgeclick::{ClickDecision, EdgeClickError, TargetSelector, TemplateStore};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Clicks known buttons when they appear on screen")]
struct Cli {
    /// Path to the JSON configuration file. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Detect and log decisions without ever moving the pointer.
    #[arg(long)]
    dry_run: bool,
    /// Run one detection against an image file, print a JSON report and exit.
    #[arg(long, value_name = "IMAGE")]
    once: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => {
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    let log_dir = if cli.once.is_some() {
        None
    } else {
        config.log_dir.as_deref()
    };
    logging::init(log_dir)?;

    let store = load_targets(&config)?;

    if let Some(image) = &cli.once {
        let report = report::detect_once(&config, &store, image)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let capture = capture::ScreenCapture::new(config.screenshot_dir.as_deref())?;
    let sink = if cli.dry_run {
        None
    } else {
        Some(input::EnigoSink::new(config.failsafe)?)
    };
    let monitor = runner::ScreenMonitor::new(
        store,
        TargetSelector::new(config.match_config()),
        ClickDecision::new(config.click_policy()),
        capture,
        sink,
        config.interval()?,
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(monitor.run());
    Ok(())
}

/// Loads every configured target, logging the failure before returning it.
fn load_targets(config: &Config) -> Result<TemplateStore, EdgeClickError> {
    match TemplateStore::load(&config.target_specs(), config.edge_params()) {
        Ok(store) => {
            info!(
                targets = ?store.names().collect::<Vec<_>>(),
                "Loaded target templates"
            );
            Ok(store)
        }
        Err(err) => {
            match &err {
                EdgeClickError::MissingAsset { .. } => error!(%err, "Target image not found"),
                _ => error!(%err, "Could not load target templates"),
            }
            Err(err)
        }
    }
}
