use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod output;

use cli::Cli;
use config::RunConfig;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vianeo_cli=info,vianeo_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(error = %err, "Validation could not run");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the report is valid.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let settings = RunConfig::from_env()?;
    let config_path = cli.config.clone().or_else(|| settings.config_path.clone());
    let engine = commands::load_engine_config(config_path.as_deref())?;

    let outcome = commands::run(&cli.command, &engine, &settings)?;
    tracing::info!(
        results = outcome.report.len(),
        errors = outcome.report.error_count(),
        warnings = outcome.report.warning_count(),
        "Validation finished",
    );

    output::print_outcome(&outcome, cli.json, cli.verbose)?;
    Ok(outcome.report.is_valid())
}
