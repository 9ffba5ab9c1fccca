//! wxview - Turn weather provider payloads into forecast views
//!
//! Reads the payload files named on the command line, runs the forecast
//! pipeline in the local time zone and prints the views as pretty JSON.

use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing::error;

use wxview::cli::{outfit_state, Cli, Report, RunConfig};
use wxview::forecast::build_views;
use wxview::logging;

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let run = RunConfig::from_cli(cli)?;
    let inputs = run.load_inputs()?;

    let today = Local::now().date_naive();
    let views = build_views(
        &inputs.forecast,
        inputs.current.as_ref(),
        inputs.air.as_ref(),
        &run.options,
        &Local,
        today,
    )?;

    // Outfit ideas are best-effort and never fail the run
    let outfit = match &run.outfit {
        Some(settings) => Some(outfit_state(settings, inputs.current.as_ref()).await),
        None => None,
    };

    let report = Report { views, outfit };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { "warn" });

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
