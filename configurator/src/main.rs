use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod logging;
mod metrics;

use commands::{ReconcileArgs, RenderArgs};

/// Exposes related workloads through Traefik with Oathkeeper access control.
#[derive(Parser)]
#[command(name = "configurator", version)]
enum CliCommand {
    /// Deliver events to the reconciler and write the resulting proxy config.
    Reconcile(ReconcileArgs),
    /// Render the route of a single unit and print its proxy config.
    Render(RenderArgs),
    /// Check the options in a config file.
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Reconcile(args) => commands::reconcile(args),
        CliCommand::Render(args) => commands::render(args),
        CliCommand::Validate { config } => commands::validate(config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
