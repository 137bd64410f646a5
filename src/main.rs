//! p2pboot - native libp2p launcher
//!
//! Loads a libp2p daemon or client shared library and starts it with the
//! process arguments.

use p2pboot_core::{
    init_logging, report_load_failure, run_supervised, Config, Launcher, FAILURE_STATUS,
};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments and build config
    let config = match Config::from_cli() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    // Initialize logging
    init_logging(&config.log_level);

    tracing::info!("Starting {} launcher...", config.variant);

    let launcher = match Launcher::load(
        config.variant,
        config.identifier(),
        &config.library_location(),
    ) {
        Ok(launcher) => launcher,
        Err(e) => return report_load_failure(&e),
    };

    if !config.supervise {
        // Native start may never return; keep it off the async workers
        let args = config.args;
        return match tokio::task::spawn_blocking(move || launcher.start(args)).await {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(e)) => fail(e),
            Err(e) => fail(e),
        };
    }

    match run_supervised(Arc::new(launcher), config.args.clone(), config.shutdown_grace()).await {
        Ok(outcome) => {
            tracing::info!("Launcher finished: {:?}", outcome);
            ExitCode::from(outcome.exit_status())
        }
        Err(e) => fail(e),
    }
}

fn fail(err: impl std::fmt::Display) -> ExitCode {
    eprintln!("{}", err);
    ExitCode::from(FAILURE_STATUS)
}
