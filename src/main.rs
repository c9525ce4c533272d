mod model;
mod server;

use std::process::ExitCode;

use crate::server::{config::WORKER_MODE_ARG, startup};

const SUPERVISOR_MODE_ARG: &str = "supervise";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let mode = std::env::args().nth(1);
    let result = match mode.as_deref() {
        None | Some(SUPERVISOR_MODE_ARG) => {
            tracing::info!("Starting supervisor");
            startup::run_supervisor().await
        }
        Some(WORKER_MODE_ARG) => {
            tracing::info!("Starting worker");
            startup::run_worker().await
        }
        Some(other) => {
            tracing::error!(
                "Unknown mode '{}', expected '{}' or '{}'",
                other,
                SUPERVISOR_MODE_ARG,
                WORKER_MODE_ARG
            );
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
