/*!
 * AIO Race Engine - Main Entry Point
 *
 * Races two deletes of one AIO request identifier until the kernel accepts
 * both, or the attempt bound runs out.
 */

use aio_race::monitoring::EXIT_SETUP_FAILED;
use aio_race::{
    init_tracing, run_race, Backend, EmulatedKernel, NativeGateway, RaceConfig, RaceReport,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize structured tracing
    init_tracing();

    let code = match run().await {
        Ok(report) => {
            println!("{}", report.status_line());
            if report_json_requested() {
                match report.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => error!(error = %e, "Could not serialize report"),
                }
            }
            report.exit_code()
        }
        Err(e) => {
            eprintln!("{e:?}");
            EXIT_SETUP_FAILED
        }
    };

    std::process::exit(code);
}

async fn run() -> miette::Result<RaceReport> {
    let config = RaceConfig::from_env()?;

    info!(
        backend = ?config.backend,
        max_attempts = config.max_attempts,
        request_count = config.request_count,
        target_index = config.target_index,
        command = %config.command,
        "AIO race engine starting"
    );

    let report = match config.backend {
        Backend::Native => {
            let gateway = NativeGateway::open()?;
            run_race(Arc::new(gateway), config).await?
        }
        Backend::Emulated => run_race(Arc::new(EmulatedKernel::new()), config).await?,
    };

    info!(
        run_id = %report.run_id,
        attempts = report.attempts,
        retried = report.retried,
        aborted = report.aborted,
        "AIO race engine finished"
    );
    Ok(report)
}

fn report_json_requested() -> bool {
    std::env::var("AIO_RACE_REPORT_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
}
