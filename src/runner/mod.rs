use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::RunConfiguration;
use crate::driver::AppiumClient;
use crate::report::{self, HostOs};
use crate::scan::{self, ScanOutcome};

/// Per-run context; the run ID namespaces every artifact the run produces
pub struct RunContext {
    /// Timestamp-derived identifier, e.g. "2025-01-01_12-00-00".
    /// Generated once at setup, never mutated.
    pub run_id: String,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: chrono::Local::now()
                .format("%Y-%m-%d_%H-%M-%S")
                .to_string(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the accessibility scan pipeline end to end.
///
/// Setup failures (configuration, driver connection) abort the run before
/// anything else happens. Once a session exists, teardown -- closing the
/// session and dispatching the reporters -- always runs, whatever the scan
/// step did.
pub async fn run(config: &RunConfiguration, base_dir: &Path, host: HostOs) -> Result<()> {
    let ctx = RunContext::new();
    println!("  Run ID: {}", ctx.run_id.cyan());

    // Setup: fatal on configuration or connection problems
    let client = AppiumClient::new(&config.driver_url);
    let session = client.create_session(config).await?;
    println!(
        "{} Session created: {}",
        "▶".green().bold(),
        session.session_id().cyan()
    );

    // Test body: the outcome is held until teardown has run
    let outcome = scan::run_scan(&session, &config.api_key).await;

    match &outcome {
        Ok(ScanOutcome::Completed(payload)) => {
            match report::persist(base_dir, &ctx.run_id, payload) {
                Ok(path) => {
                    println!(
                        "{} Scan result saved: {}",
                        "✔".green(),
                        path.display().to_string().cyan()
                    );
                }
                Err(e) => {
                    // Best-effort persistence; teardown continues
                    log::error!("Failed to persist scan result: {:#}", e);
                }
            }
        }
        Ok(ScanOutcome::AxeError(error)) => {
            log::error!("Axe error: {}", error);
            println!("{} Axe error: {}", "✖".red(), error);
        }
        Err(e) => {
            log::error!("Accessibility scan failed: {:#}", e);
        }
    }

    // Teardown: always runs, each step isolated from the others
    session.quit().await;
    report::dispatch_reports(base_dir, &ctx.run_id, host);
    println!(
        "{} Report generation dispatched for html, csv, xml",
        "▶".green().bold()
    );

    outcome.map(|_| ())
}
