use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use axe_runner::report::{self, HostOs, ReportFormat};
use axe_runner::{runner, EnvResolver, RunConfiguration};

#[derive(Parser)]
#[command(name = "axe-runner")]
#[command(version = "0.1.0")]
#[command(about = "Android accessibility scan automation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an accessibility scan against the configured device and app
    Scan {
        /// Path to a .env style file with configuration overrides
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,

        /// Base directory for scan artifacts and reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-generate reports for an existing run's JSON results
    Report {
        /// Run identifier (the timestamped results directory name)
        run_id: String,

        /// Report formats to generate (html, csv, xml)
        #[arg(short, long, value_delimiter = ',')]
        format: Option<Vec<String>>,

        /// Base directory for scan artifacts and reports
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { env_file, output } => {
            let resolver = EnvResolver::from_file(&env_file);
            let config = RunConfiguration::from_resolver(&resolver);
            let base_dir = resolve_base_dir(output)?;
            let host = HostOs::detect();

            println!("{} Running accessibility scan", "▶".green().bold());
            println!("  Driver: {}", config.driver_url.cyan());
            println!("  Device: {}", config.device_name.cyan());
            println!("  App: {}", config.apk_path.display().to_string().cyan());

            runner::run(&config, &base_dir, host).await?;
        }

        Commands::Report {
            run_id,
            format,
            output,
        } => {
            let base_dir = resolve_base_dir(output)?;
            let host = HostOs::detect();
            let formats = match format {
                Some(names) => names
                    .iter()
                    .map(|name| name.parse::<ReportFormat>())
                    .collect::<anyhow::Result<Vec<_>>>()?,
                None => ReportFormat::ALL.to_vec(),
            };

            println!(
                "{} Dispatching reports for run {}",
                "▶".green().bold(),
                run_id.cyan()
            );
            for fmt in formats {
                if let Err(e) = report::dispatch::dispatch_format(&base_dir, &run_id, host, fmt) {
                    log::error!("{:#}", e);
                }
            }
        }
    }

    Ok(())
}

fn resolve_base_dir(output: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match output {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}
