//! Report generation via the external axe reporter CLI.
//!
//! The reporter is a vendored platform-specific executable that converts a
//! run's JSON results directory into a human-readable report. Children are
//! spawned detached and never awaited; their exit status is not our concern,
//! and a spawn failure for one format must not stop the others.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};

use super::{JSON_RESULTS_DIR, REPORTER_BIN_DIR};

/// Host operating system, resolved once at startup and injected into the
/// dispatcher instead of re-sniffing the OS per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
}

impl HostOs {
    /// Detect the host OS of the current process
    pub fn detect() -> Self {
        Self::from_identifier(std::env::consts::OS)
    }

    /// Map an OS identifier (as in `std::env::consts::OS`) to a host OS.
    ///
    /// Unrecognized identifiers fall back to Windows, matching the reporter
    /// packaging convention. Likely a latent bug for genuinely unknown
    /// platforms, kept as-is.
    pub fn from_identifier(os: &str) -> Self {
        match os {
            "macos" => HostOs::MacOs,
            "linux" => HostOs::Linux,
            _ => HostOs::Windows,
        }
    }

    /// Name of the reporter executable shipped for this OS
    pub fn reporter_executable(&self) -> &'static str {
        match self {
            HostOs::Windows => "reporter-cli-win.exe",
            HostOs::MacOs => "reporter-cli-macos",
            HostOs::Linux => "reporter-cli-linux",
        }
    }
}

/// Output format understood by the reporter CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
    Xml,
}

impl ReportFormat {
    /// Every format generated during teardown
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Html, ReportFormat::Csv, ReportFormat::Xml];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
            ReportFormat::Xml => "xml",
        }
    }

    /// Directory the reporter writes this format into, one subdirectory per run
    pub fn output_dir(&self) -> String {
        format!("_axe-results-{}", self.as_str())
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "csv" => Ok(ReportFormat::Csv),
            "xml" => Ok(ReportFormat::Xml),
            _ => anyhow::bail!("Unknown report format: {}", s),
        }
    }
}

/// Build the reporter executable path and argument vector for one format.
///
/// Example: `reporter-cli-linux _axe-results-json/2025-01-01_12-00-00
/// _axe-results-html/2025-01-01_12-00-00 --format html`
fn reporter_invocation(
    base_dir: &Path,
    run_id: &str,
    host: HostOs,
    format: ReportFormat,
) -> (PathBuf, Vec<OsString>) {
    let executable = base_dir
        .join(REPORTER_BIN_DIR)
        .join(host.reporter_executable());

    let input_dir = base_dir.join(JSON_RESULTS_DIR).join(run_id);
    let output_dir = base_dir.join(format.output_dir()).join(run_id);

    let args = vec![
        input_dir.into_os_string(),
        output_dir.into_os_string(),
        OsString::from("--format"),
        OsString::from(format.as_str()),
    ];

    (executable, args)
}

/// Start the reporter for one format as a detached child process.
///
/// The child is deliberately not awaited and its exit code never read.
pub fn dispatch_format(
    base_dir: &Path,
    run_id: &str,
    host: HostOs,
    format: ReportFormat,
) -> Result<()> {
    let (executable, args) = reporter_invocation(base_dir, run_id, host, format);

    // kill_on_drop stays false, so dropping the Child leaves it running.
    tokio::process::Command::new(&executable)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| {
            format!(
                "Failed to start {} report generation via {}",
                format,
                executable.display()
            )
        })?;

    Ok(())
}

/// Dispatch report generation for every format of a run.
///
/// Each format is independent: a start failure is logged and the remaining
/// formats are still attempted.
pub fn dispatch_reports(base_dir: &Path, run_id: &str, host: HostOs) {
    for format in ReportFormat::ALL {
        if let Err(e) = dispatch_format(base_dir, run_id, host, format) {
            log::error!("{:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_os_mapping() {
        assert_eq!(HostOs::from_identifier("macos"), HostOs::MacOs);
        assert_eq!(HostOs::from_identifier("linux"), HostOs::Linux);
        assert_eq!(HostOs::from_identifier("windows"), HostOs::Windows);
        // Unknown identifiers default to Windows
        assert_eq!(HostOs::from_identifier("freebsd"), HostOs::Windows);
        assert_eq!(HostOs::from_identifier(""), HostOs::Windows);
    }

    #[test]
    fn test_reporter_executable_names() {
        assert_eq!(HostOs::Windows.reporter_executable(), "reporter-cli-win.exe");
        assert_eq!(HostOs::MacOs.reporter_executable(), "reporter-cli-macos");
        assert_eq!(HostOs::Linux.reporter_executable(), "reporter-cli-linux");
    }

    #[test]
    fn test_all_formats_covered() {
        assert_eq!(ReportFormat::ALL.len(), 3);
        assert_eq!(ReportFormat::Html.output_dir(), "_axe-results-html");
        assert_eq!(ReportFormat::Csv.output_dir(), "_axe-results-csv");
        assert_eq!(ReportFormat::Xml.output_dir(), "_axe-results-xml");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("html".parse::<ReportFormat>().unwrap(), ReportFormat::Html);
        assert_eq!("XML".parse::<ReportFormat>().unwrap(), ReportFormat::Xml);
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_reporter_invocation_layout() {
        let base = Path::new("/work");
        let (exe, args) =
            reporter_invocation(base, "2025-01-01_12-00-00", HostOs::Linux, ReportFormat::Csv);

        assert_eq!(
            exe,
            Path::new("/work/_axe-reporter-bin/reporter-cli-linux")
        );
        assert_eq!(args.len(), 4);
        assert_eq!(
            args[0],
            OsString::from("/work/_axe-results-json/2025-01-01_12-00-00")
        );
        assert_eq!(
            args[1],
            OsString::from("/work/_axe-results-csv/2025-01-01_12-00-00")
        );
        assert_eq!(args[2], OsString::from("--format"));
        assert_eq!(args[3], OsString::from("csv"));
    }

    #[tokio::test]
    async fn test_missing_executable_is_reported_not_panicked() {
        let base = tempfile::tempdir().unwrap();
        let err = dispatch_format(base.path(), "run", HostOs::Linux, ReportFormat::Html)
            .unwrap_err();
        assert!(err.to_string().contains("html"));
    }
}
