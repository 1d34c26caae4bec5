pub mod dispatch;
pub mod persist;

pub use dispatch::{dispatch_reports, HostOs, ReportFormat};
pub use persist::persist;

/// Directory holding the raw scan payloads, one subdirectory per run
pub const JSON_RESULTS_DIR: &str = "_axe-results-json";

/// Directory holding the platform-specific reporter executables
pub const REPORTER_BIN_DIR: &str = "_axe-reporter-bin";
