pub mod config;
pub mod driver;
pub mod report;
pub mod runner;
pub mod scan;

// Re-export common items
pub use config::{EnvResolver, RunConfiguration};
pub use driver::AppiumClient;
pub use runner::run;
