use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable holding the axe DevTools Mobile API key (required)
pub const API_KEY_VAR: &str = "AXE_DEVTOOLS_MOBILE_API_KEY";
/// Default Appium server URL
pub const DEFAULT_DRIVER_URL: &str = "http://localhost:4723";
/// Default main activity, relative to the app package
pub const DEFAULT_APP_ACTIVITY: &str = ".MainActivity";

/// Configuration errors raised before a driver session is created
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AXE_DEVTOOLS_MOBILE_API_KEY variable is not set")]
    MissingApiKey,

    #[error("APK_PATH variable is not set")]
    MissingApkPath,

    #[error("APK file not found at: {0}")]
    ApkNotFound(PathBuf),
}

/// Key/value lookup over the process environment with `.env` file
/// fallbacks. A variable set in the live environment wins over the file
/// entry; the file fills in what the environment lacks. Lookups never
/// fail.
pub struct EnvResolver {
    file_vars: HashMap<String, String>,
}

impl EnvResolver {
    /// Load fallbacks from a `.env` style file. A missing or unreadable
    /// file is tolerated and behaves like an empty file.
    pub fn from_file(path: &Path) -> Self {
        let file_vars = std::fs::read_to_string(path)
            .map(|content| parse_env_file(&content))
            .unwrap_or_default();

        Self { file_vars }
    }

    /// Resolve a variable: process env, then file entry, then default
    pub fn get(&self, key: &str, default: &str) -> String {
        std::env::var(key)
            .ok()
            .or_else(|| self.file_vars.get(key).cloned())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse `KEY=value` lines; blank lines and `#` comments are skipped,
/// surrounding quotes on values are stripped.
fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !key.is_empty() {
                vars.insert(key.to_string(), value.to_string());
            }
        }
    }

    vars
}

/// Immutable configuration for one scan run, resolved once at startup
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// axe DevTools Mobile API key
    pub api_key: String,
    /// Name of the target Android device/emulator
    pub device_name: String,
    /// Path to the APK under test
    pub apk_path: PathBuf,
    /// Package name of the app under test
    pub app_package: String,
    /// Entry activity of the app under test
    pub app_activity: String,
    /// Appium server URL
    pub driver_url: String,
}

impl RunConfiguration {
    /// Build the configuration from environment lookups.
    ///
    /// All fields are optional at this point except the API key, which
    /// is checked later by [`RunConfiguration::validate`] so that a
    /// missing key produces a configuration error rather than a lookup
    /// failure.
    pub fn from_resolver(env: &EnvResolver) -> Self {
        Self {
            api_key: env.get(API_KEY_VAR, ""),
            device_name: env.get("DEVICE_NAME", ""),
            apk_path: PathBuf::from(env.get("APK_PATH", "")),
            app_package: env.get("APP_PACKAGE", ""),
            app_activity: env.get("APP_ACTIVITY", DEFAULT_APP_ACTIVITY),
            driver_url: env.get("DRIVER_URL", DEFAULT_DRIVER_URL),
        }
    }

    /// Check the invariants that must hold before a session is created:
    /// the API key is non-empty and the APK path points at a real file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.apk_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingApkPath);
        }
        if !self.apk_path.exists() {
            return Err(ConfigError::ApkNotFound(self.apk_path.clone()));
        }
        Ok(())
    }
}
