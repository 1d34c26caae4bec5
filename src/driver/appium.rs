//! Appium HTTP Client
//!
//! Provides a minimal W3C WebDriver client for Appium, scoped to what the
//! accessibility scan pipeline needs: create a UiAutomator2 session, execute
//! a mobile script command, and delete the session. Appium listens on port
//! 4723 by default.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigError, RunConfiguration};

/// Automation engine that carries the vendored axe scan command
pub const AUTOMATION_NAME: &str = "axeUiAutomator2";

/// Request timeout for driver calls. The scan itself runs on-device and can
/// take a while on slow emulators.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors raised while establishing a driver session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("failed to reach Appium server at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Appium rejected the session request: {0}")]
    Handshake(String),
}

/// New session response (W3C; Appium also mirrors the legacy top-level id)
#[derive(Debug, Deserialize)]
struct NewSessionResponse {
    value: NewSessionValue,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewSessionValue {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    error: Option<String>,
    message: Option<String>,
}

/// Generic script response
#[derive(Debug, Deserialize)]
struct ScriptResponse {
    value: Value,
}

/// Client for one Appium server endpoint
pub struct AppiumClient {
    /// Base URL of the Appium server (e.g., "http://localhost:4723")
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl AppiumClient {
    /// Create a client for the given Appium server URL
    pub fn new(url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a session bound to the configured device and app.
    ///
    /// Validates the configuration invariants first, so a missing API key or
    /// APK fails here, before anything reaches the network.
    pub async fn create_session(
        &self,
        config: &RunConfiguration,
    ) -> Result<DriverSession, SessionError> {
        config.validate()?;

        let url = format!("{}/session", self.base_url);
        let body = json!({
            "capabilities": {
                "alwaysMatch": capabilities(config),
                "firstMatch": [{}],
            }
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| SessionError::Connection {
                url: self.base_url.clone(),
                source,
            })?;

        let session_resp: NewSessionResponse =
            resp.json()
                .await
                .map_err(|source| SessionError::Connection {
                    url: self.base_url.clone(),
                    source,
                })?;

        if let Some(error) = session_resp.value.error {
            let message = session_resp.value.message.unwrap_or_default();
            return Err(SessionError::Handshake(format!("{}: {}", error, message)));
        }

        let session_id = session_resp
            .session_id
            .or(session_resp.value.session_id)
            .ok_or_else(|| SessionError::Handshake("no session ID in response".to_string()))?;

        Ok(DriverSession {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            session_id,
        })
    }
}

/// W3C capabilities for the UiAutomator2 driver with the axe extension
fn capabilities(config: &RunConfiguration) -> Value {
    json!({
        "platformName": "Android",
        "appium:deviceName": config.device_name,
        "appium:automationName": AUTOMATION_NAME,
        "appium:app": config.apk_path,
        "appium:appPackage": config.app_package,
        "appium:appActivity": config.app_activity,
    })
}

/// A live driver session. Exclusively owned by one test run; released
/// exactly once via [`DriverSession::quit`].
#[derive(Debug)]
pub struct DriverSession {
    base_url: String,
    client: reqwest::Client,
    session_id: String,
}

impl DriverSession {
    /// Session ID assigned by the server
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Execute a mobile script command (e.g., "mobile: axeScan") and return
    /// the raw response value.
    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        let url = format!(
            "{}/session/{}/execute/sync",
            self.base_url, self.session_id
        );
        let body = json!({
            "script": script,
            "args": args,
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to execute '{}'", script))?;

        let response: ScriptResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse '{}' response", script))?;

        Ok(response.value)
    }

    /// Release the session on the server side.
    ///
    /// Consumes the session so it cannot be used afterwards. Failures are
    /// logged and swallowed: teardown must never fail the run, and the
    /// session may already be gone server-side.
    pub async fn quit(self) {
        let url = format!("{}/session/{}", self.base_url, self.session_id);
        match self.client.delete(&url).send().await {
            Ok(resp) if !resp.status().is_success() => {
                log::warn!(
                    "Appium returned {} while closing session {}",
                    resp.status(),
                    self.session_id
                );
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to close Appium session {}: {}", self.session_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> RunConfiguration {
        RunConfiguration {
            api_key: "key".to_string(),
            device_name: "emulator-5554".to_string(),
            apk_path: PathBuf::from("/tmp/app.apk"),
            app_package: "com.example.app".to_string(),
            app_activity: ".MainActivity".to_string(),
            driver_url: "http://localhost:4723".to_string(),
        }
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = AppiumClient::new("http://localhost:4723/");
        assert_eq!(client.base_url, "http://localhost:4723");
    }

    #[test]
    fn test_capabilities_shape() {
        let caps = capabilities(&config());
        assert_eq!(caps["platformName"], "Android");
        assert_eq!(caps["appium:deviceName"], "emulator-5554");
        assert_eq!(caps["appium:automationName"], "axeUiAutomator2");
        assert_eq!(caps["appium:app"], "/tmp/app.apk");
        assert_eq!(caps["appium:appPackage"], "com.example.app");
        assert_eq!(caps["appium:appActivity"], ".MainActivity");
        assert_eq!(caps.as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_create_session_validates_config_first() {
        let client = AppiumClient::new("http://localhost:1");
        let mut config = config();
        config.api_key = String::new();

        // No APK on disk either, but the API key check comes first and no
        // request is made.
        let err = client.create_session(&config).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Configuration(ConfigError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_create_session_unreachable_endpoint_is_connection_error() {
        let apk = tempfile::NamedTempFile::new().unwrap();
        let mut config = config();
        config.apk_path = apk.path().to_path_buf();

        // Port 1 is never an Appium server
        let client = AppiumClient::new("http://127.0.0.1:1");
        let err = client.create_session(&config).await.unwrap_err();
        assert!(matches!(err, SessionError::Connection { .. }));
    }
}
