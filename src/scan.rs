//! Accessibility scan execution and result classification.
//!
//! The scan itself runs on-device inside the axe UiAutomator2 driver; this
//! module only invokes the vendored command and sorts the response into a
//! success payload or an in-band axe error.

use anyhow::Result;
use serde_json::{json, Value};

use crate::driver::DriverSession;

/// Vendored automation command exposed by the axe driver extension
pub const AXE_SCAN_COMMAND: &str = "mobile: axeScan";

/// Key the backend uses to report an in-band scan error
pub const AXE_ERROR_KEY: &str = "axeError";

/// Outcome of one accessibility scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Scan finished; payload is persisted verbatim
    Completed(Value),
    /// Backend reported an error in-band; carries the `axeError` value.
    /// This is a normal, non-fatal path: nothing is persisted and teardown
    /// runs as usual.
    AxeError(Value),
}

impl ScanOutcome {
    /// Classify a raw scan payload: a JSON object containing the
    /// [`AXE_ERROR_KEY`] is an in-band error, anything else is a success.
    pub fn classify(payload: Value) -> Self {
        match payload.as_object().and_then(|map| map.get(AXE_ERROR_KEY)) {
            Some(error) => ScanOutcome::AxeError(error.clone()),
            None => ScanOutcome::Completed(payload),
        }
    }
}

/// Run the accessibility scan on a live session
pub async fn run_scan(session: &DriverSession, api_key: &str) -> Result<ScanOutcome> {
    let settings = json!({ "apiKey": api_key });
    let payload = session
        .execute_script(AXE_SCAN_COMMAND, vec![settings])
        .await?;
    Ok(ScanOutcome::classify(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axe_error_is_classified_as_in_band_error() {
        let payload = json!({ "axeError": "invalid API key" });
        assert_eq!(
            ScanOutcome::classify(payload),
            ScanOutcome::AxeError(json!("invalid API key"))
        );
    }

    #[test]
    fn test_axe_error_with_structured_value() {
        let payload = json!({ "axeError": { "code": 401, "reason": "unauthorized" } });
        match ScanOutcome::classify(payload) {
            ScanOutcome::AxeError(value) => assert_eq!(value["code"], 401),
            other => panic!("expected AxeError, got {:?}", other),
        }
    }

    #[test]
    fn test_object_without_error_key_is_success() {
        let payload = json!({ "violations": [] });
        assert_eq!(
            ScanOutcome::classify(payload.clone()),
            ScanOutcome::Completed(payload)
        );
    }

    #[test]
    fn test_non_object_payload_is_success() {
        let payload = json!(["result-a", "result-b"]);
        assert_eq!(
            ScanOutcome::classify(payload.clone()),
            ScanOutcome::Completed(payload)
        );
    }
}
