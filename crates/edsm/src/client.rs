//! Typed HTTP client for the EDSM public API.
//!
//! Two endpoints matter here: `api-system-v1/bodies` for the reconciliation
//! fetch after a jump, and `api-journal-v1` for the optional fire-and-forget
//! submission of the player's own scan events.

use std::time::Duration;

use edscout_core::{EngineError, RemoteSystem};

use crate::retry;

pub const DEFAULT_BASE_URL: &str = "https://www.edsm.net";

const SOFTWARE_NAME: &str = "edscout";
const SOFTWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct EdsmClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl EdsmClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<EdsmClient, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::RemoteUnavailable(e.to_string()))?;
        Ok(EdsmClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bodies_url(&self, system: &str) -> String {
        format!(
            "{}/api-system-v1/bodies?systemName={}",
            self.base_url,
            urlencoding::encode(system)
        )
    }

    /// Fetch the body listing for a system.
    ///
    /// An unknown system is not an error: the result's `is_known()` is false
    /// and its body list empty. Only transport failures and non-2xx statuses
    /// error out.
    pub async fn bodies(&self, system: &str) -> Result<RemoteSystem, EngineError> {
        let url = self.bodies_url(system);
        let resp = retry::retry_send(self.client.get(&url), self.max_retries)
            .await
            .map_err(|e| EngineError::RemoteUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::RemoteUnavailable(format!(
                "{status} from {url}"
            )));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| EngineError::RemoteUnavailable(e.to_string()))?;
        parse_bodies(&text)
    }

    /// Submit raw journal events under the player's EDSM account.
    ///
    /// Fire-and-forget: the caller spawns this and only logs the outcome, so
    /// a failure never blocks the engine.
    pub async fn submit_events(
        &self,
        commander: &str,
        api_key: &str,
        raw_events: &[String],
    ) -> Result<(), EngineError> {
        let message: Vec<serde_json::Value> = raw_events
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect();
        if message.is_empty() {
            return Ok(());
        }

        let url = format!("{}/api-journal-v1", self.base_url);
        let form = [
            ("commanderName", commander.to_string()),
            ("apiKey", api_key.to_string()),
            ("fromSoftware", SOFTWARE_NAME.to_string()),
            ("fromSoftwareVersion", SOFTWARE_VERSION.to_string()),
            (
                "message",
                serde_json::to_string(&message)
                    .map_err(|e| EngineError::RemoteUnavailable(e.to_string()))?,
            ),
        ];

        let resp = retry::retry_send(self.client.post(&url).form(&form), self.max_retries)
            .await
            .map_err(|e| EngineError::RemoteUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::RemoteUnavailable(format!(
                "{status} from {url}"
            )));
        }
        tracing::debug!("submitted {} event(s) to EDSM", message.len());
        Ok(())
    }
}

/// Parse a bodies response. EDSM answers `[]` (an empty array) for systems
/// it has never heard of; that is mapped to the unknown-system value rather
/// than a decode error.
fn parse_bodies(text: &str) -> Result<RemoteSystem, EngineError> {
    if text.trim_start().starts_with('[') {
        return Ok(RemoteSystem::default());
    }
    serde_json::from_str(text).map_err(|e| EngineError::RemoteUnavailable(e.to_string()))
}
