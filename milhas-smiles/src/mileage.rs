//! Credential-sync (mileage balance) client.
//!
//! Thin client for the collaborator service that logs into the loyalty
//! account and reports the miles balance. Only the HTTP contract is
//! consumed here; the collaborator owns the browser automation. The sync
//! is slow by nature, so the call carries a hard execution ceiling after
//! which the in-flight request is dropped.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::MileageError;

/// Hard ceiling on one sync. The collaborator drives a real browser
/// login, so minutes-scale latency is normal.
const SYNC_CEILING: Duration = Duration::from_secs(180);

#[derive(Debug, Serialize)]
struct MileageRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Collaborator reply for one sync.
#[derive(Debug, Clone, Deserialize)]
pub struct MileageBalance {
    /// Whether the login and balance read succeeded.
    pub success: bool,
    /// Miles balance, when the sync succeeded.
    #[serde(default)]
    pub miles: Option<u64>,
    /// Human-readable status or failure message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the credential-sync collaborator.
#[derive(Debug, Clone)]
pub struct MileageClient {
    endpoint: Url,
    http: reqwest::Client,
    ceiling: Duration,
}

impl MileageClient {
    /// Creates a client for the given collaborator endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed. This only occurs
    /// if the system's TLS/SSL configuration is fundamentally broken,
    /// making network operations impossible.
    pub fn new(endpoint: Url) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|e| panic!("Failed to create HTTP client: {e}"));

        Self {
            endpoint,
            http,
            ceiling: SYNC_CEILING,
        }
    }

    /// Overrides the execution ceiling (tests).
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Runs one sync, returning the reported balance.
    #[instrument(skip(self, username, password), fields(endpoint = %self.endpoint))]
    pub async fn sync(&self, username: &str, password: &str) -> Result<MileageBalance, MileageError> {
        let body = MileageRequest { username, password };

        let fut = async {
            let response = self
                .http
                .post(self.endpoint.as_str())
                .json(&body)
                .send()
                .await
                .map_err(|e| MileageError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(MileageError::Http(format!("HTTP {}", status.as_u16())));
            }

            response
                .json::<MileageBalance>()
                .await
                .map_err(|e| MileageError::InvalidResponse(e.to_string()))
        };

        let balance = match tokio::time::timeout(self.ceiling, fut).await {
            Ok(result) => result?,
            Err(_) => return Err(MileageError::Timeout(self.ceiling)),
        };

        debug!(success = balance.success, miles = ?balance.miles, "Mileage sync finished");
        Ok(balance)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_balance_tolerates_missing_fields() {
        let balance: MileageBalance = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(balance.success);
        assert!(balance.miles.is_none());
        assert!(balance.message.is_none());
    }

    #[test]
    fn test_full_balance_decodes() {
        let balance: MileageBalance =
            serde_json::from_str(r#"{"success": true, "miles": 52300, "message": "ok"}"#).unwrap();
        assert_eq!(balance.miles, Some(52300));
    }

    #[test]
    fn test_request_wire_shape() {
        let body = MileageRequest {
            username: "user@example.com",
            password: "hunter2",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["username"], "user@example.com");
        assert_eq!(json["password"], "hunter2");
    }

    #[tokio::test]
    async fn test_ceiling_fires_against_stalled_listener() {
        // A listener that accepts but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let endpoint = Url::parse(&format!("http://{addr}/mileage")).unwrap();
        let client = MileageClient::new(endpoint).with_ceiling(Duration::from_millis(50));

        let start = Instant::now();
        let err = client.sync("user", "pass").await.unwrap_err();
        assert!(matches!(err, MileageError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
