//! Search orchestration.
//!
//! The control loop for one offers search. The flow has a fixed shape:
//! optionally try a remote helper for the whole search, then run the
//! two-step local flow (token page scrape, offers fetch) through the
//! selected transport. An authorization rejection clears the cached
//! token and reruns the local flow exactly once; a transport timeout is
//! terminal and never retried.

use milhas_core::SearchQuery;
use milhas_fetch::{
    DirectTransport, HelperTransport, ShellTransport, Transport, TransportError, TransportKind,
    TransportRequest, TransportResponse, DEFAULT_TIMEOUT,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::enrich::{HashedSellerEnricher, OfferEnricher};
use crate::error::SearchError;
use crate::fingerprint::Fingerprint;
use crate::parser::{parse_offers, ParsedOffers};
use crate::signer;
use crate::token_store::{SessionToken, TokenStore};

/// Environment variable naming the remote helper endpoint.
pub const HELPER_URL_ENV: &str = "MILHAS_HELPER_URL";

/// Provider `errorCode` values that mean the session token was rejected.
const AUTH_ERROR_CODES: &[&str] = &["TOKEN_EXPIRED", "TOKEN_INVALID", "UNAUTHORIZED", "FORBIDDEN"];

static SEARCH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""searchToken":"([^"]+)""#).expect("valid search token pattern")
});

/// Scrapes the session token out of a token-page document.
pub fn extract_search_token(body: &str) -> Option<String> {
    SEARCH_TOKEN
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

// ============================================================================
// Configuration
// ============================================================================

/// Search client configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Transport strategy for the local flow.
    pub transport: TransportKind,
    /// Remote helper base URL, tried before the local flow.
    pub helper_endpoint: Option<Url>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Direct,
            helper_endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SearchConfig {
    /// Default configuration with the helper endpoint taken from the
    /// `MILHAS_HELPER_URL` environment variable, when set and valid.
    pub fn from_env() -> Self {
        let helper_endpoint = std::env::var(HELPER_URL_ENV)
            .ok()
            .and_then(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(error = %e, "Ignoring unparseable {HELPER_URL_ENV}");
                    None
                }
            });
        Self {
            helper_endpoint,
            ..Self::default()
        }
    }
}

// ============================================================================
// Helper Wire Types
// ============================================================================

/// Reply shape of the helper's `GET /offers/search`.
#[derive(Debug, Deserialize)]
struct HelperSearchResponse {
    success: bool,
    #[serde(default)]
    content: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

// ============================================================================
// Search Client
// ============================================================================

/// Whether an offers response counts as an authorization rejection.
///
/// HTTP 400/403 always does; otherwise a structured `errorCode` from the
/// known auth set, or (legacy providers) an error message mentioning the
/// token or authorization.
fn auth_rejection(resp: &TransportResponse) -> Option<String> {
    if resp.status == 400 || resp.status == 403 {
        return Some(format!("HTTP {}", resp.status));
    }

    let value: serde_json::Value = serde_json::from_str(&resp.body).ok()?;
    if let Some(code) = value.get("errorCode").and_then(|v| v.as_str()) {
        if AUTH_ERROR_CODES.contains(&code) {
            return Some(format!("errorCode {code}"));
        }
    }
    if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
        let lower = message.to_lowercase();
        if lower.contains("token") || lower.contains("auth") {
            return Some(message.to_string());
        }
    }
    None
}

/// One offers-fetch attempt outcome, split so the retry decision stays
/// in one place.
enum OffersFailure {
    Auth(String),
    Other(SearchError),
}

/// Orchestrates one offers search end to end.
pub struct SearchClient {
    token_store: Arc<TokenStore>,
    transport: Arc<dyn Transport>,
    helper_transport: Arc<dyn Transport>,
    helper_endpoint: Option<Url>,
    enricher: Arc<dyn OfferEnricher>,
    timeout: Duration,
}

impl SearchClient {
    /// Creates a client for the given configuration.
    ///
    /// Selecting the helper strategy without a configured endpoint
    /// degrades to the direct strategy with a warning.
    pub fn new(config: &SearchConfig) -> Self {
        let transport: Arc<dyn Transport> = match (config.transport, &config.helper_endpoint) {
            (TransportKind::Shell, _) => Arc::new(ShellTransport::new()),
            (TransportKind::Helper, Some(endpoint)) => {
                Arc::new(HelperTransport::new(endpoint.clone()))
            }
            (TransportKind::Helper, None) => {
                warn!("Helper strategy selected without an endpoint, using direct");
                Arc::new(DirectTransport::new())
            }
            (TransportKind::Direct, _) => Arc::new(DirectTransport::new()),
        };

        Self {
            token_store: Arc::new(TokenStore::new()),
            transport,
            helper_transport: Arc::new(DirectTransport::new()),
            helper_endpoint: config.helper_endpoint.clone(),
            enricher: Arc::new(HashedSellerEnricher::new()),
            timeout: config.timeout,
        }
    }

    /// Replaces the local-flow transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the transport used to reach the remote helper.
    pub fn with_helper_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.helper_transport = transport;
        self
    }

    /// Replaces the token store.
    pub fn with_token_store(mut self, store: Arc<TokenStore>) -> Self {
        self.token_store = store;
        self
    }

    /// Replaces the offer enricher.
    pub fn with_enricher(mut self, enricher: Arc<dyn OfferEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// The token store backing this client.
    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Runs one search.
    ///
    /// Helper first when configured (any helper failure falls through to
    /// the local flow), then the local token-page/offers flow with at
    /// most one token-clearing retry.
    #[instrument(skip(self, query), fields(
        origin = %query.origin,
        destination = %query.destination,
        departure = %query.departure_date,
    ))]
    pub async fn search(&self, query: &SearchQuery) -> Result<ParsedOffers, SearchError> {
        query.validate()?;

        if let Some(endpoint) = self.helper_endpoint.clone() {
            match self.search_via_helper(&endpoint, query).await {
                Ok(parsed) => {
                    debug!(offers = parsed.offers.len(), "Helper search succeeded");
                    return Ok(parsed);
                }
                Err(e) => {
                    warn!(error = %e, "Helper search failed, falling back to local flow");
                }
            }
        }

        self.search_local(query).await
    }

    // ------------------------------------------------------------------
    // Helper flow
    // ------------------------------------------------------------------

    async fn search_via_helper(
        &self,
        endpoint: &Url,
        query: &SearchQuery,
    ) -> Result<ParsedOffers, SearchError> {
        let url = helper_search_url(endpoint, query)
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let req = TransportRequest::get(url.as_str()).with_timeout(self.timeout);

        let resp = self.helper_transport.send(&req).await?;
        if !resp.is_success() {
            return Err(SearchError::HttpStatus(resp.status));
        }

        let envelope: HelperSearchResponse =
            serde_json::from_str(&resp.body).map_err(|e| SearchError::Parse(e.to_string()))?;
        if !envelope.success {
            return Err(SearchError::Transport(
                envelope.error.unwrap_or_else(|| "Unknown helper error".to_string()),
            ));
        }

        let content = envelope.content.unwrap_or(serde_json::Value::Array(Vec::new()));

        // Helpers may answer with already-normalized offers or with the
        // provider's raw payload elements.
        if let Ok(offers) = serde_json::from_value::<Vec<milhas_core::FlightOffer>>(content.clone())
        {
            let total = i64::try_from(offers.len()).unwrap_or(i64::MAX);
            return Ok(ParsedOffers {
                offers,
                parse_error: None,
                total_elements: total,
            });
        }

        let doc = serde_json::json!({ "content": content }).to_string();
        Ok(parse_offers(&doc, self.enricher.as_ref()))
    }

    // ------------------------------------------------------------------
    // Local flow
    // ------------------------------------------------------------------

    async fn search_local(&self, query: &SearchQuery) -> Result<ParsedOffers, SearchError> {
        let mut retried = false;
        loop {
            let token = self.ensure_token(query).await?;
            match self.fetch_offers(query, &token).await {
                Ok(body) => return Ok(parse_offers(&body, self.enricher.as_ref())),
                Err(OffersFailure::Auth(reason)) if !retried => {
                    warn!(reason = %reason, "Session token rejected, retrying with a fresh token");
                    self.token_store.clear();
                    retried = true;
                }
                Err(OffersFailure::Auth(reason)) => {
                    return Err(SearchError::AuthRejected(reason));
                }
                Err(OffersFailure::Other(e)) => return Err(e),
            }
        }
    }

    /// Returns a usable session token, scraping the token page when the
    /// stored one is absent or stale.
    async fn ensure_token(&self, query: &SearchQuery) -> Result<SessionToken, SearchError> {
        if let Some(token) = self.token_store.get() {
            if !token.is_expired() {
                debug!("Reusing stored session token");
                return Ok(token);
            }
            debug!("Stored session token is stale");
        }

        let url = signer::token_page_url(query);
        let fingerprint = Fingerprint::generate();
        let req = TransportRequest::get(url)
            .with_headers(fingerprint.headers())
            .with_timeout(self.timeout);

        let resp = self.transport.send(&req).await?;
        if !resp.is_success() {
            return Err(SearchError::HttpStatus(resp.status));
        }

        let raw = extract_search_token(&resp.body).ok_or(SearchError::TokenNotFound)?;
        debug!("Scraped fresh session token");
        Ok(self.token_store.set(&raw))
    }

    async fn fetch_offers(
        &self,
        query: &SearchQuery,
        token: &SessionToken,
    ) -> Result<String, OffersFailure> {
        let fingerprint = Fingerprint::generate();
        let req = TransportRequest::get(signer::offers_url(query))
            .with_headers(fingerprint.headers())
            .with_header("x-api-key", token.raw.clone())
            .with_header("referer", signer::referer_url(query, &fingerprint.trace_id))
            .with_timeout(self.timeout);

        let resp = match self.transport.send(&req).await {
            Ok(resp) => resp,
            Err(TransportError::Timeout(d)) => {
                return Err(OffersFailure::Other(SearchError::Timeout(d)));
            }
            Err(e) => return Err(OffersFailure::Other(e.into())),
        };

        if let Some(reason) = auth_rejection(&resp) {
            return Err(OffersFailure::Auth(reason));
        }
        if !resp.is_success() {
            return Err(OffersFailure::Other(SearchError::HttpStatus(resp.status)));
        }
        Ok(resp.body)
    }
}

/// Builds the helper's search URL for a query.
fn helper_search_url(endpoint: &Url, query: &SearchQuery) -> Result<Url, url::ParseError> {
    let mut url = endpoint.join("offers/search")?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("origin", &signer::airport_code(&query.origin))
            .append_pair("destination", &signer::airport_code(&query.destination))
            .append_pair("departureDate", &query.departure_date.format("%Y-%m-%d").to_string());
        if let Some(ret) = query.return_date {
            pairs.append_pair("returnDate", &ret.format("%Y-%m-%d").to_string());
        }
        pairs
            .append_pair("tripType", query.trip_type.wire_name())
            .append_pair("adults", &query.adults.to_string())
            .append_pair("children", &query.children.to_string())
            .append_pair("infants", &query.infants.to_string());
    }
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::NoEnrichment;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const TOKEN_PAGE: &str =
        r#"<html><script>var cfg = {"searchToken":"tok-1","expId":"x"};</script></html>"#;
    const EMPTY_OFFERS: &str = r#"{"content": [], "totalElements": 0}"#;

    fn query() -> SearchQuery {
        SearchQuery::one_way(
            "GRU",
            "SSA",
            NaiveDate::parse_from_str("2025-03-01", "%Y-%m-%d").unwrap(),
        )
    }

    fn ok(status: u16, body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            body: body.to_string(),
        })
    }

    /// Transport that replays a scripted sequence of results and records
    /// every request it sees.
    struct MockTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: Mutex<Vec<TransportRequest>>,
    }

    impl MockTransport {
        fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn calls(&self) -> Vec<TransportRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn kind(&self) -> TransportKind {
            TransportKind::Direct
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn send(&self, req: &TransportRequest) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(req.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Connection("script exhausted".to_string())))
        }
    }

    fn client(transport: Arc<MockTransport>) -> SearchClient {
        SearchClient::new(&SearchConfig::default())
            .with_transport(transport)
            .with_token_store(Arc::new(TokenStore::in_memory()))
            .with_enricher(Arc::new(NoEnrichment))
    }

    #[test]
    fn test_extract_search_token() {
        assert_eq!(extract_search_token(TOKEN_PAGE).as_deref(), Some("tok-1"));
        assert!(extract_search_token("<html>no token here</html>").is_none());
    }

    #[tokio::test]
    async fn test_local_flow_success() {
        let transport = MockTransport::new(vec![ok(200, TOKEN_PAGE), ok(200, EMPTY_OFFERS)]);
        let client = client(Arc::clone(&transport));

        let parsed = client.search(&query()).await.unwrap();
        assert!(parsed.offers.is_empty());
        assert!(parsed.parse_error.is_none());
        assert_eq!(transport.call_count(), 2);

        // First call hits the token page, second carries the token.
        let calls = transport.calls();
        assert!(calls[0].url.starts_with(signer::TOKEN_PAGE_BASE));
        assert!(calls[1].url.starts_with(signer::OFFERS_API_BASE));
        assert!(calls[1]
            .headers
            .iter()
            .any(|(n, v)| n == "x-api-key" && v == "tok-1"));
    }

    #[tokio::test]
    async fn test_missing_token_is_terminal() {
        let transport = MockTransport::new(vec![ok(200, "<html>maintenance</html>")]);
        let client = client(Arc::clone(&transport));

        let err = client.search(&query()).await.unwrap_err();
        assert!(matches!(err, SearchError::TokenNotFound));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_auth_rejection_retried_exactly_once() {
        let transport = MockTransport::new(vec![
            ok(200, TOKEN_PAGE),
            ok(403, ""),
            ok(200, TOKEN_PAGE),
            ok(403, ""),
        ]);
        let client = client(Arc::clone(&transport));

        let err = client.search(&query()).await.unwrap_err();
        assert!(matches!(err, SearchError::AuthRejected(_)));
        // Two full token+offers rounds, nothing more.
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_retry_with_fresh_token_recovers() {
        let transport = MockTransport::new(vec![
            ok(200, TOKEN_PAGE),
            ok(403, ""),
            ok(200, TOKEN_PAGE),
            ok(200, EMPTY_OFFERS),
        ]);
        let client = client(Arc::clone(&transport));

        let parsed = client.search(&query()).await.unwrap();
        assert!(parsed.parse_error.is_none());
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_structured_error_code_triggers_retry() {
        let transport = MockTransport::new(vec![
            ok(200, TOKEN_PAGE),
            ok(200, r#"{"errorCode": "TOKEN_EXPIRED"}"#),
            ok(200, TOKEN_PAGE),
            ok(200, EMPTY_OFFERS),
        ]);
        let client = client(Arc::clone(&transport));

        let parsed = client.search(&query()).await.unwrap();
        assert!(parsed.parse_error.is_none());
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_timeout_is_never_retried() {
        let transport = MockTransport::new(vec![
            ok(200, TOKEN_PAGE),
            Err(TransportError::Timeout(Duration::from_secs(5))),
        ]);
        let client = client(Arc::clone(&transport));

        let err = client.search(&query()).await.unwrap_err();
        assert!(matches!(err, SearchError::Timeout(_)));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unexpired_token_is_reused() {
        let store = Arc::new(TokenStore::in_memory());
        store.set("cached-token");

        let transport = MockTransport::new(vec![ok(200, EMPTY_OFFERS)]);
        let client = client(Arc::clone(&transport)).with_token_store(store);

        client.search(&query()).await.unwrap();
        assert_eq!(transport.call_count(), 1);
        assert!(transport.calls()[0].url.starts_with(signer::OFFERS_API_BASE));
    }

    #[tokio::test]
    async fn test_helper_failure_falls_back_to_local_flow() {
        let helper = MockTransport::new(vec![Err(TransportError::Connection(
            "helper unreachable".to_string(),
        ))]);
        let local = MockTransport::new(vec![ok(200, TOKEN_PAGE), ok(200, EMPTY_OFFERS)]);

        let config = SearchConfig {
            helper_endpoint: Some(Url::parse("http://helper.test/").unwrap()),
            ..SearchConfig::default()
        };
        let client = SearchClient::new(&config)
            .with_transport(local.clone())
            .with_helper_transport(helper.clone())
            .with_token_store(Arc::new(TokenStore::in_memory()))
            .with_enricher(Arc::new(NoEnrichment));

        let parsed = client.search(&query()).await.unwrap();
        assert!(parsed.parse_error.is_none());
        // Helper tried exactly once, then the local flow ran.
        assert_eq!(helper.call_count(), 1);
        assert_eq!(local.call_count(), 2);
    }

    #[tokio::test]
    async fn test_helper_success_skips_local_flow() {
        let helper = MockTransport::new(vec![ok(200, r#"{"success": true, "content": []}"#)]);
        let local = MockTransport::new(vec![]);

        let config = SearchConfig {
            helper_endpoint: Some(Url::parse("http://helper.test/").unwrap()),
            ..SearchConfig::default()
        };
        let client = SearchClient::new(&config)
            .with_transport(local.clone())
            .with_helper_transport(helper.clone())
            .with_token_store(Arc::new(TokenStore::in_memory()))
            .with_enricher(Arc::new(NoEnrichment));

        let parsed = client.search(&query()).await.unwrap();
        assert!(parsed.offers.is_empty());
        assert_eq!(helper.call_count(), 1);
        assert_eq!(local.call_count(), 0);

        let helper_url = helper.calls()[0].url.clone();
        assert!(helper_url.starts_with("http://helper.test/offers/search?"));
        assert!(helper_url.contains("origin=GRU"));
        assert!(helper_url.contains("tripType=one_way"));
    }

    #[tokio::test]
    async fn test_helper_raw_payload_is_normalized() {
        let body = r#"{
            "success": true,
            "content": [{
                "uid": "raw-1",
                "summary": {
                    "departure": {"airport": {"code": "GRU"}},
                    "arrival": {"airport": {"code": "SSA"}}
                }
            }]
        }"#;
        let helper = MockTransport::new(vec![ok(200, body)]);

        let config = SearchConfig {
            helper_endpoint: Some(Url::parse("http://helper.test/").unwrap()),
            ..SearchConfig::default()
        };
        let client = SearchClient::new(&config)
            .with_transport(MockTransport::new(vec![]))
            .with_helper_transport(helper.clone())
            .with_token_store(Arc::new(TokenStore::in_memory()))
            .with_enricher(Arc::new(NoEnrichment));

        let parsed = client.search(&query()).await.unwrap();
        assert_eq!(parsed.offers.len(), 1);
        assert_eq!(parsed.offers[0].id, "raw-1");
    }

    #[tokio::test]
    async fn test_invalid_query_rejected_before_any_request() {
        let transport = MockTransport::new(vec![]);
        let client = client(Arc::clone(&transport));

        let mut bad = query();
        bad.adults = 0;
        let err = client.search(&bad).await.unwrap_err();
        assert!(matches!(err, SearchError::Query(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_auth_rejection_classification() {
        let by_status = TransportResponse {
            status: 403,
            body: String::new(),
        };
        assert!(auth_rejection(&by_status).is_some());

        let by_code = TransportResponse {
            status: 200,
            body: r#"{"errorCode": "UNAUTHORIZED"}"#.to_string(),
        };
        assert!(auth_rejection(&by_code).is_some());

        let legacy = TransportResponse {
            status: 200,
            body: r#"{"error": "invalid token supplied"}"#.to_string(),
        };
        assert!(auth_rejection(&legacy).is_some());

        let unrelated = TransportResponse {
            status: 200,
            body: r#"{"error": "no availability"}"#.to_string(),
        };
        assert!(auth_rejection(&unrelated).is_none());

        let server_error = TransportResponse {
            status: 500,
            body: String::new(),
        };
        assert!(auth_rejection(&server_error).is_none());
    }
}
