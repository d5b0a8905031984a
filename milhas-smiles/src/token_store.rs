//! Session token storage.
//!
//! The provider's search token is a short-lived JWT scraped from an HTML
//! page. The store keeps it in a single mutable slot, mirrors it into a
//! JSON file under the platform cache dir so separate invocations can
//! reuse it, and decides staleness with a safety margin so a token is
//! never used right at its deadline.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// Lifetime assumed when the token carries no decodable expiry claim.
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Tokens are treated as expired this long before their real deadline,
/// preventing races against in-flight requests.
const EXPIRY_SAFETY_MARGIN: Duration = Duration::from_secs(60);

// ============================================================================
// Session Token
// ============================================================================

/// A session token with its derived expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Opaque token value as scraped from the page.
    pub raw: String,
    /// Expiry instant (from the token's claims, or acquisition + 1h).
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Whether the token counts as expired at `now`.
    ///
    /// A token is usable only while `now + margin < expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let margin = chrono::Duration::from_std(EXPIRY_SAFETY_MARGIN)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));
        now >= self.expires_at - margin
    }

    /// Whether the token counts as expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Decodes the `exp` claim from a JWT-shaped token.
///
/// Returns `None` for tokens that are not three dot-separated segments
/// with a base64url JSON payload carrying a numeric `exp`.
fn decode_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let payload = raw.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}

// ============================================================================
// Token Store
// ============================================================================

/// Single-slot store for the current session token.
///
/// The slot is mutex-guarded so callers sharing one client do not race
/// read-then-decide-stale logic. File persistence is best effort: in
/// environments with no resolvable cache dir the store degrades to
/// memory-only without error.
#[derive(Debug)]
pub struct TokenStore {
    slot: Mutex<Option<SessionToken>>,
    cache_path: Option<PathBuf>,
}

impl TokenStore {
    /// Creates a store backed by the platform cache directory.
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir().map(|d| d.join("milhas").join("session_token.json"));
        Self {
            slot: Mutex::new(None),
            cache_path,
        }
    }

    /// Creates a memory-only store (no file persistence).
    pub fn in_memory() -> Self {
        Self {
            slot: Mutex::new(None),
            cache_path: None,
        }
    }

    /// Creates a store persisting to an explicit path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            slot: Mutex::new(None),
            cache_path: Some(path),
        }
    }

    /// Stores a freshly scraped token.
    ///
    /// The expiry comes from the token's `exp` claim when decodable,
    /// else a conservative default TTL from acquisition time.
    #[instrument(skip(self, raw))]
    pub fn set(&self, raw: &str) -> SessionToken {
        let expires_at = decode_expiry(raw).unwrap_or_else(|| {
            Utc::now() + chrono::Duration::from_std(DEFAULT_TTL).unwrap_or_else(|_| {
                chrono::Duration::seconds(3600)
            })
        });
        let token = SessionToken {
            raw: raw.to_string(),
            expires_at,
        };

        *self.slot.lock().expect("token slot poisoned") = Some(token.clone());
        self.persist(&token);
        debug!(expires_at = %token.expires_at, "Session token stored");
        token
    }

    /// Returns the current token, if any.
    ///
    /// Falls back to the persisted file when the in-memory slot is
    /// empty. Staleness is the caller's decision via
    /// [`SessionToken::is_expired`].
    pub fn get(&self) -> Option<SessionToken> {
        let mut slot = self.slot.lock().expect("token slot poisoned");
        if slot.is_none() {
            *slot = self.load_persisted();
        }
        slot.clone()
    }

    /// Drops the current token from memory and disk.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        *self.slot.lock().expect("token slot poisoned") = None;
        if let Some(path) = &self.cache_path {
            let _ = std::fs::remove_file(path);
        }
        debug!("Session token cleared");
    }

    fn persist(&self, token: &SessionToken) {
        let Some(path) = &self.cache_path else {
            return;
        };
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string(token)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            std::fs::write(path, json)
        };
        if let Err(e) = write() {
            debug!(error = %e, "Token persistence unavailable, staying in memory");
        }
    }

    fn load_persisted(&self) -> Option<SessionToken> {
        let path = self.cache_path.as_ref()?;
        let json = std::fs::read_to_string(path).ok()?;
        let token: SessionToken = serde_json::from_str(&json).ok()?;
        debug!("Loaded session token from cache file");
        Some(token)
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
