//! Browser fingerprint synthesis.
//!
//! The provider drops requests that do not resemble its own frontend, so
//! every offers call carries a fresh set of identifiers and a cookie jar
//! shaped like the analytics/bot-mitigation cookies a real session would
//! hold. Values are regenerated per request and never reused verbatim;
//! statistical variety is the goal, not cryptographic strength.

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// User agent matching the provider frontend's supported browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Cookie token lengths observed in real sessions.
const BM_SZ_LEN: usize = 176;
const ABCK_LEN: usize = 240;
const AK_BMSC_LEN: usize = 128;

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}

/// A synthesized browser fingerprint for one request.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    /// Session identifier header value.
    pub session_id: String,
    /// Request identifier header value.
    pub request_id: String,
    /// Trace identifier header value.
    pub trace_id: String,
    /// Synthesized cookie jar.
    pub cookie: String,
}

impl Fingerprint {
    /// Generates a fresh fingerprint.
    pub fn generate() -> Self {
        let cookie = format!(
            "_ga=GA1.3.{}.{}; _gid=GA1.3.{}.{}; bm_sz={}; _abck={}~0~{}; ak_bmsc={}",
            random_digits(9),
            random_digits(10),
            random_digits(9),
            random_digits(10),
            random_token(BM_SZ_LEN),
            random_token(ABCK_LEN / 2),
            random_token(ABCK_LEN / 2),
            random_token(AK_BMSC_LEN),
        );

        Self {
            session_id: Uuid::new_v4().to_string(),
            request_id: Uuid::new_v4().to_string(),
            trace_id: Uuid::new_v4().simple().to_string(),
            cookie,
        }
    }

    /// Header name/value pairs for this fingerprint.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("user-agent".to_string(), USER_AGENT.to_string()),
            ("accept".to_string(), "application/json, text/plain, */*".to_string()),
            ("accept-language".to_string(), "pt-BR,pt;q=0.9,en-US;q=0.8".to_string()),
            ("origin".to_string(), "https://www.smiles.com.br".to_string()),
            ("x-session-id".to_string(), self.session_id.clone()),
            ("x-request-id".to_string(), self.request_id.clone()),
            ("x-b3-traceid".to_string(), self.trace_id.clone()),
            ("cookie".to_string(), self.cookie.clone()),
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_fingerprints_differ() {
        let a = Fingerprint::generate();
        let b = Fingerprint::generate();

        assert_ne!(a.session_id, b.session_id);
        assert_ne!(a.request_id, b.request_id);
        assert_ne!(a.trace_id, b.trace_id);
        assert_ne!(a.cookie, b.cookie);
    }

    #[test]
    fn test_header_set_complete() {
        let fp = Fingerprint::generate();
        let headers = fp.headers();
        let names: Vec<&str> = headers.iter().map(|(n, _)| n.as_str()).collect();

        for required in [
            "user-agent",
            "accept",
            "origin",
            "x-session-id",
            "x-request-id",
            "x-b3-traceid",
            "cookie",
        ] {
            assert!(names.contains(&required), "missing header {required}");
        }
    }

    #[test]
    fn test_cookie_jar_shape() {
        let fp = Fingerprint::generate();
        assert!(fp.cookie.contains("_ga=GA1.3."));
        assert!(fp.cookie.contains("bm_sz="));
        assert!(fp.cookie.contains("_abck="));
        assert!(fp.cookie.contains("ak_bmsc="));
    }

    #[test]
    fn test_trace_id_has_no_hyphens() {
        let fp = Fingerprint::generate();
        assert!(!fp.trace_id.contains('-'));
        assert_eq!(fp.trace_id.len(), 32);
    }
}
