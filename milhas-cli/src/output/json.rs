//! JSON output formatting for scripting.

use anyhow::Result;
use milhas_smiles::{MileageBalance, ParsedOffers, SessionToken};
use serde_json::{json, Value};

/// JSON formatter with optional pretty printing.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &Value) -> Result<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(out)
    }

    /// Formats a search result.
    pub fn format_offers(&self, parsed: &ParsedOffers) -> Result<String> {
        self.render(&json!({
            "success": true,
            "content": parsed.offers,
            "totalElements": parsed.total_elements,
            "error": parsed.parse_error,
        }))
    }

    /// Formats a miles balance.
    pub fn format_balance(&self, balance: &MileageBalance) -> Result<String> {
        self.render(&json!({
            "success": balance.success,
            "miles": balance.miles,
            "message": balance.message,
        }))
    }

    /// Formats the cached session token state.
    pub fn format_token(&self, token: Option<&SessionToken>) -> Result<String> {
        let value = match token {
            None => json!({ "present": false }),
            Some(token) => json!({
                "present": true,
                "expiresAt": token.expires_at,
                "expired": token.is_expired(),
            }),
        };
        self.render(&value)
    }
}
