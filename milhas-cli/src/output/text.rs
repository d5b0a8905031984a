//! Text output formatting with colors.

use milhas_core::{FlightOffer, SearchQuery};
use milhas_smiles::{MileageBalance, ParsedOffers, SessionToken};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a search result.
    pub fn format_offers(&self, query: &SearchQuery, parsed: &ParsedOffers) -> String {
        let mut lines = Vec::new();

        let mut header = format!(
            "{} → {}  {}",
            query.origin, query.destination, query.departure_date
        );
        if let Some(ret) = query.return_date {
            header.push_str(&format!(" — {ret}"));
        }
        header.push_str(&format!("  ({})", query.trip_type));
        lines.push(self.bold(&header));

        if parsed.offers.is_empty() {
            lines.push(self.dim("No offers found"));
        }
        for offer in &parsed.offers {
            lines.push(self.format_offer(offer));
        }

        lines.push(self.dim(&format!(
            "{} offer(s), {} reported by provider",
            parsed.offers.len(),
            parsed.total_elements
        )));

        if let Some(warning) = &parsed.parse_error {
            lines.push(self.yellow(&format!("Warning: {warning}")));
        }

        lines.join("\n")
    }

    /// Formats one offer line.
    fn format_offer(&self, offer: &FlightOffer) -> String {
        let times = if offer.departure_display.is_empty() && offer.arrival_display.is_empty() {
            "--:-- → --:--".to_string()
        } else {
            format!("{} → {}", offer.departure_display, offer.arrival_display)
        };

        let stops = match offer.stops {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{n} stops"),
        };

        let price = format!(
            "{} miles + R$ {:.2}",
            format_miles(offer.miles),
            offer.cash.taxes
        );

        format!(
            "{times}  {:<8} {:<6} {:<8} {:<8} {} {}",
            offer.flight_number,
            offer.airline.display_name(),
            offer.duration_display,
            stops,
            self.green(&price),
            self.dim(&offer.cabin),
        )
    }

    /// Formats a miles balance.
    pub fn format_balance(&self, balance: &MileageBalance) -> String {
        if balance.success {
            let miles = balance.miles.map_or_else(
                || "unknown".to_string(),
                |m| format!("{} miles", format_miles(m)),
            );
            format!("Balance: {}", self.green(&miles))
        } else {
            let message = balance.message.as_deref().unwrap_or("no details");
            self.red(&format!("Sync failed: {message}"))
        }
    }

    /// Formats the cached session token state.
    pub fn format_token(&self, token: Option<&SessionToken>) -> String {
        match token {
            None => self.dim("No cached session token"),
            Some(token) => {
                let status = if token.is_expired() {
                    self.red("expired")
                } else {
                    self.green("valid")
                };
                format!(
                    "Token:   {}\nExpires: {}\nStatus:  {status}",
                    self.cyan(&truncate(&token.raw, 24)),
                    token.expires_at,
                )
            }
        }
    }

    // ------------------------------------------------------------------
    // Color helpers
    // ------------------------------------------------------------------

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_colors {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }
}

/// Formats a miles count with thousands separators ("25,000").
pub fn format_miles(miles: u64) -> String {
    let digits = miles.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}…")
    }
}
