//! Normalized flight offer types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Airline
// ============================================================================

/// Carriers the provider can return.
///
/// The provider reports carrier names as free text; [`Airline::classify`]
/// maps them onto these three known values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Airline {
    /// Gol Linhas Aéreas (the primary carrier behind the loyalty program).
    #[default]
    Gol,
    /// LATAM Airlines.
    Latam,
    /// Azul Linhas Aéreas.
    Azul,
}

impl Airline {
    /// Returns the display name for this airline.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gol => "GOL",
            Self::Latam => "LATAM",
            Self::Azul => "AZUL",
        }
    }

    /// Classifies a free-text carrier name by substring match.
    ///
    /// Unrecognized names fall back to the primary carrier.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("latam") || lower.contains("tam") {
            Self::Latam
        } else if lower.contains("azul") {
            Self::Azul
        } else {
            Self::Gol
        }
    }
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Cash Fare
// ============================================================================

/// Cash price breakdown for an offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFare {
    /// Pre-tax base fare.
    pub base: f64,
    /// Taxes and fees.
    pub taxes: f64,
}

impl CashFare {
    /// Creates a fare from base and taxes.
    pub fn new(base: f64, taxes: f64) -> Self {
        Self { base, taxes }
    }

    /// Total cash price (base + taxes).
    pub fn total(&self) -> f64 {
        self.base + self.taxes
    }
}

// ============================================================================
// Segment
// ============================================================================

/// A single flight leg within an offer's itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Marketing flight number (e.g. "G3 1408").
    pub flight_number: String,
    /// Operating carrier.
    pub airline: Airline,
    /// Departure airport code.
    pub origin: String,
    /// Arrival airport code.
    pub destination: String,
    /// Departure timestamp.
    pub departure: Option<DateTime<Utc>>,
    /// Arrival timestamp.
    pub arrival: Option<DateTime<Utc>>,
    /// Departure terminal, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_terminal: Option<String>,
    /// Arrival terminal, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_terminal: Option<String>,
}

// ============================================================================
// Flight Offer
// ============================================================================

/// One normalized priced itinerary returned by a search.
///
/// Constructed by the normalizer from the provider's nested payload and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    /// Provider offer id.
    pub id: String,
    /// Classified carrier.
    pub airline: Airline,
    /// Flight number of the first segment.
    pub flight_number: String,
    /// Origin airport code.
    pub origin: String,
    /// Destination airport code.
    pub destination: String,
    /// Origin city name, when reported.
    pub origin_city: String,
    /// Destination city name, when reported.
    pub destination_city: String,
    /// Departure timestamp.
    pub departure: Option<DateTime<Utc>>,
    /// Arrival timestamp.
    pub arrival: Option<DateTime<Utc>>,
    /// Formatted local departure time ("HH:MM", empty when unknown).
    pub departure_display: String,
    /// Formatted local arrival time ("HH:MM", empty when unknown).
    pub arrival_display: String,
    /// Total duration in minutes.
    pub duration_minutes: u32,
    /// Human-readable duration ("2h 5m").
    pub duration_display: String,
    /// Number of stopovers.
    pub stops: u32,
    /// Cabin class label of the priced brand.
    pub cabin: String,
    /// Price in loyalty points.
    pub miles: u64,
    /// Cash price breakdown.
    pub cash: CashFare,
    /// Loyalty program tag (e.g. "smiles").
    pub program: String,
    /// Ordered itinerary segments.
    pub segments: Vec<Segment>,
    /// Relevance-ordered seller references.
    pub sellers: Vec<String>,
}

// ============================================================================
// Duration Formatting
// ============================================================================

/// Formats a duration in minutes as `"{h}h {m}m"`, omitting zero components.
///
/// ```
/// use milhas_core::format_duration;
///
/// assert_eq!(format_duration(125), "2h 5m");
/// assert_eq!(format_duration(60), "1h");
/// assert_eq!(format_duration(45), "45m");
/// ```
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

// ============================================================================
// Tests
// ============================================================================
