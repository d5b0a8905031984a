//! Flight search query types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

// ============================================================================
// Trip Type
// ============================================================================

/// Whether the search is for a one-way or round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    /// Outbound leg only.
    #[default]
    OneWay,
    /// Outbound plus inbound leg.
    RoundTrip,
}

impl TripType {
    /// Returns the display name for this trip type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OneWay => "One-way",
            Self::RoundTrip => "Round trip",
        }
    }

    /// Wire name matching the serde representation.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::OneWay => "one_way",
            Self::RoundTrip => "round_trip",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Search Query
// ============================================================================

/// A flight search request.
///
/// Origin and destination may be bare IATA codes (`"GRU"`) or free-text
/// labels embedding a code in parentheses (`"São Paulo (GRU)"`); the
/// request signer extracts the code either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Origin airport code or label.
    pub origin: String,
    /// Destination airport code or label.
    pub destination: String,
    /// Outbound departure date.
    pub departure_date: NaiveDate,
    /// Inbound date, present for round trips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    /// One-way or round trip.
    #[serde(default)]
    pub trip_type: TripType,
    /// Number of adult passengers.
    pub adults: u32,
    /// Number of child passengers.
    #[serde(default)]
    pub children: u32,
    /// Number of lap infants.
    #[serde(default)]
    pub infants: u32,
}

impl SearchQuery {
    /// Creates a one-way query for a single adult.
    pub fn one_way(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            return_date: None,
            trip_type: TripType::OneWay,
            adults: 1,
            children: 0,
            infants: 0,
        }
    }

    /// Creates a round-trip query for a single adult.
    pub fn round_trip(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            return_date: Some(return_date),
            trip_type: TripType::RoundTrip,
            adults: 1,
            children: 0,
            infants: 0,
        }
    }

    /// Validates the query invariants.
    ///
    /// - origin and destination must be non-empty
    /// - at least one adult
    /// - no more lap infants than adults
    /// - a round trip needs a return date on or after departure
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.origin.trim().is_empty() {
            return Err(CoreError::InvalidQuery("Origin is required".to_string()));
        }
        if self.destination.trim().is_empty() {
            return Err(CoreError::InvalidQuery(
                "Destination is required".to_string(),
            ));
        }
        if self.adults == 0 {
            return Err(CoreError::InvalidQuery(
                "At least one adult is required".to_string(),
            ));
        }
        if self.infants > self.adults {
            return Err(CoreError::InvalidQuery(format!(
                "Cannot have more lap infants ({}) than adults ({})",
                self.infants, self.adults
            )));
        }
        if self.trip_type == TripType::RoundTrip {
            match self.return_date {
                None => {
                    return Err(CoreError::InvalidQuery(
                        "Round trip requires a return date".to_string(),
                    ));
                }
                Some(ret) if ret < self.departure_date => {
                    return Err(CoreError::InvalidQuery(
                        "Return date is before departure".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
