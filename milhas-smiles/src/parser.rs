//! Offer payload normalization.
//!
//! The offers endpoint answers with a deeply nested, inconsistently
//! populated JSON document. This module flattens it into
//! [`FlightOffer`] records. The payload is untrusted external input:
//! parsing never fails the caller — a malformed document yields an empty
//! batch with a recorded error, and a malformed element is skipped
//! without dragging down its siblings.

use chrono::{DateTime, NaiveDateTime, Utc};
use milhas_core::{format_duration, Airline, CashFare, FlightOffer, Segment};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::enrich::OfferEnricher;

/// Loyalty program tag stamped on every normalized offer.
const PROGRAM_TAG: &str = "smiles";

// ============================================================================
// Raw Payload Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchResponse {
    #[serde(default)]
    content: Vec<serde_json::Value>,
    #[serde(default)]
    total_elements: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOffer {
    #[serde(default)]
    uid: String,
    summary: Option<RawSummary>,
    itinerary: Option<RawItinerary>,
    #[serde(default)]
    brands: Vec<RawBrand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    departure: Option<RawStop>,
    arrival: Option<RawStop>,
    duration: Option<RawDuration>,
    #[serde(default)]
    stops: u32,
    airline: Option<RawAirline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStop {
    date: Option<String>,
    formatted_time: Option<String>,
    airport: Option<RawAirport>,
    terminal: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAirport {
    #[serde(default)]
    code: String,
    #[serde(default)]
    city: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDuration {
    #[serde(default)]
    minutes: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAirline {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItinerary {
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    #[serde(default)]
    number: String,
    airline: Option<RawAirline>,
    departure: Option<RawStop>,
    arrival: Option<RawStop>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBrand {
    #[serde(default)]
    cabin: String,
    #[serde(default)]
    miles: u64,
    #[serde(default)]
    base_fare: f64,
    #[serde(default)]
    airline_tax: f64,
}

// ============================================================================
// Parsed Result
// ============================================================================

/// Result of normalizing an offers payload.
#[derive(Debug, Default)]
pub struct ParsedOffers {
    /// Successfully normalized offers.
    pub offers: Vec<FlightOffer>,
    /// Recorded error when the document itself was unreadable.
    pub parse_error: Option<String>,
    /// Provider-reported total result count.
    pub total_elements: i64,
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Local display time for a stop.
///
/// Prefers the provider's own formatted field; falls back to rendering
/// the ISO timestamp as 24-hour time; unparseable timestamps yield an
/// empty string rather than failing the record.
fn display_time(stop: Option<&RawStop>) -> String {
    let Some(stop) = stop else {
        return String::new();
    };
    if let Some(formatted) = &stop.formatted_time {
        if !formatted.is_empty() {
            return formatted.clone();
        }
    }
    stop.date
        .as_deref()
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn stop_timestamp(stop: Option<&RawStop>) -> Option<DateTime<Utc>> {
    stop?.date.as_deref().and_then(parse_timestamp)
}

fn stop_code(stop: Option<&RawStop>) -> String {
    stop.and_then(|s| s.airport.as_ref())
        .map(|a| a.code.clone())
        .unwrap_or_default()
}

fn stop_city(stop: Option<&RawStop>) -> String {
    stop.and_then(|s| s.airport.as_ref())
        .map(|a| a.city.clone())
        .unwrap_or_default()
}

fn segment_flight_number(segment: &RawSegment) -> String {
    let code = segment
        .airline
        .as_ref()
        .map(|a| a.code.as_str())
        .unwrap_or_default();
    format!("{code} {}", segment.number).trim().to_string()
}

fn normalize_segment(segment: &RawSegment) -> Segment {
    let airline_name = segment
        .airline
        .as_ref()
        .map(|a| if a.name.is_empty() { a.code.clone() } else { a.name.clone() })
        .unwrap_or_default();

    Segment {
        flight_number: segment_flight_number(segment),
        airline: Airline::classify(&airline_name),
        origin: stop_code(segment.departure.as_ref()),
        destination: stop_code(segment.arrival.as_ref()),
        departure: stop_timestamp(segment.departure.as_ref()),
        arrival: stop_timestamp(segment.arrival.as_ref()),
        departure_terminal: segment.departure.as_ref().and_then(|s| s.terminal.clone()),
        arrival_terminal: segment.arrival.as_ref().and_then(|s| s.terminal.clone()),
    }
}

fn normalize_offer(value: &serde_json::Value, enricher: &dyn OfferEnricher) -> Option<FlightOffer> {
    let raw: RawOffer = match serde_json::from_value(value.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "Skipping malformed offer element");
            return None;
        }
    };

    let summary = raw.summary?;
    let departure = summary.departure.as_ref();
    let arrival = summary.arrival.as_ref();

    let origin = stop_code(departure);
    let destination = stop_code(arrival);

    let id = if raw.uid.is_empty() {
        format!(
            "{origin}-{destination}-{}",
            departure.and_then(|s| s.date.clone()).unwrap_or_default()
        )
    } else {
        raw.uid
    };

    let segments: Vec<Segment> = raw
        .itinerary
        .map(|i| i.segments.iter().map(normalize_segment).collect())
        .unwrap_or_default();

    let flight_number = segments
        .first()
        .map(|s| s.flight_number.clone())
        .unwrap_or_default();

    let airline_name = summary
        .airline
        .as_ref()
        .map(|a| if a.name.is_empty() { a.code.clone() } else { a.name.clone() })
        .unwrap_or_default();

    // First brand carries the advertised price; absent values are zero,
    // never an error.
    let (cabin, miles, cash) = raw
        .brands
        .first()
        .map(|b| (b.cabin.clone(), b.miles, CashFare::new(b.base_fare, b.airline_tax)))
        .unwrap_or_else(|| (String::new(), 0, CashFare::default()));

    let duration_minutes = summary.duration.as_ref().map_or(0, |d| d.minutes);
    let sellers = enricher.sellers(&id);

    Some(FlightOffer {
        airline: Airline::classify(&airline_name),
        flight_number,
        origin,
        destination,
        origin_city: stop_city(departure),
        destination_city: stop_city(arrival),
        departure: stop_timestamp(departure),
        arrival: stop_timestamp(arrival),
        departure_display: display_time(departure),
        arrival_display: display_time(arrival),
        duration_minutes,
        duration_display: format_duration(duration_minutes),
        stops: summary.stops,
        cabin,
        miles,
        cash,
        program: PROGRAM_TAG.to_string(),
        segments,
        sellers,
        id,
    })
}

// ============================================================================
// Entry Point
// ============================================================================

/// Normalizes a raw offers payload. Never fails: malformed input yields
/// an empty batch with the error recorded in the result.
pub fn parse_offers(raw_body: &str, enricher: &dyn OfferEnricher) -> ParsedOffers {
    let response: RawSearchResponse = match serde_json::from_str(raw_body) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Offers payload unreadable");
            return ParsedOffers {
                offers: Vec::new(),
                parse_error: Some(e.to_string()),
                total_elements: 0,
            };
        }
    };

    let offers: Vec<FlightOffer> = response
        .content
        .iter()
        .filter_map(|element| normalize_offer(element, enricher))
        .collect();

    debug!(
        offers = offers.len(),
        total = response.total_elements,
        "Offers normalized"
    );

    ParsedOffers {
        offers,
        parse_error: None,
        total_elements: response.total_elements,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{HashedSellerEnricher, NoEnrichment};

    const FIXTURE: &str = r#"{
        "content": [
            {
                "uid": "offer-1",
                "summary": {
                    "departure": {
                        "date": "2025-03-01T08:30:00",
                        "formattedTime": "08:30",
                        "airport": {"code": "GRU", "city": "São Paulo"}
                    },
                    "arrival": {
                        "date": "2025-03-01T10:35:00",
                        "airport": {"code": "SSA", "city": "Salvador"}
                    },
                    "duration": {"minutes": 125},
                    "stops": 0,
                    "airline": {"code": "G3", "name": "GOL Linhas Aéreas"}
                },
                "itinerary": {
                    "segments": [
                        {
                            "number": "1408",
                            "airline": {"code": "G3", "name": "GOL"},
                            "departure": {
                                "date": "2025-03-01T08:30:00",
                                "airport": {"code": "GRU"},
                                "terminal": "2"
                            },
                            "arrival": {
                                "date": "2025-03-01T10:35:00",
                                "airport": {"code": "SSA"}
                            }
                        }
                    ]
                },
                "brands": [
                    {"cabin": "Economy", "miles": 25000, "baseFare": 199.9, "airlineTax": 45.62},
                    {"cabin": "Premium", "miles": 60000, "baseFare": 520.0, "airlineTax": 45.62}
                ]
            }
        ],
        "totalElements": 1,
        "totalPages": 1,
        "size": 20,
        "number": 0
    }"#;

    #[test]
    fn test_empty_content_is_not_an_error() {
        let parsed = parse_offers(r#"{"content": []}"#, &NoEnrichment);
        assert!(parsed.offers.is_empty());
        assert!(parsed.parse_error.is_none());
    }

    #[test]
    fn test_unreadable_payload_degrades() {
        let parsed = parse_offers("<html>maintenance</html>", &NoEnrichment);
        assert!(parsed.offers.is_empty());
        assert!(parsed.parse_error.is_some());
    }

    #[test]
    fn test_full_offer_normalization() {
        let parsed = parse_offers(FIXTURE, &NoEnrichment);
        assert!(parsed.parse_error.is_none());
        assert_eq!(parsed.total_elements, 1);
        assert_eq!(parsed.offers.len(), 1);

        let offer = &parsed.offers[0];
        assert_eq!(offer.id, "offer-1");
        assert_eq!(offer.airline, Airline::Gol);
        assert_eq!(offer.flight_number, "G3 1408");
        assert_eq!(offer.origin, "GRU");
        assert_eq!(offer.destination_city, "Salvador");
        assert_eq!(offer.duration_minutes, 125);
        assert_eq!(offer.duration_display, "2h 5m");
        assert_eq!(offer.program, "smiles");

        // First brand wins the price slot.
        assert_eq!(offer.cabin, "Economy");
        assert_eq!(offer.miles, 25000);
        assert!((offer.cash.total() - 245.52).abs() < 1e-9);

        // Display times: provider-formatted preferred, derived otherwise.
        assert_eq!(offer.departure_display, "08:30");
        assert_eq!(offer.arrival_display, "10:35");

        assert_eq!(offer.segments.len(), 1);
        assert_eq!(offer.segments[0].departure_terminal.as_deref(), Some("2"));
    }

    #[test]
    fn test_malformed_element_skipped_not_fatal() {
        let body = r#"{
            "content": [
                {"summary": "not-an-object"},
                {
                    "uid": "good",
                    "summary": {
                        "departure": {"airport": {"code": "GRU"}},
                        "arrival": {"airport": {"code": "SSA"}}
                    }
                }
            ]
        }"#;
        let parsed = parse_offers(body, &NoEnrichment);
        assert!(parsed.parse_error.is_none());
        assert_eq!(parsed.offers.len(), 1);
        assert_eq!(parsed.offers[0].id, "good");
    }

    #[test]
    fn test_missing_brands_default_to_zero() {
        let body = r#"{
            "content": [{
                "uid": "no-brands",
                "summary": {
                    "departure": {"airport": {"code": "GRU"}},
                    "arrival": {"airport": {"code": "SSA"}}
                }
            }]
        }"#;
        let parsed = parse_offers(body, &NoEnrichment);
        let offer = &parsed.offers[0];
        assert_eq!(offer.miles, 0);
        assert_eq!(offer.cash.total(), 0.0);
        assert_eq!(offer.cabin, "");
    }

    #[test]
    fn test_unparseable_timestamp_yields_empty_display() {
        let body = r#"{
            "content": [{
                "uid": "bad-time",
                "summary": {
                    "departure": {"date": "soon", "airport": {"code": "GRU"}},
                    "arrival": {"airport": {"code": "SSA"}}
                }
            }]
        }"#;
        let parsed = parse_offers(body, &NoEnrichment);
        let offer = &parsed.offers[0];
        assert_eq!(offer.departure_display, "");
        assert!(offer.departure.is_none());
    }

    #[test]
    fn test_enrichment_applied_per_offer() {
        let parsed = parse_offers(FIXTURE, &HashedSellerEnricher::new());
        assert!(!parsed.offers[0].sellers.is_empty());
    }

    #[test]
    fn test_airline_classification_from_summary() {
        let body = r#"{
            "content": [{
                "uid": "latam-offer",
                "summary": {
                    "departure": {"airport": {"code": "GRU"}},
                    "arrival": {"airport": {"code": "GIG"}},
                    "airline": {"code": "LA", "name": "LATAM Airlines Brasil"}
                }
            }]
        }"#;
        let parsed = parse_offers(body, &NoEnrichment);
        assert_eq!(parsed.offers[0].airline, Airline::Latam);
    }
}
