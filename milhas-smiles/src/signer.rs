//! Deterministic request URL construction.
//!
//! Both provider endpoints are picky about their query strings and must
//! be reproduced bit-exact. The two endpoints also disagree on
//! conventions: the token page wants the departure as a full ISO instant
//! with a fixed time-of-day and omits the return date for one-way trips,
//! while the offers API wants bare dates and insists on the literal
//! string `"null"` when there is no inbound leg.
//!
//! Everything in this module is a pure function of the query: same input,
//! byte-identical URL.

use chrono::NaiveDate;
use milhas_core::{SearchQuery, TripType};
use regex::Regex;
use std::sync::LazyLock;

/// HTML page scraped for the session token.
pub const TOKEN_PAGE_BASE: &str = "https://www.smiles.com.br/emissao-passagem/";

/// Offers search API.
pub const OFFERS_API_BASE: &str =
    "https://api-air-flightsearch-green.smiles.com.br/v1/airlines/search";

/// Fixed time-of-day sentinel the token page expects on its dates.
const TOKEN_PAGE_TIME: &str = "T15:00:00";

static PARENTHESIZED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([A-Za-z]{3})\)").expect("valid airport code pattern")
});

/// Extracts a 3-letter IATA code from a free-text airport label.
///
/// `"São Paulo (GRU)"` yields `"GRU"`; anything without a parenthesized
/// code is assumed to already be a bare code and is upper-cased.
pub fn airport_code(label: &str) -> String {
    PARENTHESIZED_CODE
        .captures(label)
        .and_then(|c| c.get(1))
        .map_or_else(
            || label.trim().to_uppercase(),
            |m| m.as_str().to_uppercase(),
        )
}

fn trip_type_code(trip_type: TripType) -> u8 {
    match trip_type {
        TripType::RoundTrip => 1,
        TripType::OneWay => 2,
    }
}

fn bare_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn instant_date(date: NaiveDate) -> String {
    format!("{}{TOKEN_PAGE_TIME}", date.format("%Y-%m-%d"))
}

/// Builds the token-page URL for a query.
///
/// The return date appears only for round trips with a return date; it
/// is never sent as a placeholder.
pub fn token_page_url(query: &SearchQuery) -> String {
    let mut url = format!(
        "{TOKEN_PAGE_BASE}?originAirport={}&destinationAirport={}&departure={}",
        urlencoding::encode(&airport_code(&query.origin)),
        urlencoding::encode(&airport_code(&query.destination)),
        urlencoding::encode(&instant_date(query.departure_date)),
    );

    if query.trip_type == TripType::RoundTrip {
        if let Some(ret) = query.return_date {
            url.push_str(&format!(
                "&returnDate={}",
                urlencoding::encode(&instant_date(ret))
            ));
        }
    }

    url.push_str(&format!(
        "&adults={}&children={}&infants={}&tripType={}&cabinType=all&isFlexibleDateChecked=false",
        query.adults,
        query.children,
        query.infants,
        trip_type_code(query.trip_type),
    ));
    url
}

/// Builds the offers API URL for a query.
///
/// The inbound date parameter is always present: the bare return date
/// for round trips, the literal string `"null"` otherwise.
pub fn offers_url(query: &SearchQuery) -> String {
    let inbound = match (query.trip_type, query.return_date) {
        (TripType::RoundTrip, Some(ret)) => bare_date(ret),
        _ => "null".to_string(),
    };

    format!(
        "{OFFERS_API_BASE}?adults={}&cabinType=all&children={}&currencyCode=BRL\
         &departureDate={}&destinationAirportCode={}&infants={}\
         &isFlexibleDateChecked=false&forceCongener=false&inbound={}\
         &originAirportCode={}&tripType={}",
        query.adults,
        query.children,
        urlencoding::encode(&bare_date(query.departure_date)),
        urlencoding::encode(&airport_code(&query.destination)),
        query.infants,
        urlencoding::encode(&inbound),
        urlencoding::encode(&airport_code(&query.origin)),
        trip_type_code(query.trip_type),
    )
}

/// Builds the referer URL sent with offers requests.
///
/// The provider expects the token page URL decorated with the experiment
/// id of the frontend build.
pub fn referer_url(query: &SearchQuery, exp_id: &str) -> String {
    format!(
        "{}&expId={}",
        token_page_url(query),
        urlencoding::encode(exp_id)
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn round_trip() -> SearchQuery {
        SearchQuery::round_trip("GRU", "SSA", date("2025-03-01"), date("2025-03-10"))
    }

    #[test]
    fn test_airport_code_extraction() {
        assert_eq!(airport_code("São Paulo (GRU)"), "GRU");
        assert_eq!(airport_code("Salvador (ssa)"), "SSA");
        assert_eq!(airport_code("GRU"), "GRU");
        assert_eq!(airport_code(" gig "), "GIG");
    }

    #[test]
    fn test_urls_are_deterministic() {
        let q = round_trip();
        assert_eq!(offers_url(&q), offers_url(&q));
        assert_eq!(token_page_url(&q), token_page_url(&q));
    }

    #[test]
    fn test_round_trip_inbound_present_in_offers_url() {
        let url = offers_url(&round_trip());
        assert!(url.contains("inbound=2025-03-10"));
        assert!(url.contains("departureDate=2025-03-01"));
        assert!(url.contains("originAirportCode=GRU"));
        assert!(url.contains("destinationAirportCode=SSA"));
        assert!(url.contains("tripType=1"));
    }

    #[test]
    fn test_one_way_inbound_is_literal_null() {
        let q = SearchQuery::one_way("GRU", "SSA", date("2025-03-01"));
        let url = offers_url(&q);
        assert!(url.contains("inbound=null"));
        assert!(url.contains("tripType=2"));
    }

    #[test]
    fn test_token_page_omits_return_for_one_way() {
        let q = SearchQuery::one_way("GRU", "SSA", date("2025-03-01"));
        let url = token_page_url(&q);
        assert!(!url.contains("returnDate"));
        assert!(!url.contains("null"));
    }

    #[test]
    fn test_token_page_uses_instant_sentinel() {
        let url = token_page_url(&round_trip());
        assert!(url.contains(&urlencoding::encode("2025-03-01T15:00:00").into_owned()));
        assert!(url.contains(&format!(
            "returnDate={}",
            urlencoding::encode("2025-03-10T15:00:00")
        )));
    }

    #[test]
    fn test_offers_url_uses_bare_dates() {
        let url = offers_url(&round_trip());
        assert!(!url.contains("T15"));
    }

    #[test]
    fn test_referer_carries_experiment_id() {
        let url = referer_url(&round_trip(), "exp-42");
        assert!(url.starts_with(TOKEN_PAGE_BASE));
        assert!(url.ends_with("&expId=exp-42"));
    }
}
