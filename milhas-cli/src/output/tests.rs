//! Formatter tests.

use super::*;
use chrono::NaiveDate;
use milhas_core::{Airline, CashFare, FlightOffer, SearchQuery};
use milhas_smiles::{MileageBalance, ParsedOffers};

fn sample_offer() -> FlightOffer {
    FlightOffer {
        id: "offer-1".to_string(),
        airline: Airline::Gol,
        flight_number: "G3 1408".to_string(),
        origin: "GRU".to_string(),
        destination: "SSA".to_string(),
        origin_city: "São Paulo".to_string(),
        destination_city: "Salvador".to_string(),
        departure: None,
        arrival: None,
        departure_display: "08:30".to_string(),
        arrival_display: "10:35".to_string(),
        duration_minutes: 125,
        duration_display: "2h 5m".to_string(),
        stops: 0,
        cabin: "Economy".to_string(),
        miles: 25000,
        cash: CashFare::new(199.90, 45.62),
        program: "smiles".to_string(),
        segments: Vec::new(),
        sellers: vec!["smiles".to_string()],
    }
}

fn sample_parsed() -> ParsedOffers {
    ParsedOffers {
        offers: vec![sample_offer()],
        parse_error: None,
        total_elements: 1,
    }
}

fn sample_query() -> SearchQuery {
    SearchQuery::one_way(
        "GRU",
        "SSA",
        NaiveDate::parse_from_str("2025-03-01", "%Y-%m-%d").unwrap(),
    )
}

#[test]
fn test_text_offers_without_colors() {
    let out = TextFormatter::new(false).format_offers(&sample_query(), &sample_parsed());

    assert!(out.contains("GRU → SSA"));
    assert!(out.contains("G3 1408"));
    assert!(out.contains("08:30 → 10:35"));
    assert!(out.contains("25,000 miles"));
    assert!(out.contains("nonstop"));
    assert!(!out.contains("\x1b["), "no ANSI codes expected: {out}");
}

#[test]
fn test_text_offers_with_colors() {
    let out = TextFormatter::new(true).format_offers(&sample_query(), &sample_parsed());
    assert!(out.contains("\x1b["));
}

#[test]
fn test_text_empty_result() {
    let parsed = ParsedOffers::default();
    let out = TextFormatter::new(false).format_offers(&sample_query(), &parsed);
    assert!(out.contains("No offers found"));
}

#[test]
fn test_text_parse_warning_surfaces() {
    let parsed = ParsedOffers {
        offers: Vec::new(),
        parse_error: Some("expected value at line 1".to_string()),
        total_elements: 0,
    };
    let out = TextFormatter::new(false).format_offers(&sample_query(), &parsed);
    assert!(out.contains("Warning: expected value"));
}

#[test]
fn test_json_offers_shape() {
    let out = JsonFormatter::new(false).format_offers(&sample_parsed()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["totalElements"], 1);
    assert_eq!(value["content"][0]["flight_number"], "G3 1408");
    assert_eq!(value["content"][0]["miles"], 25000);
}

#[test]
fn test_json_pretty_is_multiline() {
    let out = JsonFormatter::new(true).format_offers(&sample_parsed()).unwrap();
    assert!(out.contains('\n'));
}

#[test]
fn test_balance_formatting() {
    let balance = MileageBalance {
        success: true,
        miles: Some(52300),
        message: None,
    };
    let text = TextFormatter::new(false).format_balance(&balance);
    assert!(text.contains("52,300 miles"));

    let json = JsonFormatter::new(false).format_balance(&balance).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["miles"], 52300);
}

#[test]
fn test_failed_balance_formatting() {
    let balance = MileageBalance {
        success: false,
        miles: None,
        message: Some("captcha".to_string()),
    };
    let text = TextFormatter::new(false).format_balance(&balance);
    assert!(text.contains("captcha"));
}

#[test]
fn test_token_formatting() {
    let text = TextFormatter::new(false).format_token(None);
    assert!(text.contains("No cached session token"));

    let json = JsonFormatter::new(false).format_token(None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["present"], false);
}

#[test]
fn test_format_miles_grouping() {
    use super::text::format_miles;

    assert_eq!(format_miles(0), "0");
    assert_eq!(format_miles(999), "999");
    assert_eq!(format_miles(25000), "25,000");
    assert_eq!(format_miles(1234567), "1,234,567");
}
