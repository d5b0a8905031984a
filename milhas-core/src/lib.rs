// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Milhas Core
//!
//! Core types and models shared across the Milhas crates.
//!
//! This crate defines the domain vocabulary of the award-flight search:
//!
//! - [`SearchQuery`] - A validated flight search request
//! - [`FlightOffer`] - One normalized priced itinerary
//! - [`Segment`] - A single flight leg inside an offer
//! - [`Airline`] - The three carriers the provider can return
//! - [`CashFare`] - Cash price breakdown (base fare + taxes)
//!
//! Offers are constructed once by the normalizer and are immutable
//! afterwards; nothing in this crate performs I/O.

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    format_duration, Airline, CashFare, FlightOffer, SearchQuery, Segment, TripType,
};
