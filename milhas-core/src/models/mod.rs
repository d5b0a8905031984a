//! Domain models for the award-flight search.

mod offer;
mod query;

pub use offer::{format_duration, Airline, CashFare, FlightOffer, Segment};
pub use query::{SearchQuery, TripType};
