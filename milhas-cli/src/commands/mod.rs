//! CLI command implementations.

pub mod mileage;
pub mod search;
pub mod token;
