// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Milhas Smiles
//!
//! Client for the Smiles (Gol loyalty program) flight-search web API.
//!
//! The provider has no public API: the offers endpoint requires a
//! short-lived session token scraped from an HTML page plus a set of
//! browser-fingerprint headers and cookies. This crate handles the whole
//! dance:
//!
//! - [`TokenStore`] - caches the session token and decides staleness
//! - [`signer`] - deterministic URL construction for both endpoints
//! - [`Fingerprint`] - per-request synthesized browser headers/cookies
//! - [`parser`] - tolerant normalization of the provider's nested JSON
//! - [`OfferEnricher`] - seller-assignment seam the normalizer calls
//! - [`SearchClient`] - the control loop: helper-first entry, token
//!   acquisition, offers request, one token-clearing retry on auth
//!   rejection
//! - [`MileageClient`] - thin client for the credential-sync collaborator
//!
//! Transports come from `milhas-fetch`; callers pick the strategy.

pub mod enrich;
pub mod error;
pub mod fetcher;
pub mod fingerprint;
pub mod mileage;
pub mod parser;
pub mod signer;
pub mod token_store;

pub use enrich::{HashedSellerEnricher, NoEnrichment, OfferEnricher};
pub use error::{MileageError, SearchError};
pub use fetcher::{extract_search_token, SearchClient, SearchConfig, HELPER_URL_ENV};
pub use fingerprint::Fingerprint;
pub use mileage::{MileageBalance, MileageClient};
pub use parser::{parse_offers, ParsedOffers};
pub use token_store::{SessionToken, TokenStore};
