//! Offer enrichment seam.
//!
//! Seller assignment is display/business policy, not payload parsing, so
//! it lives behind a trait the normalizer calls but does not implement.
//! The default policy derives a deterministic pseudo-random subset of a
//! fixed seller table from a hash of the offer id, so the same offer
//! always shows the same sellers across refreshes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Assigns seller references to a normalized offer.
pub trait OfferEnricher: Send + Sync {
    /// Relevance-ordered seller references for the given offer id.
    fn sellers(&self, offer_id: &str) -> Vec<String>;
}

/// Enricher that assigns no sellers. Useful for contexts serving raw
/// offers (and for tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

impl OfferEnricher for NoEnrichment {
    fn sellers(&self, _offer_id: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Default seller table, relevance order.
const DEFAULT_SELLERS: &[&str] = &["smiles", "maxmilhas", "hotmilhas", "123milhas", "voualto"];

/// Deterministic hashed seller assignment.
#[derive(Debug, Clone)]
pub struct HashedSellerEnricher {
    pool: Vec<String>,
}

impl HashedSellerEnricher {
    /// Creates an enricher over the default seller table.
    pub fn new() -> Self {
        Self {
            pool: DEFAULT_SELLERS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Creates an enricher over a custom seller table.
    pub fn with_pool(pool: Vec<String>) -> Self {
        Self { pool }
    }

    fn hash_id(offer_id: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        offer_id.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for HashedSellerEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl OfferEnricher for HashedSellerEnricher {
    fn sellers(&self, offer_id: &str) -> Vec<String> {
        if self.pool.is_empty() {
            return Vec::new();
        }

        let hash = Self::hash_id(offer_id);
        let len = self.pool.len();
        let start = (hash as usize) % len;
        // Between one seller and the whole table, biased by the id.
        let count = 1 + ((hash >> 16) as usize) % len;

        (0..count)
            .map(|i| self.pool[(start + i) % len].clone())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
