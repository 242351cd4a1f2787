//! Stock snapshot models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::SizeKey;

/// Quantity available in one size bucket of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeAvailability {
    pub size: SizeKey,
    pub label: String,
    pub available: Decimal,
}

impl SizeAvailability {
    pub fn new(size: SizeKey, label: impl Into<String>, available: Decimal) -> Self {
        Self {
            size,
            label: label.into(),
            available,
        }
    }
}

/// Immutable result of one stock fetch for a (product, location) pair.
///
/// A snapshot is superseded wholesale by the next fetch, never merged or
/// mutated in place. It carries its own product and location ids so a
/// late-arriving response for a stale selection can be recognized and
/// discarded by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub product_id: String,
    pub location_id: String,
    pub fetched_at: DateTime<Utc>,
    pub sizes: Vec<SizeAvailability>,
}

impl StockSnapshot {
    /// Build a snapshot from the remote breakdown. Entries with a
    /// non-positive quantity are dropped: a size with zero stock is
    /// omitted from the snapshot, not reported as zero.
    pub fn new(
        product_id: impl Into<String>,
        location_id: impl Into<String>,
        sizes: Vec<SizeAvailability>,
    ) -> Self {
        let sizes = sizes
            .into_iter()
            .filter(|s| s.available > Decimal::ZERO)
            .collect();
        Self {
            product_id: product_id.into(),
            location_id: location_id.into(),
            fetched_at: Utc::now(),
            sizes,
        }
    }

    /// The authoritative quantity for a size, zero when the size is absent
    /// from the breakdown.
    pub fn available_for(&self, size: &SizeKey) -> Decimal {
        self.sizes
            .iter()
            .find(|s| &s.size == size)
            .map(|s| s.available)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn label_for(&self, size: &SizeKey) -> Option<&str> {
        self.sizes
            .iter()
            .find(|s| &s.size == size)
            .map(|s| s.label.as_str())
    }

    /// Whether this snapshot describes the given (product, location) pair.
    pub fn covers(&self, product_id: &str, location_id: &str) -> bool {
        self.product_id == product_id && self.location_id == location_id
    }

    /// Total quantity across all size buckets.
    pub fn total_available(&self) -> Decimal {
        self.sizes.iter().map(|s| s.available).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
