//! Transfer staging workflow
//!
//! Owns the batch under construction, the authoritative stock snapshot
//! for the active (product, origin) pair, and the staging rules that
//! bridge them. One workflow value per open transfer form; the embedding
//! UI drives it and reads its state back.

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use shared::{
    adjusted_available, display_available, validate_line, BatchValidationError, LineCandidate,
    PendingLine, SizeAvailability, SizeKey, StockSnapshot, TransferBatch, UnitOfMeasure,
};

use crate::error::{EngineError, EngineResult};
use crate::remote::{InventoryApi, TransferReceipt, TransferRequest};

/// The product whose stock the transfer form currently shows
#[derive(Debug, Clone)]
pub struct ProductSelection {
    pub product_id: String,
    pub label: String,
    pub unit: UnitOfMeasure,
}

impl ProductSelection {
    pub fn new(product_id: impl Into<String>, label: impl Into<String>, unit: UnitOfMeasure) -> Self {
        Self {
            product_id: product_id.into(),
            label: label.into(),
            unit,
        }
    }
}

/// Stateful driver of one transfer form.
pub struct TransferWorkflow {
    api: Arc<dyn InventoryApi>,
    batch: TransferBatch,
    product: Option<ProductSelection>,
    active_size: Option<(SizeKey, String)>,
    snapshot: Option<StockSnapshot>,
}

impl TransferWorkflow {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self {
            api,
            batch: TransferBatch::new(),
            product: None,
            active_size: None,
            snapshot: None,
        }
    }

    /// Set the origin location. Rejected while lines are staged: they
    /// were validated against this origin's stock, so the batch must be
    /// reset or submitted first. Changing the origin drops the snapshot.
    pub fn set_origin(&mut self, location_id: impl Into<String>) -> EngineResult<()> {
        if !self.batch.is_empty() {
            return Err(EngineError::Validation {
                field: "origin_location_id".to_string(),
                message: "cannot change the origin while lines are staged".to_string(),
            });
        }

        let location_id = location_id.into();
        if self.batch.origin_location_id.as_deref() != Some(location_id.as_str()) {
            self.snapshot = None;
        }
        self.batch.origin_location_id = Some(location_id);
        Ok(())
    }

    /// Set the destination location. The origin conflict is flagged
    /// eagerly so the form can surface it before submit.
    pub fn set_destination(&mut self, location_id: impl Into<String>) -> EngineResult<()> {
        let location_id = location_id.into();
        if self.batch.origin_location_id.as_deref() == Some(location_id.as_str()) {
            return Err(EngineError::Batch(
                BatchValidationError::SameOriginAndDestination,
            ));
        }
        self.batch.destination_location_id = Some(location_id);
        Ok(())
    }

    pub fn set_counterparty(&mut self, counterparty_id: impl Into<String>) {
        self.batch.counterparty_id = Some(counterparty_id.into());
    }

    /// Select the product for the next lines. The snapshot survives only
    /// if it already covers the new product at the current origin.
    pub fn select_product(&mut self, selection: ProductSelection) {
        let still_covered = match (&self.snapshot, self.batch.origin_location_id.as_deref()) {
            (Some(snapshot), Some(origin)) => snapshot.covers(&selection.product_id, origin),
            _ => false,
        };
        if !still_covered {
            self.snapshot = None;
        }
        self.active_size = None;
        self.product = Some(selection);
    }

    /// Select the size bucket for the next candidate line. Unsized
    /// products select the sentinel.
    pub fn select_size(&mut self, size: SizeKey, label: impl Into<String>) {
        self.active_size = Some((size, label.into()));
    }

    /// The (product, origin) pair a snapshot must cover right now.
    pub fn current_target(&self) -> Option<(&str, &str)> {
        let product = self.product.as_ref()?;
        let origin = self.batch.origin_location_id.as_deref()?;
        Some((product.product_id.as_str(), origin))
    }

    /// Install a fetched snapshot, unless the selection moved on while
    /// the fetch was in flight. Returns whether it was installed.
    pub fn apply_snapshot(&mut self, snapshot: StockSnapshot) -> bool {
        let covers_target = self
            .current_target()
            .map(|(product_id, origin)| snapshot.covers(product_id, origin))
            .unwrap_or(false);

        if covers_target {
            self.snapshot = Some(snapshot);
            true
        } else {
            tracing::debug!(
                "Discarding stale stock snapshot for {} at {}",
                snapshot.product_id,
                snapshot.location_id
            );
            false
        }
    }

    /// Fetch a fresh snapshot for the current (product, origin) pair.
    /// On failure the previous snapshot is retained.
    pub async fn refresh_stock(&mut self) -> EngineResult<&StockSnapshot> {
        let (product_id, origin) = match self.current_target() {
            Some((product_id, origin)) => (product_id.to_string(), origin.to_string()),
            None => {
                return Err(EngineError::SnapshotUnavailable(
                    "select a product and an origin location first".to_string(),
                ))
            }
        };

        let snapshot = self.api.fetch_stock_by_size(&product_id, &origin).await?;
        self.apply_snapshot(snapshot);

        self.snapshot.as_ref().ok_or_else(|| {
            EngineError::SnapshotUnavailable(format!(
                "product {} at location {}",
                product_id, origin
            ))
        })
    }

    /// Size buckets to offer for the active product. A still-selected
    /// size the fresh snapshot no longer lists is shown with quantity
    /// zero instead of vanishing from the form.
    pub fn size_options(&self) -> Vec<SizeAvailability> {
        let snapshot = match &self.snapshot {
            Some(snapshot) => snapshot,
            None => return Vec::new(),
        };

        let mut options = snapshot.sizes.clone();
        if let Some((size, label)) = &self.active_size {
            if !options.iter().any(|o| &o.size == size) {
                options.push(SizeAvailability::new(
                    size.clone(),
                    label.clone(),
                    Decimal::ZERO,
                ));
            }
        }
        options
    }

    /// Adjusted availability for a size of the active product: the
    /// snapshot figure minus everything already staged for that key.
    /// May be negative; validation uses this value unclamped.
    pub fn adjusted_for(&self, size: &SizeKey) -> EngineResult<Decimal> {
        let product = self.product.as_ref().ok_or_else(|| EngineError::Validation {
            field: "product".to_string(),
            message: "no product selected".to_string(),
        })?;
        let snapshot = self.current_snapshot()?;

        Ok(adjusted_available(
            snapshot,
            self.batch.lines(),
            &product.product_id,
            size,
        ))
    }

    /// Adjusted availability clamped to zero for display.
    pub fn display_available_for(&self, size: &SizeKey) -> EngineResult<Decimal> {
        Ok(display_available(&self.adjusted_for(size)?))
    }

    /// Validate a candidate line against the current ledger view and
    /// stage it. The quantity comes in as the raw form string; product
    /// and size come from the active selections.
    pub fn stage_line(&mut self, quantity: &str) -> EngineResult<PendingLine> {
        let (size, size_label) = match &self.active_size {
            Some((size, label)) => (size.clone(), label.clone()),
            None => {
                return Err(EngineError::Validation {
                    field: "size".to_string(),
                    message: "no size selected".to_string(),
                })
            }
        };

        let candidate = LineCandidate {
            product_id: self.product.as_ref().map(|p| p.product_id.clone()),
            product_label: self
                .product
                .as_ref()
                .map(|p| p.label.clone())
                .unwrap_or_default(),
            size,
            size_label,
            quantity: quantity.to_string(),
        };

        let (adjusted, unit) = match &self.product {
            Some(product) => {
                let snapshot = self.current_snapshot()?;
                (
                    adjusted_available(
                        snapshot,
                        self.batch.lines(),
                        &product.product_id,
                        &candidate.size,
                    ),
                    product.unit,
                )
            }
            // The validator reports the missing product in rule order.
            None => (Decimal::ZERO, UnitOfMeasure::Unit),
        };

        let line = validate_line(&candidate, adjusted, unit)?;
        self.batch.add(line.clone());
        Ok(line)
    }

    /// Remove a staged line; the reservation it held is freed at the
    /// next ledger recomputation.
    pub fn remove_line(&mut self, local_id: Uuid) -> EngineResult<PendingLine> {
        self.batch
            .remove(local_id)
            .ok_or_else(|| EngineError::NotFound("Transfer line".to_string()))
    }

    /// Drop all staged lines, keeping the header selections in place.
    pub fn reset(&mut self) {
        self.batch.reset();
    }

    /// Submit the staged batch as one atomic transfer.
    ///
    /// Local invariants are checked first; a batch that fails them never
    /// reaches the remote. On success the lines are cleared and the
    /// snapshot dropped, since the transfer just changed the quantities
    /// it reported. On any failure the batch is left exactly as it was.
    pub async fn submit(&mut self) -> EngineResult<TransferReceipt> {
        let request = TransferRequest::from_batch(&self.batch)?;

        match self.api.submit_transfer(&request).await {
            Ok(receipt) => {
                tracing::info!(
                    "Transfer committed: {} items moved from {} to {}",
                    receipt.items_moved,
                    request.origin_location_id,
                    request.destination_location_id
                );
                self.batch.reset();
                self.snapshot = None;
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!("Transfer submission failed, batch retained: {}", err);
                Err(err)
            }
        }
    }

    pub fn batch(&self) -> &TransferBatch {
        &self.batch
    }

    pub fn snapshot(&self) -> Option<&StockSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn product(&self) -> Option<&ProductSelection> {
        self.product.as_ref()
    }

    fn current_snapshot(&self) -> EngineResult<&StockSnapshot> {
        let (product_id, origin) = self.current_target().ok_or_else(|| {
            EngineError::SnapshotUnavailable(
                "select a product and an origin location first".to_string(),
            )
        })?;

        match &self.snapshot {
            Some(snapshot) if snapshot.covers(product_id, origin) => Ok(snapshot),
            _ => Err(EngineError::SnapshotUnavailable(format!(
                "product {} at location {}",
                product_id, origin
            ))),
        }
    }
}
