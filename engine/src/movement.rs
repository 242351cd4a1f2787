//! Single-movement workflow
//!
//! Records one entry or exit at a time against an item's stock at a
//! warehouse, with an explicit phase machine. Draft validation is pure
//! and callable on every form change; submission re-validates before any
//! network call.

use rust_decimal::Decimal;
use std::sync::Arc;

use shared::{validate_movement, MovementDraft, UnitOfMeasure};

use crate::error::{EngineError, EngineResult};
use crate::remote::{InventoryApi, MovementReceipt, MovementRequest};

/// Phase of the movement form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementPhase {
    /// No item selected
    Idle,
    /// An item is selected; its stock is not loaded yet
    ItemSelected,
    /// The item's available stock at the selected warehouse is known
    StockLoaded,
    /// A submission is in flight
    Submitting,
}

/// The item a movement is recorded against
#[derive(Debug, Clone)]
pub struct ItemSelection {
    pub item_id: String,
    pub label: String,
    pub unit: UnitOfMeasure,
}

impl ItemSelection {
    pub fn new(item_id: impl Into<String>, label: impl Into<String>, unit: UnitOfMeasure) -> Self {
        Self {
            item_id: item_id.into(),
            label: label.into(),
            unit,
        }
    }
}

/// Stateful driver of one movement form.
pub struct MovementWorkflow {
    api: Arc<dyn InventoryApi>,
    phase: MovementPhase,
    location_id: Option<String>,
    counterparty_id: Option<String>,
    item: Option<ItemSelection>,
    available: Option<Decimal>,
}

impl MovementWorkflow {
    pub fn new(api: Arc<dyn InventoryApi>) -> Self {
        Self {
            api,
            phase: MovementPhase::Idle,
            location_id: None,
            counterparty_id: None,
            item: None,
            available: None,
        }
    }

    pub fn phase(&self) -> MovementPhase {
        self.phase
    }

    pub fn item(&self) -> Option<&ItemSelection> {
        self.item.as_ref()
    }

    /// Available quantity loaded for the current (item, warehouse) pair.
    pub fn available(&self) -> Option<Decimal> {
        self.available
    }

    /// Set the warehouse the movement applies to. Stock loaded for a
    /// different warehouse is dropped.
    pub fn set_location(&mut self, location_id: impl Into<String>) {
        let location_id = location_id.into();
        if self.location_id.as_deref() != Some(location_id.as_str()) {
            self.clear_stock();
        }
        self.location_id = Some(location_id);
    }

    pub fn set_counterparty(&mut self, counterparty_id: impl Into<String>) {
        self.counterparty_id = Some(counterparty_id.into());
    }

    /// Select the item to move. Stock loaded for a previous selection is
    /// dropped.
    pub fn select_item(&mut self, item: ItemSelection) {
        self.item = Some(item);
        self.available = None;
        self.phase = MovementPhase::ItemSelected;
    }

    /// Load the item's available stock at the selected warehouse: the
    /// sum of the per-size buckets, since a movement is not size-split.
    /// On failure the workflow state is left untouched.
    pub async fn load_stock(&mut self) -> EngineResult<Decimal> {
        let item = match &self.item {
            Some(item) => item.clone(),
            None => {
                return Err(EngineError::InvalidStateTransition(
                    "loading stock requires a selected item".to_string(),
                ))
            }
        };
        let location_id = match &self.location_id {
            Some(location_id) => location_id.clone(),
            None => {
                return Err(EngineError::Validation {
                    field: "location_id".to_string(),
                    message: "no warehouse selected".to_string(),
                })
            }
        };

        let snapshot = self
            .api
            .fetch_stock_by_size(&item.item_id, &location_id)
            .await?;
        let available = snapshot.total_available();

        self.available = Some(available);
        self.phase = MovementPhase::StockLoaded;
        Ok(available)
    }

    /// Check a draft against the loaded stock without submitting.
    /// Entries have no upper bound; exits never exceed the available
    /// quantity. Returns the parsed quantity.
    pub fn validate_draft(&self, draft: &MovementDraft) -> EngineResult<Decimal> {
        let item = self
            .item
            .as_ref()
            .ok_or_else(|| EngineError::InvalidStateTransition("no item selected".to_string()))?;
        let available = self.available.ok_or_else(|| {
            EngineError::SnapshotUnavailable(format!("stock for item {} not loaded", item.item_id))
        })?;

        Ok(validate_movement(draft, item.unit, available)?)
    }

    /// Validate and submit the draft as one movement.
    ///
    /// Commit resets the form to `Idle`. Failure returns to
    /// `ItemSelected` with the selection intact and the stock figure
    /// dropped, so a retry passes through a fresh fetch.
    pub async fn submit(&mut self, draft: &MovementDraft) -> EngineResult<MovementReceipt> {
        let quantity = self.validate_draft(draft)?;

        let item = match &self.item {
            Some(item) => item.clone(),
            None => {
                return Err(EngineError::InvalidStateTransition(
                    "no item selected".to_string(),
                ))
            }
        };
        let location_id = match &self.location_id {
            Some(location_id) => location_id.clone(),
            None => {
                return Err(EngineError::Validation {
                    field: "location_id".to_string(),
                    message: "no warehouse selected".to_string(),
                })
            }
        };
        let counterparty_id = match &self.counterparty_id {
            Some(counterparty_id) => counterparty_id.clone(),
            None => {
                return Err(EngineError::Validation {
                    field: "counterparty_id".to_string(),
                    message: "no counterparty selected".to_string(),
                })
            }
        };

        let request = MovementRequest {
            kind: draft.kind,
            counterparty_id,
            quantity,
            location_id,
            invoice_ref: draft.invoice_ref.clone(),
            note: draft.note.clone(),
        };

        self.phase = MovementPhase::Submitting;
        match self.api.submit_movement(&item.item_id, &request).await {
            Ok(receipt) => {
                tracing::info!(
                    "Movement {} committed for item {}: {} {}",
                    receipt.id,
                    item.item_id,
                    draft.kind.as_str(),
                    quantity
                );
                self.phase = MovementPhase::Idle;
                self.item = None;
                self.available = None;
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(
                    "Movement submission failed for item {}: {}",
                    item.item_id,
                    err
                );
                self.phase = MovementPhase::ItemSelected;
                self.available = None;
                Err(err)
            }
        }
    }

    fn clear_stock(&mut self) {
        self.available = None;
        if self.phase == MovementPhase::StockLoaded {
            self.phase = MovementPhase::ItemSelected;
        }
    }
}
