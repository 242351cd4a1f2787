//! Transfer batch models: candidate lines, staged lines, and the batch

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::SizeKey;
use crate::validation::BatchValidationError;

/// A candidate transfer line as entered in the form, before validation.
///
/// The quantity stays a raw string here; parsing it is the validator's
/// second rule, so a garbled input is reported as `InvalidQuantity` rather
/// than panicking upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineCandidate {
    pub product_id: Option<String>,
    pub product_label: String,
    pub size: SizeKey,
    pub size_label: String,
    pub quantity: String,
}

/// One staged transfer line.
///
/// `local_id` is ephemeral: it only exists so the UI can remove a staged
/// line again, and it is never sent to the remote system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingLine {
    pub local_id: Uuid,
    pub product_id: String,
    pub product_label: String,
    pub size: SizeKey,
    pub size_label: String,
    pub quantity: Decimal,
}

impl PendingLine {
    pub fn new(
        product_id: impl Into<String>,
        product_label: impl Into<String>,
        size: SizeKey,
        size_label: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            product_id: product_id.into(),
            product_label: product_label.into(),
            size,
            size_label: size_label.into(),
            quantity,
        }
    }

    /// Whether this line draws from the given (product, size) stock bucket.
    pub fn matches(&self, product_id: &str, size: &SizeKey) -> bool {
        self.product_id == product_id && &self.size == size
    }
}

/// Header plus the ordered sequence of staged lines for one transfer.
///
/// Lines only enter through [`TransferBatch::add`], which trusts that the
/// caller validated the line against the ledger view current at that
/// moment; the batch itself never re-validates. Append order is preserved
/// and reproduced in the outgoing payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferBatch {
    pub origin_location_id: Option<String>,
    pub destination_location_id: Option<String>,
    pub counterparty_id: Option<String>,
    lines: Vec<PendingLine>,
}

impl TransferBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated line. Validation is the caller's responsibility:
    /// the ledger view changes after every add, so re-checking here against
    /// a stale figure would be wrong anyway.
    pub fn add(&mut self, line: PendingLine) {
        self.lines.push(line);
    }

    /// Remove a staged line by its ephemeral id.
    pub fn remove(&mut self, local_id: Uuid) -> Option<PendingLine> {
        let index = self.lines.iter().position(|l| l.local_id == local_id)?;
        Some(self.lines.remove(index))
    }

    pub fn lines(&self) -> &[PendingLine] {
        &self.lines
    }

    /// Clear all staged lines. The header survives so the user can start
    /// the next batch without re-selecting locations and counterparty.
    pub fn reset(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all staged quantities, for the staging table footer.
    pub fn total_quantity(&self) -> Decimal {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check the submission invariants: complete header, distinct origin
    /// and destination, at least one line. Violations never reach the
    /// remote system.
    pub fn ready_for_submit(&self) -> Result<(), BatchValidationError> {
        let origin = self
            .origin_location_id
            .as_deref()
            .ok_or(BatchValidationError::MissingOrigin)?;
        let destination = self
            .destination_location_id
            .as_deref()
            .ok_or(BatchValidationError::MissingDestination)?;
        if origin == destination {
            return Err(BatchValidationError::SameOriginAndDestination);
        }
        if self.counterparty_id.is_none() {
            return Err(BatchValidationError::MissingCounterparty);
        }
        if self.lines.is_empty() {
            return Err(BatchValidationError::EmptyBatch);
        }
        Ok(())
    }
}
