//! Single-movement models

use serde::{Deserialize, Serialize};

use crate::types::MovementKind;

/// A single entry/exit as entered in the form, before validation.
///
/// The item, warehouse, and counterparty are workflow state, not part of
/// the draft: the draft only carries what changes per submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementDraft {
    pub kind: MovementKind,
    pub quantity: String,
    pub invoice_ref: Option<String>,
    pub note: Option<String>,
}

impl MovementDraft {
    pub fn new(kind: MovementKind, quantity: impl Into<String>) -> Self {
        Self {
            kind,
            quantity: quantity.into(),
            invoice_ref: None,
            note: None,
        }
    }

    pub fn with_invoice_ref(mut self, invoice_ref: impl Into<String>) -> Self {
        self.invoice_ref = Some(invoice_ref.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
