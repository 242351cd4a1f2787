//! Error handling for the Apparel Stock Management engine
//!
//! Local validation failures keep their typed payloads from `shared`;
//! remote rejections carry whatever structure the inventory API returned.

use rust_decimal::Decimal;
use thiserror::Error;

use shared::{BatchValidationError, LineValidationError, MovementValidationError};

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Local validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Batch not ready: {0}")]
    Batch(#[from] BatchValidationError),

    #[error("Invalid transfer line: {0}")]
    Line(#[from] LineValidationError),

    #[error("Invalid movement: {0}")]
    Movement(#[from] MovementValidationError),

    // Workflow state errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Stock snapshot unavailable: {0}")]
    SnapshotUnavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Remote rejections
    #[error("Insufficient stock on remote: product {product} short by {shortfall}")]
    StockInsufficientRemote { product: String, shortfall: Decimal },

    #[error("Inventory API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Inventory API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
