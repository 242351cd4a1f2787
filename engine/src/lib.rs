//! Apparel Stock Management Platform - Workflow Engine
//!
//! The reservation-aware staging core behind the stock administration UI:
//! authoritative stock snapshots per (product, location), a locally
//! adjusted availability figure as transfer lines are staged, atomic batch
//! submission, and the single entry/exit movement state machine. The
//! authoritative inventory system stays remote; this crate owns everything
//! in front of it.

pub mod config;
pub mod error;
pub mod movement;
pub mod remote;
pub mod transfer;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use movement::{ItemSelection, MovementPhase, MovementWorkflow};
pub use remote::{InventoryApi, InventoryApiClient};
pub use transfer::{ProductSelection, TransferWorkflow};
