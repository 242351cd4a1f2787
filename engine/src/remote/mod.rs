//! Remote system integrations

pub mod inventory_api;

pub use inventory_api::{
    InventoryApi, InventoryApiClient, MovementReceipt, MovementRequest, TransferItem,
    TransferReceipt, TransferRequest,
};
