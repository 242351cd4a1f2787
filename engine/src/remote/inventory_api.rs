//! Inventory API client for the remote stock system
//!
//! Covers the three endpoints the staging workflows consume: the per-size
//! stock query, atomic transfer submission, and single movement
//! submission. Request quantities travel as decimal strings; response
//! quantities arrive as JSON numbers.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use shared::{BatchValidationError, MovementKind, SizeAvailability, SizeKey, StockSnapshot, TransferBatch};

use crate::config::Config;
use crate::error::{EngineError, EngineResult};

/// Boundary to the remote inventory system.
///
/// The workflows talk to the remote service only through this trait, so
/// tests can swap in a scripted double without a network.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Fetch the per-size stock breakdown for a product at one location.
    async fn fetch_stock_by_size(
        &self,
        product_id: &str,
        location_id: &str,
    ) -> EngineResult<StockSnapshot>;

    /// Submit a staged transfer batch as one atomic request.
    async fn submit_transfer(&self, request: &TransferRequest) -> EngineResult<TransferReceipt>;

    /// Submit a single entry/exit movement for an item.
    async fn submit_movement(
        &self,
        item_id: &str,
        request: &MovementRequest,
    ) -> EngineResult<MovementReceipt>;
}

/// Transfer submission payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub counterparty_id: String,
    pub origin_location_id: String,
    pub destination_location_id: String,
    pub items: Vec<TransferItem>,
}

/// One line of a transfer payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    pub product_id: String,
    /// `null` for unsized stock
    pub size_id: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
}

/// Transfer submission result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub items_moved: u32,
}

/// Movement submission payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub kind: MovementKind,
    pub counterparty_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Movement submission result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementReceipt {
    pub id: String,
}

impl TransferRequest {
    /// Check the submission invariants and build the wire payload, with
    /// the staged lines in append order.
    pub fn from_batch(batch: &TransferBatch) -> Result<Self, BatchValidationError> {
        batch.ready_for_submit()?;

        let origin = batch
            .origin_location_id
            .clone()
            .ok_or(BatchValidationError::MissingOrigin)?;
        let destination = batch
            .destination_location_id
            .clone()
            .ok_or(BatchValidationError::MissingDestination)?;
        let counterparty = batch
            .counterparty_id
            .clone()
            .ok_or(BatchValidationError::MissingCounterparty)?;

        Ok(Self {
            counterparty_id: counterparty,
            origin_location_id: origin,
            destination_location_id: destination,
            items: batch
                .lines()
                .iter()
                .map(|line| TransferItem {
                    product_id: line.product_id.clone(),
                    size_id: line.size.clone().into(),
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}

/// Wire row of the stock-by-size response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockRow {
    size_id: Option<String>,
    size_label: String,
    quantity: Decimal,
}

/// Structured rejection body for an over-committed transfer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StockInsufficientBody {
    stock_insufficient: StockInsufficientDetail,
}

#[derive(Debug, Deserialize)]
struct StockInsufficientDetail {
    product: String,
    shortfall: Decimal,
}

#[derive(Debug, Deserialize)]
struct DetailBody {
    detail: String,
}

/// Interpret a non-2xx response body. The remote uses three shapes: the
/// structured stock-insufficient object, a `detail` string, and a
/// field-to-messages map; anything else is passed through verbatim.
fn parse_api_failure(status: u16, body: &str) -> EngineError {
    if let Ok(parsed) = serde_json::from_str::<StockInsufficientBody>(body) {
        return EngineError::StockInsufficientRemote {
            product: parsed.stock_insufficient.product,
            shortfall: parsed.stock_insufficient.shortfall,
        };
    }

    if let Ok(parsed) = serde_json::from_str::<DetailBody>(body) {
        return EngineError::Api {
            status,
            detail: parsed.detail,
        };
    }

    if let Ok(fields) = serde_json::from_str::<HashMap<String, Vec<String>>>(body) {
        let mut parts: Vec<String> = fields
            .into_iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        parts.sort();
        return EngineError::Api {
            status,
            detail: parts.join("; "),
        };
    }

    let body = body.trim();
    EngineError::Api {
        status,
        detail: if body.is_empty() {
            "no error detail".to_string()
        } else {
            body.to_string()
        },
    }
}

/// HTTP client for the inventory API
#[derive(Clone)]
pub struct InventoryApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl InventoryApiClient {
    /// Create a client from engine configuration
    pub fn new(config: &Config) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            auth_token: config.api.auth_token.clone(),
        })
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl InventoryApi for InventoryApiClient {
    async fn fetch_stock_by_size(
        &self,
        product_id: &str,
        location_id: &str,
    ) -> EngineResult<StockSnapshot> {
        if product_id.is_empty() || location_id.is_empty() {
            return Err(EngineError::Validation {
                field: "product_id/location_id".to_string(),
                message: "product and location ids must be non-empty".to_string(),
            });
        }

        let url = format!("{}/products/{}/stock-by-size", self.base_url, product_id);

        let response = self
            .apply_auth(self.client.get(&url).query(&[("locationId", location_id)]))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_failure(status, &body));
        }

        let rows: Vec<StockRow> = response.json().await?;

        let sizes = rows
            .into_iter()
            .map(|row| {
                SizeAvailability::new(SizeKey::from(row.size_id), row.size_label, row.quantity)
            })
            .collect();

        Ok(StockSnapshot::new(product_id, location_id, sizes))
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> EngineResult<TransferReceipt> {
        let url = format!("{}/transfers", self.base_url);

        let response = self
            .apply_auth(self.client.post(&url).json(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_failure(status, &body));
        }

        Ok(response.json().await?)
    }

    async fn submit_movement(
        &self,
        item_id: &str,
        request: &MovementRequest,
    ) -> EngineResult<MovementReceipt> {
        if item_id.is_empty() {
            return Err(EngineError::Validation {
                field: "item_id".to_string(),
                message: "item id must be non-empty".to_string(),
            });
        }

        let url = format!("{}/items/{}/movements", self.base_url, item_id);

        let response = self
            .apply_auth(self.client.post(&url).json(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_api_failure(status, &body));
        }

        Ok(response.json().await?)
    }
}
