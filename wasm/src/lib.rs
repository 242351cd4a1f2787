//! WebAssembly module for Apparel Stock Management Platform
//!
//! Runs the shared validation rules client-side so the transfer and
//! movement forms can check input on every keystroke:
//! - Quantity parsing
//! - Adjusted availability (snapshot minus staged lines)
//! - Candidate line validation
//! - Movement draft validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Parse a quantity string as entered in a form field
#[wasm_bindgen]
pub fn parse_quantity(input: &str) -> Result<f64, JsValue> {
    let quantity = parse_positive_quantity(input).ok_or_else(|| {
        JsValue::from_str(&format!("quantity {:?} is not a positive number", input))
    })?;
    Ok(quantity.to_string().parse().unwrap_or(0.0))
}

/// Whether goods measured in this unit move only in whole quantities
#[wasm_bindgen]
pub fn is_integral_unit(unit_code: &str) -> bool {
    UnitOfMeasure::from_code(unit_code)
        .map(|unit| unit.is_unit_counted())
        .unwrap_or(false)
}

/// Adjusted availability for one (product, size) bucket: the snapshot
/// figure minus quantities already staged. May be negative.
#[wasm_bindgen]
pub fn compute_adjusted_availability(
    snapshot_json: &str,
    staged_json: &str,
    product_id: &str,
    size_json: &str,
) -> Result<f64, JsValue> {
    let snapshot: StockSnapshot = serde_json::from_str(snapshot_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid snapshot JSON: {}", e)))?;
    let staged: Vec<PendingLine> = serde_json::from_str(staged_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid staged lines JSON: {}", e)))?;
    let size: SizeKey = serde_json::from_str(size_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid size JSON: {}", e)))?;

    let adjusted = adjusted_available(&snapshot, &staged, product_id, &size);
    Ok(adjusted.to_string().parse().unwrap_or(0.0))
}

/// Adjusted availability clamped to zero, as shown next to the size picker
#[wasm_bindgen]
pub fn compute_display_availability(
    snapshot_json: &str,
    staged_json: &str,
    product_id: &str,
    size_json: &str,
) -> Result<f64, JsValue> {
    let adjusted =
        compute_adjusted_availability(snapshot_json, staged_json, product_id, size_json)?;
    Ok(adjusted.max(0.0))
}

/// Validate a candidate transfer line against the current ledger view.
/// Returns the staged line as JSON.
#[wasm_bindgen]
pub fn check_transfer_line(
    candidate_json: &str,
    snapshot_json: &str,
    staged_json: &str,
    unit_code: &str,
) -> Result<String, JsValue> {
    let candidate: LineCandidate = serde_json::from_str(candidate_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid candidate JSON: {}", e)))?;
    let snapshot: StockSnapshot = serde_json::from_str(snapshot_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid snapshot JSON: {}", e)))?;
    let staged: Vec<PendingLine> = serde_json::from_str(staged_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid staged lines JSON: {}", e)))?;
    let unit = UnitOfMeasure::from_code(unit_code)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown unit code: {}", unit_code)))?;

    let adjusted = match &candidate.product_id {
        Some(product_id) => adjusted_available(&snapshot, &staged, product_id, &candidate.size),
        None => Decimal::ZERO,
    };

    let line = validate_line(&candidate, adjusted, unit)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&line)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Validate a movement draft against the loaded warehouse figure.
/// Returns the parsed quantity.
#[wasm_bindgen]
pub fn check_movement_draft(
    draft_json: &str,
    unit_code: &str,
    available: f64,
) -> Result<f64, JsValue> {
    let draft: MovementDraft = serde_json::from_str(draft_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid draft JSON: {}", e)))?;
    let unit = UnitOfMeasure::from_code(unit_code)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown unit code: {}", unit_code)))?;
    let available = Decimal::try_from(available)
        .map_err(|e| JsValue::from_str(&format!("Invalid available quantity: {}", e)))?;

    let quantity = validate_movement(&draft, unit, available)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(quantity.to_string().parse().unwrap_or(0.0))
}

/// Check the batch header and lines are ready for submission
#[wasm_bindgen]
pub fn check_batch_ready(batch_json: &str) -> Result<(), JsValue> {
    let batch: TransferBatch = serde_json::from_str(batch_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid batch JSON: {}", e)))?;
    batch
        .ready_for_submit()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
