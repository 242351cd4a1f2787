//! Validation rules for staging stock transfers and movements
//!
//! Everything here is a pure function: the reservation ledger is
//! recomputed from the snapshot and the staged lines at every decision
//! point rather than maintained as a running counter, so there is no
//! incremental state that can drift out of sync with its inputs.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{LineCandidate, MovementDraft, PendingLine, StockSnapshot};
use crate::types::{SizeKey, UnitOfMeasure};

/// Reasons a candidate transfer line is rejected, in rule order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineValidationError {
    #[error("no product selected")]
    MissingProduct,

    #[error("quantity {input:?} is not a positive number")]
    InvalidQuantity { input: String },

    #[error("unit-counted goods ({}) cannot be moved in fractional quantities", .unit.code())]
    FractionalUnitsNotAllowed { unit: UnitOfMeasure },

    #[error("insufficient stock for size {size_label}: only {} available", display_available(.available))]
    InsufficientStock {
        size_label: String,
        available: Decimal,
    },
}

/// Reasons a single entry/exit draft is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MovementValidationError {
    #[error("quantity {input:?} is not a positive number")]
    InvalidQuantity { input: String },

    #[error("unit-counted goods ({}) cannot be moved in fractional quantities", .unit.code())]
    FractionalUnitsNotAllowed { unit: UnitOfMeasure },

    #[error("insufficient stock: only {} available at this warehouse", display_available(.available))]
    InsufficientStock { available: Decimal },
}

/// Submission invariants of a transfer batch (checked before any network
/// call).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchValidationError {
    #[error("origin location is not set")]
    MissingOrigin,

    #[error("destination location is not set")]
    MissingDestination,

    #[error("origin and destination must be different locations")]
    SameOriginAndDestination,

    #[error("counterparty is not set")]
    MissingCounterparty,

    #[error("transfer has no lines")]
    EmptyBatch,
}

/// Parse a form quantity: a decimal number strictly greater than zero.
pub fn parse_positive_quantity(input: &str) -> Option<Decimal> {
    let quantity = input.trim().parse::<Decimal>().ok()?;
    if quantity > Decimal::ZERO {
        Some(quantity)
    } else {
        None
    }
}

/// Sum of quantities already staged for exactly this (product, size) key.
/// The unsized sentinel only matches the sentinel.
pub fn reserved_in_batch(lines: &[PendingLine], product_id: &str, size: &SizeKey) -> Decimal {
    lines
        .iter()
        .filter(|l| l.matches(product_id, size))
        .map(|l| l.quantity)
        .sum()
}

/// Authoritative quantity minus what the current batch has already staged
/// for the same (product, size) key.
///
/// The result may be negative when stale data over-committed the key.
/// Callers clamp the figure with [`display_available`] for presentation
/// but must validate against the unclamped value, so an over-commit is
/// rejected instead of silently floored. The snapshot must belong to the
/// same product and origin location the lines draw from.
pub fn adjusted_available(
    snapshot: &StockSnapshot,
    lines: &[PendingLine],
    product_id: &str,
    size: &SizeKey,
) -> Decimal {
    snapshot.available_for(size) - reserved_in_batch(lines, product_id, size)
}

/// Clamp a ledger figure to zero for display.
pub fn display_available(value: &Decimal) -> Decimal {
    (*value).max(Decimal::ZERO)
}

/// Validate a candidate line against the current ledger view.
///
/// Rules apply in order: a product must be selected, the quantity must
/// parse as a positive number, unit-counted goods must be integral, and
/// the quantity must not exceed the adjusted availability (which also
/// rejects any candidate when the key is already over-committed and the
/// adjusted figure is negative). On success the candidate becomes a
/// [`PendingLine`] with a fresh local id, ready to append to the batch.
pub fn validate_line(
    candidate: &LineCandidate,
    adjusted_available: Decimal,
    unit: UnitOfMeasure,
) -> Result<PendingLine, LineValidationError> {
    let product_id = candidate
        .product_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(LineValidationError::MissingProduct)?;

    let quantity = parse_positive_quantity(&candidate.quantity).ok_or_else(|| {
        LineValidationError::InvalidQuantity {
            input: candidate.quantity.clone(),
        }
    })?;

    if unit.is_unit_counted() && !quantity.fract().is_zero() {
        return Err(LineValidationError::FractionalUnitsNotAllowed { unit });
    }

    if quantity > adjusted_available {
        return Err(LineValidationError::InsufficientStock {
            size_label: candidate.size_label.clone(),
            available: adjusted_available,
        });
    }

    Ok(PendingLine::new(
        product_id,
        candidate.product_label.clone(),
        candidate.size.clone(),
        candidate.size_label.clone(),
        quantity,
    ))
}

/// Validate a single entry/exit draft against the item's live stock.
///
/// Entries have no upper bound; exits are bounded by the available
/// quantity at the selected warehouse. Returns the parsed quantity.
pub fn validate_movement(
    draft: &MovementDraft,
    unit: UnitOfMeasure,
    available: Decimal,
) -> Result<Decimal, MovementValidationError> {
    let quantity = parse_positive_quantity(&draft.quantity).ok_or_else(|| {
        MovementValidationError::InvalidQuantity {
            input: draft.quantity.clone(),
        }
    })?;

    if unit.is_unit_counted() && !quantity.fract().is_zero() {
        return Err(MovementValidationError::FractionalUnitsNotAllowed { unit });
    }

    if draft.kind.is_exit() && quantity > available {
        return Err(MovementValidationError::InsufficientStock { available });
    }

    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SizeAvailability, TransferBatch};
    use crate::types::MovementKind;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot_m10_l5() -> StockSnapshot {
        StockSnapshot::new(
            "CAM-001",
            "BOD-A",
            vec![
                SizeAvailability::new(SizeKey::sized("M"), "M", dec("10")),
                SizeAvailability::new(SizeKey::sized("L"), "L", dec("5")),
            ],
        )
    }

    fn candidate(quantity: &str, size: &str) -> LineCandidate {
        LineCandidate {
            product_id: Some("CAM-001".to_string()),
            product_label: "Camisa clásica".to_string(),
            size: SizeKey::sized(size),
            size_label: size.to_string(),
            quantity: quantity.to_string(),
        }
    }

    fn line(product: &str, size: SizeKey, quantity: &str) -> PendingLine {
        PendingLine::new(product, product, size, "", dec(quantity))
    }

    // ========================================================================
    // Quantity Parsing Tests
    // ========================================================================

    #[test]
    fn test_parse_positive_quantity_valid() {
        assert_eq!(parse_positive_quantity("7"), Some(dec("7")));
        assert_eq!(parse_positive_quantity("2.5"), Some(dec("2.5")));
        assert_eq!(parse_positive_quantity("  3 "), Some(dec("3")));
        assert_eq!(parse_positive_quantity("0.001"), Some(dec("0.001")));
    }

    #[test]
    fn test_parse_positive_quantity_invalid() {
        assert_eq!(parse_positive_quantity("0"), None);
        assert_eq!(parse_positive_quantity("-1"), None);
        assert_eq!(parse_positive_quantity("abc"), None);
        assert_eq!(parse_positive_quantity(""), None);
        assert_eq!(parse_positive_quantity("1,5"), None);
    }

    // ========================================================================
    // Reservation Ledger Tests
    // ========================================================================

    #[test]
    fn test_reserved_in_batch_empty() {
        assert_eq!(
            reserved_in_batch(&[], "CAM-001", &SizeKey::sized("M")),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_reserved_in_batch_sums_exact_key_only() {
        let lines = vec![
            line("CAM-001", SizeKey::sized("M"), "3"),
            line("CAM-001", SizeKey::sized("M"), "2"),
            line("CAM-001", SizeKey::sized("L"), "4"),
            line("CAM-002", SizeKey::sized("M"), "9"),
        ];

        assert_eq!(
            reserved_in_batch(&lines, "CAM-001", &SizeKey::sized("M")),
            dec("5")
        );
        assert_eq!(
            reserved_in_batch(&lines, "CAM-001", &SizeKey::sized("L")),
            dec("4")
        );
        assert_eq!(
            reserved_in_batch(&lines, "CAM-002", &SizeKey::sized("M")),
            dec("9")
        );
    }

    #[test]
    fn test_reserved_sentinel_matches_only_sentinel() {
        let lines = vec![
            line("TEL-040", SizeKey::Unsized, "12.5"),
            line("TEL-040", SizeKey::sized("M"), "2"),
        ];

        assert_eq!(
            reserved_in_batch(&lines, "TEL-040", &SizeKey::Unsized),
            dec("12.5")
        );
        assert_eq!(
            reserved_in_batch(&lines, "TEL-040", &SizeKey::sized("M")),
            dec("2")
        );
    }

    #[test]
    fn test_adjusted_available_formula() {
        let snapshot = snapshot_m10_l5();
        let lines = vec![line("CAM-001", SizeKey::sized("M"), "7")];

        assert_eq!(
            adjusted_available(&snapshot, &lines, "CAM-001", &SizeKey::sized("M")),
            dec("3")
        );
        // Other keys are untouched by that line.
        assert_eq!(
            adjusted_available(&snapshot, &lines, "CAM-001", &SizeKey::sized("L")),
            dec("5")
        );
    }

    #[test]
    fn test_adjusted_available_missing_size_counts_as_zero() {
        let snapshot = snapshot_m10_l5();
        let lines = vec![line("CAM-001", SizeKey::sized("XL"), "2")];

        // bySize[XL] ?? 0 minus 2 staged: negative, not floored.
        assert_eq!(
            adjusted_available(&snapshot, &lines, "CAM-001", &SizeKey::sized("XL")),
            dec("-2")
        );
    }

    #[test]
    fn test_adjusted_available_recompute_has_no_drift() {
        let snapshot = snapshot_m10_l5();
        let lines = vec![line("CAM-001", SizeKey::sized("M"), "4")];

        let first = adjusted_available(&snapshot, &lines, "CAM-001", &SizeKey::sized("M"));
        let second = adjusted_available(&snapshot, &lines, "CAM-001", &SizeKey::sized("M"));
        assert_eq!(first, second);
        assert_eq!(first, dec("6"));
    }

    #[test]
    fn test_display_available_clamps_to_zero() {
        assert_eq!(display_available(&dec("3")), dec("3"));
        assert_eq!(display_available(&dec("0")), dec("0"));
        assert_eq!(display_available(&dec("-2")), dec("0"));
    }

    // ========================================================================
    // Line Validator Tests
    // ========================================================================

    #[test]
    fn test_validate_line_missing_product_checked_first() {
        let mut c = candidate("not-a-number", "M");
        c.product_id = None;

        assert_eq!(
            validate_line(&c, dec("10"), UnitOfMeasure::Unit),
            Err(LineValidationError::MissingProduct)
        );
    }

    #[test]
    fn test_validate_line_empty_product_id_is_missing() {
        let mut c = candidate("3", "M");
        c.product_id = Some(String::new());

        assert_eq!(
            validate_line(&c, dec("10"), UnitOfMeasure::Unit),
            Err(LineValidationError::MissingProduct)
        );
    }

    #[test]
    fn test_validate_line_invalid_quantity_before_unit_check() {
        let c = candidate("abc", "M");

        assert_eq!(
            validate_line(&c, dec("10"), UnitOfMeasure::Unit),
            Err(LineValidationError::InvalidQuantity {
                input: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_validate_line_rejects_fractional_units() {
        let c = candidate("2.5", "M");

        assert_eq!(
            validate_line(&c, dec("10"), UnitOfMeasure::Unit),
            Err(LineValidationError::FractionalUnitsNotAllowed {
                unit: UnitOfMeasure::Unit
            })
        );
    }

    #[test]
    fn test_validate_line_allows_fractional_weight() {
        let c = candidate("2.5", "M");

        let result = validate_line(&c, dec("10"), UnitOfMeasure::Kilogram).unwrap();
        assert_eq!(result.quantity, dec("2.5"));
    }

    #[test]
    fn test_validate_line_rejects_over_available() {
        let c = candidate("4", "M");

        assert_eq!(
            validate_line(&c, dec("3"), UnitOfMeasure::Unit),
            Err(LineValidationError::InsufficientStock {
                size_label: "M".to_string(),
                available: dec("3"),
            })
        );
    }

    #[test]
    fn test_validate_line_exact_available_passes() {
        let c = candidate("3", "M");

        let result = validate_line(&c, dec("3"), UnitOfMeasure::Unit).unwrap();
        assert_eq!(result.quantity, dec("3"));
        assert_eq!(result.product_id, "CAM-001");
        assert_eq!(result.size, SizeKey::sized("M"));
    }

    #[test]
    fn test_validate_line_rejects_when_already_over_committed() {
        // Negative adjusted availability: every positive candidate fails.
        let c = candidate("1", "M");

        assert_eq!(
            validate_line(&c, dec("-2"), UnitOfMeasure::Unit),
            Err(LineValidationError::InsufficientStock {
                size_label: "M".to_string(),
                available: dec("-2"),
            })
        );
    }

    #[test]
    fn test_validate_line_mints_distinct_local_ids() {
        let c = candidate("1", "M");

        let a = validate_line(&c, dec("10"), UnitOfMeasure::Unit).unwrap();
        let b = validate_line(&c, dec("10"), UnitOfMeasure::Unit).unwrap();
        assert_ne!(a.local_id, b.local_id);
    }

    #[test]
    fn test_insufficient_stock_message_clamps_display() {
        let err = LineValidationError::InsufficientStock {
            size_label: "M".to_string(),
            available: dec("-2"),
        };

        let message = err.to_string();
        assert!(message.contains("only 0 available"), "got: {message}");
    }

    // ========================================================================
    // Staging Scenario Tests
    // ========================================================================

    #[test]
    fn test_staging_scenario_m10() {
        // Snapshot {M: 10, L: 5}; stage {M, 7}; attempt {M, 4}; stage {M, 3}.
        let snapshot = snapshot_m10_l5();
        let mut batch = TransferBatch::new();

        let adj = adjusted_available(&snapshot, batch.lines(), "CAM-001", &SizeKey::sized("M"));
        let first = validate_line(&candidate("7", "M"), adj, UnitOfMeasure::Unit).unwrap();
        batch.add(first);

        let adj = adjusted_available(&snapshot, batch.lines(), "CAM-001", &SizeKey::sized("M"));
        assert_eq!(adj, dec("3"));

        assert_eq!(
            validate_line(&candidate("4", "M"), adj, UnitOfMeasure::Unit),
            Err(LineValidationError::InsufficientStock {
                size_label: "M".to_string(),
                available: dec("3"),
            })
        );

        let third = validate_line(&candidate("3", "M"), adj, UnitOfMeasure::Unit).unwrap();
        batch.add(third);

        let adj = adjusted_available(&snapshot, batch.lines(), "CAM-001", &SizeKey::sized("M"));
        assert_eq!(adj, dec("0"));
    }

    #[test]
    fn test_add_then_remove_restores_ledger() {
        let snapshot = snapshot_m10_l5();
        let mut batch = TransferBatch::new();
        batch.add(line("CAM-001", SizeKey::sized("M"), "2"));

        let before = adjusted_available(&snapshot, batch.lines(), "CAM-001", &SizeKey::sized("M"));

        let staged = line("CAM-001", SizeKey::sized("M"), "5");
        let staged_id = staged.local_id;
        batch.add(staged);
        assert_eq!(
            adjusted_available(&snapshot, batch.lines(), "CAM-001", &SizeKey::sized("M")),
            before - dec("5")
        );

        batch.remove(staged_id).unwrap();
        assert_eq!(
            adjusted_available(&snapshot, batch.lines(), "CAM-001", &SizeKey::sized("M")),
            before
        );
    }

    // ========================================================================
    // Batch Invariant Tests
    // ========================================================================

    fn complete_batch() -> TransferBatch {
        let mut batch = TransferBatch::new();
        batch.origin_location_id = Some("BOD-A".to_string());
        batch.destination_location_id = Some("BOD-B".to_string());
        batch.counterparty_id = Some("TER-9".to_string());
        batch.add(line("CAM-001", SizeKey::sized("M"), "3"));
        batch
    }

    #[test]
    fn test_ready_for_submit_ok() {
        assert_eq!(complete_batch().ready_for_submit(), Ok(()));
    }

    #[test]
    fn test_ready_for_submit_missing_header_fields() {
        let mut batch = complete_batch();
        batch.origin_location_id = None;
        assert_eq!(
            batch.ready_for_submit(),
            Err(BatchValidationError::MissingOrigin)
        );

        let mut batch = complete_batch();
        batch.destination_location_id = None;
        assert_eq!(
            batch.ready_for_submit(),
            Err(BatchValidationError::MissingDestination)
        );

        let mut batch = complete_batch();
        batch.counterparty_id = None;
        assert_eq!(
            batch.ready_for_submit(),
            Err(BatchValidationError::MissingCounterparty)
        );
    }

    #[test]
    fn test_ready_for_submit_same_origin_and_destination() {
        let mut batch = complete_batch();
        batch.destination_location_id = Some("BOD-A".to_string());
        assert_eq!(
            batch.ready_for_submit(),
            Err(BatchValidationError::SameOriginAndDestination)
        );
    }

    #[test]
    fn test_ready_for_submit_empty_batch() {
        let mut batch = complete_batch();
        batch.reset();
        assert_eq!(
            batch.ready_for_submit(),
            Err(BatchValidationError::EmptyBatch)
        );
    }

    #[test]
    fn test_batch_preserves_append_order_and_totals() {
        let mut batch = TransferBatch::new();
        batch.add(line("CAM-001", SizeKey::sized("M"), "3"));
        batch.add(line("CAM-001", SizeKey::sized("L"), "1"));
        batch.add(line("CAM-002", SizeKey::Unsized, "2.5"));

        let sizes: Vec<_> = batch.lines().iter().map(|l| l.size.clone()).collect();
        assert_eq!(
            sizes,
            vec![SizeKey::sized("M"), SizeKey::sized("L"), SizeKey::Unsized]
        );
        assert_eq!(batch.line_count(), 3);
        assert_eq!(batch.total_quantity(), dec("6.5"));

        batch.reset();
        assert!(batch.is_empty());
        assert_eq!(batch.total_quantity(), Decimal::ZERO);
    }

    #[test]
    fn test_batch_remove_unknown_id_is_none() {
        let mut batch = TransferBatch::new();
        batch.add(line("CAM-001", SizeKey::sized("M"), "3"));
        assert!(batch.remove(uuid::Uuid::new_v4()).is_none());
        assert_eq!(batch.line_count(), 1);
    }

    // ========================================================================
    // Movement Validator Tests
    // ========================================================================

    #[test]
    fn test_validate_movement_entry_has_no_upper_bound() {
        let draft = MovementDraft::new(MovementKind::Entry, "500");
        assert_eq!(
            validate_movement(&draft, UnitOfMeasure::Kilogram, dec("1")),
            Ok(dec("500"))
        );
    }

    #[test]
    fn test_validate_movement_exit_bounded_by_available() {
        let draft = MovementDraft::new(MovementKind::Exit, "60");
        assert_eq!(
            validate_movement(&draft, UnitOfMeasure::Kilogram, dec("50")),
            Err(MovementValidationError::InsufficientStock {
                available: dec("50")
            })
        );
    }

    #[test]
    fn test_validate_movement_exit_exact_available_passes() {
        let draft = MovementDraft::new(MovementKind::Exit, "50");
        assert_eq!(
            validate_movement(&draft, UnitOfMeasure::Kilogram, dec("50")),
            Ok(dec("50"))
        );
    }

    #[test]
    fn test_validate_movement_rejects_fractional_units() {
        let draft = MovementDraft::new(MovementKind::Entry, "2.5");
        assert_eq!(
            validate_movement(&draft, UnitOfMeasure::Unit, dec("100")),
            Err(MovementValidationError::FractionalUnitsNotAllowed {
                unit: UnitOfMeasure::Unit
            })
        );
    }

    #[test]
    fn test_validate_movement_rejects_non_positive() {
        let draft = MovementDraft::new(MovementKind::Exit, "0");
        assert_eq!(
            validate_movement(&draft, UnitOfMeasure::Kilogram, dec("50")),
            Err(MovementValidationError::InvalidQuantity {
                input: "0".to_string()
            })
        );
    }
}
