//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Key identifying one size bucket of a product's stock.
///
/// Unsized products (raw materials, accessories sold in bulk) use the
/// [`SizeKey::Unsized`] sentinel, which serializes as `null` on the wire.
/// The sentinel compares equal only to itself, so reservation lookups for
/// unsized stock never collide with a real size id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum SizeKey {
    Sized(String),
    Unsized,
}

impl SizeKey {
    pub fn sized(id: impl Into<String>) -> Self {
        SizeKey::Sized(id.into())
    }

    pub fn is_unsized(&self) -> bool {
        matches!(self, SizeKey::Unsized)
    }

    /// Wire form: the size id, or `None` for unsized stock.
    pub fn as_option_str(&self) -> Option<&str> {
        match self {
            SizeKey::Sized(id) => Some(id),
            SizeKey::Unsized => None,
        }
    }
}

impl From<Option<String>> for SizeKey {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(id) => SizeKey::Sized(id),
            None => SizeKey::Unsized,
        }
    }
}

impl From<SizeKey> for Option<String> {
    fn from(value: SizeKey) -> Self {
        match value {
            SizeKey::Sized(id) => Some(id),
            SizeKey::Unsized => None,
        }
    }
}

/// Unit of measure for a product or raw material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    /// Unit-counted goods (finished garments); quantities must be integral
    #[serde(rename = "UN")]
    Unit,
    /// Weight in kilograms (yarn, dyes)
    #[serde(rename = "KG")]
    Kilogram,
    /// Length in meters (fabric rolls)
    #[serde(rename = "MT")]
    Meter,
}

impl UnitOfMeasure {
    pub fn code(&self) -> &'static str {
        match self {
            UnitOfMeasure::Unit => "UN",
            UnitOfMeasure::Kilogram => "KG",
            UnitOfMeasure::Meter => "MT",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "UN" => Some(UnitOfMeasure::Unit),
            "KG" => Some(UnitOfMeasure::Kilogram),
            "MT" => Some(UnitOfMeasure::Meter),
            _ => None,
        }
    }

    /// Unit-counted goods cannot be split; fractional quantities are invalid.
    pub fn is_unit_counted(&self) -> bool {
        matches!(self, UnitOfMeasure::Unit)
    }
}

/// Direction of a single stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Entry,
    Exit,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "ENTRY",
            MovementKind::Exit => "EXIT",
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, MovementKind::Exit)
    }
}
