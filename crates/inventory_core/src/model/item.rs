//! Item domain model.
//!
//! # Responsibility
//! - Define the record stored in the `items` table and mirrored in the cache.
//! - Validate field-level invariants before any persistence happens.
//!
//! # Invariants
//! - `name` is non-empty after trimming.
//! - `quantity` is never negative.
//! - `price` is finite and never negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of an inventory item.
pub type ItemId = i64;

/// One inventory line: what it is, how many are on hand and the unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
}

/// Field-level violation detected by `Item::validate` and the update checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValidationError {
    EmptyName,
    NegativeQuantity(i64),
    NegativePrice(f64),
    NonFinitePrice(f64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name cannot be empty"),
            Self::NegativeQuantity(value) => {
                write!(f, "quantity cannot be negative, got {value}")
            }
            Self::NegativePrice(value) => write!(f, "price cannot be negative, got {value}"),
            Self::NonFinitePrice(value) => write!(f, "price must be a finite number, got {value}"),
        }
    }
}

impl Error for ItemValidationError {}

impl Item {
    /// Builds an item without validating it; see `validate`.
    pub fn new(id: ItemId, name: impl Into<String>, quantity: i64, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            price,
        }
    }

    /// Checks every field invariant.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        validate_quantity(self.quantity)?;
        validate_price(self.price)
    }

    /// Key used for case-insensitive name uniqueness.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Stock value of this line (`quantity * price`).
    pub fn stock_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} | qty: {} | price: ${:.2}",
            self.id, self.name, self.quantity, self.price
        )
    }
}

/// Trims and lowercases a name.
pub fn normalize_name(name: &str) -> String {
    normalize_case(name.trim())
}

/// Unicode lowercase; shared by uniqueness checks and name search.
pub fn normalize_case(value: &str) -> String {
    value.to_lowercase()
}

pub fn validate_quantity(quantity: i64) -> Result<(), ItemValidationError> {
    if quantity < 0 {
        return Err(ItemValidationError::NegativeQuantity(quantity));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ItemValidationError> {
    if !price.is_finite() {
        return Err(ItemValidationError::NonFinitePrice(price));
    }
    if price < 0.0 {
        return Err(ItemValidationError::NegativePrice(price));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, Item, ItemValidationError};

    #[test]
    fn valid_item_passes_validation() {
        let item = Item::new(1, "Hammer", 5, 9.99);
        assert_eq!(item.validate(), Ok(()));
    }

    #[test]
    fn zero_quantity_and_price_are_allowed() {
        assert_eq!(Item::new(2, "Sample", 0, 0.0).validate(), Ok(()));
    }

    #[test]
    fn blank_name_is_rejected() {
        let item = Item::new(1, "   ", 1, 1.0);
        assert_eq!(item.validate(), Err(ItemValidationError::EmptyName));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert_eq!(
            Item::new(1, "Saw", -1, 1.0).validate(),
            Err(ItemValidationError::NegativeQuantity(-1))
        );
        assert_eq!(
            Item::new(1, "Saw", 1, -0.5).validate(),
            Err(ItemValidationError::NegativePrice(-0.5))
        );
    }

    #[test]
    fn nan_price_is_rejected() {
        let err = Item::new(1, "Saw", 1, f64::NAN).validate().unwrap_err();
        assert!(matches!(err, ItemValidationError::NonFinitePrice(_)));
    }

    #[test]
    fn normalized_name_ignores_case_and_padding() {
        assert_eq!(normalize_name("  HaMmer "), "hammer");
        assert_eq!(
            Item::new(1, "Hammer", 1, 1.0).normalized_name(),
            Item::new(2, "hAMMER", 1, 1.0).normalized_name()
        );
    }

    #[test]
    fn display_uses_two_decimal_price() {
        let item = Item::new(3, "Screwdriver", 40, 4.75);
        assert_eq!(item.to_string(), "[3] Screwdriver | qty: 40 | price: $4.75");
    }
}
