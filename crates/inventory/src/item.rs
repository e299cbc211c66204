//! Catalog items: the read model, creation input, and partial updates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{CategoryId, DomainError, DomainResult, ItemId};

/// A catalog item as read back from a store, with its category name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub cost: Decimal,
    pub price: Decimal,
    pub location: String,
    pub vendor: String,
}

impl Item {
    /// Whether stock has fallen to or below the reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// Input for creating an item.
///
/// Only `name` and `category_id` are required on the wire; the caller defaults
/// everything else (zero counts and prices, empty location/vendor) before
/// building a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub category_id: CategoryId,
    pub quantity: i64,
    pub min_quantity: i64,
    pub cost: Decimal,
    pub price: Decimal,
    pub location: String,
    pub vendor: String,
}

impl ItemDraft {
    /// A draft with only the required fields set; the rest at their defaults.
    pub fn new(name: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            name: name.into(),
            category_id,
            quantity: 0,
            min_quantity: 0,
            cost: Decimal::ZERO,
            price: Decimal::ZERO,
            location: String::new(),
            vendor: String::new(),
        }
    }

    /// Validate a draft before it reaches a store.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.min_quantity < 0 {
            return Err(DomainError::validation("minimum quantity cannot be negative"));
        }
        if self.cost < Decimal::ZERO {
            return Err(DomainError::validation("cost cannot be negative"));
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(())
    }
}

/// A partial update to an item.
///
/// `None` fields keep their stored values; `Some` fields overwrite them. An
/// all-`None` patch is a valid no-op against an existing item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub vendor: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.quantity.is_none()
            && self.min_quantity.is_none()
            && self.cost.is_none()
            && self.price.is_none()
            && self.location.is_none()
            && self.vendor.is_none()
    }

    /// Validate the supplied fields only.
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity < 0 {
                return Err(DomainError::validation("quantity cannot be negative"));
            }
        }
        if let Some(min_quantity) = self.min_quantity {
            if min_quantity < 0 {
                return Err(DomainError::validation("minimum quantity cannot be negative"));
            }
        }
        if let Some(cost) = self.cost {
            if cost < Decimal::ZERO {
                return Err(DomainError::validation("cost cannot be negative"));
            }
        }
        if let Some(price) = self.price {
            if price < Decimal::ZERO {
                return Err(DomainError::validation("price cannot be negative"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_drafts_validate_with_defaults() {
        let draft = ItemDraft::new("USB-C Cable", CategoryId::new(1));
        assert_eq!(draft.validate(), Ok(()));
        assert_eq!(draft.quantity, 0);
        assert_eq!(draft.min_quantity, 0);
        assert_eq!(draft.cost, Decimal::ZERO);
        assert_eq!(draft.price, Decimal::ZERO);
        assert_eq!(draft.location, "");
        assert_eq!(draft.vendor, "");
    }

    #[test]
    fn blank_names_fail_validation() {
        for name in ["", "   ", "\t"] {
            let draft = ItemDraft::new(name, CategoryId::new(1));
            assert!(draft.validate().is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn negative_numbers_fail_validation() {
        let mut draft = ItemDraft::new("Cable", CategoryId::new(1));
        draft.quantity = -1;
        assert!(draft.validate().is_err());

        let mut draft = ItemDraft::new("Cable", CategoryId::new(1));
        draft.price = Decimal::new(-1, 2);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn patches_validate_only_supplied_fields() {
        let patch = ItemPatch {
            quantity: Some(5),
            ..ItemPatch::default()
        };
        assert_eq!(patch.validate(), Ok(()));

        let patch = ItemPatch {
            name: Some("  ".to_string()),
            ..ItemPatch::default()
        };
        assert!(patch.validate().is_err());

        let patch = ItemPatch {
            min_quantity: Some(-3),
            ..ItemPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn default_patch_is_empty() {
        assert!(ItemPatch::default().is_empty());
        let patch = ItemPatch {
            vendor: Some("Logitech".to_string()),
            ..ItemPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
