//! Reorder report: which items sit at or below their minimum stock, and how
//! many units bring each back up to it.

use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;

use crate::item::Item;

/// Units to order for an item with `quantity` on hand and threshold
/// `min_quantity`. Never negative; an overstocked item orders zero.
pub fn reorder_quantity(quantity: i64, min_quantity: i64) -> i64 {
    (min_quantity - quantity).max(0)
}

/// One row of the reorder report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderLine {
    pub item_id: ItemId,
    pub name: String,
    pub category_name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub vendor: String,
    pub quantity_to_order: i64,
}

impl From<Item> for ReorderLine {
    fn from(item: Item) -> Self {
        let quantity_to_order = reorder_quantity(item.quantity, item.min_quantity);
        Self {
            item_id: item.item_id,
            name: item.name,
            category_name: item.category_name,
            quantity: item.quantity,
            min_quantity: item.min_quantity,
            vendor: item.vendor,
            quantity_to_order,
        }
    }
}

/// Build the reorder report from a full item listing.
///
/// Keeps items with `quantity <= min_quantity`, ordered by item id ascending.
pub fn reorder_report(items: impl IntoIterator<Item = Item>) -> Vec<ReorderLine> {
    let mut lines: Vec<ReorderLine> = items
        .into_iter()
        .filter(Item::needs_reorder)
        .map(ReorderLine::from)
        .collect();
    lines.sort_by_key(|line| line.item_id);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use stockroom_core::CategoryId;

    fn item(id: i64, quantity: i64, min_quantity: i64) -> Item {
        Item {
            item_id: ItemId::new(id),
            name: format!("item-{id}"),
            category_id: CategoryId::new(1),
            category_name: "Cables".to_string(),
            quantity,
            min_quantity,
            cost: Decimal::ZERO,
            price: Decimal::ZERO,
            location: String::new(),
            vendor: String::new(),
        }
    }

    #[test]
    fn report_keeps_only_items_at_or_below_threshold() {
        let report = reorder_report([item(1, 5, 10), item(2, 11, 10), item(3, 10, 10)]);
        let ids: Vec<i64> = report.iter().map(|l| l.item_id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn report_is_ordered_by_item_id() {
        let report = reorder_report([item(9, 0, 1), item(2, 0, 1), item(5, 0, 1)]);
        let ids: Vec<i64> = report.iter().map(|l| l.item_id.as_i64()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn at_threshold_is_low_but_orders_zero() {
        let report = reorder_report([item(1, 10, 10)]);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].quantity_to_order, 0);
    }

    #[test]
    fn lines_carry_the_shortfall() {
        let report = reorder_report([item(7, 2, 9)]);
        assert_eq!(report[0].quantity_to_order, 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn reorder_quantity_is_never_negative(
            quantity in -1_000_000i64..1_000_000,
            min in -1_000_000i64..1_000_000,
        ) {
            prop_assert!(reorder_quantity(quantity, min) >= 0);
        }

        #[test]
        fn stocked_items_order_nothing(
            quantity in 0i64..1_000_000,
            min in 0i64..1_000_000,
        ) {
            prop_assume!(quantity >= min);
            prop_assert_eq!(reorder_quantity(quantity, min), 0);
        }

        #[test]
        fn short_items_order_exactly_the_shortfall(
            quantity in 0i64..1_000_000,
            min in 0i64..1_000_000,
        ) {
            prop_assume!(quantity < min);
            prop_assert_eq!(reorder_quantity(quantity, min), min - quantity);
        }
    }
}
