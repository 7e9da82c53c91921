//! Advisory material-availability checks.
//!
//! Availability is checked before a work order is opened or converted, but a
//! shortage never blocks the operation: the caller surfaces the shortages as
//! warnings and the user decides.

use serde::{Deserialize, Serialize};

use crate::item::{InventoryItem, InventoryItemId};

/// A required material on a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub item_id: InventoryItemId,
    pub quantity: i64,
}

/// A shortage found by the advisory check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortage {
    pub item_id: InventoryItemId,
    /// Item name, if the item exists at all.
    pub name: Option<String>,
    pub required: i64,
    pub on_hand: i64,
}

/// Compare requirements against on-hand stock.
///
/// Unknown items are reported as shortages with zero on hand.
pub fn shortages<'a>(
    requirements: &[MaterialRequirement],
    mut lookup: impl FnMut(&InventoryItemId) -> Option<&'a InventoryItem>,
) -> Vec<Shortage> {
    let mut out = Vec::new();
    for req in requirements {
        match lookup(&req.item_id) {
            Some(item) if item.quantity() >= req.quantity => {}
            Some(item) => out.push(Shortage {
                item_id: req.item_id,
                name: Some(item.name().to_string()),
                required: req.quantity,
                on_hand: item.quantity(),
            }),
            None => out.push(Shortage {
                item_id: req.item_id,
                name: None,
                required: req.quantity,
                on_hand: 0,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{AddItem, InventoryCommand, ItemDetails};
    use vakwerk_core::{AggregateId, EmployeeId, VatRate};
    use vakwerk_events::execute;

    fn stocked_item(quantity: i64) -> InventoryItem {
        let id = InventoryItemId::new(AggregateId::new());
        let mut item = InventoryItem::empty(id);
        execute(
            &mut item,
            &InventoryCommand::AddItem(AddItem {
                item_id: id,
                auto_sku: "INV-0001".into(),
                details: ItemDetails {
                    name: "Schroeven 4x40".into(),
                    supplier_sku: None,
                    custom_sku: None,
                    reorder_level: 0,
                    unit: "doos".into(),
                    location: None,
                    purchase_price: 2_50,
                    sale_price: 4_00,
                    vat_rate: VatRate::Standard,
                    supplier_id: None,
                    category_id: None,
                    pos_alert_note: None,
                },
                initial_quantity: quantity,
                performed_by: EmployeeId::new(),
                occurred_at: chrono::Utc::now(),
            }),
        )
        .unwrap();
        item
    }

    #[test]
    fn sufficient_stock_reports_nothing() {
        let item = stocked_item(10);
        let reqs = [MaterialRequirement {
            item_id: item.id_typed(),
            quantity: 10,
        }];
        assert!(shortages(&reqs, |_| Some(&item)).is_empty());
    }

    #[test]
    fn shortfall_and_unknown_items_are_reported() {
        let item = stocked_item(3);
        let unknown = InventoryItemId::new(AggregateId::new());
        let reqs = [
            MaterialRequirement {
                item_id: item.id_typed(),
                quantity: 5,
            },
            MaterialRequirement {
                item_id: unknown,
                quantity: 2,
            },
        ];

        let found = shortages(&reqs, |id| (*id == item.id_typed()).then_some(&item));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].on_hand, 3);
        assert_eq!(found[0].required, 5);
        assert_eq!(found[0].name.as_deref(), Some("Schroeven 4x40"));
        assert!(found[1].name.is_none());
        assert_eq!(found[1].on_hand, 0);
    }
}
