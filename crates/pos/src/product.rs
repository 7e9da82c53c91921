use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, Cents, DomainError, DomainResult, Entity};
use vakwerk_inventory::InventoryItemId;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A sellable product at the counter, backed by an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Counter price including VAT, in cents.
    pub price: Cents,
    pub inventory_item_id: InventoryItemId,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Cents,
        inventory_item_id: InventoryItemId,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if price == 0 {
            return Err(DomainError::validation("product price must be positive"));
        }
        Ok(Self {
            id,
            name,
            price,
            inventory_item_id,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
