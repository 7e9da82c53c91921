use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, Cents, DomainError, DomainResult, Entity};
use vakwerk_parties::CustomerId;

use crate::cart::{Cart, CartLine};

/// Sale identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(pub AggregateId);

impl SaleId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SaleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A completed counter sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub lines: Vec<CartLine>,
    /// Walk-in sales have no customer.
    pub customer_id: Option<CustomerId>,
    pub date: DateTime<Utc>,
}

impl Sale {
    /// Sale total. Derived from the lines, never stored.
    pub fn total(&self) -> Cents {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Turn a cart into a sale. The cart must not be empty.
///
/// The caller deducts the sold quantities from stock and books the income;
/// checkout itself only snapshots the cart.
pub fn checkout(
    cart: &Cart,
    sale_id: SaleId,
    customer_id: Option<CustomerId>,
    date: DateTime<Utc>,
) -> DomainResult<Sale> {
    if cart.is_empty() {
        return Err(DomainError::validation("cannot check out an empty cart"));
    }
    Ok(Sale {
        id: sale_id,
        lines: cart.lines().to_vec(),
        customer_id,
        date,
    })
}
