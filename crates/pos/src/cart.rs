use serde::{Deserialize, Serialize};

use vakwerk_core::{Cents, DomainError, DomainResult};
use vakwerk_inventory::InventoryItemId;

use crate::product::{Product, ProductId};

/// One cart position: a product snapshot plus a quantity.
///
/// The price is copied from the product at add time, so a later catalog
/// change does not silently reprice a sale in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub inventory_item_id: InventoryItemId,
    pub name: String,
    /// Unit price including VAT, in cents.
    pub unit_price: Cents,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> Cents {
        self.quantity.max(0) as u64 * self.unit_price
    }
}

/// The counter cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total cart value. Derived, never stored.
    pub fn total(&self) -> Cents {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add a product; adding the same product again merges quantities.
    pub fn add(&mut self, product: &Product, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine {
                product_id: product.id,
                inventory_item_id: product.inventory_item_id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            }),
        }
        Ok(())
    }

    /// Set a line's quantity; must stay positive (use `remove` to drop it).
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(DomainError::not_found)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, product_id: ProductId) -> DomainResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vakwerk_core::AggregateId;

    fn product(price: Cents) -> Product {
        Product::new(
            ProductId::new(AggregateId::new()),
            "Lamp E27",
            price,
            InventoryItemId::new(AggregateId::new()),
        )
        .unwrap()
    }

    #[test]
    fn adding_the_same_product_merges_lines() {
        let p = product(4_95);
        let mut cart = Cart::new();
        cart.add(&p, 2).unwrap();
        cart.add(&p, 1).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total(), 14_85);
    }

    #[test]
    fn price_changes_do_not_reprice_the_cart() {
        let mut p = product(4_95);
        let mut cart = Cart::new();
        cart.add(&p, 1).unwrap();

        p.price = 9_95;
        assert_eq!(cart.total(), 4_95);
    }

    #[test]
    fn quantity_edits_are_validated() {
        let p = product(4_95);
        let mut cart = Cart::new();
        cart.add(&p, 1).unwrap();

        assert!(cart.set_quantity(p.id, 0).is_err());
        cart.set_quantity(p.id, 4).unwrap();
        assert_eq!(cart.total(), 19_80);

        cart.remove(p.id).unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove(p.id).is_err());
    }
}
