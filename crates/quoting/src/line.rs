//! Document lines shared by quotes and invoices.

use serde::{Deserialize, Serialize};

use vakwerk_core::{Cents, DomainError, DomainResult, VatRate};
use vakwerk_inventory::InventoryItemId;

/// A material line: something sold by quantity.
///
/// Lines that originate from stock carry the inventory item reference, so a
/// later work-order conversion knows which materials to reserve. Free-form
/// lines (subcontracted work, one-off purchases) leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub inventory_item_id: Option<InventoryItemId>,
    pub description: String,
    pub quantity: i64,
    /// Unit price excluding VAT, in cents.
    pub price_per_unit: Cents,
}

impl QuoteItem {
    /// Line total excluding VAT. Derived, never stored.
    pub fn line_total(&self) -> Cents {
        self.quantity.max(0) as u64 * self.price_per_unit
    }
}

/// A labor line: time sold at an hourly rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborLine {
    pub description: String,
    /// Labor time in whole minutes.
    pub minutes: u32,
    /// Hourly rate excluding VAT, in cents.
    pub hourly_rate: Cents,
}

impl LaborLine {
    /// Line total excluding VAT: rate × minutes / 60, rounded half up.
    pub fn line_total(&self) -> Cents {
        (self.hourly_rate * self.minutes as u64 + 30) / 60
    }
}

/// Derived totals for a document (quote or invoice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    pub items_subtotal: Cents,
    pub labor_subtotal: Cents,
    /// Sum of both subtotals, excluding VAT.
    pub subtotal: Cents,
    pub vat_amount: Cents,
    /// Subtotal plus VAT.
    pub total: Cents,
}

/// Compute document totals from lines.
///
/// `total == subtotal + vat_amount` holds by construction; totals are always
/// recomputed from the lines and never stored independently.
pub fn document_totals(items: &[QuoteItem], labor: &[LaborLine], vat_rate: VatRate) -> DocumentTotals {
    let items_subtotal: Cents = items.iter().map(QuoteItem::line_total).sum();
    let labor_subtotal: Cents = labor.iter().map(LaborLine::line_total).sum();
    let subtotal = items_subtotal + labor_subtotal;
    let vat_amount = vat_rate.vat_amount_of(subtotal);
    DocumentTotals {
        items_subtotal,
        labor_subtotal,
        subtotal,
        vat_amount,
        total: subtotal + vat_amount,
    }
}

/// Validate document lines: at least one material line, no blank
/// descriptions, positive quantities and labor times.
pub fn validate_lines(items: &[QuoteItem], labor: &[LaborLine]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation("at least one item is required"));
    }
    for item in items {
        if item.description.trim().is_empty() {
            return Err(DomainError::validation("item description is required"));
        }
        if item.quantity <= 0 {
            return Err(DomainError::validation("item quantity must be positive"));
        }
    }
    for line in labor {
        if line.description.trim().is_empty() {
            return Err(DomainError::validation("labor description is required"));
        }
        if line.minutes == 0 {
            return Err(DomainError::validation("labor time must be positive"));
        }
    }
    Ok(())
}
