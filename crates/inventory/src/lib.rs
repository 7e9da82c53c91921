//! Inventory domain module.
//!
//! Stock items with prices, VAT rates and SKUs, plus the pure calculation
//! utilities over them (margins, VAT reports, stock statistics) and the
//! advisory material-availability check used by work orders.

pub mod availability;
pub mod calculations;
pub mod category;
pub mod item;
pub mod sku;

pub use availability::{MaterialRequirement, Shortage, shortages};
pub use category::{Category, CategoryId};
pub use item::{
    AddItem, AdjustQuantity, InventoryCommand, InventoryEvent, InventoryItem, InventoryItemId,
    ItemDetails, Restock, UpdateDetails,
};
pub use sku::next_auto_sku;
