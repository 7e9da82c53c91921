use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{
    Aggregate, AggregateId, AggregateRoot, Cents, DomainError, EmployeeId, VatRate,
};
use vakwerk_events::Event;
use vakwerk_parties::SupplierId;

use crate::calculations::margin_tenths;
use crate::category::CategoryId;

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(pub AggregateId);

impl InventoryItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Editable item attributes, shared by the add and update commands.
///
/// Quantity is deliberately absent: stock levels only move through
/// `AdjustQuantity`/`Restock` so that every movement is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub name: String,
    /// SKU printed on the supplier's packaging, if any.
    pub supplier_sku: Option<String>,
    /// Free-form SKU chosen by the user; wins over the others for display.
    pub custom_sku: Option<String>,
    pub reorder_level: i64,
    /// Sales unit: "stuk", "meter", "kg", …
    pub unit: String,
    pub location: Option<String>,
    /// Purchase price excluding VAT, in cents.
    pub purchase_price: Cents,
    /// Sale price excluding VAT, in cents.
    pub sale_price: Cents,
    pub vat_rate: VatRate,
    pub supplier_id: Option<SupplierId>,
    pub category_id: Option<CategoryId>,
    /// Note shown at the POS when this item is scanned.
    pub pos_alert_note: Option<String>,
}

/// Aggregate root: InventoryItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    id: InventoryItemId,
    /// Generated `INV-NNNN` SKU, assigned once at creation.
    auto_sku: String,
    details: ItemDetails,
    quantity: i64,
    last_restocked: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl InventoryItem {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InventoryItemId) -> Self {
        Self {
            id,
            auto_sku: String::new(),
            details: ItemDetails {
                name: String::new(),
                supplier_sku: None,
                custom_sku: None,
                reorder_level: 0,
                unit: String::new(),
                location: None,
                purchase_price: 0,
                sale_price: 0,
                vat_rate: VatRate::default(),
                supplier_id: None,
                category_id: None,
                pos_alert_note: None,
            },
            quantity: 0,
            last_restocked: None,
            created_at: None,
            updated_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InventoryItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn details(&self) -> &ItemDetails {
        &self.details
    }

    pub fn auto_sku(&self) -> &str {
        &self.auto_sku
    }

    /// SKU shown in lists and on documents: custom > supplier > auto.
    pub fn display_sku(&self) -> &str {
        self.details
            .custom_sku
            .as_deref()
            .or(self.details.supplier_sku.as_deref())
            .unwrap_or(&self.auto_sku)
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn reorder_level(&self) -> i64 {
        self.details.reorder_level
    }

    pub fn purchase_price(&self) -> Cents {
        self.details.purchase_price
    }

    pub fn sale_price(&self) -> Cents {
        self.details.sale_price
    }

    pub fn vat_rate(&self) -> VatRate {
        self.details.vat_rate
    }

    pub fn last_restocked(&self) -> Option<DateTime<Utc>> {
        self.last_restocked
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Profit margin in tenths of a percent, derived from the prices.
    ///
    /// Never stored; 0 when the purchase price is 0.
    pub fn margin_tenths(&self) -> i64 {
        margin_tenths(self.details.purchase_price, self.details.sale_price)
    }

    /// Sale price including VAT, in cents.
    pub fn sale_price_inclusive(&self) -> Cents {
        self.details.vat_rate.inclusive_of(self.details.sale_price)
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.details.reorder_level
    }
}

impl AggregateRoot for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl vakwerk_core::Entity for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item_id: InventoryItemId,
    pub auto_sku: String,
    pub details: ItemDetails,
    pub initial_quantity: i64,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub item_id: InventoryItemId,
    pub details: ItemDetails,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustQuantity {
    pub item_id: InventoryItemId,
    /// Positive or negative movement. Stock is clamped at zero: consuming
    /// more than is on hand empties the shelf rather than failing the
    /// operation that caused it.
    pub delta: i64,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub item_id: InventoryItemId,
    pub quantity_added: i64,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    AddItem(AddItem),
    UpdateDetails(UpdateDetails),
    AdjustQuantity(AdjustQuantity),
    Restock(Restock),
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: InventoryItemId,
    pub auto_sku: String,
    pub details: ItemDetails,
    pub initial_quantity: i64,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsUpdated {
    pub item_id: InventoryItemId,
    pub details: ItemDetails,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityAdjusted {
    pub item_id: InventoryItemId,
    pub delta: i64,
    /// Resulting quantity after clamping at zero.
    pub new_quantity: i64,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Restocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restocked {
    pub item_id: InventoryItemId,
    pub quantity_added: i64,
    pub new_quantity: i64,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    DetailsUpdated(DetailsUpdated),
    QuantityAdjusted(QuantityAdjusted),
    Restocked(Restocked),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded(_) => "inventory.item.added",
            InventoryEvent::DetailsUpdated(_) => "inventory.item.details_updated",
            InventoryEvent::QuantityAdjusted(_) => "inventory.item.quantity_adjusted",
            InventoryEvent::Restocked(_) => "inventory.item.restocked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemAdded(e) => e.occurred_at,
            InventoryEvent::DetailsUpdated(e) => e.occurred_at,
            InventoryEvent::QuantityAdjusted(e) => e.occurred_at,
            InventoryEvent::Restocked(e) => e.occurred_at,
        }
    }
}

impl Aggregate for InventoryItem {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemAdded(e) => {
                self.id = e.item_id;
                self.auto_sku = e.auto_sku.clone();
                self.details = e.details.clone();
                self.quantity = e.initial_quantity;
                self.created_at = Some(e.occurred_at);
                self.updated_at = Some(e.occurred_at);
                self.created = true;
            }
            InventoryEvent::DetailsUpdated(e) => {
                self.details = e.details.clone();
                self.updated_at = Some(e.occurred_at);
            }
            InventoryEvent::QuantityAdjusted(e) => {
                self.quantity = e.new_quantity;
                self.updated_at = Some(e.occurred_at);
            }
            InventoryEvent::Restocked(e) => {
                self.quantity = e.new_quantity;
                self.last_restocked = Some(e.occurred_at);
                self.updated_at = Some(e.occurred_at);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::AddItem(cmd) => self.handle_add(cmd),
            InventoryCommand::UpdateDetails(cmd) => self.handle_update(cmd),
            InventoryCommand::AdjustQuantity(cmd) => self.handle_adjust(cmd),
            InventoryCommand::Restock(cmd) => self.handle_restock(cmd),
        }
    }
}

impl InventoryItem {
    fn ensure_item_id(&self, item_id: InventoryItemId) -> Result<(), DomainError> {
        if self.id != item_id {
            return Err(DomainError::invariant("item_id mismatch"));
        }
        Ok(())
    }

    fn validate_details(details: &ItemDetails) -> Result<(), DomainError> {
        if details.name.trim().is_empty() {
            return Err(DomainError::validation("item name is required"));
        }
        if details.unit.trim().is_empty() {
            return Err(DomainError::validation("item unit is required"));
        }
        if details.reorder_level < 0 {
            return Err(DomainError::validation("reorder level cannot be negative"));
        }
        Ok(())
    }

    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<InventoryEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("inventory item already exists"));
        }
        Self::validate_details(&cmd.details)?;
        if cmd.auto_sku.trim().is_empty() {
            return Err(DomainError::validation("auto SKU is required"));
        }
        if cmd.initial_quantity < 0 {
            return Err(DomainError::validation(
                "initial quantity cannot be negative",
            ));
        }

        Ok(vec![InventoryEvent::ItemAdded(ItemAdded {
            item_id: cmd.item_id,
            auto_sku: cmd.auto_sku.clone(),
            details: cmd.details.clone(),
            initial_quantity: cmd.initial_quantity,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDetails) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_item_id(cmd.item_id)?;
        Self::validate_details(&cmd.details)?;

        Ok(vec![InventoryEvent::DetailsUpdated(DetailsUpdated {
            item_id: cmd.item_id,
            details: cmd.details.clone(),
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_adjust(&self, cmd: &AdjustQuantity) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_item_id(cmd.item_id)?;

        if cmd.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }

        let new_quantity = (self.quantity + cmd.delta).max(0);

        Ok(vec![InventoryEvent::QuantityAdjusted(QuantityAdjusted {
            item_id: cmd.item_id,
            delta: cmd.delta,
            new_quantity,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_restock(&self, cmd: &Restock) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_item_id(cmd.item_id)?;

        if cmd.quantity_added <= 0 {
            return Err(DomainError::validation(
                "restock quantity must be positive",
            ));
        }

        Ok(vec![InventoryEvent::Restocked(Restocked {
            item_id: cmd.item_id,
            quantity_added: cmd.quantity_added,
            new_quantity: self.quantity + cmd.quantity_added,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }
}
