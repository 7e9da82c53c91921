//! Notifications and the low-stock projection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, Entity};
use vakwerk_events::Projection;
use vakwerk_inventory::{InventoryEvent, InventoryItemId};

use crate::events::AppEvent;

/// Notification identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub AggregateId);

impl NotificationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// A notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub level: NotificationLevel,
    pub message: String,
    pub date: DateTime<Utc>,
    pub read: bool,
    pub related_item: Option<InventoryItemId>,
}

impl Entity for Notification {
    type Id = NotificationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone)]
struct StockLevel {
    name: String,
    reorder_level: i64,
    quantity: i64,
    /// Suppresses repeat warnings until the level recovers.
    alerted: bool,
}

/// Read model over inventory events that raises a warning when an item
/// reaches its reorder level, once per dip.
#[derive(Debug, Default)]
pub struct LowStockProjection {
    levels: HashMap<InventoryItemId, StockLevel>,
    pending: Vec<Notification>,
}

impl LowStockProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the notifications raised since the last drain.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    fn check(&mut self, item_id: InventoryItemId, occurred_at: DateTime<Utc>) {
        let Some(level) = self.levels.get_mut(&item_id) else {
            return;
        };
        if level.quantity <= level.reorder_level {
            if !level.alerted {
                level.alerted = true;
                let message = if level.quantity == 0 {
                    format!("{} is out of stock", level.name)
                } else {
                    format!(
                        "{} is low on stock ({} left, reorder at {})",
                        level.name, level.quantity, level.reorder_level
                    )
                };
                self.pending.push(Notification {
                    id: NotificationId::new(AggregateId::new()),
                    level: NotificationLevel::Warning,
                    message,
                    date: occurred_at,
                    read: false,
                    related_item: Some(item_id),
                });
            }
        } else {
            level.alerted = false;
        }
    }
}

impl Projection for LowStockProjection {
    type Ev = AppEvent;

    fn apply(&mut self, event: &Self::Ev) {
        let AppEvent::Inventory(event) = event else {
            return;
        };
        match event {
            InventoryEvent::ItemAdded(e) => {
                self.levels.insert(
                    e.item_id,
                    StockLevel {
                        name: e.details.name.clone(),
                        reorder_level: e.details.reorder_level,
                        quantity: e.initial_quantity,
                        alerted: false,
                    },
                );
                self.check(e.item_id, e.occurred_at);
            }
            InventoryEvent::DetailsUpdated(e) => {
                if let Some(level) = self.levels.get_mut(&e.item_id) {
                    level.name = e.details.name.clone();
                    level.reorder_level = e.details.reorder_level;
                }
                self.check(e.item_id, e.occurred_at);
            }
            InventoryEvent::QuantityAdjusted(e) => {
                if let Some(level) = self.levels.get_mut(&e.item_id) {
                    level.quantity = e.new_quantity;
                }
                self.check(e.item_id, e.occurred_at);
            }
            InventoryEvent::Restocked(e) => {
                if let Some(level) = self.levels.get_mut(&e.item_id) {
                    level.quantity = e.new_quantity;
                }
                self.check(e.item_id, e.occurred_at);
            }
        }
    }
}
