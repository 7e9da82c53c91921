//! The application-wide event stream.

use chrono::{DateTime, Utc};

use vakwerk_events::Event;
use vakwerk_inventory::InventoryEvent;
use vakwerk_invoicing::InvoiceEvent;
use vakwerk_quoting::QuoteEvent;
use vakwerk_workorders::WorkOrderEvent;

/// Everything the store publishes on its bus: the union of the module event
/// streams. Projections subscribe to this and pick out what they care about.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quote(QuoteEvent),
    Invoice(InvoiceEvent),
    WorkOrder(WorkOrderEvent),
    Inventory(InventoryEvent),
}

impl Event for AppEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AppEvent::Quote(e) => e.event_type(),
            AppEvent::Invoice(e) => e.event_type(),
            AppEvent::WorkOrder(e) => e.event_type(),
            AppEvent::Inventory(e) => e.event_type(),
        }
    }

    fn version(&self) -> u32 {
        match self {
            AppEvent::Quote(e) => e.version(),
            AppEvent::Invoice(e) => e.version(),
            AppEvent::WorkOrder(e) => e.version(),
            AppEvent::Inventory(e) => e.version(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AppEvent::Quote(e) => e.occurred_at(),
            AppEvent::Invoice(e) => e.occurred_at(),
            AppEvent::WorkOrder(e) => e.occurred_at(),
            AppEvent::Inventory(e) => e.occurred_at(),
        }
    }
}
