//! Planning: the agenda derived from scheduled work and absences.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, EmployeeId, Entity, WorkOrderId};
use vakwerk_hrm::{Availability, Employee};
use vakwerk_parties::CustomerId;
use vakwerk_workorders::WorkOrder;

/// Calendar event identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarEventId(pub AggregateId);

impl CalendarEventId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CalendarEventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    WorkOrder,
    Meeting,
    Vacation,
    Other,
}

/// One agenda entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: CalendarEventId,
    pub title: String,
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
    pub work_order_id: Option<WorkOrderId>,
    pub employee_id: Option<EmployeeId>,
    pub customer_id: Option<CustomerId>,
}

impl Entity for CalendarEvent {
    type Id = CalendarEventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Agenda entries for open, scheduled work orders.
pub fn work_order_agenda<'a>(
    orders: impl IntoIterator<Item = &'a WorkOrder>,
) -> Vec<CalendarEvent> {
    orders
        .into_iter()
        .filter(|wo| wo.is_open())
        .filter_map(|wo| {
            wo.scheduled_date().map(|date| CalendarEvent {
                id: CalendarEventId::new(AggregateId::new()),
                title: wo.title().to_string(),
                date,
                kind: CalendarEventKind::WorkOrder,
                work_order_id: Some(wo.id_typed()),
                employee_id: wo.assigned_to(),
                customer_id: wo.customer_id(),
            })
        })
        .collect()
}

/// Agenda entries for employees on vacation on `date`.
pub fn vacation_agenda<'a>(
    employees: impl IntoIterator<Item = &'a Employee>,
    date: NaiveDate,
) -> Vec<CalendarEvent> {
    employees
        .into_iter()
        .filter(|e| e.availability == Availability::Vacation)
        .map(|e| CalendarEvent {
            id: CalendarEventId::new(AggregateId::new()),
            title: format!("{} - vacation", e.name),
            date,
            kind: CalendarEventKind::Vacation,
            work_order_id: None,
            employee_id: Some(e.id),
            customer_id: None,
        })
        .collect()
}

/// The combined agenda, sorted by date.
pub fn agenda<'a>(
    orders: impl IntoIterator<Item = &'a WorkOrder>,
    employees: impl IntoIterator<Item = &'a Employee>,
    today: NaiveDate,
) -> Vec<CalendarEvent> {
    let mut events = work_order_agenda(orders);
    events.extend(vacation_agenda(employees, today));
    events.sort_by_key(|e| e.date);
    events
}
