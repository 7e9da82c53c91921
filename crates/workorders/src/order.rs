use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{
    Aggregate, AggregateRoot, Cents, DomainError, EmployeeId, InvoiceId, QuoteId, WorkOrderId,
};
use vakwerk_events::Event;
use vakwerk_inventory::MaterialRequirement;
use vakwerk_parties::CustomerId;

/// Work order status board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    ToDo,
    Pending,
    InProgress,
    Completed,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::ToDo => "To Do",
            WorkOrderStatus::Pending => "Pending",
            WorkOrderStatus::InProgress => "In Progress",
            WorkOrderStatus::Completed => "Completed",
        }
    }
}

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderAction {
    Created,
    Converted,
    Assigned,
    StatusChanged,
    Updated,
    Reordered,
}

/// Append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: WorkOrderAction,
    pub performed_by: EmployeeId,
    pub details: String,
    pub from_status: Option<WorkOrderStatus>,
    pub to_status: Option<WorkOrderStatus>,
    pub from_assignee: Option<EmployeeId>,
    pub to_assignee: Option<EmployeeId>,
}

/// Lifecycle timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderTimestamps {
    pub created: Option<DateTime<Utc>>,
    /// Stamped when the order was born from a quote or invoice.
    pub converted: Option<DateTime<Utc>>,
    pub assigned: Option<DateTime<Utc>>,
    /// First move into `In Progress`.
    pub started: Option<DateTime<Utc>>,
    pub completed: Option<DateTime<Utc>>,
}

/// Aggregate root: WorkOrder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    id: WorkOrderId,
    title: String,
    description: String,
    status: WorkOrderStatus,
    assigned_to: Option<EmployeeId>,
    assigned_by: Option<EmployeeId>,
    converted_by: Option<EmployeeId>,
    required_inventory: Vec<MaterialRequirement>,
    customer_id: Option<CustomerId>,
    location: Option<String>,
    scheduled_date: Option<NaiveDate>,
    completed_date: Option<NaiveDate>,
    minutes_spent: Option<u32>,
    notes: Option<String>,
    /// Why the order sits in `Pending`; cleared on leaving that status.
    pending_reason: Option<String>,
    quote_id: Option<QuoteId>,
    invoice_id: Option<InvoiceId>,
    estimated_minutes: Option<u32>,
    estimated_cost: Option<Cents>,
    sort_index: Option<u32>,
    history: Vec<WorkOrderHistoryEntry>,
    timestamps: WorkOrderTimestamps,
    version: u64,
    created: bool,
}

impl WorkOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: WorkOrderId) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            status: WorkOrderStatus::ToDo,
            assigned_to: None,
            assigned_by: None,
            converted_by: None,
            required_inventory: Vec::new(),
            customer_id: None,
            location: None,
            scheduled_date: None,
            completed_date: None,
            minutes_spent: None,
            notes: None,
            pending_reason: None,
            quote_id: None,
            invoice_id: None,
            estimated_minutes: None,
            estimated_cost: None,
            sort_index: None,
            history: Vec::new(),
            timestamps: WorkOrderTimestamps::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> WorkOrderId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> WorkOrderStatus {
        self.status
    }

    pub fn assigned_to(&self) -> Option<EmployeeId> {
        self.assigned_to
    }

    pub fn assigned_by(&self) -> Option<EmployeeId> {
        self.assigned_by
    }

    pub fn converted_by(&self) -> Option<EmployeeId> {
        self.converted_by
    }

    pub fn required_inventory(&self) -> &[MaterialRequirement] {
        &self.required_inventory
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_date
    }

    pub fn completed_date(&self) -> Option<NaiveDate> {
        self.completed_date
    }

    pub fn minutes_spent(&self) -> Option<u32> {
        self.minutes_spent
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn pending_reason(&self) -> Option<&str> {
        self.pending_reason.as_deref()
    }

    pub fn quote_id(&self) -> Option<QuoteId> {
        self.quote_id
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.invoice_id
    }

    pub fn estimated_minutes(&self) -> Option<u32> {
        self.estimated_minutes
    }

    pub fn estimated_cost(&self) -> Option<Cents> {
        self.estimated_cost
    }

    pub fn sort_index(&self) -> Option<u32> {
        self.sort_index
    }

    pub fn history(&self) -> &[WorkOrderHistoryEntry] {
        &self.history
    }

    pub fn timestamps(&self) -> &WorkOrderTimestamps {
        &self.timestamps
    }

    /// Completed orders are terminal.
    pub fn is_open(&self) -> bool {
        self.status != WorkOrderStatus::Completed
    }
}

impl AggregateRoot for WorkOrder {
    type Id = WorkOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl vakwerk_core::Entity for WorkOrder {
    type Id = WorkOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: OpenWorkOrder.
///
/// Opens a fresh order, or (when `quote_id`/`invoice_id` is set) records a
/// conversion from that document (stamping the converted timestamp and
/// history entry as well).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWorkOrder {
    pub work_order_id: WorkOrderId,
    pub title: String,
    pub description: String,
    pub assigned_to: EmployeeId,
    pub customer_id: Option<CustomerId>,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    /// Some(reason) opens the order in `Pending` instead of `To Do`.
    pub pending_reason: Option<String>,
    pub required_inventory: Vec<MaterialRequirement>,
    pub quote_id: Option<QuoteId>,
    pub invoice_id: Option<InvoiceId>,
    pub estimated_minutes: Option<u32>,
    pub estimated_cost: Option<Cents>,
    pub notes: Option<String>,
    pub sort_index: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviseDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseDetails {
    pub work_order_id: WorkOrderId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Reassign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassign {
    pub work_order_id: WorkOrderId,
    pub to: EmployeeId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub work_order_id: WorkOrderId,
    pub to_status: WorkOrderStatus,
    /// Required when moving into `Pending`.
    pub pending_reason: Option<String>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordTimeSpent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTimeSpent {
    pub work_order_id: WorkOrderId,
    pub minutes: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddMaterial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMaterial {
    pub work_order_id: WorkOrderId,
    pub requirement: MaterialRequirement,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveMaterial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMaterial {
    pub work_order_id: WorkOrderId,
    pub item_id: vakwerk_inventory::InventoryItemId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkInvoice (back-reference once the order has been billed).
///
/// Unlike every other mutation this is allowed on completed orders: billing
/// happens after completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInvoice {
    pub work_order_id: WorkOrderId,
    pub invoice_id: InvoiceId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Reorder (change the sort index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reorder {
    pub work_order_id: WorkOrderId,
    pub sort_index: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SyncEstimates (push revised quote data into the order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEstimates {
    pub work_order_id: WorkOrderId,
    pub required_inventory: Vec<MaterialRequirement>,
    pub estimated_minutes: Option<u32>,
    pub estimated_cost: Option<Cents>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOrderCommand {
    OpenWorkOrder(OpenWorkOrder),
    ReviseDetails(ReviseDetails),
    Reassign(Reassign),
    ChangeStatus(ChangeStatus),
    RecordTimeSpent(RecordTimeSpent),
    AddMaterial(AddMaterial),
    RemoveMaterial(RemoveMaterial),
    LinkInvoice(LinkInvoice),
    Reorder(Reorder),
    SyncEstimates(SyncEstimates),
}

/// Event: WorkOrderOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderOpened {
    pub work_order_id: WorkOrderId,
    pub title: String,
    pub description: String,
    pub assigned_to: EmployeeId,
    pub customer_id: Option<CustomerId>,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub pending_reason: Option<String>,
    pub required_inventory: Vec<MaterialRequirement>,
    pub quote_id: Option<QuoteId>,
    pub invoice_id: Option<InvoiceId>,
    pub estimated_minutes: Option<u32>,
    pub estimated_cost: Option<Cents>,
    pub notes: Option<String>,
    pub sort_index: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsRevised {
    pub work_order_id: WorkOrderId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassigned {
    pub work_order_id: WorkOrderId,
    pub from: Option<EmployeeId>,
    pub to: EmployeeId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub work_order_id: WorkOrderId,
    pub from_status: WorkOrderStatus,
    pub to_status: WorkOrderStatus,
    pub pending_reason: Option<String>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TimeRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRecorded {
    pub work_order_id: WorkOrderId,
    pub minutes: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MaterialAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialAdded {
    pub work_order_id: WorkOrderId,
    pub requirement: MaterialRequirement,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MaterialRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRemoved {
    pub work_order_id: WorkOrderId,
    pub item_id: vakwerk_inventory::InventoryItemId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLinked {
    pub work_order_id: WorkOrderId,
    pub invoice_id: InvoiceId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reordered {
    pub work_order_id: WorkOrderId,
    pub from_index: Option<u32>,
    pub to_index: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EstimatesSynced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatesSynced {
    pub work_order_id: WorkOrderId,
    pub required_inventory: Vec<MaterialRequirement>,
    pub estimated_minutes: Option<u32>,
    pub estimated_cost: Option<Cents>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOrderEvent {
    WorkOrderOpened(WorkOrderOpened),
    DetailsRevised(DetailsRevised),
    Reassigned(Reassigned),
    StatusChanged(StatusChanged),
    TimeRecorded(TimeRecorded),
    MaterialAdded(MaterialAdded),
    MaterialRemoved(MaterialRemoved),
    InvoiceLinked(InvoiceLinked),
    Reordered(Reordered),
    EstimatesSynced(EstimatesSynced),
}

impl Event for WorkOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkOrderEvent::WorkOrderOpened(_) => "workorders.order.opened",
            WorkOrderEvent::DetailsRevised(_) => "workorders.order.details_revised",
            WorkOrderEvent::Reassigned(_) => "workorders.order.reassigned",
            WorkOrderEvent::StatusChanged(_) => "workorders.order.status_changed",
            WorkOrderEvent::TimeRecorded(_) => "workorders.order.time_recorded",
            WorkOrderEvent::MaterialAdded(_) => "workorders.order.material_added",
            WorkOrderEvent::MaterialRemoved(_) => "workorders.order.material_removed",
            WorkOrderEvent::InvoiceLinked(_) => "workorders.order.invoice_linked",
            WorkOrderEvent::Reordered(_) => "workorders.order.reordered",
            WorkOrderEvent::EstimatesSynced(_) => "workorders.order.estimates_synced",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            WorkOrderEvent::WorkOrderOpened(e) => e.occurred_at,
            WorkOrderEvent::DetailsRevised(e) => e.occurred_at,
            WorkOrderEvent::Reassigned(e) => e.occurred_at,
            WorkOrderEvent::StatusChanged(e) => e.occurred_at,
            WorkOrderEvent::TimeRecorded(e) => e.occurred_at,
            WorkOrderEvent::MaterialAdded(e) => e.occurred_at,
            WorkOrderEvent::MaterialRemoved(e) => e.occurred_at,
            WorkOrderEvent::InvoiceLinked(e) => e.occurred_at,
            WorkOrderEvent::Reordered(e) => e.occurred_at,
            WorkOrderEvent::EstimatesSynced(e) => e.occurred_at,
        }
    }
}

impl Aggregate for WorkOrder {
    type Command = WorkOrderCommand;
    type Event = WorkOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            WorkOrderEvent::WorkOrderOpened(e) => self.apply_opened(e),
            WorkOrderEvent::DetailsRevised(e) => {
                self.title = e.title.clone();
                self.description = e.description.clone();
                self.location = e.location.clone();
                self.scheduled_date = e.scheduled_date;
                self.notes = e.notes.clone();
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Updated,
                    e.performed_by,
                    "work order details revised".to_string(),
                );
            }
            WorkOrderEvent::Reassigned(e) => {
                let from = self.assigned_to;
                self.assigned_to = Some(e.to);
                self.assigned_by = Some(e.performed_by);
                self.timestamps.assigned = Some(e.occurred_at);
                self.history.push(WorkOrderHistoryEntry {
                    timestamp: e.occurred_at,
                    action: WorkOrderAction::Assigned,
                    performed_by: e.performed_by,
                    details: "work order reassigned".to_string(),
                    from_status: None,
                    to_status: None,
                    from_assignee: from,
                    to_assignee: Some(e.to),
                });
            }
            WorkOrderEvent::StatusChanged(e) => {
                self.status = e.to_status;
                match e.to_status {
                    WorkOrderStatus::Pending => {
                        self.pending_reason = e.pending_reason.clone();
                    }
                    WorkOrderStatus::InProgress => {
                        self.pending_reason = None;
                        if self.timestamps.started.is_none() {
                            self.timestamps.started = Some(e.occurred_at);
                        }
                    }
                    WorkOrderStatus::Completed => {
                        self.pending_reason = None;
                        self.completed_date = Some(e.occurred_at.date_naive());
                        self.timestamps.completed = Some(e.occurred_at);
                    }
                    WorkOrderStatus::ToDo => {
                        self.pending_reason = None;
                    }
                }
                self.history.push(WorkOrderHistoryEntry {
                    timestamp: e.occurred_at,
                    action: WorkOrderAction::StatusChanged,
                    performed_by: e.performed_by,
                    details: format!(
                        "status changed from \"{}\" to \"{}\"",
                        e.from_status.as_str(),
                        e.to_status.as_str()
                    ),
                    from_status: Some(e.from_status),
                    to_status: Some(e.to_status),
                    from_assignee: None,
                    to_assignee: None,
                });
            }
            WorkOrderEvent::TimeRecorded(e) => {
                self.minutes_spent = Some(e.minutes);
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Updated,
                    e.performed_by,
                    format!("recorded {} minutes of work", e.minutes),
                );
            }
            WorkOrderEvent::MaterialAdded(e) => {
                match self
                    .required_inventory
                    .iter_mut()
                    .find(|m| m.item_id == e.requirement.item_id)
                {
                    Some(existing) => existing.quantity += e.requirement.quantity,
                    None => self.required_inventory.push(e.requirement),
                }
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Updated,
                    e.performed_by,
                    "material added".to_string(),
                );
            }
            WorkOrderEvent::MaterialRemoved(e) => {
                self.required_inventory.retain(|m| m.item_id != e.item_id);
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Updated,
                    e.performed_by,
                    "material removed".to_string(),
                );
            }
            WorkOrderEvent::InvoiceLinked(e) => {
                self.invoice_id = Some(e.invoice_id);
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Updated,
                    e.performed_by,
                    format!("billed as invoice {}", e.invoice_id),
                );
            }
            WorkOrderEvent::Reordered(e) => {
                self.sort_index = Some(e.to_index);
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Reordered,
                    e.performed_by,
                    match e.from_index {
                        Some(from) => format!("sort index changed from #{from} to #{}", e.to_index),
                        None => format!("sort index set to #{}", e.to_index),
                    },
                );
            }
            WorkOrderEvent::EstimatesSynced(e) => {
                self.required_inventory = e.required_inventory.clone();
                self.estimated_minutes = e.estimated_minutes;
                self.estimated_cost = e.estimated_cost;
                self.push_history(
                    e.occurred_at,
                    WorkOrderAction::Updated,
                    e.performed_by,
                    "materials and estimates synced from the source document".to_string(),
                );
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            WorkOrderCommand::OpenWorkOrder(cmd) => self.handle_open(cmd),
            WorkOrderCommand::ReviseDetails(cmd) => self.handle_revise(cmd),
            WorkOrderCommand::Reassign(cmd) => self.handle_reassign(cmd),
            WorkOrderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            WorkOrderCommand::RecordTimeSpent(cmd) => self.handle_record_time(cmd),
            WorkOrderCommand::AddMaterial(cmd) => self.handle_add_material(cmd),
            WorkOrderCommand::RemoveMaterial(cmd) => self.handle_remove_material(cmd),
            WorkOrderCommand::LinkInvoice(cmd) => self.handle_link_invoice(cmd),
            WorkOrderCommand::Reorder(cmd) => self.handle_reorder(cmd),
            WorkOrderCommand::SyncEstimates(cmd) => self.handle_sync_estimates(cmd),
        }
    }
}

impl WorkOrder {
    fn push_history(
        &mut self,
        timestamp: DateTime<Utc>,
        action: WorkOrderAction,
        performed_by: EmployeeId,
        details: String,
    ) {
        self.history.push(WorkOrderHistoryEntry {
            timestamp,
            action,
            performed_by,
            details,
            from_status: None,
            to_status: None,
            from_assignee: None,
            to_assignee: None,
        });
    }

    fn apply_opened(&mut self, e: &WorkOrderOpened) {
        self.id = e.work_order_id;
        self.title = e.title.clone();
        self.description = e.description.clone();
        self.status = if e.pending_reason.is_some() {
            WorkOrderStatus::Pending
        } else {
            WorkOrderStatus::ToDo
        };
        self.assigned_to = Some(e.assigned_to);
        self.assigned_by = Some(e.performed_by);
        self.customer_id = e.customer_id;
        self.location = e.location.clone();
        self.scheduled_date = e.scheduled_date;
        self.pending_reason = e.pending_reason.clone();
        self.required_inventory = e.required_inventory.clone();
        self.quote_id = e.quote_id;
        self.invoice_id = e.invoice_id;
        self.estimated_minutes = e.estimated_minutes;
        self.estimated_cost = e.estimated_cost;
        self.notes = e.notes.clone();
        self.sort_index = Some(e.sort_index);
        self.timestamps.created = Some(e.occurred_at);
        self.timestamps.assigned = Some(e.occurred_at);
        self.created = true;

        let converted_from = e.quote_id.is_some() || e.invoice_id.is_some();
        if converted_from {
            self.converted_by = Some(e.performed_by);
            self.timestamps.converted = Some(e.occurred_at);
        }

        self.push_history(
            e.occurred_at,
            WorkOrderAction::Created,
            e.performed_by,
            "work order created".to_string(),
        );
        if converted_from {
            let source = match (e.quote_id, e.invoice_id) {
                (Some(q), _) => format!("quote {q}"),
                (_, Some(i)) => format!("invoice {i}"),
                _ => unreachable!(),
            };
            self.push_history(
                e.occurred_at,
                WorkOrderAction::Converted,
                e.performed_by,
                format!("converted from {source}"),
            );
        }
        self.history.push(WorkOrderHistoryEntry {
            timestamp: e.occurred_at,
            action: WorkOrderAction::Assigned,
            performed_by: e.performed_by,
            details: "work order assigned".to_string(),
            from_status: None,
            to_status: None,
            from_assignee: None,
            to_assignee: Some(e.assigned_to),
        });
    }

    fn ensure_order_id(&self, work_order_id: WorkOrderId) -> Result<(), DomainError> {
        if self.id != work_order_id {
            return Err(DomainError::invariant("work_order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::invariant(
                "completed work orders cannot be changed",
            ));
        }
        Ok(())
    }

    fn validate_materials(materials: &[MaterialRequirement]) -> Result<(), DomainError> {
        if materials.iter().any(|m| m.quantity <= 0) {
            return Err(DomainError::validation(
                "material quantity must be positive",
            ));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenWorkOrder) -> Result<Vec<WorkOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("work order already exists"));
        }
        if cmd.title.trim().is_empty() {
            return Err(DomainError::validation("work order title is required"));
        }
        if cmd.pending_reason.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(DomainError::validation("pending reason cannot be blank"));
        }
        if cmd.sort_index == 0 {
            return Err(DomainError::validation("sort index starts at #1"));
        }
        Self::validate_materials(&cmd.required_inventory)?;

        Ok(vec![WorkOrderEvent::WorkOrderOpened(WorkOrderOpened {
            work_order_id: cmd.work_order_id,
            title: cmd.title.clone(),
            description: cmd.description.clone(),
            assigned_to: cmd.assigned_to,
            customer_id: cmd.customer_id,
            location: cmd.location.clone(),
            scheduled_date: cmd.scheduled_date,
            pending_reason: cmd.pending_reason.clone(),
            required_inventory: cmd.required_inventory.clone(),
            quote_id: cmd.quote_id,
            invoice_id: cmd.invoice_id,
            estimated_minutes: cmd.estimated_minutes,
            estimated_cost: cmd.estimated_cost,
            notes: cmd.notes.clone(),
            sort_index: cmd.sort_index,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise(&self, cmd: &ReviseDetails) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;
        self.ensure_open()?;
        if cmd.title.trim().is_empty() {
            return Err(DomainError::validation("work order title is required"));
        }

        Ok(vec![WorkOrderEvent::DetailsRevised(DetailsRevised {
            work_order_id: cmd.work_order_id,
            title: cmd.title.clone(),
            description: cmd.description.clone(),
            location: cmd.location.clone(),
            scheduled_date: cmd.scheduled_date,
            notes: cmd.notes.clone(),
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reassign(&self, cmd: &Reassign) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;
        self.ensure_open()?;

        if self.assigned_to == Some(cmd.to) {
            return Err(DomainError::validation(
                "work order is already assigned to this employee",
            ));
        }

        Ok(vec![WorkOrderEvent::Reassigned(Reassigned {
            work_order_id: cmd.work_order_id,
            from: self.assigned_to,
            to: cmd.to,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;
        self.ensure_open()?;

        if cmd.to_status == self.status {
            return Err(DomainError::validation(
                "work order is already in this status",
            ));
        }
        let pending_reason = match cmd.to_status {
            WorkOrderStatus::Pending => {
                let reason = cmd
                    .pending_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        DomainError::validation("a pending work order needs a reason")
                    })?;
                Some(reason.to_string())
            }
            _ => None,
        };

        Ok(vec![WorkOrderEvent::StatusChanged(StatusChanged {
            work_order_id: cmd.work_order_id,
            from_status: self.status,
            to_status: cmd.to_status,
            pending_reason,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_time(&self, cmd: &RecordTimeSpent) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;

        if cmd.minutes == 0 {
            return Err(DomainError::validation("time spent must be positive"));
        }

        Ok(vec![WorkOrderEvent::TimeRecorded(TimeRecorded {
            work_order_id: cmd.work_order_id,
            minutes: cmd.minutes,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_material(&self, cmd: &AddMaterial) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;
        self.ensure_open()?;
        Self::validate_materials(std::slice::from_ref(&cmd.requirement))?;

        Ok(vec![WorkOrderEvent::MaterialAdded(MaterialAdded {
            work_order_id: cmd.work_order_id,
            requirement: cmd.requirement,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_material(
        &self,
        cmd: &RemoveMaterial,
    ) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;
        self.ensure_open()?;

        if !self
            .required_inventory
            .iter()
            .any(|m| m.item_id == cmd.item_id)
        {
            return Err(DomainError::not_found());
        }

        Ok(vec![WorkOrderEvent::MaterialRemoved(MaterialRemoved {
            work_order_id: cmd.work_order_id,
            item_id: cmd.item_id,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_link_invoice(&self, cmd: &LinkInvoice) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;

        if self.invoice_id.is_some() {
            return Err(DomainError::conflict(
                "work order is already linked to an invoice",
            ));
        }

        Ok(vec![WorkOrderEvent::InvoiceLinked(InvoiceLinked {
            work_order_id: cmd.work_order_id,
            invoice_id: cmd.invoice_id,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reorder(&self, cmd: &Reorder) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;

        if cmd.sort_index == 0 {
            return Err(DomainError::validation("sort index starts at #1"));
        }
        if self.sort_index == Some(cmd.sort_index) {
            return Err(DomainError::validation(
                "work order already has this sort index",
            ));
        }

        Ok(vec![WorkOrderEvent::Reordered(Reordered {
            work_order_id: cmd.work_order_id,
            from_index: self.sort_index,
            to_index: cmd.sort_index,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_sync_estimates(
        &self,
        cmd: &SyncEstimates,
    ) -> Result<Vec<WorkOrderEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_order_id(cmd.work_order_id)?;
        self.ensure_open()?;
        Self::validate_materials(&cmd.required_inventory)?;

        Ok(vec![WorkOrderEvent::EstimatesSynced(EstimatesSynced {
            work_order_id: cmd.work_order_id,
            required_inventory: cmd.required_inventory.clone(),
            estimated_minutes: cmd.estimated_minutes,
            estimated_cost: cmd.estimated_cost,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }
}
