use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{
    Aggregate, AggregateRoot, Cents, DomainError, EmployeeId, InvoiceId, QuoteId, VatRate,
    WorkOrderId,
};
use vakwerk_events::Event;
use vakwerk_parties::CustomerId;
use vakwerk_quoting::{DocumentTotals, LaborLine, QuoteItem, document_totals, validate_lines};

use crate::number::InvoiceNumber;

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceAction {
    Created,
    Updated,
    Sent,
    Paid,
    Overdue,
    Cancelled,
    ConvertedToWorkOrder,
}

/// Append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: InvoiceAction,
    pub performed_by: EmployeeId,
    pub details: String,
    pub from_status: Option<InvoiceStatus>,
    pub to_status: Option<InvoiceStatus>,
}

/// Lifecycle timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTimestamps {
    pub created: Option<DateTime<Utc>>,
    pub sent: Option<DateTime<Utc>>,
    pub paid: Option<DateTime<Utc>>,
    pub converted_to_work_order: Option<DateTime<Utc>>,
}

/// Editable invoice content, shared by the issue and revise commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBody {
    pub items: Vec<QuoteItem>,
    pub labor: Vec<LaborLine>,
    pub vat_rate: VatRate,
    pub due_date: NaiveDate,
    /// Payment terms shown on the document, e.g. "14 dagen".
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
}

/// Aggregate root: Invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    number: Option<InvoiceNumber>,
    customer_id: Option<CustomerId>,
    quote_id: Option<QuoteId>,
    work_order_id: Option<WorkOrderId>,
    body: Option<InvoiceBody>,
    status: InvoiceStatus,
    issue_date: Option<NaiveDate>,
    paid_date: Option<NaiveDate>,
    created_by: Option<EmployeeId>,
    history: Vec<InvoiceHistoryEntry>,
    timestamps: InvoiceTimestamps,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            number: None,
            customer_id: None,
            quote_id: None,
            work_order_id: None,
            body: None,
            status: InvoiceStatus::Draft,
            issue_date: None,
            paid_date: None,
            created_by: None,
            history: Vec::new(),
            timestamps: InvoiceTimestamps::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn number(&self) -> Option<InvoiceNumber> {
        self.number
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn quote_id(&self) -> Option<QuoteId> {
        self.quote_id
    }

    pub fn work_order_id(&self) -> Option<WorkOrderId> {
        self.work_order_id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn body(&self) -> Option<&InvoiceBody> {
        self.body.as_ref()
    }

    pub fn items(&self) -> &[QuoteItem] {
        self.body.as_ref().map(|b| b.items.as_slice()).unwrap_or(&[])
    }

    pub fn labor(&self) -> &[LaborLine] {
        self.body.as_ref().map(|b| b.labor.as_slice()).unwrap_or(&[])
    }

    pub fn vat_rate(&self) -> VatRate {
        self.body.as_ref().map(|b| b.vat_rate).unwrap_or_default()
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.body.as_ref().map(|b| b.due_date)
    }

    pub fn paid_date(&self) -> Option<NaiveDate> {
        self.paid_date
    }

    pub fn payment_terms(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.payment_terms.as_deref())
    }

    pub fn notes(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.notes.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.location.as_deref())
    }

    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.body.as_ref().and_then(|b| b.scheduled_date)
    }

    pub fn created_by(&self) -> Option<EmployeeId> {
        self.created_by
    }

    pub fn history(&self) -> &[InvoiceHistoryEntry] {
        &self.history
    }

    pub fn timestamps(&self) -> &InvoiceTimestamps {
        &self.timestamps
    }

    /// Derived totals; recomputed from the lines on every call.
    pub fn totals(&self) -> DocumentTotals {
        document_totals(self.items(), self.labor(), self.vat_rate())
    }

    pub fn subtotal(&self) -> Cents {
        self.totals().subtotal
    }

    pub fn vat_amount(&self) -> Cents {
        self.totals().vat_amount
    }

    pub fn total(&self) -> Cents {
        self.totals().total
    }

    /// A sent invoice past its due date should be flagged overdue.
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent
            && self.due_date().is_some_and(|due| due < today)
    }

    /// Outstanding means awaiting payment.
    pub fn is_outstanding(&self) -> bool {
        matches!(self.status, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl vakwerk_core::Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub number: InvoiceNumber,
    pub customer_id: CustomerId,
    /// Source quote, when converted from one.
    pub quote_id: Option<QuoteId>,
    /// Source work order, when auto-billed after completion.
    pub work_order_id: Option<WorkOrderId>,
    pub body: InvoiceBody,
    pub issue_date: NaiveDate,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviseInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseInvoice {
    pub invoice_id: InvoiceId,
    pub body: InvoiceBody,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SendInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendInvoice {
    pub invoice_id: InvoiceId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkPaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPaid {
    pub invoice_id: InvoiceId,
    pub paid_date: NaiveDate,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOverdue {
    pub invoice_id: InvoiceId,
    /// The date the check runs on; the due date must lie before it.
    pub as_of: NaiveDate,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelInvoice {
    pub invoice_id: InvoiceId,
    pub reason: Option<String>,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkWorkOrder (back-reference after conversion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkWorkOrder {
    pub invoice_id: InvoiceId,
    pub work_order_id: WorkOrderId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviseLaborActuals.
///
/// After the work order completes, billed labor is rewritten to the time
/// actually spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseLaborActuals {
    pub invoice_id: InvoiceId,
    pub minutes_spent: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    IssueInvoice(IssueInvoice),
    ReviseInvoice(ReviseInvoice),
    SendInvoice(SendInvoice),
    MarkPaid(MarkPaid),
    MarkOverdue(MarkOverdue),
    CancelInvoice(CancelInvoice),
    LinkWorkOrder(LinkWorkOrder),
    ReviseLaborActuals(ReviseLaborActuals),
}

/// Event: InvoiceIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_id: InvoiceId,
    pub number: InvoiceNumber,
    pub customer_id: CustomerId,
    pub quote_id: Option<QuoteId>,
    pub work_order_id: Option<WorkOrderId>,
    pub body: InvoiceBody,
    pub issue_date: NaiveDate,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRevised {
    pub invoice_id: InvoiceId,
    pub body: InvoiceBody,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Status-transition event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatusChanged {
    pub invoice_id: InvoiceId,
    pub from_status: InvoiceStatus,
    pub to_status: InvoiceStatus,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoicePaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePaid {
    pub invoice_id: InvoiceId,
    pub from_status: InvoiceStatus,
    pub paid_date: NaiveDate,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkOrderLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderLinked {
    pub invoice_id: InvoiceId,
    pub work_order_id: WorkOrderId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LaborActualsRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborActualsRevised {
    pub invoice_id: InvoiceId,
    pub minutes_spent: u32,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceIssued(InvoiceIssued),
    InvoiceRevised(InvoiceRevised),
    InvoiceSent(InvoiceStatusChanged),
    InvoicePaid(InvoicePaid),
    InvoiceOverdue(InvoiceStatusChanged),
    InvoiceCancelled(InvoiceStatusChanged),
    WorkOrderLinked(WorkOrderLinked),
    LaborActualsRevised(LaborActualsRevised),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceIssued(_) => "invoicing.invoice.issued",
            InvoiceEvent::InvoiceRevised(_) => "invoicing.invoice.revised",
            InvoiceEvent::InvoiceSent(_) => "invoicing.invoice.sent",
            InvoiceEvent::InvoicePaid(_) => "invoicing.invoice.paid",
            InvoiceEvent::InvoiceOverdue(_) => "invoicing.invoice.overdue",
            InvoiceEvent::InvoiceCancelled(_) => "invoicing.invoice.cancelled",
            InvoiceEvent::WorkOrderLinked(_) => "invoicing.invoice.work_order_linked",
            InvoiceEvent::LaborActualsRevised(_) => "invoicing.invoice.labor_actuals_revised",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceIssued(e) => e.occurred_at,
            InvoiceEvent::InvoiceRevised(e) => e.occurred_at,
            InvoiceEvent::InvoiceSent(e)
            | InvoiceEvent::InvoiceOverdue(e)
            | InvoiceEvent::InvoiceCancelled(e) => e.occurred_at,
            InvoiceEvent::InvoicePaid(e) => e.occurred_at,
            InvoiceEvent::WorkOrderLinked(e) => e.occurred_at,
            InvoiceEvent::LaborActualsRevised(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceIssued(e) => {
                self.id = e.invoice_id;
                self.number = Some(e.number);
                self.customer_id = Some(e.customer_id);
                self.quote_id = e.quote_id;
                self.work_order_id = e.work_order_id;
                self.body = Some(e.body.clone());
                self.status = InvoiceStatus::Draft;
                self.issue_date = Some(e.issue_date);
                self.created_by = Some(e.performed_by);
                self.timestamps.created = Some(e.occurred_at);
                self.created = true;
                self.push_history(
                    e.occurred_at,
                    InvoiceAction::Created,
                    e.performed_by,
                    format!("invoice {} issued", e.number),
                    None,
                    Some(InvoiceStatus::Draft),
                );
            }
            InvoiceEvent::InvoiceRevised(e) => {
                self.body = Some(e.body.clone());
                self.push_history(
                    e.occurred_at,
                    InvoiceAction::Updated,
                    e.performed_by,
                    "invoice revised".to_string(),
                    None,
                    None,
                );
            }
            InvoiceEvent::InvoiceSent(e) => {
                self.status = e.to_status;
                self.timestamps.sent = Some(e.occurred_at);
                self.push_status_history(InvoiceAction::Sent, e);
            }
            InvoiceEvent::InvoicePaid(e) => {
                let from = e.from_status;
                self.status = InvoiceStatus::Paid;
                self.paid_date = Some(e.paid_date);
                self.timestamps.paid = Some(e.occurred_at);
                self.push_history(
                    e.occurred_at,
                    InvoiceAction::Paid,
                    e.performed_by,
                    format!(
                        "status changed from \"{}\" to \"paid\"",
                        from.as_str()
                    ),
                    Some(from),
                    Some(InvoiceStatus::Paid),
                );
            }
            InvoiceEvent::InvoiceOverdue(e) => {
                self.status = e.to_status;
                self.push_status_history(InvoiceAction::Overdue, e);
            }
            InvoiceEvent::InvoiceCancelled(e) => {
                self.status = e.to_status;
                self.push_status_history(InvoiceAction::Cancelled, e);
            }
            InvoiceEvent::WorkOrderLinked(e) => {
                self.work_order_id = Some(e.work_order_id);
                self.timestamps.converted_to_work_order = Some(e.occurred_at);
                self.push_history(
                    e.occurred_at,
                    InvoiceAction::ConvertedToWorkOrder,
                    e.performed_by,
                    format!("converted into work order {}", e.work_order_id),
                    None,
                    None,
                );
            }
            InvoiceEvent::LaborActualsRevised(e) => {
                if let Some(body) = self.body.as_mut() {
                    for line in &mut body.labor {
                        line.minutes = e.minutes_spent;
                    }
                }
                self.push_history(
                    e.occurred_at,
                    InvoiceAction::Updated,
                    e.performed_by,
                    format!(
                        "billed labor revised to {} minutes actually spent",
                        e.minutes_spent
                    ),
                    None,
                    None,
                );
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::IssueInvoice(cmd) => self.handle_issue(cmd),
            InvoiceCommand::ReviseInvoice(cmd) => self.handle_revise(cmd),
            InvoiceCommand::SendInvoice(cmd) => self.handle_send(cmd),
            InvoiceCommand::MarkPaid(cmd) => self.handle_mark_paid(cmd),
            InvoiceCommand::MarkOverdue(cmd) => self.handle_mark_overdue(cmd),
            InvoiceCommand::CancelInvoice(cmd) => self.handle_cancel(cmd),
            InvoiceCommand::LinkWorkOrder(cmd) => self.handle_link_work_order(cmd),
            InvoiceCommand::ReviseLaborActuals(cmd) => self.handle_revise_labor(cmd),
        }
    }
}

impl Invoice {
    fn push_history(
        &mut self,
        timestamp: DateTime<Utc>,
        action: InvoiceAction,
        performed_by: EmployeeId,
        details: String,
        from_status: Option<InvoiceStatus>,
        to_status: Option<InvoiceStatus>,
    ) {
        self.history.push(InvoiceHistoryEntry {
            timestamp,
            action,
            performed_by,
            details,
            from_status,
            to_status,
        });
    }

    fn push_status_history(&mut self, action: InvoiceAction, e: &InvoiceStatusChanged) {
        self.push_history(
            e.occurred_at,
            action,
            e.performed_by,
            format!(
                "status changed from \"{}\" to \"{}\"",
                e.from_status.as_str(),
                e.to_status.as_str()
            ),
            Some(e.from_status),
            Some(e.to_status),
        );
    }

    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> Result<(), DomainError> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn validate_body(body: &InvoiceBody, issue_date: NaiveDate) -> Result<(), DomainError> {
        validate_lines(&body.items, &body.labor)?;
        if body.due_date < issue_date {
            return Err(DomainError::validation(
                "due date cannot lie before the issue date",
            ));
        }
        Ok(())
    }

    fn status_change(
        &self,
        to_status: InvoiceStatus,
        performed_by: EmployeeId,
        occurred_at: DateTime<Utc>,
    ) -> InvoiceStatusChanged {
        InvoiceStatusChanged {
            invoice_id: self.id,
            from_status: self.status,
            to_status,
            performed_by,
            occurred_at,
        }
    }

    fn handle_issue(&self, cmd: &IssueInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }
        Self::validate_body(&cmd.body, cmd.issue_date)?;

        Ok(vec![InvoiceEvent::InvoiceIssued(InvoiceIssued {
            invoice_id: cmd.invoice_id,
            number: cmd.number,
            customer_id: cmd.customer_id,
            quote_id: cmd.quote_id,
            work_order_id: cmd.work_order_id,
            body: cmd.body.clone(),
            issue_date: cmd.issue_date,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise(&self, cmd: &ReviseInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::invariant(
                "only draft invoices can be revised",
            ));
        }
        let issue_date = self.issue_date.ok_or_else(DomainError::not_found)?;
        Self::validate_body(&cmd.body, issue_date)?;

        Ok(vec![InvoiceEvent::InvoiceRevised(InvoiceRevised {
            invoice_id: cmd.invoice_id,
            body: cmd.body.clone(),
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_send(&self, cmd: &SendInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status != InvoiceStatus::Draft {
            return Err(DomainError::invariant("only draft invoices can be sent"));
        }

        Ok(vec![InvoiceEvent::InvoiceSent(self.status_change(
            InvoiceStatus::Sent,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_mark_paid(&self, cmd: &MarkPaid) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if !self.is_outstanding() {
            return Err(DomainError::invariant(
                "only sent or overdue invoices can be marked paid",
            ));
        }

        Ok(vec![InvoiceEvent::InvoicePaid(InvoicePaid {
            invoice_id: cmd.invoice_id,
            from_status: self.status,
            paid_date: cmd.paid_date,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_overdue(&self, cmd: &MarkOverdue) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status != InvoiceStatus::Sent {
            return Err(DomainError::invariant(
                "only sent invoices can become overdue",
            ));
        }
        if !self.is_past_due(cmd.as_of) {
            return Err(DomainError::invariant(
                "invoice is not past its due date",
            ));
        }

        Ok(vec![InvoiceEvent::InvoiceOverdue(self.status_change(
            InvoiceStatus::Overdue,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_cancel(&self, cmd: &CancelInvoice) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if !matches!(self.status, InvoiceStatus::Draft | InvoiceStatus::Sent) {
            return Err(DomainError::invariant(
                "only draft or sent invoices can be cancelled",
            ));
        }

        Ok(vec![InvoiceEvent::InvoiceCancelled(self.status_change(
            InvoiceStatus::Cancelled,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_link_work_order(
        &self,
        cmd: &LinkWorkOrder,
    ) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status == InvoiceStatus::Cancelled {
            return Err(DomainError::invariant(
                "cancelled invoices cannot be converted into work orders",
            ));
        }
        if self.work_order_id.is_some() {
            return Err(DomainError::conflict(
                "invoice has already been converted into a work order",
            ));
        }

        Ok(vec![InvoiceEvent::WorkOrderLinked(WorkOrderLinked {
            invoice_id: cmd.invoice_id,
            work_order_id: cmd.work_order_id,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise_labor(
        &self,
        cmd: &ReviseLaborActuals,
    ) -> Result<Vec<InvoiceEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_invoice_id(cmd.invoice_id)?;

        if cmd.minutes_spent == 0 {
            return Err(DomainError::validation(
                "actual labor time must be positive",
            ));
        }
        if matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(DomainError::invariant(
                "paid or cancelled invoices cannot be rebilled",
            ));
        }
        if self.labor().is_empty() {
            return Err(DomainError::invariant(
                "invoice has no labor lines to revise",
            ));
        }

        Ok(vec![InvoiceEvent::LaborActualsRevised(
            LaborActualsRevised {
                invoice_id: cmd.invoice_id,
                minutes_spent: cmd.minutes_spent,
                performed_by: cmd.performed_by,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vakwerk_core::AggregateId;
    use vakwerk_events::execute;

    fn test_invoice_id() -> InvoiceId {
        InvoiceId::new(AggregateId::new())
    }

    fn test_customer_id() -> CustomerId {
        CustomerId::new(AggregateId::new())
    }

    fn test_employee() -> EmployeeId {
        EmployeeId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_body() -> InvoiceBody {
        InvoiceBody {
            items: vec![QuoteItem {
                inventory_item_id: None,
                description: "Materiaal".into(),
                quantity: 4,
                price_per_unit: 25_00,
            }],
            labor: vec![LaborLine {
                description: "Montage".into(),
                minutes: 120,
                hourly_rate: 65_00,
            }],
            vat_rate: VatRate::Standard,
            due_date: date(2026, 8, 21),
            payment_terms: Some("14 dagen".into()),
            notes: None,
            location: None,
            scheduled_date: None,
        }
    }

    fn issued_invoice() -> Invoice {
        let id = test_invoice_id();
        let mut invoice = Invoice::empty(id);
        execute(
            &mut invoice,
            &InvoiceCommand::IssueInvoice(IssueInvoice {
                invoice_id: id,
                number: InvoiceNumber::new(2026, 1),
                customer_id: test_customer_id(),
                quote_id: None,
                work_order_id: None,
                body: test_body(),
                issue_date: date(2026, 8, 7),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        invoice
    }

    fn sent_invoice() -> Invoice {
        let mut invoice = issued_invoice();
        let iid = invoice.id_typed();
        execute(
            &mut invoice,
            &InvoiceCommand::SendInvoice(SendInvoice {
                invoice_id: iid,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        invoice
    }

    #[test]
    fn issue_rejects_due_date_before_issue_date() {
        let id = test_invoice_id();
        let invoice = Invoice::empty(id);
        let mut body = test_body();
        body.due_date = date(2026, 8, 1);

        let err = invoice
            .handle(&InvoiceCommand::IssueInvoice(IssueInvoice {
                invoice_id: id,
                number: InvoiceNumber::new(2026, 1),
                customer_id: test_customer_id(),
                quote_id: None,
                work_order_id: None,
                body,
                issue_date: date(2026, 8, 7),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn totals_follow_lines() {
        let invoice = issued_invoice();
        // 4 × 25.00 + 2h × 65.00 = 230.00; VAT 48.30
        assert_eq!(invoice.subtotal(), 230_00);
        assert_eq!(invoice.vat_amount(), 48_30);
        assert_eq!(invoice.total(), 278_30);
    }

    #[test]
    fn paid_lifecycle_stamps_paid_date() {
        let mut invoice = sent_invoice();
        let iid = invoice.id_typed();
        execute(
            &mut invoice,
            &InvoiceCommand::MarkPaid(MarkPaid {
                invoice_id: iid,
                paid_date: date(2026, 8, 15),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert_eq!(invoice.paid_date(), Some(date(2026, 8, 15)));
        assert!(invoice.timestamps().paid.is_some());
    }

    #[test]
    fn overdue_requires_a_passed_due_date() {
        let invoice = sent_invoice();
        // Due 2026-08-21; the 20th is too early.
        let err = invoice
            .handle(&InvoiceCommand::MarkOverdue(MarkOverdue {
                invoice_id: invoice.id_typed(),
                as_of: date(2026, 8, 20),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let mut invoice = invoice;
        let iid = invoice.id_typed();
        execute(
            &mut invoice,
            &InvoiceCommand::MarkOverdue(MarkOverdue {
                invoice_id: iid,
                as_of: date(2026, 8, 22),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Overdue);

        // Overdue invoices can still be paid.
        execute(
            &mut invoice,
            &InvoiceCommand::MarkPaid(MarkPaid {
                invoice_id: iid,
                paid_date: date(2026, 9, 1),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn cannot_pay_a_draft_or_cancel_a_paid_invoice() {
        let invoice = issued_invoice();
        assert!(
            invoice
                .handle(&InvoiceCommand::MarkPaid(MarkPaid {
                    invoice_id: invoice.id_typed(),
                    paid_date: date(2026, 8, 15),
                    performed_by: test_employee(),
                    occurred_at: test_time(),
                }))
                .is_err()
        );

        let mut invoice = sent_invoice();
        let iid = invoice.id_typed();
        execute(
            &mut invoice,
            &InvoiceCommand::MarkPaid(MarkPaid {
                invoice_id: iid,
                paid_date: date(2026, 8, 15),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert!(
            invoice
                .handle(&InvoiceCommand::CancelInvoice(CancelInvoice {
                    invoice_id: invoice.id_typed(),
                    reason: None,
                    performed_by: test_employee(),
                    occurred_at: test_time(),
                }))
                .is_err()
        );
    }

    #[test]
    fn labor_actuals_rewrite_the_billed_minutes() {
        let mut invoice = sent_invoice();
        let iid = invoice.id_typed();
        let before = invoice.total();

        execute(
            &mut invoice,
            &InvoiceCommand::ReviseLaborActuals(ReviseLaborActuals {
                invoice_id: iid,
                minutes_spent: 210,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        assert_eq!(invoice.labor()[0].minutes, 210);
        assert!(invoice.total() > before);
        // items 100.00 + labor 3.5h × 65.00 = 327.50; VAT 68.78 (rounded half up)
        assert_eq!(invoice.subtotal(), 327_50);
        assert_eq!(invoice.total(), invoice.subtotal() + invoice.vat_amount());
    }

    #[test]
    fn every_transition_appends_one_history_entry() {
        let invoice = sent_invoice();
        // issued + sent
        assert_eq!(invoice.history().len(), 2);
        assert_eq!(invoice.history()[1].action, InvoiceAction::Sent);
        assert_eq!(invoice.history()[1].from_status, Some(InvoiceStatus::Draft));
        assert_eq!(invoice.history()[1].to_status, Some(InvoiceStatus::Sent));
    }
}
