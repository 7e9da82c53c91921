use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{
    Aggregate, AggregateRoot, Cents, DomainError, EmployeeId, InvoiceId, QuoteId, VatRate,
    WorkOrderId,
};
use vakwerk_events::Event;
use vakwerk_parties::CustomerId;

use crate::line::{DocumentTotals, LaborLine, QuoteItem, document_totals, validate_lines};

/// Quote status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

/// What a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteAction {
    Created,
    Updated,
    Sent,
    Approved,
    Rejected,
    Expired,
    ConvertedToInvoice,
    ConvertedToWorkOrder,
}

/// Append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: QuoteAction,
    pub performed_by: EmployeeId,
    pub details: String,
    pub from_status: Option<QuoteStatus>,
    pub to_status: Option<QuoteStatus>,
}

/// Lifecycle timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTimestamps {
    pub created: Option<DateTime<Utc>>,
    pub sent: Option<DateTime<Utc>>,
    pub approved: Option<DateTime<Utc>>,
    pub converted_to_invoice: Option<DateTime<Utc>>,
    pub converted_to_work_order: Option<DateTime<Utc>>,
}

/// Editable quote content, shared by the draft and revise commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBody {
    pub items: Vec<QuoteItem>,
    pub labor: Vec<LaborLine>,
    pub vat_rate: VatRate,
    pub valid_until: NaiveDate,
    pub notes: Option<String>,
    /// Location of the work, if site work is involved.
    pub location: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
}

/// Aggregate root: Quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    id: QuoteId,
    customer_id: Option<CustomerId>,
    body: Option<QuoteBody>,
    status: QuoteStatus,
    invoice_id: Option<InvoiceId>,
    work_order_id: Option<WorkOrderId>,
    created_by: Option<EmployeeId>,
    history: Vec<QuoteHistoryEntry>,
    timestamps: QuoteTimestamps,
    version: u64,
    created: bool,
}

impl Quote {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: QuoteId) -> Self {
        Self {
            id,
            customer_id: None,
            body: None,
            status: QuoteStatus::Draft,
            invoice_id: None,
            work_order_id: None,
            created_by: None,
            history: Vec::new(),
            timestamps: QuoteTimestamps::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> QuoteId {
        self.id
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    pub fn body(&self) -> Option<&QuoteBody> {
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

    pub fn valid_until(&self) -> Option<NaiveDate> {
        self.body.as_ref().map(|b| b.valid_until)
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

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        self.invoice_id
    }

    pub fn work_order_id(&self) -> Option<WorkOrderId> {
        self.work_order_id
    }

    pub fn created_by(&self) -> Option<EmployeeId> {
        self.created_by
    }

    pub fn history(&self) -> &[QuoteHistoryEntry] {
        &self.history
    }

    pub fn timestamps(&self) -> &QuoteTimestamps {
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

    /// Total labor time on the quote, in minutes.
    pub fn estimated_minutes(&self) -> u32 {
        self.labor().iter().map(|l| l.minutes).sum()
    }

    /// Quotes stay editable until the customer walks away; edits after
    /// approval are pushed into the linked work order by the caller.
    pub fn is_editable(&self) -> bool {
        !matches!(self.status, QuoteStatus::Rejected | QuoteStatus::Expired)
    }

    /// Only approved quotes convert into invoices or work orders.
    pub fn is_convertible(&self) -> bool {
        self.status == QuoteStatus::Approved
    }
}

impl AggregateRoot for Quote {
    type Id = QuoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl vakwerk_core::Entity for Quote {
    type Id = QuoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: DraftQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftQuote {
    pub quote_id: QuoteId,
    pub customer_id: CustomerId,
    pub body: QuoteBody,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReviseQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseQuote {
    pub quote_id: QuoteId,
    pub body: QuoteBody,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SendQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendQuote {
    pub quote_id: QuoteId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveQuote {
    pub quote_id: QuoteId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectQuote {
    pub quote_id: QuoteId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ExpireQuote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpireQuote {
    pub quote_id: QuoteId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkInvoice (back-reference after conversion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInvoice {
    pub quote_id: QuoteId,
    pub invoice_id: InvoiceId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LinkWorkOrder (back-reference after conversion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkWorkOrder {
    pub quote_id: QuoteId,
    pub work_order_id: WorkOrderId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteCommand {
    DraftQuote(DraftQuote),
    ReviseQuote(ReviseQuote),
    SendQuote(SendQuote),
    ApproveQuote(ApproveQuote),
    RejectQuote(RejectQuote),
    ExpireQuote(ExpireQuote),
    LinkInvoice(LinkInvoice),
    LinkWorkOrder(LinkWorkOrder),
}

/// Event: QuoteDrafted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDrafted {
    pub quote_id: QuoteId,
    pub customer_id: CustomerId,
    pub body: QuoteBody,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuoteRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRevised {
    pub quote_id: QuoteId,
    pub body: QuoteBody,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Status-transition event payload, shared by sent/approved/rejected/expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteStatusChanged {
    pub quote_id: QuoteId,
    pub from_status: QuoteStatus,
    pub to_status: QuoteStatus,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLinked {
    pub quote_id: QuoteId,
    pub invoice_id: InvoiceId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: WorkOrderLinked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderLinked {
    pub quote_id: QuoteId,
    pub work_order_id: WorkOrderId,
    pub performed_by: EmployeeId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteEvent {
    QuoteDrafted(QuoteDrafted),
    QuoteRevised(QuoteRevised),
    QuoteSent(QuoteStatusChanged),
    QuoteApproved(QuoteStatusChanged),
    QuoteRejected(QuoteStatusChanged),
    QuoteExpired(QuoteStatusChanged),
    InvoiceLinked(InvoiceLinked),
    WorkOrderLinked(WorkOrderLinked),
}

impl Event for QuoteEvent {
    fn event_type(&self) -> &'static str {
        match self {
            QuoteEvent::QuoteDrafted(_) => "quoting.quote.drafted",
            QuoteEvent::QuoteRevised(_) => "quoting.quote.revised",
            QuoteEvent::QuoteSent(_) => "quoting.quote.sent",
            QuoteEvent::QuoteApproved(_) => "quoting.quote.approved",
            QuoteEvent::QuoteRejected(_) => "quoting.quote.rejected",
            QuoteEvent::QuoteExpired(_) => "quoting.quote.expired",
            QuoteEvent::InvoiceLinked(_) => "quoting.quote.invoice_linked",
            QuoteEvent::WorkOrderLinked(_) => "quoting.quote.work_order_linked",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            QuoteEvent::QuoteDrafted(e) => e.occurred_at,
            QuoteEvent::QuoteRevised(e) => e.occurred_at,
            QuoteEvent::QuoteSent(e)
            | QuoteEvent::QuoteApproved(e)
            | QuoteEvent::QuoteRejected(e)
            | QuoteEvent::QuoteExpired(e) => e.occurred_at,
            QuoteEvent::InvoiceLinked(e) => e.occurred_at,
            QuoteEvent::WorkOrderLinked(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Quote {
    type Command = QuoteCommand;
    type Event = QuoteEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            QuoteEvent::QuoteDrafted(e) => {
                self.id = e.quote_id;
                self.customer_id = Some(e.customer_id);
                self.body = Some(e.body.clone());
                self.status = QuoteStatus::Draft;
                self.created_by = Some(e.performed_by);
                self.timestamps.created = Some(e.occurred_at);
                self.created = true;
                self.push_history(
                    e.occurred_at,
                    QuoteAction::Created,
                    e.performed_by,
                    "quote drafted".to_string(),
                    None,
                    Some(QuoteStatus::Draft),
                );
            }
            QuoteEvent::QuoteRevised(e) => {
                self.body = Some(e.body.clone());
                self.push_history(
                    e.occurred_at,
                    QuoteAction::Updated,
                    e.performed_by,
                    "quote revised".to_string(),
                    None,
                    None,
                );
            }
            QuoteEvent::QuoteSent(e) => {
                self.status = e.to_status;
                self.timestamps.sent = Some(e.occurred_at);
                self.push_status_history(QuoteAction::Sent, e);
            }
            QuoteEvent::QuoteApproved(e) => {
                self.status = e.to_status;
                self.timestamps.approved = Some(e.occurred_at);
                self.push_status_history(QuoteAction::Approved, e);
            }
            QuoteEvent::QuoteRejected(e) => {
                self.status = e.to_status;
                self.push_status_history(QuoteAction::Rejected, e);
            }
            QuoteEvent::QuoteExpired(e) => {
                self.status = e.to_status;
                self.push_status_history(QuoteAction::Expired, e);
            }
            QuoteEvent::InvoiceLinked(e) => {
                self.invoice_id = Some(e.invoice_id);
                self.timestamps.converted_to_invoice = Some(e.occurred_at);
                self.push_history(
                    e.occurred_at,
                    QuoteAction::ConvertedToInvoice,
                    e.performed_by,
                    format!("converted into invoice {}", e.invoice_id),
                    None,
                    None,
                );
            }
            QuoteEvent::WorkOrderLinked(e) => {
                self.work_order_id = Some(e.work_order_id);
                self.timestamps.converted_to_work_order = Some(e.occurred_at);
                self.push_history(
                    e.occurred_at,
                    QuoteAction::ConvertedToWorkOrder,
                    e.performed_by,
                    format!("converted into work order {}", e.work_order_id),
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
            QuoteCommand::DraftQuote(cmd) => self.handle_draft(cmd),
            QuoteCommand::ReviseQuote(cmd) => self.handle_revise(cmd),
            QuoteCommand::SendQuote(cmd) => self.handle_send(cmd),
            QuoteCommand::ApproveQuote(cmd) => self.handle_approve(cmd),
            QuoteCommand::RejectQuote(cmd) => self.handle_reject(cmd),
            QuoteCommand::ExpireQuote(cmd) => self.handle_expire(cmd),
            QuoteCommand::LinkInvoice(cmd) => self.handle_link_invoice(cmd),
            QuoteCommand::LinkWorkOrder(cmd) => self.handle_link_work_order(cmd),
        }
    }
}

impl Quote {
    fn push_history(
        &mut self,
        timestamp: DateTime<Utc>,
        action: QuoteAction,
        performed_by: EmployeeId,
        details: String,
        from_status: Option<QuoteStatus>,
        to_status: Option<QuoteStatus>,
    ) {
        self.history.push(QuoteHistoryEntry {
            timestamp,
            action,
            performed_by,
            details,
            from_status,
            to_status,
        });
    }

    fn push_status_history(&mut self, action: QuoteAction, e: &QuoteStatusChanged) {
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

    fn ensure_quote_id(&self, quote_id: QuoteId) -> Result<(), DomainError> {
        if self.id != quote_id {
            return Err(DomainError::invariant("quote_id mismatch"));
        }
        Ok(())
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_draft(&self, cmd: &DraftQuote) -> Result<Vec<QuoteEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("quote already exists"));
        }
        validate_lines(&cmd.body.items, &cmd.body.labor)?;

        Ok(vec![QuoteEvent::QuoteDrafted(QuoteDrafted {
            quote_id: cmd.quote_id,
            customer_id: cmd.customer_id,
            body: cmd.body.clone(),
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise(&self, cmd: &ReviseQuote) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if !self.is_editable() {
            return Err(DomainError::invariant(
                "rejected or expired quotes cannot be revised",
            ));
        }
        validate_lines(&cmd.body.items, &cmd.body.labor)?;

        Ok(vec![QuoteEvent::QuoteRevised(QuoteRevised {
            quote_id: cmd.quote_id,
            body: cmd.body.clone(),
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn status_change(
        &self,
        to_status: QuoteStatus,
        performed_by: EmployeeId,
        occurred_at: DateTime<Utc>,
    ) -> QuoteStatusChanged {
        QuoteStatusChanged {
            quote_id: self.id,
            from_status: self.status,
            to_status,
            performed_by,
            occurred_at,
        }
    }

    fn handle_send(&self, cmd: &SendQuote) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if self.status != QuoteStatus::Draft {
            return Err(DomainError::invariant("only draft quotes can be sent"));
        }

        Ok(vec![QuoteEvent::QuoteSent(self.status_change(
            QuoteStatus::Sent,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_approve(&self, cmd: &ApproveQuote) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if self.status != QuoteStatus::Sent {
            return Err(DomainError::invariant("only sent quotes can be approved"));
        }

        Ok(vec![QuoteEvent::QuoteApproved(self.status_change(
            QuoteStatus::Approved,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_reject(&self, cmd: &RejectQuote) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if self.status != QuoteStatus::Sent {
            return Err(DomainError::invariant("only sent quotes can be rejected"));
        }

        Ok(vec![QuoteEvent::QuoteRejected(self.status_change(
            QuoteStatus::Rejected,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_expire(&self, cmd: &ExpireQuote) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if self.status != QuoteStatus::Sent {
            return Err(DomainError::invariant("only sent quotes can expire"));
        }

        Ok(vec![QuoteEvent::QuoteExpired(self.status_change(
            QuoteStatus::Expired,
            cmd.performed_by,
            cmd.occurred_at,
        ))])
    }

    fn handle_link_invoice(&self, cmd: &LinkInvoice) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if !self.is_convertible() {
            return Err(DomainError::invariant(
                "only approved quotes can be converted into invoices",
            ));
        }
        if self.invoice_id.is_some() {
            return Err(DomainError::conflict(
                "quote has already been converted into an invoice",
            ));
        }

        Ok(vec![QuoteEvent::InvoiceLinked(InvoiceLinked {
            quote_id: cmd.quote_id,
            invoice_id: cmd.invoice_id,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_link_work_order(&self, cmd: &LinkWorkOrder) -> Result<Vec<QuoteEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_quote_id(cmd.quote_id)?;

        if !self.is_convertible() {
            return Err(DomainError::invariant(
                "only approved quotes can be converted into work orders",
            ));
        }
        if self.work_order_id.is_some() {
            return Err(DomainError::conflict(
                "quote has already been converted into a work order",
            ));
        }

        Ok(vec![QuoteEvent::WorkOrderLinked(WorkOrderLinked {
            quote_id: cmd.quote_id,
            work_order_id: cmd.work_order_id,
            performed_by: cmd.performed_by,
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// Build a `DraftQuote` command that clones an existing quote onto a fresh
/// ID: same customer, same lines, fresh draft status and history.
pub fn clone_quote(
    source: &Quote,
    new_id: QuoteId,
    performed_by: EmployeeId,
    occurred_at: DateTime<Utc>,
) -> Result<DraftQuote, DomainError> {
    let customer_id = source.customer_id().ok_or_else(DomainError::not_found)?;
    let body = source.body().cloned().ok_or_else(DomainError::not_found)?;

    Ok(DraftQuote {
        quote_id: new_id,
        customer_id,
        body,
        performed_by,
        occurred_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vakwerk_core::AggregateId;
    use vakwerk_events::execute;

    fn test_quote_id() -> QuoteId {
        QuoteId::new(AggregateId::new())
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

    fn test_body() -> QuoteBody {
        QuoteBody {
            items: vec![QuoteItem {
                inventory_item_id: None,
                description: "Groepenkast vervangen".into(),
                quantity: 1,
                price_per_unit: 350_00,
            }],
            labor: vec![LaborLine {
                description: "Installatiewerk".into(),
                minutes: 300,
                hourly_rate: 65_00,
            }],
            vat_rate: VatRate::Standard,
            valid_until: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            notes: None,
            location: Some("Hoofdstraat 12, Utrecht".into()),
            scheduled_date: None,
        }
    }

    fn drafted_quote() -> Quote {
        let id = test_quote_id();
        let mut quote = Quote::empty(id);
        execute(
            &mut quote,
            &QuoteCommand::DraftQuote(DraftQuote {
                quote_id: id,
                customer_id: test_customer_id(),
                body: test_body(),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        quote
    }

    fn sent_quote() -> Quote {
        let mut quote = drafted_quote();
        let qid = quote.id_typed();
        execute(
            &mut quote,
            &QuoteCommand::SendQuote(SendQuote {
                quote_id: qid,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        quote
    }

    fn approved_quote() -> Quote {
        let mut quote = sent_quote();
        let qid = quote.id_typed();
        execute(
            &mut quote,
            &QuoteCommand::ApproveQuote(ApproveQuote {
                quote_id: qid,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        quote
    }

    #[test]
    fn draft_requires_at_least_one_item() {
        let id = test_quote_id();
        let quote = Quote::empty(id);
        let mut body = test_body();
        body.items.clear();

        let err = quote
            .handle(&QuoteCommand::DraftQuote(DraftQuote {
                quote_id: id,
                customer_id: test_customer_id(),
                body,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn draft_starts_history_and_stamps_created() {
        let quote = drafted_quote();
        assert_eq!(quote.status(), QuoteStatus::Draft);
        assert_eq!(quote.history().len(), 1);
        assert_eq!(quote.history()[0].action, QuoteAction::Created);
        assert!(quote.timestamps().created.is_some());
        assert_eq!(quote.version(), 1);
    }

    #[test]
    fn totals_are_recomputed_from_lines() {
        let quote = drafted_quote();
        // items 350.00 + labor 5h × 65.00 = 675.00; 21% VAT = 141.75
        assert_eq!(quote.subtotal(), 675_00);
        assert_eq!(quote.vat_amount(), 141_75);
        assert_eq!(quote.total(), 816_75);
        assert_eq!(quote.total(), quote.subtotal() + quote.vat_amount());
    }

    #[test]
    fn full_lifecycle_draft_sent_approved() {
        let quote = approved_quote();
        assert_eq!(quote.status(), QuoteStatus::Approved);
        assert!(quote.timestamps().sent.is_some());
        assert!(quote.timestamps().approved.is_some());
        // created + sent + approved
        assert_eq!(quote.history().len(), 3);
        assert_eq!(
            quote.history()[2].from_status,
            Some(QuoteStatus::Sent)
        );
        assert_eq!(
            quote.history()[2].to_status,
            Some(QuoteStatus::Approved)
        );
    }

    #[test]
    fn cannot_approve_a_draft() {
        let quote = drafted_quote();
        let err = quote
            .handle(&QuoteCommand::ApproveQuote(ApproveQuote {
                quote_id: quote.id_typed(),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn cannot_revise_after_rejection() {
        let mut quote = sent_quote();
        let qid = quote.id_typed();
        execute(
            &mut quote,
            &QuoteCommand::RejectQuote(RejectQuote {
                quote_id: qid,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        let err = quote
            .handle(&QuoteCommand::ReviseQuote(ReviseQuote {
                quote_id: quote.id_typed(),
                body: test_body(),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        // Approved quotes can still be revised; the store pushes the edit
        // into the linked work order.
        let approved = approved_quote();
        assert!(
            approved
                .handle(&QuoteCommand::ReviseQuote(ReviseQuote {
                    quote_id: approved.id_typed(),
                    body: test_body(),
                    performed_by: test_employee(),
                    occurred_at: test_time(),
                }))
                .is_ok()
        );
    }

    #[test]
    fn expire_only_from_sent() {
        let quote = drafted_quote();
        assert!(
            quote
                .handle(&QuoteCommand::ExpireQuote(ExpireQuote {
                    quote_id: quote.id_typed(),
                    performed_by: test_employee(),
                    occurred_at: test_time(),
                }))
                .is_err()
        );

        let mut quote = sent_quote();
        let qid = quote.id_typed();
        execute(
            &mut quote,
            &QuoteCommand::ExpireQuote(ExpireQuote {
                quote_id: qid,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(quote.status(), QuoteStatus::Expired);
    }

    #[test]
    fn conversion_requires_approval_and_happens_once() {
        let mut quote = approved_quote();
        let qid = quote.id_typed();
        let invoice_id = InvoiceId::new(AggregateId::new());

        execute(
            &mut quote,
            &QuoteCommand::LinkInvoice(LinkInvoice {
                quote_id: qid,
                invoice_id,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(quote.invoice_id(), Some(invoice_id));
        assert!(quote.timestamps().converted_to_invoice.is_some());

        // A second conversion is refused.
        let err = quote
            .handle(&QuoteCommand::LinkInvoice(LinkInvoice {
                quote_id: quote.id_typed(),
                invoice_id: InvoiceId::new(AggregateId::new()),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // An unapproved quote is refused outright.
        let sent = sent_quote();
        let err = sent
            .handle(&QuoteCommand::LinkInvoice(LinkInvoice {
                quote_id: sent.id_typed(),
                invoice_id,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn clone_yields_new_id_same_lines_fresh_history() {
        let source = approved_quote();
        let new_id = test_quote_id();
        let cmd = clone_quote(&source, new_id, test_employee(), test_time()).unwrap();

        let mut cloned = Quote::empty(new_id);
        execute(&mut cloned, &QuoteCommand::DraftQuote(cmd)).unwrap();

        assert_ne!(cloned.id_typed(), source.id_typed());
        assert_eq!(cloned.items(), source.items());
        assert_eq!(cloned.labor(), source.labor());
        assert_eq!(cloned.customer_id(), source.customer_id());
        assert_eq!(cloned.status(), QuoteStatus::Draft);
        assert_eq!(cloned.history().len(), 1);
        assert_eq!(cloned.total(), source.total());
    }

    #[test]
    fn history_serializes_with_snake_case_actions() {
        let mut quote = approved_quote();
        let qid = quote.id_typed();
        let invoice_id = InvoiceId::new(AggregateId::new());
        execute(
            &mut quote,
            &QuoteCommand::LinkInvoice(LinkInvoice {
                quote_id: qid,
                invoice_id,
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        let json = serde_json::to_value(quote.history()).unwrap();
        let actions: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["action"].as_str().unwrap())
            .collect();
        assert_eq!(
            actions,
            vec!["created", "sent", "approved", "converted_to_invoice"]
        );
        assert_eq!(json[2]["from_status"], "sent");
        assert_eq!(json[2]["to_status"], "approved");
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let quote = drafted_quote();
        let before = quote.clone();

        let _ = quote.handle(&QuoteCommand::SendQuote(SendQuote {
            quote_id: quote.id_typed(),
            performed_by: test_employee(),
            occurred_at: test_time(),
        }));
        let _ = quote.handle(&QuoteCommand::ApproveQuote(ApproveQuote {
            quote_id: quote.id_typed(),
            performed_by: test_employee(),
            occurred_at: test_time(),
        }));

        assert_eq!(quote, before);
    }

    #[test]
    fn every_transition_appends_exactly_one_history_entry() {
        let mut quote = drafted_quote();
        let before = quote.history().len();

        for cmd in [
            QuoteCommand::SendQuote(SendQuote {
                quote_id: quote.id_typed(),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
            QuoteCommand::RejectQuote(RejectQuote {
                quote_id: quote.id_typed(),
                performed_by: test_employee(),
                occurred_at: test_time(),
            }),
        ] {
            let len_before = quote.history().len();
            execute(&mut quote, &cmd).unwrap();
            assert_eq!(quote.history().len(), len_before + 1);
        }
        assert_eq!(quote.history().len(), before + 2);
        assert_eq!(quote.status(), QuoteStatus::Rejected);
    }
}
