//! Per-customer journey: where every document stands, and how far along the
//! ideal path (quote sent → approved → work order → completed → invoice →
//! paid) this customer is.

use vakwerk_invoicing::{Invoice, InvoiceStatus};
use vakwerk_parties::CustomerId;
use vakwerk_quoting::{Quote, QuoteStatus};
use vakwerk_workorders::{WorkOrder, WorkOrderStatus};

/// Milestones on the customer journey, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyStep {
    QuoteSent,
    QuoteApproved,
    WorkOrderOpened,
    WorkOrderCompleted,
    InvoiceIssued,
    InvoicePaid,
}

impl JourneyStep {
    pub const ALL: [JourneyStep; 6] = [
        JourneyStep::QuoteSent,
        JourneyStep::QuoteApproved,
        JourneyStep::WorkOrderOpened,
        JourneyStep::WorkOrderCompleted,
        JourneyStep::InvoiceIssued,
        JourneyStep::InvoicePaid,
    ];
}

/// Documents grouped by status, plus journey progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerJourney {
    pub quotes_draft: usize,
    pub quotes_sent: usize,
    pub quotes_approved: usize,
    pub quotes_rejected: usize,
    pub quotes_expired: usize,
    pub invoices_draft: usize,
    pub invoices_sent: usize,
    pub invoices_paid: usize,
    pub invoices_overdue: usize,
    pub invoices_cancelled: usize,
    pub work_orders_to_do: usize,
    pub work_orders_pending: usize,
    pub work_orders_in_progress: usize,
    pub work_orders_completed: usize,
    pub steps_completed: Vec<JourneyStep>,
    /// Percentage of journey milestones reached, 0–100.
    pub progress_percent: u32,
}

pub fn customer_journey<'a>(
    customer_id: CustomerId,
    quotes: impl IntoIterator<Item = &'a Quote>,
    invoices: impl IntoIterator<Item = &'a Invoice>,
    work_orders: impl IntoIterator<Item = &'a WorkOrder>,
) -> CustomerJourney {
    let mut journey = CustomerJourney::default();

    for quote in quotes
        .into_iter()
        .filter(|q| q.customer_id() == Some(customer_id))
    {
        match quote.status() {
            QuoteStatus::Draft => journey.quotes_draft += 1,
            QuoteStatus::Sent => journey.quotes_sent += 1,
            QuoteStatus::Approved => journey.quotes_approved += 1,
            QuoteStatus::Rejected => journey.quotes_rejected += 1,
            QuoteStatus::Expired => journey.quotes_expired += 1,
        }
    }

    for invoice in invoices
        .into_iter()
        .filter(|i| i.customer_id() == Some(customer_id))
    {
        match invoice.status() {
            InvoiceStatus::Draft => journey.invoices_draft += 1,
            InvoiceStatus::Sent => journey.invoices_sent += 1,
            InvoiceStatus::Paid => journey.invoices_paid += 1,
            InvoiceStatus::Overdue => journey.invoices_overdue += 1,
            InvoiceStatus::Cancelled => journey.invoices_cancelled += 1,
        }
    }

    for order in work_orders
        .into_iter()
        .filter(|wo| wo.customer_id() == Some(customer_id))
    {
        match order.status() {
            WorkOrderStatus::ToDo => journey.work_orders_to_do += 1,
            WorkOrderStatus::Pending => journey.work_orders_pending += 1,
            WorkOrderStatus::InProgress => journey.work_orders_in_progress += 1,
            WorkOrderStatus::Completed => journey.work_orders_completed += 1,
        }
    }

    let quote_ever_sent = journey.quotes_sent
        + journey.quotes_approved
        + journey.quotes_rejected
        + journey.quotes_expired
        > 0;
    let any_work_order = journey.work_orders_to_do
        + journey.work_orders_pending
        + journey.work_orders_in_progress
        + journey.work_orders_completed
        > 0;
    let any_invoice = journey.invoices_draft
        + journey.invoices_sent
        + journey.invoices_paid
        + journey.invoices_overdue
        > 0;

    for step in JourneyStep::ALL {
        let reached = match step {
            JourneyStep::QuoteSent => quote_ever_sent,
            JourneyStep::QuoteApproved => journey.quotes_approved > 0,
            JourneyStep::WorkOrderOpened => any_work_order,
            JourneyStep::WorkOrderCompleted => journey.work_orders_completed > 0,
            JourneyStep::InvoiceIssued => any_invoice,
            JourneyStep::InvoicePaid => journey.invoices_paid > 0,
        };
        if reached {
            journey.steps_completed.push(step);
        }
    }
    journey.progress_percent =
        (journey.steps_completed.len() * 100 / JourneyStep::ALL.len()) as u32;

    journey
}
