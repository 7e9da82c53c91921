//! Per-customer finances.

use vakwerk_core::Cents;
use vakwerk_invoicing::{Invoice, InvoiceStatus};
use vakwerk_parties::CustomerId;
use vakwerk_quoting::Quote;

/// Money-side summary for one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerFinances {
    /// Everything invoiced (cancelled invoices excluded).
    pub total_invoiced: Cents,
    pub total_paid: Cents,
    /// Sent plus overdue.
    pub total_outstanding: Cents,
    pub total_overdue: Cents,
    pub total_quoted: Cents,
    pub paid_invoices: usize,
    pub outstanding_invoices: usize,
    pub overdue_invoices: usize,
}

pub fn customer_finances<'a>(
    customer_id: CustomerId,
    invoices: impl IntoIterator<Item = &'a Invoice>,
    quotes: impl IntoIterator<Item = &'a Quote>,
) -> CustomerFinances {
    let mut finances = CustomerFinances::default();

    for invoice in invoices
        .into_iter()
        .filter(|i| i.customer_id() == Some(customer_id))
    {
        let total = invoice.total();
        match invoice.status() {
            InvoiceStatus::Cancelled => continue,
            InvoiceStatus::Paid => {
                finances.total_paid += total;
                finances.paid_invoices += 1;
            }
            InvoiceStatus::Sent => {
                finances.total_outstanding += total;
                finances.outstanding_invoices += 1;
            }
            InvoiceStatus::Overdue => {
                finances.total_outstanding += total;
                finances.total_overdue += total;
                finances.outstanding_invoices += 1;
                finances.overdue_invoices += 1;
            }
            InvoiceStatus::Draft => {}
        }
        finances.total_invoiced += total;
    }

    for quote in quotes
        .into_iter()
        .filter(|q| q.customer_id() == Some(customer_id))
    {
        finances.total_quoted += quote.total();
    }

    finances
}
