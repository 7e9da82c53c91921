//! Invoicing domain module.
//!
//! Invoices share their line model with quotes; an invoice is usually born
//! from an approved quote and keeps the back-reference. Numbering is
//! per-year (`YYYY-NNN`).

pub mod convert;
pub mod invoice;
pub mod number;

pub use convert::{DEFAULT_DUE_DAYS, DEFAULT_PAYMENT_TERMS, invoice_from_quote};
pub use invoice::{
    CancelInvoice, Invoice, InvoiceAction, InvoiceBody, InvoiceCommand, InvoiceEvent,
    InvoiceHistoryEntry, InvoiceStatus, InvoiceTimestamps, IssueInvoice, LinkWorkOrder, MarkOverdue,
    MarkPaid, ReviseInvoice, ReviseLaborActuals, SendInvoice,
};
pub use number::{InvoiceNumber, next_invoice_number};
