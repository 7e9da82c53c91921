//! Quoting domain module.
//!
//! Quotes are priced proposals: material lines plus labor lines, VAT on top.
//! An approved quote can be converted into an invoice, a work order, or both;
//! the quote keeps back-references to whatever it became.

pub mod line;
pub mod quote;

pub use line::{DocumentTotals, LaborLine, QuoteItem, document_totals, validate_lines};
pub use quote::{
    ApproveQuote, DraftQuote, ExpireQuote, LinkInvoice, LinkWorkOrder, Quote, QuoteAction,
    QuoteBody, QuoteCommand, QuoteEvent, QuoteHistoryEntry, QuoteStatus, QuoteTimestamps,
    RejectQuote, ReviseQuote, SendQuote, clone_quote,
};
