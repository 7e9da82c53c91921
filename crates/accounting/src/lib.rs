//! Bookkeeping domain module: the income/expense cashbook.

pub mod cashbook;

pub use cashbook::{
    CashbookSummary, DocumentRef, Transaction, TransactionId, TransactionKind, summarize,
};
