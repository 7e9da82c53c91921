//! Income/expense cashbook.
//!
//! Single-entry bookkeeping: every paid invoice and counter sale books an
//! income entry, purchases book expenses, and the summary derives totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, Cents, DomainError, DomainResult, Entity, InvoiceId, WorkOrderId};
use vakwerk_invoicing::Invoice;
use vakwerk_pos::{Sale, SaleId};

/// Transaction identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub AggregateId);

impl TransactionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// The document a transaction came from, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRef {
    Invoice(InvoiceId),
    Sale(SaleId),
    WorkOrder(WorkOrderId),
}

/// One cashbook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub description: String,
    /// Always positive; the kind decides the sign.
    pub amount: Cents,
    pub date: NaiveDate,
    pub related_to: Option<DocumentRef>,
}

impl Transaction {
    fn new(
        id: TransactionId,
        kind: TransactionKind,
        description: impl Into<String>,
        amount: Cents,
        date: NaiveDate,
    ) -> DomainResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::validation(
                "transaction description is required",
            ));
        }
        if amount == 0 {
            return Err(DomainError::validation("transaction amount must be positive"));
        }
        Ok(Self {
            id,
            kind,
            description,
            amount,
            date,
            related_to: None,
        })
    }

    pub fn income(
        id: TransactionId,
        description: impl Into<String>,
        amount: Cents,
        date: NaiveDate,
    ) -> DomainResult<Self> {
        Self::new(id, TransactionKind::Income, description, amount, date)
    }

    pub fn expense(
        id: TransactionId,
        description: impl Into<String>,
        amount: Cents,
        date: NaiveDate,
    ) -> DomainResult<Self> {
        Self::new(id, TransactionKind::Expense, description, amount, date)
    }

    /// Income entry for a paid invoice.
    pub fn income_from_invoice(
        id: TransactionId,
        invoice: &Invoice,
        date: NaiveDate,
    ) -> DomainResult<Self> {
        let number = invoice.number().ok_or_else(DomainError::not_found)?;
        let mut tx = Self::income(
            id,
            format!("payment of invoice {number}"),
            invoice.total(),
            date,
        )?;
        tx.related_to = Some(DocumentRef::Invoice(invoice.id_typed()));
        Ok(tx)
    }

    /// Income entry for a counter sale.
    pub fn income_from_sale(id: TransactionId, sale: &Sale, date: NaiveDate) -> DomainResult<Self> {
        let mut tx = Self::income(id, "counter sale", sale.total(), date)?;
        tx.related_to = Some(DocumentRef::Sale(sale.id));
        Ok(tx)
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Derived cashbook totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CashbookSummary {
    pub income: Cents,
    pub expense: Cents,
}

impl CashbookSummary {
    /// Net result; negative when expenses outweigh income.
    pub fn net(&self) -> i64 {
        self.income as i64 - self.expense as i64
    }
}

/// Summarize transactions, optionally windowed to one month.
pub fn summarize<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    month: Option<(i32, u32)>,
) -> CashbookSummary {
    use chrono::Datelike;

    let mut summary = CashbookSummary::default();
    for tx in transactions {
        if let Some((year, month)) = month {
            if tx.date.year() != year || tx.date.month() != month {
                continue;
            }
        }
        match tx.kind {
            TransactionKind::Income => summary.income += tx.amount,
            TransactionKind::Expense => summary.expense += tx.amount,
        }
    }
    summary
}
