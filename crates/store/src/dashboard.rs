//! The company-wide dashboard summary.

use chrono::{Datelike, NaiveDate};

use vakwerk_core::Cents;
use vakwerk_accounting::summarize;
use vakwerk_invoicing::InvoiceStatus;
use vakwerk_quoting::QuoteStatus;
use vakwerk_workorders::{WorkOrderStats, work_order_stats};

use crate::app::Backoffice;

/// Cross-module overview: what needs attention today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanyDashboard {
    /// Draft and sent quotes awaiting a decision.
    pub open_quotes: usize,
    /// Approved quotes not yet converted into an invoice.
    pub approved_unconverted_quotes: usize,
    pub outstanding_invoices: usize,
    pub outstanding_amount: Cents,
    pub overdue_invoices: usize,
    pub work_orders: WorkOrderStats,
    pub low_stock_items: usize,
    pub month_income: Cents,
    pub month_expense: Cents,
}

pub fn company_dashboard(backoffice: &Backoffice, today: NaiveDate) -> CompanyDashboard {
    let mut dashboard = CompanyDashboard::default();

    for quote in backoffice.quotes.iter() {
        match quote.status() {
            QuoteStatus::Draft | QuoteStatus::Sent => dashboard.open_quotes += 1,
            QuoteStatus::Approved if quote.invoice_id().is_none() => {
                dashboard.approved_unconverted_quotes += 1;
            }
            _ => {}
        }
    }

    for invoice in backoffice.invoices.iter() {
        if invoice.is_outstanding() {
            dashboard.outstanding_invoices += 1;
            dashboard.outstanding_amount += invoice.total();
        }
        if invoice.status() == InvoiceStatus::Overdue {
            dashboard.overdue_invoices += 1;
        }
    }

    dashboard.work_orders = work_order_stats(backoffice.work_orders.iter());
    dashboard.low_stock_items = backoffice
        .inventory
        .iter()
        .filter(|item| item.is_low_stock())
        .count();

    let month = summarize(
        backoffice.transactions.iter(),
        Some((today.year(), today.month())),
    );
    dashboard.month_income = month.income;
    dashboard.month_expense = month.expense;

    dashboard
}
