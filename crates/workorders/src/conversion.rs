//! Conversions between quotes, invoices and work orders.
//!
//! These builders produce the commands for the target aggregate; the caller
//! (the application store) executes them and links the documents back
//! together.

use chrono::{DateTime, Days, NaiveDate, Utc};

use vakwerk_core::{
    Cents, DomainError, DomainResult, EmployeeId, InvoiceId, VatRate, WorkOrderId, format_eur,
};
use vakwerk_inventory::{InventoryItemId, MaterialRequirement};
use vakwerk_invoicing::{
    DEFAULT_DUE_DAYS, DEFAULT_PAYMENT_TERMS, Invoice, InvoiceBody, InvoiceNumber, InvoiceStatus,
    IssueInvoice, ReviseLaborActuals,
};
use vakwerk_quoting::{LaborLine, Quote, QuoteItem};

use crate::order::{OpenWorkOrder, SyncEstimates, WorkOrder, WorkOrderStatus};

/// Hourly rate billed for labor that was never quoted, in cents.
pub const DEFAULT_HOURLY_RATE: Cents = 65_00;

fn materials_from_items(items: &[QuoteItem]) -> Vec<MaterialRequirement> {
    items
        .iter()
        .filter_map(|item| {
            item.inventory_item_id.map(|item_id| MaterialRequirement {
                item_id,
                quantity: item.quantity,
            })
        })
        .collect()
}

fn estimate_notes(minutes: u32, cost: Cents) -> String {
    format!(
        "estimated time: {} min\nestimated cost: {}",
        minutes,
        format_eur(cost)
    )
}

/// Build the `OpenWorkOrder` command that converts an approved quote.
///
/// Materials come from the quote lines that reference stock; the estimate is
/// the quote's labor time and total. The caller also links the work order
/// back onto the quote.
pub fn work_order_from_quote(
    quote: &Quote,
    work_order_id: WorkOrderId,
    assigned_to: EmployeeId,
    customer_name: &str,
    sort_index: u32,
    performed_by: EmployeeId,
    occurred_at: DateTime<Utc>,
) -> DomainResult<OpenWorkOrder> {
    if !quote.is_convertible() {
        return Err(DomainError::invariant(
            "only approved quotes can be converted into work orders",
        ));
    }
    let customer_id = quote.customer_id().ok_or_else(DomainError::not_found)?;
    let estimated_minutes = quote.estimated_minutes();

    Ok(OpenWorkOrder {
        work_order_id,
        title: format!("{customer_name} - quote {}", quote.id_typed()),
        description: quote
            .notes()
            .map(str::to_string)
            .unwrap_or_else(|| format!("work order created from quote {}", quote.id_typed())),
        assigned_to,
        customer_id: Some(customer_id),
        location: quote.location().map(str::to_string),
        scheduled_date: quote.scheduled_date(),
        pending_reason: None,
        required_inventory: materials_from_items(quote.items()),
        quote_id: Some(quote.id_typed()),
        invoice_id: None,
        estimated_minutes: Some(estimated_minutes),
        estimated_cost: Some(quote.total()),
        notes: Some(estimate_notes(estimated_minutes, quote.total())),
        sort_index,
        performed_by,
        occurred_at,
    })
}

/// Build the `OpenWorkOrder` command that converts an invoice.
pub fn work_order_from_invoice(
    invoice: &Invoice,
    work_order_id: WorkOrderId,
    assigned_to: EmployeeId,
    customer_name: &str,
    sort_index: u32,
    performed_by: EmployeeId,
    occurred_at: DateTime<Utc>,
) -> DomainResult<OpenWorkOrder> {
    if invoice.status() == InvoiceStatus::Cancelled {
        return Err(DomainError::invariant(
            "cancelled invoices cannot be converted into work orders",
        ));
    }
    let customer_id = invoice.customer_id().ok_or_else(DomainError::not_found)?;
    let number = invoice.number().ok_or_else(DomainError::not_found)?;
    let estimated_minutes: u32 = invoice.labor().iter().map(|l| l.minutes).sum();

    Ok(OpenWorkOrder {
        work_order_id,
        title: format!("{customer_name} - invoice {number}"),
        description: invoice
            .notes()
            .map(str::to_string)
            .unwrap_or_else(|| format!("work order created from invoice {number}")),
        assigned_to,
        customer_id: Some(customer_id),
        location: invoice.location().map(str::to_string),
        scheduled_date: invoice.scheduled_date(),
        pending_reason: None,
        required_inventory: materials_from_items(invoice.items()),
        quote_id: invoice.quote_id(),
        invoice_id: Some(invoice.id_typed()),
        estimated_minutes: Some(estimated_minutes),
        estimated_cost: Some(invoice.total()),
        notes: Some(estimate_notes(estimated_minutes, invoice.total())),
        sort_index,
        performed_by,
        occurred_at,
    })
}

/// Build the `SyncEstimates` command pushing a revised quote into its linked
/// work order. Refused when the order is not linked to this quote or already
/// completed.
pub fn sync_estimates_from_quote(
    quote: &Quote,
    work_order: &WorkOrder,
    performed_by: EmployeeId,
    occurred_at: DateTime<Utc>,
) -> DomainResult<SyncEstimates> {
    if work_order.quote_id() != Some(quote.id_typed()) {
        return Err(DomainError::invariant(
            "work order is not linked to this quote",
        ));
    }
    if !work_order.is_open() {
        return Err(DomainError::invariant(
            "completed work orders cannot be changed",
        ));
    }

    Ok(SyncEstimates {
        work_order_id: work_order.id_typed(),
        required_inventory: materials_from_items(quote.items()),
        estimated_minutes: Some(quote.estimated_minutes()),
        estimated_cost: Some(quote.total()),
        performed_by,
        occurred_at,
    })
}

/// What completing a work order means for billing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionBilling {
    /// An invoice already exists; rewrite its billed labor to the actual
    /// time spent.
    ReviseExisting(ReviseLaborActuals),
    /// No invoice exists yet; issue a fresh draft.
    IssueNew(IssueInvoice),
}

/// Decide how a completed work order gets billed.
///
/// - If an invoice is already linked (directly, or found via the source
///   quote), its labor is rewritten to the minutes actually spent, or
///   nothing happens when there is nothing to revise.
/// - Otherwise a draft invoice is issued: lines come from the source quote
///   (labor rewritten to actual minutes), or failing that from the consumed
///   materials at their sale prices, or failing that a single line at the
///   estimated cost. Unquoted labor is billed at [`DEFAULT_HOURLY_RATE`].
pub fn invoice_from_work_order(
    work_order: &WorkOrder,
    source_quote: Option<&Quote>,
    existing_invoice: Option<&Invoice>,
    mut inventory: impl FnMut(&InventoryItemId) -> Option<(String, Cents)>,
    new_invoice_id: InvoiceId,
    number: InvoiceNumber,
    issue_date: NaiveDate,
    performed_by: EmployeeId,
    occurred_at: DateTime<Utc>,
) -> DomainResult<Option<CompletionBilling>> {
    if work_order.status() != WorkOrderStatus::Completed {
        return Err(DomainError::invariant(
            "only completed work orders are billed",
        ));
    }

    if let Some(invoice) = existing_invoice {
        let revisable = !matches!(
            invoice.status(),
            InvoiceStatus::Paid | InvoiceStatus::Cancelled
        );
        return Ok(match work_order.minutes_spent() {
            Some(minutes) if minutes > 0 && revisable && !invoice.labor().is_empty() => {
                Some(CompletionBilling::ReviseExisting(ReviseLaborActuals {
                    invoice_id: invoice.id_typed(),
                    minutes_spent: minutes,
                    performed_by,
                    occurred_at,
                }))
            }
            // Already billed and nothing to revise.
            _ => None,
        });
    }

    let customer_id = work_order.customer_id().ok_or_else(|| {
        DomainError::validation("cannot bill a work order without a customer")
    })?;

    let minutes_spent = work_order.minutes_spent().unwrap_or(0);

    let (mut items, mut labor, vat_rate) = match source_quote {
        Some(quote) => {
            let mut labor = quote.labor().to_vec();
            if minutes_spent > 0 {
                for line in &mut labor {
                    line.minutes = minutes_spent;
                }
            }
            (quote.items().to_vec(), labor, quote.vat_rate())
        }
        None => {
            let items: Vec<QuoteItem> = work_order
                .required_inventory()
                .iter()
                .map(|req| {
                    let (description, price_per_unit) = inventory(&req.item_id)
                        .unwrap_or_else(|| ("unknown item".to_string(), 0));
                    QuoteItem {
                        inventory_item_id: Some(req.item_id),
                        description,
                        quantity: req.quantity,
                        price_per_unit,
                    }
                })
                .collect();
            (items, Vec::new(), VatRate::default())
        }
    };

    if items.is_empty() {
        items.push(QuoteItem {
            inventory_item_id: None,
            description: format!("work performed - {}", work_order.title()),
            quantity: 1,
            price_per_unit: work_order.estimated_cost().unwrap_or(0),
        });
    }
    if labor.is_empty() && minutes_spent > 0 {
        labor.push(LaborLine {
            description: format!("work performed - {}", work_order.title()),
            minutes: minutes_spent,
            hourly_rate: DEFAULT_HOURLY_RATE,
        });
    }

    let due_date = issue_date
        .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
        .unwrap_or(issue_date);
    let mut notes = format!(
        "invoice created automatically after completing work order {}",
        work_order.id_typed()
    );
    if let Some(extra) = work_order.notes() {
        notes.push('\n');
        notes.push_str(extra);
    }

    Ok(Some(CompletionBilling::IssueNew(IssueInvoice {
        invoice_id: new_invoice_id,
        number,
        customer_id,
        quote_id: work_order.quote_id(),
        work_order_id: Some(work_order.id_typed()),
        body: InvoiceBody {
            items,
            labor,
            vat_rate,
            due_date,
            payment_terms: Some(DEFAULT_PAYMENT_TERMS.to_string()),
            notes: Some(notes),
            location: work_order.location().map(str::to_string),
            scheduled_date: work_order.scheduled_date(),
        },
        issue_date,
        performed_by,
        occurred_at,
    })))
}
