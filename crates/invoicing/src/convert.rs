//! Quote → invoice conversion.

use chrono::{DateTime, Days, NaiveDate, Utc};

use vakwerk_core::{DomainError, DomainResult, EmployeeId, InvoiceId};
use vakwerk_quoting::Quote;

use crate::invoice::{InvoiceBody, IssueInvoice};
use crate::number::InvoiceNumber;

/// Payment window granted on converted invoices.
pub const DEFAULT_DUE_DAYS: u64 = 14;

/// Payment terms printed on converted invoices.
pub const DEFAULT_PAYMENT_TERMS: &str = "14 dagen";

/// Build the `IssueInvoice` command that converts an approved quote into a
/// draft invoice.
///
/// Lines, VAT rate, notes, location and scheduled date carry over; the due
/// date is the issue date plus the default payment window. The caller is
/// responsible for also linking the invoice back onto the quote.
pub fn invoice_from_quote(
    quote: &Quote,
    invoice_id: InvoiceId,
    number: InvoiceNumber,
    issue_date: NaiveDate,
    performed_by: EmployeeId,
    occurred_at: DateTime<Utc>,
) -> DomainResult<IssueInvoice> {
    if !quote.is_convertible() {
        return Err(DomainError::invariant(
            "only approved quotes can be converted into invoices",
        ));
    }
    let customer_id = quote.customer_id().ok_or_else(DomainError::not_found)?;

    let due_date = issue_date
        .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
        .unwrap_or(issue_date);

    Ok(IssueInvoice {
        invoice_id,
        number,
        customer_id,
        quote_id: Some(quote.id_typed()),
        work_order_id: quote.work_order_id(),
        body: InvoiceBody {
            items: quote.items().to_vec(),
            labor: quote.labor().to_vec(),
            vat_rate: quote.vat_rate(),
            due_date,
            payment_terms: Some(DEFAULT_PAYMENT_TERMS.to_string()),
            notes: quote.notes().map(str::to_string),
            location: quote.location().map(str::to_string),
            scheduled_date: quote.scheduled_date(),
        },
        issue_date,
        performed_by,
        occurred_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{Invoice, InvoiceCommand, InvoiceStatus};
    use vakwerk_core::{AggregateId, QuoteId, VatRate};
    use vakwerk_events::execute;
    use vakwerk_parties::CustomerId;
    use vakwerk_quoting::{
        ApproveQuote, DraftQuote, LaborLine, QuoteBody, QuoteCommand, QuoteItem, SendQuote,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quote_with_status(approved: bool) -> Quote {
        let id = QuoteId::new(AggregateId::new());
        let by = EmployeeId::new();
        let now = Utc::now();
        let mut quote = Quote::empty(id);
        execute(
            &mut quote,
            &QuoteCommand::DraftQuote(DraftQuote {
                quote_id: id,
                customer_id: CustomerId::new(AggregateId::new()),
                body: QuoteBody {
                    items: vec![QuoteItem {
                        inventory_item_id: None,
                        description: "Zonwering".into(),
                        quantity: 2,
                        price_per_unit: 150_00,
                    }],
                    labor: vec![LaborLine {
                        description: "Montage".into(),
                        minutes: 180,
                        hourly_rate: 65_00,
                    }],
                    vat_rate: VatRate::Standard,
                    valid_until: date(2026, 9, 30),
                    notes: Some("Inclusief afvoer oude zonwering".into()),
                    location: Some("Dorpsstraat 1".into()),
                    scheduled_date: Some(date(2026, 8, 20)),
                },
                performed_by: by,
                occurred_at: now,
            }),
        )
        .unwrap();
        execute(
            &mut quote,
            &QuoteCommand::SendQuote(SendQuote {
                quote_id: id,
                performed_by: by,
                occurred_at: now,
            }),
        )
        .unwrap();
        if approved {
            execute(
                &mut quote,
                &QuoteCommand::ApproveQuote(ApproveQuote {
                    quote_id: id,
                    performed_by: by,
                    occurred_at: now,
                }),
            )
            .unwrap();
        }
        quote
    }

    #[test]
    fn unapproved_quotes_are_refused() {
        let quote = quote_with_status(false);
        let err = invoice_from_quote(
            &quote,
            InvoiceId::new(AggregateId::new()),
            InvoiceNumber::first_of(2026),
            date(2026, 8, 7),
            EmployeeId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn conversion_copies_lines_and_links_back() {
        let quote = quote_with_status(true);
        let invoice_id = InvoiceId::new(AggregateId::new());
        let cmd = invoice_from_quote(
            &quote,
            invoice_id,
            InvoiceNumber::first_of(2026),
            date(2026, 8, 7),
            EmployeeId::new(),
            Utc::now(),
        )
        .unwrap();

        let mut invoice = Invoice::empty(invoice_id);
        execute(&mut invoice, &InvoiceCommand::IssueInvoice(cmd)).unwrap();

        assert_eq!(invoice.status(), InvoiceStatus::Draft);
        assert_eq!(invoice.quote_id(), Some(quote.id_typed()));
        assert_eq!(invoice.items(), quote.items());
        assert_eq!(invoice.labor(), quote.labor());
        assert_eq!(invoice.total(), quote.total());
        assert_eq!(invoice.due_date(), Some(date(2026, 8, 21)));
        assert_eq!(invoice.payment_terms(), Some(DEFAULT_PAYMENT_TERMS));
        assert_eq!(invoice.notes(), quote.notes());
    }
}
