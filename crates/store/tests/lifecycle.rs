//! End-to-end tests over the whole application state: the quote → invoice →
//! work order pipeline, completion billing, stock movement, bookkeeping and
//! notifications.

use chrono::{Days, Utc};

use vakwerk_core::{DomainError, VatRate};
use vakwerk_events::Event;
use vakwerk_inventory::InventoryItemId;
use vakwerk_invoicing::InvoiceStatus;
use vakwerk_pos::Cart;
use vakwerk_quoting::{LaborLine, QuoteBody, QuoteItem, QuoteStatus};
use vakwerk_store::seed;
use vakwerk_workorders::WorkOrderStatus;

fn quote_body(panel: InventoryItemId, cable: InventoryItemId, cable_meters: i64) -> QuoteBody {
    let today = Utc::now().date_naive();
    QuoteBody {
        items: vec![
            QuoteItem {
                inventory_item_id: Some(panel),
                description: "Groepenkast 3-fase".into(),
                quantity: 1,
                price_per_unit: 350_00,
            },
            QuoteItem {
                inventory_item_id: Some(cable),
                description: "Kabel 3x2.5mm".into(),
                quantity: cable_meters,
                price_per_unit: 1_80,
            },
        ],
        labor: vec![LaborLine {
            description: "Installatiewerk".into(),
            minutes: 300,
            hourly_rate: 65_00,
        }],
        vat_rate: VatRate::Standard,
        valid_until: today.checked_add_days(Days::new(30)).unwrap(),
        notes: None,
        location: Some("Marktplein 4, Utrecht".into()),
        scheduled_date: None,
    }
}

#[test]
fn quote_to_paid_invoice_through_work_order() {
    let now = Utc::now();
    let today = now.date_naive();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;
    let events = backoffice.subscribe();

    // Draft, send, approve. Ordering 180m of cable dips below the reorder
    // level once the work order completes.
    let quote_id = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,180), seeded.owner, now)
        .unwrap();
    backoffice.send_quote(quote_id, seeded.owner, now).unwrap();
    backoffice.approve_quote(quote_id, seeded.owner, now).unwrap();

    let quote_total = backoffice.quotes.get(&quote_id).unwrap().total();
    // items 350.00 + 180 × 1.80 + 5h × 65.00 = 999.00; VAT 209.79
    assert_eq!(quote_total, 1_208_79);

    // Convert to a work order; stock suffices, so no shortages.
    let (work_order_id, shortages) = backoffice
        .convert_quote_to_work_order(quote_id, seeded.technician, seeded.owner, now)
        .unwrap();
    assert!(shortages.is_empty());
    assert_eq!(
        backoffice.quotes.get(&quote_id).unwrap().work_order_id(),
        Some(work_order_id)
    );

    // Work it and complete it with more hours than quoted.
    backoffice
        .change_work_order_status(
            work_order_id,
            WorkOrderStatus::InProgress,
            None,
            seeded.technician,
            now,
        )
        .unwrap();
    backoffice
        .record_time_spent(work_order_id, 360, seeded.technician, now)
        .unwrap();
    let invoice_id = backoffice
        .change_work_order_status(
            work_order_id,
            WorkOrderStatus::Completed,
            None,
            seeded.technician,
            now,
        )
        .unwrap()
        .expect("completion bills an invoice");

    // Materials were deducted, clamped at zero never needed here.
    assert_eq!(backoffice.inventory.get(&seeded.cable).unwrap().quantity(), 20);
    assert_eq!(backoffice.inventory.get(&seeded.panel).unwrap().quantity(), 3);

    // Billing used the actual 6 hours, not the quoted 5.
    let invoice = backoffice.invoices.get(&invoice_id).unwrap();
    assert_eq!(invoice.quote_id(), Some(quote_id));
    assert_eq!(invoice.work_order_id(), Some(work_order_id));
    assert_eq!(invoice.labor()[0].minutes, 360);
    assert_eq!(invoice.total(), invoice.subtotal() + invoice.vat_amount());
    // items 674.00 + 6h × 65.00 = 1064.00; VAT 223.44
    assert_eq!(invoice.subtotal(), 1_064_00);

    // All three documents point at each other.
    assert_eq!(
        backoffice.quotes.get(&quote_id).unwrap().invoice_id(),
        Some(invoice_id)
    );
    assert_eq!(
        backoffice
            .work_orders
            .get(&work_order_id)
            .unwrap()
            .invoice_id(),
        Some(invoice_id)
    );

    // Send and pay; income lands in the cashbook.
    backoffice.send_invoice(invoice_id, seeded.owner, now).unwrap();
    backoffice
        .mark_invoice_paid(invoice_id, today, seeded.owner, now)
        .unwrap();
    let paid_total = backoffice.invoices.get(&invoice_id).unwrap().total();
    assert_eq!(
        backoffice.transactions.iter().map(|t| t.amount).sum::<u64>(),
        paid_total
    );

    // The cable dip below its reorder level raised a notification.
    assert!(
        backoffice
            .notifications
            .iter()
            .any(|n| n.related_item == Some(seeded.cable))
    );

    // The bus saw the whole story.
    let published = events.drain();
    assert!(
        published
            .iter()
            .any(|e| e.event_type() == "quoting.quote.approved")
    );
    assert!(
        published
            .iter()
            .any(|e| e.event_type() == "workorders.order.status_changed")
    );
    assert!(
        published
            .iter()
            .any(|e| e.event_type() == "invoicing.invoice.paid")
    );

    // Dashboard reflects it.
    let dashboard = backoffice.dashboard(today);
    assert_eq!(dashboard.work_orders.completed, 1);
    assert_eq!(dashboard.month_income, paid_total);
    assert_eq!(dashboard.outstanding_invoices, 0);
}

#[test]
fn only_approved_quotes_convert() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let quote_id = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
        .unwrap();

    let err = backoffice
        .convert_quote_to_invoice(quote_id, seeded.owner, now)
        .unwrap_err();
    assert!(matches!(err, DomainError::InvariantViolation(_)));
    assert!(backoffice.invoices.is_empty());

    let err = backoffice
        .convert_quote_to_work_order(quote_id, seeded.technician, seeded.owner, now)
        .unwrap_err();
    assert!(matches!(err, DomainError::InvariantViolation(_)));
    assert!(backoffice.work_orders.is_empty());
}

#[test]
fn quote_to_invoice_links_both_ways_and_numbers_sequentially() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let mut invoice_ids = Vec::new();
    for _ in 0..2 {
        let quote_id = backoffice
            .draft_quote(seeded.jansen, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
            .unwrap();
        backoffice.send_quote(quote_id, seeded.owner, now).unwrap();
        backoffice.approve_quote(quote_id, seeded.owner, now).unwrap();
        let invoice_id = backoffice
            .convert_quote_to_invoice(quote_id, seeded.owner, now)
            .unwrap();
        assert_eq!(
            backoffice.quotes.get(&quote_id).unwrap().invoice_id(),
            Some(invoice_id)
        );

        // A second conversion of the same quote is refused.
        let err = backoffice
            .convert_quote_to_invoice(quote_id, seeded.owner, now)
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        invoice_ids.push(invoice_id);
    }

    let sequences: Vec<u32> = invoice_ids
        .iter()
        .map(|id| backoffice.invoices.get(id).unwrap().number().unwrap().sequence)
        .collect();
    assert_eq!(sequences, vec![1, 2]);
}

#[test]
fn advisory_shortages_warn_but_do_not_block() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    // 10 panels quoted, 4 on hand.
    let mut body = quote_body(seeded.panel, seeded.cable,10);
    body.items[0].quantity = 10;
    let quote_id = backoffice
        .draft_quote(seeded.bakery, body, seeded.owner, now)
        .unwrap();
    backoffice.send_quote(quote_id, seeded.owner, now).unwrap();
    backoffice.approve_quote(quote_id, seeded.owner, now).unwrap();

    let (work_order_id, shortages) = backoffice
        .convert_quote_to_work_order(quote_id, seeded.technician, seeded.owner, now)
        .unwrap();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].required, 10);
    assert_eq!(shortages[0].on_hand, 4);
    assert!(backoffice.work_orders.contains(&work_order_id));

    // Completing clamps the panel stock at zero instead of going negative.
    backoffice
        .change_work_order_status(
            work_order_id,
            WorkOrderStatus::Completed,
            None,
            seeded.technician,
            now,
        )
        .unwrap();
    assert_eq!(backoffice.inventory.get(&seeded.panel).unwrap().quantity(), 0);
}

#[test]
fn deleting_a_quote_removes_exactly_one_record() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let keep = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
        .unwrap();
    let drop = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,12), seeded.owner, now)
        .unwrap();

    backoffice.delete_quote(drop).unwrap();
    assert_eq!(backoffice.quotes.len(), 1);
    assert!(backoffice.quotes.get(&keep).is_some());
    assert_eq!(backoffice.delete_quote(drop).unwrap_err(), DomainError::NotFound);
}

#[test]
fn cloning_a_quote_starts_a_fresh_draft() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let source_id = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
        .unwrap();
    backoffice.send_quote(source_id, seeded.owner, now).unwrap();
    backoffice.reject_quote(source_id, seeded.owner, now).unwrap();

    let clone_id = backoffice.clone_quote(source_id, seeded.owner, now).unwrap();
    assert_ne!(clone_id, source_id);

    let source = backoffice.quotes.get(&source_id).unwrap();
    let clone = backoffice.quotes.get(&clone_id).unwrap();
    assert_eq!(clone.status(), QuoteStatus::Draft);
    assert_eq!(clone.items(), source.items());
    assert_eq!(clone.total(), source.total());
    assert_eq!(clone.history().len(), 1);
}

#[test]
fn overdue_sweep_flags_sent_invoices_past_due() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let quote_id = backoffice
        .draft_quote(seeded.jansen, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
        .unwrap();
    backoffice.send_quote(quote_id, seeded.owner, now).unwrap();
    backoffice.approve_quote(quote_id, seeded.owner, now).unwrap();
    let invoice_id = backoffice
        .convert_quote_to_invoice(quote_id, seeded.owner, now)
        .unwrap();
    backoffice.send_invoice(invoice_id, seeded.owner, now).unwrap();

    // Due in 14 days, so today's sweep finds nothing.
    assert!(backoffice.sweep_overdue(seeded.owner, now).unwrap().is_empty());

    // Three weeks later it flips to overdue.
    let later = now + chrono::Duration::days(21);
    let flagged = backoffice.sweep_overdue(seeded.owner, later).unwrap();
    assert_eq!(flagged, vec![invoice_id]);
    assert_eq!(
        backoffice.invoices.get(&invoice_id).unwrap().status(),
        InvoiceStatus::Overdue
    );

    // Overdue invoices can still be paid.
    backoffice
        .mark_invoice_paid(invoice_id, later.date_naive(), seeded.owner, later)
        .unwrap();
    assert_eq!(
        backoffice.invoices.get(&invoice_id).unwrap().status(),
        InvoiceStatus::Paid
    );
}

#[test]
fn revising_a_quote_syncs_its_open_work_order() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let quote_id = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
        .unwrap();
    backoffice.send_quote(quote_id, seeded.owner, now).unwrap();
    backoffice.approve_quote(quote_id, seeded.owner, now).unwrap();
    let (work_order_id, _) = backoffice
        .convert_quote_to_work_order(quote_id, seeded.technician, seeded.owner, now)
        .unwrap();

    // More cable turns out to be needed; the revision flows into the order.
    backoffice
        .revise_quote(quote_id, quote_body(seeded.panel, seeded.cable,50), seeded.owner, now)
        .unwrap();

    let order = backoffice.work_orders.get(&work_order_id).unwrap();
    let quote = backoffice.quotes.get(&quote_id).unwrap();
    assert_eq!(order.required_inventory()[1].quantity, 50);
    assert_eq!(order.estimated_cost(), Some(quote.total()));

    // Once completed, further revisions leave the order untouched.
    backoffice
        .change_work_order_status(
            work_order_id,
            WorkOrderStatus::Completed,
            None,
            seeded.technician,
            now,
        )
        .unwrap();
    backoffice
        .revise_quote(quote_id, quote_body(seeded.panel, seeded.cable,80), seeded.owner, now)
        .unwrap();
    assert_eq!(
        backoffice
            .work_orders
            .get(&work_order_id)
            .unwrap()
            .required_inventory()[1]
            .quantity,
        50
    );
}

#[test]
fn pos_checkout_moves_stock_and_books_income() {
    let now = Utc::now();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let product = backoffice.products.get(&seeded.lamp_product).cloned().unwrap();
    let mut cart = Cart::new();
    cart.add(&product, 3).unwrap();

    let sale_id = backoffice.checkout(&cart, None, seeded.owner, now).unwrap();
    let sale = backoffice.sales.get(&sale_id).unwrap();
    assert_eq!(sale.total(), 17_97);

    assert_eq!(backoffice.inventory.get(&seeded.lamp).unwrap().quantity(), 57);
    assert_eq!(
        backoffice.transactions.iter().map(|t| t.amount).sum::<u64>(),
        17_97
    );

    // Empty carts never check out.
    let err = backoffice.checkout(&Cart::new(), None, seeded.owner, now).unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[test]
fn crm_views_reflect_the_pipeline() {
    let now = Utc::now();
    let today = now.date_naive();
    let seeded = seed(now).unwrap();
    let mut backoffice = seeded.backoffice;

    let quote_id = backoffice
        .draft_quote(seeded.bakery, quote_body(seeded.panel, seeded.cable,10), seeded.owner, now)
        .unwrap();
    backoffice.send_quote(quote_id, seeded.owner, now).unwrap();
    backoffice.approve_quote(quote_id, seeded.owner, now).unwrap();
    let invoice_id = backoffice
        .convert_quote_to_invoice(quote_id, seeded.owner, now)
        .unwrap();
    backoffice.send_invoice(invoice_id, seeded.owner, now).unwrap();

    let journey = backoffice.customer_journey(seeded.bakery);
    assert_eq!(journey.quotes_approved, 1);
    assert_eq!(journey.invoices_sent, 1);
    // quote sent + quote approved + invoice issued = 3 of 6 milestones
    assert_eq!(journey.progress_percent, 50);

    let finances = backoffice.customer_finances(seeded.bakery);
    let invoice_total = backoffice.invoices.get(&invoice_id).unwrap().total();
    assert_eq!(finances.total_outstanding, invoice_total);
    assert_eq!(finances.outstanding_invoices, 1);
    assert_eq!(finances.total_paid, 0);

    let stats = backoffice.crm_dashboard(today);
    assert_eq!(stats.total_leads, 1);
    assert_eq!(stats.active_leads, 1);
    assert_eq!(stats.pending_follow_ups, 1);
}
