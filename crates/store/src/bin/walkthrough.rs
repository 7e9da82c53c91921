//! Seeds the demo company and walks one job through the whole flow:
//! quote → send → approve → work order → complete → auto-bill → paid.
//!
//! Run with `RUST_LOG=info cargo run -p vakwerk-store --bin walkthrough`.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use tracing::info;

use vakwerk_core::{VatRate, format_eur};
use vakwerk_quoting::{LaborLine, QuoteBody, QuoteItem};
use vakwerk_store::seed;
use vakwerk_workorders::WorkOrderStatus;

fn main() -> Result<()> {
    vakwerk_observability::init();

    let now = Utc::now();
    let today = now.date_naive();
    let seeded = seed(now).context("seeding demo company")?;
    let mut backoffice = seeded.backoffice;

    // Quote the bakery for a new breaker panel.
    let valid_until = today
        .checked_add_days(Days::new(30))
        .unwrap_or(today);
    let quote_id = backoffice.draft_quote(
        seeded.bakery,
        QuoteBody {
            items: vec![
                QuoteItem {
                    inventory_item_id: Some(seeded.panel),
                    description: "Groepenkast 3-fase".into(),
                    quantity: 1,
                    price_per_unit: 350_00,
                },
                QuoteItem {
                    inventory_item_id: Some(seeded.cable),
                    description: "Kabel 3x2.5mm".into(),
                    quantity: 40,
                    price_per_unit: 1_80,
                },
            ],
            labor: vec![LaborLine {
                description: "Installatiewerk".into(),
                minutes: 300,
                hourly_rate: 65_00,
            }],
            vat_rate: VatRate::Standard,
            valid_until,
            notes: Some("Inclusief keuring van de installatie".into()),
            location: Some("Marktplein 4, Utrecht".into()),
            scheduled_date: today.checked_add_days(Days::new(7)),
        },
        seeded.owner,
        now,
    )?;
    let total = backoffice
        .quotes
        .get(&quote_id)
        .map(|q| q.total())
        .unwrap_or_default();
    info!(%quote_id, total = %format_eur(total), "quote drafted");

    backoffice.send_quote(quote_id, seeded.owner, now)?;
    backoffice.approve_quote(quote_id, seeded.owner, now)?;

    // Approved: put it on the technician's board.
    let (work_order_id, shortages) =
        backoffice.convert_quote_to_work_order(quote_id, seeded.technician, seeded.owner, now)?;
    info!(%work_order_id, shortages = shortages.len(), "work order opened");

    backoffice.change_work_order_status(
        work_order_id,
        WorkOrderStatus::InProgress,
        None,
        seeded.technician,
        now,
    )?;
    backoffice.record_time_spent(work_order_id, 330, seeded.technician, now)?;

    // Completion deducts the materials and bills the actual hours.
    let invoice_id = backoffice
        .change_work_order_status(
            work_order_id,
            WorkOrderStatus::Completed,
            None,
            seeded.technician,
            now,
        )?
        .context("completion should have produced an invoice")?;
    backoffice.send_invoice(invoice_id, seeded.owner, now)?;

    let paid_on: NaiveDate = today.checked_add_days(Days::new(10)).unwrap_or(today);
    backoffice.mark_invoice_paid(invoice_id, paid_on, seeded.owner, now)?;

    // A quick counter sale on the side.
    let mut cart = vakwerk_pos::Cart::new();
    if let Some(product) = backoffice.products.get(&seeded.lamp_product).cloned() {
        cart.add(&product, 3)?;
    }
    let sale_id = backoffice.checkout(&cart, None, seeded.owner, now)?;
    info!(%sale_id, "counter sale done");

    let dashboard = backoffice.dashboard(today);
    info!(
        open_quotes = dashboard.open_quotes,
        outstanding = %format_eur(dashboard.outstanding_amount),
        month_income = %format_eur(dashboard.month_income),
        completed_orders = dashboard.work_orders.completed,
        low_stock = dashboard.low_stock_items,
        "end of walkthrough"
    );

    Ok(())
}
