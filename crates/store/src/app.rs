//! `Backoffice`: every collection, and the workflows that span them.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use vakwerk_accounting::Transaction;
use vakwerk_core::{
    AggregateId, DomainError, DomainResult, EmployeeId, InvoiceId, QuoteId, WorkOrderId,
};
use vakwerk_crm::{
    CustomerFinances, CustomerJourney, DashboardStats, Interaction, Lead, Task, customer_finances,
    customer_journey, dashboard_stats,
};
use vakwerk_events::{EventBus, InMemoryEventBus, Projection, Subscription, execute};
use vakwerk_hrm::Employee;
use vakwerk_inventory::{
    AddItem, AdjustQuantity, Category, InventoryCommand, InventoryItem, InventoryItemId,
    ItemDetails, Restock, Shortage, UpdateDetails, next_auto_sku, shortages,
};
use vakwerk_invoicing::{
    CancelInvoice, Invoice, InvoiceCommand, InvoiceNumber, MarkOverdue, MarkPaid, SendInvoice,
    invoice_from_quote, next_invoice_number,
};
use vakwerk_invoicing::LinkWorkOrder as LinkWorkOrderOnInvoice;
use vakwerk_parties::{Customer, CustomerId, Supplier};
use vakwerk_pos::{Cart, Product, Sale, SaleId, checkout};
use vakwerk_quoting::LinkInvoice as LinkInvoiceOnQuote;
use vakwerk_quoting::LinkWorkOrder as LinkWorkOrderOnQuote;
use vakwerk_quoting::{
    ApproveQuote, DraftQuote, ExpireQuote, Quote, QuoteBody, QuoteCommand, RejectQuote,
    ReviseQuote, SendQuote, clone_quote,
};
use vakwerk_workorders::LinkInvoice as LinkInvoiceOnWorkOrder;
use vakwerk_workorders::{
    ChangeStatus, CompletionBilling, RecordTimeSpent, Reassign, Reorder, WorkOrder,
    WorkOrderCommand, WorkOrderStatus, bump_colliding_order, invoice_from_work_order,
    next_sort_index, sync_estimates_from_quote, work_order_from_invoice, work_order_from_quote,
};

use crate::dashboard::{CompanyDashboard, company_dashboard};
use crate::events::AppEvent;
use crate::notifications::{LowStockProjection, Notification};
use crate::planning::{CalendarEvent, agenda};
use crate::repository::Repository;

/// The whole company state, in memory for the session.
///
/// Single-entity edits go straight through the public repositories and the
/// domain constructors; the methods here are the workflows that touch more
/// than one collection, keep the document links in sync, and publish domain
/// events on the bus.
pub struct Backoffice {
    pub customers: Repository<Customer>,
    pub suppliers: Repository<Supplier>,
    pub categories: Repository<Category>,
    pub employees: Repository<Employee>,
    pub inventory: Repository<InventoryItem>,
    pub quotes: Repository<Quote>,
    pub invoices: Repository<Invoice>,
    pub work_orders: Repository<WorkOrder>,
    pub products: Repository<Product>,
    pub sales: Repository<Sale>,
    pub transactions: Repository<Transaction>,
    pub leads: Repository<Lead>,
    pub interactions: Repository<Interaction>,
    pub tasks: Repository<Task>,
    pub notifications: Repository<Notification>,
    bus: Arc<InMemoryEventBus<AppEvent>>,
    low_stock: LowStockProjection,
}

impl Backoffice {
    pub fn new() -> Self {
        Self {
            customers: Repository::new(),
            suppliers: Repository::new(),
            categories: Repository::new(),
            employees: Repository::new(),
            inventory: Repository::new(),
            quotes: Repository::new(),
            invoices: Repository::new(),
            work_orders: Repository::new(),
            products: Repository::new(),
            sales: Repository::new(),
            transactions: Repository::new(),
            leads: Repository::new(),
            interactions: Repository::new(),
            tasks: Repository::new(),
            notifications: Repository::new(),
            bus: Arc::new(InMemoryEventBus::new()),
            low_stock: LowStockProjection::new(),
        }
    }

    /// Subscribe to everything the store publishes.
    pub fn subscribe(&self) -> Subscription<AppEvent> {
        self.bus.subscribe()
    }

    /// Apply events to the in-process projections, publish them on the bus,
    /// and file any notifications the projections raised.
    fn publish_all(&mut self, events: impl IntoIterator<Item = AppEvent>) {
        for event in events {
            self.low_stock.apply(&event);
            if self.bus.publish(event).is_err() {
                warn!("event bus rejected a publish; subscribers may lag");
            }
        }
        for notification in self.low_stock.drain() {
            info!(message = %notification.message, "notification raised");
            // IDs are freshly generated; a collision would be a bug.
            let _ = self.notifications.insert(notification);
        }
    }

    fn publish_quote(&mut self, events: Vec<vakwerk_quoting::QuoteEvent>) {
        self.publish_all(events.into_iter().map(AppEvent::Quote));
    }

    fn publish_invoice(&mut self, events: Vec<vakwerk_invoicing::InvoiceEvent>) {
        self.publish_all(events.into_iter().map(AppEvent::Invoice));
    }

    fn publish_work_order(&mut self, events: Vec<vakwerk_workorders::WorkOrderEvent>) {
        self.publish_all(events.into_iter().map(AppEvent::WorkOrder));
    }

    fn publish_inventory(&mut self, events: Vec<vakwerk_inventory::InventoryEvent>) {
        self.publish_all(events.into_iter().map(AppEvent::Inventory));
    }

    fn next_invoice_number_for(&self, year: i32) -> InvoiceNumber {
        let numbers: Vec<InvoiceNumber> =
            self.invoices.iter().filter_map(|i| i.number()).collect();
        next_invoice_number(&numbers, year)
    }

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    pub fn add_inventory_item(
        &mut self,
        details: ItemDetails,
        initial_quantity: i64,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<InventoryItemId> {
        let auto_sku = next_auto_sku(self.inventory.iter().map(|i| i.auto_sku()));
        let item_id = InventoryItemId::new(AggregateId::new());
        let mut item = InventoryItem::empty(item_id);
        let events = execute(
            &mut item,
            &InventoryCommand::AddItem(AddItem {
                item_id,
                auto_sku,
                details,
                initial_quantity,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.inventory.insert(item)?;
        self.publish_inventory(events);
        Ok(item_id)
    }

    pub fn update_inventory_item(
        &mut self,
        item_id: InventoryItemId,
        details: ItemDetails,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.inventory.get_mut(&item_id)?,
            &InventoryCommand::UpdateDetails(UpdateDetails {
                item_id,
                details,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_inventory(events);
        Ok(())
    }

    pub fn adjust_inventory(
        &mut self,
        item_id: InventoryItemId,
        delta: i64,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.inventory.get_mut(&item_id)?,
            &InventoryCommand::AdjustQuantity(AdjustQuantity {
                item_id,
                delta,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_inventory(events);
        Ok(())
    }

    pub fn restock(
        &mut self,
        item_id: InventoryItemId,
        quantity_added: i64,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.inventory.get_mut(&item_id)?,
            &InventoryCommand::Restock(Restock {
                item_id,
                quantity_added,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_inventory(events);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Quotes
    // ------------------------------------------------------------------

    pub fn draft_quote(
        &mut self,
        customer_id: CustomerId,
        body: QuoteBody,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<QuoteId> {
        if !self.customers.contains(&customer_id) {
            return Err(DomainError::not_found());
        }
        let quote_id = QuoteId::new(AggregateId::new());
        let mut quote = Quote::empty(quote_id);
        let events = execute(
            &mut quote,
            &QuoteCommand::DraftQuote(DraftQuote {
                quote_id,
                customer_id,
                body,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.quotes.insert(quote)?;
        self.publish_quote(events);
        Ok(quote_id)
    }

    /// Revise a quote; a linked, still-open work order is synced along.
    pub fn revise_quote(
        &mut self,
        quote_id: QuoteId,
        body: QuoteBody,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::ReviseQuote(ReviseQuote {
                quote_id,
                body,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_quote(events);

        let sync = {
            let quote = self.quotes.get(&quote_id).ok_or(DomainError::NotFound)?;
            quote
                .work_order_id()
                .and_then(|wo_id| self.work_orders.get(&wo_id))
                .filter(|wo| wo.is_open())
                .map(|wo| sync_estimates_from_quote(quote, wo, actor, now))
                .transpose()?
        };
        if let Some(sync) = sync {
            let wo_id = sync.work_order_id;
            let events = execute(
                self.work_orders.get_mut(&wo_id)?,
                &WorkOrderCommand::SyncEstimates(sync),
            )?;
            self.publish_work_order(events);
            info!(%quote_id, work_order_id = %wo_id, "synced revised quote into work order");
        }
        Ok(())
    }

    pub fn send_quote(
        &mut self,
        quote_id: QuoteId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::SendQuote(SendQuote {
                quote_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_quote(events);
        Ok(())
    }

    pub fn approve_quote(
        &mut self,
        quote_id: QuoteId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::ApproveQuote(ApproveQuote {
                quote_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_quote(events);
        Ok(())
    }

    pub fn reject_quote(
        &mut self,
        quote_id: QuoteId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::RejectQuote(RejectQuote {
                quote_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_quote(events);
        Ok(())
    }

    pub fn expire_quote(
        &mut self,
        quote_id: QuoteId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::ExpireQuote(ExpireQuote {
                quote_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_quote(events);
        Ok(())
    }

    /// Clone a quote onto a fresh draft.
    pub fn clone_quote(
        &mut self,
        quote_id: QuoteId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<QuoteId> {
        let new_id = QuoteId::new(AggregateId::new());
        let draft = {
            let source = self.quotes.get(&quote_id).ok_or(DomainError::NotFound)?;
            clone_quote(source, new_id, actor, now)?
        };
        let mut quote = Quote::empty(new_id);
        let events = execute(&mut quote, &QuoteCommand::DraftQuote(draft))?;
        self.quotes.insert(quote)?;
        self.publish_quote(events);
        Ok(new_id)
    }

    /// Hard delete.
    pub fn delete_quote(&mut self, quote_id: QuoteId) -> DomainResult<()> {
        self.quotes.remove(&quote_id)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// Convert an approved quote into a draft invoice (bidirectional link).
    pub fn convert_quote_to_invoice(
        &mut self,
        quote_id: QuoteId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<InvoiceId> {
        let today = now.date_naive();
        let invoice_id = InvoiceId::new(AggregateId::new());
        let number = self.next_invoice_number_for(today.year());
        let issue = {
            let quote = self.quotes.get(&quote_id).ok_or(DomainError::NotFound)?;
            invoice_from_quote(quote, invoice_id, number, today, actor, now)?
        };

        let quote_events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::LinkInvoice(LinkInvoiceOnQuote {
                quote_id,
                invoice_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;

        let mut invoice = Invoice::empty(invoice_id);
        let invoice_events = execute(&mut invoice, &InvoiceCommand::IssueInvoice(issue))?;
        self.invoices.insert(invoice)?;

        self.publish_quote(quote_events);
        self.publish_invoice(invoice_events);
        info!(%quote_id, %invoice_id, %number, "quote converted into invoice");
        Ok(invoice_id)
    }

    /// Convert an approved quote into a work order.
    ///
    /// Material availability is advisory: shortages are returned (and
    /// logged), never blocking.
    pub fn convert_quote_to_work_order(
        &mut self,
        quote_id: QuoteId,
        assigned_to: EmployeeId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<(WorkOrderId, Vec<Shortage>)> {
        if !self.employees.contains(&assigned_to) {
            return Err(DomainError::not_found());
        }
        let work_order_id = WorkOrderId::new(AggregateId::new());
        let open = {
            let quote = self.quotes.get(&quote_id).ok_or(DomainError::NotFound)?;
            let customer_name = quote
                .customer_id()
                .and_then(|id| self.customers.get(&id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "unknown customer".to_string());
            let sort_index = next_sort_index(self.work_orders.iter(), assigned_to);
            work_order_from_quote(
                quote,
                work_order_id,
                assigned_to,
                &customer_name,
                sort_index,
                actor,
                now,
            )?
        };
        let missing = shortages(&open.required_inventory, |id| self.inventory.get(id));
        for shortage in &missing {
            warn!(
                item = shortage.name.as_deref().unwrap_or("unknown item"),
                required = shortage.required,
                on_hand = shortage.on_hand,
                "not enough stock for work order"
            );
        }

        let quote_events = execute(
            self.quotes.get_mut(&quote_id)?,
            &QuoteCommand::LinkWorkOrder(LinkWorkOrderOnQuote {
                quote_id,
                work_order_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;

        let mut order = WorkOrder::empty(work_order_id);
        let order_events = execute(&mut order, &WorkOrderCommand::OpenWorkOrder(open))?;
        self.work_orders.insert(order)?;

        self.publish_quote(quote_events);
        self.publish_work_order(order_events);
        info!(%quote_id, %work_order_id, "quote converted into work order");
        Ok((work_order_id, missing))
    }

    /// Convert an invoice into a work order.
    pub fn convert_invoice_to_work_order(
        &mut self,
        invoice_id: InvoiceId,
        assigned_to: EmployeeId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<(WorkOrderId, Vec<Shortage>)> {
        if !self.employees.contains(&assigned_to) {
            return Err(DomainError::not_found());
        }
        let work_order_id = WorkOrderId::new(AggregateId::new());
        let open = {
            let invoice = self.invoices.get(&invoice_id).ok_or(DomainError::NotFound)?;
            let customer_name = invoice
                .customer_id()
                .and_then(|id| self.customers.get(&id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "unknown customer".to_string());
            let sort_index = next_sort_index(self.work_orders.iter(), assigned_to);
            work_order_from_invoice(
                invoice,
                work_order_id,
                assigned_to,
                &customer_name,
                sort_index,
                actor,
                now,
            )?
        };
        let missing = shortages(&open.required_inventory, |id| self.inventory.get(id));

        let invoice_events = execute(
            self.invoices.get_mut(&invoice_id)?,
            &InvoiceCommand::LinkWorkOrder(LinkWorkOrderOnInvoice {
                invoice_id,
                work_order_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;

        let mut order = WorkOrder::empty(work_order_id);
        let order_events = execute(&mut order, &WorkOrderCommand::OpenWorkOrder(open))?;
        self.work_orders.insert(order)?;

        self.publish_invoice(invoice_events);
        self.publish_work_order(order_events);
        info!(%invoice_id, %work_order_id, "invoice converted into work order");
        Ok((work_order_id, missing))
    }

    // ------------------------------------------------------------------
    // Work orders
    // ------------------------------------------------------------------

    pub fn record_time_spent(
        &mut self,
        work_order_id: WorkOrderId,
        minutes: u32,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.work_orders.get_mut(&work_order_id)?,
            &WorkOrderCommand::RecordTimeSpent(RecordTimeSpent {
                work_order_id,
                minutes,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_work_order(events);
        Ok(())
    }

    pub fn reassign_work_order(
        &mut self,
        work_order_id: WorkOrderId,
        to: EmployeeId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.employees.contains(&to) {
            return Err(DomainError::not_found());
        }
        let events = execute(
            self.work_orders.get_mut(&work_order_id)?,
            &WorkOrderCommand::Reassign(Reassign {
                work_order_id,
                to,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_work_order(events);
        Ok(())
    }

    /// Change the sort index; a colliding order on the same board is bumped
    /// to the next free index.
    pub fn reorder_work_order(
        &mut self,
        work_order_id: WorkOrderId,
        sort_index: u32,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let assignee = self
            .work_orders
            .get(&work_order_id)
            .ok_or(DomainError::NotFound)?
            .assigned_to()
            .ok_or(DomainError::NotFound)?;
        let bump = bump_colliding_order(self.work_orders.iter(), assignee, sort_index, work_order_id);

        let events = execute(
            self.work_orders.get_mut(&work_order_id)?,
            &WorkOrderCommand::Reorder(Reorder {
                work_order_id,
                sort_index,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_work_order(events);

        if let Some((colliding_id, free_index)) = bump {
            let events = execute(
                self.work_orders.get_mut(&colliding_id)?,
                &WorkOrderCommand::Reorder(Reorder {
                    work_order_id: colliding_id,
                    sort_index: free_index,
                    performed_by: actor,
                    occurred_at: now,
                }),
            )?;
            self.publish_work_order(events);
        }
        Ok(())
    }

    /// Move a work order on the board.
    ///
    /// Completing an order deducts its materials from stock (clamped at
    /// zero) and auto-bills: an already-linked invoice gets its labor
    /// rewritten to the actual time, otherwise a fresh draft invoice is
    /// issued. Returns the invoice touched by billing, if any.
    pub fn change_work_order_status(
        &mut self,
        work_order_id: WorkOrderId,
        to_status: WorkOrderStatus,
        pending_reason: Option<String>,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<InvoiceId>> {
        let events = execute(
            self.work_orders.get_mut(&work_order_id)?,
            &WorkOrderCommand::ChangeStatus(ChangeStatus {
                work_order_id,
                to_status,
                pending_reason,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_work_order(events);

        if to_status != WorkOrderStatus::Completed {
            return Ok(None);
        }
        self.deduct_materials(work_order_id, actor, now)?;
        self.bill_completed_work_order(work_order_id, actor, now)
    }

    /// Take the consumed materials out of stock; unknown items only warn.
    fn deduct_materials(
        &mut self,
        work_order_id: WorkOrderId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let requirements = self
            .work_orders
            .get(&work_order_id)
            .ok_or(DomainError::NotFound)?
            .required_inventory()
            .to_vec();

        for req in requirements {
            if !self.inventory.contains(&req.item_id) {
                warn!(item_id = %req.item_id, "work order consumed an unknown inventory item");
                continue;
            }
            let events = execute(
                self.inventory.get_mut(&req.item_id)?,
                &InventoryCommand::AdjustQuantity(AdjustQuantity {
                    item_id: req.item_id,
                    delta: -req.quantity,
                    performed_by: actor,
                    occurred_at: now,
                }),
            )?;
            self.publish_inventory(events);
        }
        Ok(())
    }

    fn bill_completed_work_order(
        &mut self,
        work_order_id: WorkOrderId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<InvoiceId>> {
        let today = now.date_naive();
        let new_invoice_id = InvoiceId::new(AggregateId::new());
        let number = self.next_invoice_number_for(today.year());

        let billing = {
            let order = self
                .work_orders
                .get(&work_order_id)
                .ok_or(DomainError::NotFound)?;
            if order.customer_id().is_none() {
                warn!(%work_order_id, "completed work order has no customer; skipping billing");
                return Ok(None);
            }
            let source_quote = order.quote_id().and_then(|id| self.quotes.get(&id));
            let existing_invoice = order
                .invoice_id()
                .and_then(|id| self.invoices.get(&id))
                .or_else(|| {
                    order
                        .quote_id()
                        .and_then(|qid| self.invoices.iter().find(|i| i.quote_id() == Some(qid)))
                });
            invoice_from_work_order(
                order,
                source_quote,
                existing_invoice,
                |id| {
                    self.inventory
                        .get(id)
                        .map(|item| (item.name().to_string(), item.sale_price()))
                },
                new_invoice_id,
                number,
                today,
                actor,
                now,
            )?
        };

        match billing {
            None => Ok(None),
            Some(CompletionBilling::ReviseExisting(cmd)) => {
                let invoice_id = cmd.invoice_id;
                let events = execute(
                    self.invoices.get_mut(&invoice_id)?,
                    &InvoiceCommand::ReviseLaborActuals(cmd),
                )?;
                self.publish_invoice(events);
                info!(%work_order_id, %invoice_id, "rebilled actual hours on existing invoice");
                Ok(Some(invoice_id))
            }
            Some(CompletionBilling::IssueNew(cmd)) => {
                let quote_id = cmd.quote_id;
                let mut invoice = Invoice::empty(new_invoice_id);
                let events = execute(&mut invoice, &InvoiceCommand::IssueInvoice(cmd))?;
                self.invoices.insert(invoice)?;
                self.publish_invoice(events);

                let events = execute(
                    self.work_orders.get_mut(&work_order_id)?,
                    &WorkOrderCommand::LinkInvoice(LinkInvoiceOnWorkOrder {
                        work_order_id,
                        invoice_id: new_invoice_id,
                        performed_by: actor,
                        occurred_at: now,
                    }),
                )?;
                self.publish_work_order(events);

                // Close the loop on the source quote too, when it is still
                // unconverted.
                if let Some(quote_id) = quote_id {
                    let linkable = self
                        .quotes
                        .get(&quote_id)
                        .is_some_and(|q| q.is_convertible() && q.invoice_id().is_none());
                    if linkable {
                        let events = execute(
                            self.quotes.get_mut(&quote_id)?,
                            &QuoteCommand::LinkInvoice(LinkInvoiceOnQuote {
                                quote_id,
                                invoice_id: new_invoice_id,
                                performed_by: actor,
                                occurred_at: now,
                            }),
                        )?;
                        self.publish_quote(events);
                    }
                }
                info!(%work_order_id, invoice_id = %new_invoice_id, "completed work order billed");
                Ok(Some(new_invoice_id))
            }
        }
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    pub fn send_invoice(
        &mut self,
        invoice_id: InvoiceId,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.invoices.get_mut(&invoice_id)?,
            &InvoiceCommand::SendInvoice(SendInvoice {
                invoice_id,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_invoice(events);
        Ok(())
    }

    pub fn cancel_invoice(
        &mut self,
        invoice_id: InvoiceId,
        reason: Option<String>,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.invoices.get_mut(&invoice_id)?,
            &InvoiceCommand::CancelInvoice(CancelInvoice {
                invoice_id,
                reason,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_invoice(events);
        Ok(())
    }

    /// Mark an invoice paid and book the income.
    pub fn mark_invoice_paid(
        &mut self,
        invoice_id: InvoiceId,
        paid_date: NaiveDate,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let events = execute(
            self.invoices.get_mut(&invoice_id)?,
            &InvoiceCommand::MarkPaid(MarkPaid {
                invoice_id,
                paid_date,
                performed_by: actor,
                occurred_at: now,
            }),
        )?;
        self.publish_invoice(events);

        let invoice = self.invoices.get(&invoice_id).ok_or(DomainError::NotFound)?;
        let tx = Transaction::income_from_invoice(
            vakwerk_accounting::TransactionId::new(AggregateId::new()),
            invoice,
            paid_date,
        )?;
        info!(%invoice_id, amount = tx.amount, "invoice paid, income booked");
        self.transactions.insert(tx)?;
        Ok(())
    }

    /// Flag every sent invoice past its due date as overdue.
    pub fn sweep_overdue(
        &mut self,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<InvoiceId>> {
        let today = now.date_naive();
        let due: Vec<InvoiceId> = self
            .invoices
            .iter()
            .filter(|i| i.is_past_due(today))
            .map(|i| i.id_typed())
            .collect();

        for invoice_id in &due {
            let events = execute(
                self.invoices.get_mut(invoice_id)?,
                &InvoiceCommand::MarkOverdue(MarkOverdue {
                    invoice_id: *invoice_id,
                    as_of: today,
                    performed_by: actor,
                    occurred_at: now,
                }),
            )?;
            self.publish_invoice(events);
        }
        if !due.is_empty() {
            info!(count = due.len(), "invoices flagged overdue");
        }
        Ok(due)
    }

    // ------------------------------------------------------------------
    // POS
    // ------------------------------------------------------------------

    /// Check out the counter cart: record the sale, deduct stock, book the
    /// income.
    pub fn checkout(
        &mut self,
        cart: &Cart,
        customer_id: Option<CustomerId>,
        actor: EmployeeId,
        now: DateTime<Utc>,
    ) -> DomainResult<SaleId> {
        let sale_id = SaleId::new(AggregateId::new());
        let sale = checkout(cart, sale_id, customer_id, now)?;

        for line in &sale.lines {
            if !self.inventory.contains(&line.inventory_item_id) {
                warn!(item_id = %line.inventory_item_id, "sold a product with no inventory item");
                continue;
            }
            let events = execute(
                self.inventory.get_mut(&line.inventory_item_id)?,
                &InventoryCommand::AdjustQuantity(AdjustQuantity {
                    item_id: line.inventory_item_id,
                    delta: -line.quantity,
                    performed_by: actor,
                    occurred_at: now,
                }),
            )?;
            self.publish_inventory(events);
        }

        let tx = Transaction::income_from_sale(
            vakwerk_accounting::TransactionId::new(AggregateId::new()),
            &sale,
            now.date_naive(),
        )?;
        info!(%sale_id, total = sale.total(), "counter sale checked out");
        self.transactions.insert(tx)?;
        self.sales.insert(sale)?;
        Ok(sale_id)
    }

    // ------------------------------------------------------------------
    // HRM
    // ------------------------------------------------------------------

    pub fn request_vacation(&mut self, employee_id: EmployeeId, days: u32) -> DomainResult<()> {
        self.employees.get_mut(&employee_id)?.request_vacation(days)
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn dashboard(&self, today: NaiveDate) -> CompanyDashboard {
        company_dashboard(self, today)
    }

    pub fn agenda(&self, today: NaiveDate) -> Vec<CalendarEvent> {
        agenda(self.work_orders.iter(), self.employees.iter(), today)
    }

    pub fn crm_dashboard(&self, today: NaiveDate) -> DashboardStats {
        dashboard_stats(
            self.leads.iter(),
            self.customers.iter(),
            self.interactions.iter(),
            self.tasks.iter(),
            today,
        )
    }

    pub fn customer_journey(&self, customer_id: CustomerId) -> CustomerJourney {
        customer_journey(
            customer_id,
            self.quotes.iter(),
            self.invoices.iter(),
            self.work_orders.iter(),
        )
    }

    pub fn customer_finances(&self, customer_id: CustomerId) -> CustomerFinances {
        customer_finances(customer_id, self.invoices.iter(), self.quotes.iter())
    }
}

impl Default for Backoffice {
    fn default() -> Self {
        Self::new()
    }
}
