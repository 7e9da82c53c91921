//! Deterministic demo dataset.
//!
//! Used by the walkthrough binary and the end-to-end tests to start from a
//! small but fully-populated company.

use chrono::{DateTime, Datelike, Utc};

use vakwerk_core::{AggregateId, DomainResult, EmployeeId, VatRate};
use vakwerk_crm::{Interaction, InteractionId, InteractionKind, Lead, LeadId, LeadStatus};
use vakwerk_crm::{Task, TaskId, TaskPriority};
use vakwerk_hrm::Employee;
use vakwerk_inventory::{Category, CategoryId, InventoryItemId, ItemDetails};
use vakwerk_parties::{ContactInfo, Customer, CustomerId, CustomerKind, Supplier, SupplierId};
use vakwerk_pos::{Product, ProductId};

use crate::app::Backoffice;

/// Handles into the seeded dataset.
pub struct Seeded {
    pub backoffice: Backoffice,
    pub owner: EmployeeId,
    pub technician: EmployeeId,
    pub bakery: CustomerId,
    pub jansen: CustomerId,
    pub cable: InventoryItemId,
    pub panel: InventoryItemId,
    pub lamp: InventoryItemId,
    pub lamp_product: ProductId,
}

/// Build a small company: two employees, two customers, a supplier, two
/// categories, three stock items, one counter product, and some CRM state.
pub fn seed(now: DateTime<Utc>) -> DomainResult<Seeded> {
    let mut backoffice = Backoffice::new();
    let today = now.date_naive();

    let owner = EmployeeId::new();
    backoffice.employees.insert(Employee::register(
        owner,
        "Willem Vakman",
        "Eigenaar",
        ContactInfo::with_email("willem@vakwerk.nl"),
        today.with_year(today.year() - 9).unwrap_or(today),
        25,
    )?)?;
    let technician = EmployeeId::new();
    backoffice.employees.insert(Employee::register(
        technician,
        "Pieter Visser",
        "Monteur",
        ContactInfo::with_email("pieter@vakwerk.nl"),
        today.with_year(today.year() - 3).unwrap_or(today),
        25,
    )?)?;

    let bakery = CustomerId::new(AggregateId::new());
    let mut bakery_customer = Customer::register(
        bakery,
        "Bakkerij Smit",
        ContactInfo {
            email: Some("info@bakkerijsmit.nl".into()),
            phone: Some("030-1234567".into()),
            address: Some("Marktplein 4, Utrecht".into()),
        },
        CustomerKind::Business,
        today,
    )?;
    bakery_customer.company = Some("Bakkerij Smit B.V.".into());
    bakery_customer.source = Some("referral".into());
    backoffice.customers.insert(bakery_customer)?;

    let jansen = CustomerId::new(AggregateId::new());
    backoffice.customers.insert(Customer::register(
        jansen,
        "Fam. Jansen",
        ContactInfo::with_email("jansen@voorbeeld.nl"),
        CustomerKind::Private,
        today,
    )?)?;

    let supplier_id = SupplierId::new(AggregateId::new());
    backoffice.suppliers.insert(Supplier::register(
        supplier_id,
        "Groothandel Technische Unie",
        ContactInfo::with_email("verkoop@tu.nl"),
    )?)?;

    let electrical = CategoryId::new(AggregateId::new());
    backoffice
        .categories
        .insert(Category::new(electrical, "Elektra")?)?;
    let lighting = CategoryId::new(AggregateId::new());
    backoffice
        .categories
        .insert(Category::new(lighting, "Verlichting")?)?;

    let cable = backoffice.add_inventory_item(
        ItemDetails {
            name: "Kabel 3x2.5mm".into(),
            supplier_sku: Some("TU-KB325".into()),
            custom_sku: None,
            reorder_level: 25,
            unit: "meter".into(),
            location: Some("Stelling A3".into()),
            purchase_price: 1_20,
            sale_price: 1_80,
            vat_rate: VatRate::Standard,
            supplier_id: Some(supplier_id),
            category_id: Some(electrical),
            pos_alert_note: None,
        },
        200,
        owner,
        now,
    )?;
    let panel = backoffice.add_inventory_item(
        ItemDetails {
            name: "Groepenkast 3-fase".into(),
            supplier_sku: Some("TU-GK3F".into()),
            custom_sku: None,
            reorder_level: 2,
            unit: "stuk".into(),
            location: Some("Magazijn B1".into()),
            purchase_price: 210_00,
            sale_price: 350_00,
            vat_rate: VatRate::Standard,
            supplier_id: Some(supplier_id),
            category_id: Some(electrical),
            pos_alert_note: None,
        },
        4,
        owner,
        now,
    )?;
    let lamp = backoffice.add_inventory_item(
        ItemDetails {
            name: "LED lamp E27".into(),
            supplier_sku: None,
            custom_sku: Some("LAMP-E27".into()),
            reorder_level: 10,
            unit: "stuk".into(),
            location: Some("Toonbank".into()),
            purchase_price: 2_10,
            sale_price: 4_95,
            vat_rate: VatRate::Standard,
            supplier_id: Some(supplier_id),
            category_id: Some(lighting),
            pos_alert_note: Some("Actie: 3 voor 12 euro".into()),
        },
        60,
        owner,
        now,
    )?;

    let lamp_product = ProductId::new(AggregateId::new());
    backoffice
        .products
        .insert(Product::new(lamp_product, "LED lamp E27", 5_99, lamp)?)?;

    let lead_id = LeadId::new(AggregateId::new());
    let mut lead = Lead::register(
        lead_id,
        "Aannemer De Groot",
        ContactInfo::with_email("info@degroot.nl"),
        "website",
        today,
    )?;
    lead.estimated_value = Some(12_500_00);
    lead.update_status(LeadStatus::Contacted, today)?;
    backoffice.leads.insert(lead)?;

    backoffice.interactions.insert(
        Interaction::log(
            InteractionId::new(AggregateId::new()),
            Some(bakery),
            None,
            InteractionKind::Call,
            "Storing in de ovengroep",
            now,
        )?
        .with_follow_up(today),
    )?;

    backoffice.tasks.insert(Task::new(
        TaskId::new(AggregateId::new()),
        "Offerte nabellen bij Bakkerij Smit",
        TaskPriority::High,
        today,
        today,
    )?)?;

    Ok(Seeded {
        backoffice,
        owner,
        technician,
        bakery,
        jansen,
        cable,
        panel,
        lamp,
        lamp_product,
    })
}
