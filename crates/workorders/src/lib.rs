//! Work orders domain module.
//!
//! A work order tracks the execution of approved work on a simple four-state
//! board. Work orders are usually born by converting an approved quote (or an
//! invoice); completing one feeds back into invoicing and deducts the
//! materials that were used.

pub mod conversion;
pub mod order;
pub mod sort;
pub mod stats;

pub use conversion::{
    CompletionBilling, DEFAULT_HOURLY_RATE, invoice_from_work_order, sync_estimates_from_quote,
    work_order_from_invoice, work_order_from_quote,
};
pub use order::{
    AddMaterial, ChangeStatus, LinkInvoice, OpenWorkOrder, RecordTimeSpent, Reassign,
    RemoveMaterial, Reorder, ReviseDetails, SyncEstimates, WorkOrder, WorkOrderAction,
    WorkOrderCommand, WorkOrderEvent, WorkOrderHistoryEntry, WorkOrderStatus, WorkOrderTimestamps,
};
pub use sort::{bump_colliding_order, next_sort_index};
pub use stats::{WorkOrderStats, work_order_stats};
