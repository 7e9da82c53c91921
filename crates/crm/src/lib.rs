//! CRM domain module.
//!
//! Leads with a pipeline status, interactions and follow-ups, simple tasks,
//! and the derived views the CRM dashboard shows: overall statistics, the
//! per-customer journey and per-customer finances.

pub mod finances;
pub mod interaction;
pub mod journey;
pub mod lead;
pub mod stats;
pub mod task;

pub use finances::{CustomerFinances, customer_finances};
pub use interaction::{Interaction, InteractionId, InteractionKind};
pub use journey::{CustomerJourney, JourneyStep, customer_journey};
pub use lead::{Lead, LeadId, LeadStatus};
pub use stats::{DashboardStats, dashboard_stats};
pub use task::{Task, TaskId, TaskPriority, TaskStatus};
