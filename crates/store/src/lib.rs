//! The in-memory application state.
//!
//! `Backoffice` owns one repository per collection and orchestrates every
//! workflow that spans modules: quote → invoice → work order conversions,
//! completion billing, POS checkout, the overdue sweep, notifications and
//! the dashboard. State lives in memory for the session; there is no
//! persistence layer.

pub mod app;
pub mod dashboard;
pub mod events;
pub mod notifications;
pub mod planning;
pub mod repository;
pub mod seed;

pub use app::Backoffice;
pub use dashboard::CompanyDashboard;
pub use events::AppEvent;
pub use notifications::{LowStockProjection, Notification, NotificationId, NotificationLevel};
pub use planning::{CalendarEvent, CalendarEventId, CalendarEventKind, agenda};
pub use repository::Repository;
pub use seed::{Seeded, seed};
