//! Domain event abstractions: event trait, execution helper, in-process
//! pub/sub bus and projections.

pub mod bus;
pub mod event;
pub mod handler;
pub mod in_memory_bus;
pub mod projection;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::InMemoryEventBus;
pub use projection::Projection;
