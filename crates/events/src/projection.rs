use crate::Event;

/// A projection builds a read model from a stream of events.
///
/// Projections are the read side of the system: they fold published events
/// into queryable state (counters, notification lists, dashboards). They must
/// be **idempotent** (applying the same event twice produces the same
/// result) because the bus delivers at-least-once.
///
/// Read models are disposable: they can be rebuilt at any time by replaying
/// events over a fresh projection.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the projection, updating the read model.
    fn apply(&mut self, event: &Self::Ev);
}
