/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical lifecycle in two steps:
///
/// 1. **Decide**: calls `aggregate.handle(command)` to get events (pure, no
///    mutation)
/// 2. **Evolve**: applies each event to the aggregate via
///    `aggregate.apply(event)`
///
/// The aggregate is responsible for maintaining its own version tracking
/// consistently during `apply()` (+1 per applied event). The emitted events
/// are returned so the caller can publish them.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: vakwerk_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
