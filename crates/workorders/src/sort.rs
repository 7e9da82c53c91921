//! Per-assignee sort indices.
//!
//! Every employee's board is ordered by a small index number. New orders go
//! to the end; when an edit claims an index already held by another order of
//! the same assignee, that other order is bumped to the next free index.

use vakwerk_core::{EmployeeId, WorkOrderId};

use crate::order::WorkOrder;

/// Next free sort index for an assignee's board (1-based).
pub fn next_sort_index<'a>(
    orders: impl IntoIterator<Item = &'a WorkOrder>,
    assignee: EmployeeId,
) -> u32 {
    let max = orders
        .into_iter()
        .filter(|wo| wo.assigned_to() == Some(assignee))
        .filter_map(|wo| wo.sort_index())
        .max()
        .unwrap_or(0);
    max + 1
}

/// Find the order that already holds `desired_index` on the assignee's board.
///
/// Returns the colliding order's ID and the index it should be bumped to
/// (the next free index on the board). `moving` is the order claiming the
/// index and is excluded from the check.
pub fn bump_colliding_order<'a>(
    orders: impl IntoIterator<Item = &'a WorkOrder> + Clone,
    assignee: EmployeeId,
    desired_index: u32,
    moving: WorkOrderId,
) -> Option<(WorkOrderId, u32)> {
    let colliding = orders
        .clone()
        .into_iter()
        .find(|wo| {
            wo.id_typed() != moving
                && wo.assigned_to() == Some(assignee)
                && wo.sort_index() == Some(desired_index)
        })?
        .id_typed();

    let next_free = orders
        .into_iter()
        .filter(|wo| wo.id_typed() != moving && wo.assigned_to() == Some(assignee))
        .filter_map(|wo| wo.sort_index())
        .max()
        .unwrap_or(0)
        + 1;

    Some((colliding, next_free))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OpenWorkOrder, WorkOrderCommand};
    use chrono::Utc;
    use vakwerk_core::AggregateId;
    use vakwerk_events::execute;

    fn order_for(assignee: EmployeeId, sort_index: u32) -> WorkOrder {
        let id = WorkOrderId::new(AggregateId::new());
        let mut order = WorkOrder::empty(id);
        execute(
            &mut order,
            &WorkOrderCommand::OpenWorkOrder(OpenWorkOrder {
                work_order_id: id,
                title: "Onderhoud".into(),
                description: String::new(),
                assigned_to: assignee,
                customer_id: None,
                location: None,
                scheduled_date: None,
                pending_reason: None,
                required_inventory: vec![],
                quote_id: None,
                invoice_id: None,
                estimated_minutes: None,
                estimated_cost: None,
                notes: None,
                sort_index,
                performed_by: EmployeeId::new(),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        order
    }

    #[test]
    fn first_index_on_an_empty_board_is_one() {
        let employee = EmployeeId::new();
        assert_eq!(next_sort_index([], employee), 1);
    }

    #[test]
    fn next_index_ignores_other_boards() {
        let a = EmployeeId::new();
        let b = EmployeeId::new();
        let orders = [order_for(a, 1), order_for(a, 3), order_for(b, 9)];
        assert_eq!(next_sort_index(&orders, a), 4);
        assert_eq!(next_sort_index(&orders, b), 10);
    }

    #[test]
    fn collisions_bump_to_the_end_of_the_board() {
        let a = EmployeeId::new();
        let orders = [order_for(a, 1), order_for(a, 2), order_for(a, 3)];
        let moving = orders[2].id_typed();

        // Order #3 wants index 1 -> order holding #1 moves to #3 (the next
        // free index with the moving order excluded is max(1,2)+1).
        let (colliding, new_index) =
            bump_colliding_order(&orders, a, 1, moving).expect("collision expected");
        assert_eq!(colliding, orders[0].id_typed());
        assert_eq!(new_index, 3);

        // No collision when the index is free.
        assert!(bump_colliding_order(&orders, a, 7, moving).is_none());
    }
}
