//! CRM dashboard statistics.

use chrono::{Datelike, NaiveDate};

use vakwerk_core::Cents;
use vakwerk_parties::{Customer, CustomerKind};

use crate::interaction::Interaction;
use crate::lead::{Lead, LeadStatus};
use crate::task::Task;

/// The numbers on the CRM dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_leads: usize,
    pub active_leads: usize,
    pub won_leads: usize,
    pub lost_leads: usize,
    /// Won share of all leads, in tenths of a percent.
    pub conversion_rate_tenths: u32,
    pub total_customers: usize,
    pub business_customers: usize,
    pub private_customers: usize,
    /// Estimated value of the active pipeline.
    pub pipeline_value: Cents,
    /// Estimated value of won leads.
    pub won_value: Cents,
    pub total_interactions: usize,
    pub interactions_this_month: usize,
    pub pending_follow_ups: usize,
    pub active_tasks: usize,
    pub overdue_tasks: usize,
}

pub fn dashboard_stats<'a>(
    leads: impl IntoIterator<Item = &'a Lead>,
    customers: impl IntoIterator<Item = &'a Customer>,
    interactions: impl IntoIterator<Item = &'a Interaction>,
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
) -> DashboardStats {
    let mut stats = DashboardStats::default();

    for lead in leads {
        stats.total_leads += 1;
        match lead.status {
            LeadStatus::Won => {
                stats.won_leads += 1;
                stats.won_value += lead.estimated_value.unwrap_or(0);
            }
            LeadStatus::Lost => stats.lost_leads += 1,
            _ => {
                stats.active_leads += 1;
                stats.pipeline_value += lead.estimated_value.unwrap_or(0);
            }
        }
    }
    if stats.total_leads > 0 {
        let total = stats.total_leads as u64;
        stats.conversion_rate_tenths =
            ((stats.won_leads as u64 * 1000 + total / 2) / total) as u32;
    }

    for customer in customers {
        stats.total_customers += 1;
        match customer.kind {
            CustomerKind::Business => stats.business_customers += 1,
            CustomerKind::Private => stats.private_customers += 1,
        }
    }

    for interaction in interactions {
        stats.total_interactions += 1;
        let date = interaction.date.date_naive();
        if date.year() == today.year() && date.month() == today.month() {
            stats.interactions_this_month += 1;
        }
        if interaction.needs_follow_up(today) {
            stats.pending_follow_ups += 1;
        }
    }

    for task in tasks {
        if task.is_open() {
            stats.active_tasks += 1;
        }
        if task.is_overdue(today) {
            stats.overdue_tasks += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{InteractionId, InteractionKind};
    use crate::lead::LeadId;
    use crate::task::{TaskId, TaskPriority};
    use chrono::Utc;
    use vakwerk_core::AggregateId;
    use vakwerk_parties::ContactInfo;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lead(status: LeadStatus, value: Cents) -> Lead {
        let mut lead = Lead::register(
            LeadId::new(AggregateId::new()),
            "Lead",
            ContactInfo::default(),
            "website",
            date(2026, 7, 1),
        )
        .unwrap();
        lead.estimated_value = Some(value);
        if status != LeadStatus::New {
            lead.update_status(status, date(2026, 7, 15)).unwrap();
        }
        lead
    }

    #[test]
    fn conversion_rate_is_won_share_of_all_leads() {
        let leads = [
            lead(LeadStatus::Won, 10_000_00),
            lead(LeadStatus::Lost, 5_000_00),
            lead(LeadStatus::Proposal, 2_500_00),
        ];
        let stats = dashboard_stats(&leads, [], [], [], date(2026, 8, 7));

        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.won_leads, 1);
        assert_eq!(stats.active_leads, 1);
        // 1/3 -> 33.3%
        assert_eq!(stats.conversion_rate_tenths, 333);
        assert_eq!(stats.pipeline_value, 2_500_00);
        assert_eq!(stats.won_value, 10_000_00);
    }

    #[test]
    fn interactions_and_tasks_are_windowed_on_today() {
        let today = date(2026, 8, 7);
        let this_month = Interaction::log(
            InteractionId::new(AggregateId::new()),
            None,
            Some(LeadId::new(AggregateId::new())),
            InteractionKind::Call,
            "Intake",
            Utc::now(),
        )
        .unwrap()
        .with_follow_up(date(2026, 8, 20));

        let mut done_task = Task::new(
            TaskId::new(AggregateId::new()),
            "Bellen",
            TaskPriority::Low,
            date(2026, 8, 1),
            date(2026, 7, 20),
        )
        .unwrap();
        done_task.complete().unwrap();
        let open_task = Task::new(
            TaskId::new(AggregateId::new()),
            "Offerte sturen",
            TaskPriority::High,
            date(2026, 8, 1),
            date(2026, 7, 20),
        )
        .unwrap();

        let stats = dashboard_stats([], [], [&this_month], [&done_task, &open_task], today);
        assert_eq!(stats.interactions_this_month, 1);
        assert_eq!(stats.pending_follow_ups, 1);
        assert_eq!(stats.active_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
    }
}
