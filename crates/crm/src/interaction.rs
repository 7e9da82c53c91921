use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, DomainError, DomainResult, EmployeeId, Entity};
use vakwerk_parties::CustomerId;

use crate::lead::LeadId;

/// Interaction identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(pub AggregateId);

impl InteractionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// How the contact happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Call,
    Email,
    Meeting,
    Note,
    Sms,
}

/// A logged contact moment with a customer or lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub customer_id: Option<CustomerId>,
    pub lead_id: Option<LeadId>,
    pub kind: InteractionKind,
    pub subject: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub employee_id: Option<EmployeeId>,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
}

impl Interaction {
    /// Log an interaction; it must reference a customer or a lead, and carry
    /// a subject.
    pub fn log(
        id: InteractionId,
        customer_id: Option<CustomerId>,
        lead_id: Option<LeadId>,
        kind: InteractionKind,
        subject: impl Into<String>,
        date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(DomainError::validation("interaction subject is required"));
        }
        if customer_id.is_none() && lead_id.is_none() {
            return Err(DomainError::validation(
                "an interaction references a customer or a lead",
            ));
        }
        Ok(Self {
            id,
            customer_id,
            lead_id,
            kind,
            subject,
            description: String::new(),
            date,
            employee_id: None,
            follow_up_required: false,
            follow_up_date: None,
        })
    }

    pub fn with_follow_up(mut self, date: NaiveDate) -> Self {
        self.follow_up_required = true;
        self.follow_up_date = Some(date);
        self
    }

    /// Follow-up still open as of `today`.
    pub fn needs_follow_up(&self, today: NaiveDate) -> bool {
        self.follow_up_required && self.follow_up_date.is_none_or(|d| d >= today)
    }
}

impl Entity for Interaction {
    type Id = InteractionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_interaction_needs_a_subject_and_a_counterparty() {
        let id = InteractionId::new(AggregateId::new());
        assert!(
            Interaction::log(id, None, None, InteractionKind::Call, "Intake", Utc::now()).is_err()
        );
        assert!(
            Interaction::log(
                id,
                Some(CustomerId::new(AggregateId::new())),
                None,
                InteractionKind::Call,
                " ",
                Utc::now()
            )
            .is_err()
        );
        assert!(
            Interaction::log(
                id,
                Some(CustomerId::new(AggregateId::new())),
                None,
                InteractionKind::Call,
                "Intake",
                Utc::now()
            )
            .is_ok()
        );
    }

    #[test]
    fn follow_up_window() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let interaction = Interaction::log(
            InteractionId::new(AggregateId::new()),
            Some(CustomerId::new(AggregateId::new())),
            None,
            InteractionKind::Meeting,
            "Offerte bespreken",
            Utc::now(),
        )
        .unwrap()
        .with_follow_up(NaiveDate::from_ymd_opt(2026, 8, 14).unwrap());

        assert!(interaction.needs_follow_up(today));
        assert!(!interaction.needs_follow_up(NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()));
    }
}
