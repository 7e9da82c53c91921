use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, Cents, DomainError, DomainResult, Entity};
use vakwerk_parties::ContactInfo;

/// Lead identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub AggregateId);

impl LeadId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LeadId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sales pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStatus {
    /// Won and lost leads have left the pipeline.
    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }
}

/// A sales lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub contact: ContactInfo,
    pub company: Option<String>,
    pub status: LeadStatus,
    /// Where the lead came from: website, referral, cold-call, …
    pub source: String,
    pub estimated_value: Option<Cents>,
    pub notes: Option<String>,
    pub created_date: NaiveDate,
    pub last_contact_date: Option<NaiveDate>,
    pub next_follow_up_date: Option<NaiveDate>,
}

impl Lead {
    pub fn register(
        id: LeadId,
        name: impl Into<String>,
        contact: ContactInfo,
        source: impl Into<String>,
        created_date: NaiveDate,
    ) -> DomainResult<Self> {
        let name = name.into();
        let source = source.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("lead name is required"));
        }
        if source.trim().is_empty() {
            return Err(DomainError::validation("lead source is required"));
        }
        Ok(Self {
            id,
            name,
            contact,
            company: None,
            status: LeadStatus::New,
            source,
            estimated_value: None,
            notes: None,
            created_date,
            last_contact_date: None,
            next_follow_up_date: None,
        })
    }

    /// Move the lead through the pipeline; stamps the last-contact date.
    pub fn update_status(&mut self, to: LeadStatus, on: NaiveDate) -> DomainResult<()> {
        if self.status.is_closed() {
            return Err(DomainError::invariant(
                "won or lost leads cannot change status",
            ));
        }
        if self.status == to {
            return Err(DomainError::validation("lead is already in this status"));
        }
        self.status = to;
        self.last_contact_date = Some(on);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_closed()
    }
}

impl Entity for Lead {
    type Id = LeadId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
