use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, DomainError, DomainResult, Entity};

use crate::contact::ContactInfo;

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub AggregateId);

impl CustomerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Business or private customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerKind {
    Business,
    Private,
}

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub contact: ContactInfo,
    pub kind: CustomerKind,
    /// Customer since.
    pub since: NaiveDate,
    /// Where the customer came from (website, referral, advertisement, …).
    pub source: Option<String>,
    /// Company name, for business customers.
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl Customer {
    /// Register a new customer. Name and a plausible email are required.
    pub fn register(
        id: CustomerId,
        name: impl Into<String>,
        contact: ContactInfo,
        kind: CustomerKind,
        since: NaiveDate,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        if !contact.has_email() {
            return Err(DomainError::validation(
                "customer email address is required",
            ));
        }
        Ok(Self {
            id,
            name,
            contact,
            kind,
            since,
            source: None,
            company: None,
            notes: None,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        self.name = name;
        Ok(())
    }

    pub fn update_contact(&mut self, contact: ContactInfo) -> DomainResult<()> {
        if !contact.has_email() {
            return Err(DomainError::validation(
                "customer email address is required",
            ));
        }
        self.contact = contact;
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
