use serde::{Deserialize, Serialize};

use vakwerk_core::{AggregateId, DomainError, DomainResult, Entity};

use crate::contact::ContactInfo;

/// Supplier identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub AggregateId);

impl SupplierId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A supplier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_person: Option<String>,
    pub contact: ContactInfo,
    /// Average delivery lead time in days; used for reorder planning.
    pub average_lead_time_days: u32,
    pub notes: Option<String>,
}

impl Supplier {
    /// Default lead time assumed for new suppliers.
    pub const DEFAULT_LEAD_TIME_DAYS: u32 = 7;

    pub fn register(
        id: SupplierId,
        name: impl Into<String>,
        contact: ContactInfo,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("supplier name is required"));
        }
        Ok(Self {
            id,
            name,
            contact_person: None,
            contact,
            average_lead_time_days: Self::DEFAULT_LEAD_TIME_DAYS,
            notes: None,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("supplier name is required"));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_lead_time(&mut self, days: u32) -> DomainResult<()> {
        if days == 0 {
            return Err(DomainError::validation(
                "lead time must be at least one day",
            ));
        }
        self.average_lead_time_days = days;
        Ok(())
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_defaults_lead_time() {
        let supplier = Supplier::register(
            SupplierId::new(AggregateId::new()),
            "Groothandel Jansen",
            ContactInfo::default(),
        )
        .unwrap();
        assert_eq!(
            supplier.average_lead_time_days,
            Supplier::DEFAULT_LEAD_TIME_DAYS
        );
    }

    #[test]
    fn lead_time_must_be_positive() {
        let mut supplier = Supplier::register(
            SupplierId::new(AggregateId::new()),
            "Groothandel Jansen",
            ContactInfo::default(),
        )
        .unwrap();
        assert!(supplier.set_lead_time(0).is_err());
        supplier.set_lead_time(3).unwrap();
        assert_eq!(supplier.average_lead_time_days, 3);
    }
}
