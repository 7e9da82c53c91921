use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use vakwerk_core::{DomainError, DomainResult, EmployeeId, Entity};
use vakwerk_parties::ContactInfo;

/// Whether an employee can take on work right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
    Vacation,
}

/// An employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub contact: ContactInfo,
    pub hire_date: NaiveDate,
    /// Annual vacation allowance, in days.
    pub vacation_days: u32,
    pub used_vacation_days: u32,
    pub availability: Availability,
}

impl Employee {
    pub fn register(
        id: EmployeeId,
        name: impl Into<String>,
        role: impl Into<String>,
        contact: ContactInfo,
        hire_date: NaiveDate,
        vacation_days: u32,
    ) -> DomainResult<Self> {
        let name = name.into();
        let role = role.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("employee name is required"));
        }
        if role.trim().is_empty() {
            return Err(DomainError::validation("employee role is required"));
        }
        Ok(Self {
            id,
            name,
            role,
            contact,
            hire_date,
            vacation_days,
            used_vacation_days: 0,
            availability: Availability::Available,
        })
    }

    pub fn remaining_vacation_days(&self) -> u32 {
        self.vacation_days.saturating_sub(self.used_vacation_days)
    }

    /// Book vacation days; cannot exceed the remaining allowance.
    pub fn request_vacation(&mut self, days: u32) -> DomainResult<()> {
        if days == 0 {
            return Err(DomainError::validation(
                "a vacation request covers at least one day",
            ));
        }
        if days > self.remaining_vacation_days() {
            return Err(DomainError::invariant(format!(
                "only {} vacation days left, {} requested",
                self.remaining_vacation_days(),
                days
            )));
        }
        self.used_vacation_days += days;
        self.availability = Availability::Vacation;
        Ok(())
    }

    pub fn return_to_work(&mut self) {
        self.availability = Availability::Available;
    }

    pub fn set_unavailable(&mut self) {
        self.availability = Availability::Unavailable;
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
