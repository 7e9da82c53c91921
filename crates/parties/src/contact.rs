use serde::{Deserialize, Serialize};

use vakwerk_core::ValueObject;

/// Contact information for a party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ContactInfo {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Whether an email address is present and plausibly shaped.
    pub fn has_email(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| e.contains('@') && !e.trim().is_empty())
    }
}

impl ValueObject for ContactInfo {}
