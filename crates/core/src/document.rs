//! Identifiers of the commercial documents.
//!
//! Quotes, invoices and work orders reference each other in both directions
//! (a quote records the invoice and work order it was converted into, and
//! vice versa), so their identifiers live here rather than in the module
//! crates, which can then depend on each other in one direction only.

use serde::{Deserialize, Serialize};

use crate::id::AggregateId;

macro_rules! impl_document_id {
    ($(#[$doc:meta])* $t:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(pub AggregateId);

        impl $t {
            pub fn new(id: AggregateId) -> Self {
                Self(id)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_document_id!(
    /// Quote identifier.
    QuoteId
);
impl_document_id!(
    /// Invoice identifier.
    InvoiceId
);
impl_document_id!(
    /// Work order identifier.
    WorkOrderId
);
