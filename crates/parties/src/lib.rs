//! Parties: the customers and suppliers the company deals with.
//!
//! Plain records with validated constructors; parties carry no lifecycle of
//! their own beyond being edited and (hard-)deleted.

pub mod contact;
pub mod customer;
pub mod supplier;

pub use contact::ContactInfo;
pub use customer::{Customer, CustomerId, CustomerKind};
pub use supplier::{Supplier, SupplierId};
