//! HRM domain module: the employees doing the work.

pub mod employee;

pub use employee::{Availability, Employee};
