//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two value
/// objects with the same attribute values are equal. To "modify" one, create
/// a new one with the new values.
///
/// Example: an invoice number `2026-014` is a value object; the invoice that
/// carries it is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
