//! Per-year invoice numbering: `YYYY-NNN`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use vakwerk_core::{DomainError, ValueObject};

/// An invoice number: issue year plus a per-year sequence.
///
/// Displays as `2026-001`; the sequence keeps growing past 999 without
/// padding tricks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceNumber {
    pub year: i32,
    pub sequence: u32,
}

impl InvoiceNumber {
    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    /// First number of a year.
    pub fn first_of(year: i32) -> Self {
        Self { year, sequence: 1 }
    }
}

impl core::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{:03}", self.year, self.sequence)
    }
}

impl FromStr for InvoiceNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, seq) = s
            .split_once('-')
            .ok_or_else(|| DomainError::invalid_id(format!("InvoiceNumber: {s}")))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| DomainError::invalid_id(format!("InvoiceNumber year: {e}")))?;
        let sequence = seq
            .parse::<u32>()
            .map_err(|e| DomainError::invalid_id(format!("InvoiceNumber sequence: {e}")))?;
        Ok(Self { year, sequence })
    }
}

impl ValueObject for InvoiceNumber {}

/// Next free invoice number for a year: highest sequence in use plus one,
/// `YYYY-001` when the year has no invoices yet.
pub fn next_invoice_number<'a>(
    existing: impl IntoIterator<Item = &'a InvoiceNumber>,
    year: i32,
) -> InvoiceNumber {
    let max = existing
        .into_iter()
        .filter(|n| n.year == year)
        .map(|n| n.sequence)
        .max();
    match max {
        Some(seq) => InvoiceNumber::new(year, seq + 1),
        None => InvoiceNumber::first_of(year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_padded_sequence() {
        assert_eq!(InvoiceNumber::new(2026, 1).to_string(), "2026-001");
        assert_eq!(InvoiceNumber::new(2026, 42).to_string(), "2026-042");
        assert_eq!(InvoiceNumber::new(2026, 1234).to_string(), "2026-1234");
    }

    #[test]
    fn parses_its_own_display() {
        let n: InvoiceNumber = "2026-017".parse().unwrap();
        assert_eq!(n, InvoiceNumber::new(2026, 17));
        assert!("2026017".parse::<InvoiceNumber>().is_err());
        assert!("jaar-001".parse::<InvoiceNumber>().is_err());
    }

    #[test]
    fn numbering_is_sequential_within_a_year() {
        assert_eq!(next_invoice_number([], 2026), InvoiceNumber::new(2026, 1));

        let existing = [
            InvoiceNumber::new(2025, 40),
            InvoiceNumber::new(2026, 3),
            InvoiceNumber::new(2026, 7),
        ];
        assert_eq!(
            next_invoice_number(&existing, 2026),
            InvoiceNumber::new(2026, 8)
        );
    }

    #[test]
    fn numbering_restarts_each_year() {
        let existing = [InvoiceNumber::new(2025, 40)];
        assert_eq!(
            next_invoice_number(&existing, 2026),
            InvoiceNumber::new(2026, 1)
        );
    }
}
