//! Dutch VAT rates.
//!
//! Rates are carried in basis points (1/100 of a percent) so that custom
//! rates with fractional percentages stay exact integers. Applying a rate to
//! an amount rounds half up, matching how totals are presented on quotes and
//! invoices.

use serde::{Deserialize, Serialize};

use crate::money::Cents;
use crate::value_object::ValueObject;

/// VAT rate applied to a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VatRate {
    /// Dutch standard rate, 21%.
    Standard,
    /// Dutch reduced rate, 9%.
    Reduced,
    /// Zero-rated, 0%.
    Zero,
    /// Custom rate in basis points (e.g. `1250` = 12.5%).
    Custom(u32),
}

impl VatRate {
    /// The rate in basis points.
    pub fn basis_points(&self) -> u32 {
        match self {
            VatRate::Standard => 2100,
            VatRate::Reduced => 900,
            VatRate::Zero => 0,
            VatRate::Custom(bp) => *bp,
        }
    }

    /// The rate as whole-percent tenths, for display (`210` = 21.0%).
    pub fn percent_tenths(&self) -> u32 {
        self.basis_points() / 10
    }

    /// VAT amount over a net amount, rounded half up.
    pub fn vat_amount_of(&self, net: Cents) -> Cents {
        (net * self.basis_points() as u64 + 5_000) / 10_000
    }

    /// Gross (VAT-inclusive) amount for a net amount.
    pub fn inclusive_of(&self, net: Cents) -> Cents {
        net + self.vat_amount_of(net)
    }
}

impl Default for VatRate {
    fn default() -> Self {
        VatRate::Standard
    }
}

impl ValueObject for VatRate {}
