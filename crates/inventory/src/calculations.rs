//! Pure calculation utilities over inventory.

use vakwerk_core::{Cents, VatRate};

use crate::item::InventoryItem;

/// Profit margin in tenths of a percent: `(sale − purchase) / purchase × 100`.
///
/// Returns 0 when the purchase price is 0 (margin is undefined without a cost
/// basis). Rounds half away from zero, so €1.20 → €1.80 is 500 (= 50.0%).
pub fn margin_tenths(purchase_price: Cents, sale_price: Cents) -> i64 {
    if purchase_price == 0 {
        return 0;
    }
    let diff = sale_price as i128 - purchase_price as i128;
    let scaled = diff * 1000;
    let d = purchase_price as i128;
    let rounded = if scaled >= 0 {
        (scaled + d / 2) / d
    } else {
        (scaled - d / 2) / d
    };
    rounded as i64
}

/// Price including VAT for a net price.
pub fn vat_inclusive(price_excl: Cents, rate: VatRate) -> Cents {
    rate.inclusive_of(price_excl)
}

/// Total inventory value at purchase prices.
pub fn inventory_value<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Cents {
    items
        .into_iter()
        .map(|item| item.purchase_price() * item.quantity().max(0) as u64)
        .sum()
}

/// Potential revenue: total inventory value at sale prices.
pub fn potential_revenue<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Cents {
    items
        .into_iter()
        .map(|item| item.sale_price() * item.quantity().max(0) as u64)
        .sum()
}

/// VAT owed per rate bucket if the whole stock were sold at its sale prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VatReport {
    /// VAT at the 21% rate, in cents.
    pub standard: Cents,
    /// VAT at the 9% rate, in cents.
    pub reduced: Cents,
    /// VAT at custom rates, in cents.
    pub custom: Cents,
    /// Sales value of zero-rated stock, in cents (no VAT applies).
    pub zero_rated_value: Cents,
}

impl VatReport {
    pub fn total(&self) -> Cents {
        self.standard + self.reduced + self.custom
    }
}

/// Break stock down into VAT buckets, quantity-weighted.
pub fn vat_report<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> VatReport {
    let mut report = VatReport::default();
    for item in items {
        let value = item.sale_price() * item.quantity().max(0) as u64;
        match item.vat_rate() {
            VatRate::Standard => report.standard += VatRate::Standard.vat_amount_of(value),
            VatRate::Reduced => report.reduced += VatRate::Reduced.vat_amount_of(value),
            VatRate::Zero => report.zero_rated_value += value,
            rate @ VatRate::Custom(_) => report.custom += rate.vat_amount_of(value),
        }
    }
    report
}

/// Stock statistics across the whole inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockStats {
    pub total_items: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub total_quantity: i64,
    pub average_quantity: i64,
}

pub fn stock_stats<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> StockStats {
    let mut stats = StockStats::default();
    for item in items {
        stats.total_items += 1;
        stats.total_quantity += item.quantity();
        if item.is_low_stock() {
            stats.low_stock += 1;
        }
        if item.is_out_of_stock() {
            stats.out_of_stock += 1;
        }
    }
    if stats.total_items > 0 {
        stats.average_quantity = stats.total_quantity / stats.total_items as i64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn margin_is_zero_without_cost_basis() {
        assert_eq!(margin_tenths(0, 1_000), 0);
        assert_eq!(margin_tenths(0, 0), 0);
    }

    #[test]
    fn margin_examples() {
        assert_eq!(margin_tenths(1_20, 1_80), 500); // 50.0%
        assert_eq!(margin_tenths(100, 150), 500);
        assert_eq!(margin_tenths(300, 400), 333); // 33.33…% -> 33.3%
        assert_eq!(margin_tenths(200, 150), -250); // selling at a loss
        assert_eq!(margin_tenths(150, 150), 0);
    }

    #[test]
    fn vat_inclusive_standard_rate() {
        assert_eq!(vat_inclusive(10_000, VatRate::Standard), 12_100);
        assert_eq!(vat_inclusive(10_000, VatRate::Zero), 10_000);
    }

    proptest! {
        #[test]
        fn margin_of_equal_prices_is_zero(price in 1u64..10_000_000) {
            prop_assert_eq!(margin_tenths(price, price), 0);
        }

        #[test]
        fn inclusive_price_is_net_plus_vat(net in 0u64..10_000_000) {
            let rate = VatRate::Standard;
            prop_assert_eq!(vat_inclusive(net, rate), net + rate.vat_amount_of(net));
        }

        #[test]
        fn doubling_the_sale_price_doubles_the_markup(purchase in 1u64..1_000_000) {
            // sale = 2 × purchase -> margin exactly 100.0%
            prop_assert_eq!(margin_tenths(purchase, purchase * 2), 1000);
        }
    }
}
