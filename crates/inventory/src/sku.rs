//! Auto-generated SKUs.

/// Prefix for generated SKUs.
pub const AUTO_SKU_PREFIX: &str = "INV-";

/// Next free auto SKU, scanning the existing ones.
///
/// Takes the highest `INV-NNNN` number in use and adds one; SKUs that don't
/// match the generated pattern are ignored.
pub fn next_auto_sku<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|sku| sku.strip_prefix(AUTO_SKU_PREFIX))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{AUTO_SKU_PREFIX}{:04}", max + 1)
}
