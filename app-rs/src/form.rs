//! Helpers for UI input forms.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Menu item names only need to be non-empty; whatever the user typed is
/// sent as-is.
pub(crate) fn validate_item_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Item name is required".to_owned());
    }
    Ok(())
}

/// Parse a price field into a [`Decimal`], rejecting anything that isn't a
/// plain non-negative decimal number ("129", "129.50").
pub(crate) fn validate_price(price_str: &str) -> Result<Decimal, String> {
    let price_str = price_str.trim();
    if price_str.is_empty() {
        return Err("Price is required".to_owned());
    }
    let price = Decimal::from_str(price_str)
        .map_err(|_| format!("'{price_str}' is not a valid price"))?;
    if price < Decimal::ZERO {
        return Err("Price can't be negative".to_owned());
    }
    Ok(price)
}

/// Require a non-empty value for `field_name`, e.g. "Email".
pub(crate) fn validate_required(
    field_name: &str,
    value: &str,
) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field_name} is required"));
    }
    Ok(())
}

/// Optional draft fields fall back to a fixed default when left empty, like
/// the placeholder photo for items without a picture.
pub(crate) fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_owned()
    } else {
        value.to_owned()
    }
}
