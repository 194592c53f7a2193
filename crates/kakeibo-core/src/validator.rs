//! Turns one raw item line into a validated [`ItemLine`].

use kakeibo_domain::{Category, ItemLine, MAX_ITEM_AMOUNT};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::CoreError;

static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("valid amount regex"));

/// Validates `<category> <signed integer>`; tokens past the second are ignored.
///
/// Amounts beyond [`MAX_ITEM_AMOUNT`] in either direction are invalid.
pub fn validate_line(line: &str) -> Result<ItemLine, CoreError> {
    let mut tokens = line.split_whitespace();
    let category_token = tokens.next().unwrap_or_default();
    let value_token = tokens.next().unwrap_or_default();

    let category = Category::from_token(category_token)
        .ok_or_else(|| CoreError::unknown_category(category_token))?;

    if !AMOUNT.is_match(value_token) {
        return Err(CoreError::InvalidAmount(value_token.to_string()));
    }
    let amount = value_token
        .parse::<i64>()
        .ok()
        .filter(|amount| (-MAX_ITEM_AMOUNT..=MAX_ITEM_AMOUNT).contains(amount))
        .ok_or_else(|| CoreError::InvalidAmount(value_token.to_string()))?;

    Ok(ItemLine::new(category, amount))
}
