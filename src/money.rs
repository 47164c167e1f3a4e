//! Prices are stored as whole satang (`i64`) and exchanged as two-decimal baht.

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;

use crate::error::AppError;

/// Price as sent by clients: either `"250.00"` or `250`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

impl PriceInput {
    pub fn to_minor(&self) -> Result<i64, AppError> {
        match self {
            PriceInput::Text(text) => parse_price(text),
            PriceInput::Number(number) => parse_price(&number.to_string()),
        }
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

pub fn parse_price(raw: &str) -> Result<i64, AppError> {
    let invalid = || AppError::BadRequest(format!("invalid price '{raw}'"));
    let value = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
    if value.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if value.normalize().scale() > 2 {
        return Err(AppError::BadRequest(
            "price must have at most two decimal places".into(),
        ));
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.trunc().to_i64())
        .ok_or_else(invalid)
}

pub fn to_decimal(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_strings() {
        assert_eq!(parse_price("250.00").unwrap(), 25_000);
        assert_eq!(parse_price(" 19.9 ").unwrap(), 1_990);
        assert_eq!(parse_price("0").unwrap(), 0);
    }

    #[test]
    fn rejects_garbage_negative_and_fractional_satang() {
        assert!(matches!(parse_price("abc"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_price(""), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_price("-1"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_price("1.005"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn out_of_range_prices_are_rejected_not_panicking() {
        assert!(matches!(
            parse_price("79228162514264337593543950335"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_price("92233720368547758.08"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn numeric_input_is_accepted() {
        let input: PriceInput = serde_json::from_str("120.5").unwrap();
        assert_eq!(input.to_minor().unwrap(), 12_050);
    }

    #[test]
    fn minor_units_render_with_two_places() {
        assert_eq!(to_decimal(25_000).to_string(), "250.00");
    }
}
