//! Two-decimal quantities: prices, payment amounts and average review scores.
//!
//! All of them are [`Decimal`] values held at scale 2, so `"12"` is stored and
//! served as `"12.00"`. Over the wire they travel as decimal strings.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Decimal places kept for prices, payments and ratings.
pub const SCALE: u32 = 2;

/// Largest amount a `NUMERIC(10,2)` column holds.
const MAX_AMOUNT_CENTS: i64 = 99_999_999_99;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("`{input}` is not a decimal amount")]
    Malformed { input: String },
    #[error("`{value}` has more than two decimal places")]
    TooPrecise { value: Decimal },
    #[error("amount must not be negative")]
    Negative,
    #[error("amount is out of range")]
    OutOfRange,
}

/// Checks a price or payment amount and pins it to two decimals.
pub fn amount(value: Decimal) -> Result<Decimal, AmountError> {
    if value < Decimal::ZERO {
        return Err(AmountError::Negative);
    }
    let mut normalized = value.normalize();
    if normalized.scale() > SCALE {
        return Err(AmountError::TooPrecise { value });
    }
    if normalized > Decimal::new(MAX_AMOUNT_CENTS, SCALE) {
        return Err(AmountError::OutOfRange);
    }
    normalized.rescale(SCALE);
    Ok(normalized)
}

pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let value = Decimal::from_str_exact(input.trim()).map_err(|_| AmountError::Malformed {
        input: input.to_string(),
    })?;
    amount(value)
}

/// Mean of `count` scores summing to `total`, rounded half up to two decimals.
pub fn average_rating(total: i64, count: i64) -> Decimal {
    let mut average = if count <= 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(total) / Decimal::from(count))
            .round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
    };
    average.rescale(SCALE);
    average
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_pinned_to_two_decimals() {
        let price = parse_amount("49.99").expect("valid price");
        assert_eq!(price, Decimal::new(4999, 2));
        assert_eq!(price.to_string(), "49.99");

        assert_eq!(parse_amount("12").expect("whole").to_string(), "12.00");
        assert_eq!(parse_amount("0.5").expect("short").to_string(), "0.50");
        assert_eq!(parse_amount("3.100").expect("padded").to_string(), "3.10");
    }

    #[test]
    fn amounts_reject_bad_input() {
        assert!(matches!(
            parse_amount("1.234"),
            Err(AmountError::TooPrecise { .. })
        ));
        assert!(matches!(
            parse_amount("abc"),
            Err(AmountError::Malformed { .. })
        ));
        assert!(matches!(parse_amount("-3.00"), Err(AmountError::Negative)));
        assert!(matches!(
            parse_amount("100000000"),
            Err(AmountError::OutOfRange)
        ));
    }

    #[test]
    fn decimals_travel_as_strings() {
        let from_str: Decimal = serde_json::from_str("\"19.90\"").expect("string");
        let from_float: Decimal = serde_json::from_str("19.9").expect("float");
        assert_eq!(amount(from_float).expect("amount"), from_str);
        assert_eq!(
            serde_json::to_string(&from_str).expect("serialize"),
            "\"19.90\""
        );
    }

    #[test]
    fn rating_average_rounds_half_up() {
        assert_eq!(average_rating(9, 2).to_string(), "4.50");
        assert_eq!(average_rating(14, 3).to_string(), "4.67");
        assert_eq!(average_rating(0, 0).to_string(), "0.00");
    }
}
