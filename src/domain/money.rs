use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::error::{AppError, Result};

/// Convert stored integer cents into a two-place decimal (9900 -> 99.00).
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a client-supplied decimal amount into cents.
///
/// Rejects negative values and anything with more than two decimal places.
pub fn decimal_to_cents(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::InvalidInput("Amount cannot be negative".to_string()));
    }
    if amount.normalize().scale() > 2 {
        return Err(AppError::InvalidInput(
            "Amount cannot have more than two decimal places".to_string(),
        ));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| AppError::InvalidInput("Amount out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cents_to_decimal_keeps_two_places() {
        assert_eq!(cents_to_decimal(9900).to_string(), "99.00");
        assert_eq!(cents_to_decimal(5).to_string(), "0.05");
        assert_eq!(cents_to_decimal(0).to_string(), "0.00");
    }

    #[test]
    fn test_decimal_to_cents() {
        assert_eq!(decimal_to_cents(dec!(99.00)).unwrap(), 9900);
        assert_eq!(decimal_to_cents(dec!(12.5)).unwrap(), 1250);
        assert_eq!(decimal_to_cents(dec!(0)).unwrap(), 0);
    }

    #[test]
    fn test_decimal_to_cents_rejects_bad_amounts() {
        assert!(decimal_to_cents(dec!(-1.00)).is_err());
        assert!(decimal_to_cents(dec!(1.005)).is_err());
    }

    #[test]
    fn test_decimal_to_cents_out_of_range() {
        assert!(matches!(decimal_to_cents(Decimal::MAX), Err(AppError::InvalidInput(_))));
        // Fits in a Decimal but not in i64 cents
        assert!(matches!(
            decimal_to_cents(dec!(100000000000000000000)),
            Err(AppError::InvalidInput(_))
        ));
    }
}
