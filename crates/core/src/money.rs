//! Money and quantity parsing for operator-entered values.

use core::str::FromStr;

pub use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult, Rejection};

/// Flat sales-tax rate applied when a visit has tax enabled (15%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Parse a required amount (e.g. a sale price). Blank or non-numeric input is
/// rejected.
pub fn parse_amount(field: &'static str, raw: &str) -> DomainResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::MissingField { field }.into());
    }
    Decimal::from_str(trimmed).map_err(|_| {
        DomainError::Rejected(Rejection::InvalidNumber {
            field,
            value: raw.to_string(),
        })
    })
}

/// Parse an optional amount: blank input means zero.
pub fn parse_amount_or_zero(field: &'static str, raw: &str) -> DomainResult<Decimal> {
    if raw.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    parse_amount(field, raw)
}

/// Parse an optional whole quantity: blank input means zero.
pub fn parse_quantity_or_zero(field: &'static str, raw: &str) -> DomainResult<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<i64>().map_err(|_| {
        DomainError::Rejected(Rejection::InvalidNumber {
            field,
            value: raw.to_string(),
        })
    })
}

/// Reject negative amounts.
pub fn ensure_not_negative(field: &'static str, amount: Decimal) -> DomainResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Rejection::NegativeAmount { field }.into());
    }
    Ok(amount)
}

/// Reject zero and negative amounts.
pub fn ensure_positive(field: &'static str, amount: Decimal) -> DomainResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Rejection::NonPositiveAmount { field }.into());
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn amounts_parse_with_surrounding_whitespace() {
        assert_eq!(parse_amount("price", " 12.50 ").unwrap(), Decimal::new(1250, 2));
    }

    #[test]
    fn non_numeric_price_is_rejected_with_field_name() {
        let err = parse_amount("price", "abc").unwrap_err();
        assert_eq!(
            err,
            DomainError::Rejected(Rejection::InvalidNumber {
                field: "price",
                value: "abc".to_string()
            })
        );
        assert_eq!(
            parse_amount("price", "  ").unwrap_err().rejection().map(Rejection::code),
            Some("missing_field")
        );
    }

    #[test]
    fn optional_values_default_to_zero() {
        assert_eq!(parse_amount_or_zero("cost", "").unwrap(), Decimal::ZERO);
        assert_eq!(parse_quantity_or_zero("stock", "").unwrap(), 0);
        assert_eq!(parse_quantity_or_zero("stock", "7").unwrap(), 7);
        assert!(parse_quantity_or_zero("stock", "7.5").is_err());
    }

    #[test]
    fn default_tax_rate_is_fifteen_percent() {
        assert_eq!(DEFAULT_TAX_RATE, Decimal::new(15, 2));
    }

    #[test]
    fn sign_checks() {
        assert!(ensure_not_negative("cost", Decimal::ZERO).is_ok());
        assert!(ensure_not_negative("cost", Decimal::new(-1, 0)).is_err());
        assert!(ensure_positive("amount", Decimal::ZERO).is_err());
        assert!(ensure_positive("amount", Decimal::new(1, 2)).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, ..ProptestConfig::default() })]

        #[test]
        fn cents_survive_text_parsing(cents in -10_000_000i64..10_000_000) {
            let amount = Decimal::new(cents, 2);
            let parsed = parse_amount("price", &amount.to_string()).unwrap();
            prop_assert_eq!(parsed, amount);
            prop_assert_eq!(ensure_not_negative("price", parsed).is_ok(), cents >= 0);
            prop_assert_eq!(ensure_positive("price", parsed).is_ok(), cents > 0);
        }
    }
}
