use rust_decimal::Decimal;

/// Decimal precision for derived cost and P&L values.
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for share quantities.
pub const ROUNDING_SCALE: u32 = 8;

/// Quantity threshold below which a share count is treated as zero.
pub const QUANTITY_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

/// Returns true if the quantity is significant (above the zero threshold).
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    quantity.abs() >= QUANTITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantity_threshold() {
        assert!(is_quantity_significant(&dec!(1)));
        assert!(is_quantity_significant(&dec!(0.00000001)));
        assert!(!is_quantity_significant(&dec!(0.000000001)));
        assert!(!is_quantity_significant(&Decimal::ZERO));
    }
}
