//! Display formatting for proration results.

use rust_decimal::Decimal;

use super::calculators::round_money;

/// Fixed-point rendering, always showing `places` decimals
pub fn format_fixed(amount: Decimal, places: u32) -> String {
    let mut rounded = round_money(amount, places);
    rounded.rescale(places);
    // -0.00 would otherwise survive rounding of tiny negative values
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

/// `RM 540.00`
pub fn format_money(amount: Decimal, currency_label: &str, places: u32) -> String {
    format!("{} {}", currency_label, format_fixed(amount, places))
}

/// `60.00%`
pub fn format_percentage(percentage: Decimal, places: u32) -> String {
    format!("{}%", format_fixed(percentage, places))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_fixed_pads_places() {
        assert_eq!(format_fixed(dec!(540), 2), "540.00");
        assert_eq!(format_fixed(dec!(12.5), 2), "12.50");
        assert_eq!(format_fixed(dec!(33.333333333333), 2), "33.33");
    }

    #[test]
    fn test_format_fixed_negative_zero() {
        assert_eq!(format_fixed(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(590), "RM", 2), "RM 590.00");
        assert_eq!(format_money(dec!(0.125), "USD", 2), "USD 0.13");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(60), 2), "60.00%");
        assert_eq!(format_percentage(dec!(33.3333333333333333), 2), "33.33%");
    }
}
