use rust_i18n::t;

use crate::engine::Correlation;

/// Round to an integer and group digits by thousands: `1234567.6` -> `1,234,568`.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Price with the localized currency unit, e.g. `1,234 백만원`.
pub fn price(value: f64) -> String {
    let amount = thousands(value);
    t!("units.price", amount = amount).to_string()
}

pub fn correlation(value: Correlation) -> String {
    match value {
        Correlation::Coefficient(r) => format!("{r:.3}"),
        Correlation::Undefined => t!("panel.undefined").to_string(),
    }
}

pub fn rate(value: f64) -> String {
    format!("{value:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(999.5), "1,000");
        assert_eq!(thousands(1234567.6), "1,234,568");
        assert_eq!(thousands(-98765.0), "-98,765");
        assert_eq!(thousands(-0.2), "0");
        assert_eq!(thousands(f64::NAN), "-");
    }

    #[test]
    fn test_correlation_three_decimals() {
        assert_eq!(correlation(Correlation::Coefficient(0.98765)), "0.988");
        assert_eq!(correlation(Correlation::Coefficient(-1.0)), "-1.000");
    }

    #[test]
    fn test_rate_one_decimal() {
        assert_eq!(rate(3.5), "3.5%");
    }
}
