use crate::statistics::Metric;

pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = negative_sign(value, &fixed);
    format!("{sign}{}.{fraction}", group_thousands(whole))
}

pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let fixed = format!("{:.0}", value.abs());
    let sign = negative_sign(value, &fixed);
    format!("{sign}{}", group_thousands(&fixed))
}

/// A minus sign only when the rounded digits are not all zero.
fn negative_sign(value: f64, digits: &str) -> &'static str {
    let shows_nonzero = digits.bytes().any(|byte| matches!(byte, b'1'..=b'9'));
    if value < 0.0 && shows_nonzero { "-" } else { "" }
}

pub fn format_metric(metric: Metric, value: f64) -> String {
    if metric.is_amount() {
        format_amount(value)
    } else {
        format_count(value)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_have_two_decimals_and_separators() {
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(999.0), "999.00");
        assert_eq!(format_amount(-1500.5), "-1,500.50");
        assert_eq!(format_amount(-0.001), "0.00");
        assert_eq!(format_amount(f64::NAN), "-");
    }

    #[test]
    fn counts_are_whole_numbers() {
        assert_eq!(format_count(12_000.0), "12,000");
        assert_eq!(format_count(42.4), "42");
        assert_eq!(format_count(-3.0), "-3");
        assert_eq!(format_count(-0.2), "0");
    }

    #[test]
    fn values_rounding_to_zero_have_no_sign() {
        assert_eq!(format_count(-0.5), "0");
        assert_eq!(format_count(-0.0), "0");
        assert_eq!(format_count(-1.5), "-2");
        assert_eq!(format_amount(-0.004), "0.00");
        assert_eq!(format_amount(-0.0), "0.00");
        assert_eq!(format_amount(-0.02), "-0.02");
    }

    #[test]
    fn metric_picks_format() {
        assert_eq!(format_metric(Metric::Sales, 10.0), "10.00");
        assert_eq!(format_metric(Metric::Orders, 10.0), "10");
    }
}
