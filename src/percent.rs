//! Period-over-period change labels.
//!
//! Every comparison on the Statistics and Home views goes through
//! [`compute_label`]: `"+50%"`, `"-20%"`, `"+5.5%"`, and the bare `"0%"` when
//! both periods are empty.

use serde_json::Value;
use std::fmt;

/// Change between two periods, rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    /// Both the current and the previous value are zero.
    Flat,
    /// Signed change in percent. Never negative zero.
    Change(f64),
}

/// Visual direction of a change, used for colouring labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Neutral => "neutral",
        }
    }
}

impl PercentChange {
    /// Compares `current` against the `previous` baseline.
    ///
    /// A zero baseline reports any movement as exactly `+100%`, whatever the
    /// size or sign of `current`.
    #[must_use]
    pub fn between(current: f64, previous: f64) -> Self {
        let current = finite_or_zero(current);
        let previous = finite_or_zero(previous);

        if previous == 0.0 {
            return if current == 0.0 {
                Self::Flat
            } else {
                Self::Change(100.0)
            };
        }

        let raw = saturate(change_ratio(current, previous) * 100.0);
        let scaled = raw * 10.0;
        let rounded = if scaled.is_finite() {
            scaled.round() / 10.0
        } else {
            raw
        };
        // -0.0 == 0.0, so this also folds negative zero into positive zero.
        if rounded == 0.0 {
            Self::Change(0.0)
        } else {
            Self::Change(rounded)
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Flat => 0.0,
            Self::Change(value) => value,
        }
    }

    #[must_use]
    pub fn direction(self) -> Direction {
        match self {
            Self::Flat => Direction::Neutral,
            Self::Change(value) if value > 0.0 => Direction::Up,
            Self::Change(value) if value < 0.0 => Direction::Down,
            Self::Change(_) => Direction::Neutral,
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Flat => f.write_str("0%"),
            Self::Change(value) => {
                let sign = if value < 0.0 { '-' } else { '+' };
                let magnitude = value.abs();
                if magnitude.fract() == 0.0 {
                    write!(f, "{sign}{magnitude:.0}%")
                } else {
                    write!(f, "{sign}{magnitude:.1}%")
                }
            }
        }
    }
}

/// Renders the change label for a pair of period values.
///
/// Non-finite inputs count as zero. Never panics.
#[must_use]
pub fn compute_label(current: f64, previous: f64) -> String {
    PercentChange::between(current, previous).to_string()
}

/// [`compute_label`] over raw JSON values, as they arrive from the backend.
#[must_use]
pub fn compute_label_lenient(current: &Value, previous: &Value) -> String {
    compute_label(coerce_number(current), coerce_number(previous))
}

/// [`compute_label`] over user-typed text.
#[must_use]
pub fn compute_label_str(current: &str, previous: &str) -> String {
    compute_label(coerce_str(current), coerce_str(previous))
}

/// Parses a JSON value as a number, defaulting to `0.0`.
///
/// Numbers pass through, numeric strings are parsed after trimming, booleans
/// map to `1.0`/`0.0`. Everything else, and every non-finite result, is zero.
#[must_use]
pub fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => coerce_str(text),
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    finite_or_zero(number)
}

/// Parses text as a number, defaulting to `0.0`.
#[must_use]
pub fn coerce_str(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().map_or(0.0, finite_or_zero)
}

/// Relative change, falling back to `current / previous - 1` when the
/// difference itself overflows.
fn change_ratio(current: f64, previous: f64) -> f64 {
    let ratio = (current - previous) / previous;
    if ratio.is_finite() {
        ratio
    } else {
        current / previous - 1.0
    }
}

/// Clamps overflowed results to the largest finite value of the same sign.
fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn both_zero_is_unsigned() {
        assert_eq!(compute_label(0.0, 0.0), "0%");
    }

    #[test]
    fn zero_baseline_is_full_increase() {
        assert_eq!(compute_label(1.0, 0.0), "+100%");
        assert_eq!(compute_label(5.0, 0.0), "+100%");
        assert_eq!(compute_label(1_000_000.0, 0.0), "+100%");
        assert_eq!(compute_label(-3.0, 0.0), "+100%");
    }

    #[test]
    fn drop_to_zero_is_full_decrease() {
        assert_eq!(compute_label(0.0, 10.0), "-100%");
        assert_eq!(compute_label(0.0, 0.5), "-100%");
    }

    #[test]
    fn whole_percentages_have_no_decimal() {
        assert_eq!(compute_label(300.0, 200.0), "+50%");
        assert_eq!(compute_label(80.0, 100.0), "-20%");
        assert_eq!(compute_label(105.0, 100.0), "+5%");
        assert_eq!(compute_label(106.0, 100.0), "+6%");
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(compute_label(111.0, 100.0), "+11%");
        assert_eq!(compute_label(101.0, 99.0), "+2%");
        assert_eq!(compute_label(211.0, 200.0), "+5.5%");
        assert_eq!(compute_label(100.0, 300.0), "-66.7%");
        assert_eq!(compute_label(1.0, 3.0), "-66.7%");
    }

    #[test]
    fn tiny_changes_render_as_positive_zero() {
        assert_eq!(compute_label(99_999.0, 100_000.0), "+0%");
        assert_eq!(compute_label(100_001.0, 100_000.0), "+0%");
        assert_eq!(compute_label(7.0, 7.0), "+0%");
    }

    #[test]
    fn overflowing_changes_stay_finite() {
        assert_eq!(compute_label(1e308, -1e308), "-200%");
        assert_eq!(compute_label(-1e308, 1e308), "-200%");

        let huge = PercentChange::between(1.0, 5e-324);
        assert!(huge.value().is_finite());
        assert_eq!(huge.direction(), Direction::Up);
        let label = huge.to_string();
        assert!(label.starts_with('+') && label.ends_with('%'), "{label}");
        assert!(!label.contains("inf"));

        let falling = PercentChange::between(-1.0, 5e-324).to_string();
        assert!(falling.starts_with('-') && !falling.contains("inf"), "{falling}");
    }

    #[test]
    fn negative_baseline_follows_the_formula() {
        assert_eq!(compute_label(-50.0, -100.0), "-50%");
        assert_eq!(compute_label(-150.0, -100.0), "+50%");
    }

    #[test]
    fn non_finite_inputs_count_as_zero() {
        assert_eq!(compute_label(f64::NAN, 0.0), "0%");
        assert_eq!(compute_label(f64::INFINITY, 10.0), "-100%");
        assert_eq!(compute_label(10.0, f64::NAN), "+100%");
    }

    #[test]
    fn lenient_json_inputs() {
        assert_eq!(compute_label_lenient(&json!("300"), &json!(200)), "+50%");
        assert_eq!(compute_label_lenient(&Value::Null, &json!(4)), "-100%");
        assert_eq!(compute_label_lenient(&json!("n/a"), &json!({})), "0%");
        assert_eq!(compute_label_lenient(&json!(true), &json!(false)), "+100%");
    }

    #[test]
    fn lenient_text_inputs() {
        assert_eq!(compute_label_str(" 80 ", "100"), "-20%");
        assert_eq!(compute_label_str("", ""), "0%");
        assert_eq!(compute_label_str("abc", "10"), "-100%");
        assert_eq!(compute_label_str("inf", "10"), "-100%");
    }

    #[test]
    fn direction_of_changes() {
        assert_eq!(PercentChange::between(0.0, 0.0).direction(), Direction::Neutral);
        assert_eq!(PercentChange::between(3.0, 0.0).direction(), Direction::Up);
        assert_eq!(PercentChange::between(80.0, 100.0).direction(), Direction::Down);
        assert_eq!(PercentChange::between(7.0, 7.0).direction(), Direction::Neutral);
        assert_eq!(Direction::Down.css_class(), "down");
    }
}
