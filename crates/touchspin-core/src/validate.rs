//! Parsing, rounding and clamping of field text.
//!
//! Order is always parse → round → clamp. Bounds are first snapped inward to
//! the field precision so the clamped value is itself representable, which
//! keeps `validate` a fixed point of its own output.

use touchspin_format::{round_to, to_fixed};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finality {
    /// The user is mid-edit; unparseable text is not an error yet.
    Typing,
    /// The value is being committed; unparseable text becomes 0.
    Final,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Validated {
    pub numeric: f64,
    /// Literal field text: `numeric` with exactly the field's decimals.
    pub display: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bounds moved inward onto the `decimals` grid. When no value on the grid
    /// fits between them the raw bounds are kept.
    pub fn at_precision(&self, decimals: u32) -> Bounds {
        let min = ceil_to(self.min, decimals);
        let max = floor_to(self.max, decimals);
        if min <= max { Bounds { min, max } } else { *self }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

fn ceil_to(value: f64, decimals: u32) -> f64 {
    let r = round_to(value, decimals);
    if r < value {
        round_to(r + 10f64.powi(-(decimals as i32)), decimals)
    } else {
        r
    }
}

fn floor_to(value: f64, decimals: u32) -> f64 {
    let r = round_to(value, decimals);
    if r > value {
        round_to(r - 10f64.powi(-(decimals as i32)), decimals)
    } else {
        r
    }
}

/// Longest leading numeric prefix: optional sign, digits, optional fraction,
/// optional exponent. Leading whitespace is skipped; trailing junk ignored.
fn numeric_prefix(text: &str) -> &str {
    let s = text.trim_start();
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return "";
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    &s[..i]
}

pub fn parse(text: &str, finality: Finality) -> Option<f64> {
    let normalized = text.replacen(',', ".", 1);
    let parsed = numeric_prefix(&normalized)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite());
    match (parsed, finality) {
        (Some(v), _) => Some(v),
        (None, Finality::Typing) => None,
        (None, Finality::Final) => Some(0.0),
    }
}

pub fn round(value: f64, decimals: u32) -> f64 {
    round_to(value, decimals)
}

pub fn validate(text: &str, bounds: Bounds, decimals: u32, finality: Finality) -> Option<Validated> {
    let parsed = parse(text, finality)?;
    Some(canonical(parsed, bounds, decimals))
}

/// Rounds and clamps an already-numeric value.
pub fn canonical(value: f64, bounds: Bounds, decimals: u32) -> Validated {
    let value = if value.is_finite() { value } else { 0.0 };
    let numeric = bounds.at_precision(decimals).clamp(round(value, decimals));
    Validated {
        numeric,
        display: to_fixed(numeric, decimals),
    }
}

/// Change over a session, rounded to the field precision. A session without a
/// recorded start counts from 0.
pub fn diff(stop: f64, start: Option<f64>, decimals: u32) -> f64 {
    round(stop - start.unwrap_or(0.0), decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WIDE: Bounds = Bounds {
        min: -1.0e6,
        max: 1.0e6,
    };

    #[test]
    fn test_parse_is_lenient_about_trailing_text() {
        assert_eq!(parse("12abc", Finality::Typing), Some(12.0));
        assert_eq!(parse("  -3,25", Finality::Typing), Some(-3.25));
        assert_eq!(parse(".5", Finality::Typing), Some(0.5));
        assert_eq!(parse("1e3x", Finality::Typing), Some(1000.0));
        assert_eq!(parse("2e", Finality::Typing), Some(2.0));
    }

    #[test]
    fn test_parse_failure_depends_on_finality() {
        assert_eq!(parse("abc", Finality::Typing), None);
        assert_eq!(parse("-", Finality::Typing), None);
        assert_eq!(parse("abc", Finality::Final), Some(0.0));
        assert_eq!(parse("1e999", Finality::Final), Some(0.0));
    }

    #[test]
    fn test_validate_rounds_then_clamps() {
        let b = Bounds::new(0.0, 10.0);
        let v = validate("12.7", b, 0, Finality::Final).unwrap();
        assert_eq!(v.numeric, 10.0);
        assert_eq!(v.display, "10");

        let v = validate("3,456", b, 2, Finality::Final).unwrap();
        assert_eq!(v.numeric, 3.46);
        assert_eq!(v.display, "3.46");

        assert_eq!(validate("x", b, 1, Finality::Typing), None);
        assert_eq!(validate("x", b, 1, Finality::Final).unwrap().display, "0.0");
    }

    #[test]
    fn test_bounds_snap_inward() {
        let b = Bounds::new(0.005, 9.999).at_precision(2);
        assert_eq!(b, Bounds::new(0.01, 9.99));

        // nothing on the grid fits: raw bounds survive
        let b = Bounds::new(0.001, 0.004).at_precision(2);
        assert_eq!(b, Bounds::new(0.001, 0.004));
    }

    #[test]
    fn test_diff_rounds_to_precision() {
        assert_eq!(diff(0.3, Some(0.1), 1), 0.2);
        assert_eq!(diff(4.0, None, 0), 4.0);
    }

    proptest! {
        #[test]
        fn prop_final_validate_respects_bounds(
            text in "[-+]?[0-9]{0,7}([.,][0-9]{0,5})?[a-z]{0,2}",
            min in -1.0e6f64..1.0e6,
            span in 1.0f64..1.0e6,
            decimals in 0u32..=5,
        ) {
            let bounds = Bounds::new(min, min + span);
            let v = validate(&text, bounds, decimals, Finality::Final).unwrap();
            prop_assert!(v.numeric >= bounds.min && v.numeric <= bounds.max);
        }

        #[test]
        fn prop_validate_is_a_fixed_point(
            text in "[-+]?[0-9]{0,7}([.,][0-9]{0,5})?",
            min in -1.0e6f64..1.0e6,
            span in 1.0f64..1.0e6,
            decimals in 0u32..=5,
        ) {
            let bounds = Bounds::new(min, min + span);
            let first = validate(&text, bounds, decimals, Finality::Final).unwrap();
            let second = validate(&first.display, bounds, decimals, Finality::Final).unwrap();
            prop_assert_eq!(first.numeric, second.numeric);
            prop_assert_eq!(first.display, second.display);
        }

        #[test]
        fn prop_display_parses_back_within_precision(x in -1.0e6f64..1.0e6, decimals in 0u32..=6) {
            let v = canonical(x, WIDE, decimals);
            let back = parse(&v.display, Finality::Final).unwrap();
            prop_assert!((back - x).abs() <= 10f64.powi(-(decimals as i32)));
        }
    }
}
