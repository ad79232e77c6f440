//! Step size and precision inference.

use touchspin_format::{MAX_DECIMALS, round_to};

/// Configured step: a fixed increment, or `Auto` to follow whatever precision
/// the field text already has.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Step {
    #[default]
    Auto,
    /// `decimals` comes from the step's textual form (`"0.50"` → 2).
    Fixed { size: f64, decimals: u32 },
}

impl Step {
    pub fn fixed(size: f64) -> Self {
        Step::Fixed {
            size,
            decimals: decimal_places(&size.to_string()),
        }
    }

    /// `"auto"`, `"any"` and `""` mean [`Step::Auto`]; anything else must be a
    /// number and keeps its written precision.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("auto") || text.eq_ignore_ascii_case("any")
        {
            return Some(Step::Auto);
        }
        let size: f64 = text.replacen(',', ".", 1).parse().ok()?;
        // "1e-3" says nothing about precision in its digits; take it from the value
        let decimals = if text.contains(['e', 'E']) {
            decimal_places(&size.to_string())
        } else {
            decimal_places(text)
        };
        Some(Step::Fixed { size, decimals })
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Step::Auto)
    }
}

/// Effective increment and precision for one field at one moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedStep {
    pub step: f64,
    pub decimals: u32,
}

/// Digits directly following the first decimal separator (a comma counts as
/// one). Capped at [`MAX_DECIMALS`].
pub fn decimal_places(text: &str) -> u32 {
    let normalized = text.trim().replacen(',', ".", 1);
    let Some((_, frac)) = normalized.split_once('.') else {
        return 0;
    };
    let digits = frac.bytes().take_while(u8::is_ascii_digit).count() as u32;
    digits.min(MAX_DECIMALS)
}

pub fn resolve(step: &Step, current_text: &str) -> ResolvedStep {
    match *step {
        Step::Fixed { size, decimals } => ResolvedStep {
            step: size,
            decimals,
        },
        Step::Auto => {
            let decimals = decimal_places(current_text);
            ResolvedStep {
                step: round_to(10f64.powi(-(decimals as i32)), decimals),
                decimals,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_precision_from_text() {
        assert_eq!(
            Step::parse("0.50"),
            Some(Step::Fixed {
                size: 0.5,
                decimals: 2
            })
        );
        assert_eq!(
            Step::fixed(0.25),
            Step::Fixed {
                size: 0.25,
                decimals: 2
            }
        );
        assert_eq!(Step::fixed(5.0), Step::Fixed { size: 5.0, decimals: 0 });
        assert_eq!(
            Step::parse("1e-3"),
            Some(Step::Fixed {
                size: 0.001,
                decimals: 3
            })
        );
        assert_eq!(Step::parse("2.5E1"), Some(Step::Fixed { size: 25.0, decimals: 0 }));
        assert_eq!(Step::parse("any"), Some(Step::Auto));
        assert_eq!(Step::parse("wide"), None);
    }

    #[test]
    fn test_auto_tracks_typed_precision() {
        let r = resolve(&Step::Auto, "1.500");
        assert_eq!(r.decimals, 3);
        assert_eq!(r.step, 0.001);

        let r = resolve(&Step::Auto, "3,50");
        assert_eq!(r.decimals, 2);
        assert_eq!(r.step, 0.01);

        let r = resolve(&Step::Auto, "");
        assert_eq!(r, ResolvedStep { step: 1.0, decimals: 0 });
    }

    #[test]
    fn test_decimal_places_counts_digits_only() {
        assert_eq!(decimal_places("12"), 0);
        assert_eq!(decimal_places("1.5e3"), 1);
        assert_eq!(decimal_places("0.1234567890123456789"), MAX_DECIMALS);
    }
}
