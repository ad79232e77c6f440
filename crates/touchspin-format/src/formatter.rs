use crate::fixed::{group_digits, to_fixed};
use crate::locale::{Locale, SymbolPosition};

/// Turns a spinner value into the read-only display text.
///
/// Built-in styles and plain closures `Fn(f64, u32, &Locale) -> String` both
/// implement this, so hosts can pass either wherever a formatter is taken.
pub trait NumberFormatter {
    fn format(&self, value: f64, decimals: u32, locale: &Locale) -> String;
}

impl<F> NumberFormatter for F
where
    F: Fn(f64, u32, &Locale) -> String,
{
    fn format(&self, value: f64, decimals: u32, locale: &Locale) -> String {
        self(value, decimals, locale)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberStyle {
    /// Grouped digits with the locale's separators: `1.234,50`.
    Plain,
    /// Plain plus the locale's currency symbol: `1.234,50 €`, `$1,234.50`.
    Currency,
    /// Value × 100 with two fewer fraction digits and a percent sign.
    Percent,
}

impl NumberStyle {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plain" | "number" | "decimal" => Some(NumberStyle::Plain),
            "currency" => Some(NumberStyle::Currency),
            "percent" => Some(NumberStyle::Percent),
            _ => None,
        }
    }
}

impl NumberFormatter for NumberStyle {
    fn format(&self, value: f64, decimals: u32, locale: &Locale) -> String {
        match self {
            NumberStyle::Plain => format_number(value, decimals, locale),
            NumberStyle::Currency => {
                let (negative, body) = localized_parts(value, decimals, locale);
                let sign = if negative { "-" } else { "" };
                match locale.currency_position {
                    SymbolPosition::Before => {
                        format!("{sign}{}{}{body}", locale.currency, locale.currency_gap)
                    }
                    SymbolPosition::After => {
                        format!("{sign}{body}{}{}", locale.currency_gap, locale.currency)
                    }
                }
            }
            NumberStyle::Percent => {
                let body = format_number(value * 100.0, decimals.saturating_sub(2), locale);
                format!("{body}{}%", locale.percent_gap)
            }
        }
    }
}

/// Plain localized rendering with exactly `decimals` fraction digits.
pub fn format_number(value: f64, decimals: u32, locale: &Locale) -> String {
    let (negative, body) = localized_parts(value, decimals, locale);
    if negative { format!("-{body}") } else { body }
}

// Sign and unsigned localized body. Rounding happens before the sign is
// inspected so "-0,00" never appears.
fn localized_parts(value: f64, decimals: u32, locale: &Locale) -> (bool, String) {
    let fixed = to_fixed(value, decimals);
    let (negative, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };
    let (int_digits, frac_digits) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut body = group_digits(int_digits, locale.group);
    if let Some(frac) = frac_digits {
        body.push(locale.decimal);
        body.push_str(frac);
    }
    (negative, body)
}
