//! Fixed-digit rendering of `f64` values.

/// Most fraction digits the spinner ever renders. Beyond this an `f64` has no
/// meaningful decimal digits left.
pub const MAX_DECIMALS: u32 = 15;

// Digits rendered past the requested precision before we round ourselves.
// std rounds ties to even at its last digit; we need half away from zero.
const GUARD_DIGITS: usize = 24;

/// Renders `value` with exactly `decimals` fraction digits, rounding half away
/// from zero on the exact decimal expansion of the double.
///
/// `1.005` is stored as `1.00499…`, so it renders as `"1.00"`, while the exact
/// tie `2.5` renders as `"3"`. Results that round to zero never carry a sign.
pub fn to_fixed(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let decimals = decimals.min(MAX_DECIMALS) as usize;
    let wide = format!("{:.*}", decimals + GUARD_DIGITS, value.abs());
    let (int_part, frac_part) = wide.split_once('.').unwrap_or((wide.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .collect();
    let mut int_len = int_part.len();

    let round_up = frac_part
        .as_bytes()
        .get(decimals)
        .is_some_and(|d| *d >= b'5');
    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                int_len += 1;
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let negative = value < 0.0 && digits.iter().any(|d| *d != b'0');
    let mut out = String::with_capacity(digits.len() + 2);
    if negative {
        out.push('-');
    }
    out.extend(digits[..int_len].iter().map(|&d| d as char));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[int_len..].iter().map(|&d| d as char));
    }
    out
}

/// Rounds `value` to `decimals` fraction digits, half away from zero.
///
/// Equivalent to parsing [`to_fixed`] back, so two values that render the same
/// compare equal bit for bit.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    to_fixed(value, decimals).parse().unwrap_or(value)
}

/// Inserts `sep` between every group of three integer digits.
pub(crate) fn group_digits(int_digits: &str, sep: &str) -> String {
    if sep.is_empty() || int_digits.len() <= 3 {
        return int_digits.to_string();
    }
    let lead = int_digits.len() % 3;
    let mut out = String::with_capacity(int_digits.len() + sep.len() * (int_digits.len() / 3));
    for (i, ch) in int_digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}
