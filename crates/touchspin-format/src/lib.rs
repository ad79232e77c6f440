//! # Number rendering
//!
//! Everything that turns a spinner value into text lives here:
//!
//! - [`to_fixed`] / [`round_to`]: exact fixed-digit rendering and rounding,
//!   half away from zero. The core crate writes field text with these.
//! - [`Locale`]: separators and currency conventions for a small table of
//!   locales.
//! - [`NumberFormatter`]: the strategy used for the read-only overlay.
//!   [`NumberStyle`] covers plain, currency and percent; any closure
//!   `Fn(f64, u32, &Locale) -> String` works too.
//!
//! ```rust
//! use touchspin_format::*;
//!
//! let de = Locale::parse("de-DE").unwrap();
//! assert_eq!(NumberStyle::Currency.format(1234.5, 2, &de), "1.234,50\u{a0}€");
//! assert_eq!(to_fixed(2.5, 0), "3");
//! ```

mod fixed;
mod formatter;
mod locale;

pub use fixed::{MAX_DECIMALS, round_to, to_fixed};
pub use formatter::{NumberFormatter, NumberStyle, format_number};
pub use locale::{Locale, SymbolPosition};
