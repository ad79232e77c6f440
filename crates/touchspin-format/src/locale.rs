#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolPosition {
    Before,
    After,
}

/// Number conventions for one locale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Locale {
    tag: &'static str,
    pub decimal: char,
    pub group: &'static str,
    pub currency: &'static str,
    pub currency_position: SymbolPosition,
    /// Separator between the amount and the currency symbol ("" for none).
    pub currency_gap: &'static str,
    /// Separator between the amount and `%`.
    pub percent_gap: &'static str,
}

const NBSP: &str = "\u{a0}";
const NNBSP: &str = "\u{202f}";

const fn entry(
    tag: &'static str,
    decimal: char,
    group: &'static str,
    currency: &'static str,
    currency_position: SymbolPosition,
    currency_gap: &'static str,
    percent_gap: &'static str,
) -> Locale {
    Locale {
        tag,
        decimal,
        group,
        currency,
        currency_position,
        currency_gap,
        percent_gap,
    }
}

// First entry per language doubles as the language fallback.
const LOCALES: &[Locale] = &[
    Locale::EN_US,
    entry("en-GB", '.', ",", "£", SymbolPosition::Before, "", ""),
    entry("de-DE", ',', ".", "€", SymbolPosition::After, NBSP, NBSP),
    entry("de-AT", ',', NBSP, "€", SymbolPosition::Before, NBSP, NBSP),
    entry("de-CH", '.', "’", "CHF", SymbolPosition::Before, NBSP, ""),
    entry("fr-FR", ',', NNBSP, "€", SymbolPosition::After, NBSP, NNBSP),
    entry("es-ES", ',', ".", "€", SymbolPosition::After, NBSP, NBSP),
    entry("it-IT", ',', ".", "€", SymbolPosition::After, NBSP, ""),
    entry("nl-NL", ',', ".", "€", SymbolPosition::Before, NBSP, ""),
    entry("pt-BR", ',', ".", "R$", SymbolPosition::Before, NBSP, ""),
    entry("ja-JP", '.', ",", "¥", SymbolPosition::Before, "", ""),
];

impl Locale {
    pub const EN_US: Locale = entry("en-US", '.', ",", "$", SymbolPosition::Before, "", "");

    /// Looks up a locale by tag (`de-DE`, `de_de`, `de`). An unknown region
    /// falls back to the first table entry for the language.
    pub fn parse(tag: &str) -> Option<Locale> {
        let tag = tag.trim().replace('_', "-");
        if let Some(found) = LOCALES.iter().find(|l| l.tag.eq_ignore_ascii_case(&tag)) {
            return Some(*found);
        }
        let lang = tag.split('-').next().unwrap_or_default();
        let found = LOCALES.iter().find(|l| {
            l.tag
                .split('-')
                .next()
                .is_some_and(|l| l.eq_ignore_ascii_case(lang))
        })?;
        log::debug!("locale '{}' not in table; using '{}'", tag, found.tag);
        Some(*found)
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::EN_US
    }
}
