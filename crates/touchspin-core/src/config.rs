//! # Configuration
//!
//! Options come from three layers, highest priority first:
//!
//! 1. `SpinOptions` built in code (`SpinOptions::new().min(0.0)…`),
//! 2. string attributes (`SpinOptions::from_attributes`), merged under the
//!    code options with [`SpinOptions::with_fallback`],
//! 3. the process-wide [`SpinTemplate`] (`set_default_template`).
//!
//! `attach` resolves them once into an immutable [`SpinConfig`]. Problems are
//! collected as `ConfigError`s and replaced by fallbacks; resolution itself
//! never fails.

use std::fmt;
use std::rc::Rc;

use parking_lot::RwLock;
use touchspin_format::{Locale, MAX_DECIMALS, NumberFormatter, NumberStyle};
use web_time::Duration;

use crate::error::ConfigError;
use crate::step::Step;
use crate::validate::Bounds;

/// Default magnitude for unspecified bounds: finite so clamp arithmetic stays
/// finite.
pub const BOUND_SENTINEL: f64 = 2_147_483_647.0;

pub type ValueCallback = Rc<dyn Fn(f64)>;
pub type StopCallback = Rc<dyn Fn(f64, f64)>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartPolicy {
    /// Focusing the field opens an editing session, as does a press.
    #[default]
    OnFocusOrPress,
    /// Only control presses open sessions.
    OnPressOnly,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinTiming {
    /// Wait after the immediate step before auto-repeat starts.
    pub lead_delay: Duration,
    /// Repeat interval before the first decay is applied.
    pub start_speed: Duration,
    /// Interval multiplier per tick, in (0, 1).
    pub decay: f64,
    pub floor_speed: Duration,
    /// Debounce between release and the stop event.
    pub finalize_delay: Duration,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            lead_delay: Duration::from_millis(300),
            start_speed: Duration::from_millis(600),
            decay: 0.9,
            floor_speed: Duration::from_millis(1),
            finalize_delay: Duration::from_millis(1000),
        }
    }
}

/// Longest delay any timing field may ask for. Deadlines are `now + delay`,
/// which must stay representable.
pub const MAX_TIMING_DELAY: Duration = Duration::from_secs(60 * 60);

impl SpinTiming {
    fn sanitized(self, errors: &mut Vec<ConfigError>) -> Self {
        let d = SpinTiming::default();
        let mut out = self;
        if !(self.decay > 0.0 && self.decay < 1.0) {
            errors.push(ConfigError::InvalidTiming("decay must be in (0, 1)"));
            out.decay = d.decay;
        }
        let capped = [
            (&mut out.lead_delay, d.lead_delay, "lead delay above one hour"),
            (&mut out.start_speed, d.start_speed, "start speed above one hour"),
            (&mut out.finalize_delay, d.finalize_delay, "finalize delay above one hour"),
        ];
        for (value, default, what) in capped {
            if *value > MAX_TIMING_DELAY {
                errors.push(ConfigError::InvalidTiming(what));
                *value = default;
            }
        }
        if self.floor_speed < Duration::from_millis(1) {
            errors.push(ConfigError::InvalidTiming("floor speed below 1ms"));
            out.floor_speed = d.floor_speed;
        } else if self.floor_speed > MAX_TIMING_DELAY {
            errors.push(ConfigError::InvalidTiming("floor speed above one hour"));
            out.floor_speed = d.floor_speed;
        }
        if out.start_speed < out.floor_speed {
            errors.push(ConfigError::InvalidTiming("start speed below floor speed"));
            out.start_speed = out.floor_speed;
        }
        out
    }
}

/// Plain-data defaults shared by every new attachment. Callbacks and custom
/// formatters are per attachment and never part of the template.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinTemplate {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Step,
    pub decimals: Option<u32>,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub allow_text_entry: bool,
    pub style: Option<NumberStyle>,
    pub locale: String,
    pub timing: SpinTiming,
    pub start_policy: StartPolicy,
}

impl Default for SpinTemplate {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            step: Step::Auto,
            decimals: None,
            prefix: None,
            postfix: None,
            allow_text_entry: true,
            style: None,
            locale: Locale::EN_US.tag().to_string(),
            timing: SpinTiming::default(),
            start_policy: StartPolicy::default(),
        }
    }
}

static TEMPLATE: RwLock<Option<SpinTemplate>> = parking_lot::const_rwlock(None);

/// Snapshot of the process-wide template used to seed new attachments.
pub fn default_template() -> SpinTemplate {
    TEMPLATE.read().clone().unwrap_or_default()
}

/// Replaces the template. Already attached fields keep their resolved config.
pub fn set_default_template(template: SpinTemplate) {
    *TEMPLATE.write() = Some(template);
}

pub fn reset_default_template() {
    *TEMPLATE.write() = None;
}

/// Per-attachment options. Unset fields fall back to the template.
#[derive(Clone, Default)]
pub struct SpinOptions {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<Step>,
    pub decimals: Option<u32>,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub allow_text_entry: Option<bool>,
    pub formatter: Option<Rc<dyn NumberFormatter>>,
    pub locale: Option<String>,
    pub timing: Option<SpinTiming>,
    pub start_policy: Option<StartPolicy>,
    pub on_init: Option<ValueCallback>,
    pub on_start: Option<ValueCallback>,
    pub on_stop: Option<StopCallback>,
    errors: Vec<ConfigError>,
}

impl fmt::Debug for SpinOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinOptions")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("step", &self.step)
            .field("decimals", &self.decimals)
            .field("locale", &self.locale)
            .field("formatter", &self.formatter.is_some())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

impl SpinOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, v: f64) -> Self {
        self.min = Some(v);
        self
    }
    pub fn max(mut self, v: f64) -> Self {
        self.max = Some(v);
        self
    }
    pub fn step(mut self, step: Step) -> Self {
        self.step = Some(step);
        self
    }
    pub fn decimals(mut self, d: u32) -> Self {
        self.decimals = Some(d);
        self
    }
    pub fn prefix(mut self, text: impl Into<String>) -> Self {
        self.prefix = Some(text.into());
        self
    }
    pub fn postfix(mut self, text: impl Into<String>) -> Self {
        self.postfix = Some(text.into());
        self
    }
    pub fn allow_text_entry(mut self, allow: bool) -> Self {
        self.allow_text_entry = Some(allow);
        self
    }
    pub fn formatter(mut self, f: impl NumberFormatter + 'static) -> Self {
        self.formatter = Some(Rc::new(f));
        self
    }
    pub fn locale(mut self, tag: impl Into<String>) -> Self {
        self.locale = Some(tag.into());
        self
    }
    pub fn timing(mut self, timing: SpinTiming) -> Self {
        self.timing = Some(timing);
        self
    }
    pub fn start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = Some(policy);
        self
    }
    pub fn on_init(mut self, f: impl Fn(f64) + 'static) -> Self {
        self.on_init = Some(Rc::new(f));
        self
    }
    pub fn on_start(mut self, f: impl Fn(f64) + 'static) -> Self {
        self.on_start = Some(Rc::new(f));
        self
    }
    pub fn on_stop(mut self, f: impl Fn(f64, f64) + 'static) -> Self {
        self.on_stop = Some(Rc::new(f));
        self
    }

    /// Builds options from string attributes such as `data-min="0"`. Keys are
    /// case-insensitive, may carry a `data-` prefix and use `-` or `_`.
    /// Unknown keys and unparseable values are recorded and reported at
    /// attach time.
    pub fn from_attributes<I, K, V>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut opts = SpinOptions::new();
        for (key, value) in attrs {
            let raw_key = key.as_ref();
            let value = value.as_ref();
            let key = raw_key.trim().to_ascii_lowercase().replace('_', "-");
            let key = key.strip_prefix("data-").unwrap_or(&key);
            let ok = match key {
                "min" => parse_number(value).map(|v| opts.min = Some(v)),
                "max" => parse_number(value).map(|v| opts.max = Some(v)),
                "step" => Step::parse(value).map(|s| opts.step = Some(s)),
                "decimals" => value.trim().parse().ok().map(|d| opts.decimals = Some(d)),
                "prefix" => {
                    opts.prefix = Some(value.to_string());
                    Some(())
                }
                "postfix" => {
                    opts.postfix = Some(value.to_string());
                    Some(())
                }
                "allow-input" | "allow-text-entry" => {
                    parse_flag(value).map(|b| opts.allow_text_entry = Some(b))
                }
                "locale" => {
                    opts.locale = Some(value.trim().to_string());
                    Some(())
                }
                "formatter" => NumberStyle::parse(value).map(|s| {
                    opts.formatter = Some(Rc::new(s));
                }),
                "start-on-focus" => parse_flag(value).map(|b| {
                    opts.start_policy = Some(if b {
                        StartPolicy::OnFocusOrPress
                    } else {
                        StartPolicy::OnPressOnly
                    });
                }),
                _ => {
                    opts.errors
                        .push(ConfigError::UnknownAttribute(raw_key.to_string()));
                    continue;
                }
            };
            if ok.is_none() {
                opts.errors.push(ConfigError::InvalidAttribute {
                    key: raw_key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        opts
    }

    /// Fills every unset field from `base`; set fields here win.
    pub fn with_fallback(mut self, base: SpinOptions) -> Self {
        self.min = self.min.or(base.min);
        self.max = self.max.or(base.max);
        self.step = self.step.or(base.step);
        self.decimals = self.decimals.or(base.decimals);
        self.prefix = self.prefix.or(base.prefix);
        self.postfix = self.postfix.or(base.postfix);
        self.allow_text_entry = self.allow_text_entry.or(base.allow_text_entry);
        self.formatter = self.formatter.or(base.formatter);
        self.locale = self.locale.or(base.locale);
        self.timing = self.timing.or(base.timing);
        self.start_policy = self.start_policy.or(base.start_policy);
        self.on_init = self.on_init.or(base.on_init);
        self.on_start = self.on_start.or(base.on_start);
        self.on_stop = self.on_stop.or(base.on_stop);
        self.errors.extend(base.errors);
        self
    }

    /// Resolves against `template`. Always yields a usable config; the
    /// returned list names every fallback that was taken.
    pub fn resolve(self, template: &SpinTemplate) -> (SpinConfig, Vec<ConfigError>) {
        let mut errors = self.errors;

        let min = finite_bound("min", self.min.or(template.min), &mut errors)
            .unwrap_or(-BOUND_SENTINEL);
        let max = finite_bound("max", self.max.or(template.max), &mut errors)
            .unwrap_or(BOUND_SENTINEL);
        let bounds = if min > max {
            errors.push(ConfigError::InvertedBounds { min, max });
            Bounds::new(max, min)
        } else {
            Bounds::new(min, max)
        };

        let explicit_decimals = self.decimals.or(template.decimals);
        let step = match self.step.unwrap_or(template.step) {
            Step::Fixed { size, .. } if !(size.is_finite() && size > 0.0) => {
                errors.push(ConfigError::InvalidStep(size));
                Step::Auto
            }
            Step::Fixed { size, decimals } => {
                let mut wanted = explicit_decimals.unwrap_or(decimals);
                if wanted < decimals {
                    // decimals must resolve the step itself
                    errors.push(ConfigError::DecimalsBelowStepPrecision {
                        decimals: wanted,
                        step_decimals: decimals,
                    });
                    wanted = decimals;
                }
                if wanted > MAX_DECIMALS {
                    errors.push(ConfigError::TooManyDecimals(wanted));
                }
                Step::Fixed {
                    size,
                    decimals: wanted.min(MAX_DECIMALS),
                }
            }
            Step::Auto => {
                if explicit_decimals.is_some() {
                    log::warn!("decimals option ignored: auto step derives precision from the text");
                }
                Step::Auto
            }
        };

        let tag = self.locale.unwrap_or_else(|| template.locale.clone());
        let locale = Locale::parse(&tag).unwrap_or_else(|| {
            errors.push(ConfigError::UnknownLocale(tag.clone()));
            Locale::EN_US
        });

        let formatter = self.formatter.or_else(|| {
            template
                .style
                .map(|s| Rc::new(s) as Rc<dyn NumberFormatter>)
        });

        let config = SpinConfig {
            bounds,
            step,
            allow_text_entry: self.allow_text_entry.unwrap_or(template.allow_text_entry),
            formatter,
            locale,
            prefix: self.prefix.or_else(|| template.prefix.clone()),
            postfix: self.postfix.or_else(|| template.postfix.clone()),
            timing: self.timing.unwrap_or(template.timing).sanitized(&mut errors),
            start_policy: self.start_policy.unwrap_or(template.start_policy),
            on_init: self.on_init,
            on_start: self.on_start,
            on_stop: self.on_stop,
        };
        (config, errors)
    }
}

fn finite_bound(which: &'static str, v: Option<f64>, errors: &mut Vec<ConfigError>) -> Option<f64> {
    match v {
        Some(value) if !value.is_finite() => {
            errors.push(ConfigError::NonFiniteBound { which, value });
            None
        }
        other => other,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Resolved, immutable configuration of one attached field.
#[derive(Clone)]
pub struct SpinConfig {
    pub bounds: Bounds,
    pub step: Step,
    pub allow_text_entry: bool,
    pub formatter: Option<Rc<dyn NumberFormatter>>,
    pub locale: Locale,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub timing: SpinTiming,
    pub start_policy: StartPolicy,
    pub on_init: Option<ValueCallback>,
    pub on_start: Option<ValueCallback>,
    pub on_stop: Option<StopCallback>,
}

impl fmt::Debug for SpinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinConfig")
            .field("bounds", &self.bounds)
            .field("step", &self.step)
            .field("allow_text_entry", &self.allow_text_entry)
            .field("locale", &self.locale.tag())
            .field("formatter", &self.formatter.is_some())
            .field("timing", &self.timing)
            .field("start_policy", &self.start_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults() {
        let (cfg, errors) = SpinOptions::new().resolve(&SpinTemplate::default());
        assert!(errors.is_empty());
        assert_eq!(cfg.bounds, Bounds::new(-BOUND_SENTINEL, BOUND_SENTINEL));
        assert_eq!(cfg.step, Step::Auto);
        assert_eq!(cfg.locale, Locale::EN_US);
        assert!(cfg.formatter.is_none());
        assert_eq!(cfg.timing.lead_delay, Duration::from_millis(300));
        assert_eq!(cfg.start_policy, StartPolicy::OnFocusOrPress);
    }

    #[test]
    fn test_bad_options_fall_back() {
        let (cfg, errors) = SpinOptions::new()
            .min(5.0)
            .max(1.0)
            .step(Step::fixed(-2.0))
            .locale("tlh-KX")
            .resolve(&SpinTemplate::default());
        assert_eq!(cfg.bounds, Bounds::new(1.0, 5.0));
        assert_eq!(cfg.step, Step::Auto);
        assert_eq!(cfg.locale, Locale::EN_US);
        assert_eq!(
            errors,
            vec![
                ConfigError::InvertedBounds { min: 5.0, max: 1.0 },
                ConfigError::InvalidStep(-2.0),
                ConfigError::UnknownLocale("tlh-KX".into()),
            ]
        );
    }

    #[test]
    fn test_explicit_decimals_override_fixed_step() {
        let (cfg, errors) = SpinOptions::new()
            .step(Step::fixed(0.5))
            .decimals(3)
            .resolve(&SpinTemplate::default());
        assert!(errors.is_empty());
        assert_eq!(cfg.step, Step::Fixed { size: 0.5, decimals: 3 });

        let (cfg, errors) = SpinOptions::new()
            .step(Step::fixed(1.0))
            .decimals(40)
            .resolve(&SpinTemplate::default());
        assert_eq!(errors, vec![ConfigError::TooManyDecimals(40)]);
        assert_eq!(
            cfg.step,
            Step::Fixed {
                size: 1.0,
                decimals: MAX_DECIMALS
            }
        );
    }

    #[test]
    fn test_timing_is_sanitized() {
        let timing = SpinTiming {
            decay: 1.5,
            floor_speed: Duration::ZERO,
            ..SpinTiming::default()
        };
        let (cfg, errors) = SpinOptions::new()
            .timing(timing)
            .resolve(&SpinTemplate::default());
        assert_eq!(errors.len(), 2);
        assert_eq!(cfg.timing, SpinTiming::default());
    }

    #[test]
    fn test_oversized_delays_fall_back() {
        let timing = SpinTiming {
            lead_delay: Duration::MAX,
            start_speed: Duration::from_secs(2 * 60 * 60),
            finalize_delay: Duration::MAX,
            ..SpinTiming::default()
        };
        let (cfg, errors) = SpinOptions::new()
            .timing(timing)
            .resolve(&SpinTemplate::default());
        assert_eq!(
            errors,
            vec![
                ConfigError::InvalidTiming("lead delay above one hour"),
                ConfigError::InvalidTiming("start speed above one hour"),
                ConfigError::InvalidTiming("finalize delay above one hour"),
            ]
        );
        assert_eq!(cfg.timing, SpinTiming::default());

        let timing = SpinTiming {
            lead_delay: MAX_TIMING_DELAY,
            floor_speed: Duration::MAX,
            ..SpinTiming::default()
        };
        let (cfg, errors) = SpinOptions::new()
            .timing(timing)
            .resolve(&SpinTemplate::default());
        assert_eq!(errors, vec![ConfigError::InvalidTiming("floor speed above one hour")]);
        assert_eq!(cfg.timing.lead_delay, MAX_TIMING_DELAY);
        assert_eq!(cfg.timing.floor_speed, Duration::from_millis(1));
    }

    #[test]
    fn test_decimals_coarser_than_step_fall_back() {
        let (cfg, errors) = SpinOptions::new()
            .step(Step::fixed(0.25))
            .decimals(0)
            .resolve(&SpinTemplate::default());
        assert_eq!(
            errors,
            vec![ConfigError::DecimalsBelowStepPrecision {
                decimals: 0,
                step_decimals: 2
            }]
        );
        assert_eq!(cfg.step, Step::Fixed { size: 0.25, decimals: 2 });
    }

    #[test]
    fn test_attributes_parse_and_report() {
        let opts = SpinOptions::from_attributes([
            ("data-min", "0"),
            ("step", "0.50"),
            ("formatter", "currency"),
            ("Allow_Input", "false"),
            ("bogus", "x"),
            ("max", "abc"),
        ]);
        assert_eq!(opts.min, Some(0.0));
        assert_eq!(opts.max, None);
        assert_eq!(opts.allow_text_entry, Some(false));

        let (cfg, errors) = SpinOptions::new()
            .max(9.0)
            .with_fallback(opts)
            .resolve(&SpinTemplate::default());
        assert_eq!(cfg.bounds, Bounds::new(0.0, 9.0));
        assert_eq!(cfg.step, Step::Fixed { size: 0.5, decimals: 2 });
        assert!(cfg.formatter.is_some());
        assert!(!cfg.allow_text_entry);
        assert_eq!(
            errors,
            vec![
                ConfigError::UnknownAttribute("bogus".into()),
                ConfigError::InvalidAttribute {
                    key: "max".into(),
                    value: "abc".into()
                },
            ]
        );
    }

    #[test]
    fn test_template_seeds_unset_options() {
        let template = SpinTemplate {
            min: Some(0.0),
            step: Step::fixed(0.1),
            style: Some(NumberStyle::Percent),
            locale: "de-DE".into(),
            ..SpinTemplate::default()
        };
        let (cfg, _) = SpinOptions::new().min(-1.0).resolve(&template);
        assert_eq!(cfg.bounds.min, -1.0);
        assert_eq!(cfg.step, Step::Fixed { size: 0.1, decimals: 1 });
        assert_eq!(cfg.locale.tag(), "de-DE");
        assert!(cfg.formatter.is_some());
    }
}
