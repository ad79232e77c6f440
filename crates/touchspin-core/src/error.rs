use touchspin_format::MAX_DECIMALS;

/// Problems found while resolving options at attach time.
///
/// None of these abort an attach: each one names the fallback that was taken,
/// and the whole list is delivered once through `SpinEvent::Error`.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("step must be a positive finite number, got {0}; using auto step")]
    InvalidStep(f64),
    #[error("{which} bound {value} is not finite; using the default bound")]
    NonFiniteBound { which: &'static str, value: f64 },
    #[error("min {min} is greater than max {max}; swapping them")]
    InvertedBounds { min: f64, max: f64 },
    #[error("{0} decimals requested; capping at {max}", max = MAX_DECIMALS)]
    TooManyDecimals(u32),
    #[error("{decimals} decimals cannot represent a step with {step_decimals}; using {step_decimals}")]
    DecimalsBelowStepPrecision { decimals: u32, step_decimals: u32 },
    #[error("invalid timing: {0}; using the default")]
    InvalidTiming(&'static str),
    #[error("unknown locale '{0}'; using en-US")]
    UnknownLocale(String),
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    #[error("attribute '{key}' has invalid value '{value}'")]
    InvalidAttribute { key: String, value: String },
}
