use thiserror::Error;

/// Errors raised while configuring or stepping a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A construction parameter is out of its admissible range.
    #[error("invalid configuration: `{parameter}` must be {requirement}, got {value}")]
    InvalidParameter {
        parameter: &'static str,
        requirement: &'static str,
        value: f64,
    },

    /// The configuration is structurally inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A step produced or was fed a non-finite quantity.
    #[error("simulation diverged at t = {time} s: {quantity} is not finite")]
    Divergence { quantity: &'static str, time: f64 },
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Accept `value` only if it is finite and strictly positive.
pub fn ensure_positive(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            parameter,
            requirement: "finite and strictly positive",
            value,
        })
    }
}

/// Accept `value` only if it is finite and not negative.
pub fn ensure_non_negative(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            parameter,
            requirement: "finite and non-negative",
            value,
        })
    }
}

/// Runtime check used by the stepping code; reports a divergence at `time`.
pub fn ensure_finite(quantity: &'static str, value: f64, time: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::Divergence { quantity, time })
    }
}
