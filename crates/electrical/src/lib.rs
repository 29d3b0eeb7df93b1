//! Electrical side of the induction motor drive
//!
//! This crate provides:
//! - Space-vector helpers (phase quantities <-> complex vectors)
//! - The main-flux saturation curve
//! - Inverse-Gamma induction motor models (constant and saturable magnetizing inductance)
//! - Converter models (averaged inverter and carrier-comparison PWM inverter)

pub mod converter;
pub mod motor;
pub mod pwm;
pub mod saturation;
pub mod space_vector;

pub use converter::*;
pub use motor::*;
pub use pwm::{CarrierComparator, PwmParameters, SwitchingState};
pub use saturation::SaturationModel;
