//! Rotor mechanics - a single rigid inertia with viscous friction
//!
//! Provides:
//! - Speed dynamics driven by electromagnetic and load torque
//! - Rotor angle integration, wrapped into [0, 2*pi) for logging

use serde::{Deserialize, Serialize};
use simcore::{ensure_non_negative, ensure_positive, Describe, Result, Summary};
use std::f64::consts::TAU;

/// Configuration of the rotating mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanicalParameters {
    /// Total moment of inertia (kg·m²)
    pub j: f64,
    /// Viscous friction coefficient (N·m·s/rad)
    #[serde(default)]
    pub b: f64,
}

impl MechanicalParameters {
    pub fn new(j: f64, b: f64) -> Result<Self> {
        let params = MechanicalParameters { j, b };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("J", self.j)?;
        ensure_non_negative("B", self.b)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanicalState {
    /// Rotor angular speed (mechanical rad/s)
    pub w_m: f64,
    /// Rotor angle (mechanical rad), kept in [0, 2*pi)
    pub theta_m: f64,
}

impl MechanicalState {
    pub fn new(w_m: f64, theta_m: f64) -> Self {
        MechanicalState {
            w_m,
            theta_m: wrap_angle(theta_m),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.w_m.is_finite() && self.theta_m.is_finite()
    }
}

/// Wrap an angle into [0, 2*pi).
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mechanics {
    params: MechanicalParameters,
}

impl Mechanics {
    pub fn new(params: MechanicalParameters) -> Result<Self> {
        params.validate()?;
        Ok(Mechanics { params })
    }

    pub fn parameters(&self) -> &MechanicalParameters {
        &self.params
    }

    /// Viscous friction torque opposing the speed (N·m)
    pub fn friction(&self, w_m: f64) -> f64 {
        -self.params.b * w_m
    }

    /// Angular acceleration for electromagnetic torque `tau_m` and load torque `tau_l`
    ///
    /// `(tau_m - tau_l - B*w_m) / J`
    pub fn acceleration(&self, w_m: f64, tau_m: f64, tau_l: f64) -> f64 {
        (tau_m - tau_l + self.friction(w_m)) / self.params.j
    }

    /// State derivatives. The angle derivative is the speed itself; the
    /// angle never feeds back into the dynamics.
    pub fn derivatives(&self, state: &MechanicalState, tau_m: f64, tau_l: f64) -> MechanicalState {
        MechanicalState {
            w_m: self.acceleration(state.w_m, tau_m, tau_l),
            theta_m: state.w_m,
        }
    }
}

impl Describe for Mechanics {
    fn describe(&self) -> Summary {
        Summary::new("Mechanics")
            .with("J", self.params.j, "kgm^2")
            .with("B", self.params.b, "Nms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mechanics(j: f64, b: f64) -> Mechanics {
        Mechanics::new(MechanicalParameters::new(j, b).unwrap()).unwrap()
    }

    #[test]
    fn test_acceleration_from_net_torque() {
        let mech = mechanics(2.0, 0.0);
        // (10 - 4) / 2 = 3 rad/s²
        assert!((mech.acceleration(50.0, 10.0, 4.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_viscous_friction_opposes_motion() {
        let mech = mechanics(1.0, 0.5);
        assert!((mech.friction(10.0) - (-5.0)).abs() < 1e-12);
        assert!((mech.friction(-10.0) - 5.0).abs() < 1e-12);
        assert!((mech.acceleration(10.0, 0.0, 0.0) - (-5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_free_rotor_keeps_speed() {
        let mech = mechanics(0.8134, 0.0);
        let d = mech.derivatives(&MechanicalState::new(120.0, 1.0), 0.0, 0.0);
        assert_eq!(d.w_m, 0.0);
        assert_eq!(d.theta_m, 120.0);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-18) < TAU);
        assert!((MechanicalState::new(0.0, 3.0 * TAU + 1.0).theta_m - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(MechanicalParameters::new(0.0, 0.0).is_err());
        assert!(MechanicalParameters::new(-1.0, 0.0).is_err());
        assert!(MechanicalParameters::new(1.0, -0.1).is_err());
        assert!(MechanicalParameters::new(1.0, 0.0).is_ok());
    }

    #[test]
    fn test_summary() {
        let summary = mechanics(0.8134, 0.0).describe();
        assert_eq!(summary.get("J"), Some(0.8134));
        assert_eq!(summary.get("B"), Some(0.0));
    }
}
