//! Induction motor models
//!
//! State variables are the stator and rotor flux linkages in stationary
//! coordinates. `Motor` uses the inverse-Gamma equivalent circuit (rotor
//! leakage lumped into the stator branch, rotor flux = magnetizing flux).
//! `MotorSaturated` uses the Gamma circuit (stator flux = magnetizing flux),
//! which keeps the saturating inductance on the stator-flux magnitude.
//!
//! Sign convention (motor reference): positive torque accelerates the rotor
//! in the positive (counter-clockwise) direction of the stationary frame.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use simcore::{ensure_positive, Describe, Result, SimError, Summary};

use crate::saturation::SaturationModel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorParameters {
    /// Stator resistance (Ohm)
    pub r_s: f64,
    /// Rotor resistance (Ohm)
    pub r_r: f64,
    /// Leakage inductance (H)
    pub l_sgm: f64,
    /// Magnetizing inductance, unsaturated value for saturable models (H)
    pub l_m: f64,
    /// Number of pole pairs
    pub p: u32,
}

impl MotorParameters {
    pub fn new(r_s: f64, r_r: f64, l_sgm: f64, l_m: f64, p: u32) -> Result<Self> {
        let params = MotorParameters { r_s, r_r, l_sgm, l_m, p };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("R_s", self.r_s)?;
        ensure_positive("R_R", self.r_r)?;
        ensure_positive("L_sgm", self.l_sgm)?;
        ensure_positive("L_M", self.l_m)?;
        if self.p == 0 {
            return Err(SimError::InvalidParameter {
                parameter: "p",
                requirement: "a positive integer",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Flux linkages (Vs) in stationary coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotorState {
    /// Stator flux linkage
    pub psi_s: Complex64,
    /// Rotor flux linkage
    pub psi_r: Complex64,
}

impl MotorState {
    pub fn new(psi_s: Complex64, psi_r: Complex64) -> Self {
        MotorState { psi_s, psi_r }
    }

    pub fn is_finite(&self) -> bool {
        self.psi_s.is_finite() && self.psi_r.is_finite()
    }
}

/// Algebraic quantities solved from a flux state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnetic {
    /// Stator current (A)
    pub i_s: Complex64,
    /// Rotor current (A)
    pub i_r: Complex64,
    /// Magnetizing inductance used for the solve (H)
    pub l_m: f64,
    /// Electromagnetic torque (Nm)
    pub tau_m: f64,
}

/// Induction motor in stationary coordinates.
///
/// Torque and state equations are shared. The default flux-to-current solve
/// is the inverse-Gamma one; Gamma-circuit models override `currents`.
pub trait InductionMotor: Describe {
    fn parameters(&self) -> &MotorParameters;

    /// Magnetizing inductance at magnetizing flux magnitude `psi_m` (Vs).
    fn magnetizing_inductance(&self, psi_m: f64) -> f64;

    /// Stator current, rotor current and magnetizing inductance from the flux
    /// linkages (inverse-Gamma: the rotor flux magnetizes).
    fn currents(&self, state: &MotorState) -> (Complex64, Complex64, f64) {
        let params = self.parameters();
        let l_m = self.magnetizing_inductance(state.psi_r.norm());
        let i_s = (state.psi_s - state.psi_r) / params.l_sgm;
        let i_r = state.psi_r / l_m - i_s;
        (i_s, i_r, l_m)
    }

    /// Currents, inductance and electromagnetic torque.
    fn magnetic(&self, state: &MotorState) -> Magnetic {
        let (i_s, i_r, l_m) = self.currents(state);
        let tau_m = 1.5 * self.parameters().p as f64 * (i_s * state.psi_s.conj()).im;
        Magnetic { i_s, i_r, l_m, tau_m }
    }

    /// Flux derivatives for stator voltage `u_s` (V) and rotor speed `w_m` (mechanical rad/s).
    fn derivatives(&self, state: &MotorState, u_s: Complex64, w_m: f64) -> (MotorState, Magnetic) {
        let params = self.parameters();
        let magnetic = self.magnetic(state);
        let w_r = params.p as f64 * w_m;

        let dpsi_s = u_s - params.r_s * magnetic.i_s;
        let dpsi_r = -params.r_r * magnetic.i_r + Complex64::i() * w_r * state.psi_r;

        (MotorState::new(dpsi_s, dpsi_r), magnetic)
    }
}

impl<M: InductionMotor + ?Sized> InductionMotor for Box<M> {
    fn parameters(&self) -> &MotorParameters {
        (**self).parameters()
    }

    fn magnetizing_inductance(&self, psi_m: f64) -> f64 {
        (**self).magnetizing_inductance(psi_m)
    }

    fn currents(&self, state: &MotorState) -> (Complex64, Complex64, f64) {
        (**self).currents(state)
    }
}

/// Induction motor with constant magnetizing inductance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motor {
    params: MotorParameters,
}

impl Motor {
    pub fn new(params: MotorParameters) -> Result<Self> {
        params.validate()?;
        Ok(Motor { params })
    }
}

impl InductionMotor for Motor {
    fn parameters(&self) -> &MotorParameters {
        &self.params
    }

    fn magnetizing_inductance(&self, _psi_m: f64) -> f64 {
        self.params.l_m
    }
}

impl Describe for Motor {
    fn describe(&self) -> Summary {
        Summary::new("Induction motor (inverse-Gamma model)")
            .with("p", self.params.p as f64, "")
            .with("R_s", self.params.r_s, "Ohm")
            .with("R_R", self.params.r_r, "Ohm")
            .with("L_sgm", self.params.l_sgm, "H")
            .with("L_M", self.params.l_m, "H")
    }
}

/// Gamma-model induction motor whose magnetizing inductance follows a
/// saturation curve of the stator flux magnitude.
///
/// `l_sgm` and `r_r` are Gamma-circuit values (leakage on the rotor side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorSaturated {
    params: MotorParameters,
    saturation: SaturationModel,
}

impl MotorSaturated {
    pub fn new(
        r_s: f64,
        r_r: f64,
        l_sgm: f64,
        saturation: SaturationModel,
        p: u32,
    ) -> Result<Self> {
        saturation.validate()?;
        let params = MotorParameters::new(r_s, r_r, l_sgm, saturation.l_unsat, p)?;
        Ok(MotorSaturated { params, saturation })
    }

    pub fn saturation(&self) -> &SaturationModel {
        &self.saturation
    }
}

impl InductionMotor for MotorSaturated {
    fn parameters(&self) -> &MotorParameters {
        &self.params
    }

    fn magnetizing_inductance(&self, psi_m: f64) -> f64 {
        self.saturation.inductance(psi_m)
    }

    fn currents(&self, state: &MotorState) -> (Complex64, Complex64, f64) {
        let l_m = self.magnetizing_inductance(state.psi_s.norm());
        let i_r = (state.psi_r - state.psi_s) / self.params.l_sgm;
        let i_s = state.psi_s / l_m - i_r;
        (i_s, i_r, l_m)
    }
}

impl Describe for MotorSaturated {
    fn describe(&self) -> Summary {
        let mut summary = Summary::new("Saturable induction motor (Gamma model)")
            .with("p", self.params.p as f64, "")
            .with("R_s", self.params.r_s, "Ohm")
            .with("R_R", self.params.r_r, "Ohm")
            .with("L_sgm", self.params.l_sgm, "H");
        summary.parameters.extend(self.saturation.describe().parameters);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn motor_45kw() -> Motor {
        Motor::new(MotorParameters::new(0.057, 0.029, 2.2e-3, 24.5e-3, 2).unwrap()).unwrap()
    }

    #[test]
    fn test_zero_state_is_equilibrium() {
        let motor = motor_45kw();
        let zero = Complex64::new(0.0, 0.0);
        let (d, magnetic) = motor.derivatives(&MotorState::default(), zero, 100.0);
        assert_eq!(d, MotorState::default());
        assert_eq!(magnetic.tau_m, 0.0);
    }

    #[test]
    fn test_flux_current_relation() {
        let motor = motor_45kw();
        let state = MotorState::new(Complex64::new(1.0, 0.2), Complex64::new(0.9, 0.1));
        let (i_s, i_r, l_m) = motor.currents(&state);

        // psi_s = L_sgm i_s + L_M (i_s + i_r), psi_r = L_M (i_s + i_r)
        let psi_r = l_m * (i_s + i_r);
        let psi_s = 2.2e-3 * i_s + psi_r;
        assert_relative_eq!(psi_r.re, state.psi_r.re, max_relative = 1e-12);
        assert_relative_eq!(psi_r.im, state.psi_r.im, max_relative = 1e-12);
        assert_relative_eq!(psi_s.re, state.psi_s.re, max_relative = 1e-12);
        assert_relative_eq!(psi_s.im, state.psi_s.im, max_relative = 1e-12);
    }

    #[test]
    fn test_torque_positive_when_stator_flux_leads() {
        let motor = motor_45kw();
        let lead = MotorState::new(Complex64::from_polar(1.0, 0.1), Complex64::new(0.95, 0.0));
        let lag = MotorState::new(Complex64::from_polar(1.0, -0.1), Complex64::new(0.95, 0.0));
        assert!(motor.magnetic(&lead).tau_m > 0.0);
        assert!(motor.magnetic(&lag).tau_m < 0.0);
        assert_relative_eq!(
            motor.magnetic(&lead).tau_m,
            -motor.magnetic(&lag).tau_m,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_torque_matches_rotor_flux_form() {
        // tau = 1.5 p Im(psi_s conj(psi_r)) / L_sgm in the inverse-Gamma model
        let motor = motor_45kw();
        let state = MotorState::new(Complex64::new(0.8, 0.6), Complex64::new(0.9, 0.2));
        let expected = 1.5 * 2.0 * (state.psi_s * state.psi_r.conj()).im / 2.2e-3;
        assert_relative_eq!(motor.magnetic(&state).tau_m, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_rotor_speed_rotates_rotor_flux() {
        let motor = motor_45kw();
        let state = MotorState::new(Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0));
        let (still, _) = motor.derivatives(&state, Complex64::new(0.0, 0.0), 0.0);
        let (moving, _) = motor.derivatives(&state, Complex64::new(0.0, 0.0), 10.0);
        // j * p * w_m * psi_r = j * 20
        assert_relative_eq!(moving.psi_r.im - still.psi_r.im, 20.0, max_relative = 1e-12);
        assert_eq!(moving.psi_s, still.psi_s);
    }

    #[test]
    fn test_saturated_motor_uses_stator_flux_magnitude() {
        let sat = SaturationModel::new(29.4e-3, 0.68, 6.5).unwrap();
        let motor = MotorSaturated::new(0.057, 0.034, 2.4e-3, sat, 2).unwrap();
        let state = MotorState::new(Complex64::new(0.0, 1.2), Complex64::new(1.0, 0.0));
        let (i_s, i_r, l_m) = motor.currents(&state);
        assert_eq!(l_m, sat.inductance(1.2));
        assert_eq!(motor.parameters().l_m, 29.4e-3);

        // Gamma circuit: psi_s = L_M (i_s + i_r), psi_r = psi_s + L_sgm i_r
        let psi_s = l_m * (i_s + i_r);
        let psi_r = psi_s + 2.4e-3 * i_r;
        assert_relative_eq!(psi_s.im, 1.2, max_relative = 1e-12);
        assert_relative_eq!(psi_r.re, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_saturated_no_load_current_is_magnetizing_current() {
        // At zero slip the rotor current vanishes and i_s = psi_s / L_M(|psi_s|)
        let sat = SaturationModel::new(29.4e-3, 0.68, 6.5).unwrap();
        let motor = MotorSaturated::new(0.057, 0.034, 2.4e-3, sat, 2).unwrap();
        let psi = Complex64::from_polar(0.955, 0.4);
        let magnetic = motor.magnetic(&MotorState::new(psi, psi));

        assert_eq!(magnetic.i_r, Complex64::new(0.0, 0.0));
        let i_m = 0.955 / sat.inductance(0.955);
        assert_relative_eq!(magnetic.i_s.norm(), i_m, max_relative = 1e-12);
        assert_relative_eq!(magnetic.i_s.norm(), 41.3, max_relative = 5e-3);
        assert!(magnetic.tau_m.abs() < 1e-9);
    }

    #[test]
    fn test_flat_saturation_matches_equivalent_inverse_gamma_motor() {
        // Gamma (L_M, L_sgm, R_R) maps to inverse-Gamma (g L_M, g L_sgm, g^2 R_R)
        // with g = L_M / (L_M + L_sgm) and the rotor flux scaled by g
        let (l_m, l_sgm, r_r) = (24.5e-3, 2.2e-3, 0.029);
        let g = l_m / (l_m + l_sgm);
        let sat = SaturationModel::new(l_m, 1.0, 1e12).unwrap();
        let gamma = MotorSaturated::new(0.057, r_r, l_sgm, sat, 2).unwrap();
        let params = MotorParameters::new(0.057, g * g * r_r, g * l_sgm, g * l_m, 2).unwrap();
        let inverse = Motor::new(params).unwrap();

        let psi_s = Complex64::new(1.1, -0.3);
        let psi_r = Complex64::new(1.0, -0.35);
        let u = Complex64::new(300.0, 50.0);
        let (d_gamma, m_gamma) = gamma.derivatives(&MotorState::new(psi_s, psi_r), u, 140.0);
        let (d_inverse, m_inverse) =
            inverse.derivatives(&MotorState::new(psi_s, g * psi_r), u, 140.0);

        assert_relative_eq!(m_gamma.i_s.re, m_inverse.i_s.re, max_relative = 1e-9);
        assert_relative_eq!(m_gamma.i_s.im, m_inverse.i_s.im, max_relative = 1e-9);
        assert_relative_eq!(m_gamma.tau_m, m_inverse.tau_m, max_relative = 1e-9);
        assert_relative_eq!(d_gamma.psi_s.re, d_inverse.psi_s.re, max_relative = 1e-9);
        assert_relative_eq!(g * d_gamma.psi_r.re, d_inverse.psi_r.re, max_relative = 1e-9);
        assert_relative_eq!(g * d_gamma.psi_r.im, d_inverse.psi_r.im, max_relative = 1e-9);
    }

    #[test]
    fn test_boxed_saturated_motor_keeps_gamma_solve() {
        let sat = SaturationModel::new(29.4e-3, 0.68, 6.5).unwrap();
        let motor = MotorSaturated::new(0.057, 0.034, 2.4e-3, sat, 2).unwrap();
        let boxed: Box<dyn InductionMotor> = Box::new(motor);
        let state = MotorState::new(Complex64::new(0.9, 0.1), Complex64::new(0.95, 0.0));
        assert_eq!(boxed.magnetic(&state), motor.magnetic(&state));
    }

    #[test]
    fn test_boxed_motor_delegates() {
        let boxed: Box<dyn InductionMotor> = Box::new(motor_45kw());
        let state = MotorState::new(Complex64::new(0.5, 0.5), Complex64::new(0.4, 0.4));
        assert_eq!(boxed.magnetic(&state), motor_45kw().magnetic(&state));
        assert_eq!(boxed.describe(), motor_45kw().describe());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(MotorParameters::new(0.0, 0.029, 2.2e-3, 24.5e-3, 2).is_err());
        assert!(MotorParameters::new(0.057, 0.029, -2.2e-3, 24.5e-3, 2).is_err());
        let err = MotorParameters::new(0.057, 0.029, 2.2e-3, 24.5e-3, 0).unwrap_err();
        assert!(err.to_string().contains("`p`"));
    }

    #[test]
    fn test_summary_lists_all_parameters() {
        let summary = motor_45kw().describe();
        for name in ["p", "R_s", "R_R", "L_sgm", "L_M"] {
            assert!(summary.get(name).is_some(), "missing {}", name);
        }
    }
}
