//! Drive configuration
//!
//! Bundles every construction input of a drive in one serde-friendly
//! structure. Optional subsystems (saturation, PWM) are chosen here once;
//! `build` resolves them into concrete model variants.

use electrical::{
    Converter, InductionMotor, Inverter, InverterParameters, Motor, MotorParameters, MotorSaturated,
    PwmParameters, SaturationModel, SwitchedInverter,
};
use mechanics::{MechanicalParameters, Mechanics};
use serde::{Deserialize, Serialize};
use simcore::{IntegrationMethod, Result};

use crate::drive::Drive;

/// Drive assembled from a `DriveConfig`.
pub type ConfiguredDrive = Drive<Box<dyn InductionMotor>, Box<dyn Converter>, IntegrationMethod>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnetizingInductance {
    /// Constant inductance (H)
    Constant(f64),
    /// Main-flux saturation curve
    Saturated(SaturationModel),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub r_s: f64,
    pub r_r: f64,
    pub l_sgm: f64,
    pub l_m: MagnetizingInductance,
    pub p: u32,
}

impl MotorConfig {
    pub fn build(&self) -> Result<Box<dyn InductionMotor>> {
        Ok(match self.l_m {
            MagnetizingInductance::Constant(l_m) => Box::new(Motor::new(MotorParameters::new(
                self.r_s, self.r_r, self.l_sgm, l_m, self.p,
            )?)?),
            MagnetizingInductance::Saturated(saturation) => Box::new(MotorSaturated::new(
                self.r_s,
                self.r_r,
                self.l_sgm,
                saturation,
                self.p,
            )?),
        })
    }
}

fn default_delay_length() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Sample period (s)
    pub sample_period: f64,
    /// Computational delay (sample periods)
    #[serde(default = "default_delay_length")]
    pub delay_length: usize,
    pub motor: MotorConfig,
    pub mechanics: MechanicalParameters,
    pub converter: InverterParameters,
    /// Carrier comparison; `None` uses the averaged inverter
    #[serde(default)]
    pub pwm: Option<PwmParameters>,
    #[serde(default)]
    pub integrator: IntegrationMethod,
}

impl DriveConfig {
    /// 45-kW, 400-V, 4-pole induction motor drive (inverse-Gamma parameters).
    pub fn im_45kw() -> Self {
        DriveConfig {
            sample_period: 250e-6,
            delay_length: 1,
            motor: MotorConfig {
                r_s: 0.057,
                r_r: 0.029,
                l_sgm: 2.2e-3,
                l_m: MagnetizingInductance::Constant(24.5e-3),
                p: 2,
            },
            mechanics: MechanicalParameters { j: 1.66 * 0.49, b: 0.0 },
            converter: InverterParameters { u_dc: 540.0 },
            pwm: None,
            integrator: IntegrationMethod::RungeKutta4,
        }
    }

    /// The same drive with main-flux saturation, in Gamma-model parameters.
    pub fn im_45kw_saturated() -> Self {
        let mut config = Self::im_45kw();
        config.motor = MotorConfig {
            r_s: 0.057,
            r_r: 0.034,
            l_sgm: 2.4e-3,
            l_m: MagnetizingInductance::Saturated(SaturationModel {
                l_unsat: 29.4e-3,
                beta: 0.68,
                s: 6.5,
            }),
            p: 2,
        };
        config
    }

    /// Enable carrier comparison with the given parameters (builder pattern)
    pub fn with_pwm(mut self, pwm: PwmParameters) -> Self {
        self.pwm = Some(pwm);
        self
    }

    /// Enable carrier comparison with one sample per carrier half-period and
    /// 12-bit duty-ratio resolution.
    pub fn with_default_pwm(self) -> Self {
        let pwm = PwmParameters::new(2.0 * self.sample_period).with_resolution(1 << 12);
        self.with_pwm(pwm)
    }

    pub fn with_delay(mut self, delay_length: usize) -> Self {
        self.delay_length = delay_length;
        self
    }

    pub fn with_integrator(mut self, integrator: IntegrationMethod) -> Self {
        self.integrator = integrator;
        self
    }

    /// Validate every parameter and assemble the drive.
    pub fn build(&self) -> Result<ConfiguredDrive> {
        let motor = self.motor.build()?;
        let mechanics = Mechanics::new(self.mechanics)?;
        let converter: Box<dyn Converter> = match self.pwm {
            Some(pwm) => Box::new(SwitchedInverter::new(self.converter, pwm)?),
            None => Box::new(Inverter::new(self.converter)?),
        };
        Drive::new(
            motor,
            mechanics,
            converter,
            self.delay_length,
            self.sample_period,
            self.integrator,
        )
    }
}
