//! Drive orchestrator
//!
//! Advances the converter, motor and mechanics in lockstep at a fixed sample
//! period. Each step takes the delayed voltage command, lets the converter
//! realize it as piecewise-constant voltage segments, integrates the coupled
//! electrical and mechanical state across every segment and records the
//! result.

use log::{debug, warn};
use mechanics::rotor::wrap_angle;
use mechanics::{MechanicalState, Mechanics};
use nalgebra::SVector;
use num_complex::Complex64;
use simcore::{
    ensure_finite, ensure_positive, Describe, Integrator, Model, Result, RungeKutta4, SimContext,
    SimError, Summary,
};

use electrical::{Converter, InductionMotor, MotorState, SampleSpan};

use crate::datalog::{DatalogEntry, Datalogger};
use crate::delay::Delay;

/// Length of the integrated state `[psi_s, psi_r, w_m, theta_m]`.
pub const STATES: usize = 6;

pub type StateVector = SVector<f64, STATES>;

fn pack(motor: &MotorState, mech: &MechanicalState) -> StateVector {
    StateVector::from([
        motor.psi_s.re,
        motor.psi_s.im,
        motor.psi_r.re,
        motor.psi_r.im,
        mech.w_m,
        mech.theta_m,
    ])
}

fn unpack(x: &StateVector) -> (MotorState, MechanicalState) {
    (
        MotorState::new(Complex64::new(x[0], x[1]), Complex64::new(x[2], x[3])),
        MechanicalState {
            w_m: x[4],
            theta_m: x[5],
        },
    )
}

pub struct Drive<M, C, I = RungeKutta4> {
    motor: M,
    mechanics: Mechanics,
    converter: C,
    integrator: I,
    delay: Delay<Complex64>,
    datalog: Datalogger,
    sample_period: f64,
    /// Completed sample periods
    steps: u64,
    motor_state: MotorState,
    mech_state: MechanicalState,
    initial_state: (MotorState, MechanicalState),
}

impl<M, C, I> Drive<M, C, I>
where
    M: InductionMotor,
    C: Converter,
    I: Integrator<STATES>,
{
    pub fn new(
        motor: M,
        mechanics: Mechanics,
        converter: C,
        delay_length: usize,
        sample_period: f64,
        integrator: I,
    ) -> Result<Self> {
        let sample_period = ensure_positive("T_s", sample_period)?;
        debug!(
            "drive assembled: T_s = {} s, delay = {} samples, u_dc = {} V",
            sample_period,
            delay_length,
            converter.dc_voltage()
        );

        Ok(Drive {
            motor,
            mechanics,
            converter,
            integrator,
            delay: Delay::new(delay_length),
            datalog: Datalogger::new(),
            sample_period,
            steps: 0,
            motor_state: MotorState::default(),
            mech_state: MechanicalState::default(),
            initial_state: (MotorState::default(), MechanicalState::default()),
        })
    }

    /// Start from the given flux linkages and rotor state instead of rest.
    pub fn with_initial_state(
        mut self,
        motor_state: MotorState,
        mech_state: MechanicalState,
    ) -> Self {
        let mech_state = MechanicalState::new(mech_state.w_m, mech_state.theta_m);
        self.initial_state = (motor_state, mech_state);
        self.motor_state = motor_state;
        self.mech_state = mech_state;
        self
    }

    /// Advance the drive by one sample period.
    ///
    /// `u_ref` is the stator voltage reference produced by the controller for
    /// this sample; it reaches the converter after the computational delay.
    /// `tau_l` is the load torque during the period.
    ///
    /// On error nothing is committed: time, state, delay and log are left as
    /// they were before the call.
    pub fn step(&mut self, u_ref: Complex64, tau_l: f64) -> Result<()> {
        let t = self.time();
        if !u_ref.is_finite() {
            return Err(SimError::Divergence {
                quantity: "voltage reference",
                time: t,
            });
        }
        ensure_finite("load torque", tau_l, t)?;

        let u_cmd = self.delay.peek(u_ref);
        let span = SampleSpan {
            t_start: t,
            duration: self.sample_period,
        };
        let output = self.converter.realize(u_cmd, span);

        let motor = &self.motor;
        let mechanics = &self.mechanics;
        let mut x = pack(&self.motor_state, &self.mech_state);
        let mut t_segment = t;
        for segment in &output.segments {
            if !segment.u_s.is_finite() {
                return Err(SimError::Divergence {
                    quantity: "applied voltage",
                    time: t_segment,
                });
            }
            let u_s = segment.u_s;
            let mut f = |_t: f64, x: &StateVector| {
                let (motor_state, mech_state) = unpack(x);
                let (d_motor, magnetic) = motor.derivatives(&motor_state, u_s, mech_state.w_m);
                let d_mech = mechanics.derivatives(&mech_state, magnetic.tau_m, tau_l);
                pack(&d_motor, &d_mech)
            };
            x = self.integrator.step(&SimContext::new(t_segment, segment.duration), &x, &mut f);
            t_segment += segment.duration;
        }

        let t_end = (self.steps + 1) as f64 * self.sample_period;
        let (motor_state, mut mech_state) = unpack(&x);
        if !motor_state.is_finite() {
            warn!("flux linkage diverged at t = {} s, step rejected", t_end);
            return Err(SimError::Divergence {
                quantity: "flux linkage",
                time: t_end,
            });
        }
        if !mech_state.is_finite() {
            warn!("rotor speed diverged at t = {} s, step rejected", t_end);
            return Err(SimError::Divergence {
                quantity: "rotor speed",
                time: t_end,
            });
        }
        let magnetic = self.motor.magnetic(&motor_state);
        if !magnetic.i_s.is_finite() || !magnetic.tau_m.is_finite() {
            warn!("motor currents diverged at t = {} s, step rejected", t_end);
            return Err(SimError::Divergence {
                quantity: "stator current",
                time: t_end,
            });
        }
        mech_state.theta_m = wrap_angle(mech_state.theta_m);

        self.delay.push(u_ref);
        self.motor_state = motor_state;
        self.mech_state = mech_state;
        self.steps += 1;
        self.datalog.record(DatalogEntry {
            t: t_end,
            u_in: u_ref,
            u_cmd,
            u_ref: output.u_ref,
            u_s: output.u_s,
            clamped: output.clamped,
            u_dc: self.converter.dc_voltage(),
            psi_s: motor_state.psi_s,
            psi_r: motor_state.psi_r,
            i_s: magnetic.i_s,
            i_r: magnetic.i_r,
            l_m: magnetic.l_m,
            tau_m: magnetic.tau_m,
            tau_l,
            w_m: mech_state.w_m,
            theta_m: mech_state.theta_m,
            q: output.q,
        });
        Ok(())
    }

    /// Run `steps` sample periods, asking `input` for the voltage reference
    /// and load torque at the start of each period.
    pub fn run<F>(&mut self, steps: usize, mut input: F) -> Result<()>
    where
        F: FnMut(f64) -> (Complex64, f64),
    {
        for _ in 0..steps {
            let (u_ref, tau_l) = input(self.time());
            self.step(u_ref, tau_l)?;
        }
        Ok(())
    }

    /// Summaries of every configured component.
    pub fn describe_all(&self) -> Vec<Summary> {
        vec![
            Summary::new("Sampling").with("T_s", self.sample_period, "s"),
            self.delay.describe(),
            self.converter.describe(),
            self.motor.describe(),
            self.mechanics.describe(),
        ]
    }
}

impl<M, C, I> Drive<M, C, I> {
    /// Simulation time at the start of the next step (s)
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.sample_period
    }

    /// Number of completed steps
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }

    pub fn motor_state(&self) -> &MotorState {
        &self.motor_state
    }

    pub fn mechanical_state(&self) -> &MechanicalState {
        &self.mech_state
    }

    pub fn motor(&self) -> &M {
        &self.motor
    }

    pub fn mechanics(&self) -> &Mechanics {
        &self.mechanics
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Mutable converter access between steps, e.g. to update a measured DC link.
    pub fn converter_mut(&mut self) -> &mut C {
        &mut self.converter
    }

    pub fn delay_length(&self) -> usize {
        self.delay.length()
    }

    pub fn datalog(&self) -> &Datalogger {
        &self.datalog
    }

    pub fn into_datalog(self) -> Datalogger {
        self.datalog
    }
}

impl<M, C, I> Model for Drive<M, C, I> {
    fn reset(&mut self) {
        let (motor_state, mech_state) = self.initial_state;
        self.motor_state = motor_state;
        self.mech_state = mech_state;
        self.steps = 0;
        self.delay.reset();
        self.datalog.reset();
    }
}
