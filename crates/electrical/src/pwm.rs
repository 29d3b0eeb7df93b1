//! Carrier-comparison PWM
//!
//! A symmetric triangular carrier is compared against the duty-ratio
//! references of the three inverter legs. The carrier is a function of
//! absolute simulation time, so it runs freely across sample periods and
//! the switching instants do not depend on how the caller slices time.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use simcore::{ensure_positive, Describe, Result, SimError, Summary};

use crate::space_vector::abc_to_complex;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PwmParameters {
    /// Carrier period (s)
    pub switching_period: f64,
    /// Duty-ratio quantization steps per unit, `None` compares exact duty ratios
    #[serde(default)]
    pub resolution: Option<u32>,
}

impl PwmParameters {
    pub fn new(switching_period: f64) -> Self {
        PwmParameters {
            switching_period,
            resolution: None,
        }
    }

    /// Quantize duty ratios to `steps` counts (builder pattern)
    pub fn with_resolution(mut self, steps: u32) -> Self {
        self.resolution = Some(steps);
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("T_sw", self.switching_period)?;
        if self.resolution == Some(0) {
            return Err(SimError::InvalidConfig(
                "PWM resolution must be at least one count".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upper-switch state of the three inverter legs (`true` = upper switch on).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchingState(pub [bool; 3]);

impl SwitchingState {
    /// Leg voltages with respect to the DC-link midpoint, `+-u_dc/2`.
    pub fn leg_voltages(&self, u_dc: f64) -> [f64; 3] {
        self.0.map(|on| if on { 0.5 * u_dc } else { -0.5 * u_dc })
    }

    /// Stator voltage vector produced by this state.
    pub fn space_vector(&self, u_dc: f64) -> Complex64 {
        abc_to_complex(self.leg_voltages(u_dc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierComparator {
    params: PwmParameters,
}

impl CarrierComparator {
    pub fn new(params: PwmParameters) -> Result<Self> {
        params.validate()?;
        Ok(CarrierComparator { params })
    }

    pub fn parameters(&self) -> &PwmParameters {
        &self.params
    }

    /// Carrier value in [0, 1] at time `t`; 0 at the start of each period, 1 halfway.
    pub fn carrier(&self, t: f64) -> f64 {
        let phase = t / self.params.switching_period;
        let f = phase - phase.floor();
        if f < 0.5 { 2.0 * f } else { 2.0 - 2.0 * f }
    }

    /// Apply the configured duty-ratio quantization.
    pub fn quantize(&self, d_abc: [f64; 3]) -> [f64; 3] {
        match self.params.resolution {
            Some(steps) => {
                let n = steps as f64;
                d_abc.map(|d| (d * n).round() / n)
            }
            None => d_abc,
        }
    }

    /// Switching state at time `t` for duty ratios `d_abc`.
    pub fn compare(&self, d_abc: [f64; 3], t: f64) -> SwitchingState {
        let c = self.carrier(t);
        SwitchingState(d_abc.map(|d| d > c))
    }

    /// Piecewise-constant switching sequence over `[t_start, t_start + duration)`.
    ///
    /// Returns `(segment duration, state)` pairs in time order. Neighbouring
    /// segments never share a state and the durations sum to `duration`.
    pub fn segments(
        &self,
        d_abc: [f64; 3],
        t_start: f64,
        duration: f64,
    ) -> Vec<(f64, SwitchingState)> {
        let t_sw = self.params.switching_period;
        let p_start = t_start / t_sw;
        let p_end = (t_start + duration) / t_sw;

        // Cut points in carrier phase: linear-piece boundaries and crossings
        let mut cuts = vec![p_start];
        let mut p = p_start;
        while p < p_end {
            let half = (2.0 * p).floor();
            let next = (0.5 * (half + 1.0)).min(p_end);
            let rising = half.rem_euclid(2.0) == 0.0;
            let carrier_at = |q: f64| {
                let x = 2.0 * (q - 0.5 * half);
                if rising { x } else { 1.0 - x }
            };

            let (c_a, c_b) = (carrier_at(p), carrier_at(next));
            for d in d_abc {
                if d > c_a.min(c_b) && d < c_a.max(c_b) {
                    cuts.push(p + (d - c_a) / (c_b - c_a) * (next - p));
                }
            }
            cuts.push(next);
            p = next;
        }

        let mut times: Vec<f64> = cuts
            .iter()
            .map(|&q| ((q - p_start) * t_sw).clamp(0.0, duration))
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup();
        if let Some(last) = times.last_mut() {
            *last = duration;
        }

        let mut segments: Vec<(f64, SwitchingState)> = Vec::with_capacity(times.len());
        for pair in times.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b <= a {
                continue;
            }
            let state = self.compare(d_abc, t_start + 0.5 * (a + b));
            if let Some((length, previous)) = segments.last_mut() {
                if *previous == state {
                    *length += b - a;
                    continue;
                }
            }
            segments.push((b - a, state));
        }
        segments
    }
}

impl Describe for CarrierComparator {
    fn describe(&self) -> Summary {
        let summary = Summary::new("PWM model").with("T_sw", self.params.switching_period, "s");
        match self.params.resolution {
            Some(steps) => summary.with("N", steps as f64, "counts"),
            None => summary,
        }
    }
}
