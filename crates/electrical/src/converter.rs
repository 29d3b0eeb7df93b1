//! Inverter models
//!
//! Both models realize a stator voltage reference from a DC link. References
//! outside the linear modulation range are scaled back onto its boundary
//! circle (`u_dc / sqrt(3)`); this is reported in the output, not treated as
//! an error.

use log::trace;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use simcore::{ensure_positive, Describe, Result, Summary};

use crate::pwm::{CarrierComparator, PwmParameters, SwitchingState};
use crate::space_vector::{clamp_magnitude, complex_to_abc, MAX_MODULATION_INDEX};

/// Time interval covered by one sample period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSpan {
    /// Absolute start time (s)
    pub t_start: f64,
    /// Length of the interval (s)
    pub duration: f64,
}

/// Constant stator voltage applied for `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageSegment {
    pub duration: f64,
    pub u_s: Complex64,
}

/// Voltage realized by a converter over one sample period.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterOutput {
    /// Piecewise-constant voltage in time order, durations sum to the period
    pub segments: Vec<VoltageSegment>,
    /// Reference after limiting (V)
    pub u_ref: Complex64,
    /// Average applied voltage over the period (V)
    pub u_s: Complex64,
    /// Whether the reference exceeded the achievable envelope
    pub clamped: bool,
    /// Switching state at the end of the period, switched models only
    pub q: Option<SwitchingState>,
}

pub trait Converter: Describe {
    /// DC-link voltage (V)
    fn dc_voltage(&self) -> f64;

    /// Replace the DC-link voltage, e.g. with a measured value.
    fn set_dc_voltage(&mut self, u_dc: f64) -> Result<()>;

    /// Largest realizable voltage magnitude (V)
    fn voltage_limit(&self) -> f64 {
        MAX_MODULATION_INDEX * self.dc_voltage()
    }

    /// Stator voltage realized from `u_ref` over `span`.
    fn realize(&self, u_ref: Complex64, span: SampleSpan) -> ConverterOutput;
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn dc_voltage(&self) -> f64 {
        (**self).dc_voltage()
    }

    fn set_dc_voltage(&mut self, u_dc: f64) -> Result<()> {
        (**self).set_dc_voltage(u_dc)
    }

    fn voltage_limit(&self) -> f64 {
        (**self).voltage_limit()
    }

    fn realize(&self, u_ref: Complex64, span: SampleSpan) -> ConverterOutput {
        (**self).realize(u_ref, span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InverterParameters {
    /// DC-link voltage (V)
    pub u_dc: f64,
}

fn limit_reference(u_ref: Complex64, limit: f64) -> (Complex64, bool) {
    let (u_lim, clamped) = clamp_magnitude(u_ref, limit);
    if clamped {
        trace!(
            "voltage reference {:.1} V limited to {:.1} V",
            u_ref.norm(),
            u_lim.norm()
        );
    }
    (u_lim, clamped)
}

/// Duty ratios of the three legs for a realizable reference, using the
/// symmetric (min-max) zero-sequence injection of space-vector PWM.
pub fn duty_ratios(u_s_ref: Complex64, u_dc: f64) -> [f64; 3] {
    let u_abc = complex_to_abc(u_s_ref);
    let u_max = u_abc[0].max(u_abc[1]).max(u_abc[2]);
    let u_min = u_abc[0].min(u_abc[1]).min(u_abc[2]);
    let u_0 = 0.5 * (u_max + u_min);
    u_abc.map(|u| ((u - u_0) / u_dc + 0.5).clamp(0.0, 1.0))
}

/// Averaged inverter: the applied voltage equals the limited reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverter {
    u_dc: f64,
}

impl Inverter {
    pub fn new(params: InverterParameters) -> Result<Self> {
        Ok(Inverter {
            u_dc: ensure_positive("u_dc", params.u_dc)?,
        })
    }
}

impl Converter for Inverter {
    fn dc_voltage(&self) -> f64 {
        self.u_dc
    }

    fn set_dc_voltage(&mut self, u_dc: f64) -> Result<()> {
        self.u_dc = ensure_positive("u_dc", u_dc)?;
        Ok(())
    }

    fn realize(&self, u_ref: Complex64, span: SampleSpan) -> ConverterOutput {
        let (u_lim, clamped) = limit_reference(u_ref, self.voltage_limit());
        ConverterOutput {
            segments: vec![VoltageSegment {
                duration: span.duration,
                u_s: u_lim,
            }],
            u_ref: u_lim,
            u_s: u_lim,
            clamped,
            q: None,
        }
    }
}

impl Describe for Inverter {
    fn describe(&self) -> Summary {
        Summary::new("Inverter (averaged)").with("u_dc", self.u_dc, "V")
    }
}

/// Inverter whose legs follow a carrier-comparison PWM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchedInverter {
    u_dc: f64,
    pwm: CarrierComparator,
}

impl SwitchedInverter {
    pub fn new(params: InverterParameters, pwm: PwmParameters) -> Result<Self> {
        Ok(SwitchedInverter {
            u_dc: ensure_positive("u_dc", params.u_dc)?,
            pwm: CarrierComparator::new(pwm)?,
        })
    }

    pub fn pwm(&self) -> &CarrierComparator {
        &self.pwm
    }
}

impl Converter for SwitchedInverter {
    fn dc_voltage(&self) -> f64 {
        self.u_dc
    }

    fn set_dc_voltage(&mut self, u_dc: f64) -> Result<()> {
        self.u_dc = ensure_positive("u_dc", u_dc)?;
        Ok(())
    }

    fn realize(&self, u_ref: Complex64, span: SampleSpan) -> ConverterOutput {
        let (u_lim, clamped) = limit_reference(u_ref, self.voltage_limit());
        let d_abc = self.pwm.quantize(duty_ratios(u_lim, self.u_dc));

        let segments: Vec<VoltageSegment> = self
            .pwm
            .segments(d_abc, span.t_start, span.duration)
            .into_iter()
            .map(|(duration, q)| VoltageSegment {
                duration,
                u_s: q.space_vector(self.u_dc),
            })
            .collect();

        let volt_seconds: Complex64 = segments.iter().map(|s| s.u_s * s.duration).sum();
        let q = self.pwm.compare(d_abc, span.t_start + span.duration);

        ConverterOutput {
            segments,
            u_ref: u_lim,
            u_s: volt_seconds / span.duration,
            clamped,
            q: Some(q),
        }
    }
}

impl Describe for SwitchedInverter {
    fn describe(&self) -> Summary {
        let mut summary =
            Summary::new("Inverter (carrier-comparison PWM)").with("u_dc", self.u_dc, "V");
        summary.parameters.extend(self.pwm.describe().parameters);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space_vector::abc_to_complex;
    use approx::assert_abs_diff_eq;

    const U_DC: f64 = 540.0;
    const T_S: f64 = 250e-6;

    fn switched_inverter() -> SwitchedInverter {
        let pwm = PwmParameters::new(2.0 * T_S);
        SwitchedInverter::new(InverterParameters { u_dc: U_DC }, pwm).unwrap()
    }

    fn span(k: u32) -> SampleSpan {
        SampleSpan {
            t_start: k as f64 * T_S,
            duration: T_S,
        }
    }

    #[test]
    fn test_averaged_passes_realizable_reference() {
        let inverter = Inverter::new(InverterParameters { u_dc: U_DC }).unwrap();
        let u_ref = Complex64::new(200.0, -100.0);
        let out = inverter.realize(u_ref, span(0));

        assert!(!out.clamped);
        assert_eq!(out.u_s, u_ref);
        assert_eq!(out.segments.len(), 1);
        assert_eq!(out.segments[0].duration, T_S);
    }

    #[test]
    fn test_averaged_clamps_to_envelope() {
        let inverter = Inverter::new(InverterParameters { u_dc: U_DC }).unwrap();
        let u_ref = Complex64::from_polar(1e6, 0.7);
        let out = inverter.realize(u_ref, span(3));

        assert!(out.clamped);
        assert_abs_diff_eq!(out.u_s.norm(), U_DC / 3f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(out.u_s.arg(), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_duty_ratios_realize_reference() {
        let u_ref = Complex64::from_polar(300.0, 1.1);
        let d = duty_ratios(u_ref, U_DC);
        assert!(d.iter().all(|&x| (0.0..=1.0).contains(&x)));

        // Leg voltages d*u_dc reproduce the reference up to a common mode
        let u = abc_to_complex(d.map(|x| x * U_DC));
        assert_abs_diff_eq!(u.re, u_ref.re, epsilon = 1e-9);
        assert_abs_diff_eq!(u.im, u_ref.im, epsilon = 1e-9);
    }

    #[test]
    fn test_duty_ratios_at_envelope_stay_in_range() {
        for i in 0..36 {
            let u_ref = Complex64::from_polar(U_DC / 3f64.sqrt(), i as f64 * 10f64.to_radians());
            let d = duty_ratios(u_ref, U_DC);
            assert!(d.iter().all(|&x| (-1e-12..=1.0 + 1e-12).contains(&x)));
        }
    }

    #[test]
    fn test_switched_average_matches_averaged_model() {
        // One sample per carrier half-period: volt-seconds match exactly
        let averaged = Inverter::new(InverterParameters { u_dc: U_DC }).unwrap();
        let switched = switched_inverter();
        let u_ref = Complex64::from_polar(250.0, -2.0);

        for k in 0..4 {
            let avg = averaged.realize(u_ref, span(k));
            let sw = switched.realize(u_ref, span(k));
            let total: f64 = sw.segments.iter().map(|s| s.duration).sum();

            assert_abs_diff_eq!(total, T_S, epsilon = 1e-15);
            assert_abs_diff_eq!(sw.u_s.re, avg.u_s.re, epsilon = 1e-6);
            assert_abs_diff_eq!(sw.u_s.im, avg.u_s.im, epsilon = 1e-6);
            assert!(sw.segments.len() > 1);
            assert!(sw.q.is_some());
        }
    }

    #[test]
    fn test_switched_segments_are_inverter_vectors() {
        let switched = switched_inverter();
        let out = switched.realize(Complex64::from_polar(150.0, 0.4), span(1));
        for segment in &out.segments {
            let magnitude = segment.u_s.norm();
            let active = (magnitude - 2.0 / 3.0 * U_DC).abs() < 1e-9;
            let zero = magnitude < 1e-9;
            assert!(active || zero, "unexpected vector magnitude {}", magnitude);
        }
    }

    #[test]
    fn test_switched_clamps_like_averaged() {
        let switched = switched_inverter();
        let out = switched.realize(Complex64::new(0.0, 5e3), span(0));
        assert!(out.clamped);
        assert_abs_diff_eq!(out.u_ref.norm(), U_DC / 3f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_measured_dc_link() {
        let mut inverter: Box<dyn Converter> =
            Box::new(Inverter::new(InverterParameters { u_dc: U_DC }).unwrap());
        inverter.set_dc_voltage(500.0).unwrap();
        assert_eq!(inverter.dc_voltage(), 500.0);
        assert!(inverter.set_dc_voltage(-1.0).is_err());
        assert_eq!(inverter.dc_voltage(), 500.0);
    }

    #[test]
    fn test_rejects_non_positive_dc_link() {
        assert!(Inverter::new(InverterParameters { u_dc: 0.0 }).is_err());
        let pwm = PwmParameters::new(1e-4);
        assert!(SwitchedInverter::new(InverterParameters { u_dc: -5.0 }, pwm).is_err());
    }
}
