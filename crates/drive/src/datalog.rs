//! Run-time recording of the drive state
//!
//! One entry per sample period, appended in time order. The recorded
//! sequence is what plotting and analysis consume after a run.

use electrical::SwitchingState;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use simcore::Model;
use std::io::{self, Write};

/// Snapshot of one sample period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatalogEntry {
    /// Time at the end of the sample period (s)
    pub t: f64,
    /// Voltage reference passed to the step (V)
    pub u_in: Complex64,
    /// Delayed command handed to the converter, before limiting (V)
    pub u_cmd: Complex64,
    /// Command after limiting to the converter envelope (V)
    pub u_ref: Complex64,
    /// Average stator voltage applied during the period (V)
    pub u_s: Complex64,
    /// Reference exceeded the converter envelope
    pub clamped: bool,
    /// DC-link voltage (V)
    pub u_dc: f64,
    /// Stator flux linkage (Vs)
    pub psi_s: Complex64,
    /// Rotor flux linkage (Vs)
    pub psi_r: Complex64,
    /// Stator current (A)
    pub i_s: Complex64,
    /// Rotor current (A)
    pub i_r: Complex64,
    /// Magnetizing inductance (H)
    pub l_m: f64,
    /// Electromagnetic torque (Nm)
    pub tau_m: f64,
    /// Load torque (Nm)
    pub tau_l: f64,
    /// Rotor speed (mechanical rad/s)
    pub w_m: f64,
    /// Rotor angle (mechanical rad)
    pub theta_m: f64,
    /// Switching state at the end of the period, PWM models only
    pub q: Option<SwitchingState>,
}

/// Column view of a log, convenient for plotting and numerical analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatalogSeries {
    pub t: Vec<f64>,
    pub u_in: Vec<Complex64>,
    pub u_cmd: Vec<Complex64>,
    pub u_ref: Vec<Complex64>,
    pub u_s: Vec<Complex64>,
    pub clamped: Vec<bool>,
    pub u_dc: Vec<f64>,
    pub psi_s: Vec<Complex64>,
    pub psi_r: Vec<Complex64>,
    pub i_s: Vec<Complex64>,
    pub i_r: Vec<Complex64>,
    pub l_m: Vec<f64>,
    pub tau_m: Vec<f64>,
    pub tau_l: Vec<f64>,
    pub w_m: Vec<f64>,
    pub theta_m: Vec<f64>,
}

/// Append-only log of a simulation run
#[derive(Debug, Clone, Default)]
pub struct Datalogger {
    entries: Vec<DatalogEntry>,
}

impl Datalogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: DatalogEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DatalogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&DatalogEntry> {
        self.entries.last()
    }

    pub fn into_entries(self) -> Vec<DatalogEntry> {
        self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Split the log into columns.
    pub fn series(&self) -> DatalogSeries {
        let n = self.entries.len();
        let mut series = DatalogSeries {
            t: Vec::with_capacity(n),
            u_in: Vec::with_capacity(n),
            u_cmd: Vec::with_capacity(n),
            u_ref: Vec::with_capacity(n),
            u_s: Vec::with_capacity(n),
            clamped: Vec::with_capacity(n),
            u_dc: Vec::with_capacity(n),
            psi_s: Vec::with_capacity(n),
            psi_r: Vec::with_capacity(n),
            i_s: Vec::with_capacity(n),
            i_r: Vec::with_capacity(n),
            l_m: Vec::with_capacity(n),
            tau_m: Vec::with_capacity(n),
            tau_l: Vec::with_capacity(n),
            w_m: Vec::with_capacity(n),
            theta_m: Vec::with_capacity(n),
        };
        for e in &self.entries {
            series.t.push(e.t);
            series.u_in.push(e.u_in);
            series.u_cmd.push(e.u_cmd);
            series.u_ref.push(e.u_ref);
            series.u_s.push(e.u_s);
            series.clamped.push(e.clamped);
            series.u_dc.push(e.u_dc);
            series.psi_s.push(e.psi_s);
            series.psi_r.push(e.psi_r);
            series.i_s.push(e.i_s);
            series.i_r.push(e.i_r);
            series.l_m.push(e.l_m);
            series.tau_m.push(e.tau_m);
            series.tau_l.push(e.tau_l);
            series.w_m.push(e.w_m);
            series.theta_m.push(e.theta_m);
        }
        series
    }

    /// Write the log as comma-separated values, one row per entry.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(
            out,
            "t,u_in_re,u_in_im,u_cmd_re,u_cmd_im,u_ref_re,u_ref_im,u_s_re,u_s_im,clamped,u_dc,\
             psi_s_re,psi_s_im,psi_r_re,psi_r_im,i_s_re,i_s_im,i_r_re,i_r_im,l_m,\
             tau_m,tau_l,w_m,theta_m,q_a,q_b,q_c"
        )?;
        for e in &self.entries {
            let q = e
                .q
                .map(|q| q.0.map(|on| if on { "1" } else { "0" }))
                .unwrap_or(["", "", ""]);
            write!(out, "{:.6}", e.t)?;
            for x in [e.u_in, e.u_cmd, e.u_ref, e.u_s] {
                write!(out, ",{:.6},{:.6}", x.re, x.im)?;
            }
            write!(out, ",{},{:.6}", e.clamped as u8, e.u_dc)?;
            for x in [e.psi_s, e.psi_r, e.i_s, e.i_r] {
                write!(out, ",{:.6},{:.6}", x.re, x.im)?;
            }
            writeln!(
                out,
                ",{:.6e},{:.6},{:.6},{:.6},{:.6},{},{},{}",
                e.l_m, e.tau_m, e.tau_l, e.w_m, e.theta_m, q[0], q[1], q[2]
            )?;
        }
        Ok(())
    }
}

impl Model for Datalogger {
    fn reset(&mut self) {
        self.clear();
    }
}
