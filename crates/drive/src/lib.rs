//! Induction motor drive simulation
//!
//! This crate ties the electrical and mechanical models together:
//! - `Delay` models the computational latency of a digital controller
//! - `Drive` advances converter, motor and mechanics once per sample period
//! - `Datalogger` keeps the per-sample record of a run
//! - `DriveConfig` builds a drive from (de)serializable parameters

pub mod config;
pub mod datalog;
pub mod delay;
pub mod drive;

pub use config::{ConfiguredDrive, DriveConfig, MagnetizingInductance, MotorConfig};
pub use datalog::{DatalogEntry, DatalogSeries, Datalogger};
pub use delay::Delay;
pub use drive::{Drive, StateVector, STATES};
