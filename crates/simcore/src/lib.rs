//! Shared simulation plumbing for the drive model crates.
//!
//! This crate provides:
//! - the `Model` trait and `SimContext` passed between components
//! - `SimError` and the parameter validation helpers
//! - fixed-step integrators over `nalgebra` state vectors
//! - structured parameter summaries for the reporting layer

pub mod error;
pub mod integrators;
pub mod summary;
pub mod traits;

pub use error::{ensure_finite, ensure_non_negative, ensure_positive, Result, SimError};
pub use integrators::{ForwardEuler, IntegrationMethod, Integrator, RungeKutta4};
pub use summary::{Describe, Parameter, Summary};
pub use traits::*;
