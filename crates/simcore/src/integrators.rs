use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::SimContext;

/// Derivative function of an autonomous or time-varying system, `dx/dt = f(t, x)`.
pub type Derivative<'a, const N: usize> = dyn FnMut(f64, &SVector<f64, N>) -> SVector<f64, N> + 'a;

/// A fixed-step integration strategy.
///
/// The step size and the evaluation points are fully determined by `ctx`,
/// so two runs with the same inputs produce bit-identical trajectories.
pub trait Integrator<const N: usize> {
    /// Advances `x` from `ctx.t` to `ctx.t + ctx.dt`.
    fn step(
        &self,
        ctx: &SimContext,
        x: &SVector<f64, N>,
        f: &mut Derivative<'_, N>,
    ) -> SVector<f64, N>;
}

/// Explicit (forward) Euler integrator.
/// First-order accurate; one derivative evaluation per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardEuler;

impl<const N: usize> Integrator<N> for ForwardEuler {
    fn step(
        &self,
        ctx: &SimContext,
        x: &SVector<f64, N>,
        f: &mut Derivative<'_, N>,
    ) -> SVector<f64, N> {
        x + f(ctx.t, x) * ctx.dt
    }
}

/// Classic fourth-order Runge-Kutta integrator.
/// Evaluates the derivative at the start, twice at the midpoint and at the end of the step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RungeKutta4;

impl<const N: usize> Integrator<N> for RungeKutta4 {
    fn step(
        &self,
        ctx: &SimContext,
        x: &SVector<f64, N>,
        f: &mut Derivative<'_, N>,
    ) -> SVector<f64, N> {
        let h = ctx.dt;
        let t = ctx.t;

        let k1 = f(t, x);
        let k2 = f(t + 0.5 * h, &(x + k1 * (0.5 * h)));
        let k3 = f(t + 0.5 * h, &(x + k2 * (0.5 * h)));
        let k4 = f(t + h, &(x + k3 * h));

        x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
    }
}

/// Integration rule selected by a configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    ForwardEuler,
    #[default]
    RungeKutta4,
}

impl<const N: usize> Integrator<N> for IntegrationMethod {
    fn step(
        &self,
        ctx: &SimContext,
        x: &SVector<f64, N>,
        f: &mut Derivative<'_, N>,
    ) -> SVector<f64, N> {
        match self {
            IntegrationMethod::ForwardEuler => ForwardEuler.step(ctx, x, f),
            IntegrationMethod::RungeKutta4 => RungeKutta4.step(ctx, x, f),
        }
    }
}
