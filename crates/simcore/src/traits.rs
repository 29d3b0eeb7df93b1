/// Timing information for one evaluation of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimContext {
    /// Step size (s)
    pub dt: f64,
    /// Time at the start of the step (s)
    pub t: f64,
}

impl SimContext {
    pub fn new(t: f64, dt: f64) -> Self {
        SimContext { dt, t }
    }

    /// Time at the end of the step
    pub fn t_end(&self) -> f64 {
        self.t + self.dt
    }
}

pub trait Model {
    /// Restore the state the model had right after construction.
    fn reset(&mut self);
}
