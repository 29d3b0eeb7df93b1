use serde::{Deserialize, Serialize};
use simcore::{ensure_positive, Describe, Result, Summary};

/// Main-flux saturation curve.
///
/// `L_M(psi) = L_unsat / (1 + (|psi| / S)^beta)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationModel {
    /// Unsaturated magnetizing inductance (H)
    pub l_unsat: f64,
    /// Shape exponent
    pub beta: f64,
    /// Saturation flux scale (Vs)
    pub s: f64,
}

impl SaturationModel {
    pub fn new(l_unsat: f64, beta: f64, s: f64) -> Result<Self> {
        let model = SaturationModel { l_unsat, beta, s };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("L_unsat", self.l_unsat)?;
        ensure_positive("beta", self.beta)?;
        ensure_positive("S", self.s)?;
        Ok(())
    }

    /// Magnetizing inductance at flux magnitude `psi` (Vs).
    ///
    /// Never below `f64::MIN_POSITIVE`, even where the power term overflows.
    pub fn inductance(&self, psi: f64) -> f64 {
        let l_m = self.l_unsat / (1.0 + (psi.abs() / self.s).powf(self.beta));
        l_m.max(f64::MIN_POSITIVE)
    }
}

impl Describe for SaturationModel {
    fn describe(&self) -> Summary {
        Summary::new("Main-flux saturation")
            .with("L_unsat", self.l_unsat, "H")
            .with("beta", self.beta, "")
            .with("S", self.s, "Vs")
    }
}
