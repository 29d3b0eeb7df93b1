//! Space-vector transformations in the stationary reference frame.
//!
//! Peak-value scaling is used: a balanced set of phase quantities with
//! amplitude `A` maps to a vector of magnitude `A`.

use num_complex::Complex64;

/// Largest reference magnitude per unit of DC-link voltage that a two-level
/// inverter realizes in the linear modulation range (1/sqrt(3)).
pub const MAX_MODULATION_INDEX: f64 = 0.577_350_269_189_625_8;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Phase quantities to a space vector, `2/3 (x_a + a x_b + a^2 x_c)`.
/// The zero-sequence component is dropped.
pub fn abc_to_complex(x_abc: [f64; 3]) -> Complex64 {
    let [x_a, x_b, x_c] = x_abc;
    Complex64::new((2.0 * x_a - x_b - x_c) / 3.0, (x_b - x_c) / SQRT_3)
}

/// Space vector to phase quantities without zero-sequence component.
pub fn complex_to_abc(x: Complex64) -> [f64; 3] {
    [
        x.re,
        -0.5 * x.re + 0.5 * SQRT_3 * x.im,
        -0.5 * x.re - 0.5 * SQRT_3 * x.im,
    ]
}

/// Scale `x` down to magnitude `limit` if it is longer, preserving its angle.
/// Returns the limited vector and whether limiting took place.
pub fn clamp_magnitude(x: Complex64, limit: f64) -> (Complex64, bool) {
    let magnitude = x.norm();
    if magnitude > limit {
        (x * (limit / magnitude), true)
    } else {
        (x, false)
    }
}
