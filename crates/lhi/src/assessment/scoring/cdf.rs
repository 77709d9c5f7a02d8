//! Standard normal cumulative distribution function.
//!
//! Zelen & Severo rational approximation (Abramowitz & Stegun 26.2.17). Absolute error stays
//! below 7.5e-8 across the real line.

const P: f64 = 0.231_641_9;
const B1: f64 = 0.319_381_530;
const B2: f64 = -0.356_563_782;
const B3: f64 = 1.781_477_937;
const B4: f64 = -1.821_255_978;
const B5: f64 = 1.330_274_429;
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Φ(x): probability that a standard normal variable is at most `x`.
pub fn normal_cdf(x: f64) -> f64 {
    let t = 1.0 / (1.0 + P * x.abs());
    let density = INV_SQRT_2PI * (-x * x / 2.0).exp();
    let upper_tail = density * t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));

    if x > 0.0 {
        1.0 - upper_tail
    } else {
        upper_tail
    }
}
