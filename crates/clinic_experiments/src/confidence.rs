//! Confidence intervals across replications.
//!
//! Replication means are treated as i.i.d. samples; intervals use the Student-t
//! distribution with `n - 1` degrees of freedom. The t quantile is found by
//! bisection on the t CDF, which is written in terms of the regularised
//! incomplete beta function.

use std::f64::consts::PI;

use serde::Serialize;

/// Point estimate with a two-sided confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub std_error: f64,
    /// Infinite for a single sample.
    pub half_width: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Estimate {
    /// Estimate with no samples behind it.
    pub fn empty() -> Self {
        Self {
            n: 0,
            mean: 0.0,
            std_dev: 0.0,
            std_error: 0.0,
            half_width: 0.0,
            lower: 0.0,
            upper: 0.0,
        }
    }

    /// Builds the interval for `samples` at `confidence` (for example 0.95).
    ///
    /// # Arguments
    ///
    /// * `samples` - One value per replication
    /// * `confidence` - Two-sided coverage in (0, 1)
    pub fn from_samples(samples: &[f64], confidence: f64) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::empty();
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        if n == 1 {
            return Self {
                n,
                mean,
                std_dev: 0.0,
                std_error: 0.0,
                half_width: f64::INFINITY,
                lower: f64::NEG_INFINITY,
                upper: f64::INFINITY,
            };
        }

        let variance = samples
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        let std_dev = variance.sqrt();
        let std_error = std_dev / (n as f64).sqrt();
        let t = t_quantile(1.0 - (1.0 - confidence) / 2.0, (n - 1) as f64);
        let half_width = t * std_error;
        Self {
            n,
            mean,
            std_dev,
            std_error,
            half_width,
            lower: mean - half_width,
            upper: mean + half_width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

/// Quantile of Student's t distribution: the `t` with `P(T <= t) = p`.
///
/// Returns NaN for `p` outside (0, 1) or non-positive `df`.
pub fn t_quantile(p: f64, df: f64) -> f64 {
    if !(p > 0.0 && p < 1.0) || !(df > 0.0) {
        return f64::NAN;
    }
    if p == 0.5 {
        return 0.0;
    }
    if p < 0.5 {
        return -t_quantile(1.0 - p, df);
    }

    let mut high = 1.0;
    while t_cdf(high, df) < p && high < 1e12 {
        high *= 2.0;
    }
    let mut low = 0.0;
    for _ in 0..200 {
        let mid = 0.5 * (low + high);
        if t_cdf(mid, df) < p {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= 1e-12 * high.max(1.0) {
            break;
        }
    }
    0.5 * (low + high)
}

/// CDF of Student's t with `df` degrees of freedom.
pub fn t_cdf(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(0.5 * df, 0.5, x);
    if t > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// I_x(a, b) for a, b > 0.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln())
        .exp();
    // The continued fraction converges fast only on this side of the mean.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |value: f64| if value.abs() < TINY { TINY } else { value };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let even = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + even * d);
        c = guard(1.0 + even / c);
        h *= d * c;

        let odd = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + odd * d);
        c = guard(1.0 + odd / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// ln Γ(x) by the Lanczos approximation, for x ≥ 0.5.
fn ln_gamma(x: f64) -> f64 {
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |sum, (i, coefficient)| {
            sum + coefficient / (x + i as f64)
        });
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn t_quantiles_match_tables() {
        assert_close(t_quantile(0.975, 1.0), 12.7062, 1e-3);
        assert_close(t_quantile(0.975, 10.0), 2.2281, 1e-3);
        assert_close(t_quantile(0.975, 29.0), 2.0452, 1e-3);
        assert_close(t_quantile(0.95, 59.0), 1.6711, 1e-3);
        assert_close(t_quantile(0.995, 5.0), 4.0321, 1e-3);
        assert_close(t_quantile(0.975, 1e6), 1.9600, 1e-3);
    }

    #[test]
    fn t_quantile_is_symmetric() {
        assert_eq!(t_quantile(0.5, 12.0), 0.0);
        assert_close(t_quantile(0.025, 29.0), -t_quantile(0.975, 29.0), 1e-12);
        assert!(t_quantile(1.0, 5.0).is_nan());
        assert!(t_quantile(0.9, 0.0).is_nan());
    }

    #[test]
    fn ln_gamma_matches_factorials() {
        assert_close(ln_gamma(1.0), 0.0, 1e-12);
        assert_close(ln_gamma(5.0), 24f64.ln(), 1e-10);
        assert_close(ln_gamma(0.5), PI.sqrt().ln(), 1e-10);
    }

    #[test]
    fn estimate_from_samples() {
        let estimate = Estimate::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95);
        assert_eq!(estimate.n, 5);
        assert_eq!(estimate.mean, 3.0);
        assert_close(estimate.std_dev, 2.5f64.sqrt(), 1e-12);
        assert_close(estimate.half_width, 2.7764 * estimate.std_error, 1e-3);
        assert_close(estimate.upper - estimate.lower, 2.0 * estimate.half_width, 1e-12);
    }

    #[test]
    fn degenerate_sample_sizes() {
        assert!(Estimate::from_samples(&[], 0.95).is_empty());

        let single = Estimate::from_samples(&[4.0], 0.95);
        assert_eq!(single.mean, 4.0);
        assert!(single.half_width.is_infinite());
        assert_eq!(single.upper, f64::INFINITY);

        let constant = Estimate::from_samples(&[2.0; 10], 0.95);
        assert_eq!(constant.half_width, 0.0);
        assert_eq!(constant.upper, 2.0);
    }
}
