//! Binomial likelihood for a single coin-bias hypothesis.
//!
//! The default form is the *kernel* `p^k * (1-p)^(N-k)`. The binomial
//! coefficient `C(N, k)` is the same for every hypothesis under a fixed
//! observation, so it cancels when posteriors are normalized. The full pmf is
//! still available through [`LikelihoodForm::Binomial`]; the form is chosen
//! once per engine so a single update never mixes the two.

use serde::{Deserialize, Serialize};

/// Unnormalized binomial likelihood `p^heads * (1-p)^(flips-heads)`.
///
/// Callers must ensure `heads <= flips`. Under strict p-value bounds `p` is
/// kept inside `[0.01, 0.99]`; with loose bounds `0^0` evaluates to `1`.
#[must_use]
pub fn likelihood(heads: u32, flips: u32, p: f64) -> f64 {
    debug_assert!(heads <= flips, "heads {heads} exceeds flips {flips}");
    let tails = flips.saturating_sub(heads);
    p.powi(heads as i32) * (1.0 - p).powi(tails as i32)
}

/// `C(n, k)` as a float, computed multiplicatively.
///
/// Exact for every `n <= 100` up to `f64` rounding; returns `0.0` when
/// `k > n`.
#[must_use]
pub fn binomial_coefficient(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut acc = 1.0_f64;
    for i in 1..=k {
        acc = acc * f64::from(n - k + i) / f64::from(i);
    }
    acc
}

/// Which likelihood expression the update engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodForm {
    /// `p^k (1-p)^(N-k)`; coefficient omitted.
    #[default]
    Kernel,
    /// `C(N,k) p^k (1-p)^(N-k)`.
    Binomial,
}

impl LikelihoodForm {
    /// Evaluate this form for one hypothesis.
    #[must_use]
    pub fn evaluate(self, heads: u32, flips: u32, p: f64) -> f64 {
        match self {
            Self::Kernel => likelihood(heads, flips, p),
            Self::Binomial => binomial_coefficient(flips, heads) * likelihood(heads, flips, p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_likelihood_matches_closed_form() {
        let expected = 0.7_f64.powi(8) * 0.3_f64.powi(2);
        assert!((likelihood(8, 10, 0.7) - expected).abs() < EPS);
    }

    #[test]
    fn test_likelihood_edge_counts() {
        // All tails: only the (1-p) factor remains.
        assert!((likelihood(0, 3, 0.25) - 0.75_f64.powi(3)).abs() < EPS);
        // All heads: only the p factor remains.
        assert!((likelihood(3, 3, 0.25) - 0.25_f64.powi(3)).abs() < EPS);
    }

    #[test]
    fn test_likelihood_zero_to_zero_is_one() {
        assert_eq!(likelihood(0, 4, 0.0), 1.0);
        assert_eq!(likelihood(4, 4, 1.0), 1.0);
        assert_eq!(likelihood(1, 4, 0.0), 0.0);
    }

    #[test]
    fn test_binomial_coefficient_small_values() {
        assert_eq!(binomial_coefficient(10, 0), 1.0);
        assert_eq!(binomial_coefficient(10, 10), 1.0);
        assert_eq!(binomial_coefficient(10, 3), 120.0);
        assert_eq!(binomial_coefficient(10, 7), 120.0);
        assert_eq!(binomial_coefficient(5, 6), 0.0);
    }

    #[test]
    fn test_binomial_coefficient_large_n() {
        // C(100, 50) = 100891344545564193334812497256
        let value = binomial_coefficient(100, 50);
        assert!((value / 1.008_913_445_455_642e29 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_forms_differ_only_by_coefficient() {
        let kernel = LikelihoodForm::Kernel.evaluate(7, 10, 0.75);
        let full = LikelihoodForm::Binomial.evaluate(7, 10, 0.75);
        assert!((full / kernel - 120.0).abs() < 1e-9);
    }
}
