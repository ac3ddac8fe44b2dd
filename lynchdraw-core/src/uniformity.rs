use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{DrawError, Result};
use crate::models::{POOL_SIZE, UNIFORM_PROBABILITY};

const DEGREES_OF_FREEDOM: usize = POOL_SIZE - 1;
const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
}

impl FitResult {
    /// True when uniformity cannot be rejected at significance `alpha`.
    pub fn is_uniform_at(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// One-way chi-square test of per-category proportions against 0.1 each.
///
/// The statistic is computed on proportions rather than counts, so it does not
/// grow with the sample size. See [`chi_square_counts`] for the count-based form.
pub fn chi_square_fit(observed_proportions: &[f64; POOL_SIZE]) -> Result<FitResult> {
    for (i, &p) in observed_proportions.iter().enumerate() {
        if !p.is_finite() || p < 0.0 {
            return Err(DrawError::InvalidInput(format!(
                "proportion for category {} is {}",
                i + 1,
                p
            )));
        }
    }
    let sum: f64 = observed_proportions.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(DrawError::InvalidInput(format!(
            "proportions sum to {} instead of 1",
            sum
        )));
    }

    let statistic = observed_proportions
        .iter()
        .map(|&p| (p - UNIFORM_PROBABILITY).powi(2) / UNIFORM_PROBABILITY)
        .sum();
    finish(statistic)
}

/// Same test on raw counts, with expected count n/10 per category.
pub fn chi_square_counts(times_picked: &[usize; POOL_SIZE]) -> Result<FitResult> {
    let total: usize = times_picked.iter().sum();
    if total == 0 {
        return Err(DrawError::DivisionByZero);
    }
    let expected = total as f64 * UNIFORM_PROBABILITY;
    let statistic = times_picked
        .iter()
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum();
    finish(statistic)
}

fn finish(statistic: f64) -> Result<FitResult> {
    let chi2 = ChiSquared::new(DEGREES_OF_FREEDOM as f64)
        .map_err(|e| DrawError::InvalidInput(e.to_string()))?;
    let p_value = chi2.sf(statistic).clamp(0.0, 1.0);
    Ok(FitResult {
        statistic,
        p_value,
        degrees_of_freedom: DEGREES_OF_FREEDOM,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_proportions() {
        let fit = chi_square_fit(&[0.1; POOL_SIZE]).unwrap();
        assert!(fit.statistic.abs() < 1e-12, "statistic = {}", fit.statistic);
        assert!((fit.p_value - 1.0).abs() < 1e-9, "p = {}", fit.p_value);
        assert_eq!(fit.degrees_of_freedom, 9);
        assert!(fit.is_uniform_at(0.05));
    }

    #[test]
    fn test_skewed_proportions() {
        let mut props = [0.0; POOL_SIZE];
        props[0] = 1.0;
        let fit = chi_square_fit(&props).unwrap();
        // (0.9² + 9 × 0.1²) / 0.1 = 9
        assert!((fit.statistic - 9.0).abs() < 1e-9, "statistic = {}", fit.statistic);
        assert!(fit.p_value > 0.0 && fit.p_value < 1.0);
    }

    #[test]
    fn test_rejects_negative() {
        let mut props = [0.1; POOL_SIZE];
        props[0] = -0.1;
        props[1] = 0.3;
        assert!(matches!(
            chi_square_fit(&props),
            Err(DrawError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_sum() {
        assert!(matches!(
            chi_square_fit(&[0.2; POOL_SIZE]),
            Err(DrawError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_counts_form() {
        let fit = chi_square_counts(&[100; POOL_SIZE]).unwrap();
        assert!(fit.statistic.abs() < 1e-12);

        let mut counts = [100; POOL_SIZE];
        counts[0] = 200;
        counts[1] = 0;
        let fit = chi_square_counts(&counts).unwrap();
        // expected 100: (100² + 100²) / 100 = 200
        assert!((fit.statistic - 200.0).abs() < 1e-9);
        assert!(fit.p_value < 1e-10, "p = {}", fit.p_value);
        assert!(!fit.is_uniform_at(0.05));
    }

    #[test]
    fn test_counts_empty() {
        assert_eq!(
            chi_square_counts(&[0; POOL_SIZE]),
            Err(DrawError::DivisionByZero)
        );
    }
}
