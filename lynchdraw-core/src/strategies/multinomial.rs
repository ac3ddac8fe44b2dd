use rand::RngCore;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use serde::{Deserialize, Serialize};

use super::Predictor;
use crate::error::{DrawError, Result};
use crate::models::{Category, POOL_SIZE, UNIFORM_PROBABILITY};
use crate::stats::SequenceStats;

const SUM_TOLERANCE: f64 = 1e-9;

fn sample(weights: &[f64; POOL_SIZE], rng: &mut dyn RngCore) -> Result<Category> {
    let dist = WeightedIndex::new(weights)
        .map_err(|e| DrawError::InvalidDistribution(e.to_string()))?;
    Ok(Category::from_index(dist.sample(rng)))
}

/// One draw from the empirical distribution of the history.
pub struct NaiveMultinomial;

impl Predictor for NaiveMultinomial {
    fn name(&self) -> &'static str {
        "naive-multinomial"
    }

    fn predict(&self, stats: &SequenceStats, rng: &mut dyn RngCore) -> Result<Category> {
        let weights = stats.proportions();
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(DrawError::InvalidDistribution(format!(
                "proportions sum to {}",
                sum
            )));
        }
        sample(weights, rng)
    }
}

/// What to do when `2 × 0.1 − p` goes negative for an over-drawn category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvertPolicy {
    /// Clip negative parameters to zero and renormalize.
    #[default]
    ClipAndRenormalize,
    /// Reject the snapshot with `InvalidDistribution`.
    Strict,
}

/// One draw favouring categories drawn less often than 0.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertedNaiveMultinomial {
    pub policy: InvertPolicy,
}

impl InvertedNaiveMultinomial {
    pub fn strict() -> Self {
        Self {
            policy: InvertPolicy::Strict,
        }
    }

    /// Event probabilities after applying the policy.
    pub fn parameters(&self, stats: &SequenceStats) -> Result<[f64; POOL_SIZE]> {
        let mut params = [0.0f64; POOL_SIZE];
        for (w, &p) in params.iter_mut().zip(stats.proportions().iter()) {
            *w = 2.0 * UNIFORM_PROBABILITY - p;
        }

        match self.policy {
            InvertPolicy::Strict => {
                if let Some(idx) = params.iter().position(|&w| w < 0.0) {
                    return Err(DrawError::InvalidDistribution(format!(
                        "category {} has negative parameter {:.4}",
                        idx + 1,
                        params[idx]
                    )));
                }
                let sum: f64 = params.iter().sum();
                if (sum - 1.0).abs() > SUM_TOLERANCE {
                    return Err(DrawError::InvalidDistribution(format!(
                        "parameters sum to {}",
                        sum
                    )));
                }
            }
            InvertPolicy::ClipAndRenormalize => {
                for w in &mut params {
                    if *w < 0.0 {
                        *w = 0.0;
                    }
                }
                // Unclipped parameters sum to 1, so the clipped sum is at least 1.
                let sum: f64 = params.iter().sum();
                if sum <= 0.0 {
                    return Err(DrawError::InvalidDistribution(
                        "all parameters clipped to zero".to_string(),
                    ));
                }
                for w in &mut params {
                    *w /= sum;
                }
            }
        }
        Ok(params)
    }
}

impl Predictor for InvertedNaiveMultinomial {
    fn name(&self) -> &'static str {
        "inverted-naive-multinomial"
    }

    fn predict(&self, stats: &SequenceStats, rng: &mut dyn RngCore) -> Result<Category> {
        let params = self.parameters(stats)?;
        sample(&params, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawSequence;
    use crate::strategies::{make_test_sequence, validate_distribution};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stats_of(numbers: &[u8]) -> SequenceStats {
        let seq = DrawSequence::from_numbers(numbers).unwrap();
        SequenceStats::compute(seq.as_slice()).unwrap()
    }

    #[test]
    fn test_naive_only_draws_seen() {
        let stats = stats_of(&[3, 3, 7, 3]);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let c = NaiveMultinomial.predict(&stats, &mut rng).unwrap().get();
            assert!(c == 3 || c == 7, "Drew {}", c);
        }
    }

    #[test]
    fn test_naive_seeded_is_reproducible() {
        let stats = SequenceStats::compute(make_test_sequence(30).as_slice()).unwrap();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..30)
                .map(|_| NaiveMultinomial.predict(&stats, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_inverted_near_uniform_is_valid() {
        let stats = stats_of(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let params = InvertedNaiveMultinomial::strict().parameters(&stats).unwrap();
        assert!(validate_distribution(&params));
        for &p in &params {
            assert!((p - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inverted_strict_rejects_dominant_category() {
        // proportion of 1 is 0.5 → 0.2 - 0.5 < 0
        let stats = stats_of(&[1, 1, 1, 1, 1, 2, 3, 4, 5, 6]);
        let err = InvertedNaiveMultinomial::strict()
            .parameters(&stats)
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidDistribution(_)), "got {:?}", err);

        let mut rng = StdRng::seed_from_u64(0);
        assert!(InvertedNaiveMultinomial::strict()
            .predict(&stats, &mut rng)
            .is_err());
    }

    #[test]
    fn test_inverted_clip_never_draws_dominant_category() {
        let stats = stats_of(&[1, 1, 1, 1, 1, 2, 3, 4, 5, 6]);
        let model = InvertedNaiveMultinomial::default();
        let params = model.parameters(&stats).unwrap();
        assert!(validate_distribution(&params), "Params = {:?}", params);
        assert_eq!(params[0], 0.0);
        // never-drawn categories get the largest weight
        assert!(params[9] > params[1]);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_ne!(model.predict(&stats, &mut rng).unwrap().get(), 1);
        }
    }
}
