pub mod frequency;
pub mod multinomial;
pub mod recency;
pub mod uniform;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{DrawError, Result};
use crate::models::{Category, DrawSequence, POOL_SIZE};
use crate::stats::SequenceStats;

pub use multinomial::InvertPolicy;

/// A next-draw predictor working from a statistics snapshot.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &'static str;
    /// Randomized predictors draw only from `rng`.
    fn predict(&self, stats: &SequenceStats, rng: &mut dyn RngCore) -> Result<Category>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    UniformRandom,
    LongestNotPicked,
    LeastOftenPicked,
    NaiveMultinomial,
    InvertedNaiveMultinomial,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::UniformRandom,
        Strategy::LongestNotPicked,
        Strategy::LeastOftenPicked,
        Strategy::NaiveMultinomial,
        Strategy::InvertedNaiveMultinomial,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Strategy::UniformRandom => "uniform-random",
            Strategy::LongestNotPicked => "longest-not-picked",
            Strategy::LeastOftenPicked => "least-often-picked",
            Strategy::NaiveMultinomial => "naive-multinomial",
            Strategy::InvertedNaiveMultinomial => "inverted-naive-multinomial",
        }
    }

    pub fn is_randomized(self) -> bool {
        !matches!(
            self,
            Strategy::LongestNotPicked | Strategy::LeastOftenPicked
        )
    }

    pub fn predictor(self) -> Box<dyn Predictor> {
        match self {
            Strategy::UniformRandom => Box::new(uniform::UniformRandom),
            Strategy::LongestNotPicked => Box::new(recency::LongestNotPicked),
            Strategy::LeastOftenPicked => Box::new(frequency::LeastOftenPicked),
            Strategy::NaiveMultinomial => Box::new(multinomial::NaiveMultinomial),
            Strategy::InvertedNaiveMultinomial => {
                Box::new(multinomial::InvertedNaiveMultinomial::default())
            }
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Strategy {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|st| st.id() == s)
            .ok_or_else(|| DrawError::InvalidInput(format!("unknown strategy '{}'", s)))
    }
}

pub fn all_strategies() -> Vec<(Strategy, Box<dyn Predictor>)> {
    Strategy::ALL.iter().map(|&s| (s, s.predictor())).collect()
}

pub fn validate_distribution(dist: &[f64; POOL_SIZE]) -> bool {
    if dist.iter().any(|&p| !p.is_finite() || p < 0.0) {
        return false;
    }
    let sum: f64 = dist.iter().sum();
    (sum - 1.0).abs() < 1e-9
}

/// Deterministic history cycling through every category with a skew towards low numbers.
pub fn make_test_sequence(n: usize) -> DrawSequence {
    (0..n)
        .map(|i| {
            let n = if i % 3 == 0 { (i / 3) % 4 } else { i % POOL_SIZE };
            Category::from_index(n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_ids_roundtrip() {
        for s in Strategy::ALL {
            let parsed: Strategy = s.id().parse().unwrap();
            assert_eq!(parsed, s);
            assert_eq!(s.to_string(), s.id());
        }
        assert!("most-picked".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_registry_covers_all() {
        let all = all_strategies();
        assert_eq!(all.len(), Strategy::ALL.len());
        for (s, p) in &all {
            assert_eq!(p.name(), s.id());
        }
    }

    #[test]
    fn test_strategy_serde_uses_ids() {
        let json = serde_json::to_string(&Strategy::LeastOftenPicked).unwrap();
        assert_eq!(json, "\"least-often-picked\"");
    }

    #[test]
    fn test_validate_distribution() {
        assert!(validate_distribution(&[0.1; POOL_SIZE]));
        assert!(!validate_distribution(&[0.2; POOL_SIZE]));
        let mut d = [0.1; POOL_SIZE];
        d[0] = -0.1;
        d[1] = 0.3;
        assert!(!validate_distribution(&d));
    }

    #[test]
    fn test_make_test_sequence_covers_pool() {
        let seq = make_test_sequence(40);
        let stats = SequenceStats::compute(seq.as_slice()).unwrap();
        assert!(stats.counts().iter().all(|&c| c > 0));
    }
}
