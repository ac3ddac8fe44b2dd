use rand::{Rng, RngCore};

use super::Predictor;
use crate::error::Result;
use crate::models::{Category, POOL_SIZE};
use crate::stats::SequenceStats;

/// Ignores the history and picks any category with probability 0.1.
pub struct UniformRandom;

impl Predictor for UniformRandom {
    fn name(&self) -> &'static str {
        "uniform-random"
    }

    fn predict(&self, _stats: &SequenceStats, rng: &mut dyn RngCore) -> Result<Category> {
        Ok(Category::from_index(rng.random_range(0..POOL_SIZE)))
    }
}
