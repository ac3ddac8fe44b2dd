use std::cmp::Ordering;

use rand::RngCore;

use super::Predictor;
use crate::error::Result;
use crate::models::Category;
use crate::stats::SequenceStats;

/// Picks the most overdue category.
///
/// Never-drawn categories outrank any finite recency; ties go to the lowest number.
pub struct LongestNotPicked;

impl Predictor for LongestNotPicked {
    fn name(&self) -> &'static str {
        "longest-not-picked"
    }

    fn predict(&self, stats: &SequenceStats, _rng: &mut dyn RngCore) -> Result<Category> {
        let mut best = Category::ALL[0];
        for c in Category::ALL.into_iter().skip(1) {
            if stats.recency(c).overdue_cmp(&stats.recency(best)) == Ordering::Greater {
                best = c;
            }
        }
        Ok(best)
    }
}
