use rand::RngCore;

use super::Predictor;
use crate::error::Result;
use crate::models::Category;
use crate::stats::SequenceStats;

/// Picks the category with the fewest occurrences; ties go to the lowest number.
pub struct LeastOftenPicked;

impl Predictor for LeastOftenPicked {
    fn name(&self) -> &'static str {
        "least-often-picked"
    }

    fn predict(&self, stats: &SequenceStats, _rng: &mut dyn RngCore) -> Result<Category> {
        let mut best = Category::ALL[0];
        for c in Category::ALL.into_iter().skip(1) {
            if stats.times_picked(c) < stats.times_picked(best) {
                best = c;
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawSequence;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn predict(numbers: &[u8], seed: u64) -> u8 {
        let seq = DrawSequence::from_numbers(numbers).unwrap();
        let stats = SequenceStats::compute(seq.as_slice()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        LeastOftenPicked.predict(&stats, &mut rng).unwrap().get()
    }

    #[test]
    fn test_all_equal_picks_one() {
        assert_eq!(predict(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 0), 1);
    }

    #[test]
    fn test_missing_category_is_least() {
        assert_eq!(predict(&[1, 2, 3, 4, 5, 6, 8, 9, 10, 1], 0), 7);
    }

    #[test]
    fn test_tie_goes_low() {
        // 3 and 6 both appear once, everything else twice
        assert_eq!(
            predict(&[1, 1, 2, 2, 3, 4, 4, 5, 5, 6, 7, 7, 8, 8, 9, 9, 10, 10], 0),
            3
        );
    }

    #[test]
    fn test_deterministic() {
        let numbers = [2, 2, 5, 9, 9, 9, 1];
        assert_eq!(predict(&numbers, 1), predict(&numbers, 12345));
    }
}
