use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{DrawError, Result};
use crate::models::{Category, POOL_SIZE};

/// Draws elapsed since a category last came up.
///
/// `Unset` means the category never appeared in the history. For "how overdue"
/// comparisons it ranks above every `Days` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recency {
    Unset,
    Days(usize),
}

impl Recency {
    pub fn days(self) -> Option<usize> {
        match self {
            Recency::Unset => None,
            Recency::Days(d) => Some(d),
        }
    }

    /// Orders by overdueness: `Unset` > `Days(n)` for any `n`, then by `n`.
    pub fn overdue_cmp(&self, other: &Recency) -> Ordering {
        match (self, other) {
            (Recency::Unset, Recency::Unset) => Ordering::Equal,
            (Recency::Unset, Recency::Days(_)) => Ordering::Greater,
            (Recency::Days(_), Recency::Unset) => Ordering::Less,
            (Recency::Days(a), Recency::Days(b)) => a.cmp(b),
        }
    }
}

impl std::fmt::Display for Recency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recency::Unset => write!(f, "never"),
            Recency::Days(d) => write!(f, "{}", d),
        }
    }
}

/// Snapshot of recency and frequency statistics over a draw history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceStats {
    len: usize,
    days_since_picked: [Recency; POOL_SIZE],
    times_picked: [usize; POOL_SIZE],
    proportion_picked: [f64; POOL_SIZE],
}

impl SequenceStats {
    /// Builds the snapshot for `draws` (oldest first) in a single reverse pass.
    pub fn compute(draws: &[Category]) -> Result<Self> {
        if draws.is_empty() {
            return Err(DrawError::DivisionByZero);
        }

        let mut days_since_picked = [Recency::Unset; POOL_SIZE];
        let mut times_picked = [0usize; POOL_SIZE];

        for (offset, c) in draws.iter().rev().enumerate() {
            let idx = c.index();
            times_picked[idx] += 1;
            if days_since_picked[idx] == Recency::Unset {
                days_since_picked[idx] = Recency::Days(offset);
            }
        }

        Ok(Self::from_parts(draws.len(), days_since_picked, times_picked))
    }

    fn from_parts(
        len: usize,
        days_since_picked: [Recency; POOL_SIZE],
        times_picked: [usize; POOL_SIZE],
    ) -> Self {
        let mut proportion_picked = [0.0f64; POOL_SIZE];
        for (p, &count) in proportion_picked.iter_mut().zip(times_picked.iter()) {
            *p = count as f64 / len as f64;
        }
        Self {
            len,
            days_since_picked,
            times_picked,
            proportion_picked,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn recency(&self, c: Category) -> Recency {
        self.days_since_picked[c.index()]
    }

    /// Days since `c` was drawn; fails if it never was.
    pub fn days_since(&self, c: Category) -> Result<usize> {
        self.recency(c)
            .days()
            .ok_or(DrawError::UndefinedStatistic(c))
    }

    pub fn times_picked(&self, c: Category) -> usize {
        self.times_picked[c.index()]
    }

    pub fn proportion_picked(&self, c: Category) -> f64 {
        self.proportion_picked[c.index()]
    }

    pub fn recencies(&self) -> &[Recency; POOL_SIZE] {
        &self.days_since_picked
    }

    pub fn counts(&self) -> &[usize; POOL_SIZE] {
        &self.times_picked
    }

    pub fn proportions(&self) -> &[f64; POOL_SIZE] {
        &self.proportion_picked
    }
}

/// Incremental builder producing the same snapshots as [`SequenceStats::compute`]
/// while draws are appended one at a time.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    len: usize,
    last_seen: [Option<usize>; POOL_SIZE],
    times_picked: [usize; POOL_SIZE],
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            len: 0,
            last_seen: [None; POOL_SIZE],
            times_picked: [0; POOL_SIZE],
        }
    }

    pub fn from_draws(draws: &[Category]) -> Self {
        let mut acc = Self::new();
        acc.extend(draws);
        acc
    }

    pub fn push(&mut self, c: Category) {
        let idx = c.index();
        self.last_seen[idx] = Some(self.len);
        self.times_picked[idx] += 1;
        self.len += 1;
    }

    pub fn extend(&mut self, draws: &[Category]) {
        for &c in draws {
            self.push(c);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn snapshot(&self) -> Result<SequenceStats> {
        if self.len == 0 {
            return Err(DrawError::DivisionByZero);
        }
        let mut days_since_picked = [Recency::Unset; POOL_SIZE];
        for (r, seen) in days_since_picked.iter_mut().zip(self.last_seen.iter()) {
            if let Some(pos) = seen {
                *r = Recency::Days(self.len - 1 - pos);
            }
        }
        Ok(SequenceStats::from_parts(
            self.len,
            days_since_picked,
            self.times_picked,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawSequence;

    fn seq(numbers: &[u8]) -> DrawSequence {
        DrawSequence::from_numbers(numbers).unwrap()
    }

    fn cat(n: u8) -> Category {
        Category::new(n).unwrap()
    }

    #[test]
    fn test_counts_sum_to_len() {
        let s = seq(&[1, 5, 5, 10, 2, 2, 2, 7]);
        let stats = SequenceStats::compute(s.as_slice()).unwrap();
        assert_eq!(stats.counts().iter().sum::<usize>(), s.len());
        assert_eq!(stats.times_picked(cat(2)), 3);
        assert_eq!(stats.times_picked(cat(3)), 0);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let s = seq(&[1, 5, 5, 10, 2, 2, 2, 7, 9]);
        let stats = SequenceStats::compute(s.as_slice()).unwrap();
        let sum: f64 = stats.proportions().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12, "Sum = {}", sum);
        assert!((stats.proportion_picked(cat(5)) - 2.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_recency() {
        let s = seq(&[3, 1, 4, 1, 5]);
        let stats = SequenceStats::compute(s.as_slice()).unwrap();
        assert_eq!(stats.recency(cat(5)), Recency::Days(0));
        assert_eq!(stats.recency(cat(1)), Recency::Days(1));
        assert_eq!(stats.recency(cat(4)), Recency::Days(2));
        assert_eq!(stats.recency(cat(3)), Recency::Days(4));
        assert_eq!(stats.recency(cat(9)), Recency::Unset);
    }

    #[test]
    fn test_zero_recency_only_for_last() {
        let s = seq(&[2, 8, 8, 6, 1, 6]);
        let stats = SequenceStats::compute(s.as_slice()).unwrap();
        for c in Category::ALL {
            assert_eq!(
                stats.recency(c) == Recency::Days(0),
                c == cat(6),
                "category {}",
                c
            );
        }
    }

    #[test]
    fn test_empty_is_division_by_zero() {
        assert_eq!(SequenceStats::compute(&[]), Err(DrawError::DivisionByZero));
        assert_eq!(
            StatsAccumulator::new().snapshot(),
            Err(DrawError::DivisionByZero)
        );
    }

    #[test]
    fn test_days_since_undefined() {
        let s = seq(&[1, 2]);
        let stats = SequenceStats::compute(s.as_slice()).unwrap();
        assert_eq!(stats.days_since(cat(1)), Ok(1));
        assert_eq!(
            stats.days_since(cat(7)),
            Err(DrawError::UndefinedStatistic(cat(7)))
        );
    }

    #[test]
    fn test_compute_idempotent() {
        let s = seq(&[4, 4, 9, 1, 10, 3]);
        let a = SequenceStats::compute(s.as_slice()).unwrap();
        let b = SequenceStats::compute(s.as_slice()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_accumulator_matches_compute_on_every_prefix() {
        let s = seq(&[7, 2, 2, 10, 1, 7, 3, 3, 3, 9, 5, 7, 1]);
        let mut acc = StatsAccumulator::new();
        for (i, c) in s.iter().enumerate() {
            acc.push(c);
            let expected = SequenceStats::compute(&s.as_slice()[..=i]).unwrap();
            assert_eq!(acc.snapshot().unwrap(), expected, "prefix len {}", i + 1);
        }
    }

    #[test]
    fn test_recency_display() {
        assert_eq!(Recency::Unset.to_string(), "never");
        assert_eq!(Recency::Days(12).to_string(), "12");
    }

    #[test]
    fn test_overdue_ordering() {
        assert_eq!(
            Recency::Unset.overdue_cmp(&Recency::Days(1000)),
            Ordering::Greater
        );
        assert_eq!(
            Recency::Days(3).overdue_cmp(&Recency::Days(5)),
            Ordering::Less
        );
        assert_eq!(Recency::Unset.overdue_cmp(&Recency::Unset), Ordering::Equal);
    }
}
