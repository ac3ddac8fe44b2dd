use serde::{Deserialize, Serialize};

use crate::error::{DrawError, Result};

/// Number of distinct values a daily draw can take.
pub const POOL_SIZE: usize = 10;

/// Probability of each category under the uniform hypothesis.
pub const UNIFORM_PROBABILITY: f64 = 1.0 / POOL_SIZE as f64;

/// A single draw value, always in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Category(u8);

impl Category {
    pub const ALL: [Category; POOL_SIZE] = [
        Category(1),
        Category(2),
        Category(3),
        Category(4),
        Category(5),
        Category(6),
        Category(7),
        Category(8),
        Category(9),
        Category(10),
    ];

    pub fn new(number: u8) -> Result<Self> {
        validate_number(number)?;
        Ok(Self(number))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position in per-category arrays.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub(crate) fn from_index(idx: usize) -> Self {
        Self::ALL[idx]
    }
}

impl TryFrom<u8> for Category {
    type Error = DrawError;

    fn try_from(number: u8) -> Result<Self> {
        Category::new(number)
    }
}

impl From<Category> for u8 {
    fn from(c: Category) -> u8 {
        c.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn validate_number(number: u8) -> Result<()> {
    if number < 1 || number as usize > POOL_SIZE {
        return Err(DrawError::InvalidInput(format!(
            "draw {} out of range (1-{})",
            number, POOL_SIZE
        )));
    }
    Ok(())
}

/// Chronological history of draws, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawSequence {
    draws: Vec<Category>,
}

impl DrawSequence {
    pub fn new(draws: Vec<Category>) -> Self {
        Self { draws }
    }

    /// Validates raw values. Zeros must already be remapped to 10.
    pub fn from_numbers(numbers: &[u8]) -> Result<Self> {
        let draws = numbers
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                Category::new(n).map_err(|_| {
                    DrawError::InvalidInput(format!(
                        "draw #{} has value {} (expected 1-{})",
                        i, n, POOL_SIZE
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { draws })
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn last(&self) -> Option<Category> {
        self.draws.last().copied()
    }

    pub fn get(&self, idx: usize) -> Option<Category> {
        self.draws.get(idx).copied()
    }

    /// The `n` most recent draws, still oldest first.
    pub fn tail(&self, n: usize) -> &[Category] {
        &self.draws[self.draws.len().saturating_sub(n)..]
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.draws.iter().copied()
    }
}

impl From<Vec<Category>> for DrawSequence {
    fn from(draws: Vec<Category>) -> Self {
        Self::new(draws)
    }
}

impl FromIterator<Category> for DrawSequence {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
