use std::ops::ControlFlow;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{DrawError, Result};
use crate::models::{Category, DrawSequence, UNIFORM_PROBABILITY};
use crate::stats::StatsAccumulator;
use crate::strategies::{Predictor, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// First index `i` whose successor `i + 1` is predicted.
    pub start_index: usize,
    /// Most recent draws withheld from the history. 0 uses every draw up to `i`.
    pub gap: usize,
    pub seed: u64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start_index: 400,
            gap: 0,
            seed: 42,
        }
    }
}

impl BacktestConfig {
    pub fn starting_at(start_index: usize) -> Self {
        Self {
            start_index,
            ..Self::default()
        }
    }
}

/// One walk-forward step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trial {
    pub index: usize,
    pub history_len: usize,
    pub predicted: Category,
    pub actual: Category,
}

impl Trial {
    pub fn is_hit(&self) -> bool {
        self.predicted == self.actual
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub accuracy: f64,
    pub num_trials: usize,
    pub hits: usize,
    pub start_index: usize,
    pub gap: usize,
    /// False when the trial hook stopped the run early.
    pub completed: bool,
}

impl BacktestReport {
    /// Hit rate expected from guessing blindly.
    pub fn baseline_accuracy() -> f64 {
        UNIFORM_PROBABILITY
    }
}

/// Number of trials a valid configuration produces on `len` draws.
pub fn trial_count(len: usize, start_index: usize) -> usize {
    len.saturating_sub(start_index + 1)
}

pub fn validate_range(len: usize, start_index: usize, gap: usize) -> Result<()> {
    let max = len as isize - 2;
    if start_index < 1 || start_index as isize > max || gap > start_index {
        return Err(DrawError::InvalidRange {
            start: start_index,
            gap,
            max,
            len,
        });
    }
    Ok(())
}

/// `floor(len × fraction)` clamped into the valid start range.
pub fn default_start_index(len: usize, train_fraction: f64) -> Result<usize> {
    if !(train_fraction > 0.0 && train_fraction <= 1.0) {
        return Err(DrawError::InvalidInput(format!(
            "training fraction {} not in (0, 1]",
            train_fraction
        )));
    }
    if len < 3 {
        return Err(DrawError::InvalidRange {
            start: 1,
            gap: 0,
            max: len as isize - 2,
            len,
        });
    }
    let start = (len as f64 * train_fraction).floor() as usize;
    Ok(start.clamp(1, len - 2))
}

/// Walk-forward backtest of a registered strategy, seeded from the default config.
///
/// Uses `gap = 0`: the guess for `full[i + 1]` sees every draw up to and
/// including `full[i]`. Call [`run_with`] with `gap = 1` to leave draw `i` out
/// of the history as well.
pub fn run(full: &DrawSequence, strategy: Strategy, start_index: usize) -> Result<BacktestReport> {
    let config = BacktestConfig::starting_at(start_index);
    let mut rng = StdRng::seed_from_u64(config.seed);
    run_with(
        full,
        strategy.predictor().as_ref(),
        &config,
        &mut rng,
        |_| ControlFlow::Continue(()),
    )
}

/// For each `i` in `start_index..=len-2`, predicts `full[i + 1]` from
/// `full[..=i - gap]` and scores the guess.
///
/// `on_trial` runs after every step; returning `Break` stops the run and the
/// report covers the trials done so far.
pub fn run_with<F>(
    full: &DrawSequence,
    predictor: &dyn Predictor,
    config: &BacktestConfig,
    rng: &mut dyn RngCore,
    mut on_trial: F,
) -> Result<BacktestReport>
where
    F: FnMut(&Trial) -> ControlFlow<()>,
{
    let draws = full.as_slice();
    validate_range(draws.len(), config.start_index, config.gap)?;

    let mut acc = StatsAccumulator::from_draws(&draws[..=config.start_index - config.gap]);
    let mut hits = 0usize;
    let mut num_trials = 0usize;
    let mut completed = true;

    for i in config.start_index..draws.len() - 1 {
        let stats = acc.snapshot()?;
        let predicted = predictor.predict(&stats, rng)?;
        let trial = Trial {
            index: i,
            history_len: stats.len(),
            predicted,
            actual: draws[i + 1],
        };
        log::trace!(
            "{} i={} history={} predicted={} actual={}",
            predictor.name(),
            i,
            trial.history_len,
            trial.predicted,
            trial.actual
        );

        num_trials += 1;
        if trial.is_hit() {
            hits += 1;
        }
        acc.push(draws[i + 1 - config.gap]);

        if on_trial(&trial).is_break() {
            completed = i + 2 == draws.len();
            break;
        }
    }

    let accuracy = if num_trials > 0 {
        hits as f64 / num_trials as f64
    } else {
        0.0
    };
    log::debug!(
        "{}: {}/{} hits (accuracy {:.4}) from index {}",
        predictor.name(),
        hits,
        num_trials,
        accuracy,
        config.start_index
    );

    Ok(BacktestReport {
        strategy: predictor.name().to_string(),
        accuracy,
        num_trials,
        hits,
        start_index: config.start_index,
        gap: config.gap,
        completed,
    })
}

/// Backtests every registered strategy, each with a fresh RNG from `config.seed`.
pub fn compare_all(full: &DrawSequence, config: &BacktestConfig) -> Result<Vec<BacktestReport>> {
    Strategy::ALL
        .iter()
        .map(|s| {
            let mut rng = StdRng::seed_from_u64(config.seed);
            run_with(full, s.predictor().as_ref(), config, &mut rng, |_| {
                ControlFlow::Continue(())
            })
        })
        .collect()
}
