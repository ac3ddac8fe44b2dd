mod display;
mod import;

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use lynchdraw_core::backtest::{self, BacktestConfig, BacktestReport};
use lynchdraw_core::strategies::Strategy;
use lynchdraw_core::uniformity::{chi_square_counts, chi_square_fit};
use lynchdraw_core::{Category, DrawSequence, SequenceStats};

use crate::import::{append_draw, load_sequence};

#[derive(Parser)]
#[command(name = "lynchdraw", about = "Statistics and backtests for David Lynch's daily 1-10 number")]
struct Cli {
    /// Draw file: one digit per day, 0 standing for 10
    #[arg(short, long, global = true, env = "LYNCHDRAW_FILE", default_value = "txt/davidlynchnumbers.txt")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check the draw file and summarize it
    Import,

    /// Counts, proportions and days since each number was picked
    Stats {
        /// Restrict to the most recent draws
        #[arg(short, long)]
        last: Option<usize>,

        /// Skip the bar chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Chi-square test against a uniform distribution
    Uniformity {
        /// Significance level
        #[arg(short, long, default_value = "0.05")]
        alpha: f64,
    },

    /// Predict the next draw
    Predict {
        /// Single strategy (default: all)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Seed for randomized strategies (default: today's YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Walk-forward backtest of one or all strategies
    Backtest {
        /// Single strategy (default: all)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// First index whose successor is predicted
        #[arg(long, conflicts_with = "train_fraction")]
        start: Option<usize>,

        /// Start after this fraction of the history instead
        #[arg(long)]
        train_fraction: Option<f64>,

        /// Most recent draws withheld from each prediction's history
        #[arg(long, default_value = "0")]
        gap: usize,

        /// Seed for randomized strategies (default: today's YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a newly observed draw to the file
    Add {
        /// Today's number (0 is read as 10)
        number: u8,
    },
}

fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Import => cmd_import(&cli.file),
        Command::Stats { last, no_chart } => cmd_stats(&cli.file, last, no_chart),
        Command::Uniformity { alpha } => cmd_uniformity(&cli.file, alpha),
        Command::Predict { strategy, seed } => cmd_predict(&cli.file, strategy, seed),
        Command::Backtest {
            strategy,
            start,
            train_fraction,
            gap,
            seed,
            json,
        } => cmd_backtest(&cli.file, strategy, start, train_fraction, gap, seed, json),
        Command::Add { number } => cmd_add(&cli.file, number),
    }
}

fn load(path: &Path) -> Result<DrawSequence> {
    let (sequence, _) = load_sequence(path)?;
    if sequence.is_empty() {
        bail!("No draws in {:?}. Add one with: lynchdraw add <number>", path);
    }
    Ok(sequence)
}

fn cmd_import(path: &Path) -> Result<()> {
    let (sequence, result) = load_sequence(path)?;
    display::display_import_summary(&result, &sequence);
    Ok(())
}

fn cmd_stats(path: &Path, last: Option<usize>, no_chart: bool) -> Result<()> {
    let sequence = load(path)?;
    let window = last.unwrap_or(sequence.len()).min(sequence.len());
    if window == 0 {
        bail!("--last must be at least 1");
    }
    let stats = SequenceStats::compute(sequence.tail(window))?;

    display::display_stats(&stats);
    if !no_chart {
        display::display_proportion_chart(&stats);
    }
    Ok(())
}

fn cmd_uniformity(path: &Path, alpha: f64) -> Result<()> {
    let sequence = load(path)?;
    let stats = SequenceStats::compute(sequence.as_slice())?;

    let by_proportion = chi_square_fit(stats.proportions())?;
    let by_count = chi_square_counts(stats.counts())?;

    log::info!(
        "Probability of David Lynch's numbers being drawn from a uniform distribution of integers 1 through 10: {}",
        by_proportion.p_value
    );
    display::display_uniformity(&by_proportion, &by_count, stats.len(), alpha);
    Ok(())
}

fn cmd_predict(path: &Path, strategy: Option<Strategy>, seed: Option<u64>) -> Result<()> {
    let sequence = load(path)?;
    let stats = SequenceStats::compute(sequence.as_slice())?;

    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed of the day: {ds})");
        ds
    });
    let mut rng = StdRng::seed_from_u64(effective_seed);

    let strategies = match strategy {
        Some(s) => vec![s],
        None => Strategy::ALL.to_vec(),
    };

    let mut predictions: Vec<(Strategy, Category)> = Vec::with_capacity(strategies.len());
    for s in strategies {
        let c = s
            .predictor()
            .predict(&stats, &mut rng)
            .with_context(|| format!("Strategy {} could not predict", s))?;
        predictions.push((s, c));
    }

    display::display_predictions(&predictions, stats.len());
    Ok(())
}

fn resolve_start(len: usize, start: Option<usize>, train_fraction: Option<f64>) -> Result<usize> {
    if let Some(s) = start {
        return Ok(s);
    }
    if let Some(f) = train_fraction {
        return Ok(backtest::default_start_index(len, f)?);
    }
    let default = BacktestConfig::default().start_index;
    if default + 2 <= len {
        return Ok(default);
    }
    let fallback = backtest::default_start_index(len, 0.75)?;
    log::warn!(
        "Only {} draws, starting at index {} instead of {}",
        len,
        fallback,
        default
    );
    Ok(fallback)
}

fn cmd_backtest(
    path: &Path,
    strategy: Option<Strategy>,
    start: Option<usize>,
    train_fraction: Option<f64>,
    gap: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let sequence = load(path)?;
    let config = BacktestConfig {
        start_index: resolve_start(sequence.len(), start, train_fraction)?,
        gap,
        seed: seed.unwrap_or_else(date_seed),
    };
    backtest::validate_range(sequence.len(), config.start_index, config.gap)?;

    let strategies = match strategy {
        Some(s) => vec![s],
        None => Strategy::ALL.to_vec(),
    };

    let trials = backtest::trial_count(sequence.len(), config.start_index);
    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new((trials * strategies.len()) as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("=> "),
    );

    let mut reports: Vec<BacktestReport> = Vec::with_capacity(strategies.len());
    for s in strategies {
        pb.set_message(s.to_string());
        let mut rng = StdRng::seed_from_u64(config.seed);
        let report = backtest::run_with(&sequence, s.predictor().as_ref(), &config, &mut rng, |_| {
            pb.inc(1);
            ControlFlow::Continue(())
        })?;
        reports.push(report);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!(
            "{} draws, {} trials per strategy, seed {}",
            sequence.len(),
            trials,
            config.seed
        );
        display::display_backtest(&reports);
    }
    Ok(())
}

fn cmd_add(path: &Path, number: u8) -> Result<()> {
    let normalized = if number == 0 { 10 } else { number };
    let draw = Category::new(normalized)
        .with_context(|| format!("{} is not a valid draw (0-10)", number))?;
    append_draw(path, draw)?;

    let (sequence, _) = load_sequence(path)?;
    println!("Added {} (draw #{}) to {}", draw, sequence.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_backtest() {
        let cli = Cli::try_parse_from([
            "lynchdraw",
            "--file",
            "x.txt",
            "backtest",
            "--strategy",
            "least-often-picked",
            "--start",
            "9",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest { strategy, start, gap, .. } => {
                assert_eq!(strategy, Some(Strategy::LeastOftenPicked));
                assert_eq!(start, Some(9));
                assert_eq!(gap, 0);
            }
            _ => panic!("expected backtest"),
        }
    }

    #[test]
    fn test_cli_start_conflicts_with_fraction() {
        let parsed = Cli::try_parse_from([
            "lynchdraw",
            "backtest",
            "--start",
            "9",
            "--train-fraction",
            "0.5",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_resolve_start() {
        assert_eq!(resolve_start(1000, None, None).unwrap(), 400);
        assert_eq!(resolve_start(100, None, None).unwrap(), 75);
        assert_eq!(resolve_start(100, Some(3), None).unwrap(), 3);
        assert_eq!(resolve_start(100, None, Some(0.5)).unwrap(), 50);
    }

    #[test]
    fn test_date_seed_shape() {
        let s = date_seed();
        assert!(s > 2020_01_01 && s < 2100_01_01, "Seed = {}", s);
    }
}
