use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use textplots::{Chart, Plot, Shape};

use crate::import::ImportResult;
use lynchdraw_core::backtest::BacktestReport;
use lynchdraw_core::models::UNIFORM_PROBABILITY;
use lynchdraw_core::strategies::Strategy;
use lynchdraw_core::uniformity::FitResult;
use lynchdraw_core::{Category, DrawSequence, SequenceStats};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_import_summary(result: &ImportResult, sequence: &DrawSequence) {
    println!("Import finished:");
    println!("  Characters read   : {}", result.total_chars);
    println!("  Draws             : {}", result.draws);
    println!("  Zeros read as 10  : {}", result.zeros_remapped);

    let recent = sequence
        .tail(10)
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("  Most recent draws : {}", recent);
}

pub fn display_stats(stats: &SequenceStats) {
    println!("\n== Statistics over the last {} draws ==\n", stats.len());

    let mut table = new_table(vec!["Number", "Times picked", "Proportion", "Days since"]);
    for c in Category::ALL {
        let proportion = stats.proportion_picked(c);
        let deviation = (proportion - UNIFORM_PROBABILITY) / UNIFORM_PROBABILITY;
        let color = if deviation > 0.2 {
            Color::Green
        } else if deviation < -0.2 {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", c)),
            Cell::new(stats.times_picked(c)),
            Cell::new(format!("{:.4}", proportion)).fg(color),
            Cell::new(stats.recency(c).to_string()),
        ]);
    }
    println!("{table}");
}

/// Bar chart of proportions with the expected 0.1 line.
pub fn display_proportion_chart(stats: &SequenceStats) {
    println!("\n== Proportion of picks (expected {:.1}) ==\n", UNIFORM_PROBABILITY);

    let bars: Vec<(f32, f32)> = Category::ALL
        .iter()
        .map(|&c| (c.get() as f32, stats.proportion_picked(c) as f32))
        .collect();
    let expected = [(0.5f32, UNIFORM_PROBABILITY as f32), (10.5, UNIFORM_PROBABILITY as f32)];

    let y_max = bars
        .iter()
        .map(|&(_, y)| y)
        .fold(UNIFORM_PROBABILITY as f32, f32::max)
        * 1.2;

    Chart::new_with_y_range(120, 40, 0.5, 10.5, 0.0, y_max)
        .lineplot(&Shape::Bars(&bars))
        .lineplot(&Shape::Lines(&expected))
        .display();
}

pub fn display_uniformity(proportions: &FitResult, counts: &FitResult, n: usize, alpha: f64) {
    println!("\n== Chi-square goodness of fit against uniform 1-10 ({} draws) ==\n", n);

    let mut table = new_table(vec!["Input", "Statistic", "df", "p-value", "Verdict"]);
    for (label, fit) in [("Proportions", proportions), ("Counts", counts)] {
        let (verdict, color) = if fit.is_uniform_at(alpha) {
            ("consistent with uniform", Color::White)
        } else {
            ("NOT uniform", Color::Red)
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{:.4}", fit.statistic)),
            Cell::new(fit.degrees_of_freedom),
            Cell::new(format!("{:.6}", fit.p_value)),
            Cell::new(format!("{} (α={})", verdict, alpha)).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_predictions(predictions: &[(Strategy, Category)], history_len: usize) {
    println!("\n== Next draw predictions ({} draws of history) ==\n", history_len);

    let mut table = new_table(vec!["Strategy", "Prediction"]);
    for (strategy, c) in predictions {
        let label = if strategy.is_randomized() {
            format!("{} (random)", strategy)
        } else {
            strategy.to_string()
        };
        table.add_row(vec![label, c.to_string()]);
    }
    println!("{table}");
}

pub fn display_backtest(reports: &[BacktestReport]) {
    println!("\n== Walk-forward backtest ==\n");

    let baseline = BacktestReport::baseline_accuracy();
    let mut table = new_table(vec![
        "Strategy", "Trials", "Hits", "Accuracy", "vs chance", "Start", "Gap",
    ]);

    let mut sorted = reports.to_vec();
    sorted.sort_by(|a, b| {
        b.accuracy
            .partial_cmp(&a.accuracy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for r in &sorted {
        let color = if r.accuracy > baseline {
            Color::Green
        } else {
            Color::Red
        };
        let mut name = r.strategy.clone();
        if !r.completed {
            name.push_str(" (stopped)");
        }
        table.add_row(vec![
            Cell::new(name),
            Cell::new(r.num_trials),
            Cell::new(r.hits),
            Cell::new(format!("{:.4}", r.accuracy)).fg(color),
            Cell::new(format!("{:+.4}", r.accuracy - baseline)),
            Cell::new(r.start_index),
            Cell::new(r.gap),
        ]);
    }
    println!("{table}");
}
