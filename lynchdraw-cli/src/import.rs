use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use lynchdraw_core::{Category, DrawSequence};

pub struct ImportResult {
    pub total_chars: usize,
    pub draws: usize,
    pub zeros_remapped: usize,
}

/// Parses the digit file: one character per draw, whitespace ignored, `0` meaning 10.
pub fn parse_digits(text: &str) -> Result<(Vec<u8>, ImportResult)> {
    let mut numbers = Vec::with_capacity(text.len());
    let mut result = ImportResult {
        total_chars: 0,
        draws: 0,
        zeros_remapped: 0,
    };

    for (pos, ch) in text.chars().enumerate() {
        result.total_chars += 1;
        if ch.is_whitespace() {
            continue;
        }
        let digit = match ch.to_digit(10) {
            Some(d) => d as u8,
            None => bail!("Unexpected character '{}' at position {}", ch, pos),
        };
        if digit == 0 {
            result.zeros_remapped += 1;
            numbers.push(10);
        } else {
            numbers.push(digit);
        }
    }

    result.draws = numbers.len();
    Ok((numbers, result))
}

pub fn load_sequence(path: &Path) -> Result<(DrawSequence, ImportResult)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {:?}", path))?;
    let (numbers, result) = parse_digits(&text)
        .with_context(|| format!("Malformed draw file {:?}", path))?;
    let sequence = DrawSequence::from_numbers(&numbers)?;
    log::debug!(
        "Loaded {} draws from {:?} ({} zeros remapped to 10)",
        result.draws,
        path,
        result.zeros_remapped
    );
    Ok((sequence, result))
}

/// Appends one draw, writing 10 back as `0` to keep one character per draw.
pub fn append_draw(path: &Path, draw: Category) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create directory {:?}", parent))?;
        }
    }

    let existing = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Could not read {:?}", path)),
    };
    parse_digits(&existing)
        .with_context(|| format!("Refusing to append to malformed draw file {:?}", path))?;

    // Drop a trailing newline so the new digit lands on the same line.
    let trimmed_len = existing.trim_end().len();
    if trimmed_len != existing.len() {
        std::fs::write(path, &existing[..trimmed_len])
            .with_context(|| format!("Could not rewrite {:?}", path))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open {:?}", path))?;
    let digit = draw.get() % 10;
    write!(file, "{}", digit).context("Write failed")?;
    Ok(())
}
