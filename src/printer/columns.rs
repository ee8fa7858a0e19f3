//! # Software Columns
//!
//! Lays out several strings side by side in fixed-width character columns.
//! Each string is word-wrapped inside its column; a single word longer than
//! the column is cut and ends in `.`. Rows are padded so every printed line
//! is exactly the sum of the column widths.

use std::str::FromStr;

use crate::error::{EscposError, Result};

/// Marks a word cut to fit its column.
const TRUNCATION_MARK: char = '.';

/// Placement of text inside a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnAlign {
    Left,
    #[default]
    Center,
    Right,
    /// Spread words over the full width
    Justify,
}

impl FromStr for ColumnAlign {
    type Err = EscposError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "justify" => Ok(Self::Justify),
            _ => Err(EscposError::InvalidParameter(format!("column alignment {s}"))),
        }
    }
}

/// Stretch `items` to `n` entries by repeating the last one.
pub(crate) fn repeat_last<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    match items.last() {
        Some(last) => items.iter().chain(std::iter::repeat(last)).take(n).cloned().collect(),
        None => Vec::new(),
    }
}

/// Wrap each text into its column and regroup the pieces into printed rows.
///
/// Missing cells are empty strings.
pub(crate) fn arrange(texts: &[&str], widths: &[usize]) -> Vec<Vec<String>> {
    let wrapped: Vec<Vec<String>> = texts
        .iter()
        .zip(widths)
        .map(|(text, &width)| {
            let options = textwrap::Options::new(width).break_words(false);
            textwrap::wrap(text, options)
                .into_iter()
                .map(|line| truncate(&line, width))
                .collect()
        })
        .collect();

    let rows = wrapped.iter().map(Vec::len).max().unwrap_or(0);
    (0..rows)
        .map(|i| {
            wrapped
                .iter()
                .map(|cells| cells.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push(TRUNCATION_MARK);
    out
}

/// Pad `text` with spaces to `width` characters.
pub(crate) fn pad(text: &str, width: usize, align: ColumnAlign) -> String {
    match align {
        ColumnAlign::Left => format!("{text:<width$}"),
        ColumnAlign::Center => format!("{text:^width$}"),
        ColumnAlign::Right => format!("{text:>width$}"),
        ColumnAlign::Justify => justify(text, width),
    }
}

/// Widen the gaps between words until the line is `width` long, leftmost
/// gaps first. A single word is right aligned.
fn justify(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let letters: usize = words.iter().map(|w| w.chars().count()).sum();
    let gaps = words.len().saturating_sub(1);
    if gaps == 0 || letters + gaps >= width {
        return format!("{text:>width$}");
    }

    let spaces = width - letters;
    let (each, extra) = (spaces / gaps, spaces % gaps);
    let mut out = String::with_capacity(width);
    for (i, word) in words.iter().enumerate() {
        out.push_str(word);
        if i < gaps {
            out.push_str(&" ".repeat(each + usize::from(i < extra)));
        }
    }
    out
}
