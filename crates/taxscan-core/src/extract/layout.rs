//! Re-pairing of stacked box labels with their values.
//!
//! Reading order flattens side-by-side form boxes row by row, so a row of
//! labels can arrive ahead of the row holding their values:
//!
//! ```text
//! 1 Wages, tips, other compensation
//! 2 Federal income tax withheld
//! 56,123.45
//! 6,789.10
//! ```
//!
//! [`pair_stacked_labels`] rewrites such runs into `label value` lines, so a
//! label pattern only ever sees the value that belongs to its own box.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    /// A line holding nothing but a dollar amount.
    static ref VALUE_LINE: Regex = Regex::new(
        r"^[ \t]*(?:\$[ \t]*)?(?:(?:\d{1,3}(?:[, \u{00a0}]\d{3})+|\d+)\.\d{2,}|\d{1,3}(?:[,\u{00a0}]\d{3})+|\d{3,})[ \t]*$"
    ).unwrap();

    /// A line of label text with no value, optionally led by a box number.
    static ref LABEL_LINE: Regex = Regex::new(
        r"^[ \t]*(?P<box>\d{1,2}[a-z]?[ \t]+)?[^\d]*[A-Za-z][^\d]*$"
    ).unwrap();
}

/// Move each value of a stacked value block onto the line that ends its label.
///
/// A block of N value lines is paired with the labels directly above it.
/// When those labels carry box numbers, lines without one continue the
/// previous label and the pairing needs exactly N labels; otherwise every
/// line is a label and the nearest N are used. Text with no block that can
/// be paired is returned unchanged.
pub fn pair_stacked_labels(text: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = text.lines().collect();
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    let mut blocks: Vec<RangeInclusive<usize>> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if !VALUE_LINE.is_match(lines[i]) {
            i += 1;
            continue;
        }

        let values = value_block(&lines, i);
        let next = values.last().map_or(i + 1, |last| last + 1);

        if values.len() >= 2 {
            if let Some(labels) = labels_above(&lines, i, values.len()) {
                pairs.extend(labels.into_iter().zip(values.iter().copied()));
                blocks.push(i..=next - 1);
            }
        }

        i = next;
    }

    if pairs.is_empty() {
        return Cow::Borrowed(text);
    }

    debug!("Paired {} stacked labels with their values", pairs.len());

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (n, line) in lines.iter().enumerate() {
        if blocks.iter().any(|block| block.contains(&n)) {
            continue;
        }
        match pairs.iter().find(|&&(label, _)| label == n) {
            Some(&(_, value)) => out.push(format!("{} {}", line.trim_end(), lines[value].trim())),
            None => out.push((*line).to_string()),
        }
    }

    Cow::Owned(out.join("\n"))
}

/// Indices of the consecutive value lines starting at `start`, across blank lines.
fn value_block(lines: &[&str], start: usize) -> Vec<usize> {
    let mut values = Vec::new();
    for (n, line) in lines.iter().enumerate().skip(start) {
        if VALUE_LINE.is_match(line) {
            values.push(n);
        } else if !line.trim().is_empty() {
            break;
        }
    }
    values
}

/// Last lines of the `count` labels directly above line `block_start`, top
/// to bottom.
fn labels_above(lines: &[&str], block_start: usize, count: usize) -> Option<Vec<usize>> {
    // Label-like lines above the block, nearest first.
    let run: Vec<usize> = (0..block_start)
        .rev()
        .filter(|&n| !lines[n].trim().is_empty())
        .take_while(|&n| LABEL_LINE.is_match(lines[n]))
        .collect();

    let has_box = |n: usize| {
        LABEL_LINE
            .captures(lines[n])
            .is_some_and(|c| c.name("box").is_some())
    };

    let mut labels: Vec<usize> = Vec::new();

    if run.iter().any(|&n| has_box(n)) {
        let mut end = None;
        for &n in &run {
            let label_end = *end.get_or_insert(n);
            if has_box(n) {
                labels.push(label_end);
                end = None;
            }
        }
        // Lines above the first box label are not part of the run.
        if labels.len() != count {
            return None;
        }
    } else {
        if run.len() < count {
            return None;
        }
        labels.extend(run.iter().take(count));
    }

    labels.reverse();
    Some(labels)
}
