//! Ranked display of a class probability vector.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{Result, SketchError};

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    /// Class index in the original probability vector.
    pub label: usize,
    pub probability: f64,
    /// `probability * 100` with one decimal, e.g. `"70.0"`.
    pub percentage: String,
    /// Set on the first entry only.
    pub is_top: bool,
}

/// Probabilities sorted from most to least likely.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    entries: Vec<ScoreEntry>,
}

impl Ranking {
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> &ScoreEntry {
        &self.entries[0]
    }

    /// The "best match" line, e.g. `Digit "7"`.
    pub fn best_label(&self) -> String {
        format!("Digit \"{}\"", self.best().label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Best match: {}", self.best_label())?;
        for e in &self.entries {
            let bar = "#".repeat((e.probability.clamp(0.0, 1.0) * 40.0).round() as usize);
            writeln!(
                f,
                "{} {:>2} {:>6}% {}",
                if e.is_top { '>' } else { ' ' },
                e.label,
                e.percentage,
                bar
            )?;
        }
        Ok(())
    }
}

/// Format a probability as a percentage with one decimal.
pub fn format_percentage(p: f64) -> String {
    format!("{:.1}", p * 100.0)
}

/// Rank probabilities in descending order.
///
/// The sort is stable, so equal probabilities keep their index order. NaN
/// entries rank last. An empty input has no best match and is rejected.
pub fn render_scores(probabilities: &[f64]) -> Result<Ranking> {
    if probabilities.is_empty() {
        return Err(SketchError::EmptyInput("probabilities"));
    }
    let mut indexed: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
    let entries = indexed
        .into_iter()
        .enumerate()
        .map(|(rank, (label, probability))| ScoreEntry {
            label,
            probability,
            percentage: format_percentage(probability),
            is_top: rank == 0,
        })
        .collect();
    Ok(Ranking { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_classes() {
        let r = render_scores(&[0.1, 0.7, 0.2]).unwrap();
        let e = r.entries();
        assert_eq!((e[0].label, e[0].percentage.as_str()), (1, "70.0"));
        assert_eq!((e[1].label, e[1].percentage.as_str()), (2, "20.0"));
        assert_eq!((e[2].label, e[2].percentage.as_str()), (0, "10.0"));
        assert!(e[0].is_top);
        assert!(!e[1].is_top);
        assert_eq!(r.best().label.to_string(), "1");
        assert_eq!(r.best_label(), "Digit \"1\"");
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            render_scores(&[]),
            Err(SketchError::EmptyInput("probabilities"))
        );
    }

    #[test]
    fn test_ties_keep_index_order() {
        let r = render_scores(&[0.25, 0.5, 0.25, 0.0]).unwrap();
        let labels: Vec<usize> = r.entries().iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_nan_ranks_last() {
        let r = render_scores(&[f64::NAN, 0.3, 0.6]).unwrap();
        let labels: Vec<usize> = r.entries().iter().map(|e| e.label).collect();
        assert_eq!(labels, vec![2, 1, 0]);
    }

    #[test]
    fn test_percentage_format() {
        assert_eq!(format_percentage(1.0), "100.0");
        assert_eq!(format_percentage(0.0), "0.0");
        assert_eq!(format_percentage(0.12345), "12.3");
    }

    #[test]
    fn test_display() {
        let text = render_scores(&[0.0, 1.0]).unwrap().to_string();
        assert!(text.starts_with("Best match: Digit \"1\""));
        assert!(text.contains(">  1  100.0%"));
    }
}
