//! Distribution statistics and coverage checking over recorded labels.

use crate::state::CheckerState;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// One line of the label distribution summary.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStat {
    /// The label text.
    pub tag: String,
    /// Percentage of successful tests stamped with this tag.
    pub percent: f64,
    /// Declared minimum coverage requirement (0 when none).
    pub required: f64,
}

impl LabelStat {
    /// Whether the declared coverage requirement was missed.
    pub fn shortfall(&self) -> bool {
        self.percent < self.required
    }
}

/// Flatten the recorded label snapshots into a distribution summary.
///
/// A tag counts once per test regardless of how many stamps the test
/// accumulated; this is the single place duplicates collapse. The result
/// is sorted by descending frequency, ties broken by tag.
pub fn summarize(state: &CheckerState) -> Vec<LabelStat> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for snapshot in &state.snapshots {
        let unique: BTreeSet<&str> = snapshot.iter().map(String::as_str).collect();
        for tag in unique {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    let total = state.successes.max(1) as f64;
    let mut stats: Vec<LabelStat> = counts
        .into_iter()
        .map(|(tag, count)| LabelStat {
            tag: tag.to_string(),
            percent: count as f64 / total * 100.0,
            required: state.labels.get(tag).copied().unwrap_or(0.0),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    stats
}

/// Render the distribution graph: unmet coverage requirements first, then
/// the observed distribution in descending frequency order.
pub fn render_distribution(labels: &[LabelStat]) -> String {
    let mut out = String::new();

    for stat in labels.iter().filter(|stat| stat.shortfall()) {
        let _ = writeln!(
            out,
            "    ! insufficient coverage for {:?}: {:.0}% < {:.0}% required",
            stat.tag, stat.percent, stat.required
        );
    }

    for stat in labels {
        let _ = writeln!(out, "    {:>3.0}% {}", stat.percent, stat.tag);
    }

    out
}
