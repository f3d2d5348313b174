//! The immutable-per-step record threaded through the run loop.

use crate::data::{Config, Seed, Size};
use crate::result::{Quantifier, TestResult};
use std::collections::BTreeMap;
use std::rc::Rc;

/// The checker's state between two iterations of the run loop.
///
/// Transitions produce a new state rather than mutating shared state;
/// there is no aliasing between iterations, so replaying a transition is
/// always safe.
#[derive(Clone)]
pub struct CheckerState {
    /// Property name, for reporting.
    pub name: String,

    /// Configured success target.
    pub max_success: usize,

    /// Configured discard budget.
    pub max_discard: usize,

    /// Configured size ceiling.
    pub max_size: usize,

    /// Maps (successes, discards) to the size for the next test.
    pub compute_size: Rc<dyn Fn(usize, usize) -> Size>,

    /// Successful tests so far.
    pub successes: usize,

    /// Discarded tests so far.
    pub discards: usize,

    /// Label histogram: tag to the maximum required percentage seen.
    pub labels: BTreeMap<String, f64>,

    /// Per-test label snapshots, most recent first.
    pub snapshots: Vec<Vec<String>>,

    /// Whether any outcome declared the property expected to fail.
    pub failure_expected: bool,

    /// Whether an expected failure has already occurred.
    pub expected_failure_seen: bool,

    /// Seed for the next test.
    pub seed: Seed,

    /// Completed shrink passes.
    pub successful_shrinks: usize,

    /// Candidates visited that did not fail, total.
    pub failed_shrinks: usize,

    /// Candidates visited that did not fail since the last adoption.
    pub failed_shrink_distance: usize,

    /// Run-once flag carried forward from outcomes.
    pub abort: bool,

    /// Active quantifier carried forward from outcomes.
    pub quantifier: Quantifier,
}

impl CheckerState {
    /// Fresh state for a run of the given property under `config`.
    pub fn new(name: &str, config: &Config, seed: Seed) -> Self {
        let schedule = config.clone();
        CheckerState {
            name: name.to_string(),
            max_success: config.max_success,
            max_discard: config.max_discard,
            max_size: config.max_size,
            compute_size: Rc::new(move |successes, discards| {
                schedule.compute_size(successes, discards)
            }),
            successes: 0,
            discards: 0,
            labels: BTreeMap::new(),
            snapshots: Vec::new(),
            failure_expected: false,
            expected_failure_seen: false,
            seed,
            successful_shrinks: 0,
            failed_shrinks: 0,
            failed_shrink_distance: 0,
            abort: false,
            quantifier: Quantifier::Universal,
        }
    }

    /// The generator size for the next test.
    pub fn next_size(&self) -> Size {
        (self.compute_size)(self.successes, self.discards)
    }

    /// Fold a passing outcome into the state.
    pub fn on_success(mut self, result: &TestResult) -> Self {
        self.successes += 1;
        self.merge_labels(result);
        let snapshot = result.labels.iter().map(|(tag, _)| tag.clone()).collect();
        self.snapshots.insert(0, snapshot);
        self.note_flags(result);
        self
    }

    /// Fold a discarded outcome into the state.
    pub fn on_discard(mut self, result: &TestResult) -> Self {
        self.discards += 1;
        self.merge_labels(result);
        self.note_flags(result);
        self
    }

    /// Fold a failure that the author declared they expected.
    pub fn on_expected_failure(mut self, result: &TestResult) -> Self {
        self.successes += 1;
        self.merge_labels(result);
        let snapshot = result.labels.iter().map(|(tag, _)| tag.clone()).collect();
        self.snapshots.insert(0, snapshot);
        self.note_flags(result);
        self.expected_failure_seen = true;
        self
    }

    /// Keep the maximum required percentage per tag across all outcomes.
    fn merge_labels(&mut self, result: &TestResult) {
        for (tag, required) in &result.labels {
            let entry = self.labels.entry(tag.clone()).or_insert(0.0);
            if *required > *entry {
                *entry = *required;
            }
        }
    }

    fn note_flags(&mut self, result: &TestResult) {
        self.abort = self.abort || result.abort;
        self.quantifier = result.quantifier;
        if !result.expect {
            self.failure_expected = true;
        }
    }
}
