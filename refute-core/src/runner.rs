//! The iterative test-running state machine and the shrink search.

use crate::data::{Config, Seed, Size};
use crate::error::{RefuteError, Result};
use crate::property::Property;
use crate::report::{render_distribution, summarize, LabelStat};
use crate::result::{Callback, Quantifier, Status, TestResult};
use crate::rose::Rose;
use crate::state::CheckerState;
use std::fmt;

/// Terminal result of a full property run.
#[derive(Debug, Clone)]
pub enum RunResult {
    /// Enough tests passed (or the property failed as expected).
    Success {
        tests: usize,
        labels: Vec<LabelStat>,
    },

    /// The discard budget ran out before enough tests passed.
    GaveUp {
        tests: usize,
        discards: usize,
        labels: Vec<LabelStat>,
    },

    /// The property was falsified; `reason` describes the minimal
    /// counterexample found by the shrink search, and `seed`/`size`
    /// replay the original failing test. `failed_shrinks` counts the
    /// dead-end candidates the search visited.
    Failure {
        tests: usize,
        shrinks: usize,
        failed_shrinks: usize,
        seed: Seed,
        size: Size,
        reason: String,
        labels: Vec<LabelStat>,
    },

    /// An existential property exhausted its search budget without
    /// finding a witness. Never shrunk.
    ExistentialFailure {
        tests: usize,
        seed: Seed,
        size: Size,
        reason: String,
        labels: Vec<LabelStat>,
        last_result: Box<TestResult>,
    },

    /// The property was declared `expect_failure` but never failed.
    NoExpectedFailure {
        tests: usize,
        labels: Vec<LabelStat>,
    },
}

impl RunResult {
    /// Whether the run ended on the success path.
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success { .. })
    }

    /// Convert the terminal result into a `Result` carrying the number
    /// of successful tests.
    pub fn into_result(self) -> Result<usize> {
        match self {
            RunResult::Success { tests, .. } => Ok(tests),
            RunResult::GaveUp {
                tests, discards, ..
            } => Err(RefuteError::GaveUp { discards, tests }),
            RunResult::Failure {
                tests,
                shrinks,
                reason,
                ..
            } => Err(RefuteError::Falsified {
                reason,
                tests,
                shrinks,
            }),
            RunResult::ExistentialFailure { reason, .. } => Err(RefuteError::NoWitness { reason }),
            RunResult::NoExpectedFailure { tests, .. } => {
                Err(RefuteError::UnexpectedSuccess { tests })
            }
        }
    }

    /// The label distribution recorded for the run.
    pub fn labels(&self) -> &[LabelStat] {
        match self {
            RunResult::Success { labels, .. }
            | RunResult::GaveUp { labels, .. }
            | RunResult::Failure { labels, .. }
            | RunResult::ExistentialFailure { labels, .. }
            | RunResult::NoExpectedFailure { labels, .. } => labels,
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunResult::Success { tests, labels } => {
                write!(f, "  ✓ passed {tests} tests.")?;
                if !labels.is_empty() {
                    write!(f, "\n\n  Label distribution:\n{}", render_distribution(labels))?;
                }
                Ok(())
            }
            RunResult::GaveUp {
                tests, discards, ..
            } => write!(
                f,
                "  ⚐ gave up after {discards} discards ({tests} tests passed)."
            ),
            RunResult::Failure {
                tests,
                shrinks,
                failed_shrinks,
                seed,
                size,
                reason,
                ..
            } => {
                writeln!(
                    f,
                    "  ✗ failed after {tests} tests and {shrinks} shrinks ({failed_shrinks} dead ends)."
                )?;
                for line in reason.lines() {
                    writeln!(f, "    {line}")?;
                }
                write!(f, "    Replay with {seed} at {size}.")
            }
            RunResult::ExistentialFailure { tests, .. } => {
                write!(f, "  ✗ no witness found ({tests} tests evaluated).")
            }
            RunResult::NoExpectedFailure { tests, .. } => {
                write!(f, "  ✗ expected failure, but passed {tests} tests.")
            }
        }
    }
}

/// Check a property, printing a report to stdout.
///
/// Returns the terminal run result; an `Err` means the configuration was
/// unusable, never that the property failed.
pub fn check(property: Property, name: &str, config: &Config) -> Result<RunResult> {
    let result = check_result(property, name, config)?;
    println!("━━━ {name} ━━━");
    println!("{result}");
    Ok(result)
}

/// Check a property with the default configuration, printing a report.
pub fn quick_check(property: Property, name: &str) -> Result<RunResult> {
    check(property, name, &Config::default())
}

/// Check a property without printing anything.
pub fn check_result(property: Property, name: &str, config: &Config) -> Result<RunResult> {
    config.validate()?;
    let seed = match config.replay {
        Some((seed, _)) => seed,
        None => Seed::random(),
    };
    let mut state = CheckerState::new(name, config, seed);
    let mut no_witness: Option<(Seed, Size, TestResult)> = None;

    loop {
        if state.successes >= state.max_success || state.abort {
            return Ok(done_testing(&state));
        }
        if state.discards >= state.max_discard {
            return Ok(give_up(&state, no_witness));
        }

        // Replay pins the first test to the recorded seed and size,
        // re-evaluating at exactly the pair the failure was recorded
        // under; normal scheduling resumes afterwards.
        let first_test = state.successes == 0 && state.discards == 0;
        let (size, test_seed, next_seed) = match config.replay {
            Some((replay_seed, replay_size)) if first_test => {
                let (_, next_seed) = state.seed.split();
                (replay_size, replay_seed, next_seed)
            }
            _ => {
                let (test_seed, next_seed) = state.seed.split();
                (state.next_size(), test_seed, next_seed)
            }
        };

        let mut rose = property.eval(size, test_seed);
        rose.reduce();
        let result = rose.result().clone();
        dispatch_after_test(&result);

        match result.status {
            Status::Pass => {
                state = state.on_success(&result);
                if result.quantifier == Quantifier::Existential {
                    // one witness is enough
                    return Ok(RunResult::Success {
                        tests: state.successes,
                        labels: summarize(&state),
                    });
                }
            }
            Status::Discard => {
                state = state.on_discard(&result);
            }
            Status::Fail if result.quantifier == Quantifier::Existential => {
                // a refuted sample is only a discard for an existential
                no_witness = Some((test_seed, size, result.clone()));
                state = state.on_discard(&result);
            }
            Status::Fail if !result.expect => {
                // failed as expected
                state = state.on_expected_failure(&result);
                return Ok(done_testing(&state));
            }
            Status::Fail => {
                if result.exception.is_some() {
                    // broken oracle: nothing to shrink around
                    dispatch_after_final_failure(&result);
                    return Ok(failure(state, test_seed, size, &result));
                }
                let search = shrink_search(rose, state);
                dispatch_after_final_failure(&search.last);
                return Ok(failure(search.state, test_seed, size, &search.last));
            }
        }

        state.seed = next_seed;
    }
}

fn done_testing(state: &CheckerState) -> RunResult {
    if state.failure_expected && !state.expected_failure_seen {
        RunResult::NoExpectedFailure {
            tests: state.successes,
            labels: summarize(state),
        }
    } else {
        RunResult::Success {
            tests: state.successes,
            labels: summarize(state),
        }
    }
}

fn give_up(state: &CheckerState, no_witness: Option<(Seed, Size, TestResult)>) -> RunResult {
    if state.successes == 0 {
        if let Some((seed, size, last)) = no_witness {
            return RunResult::ExistentialFailure {
                tests: state.successes,
                seed,
                size,
                reason: last.reason.clone(),
                labels: summarize(state),
                last_result: Box::new(last),
            };
        }
    }
    RunResult::GaveUp {
        tests: state.successes,
        discards: state.discards,
        labels: summarize(state),
    }
}

fn failure(state: CheckerState, seed: Seed, size: Size, last: &TestResult) -> RunResult {
    let reason = match &last.exception {
        Some(description) => format!("exception raised: {description}"),
        None => last.reason.clone(),
    };
    RunResult::Failure {
        tests: state.successes + 1,
        shrinks: state.successful_shrinks,
        failed_shrinks: state.failed_shrinks,
        seed,
        size,
        reason,
        labels: summarize(&state),
    }
}

struct ShrinkSearch {
    last: TestResult,
    state: CheckerState,
}

/// Greedy minimization over the failing tree's lazy candidate sequence.
///
/// Each pass scans the current branches in generation order and adopts
/// the first still-failing one, taking its children as the next branch
/// set. A pass with no failing branch ends the search: the last adopted
/// outcome is locally minimal. The counters live here and nowhere else;
/// they travel back to the caller by value inside the state.
fn shrink_search(mut root: Rose, mut state: CheckerState) -> ShrinkSearch {
    let mut last = root.result().clone();
    let mut branches = root.take_children();

    while !branches.is_empty() {
        let mut adopted = None;

        for mut branch in branches {
            branch.reduce();
            let result = branch.result().clone();
            dispatch_after_test(&result);

            if result.exception.is_some() {
                // a panic mid-shrink means the minimization itself is
                // unreliable; abort the run with it
                return ShrinkSearch {
                    last: result,
                    state,
                };
            }

            if result.status == Status::Fail {
                state.failed_shrink_distance = 0;
                last = result;
                adopted = Some(branch.take_children());
                break;
            }

            state.failed_shrinks += 1;
            state.failed_shrink_distance += 1;
        }

        // every completed pass counts, the terminal one included
        state.successful_shrinks += 1;
        match adopted {
            Some(children) => branches = children,
            None => break,
        }
    }

    ShrinkSearch { last, state }
}

fn dispatch_after_test(result: &TestResult) {
    for callback in &result.callbacks {
        if let Callback::AfterTest(hook) = callback {
            hook(result);
        }
    }
}

fn dispatch_after_final_failure(result: &TestResult) {
    for callback in &result.callbacks {
        if let Callback::AfterFinalFailure(hook) = callback {
            hook(result);
        }
    }
}
