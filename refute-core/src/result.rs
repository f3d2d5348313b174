//! The outcome model: the tri-state result of one concrete test evaluation.

use std::fmt;
use std::rc::Rc;

/// Reason string attached to a plain boolean falsification.
pub const FALSIFIABLE: &str = "Falsifiable";

/// Tri-state verdict of a single test evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The predicate definitely held.
    Pass,
    /// The predicate definitely did not hold.
    Fail,
    /// The test case was rejected (precondition not met); it counts
    /// against the discard budget only.
    Discard,
}

/// Which quantifier a test outcome was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// The property must hold for every sampled value.
    Universal,
    /// The property must hold for at least one sampled value within the
    /// bounded search.
    Existential,
}

/// A lifecycle hook carried on a test outcome.
///
/// Hooks are accumulated by combinators and dispatched by the runner:
/// `AfterTest` after every forced evaluation, `AfterFinalFailure` once the
/// shrink search has settled on a minimal counterexample. Applying a
/// combinator never runs the hook.
#[derive(Clone)]
pub enum Callback {
    AfterTest(Rc<dyn Fn(&TestResult)>),
    AfterFinalFailure(Rc<dyn Fn(&TestResult)>),
}

impl Callback {
    /// Build a post-test hook.
    pub fn after_test<F: Fn(&TestResult) + 'static>(f: F) -> Self {
        Callback::AfterTest(Rc::new(f))
    }

    /// Build a post-final-failure hook.
    pub fn after_final_failure<F: Fn(&TestResult) + 'static>(f: F) -> Self {
        Callback::AfterFinalFailure(Rc::new(f))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::AfterTest(_) => write!(f, "AfterTest(..)"),
            Callback::AfterFinalFailure(_) => write!(f, "AfterFinalFailure(..)"),
        }
    }
}

/// The outcome of evaluating a property at one concrete input.
///
/// Outcomes are value objects: created fresh at each evaluation and only
/// ever "modified" by combinators that return an updated copy.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Tri-state verdict.
    pub status: Status,

    /// Whether the author expects the property to hold. Inverted by
    /// `expect_failure`.
    pub expect: bool,

    /// Human-readable failure explanation.
    pub reason: String,

    /// Captured panic description, if the predicate panicked. Caught at
    /// the point of invocation, never silently dropped.
    pub exception: Option<String>,

    /// Ordered `(tag, minimum-expected-percentage)` stamps accumulated by
    /// the classification combinators. Duplicates are kept; deduplication
    /// happens only during reporting.
    pub labels: Vec<(String, f64)>,

    /// Ordered lifecycle hooks, dispatched by the runner.
    pub callbacks: Vec<Callback>,

    /// Run-once semantics: terminate the run after this test.
    pub abort: bool,

    /// Quantifier this outcome was produced under.
    pub quantifier: Quantifier,
}

impl TestResult {
    fn base(status: Status, reason: &str) -> Self {
        TestResult {
            status,
            expect: true,
            reason: reason.to_string(),
            exception: None,
            labels: Vec::new(),
            callbacks: Vec::new(),
            abort: false,
            quantifier: Quantifier::Universal,
        }
    }

    /// The baseline passing outcome.
    pub fn succeeded() -> Self {
        TestResult::base(Status::Pass, "")
    }

    /// The baseline failing outcome.
    pub fn failed(reason: &str) -> Self {
        TestResult::base(Status::Fail, reason)
    }

    /// The baseline discarded outcome.
    pub fn rejected() -> Self {
        TestResult::base(Status::Discard, "")
    }

    /// Map a boolean predicate result into an outcome.
    pub fn lift_bool(value: bool) -> Self {
        if value {
            TestResult::succeeded()
        } else {
            TestResult::failed(FALSIFIABLE)
        }
    }

    /// Flip pass and fail, leaving discards untouched.
    ///
    /// This is the pure data transformation existential quantification is
    /// built from; it is never expressed through control flow.
    pub fn invert(mut self) -> Self {
        self.status = match self.status {
            Status::Pass => Status::Fail,
            Status::Fail => Status::Pass,
            Status::Discard => Status::Discard,
        };
        self
    }

    /// True when the outcome represents a failure of the property as the
    /// author stated it (taking `expect` at face value, not inverted).
    pub fn is_failure(&self) -> bool {
        self.status == Status::Fail
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Status::Pass => write!(f, "passed"),
            Status::Discard => write!(f, "discarded"),
            Status::Fail => {
                if let Some(exception) = &self.exception {
                    write!(f, "failed with exception: {exception}")
                } else {
                    write!(f, "failed: {}", self.reason)
                }
            }
        }
    }
}
