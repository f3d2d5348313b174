//! The lazy evaluation tree for a test and its shrink candidates.
//!
//! A `Rose` node pairs a test outcome with an on-demand sequence of
//! "smaller candidate" subtrees. The tree is conceptually infinite in the
//! shrink direction: a child is an unevaluated thunk until the shrink
//! search actually visits it, so building a node never evaluates the
//! predicate for any of its candidates.

use crate::result::TestResult;
use std::panic::{self, AssertUnwindSafe};

type Thunk = Box<dyn FnOnce() -> Rose>;
type ChildThunk = Box<dyn FnOnce() -> Vec<Rose>>;

/// The lazily-produced ordered sequence of shrink-candidate subtrees
/// under a forced node.
pub struct Shrinks {
    seq: ShrinkSeq,
}

enum ShrinkSeq {
    Thunked(ChildThunk),
    Ready(Vec<Rose>),
}

impl Shrinks {
    /// No candidates at all.
    pub fn none() -> Self {
        Shrinks {
            seq: ShrinkSeq::Ready(Vec::new()),
        }
    }

    /// Candidates produced on demand by the given closure.
    pub fn deferred<F: FnOnce() -> Vec<Rose> + 'static>(f: F) -> Self {
        Shrinks {
            seq: ShrinkSeq::Thunked(Box::new(f)),
        }
    }

    /// Already-materialized candidates.
    pub fn ready(children: Vec<Rose>) -> Self {
        Shrinks {
            seq: ShrinkSeq::Ready(children),
        }
    }

    /// Materialize the candidate sequence, consuming it.
    pub fn produce(self) -> Vec<Rose> {
        match self.seq {
            ShrinkSeq::Thunked(f) => f(),
            ShrinkSeq::Ready(children) => children,
        }
    }
}

enum Node {
    /// A node whose outcome has been forced. The children remain thunked
    /// until taken.
    Forced {
        result: TestResult,
        children: Shrinks,
    },
    /// A node that must run its side-effecting step to become `Forced`.
    Pending(Thunk),
    /// Transient marker while a thunk is running; observing it means the
    /// thunk re-entered its own node.
    Running,
}

/// A lazy evaluation-tree node.
///
/// Invariant: forcing the same node twice yields the same outcome. Only a
/// `Pending` node performs a side effect, and [`Rose::reduce`] collapses
/// it to `Forced` exactly once before any field can be read.
pub struct Rose {
    node: Node,
}

impl Rose {
    /// A forced node with no shrink candidates.
    pub fn forced(result: TestResult) -> Self {
        Rose {
            node: Node::Forced {
                result,
                children: Shrinks::none(),
            },
        }
    }

    /// A forced node with the given candidate sequence.
    pub fn with_shrinks(result: TestResult, children: Shrinks) -> Self {
        Rose {
            node: Node::Forced { result, children },
        }
    }

    /// A node whose evaluation is deferred until [`Rose::reduce`].
    pub fn defer<F: FnOnce() -> Rose + 'static>(f: F) -> Self {
        Rose {
            node: Node::Pending(Box::new(f)),
        }
    }

    /// Whether this node has been forced.
    pub fn is_forced(&self) -> bool {
        matches!(self.node, Node::Forced { .. })
    }

    /// Force the node until it holds an outcome.
    ///
    /// Runs the deferred step at most once; a second call is a no-op. A
    /// panic raised by the step (the predicate is the usual culprit) is
    /// caught here, at the point of invocation, and converted into a
    /// failed outcome carrying the panic description.
    pub fn reduce(&mut self) {
        while !self.is_forced() {
            let node = std::mem::replace(&mut self.node, Node::Running);
            let thunk = match node {
                Node::Pending(thunk) => thunk,
                Node::Running => panic!("rose node re-entered while being reduced"),
                Node::Forced { .. } => unreachable!(),
            };
            match panic::catch_unwind(AssertUnwindSafe(thunk)) {
                Ok(rose) => self.node = rose.node,
                Err(payload) => {
                    let description = panic_description(payload);
                    let mut result =
                        TestResult::failed(&format!("exception raised: {description}"));
                    result.exception = Some(description);
                    self.node = Node::Forced {
                        result,
                        children: Shrinks::none(),
                    };
                }
            }
        }
    }

    /// The forced outcome.
    ///
    /// Reading an unreduced node is a programming invariant violation,
    /// not a recoverable error, and panics with a diagnostic.
    pub fn result(&self) -> &TestResult {
        match &self.node {
            Node::Forced { result, .. } => result,
            _ => panic!("rose node read before reduction"),
        }
    }

    /// Split a forced node into its outcome and candidate sequence.
    pub fn into_parts(self) -> (TestResult, Shrinks) {
        match self.node {
            Node::Forced { result, children } => (result, children),
            _ => panic!("rose node read before reduction"),
        }
    }

    /// Take ownership of the candidate sequence, materializing it.
    /// The node keeps its outcome; the candidates can be taken once.
    pub fn take_children(&mut self) -> Vec<Rose> {
        match &mut self.node {
            Node::Forced { children, .. } => {
                std::mem::replace(children, Shrinks::none()).produce()
            }
            _ => panic!("rose node read before reduction"),
        }
    }

    /// Lazily transform every outcome in the tree.
    ///
    /// Pending nodes stay pending; candidate subtrees are re-wrapped on
    /// demand, so no predicate evaluation is triggered.
    pub fn map_result<F>(self, f: F) -> Rose
    where
        F: Fn(TestResult) -> TestResult + Clone + 'static,
    {
        match self.node {
            Node::Pending(thunk) => Rose::defer(move || thunk().map_result(f)),
            Node::Running => panic!("rose node re-entered while being reduced"),
            Node::Forced { result, children } => {
                let g = f.clone();
                Rose::with_shrinks(
                    f(result),
                    Shrinks::deferred(move || {
                        children
                            .produce()
                            .into_iter()
                            .map(|child| child.map_result(g.clone()))
                            .collect()
                    }),
                )
            }
        }
    }
}

impl std::fmt::Debug for Rose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node {
            Node::Forced { result, .. } => write!(f, "Rose::Forced({result})"),
            Node::Pending(_) => write!(f, "Rose::Pending(..)"),
            Node::Running => write!(f, "Rose::Running"),
        }
    }
}

pub(crate) fn panic_description(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
