//! Properties and the quantifier combinators that assemble them.
//!
//! A `Property` is a seeded producer of evaluation trees: running it at a
//! (size, seed) pair yields a `Rose` whose root is the outcome for the
//! drawn input and whose children encode the shrink search space for that
//! input. The quantifiers lift predicates over generator/shrinker pairs
//! into properties; everything else here is outcome plumbing.

use crate::arbitrary::Arbitrary;
use crate::data::{Seed, Size};
use crate::gen::Gen;
use crate::result::{Callback, Quantifier, Status, TestResult, FALSIFIABLE};
use crate::rose::{panic_description, Rose, Shrinks};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A runnable property: a test assembled from generators and a predicate.
pub struct Property {
    gen: Gen<Rose>,
}

/// Values a predicate may return: anything convertible to a property.
pub trait Testable: 'static {
    fn into_property(self) -> Property;
}

impl Testable for Property {
    fn into_property(self) -> Property {
        self
    }
}

impl Testable for TestResult {
    fn into_property(self) -> Property {
        Property::of_result(self)
    }
}

impl Testable for bool {
    fn into_property(self) -> Property {
        Property::of_result(TestResult::lift_bool(self))
    }
}

impl Property {
    pub(crate) fn from_gen(gen: Gen<Rose>) -> Self {
        Property { gen }
    }

    /// A property that always evaluates to the given outcome.
    pub fn of_result(result: TestResult) -> Self {
        Property::from_gen(Gen::new(move |_size, _seed| Rose::forced(result.clone())))
    }

    /// Produce the evaluation tree for one (size, seed) pair.
    pub fn eval(&self, size: Size, seed: Seed) -> Rose {
        self.gen.run(size, seed)
    }

    /// Transform every outcome in the evaluation tree.
    pub fn map_total_result<F>(self, f: F) -> Property
    where
        F: Fn(TestResult) -> TestResult + Clone + 'static,
    {
        Property::from_gen(self.gen.map(move |rose| rose.map_result(f.clone())))
    }

    /// Transform every outcome, protecting against a panicking transform.
    /// A panic inside `f` becomes a failed outcome instead of unwinding
    /// through an already-forced tree.
    pub fn map_result<F>(self, f: F) -> Property
    where
        F: Fn(TestResult) -> TestResult + Clone + 'static,
    {
        self.map_total_result(move |result| {
            let g = f.clone();
            match panic::catch_unwind(AssertUnwindSafe(move || g(result))) {
                Ok(result) => result,
                Err(payload) => {
                    let description = panic_description(payload);
                    let mut result =
                        TestResult::failed(&format!("exception raised: {description}"));
                    result.exception = Some(description);
                    result
                }
            }
        })
    }

    /// Prepend a lifecycle hook to every outcome. The hook runs at
    /// dispatch time, never here.
    pub fn callback(self, callback: Callback) -> Property {
        self.map_total_result(move |mut result| {
            result.callbacks.insert(0, callback.clone());
            result
        })
    }

    /// Attach a counterexample description: printed on final failure and
    /// folded into the failure reason.
    pub fn counterexample(self, detail: &str) -> Property {
        let line = detail.to_string();
        self.map_total_result(move |mut result| {
            let printed = line.clone();
            result.callbacks.insert(
                0,
                Callback::after_final_failure(move |_| println!("{printed}")),
            );
            if result.status == Status::Fail && result.exception.is_none() {
                result.reason = if result.reason == FALSIFIABLE {
                    line.clone()
                } else {
                    format!("{line}\n{}", result.reason)
                };
            }
            result
        })
    }

    /// Run a side effect when the minimal counterexample is reported.
    pub fn when_fail<F>(self, f: F) -> Property
    where
        F: Fn() + Clone + 'static,
    {
        self.map_total_result(move |mut result| {
            let f = f.clone();
            result
                .callbacks
                .insert(0, Callback::after_final_failure(move |_| f()));
            result
        })
    }

    /// Stamp the outcome with a label when the condition holds.
    pub fn classify(self, applies: bool, tag: &str) -> Property {
        if !applies {
            return self;
        }
        let tag = tag.to_string();
        self.map_total_result(move |mut result| {
            result.labels.insert(0, (tag.clone(), 0.0));
            result
        })
    }

    /// Unconditionally stamp the outcome with a label.
    pub fn label(self, tag: &str) -> Property {
        self.classify(true, tag)
    }

    /// Stamp the outcome with a label carrying a minimum-coverage
    /// requirement, checked during reporting.
    pub fn cover(self, applies: bool, percent: f64, tag: &str) -> Property {
        if !applies {
            return self;
        }
        let tag = tag.to_string();
        self.map_total_result(move |mut result| {
            result.labels.insert(0, (tag.clone(), percent));
            result
        })
    }

    /// Stamp the outcome with the debug rendering of a value.
    pub fn collect<V: fmt::Debug>(self, value: V) -> Property {
        let tag = format!("{value:?}");
        self.label(&tag)
    }

    /// Declare that this property is expected to fail. A run that never
    /// falsifies it terminates with `NoExpectedFailure`.
    pub fn expect_failure(self) -> Property {
        self.map_total_result(|mut result| {
            result.expect = false;
            result
        })
    }

    /// Run the property a single time.
    pub fn once(self) -> Property {
        self.map_total_result(|mut result| {
            result.abort = true;
            result
        })
    }

    /// Flip pass and fail throughout the tree.
    pub fn invert(self) -> Property {
        self.map_total_result(TestResult::invert)
    }

    /// Retag every outcome with the given quantifier.
    pub fn quantify(self, quantifier: Quantifier) -> Property {
        self.map_total_result(move |mut result| {
            result.quantifier = quantifier;
            result
        })
    }
}

/// Universal quantification with an explicit shrinker.
///
/// Draws a value from the generator and builds the recursive shrink tree:
/// the root outcome is the predicate at the drawn value; its children are
/// the same construction over each of the shrinker's candidates.
pub fn for_all_shrink<T, R, S, F>(gen: Gen<T>, shrinker: S, predicate: F) -> Property
where
    T: Clone + fmt::Debug + 'static,
    R: Testable,
    S: Fn(&T) -> Vec<T> + 'static,
    F: Fn(&T) -> R + 'static,
{
    let shrinker: Rc<dyn Fn(&T) -> Vec<T>> = Rc::new(shrinker);
    let pf: Rc<dyn Fn(&T) -> Property> = Rc::new(move |x: &T| {
        predicate(x)
            .into_property()
            .counterexample(&format!("{x:?}"))
    });
    Property::from_gen(Gen::new(move |size, seed| {
        let (draw, rest) = seed.split();
        let x = gen.run(size, draw);
        eval_shrinking(shrinker.clone(), x, pf.clone(), size, rest)
    }))
}

/// Universal quantification using the type's default shrinker.
pub fn for_all<T, R, F>(gen: Gen<T>, predicate: F) -> Property
where
    T: Arbitrary,
    R: Testable,
    F: Fn(&T) -> R + 'static,
{
    for_all_shrink(gen, |x: &T| x.shrink(), predicate)
}

/// Universal quantification without shrinking.
pub fn for_all_no_shrink<T, R, F>(gen: Gen<T>, predicate: F) -> Property
where
    T: Clone + fmt::Debug + 'static,
    R: Testable,
    F: Fn(&T) -> R + 'static,
{
    for_all_shrink(gen, |_: &T| Vec::new(), predicate)
}

/// A bundle of generators quantifiable as one unit.
///
/// Implemented for tuples of up to eight generators. `nest` folds the
/// tuple into nested single-argument quantification, so one definition
/// covers every arity: the first generator varies slowest, and shrinking
/// an earlier argument re-quantifies every later one.
pub trait GenTuple {
    type Args;

    fn nest<R, F>(self, predicate: F) -> Property
    where
        R: Testable,
        F: Fn(&Self::Args) -> R + 'static;
}

impl<A: Arbitrary> GenTuple for (Gen<A>,) {
    type Args = (A,);

    fn nest<R, F>(self, predicate: F) -> Property
    where
        R: Testable,
        F: Fn(&Self::Args) -> R + 'static,
    {
        for_all(self.0, move |a: &A| predicate(&(a.clone(),)))
    }
}

macro_rules! gen_tuple {
    ($head:ident, $($tail:ident),+) => {
        impl<$head: Arbitrary, $($tail: Arbitrary),+> GenTuple
            for (Gen<$head>, $(Gen<$tail>),+)
        {
            type Args = ($head, $($tail),+);

            fn nest<R, F>(self, predicate: F) -> Property
            where
                R: Testable,
                F: Fn(&Self::Args) -> R + 'static,
            {
                #[allow(non_snake_case)]
                let ($head, $($tail),+) = self;
                let predicate = Rc::new(predicate);
                for_all($head, move |head: &$head| {
                    let head = head.clone();
                    let predicate = predicate.clone();
                    ($($tail.clone(),)+).nest(move |tail: &($($tail,)+)| {
                        #[allow(non_snake_case)]
                        let ($($tail,)+) = tail.clone();
                        predicate(&(head.clone(), $($tail),+))
                    })
                })
            }
        }
    };
}

gen_tuple!(A, B);
gen_tuple!(A, B, C);
gen_tuple!(A, B, C, D);
gen_tuple!(A, B, C, D, E);
gen_tuple!(A, B, C, D, E, G);
gen_tuple!(A, B, C, D, E, G, H);
gen_tuple!(A, B, C, D, E, G, H, I);

/// Universal quantification over a tuple of generators.
pub fn for_all_args<G, R, F>(gens: G, predicate: F) -> Property
where
    G: GenTuple,
    R: Testable,
    F: Fn(&G::Args) -> R + 'static,
{
    gens.nest(predicate)
}

/// Two-argument universal quantification by nesting.
///
/// The first argument varies slowest: shrinking it re-triggers full
/// quantification over the second, while shrinking the second leaves the
/// first fixed.
pub fn for_all2<A, B, R, F>(ga: Gen<A>, gb: Gen<B>, predicate: F) -> Property
where
    A: Arbitrary,
    B: Arbitrary,
    R: Testable,
    F: Fn(&A, &B) -> R + 'static,
{
    for_all_args((ga, gb), move |(a, b): &(A, B)| predicate(a, b))
}

/// Three-argument universal quantification by nesting.
pub fn for_all3<A, B, C, R, F>(ga: Gen<A>, gb: Gen<B>, gc: Gen<C>, predicate: F) -> Property
where
    A: Arbitrary,
    B: Arbitrary,
    C: Arbitrary,
    R: Testable,
    F: Fn(&A, &B, &C) -> R + 'static,
{
    for_all_args((ga, gb, gc), move |(a, b, c): &(A, B, C)| predicate(a, b, c))
}

/// Bounded existential quantification.
///
/// Built by inverting the predicate, running it as a non-shrinking
/// universal, inverting the outcome back, and retagging it existential.
/// The runner treats a passing existential outcome as a found witness and
/// a failing one as a discard, so the discard budget bounds the search.
/// Witnesses are never shrunk.
pub fn exists<T, R, F>(gen: Gen<T>, predicate: F) -> Property
where
    T: Clone + fmt::Debug + 'static,
    R: Testable,
    F: Fn(&T) -> R + 'static,
{
    for_all_no_shrink(gen, move |x: &T| predicate(x).into_property().invert())
        .invert()
        .quantify(Quantifier::Existential)
}

/// Precondition guard: an unmet precondition discards the test case
/// instead of failing it.
pub fn implies<R: Testable>(precondition: bool, conclusion: R) -> Property {
    if precondition {
        conclusion.into_property()
    } else {
        Property::of_result(TestResult::rejected())
    }
}

/// The recursive shrink-tree constructor.
///
/// The returned node is deferred: forcing it evaluates the inner property
/// at the fixed (size, seed); reading its children runs the shrinker.
/// Candidate subtrees for the current argument come first, followed by
/// the inner tree's own children (shrinks of later arguments), so an
/// earlier argument always shrinks before a later one.
fn eval_shrinking<T>(
    shrinker: Rc<dyn Fn(&T) -> Vec<T>>,
    x: T,
    pf: Rc<dyn Fn(&T) -> Property>,
    size: Size,
    seed: Seed,
) -> Rose
where
    T: Clone + fmt::Debug + 'static,
{
    Rose::defer(move || {
        let mut inner = pf(&x).eval(size, seed);
        inner.reduce();
        let (result, inner_shrinks) = inner.into_parts();
        let child_shrinker = shrinker.clone();
        let child_pf = pf.clone();
        Rose::with_shrinks(
            result,
            Shrinks::deferred(move || {
                let mut children: Vec<Rose> = child_shrinker(&x)
                    .into_iter()
                    .map(|candidate| {
                        eval_shrinking(
                            child_shrinker.clone(),
                            candidate,
                            child_pf.clone(),
                            size,
                            seed,
                        )
                    })
                    .collect();
                children.extend(inner_shrinks.produce());
                children
            }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shrink::shrink_int;
    use std::cell::RefCell;

    fn force(property: &Property, seed: u64) -> Rose {
        let mut rose = property.eval(Size(50), Seed::from_u64(seed));
        rose.reduce();
        rose
    }

    #[test]
    fn test_boolean_predicate_lifts() {
        let property = for_all_no_shrink(Gen::int_range(0, 5), |&x| x <= 5);
        let rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Pass);
    }

    #[test]
    fn test_failure_reason_carries_counterexample() {
        let property = for_all_no_shrink(Gen::constant(42), |&x: &i32| x < 42);
        let rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Fail);
        assert_eq!(rose.result().reason, "42");
    }

    #[test]
    fn test_shrink_children_follow_the_shrinker() {
        let property = for_all_shrink(Gen::constant(10), |&x| shrink_int(x), |&x: &i32| x < 10);
        let mut rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Fail);

        // shrink_int(10) opens with 0; that candidate's subtree passes
        let mut children = rose.take_children();
        assert_eq!(children.len(), shrink_int(10).len());
        let first = &mut children[0];
        first.reduce();
        assert_eq!(first.result().status, Status::Pass);
    }

    #[test]
    fn test_nesting_draws_first_argument_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let (oa, ob) = (order.clone(), order.clone());
        let ga = Gen::new(move |_, _| {
            oa.borrow_mut().push('a');
            1i32
        });
        let gb = Gen::new(move |_, _| {
            ob.borrow_mut().push('b');
            2i32
        });

        let property = for_all2(ga, gb, |&a, &b| a + b == 3);
        let rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Pass);
        assert_eq!(*order.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn test_shrinking_second_argument_keeps_first_fixed() {
        // (a, b) = (3, 10) fails b < 10; candidate children for b keep a = 3.
        let property = for_all2(Gen::constant(3), Gen::constant(10), |&a: &i32, &b: &i32| {
            a == 3 && b < 10
        });
        let mut rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Fail);

        // Children: a's shrink candidates first, then b's (under fixed a).
        let a_candidates = shrink_int(3).len();
        let mut children = rose.take_children();
        assert!(children.len() > a_candidates);

        // Every a-shrink re-quantifies b and still fails only through b;
        // a b-shrink subtree that changes b to a passing value holds.
        let b_child = &mut children[a_candidates];
        b_child.reduce();
        assert_eq!(b_child.result().status, Status::Pass);
    }

    #[test]
    fn test_tuple_quantification_orders_counterexample_lines() {
        let property = for_all_args(
            (
                Gen::constant(1),
                Gen::constant(2),
                Gen::constant(3),
                Gen::constant(4),
            ),
            |&(a, b, c, d): &(i32, i32, i32, i32)| a + b + c + d < 10,
        );
        let rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Fail);
        assert_eq!(rose.result().reason, "1\n2\n3\n4");
    }

    #[test]
    fn test_classify_prepends_stamps_without_dedup() {
        let property = for_all_no_shrink(Gen::constant(4), |&x: &i32| {
            implies(true, x % 2 == 0)
                .label("even")
                .label("even")
                .cover(true, 30.0, "small")
        });
        let rose = force(&property, 1);
        let labels = &rose.result().labels;
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], ("small".to_string(), 30.0));
        assert_eq!(labels[1], ("even".to_string(), 0.0));
        assert_eq!(labels[2], ("even".to_string(), 0.0));
    }

    #[test]
    fn test_implies_discards() {
        let property = for_all_no_shrink(Gen::constant(3), |&x: &i32| implies(x % 2 == 0, false));
        let rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Discard);
    }

    #[test]
    fn test_exists_tags_outcomes_existential() {
        let witness = exists(Gen::constant(5), |&x: &i32| x == 5);
        let rose = force(&witness, 1);
        assert_eq!(rose.result().quantifier, Quantifier::Existential);
        assert_eq!(rose.result().status, Status::Pass);

        let hopeless = exists(Gen::constant(5), |&x: &i32| x == 6);
        let rose = force(&hopeless, 1);
        assert_eq!(rose.result().quantifier, Quantifier::Existential);
        assert_eq!(rose.result().status, Status::Fail);
    }

    #[test]
    fn test_expect_failure_and_once_flags() {
        let property = for_all_no_shrink(Gen::constant(1), |&x: &i32| x == 1)
            .expect_failure()
            .once();
        let rose = force(&property, 1);
        assert!(!rose.result().expect);
        assert!(rose.result().abort);
    }

    #[test]
    fn test_panicking_predicate_is_caught() {
        let property = for_all_no_shrink(Gen::constant(1), |_: &i32| -> bool {
            panic!("bad oracle")
        });
        let rose = force(&property, 1);
        assert_eq!(rose.result().status, Status::Fail);
        assert!(rose.result().exception.as_deref().unwrap().contains("bad oracle"));
    }
}
