//! End-to-end tests of the check loop through the public API.

use refute::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn run(property: Property) -> RunResult {
    check_result(property, "engine-test", &Config::default()).unwrap()
}

#[test]
fn reverse_round_trip_passes_one_hundred_tests() {
    let gen = vec_of(Gen::int_range(-1000, 1000)).resize(20);
    let result = run(for_all(gen, |xs: &Vec<i32>| {
        let mut ys = xs.clone();
        ys.reverse();
        ys.reverse();
        ys == *xs
    }));
    match result {
        RunResult::Success { tests, .. } => assert_eq!(tests, 100),
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn small_int_property_shrinks_to_ten() {
    let result = run(for_all(Gen::int_range(0, 100), |&x: &i32| x < 10));
    match result {
        RunResult::Failure { reason, .. } => assert_eq!(reason, "10"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn reported_counterexample_fails_when_replayed_independently() {
    let predicate = |x: i32| x < 10;
    let result = run(for_all(Gen::int_range(0, 100), move |&x: &i32| predicate(x)));
    let RunResult::Failure { reason, .. } = result else {
        panic!("expected failure, got {result:?}");
    };
    let minimal: i32 = reason.parse().unwrap();
    assert!(!predicate(minimal));
}

#[test]
fn run_loop_evaluates_at_most_successes_plus_discards() {
    let evaluations = Rc::new(Cell::new(0usize));
    let counter = evaluations.clone();
    let config = Config::default().with_successes(25).with_discards(40);
    let property = for_all_no_shrink(Gen::int_range(0, 3), move |&x: &i32| {
        counter.set(counter.get() + 1);
        implies(x == 0, true)
    });
    let _ = check_result(property, "bound", &config).unwrap();
    assert!(evaluations.get() <= 25 + 40);
}

#[test]
fn discarded_tests_are_invisible_in_the_success_count() {
    let config = Config::default().with_successes(10).with_discards(500);
    let result = check_result(
        for_all_no_shrink(Gen::int_range(0, 1), |&x: &i32| implies(x == 0, true)),
        "discard-transparency",
        &config,
    )
    .unwrap();
    match result {
        RunResult::Success { tests, .. } => assert_eq!(tests, 10),
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn exists_finds_a_guaranteed_witness() {
    let result = run(exists(Gen::int_range(0, 10), |&x: &i32| x == 5));
    assert!(result.is_success());
}

#[test]
fn exists_with_no_witness_exhausts_the_budget() {
    let config = Config::default().with_discards(60);
    let result = check_result(
        exists(Gen::int_range(0, 10), |_: &i32| false),
        "no-witness",
        &config,
    )
    .unwrap();
    match result {
        RunResult::ExistentialFailure { tests, .. } => assert_eq!(tests, 0),
        other => panic!("expected existential failure, got {other:?}"),
    }
}

#[test]
fn giving_up_reports_the_discard_count() {
    let config = Config::default().with_discards(35);
    let result = check_result(
        for_all_no_shrink(Gen::bool(), |_: &bool| implies(false, true)),
        "give-up",
        &config,
    )
    .unwrap();
    match result {
        RunResult::GaveUp {
            tests, discards, ..
        } => {
            assert_eq!(tests, 0);
            assert_eq!(discards, 35);
        }
        other => panic!("expected give-up, got {other:?}"),
    }
}

#[test]
fn error_conversions_name_the_failure_kind() {
    let falsified = run(for_all(Gen::int_range(0, 100), |&x: &i32| x < 10))
        .into_result()
        .unwrap_err();
    assert!(matches!(falsified, RefuteError::Falsified { .. }));
    assert!(falsified.to_string().contains("falsified"));

    let passed = run(for_all(Gen::bool(), |_: &bool| true)).into_result();
    assert_eq!(passed.unwrap(), 100);
}

#[test]
fn nested_quantifiers_shrink_the_first_argument_first() {
    // The predicate only constrains b, so the irrelevant first argument
    // shrinks all the way to 0 before b descends to its boundary; the
    // reported counterexample lists a before b.
    let result = run(for_all2(
        Gen::int_range(0, 50),
        Gen::int_range(0, 100),
        |_: &i32, &b: &i32| b < 10,
    ));
    let RunResult::Failure { reason, .. } = result else {
        panic!("expected failure, got {result:?}");
    };
    let values: Vec<i32> = reason.lines().map(|line| line.parse().unwrap()).collect();
    assert_eq!(values, vec![0, 10]);
}

#[test]
fn replay_first_test_draws_the_original_failing_value() {
    let draws: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let make = |log: Rc<RefCell<Vec<i32>>>| {
        for_all(Gen::int_range(0, 1000), move |&x: &i32| {
            log.borrow_mut().push(x);
            x < 10
        })
    };

    let RunResult::Failure { seed, size, .. } = run(make(draws.clone())) else {
        panic!("expected failure");
    };
    // Everything logged before the first value >= 10 passed; that value
    // is the draw the recorded (seed, size) must reproduce.
    let original = *draws
        .borrow()
        .iter()
        .find(|&&x| x >= 10)
        .expect("a failing draw");

    draws.borrow_mut().clear();
    let config = Config::default().with_replay(seed, size);
    let replayed = check_result(make(draws.clone()), "replay", &config).unwrap();
    assert!(matches!(replayed, RunResult::Failure { tests: 1, .. }));
    assert_eq!(draws.borrow()[0], original);
}

#[test]
fn replay_reproduces_the_original_failure() {
    let make = || for_all(Gen::int_range(0, 100), |&x: &i32| x < 10);
    let RunResult::Failure { seed, size, .. } = run(make()) else {
        panic!("expected failure");
    };
    let config = Config::default().with_replay(seed, size);
    let replayed = check_result(make(), "replay", &config).unwrap();
    assert!(matches!(replayed, RunResult::Failure { tests: 1, .. }));
}

#[test]
#[allow(clippy::nonminimal_bool)]
fn check_prints_and_returns_the_result() {
    let result = check(
        for_all(Gen::bool(), |&b: &bool| b || !b),
        "tautology",
        &Config::default(),
    )
    .unwrap();
    assert!(result.is_success());
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let config = Config::default().with_successes(0);
    let error = check_result(for_all(Gen::bool(), |_: &bool| true), "bad", &config).unwrap_err();
    assert!(matches!(error, RefuteError::InvalidConfig { .. }));
}
