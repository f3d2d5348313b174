//! Generator combinators for the engine's input side.
//!
//! Generators are explicit, first-class values: a `Gen<T>` is just a pure
//! function from a size hint and a splittable seed to a value. The engine
//! never inspects the value; it only threads seeds and sizes through this
//! interface. Shrinking is handled separately (see `shrink`), so a
//! generator produces plain values, not shrink trees.

use crate::data::{Seed, Size};
use std::rc::Rc;

/// A generator for test data of type `T`.
pub struct Gen<T> {
    runner: Rc<dyn Fn(Size, Seed) -> T>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            runner: self.runner.clone(),
        }
    }
}

impl<T: 'static> Gen<T> {
    /// Create a new generator from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Size, Seed) -> T + 'static,
    {
        Gen { runner: Rc::new(f) }
    }

    /// Produce a value from the given size and seed.
    pub fn run(&self, size: Size, seed: Seed) -> T {
        (self.runner)(size, seed)
    }

    /// A generator that always produces the same value.
    pub fn constant(value: T) -> Self
    where
        T: Clone,
    {
        Gen::new(move |_size, _seed| value.clone())
    }

    /// Expose the current size to the generator body.
    pub fn sized<F>(f: F) -> Self
    where
        F: Fn(Size) -> Gen<T> + 'static,
    {
        Gen::new(move |size, seed| f(size).run(size, seed))
    }

    /// Run the generator at a fixed size, ignoring the scheduled one.
    pub fn resize(self, size: usize) -> Self {
        Gen::new(move |_size, seed| self.run(Size(size), seed))
    }

    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> U + 'static,
        U: 'static,
    {
        Gen::new(move |size, seed| f(self.run(size, seed)))
    }

    /// Bind/flatmap for dependent generation.
    pub fn bind<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> Gen<U> + 'static,
        U: 'static,
    {
        Gen::new(move |size, seed| {
            let (seed1, seed2) = seed.split();
            f(self.run(size, seed1)).run(size, seed2)
        })
    }

    /// Frequency-weighted choice between generators.
    ///
    /// Weights are relative; a zero total weight is a programming error.
    pub fn frequency(choices: Vec<(u64, Gen<T>)>) -> Self {
        let total: u64 = choices.iter().map(|(w, _)| w).sum();
        assert!(total > 0, "Gen::frequency needs a positive total weight");
        Gen::new(move |size, seed| {
            let (pick_seed, run_seed) = seed.split();
            let (mut pick, _) = pick_seed.next_bounded(total);
            for (weight, gen) in &choices {
                if pick < *weight {
                    return gen.run(size, run_seed);
                }
                pick -= weight;
            }
            unreachable!("weighted pick exceeded total")
        })
    }

    /// Keep re-drawing until the predicate holds, bumping the seed each
    /// attempt. Gives up after a bounded number of tries and returns the
    /// last candidate; preconditions that reject a large fraction of
    /// values should use `implies` and the discard budget instead.
    pub fn filter<F>(self, predicate: F) -> Gen<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        const MAX_TRIES: usize = 100;
        Gen::new(move |size, seed| {
            let mut seed = seed;
            let mut candidate = None;
            for _ in 0..MAX_TRIES {
                let (draw, next) = seed.split();
                let value = self.run(size, draw);
                if predicate(&value) {
                    return value;
                }
                candidate = Some(value);
                seed = next;
            }
            candidate.unwrap_or_else(|| self.run(size, seed))
        })
    }
}

/// Primitive generators.
impl Gen<bool> {
    /// Generate a random boolean.
    pub fn bool() -> Self {
        Gen::new(|_size, seed| {
            let (value, _) = seed.next_bool();
            value
        })
    }
}

impl Gen<i32> {
    /// Generate an integer uniformly in the given inclusive range.
    pub fn int_range(min: i32, max: i32) -> Self {
        assert!(min <= max, "Gen::int_range needs min <= max");
        Gen::new(move |_size, seed| {
            let span = (max as i64 - min as i64 + 1) as u64;
            let (value, _) = seed.next_bounded(span);
            (min as i64 + value as i64) as i32
        })
    }

    /// Generate an integer in `[-size, size]`.
    pub fn int() -> Self {
        Gen::sized(|size| {
            let bound = size.get().min(i32::MAX as usize) as i32;
            Gen::int_range(-bound, bound)
        })
    }
}

/// Generate a vector of values with length in `[0, size]`.
pub fn vec_of<T: 'static>(element: Gen<T>) -> Gen<Vec<T>> {
    Gen::new(move |size, seed| {
        let (len_seed, mut seed) = seed.split();
        let (len, _) = len_seed.next_bounded(size.get() as u64 + 1);
        let mut out = Vec::with_capacity(len as usize);
        for _ in 0..len {
            let (draw, next) = seed.split();
            out.push(element.run(size, draw));
            seed = next;
        }
        out
    })
}
