//! The per-type capability interface pairing a default generator with a
//! default shrinker.
//!
//! The engine itself stays generic over explicit generator/shrinker pairs;
//! this trait only supplies the defaults that `for_all` reaches for when
//! the caller does not hand it a shrinker of its own.

use crate::gen::{vec_of, Gen};
use crate::shrink::{shrink_int, shrink_vec};
use std::fmt;

/// Types with a default generator and shrinker.
pub trait Arbitrary: Sized + Clone + fmt::Debug + 'static {
    /// The default generator for this type.
    fn generator() -> Gen<Self>;

    /// The next-smaller candidates for a value. Defaults to no shrinking.
    fn shrink(&self) -> Vec<Self> {
        Vec::new()
    }
}

impl Arbitrary for bool {
    fn generator() -> Gen<Self> {
        Gen::bool()
    }

    fn shrink(&self) -> Vec<Self> {
        if *self {
            vec![false]
        } else {
            Vec::new()
        }
    }
}

impl Arbitrary for i32 {
    fn generator() -> Gen<Self> {
        Gen::int()
    }

    fn shrink(&self) -> Vec<Self> {
        shrink_int(*self)
    }
}

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn generator() -> Gen<Self> {
        vec_of(T::generator())
    }

    fn shrink(&self) -> Vec<Self> {
        shrink_vec(self, T::shrink)
    }
}
