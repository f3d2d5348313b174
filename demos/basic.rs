//! Basic Refute usage: a passing property and a shrinking failure.

use refute::*;

fn main() -> Result<()> {
    // Reversing twice is the identity.
    let round_trip = for_all(vec_of(Gen::int_range(-100, 100)), |xs: &Vec<i32>| {
        let mut ys = xs.clone();
        ys.reverse();
        ys.reverse();
        ys == *xs
    });
    check(round_trip, "reverse_reverse_is_identity", &Config::default())?;

    // A property that is simply wrong; the counterexample shrinks to the
    // boundary value 10.
    let wrong = for_all(Gen::int_range(0, 100), |&x: &i32| x < 10);
    check(wrong, "all_ints_are_small", &Config::default())?;

    // Two arguments: addition commutes. The first argument shrinks first.
    let commutes = for_all2(Gen::int(), Gen::int(), |&a: &i32, &b: &i32| {
        a.wrapping_add(b) == b.wrapping_add(a)
    });
    check(commutes, "addition_commutes", &Config::default())?;

    Ok(())
}
