//! Bounded existential quantification: witness search within the
//! discard budget.

use refute::*;

fn main() -> Result<()> {
    // A witness exists and is found quickly.
    let witness = exists(Gen::int_range(0, 1000), |&x: &i32| x % 97 == 0);
    check(witness, "some_multiple_of_97", &Config::default())?;

    // No witness exists: the search exhausts the discard budget and
    // reports an existential failure, never a shrink.
    let hopeless = exists(Gen::int_range(1, 100), |&x: &i32| x * x == 2);
    check(hopeless, "a_square_root_of_two", &Config::default())?;

    Ok(())
}
