//! Input-distribution statistics: labels, classification, and coverage
//! requirements.

use refute::*;

fn main() -> Result<()> {
    // Observe the shape of the generated lists.
    let sorted_idempotent = for_all(vec_of(Gen::int_range(0, 50)), |xs: &Vec<i32>| {
        let mut once = xs.clone();
        once.sort();
        let mut twice = once.clone();
        twice.sort();
        let holds = once == twice;
        implies(true, holds)
            .classify(xs.is_empty(), "empty")
            .classify(xs.len() > 10, "long")
            .collect(xs.len() / 10)
    });
    check(sorted_idempotent, "sort_is_idempotent", &Config::default())?;

    // Declare a coverage requirement the generator cannot meet: the
    // report flags the shortfall.
    let unrealistic = for_all(Gen::int_range(0, 9), |&x: &i32| {
        implies(true, x >= 0).cover(x == 0, 50.0, "zero")
    });
    check(unrealistic, "zero_is_half_of_all_digits", &Config::default())?;

    Ok(())
}
