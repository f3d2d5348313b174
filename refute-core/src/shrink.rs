//! Default shrink functions for the primitive vocabulary.
//!
//! A shrinker is a pure function from a value to an ordered, finite list
//! of "next smaller" candidates. It must terminate (no infinite descent)
//! and need not be exhaustive; the search in the runner takes the first
//! still-failing candidate at each level.

/// Shrink an integer toward zero.
///
/// Candidates, in order: the negation for negative inputs, then ever
/// smaller jumps toward the input (`0, x - x/2, x - x/4, ..., x - 1`).
/// Ordering matters: the boldest candidate comes first so the greedy
/// search can cut the distance to the minimum in half per adoption.
pub fn shrink_int(x: i32) -> Vec<i32> {
    let mut out = Vec::new();
    if x < 0 {
        if let Some(pos) = x.checked_neg() {
            out.push(pos);
        }
    }
    let mut step = x;
    while step != 0 {
        let candidate = x - step;
        if candidate != x && !out.contains(&candidate) {
            out.push(candidate);
        }
        step /= 2;
    }
    out
}

/// Shrink a vector by dropping ever-smaller chunks, then shrinking
/// individual elements in place.
///
/// Chunk removal goes from the whole list down to single elements so the
/// search tries the empty list first; element shrinking preserves length
/// and replaces one position at a time with each of its candidates.
pub fn shrink_vec<T, F>(xs: &[T], shrink_element: F) -> Vec<Vec<T>>
where
    T: Clone,
    F: Fn(&T) -> Vec<T>,
{
    let n = xs.len();
    let mut out = Vec::new();

    let mut chunk = n;
    while chunk > 0 {
        let mut start = 0;
        while start + chunk <= n {
            let mut smaller = Vec::with_capacity(n - chunk);
            smaller.extend_from_slice(&xs[..start]);
            smaller.extend_from_slice(&xs[start + chunk..]);
            out.push(smaller);
            start += chunk;
        }
        chunk /= 2;
    }

    for (i, x) in xs.iter().enumerate() {
        for candidate in shrink_element(x) {
            let mut smaller = xs.to_vec();
            smaller[i] = candidate;
            out.push(smaller);
        }
    }

    out
}
