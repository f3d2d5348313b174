//! Core data types for the Refute test engine.

use std::fmt;

/// Size parameter controlling the "largeness" of generated test data.
///
/// Sizes range from 0 to the configured maximum (100 by default) and are
/// scheduled across a run so that early tests draw small values and later
/// tests draw progressively larger ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Size(pub usize);

impl Size {
    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic test generation.
///
/// Splitting is a pure function producing two independent child seeds, so
/// a run is fully reproducible given the initial seed and configuration.
/// That is what makes exact replay of a prior failure possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Generate the next random value and advance the seed.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a bounded random value in `[0, bound)`.
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, new_seed) = self.next_u64();
        ((value as u128 * bound as u128 >> 64) as u64, new_seed)
    }

    /// Generate a random bool.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, new_seed) = self.next_u64();
        (value & 1 == 1, new_seed)
    }

    /// Generate a random seed from OS entropy.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen(), rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// Configuration for a property check run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of successful tests required to declare the property passed.
    pub max_success: usize,

    /// Maximum number of discarded tests before giving up.
    ///
    /// For existential properties this budget doubles as the bound on the
    /// witness search.
    pub max_discard: usize,

    /// Maximum size parameter passed to generators.
    pub max_size: usize,

    /// Fixed seed and size for the first test, replaying a prior failure.
    /// Normal scheduling resumes from the second test on.
    pub replay: Option<(Seed, Size)>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_success: 100,
            max_discard: 500,
            max_size: 100,
            replay: None,
        }
    }
}

impl Config {
    /// Create a new config with the given success target.
    pub fn with_successes(mut self, tests: usize) -> Self {
        self.max_success = tests;
        self
    }

    /// Create a new config with the given discard budget.
    pub fn with_discards(mut self, discards: usize) -> Self {
        self.max_discard = discards;
        self
    }

    /// Create a new config with the given size limit.
    pub fn with_size_limit(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Create a new config replaying a recorded seed and size.
    pub fn with_replay(mut self, seed: Seed, size: Size) -> Self {
        self.replay = Some((seed, size));
        self
    }

    /// Map a (successes, discards) pair to the generator size for the
    /// next test.
    ///
    /// Sizes are spread evenly across the success budget; the discard
    /// count nudges the size so that a discarding test does not keep
    /// re-sampling at the identical size.
    pub fn compute_size(&self, successes: usize, discards: usize) -> Size {
        if self.max_size == 0 {
            return Size(0);
        }
        Size((successes % self.max_size + discards / 10).min(self.max_size))
    }

    /// Check the configuration for values the run loop cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_success == 0 {
            return Err(crate::error::RefuteError::InvalidConfig {
                message: "max_success must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Gamma must be odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}
