//! Document-local identifier generation
//!
//! External resources get `<n>_<suffix>` where `n` counts up from 1 and the
//! suffix is a short run of random lowercase letters. Sub-resources get
//! `sub_<n>` from an independent counter. The random suffix only keeps ids
//! visually distinct; nothing relies on it being unguessable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of letters in an external resource suffix
pub const DEFAULT_SUFFIX_LEN: usize = 5;

/// Hands out external and sub-resource identifiers for one document
#[derive(Debug)]
pub struct IdGenerator {
    rng: StdRng,
    suffix_len: usize,
    next_ext: usize,
    next_sub: usize,
}

impl IdGenerator {
    /// Create a generator seeded from the OS entropy source.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a generator with a fixed seed, for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self { rng, suffix_len: DEFAULT_SUFFIX_LEN, next_ext: 1, next_sub: 1 }
    }

    /// Set the suffix length (clamped to at least one letter).
    pub fn with_suffix_len(mut self, len: usize) -> Self {
        self.suffix_len = len.max(1);
        self
    }

    /// Next external resource id, e.g. `1_qwert`.
    pub fn next_ext_id(&mut self) -> String {
        let suffix: String =
            (0..self.suffix_len).map(|_| self.rng.gen_range(b'a'..=b'z') as char).collect();
        let id = format!("{}_{}", self.next_ext, suffix);
        self.next_ext += 1;
        id
    }

    /// Next sub-resource id, e.g. `sub_1`.
    pub fn next_sub_id(&mut self) -> String {
        let id = format!("sub_{}", self.next_sub);
        self.next_sub += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
