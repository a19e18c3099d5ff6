//! Seedable source of protocol randomness.

use crate::backend::Basis;
use crate::protocols::bb84::types::{BasisString, BitString};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// The single entropy stream a simulation draws from.
///
/// Bits, bases, noise decisions and measurement outcomes all come from here,
/// so two runs built from the same seed produce identical reports.
#[derive(Debug, Clone)]
pub struct RandomnessSource {
    rng: ChaCha20Rng,
}

impl RandomnessSource {
    /// Create a deterministic source from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Create a source seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::rng().random())
    }

    /// Build from an optional seed, falling back to fresh entropy.
    pub fn seeded_or_random(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }

    /// `n` independent uniform bits.
    pub fn generate_bits(&mut self, n: usize) -> BitString {
        (0..n).map(|_| self.rng.random_bool(0.5)).collect()
    }

    /// `n` independent uniform bases (0 -> Z, 1 -> X).
    pub fn generate_basis(&mut self, n: usize) -> BasisString {
        self.generate_bits(n)
            .iter()
            .map(Basis::from_bit)
            .collect()
    }

    /// Bernoulli trial with success probability `p`, which must lie in [0, 1].
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }

    /// Derive an independent stream, e.g. for running a round on another thread.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.next_u64())
    }
}

impl RngCore for RandomnessSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.rng.fill_bytes(dst);
    }
}
