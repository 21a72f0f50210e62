//! Deterministic RNG derivation.
//!
//! A master seed expands into per-`(variant, budget, window)` sub-seeds via
//! BLAKE3 hashing. Derivation is hash-based, not order-dependent, so a sweep
//! produces identical results regardless of worker scheduling.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic seed hierarchy for sweeps and campaigns.
#[derive(Debug, Clone, Copy)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for a specific grid tuple.
    ///
    /// The budget is hashed via its bit pattern so that distinct f64 budgets
    /// always map to distinct inputs.
    pub fn sub_seed(&self, variant: &str, budget: f64, window_id: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(variant.as_bytes());
        hasher.update(&budget.to_bits().to_le_bytes());
        hasher.update(&window_id.to_le_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }

    /// Create a seeded StdRng for a grid tuple.
    pub fn rng_for(&self, variant: &str, budget: f64, window_id: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(variant, budget, window_id))
    }
}
