use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;

/// The only way the tools create a root RNG. Everything else forks from it.
pub fn seeded_rng(seed: u64) -> XorShiftRng {
    XorShiftRng::seed_from_u64(seed)
}

/// Derive an independent RNG from a base one. Forking in a fixed order (for example, once per
/// partition of work) keeps results reproducible no matter which thread runs which partition.
pub fn fork_rng(base_rng: &mut XorShiftRng) -> XorShiftRng {
    XorShiftRng::seed_from_u64(base_rng.next_u64())
}
