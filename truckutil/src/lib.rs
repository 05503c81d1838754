//! Plumbing shared by the truck plan crates: logging setup, hierarchical timing with a parallel
//! map, RNG helpers, and number formatting.

#[macro_use]
extern crate log;

pub mod logger;
mod random;
mod time;
mod utils;

pub use crate::random::{fork_rng, seeded_rng};
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{prettyprint_usize, split_into_chunks};

/// The number of CPUs available, used as the default amount of parallelism.
pub fn num_cpus() -> usize {
    num_cpus::get()
}
