//! Benchmark profiles and utilities for the cairn container family.
//!
//! Provides deterministic input generation shared by the benches:
//!
//! - [`scrambled_u64s`]: seed-derived pseudo-random values, no RNG crate
//! - [`SMALL`], [`MEDIUM`], [`LARGE`]: the three workload sizes the
//!   benches report on

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Small workload: fits comfortably in cache, dominated by per-push cost.
pub const SMALL: usize = 100;

/// Medium workload: triggers a dozen growth relocations from empty.
pub const MEDIUM: usize = 10_000;

/// Large workload: growth cost amortization becomes visible.
pub const LARGE: usize = 1_000_000;

/// Generate `n` deterministic pseudo-random values from `seed`.
///
/// Uses the same multiply-and-add scramble for every run, so benchmark
/// numbers are comparable across invocations without pulling in an RNG.
pub fn scrambled_u64s(seed: u64, n: usize) -> Vec<u64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            state
        })
        .collect()
}
