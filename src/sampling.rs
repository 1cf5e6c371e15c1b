//! Random sampling of lookups and the verification digest.
//!
//! [`RngPolicy`] decides where each lookup's random numbers come from. In
//! verification mode every lookup owns a stream keyed by its index, so the set
//! of sampled (energy, material) pairs is identical for any worker count and
//! any scheduling order. In performance mode each worker job owns a stream
//! seeded once from startup entropy.

use crate::config::{Config, RunMode};
use crate::fast_rng::{future_seed, FastRng, LOOKUP_STREAM_OFFSET, TRIAL_STRIDE};
use crate::material::MaterialTable;
use crate::nuclide::{MAX_ENERGY, MIN_ENERGY, NUM_CHANNELS};
use std::fmt::Write;

/// Draws reserved per performance-mode worker stream
pub const WORKER_STRIDE: u64 = 1 << 40;

/// Histogram bins of the per-lookup hash
pub const HASH_BINS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngPolicy {
    /// Lookup `i` draws from stream `i` of `base_seed`
    PerTrial { base_seed: u64 },
    /// Each worker job draws from its own stream of `entropy_seed`
    PerWorker { entropy_seed: u64 },
}

impl RngPolicy {
    /// Per-trial streams from the configured seed in verification mode,
    /// per-worker streams from fresh entropy otherwise.
    pub fn for_config(config: &Config) -> Self {
        match config.mode {
            RunMode::Verification => Self::per_trial(config.seed),
            RunMode::Performance => RngPolicy::PerWorker {
                entropy_seed: rand::random(),
            },
        }
    }

    /// Deterministic policy for `seed`. Lookup streams sit half an LCG
    /// period away from the setup stream seeded with the same value.
    pub fn per_trial(seed: u64) -> Self {
        RngPolicy::PerTrial {
            base_seed: future_seed(LOOKUP_STREAM_OFFSET, seed),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, RngPolicy::PerTrial { .. })
    }
}

/// Generator for lookup `trial` under [`RngPolicy::PerTrial`]
#[inline]
pub fn trial_rng(base_seed: u64, trial: u64) -> FastRng {
    FastRng::from_stream(base_seed, trial, TRIAL_STRIDE)
}

/// Generator for worker stream `stream` under [`RngPolicy::PerWorker`]
pub fn worker_rng(entropy_seed: u64, stream: u64) -> FastRng {
    FastRng::from_stream(entropy_seed, stream, WORKER_STRIDE)
}

/// Energy and material of one lookup, in that draw order.
#[inline]
pub fn sample_lookup(rng: &mut FastRng, materials: &MaterialTable) -> (f64, usize) {
    let energy = MIN_ENERGY + (MAX_ENERGY - MIN_ENERGY) * rng.random();
    let material = materials.pick_material(rng.random());
    (energy, material)
}

/// djb2 string hash folded into `nbins` bins
pub fn hash(line: &[u8], nbins: u32) -> u32 {
    let mut h: u32 = 5381;
    for &c in line {
        h = (h << 5).wrapping_add(h).wrapping_add(c as u32);
    }
    h % nbins
}

/// Digest of one lookup: the hash of its inputs and results printed to five
/// decimals, which keeps it stable across compilers and platforms.
/// `buf` is scratch space reused between calls.
pub fn lookup_digest(
    buf: &mut String,
    energy: f64,
    material: usize,
    xs: &[f64; NUM_CHANNELS],
) -> u64 {
    buf.clear();
    // Writing into a String cannot fail
    let _ = write!(
        buf,
        "{:.5} {} {:.5} {:.5} {:.5} {:.5} {:.5}",
        energy, material, xs[0], xs[1], xs[2], xs[3], xs[4]
    );
    hash(buf.as_bytes(), HASH_BINS) as u64
}
