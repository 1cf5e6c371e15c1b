// Counter-based random streams on top of OpenMC's PCG-LCG
// See: openmc-source-code/random_lcg.cpp
//
// Every lookup in verification mode gets its own stream, positioned by
// skipping the underlying LCG ahead with `future_seed`. Results therefore
// depend only on the master seed and the lookup index, never on which
// worker ran the lookup.

use rand::{RngCore, SeedableRng};

/// LCG multiplier (same as OpenMC)
const PRN_MULT: u64 = 6364136223846793005;
/// LCG additive constant (same as OpenMC)
const PRN_ADD: u64 = 1442695040888963407;
/// 2^-64, maps a u64 onto [0, 1)
const PRN_NORM: f64 = 5.421010862427522e-20;

/// Number of LCG steps reserved for each lookup (OpenMC's default stride).
/// A lookup draws two numbers, so streams never overlap.
pub const TRIAL_STRIDE: u64 = 152_917;

/// Lookup streams start half a period away from the setup stream that
/// generates grids and concentrations.
pub const LOOKUP_STREAM_OFFSET: u64 = 1 << 63;

/// Fast RNG using OpenMC's PCG-LCG algorithm.
///
/// The state is a single u64; output goes through the RXS-M-XS permutation.
///
/// Reference: Melissa E. O'Neill, "PCG: A Family of Simple Fast Space-Efficient
/// Statistically Good Algorithms for Random Number Generation"
#[derive(Clone, Copy, Debug)]
pub struct FastRng {
    seed: u64,
}

impl FastRng {
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// RNG for stream `stream`, each stream being `stride` draws long.
    #[inline]
    pub fn from_stream(master_seed: u64, stream: u64, stride: u64) -> Self {
        Self::new(future_seed(stream.wrapping_mul(stride), master_seed))
    }

    /// Current LCG state
    #[inline]
    pub fn state(&self) -> u64 {
        self.seed
    }

    /// Generate a random f64 in [0, 1) - matches OpenMC's prn() function
    #[inline(always)]
    pub fn random(&mut self) -> f64 {
        self.next_permuted() as f64 * PRN_NORM
    }

    #[inline(always)]
    fn next_permuted(&mut self) -> u64 {
        self.seed = PRN_MULT.wrapping_mul(self.seed).wrapping_add(PRN_ADD);
        let word = ((self.seed >> ((self.seed >> 59) + 5)) ^ self.seed)
            .wrapping_mul(12605985483714917081);
        (word >> 43) ^ word
    }
}

/// Seed that `n` LCG steps after `seed` would produce, in O(log n).
///
/// Brown, "Random Number Generation with Arbitrary Strides" (1994).
pub fn future_seed(mut n: u64, seed: u64) -> u64 {
    let mut g = PRN_MULT;
    let mut c = PRN_ADD;
    let mut g_new: u64 = 1;
    let mut c_new: u64 = 0;

    while n > 0 {
        if n & 1 == 1 {
            g_new = g_new.wrapping_mul(g);
            c_new = c_new.wrapping_mul(g).wrapping_add(c);
        }
        c = g.wrapping_add(1).wrapping_mul(c);
        g = g.wrapping_mul(g);
        n >>= 1;
    }

    g_new.wrapping_mul(seed).wrapping_add(c_new)
}

impl SeedableRng for FastRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }
}

impl RngCore for FastRng {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.next_permuted()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
