//! Where a level's seed comes from, and fresh-seed generation for unseeded resets.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedChoice {
    /// Passed explicitly to `generate`.
    Requested(u64),
    /// Pinned in the generator configuration.
    Configured(u64),
    /// Drawn from the clock because nothing pinned it.
    Generated(u64),
}

impl SeedChoice {
    pub fn value(self) -> u64 {
        match self {
            Self::Requested(seed) | Self::Configured(seed) | Self::Generated(seed) => seed,
        }
    }

    /// Explicit seed first, then the configured one, then a fresh draw.
    pub fn resolve(requested: Option<u64>, configured: Option<u64>) -> Self {
        match (requested, configured) {
            (Some(seed), _) => Self::Requested(seed),
            (None, Some(seed)) => Self::Configured(seed),
            (None, None) => Self::Generated(generate_runtime_seed()),
        }
    }
}

static RUNTIME_DRAWS: AtomicU64 = AtomicU64::new(0);

/// Fresh seed for unpinned levels. The clock, the process id and a draw counter
/// fill a ChaCha key; the seed is that stream's first word.
pub fn generate_runtime_seed() -> u64 {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_nanos());
    let words = [
        nanos as u64,
        (nanos >> 64) as u64,
        u64::from(process::id()),
        RUNTIME_DRAWS.fetch_add(1, Ordering::Relaxed),
    ];
    let mut key = [0_u8; 32];
    for (chunk, word) in key.chunks_exact_mut(8).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    ChaCha8Rng::from_seed(key).next_u64()
}
