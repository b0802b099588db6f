//! Deterministic randomness helpers.
//!
//! The multiplayer-synchronized dispatch path requires running one dispatch
//! under a shared seed without disturbing the engine's own random stream.
//! [`with_seeded_rng`] provides that as a scoped closure over a local
//! `ChaCha8Rng`: there is no global source to swap and restore, so the
//! guarantee holds on every exit path, panics included.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Runs `f` with a fresh deterministic RNG seeded from `seed`.
pub fn with_seeded_rng<T>(seed: u64, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    f(&mut rng)
}

/// Derives a per-event seed from the tick, the world seed, and an id.
///
/// Same mixing scheme as the engine's other derived streams so that two
/// engines with identical inputs derive identical seeds.
#[must_use]
pub fn derive_seed(tick: u64, world_seed: u64, id: Uuid) -> u64 {
    let u = id.as_u128();
    let mut seed = tick.wrapping_add(world_seed).wrapping_mul(0x517C_C1B7_2722_0A95);
    seed ^= (u >> 64) as u64;
    seed = seed.wrapping_mul(0x517C_C1B7_2722_0A95);
    seed ^= u as u64;
    seed
}

/// Cumulative-sum weighted selection.
///
/// Draws a uniform integer in `[0, total_weight)` and returns the index of
/// the first entry whose cumulative bound exceeds the draw. Returns `None`
/// for an empty table or an all-zero weight sum.
pub fn weighted_index<R: Rng>(rng: &mut R, weights: &[u32]) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return None;
    }
    let draw = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += u64::from(w);
        if draw < cumulative {
            return Some(i);
        }
    }
    None
}

/// Draws a value uniformly within an inclusive band, degenerate bands allowed.
pub fn in_band<R: Rng>(rng: &mut R, band: (u32, u32)) -> u32 {
    if band.0 >= band.1 {
        band.0
    } else {
        rng.gen_range(band.0..=band.1)
    }
}
