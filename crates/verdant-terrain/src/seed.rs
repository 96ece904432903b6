//! Deterministic seed streams.
//!
//! Every random consumer in world generation draws from its own ChaCha
//! stream derived from the world seed and a stream label, so changing how
//! many values one pass consumes never shifts another pass's output.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream label for vegetation candidate selection.
pub const STREAM_VEGETATION: &str = "vegetation";
/// Stream label for prop instantiation (prefab choice, yaw, scale).
pub const STREAM_PROPS: &str = "props";
/// Stream label for the grass pass.
pub const STREAM_GRASS: &str = "grass";

/// Derive a u64 seed for a named stream from the world seed.
///
/// Uses SipHash (via std's `DefaultHasher`) to combine both inputs into a
/// well-distributed u64.
pub fn derive_stream_seed(world_seed: u64, stream: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    stream.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic RNG for a named stream.
pub fn stream_rng(world_seed: u64, stream: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(world_seed, stream))
}

/// Uniform random point inside the unit disk.
pub fn inside_unit_circle(rng: &mut impl Rng) -> DVec2 {
    let r = rng.random::<f64>().sqrt();
    let theta = rng.random_range(0.0..std::f64::consts::TAU);
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Uniform random direction on the unit circle.
pub fn on_unit_circle(rng: &mut impl Rng) -> DVec2 {
    let theta = rng.random_range(0.0..std::f64::consts::TAU);
    DVec2::new(theta.cos(), theta.sin())
}
