//! Population configuration: spawn definitions, spawn rings, and presets.

use glam::{DVec2, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use verdant_terrain::AREA_SAMPLE_STRIDE;
use verdant_terrain::seed::on_unit_circle;

use crate::gate::SpawnGate;

/// One kind of creature a manager can spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnDefinition {
    /// Prefab identifier handed to the entity world.
    pub prefab: String,
    /// Name of the biome this creature spawns in.
    pub biome: String,
    /// Probability `[0, 1]` that the definition is eligible on a given try.
    pub chance: f64,
    /// Smallest group size.
    pub min_group: u32,
    /// Largest group size (inclusive).
    pub max_group: u32,
    /// Radius group members are scattered within around the group point.
    pub group_spread_radius: f64,
}

impl Default for SpawnDefinition {
    fn default() -> Self {
        Self {
            prefab: String::new(),
            biome: String::new(),
            chance: 1.0,
            min_group: 1,
            max_group: 1,
            group_spread_radius: 5.0,
        }
    }
}

impl SpawnDefinition {
    /// Convenience constructor with default chance, group, and spread.
    pub fn new(prefab: impl Into<String>, biome: impl Into<String>) -> Self {
        Self {
            prefab: prefab.into(),
            biome: biome.into(),
            ..Default::default()
        }
    }

    /// Set the group size range.
    pub fn with_group(mut self, min: u32, max: u32) -> Self {
        self.min_group = min;
        self.max_group = max;
        self
    }

    /// Set the eligibility chance.
    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    /// Group size bounds with `min <= max`.
    pub fn group_range(&self) -> (u32, u32) {
        if self.min_group <= self.max_group {
            (self.min_group, self.max_group)
        } else {
            (self.max_group, self.min_group)
        }
    }
}

/// Where group points are picked around the reference point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpawnRing {
    /// Distance uniform in `[0.7 * distance, distance]`.
    Jittered {
        /// Nominal spawn distance.
        distance: f64,
    },
    /// Distance uniform in `[min, max]`.
    Annulus {
        /// Inner radius.
        min: f64,
        /// Outer radius.
        max: f64,
    },
}

impl SpawnRing {
    /// Fraction of the nominal distance a jittered ring may pull in to.
    pub const JITTER_INNER_FRACTION: f64 = 0.7;

    /// `(inner, outer)` radii with `inner <= outer`, never negative.
    pub fn radii(&self) -> (f64, f64) {
        let (a, b) = match *self {
            Self::Jittered { distance } => (distance * Self::JITTER_INNER_FRACTION, distance),
            Self::Annulus { min, max } => (min, max),
        };
        let (a, b) = (a.max(0.0), b.max(0.0));
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Inner radius of the ring.
    pub fn inner_radius(&self) -> f64 {
        self.radii().0
    }

    /// Random point on the ring around `center`, in the horizontal plane.
    /// The returned point keeps `center.y`.
    pub fn sample(&self, center: DVec3, rng: &mut impl Rng) -> DVec3 {
        let (inner, outer) = self.radii();
        let dir: DVec2 = on_unit_circle(rng);
        let distance = rng.random_range(inner..=outer);
        DVec3::new(
            center.x + dir.x * distance,
            center.y,
            center.z + dir.y * distance,
        )
    }
}

/// Tuning for one population manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Label of the manager's random stream and log events.
    pub label: String,
    /// Seconds between ticks.
    pub interval_seconds: f64,
    /// Tracked entities farther than this from the reference are removed.
    pub despawn_distance: f64,
    /// Where group points are picked.
    pub ring: SpawnRing,
    /// Skip group members landing inside the ring's inner radius.
    pub skip_members_inside_ring: bool,
    /// Entities allowed per `area_unit` of biome area.
    pub max_per_area_unit: f64,
    /// Area normalizer for per-biome caps.
    pub area_unit: f64,
    /// Lowest per-biome cap, regardless of area.
    pub min_biome_cap: u32,
    /// Total tracked entities allowed across all biomes.
    pub global_cap: usize,
    /// Spawn tries per tick.
    pub attempts_per_tick: u32,
    /// Stride used when sampling biome areas from the moisture field.
    pub area_sample_stride: usize,
    /// Height above the member point the ground probe starts at.
    pub probe_height: f64,
    /// Maximum travel of the ground probe.
    pub probe_distance: f64,
    /// Gate checked before spawn tries.
    pub gate: SpawnGate,
    /// Creatures this manager can spawn.
    pub spawns: Vec<SpawnDefinition>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self::wildlife()
    }
}

impl PopulationConfig {
    /// Animals: always active, jittered ring at distance 80.
    pub fn wildlife() -> Self {
        Self {
            label: "wildlife".into(),
            interval_seconds: 5.0,
            despawn_distance: 100.0,
            ring: SpawnRing::Jittered { distance: 80.0 },
            skip_members_inside_ring: false,
            max_per_area_unit: 5.0,
            area_unit: 1000.0,
            min_biome_cap: 3,
            global_cap: 50,
            attempts_per_tick: 10,
            area_sample_stride: AREA_SAMPLE_STRIDE,
            probe_height: 50.0,
            probe_distance: 100.0,
            gate: SpawnGate::Always,
            spawns: Vec::new(),
        }
    }

    /// Enemies: night only, annulus `[50, 100]`, sparser caps.
    pub fn hostile() -> Self {
        Self {
            label: "hostiles".into(),
            interval_seconds: 10.0,
            despawn_distance: 120.0,
            ring: SpawnRing::Annulus {
                min: 50.0,
                max: 100.0,
            },
            skip_members_inside_ring: true,
            max_per_area_unit: 3.0,
            min_biome_cap: 2,
            global_cap: 30,
            gate: SpawnGate::NIGHT,
            ..Self::wildlife()
        }
    }

    /// Replace the spawn definitions.
    pub fn with_spawns(mut self, spawns: Vec<SpawnDefinition>) -> Self {
        self.spawns = spawns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_terrain::seed::stream_rng;

    #[test]
    fn test_presets() {
        let w = PopulationConfig::wildlife();
        assert_eq!(w.global_cap, 50);
        assert_eq!(w.min_biome_cap, 3);
        assert_eq!(w.gate, SpawnGate::Always);

        let h = PopulationConfig::hostile();
        assert_eq!(h.global_cap, 30);
        assert_eq!(h.min_biome_cap, 2);
        assert_eq!(h.despawn_distance, 120.0);
        assert_eq!(h.area_unit, 1000.0, "inherits the shared area unit");
        assert_eq!(h.attempts_per_tick, 10);
        assert!(h.skip_members_inside_ring);
    }

    #[test]
    fn test_jittered_ring_distances() {
        let ring = SpawnRing::Jittered { distance: 80.0 };
        let center = DVec3::new(10.0, 3.0, -4.0);
        let mut rng = stream_rng(1, "ring");
        for _ in 0..500 {
            let p = ring.sample(center, &mut rng);
            let d = DVec2::new(p.x - center.x, p.z - center.z).length();
            assert!((56.0 - 1e-9..=80.0 + 1e-9).contains(&d), "distance {d}");
            assert_eq!(p.y, 3.0);
        }
    }

    #[test]
    fn test_annulus_distances() {
        let ring = SpawnRing::Annulus {
            min: 50.0,
            max: 100.0,
        };
        let mut rng = stream_rng(2, "ring");
        for _ in 0..500 {
            let p = ring.sample(DVec3::ZERO, &mut rng);
            let d = DVec2::new(p.x, p.z).length();
            assert!((50.0 - 1e-9..=100.0 + 1e-9).contains(&d), "distance {d}");
        }
    }

    #[test]
    fn test_reversed_ring_and_group_normalized() {
        let ring = SpawnRing::Annulus {
            min: 90.0,
            max: 40.0,
        };
        assert_eq!(ring.radii(), (40.0, 90.0));
        let def = SpawnDefinition::new("wolf", "Forest").with_group(4, 2);
        assert_eq!(def.group_range(), (2, 4));
    }

    #[test]
    fn test_degenerate_ring_is_a_circle() {
        let ring = SpawnRing::Annulus {
            min: 30.0,
            max: 30.0,
        };
        let mut rng = stream_rng(5, "ring");
        let p = ring.sample(DVec3::ZERO, &mut rng);
        assert!((DVec2::new(p.x, p.z).length() - 30.0).abs() < 1e-9);
    }
}
