//! The population tick: cleanup, gating, and capped group spawning.

use std::fmt::Debug;

use glam::{DVec2, DVec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};
use verdant_terrain::seed::{inside_unit_circle, stream_rng};
use verdant_terrain::{BiomeId, BiomeLocator, BiomeTable, GroundQuery, NoiseField, estimate_biome_areas};

use crate::area::BiomeAreaTable;
use crate::config::PopulationConfig;
use crate::error::PopulationError;

/// The external world that owns live entities.
pub trait EntityWorld {
    /// Opaque handle to a live entity.
    type Handle: Copy + Eq + Debug;

    /// Create an entity from `prefab` at `position`, rotated `yaw_degrees`
    /// about the vertical axis.
    fn instantiate(&mut self, prefab: &str, position: DVec3, yaw_degrees: f64) -> Self::Handle;

    /// Current position of `handle`, or `None` if it no longer exists.
    fn position(&self, handle: Self::Handle) -> Option<DVec3>;

    /// Destroy `handle`.
    fn destroy(&mut self, handle: Self::Handle);
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entities removed for straying beyond the despawn distance.
    pub despawned: usize,
    /// Entities that vanished from the world without notice.
    pub pruned: usize,
    /// Entities spawned this tick.
    pub spawned: usize,
    /// Whether the spawn gate was open.
    pub gate_open: bool,
}

#[derive(Clone, Copy, Debug)]
struct Tracked<H> {
    handle: H,
    /// Biome charged at spawn. Only used when no current position exists.
    biome: BiomeId,
    last_position: DVec3,
}

/// Tracks spawned entities and keeps per-biome and global populations
/// under their caps.
pub struct PopulationManager<H> {
    config: PopulationConfig,
    /// Biome of each entry in `config.spawns`.
    spawn_biomes: Vec<BiomeId>,
    areas: BiomeAreaTable,
    tracked: Vec<Tracked<H>>,
    rng: ChaCha8Rng,
    next_tick: f64,
}

impl<H: Copy + Eq + Debug> PopulationManager<H> {
    /// Build a manager for a generated world.
    ///
    /// Biome areas are estimated once from `moisture`. Every spawn
    /// definition must name a biome in `table`.
    pub fn new(
        config: PopulationConfig,
        table: &BiomeTable,
        moisture: &NoiseField,
        seed: u64,
    ) -> Result<Self, PopulationError> {
        let spawn_biomes = config
            .spawns
            .iter()
            .map(|def| {
                table
                    .lookup_by_name(&def.biome)
                    .ok_or_else(|| PopulationError::UnknownBiome {
                        prefab: def.prefab.clone(),
                        biome: def.biome.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sampled = estimate_biome_areas(moisture, table, config.area_sample_stride);
        let areas = BiomeAreaTable::new(
            &sampled,
            table.len(),
            config.area_unit,
            config.max_per_area_unit,
            config.min_biome_cap,
        );

        for (id, area, cap, _) in areas.iter() {
            debug!(
                manager = %config.label,
                biome = %table.get(id).name,
                area,
                cap,
                "biome population cap"
            );
        }
        info!(
            manager = %config.label,
            definitions = config.spawns.len(),
            global_cap = config.global_cap,
            "population manager ready"
        );

        Ok(Self {
            rng: stream_rng(seed, &config.label),
            config,
            spawn_biomes,
            areas,
            tracked: Vec::new(),
            next_tick: 0.0,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Area, cap, and count bookkeeping.
    pub fn areas(&self) -> &BiomeAreaTable {
        &self.areas
    }

    /// Number of tracked entities.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Handles of all tracked entities.
    pub fn tracked_handles(&self) -> impl Iterator<Item = H> + '_ {
        self.tracked.iter().map(|t| t.handle)
    }

    /// Run a tick if the interval has elapsed at time `now` (seconds).
    ///
    /// Returns `None` when no tick was due.
    pub fn update<W, T>(
        &mut self,
        now: f64,
        reference: DVec3,
        time_of_day: Option<f64>,
        world: &mut W,
        terrain: &T,
    ) -> Option<TickReport>
    where
        W: EntityWorld<Handle = H>,
        T: BiomeLocator + GroundQuery,
    {
        if now < self.next_tick {
            return None;
        }
        self.next_tick = now + self.config.interval_seconds.max(0.0);
        Some(self.tick(reference, time_of_day, world, terrain))
    }

    /// Run one tick immediately: cleanup, then gated spawn tries.
    pub fn tick<W, T>(
        &mut self,
        reference: DVec3,
        time_of_day: Option<f64>,
        world: &mut W,
        terrain: &T,
    ) -> TickReport
    where
        W: EntityWorld<Handle = H>,
        T: BiomeLocator + GroundQuery,
    {
        let (despawned, pruned) = self.cleanup(reference, world, terrain);
        let gate_open = self.config.gate.is_open(time_of_day);
        let spawned = if gate_open {
            self.spawn_pass(reference, world, terrain)
        } else {
            0
        };

        let report = TickReport {
            despawned,
            pruned,
            spawned,
            gate_open,
        };
        debug!(
            manager = %self.config.label,
            despawned,
            pruned,
            spawned,
            gate_open,
            tracked = self.tracked.len(),
            "population tick"
        );
        report
    }

    /// External removal hook, e.g. on death. Returns `false` for handles
    /// this manager does not track.
    pub fn on_entity_removed(&mut self, handle: H) -> bool {
        let Some(index) = self.tracked.iter().position(|t| t.handle == handle) else {
            return false;
        };
        let entry = self.tracked.swap_remove(index);
        self.areas.decrement(entry.biome);
        trace!(manager = %self.config.label, ?handle, "entity removed externally");
        true
    }

    /// Destroy every tracked entity and zero all counts.
    pub fn despawn_all<W: EntityWorld<Handle = H>>(&mut self, world: &mut W) {
        let count = self.tracked.len();
        for entry in self.tracked.drain(..) {
            world.destroy(entry.handle);
        }
        self.areas.reset_counts();
        info!(manager = %self.config.label, count, "despawned all entities");
    }

    /// Distance despawns decrement the biome under the entity's current
    /// position. Vanished entities fall back to the biome charged at spawn.
    fn cleanup<W, L>(&mut self, reference: DVec3, world: &mut W, terrain: &L) -> (usize, usize)
    where
        W: EntityWorld<Handle = H>,
        L: BiomeLocator,
    {
        let mut despawned = 0;
        let mut pruned = 0;
        let despawn_distance = self.config.despawn_distance;
        let areas = &mut self.areas;

        self.tracked.retain_mut(|entry| match world.position(entry.handle) {
            None => {
                areas.decrement(entry.biome);
                pruned += 1;
                trace!(handle = ?entry.handle, at = ?entry.last_position, "pruned vanished entity");
                false
            }
            Some(pos) => {
                entry.last_position = pos;
                if pos.distance(reference) > despawn_distance {
                    world.destroy(entry.handle);
                    areas.decrement(terrain.biome_at(pos.x, pos.z));
                    despawned += 1;
                    false
                } else {
                    true
                }
            }
        });

        (despawned, pruned)
    }

    fn spawn_pass<W, T>(&mut self, reference: DVec3, world: &mut W, terrain: &T) -> usize
    where
        W: EntityWorld<Handle = H>,
        T: BiomeLocator + GroundQuery,
    {
        let mut spawned = 0;
        let mut eligible = Vec::with_capacity(self.config.spawns.len());

        for _ in 0..self.config.attempts_per_tick {
            if self.tracked.len() >= self.config.global_cap {
                break;
            }

            let point = self.config.ring.sample(reference, &mut self.rng);
            let biome = terrain.biome_at(point.x, point.z);
            if !self.areas.has_headroom(biome) {
                continue;
            }

            eligible.clear();
            for (i, def) in self.config.spawns.iter().enumerate() {
                if self.spawn_biomes[i] == biome && self.rng.random::<f64>() <= def.chance {
                    eligible.push(i);
                }
            }
            if eligible.is_empty() {
                continue;
            }
            let chosen = eligible[self.rng.random_range(0..eligible.len())];
            spawned += self.spawn_group(chosen, biome, point, reference, world, terrain);
        }

        spawned
    }

    fn spawn_group<W, T>(
        &mut self,
        def_index: usize,
        biome: BiomeId,
        point: DVec3,
        reference: DVec3,
        world: &mut W,
        terrain: &T,
    ) -> usize
    where
        W: EntityWorld<Handle = H>,
        T: GroundQuery,
    {
        let def = &self.config.spawns[def_index];
        let (lo, hi) = def.group_range();
        let size = self.rng.random_range(lo..=hi);
        let inner = self.config.ring.inner_radius();
        let mut spawned = 0;

        for member in 0..size {
            if self.tracked.len() >= self.config.global_cap || !self.areas.has_headroom(biome) {
                break;
            }

            let offset = if member == 0 {
                DVec2::ZERO
            } else {
                inside_unit_circle(&mut self.rng) * def.group_spread_radius
            };
            let at = DVec2::new(point.x, point.z) + offset;

            if self.config.skip_members_inside_ring
                && at.distance(DVec2::new(reference.x, reference.z)) < inner
            {
                continue;
            }

            let origin = DVec3::new(at.x, point.y + self.config.probe_height, at.y);
            let Some(hit) = terrain.raycast_down(origin, self.config.probe_distance) else {
                continue;
            };

            let yaw = self.rng.random_range(0.0..360.0);
            let handle = world.instantiate(&def.prefab, hit.point, yaw);
            self.tracked.push(Tracked {
                handle,
                biome,
                last_position: hit.point,
            });
            self.areas.increment(biome);
            spawned += 1;
            trace!(prefab = %def.prefab, position = ?hit.point, ?handle, "spawned");
        }

        spawned
    }

    #[cfg(test)]
    fn register(&mut self, handle: H, biome: BiomeId, position: DVec3) {
        self.tracked.push(Tracked {
            handle,
            biome,
            last_position: position,
        });
        self.areas.increment(biome);
    }
}
