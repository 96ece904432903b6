//! Headless population simulation.
//!
//! A player walks a circle around the map center while the wildlife and
//! hostile managers tick. Hostiles the player walks into are killed and
//! reported through the removal hook.

use glam::DVec3;
use serde::Serialize;
use tracing::{debug, info};
use verdant_config::Config;
use verdant_population::{
    DayClock, EntityWorld, PopulationError, PopulationManager, TickReport,
};
use verdant_terrain::{GroundQuery, World};

/// Hostiles closer than this to the player are killed.
pub const COMBAT_RADIUS: f64 = 6.0;

/// Handle into [`SimEntities`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle(u32);

/// A simulated creature.
#[derive(Clone, Debug)]
pub struct SimEntity {
    /// Prefab it was spawned from.
    pub prefab: String,
    /// World position.
    pub position: DVec3,
}

/// Slot-vector entity store standing in for an engine scene.
#[derive(Default)]
pub struct SimEntities {
    slots: Vec<Option<SimEntity>>,
}

impl SimEntities {
    /// Number of live entities.
    pub fn live(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Live entity behind `handle`.
    pub fn get(&self, handle: EntityHandle) -> Option<&SimEntity> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }
}

impl EntityWorld for SimEntities {
    type Handle = EntityHandle;

    fn instantiate(&mut self, prefab: &str, position: DVec3, _yaw_degrees: f64) -> EntityHandle {
        self.slots.push(Some(SimEntity {
            prefab: prefab.to_owned(),
            position,
        }));
        EntityHandle((self.slots.len() - 1) as u32)
    }

    fn position(&self, handle: EntityHandle) -> Option<DVec3> {
        self.get(handle).map(|e| e.position)
    }

    fn destroy(&mut self, handle: EntityHandle) {
        if let Some(slot) = self.slots.get_mut(handle.0 as usize) {
            *slot = None;
        }
    }
}

/// Player walking a circle around a center point.
#[derive(Clone, Debug)]
pub struct Walker {
    center: DVec3,
    radius: f64,
    speed: f64,
}

impl Walker {
    /// Walker for `world` per the simulation config.
    pub fn for_world(world: &World, config: &Config) -> Self {
        let field = world.heightfield();
        let (w, h) = (field.width() as f64, field.height() as f64);
        Self {
            center: DVec3::new((w - 1.0).max(0.0) * 0.5, 0.0, (h - 1.0).max(0.0) * 0.5),
            radius: w.min(h) * config.simulation.walk_radius_fraction.max(0.0),
            speed: config.simulation.walk_speed,
        }
    }

    /// Position after `t` seconds, snapped to the ground when possible.
    pub fn position_at(&self, t: f64, ground: &impl GroundQuery) -> DVec3 {
        let angle = if self.radius > 0.0 {
            self.speed * t / self.radius
        } else {
            0.0
        };
        let x = self.center.x + angle.cos() * self.radius;
        let z = self.center.z + angle.sin() * self.radius;
        let y = ground.probe_from_sky(x, z).map_or(0.0, |hit| hit.point.y);
        DVec3::new(x, y, z)
    }
}

/// Aggregate counters for one population manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PopulationStats {
    /// Ticks that ran.
    pub ticks: usize,
    /// Ticks with the spawn gate closed.
    pub gated_ticks: usize,
    /// Total spawns.
    pub spawned: usize,
    /// Total distance despawns.
    pub despawned: usize,
    /// Entities that vanished without notice.
    pub pruned: usize,
    /// Entities killed and reported through the removal hook.
    pub killed: usize,
    /// Most entities tracked at once.
    pub peak_tracked: usize,
    /// Entities tracked at the end.
    pub final_tracked: usize,
}

impl PopulationStats {
    fn record(&mut self, report: TickReport, tracked: usize) {
        self.ticks += 1;
        self.gated_ticks += usize::from(!report.gate_open);
        self.spawned += report.spawned;
        self.despawned += report.despawned;
        self.pruned += report.pruned;
        self.peak_tracked = self.peak_tracked.max(tracked);
    }
}

/// Results of a simulation run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SimulationReport {
    /// Animal manager counters.
    pub wildlife: PopulationStats,
    /// Enemy manager counters.
    pub hostiles: PopulationStats,
}

/// Run the configured number of steps over `world`.
pub fn simulate(world: &World, config: &Config) -> Result<SimulationReport, PopulationError> {
    let seed = world.params().seed;
    let mut wildlife = PopulationManager::new(
        config.wildlife.clone(),
        world.biomes(),
        world.moisture(),
        seed,
    )?;
    let mut hostiles = PopulationManager::new(
        config.hostiles.clone(),
        world.biomes(),
        world.moisture(),
        seed,
    )?;

    let sim = &config.simulation;
    let walker = Walker::for_world(world, config);
    let mut clock = DayClock::new(sim.day_length_seconds, sim.start_time_of_day);
    let mut entities = SimEntities::default();
    let mut report = SimulationReport::default();

    for step in 0..sim.ticks {
        let now = step as f64 * sim.tick_seconds;
        let player = walker.position_at(now, world);
        let tod = Some(clock.time_of_day);

        if let Some(tick) = wildlife.update(now, player, tod, &mut entities, world) {
            report.wildlife.record(tick, wildlife.tracked_count());
        }
        if let Some(tick) = hostiles.update(now, player, tod, &mut entities, world) {
            report.hostiles.record(tick, hostiles.tracked_count());
        }

        let slain: Vec<EntityHandle> = hostiles
            .tracked_handles()
            .filter(|&h| {
                entities
                    .position(h)
                    .is_some_and(|p| p.distance(player) < COMBAT_RADIUS)
            })
            .collect();
        for handle in slain {
            entities.destroy(handle);
            if hostiles.on_entity_removed(handle) {
                report.hostiles.killed += 1;
            }
        }

        clock.advance(sim.tick_seconds);
        if step % 100 == 0 {
            debug!(
                step,
                time_of_day = clock.time_of_day,
                wildlife = wildlife.tracked_count(),
                hostiles = hostiles.tracked_count(),
                "simulation progress"
            );
        }
    }

    report.wildlife.final_tracked = wildlife.tracked_count();
    report.hostiles.final_tracked = hostiles.tracked_count();

    wildlife.despawn_all(&mut entities);
    hostiles.despawn_all(&mut entities);
    info!(
        wildlife_spawned = report.wildlife.spawned,
        hostiles_spawned = report.hostiles.spawned,
        killed = report.hostiles.killed,
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_terrain::WorldGenerator;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.world.width = 120;
        config.world.height = 120;
        config.world.seed = 5;
        config.simulation.ticks = 240;
        config
    }

    fn generate(config: &Config) -> World {
        WorldGenerator::new(config.world.clone(), config.biome_table().unwrap()).generate()
    }

    #[test]
    fn test_entities_slots() {
        let mut entities = SimEntities::default();
        let a = entities.instantiate("deer", DVec3::X, 0.0);
        let b = entities.instantiate("wolf", DVec3::Z, 90.0);
        assert_eq!(entities.live(), 2);
        entities.destroy(a);
        assert!(entities.position(a).is_none());
        assert_eq!(entities.get(b).unwrap().prefab, "wolf");
        assert_eq!(entities.live(), 1);
    }

    #[test]
    fn test_walker_circles_center() {
        let config = small_config();
        let world = generate(&config);
        let walker = Walker::for_world(&world, &config);
        for t in [0.0, 10.0, 55.5, 300.0] {
            let p = walker.position_at(t, &world);
            let d = ((p.x - 59.5).powi(2) + (p.z - 59.5).powi(2)).sqrt();
            assert!((d - 30.0).abs() < 1e-9, "walker at distance {d}");
        }
    }

    #[test]
    fn test_simulation_runs_and_respects_caps() {
        let config = small_config();
        let world = generate(&config);
        let report = simulate(&world, &config).unwrap();

        assert_eq!(report.wildlife.ticks, 240 / 5, "one tick every 5 seconds");
        assert_eq!(report.hostiles.ticks, 240 / 10);
        assert!(report.wildlife.peak_tracked <= config.wildlife.global_cap);
        assert!(report.hostiles.peak_tracked <= config.hostiles.global_cap);
        assert!(report.wildlife.spawned > 0, "wildlife spawns on the default biomes");
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let config = small_config();
        let world = generate(&config);
        let a = simulate(&world, &config).unwrap();
        let b = simulate(&world, &config).unwrap();
        assert_eq!(a.wildlife, b.wildlife);
        assert_eq!(a.hostiles, b.hostiles);
    }
}
