//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use verdant_population::{PopulationConfig, SpawnDefinition};
use verdant_terrain::{BiomeDef, BiomeTable, GrassParams, VegetationSet, WorldParams};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Map size, seed, noise, falloff, and vegetation sampling.
    pub world: WorldParams,
    /// Biome definitions in classification order. The first is the fallback.
    pub biomes: Vec<BiomeDef>,
    /// Animal population.
    pub wildlife: PopulationConfig,
    /// Enemy population.
    pub hostiles: PopulationConfig,
    /// Headless simulation settings.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Headless population simulation run by the worldgen tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulation steps.
    pub ticks: u32,
    /// Seconds per step.
    pub tick_seconds: f64,
    /// Seconds per in-game day.
    pub day_length_seconds: f64,
    /// Normalized time of day at the first step.
    pub start_time_of_day: f64,
    /// Player walking speed, world units per second.
    pub walk_speed: f64,
    /// Radius of the player's walk around the map center, as a fraction of
    /// the smaller map dimension.
    pub walk_radius_fraction: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write heightfield and biome preview PNGs.
    pub export_previews: bool,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldParams {
                width: 200,
                height: 200,
                ..Default::default()
            },
            biomes: default_biomes(),
            wildlife: PopulationConfig::wildlife().with_spawns(vec![
                SpawnDefinition::new("deer", "Plains").with_group(2, 4).with_chance(0.6),
                SpawnDefinition::new("rabbit", "Plains").with_group(1, 3).with_chance(0.8),
                SpawnDefinition::new("boar", "Forest").with_group(1, 3).with_chance(0.5),
                SpawnDefinition::new("wolf", "Forest").with_group(2, 4).with_chance(0.3),
                SpawnDefinition::new("goat", "Highlands").with_group(1, 2).with_chance(0.5),
            ]),
            hostiles: PopulationConfig::hostile().with_spawns(vec![
                SpawnDefinition::new("skeleton", "Plains").with_group(1, 2),
                SpawnDefinition::new("ghoul", "Forest").with_group(2, 3).with_chance(0.7),
                SpawnDefinition::new("troll", "Highlands").with_chance(0.4),
            ]),
            simulation: SimulationConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            tick_seconds: 1.0,
            day_length_seconds: 300.0,
            start_time_of_day: 0.5,
            walk_speed: 4.0,
            walk_radius_fraction: 0.25,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            export_previews: true,
        }
    }
}

/// Shore, Plains, Forest, Highlands, partitioning moisture `[0, 1]`.
pub fn default_biomes() -> Vec<BiomeDef> {
    let prefabs = |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };

    let mut shore = BiomeDef::new("Shore", 0.0, 0.2);
    shore.height_multiplier = 3.0;
    shore.vegetation = VegetationSet {
        prefabs: prefabs(&["driftwood", "rock_small"]),
        density: 0.02,
    };

    let mut plains = BiomeDef::new("Plains", 0.2, 0.5);
    plains.height_multiplier = 6.0;
    plains.vegetation = VegetationSet {
        prefabs: prefabs(&["bush", "rock_small"]),
        density: 0.05,
    };
    plains.grass = Some(GrassParams::default());

    let mut forest = BiomeDef::new("Forest", 0.5, 0.8);
    forest.vegetation = VegetationSet {
        prefabs: prefabs(&["pine", "oak", "birch"]),
        density: 0.3,
    };
    forest.grass = Some(GrassParams {
        density: 0.15,
        per_patch: 3,
        ..Default::default()
    });

    let mut highlands = BiomeDef::new("Highlands", 0.8, 1.0);
    highlands.height_multiplier = 18.0;
    highlands.height_offset = 2.0;
    highlands.vegetation = VegetationSet {
        prefabs: prefabs(&["boulder"]),
        density: 0.08,
    };

    vec![shore, plains, forest, highlands]
}

/// `<platform config dir>/verdant`, falling back to `./verdant`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("verdant")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Build the biome table from [`Config::biomes`].
    pub fn biome_table(&self) -> Result<BiomeTable, ConfigError> {
        Ok(BiomeTable::new(self.biomes.clone())?)
    }
}
