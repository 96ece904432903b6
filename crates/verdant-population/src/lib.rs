//! Density-capped creature population keyed to biome area.
//!
//! A [`PopulationManager`] periodically despawns tracked entities that fell
//! too far behind the reference point and proposes new spawn groups around
//! it, never letting a biome's live count exceed its area-derived cap or the
//! total exceed the global cap. Wildlife and hostiles are two presets of the
//! same manager.

mod area;
mod config;
mod error;
mod gate;
mod manager;

pub use area::BiomeAreaTable;
pub use config::{PopulationConfig, SpawnDefinition, SpawnRing};
pub use error::PopulationError;
pub use gate::{DayClock, SpawnGate};
pub use manager::{EntityWorld, PopulationManager, TickReport};
