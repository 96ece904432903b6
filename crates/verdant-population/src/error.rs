//! Population construction errors.

/// Errors raised while building a [`crate::PopulationManager`].
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// A spawn definition names a biome absent from the biome table.
    #[error("spawn definition '{prefab}' references unknown biome '{biome}'")]
    UnknownBiome {
        /// Prefab of the offending definition.
        prefab: String,
        /// Biome name that failed to resolve.
        biome: String,
    },
}
