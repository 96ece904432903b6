//! Biome definition: describes the properties of a single biome type.

use serde::{Deserialize, Serialize};

/// Props (trees, rocks, bushes) that may be scattered across a biome.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationSet {
    /// Prefab identifiers handed to the external world on instantiation.
    pub prefabs: Vec<String>,
    /// Probability that a sampled cell receives a prop, in `[0.0, 1.0]`.
    pub density: f64,
}

impl VegetationSet {
    /// Returns `true` if this biome has at least one prop to place.
    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

/// Grass patch parameters for a biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassParams {
    /// Grass prefab identifier.
    pub prefab: String,
    /// Probability that a cell receives a patch, in `[0.0, 1.0]`.
    pub density: f64,
    /// Blades per accepted patch.
    pub per_patch: u32,
    /// Radius (cells) blades are scattered within around the cell.
    pub spread_radius: f64,
}

impl Default for GrassParams {
    fn default() -> Self {
        Self {
            prefab: "grass".to_string(),
            density: 0.3,
            per_patch: 5,
            spread_radius: 0.5,
        }
    }
}

/// Full descriptor for a biome type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeDef {
    /// Human-readable biome name (e.g., "forest"). Unique within a table.
    pub name: String,
    /// Lower bound (inclusive) of the moisture interval.
    pub moisture_min: f64,
    /// Upper bound of the moisture interval. Exclusive, except that a value
    /// equal to it still matches when no half-open interval does.
    pub moisture_max: f64,
    /// Multiplier applied to the shaped noise height.
    pub height_multiplier: f64,
    /// Constant added after the multiplier.
    pub height_offset: f64,
    /// Scattered props.
    pub vegetation: VegetationSet,
    /// Grass patches. `None` for barren biomes.
    pub grass: Option<GrassParams>,
}

impl Default for BiomeDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            moisture_min: 0.0,
            moisture_max: 1.0,
            height_multiplier: 10.0,
            height_offset: 0.0,
            vegetation: VegetationSet {
                prefabs: Vec::new(),
                density: 0.1,
            },
            grass: None,
        }
    }
}

impl BiomeDef {
    /// Creates a barren biome covering `[moisture_min, moisture_max)`.
    pub fn new(name: impl Into<String>, moisture_min: f64, moisture_max: f64) -> Self {
        Self {
            name: name.into(),
            moisture_min,
            moisture_max,
            ..Default::default()
        }
    }

    /// The moisture interval with its bounds in ascending order.
    pub fn moisture_range(&self) -> (f64, f64) {
        if self.moisture_min <= self.moisture_max {
            (self.moisture_min, self.moisture_max)
        } else {
            (self.moisture_max, self.moisture_min)
        }
    }

    /// Final terrain height for a shaped noise value in this biome.
    #[inline]
    pub fn apply_height(&self, shaped: f64) -> f64 {
        shaped * self.height_multiplier + self.height_offset
    }
}
