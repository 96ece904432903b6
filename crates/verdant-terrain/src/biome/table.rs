//! Biome table: ordered [`BiomeDef`]s with moisture classification and
//! name-based lookup.

use hashbrown::HashMap;

use super::BiomeDef;

/// Index of a biome within its [`BiomeTable`], in definition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

impl BiomeId {
    /// The first-defined biome, used as the classification fallback.
    pub const FALLBACK: Self = Self(0);
}

/// Errors that can occur when building a biome table.
#[derive(Debug, thiserror::Error)]
pub enum BiomeTableError {
    /// The table has no biomes, so there is nothing to fall back to.
    #[error("biome table must contain at least one biome")]
    Empty,
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
}

/// Immutable, ordered set of biome definitions.
///
/// Classification scans definitions in order and the first match wins.
/// Overlapping or gapped intervals are not rejected: a value no interval
/// covers resolves to the first biome.
#[derive(Clone, Debug)]
pub struct BiomeTable {
    biomes: Vec<BiomeDef>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeTable {
    /// Builds a table from definitions in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeTableError::Empty`] for an empty list and
    /// [`BiomeTableError::DuplicateName`] if two biomes share a name.
    pub fn new(biomes: Vec<BiomeDef>) -> Result<Self, BiomeTableError> {
        if biomes.is_empty() {
            return Err(BiomeTableError::Empty);
        }
        let mut name_to_id = HashMap::with_capacity(biomes.len());
        for (i, def) in biomes.iter().enumerate() {
            if name_to_id.insert(def.name.clone(), BiomeId(i as u16)).is_some() {
                return Err(BiomeTableError::DuplicateName(def.name.clone()));
            }
        }
        Ok(Self { biomes, name_to_id })
    }

    /// Classifies a moisture value, or `None` if no interval covers it.
    ///
    /// Intervals are half-open `[min, max)`. When none matches, a second pass
    /// accepts a value sitting exactly on an upper bound, so the biome whose
    /// interval ends at `1.0` still claims `1.0`.
    pub fn try_classify(&self, moisture: f64) -> Option<BiomeId> {
        let half_open = self.biomes.iter().position(|b| {
            let (lo, hi) = b.moisture_range();
            moisture >= lo && moisture < hi
        });
        half_open
            .or_else(|| {
                self.biomes.iter().position(|b| {
                    let (lo, hi) = b.moisture_range();
                    moisture >= lo && moisture <= hi
                })
            })
            .map(|i| BiomeId(i as u16))
    }

    /// Classifies a moisture value, falling back to the first biome.
    pub fn classify(&self, moisture: f64) -> BiomeId {
        self.try_classify(moisture).unwrap_or(BiomeId::FALLBACK)
    }

    /// Returns the definition for the given biome ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this table.
    pub fn get(&self, id: BiomeId) -> &BiomeDef {
        &self.biomes[id.0 as usize]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Iterate over `(id, definition)` in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &BiomeDef)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, def)| (BiomeId(i as u16), def))
    }

    /// Returns the number of biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Always `false`; an empty table cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}
