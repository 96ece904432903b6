//! Per-biome area estimates, population caps, and live counts.

use hashbrown::HashMap;
use verdant_terrain::BiomeId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct AreaEntry {
    area: f64,
    cap: u32,
    count: u32,
}

/// Area and live-entity bookkeeping for every biome in a table.
///
/// Areas and caps are fixed at construction; counts change only through
/// [`increment`](Self::increment) and [`decrement`](Self::decrement).
#[derive(Clone, Debug, Default)]
pub struct BiomeAreaTable {
    entries: Vec<AreaEntry>,
}

impl BiomeAreaTable {
    /// Build the table for `biome_count` biomes.
    ///
    /// Each biome's cap is `ceil(area / area_unit * max_per_unit)` raised to
    /// at least `min_cap`. Biomes missing from `areas` get area zero and
    /// therefore the floor cap.
    pub fn new(
        areas: &HashMap<BiomeId, f64>,
        biome_count: usize,
        area_unit: f64,
        max_per_unit: f64,
        min_cap: u32,
    ) -> Self {
        let entries = (0..biome_count)
            .map(|i| {
                let area = areas.get(&BiomeId(i as u16)).copied().unwrap_or(0.0);
                let raw = if area_unit > 0.0 {
                    (area / area_unit * max_per_unit).ceil()
                } else {
                    0.0
                };
                // `as` saturates: negative and NaN become 0.
                let cap = (raw as u32).max(min_cap);
                AreaEntry {
                    area,
                    cap,
                    count: 0,
                }
            })
            .collect();
        Self { entries }
    }

    /// Number of biomes tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no biomes are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated surface area of `biome`.
    pub fn area(&self, biome: BiomeId) -> f64 {
        self.entry(biome).map_or(0.0, |e| e.area)
    }

    /// Population cap of `biome`. Unknown biomes have a cap of zero.
    pub fn cap(&self, biome: BiomeId) -> u32 {
        self.entry(biome).map_or(0, |e| e.cap)
    }

    /// Live count of `biome`.
    pub fn count(&self, biome: BiomeId) -> u32 {
        self.entry(biome).map_or(0, |e| e.count)
    }

    /// Sum of live counts across all biomes.
    pub fn total_count(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Whether `biome` can take one more entity.
    pub fn has_headroom(&self, biome: BiomeId) -> bool {
        self.entry(biome).is_some_and(|e| e.count < e.cap)
    }

    /// Record a spawn in `biome`.
    pub fn increment(&mut self, biome: BiomeId) {
        if let Some(e) = self.entries.get_mut(biome.0 as usize) {
            e.count += 1;
        }
    }

    /// Record a removal from `biome`. Saturates at zero.
    pub fn decrement(&mut self, biome: BiomeId) {
        if let Some(e) = self.entries.get_mut(biome.0 as usize) {
            e.count = e.count.saturating_sub(1);
        }
    }

    /// Zero every live count.
    pub fn reset_counts(&mut self) {
        for e in &mut self.entries {
            e.count = 0;
        }
    }

    /// `(biome, area, cap, count)` for every biome, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, f64, u32, u32)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (BiomeId(i as u16), e.area, e.cap, e.count))
    }

    fn entry(&self, biome: BiomeId) -> Option<&AreaEntry> {
        self.entries.get(biome.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BiomeAreaTable {
        let mut areas = HashMap::new();
        areas.insert(BiomeId(0), 10_000.0);
        areas.insert(BiomeId(1), 150.0);
        // Biome 2 never sampled.
        BiomeAreaTable::new(&areas, 3, 1000.0, 5.0, 3)
    }

    #[test]
    fn test_caps_from_area() {
        let t = table();
        assert_eq!(t.cap(BiomeId(0)), 50, "10000 / 1000 * 5");
        assert_eq!(t.cap(BiomeId(1)), 3, "ceil(0.75) = 1, raised to the floor");
        assert_eq!(t.cap(BiomeId(2)), 3, "unsampled biome gets the floor");
        assert_eq!(t.area(BiomeId(2)), 0.0);
    }

    #[test]
    fn test_ceil_rounds_partial_units_up() {
        let mut areas = HashMap::new();
        areas.insert(BiomeId(0), 2_100.0);
        let t = BiomeAreaTable::new(&areas, 1, 1000.0, 3.0, 2);
        assert_eq!(t.cap(BiomeId(0)), 7, "ceil(6.3)");
    }

    #[test]
    fn test_counts_and_headroom() {
        let mut t = table();
        for _ in 0..3 {
            assert!(t.has_headroom(BiomeId(1)));
            t.increment(BiomeId(1));
        }
        assert!(!t.has_headroom(BiomeId(1)));
        assert_eq!(t.count(BiomeId(1)), 3);
        assert_eq!(t.total_count(), 3);

        t.decrement(BiomeId(1));
        assert!(t.has_headroom(BiomeId(1)));
    }

    #[test]
    fn test_decrement_saturates() {
        let mut t = table();
        t.decrement(BiomeId(0));
        assert_eq!(t.count(BiomeId(0)), 0);
    }

    #[test]
    fn test_unknown_biome_has_no_headroom() {
        let mut t = table();
        assert!(!t.has_headroom(BiomeId(9)));
        t.increment(BiomeId(9));
        assert_eq!(t.total_count(), 0);
    }

    #[test]
    fn test_reset_counts() {
        let mut t = table();
        t.increment(BiomeId(0));
        t.increment(BiomeId(2));
        t.reset_counts();
        assert_eq!(t.total_count(), 0);
        assert_eq!(t.cap(BiomeId(0)), 50, "caps survive a reset");
    }

    #[test]
    fn test_zero_area_unit_uses_floor() {
        let mut areas = HashMap::new();
        areas.insert(BiomeId(0), 5_000.0);
        let t = BiomeAreaTable::new(&areas, 1, 0.0, 5.0, 2);
        assert_eq!(t.cap(BiomeId(0)), 2);
    }
}
