//! Terrain debug visualization renderers: heightfield and biome map.

use super::image::DebugImage;
use crate::biome::{BiomeId, BiomeTable};
use crate::heightfield::Heightfield;

/// Color painted over shoreline cells in the biome map.
pub const SHORELINE_COLOR: (u8, u8, u8) = (230, 210, 140);

/// Render the heightfield as a color-coded elevation map, one pixel per cell.
///
/// Heights are normalized over the field's own range, so flat maps render
/// as a single mid-band color.
pub fn render_heightfield_debug(field: &Heightfield) -> DebugImage {
    let mut image = DebugImage::new(field.width() as u32, field.height() as u32);
    let (lo, hi) = field.height_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;

    for (x, y, &h) in field.heights().iter() {
        let normalized = if span > 0.0 { (h - lo) / span } else { 0.5 };
        image.set_rgb(x as u32, y as u32, height_to_color(normalized));
    }

    image
}

/// Map a normalized height `[0, 1]` to an RGB color.
///
/// Color bands: water → beach → lowlands → hills → peaks.
pub fn height_to_color(normalized: f64) -> (u8, u8, u8) {
    let n = normalized.clamp(0.0, 1.0);
    if n < 0.05 {
        // Water
        (30, 80, 200)
    } else if n < 0.1 {
        // Beach
        (220, 200, 130)
    } else if n < 0.55 {
        let t = (n - 0.1) / 0.45;
        (
            channel(30.0 + t * 80.0),
            channel(160.0 - t * 40.0),
            channel(30.0 + t * 20.0),
        )
    } else if n < 0.8 {
        let t = (n - 0.55) / 0.25;
        (
            channel(110.0 + t * 40.0),
            channel(120.0 - t * 50.0),
            channel(50.0 + t * 20.0),
        )
    } else {
        let t = ((n - 0.8) / 0.2).min(1.0);
        let base = channel(150.0 + t * 105.0);
        (base, base, base)
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// RGB color for a biome, chosen by name with a fallback per id.
pub fn biome_color(id: BiomeId, table: &BiomeTable) -> (u8, u8, u8) {
    match table.get(id).name.to_ascii_lowercase().as_str() {
        "ocean" | "water" => (20, 50, 180),
        "shore" | "beach" => (230, 210, 140),
        "plains" | "grassland" | "meadow" => (100, 180, 60),
        "forest" => (30, 120, 30),
        "swamp" | "marsh" => (60, 90, 50),
        "desert" => (220, 190, 80),
        "tundra" => (200, 210, 220),
        "highlands" | "mountains" => (130, 110, 90),
        _ => {
            // Spread unnamed biomes around the hue wheel.
            let h = (id.0 as u32).wrapping_mul(97) % 360;
            hue_to_rgb(h as f64)
        }
    }
}

/// Render the biome map, with shoreline cells painted [`SHORELINE_COLOR`].
pub fn render_biome_debug(field: &Heightfield, table: &BiomeTable) -> DebugImage {
    let mut image = DebugImage::new(field.width() as u32, field.height() as u32);

    for (x, y, &biome) in field.biomes().iter() {
        let color = if field.is_shoreline(x, y) {
            SHORELINE_COLOR
        } else {
            biome_color(biome, table)
        };
        image.set_rgb(x as u32, y as u32, color);
    }

    image
}

fn hue_to_rgb(hue: f64) -> (u8, u8, u8) {
    let h = hue / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let scale = |c: f64| (40.0 + c * 180.0) as u8;
    (scale(r), scale(g), scale(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeDef;
    use crate::grid::Grid;
    use crate::heightfield::{EdgeFalloff, FalloffShape, build_heightfield};

    fn table() -> BiomeTable {
        BiomeTable::new(vec![
            BiomeDef::new("Plains", 0.0, 0.5),
            BiomeDef::new("Forest", 0.5, 1.0),
            BiomeDef::new("Bog of Eternal Stench", 1.0, 2.0),
        ])
        .unwrap()
    }

    fn field(band: f64) -> Heightfield {
        let noise = Grid::from_fn(8, 6, |x, y| (x + y) as f64 / 12.0);
        let moisture = Grid::from_fn(8, 6, |x, _| if x < 4 { 0.2 } else { 0.7 });
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band,
        };
        build_heightfield(&noise, &moisture, &table(), &falloff)
    }

    #[test]
    fn test_heightfield_image_dimensions() {
        let image = render_heightfield_debug(&field(0.0));
        assert_eq!(image.dimensions(), (8, 6));
        assert!(image.unique_color_count() > 1);
    }

    #[test]
    fn test_height_colors_span_bands() {
        assert_eq!(height_to_color(0.0), (30, 80, 200));
        assert_eq!(height_to_color(1.0), (255, 255, 255));
        assert_ne!(height_to_color(0.3), height_to_color(0.7));
    }

    #[test]
    fn test_height_colors_round_to_band_edges() {
        // Peaks band ends on pure white even when the band fraction lands just under 1.
        assert_eq!(height_to_color(0.9999999999999999), (255, 255, 255));
        assert_eq!(height_to_color(0.8), (150, 150, 150));
        assert_eq!(height_to_color(0.1), (30, 160, 30));
        assert_eq!(height_to_color(0.55), (110, 120, 50));
    }

    #[test]
    fn test_biome_map_colors() {
        let t = table();
        let image = render_biome_debug(&field(0.0), &t);
        let plains = biome_color(BiomeId(0), &t);
        let forest = biome_color(BiomeId(1), &t);
        assert_eq!(image.get_pixel(0, 3), (plains.0, plains.1, plains.2, 255));
        assert_eq!(image.get_pixel(7, 3), (forest.0, forest.1, forest.2, 255));
    }

    #[test]
    fn test_biome_map_paints_shoreline() {
        let image = render_biome_debug(&field(2.0), &table());
        let (r, g, b, _) = image.get_pixel(0, 0);
        assert_eq!((r, g, b), SHORELINE_COLOR);
        let (r, g, b, _) = image.get_pixel(3, 3);
        assert_ne!((r, g, b), SHORELINE_COLOR);
    }

    #[test]
    fn test_unnamed_biome_gets_distinct_color() {
        let t = table();
        let c = biome_color(BiomeId(2), &t);
        assert_ne!(c, biome_color(BiomeId(0), &t));
        assert_ne!(c, biome_color(BiomeId(1), &t));
    }
}
