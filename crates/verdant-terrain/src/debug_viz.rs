//! Terrain debug visualization: 2D previews of generated worlds.
//!
//! Provides [`DebugImage`] and renderers for the final heightfield and the
//! biome map. Images encode to PNG so tools can dump them next to a run.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    SHORELINE_COLOR, biome_color, height_to_color, render_biome_debug, render_heightfield_debug,
};
