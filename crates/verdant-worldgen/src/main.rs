//! Verdant worldgen: generate a terrain world and simulate its population.
//!
//! Loads `config.ron` (creating it on first run), applies CLI overrides,
//! generates the world, scatters vegetation, runs the population
//! simulation, and writes preview PNGs plus a JSON summary.
//!
//! Run with: `cargo run -p verdant-worldgen -- --seed 42 --out previews`

mod sim;
mod summary;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use verdant_config::{CliArgs, Config, ConfigError, default_config_dir};
use verdant_population::PopulationError;
use verdant_terrain::WorldGenerator;
use verdant_terrain::debug_viz::{DebugImage, render_biome_debug, render_heightfield_debug};

/// Anything that can stop a worldgen run.
#[derive(Debug, thiserror::Error)]
enum WorldgenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error("failed to encode preview: {0}")]
    Png(#[from] png::EncodingError),

    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("verdant-worldgen: {err}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&args);

    verdant_log::init_logging(
        Some(&args.out.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    match run(&config, &args.out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, out: &Path) -> Result<(), WorldgenError> {
    info!(
        seed = config.world.seed,
        width = config.world.width,
        height = config.world.height,
        biomes = config.biomes.len(),
        "generating world"
    );

    let world = WorldGenerator::new(config.world.clone(), config.biome_table()?).generate();
    let scatter = world.scatter_vegetation();
    let mesh = world.mesh();
    info!(
        props = scatter.props.len(),
        grass = scatter.grass.len(),
        triangles = mesh.triangle_count(),
        "terrain ready"
    );

    let population = sim::simulate(&world, config)?;

    create_dir(out)?;
    if config.debug.export_previews {
        write_png(&out.join("heightfield.png"), &render_heightfield_debug(world.heightfield()))?;
        write_png(
            &out.join("biomes.png"),
            &render_biome_debug(world.heightfield(), world.biomes()),
        )?;
    }

    let summary = summary::summarize(&world, &scatter, population);
    let json = serde_json::to_string_pretty(&summary)?;
    write_file(&out.join("summary.json"), json.as_bytes())?;

    info!(out = %out.display(), "run complete");
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), WorldgenError> {
    std::fs::create_dir_all(path).map_err(|source| WorldgenError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_png(path: &Path, image: &DebugImage) -> Result<(), WorldgenError> {
    write_file(path, &image.encode_png()?)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), WorldgenError> {
    std::fs::write(path, bytes).map_err(|source| WorldgenError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.width = 48;
        config.world.height = 48;
        config.simulation.ticks = 20;

        run(&config, dir.path()).unwrap();
        for name in ["heightfield.png", "biomes.png", "summary.json"] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
    }

    #[test]
    fn test_previews_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.width = 32;
        config.world.height = 32;
        config.simulation.ticks = 5;
        config.debug.export_previews = false;

        run(&config, dir.path()).unwrap();
        assert!(!dir.path().join("heightfield.png").exists());
        assert!(dir.path().join("summary.json").exists());
    }

    #[test]
    fn test_bad_biomes_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.biomes.clear();
        assert!(matches!(
            run(&config, dir.path()),
            Err(WorldgenError::Config(ConfigError::Biomes(_)))
        ));
    }
}
