//! Terrain generator binary: runs the pipeline and exports maps to disk.
//!
//! Usage: cargo run --release --bin generate_terrain -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>     JSON config (default: built-in defaults)
//!   --seed <SEED>       Override the master seed
//!   --resolution <N>    Override the heightfield resolution
//!   --out <DIR>         Output directory (default: "output/terrain")
//!   --batch <N>         Generate N terrains with consecutive seeds in parallel
//!
//! Output structure:
//!   <out>/                  # or <out>/seed_<seed>/ per batch entry
//!     heightmap.png
//!     splat.png
//!     ground_cover_0.png
//!     manifest.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use stylterra::core::logging;
use stylterra::export::export_terrain;
use stylterra::generation::{generate_batch, GeneratedTerrain, GenerationConfig, GenerationPipeline};

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let out_dir = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "output/terrain".to_string()));
    let batch = parse_usize_arg(&args, "--batch").unwrap_or(1).max(1);

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => match GenerationConfig::load_json(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => GenerationConfig::default(),
    };
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.seed = seed;
    }
    if let Some(resolution) = parse_u32_arg(&args, "--resolution") {
        config.resolution = resolution;
    }

    println!("=== Stylterra Terrain Generator ===");
    println!("Seed:       {}", config.seed);
    println!("Resolution: {} x {}", config.resolution, config.resolution);
    println!("World:      {}m x {}m x {}m", config.world.width, config.world.length, config.world.height);
    println!("Octaves:    {}, scale {}", config.noise.octaves, config.noise.scale);
    println!("Output:     {}", out_dir.display());
    println!();

    let start = Instant::now();
    let ok = if batch == 1 {
        run_single(config, &out_dir)
    } else {
        run_batch(config, batch, &out_dir)
    };

    println!();
    println!("Done in {:.1}s", start.elapsed().as_secs_f64());
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn run_single(config: GenerationConfig, out_dir: &Path) -> bool {
    let pipeline = match GenerationPipeline::new(config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return false;
        }
    };
    let terrain = pipeline.run();
    write_output(&terrain, pipeline.config(), out_dir)
}

fn run_batch(base: GenerationConfig, count: usize, out_dir: &Path) -> bool {
    let configs: Vec<GenerationConfig> = (0..count)
        .map(|i| GenerationConfig { seed: base.seed.wrapping_add(i as u32), ..base.clone() })
        .collect();

    let mut ok = true;
    for (config, result) in configs.iter().zip(generate_batch(&configs)) {
        match result {
            Ok(terrain) => {
                let dir = out_dir.join(format!("seed_{}", config.seed));
                ok &= write_output(&terrain, config, &dir);
            }
            Err(e) => {
                log::error!("Seed {}: invalid configuration: {}", config.seed, e);
                ok = false;
            }
        }
    }
    ok
}

fn write_output(terrain: &GeneratedTerrain, config: &GenerationConfig, dir: &Path) -> bool {
    for warning in &terrain.warnings {
        println!("  warning: {}", warning);
    }
    match export_terrain(terrain, config, dir) {
        Ok(manifest) => {
            println!("Seed {}: {} trees, {} islands -> {}",
                config.seed, terrain.trees.len(), terrain.islands.len(), manifest.display());
            true
        }
        Err(e) => {
            log::error!("Failed to export to {}: {}", dir.display(), e);
            false
        }
    }
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
