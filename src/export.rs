//! Writes generated terrain to disk: PNG maps plus a JSON manifest.
//!
//! Output structure:
//!   <dir>/
//!     heightmap.png          # 16-bit grayscale, row y = v
//!     splat.png              # RGBA, first four layer weights
//!     ground_cover_<i>.png   # 8-bit grayscale density per layer
//!     manifest.json          # config, layer names, trees, islands, warnings

use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma, Rgba};
use serde_json::json;

use crate::core::types::Result;
use crate::generation::{GeneratedTerrain, GenerationConfig, GroundCoverDensityGrid, LayerWeightGrid};
use crate::terrain::Heightfield;

pub const HEIGHTMAP_FILE: &str = "heightmap.png";
pub const SPLAT_FILE: &str = "splat.png";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const MANIFEST_VERSION: u32 = 1;

#[inline]
fn unit_to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16
}

#[inline]
fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
}

fn side_u32(side: usize) -> u32 {
    u32::try_from(side).unwrap_or(u32::MAX)
}

/// Heightfield as a 16-bit grayscale PNG.
pub fn write_heightmap_png(heights: &Heightfield, path: &Path) -> Result<()> {
    let side = side_u32(heights.side());
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(side, side, |x, y| {
        Luma([unit_to_u16(heights[(x as usize, y as usize)])])
    });
    img.save(path)?;
    Ok(())
}

/// The first four layer weights packed into RGBA. Missing layers are zero.
pub fn write_splat_png(weights: &LayerWeightGrid, path: &Path) -> Result<()> {
    let side = side_u32(weights.side());
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(side, side, |x, y| {
        let cell = weights.weights_at(x as usize, y as usize);
        let mut px = [0u8; 4];
        for (channel, &w) in px.iter_mut().zip(cell) {
            *channel = unit_to_u8(w);
        }
        Rgba(px)
    });
    img.save(path)?;
    Ok(())
}

/// Ground-cover density scaled so `max_density` maps to white.
pub fn write_density_png(density: &GroundCoverDensityGrid, max_density: u8, path: &Path) -> Result<()> {
    let side = side_u32(density.side());
    let max = max_density.max(1) as f32;
    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(side, side, |x, y| {
        Luma([unit_to_u8(density[(x as usize, y as usize)] as f32 / max)])
    });
    img.save(path)?;
    Ok(())
}

/// Manifest describing a generated terrain and its placements.
pub fn manifest(terrain: &GeneratedTerrain, config: &GenerationConfig) -> serde_json::Value {
    let ground_cover_files: Vec<String> = (0..terrain.ground_cover.len())
        .map(|i| format!("ground_cover_{}.png", i))
        .collect();
    let trees: Vec<_> = terrain.trees.iter().map(|tree| {
        let pos = tree.world_position(&config.world, &terrain.heightfield);
        json!({
            "u": tree.u,
            "v": tree.v,
            "position": [pos.x, pos.y, pos.z],
            "rotation": tree.rotation,
            "width_scale": tree.width_scale,
            "height_scale": tree.height_scale,
            "prototype": tree.prototype,
        })
    }).collect();

    let islands: Vec<_> = terrain.islands.iter().map(|island| {
        json!({
            "center": island.center,
            "size": island.size,
            "bounds": island.bounds(),
        })
    }).collect();

    json!({
        "version": MANIFEST_VERSION,
        "seed": config.seed,
        "resolution": terrain.heightfield.side(),
        "world": config.world,
        "heightmap": HEIGHTMAP_FILE,
        "splat": {
            "file": SPLAT_FILE,
            "resolution": terrain.layer_weights.side(),
            "layers": terrain.layer_weights.layer_names(),
        },
        "ground_cover": ground_cover_files,
        "trees": trees,
        "islands": islands,
        "warnings": terrain.warnings,
        "config": config,
    })
}

/// Write every map and the manifest into `dir`. Returns the manifest path.
pub fn export_terrain(terrain: &GeneratedTerrain, config: &GenerationConfig, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    write_heightmap_png(&terrain.heightfield, &dir.join(HEIGHTMAP_FILE))?;
    write_splat_png(&terrain.layer_weights, &dir.join(SPLAT_FILE))?;
    for (i, density) in terrain.ground_cover.iter().enumerate() {
        write_density_png(density, config.ground_cover.max_density, &dir.join(format!("ground_cover_{}.png", i)))?;
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest(terrain, config))?)?;

    log::info!("Exported terrain to {}", dir.display());
    Ok(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generate;
    use crate::math::Grid;

    fn small_terrain() -> (GeneratedTerrain, GenerationConfig) {
        let mut config = GenerationConfig::with_seed(31);
        config.resolution = 33;
        config.ground_cover.resolution = 24;
        config.ground_cover.layers = 2;
        config.trees.count = 10;
        config.features.enabled = true;
        let terrain = generate(&config).unwrap();
        (terrain, config)
    }

    #[test]
    fn test_heightmap_png_is_16_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.png");
        let heights = Grid::from_fn(4, |x, y| if (x, y) == (3, 1) { 1.0 } else { 0.5 });
        write_heightmap_png(&heights, &path).unwrap();

        let img = image::open(&path).unwrap().into_luma16();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(3, 1)[0], u16::MAX);
        assert_eq!(img.get_pixel(0, 0)[0], 32768);
    }

    #[test]
    fn test_export_terrain_writes_all_files() {
        let (terrain, config) = small_terrain();
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = export_terrain(&terrain, &config, dir.path()).unwrap();

        let splat = image::open(dir.path().join(SPLAT_FILE)).unwrap().into_rgba8();
        assert_eq!(splat.dimensions(), (33, 33));
        for px in splat.pixels() {
            let total: u32 = px.0.iter().map(|&c| c as u32).sum();
            // Four rounded channels of weights summing to 1
            assert!((253..=257).contains(&total), "channel sum {}", total);
        }
        assert!(dir.path().join("ground_cover_0.png").exists());
        assert!(dir.path().join("ground_cover_1.png").exists());

        let manifest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(manifest_path).unwrap()).unwrap();
        assert_eq!(manifest["seed"], 31);
        assert_eq!(manifest["resolution"], 33);
        assert_eq!(manifest["splat"]["layers"][3], "snow");
        assert_eq!(manifest["trees"].as_array().unwrap().len(), terrain.trees.len());
        let islands = manifest["islands"].as_array().unwrap();
        assert_eq!(islands.len(), 5);
        for (entry, island) in islands.iter().zip(&terrain.islands) {
            let bounds = island.bounds();
            assert!((entry["bounds"]["min"][1].as_f64().unwrap() - bounds.min.y as f64).abs() < 1e-3);
            assert!((entry["bounds"]["max"][0].as_f64().unwrap() - bounds.max.x as f64).abs() < 1e-3);
            assert!(bounds.min.y < island.center.y && island.center.y < bounds.max.y);
        }
        assert_eq!(manifest["config"]["noise"]["octaves"], 4);
    }

    #[test]
    fn test_manifest_tree_positions_in_world() {
        let (terrain, config) = small_terrain();
        let value = manifest(&terrain, &config);
        for tree in value["trees"].as_array().unwrap() {
            let x = tree["position"][0].as_f64().unwrap();
            let z = tree["position"][2].as_f64().unwrap();
            assert!((0.0..=2000.0).contains(&x));
            assert!((0.0..=2000.0).contains(&z));
        }
    }
}
