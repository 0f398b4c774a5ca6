/// Output manifest linking generated textures, meshes and run statistics.
use crate::bounds::SceneBounds;
use crate::config::{MaskConfig, PipelineConfig};
use crate::error::Result;
use crate::pipeline::PipelineReport;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Generated heightfield files and statistics.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HeightmapInfo {
    /// Heightmap texture (R32F).
    pub heightmap: String,
    /// Half precision copy (R16F).
    pub heightmap_half: String,
    pub width: usize,
    pub height: usize,
    pub bounds: SceneBounds,
    pub config: PipelineConfig,
    pub report: PipelineReport,
}

/// Road mask and minimap plane outputs.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MinimapInfo {
    /// Hole mask texture (R8).
    pub hole_mask: String,
    /// Inverse of the hole mask for the surrounding terrain (R8).
    pub terrain_hole_mask: String,
    /// Minimap plane mesh (OBJ).
    pub mesh: String,
    pub width: usize,
    pub height: usize,
    pub open_cells: usize,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub config: MaskConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GenerationManifest {
    pub terrain: HeightmapInfo,
    pub minimap: Option<MinimapInfo>,
}

/// Manifest writer for one scene.
pub struct ManifestGenerator {
    /// Base output directory for all generated files.
    output_dir: PathBuf,
    /// Stem shared by every generated file.
    output_name: String,
}

impl ManifestGenerator {
    pub fn new(output_dir: &Path, output_name: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            output_name: output_name.to_string(),
        }
    }

    /// Write `<name>_manifest.json` and return its path
    pub fn write(&self, manifest: &GenerationManifest) -> Result<PathBuf> {
        let manifest_path = self.output_dir.join(format!(
            "{}_{}.json",
            self.output_name,
            constants::texture::MANIFEST_SUFFIX
        ));
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(&manifest_path, manifest_json)?;

        log::info!("Generated manifest: {}", manifest_path.display());
        Ok(manifest_path)
    }

    /// Print the key statistics of a run
    pub fn print_summary(&self, manifest: &GenerationManifest) {
        let terrain = &manifest.terrain;
        println!("Manifest Summary:");
        println!("  Heightmap: {}x{}", terrain.width, terrain.height);
        println!(
            "  Terrain bounds: ({:.2}, {:.2}) to ({:.2}, {:.2})",
            terrain.bounds.min.x, terrain.bounds.min.z, terrain.bounds.max.x, terrain.bounds.max.z
        );
        println!(
            "  Cells: {} snapped, {} margin, {} interpolated, {} unfilled",
            terrain.report.snapped,
            terrain.report.margin_filled,
            terrain.report.interpolated,
            terrain.report.unfilled
        );

        if let Some(minimap) = &manifest.minimap {
            println!(
                "  Minimap: {} vertices, {} triangles ({} of {} cells open)",
                minimap.vertex_count,
                minimap.triangle_count,
                minimap.open_cells,
                minimap.width * minimap.height
            );
        } else {
            println!("  No minimap generated");
        }
    }
}
