/// Scene-file driven terrain generation: heightmap, hole mask, minimap plane and manifest.
use crate::bounds::SceneBounds;
use crate::config::{MaskConfig, PipelineConfig};
use crate::dds_writer::{write_heightmap_r16f, write_heightmap_r32f, write_mask_r8};
use crate::error::Result;
use crate::grid::{Grid, Heightfield};
use crate::manifest::{GenerationManifest, HeightmapInfo, ManifestGenerator, MinimapInfo};
use crate::pipeline::{HeightfieldPipeline, Reconstruction};
use crate::plane_mesh::PlaneMesh;
use crate::road_mask::{CoverageMap, RoadMask};
use crate::scene::{PathScene, PathSurface};
use constants::heightfield::DEFAULT_HEIGHTMAP_RESOLUTION;
use constants::road_mask::MINIMAP_PLANE_ELEVATION;
use constants::texture::{
    HEIGHTMAP_R16F_SUFFIX, HEIGHTMAP_R32F_SUFFIX, HOLE_MASK_SUFFIX, MINIMAP_MESH_SUFFIX,
    TERRAIN_HOLE_MASK_SUFFIX,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Everything needed to rebuild one terrain, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    pub bounds: SceneBounds,
    #[serde(default)]
    pub surfaces: Vec<PathSurface>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub minimap: Option<MinimapDescription>,
}

/// Coverage data and settings for the minimap plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimapDescription {
    pub coverage: CoverageMap,
    #[serde(default)]
    pub mask: MaskConfig,
    #[serde(default)]
    pub source: MaskSource,
    #[serde(default = "default_plane_elevation")]
    pub elevation: f32,
}

/// How the hole mask is derived from the coverage map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskSource {
    /// Road channel weight above the threshold keeps the cell.
    #[default]
    Threshold,
    /// Cells near any road sample (within the hole radius) are kept.
    RoadPoints,
}

fn default_resolution() -> usize {
    DEFAULT_HEIGHTMAP_RESOLUTION
}

fn default_plane_elevation() -> f32 {
    MINIMAP_PLANE_ELEVATION
}

/// Runs the full generation for one scene file.
pub struct TerrainGenerator {
    /// Scene description file path.
    scene_path: PathBuf,
    /// Output directory for generated files.
    output_dir: PathBuf,
    /// Stem shared by every generated file.
    output_name: String,
    show_progress: bool,
}

impl TerrainGenerator {
    /// Outputs land next to the scene file
    pub fn new(scene_path: &Path) -> Self {
        let output_dir = scene_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let output_name = scene_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .trim_end_matches(".scene")
            .to_string();

        Self {
            scene_path: scene_path.to_path_buf(),
            output_dir,
            output_name,
            show_progress: true,
        }
    }

    /// Redirect outputs to another directory, creating it when missing
    pub fn with_output_dir(mut self, output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        self.output_dir = output_dir.to_path_buf();
        Ok(self)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn load_scene(&self) -> Result<SceneDescription> {
        let reader = BufReader::new(File::open(&self.scene_path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load the scene, rebuild its terrain and write every output
    pub fn generate(&self) -> Result<GenerationManifest> {
        println!("Generating terrain from {}", self.scene_path.display());
        let scene = self.load_scene()?;
        self.print_scene(&scene);

        let reconstruction = self.reconstruct(&scene)?;
        let terrain = self.save_heightmaps(&scene, reconstruction)?;

        let minimap = match &scene.minimap {
            Some(description) => Some(self.generate_minimap(&scene, description, &terrain)?),
            None => None,
        };

        let manifest = GenerationManifest {
            terrain: terrain.info,
            minimap,
        };
        let manifest_gen = ManifestGenerator::new(&self.output_dir, &self.output_name);
        let manifest_path = manifest_gen.write(&manifest)?;
        println!("Saved {}", manifest_path.display());
        manifest_gen.print_summary(&manifest);

        println!("Generation complete!");
        Ok(manifest)
    }

    fn reconstruct(&self, scene: &SceneDescription) -> Result<Reconstruction> {
        let input: Heightfield = Grid::new(scene.resolution, scene.resolution, 0.0)?;
        let path_scene = PathScene::new(scene.surfaces.clone());

        HeightfieldPipeline::new(scene.pipeline.clone())
            .with_progress(self.show_progress)
            .run(&input, &scene.bounds, &path_scene)
    }

    fn save_heightmaps(
        &self,
        scene: &SceneDescription,
        reconstruction: Reconstruction,
    ) -> Result<SavedTerrain> {
        let heightfield = reconstruction.heightfield;
        let (width, height) = (heightfield.width(), heightfield.height());

        let heightmap_name = self.file_name(HEIGHTMAP_R32F_SUFFIX, width, height, "dds");
        let half_name = self.file_name(HEIGHTMAP_R16F_SUFFIX, width, height, "dds");
        write_heightmap_r32f(&self.output_dir.join(&heightmap_name), &heightfield)?;
        println!("Saved {} (R32F heightmap)", heightmap_name);
        write_heightmap_r16f(&self.output_dir.join(&half_name), &heightfield)?;
        println!("Saved {} (R16F heightmap)", half_name);

        Ok(SavedTerrain {
            info: HeightmapInfo {
                heightmap: heightmap_name,
                heightmap_half: half_name,
                width,
                height,
                bounds: scene.bounds,
                config: scene.pipeline.clone(),
                report: reconstruction.report,
            },
            heightfield,
        })
    }

    fn generate_minimap(
        &self,
        scene: &SceneDescription,
        description: &MinimapDescription,
        terrain: &SavedTerrain,
    ) -> Result<MinimapInfo> {
        let coverage = &description.coverage;
        let mask = match description.source {
            MaskSource::Threshold => RoadMask::from_coverage(coverage, &description.mask)?,
            MaskSource::RoadPoints => {
                let points = coverage.road_points(&description.mask, &scene.bounds, |x, z| {
                    terrain.world_height(&scene.bounds, x, z, coverage.width, coverage.height)
                })?;
                println!("Found {} road points", points.len());
                RoadMask::from_road_points(&points, &scene.bounds, coverage.width, &description.mask)?
            }
        };
        let (width, height) = (mask.width(), mask.height());

        let mask_name = self.file_name(HOLE_MASK_SUFFIX, width, height, "dds");
        write_mask_r8(&self.output_dir.join(&mask_name), &mask)?;
        println!("Saved {} (R8 hole mask)", mask_name);

        let terrain_mask_name = self.file_name(TERRAIN_HOLE_MASK_SUFFIX, width, height, "dds");
        write_mask_r8(&self.output_dir.join(&terrain_mask_name), &mask.inverted())?;
        println!("Saved {} (R8 terrain hole mask)", terrain_mask_name);

        let mesh = PlaneMesh::from_mask(&mask, scene.bounds.size(), description.elevation)?;
        let mesh_name = format!("{}_{}.obj", self.output_name, MINIMAP_MESH_SUFFIX);
        mesh.write_obj(&self.output_dir.join(&mesh_name))?;
        println!(
            "Saved {} ({} vertices, {} triangles)",
            mesh_name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        Ok(MinimapInfo {
            hole_mask: mask_name,
            terrain_hole_mask: terrain_mask_name,
            mesh: mesh_name,
            width,
            height,
            open_cells: mask.open_count(),
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            config: description.mask.clone(),
        })
    }

    fn file_name(&self, suffix: &str, width: usize, height: usize, extension: &str) -> String {
        format!("{}_{}_{}x{}.{}", self.output_name, suffix, width, height, extension)
    }

    fn print_scene(&self, scene: &SceneDescription) {
        println!("Scene:");
        println!("  Heightmap: {0}x{0}", scene.resolution);
        println!("  Path surfaces: {}", scene.surfaces.len());
        println!(
            "  X: {:.2} to {:.2}, Z: {:.2} to {:.2}",
            scene.bounds.min.x, scene.bounds.max.x, scene.bounds.min.z, scene.bounds.max.z
        );
        println!(
            "  Y: {:.2} to {:.2} (elevation)",
            scene.bounds.min.y, scene.bounds.max.y
        );
    }
}

struct SavedTerrain {
    info: HeightmapInfo,
    heightfield: Heightfield,
}

impl SavedTerrain {
    /// World height of the rebuilt terrain under a cell of another grid (nearest sample)
    fn world_height(&self, bounds: &SceneBounds, x: usize, z: usize, width: usize, height: usize) -> f32 {
        let hx = (x * self.heightfield.width() / width).min(self.heightfield.width() - 1);
        let hz = (z * self.heightfield.height() / height).min(self.heightfield.height() - 1);
        bounds.min.y + self.heightfield[(hx, hz)] * bounds.vertical_extent()
    }
}
