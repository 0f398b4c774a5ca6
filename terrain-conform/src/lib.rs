//! Path-conforming terrain heightfields and road-masked minimap planes.
pub mod bounds;
pub mod config;
pub mod dds_writer;
pub mod directional_fill;
pub mod error;
pub mod generator;
pub mod grid;
pub mod manifest;
pub mod margin;
pub mod pipeline;
pub mod plane_mesh;
pub mod progress;
pub mod road_mask;
pub mod scene;
pub mod snapper;

pub use bounds::SceneBounds;
pub use config::{Determination, ExecutionMode, MaskConfig, PipelineConfig};
pub use error::{Result, TerrainError};
pub use generator::{SceneDescription, TerrainGenerator};
pub use grid::{Grid, Heightfield, ReferenceSnapshot, SampleGrid};
pub use pipeline::{HeightfieldPipeline, PipelineReport, Reconstruction};
pub use plane_mesh::{PlaneMesh, PlaneRequest, generate_planes};
pub use road_mask::{CoverageMap, RoadMask};
pub use scene::{PathScene, PathSurface};
pub use snapper::SurfaceQuery;
