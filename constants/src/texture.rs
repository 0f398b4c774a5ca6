/// Suffix for single channel 32-bit float heightmaps
pub const HEIGHTMAP_R32F_SUFFIX: &str = "heightmap";

/// Suffix for half precision heightmaps
pub const HEIGHTMAP_R16F_SUFFIX: &str = "heightmap_half";

/// Suffix for 8-bit hole masks
pub const HOLE_MASK_SUFFIX: &str = "holes";

/// Suffix for the complementary mask that cuts roads out of the main terrain
pub const TERRAIN_HOLE_MASK_SUFFIX: &str = "terrain_holes";

/// Suffix for the minimap plane mesh
pub const MINIMAP_MESH_SUFFIX: &str = "minimap";

/// Name of the manifest written next to the generated textures
pub const MANIFEST_SUFFIX: &str = "manifest";
