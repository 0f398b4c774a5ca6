/// Scale applied to snapped path heights so the terrain sits just below the road surface
pub const DEFAULT_PATH_HEIGHT_MULTIPLIER: f32 = 0.99;

/// Radius (cells) around snapped path samples that copy the nearest path height
pub const DEFAULT_MARGIN_RADIUS: f64 = 10.0;

/// Scale applied to heights copied into the path margin
pub const DEFAULT_MARGIN_HEIGHT_MULTIPLIER: f32 = 1.01;

/// Extra casts allowed when walking through stacked surfaces from above
pub const MAX_ADDITIONAL_CASTS: u32 = 100;

/// Distance (world units) a chained ray is advanced past the previous hit
pub const RECAST_OFFSET: f32 = 1.0;

/// Heightmap resolution used when a scene description omits one (2^n + 1)
pub const DEFAULT_HEIGHTMAP_RESOLUTION: usize = 513;
