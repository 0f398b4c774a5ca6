/// Coverage weight a road channel must exceed for a cell to stay solid
pub const DEFAULT_TEXTURE_THRESHOLD: f32 = 0.5;

/// Coverage channels painted with road materials
pub const DEFAULT_ROAD_CHANNELS: &[usize] = &[1];

/// World-space radius around a road point that keeps a hole map cell open
pub const DEFAULT_HOLE_RADIUS: f32 = 1.0;

/// Elevation of the generated minimap plane
pub const MINIMAP_PLANE_ELEVATION: f32 = 0.0;
