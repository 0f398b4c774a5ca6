/// Scene bounds and grid index to world coordinate conversion
use crate::error::{Result, TerrainError};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl SceneBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Reject inverted, flat or non-finite bounds
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(TerrainError::InvalidBounds(format!(
                "non-finite corners {} / {}",
                self.min, self.max
            )));
        }
        let size = self.size();
        if size.x <= 0.0 || size.z <= 0.0 {
            return Err(TerrainError::InvalidBounds(format!(
                "horizontal extent must be positive, got {}x{}",
                size.x, size.z
            )));
        }
        if size.y <= 0.0 {
            return Err(TerrainError::InvalidBounds(format!(
                "vertical extent must be positive, got {}",
                size.y
            )));
        }
        Ok(())
    }

    /// World space dimensions
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Maximum vertical extent used to normalise hit heights
    pub fn vertical_extent(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// World XZ position of grid cell `(x, z)` sampled at `index / len`
    pub fn world_xz(&self, x: usize, z: usize, width: usize, height: usize) -> Vec2 {
        let size = self.size();
        Vec2::new(
            self.min.x + size.x * (x as f32 / width as f32),
            self.min.z + size.z * (z as f32 / height as f32),
        )
    }

    /// Normalise a world height to the 0-1 vertical range
    pub fn normalize_y(&self, y: f32) -> f32 {
        (y - self.min.y) / self.vertical_extent()
    }
}
