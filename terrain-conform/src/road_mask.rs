/// Road coverage masks: which cells stay solid and which become holes
use crate::bounds::SceneBounds;
use crate::config::MaskConfig;
use crate::error::{Result, TerrainError};
use crate::grid::Grid;
use glam::{Vec2, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-cell material weights, `channels` floats per cell, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageMap {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub weights: Vec<f32>,
}

impl CoverageMap {
    pub fn new(width: usize, height: usize, channels: usize, weights: Vec<f32>) -> Result<Self> {
        let map = Self {
            width,
            height,
            channels,
            weights,
        };
        map.validate()?;
        Ok(map)
    }

    /// Check the weight buffer against the declared layout
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.channels == 0 {
            return Err(TerrainError::InvalidConfig(
                "coverage map needs at least one channel".to_string(),
            ));
        }
        let expected = self.width * self.height * self.channels;
        if self.weights.len() != expected {
            return Err(TerrainError::BufferSize {
                width: self.width,
                height: self.height,
                expected,
                actual: self.weights.len(),
            });
        }
        Ok(())
    }

    /// All channel weights of cell `(x, z)`
    pub fn weights_at(&self, x: usize, z: usize) -> &[f32] {
        let start = (z * self.width + x) * self.channels;
        &self.weights[start..start + self.channels]
    }

    /// World positions of cells whose road weight passes the mask threshold.
    ///
    /// Heights come from `elevation(x, z)` so points can be lifted onto a terrain.
    pub fn road_points(
        &self,
        config: &MaskConfig,
        bounds: &SceneBounds,
        elevation: impl Fn(usize, usize) -> f32,
    ) -> Result<Vec<Vec3>> {
        self.validate()?;
        config.validate(self.channels)?;

        let mut points = Vec::new();
        for z in 0..self.height {
            for x in 0..self.width {
                if is_road(self.weights_at(x, z), config) {
                    let xz = bounds.world_xz(x, z, self.width, self.height);
                    points.push(Vec3::new(xz.x, elevation(x, z), xz.y));
                }
            }
        }
        Ok(points)
    }
}

/// Boolean keep/hole grid: `true` cells are solid, `false` cells are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadMask {
    grid: Grid<bool>,
}

impl RoadMask {
    pub fn from_grid(grid: Grid<bool>) -> Self {
        Self { grid }
    }

    /// Mask with no holes
    pub fn filled(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            grid: Grid::new(width, height, true)?,
        })
    }

    /// Open cells where any configured road channel strictly exceeds the threshold
    pub fn from_coverage(coverage: &CoverageMap, config: &MaskConfig) -> Result<Self> {
        coverage.validate()?;
        config.validate(coverage.channels)?;

        let grid = Grid::from_fn(coverage.width, coverage.height, |x, z| {
            is_road(coverage.weights_at(x, z), config)
        })?;
        Ok(Self { grid })
    }

    /// Open cells lying within `config.hole_radius` of any road point (XZ distance)
    pub fn from_road_points(
        points: &[Vec3],
        bounds: &SceneBounds,
        resolution: usize,
        config: &MaskConfig,
    ) -> Result<Self> {
        bounds.validate()?;
        config.validate_hole_radius()?;
        let mut grid = Grid::new(resolution, resolution, false)?;
        let flat: Vec<Vec2> = points.iter().map(|p| Vec2::new(p.x, p.z)).collect();
        let radius = config.hole_radius;

        grid.cells_mut()
            .par_chunks_mut(resolution)
            .enumerate()
            .for_each(|(z, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    let sample = bounds.world_xz(x, z, resolution, resolution);
                    *cell = flat.iter().any(|p| sample.distance(*p) < radius);
                }
            });

        Ok(Self { grid })
    }

    /// Complementary mask, used to cut the road out of the surrounding terrain
    pub fn inverted(&self) -> Self {
        Self {
            grid: self.grid.map(|open| !open),
        }
    }

    pub fn is_open(&self, x: usize, z: usize) -> bool {
        self.grid.get(x, z).copied().unwrap_or(false)
    }

    pub fn open_count(&self) -> usize {
        self.grid.cells().iter().filter(|&&open| open).count()
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid<bool> {
        &self.grid
    }
}

fn is_road(weights: &[f32], config: &MaskConfig) -> bool {
    config
        .road_channels
        .iter()
        .any(|&channel| weights[channel] > config.texture_threshold)
}
