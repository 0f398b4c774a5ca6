/// Vertical ray probes that snap heightfield samples onto path surfaces
use crate::bounds::SceneBounds;
use crate::config::{Determination, ExecutionMode, PipelineConfig};
use crate::error::Result;
use crate::grid::{Grid, SampleGrid};
use glam::Vec3;
use indicatif::ProgressBar;
use rayon::prelude::*;

/// First solid surface hit along a ray.
///
/// Implementations return the world-space height of the nearest hit in front
/// of `origin`, or `None` when the ray escapes. The terrain being rebuilt must
/// not be part of the queried geometry.
pub trait SurfaceQuery {
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<f32>;
}

impl<F> SurfaceQuery for F
where
    F: Fn(Vec3, Vec3) -> Option<f32>,
{
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        self(origin, direction)
    }
}

/// Casts one vertical probe per grid cell.
#[derive(Debug, Clone)]
pub struct RaySnapper {
    bounds: SceneBounds,
    from_above: bool,
    additional_casts: u32,
    recast_offset: f32,
    height_multiplier: f32,
    determination: Determination,
}

impl RaySnapper {
    pub fn new(bounds: SceneBounds, config: &PipelineConfig) -> Self {
        Self {
            bounds,
            from_above: config.raycast_from_above,
            additional_casts: config.additional_casts(),
            recast_offset: config.recast_offset,
            height_multiplier: config.path_height_multiplier,
            determination: config.determination,
        }
    }

    /// Snap every cell of a `width` x `height` grid, rows spread over rayon
    pub fn snap<Q>(
        &self,
        query: &Q,
        width: usize,
        height: usize,
        execution: ExecutionMode,
        pb: &ProgressBar,
    ) -> Result<SampleGrid>
    where
        Q: SurfaceQuery + Sync + ?Sized,
    {
        match execution {
            ExecutionMode::Serial => self.snap_serial(query, width, height, pb),
            ExecutionMode::Parallel => {
                let mut samples: SampleGrid = Grid::new(width, height, None)?;
                samples
                    .cells_mut()
                    .par_chunks_mut(width)
                    .enumerate()
                    .for_each(|(z, row)| {
                        self.snap_row(query, z, width, height, row);
                        pb.inc(1);
                    });
                Ok(samples)
            }
        }
    }

    /// Snap on the calling thread; accepts queries that cannot be shared
    pub fn snap_serial<Q>(
        &self,
        query: &Q,
        width: usize,
        height: usize,
        pb: &ProgressBar,
    ) -> Result<SampleGrid>
    where
        Q: SurfaceQuery + ?Sized,
    {
        let mut samples: SampleGrid = Grid::new(width, height, None)?;
        for (z, row) in samples.cells_mut().chunks_mut(width).enumerate() {
            self.snap_row(query, z, width, height, row);
            pb.inc(1);
        }
        Ok(samples)
    }

    fn snap_row<Q>(&self, query: &Q, z: usize, width: usize, height: usize, row: &mut [Option<f32>])
    where
        Q: SurfaceQuery + ?Sized,
    {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = self.snap_cell(query, x, z, width, height);
        }
    }

    /// Normalised, scaled path height below or above cell `(x, z)`
    pub fn snap_cell<Q>(&self, query: &Q, x: usize, z: usize, width: usize, height: usize) -> Option<f32>
    where
        Q: SurfaceQuery + ?Sized,
    {
        let xz = self.bounds.world_xz(x, z, width, height);
        let (origin_y, direction) = if self.from_above {
            (self.bounds.min.y + self.bounds.vertical_extent(), Vec3::NEG_Y)
        } else {
            (self.bounds.min.y, Vec3::Y)
        };
        let origin = Vec3::new(xz.x, origin_y, xz.y);

        let hit = self.cast_until_last_hit(query, origin, direction)?;
        let value = self.bounds.normalize_y(hit) * self.height_multiplier;
        self.determination.classify(value)
    }

    /// Keep re-casting past each hit so the lowest of stacked surfaces wins
    fn cast_until_last_hit<Q>(&self, query: &Q, origin: Vec3, direction: Vec3) -> Option<f32>
    where
        Q: SurfaceQuery + ?Sized,
    {
        let mut origin = origin;
        let mut last_hit = None;
        let mut remaining = self.additional_casts;

        while let Some(hit_y) = query.cast(origin, direction) {
            // A broken hit ends the chain; the last finite hit stands.
            if !hit_y.is_finite() {
                break;
            }
            last_hit = Some(hit_y);
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            origin = Vec3::new(origin.x, hit_y, origin.z) + direction * self.recast_offset;
        }

        last_hit
    }
}
