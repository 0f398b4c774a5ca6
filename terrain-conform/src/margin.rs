/// Bounded-radius propagation of path heights into the surrounding margin
use crate::config::ExecutionMode;
use crate::grid::{ReferenceSnapshot, SampleGrid};
use indicatif::ProgressBar;
use rayon::prelude::*;

/// Distance and value of a determined reference cell found by a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborHit {
    pub distance: f64,
    pub value: f32,
}

/// Copies the nearest determined height within `radius` cells into undetermined cells.
#[derive(Debug, Clone, Copy)]
pub struct MarginPropagator {
    radius: f64,
    height_multiplier: f32,
}

impl MarginPropagator {
    pub fn new(radius: f64, height_multiplier: f32) -> Self {
        Self {
            radius,
            height_multiplier,
        }
    }

    /// Fill undetermined working cells from `reference`; returns the number of cells set
    pub fn propagate(
        &self,
        reference: &ReferenceSnapshot,
        working: &mut SampleGrid,
        execution: ExecutionMode,
        pb: &ProgressBar,
    ) -> usize {
        let width = working.width();
        let fill_row = |(z, row): (usize, &mut [Option<f32>])| {
            let mut filled = 0;
            for (x, cell) in row.iter_mut().enumerate() {
                if cell.is_some() {
                    continue;
                }
                if let Some(hit) = self.nearest_within_radius(reference, x, z) {
                    *cell = Some(hit.value * self.height_multiplier);
                    filled += 1;
                }
            }
            pb.inc(1);
            filled
        };

        match execution {
            ExecutionMode::Parallel => working
                .cells_mut()
                .par_chunks_mut(width)
                .enumerate()
                .map(fill_row)
                .sum(),
            ExecutionMode::Serial => working
                .cells_mut()
                .chunks_mut(width)
                .enumerate()
                .map(fill_row)
                .sum(),
        }
    }

    /// Closest determined reference cell within the radius.
    ///
    /// Scans the clipped square window row by row; on equal distances the
    /// first cell scanned wins.
    pub fn nearest_within_radius(
        &self,
        reference: &ReferenceSnapshot,
        x: usize,
        z: usize,
    ) -> Option<NeighborHit> {
        let reach = self.radius.ceil() as usize;
        let min_x = x.saturating_sub(reach);
        let max_x = x.saturating_add(reach).min(reference.width() - 1);
        let min_z = z.saturating_sub(reach);
        let max_z = z.saturating_add(reach).min(reference.height() - 1);

        let mut nearest: Option<NeighborHit> = None;
        for nz in min_z..=max_z {
            for nx in min_x..=max_x {
                let Some(value) = reference.value(nx as isize, nz as isize) else {
                    continue;
                };

                let dx = nx as f64 - x as f64;
                let dz = nz as f64 - z as f64;
                let distance = (dx * dx + dz * dz).sqrt();
                if distance > self.radius {
                    continue;
                }

                if nearest.is_none_or(|best| distance < best.distance) {
                    nearest = Some(NeighborHit { distance, value });
                }
            }
        }

        nearest
    }
}
