/// Inverse-distance-weighted fill from the nearest determined cell in 16 directions
use crate::config::ExecutionMode;
use crate::grid::{ReferenceSnapshot, SampleGrid};
use crate::margin::NeighborHit;
use indicatif::ProgressBar;
use rayon::prelude::*;

/// Step vectors `(dx, dz)` probed from every undetermined cell: the eight
/// compass directions followed by the eight knight-move directions between them.
pub const PROBE_DIRECTIONS: [(isize, isize); 16] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
    (-2, -1),
    (-1, -2),
    (2, -1),
    (1, -2),
    (-2, 1),
    (-1, 2),
    (2, 1),
    (1, 2),
];

/// Outcome of a fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// Cells that received an interpolated value.
    pub filled: usize,
    /// Cells no probe direction could reach.
    pub unreachable: usize,
}

impl std::ops::Add for FillOutcome {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            filled: self.filled + other.filled,
            unreachable: self.unreachable + other.unreachable,
        }
    }
}

impl std::iter::Sum for FillOutcome {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |a, b| a + b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalFill;

impl DirectionalFill {
    /// Interpolate every cell undetermined in `reference` into `working`
    pub fn fill(
        &self,
        reference: &ReferenceSnapshot,
        working: &mut SampleGrid,
        execution: ExecutionMode,
        pb: &ProgressBar,
    ) -> FillOutcome {
        let width = working.width();
        let fill_row = |(z, row): (usize, &mut [Option<f32>])| {
            let mut outcome = FillOutcome::default();
            for (x, cell) in row.iter_mut().enumerate() {
                if reference.is_determined(x, z) {
                    continue;
                }
                match self.interpolate(reference, x, z) {
                    Some(value) => {
                        *cell = Some(value);
                        outcome.filled += 1;
                    }
                    None => outcome.unreachable += 1,
                }
            }
            pb.inc(1);
            outcome
        };

        match execution {
            ExecutionMode::Parallel => working
                .cells_mut()
                .par_chunks_mut(width)
                .enumerate()
                .map(fill_row)
                .reduce(FillOutcome::default, |a, b| a + b),
            ExecutionMode::Serial => working
                .cells_mut()
                .chunks_mut(width)
                .enumerate()
                .map(fill_row)
                .sum(),
        }
    }

    /// Weighted average of the directional hits, weight `1 / distance`
    pub fn interpolate(&self, reference: &ReferenceSnapshot, x: usize, z: usize) -> Option<f32> {
        let mut weighted_sum = 0.0f64;
        let mut sum_of_weights = 0.0f64;

        for &step in PROBE_DIRECTIONS.iter() {
            let Some(hit) = nearest_along(reference, x, z, step) else {
                continue;
            };
            let weight = 1.0 / hit.distance;
            weighted_sum += weight * hit.value as f64;
            sum_of_weights += weight;
        }

        (sum_of_weights > 0.0).then(|| (weighted_sum / sum_of_weights) as f32)
    }
}

/// Step from `(x, z)` by `step` until a determined reference cell is found or the grid ends
pub fn nearest_along(
    reference: &ReferenceSnapshot,
    x: usize,
    z: usize,
    (dx, dz): (isize, isize),
) -> Option<NeighborHit> {
    let (mut nx, mut nz) = (x as isize, z as isize);
    loop {
        nx += dx;
        nz += dz;
        if !reference.contains(nx, nz) {
            return None;
        }

        if let Some(value) = reference.value(nx, nz) {
            let ox = (nx - x as isize) as f64;
            let oz = (nz - z as isize) as f64;
            return Some(NeighborHit {
                distance: (ox * ox + oz * oz).sqrt(),
                value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn grid_with(size: usize, set: &[((usize, usize), f32)]) -> SampleGrid {
        let mut grid: SampleGrid = Grid::new(size, size, None).unwrap();
        for &(cell, value) in set {
            grid[cell] = Some(value);
        }
        grid
    }

    #[test]
    fn probe_directions_are_distinct_and_symmetric() {
        let set: HashSet<_> = PROBE_DIRECTIONS.iter().copied().collect();
        assert_eq!(set.len(), 16);
        assert!(!set.contains(&(0, 0)));
        for &(dx, dz) in &PROBE_DIRECTIONS {
            assert!(set.contains(&(-dx, -dz)), "missing opposite of ({dx}, {dz})");
            assert!(dx.abs() <= 2 && dz.abs() <= 2);
        }
        let knight_moves = PROBE_DIRECTIONS
            .iter()
            .filter(|(dx, dz)| dx.abs() + dz.abs() == 3)
            .count();
        assert_eq!(knight_moves, 8);
    }

    #[test]
    fn opposite_neighbours_at_equal_distance_average_exactly() {
        let reference = grid_with(5, &[((0, 2), 10.0), ((4, 2), 20.0)]).snapshot();
        let value = DirectionalFill.interpolate(&reference, 2, 2).unwrap();
        assert_eq!(value, 15.0);
    }

    #[test]
    fn closer_hits_dominate() {
        let reference = grid_with(7, &[((0, 3), 10.0), ((4, 3), 20.0)]).snapshot();
        // Left hit at distance 3, right hit at distance 1.
        let value = DirectionalFill.interpolate(&reference, 3, 3).unwrap();
        assert_relative_eq!(value, (10.0 / 3.0 + 20.0) / (1.0 / 3.0 + 1.0), epsilon = 1e-5);
    }

    #[test]
    fn single_diagonal_contributor_sets_the_corner() {
        let reference = grid_with(5, &[((2, 2), 1.0)]).snapshot();

        let hit = nearest_along(&reference, 0, 0, (1, 1)).unwrap();
        assert_relative_eq!(hit.distance, 8.0f64.sqrt());
        assert!(nearest_along(&reference, 0, 0, (2, 1)).is_none());
        assert!(nearest_along(&reference, 0, 0, (1, 2)).is_none());
        assert_eq!(DirectionalFill.interpolate(&reference, 0, 0), Some(1.0));
    }

    #[test]
    fn knight_moves_reach_off_axis_cells() {
        let reference = grid_with(5, &[((4, 2), 0.7)]).snapshot();
        let hit = nearest_along(&reference, 0, 0, (2, 1)).unwrap();
        assert_relative_eq!(hit.distance, 20.0f64.sqrt());
        assert_eq!(hit.value, 0.7);
    }

    #[test]
    fn empty_reference_reports_unreachable_cells() {
        let mut working = grid_with(4, &[]);
        let reference = working.snapshot();
        let outcome = DirectionalFill.fill(&reference, &mut working, ExecutionMode::Parallel, &ProgressBar::hidden());

        assert_eq!(outcome, FillOutcome { filled: 0, unreachable: 16 });
        assert_eq!(working.determined_count(), 0);
    }

    #[test]
    fn parallel_and_serial_fills_agree() {
        let start = grid_with(9, &[((1, 1), 0.2), ((7, 3), 0.9), ((4, 8), 0.5)]);
        let reference = start.snapshot();
        let pb = ProgressBar::hidden();

        let mut parallel = start.clone();
        let a = DirectionalFill.fill(&reference, &mut parallel, ExecutionMode::Parallel, &pb);
        let mut serial = start.clone();
        let b = DirectionalFill.fill(&reference, &mut serial, ExecutionMode::Serial, &pb);

        assert_eq!(a, b);
        assert_eq!(parallel, serial);
        assert_eq!(a.filled + 3, 81 - a.unreachable);
    }
}
