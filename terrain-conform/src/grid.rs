/// Row-major 2D grids, working sample grids and immutable reference snapshots
use crate::error::{Result, TerrainError};
use std::sync::Arc;

/// Dense row-major grid addressed by `(x, z)`: `x` is the column, `z` the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Terrain elevation samples.
pub type Heightfield = Grid<f32>;

/// Pipeline working state: `Some` cells are determined, `None` cells still need a value.
pub type SampleGrid = Grid<Option<f32>>;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(width: usize, height: usize, fill: T) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; width * height],
        })
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width * height;
        if cells.len() != expected {
            return Err(TerrainError::BufferSize {
                width,
                height,
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid by evaluating `f(x, z)` for every cell
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        check_dimensions(width, height)?;
        let mut cells = Vec::with_capacity(width * height);
        for z in 0..height {
            for x in 0..width {
                cells.push(f(x, z));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `(x, z)`, `None` outside the grid
    pub fn get(&self, x: usize, z: usize) -> Option<&T> {
        if x < self.width && z < self.height {
            self.cells.get(z * self.width + x)
        } else {
            None
        }
    }

    /// Signed lookup used by neighbour searches that may step off the grid
    pub fn get_signed(&self, x: isize, z: isize) -> Option<&T> {
        if x < 0 || z < 0 {
            return None;
        }
        self.get(x as usize, z as usize)
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Mutable row-major cells, one row per `width` chunk
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (x, z): (usize, usize)) -> &T {
        &self.cells[z * self.width + x]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (x, z): (usize, usize)) -> &mut T {
        &mut self.cells[z * self.width + x]
    }
}

impl SampleGrid {
    /// Freeze the current state as the read-only reference for the next stage
    pub fn snapshot(&self) -> ReferenceSnapshot {
        ReferenceSnapshot {
            grid: Arc::new(self.clone()),
        }
    }

    /// Number of determined cells
    pub fn determined_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Materialise the heightfield, writing `fallback` into undetermined cells
    pub fn to_heightfield(&self, fallback: f32) -> Heightfield {
        self.map(|cell| cell.unwrap_or(fallback))
    }
}

/// Immutable copy of a stage's settled output.
///
/// Stages search neighbours only through this handle, so a cell written
/// earlier in the same pass can never influence a later cell.
#[derive(Debug, Clone)]
pub struct ReferenceSnapshot {
    grid: Arc<SampleGrid>,
}

impl ReferenceSnapshot {
    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    /// Determined value at `(x, z)`; `None` when undetermined or off the grid
    pub fn value(&self, x: isize, z: isize) -> Option<f32> {
        self.grid.get_signed(x, z).copied().flatten()
    }

    pub fn is_determined(&self, x: usize, z: usize) -> bool {
        matches!(self.grid.get(x, z), Some(Some(_)))
    }

    pub fn contains(&self, x: isize, z: isize) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.grid.width && (z as usize) < self.grid.height
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyGrid { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 4, 0.0f32),
            Err(TerrainError::EmptyGrid { width: 0, height: 4 })
        ));
        assert!(Grid::<f32>::from_vec(3, 0, Vec::new()).is_err());
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let err = Grid::from_vec(3, 3, vec![0.0f32; 8]).unwrap_err();
        assert!(matches!(err, TerrainError::BufferSize { expected: 9, actual: 8, .. }));
    }

    #[test]
    fn indexes_row_major() {
        let grid = Grid::from_fn(3, 2, |x, z| (x, z)).unwrap();
        assert_eq!(grid.cells()[4], (1, 1));
        assert_eq!(grid[(2, 1)], (2, 1));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get_signed(-1, 0), None);
    }

    #[test]
    fn snapshot_is_detached_from_working_grid() {
        let mut working: SampleGrid = Grid::new(2, 2, None).unwrap();
        working[(0, 0)] = Some(1.0);
        let reference = working.snapshot();

        working[(1, 1)] = Some(2.0);
        assert_eq!(reference.value(0, 0), Some(1.0));
        assert_eq!(reference.value(1, 1), None);
        assert!(!reference.contains(2, 0));
        assert_eq!(working.determined_count(), 2);
    }

    #[test]
    fn heightfield_uses_fallback_for_undetermined_cells() {
        let samples = Grid::from_vec(2, 1, vec![Some(0.5), None]).unwrap();
        assert_eq!(samples.to_heightfield(0.0).cells(), &[0.5, 0.0]);
    }
}
