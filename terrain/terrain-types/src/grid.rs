//! Elevation grids at mesh resolution.

/// A `width × height` grid of elevation cells in meters.
///
/// A cell is either a sample or absent. Absent cells come from the shape
/// mask or from missing source data and never receive mesh vertices.
/// All accessors are bounds-checked; out-of-range coordinates read as absent.
///
/// # Example
///
/// ```
/// use terrain_types::ElevationGrid;
///
/// let mut grid = ElevationGrid::new(3, 2);
/// grid.set(2, 1, Some(10.0));
/// assert!(grid.is_valid(2, 1));
/// assert!(!grid.is_valid(3, 1));
/// assert_eq!(grid.valid_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<f64>>,
}

impl ElevationGrid {
    /// A grid with every cell absent.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Build a grid by evaluating `f(x, y)` at every cell.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Option<f64>) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, f(x, y));
            }
        }
        grid
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Row-major index of `(x, y)`, or `None` when out of range.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Cell value at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Whether `(x, y)` holds a sample.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some()
    }

    /// Overwrite a cell. Non-finite values are stored as absent.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: Option<f64>) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = value.filter(|v| v.is_finite());
        }
    }

    /// Row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    /// Number of cells holding a sample.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate `(x, y, elevation)` over valid cells in row-major order.
    pub fn iter_valid(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.map(|v| (i % self.width, i / self.width, v))
        })
    }

    /// Exact `(min, max)` over valid cells, or `None` if there are none.
    #[must_use]
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_reads_are_absent() {
        let grid = ElevationGrid::from_fn(2, 2, |_, _| Some(1.0));
        assert!(grid.is_valid(1, 1));
        assert!(!grid.is_valid(2, 0));
        assert!(!grid.is_valid(0, 2));
        assert!(!grid.contains(-1, 0));
        assert!(grid.contains(1, 1));
    }

    #[test]
    fn range_is_exact() {
        let grid = ElevationGrid::from_fn(3, 1, |x, _| match x {
            0 => Some(-12.5),
            1 => None,
            _ => Some(4410.0),
        });
        assert_eq!(grid.elevation_range(), Some((-12.5, 4410.0)));
        assert_eq!(ElevationGrid::new(2, 2).elevation_range(), None);
    }

    #[test]
    fn iter_valid_reports_coordinates() {
        let mut grid = ElevationGrid::new(3, 3);
        grid.set(2, 1, Some(7.0));
        grid.set(0, 2, Some(f64::NAN));
        let cells: Vec<_> = grid.iter_valid().collect();
        assert_eq!(cells, vec![(2, 1, 7.0)]);
    }
}
