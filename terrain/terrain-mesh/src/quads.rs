//! Quad validity over an elevation grid.
//!
//! Quad `(qx, qy)` spans grid cells `(qx..=qx+1, qy..=qy+1)`. Its corners
//! are named by compass position, with row 0 at the north:
//!
//! ```text
//!   a (NW) ---- b (NE)
//!     |           |
//!   c (SW) ---- d (SE)
//! ```

use terrain_types::ElevationGrid;

/// A side of a quad, and the neighbour across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Edge `c → d`.
    South,
    /// Edge `d → b`.
    East,
    /// Edge `b → a`.
    North,
    /// Edge `a → c`.
    West,
}

impl Side {
    /// All sides, in counter-clockwise order starting from the south.
    pub const ALL: [Self; 4] = [Self::South, Self::East, Self::North, Self::West];

    /// Quad offset of the neighbour across this side.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::North => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Grid-cell offsets of the edge's endpoints `(from, to)` relative to
    /// the quad's north-west cell, in counter-clockwise order seen from above.
    #[must_use]
    pub const fn edge(self) -> ((usize, usize), (usize, usize)) {
        match self {
            Self::South => ((0, 1), (1, 1)),
            Self::East => ((1, 1), (1, 0)),
            Self::North => ((1, 0), (0, 0)),
            Self::West => ((0, 0), (0, 1)),
        }
    }
}

/// Which quads of a grid become surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadMask {
    width: usize,
    height: usize,
    valid: Vec<bool>,
}

impl QuadMask {
    /// Quads whose four corners are all valid cells.
    #[must_use]
    pub fn from_grid(grid: &ElevationGrid) -> Self {
        let width = grid.width().saturating_sub(1);
        let height = grid.height().saturating_sub(1);
        let mut valid = Vec::with_capacity(width * height);
        for qy in 0..height {
            for qx in 0..width {
                valid.push(
                    grid.is_valid(qx, qy)
                        && grid.is_valid(qx + 1, qy)
                        && grid.is_valid(qx, qy + 1)
                        && grid.is_valid(qx + 1, qy + 1),
                );
            }
        }
        Self {
            width,
            height,
            valid,
        }
    }

    /// Quad columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Quad rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether quad `(qx, qy)` is surface. Out-of-range quads are not.
    #[must_use]
    pub fn is_valid(&self, qx: isize, qy: isize) -> bool {
        if qx < 0 || qy < 0 {
            return false;
        }
        let (qx, qy) = (qx.unsigned_abs(), qy.unsigned_abs());
        qx < self.width && qy < self.height && self.valid[qy * self.width + qx]
    }

    /// Whether the neighbour of `(qx, qy)` across `side` is absent, so the
    /// side needs a wall.
    #[must_use]
    pub fn is_open(&self, qx: usize, qy: usize, side: Side) -> bool {
        let (dx, dy) = side.offset();
        let (qx, qy) = (as_signed(qx), as_signed(qy));
        !self.is_valid(qx + dx, qy + dy)
    }

    /// Number of surface quads.
    #[must_use]
    pub fn count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }

    /// Surface quads in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.valid
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(move |(i, _)| (i % self.width, i / self.width))
    }

    /// Drop quads that touch another surface quad only at a corner.
    ///
    /// Two quads meeting diagonally with both quads beside the shared
    /// corner absent would put four wall faces on one vertical edge. The
    /// later quad in row-major order is removed, repeated until no such
    /// contact remains. Returns the number of quads removed.
    pub fn resolve_pinches(&mut self) -> usize {
        let mut removed = 0;
        loop {
            let mut changed = false;
            for qy in 0..self.height {
                for qx in 0..self.width {
                    if self.valid[qy * self.width + qx] && self.has_pinch(qx, qy) {
                        self.valid[qy * self.width + qx] = false;
                        removed += 1;
                        changed = true;
                    }
                }
            }
            if !changed {
                return removed;
            }
        }
    }

    /// Whether `(qx, qy)` meets a diagonal neighbour earlier in row-major
    /// order through a bare corner.
    fn has_pinch(&self, qx: usize, qy: usize) -> bool {
        let (x, y) = (as_signed(qx), as_signed(qy));
        // Only look north: the diagonal partner above is visited first.
        [(-1, -1), (1, -1)].into_iter().any(|(dx, dy)| {
            self.is_valid(x + dx, y + dy) && !self.is_valid(x + dx, y) && !self.is_valid(x, y + dy)
        })
    }
}

#[allow(clippy::cast_possible_wrap)]
// Wrap: grid dimensions are far below isize::MAX
const fn as_signed(v: usize) -> isize {
    v as isize
}
