//! 3×3 median denoising over valid cells.

use rayon::prelude::*;
use terrain_types::ElevationGrid;

/// One 3×3 median pass.
///
/// Each valid cell becomes the median of the valid cells in its 3×3
/// neighbourhood (itself included). Invalid cells stay invalid and never
/// contribute. With an even number of contributors the two middle values
/// are averaged.
#[must_use]
pub fn median_pass(grid: &ElevationGrid) -> ElevationGrid {
    let (w, h) = (grid.width(), grid.height());
    let rows: Vec<Vec<Option<f64>>> = (0..h)
        .into_par_iter()
        .map(|y| (0..w).map(|x| median_at(grid, x, y)).collect())
        .collect();

    ElevationGrid::from_fn(w, h, |x, y| rows[y][x])
}

/// Run `passes` median passes.
#[must_use]
pub fn median_filter(grid: &ElevationGrid, passes: u32) -> ElevationGrid {
    (0..passes).fold(grid.clone(), |g, _| median_pass(&g))
}

fn median_at(grid: &ElevationGrid, x: usize, y: usize) -> Option<f64> {
    grid.get(x, y)?;

    let mut window = [0.0f64; 9];
    let mut n = 0;
    for dy in -1isize..=1 {
        for dx in -1isize..=1 {
            let nx = x.wrapping_add_signed(dx);
            let ny = y.wrapping_add_signed(dy);
            if let Some(v) = grid.get(nx, ny) {
                window[n] = v;
                n += 1;
            }
        }
    }

    let values = &mut window[..n];
    values.sort_unstable_by(f64::total_cmp);
    let mid = n / 2;
    Some(if n % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    })
}
