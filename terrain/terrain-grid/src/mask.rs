//! Footprint masks.

use terrain_types::Shape;

/// Whether cell `(x, y)` of a `width × height` grid lies inside `shape`.
///
/// The oval is the ellipse inscribed in the grid, centred at
/// `((width - 1) / 2, (height - 1) / 2)`; cells on the boundary are inside.
///
/// # Example
///
/// ```
/// use terrain_grid::in_shape;
/// use terrain_types::Shape;
///
/// assert!(in_shape(Shape::Oval, 5, 5, 11, 11));
/// assert!(!in_shape(Shape::Oval, 0, 0, 11, 11));
/// assert!(in_shape(Shape::Rectangle, 0, 0, 11, 11));
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn in_shape(shape: Shape, x: usize, y: usize, width: usize, height: usize) -> bool {
    match shape {
        Shape::Rectangle => x < width && y < height,
        Shape::Oval => {
            if x >= width || y >= height {
                return false;
            }
            let cx = (width.saturating_sub(1)) as f64 / 2.0;
            let cy = (height.saturating_sub(1)) as f64 / 2.0;
            if cx <= 0.0 || cy <= 0.0 {
                return true;
            }
            let dx = (x as f64 - cx) / cx;
            let dy = (y as f64 - cy) / cy;
            dx * dx + dy * dy <= 1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oval_keeps_axes_drops_corners() {
        let (w, h) = (9, 5);
        assert!(in_shape(Shape::Oval, 0, 2, w, h));
        assert!(in_shape(Shape::Oval, 8, 2, w, h));
        assert!(in_shape(Shape::Oval, 4, 0, w, h));
        assert!(in_shape(Shape::Oval, 4, 4, w, h));
        for (x, y) in [(0, 0), (8, 0), (0, 4), (8, 4)] {
            assert!(!in_shape(Shape::Oval, x, y, w, h), "corner ({x}, {y})");
        }
    }

    #[test]
    fn out_of_grid_is_outside() {
        assert!(!in_shape(Shape::Rectangle, 3, 0, 3, 3));
        assert!(!in_shape(Shape::Oval, 0, 3, 3, 3));
    }
}
