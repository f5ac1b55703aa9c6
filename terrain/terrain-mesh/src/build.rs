//! Grid to closed solid.
//!
//! The solid has three parts:
//!
//! - a top surface: two triangles per surface quad, normals up
//! - a flat bottom at `z = 0`: the same quads, mirrored
//! - walls: every open side of a surface quad joins its top edge to the
//!   bottom edge below it
//!
//! Every top edge is then shared by exactly two faces, as is every bottom
//! and vertical edge, so the result is closed and 2-manifold.

use nalgebra::Point3;
use terrain_types::{ElevationGrid, RenderRequest, SolidMesh};
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::height::HeightMapping;
use crate::params::MeshParams;
use crate::quads::{QuadMask, Side};

/// Counts gathered while building a solid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Surface quads emitted.
    pub quads: usize,
    /// Quads dropped to remove corner-only contacts.
    pub pinched_quads: usize,
    /// Wall quads emitted.
    pub walls: usize,
}

/// Build a closed solid from `grid`.
///
/// Cells map to `x = ix · cell`, `y = (height - 1 - iy) · cell` with
/// `cell = model_width / (width - 1)`, so north is +Y. Only cells that are
/// corners of a surface quad get vertices: one on top at
/// `mapping.height(e)` and one below at `z = 0`.
///
/// # Errors
///
/// - [`MeshError::NoVertices`] if the grid has no valid cells
/// - [`MeshError::NoTriangles`] if no complete quad survives
/// - [`MeshError::NonFiniteVertex`] if a height is NaN or infinite
/// - [`MeshError::IndexOverflow`] if the solid exceeds `u32` indices
///
/// # Example
///
/// ```
/// use terrain_mesh::{build_solid, HeightMapping};
/// use terrain_types::ElevationGrid;
///
/// let grid = ElevationGrid::from_fn(3, 3, |x, y| Some((x + y) as f64));
/// let mapping = HeightMapping::Lithophane {
///     min: 0.0, max: 4.0, min_thickness: 0.8, max_thickness: 4.0, invert: false,
/// };
/// let (solid, stats) = build_solid(&grid, &mapping, 20.0).unwrap();
///
/// assert_eq!(stats.quads, 4);
/// assert!(solid.signed_volume() > 0.0);
/// ```
pub fn build_solid(
    grid: &ElevationGrid,
    mapping: &HeightMapping,
    model_width: f64,
) -> MeshResult<(SolidMesh, BuildStats)> {
    if grid.valid_count() == 0 {
        return Err(MeshError::NoVertices);
    }

    let mut quads = QuadMask::from_grid(grid);
    let pinched_quads = quads.resolve_pinches();
    if pinched_quads > 0 {
        debug!("Dropped {} quads with corner-only contact", pinched_quads);
    }
    let quad_count = quads.count();
    if quad_count == 0 {
        return Err(MeshError::NoTriangles);
    }

    let (w, h) = (grid.width(), grid.height());
    let mut used = vec![false; w * h];
    for (qx, qy) in quads.iter() {
        for (cx, cy) in [(qx, qy), (qx + 1, qy), (qx, qy + 1), (qx + 1, qy + 1)] {
            used[cy * w + cx] = true;
        }
    }
    let top_count = used.iter().filter(|&&u| u).count();
    let vertex_count = top_count * 2;
    let offset = u32::try_from(top_count).map_err(|_| MeshError::IndexOverflow {
        count: vertex_count,
    })?;
    if u32::try_from(vertex_count).is_err() {
        return Err(MeshError::IndexOverflow {
            count: vertex_count,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let cell = model_width / (w.max(2) - 1) as f64;

    let mut mesh = SolidMesh::with_capacity(vertex_count, quad_count * 4);
    let mut top: Vec<Option<u32>> = vec![None; w * h];
    let mut bottom_xy = Vec::with_capacity(top_count);
    for iy in 0..h {
        for ix in 0..w {
            if !used[iy * w + ix] {
                continue;
            }
            let Some(e) = grid.get(ix, iy) else {
                continue;
            };
            #[allow(clippy::cast_precision_loss)]
            let (x, y) = (ix as f64 * cell, (h - 1 - iy) as f64 * cell);
            let z = mapping.height(e);
            if !(x.is_finite() && y.is_finite() && z.is_finite()) {
                return Err(MeshError::non_finite(ix, iy));
            }
            top[iy * w + ix] = Some(mesh.push_vertex(Point3::new(x, y, z)));
            bottom_xy.push((x, y));
        }
    }
    for (x, y) in bottom_xy {
        mesh.push_vertex(Point3::new(x, y, 0.0));
    }

    let index = |cx: usize, cy: usize| top[cy * w + cx];
    let mut walls = 0;
    for (qx, qy) in quads.iter() {
        let (Some(a), Some(b), Some(c), Some(d)) = (
            index(qx, qy),
            index(qx + 1, qy),
            index(qx, qy + 1),
            index(qx + 1, qy + 1),
        ) else {
            continue;
        };

        mesh.push_face([c, d, b]);
        mesh.push_face([c, b, a]);
        mesh.push_face([c + offset, b + offset, d + offset]);
        mesh.push_face([c + offset, a + offset, b + offset]);

        for side in Side::ALL {
            if !quads.is_open(qx, qy, side) {
                continue;
            }
            let ((fx, fy), (tx, ty)) = side.edge();
            let (Some(u), Some(v)) = (index(qx + fx, qy + fy), index(qx + tx, qy + ty)) else {
                continue;
            };
            mesh.push_face([v, u, u + offset]);
            mesh.push_face([v, u + offset, v + offset]);
            walls += 1;
        }
    }

    info!(
        "Built solid: {} vertices, {} faces ({} quads, {} walls)",
        mesh.vertex_count(),
        mesh.face_count(),
        quad_count,
        walls
    );

    Ok((
        mesh,
        BuildStats {
            quads: quad_count,
            pinched_quads,
            walls,
        },
    ))
}

/// Build the solid `request` describes over `grid` and its elevation `range`.
///
/// # Errors
///
/// See [`build_solid`].
pub fn build_request_solid(
    grid: &ElevationGrid,
    range: (f64, f64),
    request: &RenderRequest,
    params: &MeshParams,
) -> MeshResult<(SolidMesh, BuildStats)> {
    let mapping = HeightMapping::for_request(request, range, params);
    build_solid(grid, &mapping, request.model_width())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validate::validate_solid;
    use approx::assert_relative_eq;

    fn flat(min_thickness: f64) -> HeightMapping {
        HeightMapping::Lithophane {
            min: 0.0,
            max: 0.0,
            min_thickness,
            max_thickness: 4.0,
            invert: false,
        }
    }

    #[test]
    fn single_quad_is_a_box() {
        let grid = ElevationGrid::from_fn(2, 2, |_, _| Some(0.0));
        let (mesh, stats) = build_solid(&grid, &flat(2.0), 10.0).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(stats.walls, 4);
        assert_relative_eq!(mesh.signed_volume(), 200.0, epsilon = 1e-9);

        let report = validate_solid(&mesh);
        assert!(report.is_printable(), "{report}");
    }

    #[test]
    fn north_is_positive_y() {
        let grid = ElevationGrid::from_fn(2, 3, |_, y| Some(if y == 0 { 10.0 } else { 0.0 }));
        let mapping = HeightMapping::Lithophane {
            min: 0.0,
            max: 10.0,
            min_thickness: 1.0,
            max_thickness: 2.0,
            invert: false,
        };
        let (mesh, _) = build_solid(&grid, &mapping, 10.0).unwrap();
        let highest = mesh
            .vertices
            .iter()
            .max_by(|p, q| p.z.total_cmp(&q.z))
            .unwrap();
        assert_relative_eq!(highest.y, 20.0);
    }

    #[test]
    fn empty_grids_fail() {
        let none = ElevationGrid::new(4, 4);
        assert_eq!(build_solid(&none, &flat(1.0), 10.0).unwrap_err(), MeshError::NoVertices);

        let sparse = ElevationGrid::from_fn(4, 4, |x, y| ((x + y) % 2 == 0).then_some(1.0));
        assert_eq!(build_solid(&sparse, &flat(1.0), 10.0).unwrap_err(), MeshError::NoTriangles);
    }

    #[test]
    fn non_finite_heights_are_rejected() {
        let grid = ElevationGrid::from_fn(2, 2, |_, _| Some(0.0));
        let mapping = HeightMapping::Terrain {
            min: 0.0,
            max: 0.0,
            exaggeration: 1.0,
            scale: f64::INFINITY,
            base: 1.0,
            invert: true,
        };
        assert!(matches!(
            build_solid(&grid, &mapping, 10.0),
            Err(MeshError::NonFiniteVertex { .. })
        ));
    }

    #[test]
    fn hole_gets_inner_walls() {
        let grid = ElevationGrid::from_fn(5, 5, |x, y| (!(x == 2 && y == 2)).then_some(3.0));
        let (mesh, stats) = build_solid(&grid, &flat(1.0), 10.0).unwrap();
        // 16 quads minus the 4 touching the hole.
        assert_eq!(stats.quads, 12);
        let report = validate_solid(&mesh);
        assert!(report.is_printable(), "{report}");
    }

    #[test]
    fn unused_cells_get_no_vertices() {
        // A lone valid cell away from the block adds nothing.
        let grid = ElevationGrid::from_fn(4, 4, |x, y| {
            ((x < 2 && y < 2) || (x, y) == (3, 3)).then_some(1.0)
        });
        let (mesh, _) = build_solid(&grid, &flat(1.0), 10.0).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
    }
}
