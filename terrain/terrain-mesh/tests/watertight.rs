//! Watertightness of built solids across footprints and holes.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use terrain_mesh::{
    build_request_solid, build_solid, validate_solid, HeightMapping, MeshError, MeshParams,
};
use terrain_types::{Body, ElevationGrid, Region, RenderRequest, Shape};

fn terrain() -> HeightMapping {
    HeightMapping::Terrain {
        min: 0.0,
        max: 500.0,
        exaggeration: 1.5,
        scale: 0.01,
        base: 5.0,
        invert: false,
    }
}

fn oval_grid(w: usize, h: usize) -> ElevationGrid {
    ElevationGrid::from_fn(w, h, |x, y| {
        in_oval(x, y, w, h).then(|| ((x * 13 + y * 7) % 50) as f64 * 10.0)
    })
}

/// Inscribed ellipse over a `w × h` grid.
fn in_oval(x: usize, y: usize, w: usize, h: usize) -> bool {
    let cx = (w - 1) as f64 / 2.0;
    let cy = (h - 1) as f64 / 2.0;
    let dx = (x as f64 - cx) / cx;
    let dy = (y as f64 - cy) / cy;
    dx * dx + dy * dy <= 1.0
}

#[test]
fn rectangle_is_watertight() {
    let grid = ElevationGrid::from_fn(30, 20, |x, y| Some((x * y) as f64));
    let (mesh, stats) = build_solid(&grid, &terrain(), 100.0).unwrap();
    let report = validate_solid(&mesh);
    assert!(report.is_printable(), "{report}");
    assert_eq!(stats.quads, 29 * 19);
    assert_eq!(stats.walls, 2 * (29 + 19));
}

#[test]
fn oval_is_watertight_and_smaller() {
    let rect = ElevationGrid::from_fn(40, 30, |x, y| Some(((x * 13 + y * 7) % 50) as f64 * 10.0));
    let (rect_mesh, _) = build_solid(&rect, &terrain(), 100.0).unwrap();
    let (oval_mesh, _) = build_solid(&oval_grid(40, 30), &terrain(), 100.0).unwrap();

    let report = validate_solid(&oval_mesh);
    assert!(report.is_printable(), "{report}");
    assert!(oval_mesh.vertex_count() < rect_mesh.vertex_count());
}

#[test]
fn earth_request_end_to_end() {
    let region = Region::new(40.5, 40.3, -111.5, -111.7).unwrap();
    let request = RenderRequest::builder(region)
        .shape(Shape::Oval)
        .body(Body::Earth)
        .exaggeration(2.0)
        .build()
        .unwrap();
    let (solid, _) =
        build_request_solid(&oval_grid(25, 25), (0.0, 490.0), &request, &MeshParams::default())
            .unwrap();
    let (lo, hi) = solid.bounds().unwrap();
    assert_eq!(lo.z, 0.0);
    assert!(hi.z > request.base_height());
    assert!((hi.x - lo.x) <= request.model_width() + 1e-9);
}

proptest! {
    #[test]
    fn random_holes_stay_closed(
        w in 2usize..18,
        h in 2usize..18,
        cells in proptest::collection::vec(prop::bool::weighted(0.8), 18 * 18),
        invert in any::<bool>(),
    ) {
        let grid = ElevationGrid::from_fn(w, h, |x, y| {
            cells[y * 18 + x].then(|| (x as f64 * 37.0 + y as f64 * 11.0) % 400.0)
        });
        let mapping = HeightMapping::Terrain {
            min: 0.0,
            max: 400.0,
            exaggeration: 1.0,
            scale: 0.02,
            base: 2.0,
            invert,
        };
        match build_solid(&grid, &mapping, 50.0) {
            Ok((mesh, _)) => {
                let report = validate_solid(&mesh);
                prop_assert!(report.is_printable(), "{}", report);
                prop_assert!(mesh.is_finite());
            }
            Err(err) => {
                prop_assert!(matches!(err, MeshError::NoTriangles | MeshError::NoVertices));
            }
        }
    }
}
