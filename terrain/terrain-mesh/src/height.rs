//! Elevation to model height.

use terrain_types::{Body, RenderRequest};

use crate::params::MeshParams;

/// Maps elevation in meters to top-surface height in model units.
///
/// # Terrain
///
/// `z = (e - min) · exaggeration · scale + base`. With `invert` the relief
/// is flipped, so `z = (max - e) · exaggeration · scale + base`.
///
/// # Lithophane
///
/// `z = t_min + t · (t_max - t_min)` with `t = (e - min) / (max - min)`,
/// or `1 - t` when inverted. A flat range maps everything to `t = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightMapping {
    /// Relief on a base slab.
    Terrain {
        /// Lowest elevation, meters.
        min: f64,
        /// Highest elevation, meters.
        max: f64,
        /// Vertical exaggeration.
        exaggeration: f64,
        /// Model units per meter.
        scale: f64,
        /// Base slab height, model units.
        base: f64,
        /// Flip the relief.
        invert: bool,
    },
    /// Thickness-encoded panel.
    Lithophane {
        /// Lowest elevation, meters.
        min: f64,
        /// Highest elevation, meters.
        max: f64,
        /// Thickness at `t = 0`.
        min_thickness: f64,
        /// Thickness at `t = 1`.
        max_thickness: f64,
        /// Swap thick and thin.
        invert: bool,
    },
}

impl HeightMapping {
    /// The mapping `request` asks for over the elevation `range`.
    #[must_use]
    pub fn for_request(request: &RenderRequest, range: (f64, f64), params: &MeshParams) -> Self {
        let (min, max) = range;
        if request.lithophane() {
            return Self::Lithophane {
                min,
                max,
                min_thickness: params.lithophane_min_thickness,
                max_thickness: params.lithophane_max_thickness,
                invert: request.invert(),
            };
        }
        Self::Terrain {
            min,
            max,
            exaggeration: request.exaggeration(),
            scale: vertical_scale(request, range, params),
            base: request.base_height(),
            invert: request.invert(),
        }
    }

    /// Model height for elevation `e`.
    #[must_use]
    pub fn height(&self, e: f64) -> f64 {
        match *self {
            Self::Terrain {
                min,
                max,
                exaggeration,
                scale,
                base,
                invert,
            } => {
                let relief = if invert { max - e } else { e - min };
                relief * exaggeration * scale + base
            }
            Self::Lithophane {
                min,
                max,
                min_thickness,
                max_thickness,
                invert,
            } => {
                let span = max - min;
                let t = if span > 0.0 {
                    ((e - min) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let t = if invert { 1.0 - t } else { t };
                min_thickness + t * (max_thickness - min_thickness)
            }
        }
    }
}

/// Model units per meter of elevation.
///
/// Earth uses true physical scale from the region's ground width; other
/// bodies normalise relief to a fixed share of the model width.
#[must_use]
pub fn vertical_scale(request: &RenderRequest, range: (f64, f64), params: &MeshParams) -> f64 {
    let width = request.model_width();
    match request.body() {
        Body::Earth => {
            let region = request.region();
            let compression = region.center_latitude().to_radians().cos().max(1e-6);
            let ground_width_m = region.lon_span() * Body::Earth.meters_per_degree() * compression;
            width / ground_width_m
        }
        Body::Mars | Body::Moon | Body::Venus => {
            let span = (range.1 - range.0).max(params.min_relief_range_m);
            width * params.relief_fraction / span
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use terrain_types::Region;

    fn request(body: Body) -> terrain_types::RenderRequestBuilder {
        let region = Region::new(40.5, 40.3, -111.5, -111.7).unwrap();
        RenderRequest::builder(region).body(body).model_width(100.0)
    }

    #[test]
    fn earth_scale_is_physical() {
        let req = request(Body::Earth).build().unwrap();
        let scale = vertical_scale(&req, (1000.0, 3000.0), &MeshParams::default());
        let ground = 0.2 * 6_378_137.0 * std::f64::consts::PI / 180.0 * 40.4f64.to_radians().cos();
        assert_relative_eq!(scale, 100.0 / ground, max_relative = 1e-12);
    }

    #[test]
    fn other_bodies_use_relief_fraction() {
        let req = request(Body::Mars).build().unwrap();
        let params = MeshParams::default();
        assert_relative_eq!(vertical_scale(&req, (0.0, 3000.0), &params), 15.0 / 3000.0);
        // Flat ranges are clamped to one meter.
        assert_relative_eq!(vertical_scale(&req, (5.0, 5.0), &params), 15.0);
    }

    #[test]
    fn terrain_invert_flips_relief() {
        let req = request(Body::Moon)
            .exaggeration(2.0)
            .base_height(3.0)
            .invert(true)
            .build()
            .unwrap();
        let m = HeightMapping::for_request(&req, (0.0, 100.0), &MeshParams::default());
        assert_relative_eq!(m.height(100.0), 3.0);
        assert!(m.height(0.0) > m.height(50.0));
    }

    #[test]
    fn lithophane_band() {
        let req = request(Body::Earth).lithophane(true).build().unwrap();
        let m = HeightMapping::for_request(&req, (200.0, 400.0), &MeshParams::default());
        assert_relative_eq!(m.height(200.0), 0.8);
        assert_relative_eq!(m.height(400.0), 4.0);
        assert_relative_eq!(m.height(300.0), 2.4);

        let inv = request(Body::Earth).lithophane(true).invert(true).build().unwrap();
        let m = HeightMapping::for_request(&inv, (200.0, 400.0), &MeshParams::default());
        assert_relative_eq!(m.height(400.0), 0.8);
        assert_relative_eq!(m.height(200.0), 4.0);
    }

    #[test]
    fn flat_lithophane_is_thin() {
        let req = request(Body::Venus).lithophane(true).build().unwrap();
        let m = HeightMapping::for_request(&req, (7.0, 7.0), &MeshParams::default());
        assert_relative_eq!(m.height(7.0), 0.8);
    }
}
