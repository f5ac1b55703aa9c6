//! Generation requests and their enumerated parameters.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{RequestError, RequestResult};
use crate::region::Region;

/// Requested mesh resolution tier, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Resolution {
    /// Coarsest tier.
    Low,
    /// Default tier.
    #[default]
    Medium,
    /// Fine tier.
    High,
    /// Finest tier.
    Ultra,
}

impl Resolution {
    /// All tiers from finest to coarsest.
    pub const FINEST_FIRST: [Self; 4] = [Self::Ultra, Self::High, Self::Medium, Self::Low];

    /// The next coarser tier, if any.
    #[must_use]
    pub const fn coarser(self) -> Option<Self> {
        match self {
            Self::Ultra => Some(Self::High),
            Self::High => Some(Self::Medium),
            Self::Medium => Some(Self::Low),
            Self::Low => None,
        }
    }

    /// Lowercase name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }
}

/// Footprint shape of the generated model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Shape {
    /// Full rectangular footprint.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the rectangular footprint.
    Oval,
}

impl Shape {
    /// Lowercase name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Oval => "oval",
        }
    }
}

/// Celestial body the region lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Body {
    /// Earth.
    #[default]
    Earth,
    /// Mars.
    Mars,
    /// The Moon.
    Moon,
    /// Venus.
    Venus,
}

impl Body {
    /// Mean radius used for the simple-cylindrical projection, in meters.
    #[must_use]
    pub const fn radius_m(self) -> f64 {
        match self {
            Self::Earth => 6_378_137.0,
            Self::Mars => 3_396_190.0,
            Self::Moon => 1_737_400.0,
            Self::Venus => 6_051_800.0,
        }
    }

    /// Meters per degree along the equator in the simple-cylindrical frame.
    #[must_use]
    pub fn meters_per_degree(self) -> f64 {
        self.radius_m() * std::f64::consts::PI / 180.0
    }

    /// Lowercase name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earth => "earth",
            Self::Mars => "mars",
            Self::Moon => "moon",
            Self::Venus => "venus",
        }
    }
}

macro_rules! impl_text {
    ($ty:ty, $field:literal, [$($variant:ident),+]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = RequestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                $(
                    if lower == Self::$variant.as_str() {
                        return Ok(Self::$variant);
                    }
                )+
                Err(RequestError::UnknownVariant {
                    field: $field,
                    value: s.to_string(),
                })
            }
        }
    };
}

impl_text!(Resolution, "resolution", [Low, Medium, High, Ultra]);
impl_text!(Shape, "shape", [Rectangle, Oval]);
impl_text!(Body, "body", [Earth, Mars, Moon, Venus]);

/// Accepted exaggeration range.
pub const EXAGGERATION_RANGE: (f64, f64) = (0.5, 5.0);
/// Accepted base height range in model units.
pub const BASE_HEIGHT_RANGE: (f64, f64) = (1.0, 20.0);
/// Accepted model width range in model units.
pub const MODEL_WIDTH_RANGE: (f64, f64) = (1.0, 2000.0);

/// A validated, immutable generation request.
///
/// Construct with [`RenderRequest::builder`] or [`RequestSpec::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    region: Region,
    exaggeration: f64,
    base_height: f64,
    model_width: f64,
    resolution: Resolution,
    shape: Shape,
    body: Body,
    lithophane: bool,
    invert: bool,
}

impl RenderRequest {
    /// Start building a request for `region` with default parameters.
    #[must_use]
    pub fn builder(region: Region) -> RenderRequestBuilder {
        RenderRequestBuilder::new(region)
    }

    /// Requested region.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Vertical exaggeration factor.
    #[must_use]
    pub const fn exaggeration(&self) -> f64 {
        self.exaggeration
    }

    /// Base slab height in model units.
    #[must_use]
    pub const fn base_height(&self) -> f64 {
        self.base_height
    }

    /// Model width (X extent) in model units.
    #[must_use]
    pub const fn model_width(&self) -> f64 {
        self.model_width
    }

    /// Requested resolution tier.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Footprint shape.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Celestial body.
    #[must_use]
    pub const fn body(&self) -> Body {
        self.body
    }

    /// Whether to produce a lithophane panel instead of a terrain model.
    #[must_use]
    pub const fn lithophane(&self) -> bool {
        self.lithophane
    }

    /// Whether relief is inverted.
    #[must_use]
    pub const fn invert(&self) -> bool {
        self.invert
    }
}

/// Fluent builder for [`RenderRequest`].
#[derive(Debug, Clone)]
pub struct RenderRequestBuilder {
    spec: RequestSpec,
}

impl RenderRequestBuilder {
    fn new(region: Region) -> Self {
        Self {
            spec: RequestSpec::new(BoundsSpec::from(region)),
        }
    }

    /// Set the vertical exaggeration.
    #[must_use]
    pub const fn exaggeration(mut self, value: f64) -> Self {
        self.spec.exaggeration = value;
        self
    }

    /// Set the base slab height.
    #[must_use]
    pub const fn base_height(mut self, value: f64) -> Self {
        self.spec.base_height = value;
        self
    }

    /// Set the model width.
    #[must_use]
    pub const fn model_width(mut self, value: f64) -> Self {
        self.spec.model_width = value;
        self
    }

    /// Set the resolution tier.
    #[must_use]
    pub const fn resolution(mut self, value: Resolution) -> Self {
        self.spec.resolution = value;
        self
    }

    /// Set the footprint shape.
    #[must_use]
    pub const fn shape(mut self, value: Shape) -> Self {
        self.spec.shape = value;
        self
    }

    /// Set the body.
    #[must_use]
    pub const fn body(mut self, value: Body) -> Self {
        self.spec.body = value;
        self
    }

    /// Enable or disable lithophane output.
    #[must_use]
    pub const fn lithophane(mut self, value: bool) -> Self {
        self.spec.lithophane = value;
        self
    }

    /// Enable or disable relief inversion.
    #[must_use]
    pub const fn invert(mut self, value: bool) -> Self {
        self.spec.invert = value;
        self
    }

    /// Validate and build the request.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for any out-of-range parameter.
    pub fn build(self) -> RequestResult<RenderRequest> {
        self.spec.validate()
    }
}

/// Unvalidated bounds as received on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundsSpec {
    /// Northern bound in degrees.
    pub north: f64,
    /// Southern bound in degrees.
    pub south: f64,
    /// Eastern bound in degrees.
    pub east: f64,
    /// Western bound in degrees.
    pub west: f64,
}

impl From<Region> for BoundsSpec {
    fn from(region: Region) -> Self {
        Self {
            north: region.north(),
            south: region.south(),
            east: region.east(),
            west: region.west(),
        }
    }
}

/// Unvalidated request as received on the wire.
///
/// Field names follow the public JSON schema (`baseHeight`, `modelWidth`).
/// Everything except `bounds` falls back to a default when omitted.
///
/// # Example
///
/// ```
/// use terrain_types::{BoundsSpec, RequestSpec, Shape};
///
/// let mut spec = RequestSpec::new(BoundsSpec {
///     north: 40.5,
///     south: 40.3,
///     east: -111.5,
///     west: -111.7,
/// });
/// spec.shape = Shape::Oval;
///
/// let request = spec.validate().unwrap();
/// assert_eq!(request.shape(), Shape::Oval);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RequestSpec {
    /// Geographic bounds.
    pub bounds: BoundsSpec,
    /// Vertical exaggeration, `[0.5, 5]`.
    #[cfg_attr(feature = "serde", serde(default = "default_exaggeration"))]
    pub exaggeration: f64,
    /// Base slab height, `[1, 20]` model units.
    #[cfg_attr(feature = "serde", serde(default = "default_base_height"))]
    pub base_height: f64,
    /// Model width in model units.
    #[cfg_attr(feature = "serde", serde(default = "default_model_width"))]
    pub model_width: f64,
    /// Resolution tier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resolution: Resolution,
    /// Footprint shape.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shape: Shape,
    /// Celestial body.
    #[cfg_attr(feature = "serde", serde(default))]
    pub body: Body,
    /// Lithophane output.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lithophane: bool,
    /// Inverted relief.
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert: bool,
}

const fn default_exaggeration() -> f64 {
    1.5
}

const fn default_base_height() -> f64 {
    5.0
}

const fn default_model_width() -> f64 {
    100.0
}

impl RequestSpec {
    /// A spec for `bounds` with every other field at its default.
    #[must_use]
    pub const fn new(bounds: BoundsSpec) -> Self {
        Self {
            bounds,
            exaggeration: default_exaggeration(),
            base_height: default_base_height(),
            model_width: default_model_width(),
            resolution: Resolution::Medium,
            shape: Shape::Rectangle,
            body: Body::Earth,
            lithophane: false,
            invert: false,
        }
    }

    /// Validate into an immutable [`RenderRequest`].
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> RequestResult<RenderRequest> {
        let b = self.bounds;
        let region = Region::new(b.north, b.south, b.east, b.west)?;

        check_range("exaggeration", self.exaggeration, EXAGGERATION_RANGE)?;
        check_range("baseHeight", self.base_height, BASE_HEIGHT_RANGE)?;
        check_range("modelWidth", self.model_width, MODEL_WIDTH_RANGE)?;

        Ok(RenderRequest {
            region,
            exaggeration: self.exaggeration,
            base_height: self.base_height,
            model_width: self.model_width,
            resolution: self.resolution,
            shape: self.shape,
            body: self.body,
            lithophane: self.lithophane,
            invert: self.invert,
        })
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> RequestResult<()> {
    // NaN fails both comparisons and is rejected here as well.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(RequestError::parameter(field, value, min, max))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wasatch() -> BoundsSpec {
        BoundsSpec {
            north: 40.5,
            south: 40.3,
            east: -111.5,
            west: -111.7,
        }
    }

    #[test]
    fn defaults_validate() {
        let request = RequestSpec::new(wasatch()).validate().unwrap();
        assert_eq!(request.resolution(), Resolution::Medium);
        assert_eq!(request.body(), Body::Earth);
        assert!(!request.lithophane());
    }

    #[test]
    fn parameter_ranges_are_enforced() {
        let mut spec = RequestSpec::new(wasatch());
        spec.exaggeration = 0.1;
        assert!(matches!(
            spec.validate(),
            Err(RequestError::ParameterOutOfRange {
                field: "exaggeration",
                ..
            })
        ));

        let mut spec = RequestSpec::new(wasatch());
        spec.base_height = 25.0;
        assert!(spec.validate().is_err());

        let mut spec = RequestSpec::new(wasatch());
        spec.model_width = f64::NAN;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn malformed_bounds_are_rejected_first() {
        let mut spec = RequestSpec::new(wasatch());
        spec.bounds.north = 40.0;
        spec.exaggeration = 100.0;
        assert!(matches!(
            spec.validate(),
            Err(RequestError::LatitudeOrder { .. })
        ));
    }

    #[test]
    fn builder_sets_every_field() {
        let region = Region::new(1.0, 0.0, 1.0, 0.0).unwrap();
        let request = RenderRequest::builder(region)
            .exaggeration(2.0)
            .base_height(3.0)
            .model_width(150.0)
            .resolution(Resolution::Ultra)
            .shape(Shape::Oval)
            .body(Body::Venus)
            .lithophane(true)
            .invert(true)
            .build()
            .unwrap();

        assert!((request.exaggeration() - 2.0).abs() < f64::EPSILON);
        assert!((request.base_height() - 3.0).abs() < f64::EPSILON);
        assert!((request.model_width() - 150.0).abs() < f64::EPSILON);
        assert_eq!(request.resolution(), Resolution::Ultra);
        assert_eq!(request.shape(), Shape::Oval);
        assert_eq!(request.body(), Body::Venus);
        assert!(request.lithophane());
        assert!(request.invert());
    }

    #[test]
    fn enum_text_round_trips() {
        for tier in Resolution::FINEST_FIRST {
            assert_eq!(tier.as_str().parse::<Resolution>().unwrap(), tier);
        }
        assert_eq!("OVAL".parse::<Shape>().unwrap(), Shape::Oval);
        assert_eq!(" moon ".parse::<Body>().unwrap(), Body::Moon);
        assert!("pluto".parse::<Body>().is_err());
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Resolution::Low < Resolution::Ultra);
        assert_eq!(Resolution::Ultra.coarser(), Some(Resolution::High));
        assert_eq!(Resolution::Low.coarser(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn wire_schema_uses_camel_case() {
        let json = r#"{
            "bounds": {"north": 40.5, "south": 40.3, "east": -111.5, "west": -111.7},
            "baseHeight": 4,
            "modelWidth": 120,
            "resolution": "ultra",
            "shape": "oval",
            "body": "moon",
            "lithophane": true
        }"#;
        let spec: RequestSpec = serde_json::from_str(json).unwrap();
        let request = spec.validate().unwrap();
        assert_eq!(request.resolution(), Resolution::Ultra);
        assert_eq!(request.body(), Body::Moon);
        assert!((request.exaggeration() - 1.5).abs() < f64::EPSILON);
        assert!(!request.invert());
    }
}
