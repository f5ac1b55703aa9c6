//! Pixel encodings used by elevation tile and image services.
//!
//! # Terrarium
//!
//! `meters = R·256 + G + B/256 − 32768`. Fully transparent pixels carry no
//! data.
//!
//! # Grayscale proxy
//!
//! Visual basemaps of the Moon and Mars are shaded imagery, not elevation.
//! Their mean channel value scaled by a fixed factor stands in for relief.
//! The result is a low-fidelity approximation and is flagged as such.
//!
//! # Inverted stretch
//!
//! The regional export service renders a stretched grayscale where white is
//! the calibration minimum and black the maximum.

use serde::{Deserialize, Serialize};

/// Offset subtracted from the raw Terrarium value.
pub const TERRARIUM_OFFSET: f64 = 32768.0;

/// Meters per grayscale level for basemap proxies.
pub const GRAYSCALE_METERS_PER_LEVEL: f64 = 100.0;

/// Decode one Terrarium pixel to meters.
///
/// # Example
///
/// ```
/// use terrain_fetch::decode_terrarium;
///
/// assert_eq!(decode_terrarium(128, 0, 0), 0.0);
/// assert_eq!(decode_terrarium(129, 4, 128), 260.5);
/// ```
#[must_use]
pub fn decode_terrarium(r: u8, g: u8, b: u8) -> f64 {
    f64::from(r) * 256.0 + f64::from(g) + f64::from(b) / 256.0 - TERRARIUM_OFFSET
}

/// Encode meters as a Terrarium pixel.
///
/// Values outside the representable range `[-32768, 32768)` saturate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Truncation: every component is clamped to 0..=255 first
#[must_use]
pub fn encode_terrarium(meters: f64) -> [u8; 3] {
    let v = (meters + TERRARIUM_OFFSET).clamp(0.0, 65_535.996);
    let whole = v.floor();
    let r = (whole / 256.0).floor();
    let g = whole - r * 256.0;
    let b = ((v - whole) * 256.0).floor();
    [
        r.clamp(0.0, 255.0) as u8,
        g.clamp(0.0, 255.0) as u8,
        b.clamp(0.0, 255.0) as u8,
    ]
}

/// Linear calibration of a stretched grayscale rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StretchCalibration {
    /// Elevation rendered as white (255).
    pub min_m: f64,
    /// Elevation rendered as black (0).
    pub max_m: f64,
}

impl Default for StretchCalibration {
    fn default() -> Self {
        Self {
            min_m: -500.0,
            max_m: 6500.0,
        }
    }
}

impl StretchCalibration {
    /// Decode a gray level to meters.
    #[must_use]
    pub fn decode(&self, gray: u8) -> f64 {
        self.max_m - f64::from(gray) / 255.0 * (self.max_m - self.min_m)
    }
}

/// How a source encodes elevation in its pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelEncoding {
    /// RGB Terrarium encoding.
    Terrarium,
    /// Mean gray level times a fixed scale.
    GrayscaleProxy {
        /// Meters per gray level.
        meters_per_level: f64,
    },
    /// Inverted linear stretch.
    InvertedStretch(StretchCalibration),
}

impl PixelEncoding {
    /// Decode one RGBA pixel, or `None` for a transparent pixel.
    #[must_use]
    pub fn decode(&self, [r, g, b, a]: [u8; 4]) -> Option<f64> {
        if a == 0 {
            return None;
        }
        let meters = match self {
            Self::Terrarium => decode_terrarium(r, g, b),
            Self::GrayscaleProxy { meters_per_level } => {
                (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0 * meters_per_level
            }
            Self::InvertedStretch(cal) => {
                let gray = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
                cal.decode(u8::try_from(gray).unwrap_or(u8::MAX))
            }
        };
        Some(meters)
    }

    /// Whether values from this encoding are only a stand-in for relief.
    #[must_use]
    pub const fn is_proxy(&self) -> bool {
        matches!(self, Self::GrayscaleProxy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn terrarium_known_values() {
        assert_relative_eq!(decode_terrarium(0, 0, 0), -32768.0);
        assert_relative_eq!(decode_terrarium(128, 0, 0), 0.0);
        assert_relative_eq!(decode_terrarium(135, 53, 64), 1845.25);
    }

    #[test]
    fn terrarium_encode_matches_decode() {
        let [r, g, b] = encode_terrarium(1845.25);
        assert_eq!([r, g, b], [135, 53, 64]);
        let [r, g, b] = encode_terrarium(-412.5);
        assert_relative_eq!(decode_terrarium(r, g, b), -412.5);
    }

    #[test]
    fn transparent_pixels_are_missing() {
        assert_eq!(PixelEncoding::Terrarium.decode([128, 0, 0, 0]), None);
        assert_eq!(PixelEncoding::Terrarium.decode([128, 0, 0, 255]), Some(0.0));
    }

    #[test]
    fn grayscale_proxy_scales_mean() {
        let enc = PixelEncoding::GrayscaleProxy {
            meters_per_level: GRAYSCALE_METERS_PER_LEVEL,
        };
        assert_relative_eq!(enc.decode([30, 60, 90, 255]).unwrap_or(f64::NAN), 6000.0);
        assert!(enc.is_proxy());
        assert!(!PixelEncoding::Terrarium.is_proxy());
    }

    #[test]
    fn stretch_is_inverted() {
        let cal = StretchCalibration::default();
        assert_relative_eq!(cal.decode(0), 6500.0);
        assert_relative_eq!(cal.decode(255), -500.0);
        let enc = PixelEncoding::InvertedStretch(cal);
        assert!(enc.decode([0, 0, 0, 255]) > enc.decode([200, 200, 200, 255]));
    }
}
