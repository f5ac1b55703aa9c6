//! Elevation rasters in source pixel space.

/// A rectangular raster of elevation samples in meters.
///
/// Row 0 is the northern edge, column 0 the western edge. A `None` sample
/// means the source had no data for that pixel. Non-finite values are never
/// stored.
///
/// # Example
///
/// ```
/// use terrain_types::Raster;
///
/// let mut raster = Raster::empty(4, 2);
/// raster.set(1, 1, 1250.0);
/// assert_eq!(raster.get(1, 1), Some(1250.0));
/// assert_eq!(raster.get(0, 0), None);
/// assert_eq!(raster.valid_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    samples: Vec<Option<f64>>,
}

impl Raster {
    /// A raster with every sample missing.
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            samples: vec![None; width * height],
        }
    }

    /// Build a raster from row-major samples.
    ///
    /// Returns `None` if `samples.len() != width * height`.
    #[must_use]
    pub fn from_samples(width: usize, height: usize, samples: Vec<Option<f64>>) -> Option<Self> {
        if samples.len() != width * height {
            return None;
        }
        let samples = samples
            .into_iter()
            .map(|s| s.filter(|v| v.is_finite()))
            .collect();
        Some(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a raster by evaluating `f(x, y)` at every pixel.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Option<f64>) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y).filter(|v| v.is_finite()));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the raster has no pixels at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sample at `(x, y)`; `None` when missing or out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples[y * self.width + x]
    }

    /// Store a sample. Out-of-bounds writes and non-finite values are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        if x < self.width && y < self.height && value.is_finite() {
            self.samples[y * self.width + x] = Some(value);
        }
    }

    /// Row-major samples.
    #[must_use]
    pub fn samples(&self) -> &[Option<f64>] {
        &self.samples
    }

    /// Number of pixels holding a sample.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    /// Copy out the window starting at `(x0, y0)`, clamped to the raster.
    #[must_use]
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Self {
        let x0 = x0.min(self.width);
        let y0 = y0.min(self.height);
        let width = width.min(self.width - x0);
        let height = height.min(self.height - y0);
        Self::from_fn(width, height, |x, y| self.get(x0 + x, y0 + y))
    }

    /// Nearest-neighbour resample onto `width × height` pixels.
    #[must_use]
    pub fn resample_nearest(&self, width: usize, height: usize) -> Self {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.is_empty() {
            return Self::empty(width, height);
        }
        Self::from_fn(width, height, |x, y| {
            let sx = nearest_index(x, width, self.width);
            let sy = nearest_index(y, height, self.height);
            self.get(sx, sy)
        })
    }
}

/// Map index `i` of `n` evenly spaced samples onto `m` source samples.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn nearest_index(i: usize, n: usize, m: usize) -> usize {
    if n <= 1 || m <= 1 {
        return 0;
    }
    let t = i as f64 / (n - 1) as f64;
    ((t * (m - 1) as f64).round() as usize).min(m - 1)
}
