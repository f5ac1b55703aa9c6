//! Resolution tiers and the fallback ladder built from them.

use serde::{Deserialize, Serialize};
use terrain_types::Resolution;

/// Zoom and mesh budget for one resolution tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Preferred tile zoom.
    pub zoom: u8,
    /// Column budget for the mesh grid.
    pub max_segments: usize,
    /// Lowest zoom tried before moving to the next coarser tier.
    pub min_zoom: u8,
}

impl Tier {
    /// A tier at `zoom` with `max_segments` columns, descending to `min_zoom`.
    #[must_use]
    pub const fn new(zoom: u8, max_segments: usize, min_zoom: u8) -> Self {
        Self {
            zoom,
            max_segments,
            min_zoom,
        }
    }
}

/// The four tiers, keyed by [`Resolution`].
///
/// # Example
///
/// ```
/// use terrain_pipeline::TierTable;
/// use terrain_types::Resolution;
///
/// let ladder = TierTable::default().attempts(Resolution::High);
/// assert_eq!((ladder[0].zoom, ladder[0].max_segments), (12, 512));
/// assert_eq!((ladder[1].zoom, ladder[1].max_segments), (11, 512));
/// assert_eq!((ladder[2].zoom, ladder[2].max_segments), (11, 256));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    /// Finest tier.
    pub ultra: Tier,
    /// Fine tier.
    pub high: Tier,
    /// Default tier.
    pub medium: Tier,
    /// Coarsest tier.
    pub low: Tier,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            ultra: Tier::new(13, 1024, 12),
            high: Tier::new(12, 512, 11),
            medium: Tier::new(11, 256, 10),
            low: Tier::new(10, 128, 5),
        }
    }
}

impl TierTable {
    /// The tier for `resolution`.
    #[must_use]
    pub const fn get(&self, resolution: Resolution) -> Tier {
        match resolution {
            Resolution::Ultra => self.ultra,
            Resolution::High => self.high,
            Resolution::Medium => self.medium,
            Resolution::Low => self.low,
        }
    }

    /// Replace the tier for `resolution`.
    #[must_use]
    pub const fn with_tier(mut self, resolution: Resolution, tier: Tier) -> Self {
        match resolution {
            Resolution::Ultra => self.ultra = tier,
            Resolution::High => self.high = tier,
            Resolution::Medium => self.medium = tier,
            Resolution::Low => self.low = tier,
        }
        self
    }

    /// Attempts to make for a request at `requested`, best first.
    ///
    /// Within a tier the zoom steps down to the tier's floor; the next
    /// coarser tier then starts at its own zoom or where the previous tier
    /// stopped, whichever is lower. Zoom and segment budget never increase
    /// from one attempt to the next, even if the table is not monotone.
    #[must_use]
    pub fn attempts(&self, requested: Resolution) -> Vec<Attempt> {
        let mut out = Vec::new();
        let mut next = Some(requested);
        let mut zoom_cap = u8::MAX;
        let mut segment_cap = usize::MAX;

        while let Some(resolution) = next {
            let tier = self.get(resolution);
            let start = tier.zoom.min(zoom_cap);
            let floor = tier.min_zoom.min(start);
            let max_segments = tier.max_segments.min(segment_cap);

            for zoom in (floor..=start).rev() {
                out.push(Attempt {
                    tier: resolution,
                    zoom,
                    max_segments,
                    min_zoom: floor,
                });
            }

            zoom_cap = floor;
            segment_cap = max_segments;
            next = resolution.coarser();
        }
        out
    }
}

/// One rung of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// Tier the attempt belongs to.
    pub tier: Resolution,
    /// Tile zoom.
    pub zoom: u8,
    /// Column budget.
    pub max_segments: usize,
    /// Lowest zoom the attempt may shrink to when its canvas is too large.
    pub min_zoom: u8,
}

impl Attempt {
    /// Whether this attempt is coarser than `requested` in zoom or segments.
    #[must_use]
    pub const fn is_below(&self, requested: &Self) -> bool {
        self.zoom < requested.zoom || self.max_segments < requested.max_segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(attempts: &[Attempt]) -> Vec<(u8, usize)> {
        attempts.iter().map(|a| (a.zoom, a.max_segments)).collect()
    }

    #[test]
    fn ultra_ladder_walks_every_tier() {
        let ladder = TierTable::default().attempts(Resolution::Ultra);
        assert_eq!(
            pairs(&ladder[..6]),
            vec![(13, 1024), (12, 1024), (12, 512), (11, 512), (11, 256), (10, 256)]
        );
        let last = ladder[ladder.len() - 1];
        assert_eq!((last.tier, last.zoom, last.max_segments), (Resolution::Low, 5, 128));
        assert_eq!(ladder.len(), 2 + 2 + 2 + 6);
    }

    #[test]
    fn low_ladder_stays_low() {
        let ladder = TierTable::default().attempts(Resolution::Low);
        assert_eq!(ladder.len(), 6);
        assert!(ladder.iter().all(|a| a.tier == Resolution::Low && a.min_zoom == 5));
    }

    #[test]
    fn non_monotone_tables_are_clamped() {
        let table = TierTable::default().with_tier(Resolution::Medium, Tier::new(14, 4096, 13));
        let ladder = table.attempts(Resolution::High);
        for pair in ladder.windows(2) {
            assert!(pair[1].zoom <= pair[0].zoom);
            assert!(pair[1].max_segments <= pair[0].max_segments);
        }
        let medium: Vec<_> = ladder.iter().filter(|a| a.tier == Resolution::Medium).collect();
        assert_eq!(medium.len(), 1);
        assert_eq!((medium[0].zoom, medium[0].max_segments), (11, 512));
    }

    #[test]
    fn below_compares_either_component() {
        let requested = Attempt {
            tier: Resolution::High,
            zoom: 12,
            max_segments: 512,
            min_zoom: 11,
        };
        assert!(!requested.is_below(&requested));
        assert!(Attempt { zoom: 11, ..requested }.is_below(&requested));
        assert!(Attempt { max_segments: 256, ..requested }.is_below(&requested));
    }
}
