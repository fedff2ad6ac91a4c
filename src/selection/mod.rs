/// Selection layer: the shared year range and everything that can change it.
///
/// Architecture:
/// ```text
///   slider ─┐
///   brush  ─┤  candidate (min, max)
///   dropdown┤ ─────────────────────►  ┌─────────────┐   YearRange   ┌────────┐
///   play   ─┘                          │ Broadcaster │ ────────────► │ charts │
///                                      └─────────────┘  (fan-out)    └────────┘
/// ```

pub mod broadcaster;
pub mod brush;
pub mod playback;
pub mod slider;

pub use broadcaster::{Broadcaster, Outcome, SelectionError, Subscription};
pub use brush::BrushSelection;
pub use playback::{Playback, PlaybackEvent};
pub use slider::RangeSlider;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// YearRange – the canonical inclusive selection
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` year selection. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// `None` when `min > max`.
    pub fn new(min: i32, max: i32) -> Option<Self> {
        (min <= max).then_some(YearRange { min, max })
    }

    /// Build from two endpoints in either order.
    pub fn spanning(a: i32, b: i32) -> Self {
        YearRange {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// Number of years covered.
    pub fn len(&self) -> usize {
        (self.max.abs_diff(self.min) as usize).saturating_add(1)
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// YearBounds – slider range and enforced dataset range
// ---------------------------------------------------------------------------

/// The slider may be dragged anywhere in `[hard_min, hard_max]`, but only
/// years in `[soft_min, soft_max]` are ever published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct YearBounds {
    pub hard_min: i32,
    pub hard_max: i32,
    pub soft_min: i32,
    pub soft_max: i32,
}

impl Default for YearBounds {
    fn default() -> Self {
        YearBounds {
            hard_min: 2013,
            hard_max: 2026,
            soft_min: 2015,
            soft_max: 2024,
        }
    }
}

impl YearBounds {
    /// Order both pairs and widen the hard range to cover the soft one.
    pub fn normalized(self) -> Self {
        let soft_min = self.soft_min.min(self.soft_max);
        let soft_max = self.soft_min.max(self.soft_max);
        let hard_min = self.hard_min.min(self.hard_max).min(soft_min);
        let hard_max = self.hard_min.max(self.hard_max).max(soft_max);
        YearBounds {
            hard_min,
            hard_max,
            soft_min,
            soft_max,
        }
    }

    /// The full enforced span, used as the default and reset selection.
    pub fn full_range(&self) -> YearRange {
        YearRange::spanning(self.soft_min, self.soft_max)
    }

    /// Round a finite candidate year and snap it into the enforced span.
    pub fn clamp_year(&self, year: f64) -> i32 {
        let rounded = year.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        rounded.clamp(self.soft_min, self.soft_max)
    }

    /// Clamp each endpoint independently, then swap if they crossed.
    pub fn clamp(&self, min: f64, max: f64) -> YearRange {
        YearRange::spanning(self.clamp_year(min), self.clamp_year(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_rejects_inverted_bounds() {
        assert!(YearRange::new(2020, 2019).is_none());
        let r = YearRange::new(2019, 2019).unwrap();
        assert_eq!(r.len(), 1);
        assert!(r.contains(2019));
        assert!(!r.contains(2020));
    }

    #[test]
    fn widest_range_length_does_not_overflow() {
        let r = YearRange::new(i32::MIN, i32::MAX).unwrap();
        assert_eq!(r.len(), u32::MAX as usize + 1);
        assert_eq!(YearRange::spanning(2024, 2015).len(), 10);
    }

    #[test]
    fn clamp_snaps_and_swaps() {
        let b = YearBounds::default();
        assert_eq!(b.clamp(2010.0, 2030.0), YearRange::new(2015, 2024).unwrap());
        assert_eq!(b.clamp(2022.0, 2017.0), YearRange::new(2017, 2022).unwrap());
        assert_eq!(b.clamp(2017.6, 2018.4), YearRange::new(2018, 2018).unwrap());
        assert_eq!(b.clamp(1e12, -1e12), b.full_range());
    }

    #[test]
    fn normalized_bounds_are_consistent() {
        let b = YearBounds {
            hard_min: 2020,
            hard_max: 2010,
            soft_min: 2025,
            soft_max: 2015,
        }
        .normalized();
        assert_eq!((b.soft_min, b.soft_max), (2015, 2025));
        assert_eq!((b.hard_min, b.hard_max), (2010, 2025));
    }
}
