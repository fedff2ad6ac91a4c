use super::{YearBounds, YearRange};

// ---------------------------------------------------------------------------
// Dual-handle range slider model
// ---------------------------------------------------------------------------

/// Two handles over the hard range, moving in whole years.
///
/// Handles may be dragged past the enforced span; on release they bounce
/// back and the resulting pair is the candidate handed to the broadcaster.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSlider {
    bounds: YearBounds,
    handles: [f64; 2],
}

impl RangeSlider {
    pub fn new(bounds: YearBounds, range: YearRange) -> Self {
        RangeSlider {
            bounds,
            handles: [range.min() as f64, range.max() as f64],
        }
    }

    pub fn bounds(&self) -> YearBounds {
        self.bounds
    }

    pub fn handles(&self) -> [f64; 2] {
        self.handles
    }

    /// Move `handle` (0 = lower, 1 = upper) to `value`, snapped to a whole
    /// year inside the hard range. Handles never cross.
    pub fn drag(&mut self, handle: usize, value: f64) {
        if !value.is_finite() || handle > 1 {
            return;
        }
        let hard = value
            .round()
            .clamp(self.bounds.hard_min as f64, self.bounds.hard_max as f64);
        self.handles[handle] = match handle {
            0 => hard.min(self.handles[1]),
            _ => hard.max(self.handles[0]),
        };
    }

    /// Whether a handle sits outside the enforced span (drawn in red).
    pub fn is_out_of_bounds(&self, handle: usize) -> bool {
        self.handles.get(handle).is_some_and(|&v| {
            v < self.bounds.soft_min as f64 || v > self.bounds.soft_max as f64
        })
    }

    /// Year ticks that can be clicked: the enforced span only.
    pub fn pips(&self) -> Vec<i32> {
        (self.bounds.soft_min..=self.bounds.soft_max).collect()
    }

    /// Move the nearer handle to a clicked pip. On a tie the upper handle moves.
    pub fn click_pip(&mut self, year: i32) {
        let y = year as f64;
        let dist0 = (self.handles[0] - y).abs();
        let dist1 = (self.handles[1] - y).abs();
        if dist0 < dist1 {
            self.drag(0, y);
        } else {
            self.drag(1, y);
        }
    }

    /// End of a gesture: bounce handles back inside the enforced span and
    /// return the candidate pair.
    pub fn release(&mut self) -> (f64, f64) {
        let soft_min = self.bounds.soft_min as f64;
        let soft_max = self.bounds.soft_max as f64;
        for h in &mut self.handles {
            *h = h.round().clamp(soft_min, soft_max);
        }
        if self.handles[0] > self.handles[1] {
            self.handles.swap(0, 1);
        }
        (self.handles[0], self.handles[1])
    }

    /// Follow a range published by another input.
    pub fn sync(&mut self, range: YearRange) {
        self.handles = [range.min() as f64, range.max() as f64];
    }
}
