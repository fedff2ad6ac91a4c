use crate::charts::scale::LinearScale;

/// Pixel extent of a finished horizontal brush gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSelection {
    pub x0: f64,
    pub x1: f64,
}

impl BrushSelection {
    pub fn new(x0: f64, x1: f64) -> Self {
        BrushSelection { x0, x1 }
    }

    /// Inverse-map the extent through `scale` into a year candidate.
    ///
    /// A zero-width brush selects nothing and yields `None`.
    pub fn to_candidate(&self, scale: &LinearScale) -> Option<(f64, f64)> {
        let y0 = scale.invert(self.x0);
        let y1 = scale.invert(self.x1);
        if y0 == y1 {
            return None;
        }
        Some((y0.min(y1), y0.max(y1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{Broadcaster, YearBounds, YearRange};

    fn scale() -> LinearScale {
        LinearScale::new((2015.0, 2024.0), (0.0, 900.0))
    }

    #[test]
    fn brush_maps_pixels_to_years() {
        let c = BrushSelection::new(100.0, 400.0).to_candidate(&scale());
        assert_eq!(c, Some((2016.0, 2019.0)));
    }

    #[test]
    fn right_to_left_brush_is_ordered() {
        let c = BrushSelection::new(400.0, 100.0).to_candidate(&scale());
        assert_eq!(c, Some((2016.0, 2019.0)));
    }

    #[test]
    fn degenerate_brush_publishes_nothing() {
        let mut b = Broadcaster::new(YearBounds::default());
        b.set_years(2017, 2020);
        let before = b.current();

        let candidate = BrushSelection::new(250.0, 250.0).to_candidate(&scale());
        assert_eq!(candidate, None);
        if let Some((lo, hi)) = candidate {
            b.set_range(lo, hi).unwrap();
        }
        assert_eq!(b.current(), before);
        assert_eq!(before, YearRange::new(2017, 2020).unwrap());
    }
}
