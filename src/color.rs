use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::Series;

// ---------------------------------------------------------------------------
// Fixed series colours
// ---------------------------------------------------------------------------

pub fn series_color(series: Series) -> Color32 {
    match series {
        Series::Best => Color32::from_rgb(0x69, 0xb3, 0xa2),
        Series::Worst => Color32::from_rgb(0xd9, 0x5f, 0x5f),
        Series::Ukraine => Color32::from_rgb(0xff, 0xd7, 0x00),
    }
}

/// Drawn for missing values.
pub const MISSING: Color32 = Color32::from_gray(90);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Sequential scale: value in [0, 1] → colour
// ---------------------------------------------------------------------------

/// Two-stop colour ramp, interpolated in linear RGB.
#[derive(Debug, Clone, Copy)]
pub struct SequentialScale {
    low: LinSrgb,
    high: LinSrgb,
}

impl SequentialScale {
    pub fn new(low: Color32, high: Color32) -> Self {
        let lin = |c: Color32| -> LinSrgb {
            Srgb::<u8>::new(c.r(), c.g(), c.b())
                .into_format::<f32>()
                .into_linear()
        };
        SequentialScale {
            low: lin(low),
            high: lin(high),
        }
    }

    /// Pale yellow to deep red, used by the heatmap.
    pub fn heat() -> Self {
        Self::new(Color32::from_rgb(0xff, 0xf5, 0xc0), Color32::from_rgb(0xb3, 0x00, 0x26))
    }

    /// Light to dark teal, used for ridge fills.
    pub fn cool() -> Self {
        Self::new(Color32::from_rgb(0xd6, 0xf0, 0xe8), Color32::from_rgb(0x1b, 0x6e, 0x5a))
    }

    /// NaN maps to [`MISSING`]; other values are clamped to `[0, 1]`.
    pub fn color_at(&self, t: f64) -> Color32 {
        if !t.is_finite() {
            return MISSING;
        }
        let mixed = self.low.mix(self.high, t.clamp(0.0, 1.0) as f32);
        let srgb: Srgb = Srgb::from_linear(mixed);
        to_color32(srgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(7);
        assert_eq!(colors.len(), 7);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn series_colors_are_distinct() {
        assert_ne!(series_color(Series::Best), series_color(Series::Worst));
        assert_eq!(series_color(Series::Ukraine), Color32::from_rgb(255, 215, 0));
    }

    #[test]
    fn sequential_scale_hits_both_ends() {
        let low = Color32::from_rgb(10, 20, 30);
        let high = Color32::from_rgb(200, 100, 50);
        let scale = SequentialScale::new(low, high);
        assert_eq!(scale.color_at(0.0), low);
        assert_eq!(scale.color_at(1.0), high);
        assert_eq!(scale.color_at(-3.0), low);
        assert_eq!(scale.color_at(f64::NAN), MISSING);
    }
}
