use std::f64::consts::TAU;
use std::rc::Rc;

use super::RangeChart;
use super::scale::BandScale;
use crate::data::filter::{extent, median_finite, rows_in_range};
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

// ---------------------------------------------------------------------------
// Per-parameter median comparison across the three series
// ---------------------------------------------------------------------------

/// How the comparison is drawn. Both styles share the same medians.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonStyle {
    /// One radial bar per series inside each parameter's angular band.
    Circular,
    /// One line per series across the parameters.
    Lines,
}

/// A series' median for one parameter, scaled into `[0, 1]` by that
/// series' own min and max over the selected years.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMedian {
    pub series: Series,
    pub median: f64,
    pub normalized: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMedians {
    pub metric: Metric,
    pub values: Vec<SeriesMedian>,
}

/// One annular bar of the circular style. Radii are fractions of the
/// outer radius.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialBar {
    pub metric: Metric,
    pub series: Series,
    pub median: f64,
    pub normalized: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Empty core of the circular style, as a fraction of the outer radius.
pub const INNER_RADIUS: f64 = 80.0 / 350.0;
const BAND_PADDING: f64 = 0.15;
/// Angular shift between the series inside one band.
const SERIES_OFFSET: f64 = 0.05;

/// `(value - min) / (max - min)`, or 0 for a constant parameter.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min { 0.0 } else { (value - min) / (max - min) }
}

#[derive(Debug)]
pub struct MedianComparison {
    dataset: Rc<Dataset>,
    style: ComparisonStyle,
    last_range: Option<YearRange>,
    pub parameters: Vec<ParameterMedians>,
}

impl MedianComparison {
    pub fn new(dataset: Rc<Dataset>, style: ComparisonStyle) -> Self {
        MedianComparison {
            dataset,
            style,
            last_range: None,
            parameters: Vec::new(),
        }
    }

    pub fn style(&self) -> ComparisonStyle {
        self.style
    }

    /// Bars for the circular style. Each parameter gets a padded band of the
    /// full turn; the series are shifted slightly inside it so they stay
    /// visible when their heights match. Bar length follows a radial scale,
    /// so area grows linearly with the normalized median.
    pub fn radial_bars(&self) -> Vec<RadialBar> {
        let bands = BandScale::new(Metric::ALL.to_vec(), (0.0, TAU), BAND_PADDING);
        let width = bands.bandwidth();
        let inner_sq = INNER_RADIUS * INNER_RADIUS;
        let mut bars = Vec::new();
        for param in &self.parameters {
            let Some(start) = bands.position(&param.metric) else {
                continue;
            };
            for value in &param.values {
                let offset = (series_slot(value.series) - 1.0) * SERIES_OFFSET;
                let t = value.normalized.clamp(0.0, 1.0);
                bars.push(RadialBar {
                    metric: param.metric,
                    series: value.series,
                    median: value.median,
                    normalized: value.normalized,
                    start_angle: start + offset,
                    end_angle: start + width + offset,
                    inner_radius: INNER_RADIUS,
                    outer_radius: (inner_sq + t * (1.0 - inner_sq)).sqrt(),
                });
            }
        }
        bars
    }

    /// `(parameter index, normalized median)` points of one series, for the
    /// line style. Parameters the series has no value for are skipped.
    pub fn series_points(&self, series: Series) -> Vec<[f64; 2]> {
        self.parameters
            .iter()
            .filter_map(|p| {
                let value = p.values.iter().find(|v| v.series == series)?;
                Some([p.metric.index() as f64, value.normalized])
            })
            .collect()
    }
}

fn series_slot(series: Series) -> f64 {
    Series::ALL.iter().position(|&s| s == series).unwrap_or(0) as f64
}

impl RangeChart for MedianComparison {
    fn title(&self) -> &str {
        match self.style {
            ComparisonStyle::Circular => "Median by parameter (circular)",
            ComparisonStyle::Lines => "Median by parameter",
        }
    }

    fn render(&mut self, range: YearRange) {
        let rows: Vec<_> = Series::ALL
            .iter()
            .map(|&s| (s, rows_in_range(&self.dataset, s, range)))
            .collect();

        self.parameters = Metric::ALL
            .iter()
            .map(|&metric| ParameterMedians {
                metric,
                values: rows
                    .iter()
                    .filter_map(|(series, obs)| {
                        let values: Vec<f64> = obs.iter().map(|o| o.raw.get(metric)).collect();
                        let median = median_finite(values.iter().copied())?;
                        let (min, max) = extent(values)?;
                        Some(SeriesMedian {
                            series: *series,
                            median,
                            normalized: normalize(median, min, max),
                        })
                    })
                    .collect(),
            })
            .collect();
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.parameters.iter().map(|p| p.values.len()).sum()
    }
}
