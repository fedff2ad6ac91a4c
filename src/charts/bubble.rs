use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::{all_rows_in_range, extent, max_finite};
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// Headroom above the largest value on both axes.
const AXIS_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub series: Series,
    pub country: String,
    pub year: i32,
    pub x: f64,
    pub y: f64,
    /// NaN when the size metric is missing; drawn at the minimum radius.
    pub size: f64,
}

/// Every series plotted on two chosen metrics, sized by a third.
#[derive(Debug)]
pub struct BubbleChart {
    dataset: Rc<Dataset>,
    pub x_metric: Metric,
    pub y_metric: Metric,
    pub size_metric: Metric,
    last_range: Option<YearRange>,
    pub bubbles: Vec<Bubble>,
    pub x_domain: Option<(f64, f64)>,
    pub y_domain: Option<(f64, f64)>,
    pub size_domain: Option<(f64, f64)>,
}

impl BubbleChart {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        BubbleChart {
            dataset,
            x_metric: Metric::Gdp,
            y_metric: Metric::Happiness,
            size_metric: Metric::SocialSupport,
            last_range: None,
            bubbles: Vec::new(),
            x_domain: None,
            y_domain: None,
            size_domain: None,
        }
    }

    pub fn set_axes(&mut self, x: Metric, y: Metric, size: Metric) {
        if (x, y, size) != (self.x_metric, self.y_metric, self.size_metric) {
            self.x_metric = x;
            self.y_metric = y;
            self.size_metric = size;
            self.refresh();
        }
    }

    /// Map a bubble's size value onto `[min_r, max_r]`.
    pub fn radius(&self, size: f64, min_r: f64, max_r: f64) -> f64 {
        match self.size_domain {
            Some((lo, hi)) if size.is_finite() && hi > lo => {
                min_r + (size - lo) / (hi - lo) * (max_r - min_r)
            }
            Some(_) if size.is_finite() => (min_r + max_r) / 2.0,
            _ => min_r,
        }
    }
}

impl RangeChart for BubbleChart {
    fn title(&self) -> &str {
        "Indicator bubbles"
    }

    fn render(&mut self, range: YearRange) {
        let (xm, ym, sm) = (self.x_metric, self.y_metric, self.size_metric);
        self.bubbles = all_rows_in_range(&self.dataset, range)
            .into_iter()
            .map(|o| Bubble {
                series: o.series,
                country: o.country.clone(),
                year: o.year,
                x: o.raw.get(xm),
                y: o.raw.get(ym),
                size: o.raw.get(sm),
            })
            .filter(|b| b.x.is_finite() && b.y.is_finite())
            .collect();

        self.x_domain = max_finite(self.bubbles.iter().map(|b| b.x)).map(|m| (0.0, m * AXIS_HEADROOM));
        self.y_domain = max_finite(self.bubbles.iter().map(|b| b.y)).map(|m| (0.0, m * AXIS_HEADROOM));
        self.size_domain = extent(self.bubbles.iter().map(|b| b.size));
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.bubbles.len()
    }
}
