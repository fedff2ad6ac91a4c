use std::rc::Rc;

use super::RangeChart;
use super::scale::LinearScale;
use crate::data::filter::rows_in_range;
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// One metric's trajectory. Points with a missing value are left out.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    pub metric: Metric,
    pub visible: bool,
    pub points: Vec<[f64; 2]>,
}

/// Ukraine's normalized indicators over time; the x axis zooms to the
/// selected years and its brush feeds the shared selection.
#[derive(Debug)]
pub struct LineChart {
    dataset: Rc<Dataset>,
    visible: [bool; 7],
    last_range: Option<YearRange>,
    pub lines: Vec<MetricLine>,
    pub x_domain: (f64, f64),
}

impl LineChart {
    pub fn new(dataset: Rc<Dataset>, full_range: YearRange) -> Self {
        LineChart {
            dataset,
            visible: [true; 7],
            last_range: None,
            lines: Vec::new(),
            x_domain: (full_range.min() as f64, full_range.max() as f64),
        }
    }

    pub fn is_visible(&self, metric: Metric) -> bool {
        self.visible[metric.index()]
    }

    /// Dim or restore a metric's line.
    pub fn toggle_metric(&mut self, metric: Metric) {
        self.visible[metric.index()] = !self.visible[metric.index()];
        for line in self.lines.iter_mut().filter(|l| l.metric == metric) {
            line.visible = self.visible[metric.index()];
        }
    }

    /// Maps the drawn x axis onto `pixels`. Brush gestures are inverted
    /// through this scale, so they select years of the zoomed view.
    pub fn brush_scale(&self, pixels: (f64, f64)) -> LinearScale {
        LinearScale::new(self.x_domain, pixels)
    }
}

impl RangeChart for LineChart {
    fn title(&self) -> &str {
        "Ukraine indicators over time"
    }

    fn render(&mut self, range: YearRange) {
        let rows = rows_in_range(&self.dataset, Series::Ukraine, range);
        self.lines = Metric::ALL
            .iter()
            .map(|&metric| MetricLine {
                metric,
                visible: self.visible[metric.index()],
                points: rows
                    .iter()
                    .map(|o| [o.year as f64, o.normalized.get(metric)])
                    .filter(|p| p[1].is_finite())
                    .collect(),
            })
            .collect();

        // A single year still gets a readable axis.
        let (lo, hi) = (range.min() as f64, range.max() as f64);
        self.x_domain = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.points.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;
    use crate::selection::{Broadcaster, BrushSelection, YearBounds};

    fn chart() -> LineChart {
        let bounds = YearBounds::default();
        LineChart::new(Rc::new(sample_dataset()), bounds.full_range())
    }

    #[test]
    fn x_domain_follows_range() {
        let mut line = chart();
        line.render(YearRange::new(2017, 2019).unwrap());
        assert_eq!(line.x_domain, (2017.0, 2019.0));
        assert!(line.lines.iter().all(|l| l.points.len() == 3));

        line.render(YearRange::new(2018, 2018).unwrap());
        assert_eq!(line.x_domain, (2017.5, 2018.5));
    }

    #[test]
    fn toggling_survives_rerender() {
        let mut line = chart();
        line.render(YearRange::new(2015, 2024).unwrap());
        line.toggle_metric(Metric::Gdp);
        assert!(!line.is_visible(Metric::Gdp));
        line.render(YearRange::new(2016, 2020).unwrap());
        assert!(!line.lines[Metric::Gdp.index()].visible);
        assert!(line.lines[Metric::Happiness.index()].visible);
    }

    #[test]
    fn brush_maps_through_the_zoomed_axis() {
        let mut b = Broadcaster::new(YearBounds::default());
        let mut line = chart();
        line.render(YearRange::new(2015, 2024).unwrap());
        let scale = line.brush_scale((0.0, 900.0));
        let (lo, hi) = BrushSelection::new(200.0, 600.0).to_candidate(&scale).unwrap();
        b.set_range(lo, hi).unwrap();
        assert_eq!(b.current(), YearRange::new(2017, 2021).unwrap());

        // Once zoomed to 2017-2021, the same pixels cover a narrower span.
        line.render(b.current());
        let scale = line.brush_scale((0.0, 900.0));
        let (lo, hi) = BrushSelection::new(225.0, 675.0).to_candidate(&scale).unwrap();
        assert_eq!((lo, hi), (2018.0, 2020.0));
        b.set_range(lo, hi).unwrap();
        assert_eq!(b.current(), YearRange::new(2018, 2020).unwrap());
    }

    #[test]
    fn single_year_brush_scale_is_padded() {
        let mut line = chart();
        line.render(YearRange::new(2018, 2018).unwrap());
        let scale = line.brush_scale((0.0, 100.0));
        assert_eq!(scale.invert(0.0), 2017.5);
        assert_eq!(scale.invert(100.0), 2018.5);
    }

    #[test]
    fn no_ukraine_rows_keeps_a_brushable_axis() {
        let mut b = Broadcaster::new(YearBounds::default());
        let mut line = chart();
        line.render(YearRange::new(2020, 2024).unwrap());
        b.set_years(2020, 2024);
        line.render(YearRange::new(2023, 2024).unwrap());
        assert_eq!(line.shape_count(), 0);
        assert_eq!(line.x_domain, (2023.0, 2024.0));

        // The empty plot still maps gestures, and reset still works.
        let scale = line.brush_scale((0.0, 100.0));
        assert!(BrushSelection::new(50.0, 50.0).to_candidate(&scale).is_none());
        let (lo, hi) = BrushSelection::new(0.0, 100.0).to_candidate(&scale).unwrap();
        assert_eq!((lo, hi), (2023.0, 2024.0));
        b.reset();
        assert_eq!(b.current(), YearBounds::default().full_range());
    }
}
