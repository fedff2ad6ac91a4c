/// Chart view models.
///
/// Each chart keeps a shared handle on the read-only [`Dataset`] and
/// derives everything it draws from it in [`RangeChart::render`]. The egui
/// drawing code in `ui::plot` only reads these models.

pub mod area;
pub mod bars;
pub mod bubble;
pub mod comparison;
pub mod dotplot;
pub mod heatmap;
pub mod hierarchy;
pub mod line;
pub mod radar;
pub mod ridgeline;
pub mod scale;
pub mod summary;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::DashboardConfig;
use crate::data::density::DensityError;
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::{Broadcaster, Subscription, YearRange};

use area::AreaChart;
use bars::RankingBars;
use bubble::BubbleChart;
use comparison::{ComparisonStyle, MedianComparison};
use dotplot::DotPlot;
use heatmap::Heatmap;
use hierarchy::{Packing, Sunburst};
use line::LineChart;
use radar::RadarChart;
use ridgeline::Ridgeline;
use summary::SummaryPanel;

// ---------------------------------------------------------------------------
// Range-filter contract
// ---------------------------------------------------------------------------

/// Every chart redraws itself from a year range.
///
/// `render` must be idempotent: the same range always yields the same view
/// model, and a range with no rows yields an empty but valid one.
pub trait RangeChart {
    fn title(&self) -> &str;

    /// Rebuild the view model for `range`.
    fn render(&mut self, range: YearRange);

    /// The range passed to the most recent `render`.
    fn last_range(&self) -> Option<YearRange>;

    /// Number of marks currently drawn.
    fn shape_count(&self) -> usize;

    /// Re-render with the last range, after a chart-local option changed.
    fn refresh(&mut self) {
        if let Some(range) = self.last_range() {
            self.render(range);
        }
    }
}

/// Every chart on the dashboard.
#[derive(Debug)]
pub enum Chart {
    Bars(RankingBars),
    DotPlot(DotPlot),
    Heatmap(Heatmap),
    Sunburst(Sunburst),
    Packing(Packing),
    Bubble(BubbleChart),
    Radar(RadarChart),
    Ridgeline(Ridgeline),
    Line(LineChart),
    Area(AreaChart),
    Comparison(MedianComparison),
    Summary(SummaryPanel),
}

impl Chart {
    fn inner(&self) -> &dyn RangeChart {
        match self {
            Chart::Bars(c) => c,
            Chart::DotPlot(c) => c,
            Chart::Heatmap(c) => c,
            Chart::Sunburst(c) => c,
            Chart::Packing(c) => c,
            Chart::Bubble(c) => c,
            Chart::Radar(c) => c,
            Chart::Ridgeline(c) => c,
            Chart::Line(c) => c,
            Chart::Area(c) => c,
            Chart::Comparison(c) => c,
            Chart::Summary(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RangeChart {
        match self {
            Chart::Bars(c) => c,
            Chart::DotPlot(c) => c,
            Chart::Heatmap(c) => c,
            Chart::Sunburst(c) => c,
            Chart::Packing(c) => c,
            Chart::Bubble(c) => c,
            Chart::Radar(c) => c,
            Chart::Ridgeline(c) => c,
            Chart::Line(c) => c,
            Chart::Area(c) => c,
            Chart::Comparison(c) => c,
            Chart::Summary(c) => c,
        }
    }
}

impl RangeChart for Chart {
    fn title(&self) -> &str {
        self.inner().title()
    }

    fn render(&mut self, range: YearRange) {
        log::debug!("Rendering {} for {range}", self.title());
        self.inner_mut().render(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.inner().last_range()
    }

    fn shape_count(&self) -> usize {
        self.inner().shape_count()
    }
}

// ---------------------------------------------------------------------------
// ChartBoard – the set of charts wired to a broadcaster
// ---------------------------------------------------------------------------

pub type SharedChart = Rc<RefCell<Chart>>;

/// Owns the charts and their subscriptions.
#[derive(Debug, Default)]
pub struct ChartBoard {
    pub charts: Vec<SharedChart>,
    subscriptions: Vec<Subscription>,
}

impl ChartBoard {
    /// Build every chart over `dataset`. Fails only on invalid config
    /// (e.g. a non-positive ridgeline bandwidth).
    pub fn build(dataset: Rc<Dataset>, config: &DashboardConfig) -> Result<Self, DensityError> {
        let ds = || Rc::clone(&dataset);
        let charts = vec![
            Chart::Summary(SummaryPanel::new(ds())),
            Chart::Bars(RankingBars::new(ds(), Series::Best)),
            Chart::Bars(RankingBars::new(ds(), Series::Worst)),
            Chart::Bars(RankingBars::new(ds(), Series::Ukraine)),
            Chart::Line(LineChart::new(ds(), config.bounds.full_range())),
            Chart::Area(AreaChart::new(ds(), config.bounds.full_range())),
            Chart::Comparison(MedianComparison::new(ds(), ComparisonStyle::Circular)),
            Chart::Comparison(MedianComparison::new(ds(), ComparisonStyle::Lines)),
            Chart::DotPlot(DotPlot::new(ds(), Metric::Happiness)),
            Chart::Heatmap(Heatmap::new(ds())),
            Chart::Radar(RadarChart::new(ds())),
            Chart::Ridgeline(Ridgeline::new(
                ds(),
                config.ridgeline.bandwidth,
                config.ridgeline.grid_ticks,
            )?),
            Chart::Bubble(BubbleChart::new(ds())),
            Chart::Sunburst(Sunburst::new(ds())),
            Chart::Packing(Packing::new(ds())),
        ];
        Ok(ChartBoard {
            charts: charts
                .into_iter()
                .map(|c| Rc::new(RefCell::new(c)))
                .collect(),
            subscriptions: Vec::new(),
        })
    }

    /// Subscribe every chart and render it with the current range.
    pub fn attach(&mut self, broadcaster: &mut Broadcaster) {
        let current = broadcaster.current();
        for chart in &self.charts {
            chart.borrow_mut().render(current);
            let handle = Rc::clone(chart);
            self.subscriptions
                .push(broadcaster.subscribe(move |range| handle.borrow_mut().render(range)));
        }
    }

    /// Drop every subscription, e.g. before replacing the dataset.
    pub fn detach(&mut self, broadcaster: &mut Broadcaster) {
        for sub in self.subscriptions.drain(..) {
            broadcaster.unsubscribe(sub);
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;
    use crate::selection::YearBounds;

    fn board() -> (ChartBoard, Broadcaster) {
        let config = DashboardConfig::default();
        let board = ChartBoard::build(Rc::new(sample_dataset()), &config).unwrap();
        (board, Broadcaster::new(YearBounds::default()))
    }

    #[test]
    fn attach_renders_every_chart_with_current_range() {
        let (mut board, mut b) = board();
        board.attach(&mut b);
        assert_eq!(b.subscriber_count(), board.charts.len());
        for chart in &board.charts {
            assert_eq!(chart.borrow().last_range(), Some(b.current()));
        }
    }

    #[test]
    fn published_range_reaches_every_chart() {
        let (mut board, mut b) = board();
        board.attach(&mut b);
        b.set_years(2018, 2019);
        let expected = YearRange::new(2018, 2019).unwrap();
        assert!(board
            .charts
            .iter()
            .all(|c| c.borrow().last_range() == Some(expected)));
    }

    #[test]
    fn detach_removes_subscriptions() {
        let (mut board, mut b) = board();
        board.attach(&mut b);
        board.detach(&mut b);
        assert_eq!(b.subscriber_count(), 0);
        assert!(!board.is_attached());

        b.set_years(2020, 2020);
        assert_ne!(
            board.charts[0].borrow().last_range(),
            YearRange::new(2020, 2020)
        );
    }

    #[test]
    fn empty_range_renders_without_shapes() {
        let (mut board, mut b) = board();
        board.attach(&mut b);
        // The dataset has rows for every enforced year, so drop to an empty
        // dataset to exercise the zero-row path on every chart.
        let config = DashboardConfig::default();
        let mut empty = ChartBoard::build(Rc::new(Dataset::default()), &config).unwrap();
        empty.attach(&mut b);
        for chart in &empty.charts {
            assert_eq!(chart.borrow().shape_count(), 0, "{}", chart.borrow().title());
        }
    }

    #[test]
    fn render_is_idempotent_for_every_chart() {
        let (board, _) = board();
        let range = YearRange::new(2016, 2020).unwrap();
        for chart in &board.charts {
            chart.borrow_mut().render(range);
            let first = format!("{:?}", chart.borrow());
            chart.borrow_mut().render(range);
            let second = format!("{:?}", chart.borrow());
            assert_eq!(first, second);
        }
    }
}
