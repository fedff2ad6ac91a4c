use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::{YearGroup, extent, merge_by_year};
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// Best, worst and Ukraine values of one metric, side by side per year.
#[derive(Debug)]
pub struct DotPlot {
    dataset: Rc<Dataset>,
    metric: Metric,
    /// Flip the value axis (useful for ranking-like metrics).
    pub descending: bool,
    last_range: Option<YearRange>,
    pub groups: Vec<YearGroup>,
    /// Extent of the valid values, already flipped when `descending`.
    pub y_domain: Option<(f64, f64)>,
}

impl DotPlot {
    pub fn new(dataset: Rc<Dataset>, metric: Metric) -> Self {
        DotPlot {
            dataset,
            metric,
            descending: false,
            last_range: None,
            groups: Vec::new(),
            y_domain: None,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if metric != self.metric {
            self.metric = metric;
            self.refresh();
        }
    }

    pub fn set_descending(&mut self, descending: bool) {
        if descending != self.descending {
            self.descending = descending;
            self.refresh();
        }
    }

    /// Number of drawn dots for `series`; gaps are not drawn.
    pub fn dot_count(&self, series: Series) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.values)
            .filter(|v| v.series == series && v.is_valid())
            .count()
    }

    /// Years whose valid values get a connecting line (two or more dots).
    pub fn connectors(&self) -> impl Iterator<Item = &YearGroup> {
        self.groups
            .iter()
            .filter(|g| g.values.iter().filter(|v| v.is_valid()).count() >= 2)
    }
}

impl RangeChart for DotPlot {
    fn title(&self) -> &str {
        "Best vs worst vs Ukraine"
    }

    fn render(&mut self, range: YearRange) {
        self.groups = merge_by_year(&self.dataset, self.metric, range);
        let domain = extent(
            self.groups
                .iter()
                .flat_map(|g| g.values.iter().map(|v| v.value)),
        );
        self.y_domain = domain.map(|(lo, hi)| if self.descending { (hi, lo) } else { (lo, hi) });
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        Series::ALL.iter().map(|s| self.dot_count(*s)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn ukraine_series_drops_out_when_range_has_no_ukraine_rows() {
        let mut plot = DotPlot::new(Rc::new(sample_dataset()), Metric::Happiness);
        plot.render(YearRange::new(2022, 2024).unwrap());

        assert_eq!(plot.dot_count(Series::Ukraine), 0);
        assert_eq!(plot.dot_count(Series::Best), 3);
        assert_eq!(plot.dot_count(Series::Worst), 3);
        assert!(plot
            .groups
            .iter()
            .all(|g| g.values[2].country == "N/A"));
        assert_eq!(plot.connectors().count(), 3);
    }

    #[test]
    fn y_domain_covers_valid_values_and_flips() {
        let mut plot = DotPlot::new(Rc::new(sample_dataset()), Metric::Happiness);
        plot.render(YearRange::new(2015, 2015).unwrap());
        assert_eq!(plot.y_domain, Some((3.2, 7.4)));

        plot.set_descending(true);
        assert_eq!(plot.y_domain, Some((7.4, 3.2)));
    }

    #[test]
    fn switching_metric_rerenders_last_range() {
        let mut plot = DotPlot::new(Rc::new(sample_dataset()), Metric::Happiness);
        plot.render(YearRange::new(2016, 2017).unwrap());
        plot.set_metric(Metric::Gdp);
        assert_eq!(plot.metric(), Metric::Gdp);
        assert_eq!(plot.groups.len(), 2);
        let best_2016 = plot.groups[0].values[0].value;
        assert!((best_2016 - 7.45 / 2.0).abs() < 1e-9);
    }
}
