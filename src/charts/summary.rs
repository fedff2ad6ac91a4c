use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::{mean_finite, median_finite, rows_in_range};
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// Median happiness per series and Ukraine population estimates.
#[derive(Debug)]
pub struct SummaryPanel {
    dataset: Rc<Dataset>,
    last_range: Option<YearRange>,
    /// Median happiness score per series, `None` when no row has one.
    pub medians: Vec<(Series, Option<f64>)>,
    /// Mean over years of `normalized × population`, per metric.
    pub population_estimates: Vec<(Metric, Option<f64>)>,
}

impl SummaryPanel {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        SummaryPanel {
            dataset,
            last_range: None,
            medians: Vec::new(),
            population_estimates: Vec::new(),
        }
    }
}

/// `"7.53"` or `"N/A"`.
pub fn format_score(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

/// Whole number with thousands separators, e.g. `12,345,678`.
pub fn format_count(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

impl RangeChart for SummaryPanel {
    fn title(&self) -> &str {
        "Summary"
    }

    fn render(&mut self, range: YearRange) {
        self.medians = Series::ALL
            .iter()
            .map(|&s| {
                let scores = rows_in_range(&self.dataset, s, range)
                    .into_iter()
                    .map(|o| o.happiness());
                (s, median_finite(scores))
            })
            .collect();

        let ukraine: Vec<_> = rows_in_range(&self.dataset, Series::Ukraine, range)
            .into_iter()
            .filter(|o| o.population.is_finite())
            .collect();
        self.population_estimates = Metric::ALL
            .iter()
            .map(|&m| {
                let estimates = ukraine.iter().map(|o| o.normalized.get(m) * o.population);
                (m, mean_finite(estimates))
            })
            .collect();
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.medians.iter().filter(|(_, v)| v.is_some()).count()
            + self
                .population_estimates
                .iter()
                .filter(|(_, v)| v.is_some())
                .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn medians_per_series_with_gaps() {
        let mut panel = SummaryPanel::new(Rc::new(sample_dataset()));
        panel.render(YearRange::new(2022, 2024).unwrap());
        assert_eq!(panel.medians[0].0, Series::Best);
        assert!((panel.medians[0].1.unwrap() - (7.4 + 8.0 * 0.05)).abs() < 1e-9);
        assert_eq!(panel.medians[2], (Series::Ukraine, None));
        assert_eq!(format_score(panel.medians[2].1), "N/A");
        assert!(panel.population_estimates.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn population_estimate_averages_over_years() {
        let mut panel = SummaryPanel::new(Rc::new(sample_dataset()));
        panel.render(YearRange::new(2015, 2016).unwrap());
        let (metric, happiness) = panel.population_estimates[0];
        assert_eq!(metric, Metric::Happiness);
        let expected = (0.4 * 44_000_000.0 + 0.4 * 43_500_000.0) / 2.0;
        assert!((happiness.unwrap() - expected).abs() < 1e-3);
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(17_500_000.0), "17,500,000");
        assert_eq!(format_count(999.4), "999");
        assert_eq!(format_count(-1234.0), "-1,234");
        assert_eq!(format_score(Some(7.536)), "7.54");
    }
}
