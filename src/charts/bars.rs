use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::rows_in_range;
use crate::data::model::{Dataset, Series};
use crate::selection::YearRange;

/// Fixed happiness-score axis shared by the ranking bar charts.
pub const SCORE_DOMAIN: (f64, f64) = (0.0, 8.5);

/// One bar: a country's happiness score in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingBar {
    pub year: i32,
    pub country: String,
    pub score: f64,
}

/// Happiness score per year for one series (best, worst or Ukraine).
#[derive(Debug)]
pub struct RankingBars {
    dataset: Rc<Dataset>,
    series: Series,
    title: String,
    last_range: Option<YearRange>,
    /// Years on the band axis, including years whose score is missing.
    pub years: Vec<i32>,
    pub bars: Vec<RankingBar>,
}

impl RankingBars {
    pub fn new(dataset: Rc<Dataset>, series: Series) -> Self {
        RankingBars {
            dataset,
            series,
            title: format!("{series} country by year"),
            last_range: None,
            years: Vec::new(),
            bars: Vec::new(),
        }
    }

    pub fn series(&self) -> Series {
        self.series
    }
}

impl RangeChart for RankingBars {
    fn title(&self) -> &str {
        &self.title
    }

    fn render(&mut self, range: YearRange) {
        let rows = rows_in_range(&self.dataset, self.series, range);
        self.years = rows.iter().map(|o| o.year).collect();
        self.bars = rows
            .into_iter()
            .filter(|o| o.happiness().is_finite())
            .map(|o| RankingBar {
                year: o.year,
                country: o.country.clone(),
                score: o.happiness(),
            })
            .collect();
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.bars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn bars_follow_the_range() {
        let mut chart = RankingBars::new(Rc::new(sample_dataset()), Series::Best);
        chart.render(YearRange::new(2018, 2020).unwrap());
        assert_eq!(chart.years, vec![2018, 2019, 2020]);
        assert_eq!(chart.bars[0].country, "Finland");

        chart.render(YearRange::new(2024, 2024).unwrap());
        assert_eq!(chart.shape_count(), 1, "no stale bars from the wider range");
    }

    #[test]
    fn ukraine_bars_are_empty_when_range_has_no_ukraine_rows() {
        let ds = Rc::new(sample_dataset());
        let range = YearRange::new(2022, 2024).unwrap();

        let mut ukraine = RankingBars::new(Rc::clone(&ds), Series::Ukraine);
        let mut best = RankingBars::new(ds, Series::Best);
        ukraine.render(range);
        best.render(range);

        assert_eq!(ukraine.shape_count(), 0);
        assert!(ukraine.years.is_empty());
        assert_eq!(best.shape_count(), 3);
    }
}
