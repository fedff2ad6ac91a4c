use std::rc::Rc;

use super::RangeChart;
use super::scale::LinearScale;
use crate::data::filter::rows_in_range;
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// Short account of each survey year, shown when hovering the area chart.
pub fn year_description(year: i32) -> Option<&'static str> {
    Some(match year {
        2015 => "Fighting in the east goes on and the economy shrinks. Households feel less secure about their income and more people leave.",
        2016 => "A fragile recovery begins with a few reforms. The currency steadies but real incomes stay low and trust in institutions is weak.",
        2017 => "Services and infrastructure improve a little. Some displaced families return and optimism grows slowly.",
        2018 => "Economic figures edge up and social support strengthens in the cities. Corruption remains a drag on confidence.",
        2019 => "The last pre-war baseline. Daily life is more settled and social cohesion feels stronger.",
        2020 => "The pandemic hits the economy and restrictions add stress. Communities lean on mutual aid.",
        2021 => "A partial recovery as vaccination spreads. Inflation squeezes households.",
        2022 => "The full-scale invasion brings a sharp fall in wellbeing and mass displacement.",
        2023 => "People adapt to life under war. Relief services stabilise and reconstruction pilots start.",
        2024 => "Conflict continues while some areas rebuild. Mental health and livelihoods get more attention.",
        _ => return None,
    })
}

/// Ukraine's normalized happiness as a filled area over the selected years.
#[derive(Debug)]
pub struct AreaChart {
    dataset: Rc<Dataset>,
    last_range: Option<YearRange>,
    hovered: Option<usize>,
    /// `[year, normalized happiness]`, in year order.
    pub points: Vec<[f64; 2]>,
    pub x_domain: (f64, f64),
}

impl AreaChart {
    pub fn new(dataset: Rc<Dataset>, full_range: YearRange) -> Self {
        AreaChart {
            dataset,
            last_range: None,
            hovered: None,
            points: Vec::new(),
            x_domain: (full_range.min() as f64, full_range.max() as f64),
        }
    }

    /// Highlight the segment under the pointer at plot coordinate `x`, or
    /// clear the highlight with `None`.
    ///
    /// A segment starts at a data year and runs to the next one; pointers
    /// outside the data snap to the first or last segment.
    pub fn hover(&mut self, x: Option<f64>) {
        self.hovered = x.filter(|x| x.is_finite()).and_then(|x| {
            let n = self.points.len();
            if n == 0 {
                return None;
            }
            let after = self.points.partition_point(|p| p[0] < x);
            Some(after.saturating_sub(1).min(n.saturating_sub(2)))
        });
    }

    /// The highlighted `[year, value]` point.
    pub fn hovered(&self) -> Option<[f64; 2]> {
        self.hovered.and_then(|i| self.points.get(i).copied())
    }

    /// `[x0, x1]` of the highlighted segment. A lone point gets a unit span.
    pub fn hovered_span(&self) -> Option<(f64, f64)> {
        let i = self.hovered?;
        let start = self.points.get(i)?[0];
        let end = self.points.get(i + 1).map_or(start + 1.0, |p| p[0]);
        Some((start, end))
    }

    /// Tooltip text for the highlighted year.
    pub fn tooltip(&self) -> Option<String> {
        let [year, value] = self.hovered()?;
        let year = year as i32;
        let mut text = format!("{year}\nHappiness (normalized 0-1): {value:.2}");
        if let Some(description) = year_description(year) {
            text.push_str("\n\n");
            text.push_str(description);
        }
        Some(text)
    }

    /// Maps the drawn x axis onto `pixels`, for inverting brush gestures.
    pub fn brush_scale(&self, pixels: (f64, f64)) -> LinearScale {
        LinearScale::new(self.x_domain, pixels)
    }
}

impl RangeChart for AreaChart {
    fn title(&self) -> &str {
        "Ukraine happiness over time"
    }

    fn render(&mut self, range: YearRange) {
        self.points = rows_in_range(&self.dataset, Series::Ukraine, range)
            .into_iter()
            .map(|o| [o.year as f64, o.normalized.get(Metric::Happiness)])
            .filter(|p| p[1].is_finite())
            .collect();
        self.hovered = None;

        let (lo, hi) = (range.min() as f64, range.max() as f64);
        self.x_domain = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;
    use crate::data::model::Observation;
    use crate::selection::{Broadcaster, BrushSelection, YearBounds};

    fn chart() -> AreaChart {
        AreaChart::new(Rc::new(sample_dataset()), YearBounds::default().full_range())
    }

    #[test]
    fn points_follow_the_range() {
        let mut area = chart();
        area.render(YearRange::new(2018, 2024).unwrap());
        let years: Vec<f64> = area.points.iter().map(|p| p[0]).collect();
        assert_eq!(years, vec![2018.0, 2019.0, 2020.0, 2021.0]);
        assert!(area.points.iter().all(|p| p[1] == 0.4));
        assert_eq!(area.x_domain, (2018.0, 2024.0));
    }

    #[test]
    fn empty_range_has_no_area_or_hover() {
        let mut area = chart();
        area.render(YearRange::new(2022, 2024).unwrap());
        assert_eq!(area.shape_count(), 0);
        area.hover(Some(2023.0));
        assert_eq!(area.hovered(), None);
        assert_eq!(area.tooltip(), None);
    }

    #[test]
    fn hover_picks_the_segment_start() {
        let mut area = chart();
        area.render(YearRange::new(2015, 2021).unwrap());
        area.hover(Some(2017.4));
        assert_eq!(area.hovered(), Some([2017.0, 0.4]));
        assert_eq!(area.hovered_span(), Some((2017.0, 2018.0)));

        // Past the last point the final segment stays highlighted.
        area.hover(Some(2030.0));
        assert_eq!(area.hovered_span(), Some((2020.0, 2021.0)));
        area.hover(Some(2000.0));
        assert_eq!(area.hovered().map(|p| p[0]), Some(2015.0));

        area.hover(None);
        assert_eq!(area.hovered(), None);
    }

    #[test]
    fn tooltip_carries_the_year_story() {
        let mut area = chart();
        area.render(YearRange::new(2019, 2020).unwrap());
        area.hover(Some(2019.5));
        let text = area.tooltip().unwrap();
        assert!(text.starts_with("2019\nHappiness (normalized 0-1): 0.40"));
        assert!(text.contains("pre-war"));
        assert_eq!(year_description(2031), None);
    }

    #[test]
    fn constant_happiness_keeps_a_flat_area() {
        let rows = (2015..=2017)
            .map(|year| {
                let mut o = Observation::new("Ukraine", year, Series::Ukraine);
                o.normalized.set(Metric::Happiness, 0.0);
                o
            })
            .collect();
        let mut area = AreaChart::new(
            Rc::new(Dataset::from_observations(rows)),
            YearBounds::default().full_range(),
        );
        area.render(YearRange::new(2015, 2024).unwrap());
        assert_eq!(area.points, vec![[2015.0, 0.0], [2016.0, 0.0], [2017.0, 0.0]]);
        area.hover(Some(2016.5));
        assert_eq!(area.hovered_span(), Some((2016.0, 2017.0)));
        // Exactly on a year the segment ending there is picked.
        area.hover(Some(2016.0));
        assert_eq!(area.hovered_span(), Some((2015.0, 2016.0)));
    }

    #[test]
    fn brush_selects_years_of_the_zoomed_view() {
        let mut b = Broadcaster::new(YearBounds::default());
        let mut area = chart();
        area.render(YearRange::new(2016, 2020).unwrap());
        let scale = area.brush_scale((100.0, 500.0));
        let (lo, hi) = BrushSelection::new(200.0, 400.0).to_candidate(&scale).unwrap();
        b.set_range(lo, hi).unwrap();
        assert_eq!(b.current(), YearRange::new(2017, 2019).unwrap());
    }
}
