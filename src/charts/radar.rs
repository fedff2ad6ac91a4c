use std::f64::consts::{FRAC_PI_2, TAU};
use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::rows_in_range;
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// One year's normalized indicators for Ukraine.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarPolygon {
    pub year: i32,
    /// Normalized value per metric, in [`Metric::ALL`] order.
    pub values: Vec<f64>,
}

impl RadarPolygon {
    /// Vertex positions for an outer radius of `radius`, first axis pointing
    /// up. Missing values collapse onto the centre.
    pub fn vertices(&self, radius: f64) -> Vec<[f64; 2]> {
        let n = self.values.len() as f64;
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let r = if v.is_finite() { v.clamp(0.0, 1.0) * radius } else { 0.0 };
                let angle = i as f64 * TAU / n + FRAC_PI_2;
                [r * angle.cos(), r * angle.sin()]
            })
            .collect()
    }
}

/// Ukraine's seven normalized metrics, one polygon per year.
#[derive(Debug)]
pub struct RadarChart {
    dataset: Rc<Dataset>,
    last_range: Option<YearRange>,
    pub polygons: Vec<RadarPolygon>,
}

impl RadarChart {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        RadarChart {
            dataset,
            last_range: None,
            polygons: Vec::new(),
        }
    }

    pub fn axes() -> [Metric; 7] {
        Metric::ALL
    }
}

impl RangeChart for RadarChart {
    fn title(&self) -> &str {
        "Ukraine indicator radar"
    }

    fn render(&mut self, range: YearRange) {
        self.polygons = rows_in_range(&self.dataset, Series::Ukraine, range)
            .into_iter()
            .map(|o| RadarPolygon {
                year: o.year,
                values: Metric::ALL.iter().map(|m| o.normalized.get(*m)).collect(),
            })
            .collect();
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.polygons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn one_polygon_per_year_in_range() {
        let mut radar = RadarChart::new(Rc::new(sample_dataset()));
        radar.render(YearRange::new(2019, 2023).unwrap());
        let years: Vec<i32> = radar.polygons.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2019, 2020, 2021]);
        assert_eq!(radar.polygons[0].values.len(), 7);
    }

    #[test]
    fn first_vertex_points_up_and_missing_values_collapse() {
        let poly = RadarPolygon {
            year: 2020,
            values: vec![1.0, f64::NAN, 0.5, 0.5, 0.5, 0.5, 0.5],
        };
        let v = poly.vertices(100.0);
        assert!(v[0][0].abs() < 1e-9);
        assert!((v[0][1] - 100.0).abs() < 1e-9);
        assert_eq!(v[1], [0.0, 0.0]);
    }
}
