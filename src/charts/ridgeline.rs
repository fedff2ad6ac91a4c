use std::rc::Rc;

use super::RangeChart;
use crate::data::density::{DensityError, DensityPoint, estimate, linear_ticks};
use crate::data::filter::{mean_finite, rows_in_range};
use crate::data::model::{Dataset, Metric, Series};
use crate::selection::YearRange;

/// One ridge: the density of a normalized metric over the selected years.
#[derive(Debug, Clone, PartialEq)]
pub struct Ridge {
    pub metric: Metric,
    /// Number of finite samples behind the curve.
    pub samples: usize,
    /// Drives the fill colour; `None` without samples.
    pub mean: Option<f64>,
    pub curve: Vec<DensityPoint>,
}

/// Stacked density curves of Ukraine's normalized indicators.
#[derive(Debug)]
pub struct Ridgeline {
    dataset: Rc<Dataset>,
    bandwidth: f64,
    grid: Vec<f64>,
    last_range: Option<YearRange>,
    pub ridges: Vec<Ridge>,
}

impl Ridgeline {
    /// Evaluate on `linear_ticks(0, 1, grid_ticks)`. Rejects a bandwidth that
    /// is not a positive finite number.
    pub fn new(dataset: Rc<Dataset>, bandwidth: f64, grid_ticks: usize) -> Result<Self, DensityError> {
        // Validate once here so render never has to.
        estimate(&[], &[], bandwidth)?;
        Ok(Ridgeline {
            dataset,
            bandwidth,
            grid: linear_ticks(0.0, 1.0, grid_ticks),
            last_range: None,
            ridges: Vec::new(),
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Largest density across all ridges, for a shared vertical scale.
    pub fn peak_density(&self) -> f64 {
        self.ridges
            .iter()
            .flat_map(|r| r.curve.iter().map(|p| p.density))
            .fold(0.0, f64::max)
    }
}

impl RangeChart for Ridgeline {
    fn title(&self) -> &str {
        "Indicator distributions"
    }

    fn render(&mut self, range: YearRange) {
        let rows = rows_in_range(&self.dataset, Series::Ukraine, range);
        self.ridges = Metric::ALL
            .iter()
            .map(|&metric| {
                let samples: Vec<f64> = rows
                    .iter()
                    .map(|o| o.normalized.get(metric))
                    .filter(|v| v.is_finite())
                    .collect();
                let curve = match estimate(&samples, &self.grid, self.bandwidth) {
                    Ok(curve) => curve,
                    Err(e) => {
                        log::error!("Density for {metric} failed: {e}");
                        Vec::new()
                    }
                };
                Ridge {
                    metric,
                    samples: samples.len(),
                    mean: mean_finite(samples.iter().copied()),
                    curve,
                }
            })
            .collect();
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.ridges.iter().filter(|r| r.samples > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn one_ridge_per_metric_on_the_grid() {
        let mut ridge = Ridgeline::new(Rc::new(sample_dataset()), 0.12, 80).unwrap();
        ridge.render(YearRange::new(2015, 2024).unwrap());
        assert_eq!(ridge.ridges.len(), 7);
        assert!(ridge.ridges.iter().all(|r| r.curve.len() == 101));
        assert_eq!(ridge.ridges[0].samples, 7);
        assert!(ridge.peak_density() > 0.0);
    }

    #[test]
    fn range_without_rows_gives_flat_curves() {
        let mut ridge = Ridgeline::new(Rc::new(sample_dataset()), 0.12, 80).unwrap();
        ridge.render(YearRange::new(2022, 2024).unwrap());
        assert_eq!(ridge.shape_count(), 0);
        assert!(ridge
            .ridges
            .iter()
            .all(|r| r.mean.is_none() && r.curve.iter().all(|p| p.density == 0.0)));
    }

    #[test]
    fn invalid_bandwidth_is_rejected_up_front() {
        let err = Ridgeline::new(Rc::new(sample_dataset()), 0.0, 80).unwrap_err();
        assert_eq!(err, DensityError::InvalidBandwidth(0.0));
    }
}
