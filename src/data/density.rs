use thiserror::Error;

// ---------------------------------------------------------------------------
// Kernel density estimation (Epanechnikov kernel)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum DensityError {
    #[error("bandwidth must be a positive finite number, got {0}")]
    InvalidBandwidth(f64),
}

/// One sample of a density curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
}

/// Scaled Epanechnikov kernel: `0.75 * (1 - u²) / h` for `|u| <= 1` where
/// `u = v / h`, zero outside.
pub fn epanechnikov(v: f64, bandwidth: f64) -> f64 {
    let u = v / bandwidth;
    if u.abs() <= 1.0 {
        0.75 * (1.0 - u * u) / bandwidth
    } else {
        0.0
    }
}

/// Evaluate the kernel density of `samples` at every point of `grid`.
///
/// Non-finite samples are ignored. With no usable samples every density is
/// `0.0`. The result has exactly `grid.len()` points, in grid order.
pub fn estimate(
    samples: &[f64],
    grid: &[f64],
    bandwidth: f64,
) -> Result<Vec<DensityPoint>, DensityError> {
    if !(bandwidth.is_finite() && bandwidth > 0.0) {
        return Err(DensityError::InvalidBandwidth(bandwidth));
    }

    let samples: Vec<f64> = samples.iter().copied().filter(|s| s.is_finite()).collect();
    let n = samples.len() as f64;

    Ok(grid
        .iter()
        .map(|&x| {
            let density = if samples.is_empty() {
                0.0
            } else {
                samples
                    .iter()
                    .map(|&s| epanechnikov(x - s, bandwidth))
                    .sum::<f64>()
                    / n
            };
            DensityPoint { x, density }
        })
        .collect())
}

/// Evenly spaced "nice" ticks covering `[start, stop]`, roughly `count` of them.
///
/// The step is a power of ten times 1, 2 or 5, so `linear_ticks(0.0, 1.0, 80)`
/// yields 101 ticks 0.01 apart.
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };

    let raw_step = (hi - lo) / count as f64;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    // Work in integer multiples of the step to avoid accumulating error.
    // Below 1, divide by the inverse step so ticks land on exact decimals.
    let mut ticks: Vec<f64> = if power < 0.0 {
        let inverse = 10f64.powf(-power) / factor;
        let first = (lo * inverse).ceil() as i64;
        let last = (hi * inverse).floor() as i64;
        (first..=last).map(|i| i as f64 / inverse).collect()
    } else {
        let step = factor * 10f64.powf(power);
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    };
    if start > stop {
        ticks.reverse();
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_at_grid_point() {
        let curve = estimate(&[5.0], &[5.0], 1.0).unwrap();
        assert_eq!(curve, vec![DensityPoint { x: 5.0, density: 0.75 }]);
    }

    #[test]
    fn empty_samples_give_zero_density() {
        let grid = linear_ticks(0.0, 1.0, 10);
        let curve = estimate(&[], &grid, 0.12).unwrap();
        assert_eq!(curve.len(), grid.len());
        assert!(curve.iter().all(|p| p.density == 0.0));
    }

    #[test]
    fn nan_samples_are_ignored() {
        let with_nan = estimate(&[0.5, f64::NAN], &[0.5], 0.2).unwrap();
        let without = estimate(&[0.5], &[0.5], 0.2).unwrap();
        assert_eq!(with_nan, without);
    }

    #[test]
    fn kernel_is_zero_outside_bandwidth() {
        let curve = estimate(&[0.0], &[-0.5, 0.5, 1.0], 0.25).unwrap();
        assert!(curve.iter().all(|p| p.density == 0.0));
        assert_eq!(epanechnikov(0.25, 0.25), 0.0);
        assert!(epanechnikov(0.2, 0.25) > 0.0);
    }

    #[test]
    fn density_integrates_to_one() {
        let grid = linear_ticks(-1.0, 2.0, 3000);
        let step = grid[1] - grid[0];
        let curve = estimate(&[0.3, 0.5, 0.7], &grid, 0.12).unwrap();
        let area: f64 = curve.iter().map(|p| p.density * step).sum();
        assert!((area - 1.0).abs() < 1e-2, "area was {area}");
    }

    #[test]
    fn order_of_samples_does_not_matter() {
        let grid = linear_ticks(0.0, 1.0, 20);
        let a = estimate(&[0.1, 0.4, 0.9], &grid, 0.12).unwrap();
        let b = estimate(&[0.9, 0.1, 0.4], &grid, 0.12).unwrap();
        for (p, q) in a.iter().zip(&b) {
            assert!((p.density - q.density).abs() < 1e-12);
        }
    }

    #[test]
    fn non_positive_bandwidth_is_rejected() {
        assert_eq!(
            estimate(&[1.0], &[1.0], 0.0),
            Err(DensityError::InvalidBandwidth(0.0))
        );
        assert!(estimate(&[1.0], &[1.0], -0.5).is_err());
        assert!(estimate(&[1.0], &[1.0], f64::NAN).is_err());
    }

    #[test]
    fn ridgeline_grid_has_101_points() {
        let ticks = linear_ticks(0.0, 1.0, 80);
        assert_eq!(ticks.len(), 101);
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[1], 0.01);
        assert_eq!(ticks[100], 1.0);
    }

    #[test]
    fn fractional_ticks_are_exact_decimals() {
        let ticks = linear_ticks(0.0, 1.0, 80);
        assert_eq!(ticks[7], 0.07);
        assert_eq!(ticks[29], 0.29);
        assert_eq!(linear_ticks(0.0, 1.0, 10)[3], 0.3);
        let coarse = linear_ticks(0.0, 100.0, 10);
        assert_eq!(coarse.len(), 11);
        assert_eq!(coarse[4], 40.0);
    }

    #[test]
    fn degenerate_tick_inputs() {
        assert_eq!(linear_ticks(2.0, 2.0, 5), vec![2.0]);
        assert!(linear_ticks(0.0, 1.0, 0).is_empty());
        let reversed = linear_ticks(1.0, 0.0, 4);
        assert_eq!(reversed.first(), Some(&1.0));
    }
}
