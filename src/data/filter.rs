use std::collections::BTreeMap;

use super::model::{Dataset, Metric, Observation, Series};
use crate::selection::YearRange;

// ---------------------------------------------------------------------------
// Year-range filtering shared by every chart
// ---------------------------------------------------------------------------

/// Rows of `series` whose year lies in `range` (inclusive), in year order.
pub fn rows_in_range<'a>(
    dataset: &'a Dataset,
    series: Series,
    range: YearRange,
) -> Vec<&'a Observation> {
    dataset
        .series(series)
        .filter(|o| range.contains(o.year))
        .collect()
}

/// Rows of every series whose year lies in `range`.
pub fn all_rows_in_range(dataset: &Dataset, range: YearRange) -> Vec<&Observation> {
    dataset
        .observations
        .iter()
        .filter(|o| range.contains(o.year))
        .collect()
}

/// `(min, max)` over the finite values, or `None` when there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Largest finite value, or `None`.
pub fn max_finite(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    extent(values).map(|(_, hi)| hi)
}

/// Arithmetic mean over the finite values, or `None`.
pub fn mean_finite(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Median over the finite values, or `None`.
pub fn median_finite(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut v: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    })
}

// ---------------------------------------------------------------------------
// Cross-series merge keyed by year
// ---------------------------------------------------------------------------

/// One series' value for a given year. Missing rows carry NaN and `"N/A"`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesValue {
    pub series: Series,
    pub country: String,
    pub value: f64,
}

impl SeriesValue {
    pub fn is_valid(&self) -> bool {
        self.value.is_finite()
    }
}

/// All series side by side for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub values: Vec<SeriesValue>,
}

/// Merge the three series by year for `metric`.
///
/// Years come from the `Best` table; a series with no row for that year
/// contributes a NaN gap instead of being dropped.
pub fn merge_by_year(dataset: &Dataset, metric: Metric, range: YearRange) -> Vec<YearGroup> {
    let lookup: BTreeMap<(Series, i32), &Observation> = all_rows_in_range(dataset, range)
        .into_iter()
        .map(|o| ((o.series, o.year), o))
        .collect();

    rows_in_range(dataset, Series::Best, range)
        .into_iter()
        .map(|best| YearGroup {
            year: best.year,
            values: Series::ALL
                .iter()
                .map(|&series| match lookup.get(&(series, best.year)) {
                    Some(o) => SeriesValue {
                        series,
                        country: o.country.clone(),
                        value: o.raw.get(metric),
                    },
                    None => SeriesValue {
                        series,
                        country: "N/A".to_string(),
                        value: f64::NAN,
                    },
                })
                .collect(),
        })
        .collect()
}
