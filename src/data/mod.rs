/// Data layer: core types, loading, filtering and density estimation.
///
/// Architecture:
/// ```text
///  bestranking / worstranking / dataset-ukrain  (.csv / .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse tables → Dataset (NaN for malformed numbers)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Observation>, shared read-only
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  filter   │ ──►  │ density  │  year range → rows → extents / KDE
///   └──────────┘      └──────────┘
/// ```

pub mod density;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::model::{Dataset, Metric, Observation, Series};

    /// Best and Worst for 2015–2024, Ukraine only for 2015–2021.
    pub fn sample_dataset() -> Dataset {
        let mut rows = Vec::new();
        for year in 2015..=2024 {
            let t = (year - 2015) as f64;
            rows.push(row(Series::Best, "Finland", year, 7.4 + t * 0.05, 0.9));
            rows.push(row(Series::Worst, "Afghanistan", year, 3.2 - t * 0.1, 0.1));
            if year <= 2021 {
                let mut ukraine = row(Series::Ukraine, "Ukraine", year, 4.5 + t * 0.1, 0.4);
                ukraine.ranking = 120.0 - t;
                ukraine.population = 44_000_000.0 - t * 500_000.0;
                rows.push(ukraine);
            }
        }
        Dataset::from_observations(rows)
    }

    fn row(series: Series, country: &str, year: i32, score: f64, norm: f64) -> Observation {
        let mut o = Observation::new(country, year, series);
        for (i, m) in Metric::ALL.into_iter().enumerate() {
            o.raw.set(m, score / (i + 1) as f64);
            o.normalized.set(m, (norm + i as f64 * 0.05).min(1.0));
        }
        o
    }
}
