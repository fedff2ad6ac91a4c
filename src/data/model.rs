use std::fmt;

// ---------------------------------------------------------------------------
// Metric – one of the seven happiness indicators
// ---------------------------------------------------------------------------

/// A happiness indicator. Every source table carries a raw column and a
/// min-max normalized column for each metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Happiness,
    Gdp,
    SocialSupport,
    HealthyLife,
    Freedom,
    Generosity,
    Corruption,
}

/// Suffix appended to a raw column name to get its normalized column.
const NORMALIZED_SUFFIX: &str = " MIN-MAX NORMALIZATION";

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Happiness,
        Metric::Gdp,
        Metric::SocialSupport,
        Metric::HealthyLife,
        Metric::Freedom,
        Metric::Generosity,
        Metric::Corruption,
    ];

    /// Position of the metric inside [`MetricValues`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Raw CSV column header.
    pub fn raw_column(self) -> &'static str {
        match self {
            Metric::Happiness => "HAPPINESS SCORE",
            Metric::Gdp => "GDP PER CAPITA (Billions)",
            Metric::SocialSupport => "SOCIAL SUPPORT",
            Metric::HealthyLife => "HEALTHY LIFE EXPECTANCY",
            Metric::Freedom => "FREEDOM TO MAKE LIFE CHOICES",
            Metric::Generosity => "GENEROSITY",
            Metric::Corruption => "PERCEPTION OF CORRUPTION",
        }
    }

    /// Normalized CSV column header, e.g. `"GENEROSITY MIN-MAX NORMALIZATION"`.
    pub fn normalized_column(self) -> String {
        format!("{}{NORMALIZED_SUFFIX}", self.raw_column())
    }

    /// Short label for legends and axes.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Happiness => "Happiness",
            Metric::Gdp => "GDP per Capita",
            Metric::SocialSupport => "Social Support",
            Metric::HealthyLife => "Healthy Life",
            Metric::Freedom => "Freedom",
            Metric::Generosity => "Generosity",
            Metric::Corruption => "Corruption",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per [`Metric`], indexed by [`Metric::index`]. Missing values are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValues([f64; 7]);

impl Default for MetricValues {
    fn default() -> Self {
        MetricValues([f64::NAN; 7])
    }
}

impl MetricValues {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.0[metric.index()] = value;
    }
}

// ---------------------------------------------------------------------------
// Series – which source table a row came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Series {
    Best,
    Worst,
    Ukraine,
}

impl Series {
    pub const ALL: [Series; 3] = [Series::Best, Series::Worst, Series::Ukraine];

    pub fn label(self) -> &'static str {
        match self {
            Series::Best => "Best",
            Series::Worst => "Worst",
            Series::Ukraine => "Ukraine",
        }
    }

    /// Default file name of the table inside the data folder.
    pub fn file_name(self) -> &'static str {
        match self {
            Series::Best => "bestranking.csv",
            Series::Worst => "worstranking.csv",
            Series::Ukraine => "dataset-ukrain.csv",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of a source table
// ---------------------------------------------------------------------------

/// One (country, year) record.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    pub series: Series,
    /// World ranking position; NaN when the table has no `RANKING` column.
    pub ranking: f64,
    pub raw: MetricValues,
    pub normalized: MetricValues,
    /// Head count; only the Ukraine table carries it.
    pub population: f64,
}

impl Observation {
    pub fn new(country: impl Into<String>, year: i32, series: Series) -> Self {
        Observation {
            country: country.into(),
            year,
            series,
            ranking: f64::NAN,
            raw: MetricValues::default(),
            normalized: MetricValues::default(),
            population: f64::NAN,
        }
    }

    pub fn happiness(&self) -> f64 {
        self.raw.get(Metric::Happiness)
    }
}

// ---------------------------------------------------------------------------
// Dataset – all observations of every series
// ---------------------------------------------------------------------------

/// The loaded dataset. Immutable once built; charts share it behind an `Rc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub observations: Vec<Observation>,
}

impl Dataset {
    /// Build a dataset, ordering rows by series then year.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| (a.series, a.year).cmp(&(b.series, b.year)));
        Dataset { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rows of a single series, in year order.
    pub fn series(&self, series: Series) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.series == series)
    }

    /// Sorted, de-duplicated years present in any series.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.observations.iter().map(|o| o.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_column_appends_suffix() {
        assert_eq!(
            Metric::Gdp.normalized_column(),
            "GDP PER CAPITA (Billions) MIN-MAX NORMALIZATION"
        );
    }

    #[test]
    fn metric_values_default_to_nan() {
        let values = MetricValues::default();
        assert!(Metric::ALL.iter().all(|m| values.get(*m).is_nan()));
    }

    #[test]
    fn dataset_orders_rows_and_lists_years() {
        let ds = Dataset::from_observations(vec![
            Observation::new("Ukraine", 2020, Series::Ukraine),
            Observation::new("Finland", 2018, Series::Best),
            Observation::new("Finland", 2016, Series::Best),
        ]);
        let years: Vec<i32> = ds.series(Series::Best).map(|o| o.year).collect();
        assert_eq!(years, vec![2016, 2018]);
        assert_eq!(ds.years(), vec![2016, 2018, 2020]);
    }

    #[test]
    fn empty_dataset_has_no_years() {
        assert!(Dataset::default().years().is_empty());
    }
}
