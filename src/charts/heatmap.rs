use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::{extent, rows_in_range};
use crate::data::model::{Dataset, Metric, Observation, Series};
use crate::selection::YearRange;

/// A heatmap row: the ranking or one raw metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatParam {
    Ranking,
    Metric(Metric),
}

impl HeatParam {
    pub fn all() -> Vec<HeatParam> {
        std::iter::once(HeatParam::Ranking)
            .chain(Metric::ALL.into_iter().map(HeatParam::Metric))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeatParam::Ranking => "Ranking",
            HeatParam::Metric(m) => m.label(),
        }
    }

    fn value(&self, o: &Observation) -> f64 {
        match self {
            HeatParam::Ranking => o.ranking,
            HeatParam::Metric(m) => o.raw.get(*m),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub year: i32,
    pub param: HeatParam,
    pub value: f64,
    /// `value` scaled into `[0, 1]` by the row's full-table extent; NaN when
    /// the value is missing.
    pub intensity: f64,
}

/// Ukraine indicators per year, colored row by row.
#[derive(Debug)]
pub struct Heatmap {
    dataset: Rc<Dataset>,
    params: Vec<HeatParam>,
    /// Row extents over the whole table, so colors stay stable across ranges.
    row_extents: Vec<Option<(f64, f64)>>,
    last_range: Option<YearRange>,
    pub years: Vec<i32>,
    pub cells: Vec<HeatCell>,
}

impl Heatmap {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        let params = HeatParam::all();
        let row_extents = params
            .iter()
            .map(|p| extent(dataset.series(Series::Ukraine).map(|o| p.value(o))))
            .collect();
        Heatmap {
            dataset,
            params,
            row_extents,
            last_range: None,
            years: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn params(&self) -> &[HeatParam] {
        &self.params
    }

    pub fn cell(&self, year: i32, param: HeatParam) -> Option<&HeatCell> {
        self.cells.iter().find(|c| c.year == year && c.param == param)
    }
}

/// Scale into `[0, 1]`; a constant row maps to 0.
fn intensity(value: f64, extent: Option<(f64, f64)>) -> f64 {
    match extent {
        Some(_) if !value.is_finite() => f64::NAN,
        Some((lo, hi)) if hi > lo => (value - lo) / (hi - lo),
        Some(_) => 0.0,
        None => f64::NAN,
    }
}

impl RangeChart for Heatmap {
    fn title(&self) -> &str {
        "Ukraine indicators heatmap"
    }

    fn render(&mut self, range: YearRange) {
        let rows = rows_in_range(&self.dataset, Series::Ukraine, range);
        self.years = rows.iter().map(|o| o.year).collect();
        self.cells = rows
            .iter()
            .flat_map(|o| {
                self.params
                    .iter()
                    .zip(&self.row_extents)
                    .map(move |(param, ext)| {
                        let value = param.value(o);
                        HeatCell {
                            year: o.year,
                            param: *param,
                            value,
                            intensity: intensity(value, *ext),
                        }
                    })
            })
            .collect();
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    #[test]
    fn cells_cover_every_year_and_parameter() {
        let mut map = Heatmap::new(Rc::new(sample_dataset()));
        map.render(YearRange::new(2016, 2018).unwrap());
        assert_eq!(map.years, vec![2016, 2017, 2018]);
        assert_eq!(map.cells.len(), 3 * 8);
    }

    #[test]
    fn intensity_uses_full_table_extent() {
        let mut map = Heatmap::new(Rc::new(sample_dataset()));
        map.render(YearRange::new(2015, 2024).unwrap());
        let first = map.cell(2015, HeatParam::Ranking).unwrap();
        let last = map.cell(2021, HeatParam::Ranking).unwrap();
        assert_eq!(first.intensity, 1.0);
        assert_eq!(last.intensity, 0.0);

        // Narrowing the range must not re-scale the colors.
        map.render(YearRange::new(2015, 2016).unwrap());
        assert_eq!(map.cell(2015, HeatParam::Ranking).unwrap().intensity, 1.0);
    }

    #[test]
    fn constant_and_missing_values() {
        assert_eq!(intensity(3.0, Some((3.0, 3.0))), 0.0);
        assert!(intensity(f64::NAN, Some((0.0, 1.0))).is_nan());
        assert!(intensity(1.0, None).is_nan());
    }

    #[test]
    fn no_ukraine_rows_gives_empty_heatmap() {
        let mut map = Heatmap::new(Rc::new(sample_dataset()));
        map.render(YearRange::new(2023, 2024).unwrap());
        assert_eq!(map.shape_count(), 0);
        assert!(map.years.is_empty());
    }
}
