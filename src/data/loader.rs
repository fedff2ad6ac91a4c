use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Metric, Observation, Series};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Extensions tried, in order, when looking up a table inside a data folder.
const TABLE_EXTENSIONS: [&str; 4] = ["csv", "json", "parquet", "pq"];

/// Outcome of loading a data folder: whatever loaded, plus per-table failures.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub dataset: Dataset,
    pub failures: Vec<TableFailure>,
}

/// A table that could not be loaded. The other tables are unaffected.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFailure {
    pub series: Series,
    pub message: String,
}

impl LoadReport {
    /// One-line summary for the status bar, `None` when everything loaded.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.series, f.message))
            .collect();
        Some(format!("Failed to load {}", parts.join("; ")))
    }
}

/// Load the best, worst and Ukraine tables from `dir`.
///
/// Each table loads independently: a missing or malformed table is logged,
/// recorded in [`LoadReport::failures`] and skipped.
pub fn load_dir(dir: &Path) -> LoadReport {
    let mut observations = Vec::new();
    let mut failures = Vec::new();

    for series in Series::ALL {
        let result = find_table(dir, series).and_then(|path| load_table(&path, series));
        match result {
            Ok(rows) => {
                log::info!("Loaded {} {series} rows from {}", rows.len(), dir.display());
                observations.extend(rows);
            }
            Err(e) => {
                log::error!("Failed to load {series} table: {e:#}");
                failures.push(TableFailure {
                    series,
                    message: format!("{e:#}"),
                });
            }
        }
    }

    LoadReport {
        dataset: Dataset::from_observations(observations),
        failures,
    }
}

/// Locate the file for `series` in `dir`, trying every supported extension.
fn find_table(dir: &Path, series: Series) -> Result<PathBuf> {
    let stem = Path::new(series.file_name())
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    TABLE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .with_context(|| format!("no {stem}.{{csv,json,parquet}} in {}", dir.display()))
}

/// Load one table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per line
/// * `.json`    – `[{ "YEAR": 2015, "Country": "...", ... }, ...]`
/// * `.parquet` – flat columns with the same names as the CSV headers
pub fn load_table(path: &Path, series: Series) -> Result<Vec<Observation>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file, series)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text, series)
        }
        "parquet" | "pq" => load_parquet(path, series),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Column classification shared by every format
// ---------------------------------------------------------------------------

/// What a source column holds.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Year,
    Country,
    Ranking,
    Population,
    Raw(Metric),
    Normalized(Metric),
}

/// Match a header case-insensitively against the known columns.
fn classify(header: &str) -> Option<Field> {
    let key = header.trim().to_ascii_uppercase();
    match key.as_str() {
        "YEAR" => return Some(Field::Year),
        "COUNTRY" => return Some(Field::Country),
        "RANKING" => return Some(Field::Ranking),
        "POPULATION" => return Some(Field::Population),
        _ => {}
    }
    Metric::ALL.into_iter().find_map(|m| {
        if key == m.raw_column().to_ascii_uppercase() {
            Some(Field::Raw(m))
        } else if key == m.normalized_column().to_ascii_uppercase() {
            Some(Field::Normalized(m))
        } else {
            None
        }
    })
}

/// Build an observation from classified cells. Returns `None` when the row
/// has no usable year.
fn build_observation<'a>(
    series: Series,
    cells: impl IntoIterator<Item = (Field, &'a str)>,
) -> Option<Observation> {
    let mut obs = Observation::new("N/A", 0, series);
    let mut year = None;

    for (field, text) in cells {
        match field {
            Field::Year => year = parse_year(text),
            Field::Country => {
                let name = text.trim();
                if !name.is_empty() {
                    obs.country = name.to_string();
                }
            }
            Field::Ranking => obs.ranking = coerce_number(text),
            Field::Population => obs.population = parse_population(text),
            Field::Raw(m) => obs.raw.set(m, coerce_number(text)),
            Field::Normalized(m) => obs.normalized.set(m, coerce_number(text)),
        }
    }

    obs.year = year?;
    Some(obs)
}

/// Numeric coercion: blank or unparsable text becomes NaN.
pub fn coerce_number(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Years may arrive as `2019` or `2019.0`.
fn parse_year(s: &str) -> Option<i32> {
    let v = coerce_number(s);
    (v.is_finite() && v.fract() == 0.0).then_some(v as i32)
}

/// Population figures use dots as thousands separators (`42.000.000`).
/// A single dot followed by anything other than three digits is a decimal point.
pub fn parse_population(s: &str) -> f64 {
    let s = s.trim();
    let groups: Vec<&str> = s.split('.').collect();
    let grouped = groups.len() > 1
        && groups[1..]
            .iter()
            .all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()));
    if grouped {
        coerce_number(&groups.concat())
    } else {
        coerce_number(s)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per record.
/// Unknown columns are ignored; `YEAR` and `Country` are required.
pub fn read_csv<R: Read>(reader: R, series: Series) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let fields: Vec<Option<Field>> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(classify)
        .collect();

    if !fields.contains(&Some(Field::Year)) {
        bail!("CSV missing 'YEAR' column");
    }
    if !fields.contains(&Some(Field::Country)) {
        bail!("CSV missing 'Country' column");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = fields
            .iter()
            .zip(record.iter())
            .filter_map(|(field, text)| field.map(|f| (f, text)));
        match build_observation(series, cells) {
            Some(obs) => rows.push(obs),
            None => log::warn!("{series} CSV row {row_no}: no valid YEAR, skipped"),
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "YEAR": 2015, "Country": "Switzerland", "HAPPINESS SCORE": 7.587 },
///   ...
/// ]
/// ```
pub fn read_json(text: &str, series: Series) -> Result<Vec<Observation>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let cells: Vec<(Field, String)> = obj
            .iter()
            .filter_map(|(key, val)| classify(key).map(|f| (f, json_to_text(val))))
            .collect();

        match build_observation(series, cells.iter().map(|(f, t)| (*f, t.as_str()))) {
            Some(obs) => rows.push(obs),
            None => log::warn!("{series} JSON row {i}: no valid YEAR, skipped"),
        }
    }
    Ok(rows)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per CSV header.
fn load_parquet(path: &Path, series: Series) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns: Vec<(usize, Field)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter_map(|(i, f)| classify(f.name()).map(|field| (i, field)))
            .collect();

        if !columns.iter().any(|(_, f)| *f == Field::Year) {
            bail!("Parquet file missing 'YEAR' column");
        }
        if !columns.iter().any(|(_, f)| *f == Field::Country) {
            bail!("Parquet file missing 'Country' column");
        }

        for row in 0..batch.num_rows() {
            let cells: Vec<(Field, String)> = columns
                .iter()
                .map(|(i, field)| (*field, extract_cell(batch.column(*i), row)))
                .collect();
            match build_observation(series, cells.iter().map(|(f, t)| (*f, t.as_str()))) {
                Some(obs) => rows.push(obs),
                None => log::warn!("{series} parquet row {row}: no valid YEAR, skipped"),
            }
        }
    }

    Ok(rows)
}

/// Render a single Arrow cell as text so it goes through the same coercion
/// as CSV input. Nulls become the empty string.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string())
            .unwrap_or_default(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| a.value(row).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UKRAINE_CSV: &str = "\
YEAR,Country,RANKING,HAPPINESS SCORE,HAPPINESS SCORE MIN-MAX NORMALIZATION,GENEROSITY,POPULATION
2015,Ukraine,111,4.681,0.12,0.19,45.154.000
2016,Ukraine,123,abc,0.05,,44.000.000
bad,Ukraine,130,4.0,0.0,0.1,1
";

    #[test]
    fn csv_rows_coerce_malformed_numbers_to_nan() {
        let rows = read_csv(UKRAINE_CSV.as_bytes(), Series::Ukraine).unwrap();
        assert_eq!(rows.len(), 2, "row without a valid year is skipped");

        let first = &rows[0];
        assert_eq!(first.year, 2015);
        assert_eq!(first.country, "Ukraine");
        assert_eq!(first.ranking, 111.0);
        assert_eq!(first.raw.get(Metric::Happiness), 4.681);
        assert_eq!(first.normalized.get(Metric::Happiness), 0.12);
        assert_eq!(first.population, 45_154_000.0);

        let second = &rows[1];
        assert!(second.happiness().is_nan());
        assert!(second.raw.get(Metric::Generosity).is_nan());
        assert!(second.raw.get(Metric::Gdp).is_nan(), "absent column is NaN");
    }

    #[test]
    fn headers_match_case_insensitively() {
        let csv = "year,COUNTRY,happiness score\n2020,Finland,7.8\n";
        let rows = read_csv(csv.as_bytes(), Series::Best).unwrap();
        assert_eq!(rows[0].country, "Finland");
        assert_eq!(rows[0].happiness(), 7.8);
    }

    #[test]
    fn csv_without_year_column_is_rejected() {
        let err = read_csv("Country,RANKING\nFinland,1\n".as_bytes(), Series::Best).unwrap_err();
        assert!(err.to_string().contains("YEAR"));
    }

    #[test]
    fn blank_country_becomes_sentinel() {
        let rows = read_csv("YEAR,Country\n2017,\n".as_bytes(), Series::Worst).unwrap();
        assert_eq!(rows[0].country, "N/A");
    }

    #[test]
    fn population_parsing_handles_grouping_and_decimals() {
        assert_eq!(parse_population("41.000.000"), 41_000_000.0);
        assert_eq!(parse_population("1234.5"), 1234.5);
        assert_eq!(parse_population("38000000"), 38_000_000.0);
        assert!(parse_population("").is_nan());
    }

    #[test]
    fn json_records_load() {
        let text = r#"[
            {"YEAR": 2019, "Country": "South Sudan", "HAPPINESS SCORE": 2.85},
            {"YEAR": null, "Country": "South Sudan"}
        ]"#;
        let rows = read_json(text, Series::Worst).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2019);
        assert_eq!(rows[0].happiness(), 2.85);
    }

    #[test]
    fn parquet_table_loads() {
        use arrow::datatypes::{Field as ArrowField, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("YEAR", DataType::Int64, false),
            ArrowField::new("Country", DataType::Utf8, false),
            ArrowField::new("HAPPINESS SCORE", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2021, 2022])),
                Arc::new(StringArray::from(vec!["Finland", "Finland"])),
                Arc::new(Float64Array::from(vec![Some(7.84), None])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!(
            "happiness-dashboard-{}-bestranking.parquet",
            std::process::id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = load_table(&path, Series::Best).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2021);
        assert_eq!(rows[0].happiness(), 7.84);
        assert!(rows[1].happiness().is_nan());
    }

    #[test]
    fn load_dir_isolates_failing_tables() {
        let dir = std::env::temp_dir().join(format!("happiness-dashboard-dir-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bestranking.csv"), "YEAR,Country\n2015,Switzerland\n").unwrap();
        std::fs::write(dir.join("worstranking.csv"), "Country\nTogo\n").unwrap();

        let report = load_dir(&dir);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(report.dataset.len(), 1);
        let failed: Vec<Series> = report.failures.iter().map(|f| f.series).collect();
        assert_eq!(failed, vec![Series::Worst, Series::Ukraine]);
        assert!(report.failure_summary().is_some());
    }
}
