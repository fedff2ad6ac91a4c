//! Writes a deterministic sample data folder for the dashboard:
//! `bestranking.csv`, `worstranking.csv` and `dataset-ukrain.csv`.
//!
//! Usage: `generate_sample [OUT_DIR]` (defaults to `data`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const METRICS: [(&str, f64, f64); 7] = [
    ("HAPPINESS SCORE", 2.0, 8.0),
    ("GDP PER CAPITA (Billions)", 0.2, 2.1),
    ("SOCIAL SUPPORT", 0.3, 1.6),
    ("HEALTHY LIFE EXPECTANCY", 0.1, 1.1),
    ("FREEDOM TO MAKE LIFE CHOICES", 0.05, 0.75),
    ("GENEROSITY", 0.0, 0.5),
    ("PERCEPTION OF CORRUPTION", 0.0, 0.55),
];
const NORMALIZED_SUFFIX: &str = " MIN-MAX NORMALIZATION";
const YEARS: std::ops::RangeInclusive<i32> = 2015..=2024;

/// SplitMix64: tiny, deterministic, good enough for sample data.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[-1, 1)`.
    fn jitter(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 52) as f64 - 1.0
    }
}

struct Row {
    year: i32,
    country: String,
    ranking: u32,
    raw: [f64; 7],
    population: Option<u64>,
}

/// `level` in `[0, 1]` places every metric inside its plausible range.
fn metrics(level: f64, rng: &mut SplitMix) -> [f64; 7] {
    METRICS.map(|(_, lo, hi)| {
        let t = (level + 0.06 * rng.jitter()).clamp(0.0, 1.0);
        lo + t * (hi - lo)
    })
}

fn best_rows(rng: &mut SplitMix) -> Vec<Row> {
    YEARS
        .map(|year| {
            let country = if year < 2018 { "Norway" } else { "Finland" };
            Row {
                year,
                country: country.to_string(),
                ranking: 1,
                raw: metrics(0.93, rng),
                population: None,
            }
        })
        .collect()
}

fn worst_rows(rng: &mut SplitMix) -> Vec<Row> {
    const WORST: [&str; 10] = [
        "Central African Republic",
        "Burundi",
        "Burundi",
        "South Sudan",
        "South Sudan",
        "Afghanistan",
        "Afghanistan",
        "Afghanistan",
        "Afghanistan",
        "Afghanistan",
    ];
    YEARS
        .zip(WORST)
        .map(|(year, country)| Row {
            year,
            country: country.to_string(),
            ranking: 150 + (year - 2015) as u32,
            raw: metrics(0.12 - 0.008 * (year - 2015) as f64, rng),
            population: None,
        })
        .collect()
}

/// Ukraine has no survey after 2022 and a population estimate until 2021.
fn ukraine_rows(rng: &mut SplitMix) -> Vec<Row> {
    YEARS
        .filter(|&year| year <= 2022)
        .map(|year| {
            let t = (year - 2015) as f64;
            Row {
                year,
                country: "Ukraine".to_string(),
                ranking: (123.0 - 4.0 * t + 3.0 * rng.jitter()).round() as u32,
                raw: metrics(0.38 + 0.02 * t, rng),
                population: (year <= 2021).then(|| 45_150_000 - 330_000 * (year - 2015) as u64),
            }
        })
        .collect()
}

/// `42150000` → `"42.150.000"`.
fn dotted(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

fn write_table(path: &Path, rows: &[Row], with_population: bool) -> Result<()> {
    let mut extents = [(f64::INFINITY, f64::NEG_INFINITY); 7];
    for row in rows {
        for (e, v) in extents.iter_mut().zip(row.raw) {
            *e = (e.0.min(v), e.1.max(v));
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["YEAR".to_string(), "COUNTRY".to_string(), "RANKING".to_string()];
    header.extend(METRICS.iter().map(|(name, _, _)| name.to_string()));
    header.extend(METRICS.iter().map(|(name, _, _)| format!("{name}{NORMALIZED_SUFFIX}")));
    if with_population {
        header.push("POPULATION".to_string());
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.year.to_string(), row.country.clone(), row.ranking.to_string()];
        record.extend(row.raw.iter().map(|v| format!("{v:.3}")));
        record.extend(row.raw.iter().zip(&extents).map(|(v, (lo, hi))| {
            let norm = if hi > lo { (v - lo) / (hi - lo) } else { 0.0 };
            format!("{norm:.4}")
        }));
        if with_population {
            record.push(row.population.map(dotted).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SplitMix(2024);
    let tables = [
        ("bestranking.csv", best_rows(&mut rng), false),
        ("worstranking.csv", worst_rows(&mut rng), false),
        ("dataset-ukrain.csv", ukraine_rows(&mut rng), true),
    ];
    for (name, rows, with_population) in &tables {
        let path = out_dir.join(name);
        write_table(&path, rows, *with_population)?;
        println!("Wrote {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}
