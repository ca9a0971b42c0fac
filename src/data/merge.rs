//! Builds a yearly dataset from two wide tables: prices with one column per
//! year and one row per region, and an indicator table with one column per
//! year whose rows are labelled series (only the benchmark-rate row is used).

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::data::loader::{
    LoadError, LoadReport, csv_reader, normalize_text, open, parse_number, parse_year,
};
use crate::data::observation::{Dataset, Granularity, Observation, Period};

pub const DEFAULT_RATE_PATTERNS: &[&str] = &["기준금리", "base rate"];

/// Column indices of headers that parse as a year, skipping the label column.
fn year_columns(headers: &csv::StringRecord) -> Vec<(usize, i32)> {
    headers
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(idx, h)| parse_year(h).map(|year| (idx, year)))
        .collect()
}

fn label_matches(label: &str, patterns: &[String]) -> bool {
    let label = normalize_text(label).to_lowercase();
    patterns
        .iter()
        .any(|p| label.contains(&normalize_text(p).to_lowercase()))
}

/// Melt the rate table into year -> rate using the rows whose label matches.
pub fn melt_rates<R: Read>(reader: R, patterns: &[String]) -> Result<BTreeMap<i32, f64>, LoadError> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = year_columns(&headers);
    let pattern_text = patterns.join(" | ");

    let mut rates: BTreeMap<i32, f64> = BTreeMap::new();
    let mut matched_rows = 0usize;

    for record in reader.records() {
        let record = record?;
        if !label_matches(record.get(0).unwrap_or(""), patterns) {
            continue;
        }
        matched_rows += 1;

        for &(idx, year) in &columns {
            let Some(rate) = record.get(idx).and_then(parse_number) else {
                continue;
            };
            if rates.insert(year, rate).is_some() {
                return Err(LoadError::AmbiguousRate {
                    pattern: pattern_text,
                    year,
                });
            }
        }
    }

    if matched_rows == 0 {
        return Err(LoadError::NoRateRows {
            pattern: pattern_text,
        });
    }
    tracing::debug!(rows = matched_rows, years = rates.len(), "melted rate table");
    Ok(rates)
}

/// Melt the price table and join it with the rates on year.
pub fn merge_wide<P: Read, R: Read>(
    prices: P,
    rates: R,
    patterns: &[String],
) -> Result<(Dataset, LoadReport), LoadError> {
    let rates = melt_rates(rates, patterns)?;

    let mut reader = csv_reader(prices);
    let headers = reader.headers()?.clone();
    let columns = year_columns(&headers);
    if columns.is_empty() {
        return Err(LoadError::NoYearColumns);
    }

    let mut observations = Vec::new();
    let mut report = LoadReport::default();

    for record in reader.records() {
        let record = record?;
        let region = normalize_text(record.get(0).unwrap_or(""));

        for &(idx, year) in &columns {
            let price = record.get(idx).and_then(parse_number);
            match (region.is_empty(), price, rates.get(&year)) {
                (false, Some(price), Some(&rate)) => {
                    observations.push(Observation::new(&*region, Period::Year(year), rate, price));
                    report.loaded += 1;
                }
                _ => report.skipped += 1,
            }
        }
    }

    if observations.is_empty() {
        return Err(LoadError::NoObservations);
    }

    tracing::info!(
        loaded = report.loaded,
        skipped = report.skipped,
        "merged wide price and rate tables"
    );
    Ok((Dataset::new(observations, Granularity::Yearly), report))
}

pub fn merge_wide_paths(
    prices: &Path,
    rates: &Path,
    patterns: &[String],
) -> Result<(Dataset, LoadReport), LoadError> {
    merge_wide(open(prices)?, open(rates)?, patterns)
}
