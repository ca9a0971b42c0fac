//! Long-form CSV ingestion.
//!
//! Source files come from spreadsheets exported on different platforms, so
//! header names are matched loosely: a UTF-8 BOM is dropped, text is brought
//! to Unicode NFC (Hangul exported on macOS is often decomposed), and ASCII
//! letters are lowercased before comparing against the known aliases.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use icu_normalizer::ComposingNormalizerBorrowed;
use thiserror::Error;

use crate::data::observation::{Dataset, Granularity, Observation, Period};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' not found (headers: {available})")]
    MissingColumn {
        column: &'static str,
        available: String,
    },

    #[error("no usable rows: every row was missing a region, period, rate or price")]
    NoObservations,

    #[error("price table has no year columns")]
    NoYearColumns,

    #[error("no rate rows match '{pattern}'")]
    NoRateRows { pattern: String },

    #[error("more than one rate row matching '{pattern}' has a value for {year}")]
    AmbiguousRate { pattern: String, year: i32 },
}

/// Summary of one ingestion pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    Region,
    Date,
    Year,
    Rate,
    Price,
}

impl Column {
    fn name(self) -> &'static str {
        match self {
            Column::Region => "region",
            Column::Date => "date",
            Column::Year => "year",
            Column::Rate => "rate",
            Column::Price => "price",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Region => &["지역", "지역명", "region"],
            Column::Date => &["날짜", "년월", "date", "month"],
            Column::Year => &["연도", "년도", "year"],
            Column::Rate => &["기준금리", "rate", "base_rate"],
            Column::Price => &["평균가격", "평균매매가격", "price", "avg_price"],
        }
    }

    fn find(self, headers: &[String]) -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| self.aliases().contains(&h.as_str()))
            .ok_or_else(|| LoadError::MissingColumn {
                column: self.name(),
                available: headers.join(", "),
            })
    }
}

/// NFC-normalize and trim a cell, dropping any BOM.
pub fn normalize_text(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    ComposingNormalizerBorrowed::new_nfc().normalize(trimmed)
}

pub fn normalize_header(raw: &str) -> String {
    normalize_text(raw).to_ascii_lowercase()
}

/// Parse a numeric cell such as `1,234.5` or `3.25%`. Empty or non-finite values are missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a month in any of the spreadsheet date shapes we have seen.
pub fn parse_month(raw: &str) -> Option<Period> {
    let text = normalize_text(raw);
    let text = text.as_ref();

    if let Some((year, rest)) = text.split_once('년') {
        let month = rest.trim().trim_end_matches('월').trim();
        return Period::month(year.trim().parse().ok()?, month.parse().ok()?);
    }

    let date_part = text.split(|c: char| c.is_whitespace() || c == 'T').next()?;
    if date_part.chars().all(|c| c.is_ascii_digit()) {
        return match date_part.len() {
            6 | 8 => Period::month(date_part[..4].parse().ok()?, date_part[4..6].parse().ok()?),
            _ => None,
        };
    }

    let mut parts = date_part.split(['-', '/', '.']);
    let year = parts.next()?.trim().parse().ok()?;
    let month = parts.next()?.trim().parse().ok()?;
    Period::month(year, month)
}

pub fn parse_year(raw: &str) -> Option<i32> {
    let text = normalize_text(raw);
    let bare = text.trim_end_matches('년').trim();
    match bare.parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) => parse_month(bare).map(|p| p.year()),
    }
}

pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Load a long-form file with one row per (region, period).
pub fn load_long_csv<R: Read>(
    reader: R,
    granularity: Granularity,
) -> Result<(Dataset, LoadReport), LoadError> {
    let mut reader = csv_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

    let region_idx = Column::Region.find(&headers)?;
    let period_idx = match granularity {
        Granularity::Monthly => Column::Date.find(&headers)?,
        Granularity::Yearly => Column::Year.find(&headers)?,
    };
    let rate_idx = Column::Rate.find(&headers)?;
    let price_idx = Column::Price.find(&headers)?;

    let mut observations = Vec::new();
    let mut report = LoadReport::default();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let region = normalize_text(field(region_idx));
        let period = match granularity {
            Granularity::Monthly => parse_month(field(period_idx)),
            Granularity::Yearly => parse_year(field(period_idx)).map(Period::Year),
        };
        let rate = parse_number(field(rate_idx));
        let price = parse_number(field(price_idx));

        match (region.is_empty(), period, rate, price) {
            (false, Some(period), Some(rate), Some(price)) => {
                observations.push(Observation::new(region.into_owned(), period, rate, price));
                report.loaded += 1;
            }
            _ => {
                tracing::debug!(row = line + 2, "skipping row with missing or malformed values");
                report.skipped += 1;
            }
        }
    }

    if observations.is_empty() {
        return Err(LoadError::NoObservations);
    }

    tracing::info!(
        loaded = report.loaded,
        skipped = report.skipped,
        granularity = granularity.as_str(),
        "loaded long-form dataset"
    );
    Ok((Dataset::new(observations, granularity), report))
}

pub fn load_long_csv_path(
    path: &Path,
    granularity: Granularity,
) -> Result<(Dataset, LoadReport), LoadError> {
    load_long_csv(open(path)?, granularity)
}
