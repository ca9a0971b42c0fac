use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Yearly,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }
}

/// A calendar month (stored as its first day) or a calendar year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Period {
    Month(NaiveDate),
    Year(i32),
}

impl Period {
    pub fn month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period::Month)
    }

    pub fn year(&self) -> i32 {
        match self {
            Period::Month(date) => date.year(),
            Period::Year(year) => *year,
        }
    }

    /// Monotone x coordinate for charts. Months are spaced 1/12 apart.
    pub fn ordinal(&self) -> f64 {
        match self {
            Period::Month(date) => date.year() as f64 + date.month0() as f64 / 12.0,
            Period::Year(year) => *year as f64,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Period::Month(date) => date.format("%Y-%m").to_string(),
            Period::Year(year) => year.to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub region: String,
    pub period: Period,
    pub rate: f64,
    pub price: f64,
}

impl Observation {
    pub fn new(region: impl Into<String>, period: Period, rate: f64, price: f64) -> Self {
        Self {
            region: region.into(),
            period,
            rate,
            price,
        }
    }
}

/// The immutable, fully loaded table. Observations are sorted by (region, period).
#[derive(Clone, Debug)]
pub struct Dataset {
    observations: Vec<Observation>,
    granularity: Granularity,
}

impl Dataset {
    pub fn new(mut observations: Vec<Observation>, granularity: Granularity) -> Self {
        observations.sort_by(|a, b| a.region.cmp(&b.region).then(a.period.cmp(&b.period)));
        Self {
            observations,
            granularity,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = self.observations.iter().map(|o| o.region.clone()).collect();
        regions.dedup();
        regions
    }

    pub fn periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = self.observations.iter().map(|o| o.period).collect();
        periods.sort();
        periods.dedup();
        periods
    }
}

/// Time-ordered observations of a single region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| a.period.cmp(&b.period));
        Self { observations }
    }

    /// Observations of `region` whose period lies within `[start, end]`.
    pub fn select(observations: &[Observation], region: &str, start: Period, end: Period) -> Self {
        Self::new(
            observations
                .iter()
                .filter(|o| o.region == region && o.period >= start && o.period <= end)
                .cloned()
                .collect(),
        )
    }

    pub fn with_year_floor(self, floor: i32) -> Self {
        Self {
            observations: self
                .observations
                .into_iter()
                .filter(|o| o.period.year() >= floor)
                .collect(),
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rate).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.price).collect()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.observations.first().map(|o| o.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.observations.last().map(|o| o.period)
    }
}

impl From<Vec<Observation>> for Series {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}
