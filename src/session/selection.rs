use crate::config::Config;
use crate::data::observation::{Dataset, Period};
use crate::engine::{FeatureDegree, Weighting};

pub const MIN_RATE: f64 = 0.0;
pub const MAX_RATE: f64 = 10.0;
pub const MAX_LAG: usize = 12;
/// Rate slider resolution: one step is 0.1 percentage points.
const RATE_STEPS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Region,
    Start,
    End,
    Rate,
    Lag,
    Degree,
    Weighting,
}

impl Control {
    pub const ALL: [Control; 7] = [
        Control::Region,
        Control::Start,
        Control::End,
        Control::Rate,
        Control::Lag,
        Control::Degree,
        Control::Weighting,
    ];
}

/// The user's current inputs. Every field stays inside the range its control allows.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    regions: Vec<String>,
    periods: Vec<Period>,
    region_idx: usize,
    start_idx: usize,
    end_idx: usize,
    rate_tenths: u32,
    pub lag: usize,
    pub degree: FeatureDegree,
    pub weighting: Weighting,
    pub year_floor: Option<i32>,
}

impl Selection {
    pub fn new(dataset: &Dataset, config: &Config) -> Self {
        let periods = dataset.periods();
        Self {
            regions: dataset.regions(),
            end_idx: periods.len().saturating_sub(1),
            periods,
            region_idx: 0,
            start_idx: 0,
            rate_tenths: to_tenths(config.default_rate),
            lag: config.lag_for(dataset.granularity()).min(MAX_LAG),
            degree: config.degree,
            weighting: config.weighting,
            year_floor: config.year_floor,
        }
    }

    /// Re-anchor onto a reloaded dataset, keeping the region and range by value when they still exist.
    pub fn rebase(&mut self, dataset: &Dataset) {
        let region = self.region().map(str::to_string);
        let (start, end) = (self.start(), self.end());

        self.regions = dataset.regions();
        self.periods = dataset.periods();
        let last = self.periods.len().saturating_sub(1);

        self.region_idx = region
            .and_then(|r| self.regions.iter().position(|x| *x == r))
            .unwrap_or(0);
        self.start_idx = start
            .and_then(|p| self.periods.iter().position(|x| *x == p))
            .unwrap_or(0);
        self.end_idx = end
            .and_then(|p| self.periods.iter().position(|x| *x == p))
            .unwrap_or(last)
            .max(self.start_idx);
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn region(&self) -> Option<&str> {
        self.regions.get(self.region_idx).map(String::as_str)
    }

    pub fn start(&self) -> Option<Period> {
        self.periods.get(self.start_idx).copied()
    }

    pub fn end(&self) -> Option<Period> {
        self.periods.get(self.end_idx).copied()
    }

    pub fn rate(&self) -> f64 {
        self.rate_tenths as f64 / 10.0
    }

    pub fn select_region(&mut self, name: &str) -> bool {
        match self.regions.iter().position(|r| r == name) {
            Some(idx) => {
                self.region_idx = idx;
                true
            }
            None => false,
        }
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate_tenths = to_tenths(rate);
    }

    pub fn set_lag(&mut self, lag: usize) {
        self.lag = lag.min(MAX_LAG);
    }

    /// Set the inclusive range by period value, snapping to the nearest available periods.
    pub fn set_range(&mut self, start: Option<Period>, end: Option<Period>) {
        if let Some(start) = start {
            self.start_idx = self.periods.partition_point(|p| *p < start);
        }
        if let Some(end) = end {
            self.end_idx = self.periods.partition_point(|p| *p <= end).saturating_sub(1);
        }
        let last = self.periods.len().saturating_sub(1);
        self.start_idx = self.start_idx.min(last);
        self.end_idx = self.end_idx.clamp(self.start_idx, last.max(self.start_idx));
    }

    /// Move `control` by `delta` steps. Returns whether anything changed.
    pub fn adjust(&mut self, control: Control, delta: i32) -> bool {
        let before = self.clone();
        match control {
            Control::Region => {
                if !self.regions.is_empty() {
                    let len = self.regions.len() as i64;
                    self.region_idx = (self.region_idx as i64 + delta as i64).rem_euclid(len) as usize;
                }
            }
            Control::Start => {
                self.start_idx = step(self.start_idx, delta, self.end_idx);
            }
            Control::End => {
                let last = self.periods.len().saturating_sub(1);
                self.end_idx = step(self.end_idx, delta, last).max(self.start_idx);
            }
            Control::Rate => {
                self.rate_tenths =
                    (self.rate_tenths as i64 + delta as i64).clamp(0, RATE_STEPS as i64) as u32;
            }
            Control::Lag => {
                self.lag = step(self.lag, delta, MAX_LAG);
            }
            Control::Degree => {
                if delta != 0 {
                    self.degree = self.degree.toggle();
                }
            }
            Control::Weighting => {
                if delta != 0 {
                    self.weighting = self.weighting.toggle();
                }
            }
        }
        *self != before
    }
}

fn to_tenths(rate: f64) -> u32 {
    let rate = if rate.is_finite() { rate } else { 0.0 };
    (rate.clamp(MIN_RATE, MAX_RATE) * 10.0).round() as u32
}

fn step(value: usize, delta: i32, max: usize) -> usize {
    (value as i64 + delta as i64).clamp(0, max as i64) as usize
}
