use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::merge::DEFAULT_RATE_PATTERNS;
use crate::data::observation::Granularity;
use crate::data::source::DataSource;
use crate::engine::{FeatureDegree, Weighting};
use crate::session::selection::{MAX_LAG, MAX_RATE, MIN_RATE};

pub const SUPPORTED_LOCALES: &[&str] = &["en", "ko"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,
    /// Wide price-by-year table; together with `rate_table` selects merge mode.
    #[serde(default)]
    pub price_table: Option<String>,
    #[serde(default)]
    pub rate_table: Option<String>,
    #[serde(default = "default_rate_patterns")]
    pub rate_patterns: Vec<String>,
    #[serde(default = "default_degree")]
    pub degree: FeatureDegree,
    #[serde(default)]
    pub weighting: Weighting,
    #[serde(default)]
    pub year_floor: Option<i32>,
    #[serde(default = "default_rate")]
    pub default_rate: f64,
    /// Lag in periods; unset means 3 for monthly data and 0 for yearly data.
    #[serde(default)]
    pub default_lag: Option<usize>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_data_path() -> String {
    "data/monthly_sample.csv".to_string()
}
fn default_granularity() -> Granularity {
    Granularity::Monthly
}
fn default_rate_patterns() -> Vec<String> {
    DEFAULT_RATE_PATTERNS.iter().map(|p| p.to_string()).collect()
}
fn default_degree() -> FeatureDegree {
    FeatureDegree::Quadratic
}
fn default_rate() -> f64 {
    3.5
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_locale() -> String {
    "en".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            granularity: default_granularity(),
            price_table: None,
            rate_table: None,
            rate_patterns: default_rate_patterns(),
            degree: default_degree(),
            weighting: Weighting::default(),
            year_floor: None,
            default_rate: default_rate(),
            default_lag: None,
            theme: default_theme(),
            locale: default_locale(),
            log_file: None,
        }
    }
}

impl Config {
    /// Read the user config, falling back to defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ratedash")
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("ratedash")
                .join("ratedash.log"),
        }
    }

    pub fn lag_for(&self, granularity: Granularity) -> usize {
        self.default_lag.unwrap_or(match granularity {
            Granularity::Monthly => 3,
            Granularity::Yearly => 0,
        })
    }

    pub fn data_source(&self) -> DataSource {
        match (&self.price_table, &self.rate_table) {
            (Some(prices), Some(rates)) => DataSource::Merged {
                prices: PathBuf::from(prices),
                rates: PathBuf::from(rates),
                patterns: self.rate_patterns.clone(),
            },
            _ => DataSource::Long {
                path: PathBuf::from(&self.data_path),
                granularity: self.granularity,
            },
        }
    }

    /// Clamp values into the ranges the controls allow and reset unknown locales.
    /// Call after deserialization or after applying command-line overrides.
    pub fn normalize(&mut self) {
        if !self.default_rate.is_finite() {
            self.default_rate = default_rate();
        }
        self.default_rate = self.default_rate.clamp(MIN_RATE, MAX_RATE);
        self.default_lag = self.default_lag.map(|lag| lag.min(MAX_LAG));
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            tracing::warn!(locale = %self.locale, "unsupported locale, using en");
            self.locale = default_locale();
        }
        if self.rate_patterns.iter().all(|p| p.trim().is_empty()) {
            self.rate_patterns = default_rate_patterns();
        }
    }
}
