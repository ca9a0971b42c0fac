use std::path::PathBuf;

use crate::data::loader::{self, LoadError, LoadReport};
use crate::data::merge;
use crate::data::observation::{Dataset, Granularity};

/// Where the dashboard's table comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    /// One row per (region, period).
    Long {
        path: PathBuf,
        granularity: Granularity,
    },
    /// Wide yearly price table joined with a wide indicator table.
    Merged {
        prices: PathBuf,
        rates: PathBuf,
        patterns: Vec<String>,
    },
}

impl DataSource {
    pub fn granularity(&self) -> Granularity {
        match self {
            DataSource::Long { granularity, .. } => *granularity,
            DataSource::Merged { .. } => Granularity::Yearly,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Long { path, .. } => path.display().to_string(),
            DataSource::Merged { prices, rates, .. } => {
                format!("{} + {}", prices.display(), rates.display())
            }
        }
    }

    pub fn load(&self) -> Result<(Dataset, LoadReport), LoadError> {
        match self {
            DataSource::Long { path, granularity } => loader::load_long_csv_path(path, *granularity),
            DataSource::Merged {
                prices,
                rates,
                patterns,
            } => merge::merge_wide_paths(prices, rates, patterns),
        }
    }
}
