use serde::Serialize;

use crate::data::observation::{Dataset, Observation, Series};
use crate::engine::lag::apply_lag;
use crate::engine::predictor::{self, Analysis, PredictError, PredictionResult};
use crate::engine::regression::RegressionError;
use crate::engine::{FeatureDegree, Weighting};
use crate::session::selection::Selection;

/// Why a selection produced no prediction. Shown to the user as a notice.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Advisory {
    EmptyDataset,
    InsufficientData { required: usize, available: usize },
    InvalidWeights,
    MismatchedColumns { expected: usize, got: usize },
}

impl From<PredictError> for Advisory {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::InsufficientData {
                required,
                available,
            } => Advisory::InsufficientData {
                required,
                available,
            },
            PredictError::Regression(RegressionError::InvalidWeight { .. })
            | PredictError::Regression(RegressionError::ZeroTotalWeight) => Advisory::InvalidWeights,
            PredictError::Regression(RegressionError::DimensionMismatch { expected, got }) => {
                Advisory::MismatchedColumns { expected, got }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub enum Outcome {
    Ready(Analysis),
    Advisory(Advisory),
}

/// One full recomputation for the current selection.
#[derive(Clone, Debug)]
pub struct Report {
    pub region: String,
    pub series: Series,
    pub weights: Option<Vec<f64>>,
    pub lag: usize,
    pub degree: FeatureDegree,
    pub weighting: Weighting,
    pub query_rate: f64,
    pub outcome: Outcome,
}

impl Report {
    pub fn build(dataset: &Dataset, selection: &Selection) -> Self {
        let query_rate = selection.rate();
        let empty = |outcome| Self {
            region: String::new(),
            series: Series::default(),
            weights: None,
            lag: selection.lag,
            degree: selection.degree,
            weighting: selection.weighting,
            query_rate,
            outcome,
        };

        let (Some(region), Some(start), Some(end)) =
            (selection.region(), selection.start(), selection.end())
        else {
            return empty(Outcome::Advisory(Advisory::EmptyDataset));
        };

        let history: Vec<Observation> = dataset
            .observations()
            .iter()
            .filter(|o| o.region == region)
            .cloned()
            .collect();
        let lagged = apply_lag(&history, selection.lag);

        let mut series = Series::select(&lagged, region, start, end);
        if let Some(floor) = selection.year_floor {
            series = series.with_year_floor(floor);
        }
        let weights = selection.weighting.weights_for(&series);

        let outcome = match predictor::analyze(
            &series,
            selection.degree,
            weights.as_deref(),
            query_rate,
        ) {
            Ok(analysis) => Outcome::Ready(analysis),
            Err(err) => {
                tracing::info!(region, %err, "no prediction for selection");
                Outcome::Advisory(err.into())
            }
        };

        Self {
            region: region.to_string(),
            series,
            weights,
            lag: selection.lag,
            degree: selection.degree,
            weighting: selection.weighting,
            query_rate,
            outcome,
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match &self.outcome {
            Outcome::Ready(analysis) => Some(analysis),
            Outcome::Advisory(_) => None,
        }
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        match &self.outcome {
            Outcome::Ready(_) => None,
            Outcome::Advisory(advisory) => Some(advisory),
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let analysis = self.analysis();
        ReportSummary {
            region: self.region.clone(),
            start: self.series.first_period().map(|p| p.label()),
            end: self.series.last_period().map(|p| p.label()),
            lag: self.lag,
            degree: self.degree,
            weighting: self.weighting,
            query_rate: self.query_rate,
            prediction: analysis.map(|a| a.result),
            coefficients: analysis.map(|a| a.model.coefficients()),
            r_squared: analysis.and_then(|a| a.model.r_squared),
            advisory: self.advisory().cloned(),
        }
    }
}

/// Serializable outcome for headless use.
#[derive(Clone, Debug, Serialize)]
pub struct ReportSummary {
    pub region: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub lag: usize,
    pub degree: FeatureDegree,
    pub weighting: Weighting,
    pub query_rate: f64,
    pub prediction: Option<PredictionResult>,
    pub coefficients: Option<Vec<f64>>,
    pub r_squared: Option<f64>,
    pub advisory: Option<Advisory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::observation::{Granularity, Period};

    fn monthly_dataset() -> Dataset {
        let mut obs = Vec::new();
        let rates = [1.0, 1.25, 1.5, 1.75, 2.0, 2.25, 2.5, 2.75];
        for (i, &rate) in rates.iter().enumerate() {
            let period = Period::month(2021, i as u32 + 1).unwrap();
            obs.push(Observation::new("서울", period, rate, 1000.0 - 100.0 * rate));
            obs.push(Observation::new("부산", period, rate, 400.0));
        }
        Dataset::new(obs, Granularity::Monthly)
    }

    #[test]
    fn test_report_ready_with_lag_inside_range() {
        let dataset = monthly_dataset();
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.select_region("서울");
        selection.set_lag(2);
        selection.set_range(Period::month(2021, 3), Period::month(2021, 8));
        selection.degree = FeatureDegree::Linear;
        selection.set_rate(2.0);

        let report = Report::build(&dataset, &selection);
        assert_eq!(report.series.len(), 6);
        // the first selected month borrows the rate from two months before the range
        assert_eq!(report.series.observations()[0].rate, 1.0);
        let analysis = report.analysis().unwrap();
        assert_eq!(analysis.result.observations, 6);
        assert!(report.weights.is_none());
    }

    #[test]
    fn test_report_advisory_when_range_too_short() {
        let dataset = monthly_dataset();
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.set_lag(0);
        selection.set_range(Period::month(2021, 1), Period::month(2021, 2));
        let report = Report::build(&dataset, &selection);
        assert_eq!(
            report.advisory(),
            Some(&Advisory::InsufficientData {
                required: 3,
                available: 2
            })
        );
        assert!(report.summary().prediction.is_none());
    }

    #[test]
    fn test_report_recency_weights_follow_series() {
        let dataset = monthly_dataset();
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.weighting = Weighting::Recency;
        let report = Report::build(&dataset, &selection);
        let weights = report.weights.as_ref().unwrap();
        assert_eq!(weights.len(), report.series.len());
        assert!(weights.iter().all(|w| *w == 1.0));
    }

    #[test]
    fn test_flat_price_region_still_predicts() {
        let dataset = monthly_dataset();
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.select_region("부산");
        selection.set_lag(0);
        let report = Report::build(&dataset, &selection);
        let analysis = report.analysis().unwrap();
        assert!((analysis.result.predicted_price - 400.0).abs() < 1e-6);
        assert_eq!(analysis.result.correlation, crate::engine::Correlation::Undefined);
        assert_eq!(report.summary().r_squared, None);
    }

    #[test]
    fn test_constant_rate_window_still_predicts() {
        let mut obs = Vec::new();
        for month in 1..=6 {
            let period = Period::month(2022, month).unwrap();
            obs.push(Observation::new("서울", period, 0.5, 900.0 + 10.0 * month as f64));
        }
        let dataset = Dataset::new(obs, Granularity::Monthly);
        let mut selection = Selection::new(&dataset, &Config::default());
        selection.set_lag(0);
        selection.set_rate(1.0);
        assert_eq!(selection.degree, FeatureDegree::Quadratic);

        let report = Report::build(&dataset, &selection);
        assert!(report.advisory().is_none());
        let analysis = report.analysis().unwrap();
        assert!((analysis.result.predicted_price - 935.0).abs() < 1e-9);
        assert_eq!(analysis.result.correlation, crate::engine::Correlation::Undefined);
    }

    #[test]
    fn test_regression_errors_map_to_matching_advisories() {
        assert_eq!(
            Advisory::from(PredictError::Regression(RegressionError::ZeroTotalWeight)),
            Advisory::InvalidWeights
        );
        assert_eq!(
            Advisory::from(PredictError::Regression(RegressionError::InvalidWeight { index: 2 })),
            Advisory::InvalidWeights
        );
        assert_eq!(
            Advisory::from(PredictError::Regression(RegressionError::DimensionMismatch {
                expected: 5,
                got: 4
            })),
            Advisory::MismatchedColumns {
                expected: 5,
                got: 4
            }
        );
    }

    #[test]
    fn test_summary_serializes() {
        let dataset = monthly_dataset();
        let selection = Selection::new(&dataset, &Config::default());
        let json = serde_json::to_string(&Report::build(&dataset, &selection).summary()).unwrap();
        assert!(json.contains("\"region\":\"부산\""));
        assert!(json.contains("\"degree\":\"quadratic\""));
    }
}
