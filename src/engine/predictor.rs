use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::observation::Series;
use crate::engine::correlation::{Correlation, pearson};
use crate::engine::regression::{FeatureDegree, FittedModel, RegressionError};

/// Fewest observations a selection needs before any model is fitted.
pub const MIN_OBSERVATIONS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("Insufficient data: need at least {required} observations, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error(transparent)]
    Regression(#[from] RegressionError),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub correlation: Correlation,
    pub observations: usize,
}

/// Everything one interaction needs to render: the model, its prediction and the query.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub model: FittedModel,
    pub result: PredictionResult,
    pub query_rate: f64,
}

impl Analysis {
    /// Fitted curve across the observed rate range.
    pub fn curve(&self, series: &Series, samples: usize) -> Vec<(f64, f64)> {
        let rates = series.rates();
        let lo = rates.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        self.model.curve(lo, hi, samples)
    }
}

pub fn fit(
    series: &Series,
    degree: FeatureDegree,
    weights: Option<&[f64]>,
) -> Result<FittedModel, PredictError> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(PredictError::InsufficientData {
            required: MIN_OBSERVATIONS,
            available: series.len(),
        });
    }
    Ok(FittedModel::fit(
        &series.rates(),
        &series.prices(),
        weights,
        degree,
    )?)
}

pub fn analyze(
    series: &Series,
    degree: FeatureDegree,
    weights: Option<&[f64]>,
    query_rate: f64,
) -> Result<Analysis, PredictError> {
    let model = fit(series, degree, weights)?;
    let result = PredictionResult {
        predicted_price: model.evaluate(query_rate),
        correlation: pearson(&series.rates(), &series.prices()),
        observations: series.len(),
    };
    tracing::debug!(
        observations = result.observations,
        degree = degree.order(),
        weighted = weights.is_some(),
        query_rate,
        predicted = result.predicted_price,
        "fitted model"
    );
    Ok(Analysis {
        model,
        result,
        query_rate,
    })
}

pub fn predict(
    series: &Series,
    degree: FeatureDegree,
    weights: Option<&[f64]>,
    query_rate: f64,
) -> Result<PredictionResult, PredictError> {
    analyze(series, degree, weights, query_rate).map(|a| a.result)
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::data::observation::{Observation, Period};

    fn series(points: &[(f64, f64)]) -> Series {
        Series::new(
            points
                .iter()
                .enumerate()
                .map(|(i, &(rate, price))| {
                    Observation::new("서울", Period::Year(2010 + i as i32), rate, price)
                })
                .collect(),
        )
    }

    #[test]
    fn test_exact_linear_scenario() {
        let s = series(&[(3.0, 500.0), (3.5, 520.0), (4.0, 540.0)]);
        let result = predict(&s, FeatureDegree::Linear, None, 3.5).unwrap();
        assert!((result.predicted_price - 520.0).abs() < 1e-8);
        let r = result.correlation.value().unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(result.observations, 3);
    }

    #[test]
    fn test_two_observations_is_insufficient() {
        let s = series(&[(3.0, 500.0), (3.5, 520.0)]);
        assert_eq!(
            predict(&s, FeatureDegree::Quadratic, None, 3.5),
            Err(PredictError::InsufficientData {
                required: 3,
                available: 2
            })
        );
    }

    #[test]
    fn test_constant_rate_predicts_mean_with_undefined_correlation() {
        let s = series(&[(1.5, 500.0), (1.5, 520.0), (1.5, 540.0)]);
        for degree in [FeatureDegree::Linear, FeatureDegree::Quadratic] {
            let result = predict(&s, degree, None, 2.0).unwrap();
            assert!((result.predicted_price - 520.0).abs() < 1e-9);
            assert_eq!(result.correlation, Correlation::Undefined);
            assert_eq!(result.observations, 3);
        }
    }

    #[test]
    fn test_zero_weights_are_rejected() {
        let s = series(&[(1.0, 500.0), (1.5, 520.0), (2.0, 540.0)]);
        assert_eq!(
            predict(&s, FeatureDegree::Linear, Some(&[0.0; 3]), 1.5),
            Err(PredictError::Regression(RegressionError::ZeroTotalWeight))
        );
    }

    #[test]
    fn test_prediction_at_mean_rate_is_mean_price() {
        let mut rng = SmallRng::seed_from_u64(2024);
        for _ in 0..100 {
            let n = rng.gen_range(3..60);
            let points: Vec<(f64, f64)> = (0..n)
                .map(|i| (i as f64 * 0.1 + rng.gen_range(0.0..0.05), rng.gen_range(200.0..1500.0)))
                .collect();
            let s = series(&points);
            let mean_rate = s.rates().iter().sum::<f64>() / n as f64;
            let mean_price = s.prices().iter().sum::<f64>() / n as f64;
            let result = predict(&s, FeatureDegree::Linear, None, mean_rate).unwrap();
            assert!(
                (result.predicted_price - mean_price).abs() < 1e-6 * mean_price,
                "{} vs {}",
                result.predicted_price,
                mean_price
            );
        }
    }

    #[test]
    fn test_curve_covers_observed_rates() {
        let s = series(&[(1.0, 10.0), (2.0, 14.0), (4.0, 30.0)]);
        let analysis = analyze(&s, FeatureDegree::Quadratic, None, 3.0).unwrap();
        let curve = analysis.curve(&s, 100);
        assert_eq!(curve.first().map(|p| p.0), Some(1.0));
        assert!((curve.last().unwrap().0 - 4.0).abs() < 1e-12);
    }
}
