use serde::{Deserialize, Serialize};

use crate::data::observation::Series;

/// How observations count in the least-squares objective.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    #[default]
    Uniform,
    /// `(year - first_year + 1)^2`
    Recency,
}

impl Weighting {
    pub fn as_str(self) -> &'static str {
        match self {
            Weighting::Uniform => "uniform",
            Weighting::Recency => "recency",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Weighting::Uniform => Weighting::Recency,
            Weighting::Recency => Weighting::Uniform,
        }
    }

    pub fn weights_for(self, series: &Series) -> Option<Vec<f64>> {
        match self {
            Weighting::Uniform => None,
            Weighting::Recency => Some(compute_weights(series)),
        }
    }
}

pub fn compute_weights(series: &Series) -> Vec<f64> {
    let Some(min_year) = series.observations().iter().map(|o| o.period.year()).min() else {
        return Vec::new();
    };
    series
        .observations()
        .iter()
        .map(|o| ((o.period.year() - min_year + 1) as f64).powi(2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::observation::{Observation, Period};

    #[test]
    fn test_quadratic_recency_weights() {
        let series = Series::new(
            [2016, 2017, 2018]
                .iter()
                .map(|&y| Observation::new("a", Period::Year(y), 1.0, 1.0))
                .collect(),
        );
        assert_eq!(compute_weights(&series), vec![1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_monthly_periods_share_year_weight() {
        let series = Series::new(vec![
            Observation::new("a", Period::month(2019, 11).unwrap(), 1.0, 1.0),
            Observation::new("a", Period::month(2019, 12).unwrap(), 1.0, 1.0),
            Observation::new("a", Period::month(2020, 1).unwrap(), 1.0, 1.0),
        ]);
        let weights = compute_weights(&series);
        assert_eq!(weights, vec![1.0, 1.0, 4.0]);
        assert!(weights.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_uniform_has_no_weights() {
        assert!(Weighting::Uniform.weights_for(&Series::default()).is_none());
        assert_eq!(Weighting::Recency.weights_for(&Series::default()), Some(vec![]));
    }
}
