//! Weighted least squares on a single input expanded to polynomial features.
//!
//! Features and prices are centered on their weighted means, the slope
//! terms come from the normal equations `(XᵀWX)β = XᵀWy`, and the
//! intercept is recovered from the means. Cholesky handles the full-rank
//! case. When the rates do not vary enough for the requested degree the
//! minimum-norm solution is used instead, so constant rates predict the
//! weighted mean price and two distinct rates are interpolated exactly.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Weight at position {index} is negative or not finite")]
    InvalidWeight { index: usize },

    #[error("Weights sum to zero")]
    ZeroTotalWeight,
}

/// Polynomial order of the rate features.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureDegree {
    #[default]
    Linear,
    Quadratic,
}

impl FeatureDegree {
    pub fn from_order(order: u8) -> Option<Self> {
        match order {
            1 => Some(FeatureDegree::Linear),
            2 => Some(FeatureDegree::Quadratic),
            _ => None,
        }
    }

    pub fn order(self) -> usize {
        match self {
            FeatureDegree::Linear => 1,
            FeatureDegree::Quadratic => 2,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            FeatureDegree::Linear => FeatureDegree::Quadratic,
            FeatureDegree::Quadratic => FeatureDegree::Linear,
        }
    }

    /// `[rate]` or `[rate, rate²]`.
    pub fn expand(self, rate: f64) -> Vec<f64> {
        (1..=self.order()).map(|k| rate.powi(k as i32)).collect()
    }
}

/// Coefficients of `price = b0 + b1·rate (+ b2·rate²)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    degree: FeatureDegree,
    intercept: f64,
    coefficients: Array1<f64>,
    /// Weighted coefficient of determination. `None` when every price is equal.
    pub r_squared: Option<f64>,
}

impl FittedModel {
    pub fn fit(
        rates: &[f64],
        prices: &[f64],
        weights: Option<&[f64]>,
        degree: FeatureDegree,
    ) -> Result<Self, RegressionError> {
        let n = rates.len();
        if prices.len() != n {
            return Err(RegressionError::DimensionMismatch {
                expected: n,
                got: prices.len(),
            });
        }

        let w = match weights {
            Some(w) if w.len() != n => {
                return Err(RegressionError::DimensionMismatch {
                    expected: n,
                    got: w.len(),
                });
            }
            Some(w) => {
                if let Some(index) = w.iter().position(|v| !v.is_finite() || *v < 0.0) {
                    return Err(RegressionError::InvalidWeight { index });
                }
                Array1::from_vec(w.to_vec())
            }
            None => Array1::ones(n),
        };

        let total = w.sum();
        if !(total > 0.0) {
            return Err(RegressionError::ZeroTotalWeight);
        }

        let p = degree.order();
        let mut x = Array2::<f64>::zeros((n, p));
        for (i, &rate) in rates.iter().enumerate() {
            for (k, feature) in degree.expand(rate).into_iter().enumerate() {
                x[[i, k]] = feature;
            }
        }
        let y = Array1::from_vec(prices.to_vec());

        let x_mean = w.dot(&x) / total;
        let y_mean = w.dot(&y) / total;
        let xc = &x - &x_mean.view().insert_axis(Axis(0));
        let yc = &y - y_mean;

        let xw = &xc * &w.view().insert_axis(Axis(1));
        let xtwx = xw.t().dot(&xc);
        let xtwy = xw.t().dot(&yc);

        // raw second moments set the scale below which a direction counts as flat
        let scale = (&x * &x * &w.view().insert_axis(Axis(1))).sum_axis(Axis(0));
        let beta = match cholesky_solve(&xtwx, &xtwy, &scale) {
            Some(beta) => beta,
            None => {
                tracing::debug!(degree = p, "rank-deficient design, using minimum-norm solution");
                pseudoinverse_solve(&xtwx, &xtwy, &scale)
            }
        };

        let intercept = y_mean - x_mean.dot(&beta);
        let mut model = Self {
            degree,
            intercept,
            coefficients: beta,
            r_squared: None,
        };
        model.r_squared = model.weighted_r_squared(rates, prices, &w);
        Ok(model)
    }

    pub fn degree(&self) -> FeatureDegree {
        self.degree
    }

    /// `[b0, b1]` or `[b0, b1, b2]`.
    pub fn coefficients(&self) -> Vec<f64> {
        std::iter::once(self.intercept)
            .chain(self.coefficients.iter().copied())
            .collect()
    }

    pub fn evaluate(&self, rate: f64) -> f64 {
        self.degree
            .expand(rate)
            .iter()
            .zip(self.coefficients.iter())
            .fold(self.intercept, |acc, (f, c)| acc + f * c)
    }

    /// Evenly spaced points of the fitted curve over `[lo, hi]`.
    pub fn curve(&self, lo: f64, hi: f64, samples: usize) -> Vec<(f64, f64)> {
        let samples = samples.max(2);
        let step = (hi - lo) / (samples - 1) as f64;
        (0..samples)
            .map(|i| {
                let rate = lo + step * i as f64;
                (rate, self.evaluate(rate))
            })
            .collect()
    }

    fn weighted_r_squared(&self, rates: &[f64], prices: &[f64], w: &Array1<f64>) -> Option<f64> {
        let total: f64 = w.sum();
        if total <= 0.0 {
            return None;
        }
        let mean = prices.iter().zip(w.iter()).map(|(y, w)| y * w).sum::<f64>() / total;
        let ss_tot: f64 = prices
            .iter()
            .zip(w.iter())
            .map(|(y, w)| w * (y - mean).powi(2))
            .sum();
        if ss_tot <= f64::EPSILON * mean.abs().max(1.0) {
            return None;
        }
        let ss_res: f64 = rates
            .iter()
            .zip(prices)
            .zip(w.iter())
            .map(|((&r, &y), w)| w * (y - self.evaluate(r)).powi(2))
            .sum();
        Some(1.0 - ss_res / ss_tot)
    }
}

/// Relative size under which a pivot or eigenvalue is treated as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Solve `a·x = b` for symmetric positive definite `a`.
///
/// Returns `None` when a pivot collapses relative to `scale`.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>, scale: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if !(diag > RANK_TOLERANCE * scale[i]) {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L·z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ·x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Minimum-norm solution of `a·x = b` for symmetric positive semidefinite `a`.
///
/// Eigen-directions whose eigenvalue is negligible next to the largest raw
/// moment in `scale` contribute nothing.
fn pseudoinverse_solve(a: &Array2<f64>, b: &Array1<f64>, scale: &Array1<f64>) -> Array1<f64> {
    let (values, vectors) = symmetric_eigen(a);
    let cutoff = RANK_TOLERANCE * scale.iter().copied().fold(0.0, f64::max);

    let mut x = Array1::<f64>::zeros(a.nrows());
    for (k, &lambda) in values.iter().enumerate() {
        if lambda > cutoff {
            let v = vectors.column(k);
            x.scaled_add(v.dot(b) / lambda, &v);
        }
    }
    x
}

/// Cyclic Jacobi rotations. Returns eigenvalues and eigenvectors as columns.
fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..64 {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        let norm: f64 = a.iter().map(|x| x * x).sum();
        if off <= f64::EPSILON * f64::EPSILON * norm {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}
