pub mod correlation;
pub mod lag;
pub mod predictor;
pub mod regression;
pub mod weighting;

pub use correlation::Correlation;
pub use predictor::{Analysis, PredictError, PredictionResult, analyze, predict};
pub use regression::{FeatureDegree, FittedModel};
pub use weighting::Weighting;
