use serde::{Deserialize, Serialize};

/// Pearson coefficient, or `Undefined` when a column does not vary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Correlation {
    Coefficient(f64),
    Undefined,
}

impl Correlation {
    pub fn value(self) -> Option<f64> {
        match self {
            Correlation::Coefficient(r) => Some(r),
            Correlation::Undefined => None,
        }
    }
}

pub fn pearson(xs: &[f64], ys: &[f64]) -> Correlation {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Correlation::Undefined;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
    }

    if ss_xx <= 0.0 || ss_yy <= 0.0 {
        return Correlation::Undefined;
    }
    let r = ss_xy / (ss_xx.sqrt() * ss_yy.sqrt());
    if r.is_finite() {
        Correlation::Coefficient(r.clamp(-1.0, 1.0))
    } else {
        Correlation::Undefined
    }
}
