// src/decoding/stats.rs

use super::DisplacementTensor;
use std::fmt;

/// Sample statistics of the per-dimension coordinates.
///
/// Each observed point is weighted by `round(density * shots)`, i.e. the
/// tensor is replayed as the table of individual shots. Variances and
/// covariances use `N - 1` in the denominator and are `NaN` below two
/// samples; a correlation is `NaN` when either variance is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsBundle {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    pub covariance: Vec<Vec<f64>>,
    pub correlation: Vec<Vec<f64>>,
}

impl StatisticsBundle {
    pub fn from_tensor(tensor: &DisplacementTensor) -> Self {
        let k = tensor.n_dimensions();
        let weights: Vec<f64> = tensor
            .probability_density()
            .iter()
            .map(|p| (p * tensor.shots() as f64).round())
            .collect();
        let n: f64 = weights.iter().sum();

        let mean: Vec<f64> = tensor
            .dimensions()
            .iter()
            .map(|column| {
                if n > 0.0 {
                    column.iter().zip(&weights).map(|(x, w)| *x as f64 * w).sum::<f64>() / n
                } else {
                    f64::NAN
                }
            })
            .collect();

        let mut covariance = vec![vec![f64::NAN; k]; k];
        if n >= 2.0 {
            for i in 0..k {
                for j in i..k {
                    let (xi, xj) = (&tensor.dimensions()[i], &tensor.dimensions()[j]);
                    let sum: f64 = weights
                        .iter()
                        .enumerate()
                        .map(|(row, w)| w * (xi[row] as f64 - mean[i]) * (xj[row] as f64 - mean[j]))
                        .sum();
                    covariance[i][j] = sum / (n - 1.0);
                    covariance[j][i] = covariance[i][j];
                }
            }
        }

        let variance: Vec<f64> = (0..k).map(|i| covariance[i][i]).collect();
        let correlation = (0..k)
            .map(|i| {
                (0..k)
                    .map(|j| {
                        let denom = (variance[i] * variance[j]).sqrt();
                        if denom > 0.0 { covariance[i][j] / denom } else { f64::NAN }
                    })
                    .collect()
            })
            .collect();

        Self { mean, variance, covariance, correlation }
    }
}

impl fmt::Display for StatisticsBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn row(values: &[f64]) -> String {
            values.iter().map(|v| format!("{:>10.4}", v)).collect::<Vec<_>>().join(" ")
        }
        writeln!(f, "mean:     {}", row(&self.mean))?;
        writeln!(f, "variance: {}", row(&self.variance))?;
        writeln!(f, "covariance:")?;
        for r in &self.covariance {
            writeln!(f, "  [{}]", row(r))?;
        }
        writeln!(f, "correlation:")?;
        for r in &self.correlation {
            writeln!(f, "  [{}]", row(r))?;
        }
        Ok(())
    }
}
