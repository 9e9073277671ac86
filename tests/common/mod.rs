//! Common test utilities and data generators.
#![allow(dead_code)]

use faer::{Col, Mat};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use reglin::core::DataFrame;

/// Generate simple linear data: y = intercept + x * beta + noise.
///
/// Returns `(x, y, true_coefficients)` with `x` excluding the intercept column.
pub fn generate_linear_data(
    n_samples: usize,
    n_features: usize,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, Col<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let standard = Normal::new(0.0, 1.0).unwrap();
    let noise = Normal::new(0.0, noise_std).unwrap();

    let mut x = Mat::zeros(n_samples, n_features);
    let mut y = Col::zeros(n_samples);
    let true_coefficients = Col::from_fn(n_features, |j| (j + 1) as f64);

    for i in 0..n_samples {
        let mut yi = intercept;
        for j in 0..n_features {
            x[(i, j)] = standard.sample(&mut rng);
            yi += x[(i, j)] * true_coefficients[j];
        }
        y[i] = yi + noise.sample(&mut rng);
    }

    (x, y, true_coefficients)
}

/// Covariate table `{x: 0..n, group: A, B, A, B, ...}`.
pub fn alternating_groups(n: usize) -> DataFrame {
    let groups: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "A" } else { "B" }).collect();
    DataFrame::builder()
        .numeric("x", (0..n).map(|i| i as f64).collect())
        .categorical("group", &groups)
        .build()
        .unwrap()
}

/// Prepend a column of ones.
pub fn with_intercept(x: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            x[(i, j - 1)]
        }
    })
}
