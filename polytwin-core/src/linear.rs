//! Ordinary least squares with an intercept.
//!
//! Columns are centred before the normal equations are formed, which keeps
//! the system well conditioned even though screw speed is two orders of
//! magnitude larger than ash content. The intercept is recovered from the
//! column means afterwards.

use tracing::instrument;

use crate::{
    Result,
    error::TwinError,
    feature::{FEATURE_COUNT, Feature},
    regressor::{DesignRow, Regressor, Trainer, validate_training_data},
    response::Response,
};

/// Pivots smaller than this fraction of the largest matrix entry are
/// treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// A fitted affine model `intercept + Σ coefficient·feature`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl LinearModel {
    /// Constant term.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Fitted coefficient of `feature`.
    #[must_use]
    pub fn coefficient(&self, feature: Feature) -> f64 {
        self.coefficients
            .get(feature.index())
            .copied()
            .unwrap_or(0.0)
    }
}

impl Regressor for LinearModel {
    fn predict_row(&self, row: &DesignRow) -> f64 {
        row.iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (value, coefficient)| {
                value.mul_add(*coefficient, acc)
            })
    }
}

/// Fits [`LinearModel`]s by solving the normal equations.
///
/// # Examples
/// ```
/// use polytwin_core::{Feature, LeastSquaresTrainer, Response, Trainer};
///
/// let design: Vec<[f64; 6]> = (0..12)
///     .map(|i| {
///         let x = f64::from(i);
///         [x, x * x, (x * 0.7).sin(), (x * 1.3).cos(), x.sqrt(), 1.0 / (x + 1.0)]
///     })
///     .collect();
/// let targets: Vec<f64> = design.iter().map(|row| 4.0 + 2.0 * row[0]).collect();
/// let model = LeastSquaresTrainer::default()
///     .fit(&design, &targets, Response::Tensile)
///     .expect("well-posed design");
/// assert!((model.coefficient(Feature::BaseMfi) - 2.0).abs() < 1e-6);
/// assert!((model.intercept() - 4.0).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LeastSquaresTrainer {
    ridge: f64,
}

impl LeastSquaresTrainer {
    /// Creates a trainer with an optional ridge penalty on the
    /// coefficients (the intercept is never penalised).
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `ridge` is negative or not
    /// finite.
    pub fn new(ridge: Option<f64>) -> Result<Self> {
        let ridge = ridge.unwrap_or(0.0);
        if !ridge.is_finite() || ridge < 0.0 {
            return Err(TwinError::invalid_config(
                "ridge",
                format!("ridge must be finite and >= 0 (got {ridge})"),
            ));
        }
        Ok(Self { ridge })
    }

    /// Ridge penalty applied to the coefficients.
    #[must_use]
    pub fn ridge(&self) -> f64 {
        self.ridge
    }
}

impl Trainer for LeastSquaresTrainer {
    type Model = LinearModel;

    #[instrument(
        name = "core.linear.fit",
        err,
        skip(self, design, targets),
        fields(rows = design.len(), ridge = self.ridge),
    )]
    fn fit(&self, design: &[DesignRow], targets: &[f64], response: Response) -> Result<LinearModel> {
        validate_training_data(design, targets, response)?;

        let count = design.len() as f64;
        let mut feature_means = [0.0; FEATURE_COUNT];
        for row in design {
            for (mean, value) in feature_means.iter_mut().zip(row) {
                *mean += value / count;
            }
        }
        let target_mean = targets.iter().sum::<f64>() / count;

        let mut gram = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
        let mut moment = [0.0; FEATURE_COUNT];
        for (row, target) in design.iter().zip(targets) {
            let centred = centre(row, &feature_means);
            let centred_target = target - target_mean;
            for (i, left) in centred.iter().enumerate() {
                if let Some(entry) = moment.get_mut(i) {
                    *entry = left.mul_add(centred_target, *entry);
                }
                if let Some(gram_row) = gram.get_mut(i) {
                    for (entry, right) in gram_row.iter_mut().zip(&centred) {
                        *entry = left.mul_add(*right, *entry);
                    }
                }
            }
        }
        for (i, gram_row) in gram.iter_mut().enumerate() {
            if let Some(diagonal) = gram_row.get_mut(i) {
                *diagonal += self.ridge;
            }
        }

        let coefficients = solve(gram, moment).ok_or_else(|| TwinError::DegenerateTraining {
            response,
            reason: "design matrix is singular; add rows, vary every feature, or set a ridge term"
                .into(),
        })?;
        let intercept = feature_means
            .iter()
            .zip(&coefficients)
            .fold(target_mean, |acc, (mean, coefficient)| {
                (-mean).mul_add(*coefficient, acc)
            });
        Ok(LinearModel {
            intercept,
            coefficients,
        })
    }
}

fn centre(row: &DesignRow, means: &[f64; FEATURE_COUNT]) -> DesignRow {
    let mut centred = *row;
    for (value, mean) in centred.iter_mut().zip(means) {
        *value -= mean;
    }
    centred
}

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot falls below the singularity tolerance.
fn solve(
    mut a: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
    mut b: [f64; FEATURE_COUNT],
) -> Option<[f64; FEATURE_COUNT]> {
    let scale = a
        .iter()
        .flatten()
        .map(|value| value.abs())
        .fold(0.0_f64, f64::max);
    if scale == 0.0 {
        return None;
    }
    let tolerance = scale * SINGULAR_TOLERANCE;

    for column in 0..FEATURE_COUNT {
        let pivot_row = (column..FEATURE_COUNT)
            .max_by(|&left, &right| a[left][column].abs().total_cmp(&a[right][column].abs()))?;
        if a[pivot_row][column].abs() <= tolerance {
            return None;
        }
        a.swap(column, pivot_row);
        b.swap(column, pivot_row);

        let pivot = a[column][column];
        for row in column + 1..FEATURE_COUNT {
            let factor = a[row][column] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in column..FEATURE_COUNT {
                a[row][k] = (-factor).mul_add(a[column][k], a[row][k]);
            }
            b[row] = (-factor).mul_add(b[column], b[row]);
        }
    }

    let mut solution = [0.0; FEATURE_COUNT];
    for row in (0..FEATURE_COUNT).rev() {
        let tail = (row + 1..FEATURE_COUNT).fold(b[row], |acc, k| {
            (-a[row][k]).mul_add(solution[k], acc)
        });
        solution[row] = tail / a[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{AffineFormula, GeneratorConfig};
    use rstest::rstest;

    fn noiseless_config() -> GeneratorConfig {
        Response::ALL
            .into_iter()
            .fold(GeneratorConfig::default(), |config, response| {
                let quiet = config
                    .formula(response)
                    .with_noise_sd(0.0)
                    .expect("zero noise is valid");
                config.with_formula(response, quiet)
            })
    }

    #[rstest]
    #[case(Response::Impact)]
    #[case(Response::Tensile)]
    #[case(Response::FinalMfi)]
    fn recovers_generator_coefficients_without_noise(#[case] response: Response) {
        let set = noiseless_config()
            .generate(9, 60)
            .expect("valid parameters");
        let model = LeastSquaresTrainer::default()
            .fit(&set.design(), &set.response_column(response), response)
            .expect("well-posed design");
        let formula = AffineFormula::default_for(response);
        assert!((model.intercept() - formula.intercept()).abs() < 1e-6);
        for feature in Feature::ALL {
            let fitted = model.coefficient(feature);
            let expected = formula.coefficient(feature);
            assert!(
                (fitted - expected).abs() < 1e-8,
                "{response}/{feature}: {fitted} vs {expected}"
            );
        }
    }

    #[test]
    fn constant_column_is_singular() {
        let design: Vec<DesignRow> = (0..10)
            .map(|i| {
                let x = f64::from(i);
                [x, x.sin(), x.cos(), x * x, 5.0, x.sqrt()]
            })
            .collect();
        let targets: Vec<f64> = (0..10_i32).map(f64::from).collect();
        let err = LeastSquaresTrainer::default()
            .fit(&design, &targets, Response::Impact)
            .expect_err("constant column leaves the system singular");
        assert!(matches!(
            err,
            TwinError::DegenerateTraining {
                response: Response::Impact,
                ..
            }
        ));
    }

    #[test]
    fn ridge_regularises_a_singular_design() {
        let design: Vec<DesignRow> = (0..10)
            .map(|i| {
                let x = f64::from(i);
                [x, x, 0.0, 0.0, 0.0, 0.0]
            })
            .collect();
        let targets: Vec<f64> = (0..10).map(|i| 2.0 * f64::from(i)).collect();
        let model = LeastSquaresTrainer::new(Some(1e-3))
            .expect("valid ridge")
            .fit(&design, &targets, Response::Tensile)
            .expect("ridge makes the system solvable");
        // Collinear columns share the slope evenly.
        let first = model.coefficient(Feature::BaseMfi);
        let second = model.coefficient(Feature::BaseAsh);
        assert!((first - second).abs() < 1e-9);
        assert!((first + second - 2.0).abs() < 1e-3);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_invalid_ridge(#[case] ridge: f64) {
        let err = LeastSquaresTrainer::new(Some(ridge)).expect_err("invalid ridge");
        assert!(matches!(
            err,
            TwinError::InvalidConfig {
                parameter: "ridge",
                ..
            }
        ));
    }

    #[test]
    fn solve_handles_row_swaps() {
        let mut a = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            a[i][(i + 1) % FEATURE_COUNT] = 2.0;
        }
        let b = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let x = solve(a, b).expect("permutation matrix is invertible");
        assert_eq!(x, [6.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
