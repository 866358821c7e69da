//! The pluggable regression seam used by [`crate::ModelBank`].
//!
//! A [`Trainer`] turns a design matrix and one target column into a fitted
//! [`Regressor`]. The model bank never inspects models beyond this trait, so
//! new algorithms plug in without touching the bank.

use crate::{Result, feature::FEATURE_COUNT, response::Response};

/// One row of the design matrix, in [`crate::Feature::ALL`] order.
pub type DesignRow = [f64; FEATURE_COUNT];

/// A fitted single-output regression model.
///
/// Implementations must be pure: the same row always yields the same value.
pub trait Regressor: Send + Sync {
    /// Predicts the response for one design row.
    fn predict_row(&self, row: &DesignRow) -> f64;
}

/// Fits [`Regressor`]s for a single response column.
pub trait Trainer {
    /// Model type produced by this trainer.
    type Model: Regressor;

    /// Fits a model on `design` against `targets`.
    ///
    /// `response` identifies the target column; trainers use it to derive
    /// per-response random state and to label errors. Implementations must
    /// not read any other response's values.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::DegenerateTraining`] when the data cannot
    /// support a fit and [`crate::TwinError::InvalidConfig`] for invalid
    /// trainer parameters.
    fn fit(&self, design: &[DesignRow], targets: &[f64], response: Response)
    -> Result<Self::Model>;
}

/// Checks the shape and finiteness of a training problem.
pub(crate) fn validate_training_data(
    design: &[DesignRow],
    targets: &[f64],
    response: Response,
) -> Result<()> {
    use crate::error::TwinError;

    if design.is_empty() {
        return Err(TwinError::DegenerateTraining {
            response,
            reason: "training data contains no rows".into(),
        });
    }
    if design.len() != targets.len() {
        return Err(TwinError::DegenerateTraining {
            response,
            reason: format!(
                "design has {} rows but {} targets were given",
                design.len(),
                targets.len()
            ),
        });
    }
    if let Some(position) = targets.iter().position(|value| !value.is_finite()) {
        return Err(TwinError::DegenerateTraining {
            response,
            reason: format!("target at row {position} is not finite"),
        });
    }
    if let Some(position) = design
        .iter()
        .position(|row| row.iter().any(|value| !value.is_finite()))
    {
        return Err(TwinError::DegenerateTraining {
            response,
            reason: format!("design row {position} contains a non-finite value"),
        });
    }
    Ok(())
}
