//! Runtime selection between the shipped regressors.

use std::fmt;

use crate::{
    Result,
    forest::{ForestParams, RandomForest, RandomForestTrainer},
    linear::{LeastSquaresTrainer, LinearModel},
    regressor::{DesignRow, Regressor, Trainer},
    response::Response,
};

/// Which regressor backs a [`crate::DigitalTwin`].
///
/// # Examples
/// ```
/// use polytwin_core::{ForestParams, ModelKind};
///
/// let kind = ModelKind::Forest(ForestParams::default());
/// assert_eq!(kind.label(), "forest");
/// assert_eq!(ModelKind::LeastSquares { ridge: None }.label(), "linear");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ModelKind {
    /// Bagged regression trees.
    Forest(ForestParams),
    /// Ordinary least squares, optionally ridge-regularised.
    LeastSquares {
        /// Ridge penalty; `None` means plain least squares.
        ridge: Option<f64>,
    },
}

impl Default for ModelKind {
    fn default() -> Self {
        Self::Forest(ForestParams::default())
    }
}

impl ModelKind {
    /// Short name used in logs and reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Forest(_) => "forest",
            Self::LeastSquares { .. } => "linear",
        }
    }

    /// Builds the trainer for this kind.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidConfig`] for an invalid ridge term.
    pub fn trainer(&self) -> Result<SurfaceTrainer> {
        Ok(match self {
            Self::Forest(params) => SurfaceTrainer::Forest(RandomForestTrainer::new(params.clone())),
            Self::LeastSquares { ridge } => {
                SurfaceTrainer::LeastSquares(LeastSquaresTrainer::new(*ridge)?)
            }
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A trainer for either shipped model.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceTrainer {
    /// See [`RandomForestTrainer`].
    Forest(RandomForestTrainer),
    /// See [`LeastSquaresTrainer`].
    LeastSquares(LeastSquaresTrainer),
}

/// A fitted model of either shipped kind.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceModel {
    /// A fitted forest.
    Forest(RandomForest),
    /// A fitted affine model.
    Linear(LinearModel),
}

impl Regressor for SurfaceModel {
    fn predict_row(&self, row: &DesignRow) -> f64 {
        match self {
            Self::Forest(forest) => forest.predict_row(row),
            Self::Linear(linear) => linear.predict_row(row),
        }
    }
}

impl Trainer for SurfaceTrainer {
    type Model = SurfaceModel;

    fn fit(&self, design: &[DesignRow], targets: &[f64], response: Response) -> Result<SurfaceModel> {
        match self {
            Self::Forest(trainer) => trainer
                .fit(design, targets, response)
                .map(SurfaceModel::Forest),
            Self::LeastSquares(trainer) => trainer
                .fit(design, targets, response)
                .map(SurfaceModel::Linear),
        }
    }
}
