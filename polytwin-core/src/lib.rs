//! Polytwin core library: a synthetic digital twin of a recycled
//! polypropylene compounding process.
//!
//! The crate generates a seeded training table, fits one regressor per
//! material property, and answers point predictions, batch predictions, and
//! one-dimensional sensitivity sweeps. [`DigitalTwinBuilder`] wires the
//! pieces together; the lower-level [`generate`], [`ModelBank`], and
//! [`SweepSpec`] APIs are available for custom pipelines.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod advice;
mod builder;
mod dataset;
mod economics;
mod error;
mod feature;
mod forest;
mod generator;
mod linear;
mod model_bank;
mod regressor;
mod response;
mod scorecard;
mod surface;
mod sweep;
mod twin;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    advice::{AcceptanceThresholds, Advice, AdviceThresholds, Verdict, Verdicts},
    builder::DigitalTwinBuilder,
    dataset::{ColumnRange, TrainingRow, TrainingSet},
    economics::{
        CostEstimate, CostTrend, DEFAULT_REFERENCE_COST, MaterialPrices, estimate_cost,
        formulation_cost,
    },
    error::{InputProblem, Result, TwinError, TwinErrorCode},
    feature::{FEATURE_COUNT, Feature, FeatureRange, FeatureVector},
    forest::{ForestParams, MaxFeatures, RandomForest, RandomForestTrainer, RegressionTree},
    generator::{AffineFormula, DEFAULT_ROW_COUNT, DEFAULT_SEED, GeneratorConfig, generate},
    linear::{LeastSquaresTrainer, LinearModel},
    model_bank::ModelBank,
    regressor::{DesignRow, Regressor, Trainer},
    response::{RESPONSE_COUNT, Response, ResponseMap},
    scorecard::Scorecard,
    surface::{ModelKind, SurfaceModel, SurfaceTrainer},
    sweep::{DEFAULT_SWEEP_POINTS, MAX_SWEEP_POINTS, SweepCurve, SweepSpec},
    twin::{DashboardSnapshot, DigitalTwin},
};
