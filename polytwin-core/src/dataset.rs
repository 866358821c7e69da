//! The synthetic training table.

use crate::{
    Result,
    error::TwinError,
    feature::{FEATURE_COUNT, Feature, FeatureVector},
    response::{Response, ResponseMap},
};

/// One generated observation: six inputs and three measured responses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingRow {
    /// Inputs for this observation.
    pub features: FeatureVector,
    /// Noisy response values for this observation.
    pub responses: ResponseMap<f64>,
}

/// Observed `[min, max]` of one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnRange {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl ColumnRange {
    fn observe(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |range, value| Self {
                min: range.min.min(value),
                max: range.max.max(value),
            },
        )
    }

    /// Width of the range.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// An immutable, non-empty sequence of [`TrainingRow`]s.
///
/// Construct one with [`crate::generate`] or
/// [`crate::GeneratorConfig::generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSet {
    rows: Vec<TrainingRow>,
}

impl TrainingSet {
    pub(crate) fn from_rows(rows: Vec<TrainingRow>) -> Self {
        debug_assert!(!rows.is_empty(), "training sets are never empty");
        Self { rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`; generation rejects a zero row count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in generation order.
    #[must_use]
    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    /// Column names of the six predictors, in column order.
    #[must_use]
    pub fn feature_names(&self) -> [&'static str; FEATURE_COUNT] {
        Feature::ALL.map(Feature::name)
    }

    /// Column names of the three responses, in column order.
    #[must_use]
    pub fn response_names(&self) -> [&'static str; 3] {
        Response::ALL.map(Response::name)
    }

    /// Copies one predictor column.
    #[must_use]
    pub fn feature_column(&self, feature: Feature) -> Vec<f64> {
        self.rows.iter().map(|row| row.features.get(feature)).collect()
    }

    /// Copies one response column.
    #[must_use]
    pub fn response_column(&self, response: Response) -> Vec<f64> {
        self.rows.iter().map(|row| row.responses[response]).collect()
    }

    /// Observed range of one predictor column.
    #[must_use]
    pub fn feature_range(&self, feature: Feature) -> ColumnRange {
        ColumnRange::observe(self.rows.iter().map(|row| row.features.get(feature)))
    }

    /// Observed range of one response column.
    #[must_use]
    pub fn response_range(&self, response: Response) -> ColumnRange {
        ColumnRange::observe(self.rows.iter().map(|row| row.responses[response]))
    }

    /// Row-major predictor matrix used by trainers.
    pub(crate) fn design(&self) -> Vec<[f64; FEATURE_COUNT]> {
        self.rows.iter().map(|row| row.features.to_array()).collect()
    }

    /// Returns a copy whose `response` column has been replaced by `targets`.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `targets` does not hold
    /// exactly one value per row.
    pub fn with_response_column(&self, response: Response, targets: &[f64]) -> Result<Self> {
        if targets.len() != self.rows.len() {
            return Err(TwinError::invalid_config(
                "targets",
                format!(
                    "expected {} values for `{response}`, got {}",
                    self.rows.len(),
                    targets.len()
                ),
            ));
        }
        let rows = self
            .rows
            .iter()
            .zip(targets)
            .map(|(row, &target)| {
                let mut updated = *row;
                updated.responses[response] = target;
                updated
            })
            .collect();
        Ok(Self { rows })
    }
}
