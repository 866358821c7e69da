//! One-dimensional sensitivity sweeps.

use tracing::instrument;

use crate::{
    Result,
    error::TwinError,
    feature::{Feature, FeatureVector},
    model_bank::ModelBank,
    regressor::Regressor,
    response::Response,
};

/// Default number of grid points, matching the dashboard curve.
pub const DEFAULT_SWEEP_POINTS: usize = 50;

/// Largest accepted grid size.
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Varies one feature across an inclusive, evenly spaced grid.
///
/// # Examples
/// ```
/// use polytwin_core::{Feature, SweepSpec};
///
/// let spec = SweepSpec::new(Feature::Toughener, 0.0, 40.0, 5).expect("valid sweep");
/// assert_eq!(spec.grid(), vec![0.0, 10.0, 20.0, 30.0, 40.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepSpec {
    feature: Feature,
    start: f64,
    end: f64,
    points: usize,
}

impl SweepSpec {
    /// Creates a sweep of `feature` from `start` to `end` with `points`
    /// samples. `start > end` sweeps downwards.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `points` is zero or above
    /// [`MAX_SWEEP_POINTS`], or when a bound or the width `end - start` is
    /// not finite.
    pub fn new(feature: Feature, start: f64, end: f64, points: usize) -> Result<Self> {
        if points == 0 {
            return Err(TwinError::invalid_config(
                "points",
                "a sweep needs at least one point",
            ));
        }
        if points > MAX_SWEEP_POINTS {
            return Err(TwinError::invalid_config(
                "points",
                format!("at most {MAX_SWEEP_POINTS} points are supported (got {points})"),
            ));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(TwinError::invalid_config(
                "sweep bounds",
                format!("sweep bounds must be finite (got {start}..={end})"),
            ));
        }
        if !(end - start).is_finite() {
            return Err(TwinError::invalid_config(
                "sweep bounds",
                format!("sweep width overflows (got {start}..={end})"),
            ));
        }
        Ok(Self {
            feature,
            start,
            end,
            points,
        })
    }

    /// Toughener from 0 to 40 % over [`DEFAULT_SWEEP_POINTS`] points.
    #[must_use]
    pub fn toughener_default() -> Self {
        Self {
            feature: Feature::Toughener,
            start: 0.0,
            end: 40.0,
            points: DEFAULT_SWEEP_POINTS,
        }
    }

    /// The swept feature.
    #[must_use]
    pub fn feature(&self) -> Feature {
        self.feature
    }

    /// First grid value.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Last grid value.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Number of grid points.
    #[must_use]
    pub fn points(&self) -> usize {
        self.points
    }

    /// The inclusive grid. A single point yields `[start]`; otherwise the
    /// last value is exactly `end`.
    #[must_use]
    pub fn grid(&self) -> Vec<f64> {
        if self.points == 1 {
            return vec![self.start];
        }
        let last = self.points - 1;
        let step = (self.end - self.start) / last as f64;
        (0..self.points)
            .map(|index| {
                if index == last {
                    self.end
                } else {
                    (index as f64).mul_add(step, self.start)
                }
            })
            .collect()
    }

    /// One input vector per grid value, holding the other features at `base`.
    #[must_use]
    pub fn vectors(&self, base: &FeatureVector) -> Vec<FeatureVector> {
        self.grid()
            .into_iter()
            .map(|value| base.with(self.feature, value))
            .collect()
    }

    /// Evaluates the sweep against `bank` for each of `responses`.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidInput`] when `base` holds a non-finite
    /// value in a feature other than the swept one.
    #[instrument(
        name = "core.sweep",
        err,
        skip(self, bank, base, responses),
        fields(feature = %self.feature, points = self.points),
    )]
    pub fn run<M: Regressor>(
        &self,
        bank: &ModelBank<M>,
        base: &FeatureVector,
        responses: &[Response],
    ) -> Result<SweepCurve> {
        let vectors = self.vectors(base);
        let series = responses
            .iter()
            .map(|&response| {
                bank.predict_batch(response, &vectors)
                    .map(|values| (response, values))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SweepCurve {
            feature: self.feature,
            grid: self.grid(),
            series,
        })
    }
}

/// Predictions along a sweep grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepCurve {
    /// The swept feature.
    pub feature: Feature,
    /// Grid values of the swept feature.
    pub grid: Vec<f64>,
    /// One prediction series per requested response, in request order.
    pub series: Vec<(Response, Vec<f64>)>,
}

impl SweepCurve {
    /// The prediction series for `response`, if it was requested.
    #[must_use]
    pub fn series(&self, response: Response) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(candidate, _)| *candidate == response)
            .map(|(_, values)| values.as_slice())
    }

    /// Mean first difference of the `response` series; positive means the
    /// response rises on average along the grid.
    ///
    /// Returns `None` when `response` was not requested or the grid has a
    /// single point.
    #[must_use]
    pub fn trend(&self, response: Response) -> Option<f64> {
        let values = self.series(response)?;
        let steps = values.len().checked_sub(1).filter(|steps| *steps > 0)?;
        let total: f64 = values.windows(2).map(|pair| pair[1] - pair[0]).sum();
        Some(total / steps as f64)
    }
}
