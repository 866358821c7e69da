//! The digital twin handle: training data, fitted models, and dashboard
//! settings, all immutable after [`crate::DigitalTwinBuilder::build`].

use tracing::warn;

use crate::{
    Result,
    advice::{AcceptanceThresholds, Advice, AdviceThresholds, Verdicts},
    dataset::TrainingSet,
    economics::{CostEstimate, MaterialPrices, estimate_cost},
    feature::{Feature, FeatureRange, FeatureVector},
    generator::GeneratorConfig,
    model_bank::ModelBank,
    response::{Response, ResponseMap},
    scorecard::Scorecard,
    surface::{ModelKind, SurfaceModel},
    sweep::{SweepCurve, SweepSpec},
};

#[derive(Clone, Debug)]
pub(crate) struct DashboardSettings {
    pub(crate) seed: u64,
    pub(crate) model: ModelKind,
    pub(crate) generator: GeneratorConfig,
    pub(crate) prices: MaterialPrices,
    pub(crate) acceptance: AcceptanceThresholds,
    pub(crate) advice: AdviceThresholds,
}

/// Everything the dashboard shows for one formulation.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSnapshot {
    /// The evaluated inputs.
    pub features: FeatureVector,
    /// Predicted value of every response.
    pub predictions: ResponseMap<f64>,
    /// Formulation cost and trend.
    pub cost: CostEstimate,
    /// Impact and tensile acceptance.
    pub verdicts: Verdicts,
    /// Radar-chart scores.
    pub scorecard: Scorecard,
    /// Formulation guidance.
    pub advice: Advice,
    /// Features outside their training range, in column order.
    pub extrapolated: Vec<Feature>,
}

/// A fitted process twin.
///
/// Construct one with [`crate::DigitalTwinBuilder`]. The handle is
/// `Send + Sync` and never mutates, so it can be shared freely.
///
/// # Examples
/// ```
/// use polytwin_core::{Advice, DigitalTwinBuilder, FeatureVector, ForestParams, Response};
///
/// let twin = DigitalTwinBuilder::new()
///     .with_forest_params(ForestParams::new(20).expect("non-zero"))
///     .build()
///     .expect("configuration is valid");
/// let snapshot = twin.snapshot(&FeatureVector::default()).expect("finite input");
/// assert!((snapshot.cost.per_tonne - 7_600.0).abs() < 1e-9);
/// assert!(snapshot.predictions[Response::Impact] > 0.0);
/// assert!(snapshot.extrapolated.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct DigitalTwin {
    training_set: TrainingSet,
    bank: ModelBank<SurfaceModel>,
    settings: DashboardSettings,
}

impl DigitalTwin {
    pub(crate) fn new(
        training_set: TrainingSet,
        bank: ModelBank<SurfaceModel>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            training_set,
            bank,
            settings,
        }
    }

    /// The generated training data.
    #[must_use]
    pub fn training_set(&self) -> &TrainingSet {
        &self.training_set
    }

    /// The fitted per-response models.
    #[must_use]
    pub fn model_bank(&self) -> &ModelBank<SurfaceModel> {
        &self.bank
    }

    /// Seed used to generate the training data.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.settings.seed
    }

    /// The model backing the twin.
    #[must_use]
    pub fn model_kind(&self) -> &ModelKind {
        &self.settings.model
    }

    /// Material prices used for cost estimates.
    #[must_use]
    pub fn prices(&self) -> &MaterialPrices {
        &self.settings.prices
    }

    /// Range `feature` was sampled from during generation.
    #[must_use]
    pub fn training_range(&self, feature: Feature) -> FeatureRange {
        self.settings.generator.range(feature)
    }

    /// Features of `features` lying outside their training range.
    #[must_use]
    pub fn extrapolated_features(&self, features: &FeatureVector) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| !self.training_range(*feature).contains(features.get(*feature)))
            .collect()
    }

    /// Predicts one response.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] for non-finite features.
    pub fn predict(&self, response: Response, features: &FeatureVector) -> Result<f64> {
        let value = self.bank.predict(response, features)?;
        self.warn_if_extrapolating(features);
        Ok(value)
    }

    /// Predicts the response called `name`.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::UnknownResponse`] for unrecognised names
    /// and [`crate::TwinError::InvalidInput`] for non-finite features.
    pub fn predict_named(&self, name: &str, features: &FeatureVector) -> Result<f64> {
        self.predict(Response::from_name(name)?, features)
    }

    /// Predicts every response.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] for non-finite features.
    pub fn predict_all(&self, features: &FeatureVector) -> Result<ResponseMap<f64>> {
        let predictions = self.bank.predict_all(features)?;
        self.warn_if_extrapolating(features);
        Ok(predictions)
    }

    /// Runs `spec` around `base` for each of `responses`.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] when a non-swept feature of
    /// `base` is not finite.
    pub fn sweep(
        &self,
        spec: &SweepSpec,
        base: &FeatureVector,
        responses: &[Response],
    ) -> Result<SweepCurve> {
        let curve = spec.run(&self.bank, base, responses)?;
        for endpoint in [spec.start(), spec.end()] {
            self.warn_if_extrapolating(&base.with(spec.feature(), endpoint));
        }
        Ok(curve)
    }

    /// Cost and cost trend of `features` under the configured prices.
    #[must_use]
    pub fn cost(&self, features: &FeatureVector) -> CostEstimate {
        estimate_cost(features, &self.settings.prices)
    }

    /// Evaluates every dashboard panel for `features`.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] for non-finite features.
    pub fn snapshot(&self, features: &FeatureVector) -> Result<DashboardSnapshot> {
        let predictions = self.predict_all(features)?;
        let cost = self.cost(features);
        Ok(DashboardSnapshot {
            features: *features,
            predictions,
            cost,
            verdicts: self.settings.acceptance.judge(&predictions),
            scorecard: Scorecard::from_predictions(&predictions, cost.per_tonne),
            advice: self.settings.advice.advise(&predictions),
            extrapolated: self.extrapolated_features(features),
        })
    }

    fn warn_if_extrapolating(&self, features: &FeatureVector) {
        let outside = self.extrapolated_features(features);
        if outside.is_empty() {
            return;
        }
        let names: Vec<&str> = outside.iter().map(|feature| feature.name()).collect();
        warn!(
            features = %names.join(","),
            "request lies outside the training ranges; predictions are extrapolated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::DigitalTwinBuilder, forest::ForestParams};
    use rstest::{fixture, rstest};

    #[fixture]
    fn twin() -> DigitalTwin {
        DigitalTwinBuilder::new()
            .with_row_count(200)
            .with_forest_params(ForestParams::new(15).expect("non-zero tree count"))
            .build()
            .expect("configuration is valid")
    }

    #[rstest]
    #[case::in_range(FeatureVector::default(), vec![])]
    #[case::high_toughener(
        FeatureVector::default().with(Feature::Toughener, 35.0),
        vec![Feature::Toughener]
    )]
    #[case::slider_extremes(
        FeatureVector::default()
            .with(Feature::ScrewSpeed, 800.0)
            .with(Feature::BaseAsh, 0.0),
        vec![Feature::BaseAsh, Feature::ScrewSpeed]
    )]
    fn extrapolation_is_detected_per_feature(
        twin: DigitalTwin,
        #[case] features: FeatureVector,
        #[case] expected: Vec<Feature>,
    ) {
        assert_eq!(twin.extrapolated_features(&features), expected);
    }

    #[rstest]
    fn snapshot_is_consistent_with_individual_panels(twin: DigitalTwin) {
        let features = FeatureVector::default().with(Feature::Filler, 25.0);
        let snapshot = twin.snapshot(&features).expect("finite input");
        assert_eq!(
            snapshot.predictions,
            twin.predict_all(&features).expect("finite input")
        );
        assert_eq!(snapshot.cost, twin.cost(&features));
        assert_eq!(
            snapshot.scorecard,
            Scorecard::from_predictions(&snapshot.predictions, snapshot.cost.per_tonne)
        );
    }

    #[rstest]
    fn twin_is_shareable_across_threads(twin: DigitalTwin) {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        assert_send_sync(&twin);
        let features = FeatureVector::default();
        let expected = twin.predict(Response::Impact, &features).expect("finite");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| twin.predict(Response::Impact, &features)))
                .collect();
            for handle in handles {
                let value = handle.join().expect("thread completes").expect("finite");
                assert_eq!(value, expected);
            }
        });
    }
}
