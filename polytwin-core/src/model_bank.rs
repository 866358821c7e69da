//! One fitted regressor per response.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, info_span, instrument};

use crate::{
    Result,
    dataset::TrainingSet,
    feature::FeatureVector,
    forest::RandomForest,
    regressor::{DesignRow, Regressor, Trainer},
    response::{Response, ResponseMap},
};

/// Batches at least this long are evaluated on the Rayon pool.
#[cfg(feature = "parallel")]
const PARALLEL_BATCH_THRESHOLD: usize = 256;

/// The predictive surface: a read-only [`ResponseMap`] of fitted models.
///
/// Every model is trained on its own response column only, so refitting one
/// response with [`ModelBank::with_refit`] never moves the others.
///
/// # Examples
/// ```
/// use polytwin_core::{
///     FeatureVector, ForestParams, ModelBank, RandomForestTrainer, Response, generate,
/// };
///
/// let set = generate(42, 200).expect("valid parameters");
/// let trainer = RandomForestTrainer::new(ForestParams::new(20).expect("non-zero"));
/// let bank = ModelBank::fit(&set, &trainer).expect("fit succeeds");
/// let impact = bank
///     .predict(Response::Impact, &FeatureVector::default())
///     .expect("finite input");
/// assert!(impact > 0.0 && impact < 40.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ModelBank<M = RandomForest> {
    models: ResponseMap<M>,
}

impl<M: Regressor> ModelBank<M> {
    /// Fits one model per response with `trainer`.
    ///
    /// # Errors
    /// Propagates the first trainer error, in response column order.
    #[instrument(name = "core.fit", err, skip(set, trainer), fields(rows = set.len()))]
    pub fn fit<T>(set: &TrainingSet, trainer: &T) -> Result<Self>
    where
        T: Trainer<Model = M>,
    {
        let design = set.design();
        let models = ResponseMap::try_from_fn(|response| fit_response(set, &design, trainer, response))?;
        info!(rows = set.len(), "model bank fitted");
        Ok(Self { models })
    }

    /// Wraps already-fitted models.
    #[must_use]
    pub fn from_models(models: ResponseMap<M>) -> Self {
        Self { models }
    }

    /// Returns the fitted model for `response`.
    #[must_use]
    pub fn model(&self, response: Response) -> &M {
        &self.models[response]
    }

    /// Predicts one response at `features`.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] when a feature is not finite.
    pub fn predict(&self, response: Response, features: &FeatureVector) -> Result<f64> {
        features.validate()?;
        Ok(self.models[response].predict_row(&features.to_array()))
    }

    /// Predicts the response called `name` (case-insensitive).
    ///
    /// # Errors
    /// Returns [`crate::TwinError::UnknownResponse`] for unrecognised names,
    /// checked before the input, and [`crate::TwinError::InvalidInput`] for
    /// non-finite features.
    pub fn predict_named(&self, name: &str, features: &FeatureVector) -> Result<f64> {
        let response = Response::from_name(name)?;
        self.predict(response, features)
    }

    /// Predicts one response for every vector in `batch`, preserving order.
    ///
    /// Each element equals what [`ModelBank::predict`] returns for it.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] for the first non-finite
    /// vector; no partial output is produced.
    pub fn predict_batch(&self, response: Response, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        let rows = batch
            .iter()
            .map(|features| features.validate().map(|()| features.to_array()))
            .collect::<Result<Vec<DesignRow>>>()?;
        let model = &self.models[response];

        #[cfg(feature = "parallel")]
        if rows.len() >= PARALLEL_BATCH_THRESHOLD {
            return Ok(rows.par_iter().map(|row| model.predict_row(row)).collect());
        }

        Ok(rows.iter().map(|row| model.predict_row(row)).collect())
    }

    /// Named variant of [`ModelBank::predict_batch`].
    ///
    /// # Errors
    /// As [`ModelBank::predict_named`].
    pub fn predict_batch_named(&self, name: &str, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        let response = Response::from_name(name)?;
        self.predict_batch(response, batch)
    }

    /// Predicts every response at `features`.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidInput`] when a feature is not finite.
    pub fn predict_all(&self, features: &FeatureVector) -> Result<ResponseMap<f64>> {
        features.validate()?;
        let row = features.to_array();
        Ok(ResponseMap::from_fn(|response| {
            self.models[response].predict_row(&row)
        }))
    }

    /// Returns a bank in which only `response` has been refit on `set`.
    ///
    /// # Errors
    /// Propagates the trainer error for `response`.
    pub fn with_refit<T>(&self, response: Response, set: &TrainingSet, trainer: &T) -> Result<Self>
    where
        T: Trainer<Model = M>,
        M: Clone,
    {
        let refit = fit_response(set, &set.design(), trainer, response)?;
        let mut models = self.models.clone();
        models[response] = refit;
        Ok(Self { models })
    }
}

fn fit_response<T: Trainer>(
    set: &TrainingSet,
    design: &[DesignRow],
    trainer: &T,
    response: Response,
) -> Result<T::Model> {
    let span = info_span!("core.fit_response", response = %response);
    let _entered = span.enter();
    let targets = set.response_column(response);
    trainer.fit(design, &targets, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::TwinError,
        feature::Feature,
        forest::{ForestParams, RandomForestTrainer},
        generator::generate,
        linear::LeastSquaresTrainer,
    };
    use rstest::{fixture, rstest};

    #[fixture]
    fn set() -> TrainingSet {
        generate(42, 150).expect("valid parameters")
    }

    fn small_forest() -> RandomForestTrainer {
        RandomForestTrainer::new(ForestParams::new(12).expect("non-zero tree count"))
    }

    #[rstest]
    fn named_and_typed_predictions_agree(set: TrainingSet) {
        let bank = ModelBank::fit(&set, &small_forest()).expect("fit succeeds");
        let input = FeatureVector::default();
        for response in Response::ALL {
            let typed = bank.predict(response, &input).expect("finite input");
            let named = bank
                .predict_named(&response.name().to_lowercase(), &input)
                .expect("known name");
            assert_eq!(typed, named);
        }
    }

    #[rstest]
    fn unknown_name_is_reported_before_input_checks(set: TrainingSet) {
        let bank = ModelBank::fit(&set, &small_forest()).expect("fit succeeds");
        let bad = FeatureVector::default().with(Feature::Filler, f64::NAN);
        let err = bank
            .predict_named("Elongation", &bad)
            .expect_err("unknown response");
        assert_eq!(
            err,
            TwinError::UnknownResponse {
                name: "Elongation".into()
            }
        );
    }

    #[rstest]
    fn predict_all_matches_single_predictions(set: TrainingSet) {
        let bank = ModelBank::fit(&set, &LeastSquaresTrainer::default()).expect("fit succeeds");
        let input = FeatureVector::default().with(Feature::Toughener, 22.0);
        let all = bank.predict_all(&input).expect("finite input");
        for response in Response::ALL {
            assert_eq!(all[response], bank.predict(response, &input).expect("finite input"));
        }
    }

    #[rstest]
    fn batch_rejects_any_non_finite_vector(set: TrainingSet) {
        let bank = ModelBank::fit(&set, &small_forest()).expect("fit succeeds");
        let batch = [
            FeatureVector::default(),
            FeatureVector::default().with(Feature::ScrewSpeed, f64::INFINITY),
        ];
        let err = bank
            .predict_batch(Response::Tensile, &batch)
            .expect_err("non-finite input");
        assert!(matches!(
            err,
            TwinError::InvalidInput {
                feature: Feature::ScrewSpeed,
                ..
            }
        ));
    }

    #[rstest]
    fn large_batches_match_single_predictions(set: TrainingSet) {
        let bank = ModelBank::fit(&set, &small_forest()).expect("fit succeeds");
        let batch: Vec<FeatureVector> = (0..400_i32)
            .map(|i| FeatureVector::default().with(Feature::Filler, f64::from(i) / 10.0))
            .collect();
        let predictions = bank
            .predict_batch(Response::Impact, &batch)
            .expect("finite input");
        assert_eq!(predictions.len(), batch.len());
        for (features, prediction) in batch.iter().zip(&predictions) {
            let single = bank.predict(Response::Impact, features).expect("finite input");
            assert_eq!(single.to_bits(), prediction.to_bits());
        }
    }

    #[rstest]
    fn refit_touches_only_the_requested_response(set: TrainingSet) {
        let trainer = small_forest();
        let bank = ModelBank::fit(&set, &trainer).expect("fit succeeds");
        let shifted: Vec<f64> = set
            .response_column(Response::Tensile)
            .iter()
            .map(|value| value + 100.0)
            .collect();
        let perturbed = set
            .with_response_column(Response::Tensile, &shifted)
            .expect("one target per row");
        let refit = bank
            .with_refit(Response::Tensile, &perturbed, &trainer)
            .expect("refit succeeds");
        assert_eq!(refit.model(Response::Impact), bank.model(Response::Impact));
        assert_eq!(refit.model(Response::FinalMfi), bank.model(Response::FinalMfi));
        assert_ne!(refit.model(Response::Tensile), bank.model(Response::Tensile));
    }
}
