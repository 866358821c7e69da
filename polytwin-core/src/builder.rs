//! Builder for [`DigitalTwin`] handles.
//!
//! Collects generator, model, and dashboard configuration, validates it, and
//! runs generation plus fitting once in [`DigitalTwinBuilder::build`].

use tracing::{info, instrument};

use crate::{
    Result,
    advice::{AcceptanceThresholds, AdviceThresholds},
    economics::MaterialPrices,
    forest::ForestParams,
    generator::{DEFAULT_ROW_COUNT, DEFAULT_SEED, GeneratorConfig},
    model_bank::ModelBank,
    surface::ModelKind,
    twin::{DashboardSettings, DigitalTwin},
};

/// Configures and constructs [`DigitalTwin`] instances.
///
/// # Examples
/// ```
/// use polytwin_core::{DigitalTwinBuilder, ForestParams};
///
/// let twin = DigitalTwinBuilder::new()
///     .with_seed(7)
///     .with_row_count(120)
///     .with_forest_params(ForestParams::new(10).expect("non-zero"))
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(twin.training_set().len(), 120);
/// assert_eq!(twin.seed(), 7);
/// ```
#[derive(Clone, Debug)]
pub struct DigitalTwinBuilder {
    seed: u64,
    row_count: usize,
    generator: GeneratorConfig,
    model: ModelKind,
    prices: MaterialPrices,
    acceptance: AcceptanceThresholds,
    advice: AdviceThresholds,
}

impl Default for DigitalTwinBuilder {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            row_count: DEFAULT_ROW_COUNT,
            generator: GeneratorConfig::default(),
            model: ModelKind::default(),
            prices: MaterialPrices::default(),
            acceptance: AcceptanceThresholds::default(),
            advice: AdviceThresholds::default(),
        }
    }
}

impl DigitalTwinBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::DigitalTwinBuilder;
    ///
    /// let builder = DigitalTwinBuilder::new();
    /// assert_eq!(builder.seed(), 42);
    /// assert_eq!(builder.row_count(), 500);
    /// assert_eq!(builder.model().label(), "forest");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds synthetic data generation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of generated training rows.
    #[must_use]
    pub fn with_row_count(mut self, rows: usize) -> Self {
        self.row_count = rows;
        self
    }

    /// Replaces the generator's ranges and formulas.
    #[must_use]
    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Selects the random forest with `params`.
    #[must_use]
    pub fn with_forest_params(mut self, params: ForestParams) -> Self {
        self.model = ModelKind::Forest(params);
        self
    }

    /// Selects least squares with an optional ridge term.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::DigitalTwinBuilder;
    ///
    /// let builder = DigitalTwinBuilder::new().with_least_squares(Some(0.5));
    /// assert_eq!(builder.model().label(), "linear");
    /// ```
    #[must_use]
    pub fn with_least_squares(mut self, ridge: Option<f64>) -> Self {
        self.model = ModelKind::LeastSquares { ridge };
        self
    }

    /// Selects the model directly.
    #[must_use]
    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    /// Overrides the material prices used for cost estimates.
    #[must_use]
    pub fn with_prices(mut self, prices: MaterialPrices) -> Self {
        self.prices = prices;
        self
    }

    /// Overrides the acceptance thresholds.
    #[must_use]
    pub fn with_acceptance(mut self, acceptance: AcceptanceThresholds) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Overrides the advice thresholds.
    #[must_use]
    pub fn with_advice(mut self, advice: AdviceThresholds) -> Self {
        self.advice = advice;
        self
    }

    /// Configured generation seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Configured training row count.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Configured model.
    #[must_use]
    pub fn model(&self) -> &ModelKind {
        &self.model
    }

    /// Validates the configuration, generates training data, and fits one
    /// model per response.
    ///
    /// # Errors
    /// Returns [`crate::TwinError::InvalidConfig`] for invalid settings and
    /// [`crate::TwinError::DegenerateTraining`] when fitting fails.
    #[instrument(
        name = "core.build",
        err,
        skip(self),
        fields(seed = self.seed, rows = self.row_count, model = self.model.label()),
    )]
    pub fn build(self) -> Result<DigitalTwin> {
        self.prices.validate()?;
        self.acceptance.validate()?;
        self.advice.validate()?;
        let trainer = self.model.trainer()?;

        let training_set = self.generator.generate(self.seed, self.row_count)?;
        let bank = ModelBank::fit(&training_set, &trainer)?;
        info!(
            seed = self.seed,
            rows = training_set.len(),
            model = self.model.label(),
            "digital twin ready"
        );
        Ok(DigitalTwin::new(
            training_set,
            bank,
            DashboardSettings {
                seed: self.seed,
                model: self.model,
                generator: self.generator,
                prices: self.prices,
                acceptance: self.acceptance,
                advice: self.advice,
            },
        ))
    }
}
