//! Deterministic synthetic training-set generation.
//!
//! Each row draws the six features independently and uniformly from their
//! configured ranges, then evaluates one [`AffineFormula`] per response with
//! its own Gaussian noise draw. A fixed seed and row count always reproduce
//! the same rows bit for bit.

mod formula;

pub use formula::AffineFormula;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, instrument};

use crate::{
    Result,
    dataset::{TrainingRow, TrainingSet},
    error::TwinError,
    feature::{FEATURE_COUNT, Feature, FeatureRange, FeatureVector},
    response::{Response, ResponseMap},
};

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

/// Row count used when the caller does not pick one.
pub const DEFAULT_ROW_COUNT: usize = 500;

/// Generates a training set with the default [`GeneratorConfig`].
///
/// # Errors
/// Returns [`TwinError::InvalidConfig`] when `rows` is zero.
///
/// # Examples
/// ```
/// use polytwin_core::generate;
///
/// let first = generate(42, 50).expect("valid parameters");
/// let second = generate(42, 50).expect("valid parameters");
/// assert_eq!(first, second);
/// assert_eq!(first.len(), 50);
/// ```
pub fn generate(seed: u64, rows: usize) -> Result<TrainingSet> {
    GeneratorConfig::default().generate(seed, rows)
}

/// Feature ranges and response formulas for the generator.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    ranges: [FeatureRange; FEATURE_COUNT],
    formulas: ResponseMap<AffineFormula>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            ranges: Feature::ALL.map(default_training_range),
            formulas: ResponseMap::from_fn(AffineFormula::default_for),
        }
    }
}

const fn default_training_range(feature: Feature) -> FeatureRange {
    match feature {
        Feature::BaseMfi => FeatureRange::new_unchecked(5.0, 25.0),
        Feature::BaseAsh => FeatureRange::new_unchecked(0.5, 5.0),
        Feature::Toughener => FeatureRange::new_unchecked(0.0, 30.0),
        Feature::Filler => FeatureRange::new_unchecked(0.0, 40.0),
        Feature::ScrewSpeed => FeatureRange::new_unchecked(200.0, 600.0),
        Feature::BarrelTemperature => FeatureRange::new_unchecked(180.0, 230.0),
    }
}

impl GeneratorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the sampling range of one feature.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::{Feature, FeatureRange, GeneratorConfig};
    ///
    /// let range = FeatureRange::new(0.0, 40.0).expect("ordered");
    /// let config = GeneratorConfig::new().with_range(Feature::Toughener, range);
    /// assert_eq!(config.range(Feature::Toughener).max(), 40.0);
    /// ```
    #[must_use]
    pub fn with_range(mut self, feature: Feature, range: FeatureRange) -> Self {
        if let Some(slot) = self.ranges.get_mut(feature.index()) {
            *slot = range;
        }
        self
    }

    /// Overrides the formula of one response.
    #[must_use]
    pub fn with_formula(mut self, response: Response, formula: AffineFormula) -> Self {
        self.formulas[response] = formula;
        self
    }

    /// Returns the sampling range of `feature`.
    #[must_use]
    pub fn range(&self, feature: Feature) -> FeatureRange {
        self.ranges
            .get(feature.index())
            .copied()
            .unwrap_or_else(|| default_training_range(feature))
    }

    /// Returns the formula of `response`.
    #[must_use]
    pub fn formula(&self, response: Response) -> &AffineFormula {
        &self.formulas[response]
    }

    /// Generates `rows` training rows from `seed`.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `rows` is zero.
    #[instrument(name = "core.generate", err, skip(self), fields(seed = seed, rows = rows))]
    pub fn generate(&self, seed: u64, rows: usize) -> Result<TrainingSet> {
        if rows == 0 {
            return Err(TwinError::invalid_config(
                "rows",
                "row count must be at least 1",
            ));
        }
        let noise = self.noise_distributions()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let generated: Vec<TrainingRow> = (0..rows)
            .map(|_| self.sample_row(&noise, &mut rng))
            .collect();
        debug!(rows = generated.len(), "synthetic training set generated");
        Ok(TrainingSet::from_rows(generated))
    }

    fn noise_distributions(&self) -> Result<ResponseMap<Normal<f64>>> {
        ResponseMap::try_from_fn(|response| {
            let sd = self.formulas[response].noise_sd();
            Normal::new(0.0, sd).map_err(|error| {
                TwinError::invalid_config("formula.noise_sd", format!("{response}: {error}"))
            })
        })
    }

    fn sample_row(&self, noise: &ResponseMap<Normal<f64>>, rng: &mut SmallRng) -> TrainingRow {
        let features = FeatureVector::from_array(self.ranges.map(|range| sample_uniform(range, rng)));
        let responses = ResponseMap::from_fn(|response| {
            self.formulas[response].expected(&features) + noise[response].sample(rng)
        });
        TrainingRow {
            features,
            responses,
        }
    }
}

fn sample_uniform(range: FeatureRange, rng: &mut SmallRng) -> f64 {
    if range.is_degenerate() {
        return range.min();
    }
    rng.gen_range(range.min()..range.max())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rejects_zero_rows() {
        let err = generate(DEFAULT_SEED, 0).expect_err("zero rows must fail");
        assert!(matches!(
            err,
            TwinError::InvalidConfig {
                parameter: "rows",
                ..
            }
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(DEFAULT_ROW_COUNT)]
    fn produces_requested_row_count(#[case] rows: usize) {
        let set = generate(DEFAULT_SEED, rows).expect("valid parameters");
        assert_eq!(set.len(), rows);
    }

    #[test]
    fn features_stay_within_configured_ranges() {
        let config = GeneratorConfig::default();
        let set = config.generate(7, 300).expect("valid parameters");
        for feature in Feature::ALL {
            let range = config.range(feature);
            for value in set.feature_column(feature) {
                assert!(range.contains(value), "{feature}: {value} outside range");
            }
        }
    }

    #[test]
    fn degenerate_range_yields_constant_column() {
        let range = FeatureRange::new(210.0, 210.0).expect("degenerate ranges are valid");
        let config = GeneratorConfig::default().with_range(Feature::BarrelTemperature, range);
        let set = config.generate(3, 20).expect("valid parameters");
        assert!(
            set.feature_column(Feature::BarrelTemperature)
                .iter()
                .all(|value| *value == 210.0)
        );
    }

    #[test]
    fn zero_noise_reproduces_formula_exactly() {
        let mut config = GeneratorConfig::default();
        for response in Response::ALL {
            let quiet = config
                .formula(response)
                .with_noise_sd(0.0)
                .expect("zero noise is valid");
            config = config.with_formula(response, quiet);
        }
        let set = config.generate(11, 25).expect("valid parameters");
        for row in set.rows() {
            for response in Response::ALL {
                let expected = config.formula(response).expected(&row.features);
                assert_eq!(row.responses[response], expected);
            }
        }
    }

    #[test]
    fn different_seeds_give_different_rows() {
        let first = generate(1, 10).expect("valid parameters");
        let second = generate(2, 10).expect("valid parameters");
        assert_ne!(first, second);
    }
}
