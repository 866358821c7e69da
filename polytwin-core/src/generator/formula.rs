//! Affine response formulas used to synthesise training targets.

use crate::{
    Result,
    error::TwinError,
    feature::{FEATURE_COUNT, Feature, FeatureVector},
    response::Response,
};

/// `intercept + Σ coefficient·feature + N(0, noise_sd)`.
///
/// # Examples
/// ```
/// use polytwin_core::{AffineFormula, FeatureVector, Response};
///
/// let impact = AffineFormula::default_for(Response::Impact);
/// let expected = impact.expected(&FeatureVector::default());
/// assert!((expected - 28.1).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineFormula {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
    noise_sd: f64,
}

impl AffineFormula {
    /// Creates a formula with coefficients in [`Feature::ALL`] order.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when any term is not finite or
    /// `noise_sd` is negative.
    pub fn new(intercept: f64, coefficients: [f64; FEATURE_COUNT], noise_sd: f64) -> Result<Self> {
        let formula = Self {
            intercept,
            coefficients,
            noise_sd,
        };
        formula.validate()?;
        Ok(formula)
    }

    /// The default formula for `response`.
    ///
    /// Impact rises with toughener and falls with filler and ash; tensile
    /// rises with filler and falls with toughener and ash; final MFI tracks
    /// the base resin, drops with filler and creeps up with barrel
    /// temperature above 180 °C.
    #[must_use]
    pub const fn default_for(response: Response) -> Self {
        match response {
            Response::Impact => Self {
                intercept: 3.0,
                coefficients: [0.0, -0.6, 1.8, -0.1, 0.0, 0.0],
                noise_sd: 1.5,
            },
            Response::Tensile => Self {
                intercept: 22.0,
                coefficients: [0.0, -0.5, -0.4, 0.5, 0.0, 0.0],
                noise_sd: 1.5,
            },
            Response::FinalMfi => Self {
                intercept: -1.8,
                coefficients: [0.8, 0.0, 0.0, -0.2, 0.0, 0.01],
                noise_sd: 1.0,
            },
        }
    }

    /// Returns a copy with a different noise standard deviation.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `noise_sd` is negative or
    /// not finite.
    pub fn with_noise_sd(self, noise_sd: f64) -> Result<Self> {
        Self::new(self.intercept, self.coefficients, noise_sd)
    }

    /// Constant term.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient applied to `feature`.
    #[must_use]
    pub const fn coefficient(&self, feature: Feature) -> f64 {
        let [mfi, ash, poe, talc, rpm, temp] = self.coefficients;
        match feature {
            Feature::BaseMfi => mfi,
            Feature::BaseAsh => ash,
            Feature::Toughener => poe,
            Feature::Filler => talc,
            Feature::ScrewSpeed => rpm,
            Feature::BarrelTemperature => temp,
        }
    }

    /// Standard deviation of the additive Gaussian noise.
    #[must_use]
    pub const fn noise_sd(&self) -> f64 {
        self.noise_sd
    }

    /// Noise-free value at `features`.
    #[must_use]
    pub fn expected(&self, features: &FeatureVector) -> f64 {
        features
            .to_array()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (value, coefficient)| {
                value.mul_add(*coefficient, acc)
            })
    }

    fn validate(&self) -> Result<()> {
        if !self.intercept.is_finite() {
            return Err(TwinError::invalid_config(
                "formula.intercept",
                format!("intercept must be finite (got {})", self.intercept),
            ));
        }
        if let Some(feature) = Feature::ALL
            .into_iter()
            .find(|feature| !self.coefficient(*feature).is_finite())
        {
            return Err(TwinError::invalid_config(
                "formula.coefficients",
                format!("coefficient for `{feature}` must be finite"),
            ));
        }
        if !self.noise_sd.is_finite() || self.noise_sd < 0.0 {
            return Err(TwinError::invalid_config(
                "formula.noise_sd",
                format!("noise_sd must be finite and >= 0 (got {})", self.noise_sd),
            ));
        }
        Ok(())
    }
}
