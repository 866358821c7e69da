//! Formulation and process inputs.
//!
//! [`Feature`] names the six predictor columns and [`FeatureVector`] carries
//! one value per column. Values are plain `f64`s: fractions are percentages
//! and are not required to sum to 100.

use std::{fmt, str::FromStr};

use crate::{
    Result,
    error::{InputProblem, TwinError},
};

/// Number of predictor columns.
pub const FEATURE_COUNT: usize = 6;

/// One of the six predictor columns.
///
/// # Examples
/// ```
/// use polytwin_core::Feature;
///
/// let feature: Feature = "poe".parse().expect("known feature");
/// assert_eq!(feature, Feature::Toughener);
/// assert_eq!(feature.name(), "POE_Ratio");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Feature {
    /// Melt-flow index of the recycled base resin.
    BaseMfi,
    /// Ash (impurity) content of the base resin.
    BaseAsh,
    /// POE toughener loading.
    Toughener,
    /// Talc filler loading.
    Filler,
    /// Extruder screw rotation speed.
    ScrewSpeed,
    /// Extruder barrel temperature.
    BarrelTemperature,
}

impl Feature {
    /// All features in column order.
    pub const ALL: [Self; FEATURE_COUNT] = [
        Self::BaseMfi,
        Self::BaseAsh,
        Self::Toughener,
        Self::Filler,
        Self::ScrewSpeed,
        Self::BarrelTemperature,
    ];

    /// Column position of this feature in design matrices.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::BaseMfi => 0,
            Self::BaseAsh => 1,
            Self::Toughener => 2,
            Self::Filler => 3,
            Self::ScrewSpeed => 4,
            Self::BarrelTemperature => 5,
        }
    }

    /// Training-set column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseMfi => "rPP_MFI",
            Self::BaseAsh => "rPP_Ash",
            Self::Toughener => "POE_Ratio",
            Self::Filler => "Talc_Ratio",
            Self::ScrewSpeed => "Screw_RPM",
            Self::BarrelTemperature => "Barrel_Temp",
        }
    }

    /// Short kebab-case name used on the command line.
    #[must_use]
    pub const fn cli_name(self) -> &'static str {
        match self {
            Self::BaseMfi => "base-mfi",
            Self::BaseAsh => "base-ash",
            Self::Toughener => "poe",
            Self::Filler => "talc",
            Self::ScrewSpeed => "screw-speed",
            Self::BarrelTemperature => "barrel-temp",
        }
    }

    /// Display unit.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::BaseMfi => "g/10min",
            Self::BaseAsh | Self::Toughener | Self::Filler => "%",
            Self::ScrewSpeed => "RPM",
            Self::BarrelTemperature => "°C",
        }
    }

    /// Range an operator can dial in on the control panel.
    ///
    /// This is wider than the default training range for several features,
    /// so predictions near the top of a control range extrapolate.
    #[must_use]
    pub const fn control_range(self) -> FeatureRange {
        match self {
            Self::BaseMfi => FeatureRange::new_unchecked(5.0, 30.0),
            Self::BaseAsh => FeatureRange::new_unchecked(0.0, 5.0),
            Self::Toughener => FeatureRange::new_unchecked(0.0, 40.0),
            Self::Filler => FeatureRange::new_unchecked(0.0, 50.0),
            Self::ScrewSpeed => FeatureRange::new_unchecked(100.0, 800.0),
            Self::BarrelTemperature => FeatureRange::new_unchecked(180.0, 240.0),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = TwinError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|feature| {
                feature.name().eq_ignore_ascii_case(trimmed)
                    || feature.cli_name().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| TwinError::UnknownFeature {
                name: trimmed.to_owned(),
            })
    }
}

/// Closed interval `[min, max]` over one feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRange {
    min: f64,
    max: f64,
}

impl FeatureRange {
    /// Creates a range after checking both bounds are finite and ordered.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when a bound is not finite or
    /// `min > max`.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::FeatureRange;
    ///
    /// let range = FeatureRange::new(0.0, 30.0).expect("ordered bounds");
    /// assert!(range.contains(12.0));
    /// assert!(FeatureRange::new(3.0, 1.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(TwinError::invalid_config(
                "feature_range",
                format!("bounds must be finite (got {min}..{max})"),
            ));
        }
        if min > max {
            return Err(TwinError::invalid_config(
                "feature_range",
                format!("min {min} exceeds max {max}"),
            ));
        }
        Ok(Self { min, max })
    }

    pub(crate) const fn new_unchecked(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Whether `value` lies inside the closed interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// The six process and formulation inputs describing one compound.
///
/// The [`Default`] value matches the control-panel defaults.
///
/// # Examples
/// ```
/// use polytwin_core::{Feature, FeatureVector};
///
/// let v = FeatureVector::default().with(Feature::Toughener, 25.0);
/// assert_eq!(v.get(Feature::Toughener), 25.0);
/// assert_eq!(v.get(Feature::BaseMfi), 12.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector {
    /// Base resin melt-flow index, g/10min.
    pub base_mfi: f64,
    /// Base resin ash content, %.
    pub base_ash: f64,
    /// POE toughener loading, %.
    pub toughener: f64,
    /// Talc filler loading, %.
    pub filler: f64,
    /// Screw speed, RPM.
    pub screw_speed: f64,
    /// Barrel temperature, °C.
    pub barrel_temperature: f64,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            base_mfi: 12.0,
            base_ash: 1.5,
            toughener: 15.0,
            filler: 10.0,
            screw_speed: 350.0,
            barrel_temperature: 210.0,
        }
    }
}

impl FeatureVector {
    /// Builds a vector from values in [`Feature::ALL`] order.
    #[must_use]
    pub const fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [
            base_mfi,
            base_ash,
            toughener,
            filler,
            screw_speed,
            barrel_temperature,
        ] = values;
        Self {
            base_mfi,
            base_ash,
            toughener,
            filler,
            screw_speed,
            barrel_temperature,
        }
    }

    /// Builds a vector from `(feature, value)` pairs.
    ///
    /// Later pairs overwrite earlier ones for the same feature.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidInput`] with [`InputProblem::Missing`] when
    /// a feature is absent, or [`InputProblem::NonFinite`] when a value is NaN
    /// or infinite.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::{Feature, FeatureVector, TwinError};
    ///
    /// let partial = [(Feature::BaseMfi, 10.0)];
    /// let err = FeatureVector::from_pairs(partial).expect_err("five fields missing");
    /// assert!(matches!(err, TwinError::InvalidInput { feature: Feature::BaseAsh, .. }));
    /// ```
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Feature, f64)>) -> Result<Self> {
        let mut slots: [Option<f64>; FEATURE_COUNT] = [None; FEATURE_COUNT];
        for (feature, value) in pairs {
            if let Some(slot) = slots.get_mut(feature.index()) {
                *slot = Some(value);
            }
        }
        let mut values = [0.0_f64; FEATURE_COUNT];
        for (feature, (slot, value)) in Feature::ALL.into_iter().zip(slots.iter().zip(&mut values))
        {
            *value = slot.ok_or(TwinError::InvalidInput {
                feature,
                problem: InputProblem::Missing,
            })?;
        }
        let vector = Self::from_array(values);
        vector.validate()?;
        Ok(vector)
    }

    /// Returns the value for `feature`.
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::BaseMfi => self.base_mfi,
            Feature::BaseAsh => self.base_ash,
            Feature::Toughener => self.toughener,
            Feature::Filler => self.filler,
            Feature::ScrewSpeed => self.screw_speed,
            Feature::BarrelTemperature => self.barrel_temperature,
        }
    }

    /// Overwrites the value for `feature`.
    pub const fn set(&mut self, feature: Feature, value: f64) {
        match feature {
            Feature::BaseMfi => self.base_mfi = value,
            Feature::BaseAsh => self.base_ash = value,
            Feature::Toughener => self.toughener = value,
            Feature::Filler => self.filler = value,
            Feature::ScrewSpeed => self.screw_speed = value,
            Feature::BarrelTemperature => self.barrel_temperature = value,
        }
    }

    /// Returns a copy with `feature` replaced by `value`.
    #[must_use]
    pub const fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Values in [`Feature::ALL`] order.
    #[must_use]
    pub const fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.base_mfi,
            self.base_ash,
            self.toughener,
            self.filler,
            self.screw_speed,
            self.barrel_temperature,
        ]
    }

    /// Checks that every value is finite.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidInput`] naming the first non-finite field.
    pub fn validate(&self) -> Result<()> {
        for feature in Feature::ALL {
            let value = self.get(feature);
            if !value.is_finite() {
                return Err(TwinError::InvalidInput {
                    feature,
                    problem: InputProblem::NonFinite(value),
                });
            }
        }
        Ok(())
    }
}
