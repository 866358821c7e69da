//! Acceptance verdicts and formulation advice derived from predictions.

use std::fmt;

use crate::{
    Result,
    error::TwinError,
    response::{Response, ResponseMap},
};

/// Pass/fail outcome for one property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The prediction clears its threshold.
    Pass,
    /// The prediction does not clear its threshold.
    Fail,
}

impl Verdict {
    fn strictly_above(value: f64, threshold: f64) -> Self {
        if value > threshold { Self::Pass } else { Self::Fail }
    }

    /// Short label for reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum values a formulation must exceed to be accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcceptanceThresholds {
    /// Notched impact strength, kJ/m².
    pub impact: f64,
    /// Tensile strength, MPa.
    pub tensile: f64,
}

impl Default for AcceptanceThresholds {
    fn default() -> Self {
        Self {
            impact: 15.0,
            tensile: 20.0,
        }
    }
}

/// Impact and tensile verdicts for one prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdicts {
    /// Impact strictly above [`AcceptanceThresholds::impact`].
    pub impact: Verdict,
    /// Tensile strictly above [`AcceptanceThresholds::tensile`].
    pub tensile: Verdict,
}

impl AcceptanceThresholds {
    /// Judges `predictions` against the thresholds.
    #[must_use]
    pub fn judge(&self, predictions: &ResponseMap<f64>) -> Verdicts {
        Verdicts {
            impact: Verdict::strictly_above(predictions[Response::Impact], self.impact),
            tensile: Verdict::strictly_above(predictions[Response::Tensile], self.tensile),
        }
    }

    /// Checks that both thresholds are finite.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] for a non-finite threshold.
    pub fn validate(&self) -> Result<()> {
        finite("acceptance.impact", self.impact)?;
        finite("acceptance.tensile", self.tensile)
    }
}

/// Levels below which advice is triggered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdviceThresholds {
    /// Impact below this triggers [`Advice::LowImpact`].
    pub low_impact: f64,
    /// Tensile below this triggers [`Advice::LowTensile`].
    pub low_tensile: f64,
}

impl Default for AdviceThresholds {
    fn default() -> Self {
        Self {
            low_impact: 10.0,
            low_tensile: 20.0,
        }
    }
}

impl AdviceThresholds {
    /// Picks the advice for `predictions`. Low impact takes precedence over
    /// low tensile.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::{Advice, AdviceThresholds, Response, ResponseMap};
    ///
    /// let predictions = ResponseMap::from_fn(|response| match response {
    ///     Response::Impact => 8.0,
    ///     Response::Tensile => 12.0,
    ///     Response::FinalMfi => 9.0,
    /// });
    /// assert_eq!(AdviceThresholds::default().advise(&predictions), Advice::LowImpact);
    /// ```
    #[must_use]
    pub fn advise(&self, predictions: &ResponseMap<f64>) -> Advice {
        if predictions[Response::Impact] < self.low_impact {
            Advice::LowImpact
        } else if predictions[Response::Tensile] < self.low_tensile {
            Advice::LowTensile
        } else {
            Advice::Balanced
        }
    }

    /// Checks that both thresholds are finite.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] for a non-finite threshold.
    pub fn validate(&self) -> Result<()> {
        finite("advice.low_impact", self.low_impact)?;
        finite("advice.low_tensile", self.low_tensile)
    }
}

fn finite(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TwinError::invalid_config(
            parameter,
            format!("threshold must be finite (got {value})"),
        ))
    }
}

/// Formulation guidance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advice {
    /// Impact strength is too low.
    LowImpact,
    /// Tensile strength is too low.
    LowTensile,
    /// Both properties are acceptable.
    Balanced,
}

impl Advice {
    /// One-line summary.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::LowImpact => "impact strength is low",
            Self::LowTensile => "tensile strength is low",
            Self::Balanced => "formulation is balanced",
        }
    }

    /// Recommended actions, most important first.
    #[must_use]
    pub const fn recommendations(self) -> &'static [&'static str] {
        match self {
            Self::LowImpact => &[
                "raise the POE toughener above 20 %",
                "check whether the base resin ash content is too high",
                "raise the screw speed to improve dispersion",
            ],
            Self::LowTensile => &[
                "add more talc filler",
                "reduce the POE toughener",
                "consider a lower-MFI base resin",
            ],
            Self::Balanced => &["proceed to a small-scale lab trial"],
        }
    }

    /// Whether the advice calls for a formulation change.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        !matches!(self, Self::Balanced)
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn predictions(impact: f64, tensile: f64) -> ResponseMap<f64> {
        ResponseMap::from_fn(|response| match response {
            Response::Impact => impact,
            Response::Tensile => tensile,
            Response::FinalMfi => 8.0,
        })
    }

    #[rstest]
    #[case::both_low(5.0, 10.0, Advice::LowImpact)]
    #[case::impact_low(9.99, 30.0, Advice::LowImpact)]
    #[case::tensile_low(10.0, 19.9, Advice::LowTensile)]
    #[case::balanced(10.0, 20.0, Advice::Balanced)]
    #[case::comfortable(25.0, 25.0, Advice::Balanced)]
    fn advice_prefers_impact_over_tensile(
        #[case] impact: f64,
        #[case] tensile: f64,
        #[case] expected: Advice,
    ) {
        let advice = AdviceThresholds::default().advise(&predictions(impact, tensile));
        assert_eq!(advice, expected);
    }

    #[rstest]
    #[case::at_thresholds(15.0, 20.0, Verdict::Fail, Verdict::Fail)]
    #[case::above(15.1, 20.1, Verdict::Pass, Verdict::Pass)]
    #[case::mixed(30.0, 18.0, Verdict::Pass, Verdict::Fail)]
    fn verdicts_require_strictly_greater_values(
        #[case] impact: f64,
        #[case] tensile: f64,
        #[case] impact_verdict: Verdict,
        #[case] tensile_verdict: Verdict,
    ) {
        let verdicts = AcceptanceThresholds::default().judge(&predictions(impact, tensile));
        assert_eq!(verdicts.impact, impact_verdict);
        assert_eq!(verdicts.tensile, tensile_verdict);
    }

    #[rstest]
    #[case(Advice::LowImpact, 3, true)]
    #[case(Advice::LowTensile, 3, true)]
    #[case(Advice::Balanced, 1, false)]
    fn recommendations_are_fixed(#[case] advice: Advice, #[case] count: usize, #[case] warn: bool) {
        assert_eq!(advice.recommendations().len(), count);
        assert_eq!(advice.is_warning(), warn);
    }

    #[test]
    fn non_finite_thresholds_are_rejected() {
        let thresholds = AdviceThresholds {
            low_impact: f64::NAN,
            ..AdviceThresholds::default()
        };
        assert!(thresholds.validate().is_err());
        let acceptance = AcceptanceThresholds {
            tensile: f64::INFINITY,
            ..AcceptanceThresholds::default()
        };
        assert!(acceptance.validate().is_err());
    }
}
