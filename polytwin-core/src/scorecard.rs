//! Radar-chart scores normalised to `[0, 100]`.

use crate::response::{Response, ResponseMap};

const MAX_SCORE: f64 = 100.0;

/// Cost at which the cost score reaches zero, CNY per tonne.
const ZERO_SCORE_COST: f64 = 10_000.0;

/// Four-axis summary of a formulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scorecard {
    /// Impact strength × 4.
    pub impact: f64,
    /// Tensile strength × 3.
    pub tensile: f64,
    /// Final MFI × 5.
    pub flow: f64,
    /// `(10000 − cost) / 50`; cheaper is better.
    pub cost: f64,
}

impl Scorecard {
    /// Scores `predictions` and `cost_per_tonne`, clamping every axis.
    ///
    /// # Examples
    /// ```
    /// use polytwin_core::{Response, ResponseMap, Scorecard};
    ///
    /// let predictions = ResponseMap::from_fn(|response| match response {
    ///     Response::Impact => 30.0,
    ///     Response::Tensile => 20.0,
    ///     Response::FinalMfi => 8.0,
    /// });
    /// let card = Scorecard::from_predictions(&predictions, 7_600.0);
    /// assert_eq!(card.impact, 100.0);
    /// assert_eq!(card.tensile, 60.0);
    /// assert_eq!(card.flow, 40.0);
    /// assert_eq!(card.cost, 48.0);
    /// ```
    #[must_use]
    pub fn from_predictions(predictions: &ResponseMap<f64>, cost_per_tonne: f64) -> Self {
        Self {
            impact: clamp_score(predictions[Response::Impact] * 4.0),
            tensile: clamp_score(predictions[Response::Tensile] * 3.0),
            flow: clamp_score(predictions[Response::FinalMfi] * 5.0),
            cost: clamp_score((ZERO_SCORE_COST - cost_per_tonne) / 50.0),
        }
    }

    /// Axis values in display order: impact, tensile, flow, cost.
    #[must_use]
    pub fn axes(&self) -> [(&'static str, f64); 4] {
        [
            ("impact", self.impact),
            ("tensile", self.tensile),
            ("flow", self.flow),
            ("cost", self.cost),
        ]
    }
}

fn clamp_score(raw: f64) -> f64 {
    raw.clamp(0.0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        economics::{MaterialPrices, formulation_cost},
        test_utils::{control_vectors, suite_proptest_config},
    };
    use proptest::prelude::*;

    fn predictions(impact: f64, tensile: f64, mfi: f64) -> ResponseMap<f64> {
        ResponseMap::from_fn(|response| match response {
            Response::Impact => impact,
            Response::Tensile => tensile,
            Response::FinalMfi => mfi,
        })
    }

    #[test]
    fn scores_are_clamped_at_both_ends() {
        let card = Scorecard::from_predictions(&predictions(-4.0, 50.0, 30.0), 12_000.0);
        assert_eq!(card.impact, 0.0);
        assert_eq!(card.tensile, 100.0);
        assert_eq!(card.flow, 100.0);
        assert_eq!(card.cost, 0.0);
    }

    #[test]
    fn cheap_blends_cap_at_full_cost_score() {
        let card = Scorecard::from_predictions(&predictions(10.0, 10.0, 10.0), 4_000.0);
        assert_eq!(card.cost, 100.0);
        assert_eq!(card.axes()[0], ("impact", 40.0));
    }

    proptest! {
        #![proptest_config(suite_proptest_config(64))]

        #[test]
        fn every_axis_stays_in_bounds(
            features in control_vectors(),
            impact in -50.0..80.0_f64,
            tensile in -50.0..80.0_f64,
            mfi in -50.0..80.0_f64,
        ) {
            let cost = formulation_cost(&features, &MaterialPrices::default());
            let card = Scorecard::from_predictions(&predictions(impact, tensile, mfi), cost);
            for (axis, score) in card.axes() {
                prop_assert!((0.0..=MAX_SCORE).contains(&score), "{axis}: {score}");
            }
        }
    }
}
