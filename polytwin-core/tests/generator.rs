//! Tests for synthetic training-set generation.

mod common;

use common::proptest_config;
use polytwin_core::{
    AffineFormula, Feature, FeatureRange, GeneratorConfig, Response, TwinError, generate,
};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn reference_generation_is_reproducible() {
    let first = generate(42, 500).expect("valid parameters");
    let second = generate(42, 500).expect("valid parameters");
    assert_eq!(first.len(), 500);
    for (left, right) in first.rows().iter().zip(second.rows()) {
        for (a, b) in left.features.to_array().iter().zip(right.features.to_array()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        for response in Response::ALL {
            assert_eq!(
                left.responses[response].to_bits(),
                right.responses[response].to_bits()
            );
        }
    }
}

#[test]
fn names_are_exposed_for_labelling() {
    let set = generate(1, 3).expect("valid parameters");
    assert_eq!(
        set.feature_names(),
        [
            "rPP_MFI",
            "rPP_Ash",
            "POE_Ratio",
            "Talc_Ratio",
            "Screw_RPM",
            "Barrel_Temp"
        ]
    );
    assert_eq!(set.response_names(), ["Impact", "Tensile", "Final_MFI"]);
}

#[test]
fn responses_track_their_formulas_on_average() {
    let config = GeneratorConfig::default();
    let set = config.generate(42, 500).expect("valid parameters");
    for response in Response::ALL {
        let formula = config.formula(response);
        let residual_mean: f64 = set
            .rows()
            .iter()
            .map(|row| row.responses[response] - formula.expected(&row.features))
            .sum::<f64>()
            / set.len() as f64;
        // Mean of 500 draws with sd <= 1.5 stays well inside 0.5.
        assert!(residual_mean.abs() < 0.5, "{response}: {residual_mean}");
    }
}

#[rstest]
#[case::inverted(FeatureRange::new(5.0, 1.0))]
#[case::nan(FeatureRange::new(f64::NAN, 1.0))]
#[case::infinite(FeatureRange::new(0.0, f64::INFINITY))]
fn bad_ranges_are_rejected(#[case] outcome: polytwin_core::Result<FeatureRange>) {
    assert!(matches!(outcome, Err(TwinError::InvalidConfig { .. })));
}

#[test]
fn custom_ranges_and_formulas_apply() {
    let range = FeatureRange::new(0.0, 1.0).expect("ordered");
    let formula = AffineFormula::new(5.0, [0.0; 6], 0.0).expect("valid formula");
    let config = GeneratorConfig::new()
        .with_range(Feature::Filler, range)
        .with_formula(Response::Tensile, formula);
    let set = config.generate(3, 40).expect("valid parameters");
    let filler = set.feature_range(Feature::Filler);
    assert!(filler.min >= 0.0 && filler.max <= 1.0);
    assert!(
        set.response_column(Response::Tensile)
            .iter()
            .all(|value| *value == 5.0)
    );
}

proptest! {
    #![proptest_config(proptest_config(16))]

    #[test]
    fn generation_is_deterministic_for_any_seed(seed in any::<u64>(), rows in 1_usize..64) {
        let first = generate(seed, rows).expect("valid parameters");
        let second = generate(seed, rows).expect("valid parameters");
        prop_assert_eq!(first.len(), rows);
        prop_assert_eq!(first, second);
    }
}
