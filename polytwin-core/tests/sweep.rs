//! Tests for sensitivity sweeps through the twin handle.

mod common;

use common::{TestResult, proptest_config, reference_twin};
use polytwin_core::{Feature, FeatureVector, Response, SweepSpec, TwinError};
use proptest::prelude::*;

#[test]
fn toughener_sweep_raises_impact_on_average() -> TestResult {
    let twin = reference_twin();
    let spec = SweepSpec::toughener_default();
    let curve = twin.sweep(&spec, &FeatureVector::default(), &[Response::Impact])?;
    assert_eq!(curve.feature, Feature::Toughener);
    assert_eq!(curve.grid.len(), 50);
    let trend = curve.trend(Response::Impact).ok_or("impact was requested")?;
    assert!(trend > 0.0, "impact trend {trend}");
    Ok(())
}

#[test]
fn sweep_series_follow_request_order_and_batch_predictions() -> TestResult {
    let twin = reference_twin();
    let spec = SweepSpec::new(Feature::Filler, 0.0, 40.0, 9)?;
    let base = FeatureVector::default();
    let responses = [Response::FinalMfi, Response::Tensile];
    let curve = twin.sweep(&spec, &base, &responses)?;

    let requested: Vec<Response> = curve.series.iter().map(|(response, _)| *response).collect();
    assert_eq!(requested, responses);
    for response in responses {
        let expected = twin
            .model_bank()
            .predict_batch(response, &spec.vectors(&base))?;
        assert_eq!(curve.series(response), Some(expected.as_slice()));
    }
    assert!(curve.series(Response::Impact).is_none());
    Ok(())
}

#[test]
fn filler_sweep_lowers_final_mfi() -> TestResult {
    let twin = reference_twin();
    let spec = SweepSpec::new(Feature::Filler, 0.0, 40.0, 21)?;
    let curve = twin.sweep(&spec, &FeatureVector::default(), &[Response::FinalMfi])?;
    let trend = curve.trend(Response::FinalMfi).ok_or("final MFI was requested")?;
    assert!(trend < 0.0, "final MFI trend {trend}");
    Ok(())
}

#[test]
fn non_finite_base_outside_swept_feature_is_rejected() {
    let twin = reference_twin();
    let spec = SweepSpec::toughener_default();
    let base = FeatureVector::default().with(Feature::ScrewSpeed, f64::NAN);
    let err = twin
        .sweep(&spec, &base, &[Response::Impact])
        .expect_err("non-finite base");
    assert!(matches!(
        err,
        TwinError::InvalidInput {
            feature: Feature::ScrewSpeed,
            ..
        }
    ));
}

#[test]
fn overflowing_sweep_width_is_a_configuration_error() {
    let err = SweepSpec::new(Feature::Toughener, -1e308, 1e308, 3)
        .expect_err("width overflows to infinity");
    assert!(matches!(
        err,
        TwinError::InvalidConfig {
            parameter: "sweep bounds",
            ..
        }
    ));
}

#[test]
fn non_finite_swept_feature_in_base_is_replaced() -> TestResult {
    let twin = reference_twin();
    let spec = SweepSpec::toughener_default();
    let base = FeatureVector::default().with(Feature::Toughener, f64::NAN);
    let curve = twin.sweep(&spec, &base, &[Response::Impact])?;
    assert!(
        curve
            .series(Response::Impact)
            .is_some_and(|values| values.iter().all(|value| value.is_finite()))
    );
    Ok(())
}

proptest! {
    #![proptest_config(proptest_config(64))]

    #[test]
    fn grid_has_requested_shape(
        start in -100.0..100.0_f64,
        end in -100.0..100.0_f64,
        points in 1_usize..200,
    ) {
        let spec = SweepSpec::new(Feature::BarrelTemperature, start, end, points)
            .expect("finite bounds and positive points");
        let grid = spec.grid();
        prop_assert_eq!(grid.len(), points);
        prop_assert_eq!(grid.first().copied(), Some(start));
        if points > 1 {
            prop_assert_eq!(grid.last().copied(), Some(end));
            let ascending = end >= start;
            let monotone = grid.windows(2).all(|pair| {
                if ascending { pair[0] <= pair[1] } else { pair[0] >= pair[1] }
            });
            prop_assert!(monotone);
        }
        let vectors = spec.vectors(&FeatureVector::default());
        let vectors_match = vectors.iter().zip(&grid).all(|(vector, value)| {
            vector.barrel_temperature == *value && vector.toughener == 15.0
        });
        prop_assert!(vectors_match);
    }
}
