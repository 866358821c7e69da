//! Shared test utilities for `polytwin-core`.

use polytwin_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};

use crate::feature::{Feature, FeatureVector};

/// Builds a proptest configuration from the shared CI profile so every
/// property suite reads `POLYTWIN_PBT_CASES` and `POLYTWIN_PBT_FORK` the same
/// way.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Feature vectors drawn from the dashboard control ranges.
pub(crate) fn control_vectors() -> impl Strategy<Value = FeatureVector> {
    let [mfi, ash, poe, talc, rpm, temp] = Feature::ALL.map(|feature| {
        let range = feature.control_range();
        range.min()..=range.max()
    });
    (mfi, ash, poe, talc, rpm, temp).prop_map(|(mfi, ash, poe, talc, rpm, temp)| {
        FeatureVector::from_array([mfi, ash, poe, talc, rpm, temp])
    })
}
