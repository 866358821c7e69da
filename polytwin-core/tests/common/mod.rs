#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::OnceLock;

use polytwin_core::{
    DigitalTwin, DigitalTwinBuilder, Feature, FeatureVector, ForestParams, ModelBank,
    RandomForestTrainer, TrainingSet, generate,
};
use polytwin_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Tree count used by the integration suites; large enough for stable
/// shapes, small enough to keep the suites fast.
pub const TEST_TREES: usize = 30;

#[must_use]
pub fn proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

#[must_use]
pub fn forest_trainer() -> RandomForestTrainer {
    RandomForestTrainer::new(ForestParams::new(TEST_TREES).expect("non-zero tree count"))
}

#[must_use]
pub fn reference_set() -> TrainingSet {
    generate(42, 500).expect("reference parameters are valid")
}

/// The reference forest bank, fitted once per test binary.
#[must_use]
pub fn reference_bank() -> &'static ModelBank {
    static BANK: OnceLock<ModelBank> = OnceLock::new();
    BANK.get_or_init(|| {
        ModelBank::fit(&reference_set(), &forest_trainer()).expect("reference fit succeeds")
    })
}

/// The reference twin (seed 42, 500 rows), built once per test binary.
#[must_use]
pub fn reference_twin() -> &'static DigitalTwin {
    static TWIN: OnceLock<DigitalTwin> = OnceLock::new();
    TWIN.get_or_init(|| {
        DigitalTwinBuilder::new()
            .with_forest_params(ForestParams::new(TEST_TREES).expect("non-zero tree count"))
            .build()
            .expect("reference configuration is valid")
    })
}

/// Feature vectors drawn from each feature's training range.
pub fn training_vectors() -> impl Strategy<Value = FeatureVector> {
    (
        5.0..=25.0_f64,
        0.5..=5.0_f64,
        0.0..=30.0_f64,
        0.0..=40.0_f64,
        200.0..=600.0_f64,
        180.0..=230.0_f64,
    )
        .prop_map(|(mfi, ash, poe, talc, rpm, temp)| {
            FeatureVector::default()
                .with(Feature::BaseMfi, mfi)
                .with(Feature::BaseAsh, ash)
                .with(Feature::Toughener, poe)
                .with(Feature::Filler, talc)
                .with(Feature::ScrewSpeed, rpm)
                .with(Feature::BarrelTemperature, temp)
        })
}
