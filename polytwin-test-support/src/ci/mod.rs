//! CI-facing knobs shared by the polytwin test suites.

pub mod property_test_profile;
