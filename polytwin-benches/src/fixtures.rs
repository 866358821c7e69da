//! Seeded inputs shared by the benchmarks.

use polytwin_core::{
    Feature, FeatureVector, ForestParams, ModelBank, RandomForestTrainer, Result, TrainingSet,
    generate,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Seed used for every fixture.
pub const SEED: u64 = 42;

/// Generates the default training set with `rows` rows.
///
/// # Errors
/// Returns [`polytwin_core::TwinError::InvalidConfig`] when `rows` is zero.
pub fn training_set(rows: usize) -> Result<TrainingSet> {
    generate(SEED, rows)
}

/// Forest trainer growing `trees` trees from [`SEED`].
///
/// # Errors
/// Returns [`polytwin_core::TwinError::InvalidConfig`] when `trees` is zero.
pub fn forest_trainer(trees: usize) -> Result<RandomForestTrainer> {
    Ok(RandomForestTrainer::new(
        ForestParams::new(trees)?.with_seed(SEED),
    ))
}

/// Forest bank fitted on `rows` rows with `trees` trees per response.
///
/// # Errors
/// Propagates generator and trainer configuration errors.
pub fn fitted_bank(rows: usize, trees: usize) -> Result<ModelBank> {
    ModelBank::fit(&training_set(rows)?, &forest_trainer(trees)?)
}

/// `count` vectors drawn uniformly from each feature's control range.
#[must_use]
pub fn query_vectors(count: usize) -> Vec<FeatureVector> {
    let mut rng = SmallRng::seed_from_u64(SEED);
    (0..count)
        .map(|_| {
            Feature::ALL
                .into_iter()
                .fold(FeatureVector::default(), |vector, feature| {
                    let range = feature.control_range();
                    vector.with(feature, rng.gen_range(range.min()..=range.max()))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(257)]
    fn query_vectors_are_seeded_and_in_range(#[case] count: usize) {
        let first = query_vectors(count);
        assert_eq!(first.len(), count);
        assert_eq!(first, query_vectors(count));
        for vector in &first {
            for feature in Feature::ALL {
                assert!(feature.control_range().contains(vector.get(feature)));
            }
        }
    }

    #[test]
    fn zero_trees_is_rejected() {
        assert!(forest_trainer(0).is_err());
    }
}
