//! Parameter handling for the random-forest trainer.

use std::num::NonZeroUsize;

use crate::{Result, error::TwinError, feature::FEATURE_COUNT};

/// How many features each split considers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxFeatures {
    /// Every feature is a split candidate.
    All,
    /// `ceil(sqrt(FEATURE_COUNT))` features are sampled per split.
    Sqrt,
    /// A fixed number of features is sampled per split (capped at the
    /// feature count).
    Count(NonZeroUsize),
}

impl MaxFeatures {
    pub(crate) fn resolve(self) -> usize {
        match self {
            Self::All => FEATURE_COUNT,
            // ceil(sqrt(6)) == 3
            Self::Sqrt => 3,
            Self::Count(count) => count.get().min(FEATURE_COUNT),
        }
    }
}

/// Configuration for [`crate::RandomForestTrainer`].
///
/// # Examples
/// ```
/// use polytwin_core::ForestParams;
///
/// let params = ForestParams::new(50)
///     .expect("non-zero tree count")
///     .with_min_samples_leaf(2)
///     .and_then(|params| params.with_max_depth(Some(8)))
///     .expect("valid parameters")
///     .with_seed(7);
/// assert_eq!(params.tree_count(), 50);
/// assert_eq!(params.seed(), 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForestParams {
    tree_count: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: MaxFeatures,
    bootstrap: bool,
    seed: u64,
}

impl ForestParams {
    /// Creates a parameter set with `tree_count` trees and defaults for the
    /// remaining knobs.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `tree_count` is zero.
    pub fn new(tree_count: usize) -> Result<Self> {
        if tree_count == 0 {
            return Err(TwinError::invalid_config(
                "tree_count",
                "a forest needs at least one tree",
            ));
        }
        Ok(Self {
            tree_count,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        })
    }

    /// Caps tree depth; `None` grows trees until leaves are pure or too small.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] for `Some(0)`.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Result<Self> {
        if max_depth == Some(0) {
            return Err(TwinError::invalid_config(
                "max_depth",
                "max_depth must be at least 1 when set",
            ));
        }
        self.max_depth = max_depth;
        Ok(self)
    }

    /// Sets the minimum number of samples a node needs before it may split.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `min_samples_split < 2`.
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Result<Self> {
        if min_samples_split < 2 {
            return Err(TwinError::invalid_config(
                "min_samples_split",
                format!("min_samples_split must be >= 2 (got {min_samples_split})"),
            ));
        }
        self.min_samples_split = min_samples_split;
        Ok(self)
    }

    /// Sets the minimum number of samples each leaf must keep.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] when `min_samples_leaf` is zero.
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Result<Self> {
        if min_samples_leaf == 0 {
            return Err(TwinError::invalid_config(
                "min_samples_leaf",
                "min_samples_leaf must be at least 1",
            ));
        }
        self.min_samples_leaf = min_samples_leaf;
        Ok(self)
    }

    /// Selects how many features each split considers.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Enables or disables bootstrap resampling of rows per tree.
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Seeds tree construction so fitting is reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.tree_count
    }

    /// Depth cap, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Minimum node size eligible for splitting.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Minimum leaf size.
    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    /// Feature sampling policy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Whether rows are bootstrap-resampled per tree.
    #[must_use]
    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    /// Base seed for tree construction.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            tree_count: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        }
    }
}
