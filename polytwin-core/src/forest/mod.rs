//! Bagged regression forests.
//!
//! [`RandomForestTrainer`] grows `tree_count` CART trees, each on its own
//! bootstrap resample with its own seeded RNG, and [`RandomForest`] averages
//! their outputs. Trees are built in parallel with Rayon when the `parallel`
//! feature is enabled; per-tree seeding keeps the result identical either
//! way.

mod params;
mod rng;
mod tree;


pub use params::{ForestParams, MaxFeatures};
pub use tree::RegressionTree;

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    Result,
    regressor::{DesignRow, Regressor, Trainer, validate_training_data},
    response::Response,
};

/// An averaged ensemble of [`RegressionTree`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Number of trees in the ensemble.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// The fitted trees in construction order.
    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl Regressor for RandomForest {
    fn predict_row(&self, row: &DesignRow) -> f64 {
        // Summed in tree order so every caller sees the same rounding.
        let total: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
        total / self.trees.len() as f64
    }
}

/// Fits [`RandomForest`]s with a fixed [`ForestParams`].
///
/// # Examples
/// ```
/// use polytwin_core::{ForestParams, RandomForestTrainer, Regressor, Response, Trainer};
///
/// let design: Vec<[f64; 6]> = (0..20).map(|i| [f64::from(i), 0.0, 0.0, 0.0, 0.0, 0.0]).collect();
/// let targets: Vec<f64> = (0..20).map(|i| f64::from(i) * 2.0).collect();
/// let trainer = RandomForestTrainer::new(ForestParams::new(10).expect("non-zero"));
/// let forest = trainer
///     .fit(&design, &targets, Response::Impact)
///     .expect("fit succeeds");
/// assert_eq!(forest.tree_count(), 10);
/// let low = forest.predict_row(&[2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// let high = forest.predict_row(&[17.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// assert!(low < high);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RandomForestTrainer {
    params: ForestParams,
}

impl RandomForestTrainer {
    /// Creates a trainer with `params`.
    #[must_use]
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    /// Returns the configured parameters.
    #[must_use]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    fn grow_tree(
        &self,
        design: &[DesignRow],
        targets: &[f64],
        response: Response,
        tree_index: usize,
    ) -> RegressionTree {
        let mut rng = rng::tree_rng(self.params.seed(), response, tree_index);
        let rows = design.len();
        let samples: Vec<usize> = if self.params.bootstrap() {
            (0..rows).map(|_| rng.gen_range(0..rows)).collect()
        } else {
            (0..rows).collect()
        };
        RegressionTree::grow(design, targets, samples, &self.params, &mut rng)
    }
}

impl Trainer for RandomForestTrainer {
    type Model = RandomForest;

    #[instrument(
        name = "core.forest.fit",
        err,
        skip(self, design, targets),
        fields(rows = design.len(), trees = self.params.tree_count()),
    )]
    fn fit(
        &self,
        design: &[DesignRow],
        targets: &[f64],
        response: Response,
    ) -> Result<RandomForest> {
        validate_training_data(design, targets, response)?;

        #[cfg(feature = "parallel")]
        let trees: Vec<RegressionTree> = (0..self.params.tree_count())
            .into_par_iter()
            .map(|tree_index| self.grow_tree(design, targets, response, tree_index))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let trees: Vec<RegressionTree> = (0..self.params.tree_count())
            .map(|tree_index| self.grow_tree(design, targets, response, tree_index))
            .collect();

        debug!(
            response = %response,
            nodes = trees.iter().map(RegressionTree::node_count).sum::<usize>(),
            "forest grown"
        );
        Ok(RandomForest { trees })
    }
}
