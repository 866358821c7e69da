//! Regression trees grown with the squared-error criterion.
//!
//! Nodes live in a flat arena; splits send `row[feature] <= threshold` left.
//! Growth uses an explicit work stack so unbounded trees cannot exhaust the
//! call stack on long runs of distinct values.

use rand::{Rng, rngs::SmallRng};

use super::params::ForestParams;
use crate::{feature::FEATURE_COUNT, regressor::DesignRow};

/// Relative gain below which a split is treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree.
#[derive(Clone, Debug, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    depth: usize,
}

impl RegressionTree {
    /// Evaluates the tree on one row.
    #[must_use]
    pub fn predict_row(&self, row: &DesignRow) -> f64 {
        let mut cursor = 0;
        loop {
            match self.nodes.get(cursor) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    cursor = if value <= *threshold { *left } else { *right };
                }
                None => return f64::NAN,
            }
        }
    }

    /// Total number of nodes, leaves included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path (a lone leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Grows a tree over `samples`, which index into `design` and `targets`
    /// and may repeat.
    pub(super) fn grow(
        design: &[DesignRow],
        targets: &[f64],
        mut samples: Vec<usize>,
        params: &ForestParams,
        rng: &mut SmallRng,
    ) -> Self {
        let mut grower = Grower {
            design,
            targets,
            params,
            nodes: vec![Node::Leaf { value: 0.0 }],
            depth: 0,
        };
        let mut pending = vec![Pending {
            slot: 0,
            start: 0,
            end: samples.len(),
            depth: 0,
        }];
        while let Some(work) = pending.pop() {
            if let Some((left, right)) = grower.expand(&mut samples, work, rng) {
                pending.push(right);
                pending.push(left);
            }
        }
        Self {
            nodes: grower.nodes,
            depth: grower.depth,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    slot: usize,
    start: usize,
    end: usize,
    depth: usize,
}

#[derive(Clone, Copy, Debug)]
struct SplitChoice {
    feature: usize,
    threshold: f64,
    score: f64,
}

struct Grower<'a> {
    design: &'a [DesignRow],
    targets: &'a [f64],
    params: &'a ForestParams,
    nodes: Vec<Node>,
    depth: usize,
}

impl Grower<'_> {
    /// Turns `work.slot` into a leaf or a split. Returns the child work items
    /// when it split.
    fn expand(
        &mut self,
        samples: &mut [usize],
        work: Pending,
        rng: &mut SmallRng,
    ) -> Option<(Pending, Pending)> {
        self.depth = self.depth.max(work.depth);
        let node_samples = samples.get_mut(work.start..work.end)?;
        let (sum, sum_sq) = self.moments(node_samples);
        let count = node_samples.len() as f64;
        let mean = sum / count;

        let choice = if self.may_split(node_samples.len(), work.depth, sum, sum_sq) {
            self.best_split(node_samples, sum, rng)
        } else {
            None
        };
        let Some(choice) = choice else {
            self.set(work.slot, Node::Leaf { value: mean });
            return None;
        };

        let left_len = self.partition(node_samples, choice);
        let left = self.reserve();
        let right = self.reserve();
        self.set(
            work.slot,
            Node::Split {
                feature: choice.feature,
                threshold: choice.threshold,
                left,
                right,
            },
        );
        let mid = work.start + left_len;
        Some((
            Pending {
                slot: left,
                start: work.start,
                end: mid,
                depth: work.depth + 1,
            },
            Pending {
                slot: right,
                start: mid,
                end: work.end,
                depth: work.depth + 1,
            },
        ))
    }

    fn may_split(&self, len: usize, depth: usize, sum: f64, sum_sq: f64) -> bool {
        if len < self.params.min_samples_split() || len < 2 * self.params.min_samples_leaf() {
            return false;
        }
        if self.params.max_depth().is_some_and(|cap| depth >= cap) {
            return false;
        }
        let count = len as f64;
        let sse = sum_sq - sum * sum / count;
        sse > MIN_GAIN * sum_sq.abs().max(1.0)
    }

    fn moments(&self, samples: &[usize]) -> (f64, f64) {
        samples.iter().fold((0.0, 0.0), |(sum, sum_sq), &index| {
            let target = self.target(index);
            (sum + target, target.mul_add(target, sum_sq))
        })
    }

    /// Finds the split maximising `Σ_left²/n_left + Σ_right²/n_right`, which
    /// is equivalent to minimising the children's summed squared error.
    fn best_split(&self, samples: &[usize], total: f64, rng: &mut SmallRng) -> Option<SplitChoice> {
        let parent_score = total * total / samples.len() as f64;
        let min_leaf = self.params.min_samples_leaf();
        let mut order: Vec<(f64, f64)> = Vec::with_capacity(samples.len());
        let mut best: Option<SplitChoice> = None;

        for feature in self.candidate_features(rng) {
            order.clear();
            order.extend(
                samples
                    .iter()
                    .map(|&index| (self.value(index, feature), self.target(index))),
            );
            order.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for (position, window) in order.windows(2).enumerate() {
                let [(here, target), (next, _)] = [window[0], window[1]];
                left_sum += target;
                let left_len = position + 1;
                let right_len = order.len() - left_len;
                if left_len < min_leaf || right_len < min_leaf || here >= next {
                    continue;
                }
                let score = left_sum * left_sum / left_len as f64
                    + (total - left_sum) * (total - left_sum) / right_len as f64;
                if best.is_none_or(|current| score > current.score) {
                    best = Some(SplitChoice {
                        feature,
                        threshold: midpoint(here, next),
                        score,
                    });
                }
            }
        }

        best.filter(|choice| choice.score - parent_score > MIN_GAIN * parent_score.abs().max(1.0))
    }

    /// Samples the features considered at one node without replacement.
    fn candidate_features(&self, rng: &mut SmallRng) -> Vec<usize> {
        let wanted = self.params.max_features().resolve();
        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        if wanted >= FEATURE_COUNT {
            return features;
        }
        for slot in 0..wanted {
            let pick = rng.gen_range(slot..FEATURE_COUNT);
            features.swap(slot, pick);
        }
        features.truncate(wanted);
        features
    }

    /// Moves samples going left to the front and returns how many there are.
    fn partition(&self, samples: &mut [usize], choice: SplitChoice) -> usize {
        let (mut left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&index| self.value(index, choice.feature) <= choice.threshold);
        let left_len = left.len();
        left.extend(right);
        samples.copy_from_slice(&left);
        left_len
    }

    fn reserve(&mut self) -> usize {
        self.nodes.push(Node::Leaf { value: 0.0 });
        self.nodes.len() - 1
    }

    fn set(&mut self, slot: usize, node: Node) {
        if let Some(target) = self.nodes.get_mut(slot) {
            *target = node;
        }
    }

    fn value(&self, index: usize, feature: usize) -> f64 {
        self.design
            .get(index)
            .and_then(|row| row.get(feature))
            .copied()
            .unwrap_or(f64::NAN)
    }

    fn target(&self, index: usize) -> f64 {
        self.targets.get(index).copied().unwrap_or(0.0)
    }
}

/// Threshold halfway between two distinct sorted values, falling back to the
/// lower one when rounding would land on the upper.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper { lower } else { mid }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rstest::rstest;

    fn row(first: f64) -> DesignRow {
        [first, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    fn grow(design: &[DesignRow], targets: &[f64], params: &ForestParams) -> RegressionTree {
        let mut rng = SmallRng::seed_from_u64(0);
        RegressionTree::grow(design, targets, (0..design.len()).collect(), params, &mut rng)
    }

    #[test]
    fn constant_targets_give_a_single_leaf() {
        let design: Vec<DesignRow> = (0..10).map(|i| row(f64::from(i))).collect();
        let tree = grow(&design, &[4.0; 10], &ForestParams::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_row(&row(100.0)), 4.0);
    }

    #[test]
    fn step_function_is_recovered_with_a_midpoint_threshold() {
        let design: Vec<DesignRow> = (0..8).map(|i| row(f64::from(i))).collect();
        let targets = [1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0];
        let tree = grow(&design, &targets, &ForestParams::default());
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.predict_row(&row(3.0)), 1.0);
        assert_eq!(tree.predict_row(&row(3.5)), 1.0);
        assert_eq!(tree.predict_row(&row(3.6)), 9.0);
    }

    #[test]
    fn unbounded_tree_interpolates_distinct_targets() {
        let design: Vec<DesignRow> = (0..16).map(|i| row(f64::from(i))).collect();
        let targets: Vec<f64> = (0..16).map(|i| f64::from(i * i)).collect();
        let tree = grow(&design, &targets, &ForestParams::default());
        for (features, target) in design.iter().zip(&targets) {
            assert_eq!(tree.predict_row(features), *target);
        }
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn max_depth_caps_growth(#[case] cap: usize) {
        let design: Vec<DesignRow> = (0..32).map(|i| row(f64::from(i))).collect();
        let targets: Vec<f64> = (0..32_i32).map(f64::from).collect();
        let params = ForestParams::default()
            .with_max_depth(Some(cap))
            .expect("valid depth");
        let tree = grow(&design, &targets, &params);
        assert_eq!(tree.depth(), cap);
        assert!(tree.leaf_count() <= 1 << cap);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let design: Vec<DesignRow> = (0..10).map(|i| row(f64::from(i))).collect();
        let targets = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50.0];
        let params = ForestParams::default()
            .with_min_samples_leaf(3)
            .expect("valid leaf size");
        let tree = grow(&design, &targets, &params);
        // The outlier cannot sit alone in a leaf.
        assert!(tree.predict_row(&row(9.0)) < 50.0);
    }

    #[test]
    fn repeated_feature_values_are_never_separated() {
        let design = vec![row(1.0), row(1.0), row(2.0), row(2.0)];
        let targets = [0.0, 10.0, 20.0, 30.0];
        let tree = grow(&design, &targets, &ForestParams::default());
        assert_eq!(tree.predict_row(&row(1.0)), 5.0);
        assert_eq!(tree.predict_row(&row(2.0)), 25.0);
    }

    #[rstest]
    #[case(1.0, 2.0, 1.5)]
    #[case(-3.0, -1.0, -2.0)]
    #[case(1.0, f64::from_bits(1.0_f64.to_bits() + 1), 1.0)]
    fn midpoint_stays_below_upper(#[case] lower: f64, #[case] upper: f64, #[case] expected: f64) {
        assert_eq!(midpoint(lower, upper), expected);
    }
}
