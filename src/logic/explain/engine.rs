//! TreeSHAP explainer bound to the classifier.
//!
//! Implements the path-dependent TreeSHAP algorithm from Lundberg et al.
//! (2020): exact Shapley contributions for tree ensembles in polynomial time,
//! weighting the out-of-coalition branch of every split by its training
//! cover. Contributions are in the classifier's margin space;
//! `base_value + sum(contributions)` reconstructs the margin for each sample.

use ndarray::{ArrayView1, ArrayView2};

use crate::logic::explain::path::PathState;
use crate::logic::explain::values::ShapValues;
use crate::logic::pipeline::forest::{Forest, NodeId, Tree};

/// TreeSHAP explainer for the loaded ensemble.
pub struct TreeExplainer<'a> {
    forest: &'a Forest,
    /// Expected margin per output group (base score + cover-weighted leaf
    /// expectation of every tree in the group).
    base_values: Vec<f64>,
}

impl<'a> TreeExplainer<'a> {
    pub fn new(forest: &'a Forest) -> Self {
        let mut base_values = forest.base_scores().to_vec();
        for (tree, &group) in forest.trees().zip(forest.tree_groups()) {
            base_values[group as usize] += expected_value(tree, 0);
        }
        Self {
            forest,
            base_values,
        }
    }

    pub fn base_value(&self, output: usize) -> f64 {
        self.base_values[output]
    }

    /// Contributions for a batch of already-transformed samples.
    ///
    /// Output shape is `[n_samples, n_features + base, n_groups]`; the caller
    /// picks the output slot (see [`Forest::positive_group`]).
    pub fn shap_values(&self, features: ArrayView2<'_, f64>) -> ShapValues {
        let n_samples = features.nrows();
        let n_features = features.ncols();
        let n_outputs = self.forest.n_groups();
        let mut shap = ShapValues::zeros(n_samples, n_features, n_outputs);

        for sample_idx in 0..n_samples {
            let sample = features.row(sample_idx);
            for (tree_idx, tree) in self.forest.trees().enumerate() {
                let group = self.forest.tree_groups()[tree_idx] as usize;
                tree_shap(
                    tree,
                    sample,
                    &mut shap,
                    sample_idx,
                    group,
                    0,
                    PathState::new(),
                    1.0,
                    1.0,
                    -1,
                );
            }
            for (output, &base) in self.base_values.iter().enumerate() {
                shap.set_base_value(sample_idx, output, base);
            }
        }

        shap
    }
}

/// Cover-weighted expected leaf value of a subtree.
fn expected_value(tree: &Tree, node: NodeId) -> f64 {
    if tree.is_leaf(node) {
        tree.leaf_value(node)
    } else {
        let left = tree.left_child(node);
        let right = tree.right_child(node);
        let (lc, rc) = (tree.cover(left), tree.cover(right));
        (lc * expected_value(tree, left) + rc * expected_value(tree, right)) / (lc + rc)
    }
}

/// Recursive TreeSHAP over one tree. Each call owns its copy of the path;
/// the hot branch is the one the sample follows (missing values take the
/// node's default direction).
#[allow(clippy::too_many_arguments)]
fn tree_shap(
    tree: &Tree,
    sample: ArrayView1<'_, f64>,
    shap: &mut ShapValues,
    sample_idx: usize,
    group: usize,
    node: NodeId,
    mut path: PathState,
    parent_zero_fraction: f64,
    parent_one_fraction: f64,
    parent_feature: i32,
) {
    path.extend(parent_zero_fraction, parent_one_fraction, parent_feature);

    if tree.is_leaf(node) {
        let leaf_value = tree.leaf_value(node);
        for i in 1..=path.depth() {
            let w = path.unwound_sum(i);
            let el = path.element(i);
            shap.add(
                sample_idx,
                el.feature as usize,
                group,
                w * (el.one_fraction - el.zero_fraction) * leaf_value,
            );
        }
        return;
    }

    let feature = tree.split_index(node) as i32;
    let fvalue = sample[feature as usize];
    let left = tree.left_child(node);
    let right = tree.right_child(node);
    let hot = tree.next_node(node, fvalue);
    let cold = if hot == left { right } else { left };

    let child_cover = tree.cover(left) + tree.cover(right);
    let hot_zero_fraction = tree.cover(hot) / child_cover;
    let cold_zero_fraction = tree.cover(cold) / child_cover;

    let mut incoming_zero_fraction = 1.0;
    let mut incoming_one_fraction = 1.0;

    // Same feature met again further down: undo its previous extension and
    // fold its fractions into this split.
    if let Some(k) = path.find(feature) {
        incoming_zero_fraction = path.element(k).zero_fraction;
        incoming_one_fraction = path.element(k).one_fraction;
        path.unwind(k);
    }

    tree_shap(
        tree,
        sample,
        shap,
        sample_idx,
        group,
        hot,
        path.clone(),
        hot_zero_fraction * incoming_zero_fraction,
        incoming_one_fraction,
        feature,
    );
    tree_shap(
        tree,
        sample,
        shap,
        sample_idx,
        group,
        cold,
        path,
        cold_zero_fraction * incoming_zero_fraction,
        0.0,
        feature,
    );
}
