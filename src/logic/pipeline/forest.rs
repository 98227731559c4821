//! Runtime tree-ensemble representation (SoA) and traversal.
//!
//! Trees are stored in flat arrays for cache-friendly traversal. Child
//! indices are local to each tree (0 = root). Missing feature values (NaN)
//! are routed by each node's recorded default direction, matching the
//! behavior of the training framework the ensemble was exported from.

use ndarray::ArrayView1;

pub type NodeId = u32;

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },

    #[error("node {node} is reached by more than one path")]
    DuplicateVisit { node: NodeId },

    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

/// Structure-of-Arrays decision tree.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    thresholds: Box<[f64]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f64]>,
    /// Sample cover per node, used by the attribution engine to weight
    /// branches when a feature is out of the coalition.
    covers: Box<[f64]>,
}

impl Tree {
    pub fn new(
        split_indices: Vec<u32>,
        thresholds: Vec<f64>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f64>,
        covers: Vec<f64>,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, default_left.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());
        debug_assert_eq!(n_nodes, covers.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            thresholds: thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            covers: covers.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f64 {
        self.thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_values[node as usize]
    }

    #[inline]
    pub fn cover(&self, node: NodeId) -> f64 {
        self.covers[node as usize]
    }

    /// The child a sample proceeds to from an internal node.
    ///
    /// NaN uses the node's default direction.
    #[inline]
    pub fn next_node(&self, node: NodeId, fvalue: f64) -> NodeId {
        if fvalue.is_nan() {
            if self.default_left(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            }
        } else if fvalue < self.split_threshold(node) {
            self.left_child(node)
        } else {
            self.right_child(node)
        }
    }

    /// Traverse from the root to the leaf a sample lands in.
    pub fn traverse_to_leaf(&self, sample: ArrayView1<'_, f64>) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let fvalue = sample[self.split_index(node) as usize];
            node = self.next_node(node, fvalue);
        }
        node
    }

    /// Leaf value reached by a sample.
    pub fn predict_row(&self, sample: ArrayView1<'_, f64>) -> f64 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }

    /// Validate basic structural invariants for this tree.
    ///
    /// Run once at artifact load; a malformed tree must never reach traversal.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, u8)> = vec![(0, 0)];

        while let Some((node, phase)) = stack.pop() {
            let node_usize = node as usize;

            match phase {
                0 => {
                    match color[node_usize] {
                        0 => {}
                        1 => return Err(TreeValidationError::CycleDetected { node }),
                        2 => return Err(TreeValidationError::DuplicateVisit { node }),
                        _ => unreachable!(),
                    }

                    color[node_usize] = 1;
                    stack.push((node, 1));

                    if !self.is_leaf(node) {
                        let left = self.left_child(node);
                        let right = self.right_child(node);

                        if left == node || right == node {
                            return Err(TreeValidationError::SelfLoop { node });
                        }
                        if left as usize >= n_nodes {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                node,
                                side: "left",
                                child: left,
                                n_nodes,
                            });
                        }
                        if right as usize >= n_nodes {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                node,
                                side: "right",
                                child: right,
                                n_nodes,
                            });
                        }

                        stack.push((right, 0));
                        stack.push((left, 0));
                    }
                }
                1 => {
                    color[node_usize] = 2;
                }
                _ => unreachable!(),
            }
        }

        for (i, &c) in color.iter().enumerate() {
            if c == 0 {
                return Err(TreeValidationError::UnreachableNode { node: i as u32 });
            }
        }

        Ok(())
    }
}

/// An ensemble of trees with per-group base scores.
///
/// Binary ensembles exported from LightGBM-style trainers have a single
/// output group carrying the positive-class margin; per-class exports carry
/// one group per class.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    base_scores: Vec<f64>,
}

impl Forest {
    pub fn new(trees: Vec<Tree>, tree_groups: Vec<u32>, base_scores: Vec<f64>) -> Self {
        debug_assert_eq!(trees.len(), tree_groups.len());
        debug_assert!(!base_scores.is_empty());
        Self {
            trees,
            tree_groups,
            base_scores,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_groups(&self) -> usize {
        self.base_scores.len()
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    pub fn tree_groups(&self) -> &[u32] {
        &self.tree_groups
    }

    pub fn base_scores(&self) -> &[f64] {
        &self.base_scores
    }

    /// The output slot holding the positive class.
    ///
    /// Per-class ensembles expose one group per class and slot 1 is the
    /// positive class; a single-group ensemble is already the positive-class
    /// margin and is used as-is.
    pub fn positive_group(&self) -> usize {
        if self.n_groups() > 1 {
            1
        } else {
            0
        }
    }

    /// Raw margin per output group for one sample.
    pub fn margin(&self, sample: ArrayView1<'_, f64>) -> Vec<f64> {
        let mut margins = self.base_scores.clone();
        for (tree, &group) in self.trees.iter().zip(&self.tree_groups) {
            margins[group as usize] += tree.predict_row(sample);
        }
        margins
    }

    /// Positive-class margin for one sample.
    pub fn positive_margin(&self, sample: ArrayView1<'_, f64>) -> f64 {
        self.margin(sample)[self.positive_group()]
    }
}

/// Logistic squashing of a raw margin into a probability in [0, 1].
pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}
