//! Shared test fixtures: a small hand-built pipeline artifact with known
//! tree structure, used across pipeline, explainability, and handler tests.

use crate::logic::pipeline::artifact::{
    ClassifierSchema, PipelineSchema, PreprocessorSchema, ScalerSchema, TreeSchema,
};
use crate::logic::table::DataTable;

/// ln(0.4 / 0.6): the margin whose logistic image is 0.4.
pub const MARGIN_P04: f64 = -0.405_465_108_108_164_4;

/// Columns of the fixture pipeline: `income` is scaled (center 1000,
/// scale 500), `age` and `children` pass through.
pub fn fixture_columns() -> Vec<String> {
    vec![
        "income".to_string(),
        "age".to_string(),
        "children".to_string(),
    ]
}

fn fixture_preprocessor() -> PreprocessorSchema {
    PreprocessorSchema {
        input_columns: fixture_columns(),
        scaler: ScalerSchema {
            columns: vec!["income".to_string()],
            centers: vec![1000.0],
            scales: vec![500.0],
        },
    }
}

/// Stump: feature `split` < `threshold` -> `left`, else `right`.
/// Covers: root 100, children 60/40. Missing goes left.
pub fn stump_schema(split: u32, threshold: f64, left: f64, right: f64) -> TreeSchema {
    TreeSchema {
        num_nodes: 3,
        split_indices: vec![split, 0, 0],
        thresholds: vec![threshold, 0.0, 0.0],
        children_left: vec![1, 0, 0],
        children_right: vec![2, 0, 0],
        default_left: vec![true, true, true],
        is_leaf: vec![false, true, true],
        leaf_values: vec![0.0, left, right],
        covers: vec![100.0, 60.0, 40.0],
    }
}

/// Depth-2 tree splitting twice on feature 1 (duplicate feature on the
/// decision path):
///
/// ```text
/// f1 < 40 ? (cover 100)
///   yes: f1 < 30 ? (cover 70)
///     yes: leaf -0.5 (cover 40)
///     no:  leaf  0.2 (cover 30)
///   no: leaf 0.8 (cover 30)
/// ```
pub fn deep_tree_schema() -> TreeSchema {
    TreeSchema {
        num_nodes: 5,
        split_indices: vec![1, 1, 0, 0, 0],
        thresholds: vec![40.0, 30.0, 0.0, 0.0, 0.0],
        children_left: vec![1, 3, 0, 0, 0],
        children_right: vec![2, 4, 0, 0, 0],
        default_left: vec![true, false, true, true, true],
        is_leaf: vec![false, false, true, true, true],
        leaf_values: vec![0.0, 0.0, 0.8, -0.5, 0.2],
        covers: vec![100.0, 70.0, 30.0, 40.0, 30.0],
    }
}

/// Two-tree single-group ensemble over the fixture preprocessor.
pub fn fixture_schema() -> PipelineSchema {
    PipelineSchema {
        schema_version: 1,
        preprocessor: fixture_preprocessor(),
        classifier: ClassifierSchema {
            base_scores: vec![0.0],
            tree_groups: None,
            trees: vec![stump_schema(0, 0.0, -1.0, 1.0), deep_tree_schema()],
        },
    }
}

/// Single stump calibrated for the business-threshold scenarios:
/// income below center -> margin 0 (p = 0.5), above -> p = 0.4.
pub fn threshold_schema() -> PipelineSchema {
    PipelineSchema {
        schema_version: 1,
        preprocessor: fixture_preprocessor(),
        classifier: ClassifierSchema {
            base_scores: vec![0.0],
            tree_groups: None,
            trees: vec![stump_schema(0, 0.0, 0.0, MARGIN_P04)],
        },
    }
}

/// Two-group (per-class) ensemble: group 0 mirrors group 1 with the sign
/// flipped, the way per-class exports lay out binary attributions.
pub fn per_class_schema() -> PipelineSchema {
    PipelineSchema {
        schema_version: 1,
        preprocessor: fixture_preprocessor(),
        classifier: ClassifierSchema {
            base_scores: vec![0.0, 0.0],
            tree_groups: Some(vec![0, 1]),
            trees: vec![stump_schema(0, 0.0, 1.0, -1.0), stump_schema(0, 0.0, -1.0, 1.0)],
        },
    }
}

/// Table over the fixture columns in their canonical order.
pub fn fixture_table(rows: Vec<Vec<Option<f64>>>) -> DataTable {
    DataTable::from_parts(rows, fixture_columns()).unwrap()
}
