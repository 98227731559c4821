//! The fitted scoring pipeline: column preprocessor + tree-ensemble
//! classifier, deserialized once at startup and immutable afterwards.

pub mod artifact;
pub mod forest;
pub mod preprocessor;

use std::path::Path;

use ndarray::Array2;

pub use artifact::{ArtifactError, PipelineSchema};
pub use forest::{sigmoid, Forest, Tree};
pub use preprocessor::{Preprocessor, ScaledColumn};

use crate::logic::table::DataTable;

/// Request-time pipeline failures. These are client errors: the decoded table
/// is incompatible with what the fitted pipeline expects.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("column '{0}' required by the preprocessor is missing from the payload")]
    MissingColumn(String),
}

/// The whole fitted pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    preprocessor: Preprocessor,
    classifier: Forest,
}

impl Pipeline {
    /// Deserialize the pipeline artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        tracing::info!("Loading pipeline artifact from {}", path.display());

        let text = std::fs::read_to_string(path)?;
        let schema = PipelineSchema::from_json(&text)?;
        let pipeline = Self::from_schema(schema)?;

        tracing::info!(
            "Pipeline loaded: {} trees, {} transformed features",
            pipeline.classifier.n_trees(),
            pipeline.preprocessor.n_output_features(),
        );
        Ok(pipeline)
    }

    /// Convert and validate the parsed artifact schema.
    pub fn from_schema(schema: PipelineSchema) -> Result<Self, ArtifactError> {
        let preprocessor = build_preprocessor(schema.preprocessor)?;
        let classifier = build_forest(schema.classifier, preprocessor.n_output_features())?;
        Ok(Self {
            preprocessor,
            classifier,
        })
    }

    /// The preprocessing stage alone (explanation transforms).
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// The classifier stage alone (attribution engine binding).
    pub fn classifier(&self) -> &Forest {
        &self.classifier
    }

    /// Positive-class probability for every row of the table.
    pub fn predict_proba(&self, table: &DataTable) -> Result<Vec<f64>, PipelineError> {
        let features = self.preprocessor.transform(table)?;
        Ok(self.probabilities(&features))
    }

    /// Positive-class probability for every row of a transformed matrix.
    pub fn probabilities(&self, features: &Array2<f64>) -> Vec<f64> {
        features
            .rows()
            .into_iter()
            .map(|row| sigmoid(self.classifier.positive_margin(row)))
            .collect()
    }
}

fn build_preprocessor(
    schema: artifact::PreprocessorSchema,
) -> Result<Preprocessor, ArtifactError> {
    let artifact::PreprocessorSchema {
        input_columns,
        scaler,
    } = schema;

    for (i, name) in input_columns.iter().enumerate() {
        if input_columns[..i].contains(name) {
            return Err(ArtifactError::Invalid(format!(
                "duplicate input column '{name}'"
            )));
        }
    }

    if scaler.columns.len() != scaler.centers.len()
        || scaler.columns.len() != scaler.scales.len()
    {
        return Err(ArtifactError::Invalid(format!(
            "scaler arrays disagree: {} columns, {} centers, {} scales",
            scaler.columns.len(),
            scaler.centers.len(),
            scaler.scales.len(),
        )));
    }

    let mut scaled = Vec::with_capacity(scaler.columns.len());
    for ((name, center), scale) in scaler
        .columns
        .into_iter()
        .zip(scaler.centers)
        .zip(scaler.scales)
    {
        if !input_columns.contains(&name) {
            return Err(ArtifactError::Invalid(format!(
                "scaler column '{name}' is not a declared input column"
            )));
        }
        if scaled.iter().any(|s: &ScaledColumn| s.name == name) {
            return Err(ArtifactError::Invalid(format!(
                "duplicate scaler column '{name}'"
            )));
        }
        if !center.is_finite() || !scale.is_finite() || scale == 0.0 {
            return Err(ArtifactError::Invalid(format!(
                "scaler column '{name}' has invalid center/scale ({center}, {scale})"
            )));
        }
        scaled.push(ScaledColumn {
            name,
            center,
            scale,
        });
    }

    Ok(Preprocessor::new(input_columns, scaled))
}

fn build_forest(
    schema: artifact::ClassifierSchema,
    n_features: usize,
) -> Result<Forest, ArtifactError> {
    if schema.base_scores.is_empty() {
        return Err(ArtifactError::Invalid(
            "classifier has no base scores".to_string(),
        ));
    }
    let n_groups = schema.base_scores.len();

    let tree_groups = match schema.tree_groups {
        Some(groups) => {
            if groups.len() != schema.trees.len() {
                return Err(ArtifactError::Invalid(format!(
                    "{} tree groups for {} trees",
                    groups.len(),
                    schema.trees.len(),
                )));
            }
            if let Some(&bad) = groups.iter().find(|&&g| g as usize >= n_groups) {
                return Err(ArtifactError::Invalid(format!(
                    "tree group {bad} out of range ({n_groups} groups)"
                )));
            }
            groups
        }
        None => vec![0; schema.trees.len()],
    };

    let mut trees = Vec::with_capacity(schema.trees.len());
    for (i, tree) in schema.trees.into_iter().enumerate() {
        trees.push(build_tree(tree, i, n_features)?);
    }

    Ok(Forest::new(trees, tree_groups, schema.base_scores))
}

fn build_tree(
    schema: artifact::TreeSchema,
    index: usize,
    n_features: usize,
) -> Result<Tree, ArtifactError> {
    let n = schema.num_nodes as usize;
    let lens = [
        schema.split_indices.len(),
        schema.thresholds.len(),
        schema.children_left.len(),
        schema.children_right.len(),
        schema.default_left.len(),
        schema.is_leaf.len(),
        schema.leaf_values.len(),
        schema.covers.len(),
    ];
    if lens.iter().any(|&l| l != n) {
        return Err(ArtifactError::Invalid(format!(
            "tree {index}: node arrays do not all have {n} entries"
        )));
    }

    for (node, &cover) in schema.covers.iter().enumerate() {
        if !cover.is_finite() || cover <= 0.0 {
            return Err(ArtifactError::Invalid(format!(
                "tree {index}: node {node} has non-positive cover {cover}"
            )));
        }
    }

    for node in 0..n {
        if !schema.is_leaf[node] && schema.split_indices[node] as usize >= n_features {
            return Err(ArtifactError::Invalid(format!(
                "tree {index}: node {node} splits on feature {} but the \
                 preprocessor emits {n_features} features",
                schema.split_indices[node],
            )));
        }
    }

    let tree = Tree::new(
        schema.split_indices,
        schema.thresholds,
        schema.children_left,
        schema.children_right,
        schema.default_left,
        schema.is_leaf,
        schema.leaf_values,
        schema.covers,
    );

    tree.validate()
        .map_err(|e| ArtifactError::Invalid(format!("tree {index}: {e}")))?;

    Ok(tree)
}
