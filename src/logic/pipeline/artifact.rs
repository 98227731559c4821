//! Schema types for the serialized pipeline artifact.
//!
//! These types provide a stable serialization format independent of runtime
//! types. Schema types are separate from runtime types for:
//! - Forward/backward compatibility (schema can evolve independently)
//! - Validation during deserialization
//! - Clear migration paths between schema versions
//!
//! The artifact is a single JSON document written at training-export time. It
//! is read exactly once, at process start; any structural problem is a fatal
//! startup error.

use serde::{Deserialize, Serialize};

/// Current artifact schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors raised while reading or validating the artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read pipeline artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse pipeline artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact schema version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid pipeline artifact: {0}")]
    Invalid(String),
}

/// Top-level artifact schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSchema {
    pub schema_version: u32,
    pub preprocessor: PreprocessorSchema,
    pub classifier: ClassifierSchema,
}

/// Fitted column-transformer stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorSchema {
    /// Input columns the pipeline was fitted on, in original order.
    pub input_columns: Vec<String>,
    /// The scaling sub-transformer. Input columns not listed here pass
    /// through unchanged.
    pub scaler: ScalerSchema,
}

/// Fitted standard-scaling sub-transformer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerSchema {
    /// Columns consumed by the scaler, in its output order.
    pub columns: Vec<String>,
    /// Per-column centers subtracted before scaling.
    pub centers: Vec<f64>,
    /// Per-column scale divisors. Must be finite and non-zero.
    pub scales: Vec<f64>,
}

/// Fitted tree-ensemble binary classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSchema {
    /// Raw margin per output group before any tree contribution.
    /// One entry for single-output binary ensembles, one per class otherwise.
    pub base_scores: Vec<f64>,
    /// Output group per tree. Absent means all trees belong to group 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_groups: Option<Vec<u32>>,
    pub trees: Vec<TreeSchema>,
}

/// Tree schema (SoA layout).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    /// Number of nodes (internal + leaves).
    pub num_nodes: u32,
    /// Split feature index for each node (ignored for leaves).
    pub split_indices: Vec<u32>,
    /// Split threshold for each node (ignored for leaves).
    pub thresholds: Vec<f64>,
    /// Left child index for each node (ignored for leaves).
    pub children_left: Vec<u32>,
    /// Right child index for each node (ignored for leaves).
    pub children_right: Vec<u32>,
    /// Default direction (true = left) for missing values.
    pub default_left: Vec<bool>,
    /// Leaf flag for each node.
    pub is_leaf: Vec<bool>,
    /// Leaf value for each node (0.0 for internal nodes).
    pub leaf_values: Vec<f64>,
    /// Sample cover for each node. Required: the attribution engine weights
    /// split branches by cover, so an ensemble exported without node
    /// statistics cannot be explained and is refused at load.
    pub covers: Vec<f64>,
}

impl PipelineSchema {
    /// Parse an artifact from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ArtifactError> {
        let schema: PipelineSchema = serde_json::from_str(text)?;
        if schema.schema_version != SCHEMA_VERSION {
            return Err(ArtifactError::UnsupportedVersion(schema.schema_version));
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_artifact_json() -> String {
        serde_json::json!({
            "schema_version": 1,
            "preprocessor": {
                "input_columns": ["income", "age"],
                "scaler": { "columns": ["income"], "centers": [0.0], "scales": [1.0] }
            },
            "classifier": {
                "base_scores": [0.0],
                "trees": [{
                    "num_nodes": 1,
                    "split_indices": [0],
                    "thresholds": [0.0],
                    "children_left": [0],
                    "children_right": [0],
                    "default_left": [true],
                    "is_leaf": [true],
                    "leaf_values": [0.5],
                    "covers": [10.0]
                }]
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_minimal_artifact() {
        let schema = PipelineSchema::from_json(&minimal_artifact_json()).unwrap();
        assert_eq!(schema.preprocessor.input_columns.len(), 2);
        assert_eq!(schema.classifier.trees.len(), 1);
        assert!(schema.classifier.tree_groups.is_none());
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let text = minimal_artifact_json().replace("\"schema_version\":1", "\"schema_version\":99");
        match PipelineSchema::from_json(&text) {
            Err(ArtifactError::UnsupportedVersion(99)) => {}
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_covers_fails_parse() {
        let text = minimal_artifact_json().replace(",\"covers\":[10.0]", "");
        assert!(matches!(
            PipelineSchema::from_json(&text),
            Err(ArtifactError::Json(_))
        ));
    }
}
