//! Shared application state.
//!
//! The pipeline is deserialized once at startup and never mutated, so every
//! request handler reads it through a plain `Arc` with no locking.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::logic::pipeline::{ArtifactError, Pipeline};

/// The loaded pipeline plus everything derived from it at startup.
pub struct ModelState {
    pipeline: Pipeline,
    /// Output feature names, positionally aligned with the transformed
    /// matrix. Computed once; every explanation response reuses it.
    feature_names: Vec<String>,
}

impl ModelState {
    /// Deserialize the artifact and derive the feature-name map.
    ///
    /// Any failure here is fatal: the service must not start without a model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Ok(Self::from_pipeline(Pipeline::load(path)?))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        let feature_names = pipeline.preprocessor().feature_names();
        Self {
            pipeline,
            feature_names,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelState>,
    pub config: Config,
}
