//! Configuration module

use std::env;

use crate::constants::{DEFAULT_MODEL_PATH, DEFAULT_PORT};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the serialized pipeline artifact
    pub model_path: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }
}
