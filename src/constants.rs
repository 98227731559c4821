//! Central Configuration Constants
//!
//! Single source of truth for business constants and configuration defaults.
//! To change the decision threshold or default artifact path, only edit this
//! file.

/// Business decision threshold on the positive-class probability.
///
/// A client is labeled 1 (default risk) when `probability >= 0.47`. The value
/// was chosen against the business cost of false negatives and is deliberately
/// independent of the model's internal calibration. Never re-derive it from
/// data and never replace it with the 0.5 the classifier would use on its own.
pub const DECISION_THRESHOLD: f64 = 0.47;

/// Default location of the serialized pipeline artifact
pub const DEFAULT_MODEL_PATH: &str = "models/pipeline.json";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "riskscore-api";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_the_business_constant() {
        assert_eq!(DECISION_THRESHOLD, 0.47);
    }
}
