//! Response payloads

use serde::Serialize;

/// `POST /predict`
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Binary label per row, from the business threshold.
    pub predictions: Vec<u8>,
    /// Positive-class probability per row.
    pub probas_class_1: Vec<f64>,
}

/// `POST /shap_global`
#[derive(Debug, Serialize)]
pub struct GlobalExplanationResponse {
    /// Attribution matrix, rows × transformed features.
    pub shap_values: Vec<Vec<f64>>,
    /// Transformed feature names, positionally aligned with the matrices.
    pub feature_names: Vec<String>,
    /// The preprocessed rows the attributions were computed on.
    pub features_transformed: Vec<Vec<f64>>,
}

/// `POST /shap_local`
#[derive(Debug, Serialize)]
pub struct LocalExplanationResponse {
    /// Attribution vector for the single explained row.
    pub shap_values: Vec<f64>,
    pub feature_names: Vec<String>,
    pub features_transformed: Vec<f64>,
    /// Expected model output before any feature contribution;
    /// `base_value + sum(shap_values)` reconstructs the classifier margin.
    pub base_value: f64,
}
