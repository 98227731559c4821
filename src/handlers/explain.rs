//! Explanation handlers
//!
//! Both routes run the rows through the preprocessing stage only: the
//! attribution engine is bound to the classifier, which consumes transformed
//! features, not raw input. Global keeps the O(rows × features) population
//! sweep out of the single-client path; local carries the base value needed
//! to reconstruct the margin for one explained instance.

use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::logic::explain::TreeExplainer;
use crate::logic::sanitize::{clean_matrix, clean_value, clean_vec};
use crate::models::{GlobalExplanationResponse, LocalExplanationResponse, ScoreRequest};
use crate::state::AppState;

/// Population-level attribution: every row, every transformed feature.
pub async fn shap_global(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> AppResult<Json<GlobalExplanationResponse>> {
    let table = request.into_table()?;
    let pipeline = state.model.pipeline();
    let features = pipeline.preprocessor().transform(&table)?;

    let explainer = TreeExplainer::new(pipeline.classifier());
    let shap = explainer.shap_values(features.view());
    let group = pipeline.classifier().positive_group();

    let shap_values = clean_matrix(
        (0..shap.n_samples())
            .map(|row| shap.feature_shap(row, group))
            .collect(),
    );
    let features_transformed = clean_matrix(
        features
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect(),
    );

    Ok(Json(GlobalExplanationResponse {
        shap_values,
        feature_names: state.model.feature_names().to_vec(),
        features_transformed,
    }))
}

/// Single-row attribution with the engine's base value.
pub async fn shap_local(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> AppResult<Json<LocalExplanationResponse>> {
    let table = request.into_table()?;
    if table.n_rows() != 1 {
        return Err(AppError::ValidationError(format!(
            "local explanation expects exactly one row, got {}",
            table.n_rows()
        )));
    }

    let pipeline = state.model.pipeline();
    let features = pipeline.preprocessor().transform(&table)?;

    let explainer = TreeExplainer::new(pipeline.classifier());
    let shap = explainer.shap_values(features.view());
    let group = pipeline.classifier().positive_group();

    Ok(Json(LocalExplanationResponse {
        shap_values: clean_vec(shap.feature_shap(0, group)),
        feature_names: state.model.feature_names().to_vec(),
        features_transformed: clean_vec(features.row(0).to_vec()),
        base_value: clean_value(explainer.base_value(group)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logic::pipeline::Pipeline;
    use crate::logic::testing::{fixture_columns, fixture_schema};
    use crate::state::ModelState;
    use std::sync::Arc;

    fn app_state() -> AppState {
        AppState {
            model: Arc::new(ModelState::from_pipeline(
                Pipeline::from_schema(fixture_schema()).unwrap(),
            )),
            config: Config {
                model_path: String::new(),
                port: 0,
                environment: "test".to_string(),
            },
        }
    }

    fn request(rows: Vec<Vec<Option<f64>>>) -> ScoreRequest {
        ScoreRequest {
            data: rows,
            columns: fixture_columns(),
        }
    }

    #[tokio::test]
    async fn test_global_shapes_match_rows_and_feature_names() {
        let state = app_state();
        let req = request(vec![
            vec![Some(1500.0), Some(25.0), Some(0.0)],
            vec![Some(400.0), Some(35.0), Some(3.0)],
            vec![None, Some(45.0), Some(1.0)],
        ]);

        let Json(response) = shap_global(State(state), Json(req)).await.unwrap();
        let width = response.feature_names.len();
        assert_eq!(width, 3);
        assert_eq!(response.shap_values.len(), 3);
        assert_eq!(response.features_transformed.len(), 3);
        for row in &response.shap_values {
            assert_eq!(row.len(), width);
        }
        for row in &response.features_transformed {
            assert_eq!(row.len(), width);
        }
    }

    #[tokio::test]
    async fn test_global_response_contains_no_non_finite_values() {
        let state = app_state();
        // A missing cell turns into NaN in the transformed matrix; the
        // response must carry the sanitized placeholder instead.
        let req = request(vec![vec![None, None, None]]);

        let Json(response) = shap_global(State(state), Json(req)).await.unwrap();
        for row in response
            .shap_values
            .iter()
            .chain(response.features_transformed.iter())
        {
            assert!(row.iter().all(|v| v.is_finite()));
        }
    }

    #[tokio::test]
    async fn test_local_reconstructs_the_margin() {
        let state = app_state();
        let pipeline = Pipeline::from_schema(fixture_schema()).unwrap();
        let req = request(vec![vec![Some(800.0), Some(20.0), Some(0.0)]]);

        let Json(response) = shap_local(State(state), Json(req)).await.unwrap();
        assert_eq!(response.shap_values.len(), response.feature_names.len());
        assert_eq!(
            response.features_transformed.len(),
            response.feature_names.len()
        );

        let table = crate::logic::testing::fixture_table(vec![vec![
            Some(800.0),
            Some(20.0),
            Some(0.0),
        ]]);
        let features = pipeline.preprocessor().transform(&table).unwrap();
        let margin = pipeline.classifier().positive_margin(features.row(0));
        let reconstructed: f64 =
            response.base_value + response.shap_values.iter().sum::<f64>();
        assert!((reconstructed - margin).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_local_rejects_multi_row_payloads() {
        let state = app_state();
        let req = request(vec![
            vec![Some(1.0), Some(2.0), Some(3.0)],
            vec![Some(4.0), Some(5.0), Some(6.0)],
        ]);

        match shap_local(State(state), Json(req)).await {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("exactly one row")),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explanations_are_column_order_independent() {
        let state = app_state();
        let canonical = request(vec![vec![Some(800.0), Some(20.0), Some(0.0)]]);
        let permuted = ScoreRequest {
            data: vec![vec![Some(0.0), Some(800.0), Some(20.0)]],
            columns: vec![
                "children".to_string(),
                "income".to_string(),
                "age".to_string(),
            ],
        };

        let Json(a) = shap_local(State(state.clone()), Json(canonical)).await.unwrap();
        let Json(b) = shap_local(State(state), Json(permuted)).await.unwrap();
        assert_eq!(a.shap_values, b.shap_values);
        assert_eq!(a.features_transformed, b.features_transformed);
        assert_eq!(a.base_value, b.base_value);
    }
}
