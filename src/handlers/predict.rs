//! Prediction handler

use axum::{extract::State, Json};

use crate::constants::DECISION_THRESHOLD;
use crate::error::AppResult;
use crate::logic::sanitize::clean_vec;
use crate::models::{PredictResponse, ScoreRequest};
use crate::state::AppState;

/// Score every row of the payload.
///
/// The label comes from the fixed business threshold, not from the
/// classifier's own decision boundary.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> AppResult<Json<PredictResponse>> {
    let table = request.into_table()?;
    let probas = clean_vec(state.model.pipeline().predict_proba(&table)?);
    let predictions = probas
        .iter()
        .map(|&p| u8::from(p >= DECISION_THRESHOLD))
        .collect();

    Ok(Json(PredictResponse {
        predictions,
        probas_class_1: probas,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::AppError;
    use crate::logic::pipeline::Pipeline;
    use crate::logic::testing::{fixture_columns, fixture_schema, threshold_schema};
    use crate::state::ModelState;
    use std::sync::Arc;

    fn app_state(schema: crate::logic::pipeline::PipelineSchema) -> AppState {
        AppState {
            model: Arc::new(ModelState::from_pipeline(
                Pipeline::from_schema(schema).unwrap(),
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
    async fn test_probability_050_is_labeled_1_and_040_is_0() {
        // The threshold fixture maps income below center to p = 0.5 and
        // above to p = 0.4; the 0.47 business threshold splits them.
        let state = app_state(threshold_schema());
        let req = request(vec![
            vec![Some(500.0), Some(30.0), Some(1.0)],
            vec![Some(1500.0), Some(30.0), Some(1.0)],
        ]);

        let Json(response) = predict(State(state), Json(req)).await.unwrap();
        assert!((response.probas_class_1[0] - 0.5).abs() < 1e-12);
        assert!((response.probas_class_1[1] - 0.4).abs() < 1e-9);
        assert_eq!(response.predictions, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_output_length_matches_rows_and_bounds_hold() {
        let state = app_state(fixture_schema());
        let req = request(vec![
            vec![Some(1500.0), Some(25.0), Some(0.0)],
            vec![None, None, None],
            vec![Some(400.0), Some(60.0), Some(4.0)],
        ]);

        let Json(response) = predict(State(state), Json(req)).await.unwrap();
        assert_eq!(response.predictions.len(), 3);
        assert_eq!(response.probas_class_1.len(), 3);
        for (&label, &p) in response.predictions.iter().zip(&response.probas_class_1) {
            assert!((0.0..=1.0).contains(&p));
            assert_eq!(label == 1, p >= DECISION_THRESHOLD);
        }
    }

    #[tokio::test]
    async fn test_ragged_rows_are_a_decode_error() {
        let state = app_state(fixture_schema());
        let req = request(vec![vec![Some(1.0)]]);

        match predict(State(state), Json(req)).await {
            Err(AppError::DecodeError(_)) => {}
            other => panic!("expected DecodeError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_model_column_is_a_pipeline_error() {
        let state = app_state(fixture_schema());
        let req = ScoreRequest {
            data: vec![vec![Some(1.0)]],
            columns: vec!["income".to_string()],
        };

        match predict(State(state), Json(req)).await {
            Err(AppError::PipelineError(msg)) => assert!(msg.contains("age")),
            other => panic!("expected PipelineError, got {other:?}"),
        }
    }
}
