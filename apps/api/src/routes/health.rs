use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a status object with service version and which cloud collaborators are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interviewer-api",
        "features": {
            "durable_storage": state.config.s3_bucket.is_some(),
            "cloud_analysis": state.config.anthropic_api_key.is_some(),
            "speech": state.config.enable_speech,
            "question_source": state.interview.question_source(),
        }
    }))
}
