//! HTTP routes for the screening service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::StockRecord;
use crate::engine::{ScreenError, ScreenOutcome};
use crate::lexicon::ValueType;
use crate::ScreenerState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// Successful screening envelope.
///
/// Callers branch on the presence of `error` in the body, so this shape
/// never carries one.
#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub query: String,
    pub extracted_criteria: String,
    pub count: usize,
    pub results: Vec<StockRecord>,
}

impl From<ScreenOutcome> for ScreenResponse {
    fn from(outcome: ScreenOutcome) -> Self {
        Self {
            query: outcome.query,
            extracted_criteria: outcome.extracted_criteria,
            count: outcome.count,
            results: outcome.matches,
        }
    }
}

/// Failure envelope: an `error` message and nothing else.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One lexicon entry, for UI hints.
#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub display: String,
    pub value_type: ValueType,
    pub aliases: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub fields: Vec<FieldInfo>,
    pub count: usize,
}

/// Query parameters for the screen endpoint.
#[derive(Debug, Deserialize)]
pub struct ScreenParams {
    #[serde(default)]
    pub query: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Service landing route
pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "sift-screener",
        "version": env!("CARGO_PKG_VERSION"),
        "usage": "GET /screen?query=Find stocks with P/E ratio less than 18 and dividend yield greater than 2%",
        "endpoints": ["/health", "/screen", "/api/v1/fields"],
    }))
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "sift-screener".to_string(),
    })
}

/// Screen the dataset with a natural-language query
pub async fn screen(
    State(state): State<Arc<ScreenerState>>,
    Query(params): Query<ScreenParams>,
) -> Response {
    match state.engine.screen(&params.query).await {
        Ok(outcome) => (StatusCode::OK, Json(ScreenResponse::from(outcome))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, query = %params.query, "Screen request failed");
            (
                status_for(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// List the screenable fields and their aliases
pub async fn list_fields(State(state): State<Arc<ScreenerState>>) -> Json<FieldsResponse> {
    let fields: Vec<FieldInfo> = state
        .engine
        .lexicon()
        .fields()
        .iter()
        .map(|f| FieldInfo {
            name: f.key.clone(),
            display: f.display.clone(),
            value_type: f.value_type,
            aliases: f.aliases.clone(),
        })
        .collect();

    let count = fields.len();
    Json(FieldsResponse { fields, count })
}

/// Status code for a screening failure. Bodies are authoritative for
/// callers; codes are set for proxies and logs.
fn status_for(error: &ScreenError) -> StatusCode {
    match error {
        ScreenError::EmptyQuery | ScreenError::NoCriteriaRecognized => StatusCode::BAD_REQUEST,
        ScreenError::DatasetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let body = serde_json::to_value(ErrorResponse {
            error: "No query provided".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "No query provided"}));
    }

    #[test]
    fn test_screen_response_has_no_error_key() {
        let response = ScreenResponse {
            query: "pe below 10".to_string(),
            extracted_criteria: "P/E ratio < 10".to_string(),
            count: 0,
            results: vec![],
        };
        let body = serde_json::to_value(&response).unwrap();
        assert!(body.get("error").is_none());
        assert_eq!(body["count"], 0);
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ScreenError::EmptyQuery), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&ScreenError::NoCriteriaRecognized),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ScreenError::DatasetUnavailable("gone".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_screen_params_default_query() {
        let params: ScreenParams = serde_json::from_str("{}").unwrap();
        assert!(params.query.is_empty());
    }
}
