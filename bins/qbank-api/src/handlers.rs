use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::metrics;
use crate::AppState;
use qbank_common::types::{ExecutionRequest, Language, TestCase};
use qbank_engine::ExecutionError;

/// Body of `POST /api/code-test/:language`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Body of `POST /api/code-test/validate`
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
}

/// Caller mistakes map to 400, everything else to 500
fn error_response(err: &ExecutionError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

pub async fn run_code_test(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
    Json(payload): Json<SubmitRequest>,
) -> Response {
    let Some(lang) = Language::parse(&language) else {
        warn!(language = %language, "Rejected code test for unknown language");
        metrics::record_request("unknown", "rejected");
        return error_response(&ExecutionError::UnsupportedLanguage(language));
    };

    info!(
        language = %lang,
        test_count = payload.test_cases.len(),
        "Received code test"
    );

    let request = ExecutionRequest {
        language: lang,
        source_code: payload.code,
        test_cases: payload.test_cases,
    };

    let start = Instant::now();
    match state.executor.execute(&request).await {
        Ok(response) => {
            metrics::observe_execution(lang, &response, start.elapsed());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            if e.is_client_error() {
                warn!(language = %lang, error = %e, "Code test rejected");
                metrics::record_request(lang.as_str(), "rejected");
            } else {
                error!(language = %lang, error = %e, "Code test failed");
                metrics::record_request(lang.as_str(), "error");
            }
            error_response(&e)
        }
    }
}

pub async fn validate_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateRequest>,
) -> Response {
    if payload.language.trim().is_empty() || payload.code.trim().is_empty() {
        return error_response(&ExecutionError::invalid_input(
            "Language and code are required",
        ));
    }

    let Some(lang) = Language::parse(&payload.language) else {
        return error_response(&ExecutionError::UnsupportedLanguage(payload.language));
    };

    match state.validator.validate(lang, &payload.code).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            if e.is_client_error() {
                warn!(language = %lang, error = %e, "Validation rejected");
            } else {
                error!(language = %lang, error = %e, "Validation failed");
            }
            error_response(&e)
        }
    }
}

pub async fn list_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let languages = state.executor.config().languages.language_infos();
    Json(json!({ "languages": languages }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn metrics_handler() -> Response {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
