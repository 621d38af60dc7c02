//! Inbound HTTP surface of the report function.
//!
//! Routes (under the configured prefix):
//! - `GET /report/{org_id}`: the PDF report
//! - `/report`, `/report/`: `400 Missing org_id`
//! - `GET /health`: liveness probe

use crate::config::EndpointSettings;
use crate::core::engine::ReportEngine;
use crate::domain::ports::ControlSource;
use crate::utils::error::ReportError;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, MethodRouter},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

const FUNCTION_KEY_HEADER: &str = "x-functions-key";
const FUNCTION_KEY_QUERY: &str = "code";

pub struct AppState<S: ControlSource> {
    pub engine: ReportEngine<S>,
    pub endpoint: EndpointSettings,
}

impl<S: ControlSource> AppState<S> {
    pub fn new(engine: ReportEngine<S>, endpoint: EndpointSettings) -> Self {
        Self { engine, endpoint }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Missing org_id")]
    MissingOrgId,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Error generating report: {source}")]
    Report {
        source: ReportError,
        expose_detail: bool,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::MissingOrgId => {
                (StatusCode::BAD_REQUEST, "Missing org_id").into_response()
            }
            HandlerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            HandlerError::Report {
                source,
                expose_detail,
            } => {
                tracing::error!(
                    "Failed to generate report: {} (category: {:?})",
                    source,
                    source.category()
                );
                let body = if expose_detail {
                    format!("Error generating report: {}", source)
                } else {
                    "Error generating report".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Builds the router; `allow_any_method` decides whether the report route is GET-only.
pub fn router<S: ControlSource + 'static>(state: Arc<AppState<S>>) -> Router {
    let report_route: MethodRouter<Arc<AppState<S>>> = if state.endpoint.allow_any_method {
        any(generate_report::<S>)
    } else {
        get(generate_report::<S>)
    };

    let routes = Router::new()
        .route("/report/:org_id", report_route)
        .route("/report", any(missing_org_id))
        .route("/report/", any(missing_org_id))
        .route("/health", get(health));

    let prefix = state.endpoint.normalized_prefix();
    let routes = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    };

    routes.layer(TraceLayer::new_for_http()).with_state(state)
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn missing_org_id() -> HandlerError {
    HandlerError::MissingOrgId
}

pub async fn generate_report<S: ControlSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(org_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, HandlerError> {
    let org_id = org_id.trim();
    if org_id.is_empty() {
        return Err(HandlerError::MissingOrgId);
    }

    let presented = headers
        .get(FUNCTION_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| params.get(FUNCTION_KEY_QUERY).map(String::as_str));
    if !state.endpoint.authorizes(presented) {
        tracing::warn!("Rejected report request for {}: bad or missing function key", org_id);
        return Err(HandlerError::Unauthorized);
    }

    let report = state
        .engine
        .generate(org_id)
        .await
        .map_err(|source| HandlerError::Report {
            source,
            expose_detail: state.endpoint.expose_error_detail,
        })?;

    tracing::info!(
        "Serving {} ({} controls) for organization {}",
        report.filename,
        report.control_count,
        report.org_id
    );
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}
