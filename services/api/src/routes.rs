use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use outreach::store::{AssetStorage, SubmissionRepository};
use outreach::workflows::completion::{reporting_router, CompletionService};
use outreach::workflows::submission::{submission_router, SubmissionWorkflow};
use serde_json::json;
use std::sync::Arc;

/// Form, dashboard, and operational endpoints over one table store and bucket.
pub(crate) fn with_outreach_routes<R, S>(repository: Arc<R>, assets: Arc<S>) -> axum::Router
where
    R: SubmissionRepository + 'static,
    S: AssetStorage + 'static,
{
    let workflow = Arc::new(SubmissionWorkflow::new(repository.clone(), assets));
    let reporting = Arc::new(CompletionService::new(repository));

    submission_router(workflow)
        .merge(reporting_router(reporting))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
