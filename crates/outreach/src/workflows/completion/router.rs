use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{CompletionService, FetchError};
use super::views::RegionFilter;
use crate::store::SubmissionRepository;
use crate::workflows::domain::Region;

/// Read-only endpoints backing the region picker, form dropdown, and admin dashboard.
pub fn reporting_router<R>(service: Arc<CompletionService<R>>) -> Router
where
    R: SubmissionRepository + 'static,
{
    Router::new()
        .route("/api/v1/regions", get(regions_handler::<R>))
        .route(
            "/api/v1/regions/:region/stations",
            get(stations_handler::<R>),
        )
        .route("/api/v1/admin/analytics", get(analytics_handler::<R>))
        .route("/api/v1/admin/submissions", get(submissions_handler::<R>))
        .route("/api/v1/admin/unsubmitted", get(unsubmitted_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UnsubmittedQuery {
    #[serde(default)]
    pub(crate) lac: Option<String>,
}

fn fetch_failure(error: FetchError) -> Response {
    tracing::warn!(%error, "report data unavailable");
    let payload = json!({ "error": error.to_string() });
    (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
}

pub(crate) async fn regions_handler<R>(State(service): State<Arc<CompletionService<R>>>) -> Response
where
    R: SubmissionRepository + 'static,
{
    let regions: Vec<_> = service
        .regions()
        .iter()
        .map(|region| json!({ "region": region, "label": region.label() }))
        .collect();
    (StatusCode::OK, Json(json!({ "regions": regions }))).into_response()
}

pub(crate) async fn stations_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
    Path(region): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let region: Region = match region.parse() {
        Ok(region) => region,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::NOT_FOUND, Json(payload)).into_response();
        }
    };

    match service.stations(region).await {
        Ok(stations) => (
            StatusCode::OK,
            Json(json!({ "region": region, "stations": stations })),
        )
            .into_response(),
        Err(error) => fetch_failure(error),
    }
}

pub(crate) async fn analytics_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    match service.analytics().await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => fetch_failure(error),
    }
}

pub(crate) async fn submissions_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    match service.submissions().await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => fetch_failure(error),
    }
}

pub(crate) async fn unsubmitted_handler<R>(
    State(service): State<Arc<CompletionService<R>>>,
    Query(query): Query<UnsubmittedQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let filter = match query.lac.as_deref().map(str::parse::<RegionFilter>) {
        None => RegionFilter::All,
        Some(Ok(filter)) => filter,
        Some(Err(error)) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.unsubmitted(filter).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => fetch_failure(error),
    }
}
