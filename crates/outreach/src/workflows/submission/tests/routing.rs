use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::submission::submission_router;

fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::post("/api/v1/submissions")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

fn complete_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        ("lac", "Jonai"),
        ("polling_station", "7 - Likabali Bazar"),
        ("total_attendances", "120"),
        ("venue", "Bazar community hall"),
        ("eminent_guests", "Zila Parishad member"),
        ("eminent_guests", ""),
        ("eminent_guests", "Retired headmaster"),
    ]
}

const PHOTO: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

#[tokio::test]
async fn submit_route_accepts_complete_forms() {
    let (workflow, store) = build_workflow(MemoryStore::default());
    let router = submission_router(Arc::new(workflow));

    let body = multipart_body(
        &complete_texts(),
        &[
            ("front_image", "front view.jpg", PHOTO),
            ("back_image", "back.jpg", PHOTO),
        ],
    );
    let response = router
        .oneshot(multipart_request(body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "submitted");
    assert_eq!(payload["lac"], "Jonai");
    assert_eq!(payload["redirect_after_ms"], 2000);

    let paths = store.upload_paths();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].starts_with("Jonai/"));
    assert!(paths[0].ends_with("-front-front_view.jpg"));

    let stored = store.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].total_attendances, Some(120));
    assert_eq!(stored[0].eminent_guests.len(), 2);
}

#[tokio::test]
async fn submit_route_rejects_missing_back_image_before_store_calls() {
    let (workflow, store) = build_workflow(MemoryStore::default());
    let router = submission_router(Arc::new(workflow));

    let body = multipart_body(
        &complete_texts(),
        &[("front_image", "front.jpg", PHOTO)],
    );
    let response = router
        .oneshot(multipart_request(body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("back image missing"));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn submit_route_rejects_unknown_region() {
    let (workflow, store) = build_workflow(MemoryStore::default());
    let router = submission_router(Arc::new(workflow));

    let mut texts = complete_texts();
    texts[0] = ("lac", "Majuli");
    let body = multipart_body(
        &texts,
        &[
            ("front_image", "front.jpg", PHOTO),
            ("back_image", "back.jpg", PHOTO),
        ],
    );
    let response = router
        .oneshot(multipart_request(body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn submit_route_reports_upload_failures_as_bad_gateway() {
    let (workflow, store) = build_workflow(MemoryStore::failing_upload(1));
    let router = submission_router(Arc::new(workflow));

    let body = multipart_body(
        &complete_texts(),
        &[
            ("front_image", "front.jpg", PHOTO),
            ("back_image", "back.jpg", PHOTO),
        ],
    );
    let response = router
        .oneshot(multipart_request(body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("front image"));
    assert!(store.stored().is_empty());
}
