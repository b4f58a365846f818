use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::form::{image_content_type, SubmissionFields};
use super::service::{SubmissionError, SubmissionWorkflow};
use crate::store::{AssetStorage, SubmissionRepository};
use crate::workflows::domain::{ImageSide, ImageUpload};

/// Two phone photos plus form fields.
const MAX_FORM_BYTES: usize = 25 * 1024 * 1024;

/// Router builder exposing the collection form endpoint.
pub fn submission_router<R, S>(workflow: Arc<SubmissionWorkflow<R, S>>) -> Router
where
    R: SubmissionRepository + 'static,
    S: AssetStorage + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(submit_handler::<R, S>))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(workflow)
}

pub(crate) async fn read_fields(
    mut multipart: Multipart,
) -> Result<SubmissionFields, MultipartError> {
    let mut fields = SubmissionFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let side = match name.as_str() {
            "front_image" => Some(ImageSide::Front),
            "back_image" => Some(ImageSide::Back),
            _ => None,
        };

        match side {
            Some(side) => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}.jpg", side.label()));
                let content_type = image_content_type(field.content_type(), &file_name);
                let bytes = field.bytes().await?;
                let image = ImageUpload::new(file_name, content_type, bytes.to_vec());
                fields.set_image(side, image);
            }
            None => {
                let value = field.text().await?;
                fields.push_text(&name, value);
            }
        }
    }

    Ok(fields)
}

pub(crate) async fn submit_handler<R, S>(
    State(workflow): State<Arc<SubmissionWorkflow<R, S>>>,
    multipart: Multipart,
) -> Response
where
    R: SubmissionRepository + 'static,
    S: AssetStorage + 'static,
{
    let fields = match read_fields(multipart).await {
        Ok(fields) => fields,
        Err(error) => {
            let payload = json!({ "error": format!("malformed form body: {error}") });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let form = match fields.into_form() {
        Ok(form) => form,
        Err(error) => return error_response(SubmissionError::Validation(error)),
    };

    match workflow.submit(form).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: SubmissionError) -> Response {
    let status = match &error {
        SubmissionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionError::InFlight { .. } => StatusCode::CONFLICT,
        SubmissionError::Upload { .. } | SubmissionError::Persistence(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
