use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::store::{AssetStorage, StoreError, SubmissionRepository};
use crate::workflows::domain::{
    ImageUpload, NewSubmission, PollingStation, Region, SortOrder, Submission,
};
use crate::workflows::submission::{SubmissionForm, SubmissionWorkflow};

pub(super) fn image(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}

pub(super) fn form() -> SubmissionForm {
    SubmissionForm {
        lac: Region::Dhemaji,
        polling_station: "21 - Silapathar Town Hall".to_string(),
        total_attendances: 64,
        venue: "Town hall auditorium".to_string(),
        eminent_guests: vec![
            "Circle Officer".to_string(),
            "   ".to_string(),
            "Headmaster".to_string(),
        ],
        front_image: Some(image("front.jpg")),
        back_image: Some(image("back.jpg")),
    }
}

#[derive(Clone, Default)]
pub(super) struct UploadGate {
    pub(super) entered: Arc<Notify>,
    pub(super) release: Arc<Notify>,
}

/// In-memory table store and bucket that records every call it receives.
#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) stations: Mutex<Vec<PollingStation>>,
    pub(super) submissions: Mutex<Vec<Submission>>,
    pub(super) uploads: Mutex<Vec<String>>,
    pub(super) calls: AtomicUsize,
    /// 1-based index of the upload that should fail.
    pub(super) fail_upload: Option<usize>,
    pub(super) fail_insert: bool,
    /// When set, each upload signals `entered` and then waits on `release`.
    pub(super) gate: Option<UploadGate>,
}

impl MemoryStore {
    pub(super) fn failing_upload(index: usize) -> Self {
        Self {
            fail_upload: Some(index),
            ..Self::default()
        }
    }

    pub(super) fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    pub(super) fn gated(gate: UploadGate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub(super) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn upload_paths(&self) -> Vec<String> {
        self.uploads.lock().expect("upload mutex poisoned").clone()
    }

    pub(super) fn stored(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .expect("submission mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl SubmissionRepository for MemoryStore {
    async fn list_stations(
        &self,
        region: Option<Region>,
    ) -> Result<Vec<PollingStation>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let guard = self.stations.lock().expect("station mutex poisoned");
        Ok(guard
            .iter()
            .filter(|station| region.map_or(true, |r| station.lac == r.label()))
            .cloned()
            .collect())
    }

    async fn list_submissions(&self, order: SortOrder) -> Result<Vec<Submission>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut submissions = self.stored();
        submissions.sort_by_key(|submission| submission.created_at);
        if order == SortOrder::Descending {
            submissions.reverse();
        }
        Ok(submissions)
    }

    async fn insert_submission(&self, record: NewSubmission) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(StoreError::Status {
                status: 500,
                body: "insert rejected".to_string(),
            });
        }

        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        let sequence = guard.len() as i64;
        guard.push(Submission {
            id: format!("sub-{:04}", sequence + 1),
            lac: record.lac.label().to_string(),
            polling_station: record.polling_station,
            total_attendances: Some(record.total_attendances),
            venue: record.venue,
            eminent_guests: record.eminent_guests,
            front_image_url: Some(record.front_image_url),
            back_image_url: Some(record.back_image_url),
            created_at: Utc.with_ymd_and_hms(2025, 3, 30, 6, 0, 0).unwrap()
                + Duration::minutes(sequence),
        });
        Ok(())
    }
}

#[async_trait]
impl AssetStorage for MemoryStore {
    async fn upload_asset(&self, path: &str, _image: &ImageUpload) -> Result<String, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let mut uploads = self.uploads.lock().expect("upload mutex poisoned");
        uploads.push(path.to_string());
        if self.fail_upload == Some(uploads.len()) {
            return Err(StoreError::Transport("connection reset".to_string()));
        }
        Ok(format!("https://cdn.example.org/{path}"))
    }
}

pub(super) fn build_workflow(
    store: MemoryStore,
) -> (SubmissionWorkflow<MemoryStore, MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(store);
    let workflow = SubmissionWorkflow::new(store.clone(), store.clone());
    (workflow, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) const BOUNDARY: &str = "outreach-test-boundary";

/// Hand-built multipart body: text fields followed by optional files.
pub(super) fn multipart_body(texts: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
