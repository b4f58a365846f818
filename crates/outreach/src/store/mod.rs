//! Boundary to the hosted table store and object storage bucket.
//!
//! Workflows only see the two traits below so they can be exercised against
//! in-memory doubles; [`RestStoreClient`] is the production adapter.

mod rest;

use async_trait::async_trait;

use crate::workflows::domain::{
    ImageUpload, NewSubmission, PollingStation, Region, SortOrder, Submission,
};

pub use rest::RestStoreClient;

/// Table access for reference stations and attendance submissions.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Stations for one region ordered by name, or every station ordered by
    /// region then name.
    async fn list_stations(
        &self,
        region: Option<Region>,
    ) -> Result<Vec<PollingStation>, StoreError>;

    /// All submissions ordered by creation time.
    async fn list_submissions(&self, order: SortOrder) -> Result<Vec<Submission>, StoreError>;

    async fn insert_submission(&self, record: NewSubmission) -> Result<(), StoreError>;
}

/// Object storage for the submitted photos.
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Upload `image` at `path`, returning its public URL.
    async fn upload_asset(&self, path: &str, image: &ImageUpload) -> Result<String, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected store payload: {0}")]
    Decode(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
