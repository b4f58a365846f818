use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use super::form::{asset_path, SubmissionForm, SubmissionReceipt, ValidatedForm, ValidationError};
use crate::store::{AssetStorage, StoreError, SubmissionRepository};
use crate::workflows::domain::{ImageSide, ImageUpload, NewSubmission, Region};

/// How long the client shows the confirmation before returning home.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(2000);

type StationKey = (Region, String);

/// Uploads both photos, then records the submission.
pub struct SubmissionWorkflow<R, S> {
    repository: Arc<R>,
    assets: Arc<S>,
    in_flight: Mutex<HashSet<StationKey>>,
}

impl<R, S> SubmissionWorkflow<R, S>
where
    R: SubmissionRepository + 'static,
    S: AssetStorage + 'static,
{
    pub fn new(repository: Arc<R>, assets: Arc<S>) -> Self {
        Self {
            repository,
            assets,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub async fn submit(
        &self,
        form: SubmissionForm,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.submit_at(form, Utc::now()).await
    }

    /// Submit with an explicit timestamp for the asset paths.
    ///
    /// The front photo is uploaded before the back photo and the record is only
    /// inserted once both succeed. A failed back upload leaves the front photo in
    /// the bucket.
    pub async fn submit_at(
        &self,
        form: SubmissionForm,
        at: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let form = form.validate()?;
        let _claim = self.claim(&form)?;
        let upload_id = Uuid::new_v4();

        let front_image_url = self
            .upload(&form, ImageSide::Front, &form.front_image, at, upload_id)
            .await?;
        let back_image_url = self
            .upload(&form, ImageSide::Back, &form.back_image, at, upload_id)
            .await?;

        let ValidatedForm {
            lac,
            polling_station,
            total_attendances,
            venue,
            eminent_guests,
            ..
        } = form;

        let record = NewSubmission {
            lac,
            polling_station: polling_station.clone(),
            total_attendances,
            venue,
            eminent_guests: eminent_guests.clone(),
            front_image_url: front_image_url.clone(),
            back_image_url: back_image_url.clone(),
        };

        if let Err(source) = self.repository.insert_submission(record).await {
            tracing::error!(
                %lac,
                station = %polling_station,
                %front_image_url,
                %back_image_url,
                error = %source,
                "submission insert failed after uploads"
            );
            return Err(SubmissionError::Persistence(source));
        }

        tracing::info!(%lac, station = %polling_station, total_attendances, "submission recorded");

        Ok(SubmissionReceipt {
            status: "submitted",
            lac,
            polling_station,
            eminent_guests,
            front_image_url,
            back_image_url,
            redirect_after_ms: REDIRECT_DELAY.as_millis() as u64,
        })
    }

    async fn upload(
        &self,
        form: &ValidatedForm,
        side: ImageSide,
        image: &ImageUpload,
        at: DateTime<Utc>,
        upload_id: Uuid,
    ) -> Result<String, SubmissionError> {
        let path = asset_path(form.lac, side, at, upload_id, &image.file_name);
        tracing::debug!(%path, %side, bytes = image.bytes.len(), "uploading image");

        self.assets
            .upload_asset(&path, image)
            .await
            .map_err(|source| {
                tracing::warn!(%path, %side, error = %source, "image upload failed");
                SubmissionError::Upload { side, source }
            })
    }

    fn claim(&self, form: &ValidatedForm) -> Result<InFlightClaim<'_>, SubmissionError> {
        let key = (form.lac, form.polling_station.clone());
        let mut guard = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(key.clone()) {
            return Err(SubmissionError::InFlight {
                lac: form.lac,
                station: form.polling_station.clone(),
            });
        }
        Ok(InFlightClaim {
            set: &self.in_flight,
            key,
        })
    }
}

/// Releases the station key when the submission attempt finishes, however it ends.
struct InFlightClaim<'a> {
    set: &'a Mutex<HashSet<StationKey>>,
    key: StationKey,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Error raised by the submission workflow.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a submission for {station} ({lac}) is already in progress")]
    InFlight { lac: Region, station: String },
    #[error("failed to upload {side} image: {source}")]
    Upload {
        side: ImageSide,
        #[source]
        source: StoreError,
    },
    #[error("failed to save submission: {0}")]
    Persistence(#[source] StoreError),
}
