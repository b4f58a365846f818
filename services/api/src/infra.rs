use async_trait::async_trait;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use outreach::error::AppError;
use outreach::store::{AssetStorage, StoreError, SubmissionRepository};
use outreach::workflows::domain::{
    ImageUpload, NewSubmission, PollingStation, Region, SortOrder, Submission,
};
use outreach::workflows::stations::StationImporter;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Table store and bucket held in process memory, used when no `STORE_URL`
/// is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStore {
    stations: Arc<Mutex<Vec<PollingStation>>>,
    submissions: Arc<Mutex<Vec<Submission>>>,
    assets: Arc<Mutex<Vec<String>>>,
}

impl InMemoryStore {
    pub(crate) fn with_stations(stations: Vec<PollingStation>) -> Self {
        Self {
            stations: Arc::new(Mutex::new(stations)),
            ..Self::default()
        }
    }

    pub(crate) fn asset_paths(&self) -> Vec<String> {
        self.assets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryStore {
    async fn list_stations(
        &self,
        region: Option<Region>,
    ) -> Result<Vec<PollingStation>, StoreError> {
        let guard = self.stations.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stations: Vec<PollingStation> = guard
            .iter()
            .filter(|station| region.map_or(true, |region| station.lac == region.label()))
            .cloned()
            .collect();
        stations.sort_by(|a, b| {
            a.lac
                .cmp(&b.lac)
                .then_with(|| a.station_name.cmp(&b.station_name))
        });
        Ok(stations)
    }

    async fn list_submissions(&self, order: SortOrder) -> Result<Vec<Submission>, StoreError> {
        let mut submissions = self
            .submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        submissions.sort_by_key(|submission| submission.created_at);
        if order == SortOrder::Descending {
            submissions.reverse();
        }
        Ok(submissions)
    }

    async fn insert_submission(&self, record: NewSubmission) -> Result<(), StoreError> {
        let mut guard = self
            .submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = format!("mem-{}", guard.len() + 1);
        guard.push(Submission {
            id,
            lac: record.lac.label().to_string(),
            polling_station: record.polling_station,
            total_attendances: Some(record.total_attendances),
            venue: record.venue,
            eminent_guests: record.eminent_guests,
            front_image_url: Some(record.front_image_url),
            back_image_url: Some(record.back_image_url),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl AssetStorage for InMemoryStore {
    async fn upload_asset(&self, path: &str, image: &ImageUpload) -> Result<String, StoreError> {
        if image.bytes.is_empty() {
            return Err(StoreError::Unavailable(format!("empty upload for {path}")));
        }
        let mut guard = self.assets.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.iter().any(|existing| existing == path) {
            return Err(StoreError::Status {
                status: 409,
                body: format!("asset {path} already exists"),
            });
        }
        guard.push(path.to_string());
        Ok(format!("memory://assets/{path}"))
    }
}

/// Stations for the in-memory store: the CSV at `path` when given, otherwise
/// a small built-in list covering every region.
pub(crate) fn load_stations(path: Option<&Path>) -> Result<Vec<PollingStation>, AppError> {
    let Some(path) = path else {
        return Ok(sample_stations());
    };

    let import = StationImporter::from_path(path)?;
    tracing::info!(
        path = %path.display(),
        stations = import.stations.len(),
        skipped = import.skipped,
        "loaded polling stations"
    );
    Ok(import.stations)
}

pub(crate) fn sample_stations() -> Vec<PollingStation> {
    [
        ("Dhemaji", "1 - Sille LP School"),
        ("Dhemaji", "2 - Dhemaji Town Club"),
        ("Sisiborgaon", "1 - Bordoloni High School"),
        ("Sisiborgaon", "2 - Sisiborgaon Bazar"),
        ("Jonai", "1 - Murkong Selek HS"),
        ("Jonai", "2 - Likabali Community Hall"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (lac, name))| PollingStation {
        id: format!("ps-{:04}", index + 1),
        lac: lac.to_string(),
        station_name: name.to_string(),
        created_at: None,
    })
    .collect()
}
