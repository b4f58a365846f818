use std::sync::Arc;

use super::analyzer::{analyze, CompletionReport};
use super::views::{AnalyticsView, RegionFilter, SubmissionsView, UnsubmittedView};
use crate::store::{StoreError, SubmissionRepository};
use crate::workflows::domain::{PollingStation, Region, SortOrder};

/// Read side of the dashboard. Every call re-fetches the full dataset.
pub struct CompletionService<R> {
    repository: Arc<R>,
    regions: Vec<Region>,
}

impl<R> CompletionService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_regions(repository, Region::ordered().to_vec())
    }

    pub fn with_regions(repository: Arc<R>, regions: Vec<Region>) -> Self {
        Self {
            repository,
            regions,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub async fn report(&self) -> Result<CompletionReport, FetchError> {
        let submissions = self
            .repository
            .list_submissions(SortOrder::Ascending)
            .await
            .map_err(FetchError::Submissions)?;
        let stations = self
            .repository
            .list_stations(None)
            .await
            .map_err(FetchError::Stations)?;

        let report = analyze(&self.regions, &stations, &submissions);
        tracing::info!(
            stations = stations.len(),
            submissions = submissions.len(),
            outstanding = report.unsubmitted.len(),
            unrecognized = report.unrecognized_submissions,
            "computed completion report"
        );
        Ok(report)
    }

    pub async fn analytics(&self) -> Result<AnalyticsView, FetchError> {
        Ok(self.report().await?.analytics())
    }

    pub async fn unsubmitted(&self, filter: RegionFilter) -> Result<UnsubmittedView, FetchError> {
        Ok(self.report().await?.unsubmitted_view(filter))
    }

    /// Newest submissions first.
    pub async fn submissions(&self) -> Result<SubmissionsView, FetchError> {
        let submissions = self
            .repository
            .list_submissions(SortOrder::Descending)
            .await
            .map_err(FetchError::Submissions)?;
        Ok(SubmissionsView::from_submissions(&submissions))
    }

    /// Station choices for the form's dropdown, ordered by name.
    pub async fn stations(&self, region: Region) -> Result<Vec<PollingStation>, FetchError> {
        self.repository
            .list_stations(Some(region))
            .await
            .map_err(FetchError::Stations)
    }
}

/// Failure to load reference data or submissions for a report.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not load polling stations: {0}")]
    Stations(#[source] StoreError),
    #[error("could not load submissions: {0}")]
    Submissions(#[source] StoreError),
}
