//! Completion analysis over polling stations and attendance submissions,
//! plus the dashboard views rendered from it.

mod analyzer;
pub mod router;
pub mod service;
pub mod views;

pub use analyzer::{
    analyze, unsubmitted_stations, CompletionReport, CompletionStat, CompletionTotals,
};
pub use router::reporting_router;
pub use service::{CompletionService, FetchError};
pub use views::{
    AnalyticsView, RegionFilter, SubmissionEntry, SubmissionsView, UnsubmittedStationEntry,
    UnsubmittedView,
};
