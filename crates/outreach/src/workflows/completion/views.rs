use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use super::super::domain::{PollingStation, Region, Submission, UnknownRegion};

/// Field teams report in India Standard Time.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

#[derive(Debug, Clone, Serialize)]
pub struct RegionStatEntry {
    pub region: Region,
    pub region_label: &'static str,
    pub submissions: usize,
    pub attendance: u64,
    pub submitted_stations: usize,
    pub total_stations: usize,
    pub completion_pct: f64,
    pub completion_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallStatEntry {
    pub submissions: usize,
    pub attendance: u64,
    pub submitted_stations: usize,
    pub total_stations: usize,
    pub completion_pct: f64,
    pub completion_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    pub regions: Vec<RegionStatEntry>,
    pub overall: OverallStatEntry,
    pub unrecognized_submissions: usize,
}

pub(crate) fn percent_label(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// Region selector applied to an already-computed station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Region(Region),
}

impl RegionFilter {
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Region(region) => region.label(),
        }
    }

    pub fn matches(self, lac: &str) -> bool {
        match self {
            Self::All => true,
            Self::Region(region) => region.label() == lac,
        }
    }

    /// "All" followed by every region, in the order the dashboard tabs show them.
    pub fn options() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(Region::ordered().into_iter().map(Self::Region))
            .collect()
    }
}

impl FromStr for RegionFilter {
    type Err = UnknownRegion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse().map(Self::Region)
    }
}

impl Serialize for RegionFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for RegionFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsubmittedStationEntry {
    pub id: String,
    pub lac: String,
    pub station_name: String,
    pub status_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionOutstanding {
    pub region: Region,
    pub region_label: &'static str,
    pub outstanding: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsubmittedView {
    pub filter: RegionFilter,
    pub total_outstanding: usize,
    pub by_region: Vec<RegionOutstanding>,
    pub stations: Vec<UnsubmittedStationEntry>,
    pub all_submitted: bool,
}

pub fn unsubmitted_view(unsubmitted: &[PollingStation], filter: RegionFilter) -> UnsubmittedView {
    let by_region = Region::ordered()
        .into_iter()
        .map(|region| RegionOutstanding {
            region,
            region_label: region.label(),
            outstanding: unsubmitted
                .iter()
                .filter(|station| station.lac == region.label())
                .count(),
        })
        .collect();

    let stations: Vec<UnsubmittedStationEntry> = unsubmitted
        .iter()
        .filter(|station| filter.matches(&station.lac))
        .map(|station| UnsubmittedStationEntry {
            id: station.id.clone(),
            lac: station.lac.clone(),
            station_name: station.station_name.clone(),
            status_label: "Not Submitted",
        })
        .collect();

    UnsubmittedView {
        filter,
        total_outstanding: unsubmitted.len(),
        by_region,
        all_submitted: stations.is_empty(),
        stations,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionEntry {
    pub id: String,
    pub lac: String,
    pub polling_station: String,
    pub total_attendances: u64,
    pub venue: String,
    pub eminent_guests: Vec<String>,
    pub front_image_url: Option<String>,
    pub back_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub submitted_on: String,
}

impl From<&Submission> for SubmissionEntry {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id.clone(),
            lac: submission.lac.clone(),
            polling_station: submission.polling_station.clone(),
            total_attendances: submission.attendance(),
            venue: submission.venue.clone(),
            eminent_guests: submission.eminent_guests.clone(),
            front_image_url: submission.front_image_url.clone(),
            back_image_url: submission.back_image_url.clone(),
            created_at: submission.created_at,
            submitted_on: display_timestamp(submission.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionsView {
    pub total: usize,
    pub submissions: Vec<SubmissionEntry>,
}

impl SubmissionsView {
    pub fn from_submissions(submissions: &[Submission]) -> Self {
        Self {
            total: submissions.len(),
            submissions: submissions.iter().map(SubmissionEntry::from).collect(),
        }
    }
}

pub fn display_timestamp(at: DateTime<Utc>) -> String {
    const FORMAT: &str = "%d %b %Y, %I:%M %p";
    match FixedOffset::east_opt(IST_OFFSET_SECS) {
        Some(ist) => format!("{} IST", at.with_timezone(&ist).format(FORMAT)),
        None => format!("{} UTC", at.format(FORMAT)),
    }
}
