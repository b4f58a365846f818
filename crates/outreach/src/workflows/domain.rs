use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Legislative Assembly Constituency covered by the outreach drive.
///
/// This is the single list of regions consulted by the form, the analyzer, and
/// every report filter. The serialized value is the display name, which is also
/// the value stored in the `lac` column of both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Dhemaji,
    Sisiborgaon,
    Jonai,
}

impl Region {
    pub const fn ordered() -> [Self; 3] {
        [Self::Dhemaji, Self::Sisiborgaon, Self::Jonai]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dhemaji => "Dhemaji",
            Self::Sisiborgaon => "Sisiborgaon",
            Self::Jonai => "Jonai",
        }
    }

    /// Exact, case-sensitive lookup against the stored region code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|region| region.label() == code)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown LAC '{0}'")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_code(value).ok_or_else(|| UnknownRegion(value.to_string()))
    }
}

/// Reference data provisioned outside this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingStation {
    pub id: String,
    pub lac: String,
    pub station_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PollingStation {
    pub fn region(&self) -> Option<Region> {
        Region::from_code(&self.lac)
    }
}

/// A stored attendance record as returned by the table store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub lac: String,
    pub polling_station: String,
    #[serde(default)]
    pub total_attendances: Option<u64>,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub eminent_guests: Vec<String>,
    #[serde(default)]
    pub front_image_url: Option<String>,
    #[serde(default)]
    pub back_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn region(&self) -> Option<Region> {
        Region::from_code(&self.lac)
    }

    pub fn attendance(&self) -> u64 {
        self.total_attendances.unwrap_or(0)
    }
}

/// Record inserted by the submission workflow; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub lac: Region,
    pub polling_station: String,
    pub total_attendances: u64,
    pub venue: String,
    pub eminent_guests: Vec<String>,
    pub front_image_url: String,
    pub back_image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSide {
    Front,
    Back,
}

impl ImageSide {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for ImageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Binary photo captured by the field user.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
