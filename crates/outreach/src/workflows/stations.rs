//! Polling station reference data loaded from a CSV export.

use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::domain::{PollingStation, Region};

#[derive(Debug)]
pub enum StationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for StationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationImportError::Io(err) => write!(f, "failed to read station list: {}", err),
            StationImportError::Csv(err) => write!(f, "invalid station CSV data: {}", err),
        }
    }
}

impl std::error::Error for StationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StationImportError::Io(err) => Some(err),
            StationImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for StationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Result of reading a station list.
#[derive(Debug, Default)]
pub struct StationImport {
    pub stations: Vec<PollingStation>,
    /// Rows whose LAC is not one of the known regions, or whose name is blank.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    lac: String,
    station_name: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub struct StationImporter;

impl StationImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<StationImport, StationImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read `lac,station_name[,id]` rows. Rows missing an `id` get a
    /// positional one (`ps-0001`, ...).
    pub fn from_reader<R: Read>(reader: R) -> Result<StationImport, StationImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut import = StationImport::default();

        for (index, row) in csv_reader.deserialize::<StationRow>().enumerate() {
            let row = row?;
            let Some(region) = Region::from_code(&row.lac) else {
                tracing::warn!(
                    lac = %row.lac,
                    station = %row.station_name,
                    "skipping station with unknown LAC"
                );
                import.skipped += 1;
                continue;
            };
            if row.station_name.is_empty() {
                import.skipped += 1;
                continue;
            }

            import.stations.push(PollingStation {
                id: row.id.unwrap_or_else(|| format!("ps-{:04}", index + 1)),
                lac: region.label().to_string(),
                station_name: row.station_name,
                created_at: None,
            });
        }

        Ok(import)
    }
}
