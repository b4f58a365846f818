use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::workflows::domain::{ImageSide, ImageUpload, Region, UnknownRegion};

/// Everything a field user enters on the collection form.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    pub lac: Region,
    pub polling_station: String,
    pub total_attendances: u64,
    pub venue: String,
    pub eminent_guests: Vec<String>,
    pub front_image: Option<ImageUpload>,
    pub back_image: Option<ImageUpload>,
}

/// Form that passed the required-field checks; both images are guaranteed.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedForm {
    pub(crate) lac: Region,
    pub(crate) polling_station: String,
    pub(crate) total_attendances: u64,
    pub(crate) venue: String,
    pub(crate) eminent_guests: Vec<String>,
    pub(crate) front_image: ImageUpload,
    pub(crate) back_image: ImageUpload,
}

impl SubmissionForm {
    pub(crate) fn validate(self) -> Result<ValidatedForm, ValidationError> {
        let (front_image, back_image) = match (self.front_image, self.back_image) {
            (Some(front), Some(back)) => (front, back),
            (None, _) => return Err(ValidationError::MissingImage(ImageSide::Front)),
            (_, None) => return Err(ValidationError::MissingImage(ImageSide::Back)),
        };

        let polling_station = self.polling_station.trim().to_string();
        if polling_station.is_empty() {
            return Err(ValidationError::MissingField("polling_station"));
        }
        let venue = self.venue.trim().to_string();
        if venue.is_empty() {
            return Err(ValidationError::MissingField("venue"));
        }

        Ok(ValidatedForm {
            lac: self.lac,
            polling_station,
            total_attendances: self.total_attendances,
            venue,
            eminent_guests: clean_guests(self.eminent_guests),
            front_image,
            back_image,
        })
    }
}

/// Required-field failures raised before any store interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please upload both front and back images ({0} image missing)")]
    MissingImage(ImageSide),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("total_attendances must be a non-negative whole number, got '{0}'")]
    InvalidAttendance(String),
    #[error(transparent)]
    UnknownRegion(#[from] UnknownRegion),
}

/// Drop blank guest rows, keeping the order of the rest.
pub(crate) fn clean_guests(guests: Vec<String>) -> Vec<String> {
    guests
        .into_iter()
        .map(|guest| guest.trim().to_string())
        .filter(|guest| !guest.is_empty())
        .collect()
}

/// Bucket path for one photo: `{lac}/{millis}-{upload id}-{side}-{file name}`.
///
/// Both photos of a submission share `upload_id`; it keeps paths unique when
/// phones send identical file names within the same millisecond.
pub(crate) fn asset_path(
    lac: Region,
    side: ImageSide,
    at: DateTime<Utc>,
    upload_id: Uuid,
    file_name: &str,
) -> String {
    format!(
        "{}/{}-{}-{}-{}",
        lac.label(),
        at.timestamp_millis(),
        upload_id.simple(),
        side.label(),
        sanitize_file_name(file_name)
    )
}

fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Resolve the content type of an uploaded photo, guessing from the file
/// name when the client sent none or an unparseable value.
pub fn image_content_type(declared: Option<&str>, file_name: &str) -> String {
    declared
        .and_then(|raw| raw.parse::<mime::Mime>().ok())
        .unwrap_or_else(|| mime_guess::from_path(file_name).first_or_octet_stream())
        .essence_str()
        .to_string()
}

/// Incrementally collected multipart fields, converted once the body is read.
#[derive(Debug, Default)]
pub struct SubmissionFields {
    lac: Option<String>,
    polling_station: Option<String>,
    total_attendances: Option<String>,
    venue: Option<String>,
    eminent_guests: Vec<String>,
    front_image: Option<ImageUpload>,
    back_image: Option<ImageUpload>,
}

impl SubmissionFields {
    /// Record a text field. Unknown names are ignored.
    pub fn push_text(&mut self, name: &str, value: String) {
        match name {
            "lac" => self.lac = Some(value),
            "polling_station" => self.polling_station = Some(value),
            "total_attendances" => self.total_attendances = Some(value),
            "venue" => self.venue = Some(value),
            "eminent_guests" | "eminent_guests[]" => self.eminent_guests.push(value),
            _ => {}
        }
    }

    /// Empty file inputs count as missing.
    pub fn set_image(&mut self, side: ImageSide, image: ImageUpload) {
        if image.bytes.is_empty() {
            return;
        }
        match side {
            ImageSide::Front => self.front_image = Some(image),
            ImageSide::Back => self.back_image = Some(image),
        }
    }

    pub fn into_form(self) -> Result<SubmissionForm, ValidationError> {
        let lac: Region = self
            .lac
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::MissingField("lac"))?
            .parse()?;

        let raw_attendance = self
            .total_attendances
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::MissingField("total_attendances"))?;
        let total_attendances = raw_attendance
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidAttendance(raw_attendance.clone()))?;

        Ok(SubmissionForm {
            lac,
            polling_station: self.polling_station.unwrap_or_default(),
            total_attendances,
            venue: self.venue.unwrap_or_default(),
            eminent_guests: self.eminent_guests,
            front_image: self.front_image,
            back_image: self.back_image,
        })
    }
}

/// Terminal outcome of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub status: &'static str,
    pub lac: Region,
    pub polling_station: String,
    pub eminent_guests: Vec<String>,
    pub front_image_url: String,
    pub back_image_url: String,
    /// Delay before the client should return to the home screen.
    pub redirect_after_ms: u64,
}
