//! Field submission workflow: validate the form, upload both photos, then
//! insert one attendance record.

pub mod form;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use form::{
    image_content_type, SubmissionFields, SubmissionForm, SubmissionReceipt, ValidationError,
};
pub use router::submission_router;
pub use service::{SubmissionError, SubmissionWorkflow, REDIRECT_DELAY};
