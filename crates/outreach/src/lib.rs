//! Attendance collection and completion reporting for the outreach drive.

pub mod config;
pub mod error;
pub mod navigation;
pub mod store;
pub mod telemetry;
pub mod workflows;
