pub mod completion;
pub mod domain;
pub mod stations;
pub mod submission;
