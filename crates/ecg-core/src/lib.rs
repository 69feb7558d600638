//! Core types for digitizing printed ECG reports: the twelve-lead record,
//! extraction options, plugin traits and the file pipeline.

pub mod error;
pub mod options;
pub mod pipeline;
pub mod plugin;
pub mod record;
