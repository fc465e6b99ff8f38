//! Per-file processing and run orchestration.
//!
//! This module holds the steps applied to every matched file (copy,
//! metadata, proxy layout) and the pipeline that drives each discovered
//! file through them.

/// Destination layout and atomic copying
pub mod copy;

/// Per-field fallible metadata and its parsers
pub mod metadata;

/// Pipeline state machine and scheduling
pub mod pipeline;

/// Proxy output layout
pub mod proxy;

pub use metadata::{Field, FieldError, VideoMetadata};
pub use pipeline::{FileOutcome, FileStage, Pipeline, RunReport, ingest};
