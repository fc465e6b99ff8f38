//! Core library for ingesting media files from a source tree.
//!
//! This crate enumerates a source tree, copies every file matching an
//! extension filter into a destination tree, extracts per-file metadata with
//! ffprobe, optionally encodes a downscaled proxy with ffmpeg, and writes
//! copied, omitted and failed reports.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ingesta_core::config::PipelineConfigBuilder;
//! use ingesta_core::external::SystemRunner;
//! use ingesta_core::progress::NullProgress;
//! use std::path::PathBuf;
//!
//! let mut config = PipelineConfigBuilder::new()
//!     .source_root(PathBuf::from("/path/to/card"))
//!     .destination_root(PathBuf::from("/path/to/ingest"))
//!     .extension("mp4")
//!     .generate_proxies(true)
//!     .workers(4)
//!     .build()
//!     .unwrap();
//! config.validate().unwrap();
//!
//! let summary = ingesta_core::ingest(&config, &SystemRunner, &NullProgress).unwrap();
//! println!("{} copied, {} omitted", summary.counters.copied, summary.counters.omitted);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod processing;
pub mod progress;
pub mod reporting;
pub mod utils;

// Re-exports for public API
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use discovery::{DiscoveredFile, SourceWalker};
pub use error::{CoreError, CoreResult};
pub use external::{SystemRunner, ToolRunner};
pub use processing::{Pipeline, VideoMetadata, ingest};
pub use progress::{NullProgress, ProgressTracker};
pub use reporting::{RunCounters, RunSummary};
pub use utils::{format_bytes, format_duration};
