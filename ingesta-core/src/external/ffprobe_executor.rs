//! ffprobe integration for per-file metadata extraction.
//!
//! Each file gets two queries: one for the first video stream's width,
//! height and frame rate, one for the container duration. Both ask for bare
//! values (`default=noprint_wrappers=1:nokey=1`), one per line. Probing never
//! fails as a whole; every problem lands on the affected fields.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::ToolRunner;
use crate::processing::metadata::{
    Field, FieldError, VideoMetadata, parse_duration, parse_stream_output,
};

/// Extracts [`VideoMetadata`] with ffprobe through a [`ToolRunner`].
pub struct MetadataProbe<'a> {
    runner: &'a dyn ToolRunner,
    ffprobe: PathBuf,
    timeout: Option<Duration>,
}

impl<'a> MetadataProbe<'a> {
    pub fn new(runner: &'a dyn ToolRunner, ffprobe: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            runner,
            ffprobe,
            timeout,
        }
    }

    /// Arguments of the stream query, without the program name.
    pub fn stream_args(input: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=width,height,r_frame_rate".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            input.to_string_lossy().into_owned(),
        ]
    }

    /// Arguments of the duration query, without the program name.
    pub fn duration_args(input: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            input.to_string_lossy().into_owned(),
        ]
    }

    /// Probes `input`. Never fails; degraded fields are logged with the
    /// file path and the raw text that caused them.
    pub fn probe(&self, input: &Path) -> VideoMetadata {
        let (width, height, frame_rate) = match self.query(Self::stream_args(input)) {
            Ok(stdout) => parse_stream_output(&stdout),
            Err(error) => (Err(error.clone()), Err(error.clone()), Err(error)),
        };

        let duration: Field<f64> = self
            .query(Self::duration_args(input))
            .and_then(|stdout| parse_duration(stdout.lines().next().unwrap_or("")));

        let metadata = VideoMetadata::new(duration, frame_rate, width, height);
        for (field, error) in metadata.degraded_fields() {
            log::warn!("{}: {} unavailable ({})", input.display(), field, error);
        }
        metadata
    }

    /// Runs one ffprobe query and returns its stdout. Any stderr output, a
    /// non-zero exit, a spawn failure or a timeout is a tool error.
    fn query(&self, args: Vec<String>) -> Field<String> {
        let mut command = Command::new(&self.ffprobe);
        command.args(&args);

        match self.runner.run(command, self.timeout) {
            Ok(output) => {
                let stderr = output.stderr.trim();
                if !stderr.is_empty() {
                    Err(FieldError::Tool(stderr.to_string()))
                } else if !output.success() {
                    Err(FieldError::Tool(format!("ffprobe {}", output.status_label())))
                } else {
                    Ok(output.stdout)
                }
            }
            Err(e) => Err(FieldError::Tool(e.to_string())),
        }
    }
}
