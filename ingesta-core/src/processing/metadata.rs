// ============================================================================
// ingesta-core/src/processing/metadata.rs
// ============================================================================
//
// VIDEO METADATA: Per-Field Fallible Media Attributes
//
// Every attribute is its own `Result`, so a failure in one never invalidates
// the others. This module holds the record type, the parsers that turn bare
// ffprobe values into fields, and the typed cells used by the reports.

use std::fmt;

use thiserror::Error;

use crate::reporting::ReportCell;
use crate::utils::round2;

/// Text written to a report cell in place of a value that could not be
/// extracted.
pub const ERROR_MARKER: &str = "Error";

/// Why a single metadata field has no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The tool failed or reported an error on stderr.
    #[error("tool error: {0}")]
    Tool(String),

    /// The tool produced no value for this field.
    #[error("no value reported")]
    Missing,

    /// The tool produced text that is not a usable number.
    #[error("unparsable value '{0}'")]
    Unparsable(String),

    /// Aspect ratio requested for a zero-height stream.
    #[error("height is zero")]
    ZeroHeight,

    /// Derived field whose inputs were not available.
    #[error("inputs unavailable")]
    Unavailable,
}

/// A metadata attribute or the reason it is missing.
pub type Field<T> = Result<T, FieldError>;

/// Metadata extracted for one matched file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    /// Container duration in seconds
    pub duration: Field<f64>,
    /// Frames per second of the first video stream
    pub frame_rate: Field<f64>,
    pub width: Field<u32>,
    pub height: Field<u32>,
    /// `round(width / height, 2)`
    pub aspect_ratio: Field<f64>,
}

impl VideoMetadata {
    /// Assembles a record from the stream fields and duration, deriving the
    /// aspect ratio.
    pub fn new(
        duration: Field<f64>,
        frame_rate: Field<f64>,
        width: Field<u32>,
        height: Field<u32>,
    ) -> Self {
        let aspect_ratio = aspect_ratio(&width, &height);
        Self {
            duration,
            frame_rate,
            width,
            height,
            aspect_ratio,
        }
    }

    /// A record with every field set to the same error.
    pub fn failed(error: FieldError) -> Self {
        Self {
            duration: Err(error.clone()),
            frame_rate: Err(error.clone()),
            width: Err(error.clone()),
            height: Err(error),
            aspect_ratio: Err(FieldError::Unavailable),
        }
    }

    /// Whether any field carries an error.
    pub fn is_degraded(&self) -> bool {
        !self.degraded_fields().is_empty()
    }

    /// Names and errors of every field that could not be extracted.
    pub fn degraded_fields(&self) -> Vec<(&'static str, &FieldError)> {
        [
            ("duration", self.duration.as_ref().err()),
            ("frame rate", self.frame_rate.as_ref().err()),
            ("width", self.width.as_ref().err()),
            ("height", self.height.as_ref().err()),
            ("aspect ratio", self.aspect_ratio.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|e| (name, e)))
        .collect()
    }

    /// Report cells in column order: duration, frame rate, width, height,
    /// aspect ratio.
    pub fn report_cells(&self) -> [ReportCell; 5] {
        [
            float_cell(&self.duration),
            float_cell(&self.frame_rate),
            int_cell(&self.width),
            int_cell(&self.height),
            float_cell(&self.aspect_ratio),
        ]
    }
}

impl fmt::Display for VideoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [duration, frame_rate, width, height, aspect] = self.report_cells();
        write!(
            f,
            "duration={duration} fps={frame_rate} size={width}x{height} aspect={aspect}"
        )
    }
}

// ============================================================================
// PARSERS
// ============================================================================

/// Parses a frame rate given either as a rational (`30000/1001`) or as a
/// plain decimal (`25`). Rationals are rounded to two decimals.
pub fn parse_frame_rate(raw: &str) -> Field<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::Missing);
    }
    let unparsable = || FieldError::Unparsable(raw.to_string());

    let value = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| unparsable())?;
            let den: f64 = den.trim().parse().map_err(|_| unparsable())?;
            if den == 0.0 {
                return Err(unparsable());
            }
            round2(num / den)
        }
        None => raw.parse::<f64>().map_err(|_| unparsable())?,
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(unparsable())
    }
}

/// Parses a pixel dimension.
pub fn parse_dimension(raw: &str) -> Field<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::Missing);
    }
    raw.parse::<u32>()
        .map_err(|_| FieldError::Unparsable(raw.to_string()))
}

/// Parses a container duration in seconds. ffprobe prints `N/A` when the
/// container has no duration, which is unparsable.
///
/// Only finite, non-negative values are accepted. A negative, `nan` or
/// `inf` duration parses as a float but cannot describe real media, so it
/// is reported as `Unparsable` and the cell shows the error marker.
pub fn parse_duration(raw: &str) -> Field<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FieldError::Missing);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(FieldError::Unparsable(raw.to_string())),
    }
}

/// `round(width / height, 2)` when both dimensions are known and the height
/// is non-zero.
pub fn aspect_ratio(width: &Field<u32>, height: &Field<u32>) -> Field<f64> {
    match (width, height) {
        (Ok(_), Ok(0)) => Err(FieldError::ZeroHeight),
        (Ok(w), Ok(h)) => Ok(round2(f64::from(*w) / f64::from(*h))),
        _ => Err(FieldError::Unavailable),
    }
}

/// Splits the stream query output into width, height and frame rate. Each
/// of the first three lines is parsed independently; absent lines are
/// `Missing`.
pub fn parse_stream_output(stdout: &str) -> (Field<u32>, Field<u32>, Field<f64>) {
    let mut lines = stdout.lines();
    let width = parse_dimension(lines.next().unwrap_or(""));
    let height = parse_dimension(lines.next().unwrap_or(""));
    let frame_rate = parse_frame_rate(lines.next().unwrap_or(""));
    (width, height, frame_rate)
}

// ============================================================================
// RENDERING
// ============================================================================

/// Cell for a float field; failures become the error marker.
pub fn float_cell(field: &Field<f64>) -> ReportCell {
    match field {
        Ok(value) => ReportCell::Float(*value),
        Err(_) => ReportCell::from(ERROR_MARKER),
    }
}

/// Cell for an integer field; failures become the error marker.
pub fn int_cell(field: &Field<u32>) -> ReportCell {
    match field {
        Ok(value) => ReportCell::Integer(*value),
        Err(_) => ReportCell::from(ERROR_MARKER),
    }
}
