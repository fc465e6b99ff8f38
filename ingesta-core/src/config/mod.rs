//! Configuration structures and constants for the ingesta-core library.
//!
//! A [`PipelineConfig`] is built once before enumeration begins and stays
//! immutable for the whole run. Pure checks happen in the builder; checks
//! that touch the filesystem or external tools happen in
//! [`PipelineConfig::validate`].

mod builder;
mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::external::check_dependency;

pub use builder::{PipelineConfigBuilder, timeout_from_secs};
pub use file::FileSettings;

// Default constants

/// Default proxy width in pixels. Height follows the source aspect ratio.
pub const DEFAULT_PROXY_WIDTH: u32 = 640;

/// Default constant-quality value for proxy encodes.
pub const DEFAULT_PROXY_CRF: u8 = 23;

/// Default x264 preset for proxy encodes.
pub const DEFAULT_PROXY_PRESET: &str = "veryfast";

/// Container extension every proxy is written with.
pub const DEFAULT_PROXY_CONTAINER: &str = "mp4";

/// Suffix appended to the file stem of every proxy.
pub const DEFAULT_PROXY_SUFFIX: &str = "_proxy";

/// Directory under the destination root that holds proxies.
pub const DEFAULT_PROXY_DIR: &str = "proxies";

/// Default timeout for a single ffprobe invocation.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for a single ffmpeg proxy encode.
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Report written for files that matched and were copied.
pub const COPIED_REPORT_NAME: &str = "Files_Copied.csv";

/// Report written for files that did not match the extension filter.
pub const OMITTED_REPORT_NAME: &str = "Files_Omitted.csv";

/// Report written for files that matched but could not be copied.
pub const FAILED_REPORT_NAME: &str = "Files_Failed.csv";

/// Workbook written for copied files when workbooks are enabled.
pub const COPIED_WORKBOOK_NAME: &str = "Files_Copied.xlsx";

/// Workbook written for omitted files when workbooks are enabled.
pub const OMITTED_WORKBOOK_NAME: &str = "Files_Omitted.xlsx";

/// Workbook written for failed files when workbooks are enabled.
pub const FAILED_WORKBOOK_NAME: &str = "Files_Failed.xlsx";

/// Worksheet names of the three workbooks.
pub const COPIED_SHEET_NAME: &str = "Copied Files Metadata";
pub const OMITTED_SHEET_NAME: &str = "Omitted Files";
pub const FAILED_SHEET_NAME: &str = "Failed Files";

/// Normalizes a user-supplied extension to a single lowercase token with
/// one leading dot (`"MP4"`, `"mp4"` and `".mp4"` all become `".mp4"`).
///
/// Returns `None` when nothing usable remains after trimming.
#[must_use]
pub fn normalize_extension(raw: &str) -> Option<String> {
    let token = raw.trim().trim_start_matches('.').to_lowercase();
    if token.is_empty() || token.contains(['/', '\\']) || token.chars().any(char::is_whitespace) {
        return None;
    }
    Some(format!(".{token}"))
}

/// Fixed encoding profile used for proxy derivatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyProfile {
    /// Output width in pixels; height is computed by ffmpeg (`-1`)
    pub width: u32,
    /// Video codec passed to `-c:v`
    pub codec: String,
    /// Codec profile passed to `-profile:v`
    pub profile: String,
    /// Codec level passed to `-level:v`
    pub level: String,
    /// Pixel format passed to `-pix_fmt`
    pub pixel_format: String,
    /// Constant rate factor
    pub crf: u8,
    /// Encoder speed preset
    pub preset: String,
    /// Output container extension, without the dot
    pub container: String,
    /// Suffix appended to the file stem
    pub suffix: String,
    /// Directory under the destination root holding proxies
    pub directory: String,
}

impl Default for ProxyProfile {
    fn default() -> Self {
        Self {
            width: DEFAULT_PROXY_WIDTH,
            codec: "libx264".to_string(),
            profile: "high".to_string(),
            level: "4.0".to_string(),
            pixel_format: "yuv420p".to_string(),
            crf: DEFAULT_PROXY_CRF,
            preset: DEFAULT_PROXY_PRESET.to_string(),
            container: DEFAULT_PROXY_CONTAINER.to_string(),
            suffix: DEFAULT_PROXY_SUFFIX.to_string(),
            directory: DEFAULT_PROXY_DIR.to_string(),
        }
    }
}

impl ProxyProfile {
    /// The `-vf` scale expression for this profile.
    #[must_use]
    pub fn scale_filter(&self) -> String {
        format!("scale={}:-1", self.width)
    }
}

/// Locations of the external tools, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Main configuration structure for an ingestion run.
///
/// # Examples
///
/// ```rust,no_run
/// use ingesta_core::config::PipelineConfigBuilder;
/// use std::path::PathBuf;
///
/// let mut config = PipelineConfigBuilder::new()
///     .source_root(PathBuf::from("/media/card"))
///     .destination_root(PathBuf::from("/media/ingest"))
///     .extension("mp4")
///     .preserve_hierarchy(true)
///     .generate_proxies(true)
///     .build()
///     .unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the tree to ingest
    pub source_root: PathBuf,

    /// Root that receives copies, proxies and reports
    pub destination_root: PathBuf,

    /// Mirror source subdirectories under the destination root
    pub preserve_hierarchy: bool,

    /// Normalized extension filter (lowercase, leading dot)
    pub extension: String,

    /// Produce a downscaled proxy for every copied file
    pub generate_proxies: bool,

    /// Write `.xlsx` workbooks in addition to the CSV reports
    pub write_workbooks: bool,

    /// Proxy encoding profile
    pub proxy: ProxyProfile,

    /// External tool locations
    pub tools: ToolPaths,

    /// Number of files processed concurrently (1 = sequential)
    pub workers: usize,

    /// Timeout for each ffprobe invocation
    pub probe_timeout: Option<Duration>,

    /// Timeout for each ffmpeg invocation
    pub transcode_timeout: Option<Duration>,
}

impl PipelineConfig {
    /// Checks the environment this configuration will run against.
    ///
    /// The source root must be a readable directory. The destination root
    /// is created when missing. Both roots are canonicalized. `ffprobe`
    /// must be runnable, and `ffmpeg` too when proxies are enabled.
    ///
    /// Any failure here is a configuration error and aborts the run before
    /// a single file is touched.
    pub fn validate(&mut self) -> CoreResult<()> {
        self.source_root = canonical_source(&self.source_root)?;

        std::fs::create_dir_all(&self.destination_root).map_err(|e| {
            CoreError::Config(format!(
                "Failed to create destination directory '{}': {e}",
                self.destination_root.display()
            ))
        })?;
        self.destination_root = self.destination_root.canonicalize().map_err(|e| {
            CoreError::Config(format!(
                "Invalid destination directory '{}': {e}",
                self.destination_root.display()
            ))
        })?;
        if self.destination_root == self.source_root {
            return Err(CoreError::Config(
                "Destination directory must differ from the source directory".to_string(),
            ));
        }

        check_dependency(&self.tools.ffprobe)?;
        if self.generate_proxies {
            check_dependency(&self.tools.ffmpeg)?;
        }

        log::debug!(
            "Configuration validated: source={}, destination={}, extension={}",
            self.source_root.display(),
            self.destination_root.display(),
            self.extension
        );
        Ok(())
    }

    /// Directory holding proxy derivatives.
    #[must_use]
    pub fn proxy_root(&self) -> PathBuf {
        self.destination_root.join(&self.proxy.directory)
    }

    /// Path of the copied-files report.
    #[must_use]
    pub fn copied_report_path(&self) -> PathBuf {
        self.destination_root.join(COPIED_REPORT_NAME)
    }

    /// Path of the omitted-files report.
    #[must_use]
    pub fn omitted_report_path(&self) -> PathBuf {
        self.destination_root.join(OMITTED_REPORT_NAME)
    }

    /// Path of the failed-files report.
    #[must_use]
    pub fn failed_report_path(&self) -> PathBuf {
        self.destination_root.join(FAILED_REPORT_NAME)
    }

    /// Workbook paths for the copied, omitted and failed tables, or an
    /// empty list when workbooks are disabled.
    #[must_use]
    pub fn workbook_paths(&self) -> Vec<PathBuf> {
        if !self.write_workbooks {
            return Vec::new();
        }
        [COPIED_WORKBOOK_NAME, OMITTED_WORKBOOK_NAME, FAILED_WORKBOOK_NAME]
            .iter()
            .map(|name| self.destination_root.join(name))
            .collect()
    }

    /// Whether a lowercase extension (with leading dot) passes the filter.
    #[must_use]
    pub fn matches(&self, extension: &str) -> bool {
        extension == self.extension
    }
}

fn canonical_source(root: &Path) -> CoreResult<PathBuf> {
    let canonical = root.canonicalize().map_err(|e| {
        CoreError::Config(format!("Invalid source directory '{}': {e}", root.display()))
    })?;
    if !canonical.is_dir() {
        return Err(CoreError::Config(format!(
            "Source path '{}' is not a directory",
            root.display()
        )));
    }
    std::fs::read_dir(&canonical).map_err(|e| {
        CoreError::Config(format!(
            "Source directory '{}' is not readable: {e}",
            root.display()
        ))
    })?;
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension_variants() {
        assert_eq!(normalize_extension("mp4").as_deref(), Some(".mp4"));
        assert_eq!(normalize_extension(".mp4").as_deref(), Some(".mp4"));
        assert_eq!(normalize_extension("  MOV ").as_deref(), Some(".mov"));
        assert_eq!(normalize_extension("..MXF").as_deref(), Some(".mxf"));
    }

    #[test]
    fn test_normalize_extension_rejects_garbage() {
        assert_eq!(normalize_extension(""), None);
        assert_eq!(normalize_extension("   "), None);
        assert_eq!(normalize_extension("."), None);
        assert_eq!(normalize_extension("a/b"), None);
        assert_eq!(normalize_extension("m p4"), None);
    }

    #[test]
    fn test_scale_filter_uses_auto_height() {
        let profile = ProxyProfile {
            width: 960,
            ..ProxyProfile::default()
        };
        assert_eq!(profile.scale_filter(), "scale=960:-1");
    }
}
