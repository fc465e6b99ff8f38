// ============================================================================
// ingesta-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PipelineConfig
//
// Provides a fluent API for assembling a PipelineConfig from the pieces a
// front end collects (flags, environment, config file), applying defaults for
// everything left unset and rejecting values that can never work.

use std::path::PathBuf;
use std::time::Duration;

use super::{
    DEFAULT_PROBE_TIMEOUT, DEFAULT_TRANSCODE_TIMEOUT, FileSettings, PipelineConfig, ProxyProfile,
    ToolPaths, normalize_extension,
};
use crate::error::{CoreError, CoreResult};

/// Builder for creating [`PipelineConfig`] instances.
///
/// # Examples
///
/// ```rust
/// use ingesta_core::config::PipelineConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = PipelineConfigBuilder::new()
///     .source_root(PathBuf::from("/media/card"))
///     .destination_root(PathBuf::from("/media/ingest"))
///     .extension("MOV")
///     .build()
///     .unwrap();
/// assert_eq!(config.extension, ".mov");
/// assert!(config.preserve_hierarchy);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    source_root: Option<PathBuf>,
    destination_root: Option<PathBuf>,
    extension: Option<String>,

    preserve_hierarchy: bool,
    generate_proxies: bool,
    write_workbooks: bool,
    proxy: ProxyProfile,
    tools: ToolPaths,
    workers: usize,
    probe_timeout: Option<Duration>,
    transcode_timeout: Option<Duration>,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfigBuilder {
    /// Creates a builder with default values for every optional field.
    pub fn new() -> Self {
        Self {
            source_root: None,
            destination_root: None,
            extension: None,
            preserve_hierarchy: true,
            generate_proxies: false,
            write_workbooks: false,
            proxy: ProxyProfile::default(),
            tools: ToolPaths::default(),
            workers: 1,
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
            transcode_timeout: Some(DEFAULT_TRANSCODE_TIMEOUT),
        }
    }

    pub fn source_root(mut self, path: PathBuf) -> Self {
        self.source_root = Some(path);
        self
    }

    pub fn destination_root(mut self, path: PathBuf) -> Self {
        self.destination_root = Some(path);
        self
    }

    /// Sets the extension filter. Any spelling accepted by
    /// [`normalize_extension`](super::normalize_extension) works.
    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    pub fn preserve_hierarchy(mut self, preserve: bool) -> Self {
        self.preserve_hierarchy = preserve;
        self
    }

    pub fn generate_proxies(mut self, enabled: bool) -> Self {
        self.generate_proxies = enabled;
        self
    }

    /// Also write the reports as `.xlsx` workbooks next to the CSV files.
    pub fn write_workbooks(mut self, enabled: bool) -> Self {
        self.write_workbooks = enabled;
        self
    }

    pub fn proxy_width(mut self, width: u32) -> Self {
        self.proxy.width = width;
        self
    }

    pub fn proxy_crf(mut self, crf: u8) -> Self {
        self.proxy.crf = crf;
        self
    }

    pub fn proxy_preset(mut self, preset: &str) -> Self {
        self.proxy.preset = preset.to_string();
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.tools.ffprobe = path;
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.tools.ffmpeg = path;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the per-call ffprobe timeout. `None` waits indefinitely.
    pub fn probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the per-call ffmpeg timeout. `None` waits indefinitely.
    pub fn transcode_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transcode_timeout = timeout;
        self
    }

    /// Applies every value present in a configuration file. Call this
    /// before the explicit setters so that flags win over the file.
    pub fn apply_file_settings(mut self, settings: &FileSettings) -> Self {
        if let Some(workers) = settings.workers {
            self.workers = workers;
        }
        if let Some(secs) = settings.probe_timeout_secs {
            self.probe_timeout = timeout_from_secs(secs);
        }
        if let Some(secs) = settings.transcode_timeout_secs {
            self.transcode_timeout = timeout_from_secs(secs);
        }
        if let Some(enabled) = settings.workbooks {
            self.write_workbooks = enabled;
        }
        if let Some(path) = &settings.tools.ffprobe {
            self.tools.ffprobe = path.clone();
        }
        if let Some(path) = &settings.tools.ffmpeg {
            self.tools.ffmpeg = path.clone();
        }
        if let Some(width) = settings.proxy.width {
            self.proxy.width = width;
        }
        if let Some(crf) = settings.proxy.crf {
            self.proxy.crf = crf;
        }
        if let Some(preset) = &settings.proxy.preset {
            self.proxy.preset = preset.clone();
        }
        self
    }

    /// Builds the configuration, rejecting values that can never work.
    pub fn build(self) -> CoreResult<PipelineConfig> {
        let source_root = self
            .source_root
            .ok_or_else(|| CoreError::Config("Source directory is required".to_string()))?;
        let destination_root = self
            .destination_root
            .ok_or_else(|| CoreError::Config("Destination directory is required".to_string()))?;
        let raw_extension = self
            .extension
            .ok_or_else(|| CoreError::Config("Extension filter is required".to_string()))?;
        let extension = normalize_extension(&raw_extension).ok_or_else(|| {
            CoreError::Config(format!("Invalid extension filter '{raw_extension}'"))
        })?;

        if self.workers == 0 {
            return Err(CoreError::Config("Worker count must be at least 1".to_string()));
        }
        if self.proxy.width == 0 {
            return Err(CoreError::Config("Proxy width must be greater than 0".to_string()));
        }

        Ok(PipelineConfig {
            source_root,
            destination_root,
            preserve_hierarchy: self.preserve_hierarchy,
            extension,
            generate_proxies: self.generate_proxies,
            write_workbooks: self.write_workbooks,
            proxy: self.proxy,
            tools: self.tools,
            workers: self.workers,
            probe_timeout: self.probe_timeout,
            transcode_timeout: self.transcode_timeout,
        })
    }
}

/// Converts a timeout given in seconds; zero means "no timeout".
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
