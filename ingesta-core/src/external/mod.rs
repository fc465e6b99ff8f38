// ============================================================================
// ingesta-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffprobe and ffmpeg
//
// This module wraps every call out of process. A `ToolRunner` executes a
// prepared command with an optional timeout; the ffprobe and ffmpeg
// executors build their command lines and interpret the output on top of it.
// Tests swap the system runner for the scripted runner in `mocks`.
//
// KEY COMPONENTS:
// - ToolRunner / SystemRunner: process execution with timeouts
// - MetadataProbe: two ffprobe queries per file
// - ProxyTranscoder: one ffmpeg encode per file
// - check_dependency: startup check that a tool can be launched

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{CoreError, CoreResult};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Process execution with piped output and timeouts
pub mod command;

/// ffmpeg proxy encoding
pub mod ffmpeg_executor;

/// ffprobe metadata queries
pub mod ffprobe_executor;

/// Scripted runner for tests
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::{SystemRunner, ToolOutput, ToolRunner};
pub use ffmpeg_executor::ProxyTranscoder;
pub use ffprobe_executor::MetadataProbe;

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external tool can be launched.
///
/// Runs `<tool> -version` with output discarded. Only the ability to start
/// the process matters; the exit status is not inspected.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the executable does not exist
/// * `CoreError::CommandStart` - it exists but could not be started
pub fn check_dependency(tool: &Path) -> CoreResult<()> {
    let result = Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", tool.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", tool.display());
            Err(CoreError::DependencyNotFound(tool.display().to_string()))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                tool.display(),
                e
            );
            Err(CoreError::CommandStart(tool.display().to_string(), e))
        }
    }
}

/// Human-readable label for a tool path, used in log lines and errors.
pub(crate) fn tool_label(tool: &Path) -> String {
    tool.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_is_reported() {
        let result = check_dependency(Path::new("ingesta-no-such-tool-xyz"));
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }

    #[test]
    fn test_tool_label_uses_file_name() {
        assert_eq!(tool_label(Path::new("/opt/ffmpeg/bin/ffprobe")), "ffprobe");
        assert_eq!(tool_label(Path::new("ffmpeg")), "ffmpeg");
    }
}
