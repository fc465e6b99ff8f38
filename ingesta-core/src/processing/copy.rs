//! Copying matched files into the destination tree.
//!
//! Copies land in a temporary file next to the target and are renamed over
//! it once complete, so an existing destination is replaced in one step and
//! a failed copy never leaves a truncated file behind.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::Builder as TempFileBuilder;

use crate::config::PipelineConfig;
use crate::discovery::DiscoveredFile;
use crate::error::{CoreError, CoreResult};
use crate::utils::get_filename_safe;

/// Where `file` is copied to: its source-relative path under the
/// destination root when preserving the hierarchy, its bare file name
/// otherwise.
pub fn destination_for(config: &PipelineConfig, file: &DiscoveredFile) -> CoreResult<PathBuf> {
    if config.preserve_hierarchy {
        Ok(config.destination_root.join(&file.relative_path))
    } else {
        Ok(config.destination_root.join(get_filename_safe(&file.path)?))
    }
}

/// Copies `source` to `destination` byte for byte, creating intermediate
/// directories and silently replacing an existing file. Returns the number
/// of bytes copied.
pub fn copy_file(source: &Path, destination: &Path) -> CoreResult<u64> {
    copy_atomically(source, destination).map_err(|error| CoreError::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        error,
    })
}

fn copy_atomically(source: &Path, destination: &Path) -> io::Result<u64> {
    let parent = destination.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent directory")
    })?;
    fs::create_dir_all(parent)?;

    let mut reader = File::open(source)?;
    let mut temp = TempFileBuilder::new()
        .prefix(".ingesta-")
        .suffix(".part")
        .tempfile_in(parent)?;
    let bytes = io::copy(&mut reader, temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    let permissions = reader.metadata()?.permissions();
    fs::set_permissions(temp.path(), permissions)?;

    temp.persist(destination).map_err(|e| e.error)?;
    Ok(bytes)
}
