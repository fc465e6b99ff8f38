//! Proxy output layout.

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::discovery::DiscoveredFile;

/// Output path of the proxy for `file`.
///
/// Proxies live under `<destination>/<proxy dir>`, mirroring the file's
/// relative directory when the hierarchy is preserved. The name is the
/// source stem plus the profile suffix, always in the profile container:
/// `sub/clip.MOV` becomes `proxies/sub/clip_proxy.mp4`.
pub fn proxy_path(config: &PipelineConfig, file: &DiscoveredFile) -> PathBuf {
    let profile = &config.proxy;
    let stem = file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{}.{}", profile.suffix, profile.container);

    let mut path = config.proxy_root();
    if config.preserve_hierarchy {
        if let Some(parent) = file.relative_path.parent() {
            path.push(parent);
        }
    }
    path.push(name);
    path
}
