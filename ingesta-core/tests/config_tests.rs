// ingesta-core/tests/config_tests.rs

use ingesta_core::config::{
    DEFAULT_PROBE_TIMEOUT, DEFAULT_PROXY_WIDTH, FileSettings, PipelineConfigBuilder,
};
use ingesta_core::error::CoreError;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

fn base() -> PipelineConfigBuilder {
    PipelineConfigBuilder::new()
        .source_root(PathBuf::from("/src"))
        .destination_root(PathBuf::from("/dst"))
}

#[test]
fn test_builder_defaults() {
    let config = base().extension("mp4").build().unwrap();

    assert_eq!(config.extension, ".mp4");
    assert!(config.preserve_hierarchy);
    assert!(!config.generate_proxies);
    assert_eq!(config.workers, 1);
    assert_eq!(config.proxy.width, DEFAULT_PROXY_WIDTH);
    assert_eq!(config.probe_timeout, Some(DEFAULT_PROBE_TIMEOUT));
    assert_eq!(config.tools.ffprobe, PathBuf::from("ffprobe"));
    assert_eq!(config.copied_report_path(), PathBuf::from("/dst/Files_Copied.csv"));
    assert_eq!(config.omitted_report_path(), PathBuf::from("/dst/Files_Omitted.csv"));
    assert_eq!(config.failed_report_path(), PathBuf::from("/dst/Files_Failed.csv"));
    assert_eq!(config.proxy_root(), PathBuf::from("/dst/proxies"));
    assert!(!config.write_workbooks);
    assert!(config.workbook_paths().is_empty());
}

#[test]
fn test_workbooks_from_file_settings() {
    let settings = FileSettings::from_toml_str("workbooks = true\n").unwrap();
    let config = base()
        .extension("mp4")
        .apply_file_settings(&settings)
        .build()
        .unwrap();

    assert!(config.write_workbooks);
    assert_eq!(
        config.workbook_paths(),
        vec![
            PathBuf::from("/dst/Files_Copied.xlsx"),
            PathBuf::from("/dst/Files_Omitted.xlsx"),
            PathBuf::from("/dst/Files_Failed.xlsx"),
        ]
    );

    let config = base()
        .extension("mp4")
        .apply_file_settings(&settings)
        .write_workbooks(false)
        .build()
        .unwrap();
    assert!(!config.write_workbooks);
}

#[test]
fn test_builder_rejects_unusable_values() {
    assert!(matches!(base().build(), Err(CoreError::Config(_))));
    assert!(matches!(base().extension("  ").build(), Err(CoreError::Config(_))));
    assert!(matches!(
        base().extension("mp4").workers(0).build(),
        Err(CoreError::Config(_))
    ));
    assert!(matches!(
        base().extension("mp4").proxy_width(0).build(),
        Err(CoreError::Config(_))
    ));
    assert!(matches!(
        PipelineConfigBuilder::new().extension("mp4").build(),
        Err(CoreError::Config(_))
    ));
}

#[test]
fn test_flags_override_file_settings() {
    let settings = FileSettings::from_toml_str(
        r#"
workers = 8
probe_timeout_secs = 0
transcode_timeout_secs = 120

[tools]
ffmpeg = "/opt/bin/ffmpeg"

[proxy]
width = 1280
crf = 28
"#,
    )
    .unwrap();

    let config = base()
        .extension("mov")
        .apply_file_settings(&settings)
        .workers(2)
        .build()
        .unwrap();

    assert_eq!(config.workers, 2);
    assert_eq!(config.probe_timeout, None);
    assert_eq!(config.transcode_timeout, Some(Duration::from_secs(120)));
    assert_eq!(config.tools.ffmpeg, PathBuf::from("/opt/bin/ffmpeg"));
    assert_eq!(config.tools.ffprobe, PathBuf::from("ffprobe"));
    assert_eq!(config.proxy.width, 1280);
    assert_eq!(config.proxy.crf, 28);
    assert_eq!(config.proxy.preset, "veryfast");
}

#[test]
fn test_load_missing_file_is_config_error() {
    let temp = tempdir().unwrap();
    let result = FileSettings::load(&temp.path().join("absent.toml"));
    assert!(matches!(result, Err(CoreError::Config(_))));
}

#[test]
fn test_validate_rejects_missing_source() {
    let temp = tempdir().unwrap();
    let mut config = PipelineConfigBuilder::new()
        .source_root(temp.path().join("does-not-exist"))
        .destination_root(temp.path().join("out"))
        .extension("mp4")
        .build()
        .unwrap();
    assert!(matches!(config.validate(), Err(CoreError::Config(_))));
}

#[test]
fn test_validate_rejects_file_as_source() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("a.mp4");
    std::fs::write(&file, b"x").unwrap();
    let mut config = PipelineConfigBuilder::new()
        .source_root(file)
        .destination_root(temp.path().join("out"))
        .extension("mp4")
        .build()
        .unwrap();
    assert!(matches!(config.validate(), Err(CoreError::Config(_))));
}

#[test]
fn test_validate_reports_missing_ffprobe() {
    let source = tempdir().unwrap();
    let destination = tempdir().unwrap();
    let mut config = PipelineConfigBuilder::new()
        .source_root(source.path().to_path_buf())
        .destination_root(destination.path().to_path_buf())
        .extension("mp4")
        .ffprobe_path(PathBuf::from("ingesta-missing-ffprobe"))
        .build()
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(CoreError::DependencyNotFound(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_validate_creates_destination_and_checks_ffmpeg_only_for_proxies() {
    let source = tempdir().unwrap();
    let parent = tempdir().unwrap();
    let destination = parent.path().join("new/ingest");

    let builder = PipelineConfigBuilder::new()
        .source_root(source.path().to_path_buf())
        .destination_root(destination.clone())
        .extension("mp4")
        .ffprobe_path(PathBuf::from("true"))
        .ffmpeg_path(PathBuf::from("ingesta-missing-ffmpeg"));

    let mut config = builder.clone().build().unwrap();
    config.validate().unwrap();
    assert!(destination.is_dir());
    assert!(config.destination_root.is_absolute());

    let mut with_proxies = builder.generate_proxies(true).build().unwrap();
    assert!(matches!(
        with_proxies.validate(),
        Err(CoreError::DependencyNotFound(_))
    ));
}

#[test]
fn test_validate_rejects_destination_equal_to_source() {
    let source = tempdir().unwrap();
    let mut config = PipelineConfigBuilder::new()
        .source_root(source.path().to_path_buf())
        .destination_root(source.path().to_path_buf())
        .extension("mp4")
        .build()
        .unwrap();
    assert!(matches!(config.validate(), Err(CoreError::Config(_))));
}
