//! ffmpeg integration for proxy derivatives.
//!
//! The argument list is assembled with `ffmpeg-sidecar`'s `FfmpegCommand`
//! and then handed to a [`ToolRunner`] against the configured ffmpeg path,
//! so the same timeout and capture rules apply as for ffprobe.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use ffmpeg_sidecar::command::FfmpegCommand;
use tempfile::Builder as TempFileBuilder;

use super::ToolRunner;
use crate::config::ProxyProfile;
use crate::error::{CoreError, CoreResult, command_failed_error};

/// Number of trailing stderr lines kept in a failure message.
const STDERR_TAIL_LINES: usize = 5;

/// Encodes proxies with a fixed [`ProxyProfile`].
pub struct ProxyTranscoder<'a> {
    runner: &'a dyn ToolRunner,
    ffmpeg: PathBuf,
    profile: &'a ProxyProfile,
    timeout: Option<Duration>,
}

impl<'a> ProxyTranscoder<'a> {
    pub fn new(
        runner: &'a dyn ToolRunner,
        ffmpeg: PathBuf,
        profile: &'a ProxyProfile,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            runner,
            ffmpeg,
            profile,
            timeout,
        }
    }

    /// Builds the ffmpeg arguments for one proxy encode: scale to the
    /// profile width with automatic height, constant quality, no audio.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let profile = self.profile;
        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner()
            .args(["-y"])
            .input(input.to_string_lossy().into_owned());
        cmd.args(["-vf", &profile.scale_filter()]);
        cmd.args(["-c:v", &profile.codec]);
        cmd.args(["-profile:v", &profile.profile]);
        cmd.args(["-level:v", &profile.level]);
        cmd.args(["-pix_fmt", &profile.pixel_format]);
        cmd.args(["-crf", &profile.crf.to_string()]);
        cmd.args(["-preset", &profile.preset]);
        cmd.args(["-an"]);
        cmd.output(output.to_string_lossy().into_owned());

        cmd.get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Encodes `input` into `output`, creating the output directory first.
    ///
    /// ffmpeg writes into a temporary file next to `output`, which is
    /// renamed over `output` only once the encode succeeds. A failed or
    /// timed-out encode leaves any existing file at `output` untouched.
    /// A non-zero exit is an error carrying the tail of ffmpeg's stderr.
    pub fn transcode(&self, input: &Path, output: &Path) -> CoreResult<()> {
        let parent = output.parent().ok_or_else(|| {
            CoreError::PathError(format!("Proxy path {} has no parent", output.display()))
        })?;
        std::fs::create_dir_all(parent)?;

        // ffmpeg picks the muxer from the output extension
        let suffix = match output.extension() {
            Some(ext) => format!(".part.{}", ext.to_string_lossy()),
            None => ".part".to_string(),
        };
        let partial = TempFileBuilder::new()
            .prefix(".ingesta-")
            .suffix(&suffix)
            .tempfile_in(parent)?;

        let mut command = Command::new(&self.ffmpeg);
        command.args(self.build_args(input, partial.path()));

        let out = self.runner.run(command, self.timeout)?;
        if !out.success() {
            return Err(command_failed_error(
                "ffmpeg",
                out.status_label(),
                stderr_tail(&out.stderr),
            ));
        }

        partial.persist(output).map_err(|e| e.error)?;
        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockToolRunner;

    fn partial_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.to_string_lossy().contains(".part"))
            .collect()
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_build_args_follow_profile() {
        let runner = MockToolRunner::new();
        let profile = ProxyProfile::default();
        let transcoder = ProxyTranscoder::new(&runner, PathBuf::from("ffmpeg"), &profile, None);

        let args = transcoder.build_args(Path::new("/dst/a.mp4"), Path::new("/dst/proxies/a_proxy.mp4"));

        assert!(args.contains(&"-y".to_string()));
        assert!(has_pair(&args, "-i", "/dst/a.mp4"));
        assert!(has_pair(&args, "-vf", "scale=640:-1"));
        assert!(has_pair(&args, "-c:v", "libx264"));
        assert!(has_pair(&args, "-profile:v", "high"));
        assert!(has_pair(&args, "-level:v", "4.0"));
        assert!(has_pair(&args, "-pix_fmt", "yuv420p"));
        assert!(has_pair(&args, "-crf", "23"));
        assert!(has_pair(&args, "-preset", "veryfast"));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(
            args.last().map(String::as_str),
            Some("/dst/proxies/a_proxy.mp4")
        );
    }

    #[test]
    fn test_transcode_creates_output_dir_and_succeeds() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("proxies/sub/a_proxy.mp4");

        let runner = MockToolRunner::new();
        runner.expect_output_file("scale=");
        let profile = ProxyProfile::default();
        let transcoder = ProxyTranscoder::new(&runner, PathBuf::from("ffmpeg"), &profile, None);

        transcoder.transcode(Path::new("/dst/a.mp4"), &output).unwrap();
        assert!(output.exists());
        assert!(partial_files(&temp.path().join("proxies/sub")).is_empty());

        // ffmpeg was pointed at a temporary sibling carrying the same extension
        let calls = runner.received_calls();
        let target = Path::new(calls[0].last().unwrap());
        assert_ne!(target, output.as_path());
        assert!(target.to_string_lossy().ends_with(".part.mp4"));
        assert!(target.starts_with(temp.path().join("proxies/sub")));
    }

    #[test]
    fn test_transcode_failure_reports_stderr_tail() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("a_proxy.mp4");

        let runner = MockToolRunner::new();
        runner.expect_failure("scale=", 1, "line1\nline2\nConversion failed!");
        let profile = ProxyProfile::default();
        let transcoder = ProxyTranscoder::new(&runner, PathBuf::from("ffmpeg"), &profile, None);

        match transcoder.transcode(Path::new("/dst/a.mp4"), &output) {
            Err(CoreError::CommandFailed { tool, stderr, .. }) => {
                assert_eq!(tool, "ffmpeg");
                assert!(stderr.ends_with("Conversion failed!"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!output.exists());
        assert!(partial_files(temp.path()).is_empty());
    }

    #[test]
    fn test_failed_encode_keeps_existing_proxy() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("x_proxy.mp4");
        std::fs::write(&output, b"earlier proxy").unwrap();

        let runner = MockToolRunner::new();
        runner.expect_failure("scale=", 1, "Conversion failed!");
        let profile = ProxyProfile::default();
        let transcoder = ProxyTranscoder::new(&runner, PathBuf::from("ffmpeg"), &profile, None);

        assert!(transcoder.transcode(Path::new("/dst/x.mp4"), &output).is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"earlier proxy");
        assert!(partial_files(temp.path()).is_empty());
    }

    #[test]
    fn test_timed_out_encode_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("a_proxy.mp4");

        let runner = MockToolRunner::new();
        runner.expect_timeout("scale=");
        let profile = ProxyProfile::default();
        let transcoder = ProxyTranscoder::new(
            &runner,
            PathBuf::from("ffmpeg"),
            &profile,
            Some(Duration::from_secs(5)),
        );

        match transcoder.transcode(Path::new("/dst/a.mp4"), &output) {
            Err(CoreError::CommandTimeout(tool, limit)) => {
                assert_eq!(tool, "ffmpeg");
                assert_eq!(limit, Duration::from_secs(5));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!output.exists());
        assert!(partial_files(temp.path()).is_empty());
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let text = "1\n2\n3\n4\n5\n6\n7\n";
        assert_eq!(stderr_tail(text), "3\n4\n5\n6\n7");
    }
}
