// ============================================================================
// ingesta-core/src/external/command.rs
// ============================================================================
//
// COMMAND EXECUTION: Running External Tools with Timeouts
//
// Both output streams are piped and drained on their own threads so a chatty
// child can never block on a full pipe. The parent polls `try_wait` and kills
// the child once the timeout elapses.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::tool_label;
use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code rendered for error messages.
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "signal termination".to_string(),
        }
    }
}

/// Executes prepared commands. Implementations must be shareable across
/// worker threads.
pub trait ToolRunner: Send + Sync {
    /// Runs `command` to completion, or until `timeout` elapses.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// [`ToolOutput::code`]. Errors are reserved for spawn failures, wait
    /// failures and timeouts.
    fn run(&self, command: Command, timeout: Option<Duration>) -> CoreResult<ToolOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SystemRunner {
    fn run(&self, mut command: Command, timeout: Option<Duration>) -> CoreResult<ToolOutput> {
        let tool = tool_label(Path::new(command.get_program()));
        log::debug!("Running: {}", format_command(&command));

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(tool.clone(), e))?;

        let stdout_handle = drain(child.stdout.take());
        let stderr_handle = drain(child.stderr.take());

        let code = match wait_with_timeout(&mut child, timeout, &tool)? {
            Some(code) => code,
            None => {
                // Timed out; the child has been killed and reaped.
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                let limit = timeout.unwrap_or_default();
                log::error!("{} timed out after {:?}", tool, limit);
                return Err(CoreError::CommandTimeout(tool, limit));
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        Ok(ToolOutput {
            code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Reads a child stream to the end on a background thread.
fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            if let Err(e) = stream.read_to_end(&mut buffer) {
                log::debug!("Failed to read child output: {}", e);
            }
        }
        buffer
    })
}

/// Waits for the child. Returns `Ok(None)` if the timeout elapsed, in which
/// case the child has been killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
    tool: &str,
) -> CoreResult<Option<Option<i32>>> {
    let Some(timeout) = timeout else {
        let status = child.wait().map_err(|e| command_wait_error(tool, e))?;
        return Ok(Some(status.code()));
    };

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status.code())),
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(command_wait_error(tool, e)),
        }
    }
}

/// Renders a command line for debug logging.
pub(crate) fn format_command(command: &Command) -> String {
    let mut line = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}
