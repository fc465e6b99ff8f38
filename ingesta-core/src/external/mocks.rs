// ingesta-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use std::time::Duration;

use super::{ToolOutput, ToolRunner, tool_label};
use crate::error::{CoreError, CoreResult, command_start_error};

/// What the mock does when an expectation matches.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this output.
    Output(ToolOutput),
    /// Return this output and create an empty file at the last argument.
    OutputWithFile(ToolOutput),
    /// Fail to spawn, as if the executable were missing.
    SpawnError,
    /// Fail with a timeout.
    Timeout,
}

/// An argument pattern and its scripted response.
#[derive(Debug, Clone)]
pub struct MockExpectation {
    pub arg_pattern: String,
    pub response: MockResponse,
}

/// Scripted [`ToolRunner`] for tests.
///
/// Each call is matched against the expectations in the order they were
/// added; the first whose pattern is a substring of any argument wins.
/// Expectations are not consumed, so one pattern can serve every file of a
/// run. Calls with no matching expectation fail to start.
#[derive(Debug, Default)]
pub struct MockToolRunner {
    expectations: Mutex<Vec<MockExpectation>>,
    received_calls: Mutex<Vec<Vec<String>>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, response: MockResponse) {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push(MockExpectation {
                arg_pattern: arg_pattern.to_string(),
                response,
            });
        }
    }

    /// Successful run printing `stdout`.
    pub fn expect_stdout(&self, arg_pattern: &str, stdout: &str) {
        self.add_expectation(
            arg_pattern,
            MockResponse::Output(ToolOutput {
                code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }),
        );
    }

    /// Run that exits 0 but reports a problem on stderr.
    pub fn expect_stderr(&self, arg_pattern: &str, stderr: &str) {
        self.add_expectation(
            arg_pattern,
            MockResponse::Output(ToolOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        );
    }

    /// Run that exits with `code` and no output.
    pub fn expect_exit_code(&self, arg_pattern: &str, code: i32) {
        self.expect_failure(arg_pattern, code, "");
    }

    /// Run that exits with `code` after writing `stderr`.
    pub fn expect_failure(&self, arg_pattern: &str, code: i32, stderr: &str) {
        self.add_expectation(
            arg_pattern,
            MockResponse::Output(ToolOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }),
        );
    }

    /// Successful run that creates its output file (the last argument).
    pub fn expect_output_file(&self, arg_pattern: &str) {
        self.add_expectation(
            arg_pattern,
            MockResponse::OutputWithFile(ToolOutput {
                code: Some(0),
                ..ToolOutput::default()
            }),
        );
    }

    pub fn expect_spawn_error(&self, arg_pattern: &str) {
        self.add_expectation(arg_pattern, MockResponse::SpawnError);
    }

    pub fn expect_timeout(&self, arg_pattern: &str) {
        self.add_expectation(arg_pattern, MockResponse::Timeout);
    }

    /// Arguments of every call received so far, program name excluded.
    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Calls whose arguments contain `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> Vec<Vec<String>> {
        self.received_calls()
            .into_iter()
            .filter(|args| args.iter().any(|arg| arg.contains(pattern)))
            .collect()
    }

    fn find_response(&self, args: &[String]) -> Option<MockResponse> {
        let expectations = self.expectations.lock().ok()?;
        expectations
            .iter()
            .find(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
            .map(|exp| exp.response.clone())
    }
}

impl ToolRunner for MockToolRunner {
    fn run(&self, command: Command, timeout: Option<Duration>) -> CoreResult<ToolOutput> {
        let tool = tool_label(Path::new(command.get_program()));
        let args: Vec<String> = command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        if let Ok(mut calls) = self.received_calls.lock() {
            calls.push(args.clone());
        }

        match self.find_response(&args) {
            Some(MockResponse::Output(output)) => Ok(output),
            Some(MockResponse::OutputWithFile(output)) => {
                if let Some(output_path) = args.last().map(PathBuf::from) {
                    if let Some(parent) = output_path.parent() {
                        let _ = std::fs::create_dir_all(parent);
                    }
                    if let Err(e) = std::fs::File::create(&output_path) {
                        log::error!(
                            "MockToolRunner failed to create dummy output file {:?}: {}",
                            output_path,
                            e
                        );
                    }
                }
                Ok(output)
            }
            Some(MockResponse::SpawnError) => Err(command_start_error(
                tool,
                io::Error::new(io::ErrorKind::NotFound, "mock spawn error"),
            )),
            Some(MockResponse::Timeout) => Err(CoreError::CommandTimeout(
                tool,
                timeout.unwrap_or_default(),
            )),
            None => {
                log::debug!("MockToolRunner: No expectation found for command args: {:?}", args);
                Err(command_start_error(
                    tool,
                    io::Error::new(io::ErrorKind::NotFound, "no mock expectation"),
                ))
            }
        }
    }
}
