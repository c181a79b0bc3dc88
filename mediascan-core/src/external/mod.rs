// ============================================================================
// mediascan-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Running ffmpeg and Capturing What It Prints
//
// This module encapsulates every interaction with the ffmpeg executable. The
// readers and the hardware probe never spawn processes themselves; they go
// through the ToolInvoker trait so tests can substitute scripted output.
//
// KEY COMPONENTS:
// - ToolInvoker: trait for running a command and capturing exit code + text
// - ProcessInvoker: std::process implementation with an optional timeout
// - resolve_tool: explicit path or PATH lookup for the ffmpeg executable
// - mocks: MockToolInvoker for tests (behind the `test-mocks` feature)

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};

// ---- Standard library imports ----
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Scripted ToolInvoker used by tests
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

#[cfg(any(test, feature = "test-mocks"))]
pub use mocks::MockToolInvoker;

/// Interval between `try_wait` polls while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// TOOL INVOCATION
// ============================================================================

/// What a finished tool invocation left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Process exit code; -1 when killed by a signal or by the timeout.
    pub exit_code: i32,
    /// Captured standard error followed by any standard output.
    pub output: String,
    /// Whether the invocation was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl ToolOutput {
    /// Convenience constructor for a completed run.
    #[must_use]
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
            timed_out: false,
        }
    }
}

/// Runs an external command synchronously and captures its output.
///
/// A non-zero exit code is a normal outcome and must be reported through
/// [`ToolOutput::exit_code`], not as an error. Only failing to start or wait
/// for the process is an `Err`.
pub trait ToolInvoker {
    fn execute(&self, command: &Path, args: &[String], silent: bool) -> CoreResult<ToolOutput>;
}

impl<T: ToolInvoker + ?Sized> ToolInvoker for &T {
    fn execute(&self, command: &Path, args: &[String], silent: bool) -> CoreResult<ToolOutput> {
        (**self).execute(command, args, silent)
    }
}

/// [`ToolInvoker`] backed by `std::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    timeout: Option<Duration>,
}

impl ProcessInvoker {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ToolInvoker for ProcessInvoker {
    fn execute(&self, command: &Path, args: &[String], silent: bool) -> CoreResult<ToolOutput> {
        let name = command.display().to_string();
        log::debug!("Running command: {} {}", name, args.join(" "));

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(&name, e))?;

        // Both pipes are drained on their own threads so a chatty child can
        // never block on a full pipe while we wait on it.
        let stdout_handle = drain(child.stdout.take());
        let stderr_handle = drain(child.stderr.take());

        let mut timed_out = false;
        let status = match self.timeout {
            Some(timeout) => {
                let start = Instant::now();
                loop {
                    if let Some(status) = child.try_wait().map_err(|e| command_wait_error(&name, e))? {
                        break Some(status);
                    }
                    if start.elapsed() >= timeout {
                        log::error!("Command '{}' timed out after {:?}, killing it", name, timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        timed_out = true;
                        break None;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
            None => Some(child.wait().map_err(|e| command_wait_error(&name, e))?),
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let mut output = stderr_handle.join().unwrap_or_default();
        if !stdout.trim().is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&stdout);
        }

        let exit_code = status.and_then(|s| s.code()).unwrap_or(-1);
        if !silent {
            log::debug!("Command '{}' exited with {}:\n{}", name, exit_code, output);
        }

        Ok(ToolOutput {
            exit_code,
            output,
            timed_out,
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

// ============================================================================
// TOOL RESOLUTION
// ============================================================================

/// Resolves the executable to run.
///
/// An explicit path must point at an existing file; it is never silently
/// replaced by whatever happens to be on `PATH`. Without one, `name` is
/// looked up on `PATH`.
pub fn resolve_tool(explicit: Option<&Path>, name: &str) -> CoreResult<PathBuf> {
    match explicit {
        Some(path) if path.as_os_str().is_empty() => {
            Err(CoreError::ToolNotFound(format!("{name} (empty path)")))
        }
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(CoreError::ToolNotFound(path.display().to_string())),
        None => which::which(name).map_err(|e| {
            log::debug!("'{}' not found on PATH: {}", name, e);
            CoreError::ToolNotFound(name.to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tool_explicit_missing() {
        let result = resolve_tool(Some(Path::new("/definitely/not/here/ffmpeg")), "ffmpeg");
        assert!(matches!(result, Err(CoreError::ToolNotFound(_))));
    }

    #[test]
    fn test_resolve_tool_explicit_empty() {
        let result = resolve_tool(Some(Path::new("")), "ffmpeg");
        assert!(matches!(result, Err(CoreError::ToolNotFound(_))));
    }

    #[test]
    fn test_resolve_tool_explicit_existing() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_tool(Some(file.path()), "ffmpeg").unwrap();
        assert_eq!(resolved, file.path());
    }

    #[test]
    fn test_resolve_tool_unknown_name_on_path() {
        let result = resolve_tool(None, "mediascan-no-such-tool-4f1c");
        assert!(matches!(result, Err(CoreError::ToolNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_captures_exit_code_and_stderr() {
        let invoker = ProcessInvoker::new(None);
        let args = vec!["-c".to_string(), "echo complaint >&2; exit 3".to_string()];
        let out = invoker.execute(Path::new("/bin/sh"), &args, true).unwrap();
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.output.trim(), "complaint");
        assert!(!out.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_appends_stdout_after_stderr() {
        let invoker = ProcessInvoker::new(None);
        let args = vec!["-c".to_string(), "echo first >&2; echo second".to_string()];
        let out = invoker.execute(Path::new("/bin/sh"), &args, true).unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.output, "first\nsecond\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_timeout() {
        let invoker = ProcessInvoker::new(Some(Duration::from_millis(200)));
        let args = vec!["-c".to_string(), "exec sleep 5".to_string()];
        let out = invoker.execute(Path::new("/bin/sh"), &args, true).unwrap();
        assert!(out.timed_out);
        assert_eq!(out.exit_code, -1);
    }

    #[test]
    fn test_process_invoker_missing_command() {
        let invoker = ProcessInvoker::default();
        let result = invoker.execute(Path::new("/definitely/not/here/ffmpeg"), &[], true);
        assert!(matches!(result, Err(CoreError::CommandStart(_, _))));
    }
}
