//! Single command execution layer.
//!
//! Runs one external command per call, blocks until it finishes, and
//! captures the real exit code and both output streams without
//! interpretation. A non-zero exit code is data for the classifier, not an
//! error; `InvokeError` covers only commands that never ran to completion.
//! No retries happen at this layer.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Poll interval while waiting on a child with a timeout budget.
const WAIT_POLL: Duration = Duration::from_millis(25);

/// Raw result of one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Program followed by its arguments, as executed.
    pub command: Vec<String>,
    /// Real exit code; -1 when the process died to a signal.
    pub exit_code: i32,
    /// Complete stdout, lossily decoded.
    pub stdout: String,
    /// Complete stderr, lossily decoded.
    pub stderr: String,
    /// Wall-clock duration of the call.
    pub duration_ms: u64,
}

impl ProcessResult {
    /// `program arg arg` form for log lines.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Hard invocation failures: the command never ran to completion.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The executable could not be located or started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The timeout budget expired; the child's process group was killed
    /// and the child reaped.
    #[error("{program} did not finish within {budget:?} and was killed")]
    TimedOut { program: String, budget: Duration },
    /// Waiting on the child failed after it started.
    #[error("i/o error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Seam for command execution, so orchestration layers can run against
/// scripted results in tests.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, InvokeError>;
}

/// Executes commands on the real system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<ProcessResult, InvokeError> {
        invoke(program, args, timeout)
    }
}

/// Run `program` with `args` and capture both streams in full.
///
/// With a timeout budget the child runs in its own process group and is
/// polled; on expiry the whole group is killed, so descendants of the
/// command do not outlive the call either. Without a budget the call
/// blocks until the child exits on its own.
pub fn invoke(
    program: &str,
    args: &[&str],
    timeout: Option<Duration>,
) -> Result<ProcessResult, InvokeError> {
    let start = Instant::now();
    let command: Vec<String> = std::iter::once(program.to_string())
        .chain(args.iter().map(|a| a.to_string()))
        .collect();

    match timeout {
        None => {
            let output = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .output()
                .map_err(|source| InvokeError::Spawn {
                    program: program.to_string(),
                    source,
                })?;
            Ok(ProcessResult {
                command,
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                duration_ms: start.elapsed().as_millis() as u64,
            })
        }
        Some(budget) => invoke_with_budget(program, args, command, budget, start),
    }
}

fn invoke_with_budget(
    program: &str,
    args: &[&str],
    command: Vec<String>,
    budget: Duration,
    start: Instant,
) -> Result<ProcessResult, InvokeError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|source| InvokeError::Spawn {
            program: program.to_string(),
            source,
        })?;

    // Drain both pipes on their own threads; a full pipe would otherwise
    // block the child and stall the wait loop below.
    let stdout_reader = spawn_drain(child.stdout.take());
    let stderr_reader = spawn_drain(child.stderr.take());

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= budget {
                    kill_group(&mut child);
                    // The drain threads are dropped, not joined: they exit
                    // on pipe EOF once the group is dead, and anything that
                    // escaped the group cannot stall this return.
                    return Err(InvokeError::TimedOut {
                        program: program.to_string(),
                        budget,
                    });
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(source) => {
                kill_group(&mut child);
                return Err(InvokeError::Io {
                    program: program.to_string(),
                    source,
                });
            }
        }
    };

    Ok(ProcessResult {
        command,
        exit_code: status.code().unwrap_or(-1),
        stdout: join_drain(stdout_reader),
        stderr: join_drain(stderr_reader),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Kill the child's whole process group and wait the child out.
///
/// Descendants inherit the pipe write ends, so the group must die for the
/// drain threads to see EOF; killing only the child would leave a
/// backgrounded survivor holding the pipes open. Kill racing a normal exit
/// is fine; the wait reaps either way.
fn kill_group(child: &mut std::process::Child) {
    // process_group(0) at spawn makes the group id the child's pid.
    let pid = child.id() as i32;
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
    let _ = child.wait();
}

fn spawn_drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_drain(handle: JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_captures_stdout() {
        let result = invoke("echo", &["hello"], None).unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
        assert!(result.stderr.is_empty());
        assert_eq!(result.command_line(), "echo hello");
    }

    #[test]
    fn test_invoke_nonzero_exit_is_not_an_error() {
        let result = invoke("sh", &["-c", "exit 3"], None).unwrap();
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn test_invoke_captures_stderr() {
        let result = invoke("sh", &["-c", "echo oops >&2; exit 1"], None).unwrap();
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr.trim(), "oops");
    }

    #[test]
    fn test_invoke_missing_program_is_spawn_error() {
        let err = invoke("jeeves-no-such-binary", &[], None).unwrap_err();
        assert!(matches!(err, InvokeError::Spawn { .. }));
    }

    #[test]
    fn test_invoke_within_budget_succeeds() {
        let result = invoke("echo", &["quick"], Some(Duration::from_secs(5))).unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "quick");
    }

    #[test]
    fn test_invoke_kills_on_expired_budget() {
        let start = Instant::now();
        let err = invoke("sleep", &["5"], Some(Duration::from_millis(100))).unwrap_err();
        assert!(matches!(err, InvokeError::TimedOut { .. }));
        // The child must not have been waited on for its full runtime.
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_expired_budget_kills_background_survivors() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survivor-ran");
        let script = format!("sleep 1 && touch {} & sleep 5", marker.display());

        let start = Instant::now();
        let err = invoke("sh", &["-c", &script], Some(Duration::from_millis(100))).unwrap_err();
        assert!(matches!(err, InvokeError::TimedOut { .. }));
        // The backgrounded job holds the pipe write ends open; the call
        // must still return on the budget, not after the job's runtime.
        assert!(start.elapsed() < Duration::from_secs(2));

        // The group kill took the backgrounded job down with the shell.
        std::thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists());
    }

    #[test]
    fn test_system_runner_delegates() {
        let runner = SystemRunner;
        let result = runner.run("echo", &["via-runner"], None).unwrap();
        assert_eq!(result.stdout.trim(), "via-runner");
    }
}
