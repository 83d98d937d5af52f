//! External tool execution.
//!
//! Every collaborator the pipeline shells out to (`tar`, `rpmbuild`,
//! `createrepo`) goes through [`CommandExecutor`], and every exit status is
//! checked by [`run_tool`]. Standard output is passed through to the parent
//! process; standard error is captured so it can be reported when a tool
//! fails.

use crate::error::{PackagerError, Result};
use log::debug;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `program` with `args` and returns the captured output.
    ///
    /// Implementations report spawn failures as errors but leave exit status
    /// interpretation to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or does not finish
    /// within the executor's timeout.
    fn run(&self, program: &str, args: &[String]) -> Result<Output>;
}

/// Executes commands on the host system.
///
/// Without a timeout a hung tool blocks the pipeline indefinitely, matching
/// the behaviour CI runners expect from a plain shell step.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    /// Create an executor that kills tools running longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &str, args: &[String]) -> Result<Output> {
        debug!("running {program} {}", args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());

        let Some(timeout) = self.timeout else {
            return cmd.output().map_err(PackagerError::from);
        };

        let mut child = cmd.spawn()?;

        // Drain stderr concurrently so a chatty tool cannot fill the pipe
        // and stall before the timeout elapses.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buffer = Vec::new();
                pipe.read_to_end(&mut buffer).map(|_| buffer)
            })
        });

        match child.wait_timeout(timeout)? {
            Some(status) => {
                let stderr = match stderr_reader {
                    Some(handle) => handle
                        .join()
                        .map_err(|_| std::io::Error::other("stderr reader panicked"))??,
                    None => Vec::new(),
                };
                Ok(Output {
                    status,
                    stdout: Vec::new(),
                    stderr,
                })
            }
            None => {
                if let Err(err) = child.kill() {
                    debug!("could not kill {program}: {err}");
                }
                if let Err(err) = child.wait() {
                    debug!("could not reap {program}: {err}");
                }
                Err(PackagerError::ExternalProcessTimedOut {
                    tool: program.to_owned(),
                    seconds: timeout.as_secs(),
                })
            }
        }
    }
}

/// Runs an external tool and maps a non-zero exit to a typed error.
///
/// This is the single place where collaborator exit codes are checked.
///
/// # Errors
///
/// Returns [`PackagerError::ExternalProcess`] carrying the trimmed stderr
/// when the tool exits unsuccessfully, or any spawn/timeout error reported by
/// the executor.
pub fn run_tool(executor: &dyn CommandExecutor, tool: &str, args: &[String]) -> Result<Output> {
    let output = executor.run(tool, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PackagerError::ExternalProcess {
            tool: tool.to_owned(),
            status: output.status,
            stderr: stderr.trim().to_owned(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{args_match, failure_output, success_output};

    #[test]
    fn run_tool_returns_output_on_success() {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(|program, args| {
                program == "createrepo" && args_match(args, &["--update", "/srv/repo"])
            })
            .times(1)
            .returning(|_, _| Ok(success_output()));

        let args = vec!["--update".to_owned(), "/srv/repo".to_owned()];
        let output = run_tool(&executor, "createrepo", &args).expect("tool should succeed");
        assert!(output.status.success());
    }

    #[test]
    fn run_tool_maps_failure_to_external_process_error() {
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(failure_output("error: Bad exit status\n")));

        let err = run_tool(&executor, "rpmbuild", &[]).expect_err("tool should fail");
        match err {
            PackagerError::ExternalProcess { tool, stderr, .. } => {
                assert_eq!(tool, "rpmbuild");
                assert_eq!(stderr, "error: Bad exit status");
            }
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[test]
    fn run_tool_propagates_spawn_errors() {
        let mut executor = MockCommandExecutor::new();
        executor.expect_run().times(1).returning(|_, _| {
            Err(PackagerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file",
            )))
        });

        let err = run_tool(&executor, "tar", &[]).expect_err("spawn should fail");
        assert!(matches!(err, PackagerError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_captures_stderr_with_timeout() {
        let executor = SystemCommandExecutor::with_timeout(Some(Duration::from_secs(30)));
        let args = vec!["-c".to_owned(), "echo oops >&2; exit 3".to_owned()];
        let output = executor.run("sh", &args).expect("sh should spawn");
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_kills_tools_that_exceed_timeout() {
        let executor = SystemCommandExecutor::with_timeout(Some(Duration::from_millis(100)));
        let args = vec!["-c".to_owned(), "sleep 5".to_owned()];
        let err = executor.run("sh", &args).expect_err("sleep should time out");
        assert!(matches!(
            err,
            PackagerError::ExternalProcessTimedOut { ref tool, .. } if tool == "sh"
        ));
    }
}
