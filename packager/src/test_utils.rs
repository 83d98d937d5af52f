//! Shared test utilities for the packager crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::error::{PackagerError, Result};
use crate::executor::CommandExecutor;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Returns true when `args` equals `expected` element by element.
#[must_use]
pub fn args_match(args: &[String], expected: &[&str]) -> bool {
    args.len() == expected.len() && args.iter().zip(expected).all(|(a, e)| a == e)
}

/// Side effect run by a [`StubExecutor`] before it returns its result.
pub type StubEffect = Box<dyn Fn(&[String])>;

/// Represents an expected command invocation for testing.
pub struct ExpectedCall {
    /// The program expected to run (e.g. `"rpmbuild"`).
    pub cmd: String,
    /// The expected arguments, or `None` to accept any arguments.
    pub args: Option<Vec<String>>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
    /// Optional side effect, such as writing the files a real tool would.
    pub effect: Option<StubEffect>,
}

impl ExpectedCall {
    /// Expect `cmd` with any arguments and return a successful output.
    #[must_use]
    pub fn succeeds(cmd: &str) -> Self {
        Self {
            cmd: cmd.to_owned(),
            args: None,
            result: Ok(success_output()),
            effect: None,
        }
    }

    /// Expect `cmd` with any arguments and return a failed output.
    #[must_use]
    pub fn fails(cmd: &str, stderr: &str) -> Self {
        Self {
            cmd: cmd.to_owned(),
            args: None,
            result: Ok(failure_output(stderr)),
            effect: None,
        }
    }

    /// Require the call to carry exactly `args`.
    #[must_use]
    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args = Some(args.iter().map(|&a| a.to_owned()).collect());
        self
    }

    /// Run `effect` with the received arguments before returning.
    #[must_use]
    pub fn with_effect(mut self, effect: impl Fn(&[String]) + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }
}

impl std::fmt::Debug for ExpectedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpectedCall")
            .field("cmd", &self.cmd)
            .field("args", &self.args)
            .field("has_effect", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Consumes expected invocations in order and returns their predefined
/// results, allowing the pipeline to run without `tar`, `rpmbuild`, or
/// `createrepo` installed.
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    received: RefCell<Vec<(String, Vec<String>)>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            received: RefCell::new(Vec::new()),
        }
    }

    /// Returns every invocation received so far, in order.
    #[must_use]
    pub fn received(&self) -> Vec<(String, Vec<String>)> {
        self.received.borrow().clone()
    }

    /// Returns true once all expected invocations have been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.expected.borrow().is_empty()
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[String]) -> Result<Output> {
        self.received
            .borrow_mut()
            .push((cmd.to_owned(), args.to_vec()));

        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(PackagerError::StubMismatch {
                message: format!("unexpected invocation of {cmd}"),
            });
        };

        if call.cmd != cmd {
            return Err(PackagerError::StubMismatch {
                message: format!("expected {}, got {cmd}", call.cmd),
            });
        }

        if let Some(expected_args) = &call.args {
            if expected_args.as_slice() != args {
                return Err(PackagerError::StubMismatch {
                    message: format!("expected {cmd} {expected_args:?}, got {args:?}"),
                });
            }
        }

        if let Some(effect) = &call.effect {
            effect(args);
        }

        call.result
    }
}
