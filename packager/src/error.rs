//! Error types for the rpmship packager.
//!
//! Every failure in the pipeline is fatal. The variants below name the stage
//! that failed and carry enough context (paths, tool names, captured stderr)
//! for a CI log to explain the abort without re-running the job.

use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while packaging a workspace.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// A required setting was missing or invalid, including the root-path
    /// guard on the workspace and home directories.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the invalid setting.
        reason: String,
    },

    /// The settings file could not be parsed.
    #[error("invalid settings file {path}: {reason}")]
    InvalidSettings {
        /// Path to the settings file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The workspace directory name is not of the form `project-version`.
    #[error("malformed workspace name {segment:?}: {reason}")]
    MalformedWorkspace {
        /// Final path segment of the workspace.
        segment: String,
        /// Why the segment could not be split.
        reason: String,
    },

    /// No version declaration was found in the scanned prefix.
    #[error("no {key} declaration found in {path}")]
    VersionNotFound {
        /// File that was scanned.
        path: Utf8PathBuf,
        /// Declaration key that was searched for.
        key: String,
    },

    /// More than one version declaration was found in the scanned prefix.
    #[error("{count} {key} declarations found in {path}; expected exactly one")]
    AmbiguousVersion {
        /// File that was scanned.
        path: Utf8PathBuf,
        /// Declaration key that was searched for.
        key: String,
        /// Number of declarations found.
        count: usize,
    },

    /// The package-description template does not exist in the workspace.
    #[error("spec file not found at {path}")]
    TemplateNotFound {
        /// Path where the template was expected.
        path: Utf8PathBuf,
    },

    /// The template declares more than one target architecture.
    #[error("BuildArch declared more than once ({first} then {second})")]
    MultipleArchitectureDeclarations {
        /// Value of the first declaration.
        first: String,
        /// Value of the conflicting declaration.
        second: String,
    },

    /// A built-in template pattern failed to compile.
    #[error("invalid template pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// The compilation error.
        #[source]
        source: regex::Error,
    },

    /// An external tool exited with a non-zero status.
    #[error("{tool} failed with {status}: {stderr}")]
    ExternalProcess {
        /// The tool that failed (`tar`, `rpmbuild`, `createrepo`).
        tool: String,
        /// Exit status reported by the process.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external tool did not finish within the configured timeout.
    #[error("{tool} timed out after {seconds} seconds")]
    ExternalProcessTimedOut {
        /// The tool that was killed.
        tool: String,
        /// Timeout that elapsed.
        seconds: u64,
    },

    /// An expected artifact is missing from the builder output directory.
    #[error("{path} not found; rpmbuild did not produce the expected package")]
    ArtifactNotBuilt {
        /// Path of the missing artifact.
        path: Utf8PathBuf,
    },

    /// Evicting, moving, or listing files in the publish directory failed.
    #[error("publish failed at {path}: {source}")]
    PublishIo {
        /// Path being operated on.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl PackagerError {
    /// Shorthand for a [`PackagerError::Configuration`] error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
