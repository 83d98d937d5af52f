//! Project name and version resolution.
//!
//! The project name always comes from the workspace directory. The version
//! comes from one of two explicitly selected sources:
//!
//! - [`VersionSource::DeclarationFile`] (default) reads a bounded prefix of a
//!   declaration file inside the project, e.g. `__version__ = '1.2.0'` in
//!   `<workspace>/<project>/__init__.py`.
//! - [`VersionSource::WorkspaceName`] splits a `project-version` workspace
//!   directory name on its single `-`.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::io::Read;

/// Number of bytes of the declaration file scanned for a version.
pub const VERSION_SCAN_LIMIT: usize = 4096;

/// Default declaration key.
pub const DEFAULT_VERSION_KEY: &str = "__version__";

/// Separator between project and version in a workspace directory name.
pub const WORKSPACE_NAME_SEPARATOR: char = '-';

/// Where the project version is read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VersionSource {
    /// A `key = 'value'` assignment in a file inside the project.
    #[default]
    DeclarationFile,
    /// The `project-version` workspace directory name.
    WorkspaceName,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclarationFile => write!(f, "declaration-file"),
            Self::WorkspaceName => write!(f, "workspace-name"),
        }
    }
}

/// Project name and version resolved from the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Project name.
    pub project: String,
    /// Source version of the project.
    pub version: String,
}

/// Inputs to version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLookup<'a> {
    /// Strategy to apply.
    pub source: VersionSource,
    /// Declaration file relative to the workspace; `None` means
    /// `<project>/__init__.py`.
    pub file: Option<&'a Utf8Path>,
    /// Declaration key, e.g. `__version__`.
    pub key: &'a str,
}

/// Resolves the project name and version for `workspace`.
///
/// # Errors
///
/// Returns [`PackagerError::MalformedWorkspace`] when the workspace name
/// cannot supply a project (or, for [`VersionSource::WorkspaceName`], a
/// version), and the declaration-file errors of [`read_declared_version`].
pub fn resolve_version(workspace: &Utf8Path, lookup: &VersionLookup<'_>) -> Result<ResolvedVersion> {
    let segment = workspace_segment(workspace)?;

    match lookup.source {
        VersionSource::WorkspaceName => split_workspace_name(segment),
        VersionSource::DeclarationFile => {
            let path = declaration_path(workspace, segment, lookup.file);
            let version = read_declared_version(&path, lookup.key)?;
            Ok(ResolvedVersion {
                project: segment.to_owned(),
                version,
            })
        }
    }
}

/// Returns the declaration file path for a project.
#[must_use]
pub fn declaration_path(
    workspace: &Utf8Path,
    project: &str,
    file: Option<&Utf8Path>,
) -> Utf8PathBuf {
    file.map_or_else(
        || workspace.join(project).join("__init__.py"),
        |relative| workspace.join(relative),
    )
}

/// Splits a `project-version` directory name into its two parts.
///
/// # Errors
///
/// Returns [`PackagerError::MalformedWorkspace`] if the segment is empty,
/// contains no separator or more than one, or has an empty side.
///
/// # Examples
///
/// ```
/// use rpmship::version::split_workspace_name;
///
/// let resolved = split_workspace_name("widgets-1.2")?;
/// assert_eq!(resolved.project, "widgets");
/// assert_eq!(resolved.version, "1.2");
/// assert!(split_workspace_name("widgets").is_err());
/// assert!(split_workspace_name("big-widgets-1.2").is_err());
/// # Ok::<(), rpmship::error::PackagerError>(())
/// ```
pub fn split_workspace_name(segment: &str) -> Result<ResolvedVersion> {
    let malformed = |reason: &str| PackagerError::MalformedWorkspace {
        segment: segment.to_owned(),
        reason: reason.to_owned(),
    };

    if segment.is_empty() {
        return Err(malformed("workspace name is empty"));
    }

    let separators = segment.matches(WORKSPACE_NAME_SEPARATOR).count();
    if separators != 1 {
        return Err(malformed(&format!(
            "expected exactly one '{WORKSPACE_NAME_SEPARATOR}', found {separators}"
        )));
    }

    match segment.split_once(WORKSPACE_NAME_SEPARATOR) {
        Some((project, version)) if !project.is_empty() && !version.is_empty() => {
            Ok(ResolvedVersion {
                project: project.to_owned(),
                version: version.to_owned(),
            })
        }
        _ => Err(malformed("project and version must both be non-empty")),
    }
}

/// Extracts every value assigned to `key` at the start of a line.
///
/// Both `'single'` and `"double"` quoted literals are recognised; the value
/// may not contain whitespace.
///
/// # Errors
///
/// Returns [`PackagerError::Configuration`] if no declaration pattern can be
/// built for `key`, e.g. because the key exceeds the pattern size limit.
pub fn find_version_declarations(text: &str, key: &str) -> Result<Vec<String>> {
    let pattern = format!(
        r#"(?m)^{}[ \t]*=[ \t]*(?:'([^'\s]+)'|"([^"\s]+)")"#,
        regex::escape(key)
    );
    let finder = Regex::new(&pattern).map_err(|err| {
        PackagerError::configuration(format!("unusable version key: {err}"))
    })?;

    Ok(finder
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_owned())
        .collect())
}

/// Reads the declared version from the first [`VERSION_SCAN_LIMIT`] bytes of
/// `path`.
///
/// # Errors
///
/// Returns [`PackagerError::VersionNotFound`] when the file is missing or
/// holds no declaration, [`PackagerError::AmbiguousVersion`] when it holds
/// more than one, [`PackagerError::Configuration`] when `key` cannot be turned
/// into a pattern, and [`PackagerError::Io`] for other read failures.
pub fn read_declared_version(path: &Utf8Path, key: &str) -> Result<String> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PackagerError::VersionNotFound {
                path: path.to_owned(),
                key: key.to_owned(),
            });
        }
        Err(err) => return Err(err.into()),
    };

    let mut buffer = Vec::with_capacity(VERSION_SCAN_LIMIT);
    file.take(VERSION_SCAN_LIMIT as u64).read_to_end(&mut buffer)?;
    let text = String::from_utf8_lossy(&buffer);

    let mut versions = find_version_declarations(&text, key)?;
    debug!("found {} {key} declaration(s) in {path}", versions.len());

    match versions.len() {
        0 => Err(PackagerError::VersionNotFound {
            path: path.to_owned(),
            key: key.to_owned(),
        }),
        1 => versions.pop().ok_or_else(|| PackagerError::VersionNotFound {
            path: path.to_owned(),
            key: key.to_owned(),
        }),
        count => Err(PackagerError::AmbiguousVersion {
            path: path.to_owned(),
            key: key.to_owned(),
            count,
        }),
    }
}

fn workspace_segment(workspace: &Utf8Path) -> Result<&str> {
    workspace
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| PackagerError::MalformedWorkspace {
            segment: String::new(),
            reason: format!("workspace {workspace} has no final path segment"),
        })
}
