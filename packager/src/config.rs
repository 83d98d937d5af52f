//! Validated run configuration.
//!
//! [`PackagerConfig`] is built once at startup from the CLI (flags and
//! environment) and the optional settings file, validated eagerly, and then
//! passed by reference to every stage. No stage reads the environment
//! directly.

use crate::cli::Cli;
use crate::error::{PackagerError, Result};
use crate::settings::{Settings, ToolSettings, VersionSettings};
use crate::version::VersionLookup;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::time::Duration;

/// Extension appended to the spec base name.
pub const SPEC_EXTENSION: &str = "spec";

/// How the source tarball is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveBackend {
    /// Run the external `tar` tool.
    #[default]
    TarCommand,
    /// Write the tarball in-process.
    Native,
}

/// Fully validated configuration for one packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerConfig {
    /// Spec base name without extension.
    pub spec_name: String,
    /// Workspace root, absolute and without trailing separators.
    pub workspace: Utf8PathBuf,
    /// Home directory holding the rpmbuild tree.
    pub home: Utf8PathBuf,
    /// Release identifier substituted into the spec.
    pub release: String,
    /// Prefix applied to every package file name.
    pub name_prefix: String,
    /// Distribution tag embedded in package file names.
    pub dist: String,
    /// Publish directory; `None` disables publishing.
    pub publish_dir: Option<Utf8PathBuf>,
    /// Version discovery settings.
    pub version: VersionSettings,
    /// External tool locations and timeout.
    pub tools: ToolSettings,
    /// How the source tarball is produced.
    pub archive_backend: ArchiveBackend,
    /// Print the plan without side effects.
    pub dry_run: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

impl PackagerConfig {
    /// Builds the configuration from parsed CLI arguments, loading the
    /// settings file when one is named.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidSettings`] if the settings file is
    /// unreadable or malformed, and [`PackagerError::Configuration`] for any
    /// missing or invalid value.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let settings = match &cli.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Self::from_parts(cli, settings)
    }

    /// Builds the configuration from CLI arguments and already-loaded
    /// settings. CLI values take precedence over settings.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Configuration`] for any missing or invalid
    /// value, including a workspace, home, or publish directory that
    /// resolves to the filesystem root.
    pub fn from_parts(cli: &Cli, settings: Settings) -> Result<Self> {
        let spec_name = validate_spec_name(&cli.spec)?;
        let workspace = required_dir(cli.workspace.as_deref(), "WORKSPACE")?;
        let home = required_dir(cli.home.as_deref(), "HOME")?;
        let release = validate_release(cli.release.as_deref())?;
        let name_prefix = validate_prefix(&cli.prefix)?;
        let dist = validate_dist(&cli.dist)?;

        let publish_dir = if cli.skip_publish {
            None
        } else {
            cli.publish_dir
                .as_deref()
                .map(|dir| normalise_dir(dir, "RPMSHIP_PUBLISH_DIR"))
                .transpose()?
        };

        let Settings {
            mut tools,
            mut version,
        } = settings;
        if let Some(source) = cli.version_source {
            version.source = source;
        }
        if cli.tool_timeout.is_some() {
            tools.timeout_secs = cli.tool_timeout;
        }
        if version.key.trim().is_empty() {
            return Err(PackagerError::configuration("version key must not be empty"));
        }

        let archive_backend = if cli.native_archive {
            ArchiveBackend::Native
        } else {
            ArchiveBackend::TarCommand
        };

        Ok(Self {
            spec_name,
            workspace,
            home,
            release,
            name_prefix,
            dist,
            publish_dir,
            version,
            tools,
            archive_backend,
            dry_run: cli.dry_run,
            quiet: cli.quiet,
        })
    }

    /// File name of the spec, e.g. `goputils.spec`.
    #[must_use]
    pub fn spec_file_name(&self) -> String {
        format!("{}.{SPEC_EXTENSION}", self.spec_name)
    }

    /// Path of the spec template inside the workspace.
    #[must_use]
    pub fn template_path(&self) -> Utf8PathBuf {
        self.workspace.join(self.spec_file_name())
    }

    /// Version lookup parameters for the resolver.
    #[must_use]
    pub fn version_lookup(&self) -> VersionLookup<'_> {
        VersionLookup {
            source: self.version.source,
            file: self.version.file.as_deref(),
            key: &self.version.key,
        }
    }

    /// Timeout applied to every external tool.
    #[must_use]
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tools.timeout_secs.map(Duration::from_secs)
    }
}

fn validate_spec_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PackagerError::configuration("spec name is empty"));
    }
    if name.contains('/') {
        return Err(PackagerError::configuration(format!(
            "spec name {name:?} must be a base name, not a path"
        )));
    }
    Ok(name.to_owned())
}

fn required_dir(raw: Option<&Utf8Path>, var: &str) -> Result<Utf8PathBuf> {
    let dir = raw.ok_or_else(|| PackagerError::configuration(format!("{var} is not set")))?;
    normalise_dir(dir, var)
}

/// Trims trailing separators, makes the path absolute, and rejects paths that
/// resolve to the filesystem root.
fn normalise_dir(raw: &Utf8Path, var: &str) -> Result<Utf8PathBuf> {
    if raw.as_str().trim().is_empty() {
        return Err(PackagerError::configuration(format!("{var} is empty")));
    }

    let trimmed = raw.as_str().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(PackagerError::configuration(format!("{var} is root path")));
    }

    let absolute = if Utf8Path::new(trimmed).is_absolute() {
        Utf8PathBuf::from(trimmed)
    } else {
        let cwd = std::env::current_dir()?;
        let cwd_utf8 = Utf8PathBuf::try_from(cwd).map_err(|err| {
            PackagerError::configuration(format!("current directory is not valid UTF-8: {err}"))
        })?;
        cwd_utf8.join(trimmed)
    };

    if resolves_to_root(&absolute) {
        return Err(PackagerError::configuration(format!(
            "{var} ({raw}) is root path"
        )));
    }

    Ok(absolute)
}

/// Returns true if `path` names the filesystem root, either lexically
/// (`/`, `/tmp/..`) or after following symlinks.
#[must_use]
pub fn resolves_to_root(path: &Utf8Path) -> bool {
    let mut depth = 0usize;
    let mut rooted = false;
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => rooted = true,
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => depth = depth.saturating_sub(1),
            Utf8Component::Normal(_) => depth += 1,
        }
    }
    if rooted && depth == 0 {
        return true;
    }

    std::fs::canonicalize(path).is_ok_and(|canonical| canonical.parent().is_none())
}

fn validate_release(raw: Option<&str>) -> Result<String> {
    let release = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| PackagerError::configuration("RELEASEVERSION is not set"))?;
    if release.contains(|c: char| c.is_whitespace() || c == '/' || c == '-') {
        return Err(PackagerError::configuration(format!(
            "RELEASEVERSION {release:?} must not contain whitespace, '/' or '-'"
        )));
    }
    Ok(release.to_owned())
}

fn validate_prefix(raw: &str) -> Result<String> {
    if raw.contains('/') {
        return Err(PackagerError::configuration(format!(
            "PACKAGEPREFIX {raw:?} must not contain '/'"
        )));
    }
    Ok(raw.trim().to_owned())
}

fn validate_dist(raw: &str) -> Result<String> {
    let dist = raw.trim();
    if dist.is_empty() || dist.contains('/') {
        return Err(PackagerError::configuration(format!(
            "PACKAGEDIST {raw:?} must be a non-empty tag without '/'"
        )));
    }
    Ok(dist.to_owned())
}
