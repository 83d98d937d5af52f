//! Optional TOML settings file.
//!
//! CI jobs configure rpmship through environment variables; the settings file
//! covers the knobs that rarely change between jobs on the same build host,
//! such as tool locations and where the version is declared.
//!
//! ```toml
//! [tools]
//! rpmbuild = "/usr/bin/rpmbuild"
//! timeout_secs = 1800
//!
//! [version]
//! source = "declaration-file"
//! file = "src/widgets/__init__.py"
//! ```

use crate::error::{PackagerError, Result};
use crate::version::{DEFAULT_VERSION_KEY, VersionSource};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Settings loaded from the optional TOML file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// External tool locations.
    pub tools: ToolSettings,
    /// Version discovery settings.
    pub version: VersionSettings,
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidSettings`] if the file cannot be read
    /// or does not match the schema.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|err| PackagerError::InvalidSettings {
                path: path.to_owned(),
                reason: err.to_string(),
            })?;
        Self::parse(&contents, path)
    }

    /// Parses settings from TOML text; `origin` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidSettings`] on malformed input or
    /// unknown keys.
    pub fn parse(contents: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(contents).map_err(|err| PackagerError::InvalidSettings {
            path: origin.to_owned(),
            reason: err.to_string(),
        })
    }
}

/// Locations of the external collaborators.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    /// Archiving tool.
    pub tar: String,
    /// Package builder.
    pub rpmbuild: String,
    /// Repository index updater.
    pub createrepo: String,
    /// Kill any tool running longer than this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tar: "tar".to_owned(),
            rpmbuild: "rpmbuild".to_owned(),
            createrepo: "createrepo".to_owned(),
            timeout_secs: None,
        }
    }
}

/// Where the project version is declared.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSettings {
    /// Version discovery strategy.
    pub source: VersionSource,
    /// Declaration file relative to the workspace root.
    pub file: Option<Utf8PathBuf>,
    /// Assignment key searched for in the declaration file.
    pub key: String,
}

impl Default for VersionSettings {
    fn default() -> Self {
        Self {
            source: VersionSource::default(),
            file: None,
            key: DEFAULT_VERSION_KEY.to_owned(),
        }
    }
}
