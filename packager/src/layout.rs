//! The rpmbuild directory tree.
//!
//! rpmbuild reads sources and specs from, and writes packages to, fixed
//! subdirectories of its top directory (`<home>/rpmbuild`). [`BuildTree`]
//! names those paths in one place.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Name of the rpmbuild top directory under the home directory.
pub const TOOL_ROOT: &str = "rpmbuild";

/// Paths inside the rpmbuild top directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTree {
    top_dir: Utf8PathBuf,
}

impl BuildTree {
    /// Create the tree rooted at `<home>/rpmbuild`.
    #[must_use]
    pub fn new(home: &Utf8Path) -> Self {
        Self {
            top_dir: home.join(TOOL_ROOT),
        }
    }

    /// Return the top directory passed to rpmbuild as `_topdir`.
    #[must_use]
    pub fn top_dir(&self) -> &Utf8Path {
        &self.top_dir
    }

    /// Return the `SOURCES` directory.
    #[must_use]
    pub fn sources_dir(&self) -> Utf8PathBuf {
        self.top_dir.join("SOURCES")
    }

    /// Return the `SPECS` directory.
    #[must_use]
    pub fn specs_dir(&self) -> Utf8PathBuf {
        self.top_dir.join("SPECS")
    }

    /// Return the `RPMS/<arch>` output directory.
    #[must_use]
    pub fn rpms_dir(&self, arch: &str) -> Utf8PathBuf {
        self.top_dir.join("RPMS").join(arch)
    }

    /// Return the tarball path for `<project>-<version>`.
    #[must_use]
    pub fn source_archive(&self, project: &str, version: &str) -> Utf8PathBuf {
        self.sources_dir()
            .join(format!("{project}-{version}.tar.gz"))
    }

    /// Return the staged spec path for `spec_file_name`.
    #[must_use]
    pub fn staged_spec(&self, spec_file_name: &str) -> Utf8PathBuf {
        self.specs_dir().join(spec_file_name)
    }

    /// Ensure the `SOURCES` and `SPECS` directories exist.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    pub fn prepare(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.sources_dir())?;
        fs::create_dir_all(self.specs_dir())
    }
}
