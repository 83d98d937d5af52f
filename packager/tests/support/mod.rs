//! Test support utilities for rpmship behavioural tests.
//!
//! [`Sandbox`] lays out a CI-style workspace, home directory, and publish
//! directory inside a temporary directory.

use camino::Utf8PathBuf;
use rpmship::config::{ArchiveBackend, PackagerConfig};
use rpmship::settings::{ToolSettings, VersionSettings};
use std::fs;
use tempfile::TempDir;

/// A temporary CI environment.
pub struct Sandbox {
    _temp_dir: TempDir,
    /// Root of the temporary directory.
    pub root: Utf8PathBuf,
    /// Workspace directory, named after the project.
    pub workspace: Utf8PathBuf,
    /// Home directory holding the rpmbuild tree.
    pub home: Utf8PathBuf,
    /// Publish directory inside a `repo` parent.
    pub publish_dir: Utf8PathBuf,
    /// Project name.
    pub project: String,
}

impl Sandbox {
    /// Creates a workspace for `project` whose `__init__.py` declares
    /// `version`, plus an empty spec.
    pub fn new(project: &str, version: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root =
            Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("temp path is not UTF-8");
        let workspace = root.join("workspace").join(project);
        let home = root.join("home");
        let publish_dir = root.join("repo").join(project);
        fs::create_dir_all(workspace.join(project)).expect("create project dir");
        fs::create_dir_all(&home).expect("create home");
        fs::create_dir_all(&publish_dir).expect("create publish dir");
        fs::write(
            workspace.join(project).join("__init__.py"),
            format!("\"\"\"{project}\"\"\"\n__version__ = '{version}'\n"),
        )
        .expect("write version file");

        let sandbox = Self {
            _temp_dir: temp_dir,
            root,
            workspace,
            home,
            publish_dir,
            project: project.to_owned(),
        };
        sandbox.write_spec(&sandbox.project, &format!("Name: {project}\nVersion: RPMVERSION\n"));
        sandbox
    }

    /// Writes `<workspace>/<spec_name>.spec`.
    pub fn write_spec(&self, spec_name: &str, text: &str) {
        fs::write(self.workspace.join(format!("{spec_name}.spec")), text)
            .expect("write spec");
    }

    /// Places a file in the publish directory.
    pub fn publish_file(&self, name: &str) {
        fs::write(self.publish_dir.join(name), b"published").expect("write published file");
    }

    /// Path of the rpmbuild top directory.
    pub fn rpmbuild_dir(&self) -> Utf8PathBuf {
        self.home.join("rpmbuild")
    }

    /// Configuration for a run using the in-process archiver.
    pub fn config(&self, release: &str, prefix: &str) -> PackagerConfig {
        PackagerConfig {
            spec_name: self.project.clone(),
            workspace: self.workspace.clone(),
            home: self.home.clone(),
            release: release.to_owned(),
            name_prefix: prefix.to_owned(),
            dist: "el6".to_owned(),
            publish_dir: Some(self.publish_dir.clone()),
            version: VersionSettings::default(),
            tools: ToolSettings::default(),
            archive_backend: ArchiveBackend::Native,
            dry_run: false,
            quiet: false,
        }
    }
}
