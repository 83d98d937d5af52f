//! Publishing verified packages to a yum repository directory.
//!
//! Publishing is three steps, each aborting on failure without undoing the
//! previous ones:
//!
//! 1. delete every regular file in the publish directory whose name starts
//!    with `<prefix><project>`;
//! 2. move each verified package into the publish directory;
//! 3. run `createrepo --update` on the publish directory's parent.

use crate::artefact::VerifiedArtefact;
use crate::error::{PackagerError, Result};
use crate::executor::{CommandExecutor, run_tool};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;

/// Files touched by a publish run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Stale files deleted from the publish directory.
    pub evicted: Vec<Utf8PathBuf>,
    /// Packages now in the publish directory.
    pub published: Vec<Utf8PathBuf>,
}

/// Moves packages into a publish directory and refreshes its index.
pub struct Publisher<'a> {
    executor: &'a dyn CommandExecutor,
    program: &'a str,
    publish_dir: &'a Utf8Path,
}

impl<'a> Publisher<'a> {
    /// Creates a publisher for `publish_dir`, refreshing the index with
    /// `program`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, program: &'a str, publish_dir: &'a Utf8Path) -> Self {
        Self {
            executor,
            program,
            publish_dir,
        }
    }

    /// Directory passed to the index tool.
    #[must_use]
    pub fn index_dir(&self) -> &'a Utf8Path {
        self.publish_dir.parent().unwrap_or(self.publish_dir)
    }

    /// Arguments passed to the index tool.
    #[must_use]
    pub fn index_args(&self) -> Vec<String> {
        vec!["--update".to_owned(), self.index_dir().to_string()]
    }

    /// Evicts stale files, moves `artefacts` in, and refreshes the index.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PublishIo`] if the publish directory cannot
    /// be listed or a file cannot be removed or moved, and
    /// [`PackagerError::ExternalProcess`] if the index tool fails.
    pub fn publish(&self, artefacts: &[VerifiedArtefact], name_stem: &str) -> Result<PublishReport> {
        let evicted = evict_stale(self.publish_dir, name_stem)?;
        let published = artefacts
            .iter()
            .map(|artefact| move_into(&artefact.path, self.publish_dir))
            .collect::<Result<Vec<_>>>()?;
        run_tool(self.executor, self.program, &self.index_args())?;
        Ok(PublishReport { evicted, published })
    }
}

/// Deletes every regular file in `dir` whose name starts with `name_stem`.
///
/// # Errors
///
/// Returns [`PackagerError::PublishIo`] if `dir` cannot be listed or a
/// matching file cannot be removed.
pub fn evict_stale(dir: &Utf8Path, name_stem: &str) -> Result<Vec<Utf8PathBuf>> {
    let publish_io = |failed: &Utf8Path| {
        let owned = failed.to_owned();
        move |source: io::Error| PackagerError::PublishIo {
            path: owned,
            source,
        }
    };

    let mut stale = Vec::new();
    for listed in dir.read_dir_utf8().map_err(publish_io(dir))? {
        let entry = listed.map_err(publish_io(dir))?;
        let is_file = entry.file_type().map_err(publish_io(entry.path()))?.is_file();
        if is_file && entry.file_name().starts_with(name_stem) {
            stale.push(entry.into_path());
        }
    }
    stale.sort();

    for path in &stale {
        debug!("evicting stale package {path}");
        fs::remove_file(path).map_err(publish_io(path))?;
    }
    Ok(stale)
}

/// Moves `source` into `dir`, copying across filesystems when a rename is
/// not possible.
///
/// # Errors
///
/// Returns [`PackagerError::PublishIo`] naming the file that could not be
/// moved.
pub fn move_into(source: &Utf8Path, dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let file_name = source.file_name().ok_or_else(|| PackagerError::PublishIo {
        path: source.to_owned(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let destination = dir.join(file_name);
    let publish_io = |err: io::Error| PackagerError::PublishIo {
        path: destination.clone(),
        source: err,
    };

    match fs::rename(source, &destination) {
        Ok(()) => {}
        Err(rename_err) if rename_err.kind() == io::ErrorKind::CrossesDevices => {
            debug!("{source} is on another filesystem; copying");
            fs::copy(source, &destination).map_err(publish_io)?;
            fs::remove_file(source).map_err(|remove_err| PackagerError::PublishIo {
                path: source.to_owned(),
                source: remove_err,
            })?;
        }
        Err(rename_err) => return Err(publish_io(rename_err)),
    }
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MockCommandExecutor;
    use crate::test_utils::{args_match, failure_output, success_output};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Repo {
        _temp: TempDir,
        root: Utf8PathBuf,
        publish_dir: Utf8PathBuf,
        build_dir: Utf8PathBuf,
    }

    #[fixture]
    fn repo() -> Repo {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf8 temp path");
        let publish_dir = root.join("repo").join("goputils");
        let build_dir = root.join("rpmbuild").join("RPMS").join("noarch");
        fs::create_dir_all(&publish_dir).expect("create publish dir");
        fs::create_dir_all(&build_dir).expect("create build dir");
        Repo {
            _temp: temp,
            root,
            publish_dir,
            build_dir,
        }
    }

    fn built(repo: &Repo, name: &str) -> VerifiedArtefact {
        let path = repo.build_dir.join(name);
        fs::write(&path, name).expect("write package");
        VerifiedArtefact {
            file_name: name.to_owned(),
            path,
        }
    }

    #[rstest]
    fn eviction_matches_prefix_and_skips_directories(repo: Repo) {
        fs::write(repo.publish_dir.join("goputils-1.0.2-41.el6.noarch.rpm"), "old")
            .expect("write old package");
        fs::write(repo.publish_dir.join("goputils-agent-1.0.2-41.el6.noarch.rpm"), "old")
            .expect("write old sub-package");
        fs::write(repo.publish_dir.join("otherproj-2.0-1.el6.noarch.rpm"), "keep")
            .expect("write unrelated package");
        fs::create_dir(repo.publish_dir.join("goputils-archive")).expect("create dir");

        let evicted = evict_stale(&repo.publish_dir, "goputils").expect("eviction succeeds");

        assert_eq!(evicted.len(), 2);
        assert!(repo.publish_dir.join("otherproj-2.0-1.el6.noarch.rpm").exists());
        assert!(repo.publish_dir.join("goputils-archive").is_dir());
        assert!(!repo.publish_dir.join("goputils-1.0.2-41.el6.noarch.rpm").exists());
    }

    #[rstest]
    fn eviction_in_missing_directory_is_publish_error(repo: Repo) {
        let missing = repo.root.join("absent");
        let err = evict_stale(&missing, "goputils").expect_err("missing dir");
        assert!(matches!(err, PackagerError::PublishIo { ref path, .. } if *path == missing));
    }

    #[rstest]
    fn publish_moves_packages_and_updates_parent_index(repo: Repo) {
        fs::write(repo.publish_dir.join("goputils-1.0.2-41.el6.noarch.rpm"), "old")
            .expect("write old package");
        let artefacts = [
            built(&repo, "goputils-1.0.3-42.el6.noarch.rpm"),
            built(&repo, "goputils-agent-1.0.3-42.el6.noarch.rpm"),
        ];
        let expected_index = repo.root.join("repo").to_string();
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(move |program, args| {
                program == "createrepo" && args_match(args, &["--update", expected_index.as_str()])
            })
            .times(1)
            .returning(|_, _| Ok(success_output()));

        let report = Publisher::new(&executor, "createrepo", &repo.publish_dir)
            .publish(&artefacts, "goputils")
            .expect("publish succeeds");

        assert_eq!(report.evicted.len(), 1);
        assert_eq!(report.published.len(), 2);
        for artefact in &artefacts {
            assert!(!artefact.path.exists());
            assert!(repo.publish_dir.join(&artefact.file_name).is_file());
        }
    }

    #[rstest]
    fn index_failure_aborts_after_moving(repo: Repo) {
        let artefacts = [built(&repo, "goputils-1.0.3-42.el6.noarch.rpm")];
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(failure_output("createrepo: cannot lock")));

        let err = Publisher::new(&executor, "createrepo", &repo.publish_dir)
            .publish(&artefacts, "goputils")
            .expect_err("createrepo fails");

        assert!(matches!(err, PackagerError::ExternalProcess { .. }));
        assert!(repo.publish_dir.join("goputils-1.0.3-42.el6.noarch.rpm").is_file());
    }

    #[rstest]
    fn moving_missing_file_names_destination(repo: Repo) {
        let err = move_into(&repo.build_dir.join("absent.rpm"), &repo.publish_dir)
            .expect_err("source missing");
        assert!(matches!(err, PackagerError::PublishIo { .. }));
    }
}
