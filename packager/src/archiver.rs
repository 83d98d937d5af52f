//! Source tarball creation.
//!
//! The workspace directory is archived into `SOURCES/<project>-<version>.tar.gz`
//! with version-control metadata left out and the top-level directory renamed
//! to `<project>-<version>`, which is the layout rpmbuild's `%setup` expects.

use crate::error::Result;
use crate::executor::{CommandExecutor, run_tool};
use camino::Utf8Path;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::debug;
use std::fs;
use std::path::Path;

/// Entry names left out of every source tarball, at any depth.
pub const ARCHIVE_EXCLUDES: [&str; 3] = [".git", ".gitignore", ".svn"];

/// What to archive and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveRequest<'a> {
    /// Directory containing the workspace.
    pub source_parent: &'a Utf8Path,
    /// Workspace directory name inside `source_parent`.
    pub dir_name: &'a str,
    /// Top-level directory name inside the tarball.
    pub top_level: &'a str,
    /// Tarball to write.
    pub destination: &'a Utf8Path,
}

impl ArchiveRequest<'_> {
    /// Arguments passed to `tar` for this request.
    ///
    /// The `--transform` rename is omitted when the workspace is already
    /// named `<project>-<version>`.
    #[must_use]
    pub fn tar_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ARCHIVE_EXCLUDES
            .iter()
            .map(|name| format!("--exclude={name}"))
            .collect();
        args.extend([
            "-zcf".to_owned(),
            self.destination.to_string(),
            "-C".to_owned(),
            self.source_parent.to_string(),
            self.dir_name.to_owned(),
        ]);
        if self.dir_name != self.top_level {
            args.push(format!(
                "--transform=s/^{}/{}/",
                self.dir_name, self.top_level
            ));
        }
        args
    }
}

/// Produces the source tarball.
pub trait SourceArchiver {
    /// Writes the tarball described by `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tarball cannot be written.
    fn archive(&self, request: &ArchiveRequest<'_>) -> Result<()>;
}

/// Runs the external `tar` tool.
pub struct TarCommandArchiver<'a> {
    executor: &'a dyn CommandExecutor,
    program: &'a str,
}

impl<'a> TarCommandArchiver<'a> {
    /// Creates an archiver running `program` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, program: &'a str) -> Self {
        Self { executor, program }
    }
}

impl SourceArchiver for TarCommandArchiver<'_> {
    fn archive(&self, request: &ArchiveRequest<'_>) -> Result<()> {
        run_tool(self.executor, self.program, &request.tar_args())?;
        Ok(())
    }
}

/// Writes the tarball in-process with the `tar` and `flate2` crates.
///
/// Entries are added in sorted order and symlinks are stored as links.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeArchiver;

impl SourceArchiver for NativeArchiver {
    fn archive(&self, request: &ArchiveRequest<'_>) -> Result<()> {
        let source = request.source_parent.join(request.dir_name);
        debug!(
            "archiving {source} as {} into {}",
            request.top_level, request.destination
        );

        let output = fs::File::create(request.destination)?;
        let encoder = GzEncoder::new(output, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        append_tree(&mut builder, source.as_std_path(), Path::new(request.top_level))?;

        builder.into_inner()?.finish()?;
        Ok(())
    }
}

fn append_tree<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    source: &Path,
    name: &Path,
) -> std::io::Result<()> {
    builder.append_dir(name, source)?;

    let mut entries = fs::read_dir(source)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let file_name = entry.file_name();
        if ARCHIVE_EXCLUDES.iter().any(|excluded| file_name == *excluded) {
            continue;
        }
        let path = entry.path();
        let entry_name = name.join(&file_name);
        if entry.file_type()?.is_dir() {
            append_tree(builder, &path, &entry_name)?;
        } else {
            builder.append_path_with_name(&path, &entry_name)?;
        }
    }
    Ok(())
}
