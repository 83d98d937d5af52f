//! Progress and dry-run output.

use crate::descriptor::PackageDescriptor;
use camino::Utf8PathBuf;
use std::io::Write;

/// Writes `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// An external command as it would be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
}

impl PlannedCommand {
    /// Shell-like rendering for display; arguments containing spaces are
    /// quoted.
    #[must_use]
    pub fn display_text(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| {
                if arg.contains(char::is_whitespace) {
                    format!("\"{arg}\"")
                } else {
                    arg.clone()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything a run would do, resolved without side effects.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use rpmship::descriptor::PackageDescriptor;
/// use rpmship::output::{DryRunPlan, PlannedCommand};
///
/// let plan = DryRunPlan {
///     descriptor: PackageDescriptor {
///         project: "widgets".into(),
///         version: "1.2".into(),
///         release: "7".into(),
///         architecture: "noarch".into(),
///         sub_packages: Vec::new(),
///         name_prefix: String::new(),
///         dist: "el6".into(),
///     },
///     source_archive: Utf8PathBuf::from("/home/ci/rpmbuild/SOURCES/widgets-1.2.tar.gz"),
///     staged_spec: Utf8PathBuf::from("/home/ci/rpmbuild/SPECS/widgets.spec"),
///     artefacts: vec![Utf8PathBuf::from("/home/ci/rpmbuild/RPMS/noarch/widgets-1.2-7.el6.noarch.rpm")],
///     commands: vec![PlannedCommand { program: "rpmbuild".into(), args: vec!["-bb".into()] }],
///     publish_dir: None,
/// };
///
/// let output = plan.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("widgets-1.2-7.el6.noarch.rpm"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunPlan {
    /// Resolved build metadata.
    pub descriptor: PackageDescriptor,
    /// Source tarball that would be written.
    pub source_archive: Utf8PathBuf,
    /// Rendered spec that would be written.
    pub staged_spec: Utf8PathBuf,
    /// Packages rpmbuild is expected to produce.
    pub artefacts: Vec<Utf8PathBuf>,
    /// External commands in the order they would run.
    pub commands: Vec<PlannedCommand>,
    /// Publish directory, if publishing is enabled.
    pub publish_dir: Option<Utf8PathBuf>,
}

impl DryRunPlan {
    /// Format the plan for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let d = &self.descriptor;
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Project: {}", d.project),
            format!("Version: {}", d.version),
            format!("Release: {}", d.release),
            format!("Architecture: {}", d.architecture),
            format!("Distribution: {}", d.dist),
            format!("Source archive: {}", self.source_archive),
            format!("Rendered spec: {}", self.staged_spec),
            match &self.publish_dir {
                Some(dir) => format!("Publish directory: {dir}"),
                None => "Publish directory: (publishing disabled)".to_owned(),
            },
        ];

        lines.push(String::new());
        lines.push("Expected packages:".to_owned());
        for artefact in &self.artefacts {
            lines.push(format!("  - {artefact}"));
        }

        lines.push(String::new());
        lines.push("Commands:".to_owned());
        for command in &self.commands {
            lines.push(format!("  $ {}", command.display_text()));
        }

        lines.join("\n")
    }
}
