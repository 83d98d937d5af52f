//! Packaging pipeline orchestration.
//!
//! The pipeline is a strict sequence of stages:
//!
//! ```text
//! Start → VersionResolved → SourceArchived → SpecRendered → Built → Verified → [Published] → Done
//! ```
//!
//! Any failure ends the run with a [`PipelineFailure`] naming the stage that
//! could not be reached. Completed stages are not rolled back.

use crate::archiver::{ArchiveRequest, NativeArchiver, SourceArchiver, TarCommandArchiver};
use crate::artefact::{VerifiedArtefact, expected_artefacts, verify_artefacts};
use crate::builder::RpmBuilder;
use crate::config::{ArchiveBackend, PackagerConfig};
use crate::descriptor::PackageDescriptor;
use crate::error::{PackagerError, Result};
use crate::executor::CommandExecutor;
use crate::layout::BuildTree;
use crate::output::{DryRunPlan, PlannedCommand, write_stderr_line};
use crate::publisher::{PublishReport, Publisher};
use crate::template::{SpecMetadata, TokenValues, parse_metadata, read_template, render_template};
use crate::version::{ResolvedVersion, resolve_version};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fmt;
use std::io::Write;
use thiserror::Error;

/// Pipeline states in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Configuration validated, nothing done yet.
    Start,
    /// Project name and version known.
    VersionResolved,
    /// Source tarball written to `SOURCES`.
    SourceArchived,
    /// Rendered spec written to `SPECS`.
    SpecRendered,
    /// rpmbuild finished successfully.
    Built,
    /// Every expected package exists.
    Verified,
    /// Packages moved and the repository index refreshed.
    Published,
    /// Run complete.
    Done,
}

impl Stage {
    /// What the pipeline does to reach this stage.
    #[must_use]
    pub const fn step(self) -> &'static str {
        match self {
            Self::Start => "validating configuration",
            Self::VersionResolved => "resolving the project version",
            Self::SourceArchived => "archiving sources",
            Self::SpecRendered => "rendering the spec",
            Self::Built => "running rpmbuild",
            Self::Verified => "verifying built packages",
            Self::Published => "publishing packages",
            Self::Done => "finishing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::VersionResolved => "version-resolved",
            Self::SourceArchived => "source-archived",
            Self::SpecRendered => "spec-rendered",
            Self::Built => "built",
            Self::Verified => "verified",
            Self::Published => "published",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A fatal error together with the stage the pipeline failed to reach.
#[derive(Debug, Error)]
#[error("{} (while {})", .source, .stage.step())]
pub struct PipelineFailure {
    /// Stage that could not be reached.
    pub stage: Stage,
    /// The originating error.
    #[source]
    pub source: PackagerError,
}

fn failed(stage: Stage) -> impl FnOnce(PackagerError) -> PipelineFailure {
    move |source| PipelineFailure { stage, source }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Metadata of the packages that were built.
    pub descriptor: PackageDescriptor,
    /// Packages found in the builder output directory.
    pub artefacts: Vec<VerifiedArtefact>,
    /// Publish details; `None` when publishing is disabled.
    pub publish: Option<PublishReport>,
}

/// Runs the packaging stages against one configuration.
pub struct Pipeline<'a> {
    config: &'a PackagerConfig,
    executor: &'a dyn CommandExecutor,
    tree: BuildTree,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline that runs external tools through `executor`.
    #[must_use]
    pub fn new(config: &'a PackagerConfig, executor: &'a dyn CommandExecutor) -> Self {
        Self {
            config,
            executor,
            tree: BuildTree::new(&config.home),
        }
    }

    /// The rpmbuild tree used by this pipeline.
    #[must_use]
    pub const fn tree(&self) -> &BuildTree {
        &self.tree
    }

    /// Runs every stage, writing progress to `stderr` unless quiet.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineFailure`] for the first stage that fails.
    pub fn run(&self, stderr: &mut dyn Write) -> std::result::Result<PipelineOutcome, PipelineFailure> {
        let resolved = self.resolve().map_err(failed(Stage::VersionResolved))?;
        self.progress(
            stderr,
            format!(
                "Project {} with version {}-{}",
                resolved.project, resolved.version, self.config.release
            ),
        );
        log_transition(Stage::Start, Stage::VersionResolved);

        let archive = self
            .archive_sources(&resolved)
            .map_err(failed(Stage::SourceArchived))?;
        self.progress(stderr, format!("create source {archive} success"));
        log_transition(Stage::VersionResolved, Stage::SourceArchived);

        let (spec, descriptor) = self
            .render_spec(resolved)
            .map_err(failed(Stage::SpecRendered))?;
        self.progress(stderr, format!("create spec {spec} success"));
        log_transition(Stage::SourceArchived, Stage::SpecRendered);

        RpmBuilder::new(self.executor, &self.config.tools.rpmbuild, &self.tree)
            .build(&spec)
            .map_err(failed(Stage::Built))?;
        self.progress(stderr, "call rpm build success");
        log_transition(Stage::SpecRendered, Stage::Built);

        let artefacts = verify_artefacts(&self.tree, &descriptor).map_err(failed(Stage::Verified))?;
        for artefact in &artefacts {
            self.progress(stderr, format!("build package: {}", artefact.path));
        }
        log_transition(Stage::Built, Stage::Verified);

        let publish = match &self.config.publish_dir {
            Some(dir) => {
                let report = Publisher::new(self.executor, &self.config.tools.createrepo, dir)
                    .publish(&artefacts, &descriptor.name_stem())
                    .map_err(failed(Stage::Published))?;
                self.progress(stderr, "deploy success");
                log_transition(Stage::Verified, Stage::Published);
                Some(report)
            }
            None => {
                debug!(
                    "publishing disabled; packages left in {}",
                    self.tree.rpms_dir(&descriptor.architecture)
                );
                None
            }
        };
        let last = if publish.is_some() {
            Stage::Published
        } else {
            Stage::Verified
        };
        log_transition(last, Stage::Done);

        Ok(PipelineOutcome {
            descriptor,
            artefacts,
            publish,
        })
    }

    /// Resolves everything a run would do without writing any file or
    /// running any tool.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineFailure`] if the version cannot be resolved or
    /// the template is missing or invalid.
    pub fn plan(&self) -> std::result::Result<DryRunPlan, PipelineFailure> {
        let resolved = self.resolve().map_err(failed(Stage::VersionResolved))?;
        let source_archive = self.tree.source_archive(&resolved.project, &resolved.version);
        let top_level = format!("{}-{}", resolved.project, resolved.version);

        let mut commands = Vec::new();
        if self.config.archive_backend == ArchiveBackend::TarCommand {
            let request = self
                .archive_request(&top_level, &source_archive)
                .map_err(failed(Stage::SourceArchived))?;
            commands.push(PlannedCommand {
                program: self.config.tools.tar.clone(),
                args: request.tar_args(),
            });
        }

        let template =
            read_template(&self.config.template_path()).map_err(failed(Stage::SpecRendered))?;
        let metadata = parse_metadata(&template).map_err(failed(Stage::SpecRendered))?;
        let descriptor = self.describe(resolved, metadata);
        let staged_spec = self.tree.staged_spec(&self.config.spec_file_name());

        let builder = RpmBuilder::new(self.executor, &self.config.tools.rpmbuild, &self.tree);
        commands.push(PlannedCommand {
            program: self.config.tools.rpmbuild.clone(),
            args: builder.args(&staged_spec),
        });
        if let Some(dir) = &self.config.publish_dir {
            let publisher = Publisher::new(self.executor, &self.config.tools.createrepo, dir);
            commands.push(PlannedCommand {
                program: self.config.tools.createrepo.clone(),
                args: publisher.index_args(),
            });
        }

        let artefacts = expected_artefacts(&self.tree, &descriptor)
            .into_iter()
            .map(|artefact| artefact.path)
            .collect();

        Ok(DryRunPlan {
            descriptor,
            source_archive,
            staged_spec,
            artefacts,
            commands,
            publish_dir: self.config.publish_dir.clone(),
        })
    }

    fn resolve(&self) -> Result<ResolvedVersion> {
        resolve_version(&self.config.workspace, &self.config.version_lookup())
    }

    fn archive_sources(&self, resolved: &ResolvedVersion) -> Result<Utf8PathBuf> {
        self.tree.prepare()?;
        let destination = self.tree.source_archive(&resolved.project, &resolved.version);
        let top_level = format!("{}-{}", resolved.project, resolved.version);
        let request = self.archive_request(&top_level, &destination)?;

        match self.config.archive_backend {
            ArchiveBackend::TarCommand => {
                TarCommandArchiver::new(self.executor, &self.config.tools.tar).archive(&request)?;
            }
            ArchiveBackend::Native => NativeArchiver.archive(&request)?,
        }
        Ok(destination)
    }

    fn archive_request<'r>(
        &'r self,
        top_level: &'r str,
        destination: &'r Utf8Path,
    ) -> Result<ArchiveRequest<'r>> {
        let workspace = &self.config.workspace;
        let (Some(source_parent), Some(dir_name)) = (workspace.parent(), workspace.file_name())
        else {
            return Err(PackagerError::configuration(format!(
                "WORKSPACE ({workspace}) has no parent directory"
            )));
        };
        Ok(ArchiveRequest {
            source_parent,
            dir_name,
            top_level,
            destination,
        })
    }

    fn render_spec(&self, resolved: ResolvedVersion) -> Result<(Utf8PathBuf, PackageDescriptor)> {
        let template = read_template(&self.config.template_path())?;
        let values = TokenValues {
            release: &self.config.release,
            version: &resolved.version,
        };
        let rendered = render_template(&template, &values)?;

        let staged = self.tree.staged_spec(&self.config.spec_file_name());
        std::fs::write(&staged, rendered.text)?;

        Ok((staged, self.describe(resolved, rendered.metadata)))
    }

    fn describe(&self, resolved: ResolvedVersion, metadata: SpecMetadata) -> PackageDescriptor {
        PackageDescriptor::assemble(
            resolved,
            metadata,
            &self.config.release,
            &self.config.name_prefix,
            &self.config.dist,
        )
    }

    fn progress(&self, stderr: &mut dyn Write, message: impl fmt::Display) {
        if !self.config.quiet {
            write_stderr_line(stderr, message);
        }
    }
}

fn log_transition(from: Stage, to: Stage) {
    debug!("stage {from} -> {to}");
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
