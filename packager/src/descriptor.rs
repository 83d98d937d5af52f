//! The package descriptor assembled as the pipeline runs.
//!
//! A descriptor is built by value: version resolution yields a
//! [`ResolvedVersion`], template rendering adds the architecture and
//! sub-packages, and the result is only borrowed from the verification stage
//! onwards.

use crate::artefact::ArtefactName;
use crate::template::SpecMetadata;
use crate::version::ResolvedVersion;

/// Architecture used when the template does not declare one.
pub const NO_ARCH: &str = "noarch";

/// Fully resolved metadata describing one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Project name.
    pub project: String,
    /// Project source version.
    pub version: String,
    /// Externally supplied release identifier.
    pub release: String,
    /// Target architecture, [`NO_ARCH`] unless the template declares one.
    pub architecture: String,
    /// Additional packages in template order.
    pub sub_packages: Vec<String>,
    /// Prefix applied to every package file name.
    pub name_prefix: String,
    /// Distribution tag.
    pub dist: String,
}

impl PackageDescriptor {
    /// Combines the resolved version with the template metadata.
    #[must_use]
    pub fn assemble(
        resolved: ResolvedVersion,
        metadata: SpecMetadata,
        release: &str,
        name_prefix: &str,
        dist: &str,
    ) -> Self {
        let ResolvedVersion { project, version } = resolved;
        let SpecMetadata {
            architecture,
            sub_packages,
        } = metadata;
        Self {
            project,
            version,
            release: release.to_owned(),
            architecture: architecture.unwrap_or_else(|| NO_ARCH.to_owned()),
            sub_packages,
            name_prefix: name_prefix.to_owned(),
            dist: dist.to_owned(),
        }
    }

    /// `<prefix><project>`, the stem shared by every package file name and
    /// the prefix used when evicting stale files.
    #[must_use]
    pub fn name_stem(&self) -> String {
        format!("{}{}", self.name_prefix, self.project)
    }

    /// Expected package file names: the primary package first, then one per
    /// sub-package in template order.
    #[must_use]
    pub fn artefact_names(&self) -> Vec<ArtefactName<'_>> {
        std::iter::once(None)
            .chain(self.sub_packages.iter().map(|sub| Some(sub.as_str())))
            .map(|sub_package| ArtefactName::new(self, sub_package))
            .collect()
    }
}
