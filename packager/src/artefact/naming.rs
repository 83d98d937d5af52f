//! Package file name reconstruction.

use crate::descriptor::PackageDescriptor;
use std::fmt;

/// Extension of every built package.
pub const ARTEFACT_EXTENSION: &str = "rpm";

/// The expected file name of one built package.
///
/// Displays as `[prefix]project[-sub]-version-release.dist.arch.rpm`.
///
/// # Examples
///
/// ```
/// use rpmship::descriptor::PackageDescriptor;
/// use rpmship::template::SpecMetadata;
/// use rpmship::version::ResolvedVersion;
///
/// let descriptor = PackageDescriptor::assemble(
///     ResolvedVersion { project: "widgets".into(), version: "1.2".into() },
///     SpecMetadata { architecture: Some("x86_64".into()), sub_packages: vec!["utils".into()] },
///     "7",
///     "",
///     "dist",
/// );
/// let names: Vec<String> = descriptor.artefact_names().iter().map(ToString::to_string).collect();
/// assert_eq!(names, ["widgets-1.2-7.dist.x86_64.rpm", "widgets-utils-1.2-7.dist.x86_64.rpm"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtefactName<'a> {
    descriptor: &'a PackageDescriptor,
    sub_package: Option<&'a str>,
}

impl<'a> ArtefactName<'a> {
    /// Names the primary package when `sub_package` is `None`.
    #[must_use]
    pub const fn new(descriptor: &'a PackageDescriptor, sub_package: Option<&'a str>) -> Self {
        Self {
            descriptor,
            sub_package,
        }
    }

    /// Architecture directory the builder writes this package to.
    #[must_use]
    pub fn architecture(&self) -> &'a str {
        &self.descriptor.architecture
    }
}

impl fmt::Display for ArtefactName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.descriptor;
        write!(f, "{}{}", d.name_prefix, d.project)?;
        if let Some(sub) = self.sub_package {
            write!(f, "-{sub}")?;
        }
        write!(
            f,
            "-{}-{}.{}.{}.{ARTEFACT_EXTENSION}",
            d.version, d.release, d.dist, d.architecture
        )
    }
}
