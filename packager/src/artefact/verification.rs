//! Checks that rpmbuild produced every expected package.

use crate::descriptor::PackageDescriptor;
use crate::error::{PackagerError, Result};
use crate::layout::BuildTree;
use camino::Utf8PathBuf;
use log::debug;

/// A package confirmed to exist in the builder output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArtefact {
    /// File name of the package.
    pub file_name: String,
    /// Full path under `RPMS/<arch>`.
    pub path: Utf8PathBuf,
}

/// Returns the expected output paths in descriptor order.
#[must_use]
pub fn expected_artefacts(tree: &BuildTree, descriptor: &PackageDescriptor) -> Vec<VerifiedArtefact> {
    descriptor
        .artefact_names()
        .iter()
        .map(|name| {
            let file_name = name.to_string();
            VerifiedArtefact {
                path: tree.rpms_dir(name.architecture()).join(&file_name),
                file_name,
            }
        })
        .collect()
}

/// Confirms that every expected package exists.
///
/// Checking stops at the first missing file; nothing is modified.
///
/// # Errors
///
/// Returns [`PackagerError::ArtifactNotBuilt`] naming the first missing
/// package.
pub fn verify_artefacts(
    tree: &BuildTree,
    descriptor: &PackageDescriptor,
) -> Result<Vec<VerifiedArtefact>> {
    let expected = expected_artefacts(tree, descriptor);
    for artefact in &expected {
        if !artefact.path.is_file() {
            return Err(PackagerError::ArtifactNotBuilt {
                path: artefact.path.clone(),
            });
        }
        debug!("found built package {}", artefact.path);
    }
    Ok(expected)
}
