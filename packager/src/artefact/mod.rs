//! Built package names and their verification.
//!
//! rpmbuild names its output `<name>-<version>-<release>.<dist>.<arch>.rpm`.
//! [`naming`] predicts those names from a
//! [`PackageDescriptor`](crate::descriptor::PackageDescriptor) and
//! [`verification`] checks that each one exists under `RPMS/<arch>`.

pub mod naming;
pub mod verification;

pub use naming::{ARTEFACT_EXTENSION, ArtefactName};
pub use verification::{VerifiedArtefact, expected_artefacts, verify_artefacts};
