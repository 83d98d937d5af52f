//! Build, verify, and publish RPM packages from CI workspaces.
//!
//! rpmship turns a checked-out project into binary RPMs in one linear run:
//!
//! 1. resolve the project name and version from the workspace;
//! 2. archive the workspace into `rpmbuild/SOURCES`;
//! 3. render the spec template, substituting `RELEASEVERSION` and
//!    `RPMVERSION`, and extract its `BuildArch:` and `%package` declarations;
//! 4. run rpmbuild;
//! 5. check that every expected package file exists;
//! 6. optionally evict stale packages from a publish directory, move the new
//!    ones in, and run `createrepo`.
//!
//! Every failure is fatal; see [`pipeline`] for the stage model.

pub mod archiver;
pub mod artefact;
pub mod builder;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod publisher;
pub mod settings;
pub mod template;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::{PackagerError, Result};
