//! CLI argument definitions for rpmship.
//!
//! Every CI-facing setting is both a long flag and an environment variable,
//! so a Jenkins job can keep exporting `WORKSPACE`, `HOME`, and
//! `RELEASEVERSION` while local runs pass flags instead. Required values are
//! modelled as `Option` here and validated by
//! [`PackagerConfig`](crate::config::PackagerConfig), so a missing variable
//! surfaces as a configuration error rather than a usage error.

use crate::version::VersionSource;
use camino::Utf8PathBuf;
use clap::Parser;

/// Distribution tag used when `PACKAGEDIST` is not set.
pub const DEFAULT_DIST: &str = "el6";

/// Build an RPM from a CI workspace and publish it to a yum repository.
#[derive(Parser, Debug, Clone)]
#[command(name = "rpmship")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build an RPM from a CI workspace and publish it to a yum repository.\n\n",
    "rpmship archives the workspace into rpmbuild/SOURCES, substitutes ",
    "RELEASEVERSION and RPMVERSION in <SPEC>.spec, runs rpmbuild, checks that ",
    "every package declared by the spec was produced, and optionally moves the ",
    "packages into a publish directory before running createrepo.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  WORKSPACE            Workspace root (required)\n",
    "  HOME                 Root of the rpmbuild tree (required)\n",
    "  RELEASEVERSION       Release identifier, e.g. the CI build number (required)\n",
    "  PACKAGEPREFIX        Prefix applied to every package name\n",
    "  PACKAGEDIST          Distribution tag [default: el6]\n",
    "  RPMSHIP_PUBLISH_DIR  Publish directory; enables publishing\n",
    "  RPMSHIP_CONFIG       Path to a TOML settings file\n\n",
    "EXAMPLES:\n",
    "  Build and publish goputils.spec from a Jenkins job:\n",
    "    $ RELEASEVERSION=$BUILD_NUMBER rpmship goputils\n\n",
    "  Preview the expected packages without building:\n",
    "    $ rpmship goputils --dry-run\n",
))]
pub struct Cli {
    /// Base name of the spec file in the workspace (".spec" is appended).
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// Workspace root containing the project and its spec file.
    #[arg(long, env = "WORKSPACE", value_name = "DIR")]
    pub workspace: Option<Utf8PathBuf>,

    /// Directory holding the rpmbuild tree.
    #[arg(long, env = "HOME", value_name = "DIR")]
    pub home: Option<Utf8PathBuf>,

    /// Release identifier substituted for RELEASEVERSION.
    #[arg(long, env = "RELEASEVERSION", value_name = "RELEASE")]
    pub release: Option<String>,

    /// Prefix applied to every package file name.
    #[arg(long, env = "PACKAGEPREFIX", value_name = "PREFIX", default_value = "")]
    pub prefix: String,

    /// Distribution tag embedded in package file names.
    #[arg(long, env = "PACKAGEDIST", value_name = "DIST", default_value = DEFAULT_DIST)]
    pub dist: String,

    /// Directory that receives published packages.
    #[arg(long, env = "RPMSHIP_PUBLISH_DIR", value_name = "DIR")]
    pub publish_dir: Option<Utf8PathBuf>,

    /// Build and verify only; leave the publish directory untouched.
    #[arg(long)]
    pub skip_publish: bool,

    /// Override where the project version is read from.
    #[arg(long, value_enum, value_name = "SOURCE")]
    pub version_source: Option<VersionSource>,

    /// TOML settings file.
    #[arg(long, env = "RPMSHIP_CONFIG", value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Kill any external tool running longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    pub tool_timeout: Option<u64>,

    /// Create the source tarball in-process instead of running tar.
    #[arg(long)]
    pub native_archive: bool,

    /// Resolve the build and print the plan without side effects.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}
