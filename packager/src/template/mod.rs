//! Spec template handling.
//!
//! A spec template is an ordinary RPM spec file containing two reserved
//! tokens:
//!
//! ```text
//! %define _release RELEASEVERSION
//! Version:        RPMVERSION
//! Release:        %{_release}%{?dist}
//! ```
//!
//! Templates are handled as bytes. Legacy specs often carry Latin-1 names in
//! `%changelog`, and everything outside the token spans is written back
//! unchanged.
//!
//! # Sub-modules
//!
//! - [`parser`]: extracts `BuildArch:` and `%package` declarations.
//! - [`render`]: substitutes the reserved tokens.

pub mod parser;
pub mod render;

pub use parser::{SpecMetadata, parse_metadata};
pub use render::{RELEASE_TOKEN, TokenValues, VERSION_TOKEN, substitute_tokens};

use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use regex::bytes::Regex;

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| PackagerError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

/// A rendered template together with the metadata extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Template bytes with every reserved token replaced.
    pub text: Vec<u8>,
    /// Declarations found in the template.
    pub metadata: SpecMetadata,
}

/// Extracts metadata from `template` and substitutes its tokens.
///
/// # Errors
///
/// Returns [`PackagerError::MultipleArchitectureDeclarations`] if the
/// template declares more than one architecture.
pub fn render_template(template: &[u8], values: &TokenValues<'_>) -> Result<RenderedTemplate> {
    let metadata = parse_metadata(template)?;
    Ok(RenderedTemplate {
        text: substitute_tokens(template, values)?,
        metadata,
    })
}

/// Reads the template at `path`.
///
/// # Errors
///
/// Returns [`PackagerError::TemplateNotFound`] if the file does not exist,
/// or [`PackagerError::Io`] if it cannot be read.
pub fn read_template(path: &Utf8Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(PackagerError::TemplateNotFound {
                path: path.to_owned(),
            })
        }
        Err(err) => Err(err.into()),
    }
}
