//! Reserved token substitution.

use super::compile_pattern;
use crate::error::Result;
use regex::bytes::Captures;

/// Token replaced with the release identifier.
pub const RELEASE_TOKEN: &str = "RELEASEVERSION";

/// Token replaced with the project version.
pub const VERSION_TOKEN: &str = "RPMVERSION";

/// Values substituted for the reserved tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenValues<'a> {
    /// Replaces [`RELEASE_TOKEN`].
    pub release: &'a str,
    /// Replaces [`VERSION_TOKEN`].
    pub version: &'a str,
}

/// Replaces every occurrence of the reserved tokens in `text`.
///
/// Bytes outside the token spans are copied unchanged, whatever their
/// encoding, and text without tokens is returned as-is.
///
/// # Errors
///
/// Returns [`PackagerError::InvalidPattern`](crate::PackagerError::InvalidPattern)
/// if the token pattern fails to compile.
pub fn substitute_tokens(text: &[u8], values: &TokenValues<'_>) -> Result<Vec<u8>> {
    // Both tokens in one alternation so a replacement value is never rescanned.
    let reserved = compile_pattern(&format!(
        "{}|{}",
        regex::escape(RELEASE_TOKEN),
        regex::escape(VERSION_TOKEN)
    ))?;

    let rendered = reserved.replace_all(text, |captures: &Captures<'_>| {
        let token = captures.get(0).map_or(&[][..], |found| found.as_bytes());
        if token == RELEASE_TOKEN.as_bytes() {
            values.release.as_bytes()
        } else {
            values.version.as_bytes()
        }
    });
    Ok(rendered.into_owned())
}
