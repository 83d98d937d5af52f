//! Declaration extraction for spec templates.
//!
//! Templates are scanned as raw bytes; only the captured values are
//! converted to text.

use super::compile_pattern;
use crate::error::{PackagerError, Result};
use regex::bytes::Regex;

const ARCHITECTURE_PATTERN: &str = r"(?m)^[ \t]*BuildArch:[ \t]+(\S+)";
const SUB_PACKAGE_PATTERN: &str = r"(?m)^[ \t]*%package[ \t]+(\S+)";

/// Declarations extracted from a spec template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecMetadata {
    /// Declared target architecture, if any.
    pub architecture: Option<String>,
    /// Additional package sections in document order.
    pub sub_packages: Vec<String>,
}

/// Extracts the `BuildArch:` and `%package` declarations from `text`.
///
/// Matching is line-anchored and case-sensitive. Sub-packages are returned in
/// document order without deduplication.
///
/// # Errors
///
/// Returns [`PackagerError::MultipleArchitectureDeclarations`] when a second
/// `BuildArch:` line is found, or [`PackagerError::InvalidPattern`] if a
/// declaration pattern fails to compile.
///
/// # Examples
///
/// ```
/// use rpmship::template::parse_metadata;
///
/// let metadata = parse_metadata(b"BuildArch: x86_64\n%package utils\n")?;
/// assert_eq!(metadata.architecture.as_deref(), Some("x86_64"));
/// assert_eq!(metadata.sub_packages, ["utils"]);
/// # Ok::<(), rpmship::PackagerError>(())
/// ```
pub fn parse_metadata(text: &[u8]) -> Result<SpecMetadata> {
    let architecture_declaration = compile_pattern(ARCHITECTURE_PATTERN)?;
    let sub_package_declaration = compile_pattern(SUB_PACKAGE_PATTERN)?;

    let mut architecture: Option<String> = None;
    for value in declared_values(&architecture_declaration, text) {
        if let Some(first) = architecture.take() {
            return Err(PackagerError::MultipleArchitectureDeclarations {
                first,
                second: value,
            });
        }
        architecture = Some(value);
    }

    let sub_packages = declared_values(&sub_package_declaration, text).collect();

    Ok(SpecMetadata {
        architecture,
        sub_packages,
    })
}

fn declared_values<'a>(pattern: &'a Regex, text: &'a [u8]) -> impl Iterator<Item = String> + 'a {
    pattern
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
