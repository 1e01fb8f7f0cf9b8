/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::comparator
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide the semantic-version comparison capability that
    the version view consults before offering an update.

  Security / Safety Notes:
    Parses operator- and server-supplied strings only; no I/O.

  Dependencies:
    semver for ordering of parsed versions.

  Operational Scope:
    Injected into the view by the composition root; tests may
    substitute a fixed comparator.

  Revision History:
    2025-11-12 COD  Replaced vercmp shell-out with semver parsing.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Capabilities passed explicitly, never looked up globally
    - Malformed input reported, not guessed
============================================================*/

use std::cmp::Ordering;

use semver::Version;

use crate::error::{FlexverError, Result};

/// Orders two version strings. `Greater` means `a` is newer than `b`.
pub trait VersionComparator {
    fn compare(&self, a: &str, b: &str) -> Result<Ordering>;
}

/// Semantic-version comparator tolerant of short forms such as `1.0` or `v2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverComparator;

impl VersionComparator for SemverComparator {
    fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(parse_version(a)?.cmp(&parse_version(b)?))
    }
}

/// Parse a version string, padding missing minor/patch components with zero.
pub fn parse_version(input: &str) -> Result<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let padded = pad_components(trimmed);
    Version::parse(&padded).map_err(|err| FlexverError::Version {
        input: input.to_string(),
        reason: err.to_string(),
    })
}

fn pad_components(version: &str) -> String {
    // Split off pre-release/build metadata so only the core is padded.
    let split_at = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split_at);
    let dots = core.matches('.').count();
    let mut padded = core.to_string();
    for _ in dots..2 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_patch_compares_greater() {
        let cmp = SemverComparator;
        assert_eq!(cmp.compare("2.10.60", "2.10.11").unwrap(), Ordering::Greater);
        assert_eq!(cmp.compare("2.10.11", "2.10.60").unwrap(), Ordering::Less);
        assert_eq!(cmp.compare("2.10.11", "2.10.11").unwrap(), Ordering::Equal);
    }

    #[test]
    fn short_forms_are_padded() {
        let cmp = SemverComparator;
        assert_eq!(cmp.compare("1.0", "1.0.0").unwrap(), Ordering::Equal);
        assert_eq!(cmp.compare("v2", "1.9.9").unwrap(), Ordering::Greater);
        assert_eq!(parse_version("3.1-rc.1").unwrap().to_string(), "3.1.0-rc.1");
    }

    #[test]
    fn prerelease_sorts_before_release() {
        let cmp = SemverComparator;
        assert_eq!(cmp.compare("3.0.0-beta.1", "3.0.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn malformed_input_is_an_error() {
        let cmp = SemverComparator;
        let err = cmp.compare("banana", "1.0.0").unwrap_err();
        assert!(matches!(err, FlexverError::Version { ref input, .. } if input == "banana"));
        assert!(cmp.compare("1.0.0", "").is_err());
        assert!(cmp.compare("1.2.3.4", "1.0.0").is_err());
    }
}
