//! Three-component project versions and the version-raise rules.
use log::*;
use std::{cmp::Ordering, fmt, str::FromStr};

use crate::error::{ReleaseError, Result};

/// A `major.minor.patch` version as written in manifests and branch names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// `major.minor`, the release line used in `release/<project>/<line>`.
    pub fn release_line(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// The next minor development version (`1.2.3` -> `1.3.0`).
    pub fn bump_minor(&self) -> Self {
        Self::new(self.major, self.minor + 1, 0)
    }

    /// Compares two versions by the numeric value of their concatenated
    /// decimal components, so `1.2.0` reads as `120` and `1.10.0` as `1100`.
    ///
    /// This is the ordering the release tooling has always applied and it is
    /// NOT semver ordering: `2.0.0` (`200`) sorts below `1.10.0` (`1100`) and
    /// `11.0.0` ties with `1.10.0`. Kept as observed behavior.
    pub fn digit_cmp(&self, other: &Self) -> Ordering {
        let left = self.joined_digits();
        let right = other.joined_digits();
        let left = left.trim_start_matches('0');
        let right = right.trim_start_matches('0');

        left.len().cmp(&right.len()).then_with(|| left.cmp(right))
    }

    fn joined_digits(&self) -> String {
        format!("{}{}{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionTriple {
    type Err = ReleaseError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let invalid = || {
            ReleaseError::validation(format!(
                "'{value}' is not of the form N.N.N"
            ))
        };

        let parsed = semver::Version::parse(trimmed).map_err(|_| invalid())?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(parsed.major, parsed.minor, parsed.patch))
    }
}

/// Validate a version raise from `previous` (current manifest) to `next`.
///
/// Rejected, in order: malformed next version, next equal to previous, a
/// next version with a patch component, and a next version that is not
/// greater than previous under [`VersionTriple::digit_cmp`].
pub fn validate_raise(previous: &str, next: &str) -> Result<VersionTriple> {
    let previous_version: VersionTriple = previous.parse().map_err(|err| {
        ReleaseError::validation(format!("current version: {err}"))
    })?;
    let next_version: VersionTriple = next.parse().map_err(|err| {
        ReleaseError::validation(format!("next version: {err}"))
    })?;

    if previous_version == next_version {
        return Err(ReleaseError::validation(format!(
            "next version {next_version} is the current version"
        )));
    }

    if next_version.patch != 0 {
        return Err(ReleaseError::validation(format!(
            "cannot cut patch: next version {next_version} must have a zero patch component"
        )));
    }

    if next_version.digit_cmp(&previous_version) != Ordering::Greater {
        return Err(ReleaseError::validation(format!(
            "next version {next_version} must be greater than current version {previous_version}"
        )));
    }

    debug!("version raise {previous_version} -> {next_version} is valid");

    Ok(next_version)
}
