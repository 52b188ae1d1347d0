//! Version constraints a package places on its dependencies
//!
//! Supported requirement syntax:
//! - `*` - any version
//! - `1.*`, `1.2.*` - wildcards
//! - `1.2.3`, `=1.2.3`, `==1.2.3` - exact version
//! - `1`, `1.2`, `==1.2` - partial versions, same as `1.*` and `1.2.*`
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `^1.2.3` - caret: >=1.2.3 <2.0.0 (or special cases for 0.x)
//! - `~1.2.3` - tilde: >=1.2.3 <1.3.0, and `~1` is >=1.0.0 <2.0.0
//!
//! Build metadata is ignored on both sides, so `1.2.3+build.7` matches `1.2.3`.
//!
//! Requirements separated by commas must all hold, which is how ranges are
//! written: `>=1.0.0, <2.0.0`.

use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Version};

use crate::version::error::ConstraintError;
use crate::version::semver::{PartialVersion, parse_partial, parse_version};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Requirement {
    Any,
    Exact(Version),
    /// `1.*` when minor is None, `1.2.*` otherwise
    Wildcard { major: u64, minor: Option<u64> },
    Gte(Version),
    Gt(Version),
    Lte(Version),
    Lt(Version),
    /// `fields` is how many of major.minor.patch were written
    Caret { base: Version, fields: u8 },
    Tilde { base: Version, fields: u8 },
}

impl Requirement {
    /// Parse a single requirement (not comma-separated)
    fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        if spec == "*" {
            Some(Requirement::Any)
        } else if let Some(rest) = spec.strip_prefix(">=") {
            operand(rest).map(Requirement::Gte)
        } else if let Some(rest) = spec.strip_prefix('>') {
            operand(rest).map(Requirement::Gt)
        } else if let Some(rest) = spec.strip_prefix("<=") {
            operand(rest).map(Requirement::Lte)
        } else if let Some(rest) = spec.strip_prefix('<') {
            operand(rest).map(Requirement::Lt)
        } else if let Some(rest) = spec.strip_prefix("==") {
            Self::exact(rest)
        } else if let Some(rest) = spec.strip_prefix('=') {
            Self::exact(rest)
        } else if let Some(rest) = spec.strip_prefix('^') {
            let (base, fields) = ranged_operand(rest)?;
            Some(Requirement::Caret { base, fields })
        } else if let Some(rest) = spec.strip_prefix('~') {
            let (base, fields) = ranged_operand(rest)?;
            Some(Requirement::Tilde { base, fields })
        } else {
            Self::exact(spec)
        }
    }

    /// A full version matches exactly; a partial one matches like a wildcard.
    fn exact(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if let Ok(version) = Version::parse(spec) {
            Some(Requirement::Exact(precedence(&version)))
        } else {
            parse_partial(spec).map(Self::from_partial)
        }
    }

    fn from_partial(partial: PartialVersion) -> Self {
        match partial {
            PartialVersion {
                minor: None,
                major,
                ..
            } => Requirement::Wildcard { major, minor: None },
            PartialVersion {
                patch: None,
                major,
                minor,
            } => Requirement::Wildcard { major, minor },
            complete => Requirement::Exact(complete.to_version()),
        }
    }

    fn satisfies(&self, version: &Version) -> bool {
        let version = &precedence(version);
        match self {
            Requirement::Any => true,
            Requirement::Exact(v) => version == v,
            Requirement::Wildcard { major, minor } => {
                version.major == *major && minor.is_none_or(|minor| version.minor == minor)
            }
            Requirement::Gte(v) => version >= v,
            Requirement::Gt(v) => version > v,
            Requirement::Lte(v) => version <= v,
            Requirement::Lt(v) => version < v,
            Requirement::Caret { base, fields } => {
                if version < base {
                    return false;
                }
                // ^1.2.3 -> >=1.2.3 <2.0.0
                // ^0.2.3 -> >=0.2.3 <0.3.0
                // ^0.0.3 -> >=0.0.3 <0.0.4
                // ^0 -> <1.0.0, ^0.0 -> <0.1.0
                if base.major > 0 || *fields == 1 {
                    version.major == base.major
                } else if base.minor > 0 || *fields == 2 {
                    version.major == 0 && version.minor == base.minor
                } else {
                    version.major == 0 && version.minor == 0 && version.patch == base.patch
                }
            }
            Requirement::Tilde { base, fields } => {
                // ~1 -> >=1.0.0 <2.0.0, ~1.2 and ~1.2.3 keep the minor
                version >= base
                    && version.major == base.major
                    && (*fields == 1 || version.minor == base.minor)
            }
        }
    }
}

/// Operators take a concrete (zero-padded) version, never a wildcard.
fn operand(rest: &str) -> Option<Version> {
    parse_version(rest.trim()).map(|version| precedence(&version))
}

/// A concrete operand plus the number of fields written before padding.
fn ranged_operand(rest: &str) -> Option<(Version, u8)> {
    let rest = rest.trim();
    let base = operand(rest)?;
    let fields = parse_partial(rest).map_or(3, |partial| {
        1 + u8::from(partial.minor.is_some()) + u8::from(partial.patch.is_some())
    });
    Some((base, fields))
}

/// Build metadata takes no part in precedence.
fn precedence(version: &Version) -> Version {
    Version {
        build: BuildMetadata::EMPTY,
        ..version.clone()
    }
}

/// A parsed version constraint, keeping its original text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    raw: String,
    requirements: Vec<Requirement>,
}

impl VersionConstraint {
    /// The constraint every version satisfies.
    pub fn any() -> Self {
        Self {
            raw: "*".to_string(),
            requirements: vec![Requirement::Any],
        }
    }

    /// Check if a version satisfies all requirements
    pub fn satisfies(&self, version: &Version) -> bool {
        self.requirements.iter().all(|req| req.satisfies(version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(ConstraintError::Empty);
        }

        let requirements = spec
            .split(',')
            .map(Requirement::parse)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ConstraintError::Invalid(spec.to_string()))?;

        Ok(Self {
            raw: spec.to_string(),
            requirements,
        })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
