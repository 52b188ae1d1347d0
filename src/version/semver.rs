use semver::Version;

/// A version with optional trailing fields, as written in constraints.
///
/// `1` and `1.*` both have no minor; `1.2` and `1.2.*` both have no patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
}

impl PartialVersion {
    /// Pad missing fields with zeros.
    pub fn to_version(self) -> Version {
        Version::new(
            self.major,
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }
}

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
/// Pre-release and build metadata are accepted on full versions.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
/// - "1.2.3-rc.1" -> Version(1, 2, 3, pre = rc.1)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    if let Ok(parsed) = Version::parse(version) {
        return Some(parsed);
    }
    parse_partial(version)
        .filter(|_| !version.contains(['*', 'x', 'X']))
        .map(PartialVersion::to_version)
}

/// Parse a possibly partial version where trailing fields may be omitted or `*`.
///
/// Once a field is a wildcard every following field must be one too, so
/// `1.*.3` is rejected.
pub fn parse_partial(version: &str) -> Option<PartialVersion> {
    let parts: Vec<&str> = version.trim().split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut fields = parts.iter().map(|part| match *part {
        "*" | "x" | "X" => Ok(None),
        digits => parse_field(digits).map(Some).ok_or(()),
    });

    let major = fields.next()?.ok()??;
    let minor = fields.next().unwrap_or(Ok(None)).ok()?;
    let patch = fields.next().unwrap_or(Ok(None)).ok()?;

    if minor.is_none() && patch.is_some() {
        return None;
    }

    Some(PartialVersion {
        major,
        minor,
        patch,
    })
}

fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(Version::new(1, 0, 0)))]
    #[case("1.2", Some(Version::new(1, 2, 0)))]
    #[case("1.2.3", Some(Version::new(1, 2, 3)))]
    #[case(" 0.1.0 ", Some(Version::new(0, 1, 0)))]
    #[case("1.*", None)]
    #[case("1.2.3.4", None)]
    #[case("v1.2.3", None)]
    #[case("", None)]
    fn test_parse_version(#[case] input: &str, #[case] expected: Option<Version>) {
        assert_eq!(parse_version(input), expected);
    }

    #[test]
    fn parse_version_keeps_prerelease() {
        let version = parse_version("1.2.3-rc.1").unwrap();
        assert_eq!(version.pre.as_str(), "rc.1");
    }

    #[rstest]
    #[case("1", Some((1, None, None)))]
    #[case("1.*", Some((1, None, None)))]
    #[case("1.2", Some((1, Some(2), None)))]
    #[case("1.2.*", Some((1, Some(2), None)))]
    #[case("1.2.3", Some((1, Some(2), Some(3))))]
    #[case("1.x", Some((1, None, None)))]
    #[case("1.*.3", None)]
    #[case("*", None)]
    #[case("a.b.c", None)]
    #[case("1..2", None)]
    fn test_parse_partial(
        #[case] input: &str,
        #[case] expected: Option<(u64, Option<u64>, Option<u64>)>,
    ) {
        let parsed = parse_partial(input).map(|p| (p.major, p.minor, p.patch));
        assert_eq!(parsed, expected);
    }
}
