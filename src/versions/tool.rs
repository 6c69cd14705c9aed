//! Version checks for the installed VCS programs.

use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

/// First dotted number in a program's version banner, e.g. `2.39.2` in
/// `git version 2.39.2` or `6.1.1` in `Mercurial Distributed SCM (version 6.1.1)`.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)+)").expect("version pattern is valid")
});

/// Extract the version number from a program's version output.
pub fn parse_tool_version(output: &str) -> Option<String> {
    VERSION_PATTERN
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether `actual` is at least `expected`, comparing loosely.
///
/// Missing minor or patch components count as zero and components beyond the
/// third are ignored, so `2.32` and `1.12.13.1` compare fine. Returns `None`
/// if either side has no leading numeric component.
pub fn is_version_at_least(actual: &str, expected: &str) -> Option<bool> {
    Some(loose_version(actual)? >= loose_version(expected)?)
}

fn loose_version(text: &str) -> Option<Version> {
    let text = text.trim().trim_start_matches(['v', 'V']);
    let mut parts = text
        .split(['.', '-', '+'])
        .map(|part| part.parse::<u64>().ok());

    let major = parts.next().flatten()?;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);

    Some(Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_banners() {
        assert_eq!(
            parse_tool_version("git version 2.39.2\n").as_deref(),
            Some("2.39.2")
        );
        assert_eq!(
            parse_tool_version(
                "Mercurial Distributed SCM (version 6.1.1)\n\
                 (see https://mercurial-scm.org for more information)"
            )
            .as_deref(),
            Some("6.1.1")
        );
        assert_eq!(
            parse_tool_version("\nConcurrent Versions System (CVS) 1.12.13 (client/server)\n")
                .as_deref(),
            Some("1.12.13")
        );
        assert_eq!(parse_tool_version("1.14.2\n").as_deref(), Some("1.14.2"));
        assert_eq!(
            parse_tool_version("repo version v2.32\n").as_deref(),
            Some("2.32")
        );
    }

    #[test]
    fn banner_without_version() {
        assert_eq!(parse_tool_version("command not found"), None);
    }

    #[test]
    fn compares_loosely() {
        assert_eq!(is_version_at_least("2.39.2", "2.20"), Some(true));
        assert_eq!(is_version_at_least("2.32", "2.32.0"), Some(true));
        assert_eq!(is_version_at_least("1.12.13.1", "1.12.14"), Some(false));
        assert_eq!(is_version_at_least("v6.1", "5"), Some(true));
    }

    #[test]
    fn non_numeric_versions_are_incomparable() {
        assert_eq!(is_version_at_least("unknown", "1.0"), None);
        assert_eq!(is_version_at_least("1.0", ""), None);
    }
}
