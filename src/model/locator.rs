//! Source locator value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vcs::{registry, split_url};

/// Hosts for which scp-like `git@host:owner/repo` URLs are rewritten to HTTPS.
const HTTPS_GIT_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// Where the source code of a package lives: VCS type, clone URL, revision
/// and an optional sub-path within the repository.
///
/// All fields may be empty. The all-empty locator ([`Locator::EMPTY`]) means
/// "unknown".
///
/// Construction and deserialization take the parts as given. A URL-less
/// locator only collapses to [`Locator::EMPTY`] through [`Locator::normalize`]
/// (and therefore [`Locator::process`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// VCS type name, e.g. `Git`. Free-form when declared by upstream metadata.
    #[serde(rename = "type", default)]
    pub vcs_type: String,

    /// Clone URL.
    #[serde(default)]
    pub url: String,

    /// Revision, e.g. a commit hash, tag or branch.
    #[serde(default)]
    pub revision: String,

    /// Sub-path within the repository.
    #[serde(default)]
    pub path: String,
}

impl Locator {
    /// The "unknown" sentinel.
    pub const EMPTY: Locator = Locator {
        vcs_type: String::new(),
        url: String::new(),
        revision: String::new(),
        path: String::new(),
    };

    /// Create a locator from its four parts, unchecked.
    pub fn new(
        vcs_type: impl Into<String>,
        url: impl Into<String>,
        revision: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            vcs_type: vcs_type.into(),
            url: url.into(),
            revision: revision.into(),
            path: path.into(),
        }
    }

    /// Whether this is the "unknown" sentinel.
    pub fn is_empty(&self) -> bool {
        self == &Self::EMPTY
    }

    /// Return a cleaned-up copy of this locator.
    ///
    /// Fields are trimmed, a recognized type is replaced by the backend's
    /// canonical name and the URL is normalized. A locator without URL
    /// collapses to [`Locator::EMPTY`], as a type or revision without a
    /// target means nothing.
    pub fn normalize(&self) -> Locator {
        let url = normalize_vcs_url(&self.url);
        if url.is_empty() {
            return Locator::EMPTY;
        }

        let vcs_type = self.vcs_type.trim();
        let vcs_type = registry::for_type(vcs_type)
            .map(|vcs| vcs.kind().to_string())
            .unwrap_or_else(|| vcs_type.to_string());

        Locator {
            vcs_type,
            url,
            revision: self.revision.trim().to_string(),
            path: self.path.trim().trim_matches('/').to_string(),
        }
    }

    /// Derive the processed locator from this declared one.
    ///
    /// When the declaration already names both a type and a revision it is
    /// only normalized. Otherwise the URL is decomposed and every field the
    /// declaration left empty is filled from the decomposition.
    pub fn process(&self) -> Locator {
        let declared = self.normalize();
        if declared.is_empty() {
            return Locator::EMPTY;
        }

        if !declared.vcs_type.is_empty() && !declared.revision.is_empty() {
            return declared;
        }

        let split = split_url(&declared.url);
        tracing::debug!("Decomposed '{}' into {}", declared.url, split);

        Locator {
            vcs_type: pick(declared.vcs_type, split.vcs_type),
            url: split.url,
            revision: pick(declared.revision, split.revision),
            path: pick(declared.path, split.path),
        }
    }
}

fn pick(declared: String, derived: String) -> String {
    if declared.is_empty() {
        derived
    } else {
        declared
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{type: '{}', url: '{}', revision: '{}', path: '{}'}}",
            self.vcs_type, self.url, self.revision, self.path
        )
    }
}

/// Normalize the many ways package metadata spells a clone URL.
pub fn normalize_vcs_url(url: &str) -> String {
    let mut url = url.trim();

    if let Some(rest) = url.strip_prefix("git+") {
        url = rest;
    }

    let mut normalized = if let Some(rest) = url.strip_prefix("git://") {
        match rest.split_once('/') {
            Some((host, path)) if is_https_git_host(host) => format!("https://{host}/{path}"),
            _ => url.to_string(),
        }
    } else if let Some((host, path)) = scp_like(url) {
        if is_https_git_host(host) {
            format!("https://{host}/{path}")
        } else {
            format!("ssh://git@{host}/{path}")
        }
    } else {
        url.to_string()
    };

    while normalized.ends_with('/') {
        normalized.pop();
    }

    normalized
}

/// Split an scp-like `git@host:path` URL into host and path.
fn scp_like(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("git@")?;
    let (host, path) = rest.split_once(':')?;
    if host.is_empty() || host.contains('/') || path.starts_with("//") {
        return None;
    }
    Some((host, path.trim_start_matches('/')))
}

fn is_https_git_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    HTTPS_GIT_HOSTS.iter().any(|known| *known == host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_is_default() {
        assert_eq!(Locator::default(), Locator::EMPTY);
        assert!(Locator::EMPTY.is_empty());
        assert!(!Locator::new("", "x", "", "").is_empty());
    }

    #[test]
    fn normalize_without_url_clears_everything() {
        let locator = Locator::new("Git", "  ", "v1.0", "docs");
        assert_eq!(locator.normalize(), Locator::EMPTY);
    }

    #[test]
    fn url_less_locator_is_kept_until_normalized() {
        let declared: Locator =
            serde_json::from_str(r#"{"type": "Git", "revision": "abc"}"#).unwrap();
        assert!(!declared.is_empty());
        assert!(declared.normalize().is_empty());
        assert!(declared.process().is_empty());
    }

    #[test]
    fn normalize_canonicalizes_known_types() {
        let locator = Locator::new(" svn ", "https://svn.example.org/svn/proj", "", "");
        assert_eq!(locator.normalize().vcs_type, "Subversion");

        let locator = Locator::new("HG", "https://hg.example.org/proj", "", "");
        assert_eq!(locator.normalize().vcs_type, "Mercurial");
    }

    #[test]
    fn normalize_keeps_unknown_types() {
        let locator = Locator::new("darcs", "https://example.org/repo", "", "");
        assert_eq!(locator.normalize().vcs_type, "darcs");
    }

    #[test]
    fn normalize_url_strips_git_plus_prefix() {
        assert_eq!(
            normalize_vcs_url("git+https://github.com/owner/repo.git"),
            "https://github.com/owner/repo.git"
        );
    }

    #[test]
    fn normalize_url_rewrites_git_protocol_for_github() {
        assert_eq!(
            normalize_vcs_url("git://github.com/owner/repo.git"),
            "https://github.com/owner/repo.git"
        );
        assert_eq!(
            normalize_vcs_url("git://example.org/repo.git"),
            "git://example.org/repo.git"
        );
    }

    #[test]
    fn normalize_url_rewrites_scp_like_urls() {
        assert_eq!(
            normalize_vcs_url("git@github.com:owner/repo.git"),
            "https://github.com/owner/repo.git"
        );
        assert_eq!(
            normalize_vcs_url("git@example.org:team/repo.git"),
            "ssh://git@example.org/team/repo.git"
        );
    }

    #[test]
    fn normalize_url_removes_trailing_slashes() {
        assert_eq!(
            normalize_vcs_url("https://example.org/repo//"),
            "https://example.org/repo"
        );
    }

    #[test]
    fn process_decomposes_browsing_urls() {
        let declared = Locator::new("", "https://github.com/here/ort/tree/1.0.0/docs", "", "");
        assert_eq!(
            declared.process(),
            Locator::new("Git", "https://github.com/here/ort.git", "1.0.0", "docs")
        );
    }

    #[test]
    fn process_prefers_declared_fields() {
        let declared = Locator::new(
            "",
            "https://github.com/here/ort/tree/1.0.0/docs",
            "",
            "model",
        );
        let processed = declared.process();
        assert_eq!(processed.revision, "1.0.0");
        assert_eq!(processed.path, "model");
    }

    #[test]
    fn process_keeps_fully_declared_locators() {
        let declared = Locator::new("git", "https://example.org/repo.git", "abc123", "");
        assert_eq!(
            declared.process(),
            Locator::new("Git", "https://example.org/repo.git", "abc123", "")
        );
    }

    #[test]
    fn process_of_empty_is_empty() {
        assert_eq!(Locator::EMPTY.process(), Locator::EMPTY);
    }

    #[test]
    fn serializes_type_key() {
        let locator = Locator::new("Git", "https://example.org/r.git", "1", "");
        let json = serde_json::to_value(&locator).unwrap();
        assert_eq!(json["type"], "Git");
        assert_eq!(json["url"], "https://example.org/r.git");

        let parsed: Locator = serde_json::from_str(r#"{"url": "u"}"#).unwrap();
        assert_eq!(parsed, Locator::new("", "u", "", ""));
    }
}
