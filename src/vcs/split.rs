//! Decomposition of browsing URLs into locators.
//!
//! Package metadata often points at a web page of a hosting provider rather
//! than at a clone URL, e.g. `https://github.com/here/ort/tree/1.0.0/docs`.
//! For the well-known hosts the clone URL, revision and sub-path can be read
//! off the URL path.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use super::registry;
use super::VcsKind;
use crate::model::Locator;

/// Path segments that introduce `<revision>/<path>` on GitHub and GitLab.
const GITHUB_REVISION_MARKERS: &[&str] = &["blob", "tree"];

/// Path segment that introduces `<revision>/<path>` on Bitbucket.
const BITBUCKET_REVISION_MARKER: &str = "src";

/// Decompose `vcs_url` into any contained VCS information.
///
/// Never fails: anything that is not a URL of a known hosting provider comes
/// back as an untyped locator holding the unchanged input.
pub fn split_url(vcs_url: &str) -> Locator {
    let untyped = || Locator::new("", vcs_url, "", "");

    let url = match Url::parse(vcs_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("'{}' is not a URL ({}), keeping it as is", vcs_url, e);
            return untyped();
        }
    };

    let host = match url.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return untyped(),
    };

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if is_host(&host, "bitbucket.org") {
        split_bitbucket(&url, &segments)
    } else if is_host(&host, "github.com") || is_host(&host, "gitlab.com") {
        split_github(&url, &segments)
    } else {
        untyped()
    }
}

fn split_bitbucket(url: &Url, segments: &[&str]) -> Locator {
    let mut base = base_url(url, segments);

    let mut revision = Cow::Borrowed("");
    let mut path = String::new();

    if segments.get(2) == Some(&BITBUCKET_REVISION_MARKER) {
        if let Some(rev) = segments.get(3) {
            revision = decode(rev);
            path = remainder(segments, 4);
        }
    }

    // Bitbucket URLs look the same for Git and Mercurial repositories, so the
    // type is only known if the base URL itself says so.
    let vcs_type = registry::for_url(&base)
        .map(|vcs| vcs.kind().to_string())
        .unwrap_or_default();

    if vcs_type == VcsKind::Git.to_string() && !base.ends_with(".git") {
        base.push_str(".git");
    }

    Locator::new(vcs_type, base, revision, path)
}

fn split_github(url: &Url, segments: &[&str]) -> Locator {
    let mut base = base_url(url, segments);

    // GitHub and GitLab only host Git repositories.
    if segments.len() >= 2 && !base.ends_with(".git") {
        base.push_str(".git");
    }

    let mut revision = Cow::Borrowed("");
    let mut path = String::new();

    if let Some(extra) = segments.get(2) {
        match segments.get(3) {
            Some(rev) if GITHUB_REVISION_MARKERS.iter().any(|m| m == extra) => {
                revision = decode(rev);
                path = remainder(segments, 4);
            }
            _ => path = joined(&segments[2..]),
        }
    }

    Locator::new(VcsKind::Git.to_string(), base, revision, path)
}

/// Scheme, authority and the owner and repository segments.
fn base_url(url: &Url, segments: &[&str]) -> String {
    let mut base = format!("{}://{}", url.scheme(), authority(url));
    for segment in segments.iter().take(2) {
        base.push('/');
        base.push_str(segment);
    }
    base
}

/// `[user-info@]host[:port]` of a URL.
fn authority(url: &Url) -> String {
    let mut authority = String::new();

    if !url.username().is_empty() {
        authority.push_str(url.username());
        if let Some(password) = url.password() {
            authority.push(':');
            authority.push_str(password);
        }
        authority.push('@');
    }

    authority.push_str(url.host_str().unwrap_or_default());

    if let Some(port) = url.port() {
        authority.push(':');
        authority.push_str(&port.to_string());
    }

    authority
}

/// Segments from `start` on as a sub-path, without a trailing `.git`.
fn remainder(segments: &[&str], start: usize) -> String {
    let path = joined(segments.get(start..).unwrap_or_default());
    match path.strip_suffix(".git") {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

/// Decoded segments joined with `/`.
fn joined(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| decode(segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-decode a path segment, keeping it raw if the result is not UTF-8.
fn decode(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
}

fn is_host(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
