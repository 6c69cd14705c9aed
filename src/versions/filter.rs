//! Fuzzy matching of a package version against revision names.
//!
//! Projects tag releases in many ways: `1.2.3`, `v1.2.3`, `rel_1_2_3`,
//! `mylib-1.2.3`, `1.2.3-final`. Given the version a package manager reports,
//! [`filter_version_names`] picks the names that most likely denote it.

/// Characters projects use to separate version components.
const VERSION_SEPARATORS: &[char] = &['-', '_', '.'];

/// A spelling of the version together with the separators that must not
/// directly surround it in a name.
struct VersionVariant {
    name: String,
    separators: Vec<char>,
}

/// Return the entries of `names` that denote `version`, best match first.
///
/// Exact (case-insensitive) matches win outright. Otherwise a name matches if
/// it contains the version, spelled with any of the common separators, and
/// the characters around it are neither digits nor separators of that
/// spelling, so `0.10` matches `docutils-0.10` but not `1.0.10`. When several
/// names match and a `project` is given, names mentioning the project are
/// preferred.
pub fn filter_version_names(
    version: &str,
    names: &[String],
    project: Option<&str>,
) -> Vec<String> {
    let version = version.trim();
    if version.is_empty() || names.is_empty() {
        return Vec::new();
    }

    let exact: Vec<String> = names
        .iter()
        .filter(|name| name.eq_ignore_ascii_case(version))
        .cloned()
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    let variants = version_variants(&version.to_lowercase());

    let matches: Vec<String> = names
        .iter()
        .filter(|name| {
            let name = name.to_lowercase();
            variants.iter().any(|variant| contains_variant(&name, variant))
        })
        .cloned()
        .collect();

    match project.map(str::trim).filter(|p| !p.is_empty()) {
        Some(project) if matches.len() > 1 => {
            let project = project.to_lowercase();
            let (with_project, without): (Vec<_>, Vec<_>) = matches
                .into_iter()
                .partition(|name| name.to_lowercase().contains(&project));
            with_project.into_iter().chain(without).collect()
        }
        _ => matches,
    }
}

fn version_variants(version: &str) -> Vec<VersionVariant> {
    let mut variants = vec![VersionVariant {
        name: version.to_string(),
        separators: VERSION_SEPARATORS.to_vec(),
    }];

    if VERSION_SEPARATORS.iter().any(|sep| version.contains(*sep)) {
        for separator in VERSION_SEPARATORS {
            let name: String = version
                .chars()
                .map(|c| {
                    if VERSION_SEPARATORS.contains(&c) {
                        *separator
                    } else {
                        c
                    }
                })
                .collect();
            variants.push(VersionVariant {
                name,
                separators: vec![*separator],
            });
        }
    }

    variants
}

fn contains_variant(name: &str, variant: &VersionVariant) -> bool {
    let ignorable = |c: char| !c.is_ascii_digit() && !variant.separators.contains(&c);

    name.match_indices(variant.name.as_str()).any(|(start, found)| {
        let head = &name[..start];
        let tail = &name[start + found.len()..];
        head.chars().next_back().is_none_or(ignorable)
            && tail.chars().next().is_none_or(ignorable)
    })
}
