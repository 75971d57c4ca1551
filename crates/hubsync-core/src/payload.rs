//! Remote payload builder
//!
//! Transforms a [`DatasetSnapshot`] into the payload shape the remote
//! catalog expects. This is a pure function: no side effects, no failure
//! modes — malformed input degrades gracefully (empty strings, dropped
//! tags, "Other" license) rather than erroring.
//!
//! Two mappings here look backwards on purpose and must stay that way for
//! wire compatibility with existing mirrors:
//! - remote `title` carries the local machine *name* (slug), while remote
//!   `description` carries the local display *title*;
//! - the summary appends a footnote linking back to the source dataset.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{DatasetSnapshot, Resource};

/// Maximum length of a file description on the remote catalog
const DESCRIPTION_LIMIT: usize = 120;

/// Maximum length of a generated dataset slug
const SLUG_LIMIT: usize = 90;

// ============================================================================
// Payload types
// ============================================================================

/// Remote dataset visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "PRIVATE")]
    Private,
}

/// Where the remote catalog pulls a file from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSource {
    /// Download URL of the source resource
    pub url: String,
    /// Ask the remote service to expand archives on ingestion
    pub expand_archive: bool,
}

/// One file entry in the remote payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name including extension
    pub name: String,
    /// Source the remote service fetches the file from
    pub source: FileSource,
    /// Truncated resource description, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The request body sent on create-or-replace and update calls
///
/// Derived and disposable: computed fresh from the snapshot on every sync,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePayload {
    pub title: String,
    pub description: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub license: String,
    pub visibility: Visibility,
    pub files: Vec<FileDescriptor>,
}

/// Host-application context needed to render canonical links
///
/// Constructed once per job invocation and passed in explicitly; the
/// builder has no access to ambient configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    /// Base URL of the host application, no trailing slash required
    pub site_url: String,
}

impl SiteContext {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    /// Base URL with any trailing slash removed
    fn root(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }

    /// Canonical browsable URL of a dataset on the host application
    pub fn dataset_url(&self, name: &str) -> String {
        format!("{}/dataset/{}", self.root(), name)
    }
}

// ============================================================================
// build_payload
// ============================================================================

/// Builds the remote payload for a dataset snapshot
pub fn build_payload(snapshot: &DatasetSnapshot, site: &SiteContext) -> RemotePayload {
    let mut summary = snapshot.notes.clone();
    summary.push_str(&dataset_footnote(snapshot, site));

    RemotePayload {
        title: snapshot.name.clone(),
        description: snapshot.title.clone(),
        summary,
        tags: normalize_tags(&snapshot.tags),
        license: license_display(snapshot.license_id.as_deref()).to_string(),
        visibility: if snapshot.private {
            Visibility::Private
        } else {
            Visibility::Open
        },
        files: snapshot.resources.iter().map(file_descriptor).collect(),
    }
}

/// Footnote appended to the summary: a canonical link back to the source
/// dataset plus a human-readable "last updated" line.
fn dataset_footnote(snapshot: &DatasetSnapshot, site: &SiteContext) -> String {
    format!(
        "\n\nSource: {}  \r\nLast updated at {} : {}",
        site.dataset_url(&snapshot.name),
        site.root(),
        snapshot.metadata_modified.format("%Y-%m-%d"),
    )
}

// ============================================================================
// Tags
// ============================================================================

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[a-z0-9]+( [a-z0-9]+)*$").expect("valid tag pattern"))
}

/// Normalizes raw tag names into the remote catalog's tag shape
///
/// Tags of raw length 2–25 are lower-cased, hyphens and underscores become
/// spaces, anything not matching `^[a-z0-9]+( [a-z0-9]+)*$` is dropped, and
/// duplicates collapse. Set semantics: the sorted output order carries no
/// meaning.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let normalized: BTreeSet<String> = tags
        .iter()
        .filter(|tag| {
            let len = tag.chars().count();
            (2..=25).contains(&len)
        })
        .map(|tag| tag.to_lowercase().replace(['-', '_'], " "))
        .filter(|tag| tag_pattern().is_match(tag))
        .collect();
    normalized.into_iter().collect()
}

// ============================================================================
// License
// ============================================================================

/// Maps a local license identifier to the remote catalog's display name
///
/// Unknown or absent licenses map to the literal "Other".
pub fn license_display(license_id: Option<&str>) -> &'static str {
    match license_id {
        Some("cc-by") => "CC-BY",
        Some("other-pd") => "Public Domain",
        Some("odc-pddl") => "PDDL",
        Some("cc-zero") => "CC-0",
        Some("odc-by") => "ODC-BY",
        Some("cc-by-sa") => "CC-BY-SA",
        Some("odc-odbl") => "ODC-ODbL",
        Some("cc-nc") => "CC BY-NC",
        _ => "Other",
    }
}

// ============================================================================
// Files
// ============================================================================

/// Builds the file descriptor for a resource
///
/// Extension resolution precedence: declared format, then the extension of
/// the resource name, then the extension of the URL basename (query string
/// and fragment stripped first). The file name is the resource-name stem
/// when present, else the URL-basename stem.
pub fn file_descriptor(res: &Resource) -> FileDescriptor {
    let link = strip_url_suffix(&res.url);
    let (link_stem, link_ext) = split_name_ext(basename(link));
    let (name_stem, name_ext) = split_name_ext(basename(&res.name));

    let declared = res
        .format
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(|f| format!(".{}", f.to_lowercase()));

    let ext = match declared {
        Some(ext) => ext,
        None if !name_ext.is_empty() => name_ext.to_string(),
        None => link_ext.to_string(),
    };

    let stem = if name_stem.is_empty() { link_stem } else { name_stem };

    let description = res
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| truncate_on_word(d, DESCRIPTION_LIMIT));

    FileDescriptor {
        name: format!("{stem}{ext}"),
        source: FileSource {
            url: res.url.clone(),
            expand_archive: true,
        },
        description,
    }
}

/// Drops the query string and fragment from a URL
fn strip_url_suffix(url: &str) -> &str {
    let url = url.split('#').next().unwrap_or(url);
    url.split('?').next().unwrap_or(url)
}

/// Last path segment of a URL or file path
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Splits a file name into (stem, extension-with-dot)
///
/// A leading dot is part of the stem, not an extension.
fn split_name_ext(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Truncates text to at most `limit` chars, cutting on a word boundary and
/// appending a `...` indicator when anything was removed.
pub fn truncate_on_word(text: &str, limit: usize) -> String {
    const INDICATOR: &str = "...";

    if text.chars().count() <= limit {
        return text.to_string();
    }

    let keep = limit.saturating_sub(INDICATOR.len());
    let cut: String = text.chars().take(keep).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) => cut[..idx].trim_end().to_string(),
        None => cut,
    };
    format!("{cut}{INDICATOR}")
}

// ============================================================================
// Slug
// ============================================================================

/// Derives the provisional remote id from a dataset title
///
/// Whitespace collapses to single hyphens, underscores become hyphens,
/// anything outside `[a-z0-9-]` becomes a hyphen, runs of hyphens collapse,
/// and the result is clamped to 90 chars.
pub fn dataset_slug(title: &str) -> String {
    let cleaned = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace('_', "-");

    let mut slug = String::with_capacity(cleaned.len());
    let mut last_hyphen = true; // suppress a leading hyphen
    for ch in cleaned.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug.chars().take(SLUG_LIMIT).collect()
}
