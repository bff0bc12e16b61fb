//! Endpoint classification.
//!
//! Answers "does this (method, path) need YouTube write access?" from a
//! static table generated out of the server's OpenAPI document.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::requires_write::REQUIRES_WRITE;

/// OpenAPI operation extension the server sets on write-protected endpoints.
pub const REQUIRES_WRITE_EXTENSION: &str = "x-requires-youtube-write";

lazy_static! {
    static ref SCHEME_AND_HOST: Regex =
        Regex::new(r"(?i)^https?://[^/]+").expect("scheme/host pattern is valid");
}

/// A normalized `"METHOD /path"` key.
///
/// The method is uppercased and any leading `http(s)://host` is stripped from
/// the path. Nothing else is normalized: no trailing-slash handling, no path
/// templates, no query stripping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey(String);

impl EndpointKey {
    /// Build a key from a method (any case) and a path or absolute URL.
    pub fn new(method: &str, url: &str) -> Self {
        let path = SCHEME_AND_HOST.replace(url, "");
        Self(format!("{} {}", method.to_uppercase(), path))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable set of endpoints that require write access.
///
/// Unknown endpoints classify as not protected. The guard's late-detection
/// path covers anything this table misses.
///
/// # Example
///
/// ```rust
/// use youtubester_core::consent::ClassificationSet;
///
/// let set = ClassificationSet::from_entries(["POST /api/videos/copy-template"]);
///
/// assert!(set.is_write_protected("post", "https://host/api/videos/copy-template"));
/// assert!(!set.is_write_protected("GET", "/api/videos"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassificationSet {
    keys: HashSet<String>,
}

impl ClassificationSet {
    /// The table generated from the server schema and bundled with the crate.
    pub fn generated() -> Self {
        Self::from_entries(REQUIRES_WRITE.iter().copied())
    }

    /// Build a set from pre-normalized `"METHOD /path"` entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a call to `method` on `url` requires write access.
    pub fn is_write_protected(&self, method: &str, url: &str) -> bool {
        self.contains(&EndpointKey::new(method, url))
    }

    /// Whether the set contains an already normalized key.
    pub fn contains(&self, key: &EndpointKey) -> bool {
        self.keys.contains(key.as_str())
    }

    /// Number of protected endpoints.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no endpoint is protected.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// All entries, sorted.
    pub fn entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        entries.sort_unstable();
        entries
    }
}

/// Collect every operation flagged with [`REQUIRES_WRITE_EXTENSION`].
///
/// Only a literal `true` counts. The result is de-duplicated and sorted so the
/// generated file is stable across runs.
pub fn collect_requires_write_entries(openapi: &Value) -> Vec<String> {
    let mut entries = BTreeSet::new();

    let Some(paths) = openapi.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    for (raw_path, operations) in paths {
        let Some(operations) = operations.as_object() else {
            continue;
        };

        for (method, operation) in operations {
            if operation.get(REQUIRES_WRITE_EXTENSION) == Some(&Value::Bool(true)) {
                entries.insert(format!("{} {}", method.to_uppercase(), raw_path));
            }
        }
    }

    entries.into_iter().collect()
}

/// Render the Rust source of the generated `requires_write` module.
pub fn render_requires_write_module(entries: &[String]) -> String {
    let mut lines = vec![
        "// AUTO-GENERATED by youtubester-codegen. Do not edit.".to_string(),
        "// Format: \"METHOD /path\"".to_string(),
        String::new(),
        "/// Endpoints the server flags as requiring YouTube write access.".to_string(),
        "pub(crate) const REQUIRES_WRITE: &[&str] = &[".to_string(),
    ];

    for entry in entries {
        lines.push(format!("    {:?},", entry));
    }

    lines.push("];".to_string());
    lines.push(String::new());
    lines.join("\n")
}
