//! Declarative document selectors.
//!
//! A [`Selector`] is a set of optional criteria over a document's identity.
//! Unset criteria match anything; set criteria must all agree. Label and
//! annotation criteria are, by default, a required subset of the document's
//! own maps.
//!
//! # Example
//!
//! ```
//! use bundlequill::bundle::Selector;
//! use bundlequill::document::Document;
//!
//! let doc = Document::new("apps", "v1", "Deployment", "web")
//!     .with_label("app", "web")
//!     .with_label("tier", "frontend");
//!
//! assert!(Selector::new().kind("Deployment").label("app", "web").matches(&doc));
//! assert!(!Selector::new().kind("Deployment").label("app", "db").matches(&doc));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentError, DocumentId};

/// How label and annotation criteria compare against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMatch {
    /// Every selector entry must be present with an equal value; the
    /// document may carry more.
    #[default]
    Subset,
    /// The document's map must equal the selector's.
    Exact,
}

/// A conjunctive filter over document identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub group: Option<String>,
    pub version: Option<String>,
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    /// Position among the matches; applied by the bundle, not by `matches`.
    pub index: Option<usize>,
    pub label_match: LabelMatch,
}

impl Selector {
    /// A selector with no criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects by schema family.
    pub fn by_gvk(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self::new().group(group).version(version).kind(kind)
    }

    /// Selects exactly the given identity.
    pub fn by_id(id: &DocumentId) -> Self {
        Self::by_gvk(id.group.as_str(), id.version.as_str(), id.kind.as_str())
            .namespace(id.namespace.as_str())
            .name(id.name.as_str())
    }

    /// Requires the API group. `""` is the core group, not a wildcard.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Requires the API version (`v1`, `v1beta1`, ...).
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Requires the kind.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Requires the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Requires the namespace. `""` matches cluster-scoped documents only.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Adds one required label.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Adds several required labels.
    pub fn labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds one required annotation.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Adds several required annotations.
    pub fn annotations<K, V>(mut self, annotations: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.annotations
            .extend(annotations.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Picks the `index`-th (0-based) match when used with
    /// [`Bundle::select`](super::Bundle::select).
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets how label and annotation criteria compare.
    pub fn label_match(mut self, mode: LabelMatch) -> Self {
        self.label_match = mode;
        self
    }

    /// True when no identity criterion is set. The index is not a criterion.
    pub fn is_empty(&self) -> bool {
        self.group.is_none()
            && self.version.is_none()
            && self.kind.is_none()
            && self.name.is_none()
            && self.namespace.is_none()
            && self.labels.is_empty()
            && self.annotations.is_empty()
    }

    /// Whether `doc` satisfies every populated criterion.
    ///
    /// Documents without a name are never matched.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.is_materialized()
            && field_matches(&self.group, doc.group())
            && field_matches(&self.version, doc.version())
            && field_matches(&self.kind, doc.kind())
            && field_matches(&self.name, doc.name())
            && field_matches(&self.namespace, doc.namespace())
            && self.map_matches(&self.labels, doc.labels())
            && self.map_matches(&self.annotations, doc.annotations())
    }

    /// An empty criterion map matches anything in either mode.
    fn map_matches(
        &self,
        wanted: &BTreeMap<String, String>,
        actual: &BTreeMap<String, String>,
    ) -> bool {
        if wanted.is_empty() {
            return true;
        }
        match self.label_match {
            LabelMatch::Subset => wanted
                .iter()
                .all(|(key, value)| actual.get(key) == Some(value)),
            LabelMatch::Exact => wanted == actual,
        }
    }
}

fn field_matches(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |w| w == actual)
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let fields = [
            ("group", &self.group),
            ("version", &self.version),
            ("kind", &self.kind),
            ("name", &self.name),
            ("namespace", &self.namespace),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                parts.push(format!("{}={}", label, value));
            }
        }
        for (label, map) in [("labels", &self.labels), ("annotations", &self.annotations)] {
            if !map.is_empty() {
                let entries: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                parts.push(format!("{}={{{}}}", label, entries.join(",")));
            }
        }
        if self.label_match == LabelMatch::Exact {
            parts.push("match=exact".to_string());
        }
        if let Some(index) = self.index {
            parts.push(format!("index={}", index));
        }

        if parts.is_empty() {
            write!(f, "{{}}")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Parses `key=value,key2=value2` into a map.
///
/// Whitespace around entries is trimmed; an empty string is an empty map.
///
/// ```
/// use bundlequill::bundle::selector::parse_key_values;
///
/// let labels = parse_key_values("app=web, tier=frontend").unwrap();
/// assert_eq!(labels.get("tier").map(String::as_str), Some("frontend"));
/// ```
pub fn parse_key_values(input: &str) -> Result<BTreeMap<String, String>, DocumentError> {
    let mut map = BTreeMap::new();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(DocumentError::InvalidSelector {
                input: input.to_string(),
                message: format!("expected key=value, found '{}'", entry),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(DocumentError::InvalidSelector {
                input: input.to_string(),
                message: format!("empty key in '{}'", entry),
            });
        }
        map.insert(key.to_string(), value.trim().to_string());
    }
    Ok(map)
}
