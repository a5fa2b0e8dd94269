//! The `Document` value object.
//!
//! A `Document` pairs identity metadata (group, version, kind, name,
//! namespace, labels, annotations) with the manifest's data tree. Documents
//! are never mutated in place: the `with_*` builders consume the value and
//! return a new one.
//!
//! # Example
//!
//! ```
//! use bundlequill::document::Document;
//!
//! let doc = Document::new("apps", "v1", "Deployment", "web")
//!     .with_namespace("prod")
//!     .with_label("app", "web");
//!
//! assert_eq!(doc.api_version(), "apps/v1");
//! assert_eq!(doc.label("app"), Some("web"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use super::error::DocumentError;
use super::value::Value;

/// Identity of a document: the tuple two documents must share to be
/// considered the same object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{} {}", self.version, self.kind)?;
        } else {
            write!(f, "{}/{} {}", self.group, self.version, self.kind)?;
        }
        if self.namespace.is_empty() {
            write!(f, " {}", self.name)
        } else {
            write!(f, " {}/{}", self.namespace, self.name)
        }
    }
}

/// One configuration object: identity metadata plus a data tree.
///
/// Equality compares identity only; two documents with the same
/// [`DocumentId`] and different payloads are equal.
#[derive(Debug, Clone)]
pub struct Document {
    group: String,
    version: String,
    kind: String,
    name: String,
    namespace: String,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    data: Value,
}

impl Document {
    /// Creates a document with the given schema family and name, no
    /// namespace, no labels and a null data tree.
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: String::new(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            data: Value::Null,
        }
    }

    /// Builds a document from a parsed manifest object.
    ///
    /// Identity is read from `apiVersion`, `kind` and `metadata`; the whole
    /// object becomes the data tree. Missing identity fields are left empty
    /// for the validator to report. A root that is not a map, metadata of
    /// the wrong shape, or a label or annotation value that is not a string
    /// is malformed.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Map(root) = &value else {
            return Err(DocumentError::malformed(
                "",
                format!("document root must be a map, found {}", value.type_name()),
            ));
        };

        let metadata = root.get("metadata").unwrap_or(&Value::Null);
        let name = string_field(metadata, "name");

        if !(metadata.is_map() || metadata.is_null()) {
            return Err(DocumentError::malformed(
                &name,
                format!("metadata must be a map, found {}", metadata.type_name()),
            ));
        }

        let (group, version) = split_api_version(&string_field(&value, "apiVersion"));
        let kind = string_field(&value, "kind");
        let namespace = string_field(metadata, "namespace");
        let labels = string_map(metadata, "labels", &name)?;
        let annotations = string_map(metadata, "annotations", &name)?;

        Ok(Self {
            group,
            version,
            kind,
            name,
            namespace,
            labels,
            annotations,
            data: value,
        })
    }

    /// API group; empty for the core group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// API version within the group.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Name from `metadata.name`; empty until materialized.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace; empty for cluster-scoped documents.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    /// Value of one label, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Value of one annotation, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// The raw data tree.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Whether the document has been given a name.
    pub fn is_materialized(&self) -> bool {
        !self.name.is_empty()
    }

    /// The identity tuple this document is compared and deduplicated by.
    pub fn id(&self) -> DocumentId {
        DocumentId {
            group: self.group.clone(),
            version: self.version.clone(),
            kind: self.kind.clone(),
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    /// Returns the document with its namespace replaced.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Returns the document with one label added or replaced.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Returns the document with several labels added or replaced.
    pub fn with_labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Returns the document with one annotation added or replaced.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Replaces the data tree. Identity is unchanged.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group
            && self.version == other.version
            && self.kind == other.kind
            && self.namespace == other.namespace
            && self.name == other.name
    }
}

impl Eq for Document {}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Splits `apiVersion` on the last `/`. `v1` belongs to the core (empty) group.
fn split_api_version(api_version: &str) -> (String, String) {
    match api_version.rsplit_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::scalar_to_string)
        .unwrap_or_default()
}

fn string_map(
    metadata: &Value,
    key: &str,
    doc_name: &str,
) -> Result<BTreeMap<String, String>, DocumentError> {
    match metadata.get(key) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Map(entries)) => entries
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                // Unquoted numbers would lose their text (1.10 reads as 1.1)
                other => Err(DocumentError::malformed(
                    doc_name,
                    format!(
                        "metadata.{}.{} must be a string, found {}",
                        key,
                        k,
                        other.type_name()
                    ),
                )),
            })
            .collect(),
        Some(other) => Err(DocumentError::malformed(
            doc_name,
            format!("metadata.{} must be a map, found {}", key, other.type_name()),
        )),
    }
}
