//! Key-path lookups into a document's data tree.
//!
//! Lookups walk the tree one segment at a time: string segments index maps,
//! integer segments index sequences. The first segment that cannot be
//! resolved fails the whole lookup with
//! [`DocumentError::DocumentDataKeyNotFound`], reporting the full requested
//! path rather than the failing segment.

use indexmap::IndexMap;

use super::error::DocumentError;
use super::manifest::Document;
use super::path::{KeyPath, Segment};
use super::value::Value;

/// Resolves `path` against the document's data tree.
///
/// An empty path returns the root of the tree.
///
/// # Example
///
/// ```
/// use bundlequill::document::{accessor, Document, KeyPath};
/// use bundlequill::document::value::Value;
///
/// let data: Value = vec![("spec".to_string(), Value::Null)].into_iter().collect();
/// let doc = Document::new("", "v1", "ReplicationController", "test-rc").with_data(data);
///
/// let err = accessor::get(&doc, &KeyPath::parse("spec.replicas").unwrap()).unwrap_err();
/// assert!(err.to_string().contains("spec.replicas"));
/// ```
pub fn get<'a>(doc: &'a Document, path: &KeyPath) -> Result<&'a Value, DocumentError> {
    let mut current = doc.data();
    for segment in path.segments() {
        let next = match segment {
            Segment::Key(key) => current.get(key),
            Segment::Index(index) => current.get_index(*index),
        };
        current = next.ok_or_else(|| key_not_found(doc, path))?;
    }
    Ok(current)
}

/// Parses `path` and resolves it.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Result<&'a Value, DocumentError> {
    get(doc, &KeyPath::parse(path)?)
}

/// Resolves a string value.
pub fn get_str<'a>(doc: &'a Document, path: &KeyPath) -> Result<&'a str, DocumentError> {
    get(doc, path)?
        .as_str()
        .ok_or_else(|| key_not_found(doc, path))
}

/// Resolves an integer value.
pub fn get_i64(doc: &Document, path: &KeyPath) -> Result<i64, DocumentError> {
    get(doc, path)?
        .as_i64()
        .ok_or_else(|| key_not_found(doc, path))
}

/// Resolves a boolean value.
pub fn get_bool(doc: &Document, path: &KeyPath) -> Result<bool, DocumentError> {
    get(doc, path)?
        .as_bool()
        .ok_or_else(|| key_not_found(doc, path))
}

/// Resolves a map.
///
/// # Arguments
///
/// * `doc` - The document to read
/// * `path` - Location of the map in the data tree
///
/// # Returns
///
/// The map entries in document order.
///
/// # Errors
///
/// Returns [`DocumentError::DocumentDataKeyNotFound`] if the path does not
/// resolve or resolves to something other than a map.
pub fn get_map<'a>(
    doc: &'a Document,
    path: &KeyPath,
) -> Result<&'a IndexMap<String, Value>, DocumentError> {
    get(doc, path)?
        .as_map()
        .ok_or_else(|| key_not_found(doc, path))
}

/// Resolves a sequence.
///
/// # Errors
///
/// Returns [`DocumentError::DocumentDataKeyNotFound`] if the path does not
/// resolve or resolves to something other than a sequence.
pub fn get_seq<'a>(doc: &'a Document, path: &KeyPath) -> Result<&'a [Value], DocumentError> {
    get(doc, path)?
        .as_seq()
        .ok_or_else(|| key_not_found(doc, path))
}

fn key_not_found(doc: &Document, path: &KeyPath) -> DocumentError {
    DocumentError::DocumentDataKeyNotFound {
        doc_name: doc.name().to_string(),
        key: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::parse_documents;

    const RC: &str = r#"
apiVersion: v1
kind: ReplicationController
metadata:
  name: test-rc
spec:
  replicas: 3
  paused: false
  selector:
    app: web
  template:
    spec:
      containers:
        - name: web
          image: nginx:1.25
        - name: sidecar
          image: envoy:1.29
"#;

    fn rc() -> Document {
        parse_documents(RC).unwrap().remove(0)
    }

    fn path(text: &str) -> KeyPath {
        KeyPath::parse(text).unwrap()
    }

    #[test]
    fn test_empty_path_returns_root() {
        let doc = rc();
        let root = get(&doc, &KeyPath::root()).unwrap();
        assert_eq!(root, doc.data());
    }

    #[test]
    fn test_nested_map_and_sequence() {
        let doc = rc();
        let image = get(&doc, &path("spec.template.spec.containers[1].image")).unwrap();
        assert_eq!(image.as_str(), Some("envoy:1.29"));
    }

    #[test]
    fn test_terminal_shape_is_preserved() {
        let doc = rc();
        assert!(get(&doc, &path("spec.selector")).unwrap().is_map());
        assert!(get(&doc, &path("spec.template.spec.containers")).unwrap().is_seq());
        assert_eq!(get(&doc, &path("spec.replicas")).unwrap().as_i64(), Some(3));
    }

    #[test]
    fn test_missing_key_reports_full_path() {
        let doc = Document::new("", "v1", "ReplicationController", "test-rc")
            .with_data(vec![("kind".to_string(), "ReplicationController")].into_iter().collect());

        let err = get(&doc, &path("spec.replicas")).unwrap_err();
        assert_eq!(
            err,
            DocumentError::DocumentDataKeyNotFound {
                doc_name: "test-rc".to_string(),
                key: "spec.replicas".to_string(),
            }
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let doc = rc();
        let err = get(&doc, &path("spec.template.spec.containers[2].image")).unwrap_err();
        match err {
            DocumentError::DocumentDataKeyNotFound { key, .. } => {
                assert_eq!(key, "spec.template.spec.containers[2].image")
            }
            other => panic!("Expected DocumentDataKeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_indexing_into_scalar_fails() {
        let doc = rc();
        assert!(get(&doc, &path("spec.replicas.value")).is_err());
        assert!(get(&doc, &path("spec.replicas[0]")).is_err());
        // Key segment against a sequence
        assert!(get(&doc, &path("spec.template.spec.containers.name")).is_err());
    }

    #[test]
    fn test_one_segment_past_deepest_structure() {
        let doc = rc();
        let deepest = path("spec.template.spec.containers[0].name");
        assert!(get(&doc, &deepest).is_ok());

        let too_deep = deepest.child("first");
        let err = get(&doc, &too_deep).unwrap_err();
        assert!(err
            .to_string()
            .contains("spec.template.spec.containers[0].name.first"));
    }

    #[test]
    fn test_typed_helpers() {
        let doc = rc();
        assert_eq!(get_i64(&doc, &path("spec.replicas")).unwrap(), 3);
        assert!(!get_bool(&doc, &path("spec.paused")).unwrap());
        assert_eq!(get_str(&doc, &path("spec.selector.app")).unwrap(), "web");
        assert_eq!(get_map(&doc, &path("spec.selector")).unwrap().len(), 1);
        assert_eq!(get_seq(&doc, &path("spec.template.spec.containers")).unwrap().len(), 2);
    }

    #[test]
    fn test_typed_helper_wrong_shape_reports_path() {
        let doc = rc();
        match get_str(&doc, &path("spec.replicas")) {
            Err(DocumentError::DocumentDataKeyNotFound { key, .. }) => {
                assert_eq!(key, "spec.replicas")
            }
            other => panic!("Expected DocumentDataKeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_map_and_seq_helpers_reject_other_shapes() {
        let doc = rc();
        let err = get_map(&doc, &path("spec.template.spec.containers")).unwrap_err();
        assert!(matches!(err, DocumentError::DocumentDataKeyNotFound { .. }));
        let err = get_seq(&doc, &path("spec.selector")).unwrap_err();
        assert!(matches!(err, DocumentError::DocumentDataKeyNotFound { .. }));
        assert!(get_bool(&doc, &path("spec.replicas")).is_err());
    }

    #[test]
    fn test_get_path_parses_text() {
        let doc = rc();
        assert_eq!(
            get_path(&doc, "spec.template.spec.containers.0.name")
                .unwrap()
                .as_str(),
            Some("web")
        );
        assert!(matches!(
            get_path(&doc, "spec..replicas"),
            Err(DocumentError::InvalidKeyPath { .. })
        ));
    }
}
