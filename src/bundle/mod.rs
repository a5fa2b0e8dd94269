//! Ordered collections of documents and selector queries over them.
//!
//! A [`Bundle`] keeps documents in input order behind `Arc`s. Queries never
//! mutate the bundle; operations that derive a new bundle (`filtered`,
//! `append`, `merge`) share the existing documents instead of copying them,
//! so bundles can be handed to several threads and queried concurrently.
//!
//! Each query form states its cardinality:
//!
//! - [`Bundle::filter`] - any number of matches, never fails
//! - [`Bundle::select_one`] - exactly one match
//! - [`Bundle::select_by_index`] - the Nth match
//!
//! # Example
//!
//! ```
//! use bundlequill::bundle::{Bundle, Selector};
//! use bundlequill::document::{Document, DocumentError};
//!
//! let bundle = Bundle::new(vec![
//!     Document::new("", "v1", "ReplicationController", "test-rc"),
//!     Document::new("", "v1", "Namespace", "test"),
//! ]);
//!
//! let rc = bundle.select_one(&Selector::new().kind("ReplicationController")).unwrap();
//! assert_eq!(rc.name(), "test-rc");
//!
//! let missing = bundle.select_one(&Selector::new().kind("Pod"));
//! assert!(matches!(missing, Err(DocumentError::DocNotFound { .. })));
//! ```

pub mod selector;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::document::{Document, DocumentError, DocumentId};

pub use selector::{LabelMatch, Selector};

/// An ordered, immutable collection of documents.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    docs: Vec<Arc<Document>>,
}

impl Bundle {
    /// Creates a bundle holding `docs` in the given order.
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs: docs.into_iter().map(Arc::new).collect(),
        }
    }

    fn from_shared(docs: Vec<Arc<Document>>) -> Self {
        Self { docs }
    }

    /// Number of documents, named or not.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns true if the bundle holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents in bundle order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> + '_ {
        self.docs.iter().map(|doc| &**doc)
    }

    /// The document at `position` in bundle order.
    pub fn get(&self, position: usize) -> Option<&Document> {
        self.docs.get(position).map(|doc| &**doc)
    }

    /// All documents matching `selector`, in bundle order.
    ///
    /// An empty result is not an error. The selector's index, if any, is
    /// ignored here.
    pub fn filter(&self, selector: &Selector) -> Vec<&Document> {
        self.iter().filter(|doc| selector.matches(doc)).collect()
    }

    /// A new bundle holding the documents matching `selector`.
    pub fn filtered(&self, selector: &Selector) -> Bundle {
        Self::from_shared(
            self.docs
                .iter()
                .filter(|doc| selector.matches(doc))
                .cloned()
                .collect(),
        )
    }

    /// The single document matching `selector`.
    ///
    /// Zero matches is [`DocumentError::DocNotFound`]; more than one is
    /// [`DocumentError::MultiDocsFound`].
    pub fn select_one(&self, selector: &Selector) -> Result<&Document, DocumentError> {
        let mut matches = self.filter(selector);
        match matches.len() {
            0 => Err(DocumentError::DocNotFound {
                selector: selector.clone(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(DocumentError::MultiDocsFound {
                selector: selector.clone(),
                count,
            }),
        }
    }

    /// The `index`-th (0-based) document matching `selector`.
    ///
    /// An index past the last match is [`DocumentError::IndexOutOfRange`],
    /// including when nothing matched at all.
    pub fn select_by_index(
        &self,
        selector: &Selector,
        index: usize,
    ) -> Result<&Document, DocumentError> {
        let matches = self.filter(selector);
        let matched = matches.len();
        matches
            .into_iter()
            .nth(index)
            .ok_or_else(|| DocumentError::IndexOutOfRange {
                selector: selector.clone(),
                index,
                matched,
            })
    }

    /// Positional selection when the selector carries an index, exactly-one
    /// selection otherwise.
    pub fn select(&self, selector: &Selector) -> Result<&Document, DocumentError> {
        match selector.index {
            Some(index) => self.select_by_index(selector, index),
            None => self.select_one(selector),
        }
    }

    /// A new bundle with `doc` added at the end.
    pub fn append(&self, doc: Document) -> Bundle {
        let mut docs = self.docs.clone();
        docs.push(Arc::new(doc));
        Self::from_shared(docs)
    }

    /// A new bundle with the documents of `other` after those of `self`.
    pub fn merge(&self, other: &Bundle) -> Bundle {
        let mut docs = Vec::with_capacity(self.docs.len() + other.docs.len());
        docs.extend(self.docs.iter().cloned());
        docs.extend(other.docs.iter().cloned());
        Self::from_shared(docs)
    }

    /// Identities carried by more than one named document, in order of
    /// first appearance.
    ///
    /// Unnamed documents are skipped: they have no identity yet, so several
    /// placeholders of the same kind do not collide.
    pub fn duplicates(&self) -> Vec<DocumentId> {
        let mut counts: IndexMap<DocumentId, usize> = IndexMap::new();
        for doc in self.iter().filter(|doc| doc.is_materialized()) {
            *counts.entry(doc.id()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id)
            .collect()
    }
}

impl FromIterator<Document> for Bundle {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Bundle {
    type Item = &'a Document;
    type IntoIter =
        std::iter::Map<std::slice::Iter<'a, Arc<Document>>, fn(&'a Arc<Document>) -> &'a Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs
            .iter()
            .map(unshare as fn(&'a Arc<Document>) -> &'a Document)
    }
}

fn unshare(doc: &Arc<Document>) -> &Document {
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rc(name: &str) -> Document {
        Document::new("", "v1", "ReplicationController", name)
    }

    fn ns(name: &str) -> Document {
        Document::new("", "v1", "Namespace", name)
    }

    fn names(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|doc| doc.name().to_string()).collect()
    }

    #[test]
    fn test_select_one_scenario() {
        let bundle = Bundle::new(vec![rc("test-rc"), ns("test")]);
        let by_kind = Selector::new().kind("ReplicationController");

        let found = bundle.select_one(&by_kind).unwrap();
        assert_eq!(found.name(), "test-rc");

        match bundle.select_one(&Selector::new().kind("Pod")) {
            Err(DocumentError::DocNotFound { selector }) => {
                assert_eq!(selector, Selector::new().kind("Pod"))
            }
            other => panic!("Expected DocNotFound, got {:?}", other),
        }

        let bigger = bundle.append(rc("other-rc"));
        match bigger.select_one(&by_kind) {
            Err(DocumentError::MultiDocsFound { selector, count }) => {
                assert_eq!(selector, by_kind);
                assert_eq!(count, 2);
            }
            other => panic!("Expected MultiDocsFound, got {:?}", other),
        }

        // The original bundle is untouched by append
        assert_eq!(bundle.len(), 2);
        assert!(bundle.select_one(&by_kind).is_ok());
    }

    #[test]
    fn test_true_duplicate_surfaces_as_multi_docs() {
        let bundle = Bundle::new(vec![rc("same"), rc("same")]);
        assert!(matches!(
            bundle.select_one(&Selector::new().name("same")),
            Err(DocumentError::MultiDocsFound { count: 2, .. })
        ));
        assert_eq!(bundle.duplicates(), vec![rc("same").id()]);
    }

    #[test]
    fn test_duplicates_in_first_appearance_order() {
        let bundle = Bundle::new(vec![rc("a"), ns("x"), ns("x"), rc("a"), rc("b")]);
        assert_eq!(bundle.duplicates(), vec![rc("a").id(), ns("x").id()]);
    }

    #[test]
    fn test_duplicates_ignore_unnamed_documents() {
        let placeholder = || {
            Document::new("", "v1", "ConfigMap", "")
                .with_annotation("bundlequill.io/placeholder", "true")
        };
        let bundle = Bundle::new(vec![placeholder(), placeholder(), rc("a")]);
        assert!(bundle.duplicates().is_empty());
    }

    #[test]
    fn test_filter_preserves_order_and_returns_empty() {
        let bundle = Bundle::new(vec![rc("a"), ns("x"), rc("b"), ns("y"), rc("c")]);
        let rcs = bundle.filter(&Selector::new().kind("ReplicationController"));
        assert_eq!(names(&rcs), vec!["a", "b", "c"]);

        assert!(bundle.filter(&Selector::new().kind("Pod")).is_empty());
    }

    #[test]
    fn test_empty_selector_returns_everything_in_order() {
        let bundle = Bundle::new(vec![ns("z"), rc("a"), ns("m")]);
        let all = bundle.filter(&Selector::new());
        assert_eq!(names(&all), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_filter_skips_unnamed_documents() {
        let bundle = Bundle::new(vec![ns("a"), ns(""), ns("b")]);
        assert_eq!(bundle.filter(&Selector::new()).len(), 2);
    }

    #[test]
    fn test_select_by_index() {
        let bundle = Bundle::new(vec![rc("a"), ns("x"), rc("b"), rc("c")]);
        let selector = Selector::new().kind("ReplicationController");
        let all = bundle.filter(&selector);

        for (i, expected) in all.iter().enumerate() {
            assert_eq!(bundle.select_by_index(&selector, i).unwrap(), *expected);
        }

        match bundle.select_by_index(&selector, 3) {
            Err(DocumentError::IndexOutOfRange { index, matched, .. }) => {
                assert_eq!(index, 3);
                assert_eq!(matched, 3);
            }
            other => panic!("Expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_select_by_index_with_no_matches_is_bounds_error() {
        let bundle = Bundle::new(vec![ns("x")]);
        assert!(matches!(
            bundle.select_by_index(&Selector::new().kind("Pod"), 0),
            Err(DocumentError::IndexOutOfRange { matched: 0, .. })
        ));
    }

    #[test]
    fn test_select_dispatches_on_index() {
        let bundle = Bundle::new(vec![rc("a"), rc("b")]);
        let selector = Selector::new().kind("ReplicationController");
        assert!(matches!(
            bundle.select(&selector),
            Err(DocumentError::MultiDocsFound { .. })
        ));
        assert_eq!(bundle.select(&selector.clone().index(1)).unwrap().name(), "b");
    }

    #[test]
    fn test_filtered_and_merge_do_not_mutate() {
        let left = Bundle::new(vec![rc("a"), ns("x")]);
        let right = Bundle::new(vec![ns("y")]);

        let only_ns = left.filtered(&Selector::new().kind("Namespace"));
        assert_eq!(only_ns.len(), 1);
        assert_eq!(left.len(), 2);

        let merged = left.merge(&right);
        let merged_names: Vec<&str> = merged.iter().map(Document::name).collect();
        assert_eq!(merged_names, vec!["a", "x", "y"]);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 1);
    }

    #[test]
    fn test_derived_bundles_share_documents() {
        let bundle = Bundle::new(vec![ns("x")]);
        let derived = bundle.filtered(&Selector::new());
        assert!(Arc::ptr_eq(&bundle.docs[0], &derived.docs[0]));
    }

    #[test]
    fn test_collect_and_iterate() {
        let bundle: Bundle = vec![ns("a"), ns("b")].into_iter().collect();
        let mut seen = Vec::new();
        for doc in &bundle {
            seen.push(doc.name().to_string());
        }
        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(bundle.get(1).map(Document::name), Some("b"));
        assert!(bundle.get(2).is_none());
    }
}
