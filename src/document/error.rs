//! Error types for document selection, data access and validation.

use thiserror::Error;

use crate::bundle::selector::Selector;

/// Errors surfaced by bundle queries, key-path lookups and validation.
///
/// Every variant carries the context needed to render a diagnostic; callers
/// match on the variant rather than on the message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    /// A selector matched zero documents where exactly one was required.
    #[error("document filtered by selector {selector} found no documents")]
    DocNotFound { selector: Selector },

    /// A selector matched more than one document where exactly one was required.
    #[error("document filtered by selector {selector} found more than one document")]
    MultiDocsFound { selector: Selector, count: usize },

    /// A positional selection asked for an index past the end of the matches.
    #[error("document index {index} out of range for selector {selector}: {matched} matched")]
    IndexOutOfRange {
        selector: Selector,
        index: usize,
        matched: usize,
    },

    /// A key-path traversal failed partway through a document's data tree.
    /// `key` is the full requested path.
    #[error("document {doc_name:?} cannot retrieve data key {key:?}")]
    DocumentDataKeyNotFound { doc_name: String, key: String },

    /// A document failed structural validation.
    #[error("document {doc_name:?} is malformed: {message:?}")]
    DocumentMalformed { doc_name: String, message: String },

    /// A textual `key=value` selector could not be parsed.
    #[error("invalid selector {input:?}: {message}")]
    InvalidSelector { input: String, message: String },

    /// A textual key path could not be parsed.
    #[error("invalid key path {path:?}: {message}")]
    InvalidKeyPath { path: String, message: String },
}

impl DocumentError {
    pub(crate) fn malformed(doc_name: &str, message: impl Into<String>) -> Self {
        DocumentError::DocumentMalformed {
            doc_name: doc_name.to_string(),
            message: message.into(),
        }
    }
}
