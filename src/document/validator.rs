//! Structural validation of documents.
//!
//! A document is well-formed when it has a kind and a version, a name
//! (unless it is a placeholder), and every data key its [`Schema`] requires
//! for its kind. Validation never mutates the document and reports the first
//! unmet requirement as [`DocumentError::DocumentMalformed`].

use crate::bundle::Bundle;

use super::accessor;
use super::error::DocumentError;
use super::manifest::Document;
use super::schema::Schema;

/// Annotation marking a template placeholder that may lack a name.
pub const PLACEHOLDER_ANNOTATION: &str = "bundlequill.io/placeholder";

/// Checks documents against a schema.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s Schema,
}

impl<'s> Validator<'s> {
    /// Creates a validator that checks documents against `schema`.
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Validates one document.
    ///
    /// # Example
    ///
    /// ```
    /// use bundlequill::document::{Document, Schema, Validator};
    ///
    /// let schema = Schema::builtin();
    /// let validator = Validator::new(&schema);
    ///
    /// let deploy = Document::new("apps", "v1", "Deployment", "web");
    /// let err = validator.validate(&deploy).unwrap_err();
    /// assert!(err.to_string().contains("spec"));
    /// ```
    pub fn validate(&self, doc: &Document) -> Result<(), DocumentError> {
        if doc.kind().is_empty() {
            return Err(DocumentError::malformed(doc.name(), "missing kind"));
        }
        if doc.version().is_empty() {
            return Err(DocumentError::malformed(
                doc.name(),
                format!("{} is missing apiVersion", doc.kind()),
            ));
        }
        if !doc.is_materialized() && !is_placeholder(doc) {
            return Err(DocumentError::malformed(
                doc.name(),
                format!("{} is missing metadata.name", doc.kind()),
            ));
        }

        for path in self.schema.required_keys(doc) {
            if accessor::get(doc, path).is_err() {
                return Err(DocumentError::malformed(
                    doc.name(),
                    format!("{} requires data key {}", doc.kind(), path),
                ));
            }
        }
        Ok(())
    }

    /// Validates every document and returns all violations, in bundle order.
    pub fn validate_all(&self, bundle: &Bundle) -> Vec<DocumentError> {
        bundle
            .iter()
            .filter_map(|doc| self.validate(doc).err())
            .collect()
    }

    /// Validates every document, stopping at the first violation.
    pub fn validate_bundle(&self, bundle: &Bundle) -> Result<(), DocumentError> {
        bundle.iter().try_for_each(|doc| self.validate(doc))
    }
}

fn is_placeholder(doc: &Document) -> bool {
    doc.annotation(PLACEHOLDER_ANNOTATION)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
