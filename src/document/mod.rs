//! Documents: identity metadata plus a data tree.
//!
//! - [`value`] - the tagged-variant data tree
//! - [`manifest`] - the [`Document`] value object
//! - [`path`] / [`accessor`] - key paths and lookups into the data tree
//! - [`schema`] / [`validator`] - structural validation
//! - [`parser`] / [`render`] - YAML in, YAML or JSON out
//! - [`error`] - the error vocabulary shared with bundle queries

pub mod accessor;
pub mod error;
pub mod manifest;
pub mod parser;
pub mod path;
pub mod render;
pub mod schema;
pub mod validator;
pub mod value;

pub use error::DocumentError;
pub use manifest::{Document, DocumentId};
pub use path::{KeyPath, Segment};
pub use schema::Schema;
pub use validator::Validator;
pub use value::{Number, Value};
