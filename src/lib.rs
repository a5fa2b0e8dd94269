//! BundleQuill - selector queries over bundles of configuration documents.
//!
//! A [`Bundle`](bundle::Bundle) is an ordered, immutable collection of
//! [`Document`](document::Document)s. Callers filter it with
//! [`Selector`](bundle::Selector)s and state how many matches they expect,
//! read values out of matched documents with key paths, and validate
//! documents against an explicit [`Schema`](document::Schema).
//!
//! ```
//! use bundlequill::bundle::Selector;
//! use bundlequill::document::accessor;
//! use bundlequill::file::loader::load_bundle;
//! use bundlequill::file::source::MemorySource;
//!
//! let yaml = "\
//! apiVersion: v1
//! kind: ReplicationController
//! metadata:
//!   name: test-rc
//! spec:
//!   replicas: 2
//! ";
//! let bundle = load_bundle(&[MemorySource::new("inline", yaml)]).unwrap();
//! let rc = bundle.select_one(&Selector::new().kind("ReplicationController")).unwrap();
//! let replicas = accessor::get_path(rc, "spec.replicas").unwrap();
//! assert_eq!(replicas.as_i64(), Some(2));
//! ```

pub mod bundle;
pub mod cli;
pub mod config;
pub mod document;
pub mod file;
