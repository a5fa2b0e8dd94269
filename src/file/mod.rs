//! Manifest input.
//!
//! This module reads manifest text from files, directories, gzip archives or
//! stdin and parses it into a [`Bundle`](crate::bundle::Bundle).

pub mod loader;
pub mod source;
