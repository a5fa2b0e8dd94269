//! Manifest loading.
//!
//! This module turns manifest sources into a [`Bundle`]: each source is read,
//! split into YAML documents and parsed into [`Document`]s, and the results
//! are concatenated in source order.
//!
//! # Example
//!
//! ```
//! use bundlequill::file::loader::load_bundle;
//! use bundlequill::file::source::MemorySource;
//!
//! let source = MemorySource::new("inline", "kind: Namespace\nmetadata:\n  name: test\n");
//! let bundle = load_bundle(&[source]).unwrap();
//! assert_eq!(bundle.len(), 1);
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

use super::source::{FileSource, ManifestSource, StdinSource};
use crate::bundle::Bundle;
use crate::document::parser::parse_documents;
use crate::document::Document;

/// Reads and parses one source.
pub fn load_documents(source: &dyn ManifestSource) -> Result<Vec<Document>> {
    let name = source.name();
    let text = source.read_text()?;
    let docs = parse_documents(&text).with_context(|| format!("Failed to parse {}", name))?;
    debug!(source = %name, documents = docs.len(), "loaded manifests");
    Ok(docs)
}

/// Loads every source, in order, into one bundle.
pub fn load_bundle<S: ManifestSource>(sources: &[S]) -> Result<Bundle> {
    let mut docs = Vec::new();
    for source in sources {
        docs.extend(load_documents(source)?);
    }
    Ok(Bundle::new(docs))
}

/// Like [`load_bundle`], for a mixed list of sources.
pub fn load_bundle_dyn(sources: &[Box<dyn ManifestSource>]) -> Result<Bundle> {
    let mut docs = Vec::new();
    for source in sources {
        docs.extend(load_documents(source.as_ref())?);
    }
    Ok(Bundle::new(docs))
}

/// Loads a single manifest file.
pub fn load_manifest_file<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    load_documents(&FileSource::new(path.as_ref()))
}

/// Loads manifests from standard input.
pub fn load_manifests_from_stdin() -> Result<Vec<Document>> {
    load_documents(&StdinSource)
}

/// Expands command-line paths into sources.
///
/// `-` is stdin, a directory contributes every manifest file beneath it in
/// sorted order, anything else is a single file. An empty list means stdin.
pub fn resolve_sources(paths: &[PathBuf], include_gzip: bool) -> Result<Vec<Box<dyn ManifestSource>>> {
    if paths.is_empty() {
        return Ok(vec![Box::new(StdinSource)]);
    }

    let mut sources: Vec<Box<dyn ManifestSource>> = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            sources.push(Box::new(StdinSource));
        } else if path.is_dir() {
            for file in manifest_files_in(path, include_gzip)? {
                sources.push(Box::new(FileSource::new(file)));
            }
        } else {
            sources.push(Box::new(FileSource::new(path.clone())));
        }
    }
    Ok(sources)
}

/// Manifest files below `dir`, sorted by path.
pub fn manifest_files_in(dir: &Path, include_gzip: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && is_manifest_file(entry.path(), include_gzip) {
            files.push(entry.into_path());
        }
    }
    debug!(dir = %dir.display(), files = files.len(), "found manifest files");
    Ok(files)
}

/// Checks for `.yaml`/`.yml`, optionally followed by `.gz`.
fn is_manifest_file(path: &Path, include_gzip: bool) -> bool {
    let name = path.to_string_lossy();
    let base = match name.strip_suffix(".gz") {
        Some(stripped) if include_gzip => stripped,
        Some(_) => return false,
        None => &*name,
    };
    base.ends_with(".yaml") || base.ends_with(".yml")
}
