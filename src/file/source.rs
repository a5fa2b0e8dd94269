//! Where manifest text comes from.
//!
//! The loader reads raw YAML through the [`ManifestSource`] trait, so it
//! can be driven by files, stdin, or in-memory text in tests without
//! touching the filesystem.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A named supplier of manifest text.
pub trait ManifestSource {
    /// Human-readable origin, used in diagnostics.
    fn name(&self) -> String;

    /// Reads the full manifest text.
    fn read_text(&self) -> Result<String>;
}

/// A manifest file on disk. Files ending in `.gz` are decompressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source for the file at `path`. Nothing is read until
    /// [`ManifestSource::read_text`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_text(&self) -> Result<String> {
        if is_gzipped(&self.path) {
            read_gzipped_file(&self.path)
        } else {
            fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read file {}", self.path.display()))
        }
    }
}

/// Standard input. Gzip input is detected by its magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

impl ManifestSource for StdinSource {
    fn name(&self) -> String {
        "<stdin>".to_string()
    }

    fn read_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read from stdin")?;
        bytes_to_text(buffer)
    }
}

/// Manifest text held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySource {
    name: String,
    text: String,
}

impl MemorySource {
    /// Creates a source named `name` that yields `text`.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl ManifestSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Whether a path names a gzip file.
pub(crate) fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false)
}

fn read_gzipped_file(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to open gzipped file {}", path.display()))?;
    decompress_gzip_bytes(&bytes)
        .with_context(|| format!("Failed to decompress {}", path.display()))
}

/// Decodes raw bytes, decompressing first when they carry the gzip magic
/// bytes (0x1f 0x8b).
pub(crate) fn bytes_to_text(bytes: Vec<u8>) -> Result<String> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&bytes)
    } else {
        String::from_utf8(bytes).context("Invalid UTF-8 in manifest input")
    }
}

fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzip data (file may be corrupted or not UTF-8)")?;
    Ok(content)
}
