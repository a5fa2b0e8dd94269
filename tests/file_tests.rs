//! Integration tests for manifest loading from disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bundlequill::bundle::Selector;
use bundlequill::file::loader::{
    load_bundle, load_bundle_dyn, load_manifest_file, manifest_files_in, resolve_sources,
};
use bundlequill::file::source::{FileSource, ManifestSource};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::{NamedTempFile, TempDir};

fn namespace(name: &str) -> String {
    format!("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: {}\n", name)
}

fn write_gz(path: &Path, text: &str) {
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn test_load_multi_document_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(
        temp_file,
        "{}---\n{}---\n{}",
        namespace("a"),
        namespace("b"),
        namespace("c")
    )
    .unwrap();

    let docs = load_manifest_file(temp_file.path()).unwrap();
    let names: Vec<&str> = docs.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_load_gzipped_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundle.yaml.gz");
    write_gz(&path, &format!("{}---\n{}", namespace("x"), namespace("y")));

    let docs = load_manifest_file(&path).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].name(), "y");
}

#[test]
fn test_load_missing_file_names_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = load_manifest_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.yaml"));
}

#[test]
fn test_parse_error_names_source() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "kind: [unclosed").unwrap();

    let source = FileSource::new(temp_file.path());
    let err = load_bundle(&[source.clone()]).unwrap_err();
    assert!(format!("{:#}", err).contains(&source.name()));
}

#[test]
fn test_bundle_preserves_source_order() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.yaml");
    let second = dir.path().join("second.yaml");
    fs::write(&first, namespace("one")).unwrap();
    fs::write(&second, format!("{}---\n{}", namespace("two"), namespace("three"))).unwrap();

    let bundle = load_bundle(&[FileSource::new(&second), FileSource::new(&first)]).unwrap();
    let names: Vec<&str> = bundle.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["two", "three", "one"]);
}

#[test]
fn test_directory_walk_sorted_and_filtered() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(dir.path().join("b.yaml"), namespace("b")).unwrap();
    fs::write(dir.path().join("a.yml"), namespace("a")).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a manifest").unwrap();
    fs::write(nested.join("c.yaml"), namespace("c")).unwrap();
    write_gz(&dir.path().join("d.yaml.gz"), &namespace("d"));

    let names = |files: Vec<PathBuf>| -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    };

    assert_eq!(
        names(manifest_files_in(dir.path(), true).unwrap()),
        vec!["a.yml", "b.yaml", "d.yaml.gz", "nested/c.yaml"]
    );
    assert_eq!(
        names(manifest_files_in(dir.path(), false).unwrap()),
        vec!["a.yml", "b.yaml", "nested/c.yaml"]
    );
}

#[test]
fn test_resolve_sources_mixes_files_and_directories() {
    let dir = TempDir::new().unwrap();
    let manifests = dir.path().join("manifests");
    fs::create_dir(&manifests).unwrap();
    fs::write(manifests.join("a.yaml"), namespace("a")).unwrap();
    fs::write(manifests.join("b.yaml"), namespace("b")).unwrap();
    let single = dir.path().join("single.yaml");
    fs::write(&single, namespace("single")).unwrap();

    let sources = resolve_sources(&[single.clone(), manifests], true).unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].name(), single.display().to_string());

    let bundle = load_bundle_dyn(&sources).unwrap();
    let names: Vec<&str> = bundle.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["single", "a", "b"]);
    assert_eq!(
        bundle
            .select_one(&Selector::new().kind("Namespace").name("b"))
            .unwrap()
            .name(),
        "b"
    );
}

#[test]
fn test_resolve_sources_defaults_to_stdin() {
    let sources = resolve_sources(&[], true).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name(), "<stdin>");

    let dash = resolve_sources(&[PathBuf::from("-")], true).unwrap();
    assert_eq!(dash[0].name(), "<stdin>");
}
