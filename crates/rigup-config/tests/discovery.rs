//! Discovery plus merge, end to end at the configuration level.

use rigup_config::{CompilerOptions, ConfigDiscovery, Layer, Source, merge_layers};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn merged_options(dir: &TempDir) -> CompilerOptions {
    let mut layers = vec![
        Layer::new(
            Source::Defaults,
            CompilerOptions::defaults().to_value().unwrap(),
        )
        .unwrap(),
    ];
    layers.extend(ConfigDiscovery::new(dir.path()).layers().unwrap());
    CompilerOptions::from_value(merge_layers(&layers)).unwrap()
}

#[test]
fn empty_directory_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let options = merged_options(&dir);

    assert!(options.bail);
    assert!(options.entry.is_empty());
    assert!(options.uses_memory_channel());
}

#[test]
fn manifest_output_path_reaches_merged_options() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{
            "name": "fixture",
            "rigup": {"output": {"path": "/dist"}}
        }"#,
    )
    .unwrap();

    let options = merged_options(&dir);
    assert_eq!(options.output.path, Some(PathBuf::from("/dist")));
    assert!(!options.uses_memory_channel());
}

#[test]
fn config_file_overrides_manifest() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"rigup": {"bail": true, "entry": ["manifest.js"]}}"#,
    )
    .unwrap();
    fs::write(dir.path().join("rigup.toml"), "entry = [\"file.js\"]\n").unwrap();

    let options = merged_options(&dir);
    assert!(options.bail);
    assert_eq!(options.entry, vec!["file.js"]);
}

#[test]
fn config_file_output_merges_with_manifest_output() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"rigup": {"output": {"path": "/dist"}}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("rigup.toml"),
        "[output]\nfilename = \"bundle.js\"\n",
    )
    .unwrap();

    let options = merged_options(&dir);
    assert_eq!(options.output.path, Some(PathBuf::from("/dist")));
    assert_eq!(options.output.filename.as_deref(), Some("bundle.js"));
}

#[test]
fn plugins_from_both_project_layers_concatenate() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"rigup": {"plugins": [{"plugin": "manifest-plugin"}]}}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("rigup.toml"),
        "[[plugins]]\nplugin = \"file-plugin\"\n",
    )
    .unwrap();

    let options = merged_options(&dir);
    let names: Vec<&str> = options.plugins.iter().map(|p| p.plugin.as_str()).collect();
    assert_eq!(names, ["manifest-plugin", "file-plugin"]);
}
