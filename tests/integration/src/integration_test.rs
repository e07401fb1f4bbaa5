//! End-to-end integration test for the vertical slice
//!
//! This test exercises the complete flow: config loading -> preset merge ->
//! scan -> dedup plan -> store rewrite -> trash.

use assert_fs::prelude::*;
use fwt_core::{
    AppConfig, DataRoot, PathResolver, Preset, RewriteOptions, ToolOptions, Workflow,
};
use fwt_fs::{ConfigFile, NormalizedPath};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

/// Foundry layout built with assert_fs: `Config/options.json` next to `Data/`.
fn setup_data_root() -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("Config/options.json").write_str("{}").unwrap();
    temp.child("Data/worlds/acme/world.json")
        .write_str(r#"{"name": "acme", "title": "Acme"}"#)
        .unwrap();
    temp.child("Data/worlds/acme/img/a.png")
        .write_binary(b"identical")
        .unwrap();
    temp.child("Data/worlds/acme/img/a(1).png")
        .write_binary(b"identical")
        .unwrap();
    temp.child("Data/worlds/acme/cache/a.png")
        .write_binary(b"identical")
        .unwrap();
    temp.child("Data/worlds/acme/data/actors.db")
        .write_str("{\"_id\":\"a1\",\"img\":\"img/a(1).png\"}\n")
        .unwrap();
    temp
}

fn write_presets(temp: &assert_fs::TempDir) -> NormalizedPath {
    let path = NormalizedPath::new(temp.child("fwt/config.json").path());
    let mut config = AppConfig::default();
    config.presets.insert(
        "art".to_string(),
        Preset {
            command: vec!["dedup".to_string()],
            description: "Art duplicates".to_string(),
            preferred: vec![r"a\.png$".to_string()],
            exclude: vec!["cache".to_string()],
            by_content: Some(true),
            ..Preset::default()
        },
    );
    ConfigFile::new(path.clone()).unwrap().save(&config).unwrap();
    path
}

#[test]
fn test_preset_driven_dedup() {
    let temp = setup_data_root();
    let config_path = write_presets(&temp);

    // Configuration round-trips through the store.
    let config = AppConfig::load(&config_path).unwrap();
    let preset = config.preset_for("art", "dedup").unwrap();
    let options = ToolOptions {
        extensions: vec!["png".to_string()],
        ..ToolOptions::default()
    }
    .merge(&ToolOptions::from(preset));
    assert_eq!(options.exclude, vec!["cache"]);

    // The data root is discovered from inside the project.
    let world = temp.child("Data/worlds/acme");
    let data_root = DataRoot::discover(world.path()).unwrap();
    let resolver = PathResolver::new(data_root);

    let plan = Workflow::new(&resolver).dedup(world.path(), &options).unwrap();
    assert_eq!(plan.sets().len(), 1);
    assert_eq!(plan.scan_report().unwrap().files, 2);

    let report = plan.apply(&resolver, RewriteOptions::default()).unwrap();
    assert!(report.is_success());

    world.child("img/a.png").assert(predicate::path::exists());
    world.child("img/a(1).png").assert(predicate::path::missing());
    world.child("cache/a.png").assert(predicate::path::exists());
    world
        .child("data/actors.db")
        .assert("{\"_id\":\"a1\",\"img\":\"img/a.png\"}\n");
    world
        .child("Trash")
        .assert(predicate::path::is_dir());
}

#[test]
fn test_preset_command_mismatch() {
    let temp = setup_data_root();
    let config_path = write_presets(&temp);
    let config = AppConfig::load(&config_path).unwrap();

    assert!(matches!(
        config.preset_for("art", "rename-all"),
        Err(fwt_core::Error::PresetCommandMismatch { .. })
    ));
    assert!(matches!(
        config.preset_for("missing", "dedup"),
        Err(fwt_core::Error::PresetNotFound { .. })
    ));
}
