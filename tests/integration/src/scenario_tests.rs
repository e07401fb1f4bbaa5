//! Multi-step scenarios across fwt-fs, fwt-core and fwt-test-utils
//!
//! Each test runs several workflows against one data root the way a user
//! would tidy up a world over a session.

use fwt_core::{
    DataRoot, PathResolver, ProjectStore, RewriteOptions, ToolOptions, Workflow,
};
use fwt_test_utils::TestDataRoot;
use pretty_assertions::assert_eq;
use serde_json::Value;

fn setup() -> (TestDataRoot, PathResolver) {
    let data = TestDataRoot::new();
    data.add_world("acme");
    let resolver = PathResolver::new(DataRoot::new(data.data_dir()).unwrap());
    (data, resolver)
}

fn by_content() -> ToolOptions {
    ToolOptions {
        by_content: Some(true),
        ..ToolOptions::default()
    }
}

/// `img` field of record `id` in `store` (relative to `Data`).
fn img_of(resolver: &PathResolver, data: &TestDataRoot, store: &str, id: &str) -> String {
    let stores = ProjectStore::new(resolver)
        .stores_at(data.data_dir().join(store))
        .unwrap();
    let found = stores[0].find_by_id(id).unwrap();
    match &found[0]["img"] {
        Value::String(s) => s.clone(),
        other => panic!("record {} has no img string: {:?}", id, other),
    }
}

#[test]
fn dedup_then_lowercase_keeps_references_intact() {
    let (data, resolver) = setup();
    let world = data.data_dir().join("worlds/acme");
    data.write_asset("worlds/acme/Art/Hero.png", b"hero");
    data.write_asset("worlds/acme/Art/Hero copy.png", b"hero");
    data.write_records(
        "worlds/acme/data/actors.db",
        &[
            r#"{"_id":"a1","img":"Art/Hero copy.png"}"#,
            r#"{"_id":"a2","img":"worlds/acme/Art/Hero.png"}"#,
        ],
    );

    let dedup = ToolOptions {
        preferred: vec![r"Hero\.png$".to_string()],
        ..by_content()
    };
    let plan = Workflow::new(&resolver).dedup(&world, &dedup).unwrap();
    plan.apply(&resolver, RewriteOptions::default()).unwrap();
    assert_eq!(
        img_of(&resolver, &data, "worlds/acme/data/actors.db", "a1"),
        "Art/Hero.png"
    );

    let lowercase = ToolOptions {
        lowercase: Some(true),
        replace: vec![" =_".to_string()],
        ..ToolOptions::default()
    };
    let plan = Workflow::new(&resolver).rename_all(&world, &lowercase).unwrap();
    plan.apply(&resolver, RewriteOptions::default()).unwrap();

    data.assert_exists("worlds/acme/art/hero.png");
    assert_eq!(
        img_of(&resolver, &data, "worlds/acme/data/actors.db", "a1"),
        "art/hero.png"
    );
    assert_eq!(
        img_of(&resolver, &data, "worlds/acme/data/actors.db", "a2"),
        "worlds/acme/art/hero.png"
    );
}

#[test]
fn second_run_finds_nothing_to_do() {
    let (data, resolver) = setup();
    let world = data.data_dir().join("worlds/acme");
    data.write_asset("worlds/acme/a.png", b"same");
    data.write_asset("worlds/acme/b.png", b"same");
    data.write_records("worlds/acme/data/items.db", &[r#"{"_id":"i1","img":"b.png"}"#]);

    let first = Workflow::new(&resolver).dedup(&world, &by_content()).unwrap();
    let report = first.apply(&resolver, RewriteOptions::default()).unwrap();
    assert_eq!(report.trashed.len(), 1);
    let after_first = data.read("worlds/acme/data/items.db");

    let second = Workflow::new(&resolver).dedup(&world, &by_content()).unwrap();
    assert!(second.is_empty());
    let report = second.apply(&resolver, RewriteOptions::default()).unwrap();

    assert!(report.rewrite.rewritten.is_empty());
    assert!(report.trashed.is_empty());
    assert_eq!(data.read("worlds/acme/data/items.db"), after_first);
}

#[test]
fn rename_into_another_project_uses_data_paths() {
    let (data, resolver) = setup();
    data.add_project("module", "modules/art", "art");
    let source = data.write_asset("worlds/acme/token.png", b"token");
    data.write_records(
        "worlds/acme/data/actors.db",
        &[r#"{"_id":"a1","img":"worlds/acme/token.png"}"#],
    );

    let plan = Workflow::new(&resolver)
        .rename(
            &source,
            data.data_dir().join("modules/art/tokens/hero.png"),
            false,
        )
        .unwrap();
    let entry = &plan.queue().entries()[0];
    assert_eq!(entry.old.as_str(), "worlds/acme/token.png");
    assert_eq!(entry.new.as_str(), "modules/art/tokens/hero.png");

    plan.apply(&resolver, RewriteOptions::default()).unwrap();

    data.assert_exists("modules/art/tokens/hero.png");
    assert_eq!(
        img_of(&resolver, &data, "worlds/acme/data/actors.db", "a1"),
        "modules/art/tokens/hero.png"
    );
}

#[test]
fn trash_preserves_everything_removed() {
    let (data, resolver) = setup();
    let world = data.data_dir().join("worlds/acme");
    data.write_asset("worlds/acme/img/a.png", b"same");
    data.write_asset("worlds/acme/img/b.png", b"same");
    data.write_asset("worlds/acme/img/c.png", b"same");
    let original = data.write_records(
        "worlds/acme/packs/items.db",
        &[r#"{"_id":"i1","img":"img/c.png"}"#],
    );
    let original = std::fs::read_to_string(original).unwrap();

    let plan = Workflow::new(&resolver).dedup(&world, &by_content()).unwrap();
    let trash = plan.project().trash().root().clone();
    plan.apply(&resolver, RewriteOptions::default()).unwrap();

    let trash = trash.to_native();
    assert!(trash.join("img/b.png").exists());
    assert!(trash.join("img/c.png").exists());
    assert_eq!(
        std::fs::read_to_string(trash.join("packs/items.db")).unwrap(),
        original
    );
}
