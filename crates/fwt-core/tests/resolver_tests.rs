//! Path resolution tests against a temporary data root

use fwt_core::{DataRoot, Error, PathResolver, ProjectIdentity, ResolveOptions};
use fwt_fs::{NormalizedPath, ProjectKind};
use fwt_test_utils::TestDataRoot;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn setup() -> (TestDataRoot, PathResolver) {
    let data = TestDataRoot::new();
    data.add_world("acme");
    let resolver = PathResolver::new(DataRoot::new(data.data_dir()).unwrap());
    (data, resolver)
}

#[test]
fn discover_finds_data_next_to_config() {
    let data = TestDataRoot::new();
    let world = data.add_world("acme");

    let root = DataRoot::discover(world.join("img")).unwrap();
    assert_eq!(root.path(), &NormalizedPath::new(data.data_dir()));
}

#[test]
fn discover_fails_without_config() {
    let temp = tempfile::TempDir::new().unwrap();
    let result = DataRoot::discover(temp.path());
    assert!(matches!(result, Err(Error::DataRootNotFound { .. })));
}

#[test]
fn resolve_project_member() {
    let (data, resolver) = setup();
    let file = data.write_asset("worlds/acme/img/a.png", b"png");

    let reference = resolver
        .resolve(&file, ResolveOptions::project().existing())
        .unwrap();

    assert_eq!(
        reference.data_relative().unwrap().as_str(),
        "worlds/acme/img/a.png"
    );
    assert_eq!(reference.project_relative().unwrap().as_str(), "img/a.png");
    let project = reference.project().unwrap();
    assert_eq!(project.kind, ProjectKind::World);
    assert_eq!(project.name, "acme");
    assert!(!project.name_mismatch());
    assert!(!reference.is_symlinked());
}

#[test]
fn nearest_manifest_wins() {
    let (data, resolver) = setup();
    data.add_project("module", "worlds/acme/modules/inner", "inner");
    let file = data.write_asset("worlds/acme/modules/inner/icon.svg", b"<svg/>");

    let reference = resolver.resolve(&file, ResolveOptions::project()).unwrap();
    let project = reference.project().unwrap();
    assert_eq!(project.kind, ProjectKind::Module);
    assert_eq!(project.name, "inner");
    assert_eq!(reference.project_relative().unwrap().as_str(), "icon.svg");
}

#[test]
fn name_mismatch_is_reported() {
    let data = TestDataRoot::new();
    let dir = data.add_project("world", "worlds/acme-old", "acme");

    let identity = ProjectIdentity::find(&NormalizedPath::new(&dir))
        .unwrap()
        .unwrap();
    assert!(identity.name_mismatch());
    assert_eq!(identity.virtual_root().as_str(), "worlds/acme");
}

#[test]
fn require_project_rejects_plain_directories() {
    let (data, resolver) = setup();
    let file = data.write_asset("assets/shared/a.png", b"png");

    let result = resolver.resolve(&file, ResolveOptions::project());
    assert!(matches!(result, Err(Error::NotAProject { .. })));

    let reference = resolver.resolve(&file, ResolveOptions::default()).unwrap();
    assert!(!reference.is_project_member());
    assert_eq!(
        reference.data_relative().unwrap().as_str(),
        "assets/shared/a.png"
    );
}

#[test]
fn require_exists_rejects_missing_paths() {
    let (data, resolver) = setup();
    let missing = data.data_dir().join("worlds/acme/missing.png");

    let result = resolver.resolve(&missing, ResolveOptions::project().existing());
    assert!(matches!(result, Err(Error::PathNotFound { .. })));
    assert!(resolver.resolve(&missing, ResolveOptions::project()).is_ok());
}

#[test]
fn outside_without_project_fails_unless_best_effort() {
    let (data, resolver) = setup();
    let outside = data.outside_dir("elsewhere").join("a.png");

    let result = resolver.resolve(&outside, ResolveOptions::default());
    assert!(matches!(result, Err(Error::OutsideDataRoot { .. })));

    let reference = resolver
        .resolve(&outside, ResolveOptions::default().best_effort())
        .unwrap();
    assert!(reference.data_relative().is_none());
}

#[cfg(unix)]
#[test]
fn symlinked_project_maps_into_data_root() {
    let data = TestDataRoot::new();
    let real = data.outside_dir("disk2/acme-src");
    fwt_test_utils::data_root::write_manifest(&real, "world", "acme");
    std::fs::create_dir_all(data.data_dir().join("worlds")).unwrap();
    std::os::unix::fs::symlink(&real, data.data_dir().join("worlds/acme")).unwrap();
    std::fs::write(real.join("token.png"), b"png").unwrap();
    let resolver = PathResolver::new(DataRoot::new(data.data_dir()).unwrap());

    // Through the real location: outside the data root, mapped back by name.
    let reference = resolver
        .resolve(real.join("token.png"), ResolveOptions::project())
        .unwrap();
    assert_eq!(
        reference.data_relative().unwrap().as_str(),
        "worlds/acme/token.png"
    );
    assert_eq!(reference.project_relative().unwrap().as_str(), "token.png");

    // Through the link: the symlinked spelling is preserved.
    let linked = resolver
        .resolve(
            data.data_dir().join("worlds/acme/token.png"),
            ResolveOptions::project(),
        )
        .unwrap();
    assert!(linked.is_symlinked());
    assert!(linked.absolute().starts_with(&NormalizedPath::new(data.data_dir())));
    assert_eq!(linked.data_relative(), reference.data_relative());
}

#[test]
fn derived_references_keep_views_consistent() {
    let (data, resolver) = setup();
    let root = resolver
        .resolve(data.data_dir().join("worlds/acme"), ResolveOptions::project())
        .unwrap();

    let child = root.join("img/a.png");
    assert_eq!(child.project_relative().unwrap().as_str(), "img/a.png");
    assert_eq!(
        child.data_relative().unwrap().as_str(),
        "worlds/acme/img/a.png"
    );

    let moved = child
        .with_project_relative(&NormalizedPath::new("tokens/hero.png"))
        .unwrap();
    assert_eq!(
        moved.data_relative().unwrap().as_str(),
        "worlds/acme/tokens/hero.png"
    );
    assert_eq!(
        moved.absolute(),
        &NormalizedPath::new(data.data_dir()).join("worlds/acme/tokens/hero.png")
    );
}

#[test]
fn snapshot_project_reference() {
    let (data, resolver) = setup();
    let file = data.write_asset("worlds/acme/img/a.png", b"png");
    let reference = resolver.resolve(&file, ResolveOptions::project()).unwrap();

    let data_dir = NormalizedPath::new(data.data_dir());
    let sanitized = format!("{:?}", reference).replace(data_dir.as_str(), "[DATA]");

    insta::assert_snapshot!(sanitized, @r###"PathReference { absolute: NormalizedPath { inner: "[DATA]/worlds/acme/img/a.png" }, data_relative: Some(NormalizedPath { inner: "worlds/acme/img/a.png" }), project: Some(ProjectIdentity { kind: World, name: "acme", title: Some("acme (test)"), root: NormalizedPath { inner: "[DATA]/worlds/acme" } }), project_relative: Some(NormalizedPath { inner: "img/a.png" }), project_data_root: Some(NormalizedPath { inner: "worlds/acme" }) }"###);
}

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_ ()-]{1,10}".prop_filter("not a dot segment", |s| {
        s.trim() == s && !s.is_empty()
    })
}

proptest! {
    #[test]
    fn resolve_round_trips(segments in proptest::collection::vec(segment(), 1..5)) {
        let (data, resolver) = setup();
        let relative = segments.join("/");
        let raw = data.data_dir().join("worlds/acme").join(&relative);

        let reference = resolver.resolve(&raw, ResolveOptions::project()).unwrap();
        let data_root = resolver.data_root().path();

        prop_assert_eq!(
            &data_root.join(reference.data_relative().unwrap().as_str()),
            reference.absolute()
        );
        prop_assert_eq!(
            &reference.project_root().unwrap().join(reference.project_relative().unwrap().as_str()),
            reference.absolute()
        );
        prop_assert_eq!(reference.project_relative().unwrap().as_str(), relative.as_str());
    }
}
