use assert_fs::prelude::*;
use fwt_fs::{Error, NormalizedPath, io};
use predicates::prelude::*;
use std::fs;

fn np(p: &std::path::Path) -> NormalizedPath {
    NormalizedPath::new(p)
}

#[test]
fn test_write_atomic_creates_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let target = temp.child("nested/config.json");

    io::write_atomic(&np(target.path()), b"{}").unwrap();

    target.assert("{}");
}

#[test]
fn test_write_atomic_leaves_no_temp_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    io::write_atomic(&np(&temp.path().join("a.txt")), b"x").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_move_creates_intermediate_directories() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("token.png");
    src.write_binary(b"png").unwrap();
    let dst = temp.child("tokens/heroes/hero.png");

    io::move_no_clobber(&np(src.path()), &np(dst.path())).unwrap();

    src.assert(predicate::path::missing());
    dst.assert(predicate::path::is_file());
    dst.assert("png");
}

#[test]
fn test_move_refuses_existing_target() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("a.png");
    src.write_str("source").unwrap();
    let dst = temp.child("b.png");
    dst.write_str("occupied").unwrap();

    let err = io::move_no_clobber(&np(src.path()), &np(dst.path())).unwrap_err();

    assert!(matches!(err, Error::TargetExists { .. }));
    src.assert("source");
    dst.assert("occupied");
}

#[test]
fn test_move_missing_source_is_io_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let err = io::move_no_clobber(
        &np(&temp.path().join("missing.png")),
        &np(&temp.path().join("dst.png")),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_copy_refuses_existing_target() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("a.png");
    src.write_str("source").unwrap();
    let dst = temp.child("b.png");
    dst.write_str("occupied").unwrap();

    let err = io::copy_no_clobber(&np(src.path()), &np(dst.path())).unwrap_err();

    assert!(matches!(err, Error::TargetExists { .. }));
    dst.assert("occupied");
}

#[test]
fn test_copy_keeps_source() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("a.png");
    src.write_str("source").unwrap();
    let dst = temp.child("copies/a.png");

    io::copy_no_clobber(&np(src.path()), &np(dst.path())).unwrap();

    src.assert("source");
    dst.assert("source");
}

#[cfg(unix)]
#[test]
fn test_copy_preserves_permission_bits() {
    use std::os::unix::fs::PermissionsExt;

    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("script.sh");
    src.write_str("#!/bin/sh\n").unwrap();
    fs::set_permissions(src.path(), fs::Permissions::from_mode(0o750)).unwrap();
    let dst = temp.child("copy.sh");

    io::copy_no_clobber(&np(src.path()), &np(dst.path())).unwrap();

    let mode = fs::metadata(dst.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o750);
}

#[test]
fn test_unique_path_skips_taken_names() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("actors.db").touch().unwrap();
    temp.child("actors.db.1").touch().unwrap();

    let unique = io::unique_path(&np(&temp.path().join("actors.db")));

    assert!(unique.as_str().ends_with("actors.db.2"));
}

#[test]
fn test_same_file_detects_identity() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("a.png");
    a.write_str("x").unwrap();
    let b = temp.child("b.png");
    b.write_str("x").unwrap();

    assert!(io::same_file(&np(a.path()), &np(a.path())));
    assert!(!io::same_file(&np(a.path()), &np(b.path())));
}

#[test]
fn test_case_rename_needs_a_case_only_difference() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("a.png");
    a.write_str("x").unwrap();

    assert!(!io::is_case_rename(&np(a.path()), &np(a.path())));
    // Different names are never a case rename, even for the same file.
    let other = temp.child("b.png");
    fs::hard_link(a.path(), other.path()).unwrap();
    assert!(!io::is_case_rename(&np(a.path()), &np(other.path())));
}

#[test]
fn test_move_onto_hard_link_of_source_is_refused() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("token.png");
    src.write_str("png").unwrap();
    let dst = temp.child("hero.png");
    fs::hard_link(src.path(), dst.path()).unwrap();

    let result = io::move_no_clobber(&np(src.path()), &np(dst.path()));

    assert!(matches!(result, Err(Error::TargetExists { .. })));
    src.assert(predicate::path::exists());
    dst.assert("png");
}

#[cfg(unix)]
#[test]
fn test_move_onto_symlink_to_source_is_refused() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("token.png");
    src.write_str("png").unwrap();
    let dst = temp.child("hero.png");
    std::os::unix::fs::symlink(src.path(), dst.path()).unwrap();
    assert!(io::same_file(&np(src.path()), &np(dst.path())));

    let result = io::move_no_clobber(&np(src.path()), &np(dst.path()));

    assert!(matches!(result, Err(Error::TargetExists { .. })));
    src.assert(predicate::path::exists());
    assert!(dst.path().symlink_metadata().unwrap().file_type().is_symlink());
}
