//! File operations that never overwrite
//!
//! Every mutation here either creates a new name or fails with
//! [`Error::TargetExists`]. Moves are link-then-unlink where the filesystem
//! allows it, so an interrupted move leaves both names rather than neither.

use crate::{Error, NormalizedPath, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();
    ensure_parent(&native_path)?;

    // Generate temp file path in same directory (ensures same filesystem)
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// True when both paths resolve to the same existing file after following
/// symlinks and case folding done by the filesystem.
pub fn same_file(a: &NormalizedPath, b: &NormalizedPath) -> bool {
    match (dunce::canonicalize(a.to_native()), dunce::canonicalize(b.to_native())) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// True when `dst` differs from `src` only by letter case and the
/// filesystem treats both as the same file.
pub fn is_case_rename(src: &NormalizedPath, dst: &NormalizedPath) -> bool {
    src.as_str() != dst.as_str()
        && src.as_str().to_lowercase() == dst.as_str().to_lowercase()
        && same_file(src, dst)
}

/// Move `src` to `dst`, creating intermediate directories.
///
/// Fails with [`Error::TargetExists`] when `dst` is occupied, leaving `src`
/// untouched.
pub fn move_no_clobber(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    let src_native = src.to_native();
    let dst_native = dst.to_native();

    if src_native.symlink_metadata().is_err() {
        return Err(Error::io(
            &src_native,
            std::io::Error::from(ErrorKind::NotFound),
        ));
    }
    ensure_parent(&dst_native)?;

    if is_case_rename(src, dst) {
        // The "existing" target is the source itself.
        debug!("move_no_clobber: in-place rename {} -> {}", src, dst);
        return fs::rename(&src_native, &dst_native).map_err(|e| Error::io(&dst_native, e));
    }

    match fs::hard_link(&src_native, &dst_native) {
        Ok(()) => {
            fs::remove_file(&src_native).map_err(|e| Error::io(&src_native, e))?;
            debug!("move_no_clobber: linked {} -> {}", src, dst);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(Error::TargetExists {
            path: dst_native,
        }),
        Err(e) => {
            // Links are unavailable across devices and on some filesystems.
            debug!("move_no_clobber: link failed ({}), falling back to copy", e);
            if dst_native.symlink_metadata().is_ok() {
                return Err(Error::TargetExists { path: dst_native });
            }
            if src_native.is_dir() {
                return fs::rename(&src_native, &dst_native)
                    .map_err(|e| Error::io(&dst_native, e));
            }
            copy_no_clobber(src, dst)?;
            fs::remove_file(&src_native).map_err(|e| Error::io(&src_native, e))
        }
    }
}

/// Copy content and metadata of `src` to a new file at `dst`.
///
/// Ownership, permission bits and modification time are carried over.
/// Fails with [`Error::TargetExists`] when `dst` is occupied.
pub fn copy_no_clobber(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    let src_native = src.to_native();
    let dst_native = dst.to_native();
    ensure_parent(&dst_native)?;

    let mut reader = File::open(&src_native).map_err(|e| Error::io(&src_native, e))?;
    let mut writer = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&dst_native)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::TargetExists { path: dst_native });
        }
        Err(e) => return Err(Error::io(&dst_native, e)),
    };

    let copied = std::io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.sync_all())
        .map_err(|e| Error::io(&dst_native, e));
    if let Err(e) = copied {
        // The partial file is ours; nothing else can have claimed the name.
        let _ = fs::remove_file(&dst_native);
        return Err(e);
    }

    if let Ok(modified) = reader.metadata().and_then(|m| m.modified()) {
        writer
            .set_modified(modified)
            .map_err(|e| Error::io(&dst_native, e))?;
    }
    drop(writer);

    copy_security(&src_native, &dst_native)?;
    debug!("copy_no_clobber: copied {} -> {}", src, dst);
    Ok(())
}

/// Propagate ownership and permission bits from `src` to `dst`.
///
/// A refused ownership change (not running as the owner) is logged and
/// the permission bits are still applied.
pub fn copy_security(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::io(src, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match std::os::unix::fs::chown(dst, Some(meta.uid()), Some(meta.gid())) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!(
                    "copy_security: cannot set owner {}:{} on {}: {}",
                    meta.uid(),
                    meta.gid(),
                    dst.display(),
                    e
                );
            }
            Err(e) => return Err(Error::io(dst, e)),
        }
    }

    fs::set_permissions(dst, meta.permissions()).map_err(|e| Error::io(dst, e))
}

/// Remove a single file permanently.
pub fn remove_file(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    fs::remove_file(&native).map_err(|e| Error::io(&native, e))
}

/// First of `path`, `path.1`, `path.2`, ... that does not exist yet.
pub fn unique_path(path: &NormalizedPath) -> NormalizedPath {
    if path.to_native().symlink_metadata().is_err() {
        return path.clone();
    }
    let mut n: u64 = 1;
    loop {
        let candidate = NormalizedPath::new(format!("{}.{}", path.as_str(), n));
        if candidate.to_native().symlink_metadata().is_err() {
            return candidate;
        }
        n += 1;
    }
}
