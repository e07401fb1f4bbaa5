//! Normalized path handling for record-store compatible paths

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Record stores reference assets with forward-slash paths regardless of
/// platform, so every view of a path is kept in this form and converted to a
/// native `PathBuf` only at I/O boundaries. Normalization is purely lexical:
/// `.` segments and repeated separators are dropped and `..` is folded into
/// its parent. Symlinks are never resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str),
        }
    }

    /// The empty relative path, used for "the directory itself".
    pub fn empty() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || self.to_native().is_absolute()
    }

    /// Join this path with a relative segment.
    pub fn join(&self, segment: impl AsRef<Path>) -> Self {
        let segment = segment.as_ref().to_string_lossy().replace('\\', "/");
        let joined = if self.inner.is_empty() {
            segment
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment.trim_start_matches('/'))
        } else {
            format!("{}/{}", self.inner, segment.trim_start_matches('/'))
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            None if !trimmed.is_empty() => Some(Self::empty()),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// File name without its final extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => Some(name),
            Some(idx) => Some(&name[..idx]),
        }
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Replace the final component.
    pub fn with_file_name(&self, name: &str) -> Self {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => Self::new(name),
        }
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Component-wise prefix test.
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        self.strip_prefix(base).is_some()
    }

    /// Path of `self` relative to `base`, component-wise.
    ///
    /// Returns the empty path when both are equal.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<NormalizedPath> {
        if base.inner.is_empty() {
            return Some(self.clone());
        }
        if self.inner == base.inner {
            return Some(Self::empty());
        }
        let prefix = if base.inner.ends_with('/') {
            base.inner.clone()
        } else {
            format!("{}/", base.inner)
        };
        self.inner.strip_prefix(&prefix).map(|rest| Self {
            inner: rest.to_string(),
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// True when the path itself is a symlink, or resolves somewhere else.
    pub fn is_symlinked(&self) -> bool {
        let native = self.to_native();
        if native
            .symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
        {
            return true;
        }
        match dunce::canonicalize(&native) {
            Ok(real) => NormalizedPath::new(real) != *self,
            Err(_) => false,
        }
    }
}

/// Lexically normalize a path string.
fn clean(raw: &str) -> String {
    let s = raw.replace('\\', "/");
    let network = s.starts_with("//") && !s.starts_with("///");
    let absolute = s.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in s.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if network {
        format!("//{body}")
    } else if absolute {
        format!("/{body}")
    } else {
        body
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
