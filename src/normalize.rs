// src/normalize.rs

//! Path canonicalization used for every path comparison in the crate.
//!
//! Two flavours exist:
//! - [`normalize`] for filesystem paths: made absolute (lexically, the path
//!   does not need to exist), separators unified to `/`, trailing separators
//!   trimmed and the whole string uppercased.
//! - [`normalize_partial`] for fragments such as filter paths: same without
//!   the absolute step; surrounding whitespace and separators are trimmed.
//!
//! Comparisons are therefore case-insensitive and separator-insensitive.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Canonical form of an absolute path. Only produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `fragment` occurs anywhere in this path.
    pub fn contains(&self, fragment: &NormalizedPath) -> bool {
        self.0.contains(fragment.as_str())
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical form of a relative fragment. Only produced by [`normalize_partial`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedFragment(String);

impl NormalizedFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Make `path` absolute against the current directory and resolve `.` and
/// `..` components without touching the filesystem.
pub fn absolute_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, like the OS does.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize a filesystem path for comparison.
pub fn normalize(path: impl AsRef<Path>) -> NormalizedPath {
    let absolute = absolute_path(path);
    let unified = absolute.to_string_lossy().replace('\\', "/");

    let trimmed = unified.trim_end_matches('/');
    // Keep a bare root ("/" or "C:/") intact.
    let kept = if trimmed.is_empty() || trimmed.ends_with(':') {
        format!("{trimmed}/")
    } else {
        trimmed.to_string()
    };

    NormalizedPath(kept.to_uppercase())
}

/// Canonicalize a relative fragment (filter path, file name) for comparison.
pub fn normalize_partial(fragment: &str) -> NormalizedFragment {
    let unified = fragment.replace('\\', "/");
    NormalizedFragment(unified.trim().trim_matches('/').to_uppercase())
}

/// True if `dir` equals `root` or lies somewhere below it.
///
/// Walks `dir` upwards one parent at a time and compares the normalized form
/// of each ancestor against `root`.
pub fn is_same_or_subdirectory_of(dir: impl AsRef<Path>, root: impl AsRef<Path>) -> bool {
    let root = normalize(root);
    let mut current = Some(absolute_path(dir));

    while let Some(candidate) = current {
        if normalize(&candidate) == root {
            return true;
        }
        current = candidate.parent().map(Path::to_path_buf);
    }

    false
}

/// Convert a manifest-style path (possibly using `\`) into a native path.
pub fn native_path(raw: &str) -> PathBuf {
    if std::path::MAIN_SEPARATOR == '\\' {
        PathBuf::from(raw)
    } else {
        PathBuf::from(raw.replace('\\', "/"))
    }
}

