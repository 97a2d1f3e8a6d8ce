// src/watch/hash.rs

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;

use crate::fs::FileSystem;

/// Compute the blake3 hash of a single file, as lowercase hex.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// True if `path` still hashes to `recorded`.
///
/// Unreadable files count as changed so they get redeployed and report
/// their error.
pub fn is_unchanged(fs: &dyn FileSystem, path: &Path, recorded: Option<&str>) -> bool {
    match (recorded, compute_file_hash(fs, path)) {
        (Some(old), Ok(new)) => old == new,
        _ => false,
    }
}
