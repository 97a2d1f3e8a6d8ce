// src/classify/manifest.rs

//! Filter manifest (`.vcxproj.filters`) parsing.
//!
//! Declarations look like
//!
//! ```xml
//! <None Include="assets\models\box.obj">
//!   <Filter>assets\models</Filter>
//! </None>
//! ```
//!
//! with `None`, `Object` or `Image` as the element name. Parsing is a regex
//! scan, not an XML parse: attribute order and whitespace are free, but the
//! `Include` and its `Filter` must sit inside one element.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::errors::{DeployError, Result};
use crate::normalize::{absolute_path, native_path, normalize_partial};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// `Include` attribute, relative to the manifest's directory.
    pub include: String,
    /// Virtual grouping path.
    pub filter: String,
}

impl ManifestEntry {
    /// Absolute input path of this entry.
    pub fn input_path(&self, manifest_dir: &Path) -> PathBuf {
        absolute_path(manifest_dir.join(native_path(&self.include)))
    }

    fn file_name(&self) -> String {
        native_path(&self.include)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Extract every declaration in document order.
pub fn parse_manifest(text: &str) -> Result<Vec<ManifestEntry>> {
    let entry = Regex::new(
        r#"(?is)<(None|Object|Image)\s+[^"]*?Include\s*?=\s*?"([^"]*?)"\s*?>\s*?<Filter\s*?>([^<]*?)</Filter>\s*?</(None|Object|Image)>"#,
    )
    .map_err(|e| DeployError::ManifestError(e.to_string()))?;

    Ok(entry
        .captures_iter(text)
        // Opening and closing element must agree.
        .filter(|caps| caps[1].eq_ignore_ascii_case(&caps[4]))
        .map(|caps| ManifestEntry {
            include: caps[2].to_string(),
            filter: caps[3].to_string(),
        })
        .collect())
}

/// Reject manifests where a filter has the same name as one of its own files.
///
/// Conflict bookkeeping assumes filter paths and `filter/file` paths never
/// collide, so this aborts the whole batch.
pub fn check_namespaces(entries: &[ManifestEntry]) -> Result<()> {
    let filters: HashSet<_> = entries
        .iter()
        .map(|e| normalize_partial(&e.filter))
        .collect();

    for entry in entries {
        let filter_plus_file = format!("{}/{}", entry.filter, entry.file_name());
        if filters.contains(&normalize_partial(&filter_plus_file)) {
            return Err(DeployError::ManifestError(format!(
                "A filter must not have the same name as one of its files => ABORTING! \
                 This restriction is a necessity for conflict handling. \
                 Please fix your filters! (offending entry: '{filter_plus_file}')"
            )));
        }
    }

    Ok(())
}
