// src/classify/scene.rs

//! Scene description (`.fscene`) references.
//!
//! Scene files are JSON without a fixed schema. Only three places are
//! probed, each optional:
//!
//! - `models[].file`
//! - `light_probes[].file`
//! - `user_defined.sky_box`
//!
//! Anything else, or any of these with an unexpected shape, is ignored. This
//! is best-effort parsing, not validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;

use crate::normalize::{absolute_path, native_path, normalize, NormalizedPath};

pub const SCENE_EXTENSION: &str = "fscene";

pub fn is_scene_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCENE_EXTENSION))
}

/// Referenced paths (relative to the scene's directory), deduplicated, in
/// the order models, light probes, sky box.
pub fn scene_references(json: &str) -> Result<Vec<String>> {
    let root: Value = serde_json::from_str(json).context("parsing scene description")?;
    let mut refs: Vec<String> = Vec::new();

    let mut push = |s: &str| {
        if !s.trim().is_empty() && !refs.iter().any(|r| r == s) {
            refs.push(s.to_string());
        }
    };

    for key in ["models", "light_probes"] {
        if let Some(items) = root.get(key).and_then(Value::as_array) {
            for item in items {
                if let Some(file) = item.get("file").and_then(Value::as_str) {
                    push(file);
                }
            }
        }
    }

    if let Some(sky_box) = root
        .get("user_defined")
        .and_then(|u| u.get("sky_box"))
        .and_then(Value::as_str)
    {
        push(sky_box);
    }

    Ok(refs)
}

/// Filter path of a reference: the scene's filter joined with the
/// reference's containing directory.
pub fn reference_filter(scene_filter: &str, reference: &str) -> String {
    let dir = native_path(reference)
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    if dir.is_empty() {
        scene_filter.to_string()
    } else {
        format!("{}/{}", scene_filter.trim_end_matches(['/', '\\']), dir)
    }
}

/// Absolute input path of a reference.
pub fn reference_path(scene_path: &Path, reference: &str) -> PathBuf {
    let dir = scene_path.parent().unwrap_or_else(|| Path::new("/"));
    absolute_path(dir.join(native_path(reference)))
}

/// Scene → referenced-file edges seen during one expansion.
///
/// Refuses edges that would close a cycle, so recursive expansion of scenes
/// referencing scenes terminates.
#[derive(Debug, Default)]
pub struct ReferenceGraph {
    graph: DiGraph<NormalizedPath, ()>,
    nodes: HashMap<NormalizedPath, NodeIndex>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, path: &Path) -> NodeIndex {
        let key = normalize(path);
        if let Some(idx) = self.nodes.get(&key) {
            return *idx;
        }
        let idx = self.graph.add_node(key.clone());
        self.nodes.insert(key, idx);
        idx
    }

    /// Record `scene -> referenced`. Returns `false` (and records nothing)
    /// if `referenced` already reaches `scene`.
    pub fn add_reference(&mut self, scene: &Path, referenced: &Path) -> bool {
        let from = self.node(scene);
        let to = self.node(referenced);
        if from == to || has_path_connecting(&self.graph, to, from, None) {
            return false;
        }
        self.graph.update_edge(from, to, ());
        true
    }
}
