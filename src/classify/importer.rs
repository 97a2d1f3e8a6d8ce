// src/classify/importer.rs

//! 3D model import, reduced to what deployment needs: is this file a model,
//! and which texture files does it reference.

use std::fmt::Debug;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::classify::obj::{find_mtllib, mtl_textures};
use crate::fs::FileSystem;
use crate::normalize::native_path;

/// A successfully imported model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedModel {
    /// Texture references relative to the model's directory, as stored in
    /// the model (or its material library).
    pub textures: Vec<String>,
}

/// Model loader seam.
pub trait ModelImporter: Send + Sync + Debug {
    /// `Ok(None)` if `path` is not a model format this importer understands.
    /// `Err` if it is one but could not be read.
    fn import(&self, fs: &dyn FileSystem, path: &Path) -> Result<Option<ImportedModel>>;
}

/// Importer for the text-based and self-describing formats: `.obj`,
/// `.gltf`/`.glb`, `.dae` and `.fbx`.
///
/// Binary FBX is recognized as a model but its textures are not extracted.
#[derive(Debug, Clone, Default)]
pub struct BuiltinImporter;

impl ModelImporter for BuiltinImporter {
    fn import(&self, fs: &dyn FileSystem, path: &Path) -> Result<Option<ImportedModel>> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let textures = match ext.as_str() {
            "obj" => import_obj(fs, path)?,
            "gltf" => gltf_images(&fs.read_to_string(path)?)?,
            "glb" => import_glb(fs, path)?,
            "dae" => collada_images(&fs.read_to_string(path)?)?,
            "fbx" => import_fbx(fs, path)?,
            _ => return Ok(None),
        };

        debug!(model = ?path, textures = textures.len(), "imported model");
        Ok(Some(ImportedModel { textures }))
    }
}

fn import_obj(fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>> {
    let source = fs.read_to_string(path)?;
    let Some(library) = find_mtllib(&source) else {
        return Ok(Vec::new());
    };

    let model_dir = path.parent().unwrap_or_else(|| Path::new("/"));
    let library_path = model_dir.join(native_path(&library));
    if !fs.is_file(&library_path) {
        // Reported when the materials file itself is deployed.
        return Ok(Vec::new());
    }

    // Texture names in the library are relative to the library's directory.
    let prefix = native_path(&library)
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    Ok(mtl_textures(&fs.read_to_string(&library_path)?)
        .into_iter()
        .map(|t| {
            if prefix.is_empty() {
                t
            } else {
                format!("{prefix}/{t}")
            }
        })
        .collect())
}

fn gltf_images(json: &str) -> Result<Vec<String>> {
    let root: Value = serde_json::from_str(json).context("parsing glTF JSON")?;
    if root.get("asset").is_none() {
        bail!("glTF document has no 'asset' object");
    }

    let mut out: Vec<String> = Vec::new();
    if let Some(images) = root.get("images").and_then(Value::as_array) {
        for uri in images.iter().filter_map(|i| i.get("uri").and_then(Value::as_str)) {
            if uri.starts_with("data:") || out.iter().any(|o| o == uri) {
                continue;
            }
            out.push(uri.to_string());
        }
    }
    Ok(out)
}

fn import_glb(fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>> {
    let mut bytes = Vec::new();
    fs.open_read(path)?.read_to_end(&mut bytes)?;

    // 12 byte header, then the JSON chunk: u32 length, u32 type, payload.
    if bytes.len() < 20 || &bytes[0..4] != b"glTF" {
        bail!("not a binary glTF file");
    }
    let len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    if &bytes[16..20] != b"JSON" || bytes.len() < 20 + len {
        bail!("binary glTF without a leading JSON chunk");
    }
    let json = std::str::from_utf8(&bytes[20..20 + len]).context("glTF JSON chunk")?;
    gltf_images(json)
}

fn collada_images(xml: &str) -> Result<Vec<String>> {
    if !xml.contains("<COLLADA") {
        bail!("no COLLADA root element");
    }
    let init_from = Regex::new(r"(?s)<init_from>\s*(?:<ref>)?\s*([^<]+?)\s*(?:</ref>)?\s*</init_from>")?;

    let mut out: Vec<String> = Vec::new();
    for caps in init_from.captures_iter(xml) {
        let raw = caps[1].trim_start_matches("file://").to_string();
        if !out.contains(&raw) {
            out.push(raw);
        }
    }
    Ok(out)
}

fn import_fbx(fs: &dyn FileSystem, path: &Path) -> Result<Vec<String>> {
    const BINARY_MAGIC: &[u8] = b"Kaydara FBX Binary";

    let mut head = Vec::with_capacity(BINARY_MAGIC.len());
    fs.open_read(path)?
        .take(BINARY_MAGIC.len() as u64)
        .read_to_end(&mut head)?;
    if head == BINARY_MAGIC {
        return Ok(Vec::new());
    }

    let text = fs.read_to_string(path)?;
    if !text.contains("FBXHeaderExtension") {
        bail!("neither binary FBX nor an ASCII FBX header");
    }
    let relative = Regex::new(r#"RelativeFilename:\s*"([^"]+)""#)?;

    let mut out: Vec<String> = Vec::new();
    for caps in relative.captures_iter(&text) {
        let name = caps[1].to_string();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    Ok(out)
}
