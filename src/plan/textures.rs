// src/plan/textures.rs

//! Normalized bookkeeping of a model's texture references.

use std::path::{Path, PathBuf};

use crate::normalize::{absolute_path, native_path, normalize, NormalizedPath};

/// Where one texture reference comes from and where it will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    pub output: NormalizedPath,
    pub input: NormalizedPath,
    /// The reference exactly as the model states it.
    pub relative: String,
}

/// Input path of a texture referenced relative to the model's directory.
pub fn texture_input_path(model_dir: &Path, relative: &str) -> PathBuf {
    absolute_path(model_dir.join(native_path(relative)))
}

/// Output path of a texture, relative to the model's output directory.
pub fn texture_output_path(model_output_dir: &Path, relative: &str) -> PathBuf {
    absolute_path(model_output_dir.join(native_path(relative)))
}

/// Build records for `textures` in order. The first reference wins when
/// several map onto the same output path.
pub fn build_records(
    textures: &[String],
    model_dir: &Path,
    model_output_dir: &Path,
) -> Vec<TextureRecord> {
    let mut records: Vec<TextureRecord> = Vec::with_capacity(textures.len());

    for relative in textures {
        let output = normalize(texture_output_path(model_output_dir, relative));
        if records.iter().any(|r| r.output == output) {
            continue;
        }
        records.push(TextureRecord {
            output,
            input: normalize(texture_input_path(model_dir, relative)),
            relative: relative.clone(),
        });
    }

    records
}

/// Look up a record by normalized output path.
pub fn find_output<'a>(records: &'a [TextureRecord], output: &NormalizedPath) -> Option<&'a TextureRecord> {
    records.iter().find(|r| &r.output == output)
}
