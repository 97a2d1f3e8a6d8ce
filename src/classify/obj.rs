// src/classify/obj.rs

//! Wavefront `.obj` / `.mtl` text scanning.

/// Materials library named by the last `mtllib` line, if any.
pub fn find_mtllib(source: &str) -> Option<String> {
    source
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("mtllib"))
        .map(|rest| rest.trim().to_string())
        .filter(|name| !name.is_empty())
        .last()
}

/// Texture references of a `.mtl` file.
///
/// Statements are `map_Kd`, `map_Ks`, `map_Bump`, `bump`, `disp`, `refl`,
/// `norm` and friends. Options (`-bm 0.5`, `-clamp on`, ...) precede the
/// file name, so the last token of the statement is taken.
pub fn mtl_textures(source: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for line in source.lines() {
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let keyword = keyword.to_ascii_lowercase();
        let is_texture = keyword.starts_with("map_")
            || matches!(keyword.as_str(), "bump" | "disp" | "decal" | "refl" | "norm");
        if !is_texture {
            continue;
        }
        if let Some(name) = tokens.last() {
            if !out.iter().any(|t| t == name) {
                out.push(name.to_string());
            }
        }
    }

    out
}
