// src/exec/glsl.rs

//! Lexical rewrite of Vulkan-flavoured GLSL into OpenGL-flavoured GLSL.
//!
//! Only what has a direct counterpart is handled: the vertex/instance index
//! builtins are renamed and `set = N` is dropped from `layout(...)`
//! qualifiers, since descriptor sets do not exist in OpenGL.

use anyhow::Result;
use regex::Regex;

const BUILTIN_RENAMES: &[(&str, &str)] = &[
    ("gl_VertexIndex", "gl_VertexID"),
    ("gl_InstanceIndex", "gl_InstanceID"),
];

pub fn transform_vk_to_gl(source: &str) -> Result<String> {
    let mut out = source.to_string();
    for (vk, gl) in BUILTIN_RENAMES {
        out = out.replace(vk, gl);
    }

    // layout(..., set = N, binding = M, ...)
    let set_then_binding =
        Regex::new(r"(layout\s*\(.*)(set\s*=\s*\d+\s*,\s*)(binding\s*=\s*\d+)(.*\))")?;
    out = set_then_binding.replace_all(&out, "${1}${3}${4}").into_owned();

    // layout(..., binding = M, set = N, ...)
    let binding_then_set =
        Regex::new(r"(layout\s*\(.*)(binding\s*=\s*\d+\s*)(,\s*set\s*=\s*\d+)(.*\))")?;
    out = binding_then_set.replace_all(&out, "${1}${2}${4}").into_owned();

    Ok(out)
}
