// src/classify/shader.rs

use anyhow::Result;
use regex::Regex;

/// Collect the targets of `#include "..."` directives, one per matching
/// line, in source order. Nested includes are not followed.
pub fn scan_includes(source: &str) -> Result<Vec<String>> {
    let directive = Regex::new(r#"(?i)^\s*#\s*include\s+"([^"]+)""#)?;

    Ok(source
        .lines()
        .filter_map(|line| directive.captures(line))
        .map(|caps| caps[1].to_string())
        .collect())
}
