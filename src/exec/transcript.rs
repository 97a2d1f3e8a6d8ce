// src/exec/transcript.rs

//! Turning a shader compiler transcript into structured messages.

use std::path::Path;

use anyhow::Result;
use regex::Regex;

use crate::model::Message;

/// Everything the compiler printed, stdout first, then stderr.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerTranscript {
    pub lines: Vec<String>,
    pub exit_code: Option<i32>,
}

impl CompilerTranscript {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            exit_code: None,
        }
    }

    pub fn text(&self) -> String {
        let mut s = String::new();
        for line in &self.lines {
            s.push_str(line);
            s.push('\n');
        }
        s
    }
}

/// One message per error/warning line plus a closing summary message that
/// carries the full transcript.
///
/// - A line is an error if it starts with `error` (any case) after leading
///   whitespace; a warning if it starts with `warn`.
/// - Errors of the form `ERROR: <file>:<line>:` point at that file and line
///   when `<file>` looks like a path. Otherwise the first `:<digits>` is
///   taken as a line in `input`.
pub fn interpret(transcript: &CompilerTranscript, input: &Path) -> Result<Vec<Message>> {
    let file_and_line = Regex::new(r#"ERROR:\s*((?:[A-Za-z]:)?[^:<>"?*|]+):(\d+):"#)?;
    let line_only = Regex::new(r":(\d+)")?;

    let mut messages = Vec::new();
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for line in &transcript.lines {
        let lowered = line.trim_start().to_ascii_lowercase();

        if lowered.starts_with("error") {
            errors += 1;
            let located = file_and_line
                .captures(line)
                .filter(|caps| looks_like_path(caps[1].trim()));
            let message = match located {
                Some(caps) => Message::error(line.as_str())
                    .at(caps[1].trim(), caps[2].parse::<u32>().ok()),
                None => {
                    let line_no = line_only
                        .captures(line)
                        .and_then(|c| c[1].parse::<u32>().ok());
                    Message::error(line.as_str()).at(input, line_no)
                }
            };
            messages.push(message);
        } else if lowered.starts_with("warn") {
            warnings += 1;
            let line_no = line_only
                .captures(line)
                .and_then(|c| c[1].parse::<u32>().ok());
            messages.push(Message::warning(line.as_str()).at(input, line_no));
        }
    }

    let text = transcript.text();
    let summary = match (errors, warnings) {
        (0, 0) => Message::success(format!("Compiling shader for Vulkan succeeded:\n\n{text}")),
        (e, 0) => Message::info(format!(
            "Compiling shader for Vulkan resulted in {e} errors:\n\n{text}"
        )),
        (0, w) => Message::info(format!(
            "Compiling shader for Vulkan resulted in {w} warnings:\n\n{text}"
        )),
        (e, w) => Message::info(format!(
            "Compiling shader for Vulkan resulted in {e} errors and {w} warnings:\n\n{text}"
        )),
    };
    messages.push(summary.at(input, None));

    Ok(messages)
}

/// glslang prints a bare source-string index (`ERROR: 0:12:`) when it has no
/// file name, so only a drive prefix or a separator makes a location.
fn looks_like_path(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    let drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    drive || candidate.contains(['/', '\\'])
}
