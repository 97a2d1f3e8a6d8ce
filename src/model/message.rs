// src/model/message.rs

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    Success,
    Information,
    Warning,
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::Success => "success",
            MessageKind::Information => "info",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
        };
        f.write_str(s)
    }
}

/// Where a message points to, for navigating back to the originating input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub location: Option<SourceLocation>,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            location: None,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Information, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }

    pub fn at(mut self, file: impl Into<PathBuf>, line: Option<u32>) -> Self {
        self.location = Some(SourceLocation {
            file: file.into(),
            line,
        });
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        if let Some(loc) = &self.location {
            match loc.line {
                Some(line) => write!(f, "{}:{}: ", loc.file.display(), line)?,
                None => write!(f, "{}: ", loc.file.display())?,
            }
        }
        f.write_str(&self.text)
    }
}

/// Helpers over a list of messages.
pub trait MessageList {
    fn has_kind(&self, kind: MessageKind) -> bool;
    fn count_kind(&self, kind: MessageKind) -> usize;
}

impl MessageList for [Message] {
    fn has_kind(&self, kind: MessageKind) -> bool {
        self.iter().any(|m| m.kind == kind)
    }

    fn count_kind(&self, kind: MessageKind) -> usize {
        self.iter().filter(|m| m.kind == kind).count()
    }
}
