// src/engine/report.rs

//! Per-batch summary shown to the operator.

use std::fmt;

use crate::model::{Batch, Message, MessageKind};
use crate::normalize::NormalizedPath;
use crate::types::EventKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub event: EventKind,
    pub instance: NormalizedPath,
    /// Overall status of the batch.
    pub kind: MessageKind,
    pub text: String,
    /// Deployed files, dependency markers excluded.
    pub deployed: usize,
    /// One line per message, batch-level messages first.
    pub details: Vec<String>,
    /// Lines for files that asked for immediate attention.
    pub emergency: Vec<String>,
}

impl BatchReport {
    pub fn from_batch(batch: &Batch) -> Self {
        let deployed = batch.deployed_count();
        let errors = batch.has_kind(MessageKind::Error);
        let warnings = batch.has_kind(MessageKind::Warning);
        let infos = batch.has_kind(MessageKind::Information);

        let (kind, text) = if errors && warnings {
            (
                MessageKind::Error,
                format!("Deployed {deployed} files with ERRORS and WARNINGS."),
            )
        } else if warnings {
            (
                MessageKind::Warning,
                format!("Deployed {deployed} files with WARNINGS."),
            )
        } else if errors {
            (
                MessageKind::Error,
                format!("Deployed {deployed} files with ERRORS."),
            )
        } else if infos {
            (
                MessageKind::Information,
                format!("Deployed {deployed} files with INFOS."),
            )
        } else {
            (MessageKind::Success, format!("Deployed {deployed} files."))
        };

        let mut details: Vec<String> = batch.messages.iter().map(describe).collect();
        for file in &batch.files {
            details.extend(file.messages.iter().map(describe));
        }

        let emergency = batch
            .emergency
            .iter()
            .filter_map(|id| batch.file(*id))
            .flat_map(|file| {
                file.messages
                    .iter()
                    .filter(|m| matches!(m.kind, MessageKind::Error | MessageKind::Warning))
                    .map(describe)
            })
            .collect();

        Self {
            event: batch.kind,
            instance: batch.instance.clone(),
            kind,
            text,
            deployed,
            details,
            emergency,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.event, self.instance, self.text)
    }
}

fn describe(message: &Message) -> String {
    message.to_string()
}
