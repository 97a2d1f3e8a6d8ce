// src/engine/coalescer.rs

//! Debounced update coalescing.
//!
//! Every notification that enqueues something new takes a fresh ticket for
//! its instance and schedules a timer. When a timer fires, only the holder
//! of the instance's latest ticket flushes; older holders do nothing. A
//! flush drains the pending files of *all* instances, so one burst of events
//! turns into one update batch per instance.

use std::collections::BTreeMap;

use tracing::debug;

use crate::engine::registry::PendingFile;
use crate::normalize::{normalize, NormalizedPath};

#[derive(Debug, Default)]
pub struct UpdateCoalescer {
    pending: BTreeMap<NormalizedPath, BTreeMap<NormalizedPath, PendingFile>>,
    tickets: BTreeMap<NormalizedPath, u64>,
}

impl UpdateCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `files` for `instance`.
    ///
    /// Returns the new ticket, or `None` if every file was already pending.
    pub fn notify(&mut self, instance: &NormalizedPath, files: Vec<PendingFile>) -> Option<u64> {
        let pending = self.pending.entry(instance.clone()).or_default();

        let mut added = 0usize;
        for file in files {
            let key = normalize(&file.input_path);
            if pending.contains_key(&key) {
                continue;
            }
            pending.insert(key, file);
            added += 1;
        }

        if added == 0 {
            debug!(instance = %instance, "change already pending");
            return None;
        }

        let ticket = self.tickets.entry(instance.clone()).or_insert(0);
        *ticket += 1;
        debug!(instance = %instance, ticket = *ticket, added, "update enqueued");
        Some(*ticket)
    }

    /// A timer for `ticket` fired.
    ///
    /// Drains everything pending if `ticket` is still the latest one for
    /// `instance`; returns nothing otherwise.
    pub fn on_timer(
        &mut self,
        instance: &NormalizedPath,
        ticket: u64,
    ) -> Vec<(NormalizedPath, Vec<PendingFile>)> {
        if self.tickets.get(instance) != Some(&ticket) {
            debug!(instance = %instance, ticket, "superseded flush skipped");
            return Vec::new();
        }

        std::mem::take(&mut self.pending)
            .into_iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(instance, files)| (instance, files.into_values().collect()))
            .collect()
    }

    pub fn latest_ticket(&self, instance: &NormalizedPath) -> Option<u64> {
        self.tickets.get(instance).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.values().all(BTreeMap::is_empty)
    }
}
