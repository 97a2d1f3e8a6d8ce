// src/model/batch.rs

use crate::engine::phase::BatchPhase;
use crate::model::deployed::{DeployedFile, FileId};
use crate::model::message::{Message, MessageKind, MessageList};
use crate::normalize::NormalizedPath;
use crate::plan::DeploymentPlan;
use crate::types::EventKind;

/// Everything one build or update event produced.
///
/// `files` is the arena every [`FileId`] in the batch points into; plans keep
/// the ids of the files they produced in `DeploymentPlan::deployed`.
#[derive(Debug, Clone)]
pub struct Batch {
    pub kind: EventKind,
    pub instance: NormalizedPath,
    pub plans: Vec<DeploymentPlan>,
    pub files: Vec<DeployedFile>,
    /// Files with errors or warnings whose kind is opted in for immediate
    /// notification.
    pub emergency: Vec<FileId>,
    /// Messages not attached to any single file.
    pub messages: Vec<Message>,
    pub phases: Vec<BatchPhase>,
}

impl Batch {
    pub fn new(kind: EventKind, instance: NormalizedPath) -> Self {
        Self {
            kind,
            instance,
            plans: Vec::new(),
            files: Vec::new(),
            emergency: Vec::new(),
            messages: Vec::new(),
            phases: Vec::new(),
        }
    }

    /// An empty batch carrying a single error.
    pub fn fatal(kind: EventKind, instance: NormalizedPath, text: impl Into<String>) -> Self {
        let mut batch = Self::new(kind, instance);
        batch.messages.push(Message::error(text));
        batch
    }

    /// Move the plan's produced files into the arena, rebasing parent ids.
    ///
    /// With `notify` set, files carrying errors or warnings are added to the
    /// emergency list.
    pub fn accept(&mut self, mut plan: DeploymentPlan, notify: bool) -> Vec<FileId> {
        let offset = self.files.len();
        let mut ids = Vec::with_capacity(plan.produced.len());

        for mut file in plan.produced.drain(..) {
            file.parent = file.parent.map(|p| FileId(p.0 + offset));
            let id = FileId(self.files.len());
            if notify && (file.has_errors() || file.has_warnings()) {
                self.emergency.push(id);
            }
            self.files.push(file);
            ids.push(id);
        }

        plan.deployed = ids.clone();
        self.plans.push(plan);
        ids
    }

    pub fn file(&self, id: FileId) -> Option<&DeployedFile> {
        self.files.get(id.0)
    }

    /// Follow parent links up to the top-level file.
    pub fn root_of(&self, id: FileId) -> FileId {
        let mut current = id;
        // Parents always precede their children in the arena, so this ends.
        while let Some(parent) = self.file(current).and_then(|f| f.parent) {
            if parent >= current {
                break;
            }
            current = parent;
        }
        current
    }

    /// Number of deployed files, dependency markers excluded.
    pub fn deployed_count(&self) -> usize {
        self.files.iter().filter(|f| !f.is_dependency()).count()
    }

    /// True if any file or batch-level message has this kind.
    pub fn has_kind(&self, kind: MessageKind) -> bool {
        self.messages.has_kind(kind) || self.files.iter().any(|f| f.messages.has_kind(kind))
    }

    /// Record that the batch entered `phase`. Each phase is kept once, in
    /// the order it was first entered.
    pub fn record_phase(&mut self, phase: BatchPhase) {
        if !self.phases.contains(&phase) {
            self.phases.push(phase);
        }
    }
}
