// src/engine/phase.rs

use std::fmt;

/// Stages a build or update batch moves through.
///
/// A fatal manifest error jumps from `ParsingManifest` straight to
/// `Reporting`; otherwise every batch ends in `Reporting` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchPhase {
    Idle,
    ParsingManifest,
    ExpandingReferences,
    ClassifyingAndPlanning,
    ResolvingConflicts,
    Executing,
    Reporting,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchPhase::Idle => "idle",
            BatchPhase::ParsingManifest => "parsing manifest",
            BatchPhase::ExpandingReferences => "expanding references",
            BatchPhase::ClassifyingAndPlanning => "classifying and planning",
            BatchPhase::ResolvingConflicts => "resolving conflicts",
            BatchPhase::Executing => "executing",
            BatchPhase::Reporting => "reporting",
        };
        f.write_str(s)
    }
}
