// src/plan/conflict.rs

//! Batch-level conflict resolution.
//!
//! Plans are checked in the order they are added to a batch. The plan that
//! got its spot first keeps it; a later model that collides with an earlier
//! model is relocated and checked again from the top. Every other conflict
//! is only reported, both outputs are still written.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{debug, warn};

use crate::plan::DeploymentPlan;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictOutcome {
    /// How often the plan was moved one directory deeper.
    pub relocations: usize,
    /// Indices into `accepted` of plans that stay in conflict.
    pub unresolved: BTreeSet<usize>,
}

/// Check `plan` against every already accepted plan, relocating it while it
/// collides with another model.
///
/// Fails only if relocation itself fails (the plan was already relocated).
pub fn resolve_against(
    plan: &mut DeploymentPlan,
    accepted: &[DeploymentPlan],
) -> Result<ConflictOutcome> {
    let mut outcome = ConflictOutcome::default();

    loop {
        let mut relocated = false;
        for (idx, other) in accepted.iter().enumerate() {
            if !plan.has_conflict_with(other) {
                continue;
            }
            if plan.is_model() && other.is_model() {
                plan.resolve_conflict_by_relocating()?;
                outcome.relocations += 1;
                relocated = true;
                break;
            }
            outcome.unresolved.insert(idx);
        }
        if !relocated {
            break;
        }
    }

    if outcome.relocations > 0 {
        debug!(
            input = ?plan.input_path,
            output = ?plan.output_path,
            relocations = outcome.relocations,
            "model relocated to avoid conflict"
        );
    }
    for idx in &outcome.unresolved {
        warn!(
            input = ?plan.input_path,
            other = ?accepted[*idx].input_path,
            "unresolvable output conflict"
        );
    }

    Ok(outcome)
}

/// Drop textures of `plan` that an accepted model already deploys.
pub fn kick_out_shared(plan: &mut DeploymentPlan, accepted: &[DeploymentPlan]) {
    if !plan.is_model() {
        return;
    }
    for other in accepted.iter().filter(|o| o.is_model()) {
        plan.kick_out_shared_textures(other);
    }
}
