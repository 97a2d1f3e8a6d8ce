// src/engine/core.rs

//! Pure daemon state machine.
//!
//! [`DaemonCore`] consumes [`DaemonEvent`]s and produces:
//! - an updated registry / coalescer state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the channel
//! - running batches on worker threads
//! - timers, file watchers, printing reports
//!
//! All registry and pending-update state lives here and is only touched
//! from the single runtime loop. Workers hand their batches back as events.

use crate::engine::coalescer::UpdateCoalescer;
use crate::engine::event_handlers::{
    handle_batch_finished, handle_build_requested, handle_file_changed, handle_flush_due,
    CoreStep,
};
use crate::engine::registry::InstanceRegistry;
use crate::engine::{CoreOptions, DaemonEvent};

#[derive(Debug)]
pub struct DaemonCore {
    registry: InstanceRegistry,
    coalescer: UpdateCoalescer,
    options: CoreOptions,
    /// Batches handed to workers and not yet finished.
    in_flight: usize,
}

impl DaemonCore {
    pub fn new(options: CoreOptions) -> Self {
        Self {
            registry: InstanceRegistry::new(),
            coalescer: UpdateCoalescer::new(),
            options,
            in_flight: 0,
        }
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// True when no batch is running and nothing is waiting to be flushed.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.coalescer.is_empty()
    }

    /// Handle a single event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: DaemonEvent) -> CoreStep {
        match event {
            DaemonEvent::BuildRequested(config) => {
                handle_build_requested(&mut self.registry, &mut self.in_flight, config)
            }
            DaemonEvent::FileChanged { path } => {
                handle_file_changed(&self.registry, &mut self.coalescer, &self.options, &path)
            }
            DaemonEvent::FlushDue { instance, ticket } => handle_flush_due(
                &self.registry,
                &mut self.coalescer,
                &mut self.in_flight,
                &instance,
                ticket,
            ),
            DaemonEvent::BatchFinished(batch) => handle_batch_finished(
                &mut self.registry,
                &self.coalescer,
                &self.options,
                &mut self.in_flight,
                &batch,
            ),
            DaemonEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
