// Event system for workflow notifications

//! # Event System
//!
//! The engine publishes a [`WorkflowEvent`] for everything a listener might
//! react to: a process created, a field edited, an edit rejected, a step
//! handed on, a snapshot persisted or a persistence failure. Notification
//! mailers, dashboards and audit trails subscribe; the engine never waits on
//! them.
//!
//! ## Rust Learning Notes:
//!
//! ### Broadcast Channels
//! `tokio::sync::broadcast` delivers every message to every receiver. Sending
//! with no receivers returns an error we deliberately ignore: events are
//! best-effort, and a process must keep working with nobody listening.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

use crate::engine::access::DenialReason;
use crate::models::{ProcessId, ProcessType, Role};

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WorkflowEventKind {
    ProcessCreated { process_type: ProcessType },
    FieldEdited { field: String, role: Role },
    EditRejected { role: Role, step: u8, reason: DenialReason },
    StepSubmitted { from_step: u8, to_step: u8, role: Role, completed: bool },
    SyncPersisted,
    SyncFailed { error: String },
}

/// An event about one process
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    pub id: Uuid,
    pub process_id: ProcessId,
    pub kind: WorkflowEventKind,
    pub timestamp: DateTime<Utc>,
}

impl WorkflowEvent {
    pub fn new(process_id: ProcessId, kind: WorkflowEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            process_id,
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Event bus for publishing and subscribing to workflow events
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow receiver
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: WorkflowEvent) {
        trace!(process_id = %event.process_id, kind = ?event.kind, "Event published");
        let _ = self.sender.send(event);
    }

    pub fn emit(&self, process_id: ProcessId, kind: WorkflowEventKind) {
        self.publish(WorkflowEvent::new(process_id, kind));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}
