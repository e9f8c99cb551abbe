// HR Workflow - onboarding and offboarding as role-gated, step-by-step processes
// The checklist of every process is derived from the data collected at each step

//! # HR Workflow Library
//!
//! This crate is the state/derivation core behind employee **admission**
//! (onboarding) and **demission** (offboarding) processes. A presentation layer
//! calls into it with the acting user and the data typed into a form; the crate
//! decides whether the edit is allowed, moves the process between the
//! responsible parties and recomputes the checklist.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`Process`]: one onboarding/offboarding case, its step pointer and field data
//! - [`Task`]: a checklist line whose completion is derived, never ticked by hand
//! - [`Actor`] / [`Role`]: the acting user supplied by the identity collaborator
//! - [`Rule`] / [`RuleCondition`]: declarative completion rules
//!
//! ### Flow Definitions
//! - [`flows::template_for`]: the static step sequence and task table of each
//!   [`ProcessType`], with every task declared next to the rule that completes it
//!
//! ### Engine
//! - [`derive_tasks`]: pure `(process type, field data) -> tasks` derivation
//! - [`AccessGate`]: who may edit which step
//! - [`WorkflowEngine`]: `edit_field` / `submit_step` state machine
//! - [`SyncCoordinator`]: optimistic view plus debounced persistence
//! - [`ProcessService`]: ties the above to a [`ProcessStore`]
//!
//! ## Example
//!
//! ```rust
//! use hr_workflow::{Actor, AccessGate, Process, ProcessType, Role, WorkflowEngine};
//! use serde_json::json;
//!
//! let engine = WorkflowEngine::new(AccessGate::default());
//! let mut process = Process::new(ProcessType::Admission, "Ana Silva");
//! let hr = Actor::new(Role::Hr);
//!
//! engine.edit_field(&mut process, &hr, "fullName", json!("Ana Silva")).unwrap();
//! assert_eq!(process.current_step(), 1);
//! ```
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports
//! `pub use` statements create shortcuts so users don't need to know the internal
//! module structure. Instead of `use hr_workflow::models::process::Process`,
//! users can write `use hr_workflow::Process`.

// Core domain models
pub mod models;

// Static flow definitions (steps + co-declared task rules)
pub mod flows;

// Derivation, access gate, state machine, persistence coordination
pub mod engine;

// Layered configuration (defaults, file, environment)
pub mod config;

pub use models::{
    Actor, ChecklistKind, ChecklistTaskRecord, FieldData, Process, ProcessId, ProcessRecord,
    ProcessType, Role, Rule, RuleCondition, RuleEvaluationResult, Step, Task, TaskId,
    TaskSummary,
};

pub use flows::{template_for, ProcessTemplate, TaskDefinition};

pub use engine::{
    access::{can_edit, manager_scope_matches, AccessDecision, AccessGate, DenialReason, ManagerScopePolicy, SectionPermission},
    derivation::{derive_tasks, explain_tasks, summarize, TaskExplanation},
    events::{EventBus, WorkflowEvent, WorkflowEventKind},
    service::ProcessService,
    storage::{InMemoryStorage, ProcessStore, TaskStore},
    sync::{SyncConfig, SyncCoordinator},
    workflow::{EditReceipt, SubmitOutcome, SubmitReceipt, WorkflowEngine},
};

pub use crate::config::HrWorkflowConfig;

use thiserror::Error;

/// Errors produced by the workflow core
///
/// Only the storage-related variants describe infrastructure problems. The rest
/// are recoverable conditions the caller reports to the user: the process is
/// left exactly as it was.
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements the `std::error::Error` trait
/// - `#[error("...")]` provides human-readable error messages
/// - `#[from]` enables automatic conversion from other error types, so `?`
///   works on storage (`anyhow`) or `config` results inside this crate
#[derive(Error, Debug)]
pub enum HrWorkflowError {
    /// The actor may not edit the process at its current step
    #[error("Permission denied for {role} at step {step}: {reason}")]
    PermissionDenied {
        role: Role,
        step: u8,
        reason: DenialReason,
    },

    /// A plain edit or submit tried to write a key owned by the state machine
    #[error("Field '{field}' is maintained by the workflow and cannot be edited")]
    ReservedField { field: String },

    /// No process record with this id
    #[error("Process not found: {id}")]
    ProcessNotFound { id: String },

    /// No checklist task record with this id
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// Governed checklists derive their tasks; they cannot be toggled or extended by hand
    #[error("Checklist {id} is governed by the {kind} workflow; its tasks are derived")]
    GovernedTask { id: String, kind: String },

    /// A workflow operation was attempted on a simple (custom) checklist
    #[error("Checklist {id} is not a governed process")]
    NotGoverned { id: String },

    /// Error when invalid input is provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-related errors
    /// Using anyhow::Error for flexible error handling with any storage backend
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl HrWorkflowError {
    /// True for the conditions the UI shows as a notice rather than a failure
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HrWorkflowError::PermissionDenied { .. }
                | HrWorkflowError::ReservedField { .. }
                | HrWorkflowError::GovernedTask { .. }
                | HrWorkflowError::NotGoverned { .. }
                | HrWorkflowError::InvalidInput(_)
        )
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, HrWorkflowError>;
