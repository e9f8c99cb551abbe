// HR Workflow Engine
// Everything that acts on the domain models: gate, derive, advance, persist

//! # Engine Module
//!
//! The engine is the layer between the plain domain models and the outside
//! world (the presentation layer and the record store).
//!
//! ## Engine Components
//!
//! ### Derivation (`derivation` module)
//! - Pure `(process type, field data) -> tasks`
//! - Explanations of open tasks and completion summaries
//!
//! ### Access Gate (`access` module)
//! - Step ownership, the Admin override and the manager scope predicate
//! - Per-section permissions for read-only banners
//!
//! ### State Machine (`workflow` module)
//! - `edit_field` and `submit_step`, both gated
//! - Handoff outcomes and user notices
//!
//! ### Persistence (`storage` and `sync` modules)
//! - Async record store traits and an in-memory implementation
//! - Optimistic live view with debounced, cancel-and-reschedule writes
//!
//! ### Events (`events` module)
//! - Broadcast bus for created / edited / rejected / submitted / synced
//!
//! ### Service (`service` module)
//! - Id-based facade tying all of the above together, plus simple checklists
//!
//! ## Rust Learning Notes:
//!
//! ### Module Organization Pattern
//! `engine/mod.rs` is the module root: it declares the submodules and
//! re-exports the types callers need, hiding the file layout behind a flat API.

pub mod access;
pub mod derivation;
pub mod events;
pub mod service;
pub mod storage;
pub mod sync;
pub mod workflow;

#[cfg(test)]
mod scenario_tests;

pub use access::{AccessDecision, AccessGate, DenialReason, ManagerScopePolicy, SectionPermission};
pub use derivation::{derive_tasks, explain_tasks, summarize, TaskExplanation};
pub use events::{EventBus, WorkflowEvent, WorkflowEventKind};
pub use service::ProcessService;
pub use storage::{InMemoryStorage, ProcessStore, TaskStore};
pub use sync::{SyncConfig, SyncCoordinator};
pub use workflow::{EditReceipt, SubmitOutcome, SubmitReceipt, WorkflowEngine};
