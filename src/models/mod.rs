// Core domain models for HR workflows
// Plain data: no storage, no timers, no access decisions

//! # Domain Models Module
//!
//! This module contains the data structures the engine operates on:
//!
//! - [`role`]: the closed role enumeration and the acting user
//! - [`field`]: the field-data map and its truthiness helpers
//! - [`rule`]: declarative completion rules
//! - [`task`]: derived checklist tasks and flat task records
//! - [`step`]: static step definitions
//! - [`process`]: the process itself and its stored record
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports for Clean APIs
//! The `pub use` statements at the bottom create a flat API.
//! Users can import `use hr_workflow::models::Process` instead of
//! `use hr_workflow::models::process::Process`.

pub mod field;
pub mod process;
pub mod role;
pub mod rule;
pub mod step;
pub mod task;

pub use field::FieldData;
pub use process::{ChecklistKind, Process, ProcessId, ProcessRecord, ProcessType};
pub use role::{Actor, Role};
pub use rule::{Rule, RuleCondition, RuleEvaluationResult};
pub use step::Step;
pub use task::{ChecklistTaskRecord, Task, TaskId, TaskSummary};
