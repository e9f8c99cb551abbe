// Static flow definitions
// Each task is declared next to the rule that completes it

//! # Flow Templates
//!
//! A [`ProcessTemplate`] is the static description of one governed flow: its
//! ordered steps, each owned by one role, and its ordered task table. Tasks are
//! keyed by a stable [`TaskId`] and carry their completion [`Rule`] inline, so
//! changing the display text of a task can never detach it from its rule.
//!
//! Templates are built once on first use and shared for the life of the
//! process.
//!
//! ## Rust Learning Notes:
//!
//! ### `lazy_static!`
//! `Rule` trees allocate (`String`, `Vec`), so they cannot live in a plain
//! `static`. `lazy_static!` builds the value on first access and hands out
//! `&'static` references afterwards.

pub mod admission;
pub mod demission;

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;

use crate::models::{ProcessType, Role, Rule, Step, TaskId};

/// One row of a task table: identity, display text, owner and rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDefinition {
    pub id: TaskId,
    pub text: String,
    pub owner_role: Role,
    pub rule: Rule,
}

impl TaskDefinition {
    pub fn new(id: &str, text: &str, owner_role: Role, rule: Rule) -> Self {
        Self {
            id: TaskId::new(id),
            text: text.to_string(),
            owner_role,
            rule,
        }
    }
}

/// Static definition of a governed flow
#[derive(Debug, Clone, Serialize)]
pub struct ProcessTemplate {
    pub process_type: ProcessType,
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
    pub tasks: Vec<TaskDefinition>,
}

impl ProcessTemplate {
    pub fn step_count(&self) -> u8 {
        self.steps.len() as u8
    }

    /// Step by 1-based ordinal
    pub fn step(&self, ordinal: u8) -> Option<&Step> {
        self.steps.iter().find(|s| s.ordinal == ordinal)
    }

    /// Step by ordinal, falling back to the last step for out-of-range ordinals
    pub fn step_or_last(&self, ordinal: u8) -> &Step {
        let index = (ordinal.max(1) as usize).min(self.steps.len()) - 1;
        &self.steps[index]
    }

    /// Owner of a step; `None` for any ordinal outside the flow
    pub fn owner_of(&self, ordinal: u8) -> Option<Role> {
        self.step(ordinal).map(|s| s.owner_role)
    }

    /// Check the structural invariants of the template
    ///
    /// Ordinals run 1..=n without gaps, task ids are unique and every task is
    /// owned by a role that owns some step.
    pub fn validate(&self) -> Result<(), String> {
        if self.steps.is_empty() {
            return Err(format!("{} template has no steps", self.process_type));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.ordinal as usize != index + 1 {
                return Err(format!(
                    "{} step '{}' has ordinal {}, expected {}",
                    self.process_type,
                    step.title,
                    step.ordinal,
                    index + 1
                ));
            }
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(&task.id) {
                return Err(format!("duplicate task id '{}'", task.id));
            }
            if !self.steps.iter().any(|s| s.owner_role == task.owner_role) {
                return Err(format!(
                    "task '{}' is owned by {}, which owns no step",
                    task.id, task.owner_role
                ));
            }
        }

        Ok(())
    }
}

lazy_static! {
    static ref ADMISSION: ProcessTemplate = admission::template();
    static ref DEMISSION: ProcessTemplate = demission::template();
}

/// The canonical template of a process type
pub fn template_for(process_type: ProcessType) -> &'static ProcessTemplate {
    match process_type {
        ProcessType::Admission => &ADMISSION,
        ProcessType::Demission => &DEMISSION,
    }
}
