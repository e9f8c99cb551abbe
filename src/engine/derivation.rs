// Completion derivation - field data in, checklist out

//! # Derivation Engine
//!
//! Turns `(process type, field data)` into the ordered task list. This is the
//! only place a task's `is_completed` flag is computed:
//!
//! 1. Start from the canonical template of the type
//! 2. Evaluate the rule declared next to each task
//! 3. Emit one [`Task`] per template row, in template order
//!
//! The functions here are pure: no clock, no storage, no logging. Calling them
//! twice with the same input yields identical output, which is what lets the
//! state machine re-derive after every merge without tracking diffs.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::flows::template_for;
use crate::models::{FieldData, ProcessType, Role, Task, TaskId, TaskSummary};

/// Derive the checklist of a process from its field data
///
/// ```rust
/// use hr_workflow::{derive_tasks, FieldData, ProcessType};
/// use serde_json::json;
///
/// let mut data = FieldData::new();
/// data.insert("fullName".into(), json!("Bruno Costa"));
///
/// let tasks = derive_tasks(ProcessType::Demission, &data);
/// assert!(tasks[0].is_completed);
/// assert!(!tasks[1].is_completed);
/// ```
pub fn derive_tasks(process_type: ProcessType, data: &FieldData) -> Vec<Task> {
    template_for(process_type)
        .tasks
        .iter()
        .map(|definition| Task {
            id: definition.id.clone(),
            text: definition.text.clone(),
            owner_role: definition.owner_role,
            is_completed: definition.rule.evaluate(data),
        })
        .collect()
}

/// Why a task is (not) done
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskExplanation {
    pub task_id: TaskId,
    pub owner_role: Role,
    pub passed: bool,

    /// Fields the task's rule reads
    pub fields: Vec<String>,

    /// (sub-rule, passed) for composite rules
    pub sub_results: Vec<(String, bool)>,
    pub explanation: String,
}

/// Explain every task of a process against its field data
pub fn explain_tasks(process_type: ProcessType, data: &FieldData) -> Vec<TaskExplanation> {
    template_for(process_type)
        .tasks
        .iter()
        .map(|definition| {
            let result = definition.rule.evaluate_detailed(data);
            TaskExplanation {
                task_id: definition.id.clone(),
                owner_role: definition.owner_role,
                passed: result.passed,
                fields: definition
                    .rule
                    .referenced_fields()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                sub_results: result.sub_results,
                explanation: result.explanation,
            }
        })
        .collect()
}

/// Completion counts, overall and per owner role
pub fn summarize(tasks: &[Task]) -> TaskSummary {
    let mut by_role: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    let mut completed = 0;

    for task in tasks {
        let entry = by_role.entry(task.owner_role.label().to_string()).or_default();
        entry.1 += 1;
        if task.is_completed {
            entry.0 += 1;
            completed += 1;
        }
    }

    TaskSummary {
        total: tasks.len(),
        completed,
        by_role,
    }
}
