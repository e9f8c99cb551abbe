// Checklist tasks - derived for governed processes, stored for simple lists

//! # Tasks
//!
//! Two kinds of task live side by side:
//!
//! - [`Task`]: a line of a governed (admission/demission) checklist. Its
//!   `is_completed` flag is computed from field data and is never set by hand.
//! - [`ChecklistTaskRecord`]: a flat row of a simple to-do checklist, stored in
//!   the task store and toggled directly by the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::process::ProcessId;
use super::role::Role;

/// **Task identifier** - stable key pairing a task with its completion rule
///
/// Identifiers are namespaced by flow, e.g. `"admission.personal_data"`. They
/// never change when the display text of a task changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// ```rust
    /// # use hr_workflow::TaskId;
    /// let id = TaskId::new("admission.vpn");
    /// assert_eq!(id.as_str(), "admission.vpn");
    /// ```
    pub fn new<S: Into<String>>(id: S) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A derived checklist line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub owner_role: Role,
    pub is_completed: bool,
}

/// Completion counts for a task list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,

    /// (completed, total) per owner role
    pub by_role: BTreeMap<String, (usize, usize)>,
}

impl TaskSummary {
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Rounded-down completion percentage; an empty list is 0%
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

/// A flat task row of the record store
///
/// Used only by simple (custom) checklists. `role` is optional because a user
/// adding a to-do line does not assign one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistTaskRecord {
    pub id: Uuid,
    pub checklist_id: ProcessId,
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ChecklistTaskRecord {
    pub fn new<S: Into<String>>(checklist_id: ProcessId, text: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            checklist_id,
            text: text.into(),
            role: None,
            completed: false,
            created_at: Utc::now(),
        }
    }
}
