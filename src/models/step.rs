// Static step definitions

use serde::Serialize;

use super::role::Role;

/// One ordinal stage of a process, owned by exactly one role
///
/// `completion_notice` is shown after the owner submits the step. It may contain
/// the placeholder `{managerEmail}`, filled from the process data when the
/// notice is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// 1-based position in the flow
    pub ordinal: u8,
    pub title: String,
    pub owner_role: Role,

    /// Label of the submit action ("Send to IT", "Finalize Admission", ...)
    pub submit_label: String,
    pub completion_notice: String,
}

impl Step {
    pub fn new(ordinal: u8, title: &str, owner_role: Role, submit_label: &str, completion_notice: &str) -> Self {
        Self {
            ordinal,
            title: title.to_string(),
            owner_role,
            submit_label: submit_label.to_string(),
            completion_notice: completion_notice.to_string(),
        }
    }
}
