// Workflow state machine - edit and submit

//! # Workflow State Machine
//!
//! A governed process is a straight line of steps:
//!
//! ```text
//! step 1 ──submit──▶ step 2 ──submit──▶ … ──submit──▶ step n ──submit──▶ (complete)
//! ```
//!
//! Two operations mutate it, both guarded by the [`AccessGate`]:
//!
//! - [`WorkflowEngine::edit_field`] merges one field; the step does not move.
//! - [`WorkflowEngine::submit_step`] merges the whole step payload and hands
//!   the process to the next owner, or marks it complete at the last step.
//!
//! A refused call returns an error and leaves the process exactly as it was.
//! Submitting an already completed process is not an error: it reports
//! [`SubmitOutcome::AlreadyComplete`] and changes nothing.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::engine::access::{AccessDecision, AccessGate};
use crate::models::field::{self, FieldData};
use crate::models::{Actor, Process, Role, Task, TaskId};
use crate::{HrWorkflowError, Result};

const MANAGER_EMAIL_FIELD: &str = "managerEmail";
const MANAGER_EMAIL_PLACEHOLDER: &str = "{managerEmail}";

/// What a successful edit changed in the checklist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditReceipt {
    pub field: String,
    pub decision: AccessDecision,
    pub newly_completed: Vec<TaskId>,
    pub reopened: Vec<TaskId>,
}

/// Where a submit left the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmitOutcome {
    /// Moved from one owner to the next
    HandedOff { from_step: u8, to_step: u8, to_role: Role },
    /// The last step was submitted; the process is complete
    Finalized { step: u8 },
    /// The process was already complete; nothing changed
    AlreadyComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReceipt {
    pub outcome: SubmitOutcome,

    /// Message for the user who submitted
    pub notice: String,
    pub newly_completed: Vec<TaskId>,
}

/// Gated mutations of a [`Process`]
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    gate: AccessGate,
}

impl WorkflowEngine {
    pub fn new(gate: AccessGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Merge a single field into the process
    ///
    /// ## Errors
    /// - `PermissionDenied` when the actor may not edit the current step
    /// - `ReservedField` for the step pointer or completion marker
    /// - `InvalidInput` for a blank field name
    pub fn edit_field(
        &self,
        process: &mut Process,
        actor: &Actor,
        field: &str,
        value: Value,
    ) -> Result<EditReceipt> {
        let decision = self.authorize(process, actor)?;

        if field.trim().is_empty() {
            return Err(HrWorkflowError::InvalidInput("field name is empty".to_string()));
        }
        if field::is_reserved(field) {
            return Err(HrWorkflowError::ReservedField {
                field: field.to_string(),
            });
        }

        let before = process.tasks().to_vec();
        process.merge_fields(std::iter::once((field.to_string(), value)));
        let (newly_completed, reopened) = task_changes(&before, process.tasks());

        debug!(
            process_id = %process.id(),
            role = %actor.role,
            field,
            step = process.current_step(),
            "Field edited"
        );

        Ok(EditReceipt {
            field: field.to_string(),
            decision,
            newly_completed,
            reopened,
        })
    }

    /// Merge a step payload and hand the process on
    ///
    /// ## Errors
    /// - `PermissionDenied` when the actor may not edit the current step
    /// - `ReservedField` when the payload names a reserved key
    pub fn submit_step(
        &self,
        process: &mut Process,
        actor: &Actor,
        payload: FieldData,
    ) -> Result<SubmitReceipt> {
        self.authorize(process, actor)?;

        if process.is_complete() {
            debug!(process_id = %process.id(), "Submit on completed process ignored");
            return Ok(SubmitReceipt {
                outcome: SubmitOutcome::AlreadyComplete,
                notice: "This process is already complete.".to_string(),
                newly_completed: Vec::new(),
            });
        }

        if let Some(reserved) = payload.keys().find(|k| field::is_reserved(k)) {
            return Err(HrWorkflowError::ReservedField {
                field: reserved.clone(),
            });
        }

        let before = process.tasks().to_vec();
        let from_step = process.current_step();
        let step = process.current_step_definition();

        process.merge_fields(payload);

        let outcome = if from_step < process.step_count() {
            let to_step = from_step + 1;
            process.advance_to(to_step);
            SubmitOutcome::HandedOff {
                from_step,
                to_step,
                to_role: process.current_step_definition().owner_role,
            }
        } else {
            process.mark_complete();
            SubmitOutcome::Finalized { step: from_step }
        };

        let (newly_completed, _) = task_changes(&before, process.tasks());
        let notice = render_notice(&step.completion_notice, process.field_data());

        info!(
            process_id = %process.id(),
            process_type = %process.process_type(),
            role = %actor.role,
            from_step,
            to_step = process.current_step(),
            completed = newly_completed.len(),
            "Step submitted"
        );

        Ok(SubmitReceipt {
            outcome,
            notice,
            newly_completed,
        })
    }

    fn authorize(&self, process: &Process, actor: &Actor) -> Result<AccessDecision> {
        let decision = self.gate.decide_for(process, actor);

        match decision.denial() {
            None => Ok(decision),
            Some(reason) => {
                warn!(
                    process_id = %process.id(),
                    role = %actor.role,
                    step = process.current_step(),
                    %reason,
                    "Edit rejected"
                );
                Err(HrWorkflowError::PermissionDenied {
                    role: actor.role,
                    step: process.current_step(),
                    reason: reason.clone(),
                })
            }
        }
    }
}

/// Fill `{managerEmail}` from the process data
fn render_notice(template: &str, data: &FieldData) -> String {
    let manager = field::text(data, MANAGER_EMAIL_FIELD).unwrap_or("the manager");
    template.replace(MANAGER_EMAIL_PLACEHOLDER, manager)
}

/// (newly completed, reopened) between two derivations of the same template
fn task_changes(before: &[Task], after: &[Task]) -> (Vec<TaskId>, Vec<TaskId>) {
    let mut completed = Vec::new();
    let mut reopened = Vec::new();

    for (old, new) in before.iter().zip(after) {
        match (old.is_completed, new.is_completed) {
            (false, true) => completed.push(new.id.clone()),
            (true, false) => reopened.push(new.id.clone()),
            _ => {}
        }
    }

    (completed, reopened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::access::{DenialReason, ManagerScopePolicy};
    use crate::models::ProcessType;
    use serde_json::json;

    fn payload(pairs: &[(&str, Value)]) -> FieldData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn engine() -> WorkflowEngine {
        WorkflowEngine::new(AccessGate::new(ManagerScopePolicy::RoleOnly))
    }

    #[test]
    fn test_edit_reports_completed_tasks() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let hr = Actor::new(Role::Hr);

        let receipt = engine()
            .edit_field(&mut process, &hr, "fullName", json!("Ana"))
            .unwrap();
        assert!(receipt.newly_completed.is_empty());
        assert_eq!(receipt.decision, AccessDecision::AllowedAsOwner);

        let receipt = engine()
            .edit_field(&mut process, &hr, "taxId", json!("123"))
            .unwrap();
        assert_eq!(receipt.newly_completed, vec![TaskId::from("admission.personal_data")]);
        assert_eq!(process.current_step(), 1);
    }

    #[test]
    fn test_edit_reports_reopened_tasks() {
        let mut process = Process::new(ProcessType::Demission, "x");
        let hr = Actor::new(Role::Hr);
        engine().edit_field(&mut process, &hr, "fullName", json!("Bruno")).unwrap();

        let receipt = engine().edit_field(&mut process, &hr, "fullName", json!("")).unwrap();
        assert_eq!(receipt.reopened, vec![TaskId::from("demission.notice")]);
    }

    #[test]
    fn test_denied_edit_leaves_process_untouched() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let before = process.clone();

        let err = engine()
            .edit_field(&mut process, &Actor::new(Role::It), "vpnConfigured", json!("Yes"))
            .unwrap_err();

        assert!(matches!(
            err,
            HrWorkflowError::PermissionDenied {
                role: Role::It,
                step: 1,
                reason: DenialReason::NotStepOwner { owner: Some(Role::Hr) }
            }
        ));
        assert!(err.is_recoverable());
        assert_eq!(process, before);
    }

    #[test]
    fn test_reserved_fields_rejected() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let hr = Actor::new(Role::Hr);

        let err = engine()
            .edit_field(&mut process, &hr, "currentSection", json!(4))
            .unwrap_err();
        assert!(matches!(err, HrWorkflowError::ReservedField { .. }));

        let err = engine()
            .submit_step(&mut process, &hr, payload(&[("processCompleted", json!(true))]))
            .unwrap_err();
        assert!(matches!(err, HrWorkflowError::ReservedField { .. }));
        assert_eq!(process.current_step(), 1);
        assert!(!process.is_complete());
    }

    #[test]
    fn test_blank_field_name_rejected() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let err = engine()
            .edit_field(&mut process, &Actor::new(Role::Hr), "  ", json!("x"))
            .unwrap_err();
        assert!(matches!(err, HrWorkflowError::InvalidInput(_)));
    }

    #[test]
    fn test_submit_walks_every_step_then_finalizes() {
        let mut process = Process::new(ProcessType::Demission, "x");
        let owners = [Role::Hr, Role::Manager, Role::It, Role::Payroll];

        for (index, role) in owners.iter().enumerate() {
            let receipt = engine()
                .submit_step(&mut process, &Actor::new(*role), FieldData::new())
                .unwrap();
            let from_step = index as u8 + 1;

            if from_step < 4 {
                assert_eq!(
                    receipt.outcome,
                    SubmitOutcome::HandedOff {
                        from_step,
                        to_step: from_step + 1,
                        to_role: owners[index + 1],
                    }
                );
            } else {
                assert_eq!(receipt.outcome, SubmitOutcome::Finalized { step: 4 });
            }
        }

        assert_eq!(process.current_step(), 4);
        assert!(process.is_complete());
        assert_eq!(process.progress_percent(), 100);
    }

    #[test]
    fn test_submit_after_completion_is_a_no_op() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let admin = Actor::new(Role::Admin);
        for _ in 0..4 {
            engine().submit_step(&mut process, &admin, FieldData::new()).unwrap();
        }
        let before = process.clone();

        let receipt = engine()
            .submit_step(&mut process, &admin, payload(&[("employeeNotes", json!("late"))]))
            .unwrap();

        assert_eq!(receipt.outcome, SubmitOutcome::AlreadyComplete);
        assert_eq!(process, before);
    }

    #[test]
    fn test_admission_notice_names_manager_email() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let receipt = engine()
            .submit_step(
                &mut process,
                &Actor::new(Role::Hr),
                payload(&[("managerEmail", json!("carla@example.com"))]),
            )
            .unwrap();
        assert!(receipt.notice.contains("carla@example.com"));

        let mut process = Process::new(ProcessType::Admission, "y");
        let receipt = engine()
            .submit_step(&mut process, &Actor::new(Role::Hr), FieldData::new())
            .unwrap();
        assert!(receipt.notice.contains("the manager"));
        assert!(!receipt.notice.contains('{'));
    }

    #[test]
    fn test_each_step_has_distinct_notice() {
        let mut process = Process::new(ProcessType::Admission, "x");
        let admin = Actor::new(Role::Admin);
        let mut notices = Vec::new();
        for _ in 0..4 {
            notices.push(engine().submit_step(&mut process, &admin, FieldData::new()).unwrap().notice);
        }
        notices.sort();
        notices.dedup();
        assert_eq!(notices.len(), 4);
    }

    #[test]
    fn test_strict_gate_blocks_manager_from_other_department() {
        let strict = WorkflowEngine::default();
        let mut process = Process::new(ProcessType::Admission, "x");
        strict
            .submit_step(
                &mut process,
                &Actor::new(Role::Hr),
                payload(&[("department", json!("Marketing"))]),
            )
            .unwrap();

        let outsider = Actor::new(Role::Manager).with_department("Sales");
        let err = strict
            .submit_step(&mut process, &outsider, FieldData::new())
            .unwrap_err();
        assert!(matches!(
            err,
            HrWorkflowError::PermissionDenied {
                reason: DenialReason::OutsideManagerScope,
                ..
            }
        ));
        assert_eq!(process.current_step(), 2);
    }
}
