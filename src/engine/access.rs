// Section access gate - who may edit which step

//! # Access Gate
//!
//! Every mutation of a process goes through one question: may this actor edit
//! the process at its current step? The answer depends on two things:
//!
//! - **Ownership**: each step has exactly one owner role (see the flow
//!   templates). Only that role may edit, and only while the process sits at
//!   that step. [`Role::Admin`] overrides ownership for any step.
//! - **Manager scope**: with [`ManagerScopePolicy::Strict`] a manager must also
//!   belong to the department (and, where one is recorded, the sales region)
//!   of the employee. This is a separate, named predicate,
//!   [`manager_scope_matches`], so the rule stays visible on its own.
//!
//! The gate is pure: no storage, no clock, no ambient user. The acting user is
//! always passed in.
//!
//! ## Rust Learning Notes:
//!
//! ### Decisions as Data
//! [`AccessGate::decide`] returns an [`AccessDecision`] enum instead of a bare
//! `bool`. Callers that only need yes/no call `.is_allowed()`, while the state
//! machine turns a denial into an error carrying the reason.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flows::template_for;
use crate::models::field::{self, FieldData};
use crate::models::{Actor, Process, ProcessType, Role};

const DEPARTMENT_FIELD: &str = "department";
const SALES_REGION_FIELD: &str = "salesRegion";

/// How strictly the manager step is scoped
///
/// Settings files spell the variants `strict` / `role_only`; the command line
/// takes `strict` / `role-only`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ManagerScopePolicy {
    /// Manager must match the recorded department and sales region
    #[default]
    Strict,
    /// Any manager may edit the manager step
    RoleOnly,
}

/// Why an edit was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    /// The step belongs to another role (`None` for an ordinal outside the flow)
    NotStepOwner { owner: Option<Role> },
    /// The identity store handed us a role the core does not know
    UnrecognizedRole,
    /// A manager outside the employee's department or sales region
    OutsideManagerScope,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::NotStepOwner { owner: Some(owner) } => {
                write!(f, "this step is owned by {}", owner)
            }
            DenialReason::NotStepOwner { owner: None } => write!(f, "no such step"),
            DenialReason::UnrecognizedRole => write!(f, "unrecognized role"),
            DenialReason::OutsideManagerScope => {
                write!(f, "manager is outside the employee's department or region")
            }
        }
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AccessDecision {
    AllowedAsOwner,
    AllowedAsOverride,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Denied(_))
    }

    pub fn denial(&self) -> Option<&DenialReason> {
        match self {
            AccessDecision::Denied(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Ownership-only check
///
/// True for the override role regardless of step; otherwise true only when the
/// actor's role owns `current_step`. Unknown roles and out-of-range steps are
/// always denied.
///
/// ```rust
/// use hr_workflow::{can_edit, Actor, ProcessType, Role};
///
/// assert!(can_edit(ProcessType::Admission, 1, &Actor::new(Role::Hr)));
/// assert!(!can_edit(ProcessType::Admission, 2, &Actor::new(Role::Hr)));
/// assert!(can_edit(ProcessType::Demission, 4, &Actor::new(Role::Admin)));
/// ```
pub fn can_edit(process_type: ProcessType, current_step: u8, actor: &Actor) -> bool {
    ownership(process_type, current_step, actor).is_allowed()
}

fn ownership(process_type: ProcessType, current_step: u8, actor: &Actor) -> AccessDecision {
    if actor.role == Role::Unrecognized {
        return AccessDecision::Denied(DenialReason::UnrecognizedRole);
    }
    if actor.role.is_override() {
        return AccessDecision::AllowedAsOverride;
    }

    match template_for(process_type).owner_of(current_step) {
        Some(owner) if owner == actor.role => AccessDecision::AllowedAsOwner,
        owner => AccessDecision::Denied(DenialReason::NotStepOwner { owner }),
    }
}

/// Whether a manager belongs to the employee's department and sales region
///
/// Non-manager actors always match. For a manager, the recorded `department`
/// must equal the actor's department, and when the process records a
/// `salesRegion` the actor's region must equal it too. Comparison is trimmed
/// and case-insensitive; a missing value on either side of a required
/// comparison is a mismatch.
pub fn manager_scope_matches(actor: &Actor, data: &FieldData) -> bool {
    if actor.role != Role::Manager {
        return true;
    }

    let department_matches = same_text(actor.department.as_deref(), field::text(data, DEPARTMENT_FIELD));
    let region_matches = match field::text(data, SALES_REGION_FIELD) {
        Some(region) => same_text(actor.region.as_deref(), Some(region)),
        None => true,
    };

    department_matches && region_matches
}

fn same_text(a: Option<&str>, b: Option<&str>) -> bool {
    match (a.map(str::trim), b.map(str::trim)) {
        (Some(a), Some(b)) if !a.is_empty() => a.to_lowercase() == b.to_lowercase(),
        _ => false,
    }
}

/// One row of the per-step permission listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionPermission {
    pub ordinal: u8,
    pub title: String,
    pub owner_role: Role,
    pub is_current: bool,
    pub can_edit: bool,

    /// Read-only banner text when the section is current but not editable
    pub notice: Option<String>,
}

/// The configured gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessGate {
    policy: ManagerScopePolicy,
}

impl AccessGate {
    pub fn new(policy: ManagerScopePolicy) -> Self {
        Self { policy }
    }

    /// Full decision for an actor against a step and the process data
    pub fn decide(
        &self,
        process_type: ProcessType,
        current_step: u8,
        actor: &Actor,
        data: &FieldData,
    ) -> AccessDecision {
        let decision = ownership(process_type, current_step, actor);

        if decision == AccessDecision::AllowedAsOwner
            && self.policy == ManagerScopePolicy::Strict
            && !manager_scope_matches(actor, data)
        {
            return AccessDecision::Denied(DenialReason::OutsideManagerScope);
        }

        decision
    }

    pub fn decide_for(&self, process: &Process, actor: &Actor) -> AccessDecision {
        self.decide(
            process.process_type(),
            process.current_step(),
            actor,
            process.field_data(),
        )
    }

    /// Editability of every section of a process, for rendering
    ///
    /// Only the current section can ever be editable; earlier and later
    /// sections are always read-only.
    pub fn section_permissions(&self, process: &Process, actor: &Actor) -> Vec<SectionPermission> {
        let current = process.current_step();
        let decision = self.decide_for(process, actor);

        process
            .template()
            .steps
            .iter()
            .map(|step| {
                let is_current = step.ordinal == current;
                let can_edit = is_current && decision.is_allowed();
                let notice = match decision.denial() {
                    Some(reason) if is_current => Some(format!(
                        "View only: you cannot edit this step ({}): {}",
                        step.owner_role, reason
                    )),
                    _ => None,
                };

                SectionPermission {
                    ordinal: step.ordinal,
                    title: step.title.clone(),
                    owner_role: step.owner_role,
                    is_current,
                    can_edit,
                    notice,
                }
            })
            .collect()
    }
}
