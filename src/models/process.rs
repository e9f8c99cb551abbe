// Process domain model - one onboarding or offboarding case

//! # Process Models
//!
//! - [`Process`]: the live, in-memory case the state machine works on
//! - [`ProcessRecord`]: the whole-record shape written to the record store
//! - [`ProcessType`] / [`ChecklistKind`]: governed flow types vs. simple lists
//!
//! A `Process` keeps its fields private so that the invariants hold by
//! construction:
//!
//! - `current_step` stays inside `[1, step_count]` and never goes backwards
//! - `tasks` is always exactly `derive_tasks(process_type, field_data)`
//! - field data only grows or is overwritten, never loses keys
//!
//! ## Rust Learning Notes:
//!
//! ### Encapsulation
//! Fields without `pub` can only be touched inside the crate through the
//! `pub(crate)` mutators below, which the state machine uses. Callers get
//! read-only getters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use uuid::Uuid;

use super::field::{self, FieldData, CURRENT_SECTION_KEY, PROCESS_COMPLETED_KEY};
use super::step::Step;
use super::task::{Task, TaskSummary};
use crate::engine::derivation;
use crate::flows::{template_for, ProcessTemplate};
use crate::{HrWorkflowError, Result};

/// Opaque process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub Uuid);

impl ProcessId {
    pub fn new() -> Self {
        ProcessId(Uuid::new_v4())
    }
}

impl Default for ProcessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ProcessId {
    fn from(id: Uuid) -> Self {
        ProcessId(id)
    }
}

/// The governed flow types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    /// Onboarding: HR → Manager → IT → Employee
    Admission,
    /// Offboarding: HR → Manager → IT → Payroll
    Demission,
}

impl ProcessType {
    pub const ALL: [ProcessType; 2] = [ProcessType::Admission, ProcessType::Demission];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Admission => "admission",
            ProcessType::Demission => "demission",
        }
    }

    /// Parse a type token, accepting the labels used by older records
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "admission" | "admissao" | "admissão" | "processo de admissão" | "onboarding" => {
                Some(ProcessType::Admission)
            }
            "demission" | "demissao" | "demissão" | "processo de demissão" | "offboarding" => {
                Some(ProcessType::Demission)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a stored checklist record
///
/// The record store keeps governed processes and simple to-do lists in the
/// same collection; only the governed kinds go through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistKind {
    Admission,
    Demission,
    Custom,
}

impl ChecklistKind {
    /// The governed flow behind this kind, if any
    pub fn process_type(&self) -> Option<ProcessType> {
        match self {
            ChecklistKind::Admission => Some(ProcessType::Admission),
            ChecklistKind::Demission => Some(ProcessType::Demission),
            ChecklistKind::Custom => None,
        }
    }

    pub fn is_governed(&self) -> bool {
        self.process_type().is_some()
    }
}

impl From<ProcessType> for ChecklistKind {
    fn from(process_type: ProcessType) -> Self {
        match process_type {
            ProcessType::Admission => ChecklistKind::Admission,
            ProcessType::Demission => ChecklistKind::Demission,
        }
    }
}

impl fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.process_type() {
            Some(process_type) => write!(f, "{}", process_type),
            None => write!(f, "custom"),
        }
    }
}

/// Whole record as read from and written to the record store
///
/// Only title, kind and data are persisted; tasks are a view and are derived
/// again whenever the record is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub title: String,
    pub kind: ChecklistKind,

    #[serde(default)]
    pub data: FieldData,

    pub created_at: DateTime<Utc>,
}

impl ProcessRecord {
    /// A fresh simple (custom) checklist record
    pub fn custom<S: Into<String>>(title: S) -> Self {
        Self {
            id: ProcessId::new(),
            title: title.into(),
            kind: ChecklistKind::Custom,
            data: FieldData::new(),
            created_at: Utc::now(),
        }
    }
}

/// One onboarding or offboarding case
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    id: ProcessId,
    process_type: ProcessType,
    title: String,
    current_step: u8,
    field_data: FieldData,
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Process {
    /// Create an empty process at step 1 with its task template seeded
    pub fn new<S: Into<String>>(process_type: ProcessType, title: S) -> Self {
        let now = Utc::now();
        let mut field_data = FieldData::new();
        field_data.insert(CURRENT_SECTION_KEY.to_string(), json!(1));

        let tasks = derivation::derive_tasks(process_type, &field_data);

        Self {
            id: ProcessId::new(),
            process_type,
            title: title.into(),
            current_step: 1,
            field_data,
            tasks,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hydrate a governed process from its stored record
    ///
    /// The step pointer is read back from the field data, defaulting to 1 and
    /// clamped into the valid range of the flow.
    pub fn from_record(record: ProcessRecord) -> Result<Self> {
        let process_type = record
            .kind
            .process_type()
            .ok_or_else(|| HrWorkflowError::NotGoverned {
                id: record.id.to_string(),
            })?;

        let step_count = template_for(process_type).step_count() as u64;
        let current_step = field::stored_step(&record.data).unwrap_or(1).clamp(1, step_count) as u8;

        let mut field_data = record.data;
        field_data.insert(CURRENT_SECTION_KEY.to_string(), json!(current_step));
        let tasks = derivation::derive_tasks(process_type, &field_data);

        Ok(Self {
            id: record.id,
            process_type,
            title: record.title,
            current_step,
            field_data,
            tasks,
            created_at: record.created_at,
            updated_at: Utc::now(),
        })
    }

    /// Record shape for the store: title, kind and field data
    pub fn to_record(&self) -> ProcessRecord {
        ProcessRecord {
            id: self.id,
            title: self.title.clone(),
            kind: self.process_type.into(),
            data: self.field_data.clone(),
            created_at: self.created_at,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn process_type(&self) -> ProcessType {
        self.process_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rename the process; has no effect on the workflow
    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn field_data(&self) -> &FieldData {
        &self.field_data
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.field_data.get(name)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn template(&self) -> &'static ProcessTemplate {
        template_for(self.process_type)
    }

    pub fn step_count(&self) -> u8 {
        self.template().step_count()
    }

    /// Definition of the step the process is waiting on
    pub fn current_step_definition(&self) -> &'static Step {
        self.template().step_or_last(self.current_step)
    }

    /// True once the last step has been submitted
    pub fn is_complete(&self) -> bool {
        self.field_data.get(PROCESS_COMPLETED_KEY) == Some(&Value::Bool(true))
    }

    /// Position in the flow as shown by the progress bar
    pub fn progress_percent(&self) -> u8 {
        ((self.current_step as u32 * 100) / self.step_count() as u32) as u8
    }

    pub fn summary(&self) -> TaskSummary {
        derivation::summarize(&self.tasks)
    }

    /// Merge fields (overwrite, never delete) and derive the task list again
    pub(crate) fn merge_fields<I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (name, value) in fields {
            self.field_data.insert(name, value);
        }
        self.refresh();
    }

    /// Move the step pointer forward; a smaller or out-of-range ordinal is ignored
    pub(crate) fn advance_to(&mut self, step: u8) {
        if step > self.current_step && step <= self.step_count() {
            self.current_step = step;
            self.field_data
                .insert(CURRENT_SECTION_KEY.to_string(), json!(step));
            self.refresh();
        }
    }

    pub(crate) fn mark_complete(&mut self) {
        self.field_data
            .insert(PROCESS_COMPLETED_KEY.to_string(), Value::Bool(true));
        self.refresh();
    }

    fn refresh(&mut self) {
        self.tasks = derivation::derive_tasks(self.process_type, &self.field_data);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_starts_at_step_one_with_open_tasks() {
        let process = Process::new(ProcessType::Admission, "Admission - Ana");

        assert_eq!(process.current_step(), 1);
        assert_eq!(process.field(CURRENT_SECTION_KEY), Some(&json!(1)));
        assert_eq!(process.tasks().len(), 17);
        assert!(process.tasks().iter().all(|t| !t.is_completed));
        assert!(!process.is_complete());
        assert_eq!(process.progress_percent(), 25);
    }

    #[test]
    fn test_record_round_trip_keeps_step_pointer() {
        let mut process = Process::new(ProcessType::Demission, "Demission - Bruno");
        process.merge_fields(vec![("fullName".to_string(), json!("Bruno Costa"))]);
        process.advance_to(3);

        let record = process.to_record();
        assert_eq!(record.kind, ChecklistKind::Demission);
        assert_eq!(record.data.get(CURRENT_SECTION_KEY), Some(&json!(3)));

        let restored = Process::from_record(record).unwrap();
        assert_eq!(restored.id(), process.id());
        assert_eq!(restored.current_step(), 3);
        assert_eq!(restored.tasks(), process.tasks());
    }

    #[test]
    fn test_from_record_clamps_step_pointer() {
        let mut record = Process::new(ProcessType::Admission, "x").to_record();
        record.data.insert(CURRENT_SECTION_KEY.into(), json!(9));
        assert_eq!(Process::from_record(record.clone()).unwrap().current_step(), 4);

        record.data.insert(CURRENT_SECTION_KEY.into(), json!(0));
        assert_eq!(Process::from_record(record.clone()).unwrap().current_step(), 1);

        record.data.remove(CURRENT_SECTION_KEY);
        assert_eq!(Process::from_record(record).unwrap().current_step(), 1);
    }

    #[test]
    fn test_from_record_rejects_custom_lists() {
        let record = ProcessRecord::custom("Groceries");
        let err = Process::from_record(record).unwrap_err();
        assert!(matches!(err, HrWorkflowError::NotGoverned { .. }));
    }

    #[test]
    fn test_advance_never_goes_backwards_or_past_the_end() {
        let mut process = Process::new(ProcessType::Admission, "x");
        process.advance_to(2);
        process.advance_to(1);
        assert_eq!(process.current_step(), 2);

        process.advance_to(5);
        assert_eq!(process.current_step(), 2);
    }

    #[test]
    fn test_process_type_parse() {
        assert_eq!(ProcessType::parse("Processo de Admissão"), Some(ProcessType::Admission));
        assert_eq!(ProcessType::parse("demission"), Some(ProcessType::Demission));
        assert_eq!(ProcessType::parse("Custom List"), None);
    }

    #[test]
    fn test_checklist_kind_serde() {
        assert_eq!(serde_json::to_value(ChecklistKind::Custom).unwrap(), json!("custom"));
        assert_eq!(ChecklistKind::from(ProcessType::Admission).process_type(), Some(ProcessType::Admission));
        assert!(!ChecklistKind::Custom.is_governed());
    }
}
