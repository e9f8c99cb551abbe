// Process service - the entry point a presentation layer calls

//! # Process Service
//!
//! Wires the pieces together for callers that work with process ids rather
//! than in-memory values:
//!
//! ```text
//! caller ──▶ ProcessService ──▶ WorkflowEngine (gate + merge + derive)
//!                 │                    │
//!                 │                    ▼
//!                 └──────────────▶ SyncCoordinator ──(quiet period)──▶ ProcessStore
//! ```
//!
//! Reads prefer the coordinator's live view while a write for that process is
//! still pending or in flight, so a caller always sees its own edits. Otherwise
//! every operation reads the process back from the record store, merges into
//! it and hands the result to the coordinator.
//!
//! The service also runs simple (custom) checklists. Their task rows are
//! stored and toggled by hand, and governed processes never accept those
//! operations.

use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::HrWorkflowConfig;
use crate::engine::access::{AccessGate, SectionPermission};
use crate::engine::derivation::{explain_tasks, TaskExplanation};
use crate::engine::events::{EventBus, WorkflowEventKind};
use crate::engine::storage::{ProcessStore, TaskStore};
use crate::engine::sync::{SyncConfig, SyncCoordinator};
use crate::engine::workflow::{EditReceipt, SubmitOutcome, SubmitReceipt, WorkflowEngine};
use crate::models::{
    Actor, ChecklistKind, ChecklistTaskRecord, FieldData, Process, ProcessId, ProcessRecord,
    ProcessType,
};
use crate::{HrWorkflowError, Result};

pub struct ProcessService {
    processes: Arc<dyn ProcessStore>,
    tasks: Arc<dyn TaskStore>,
    engine: WorkflowEngine,
    sync: SyncCoordinator,
    events: EventBus,
}

impl ProcessService {
    /// Service over one backend that stores both records and task rows
    pub fn new<S>(storage: Arc<S>, gate: AccessGate, sync: SyncConfig, events: EventBus) -> Self
    where
        S: ProcessStore + TaskStore + 'static,
    {
        let processes: Arc<dyn ProcessStore> = storage.clone();
        let tasks: Arc<dyn TaskStore> = storage;
        Self::from_parts(processes, tasks, WorkflowEngine::new(gate), sync, events)
    }

    /// Service configured from loaded settings
    pub fn from_config<S>(storage: Arc<S>, config: &HrWorkflowConfig) -> Self
    where
        S: ProcessStore + TaskStore + 'static,
    {
        Self::new(
            storage,
            AccessGate::new(config.manager_scope_policy()),
            config.sync_config(),
            EventBus::new(config.events.buffer),
        )
    }

    pub fn from_parts(
        processes: Arc<dyn ProcessStore>,
        tasks: Arc<dyn TaskStore>,
        engine: WorkflowEngine,
        sync: SyncConfig,
        events: EventBus,
    ) -> Self {
        let sync = SyncCoordinator::new(processes.clone(), events.clone(), sync);
        Self {
            processes,
            tasks,
            engine,
            sync,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    // Governed processes

    /// Create a process at step 1 and store it right away
    pub async fn create_process(&self, process_type: ProcessType, title: &str) -> Result<Process> {
        let process = Process::new(process_type, title);
        self.processes.create_process(process.to_record()).await?;

        info!(process_id = %process.id(), %process_type, title, "Process created");
        self.events
            .emit(process.id(), WorkflowEventKind::ProcessCreated { process_type });

        Ok(process)
    }

    /// Current state of a process: the unsaved live view, or the stored record
    pub async fn open(&self, id: &ProcessId) -> Result<Process> {
        if let Some(process) = self.sync.view(id) {
            return Ok(process);
        }

        let record = self
            .processes
            .get_process(id)
            .await?
            .ok_or_else(|| HrWorkflowError::ProcessNotFound { id: id.to_string() })?;

        Process::from_record(record)
    }

    pub async fn edit_field(
        &self,
        id: &ProcessId,
        actor: &Actor,
        field: &str,
        value: Value,
    ) -> Result<(Process, EditReceipt)> {
        let mut process = self.open(id).await?;

        match self.engine.edit_field(&mut process, actor, field, value) {
            Ok(receipt) => {
                self.sync.schedule_sync(&process);
                self.events.emit(
                    *id,
                    WorkflowEventKind::FieldEdited {
                        field: field.to_string(),
                        role: actor.role,
                    },
                );
                Ok((process, receipt))
            }
            Err(e) => Err(self.report_rejection(id, e)),
        }
    }

    pub async fn submit_step(
        &self,
        id: &ProcessId,
        actor: &Actor,
        payload: FieldData,
    ) -> Result<(Process, SubmitReceipt)> {
        let mut process = self.open(id).await?;
        let from_step = process.current_step();

        match self.engine.submit_step(&mut process, actor, payload) {
            Ok(receipt) => {
                if receipt.outcome != SubmitOutcome::AlreadyComplete {
                    self.sync.schedule_sync(&process);
                    self.events.emit(
                        *id,
                        WorkflowEventKind::StepSubmitted {
                            from_step,
                            to_step: process.current_step(),
                            role: actor.role,
                            completed: process.is_complete(),
                        },
                    );
                }
                Ok((process, receipt))
            }
            Err(e) => Err(self.report_rejection(id, e)),
        }
    }

    fn report_rejection(&self, id: &ProcessId, error: HrWorkflowError) -> HrWorkflowError {
        if let HrWorkflowError::PermissionDenied { role, step, reason } = &error {
            self.events.emit(
                *id,
                WorkflowEventKind::EditRejected {
                    role: *role,
                    step: *step,
                    reason: reason.clone(),
                },
            );
        }
        error
    }

    /// Rename a process; the title has no effect on the workflow
    pub async fn rename(&self, id: &ProcessId, title: &str) -> Result<Process> {
        let mut process = self.open(id).await?;
        process.set_title(title);
        self.sync.schedule_sync(&process);
        Ok(process)
    }

    /// Governed processes, newest first, optionally of one type
    pub async fn list_processes(&self, process_type: Option<ProcessType>) -> Result<Vec<Process>> {
        let records = match process_type {
            Some(process_type) => {
                self.processes
                    .list_processes(Some(ChecklistKind::from(process_type)))
                    .await?
            }
            None => self.processes.list_processes(None).await?,
        };

        let mut processes = Vec::with_capacity(records.len());
        for record in records {
            if !record.kind.is_governed() {
                continue;
            }
            let process = match self.sync.view(&record.id) {
                Some(live) => live,
                None => Process::from_record(record)?,
            };
            processes.push(process);
        }
        Ok(processes)
    }

    /// How many open processes of a type are waiting at a step
    pub async fn count_at_step(&self, process_type: ProcessType, step: u8) -> Result<usize> {
        Ok(self
            .list_processes(Some(process_type))
            .await?
            .iter()
            .filter(|p| p.current_step() == step && !p.is_complete())
            .count())
    }

    pub async fn explain(&self, id: &ProcessId) -> Result<Vec<TaskExplanation>> {
        let process = self.open(id).await?;
        Ok(explain_tasks(process.process_type(), process.field_data()))
    }

    pub async fn section_permissions(&self, id: &ProcessId, actor: &Actor) -> Result<Vec<SectionPermission>> {
        let process = self.open(id).await?;
        Ok(self.engine.gate().section_permissions(&process, actor))
    }

    /// Delete any checklist record together with its task rows
    pub async fn delete(&self, id: &ProcessId) -> Result<()> {
        self.sync.forget(id);
        self.tasks.delete_tasks_for(id).await?;

        if self.processes.delete_process(id).await? {
            info!(process_id = %id, "Checklist deleted");
            Ok(())
        } else {
            Err(HrWorkflowError::ProcessNotFound { id: id.to_string() })
        }
    }

    /// Write every pending snapshot now
    pub async fn flush(&self) -> Result<usize> {
        self.sync.flush_all().await
    }

    // Simple checklists

    pub async fn create_checklist(&self, title: &str) -> Result<ProcessRecord> {
        if title.trim().is_empty() {
            return Err(HrWorkflowError::InvalidInput("checklist title is empty".to_string()));
        }
        let record = self.processes.create_process(ProcessRecord::custom(title.trim())).await?;
        info!(checklist_id = %record.id, "Checklist created");
        Ok(record)
    }

    pub async fn add_task(&self, checklist_id: &ProcessId, text: &str) -> Result<ChecklistTaskRecord> {
        self.custom_checklist(checklist_id).await?;

        if text.trim().is_empty() {
            return Err(HrWorkflowError::InvalidInput("task text is empty".to_string()));
        }
        self.tasks
            .create_task(ChecklistTaskRecord::new(*checklist_id, text.trim()))
            .await
    }

    /// Flip the completion flag of a simple checklist task
    pub async fn toggle_task(&self, task_id: &Uuid) -> Result<ChecklistTaskRecord> {
        let mut task = self.task(task_id).await?;
        self.custom_checklist(&task.checklist_id).await?;

        task.completed = !task.completed;
        self.tasks.update_task(task).await
    }

    pub async fn delete_task(&self, task_id: &Uuid) -> Result<()> {
        let task = self.task(task_id).await?;
        self.custom_checklist(&task.checklist_id).await?;
        self.tasks.delete_task(task_id).await?;
        Ok(())
    }

    pub async fn checklist_tasks(&self, checklist_id: &ProcessId) -> Result<Vec<ChecklistTaskRecord>> {
        self.custom_checklist(checklist_id).await?;
        self.tasks.list_tasks(checklist_id).await
    }

    async fn task(&self, task_id: &Uuid) -> Result<ChecklistTaskRecord> {
        self.tasks
            .get_task(task_id)
            .await?
            .ok_or_else(|| HrWorkflowError::TaskNotFound {
                id: task_id.to_string(),
            })
    }

    /// The record of a simple checklist; governed kinds are refused
    async fn custom_checklist(&self, id: &ProcessId) -> Result<ProcessRecord> {
        let record = self
            .processes
            .get_process(id)
            .await?
            .ok_or_else(|| HrWorkflowError::ProcessNotFound { id: id.to_string() })?;

        if record.kind.is_governed() {
            return Err(HrWorkflowError::GovernedTask {
                id: id.to_string(),
                kind: record.kind.to_string(),
            });
        }
        Ok(record)
    }
}
