// Record store abstraction
// Whole-record reads and writes of processes and flat checklist tasks

//! # Storage Abstraction Layer
//!
//! The workflow core needs very little from its record store: read a whole
//! record, write a whole record. No transactions, joins or migrations.
//!
//! - [`ProcessStore`]: checklist records (governed processes and simple lists)
//! - [`TaskStore`]: flat task rows, used only by simple (custom) checklists
//! - [`InMemoryStorage`]: implements both, for development, tests and the
//!   walkthrough binary
//!
//! ## Rust Learning Notes:
//!
//! ### Async Traits
//! The `async-trait` crate lets trait methods be `async fn`, so a network
//! backed store and the in-memory store share one interface and can be used
//! as `Arc<dyn ProcessStore>`.
//!
//! ### Async Locks
//! `tokio::sync::RwLock` is used instead of `std::sync::RwLock`: its guards can
//! be held across `.await` and it cannot be poisoned, so there is no
//! `.unwrap()` on lock acquisition.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{ChecklistKind, ChecklistTaskRecord, ProcessId, ProcessRecord};
use crate::{HrWorkflowError, Result};

/// Storage of checklist records
#[async_trait::async_trait]
pub trait ProcessStore: Send + Sync {
    /// Store a new record and return it
    async fn create_process(&self, record: ProcessRecord) -> Result<ProcessRecord>;

    /// `Ok(None)` when no record has this id
    async fn get_process(&self, id: &ProcessId) -> Result<Option<ProcessRecord>>;

    /// Replace a whole record
    ///
    /// ## Errors
    /// - `ProcessNotFound` when the record was deleted in the meantime
    async fn update_process(&self, record: ProcessRecord) -> Result<ProcessRecord>;

    /// Records, newest first, optionally only one kind
    async fn list_processes(&self, kind: Option<ChecklistKind>) -> Result<Vec<ProcessRecord>>;

    /// Returns whether a record was removed
    async fn delete_process(&self, id: &ProcessId) -> Result<bool>;
}

/// Storage of flat checklist task rows
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: ChecklistTaskRecord) -> Result<ChecklistTaskRecord>;

    async fn get_task(&self, id: &Uuid) -> Result<Option<ChecklistTaskRecord>>;

    async fn update_task(&self, task: ChecklistTaskRecord) -> Result<ChecklistTaskRecord>;

    /// Tasks of one checklist in creation order
    async fn list_tasks(&self, checklist_id: &ProcessId) -> Result<Vec<ChecklistTaskRecord>>;

    async fn delete_task(&self, id: &Uuid) -> Result<bool>;

    /// Remove every task of a checklist, returning how many were removed
    async fn delete_tasks_for(&self, checklist_id: &ProcessId) -> Result<usize>;
}

/// In-memory record store
///
/// Not persistent and not shared between processes; fine for tests, demos and
/// single-process tools.
#[derive(Default)]
pub struct InMemoryStorage {
    processes: RwLock<HashMap<ProcessId, ProcessRecord>>,
    tasks: RwLock<HashMap<Uuid, ChecklistTaskRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProcessStore for InMemoryStorage {
    async fn create_process(&self, record: ProcessRecord) -> Result<ProcessRecord> {
        let mut processes = self.processes.write().await;
        if processes.contains_key(&record.id) {
            return Err(HrWorkflowError::InvalidInput(format!(
                "process {} already exists",
                record.id
            )));
        }
        processes.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_process(&self, id: &ProcessId) -> Result<Option<ProcessRecord>> {
        Ok(self.processes.read().await.get(id).cloned())
    }

    async fn update_process(&self, record: ProcessRecord) -> Result<ProcessRecord> {
        let mut processes = self.processes.write().await;
        match processes.get_mut(&record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(record)
            }
            None => Err(HrWorkflowError::ProcessNotFound {
                id: record.id.to_string(),
            }),
        }
    }

    async fn list_processes(&self, kind: Option<ChecklistKind>) -> Result<Vec<ProcessRecord>> {
        let processes = self.processes.read().await;
        let mut records: Vec<ProcessRecord> = processes
            .values()
            .filter(|record| kind.map_or(true, |k| record.kind == k))
            .cloned()
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn delete_process(&self, id: &ProcessId) -> Result<bool> {
        Ok(self.processes.write().await.remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl TaskStore for InMemoryStorage {
    async fn create_task(&self, task: ChecklistTaskRecord) -> Result<ChecklistTaskRecord> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: &Uuid) -> Result<Option<ChecklistTaskRecord>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn update_task(&self, task: ChecklistTaskRecord) -> Result<ChecklistTaskRecord> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(task)
            }
            None => Err(HrWorkflowError::TaskNotFound {
                id: task.id.to_string(),
            }),
        }
    }

    async fn list_tasks(&self, checklist_id: &ProcessId) -> Result<Vec<ChecklistTaskRecord>> {
        let tasks = self.tasks.read().await;
        let mut rows: Vec<ChecklistTaskRecord> = tasks
            .values()
            .filter(|task| &task.checklist_id == checklist_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn delete_task(&self, id: &Uuid) -> Result<bool> {
        Ok(self.tasks.write().await.remove(id).is_some())
    }

    async fn delete_tasks_for(&self, checklist_id: &ProcessId) -> Result<usize> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| &task.checklist_id != checklist_id);
        Ok(before - tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Process, ProcessType};
    use serde_json::json;

    #[tokio::test]
    async fn test_process_crud() {
        let storage = InMemoryStorage::new();
        let record = Process::new(ProcessType::Admission, "Ana").to_record();
        let id = record.id;

        storage.create_process(record.clone()).await.unwrap();
        assert_eq!(storage.get_process(&id).await.unwrap(), Some(record.clone()));

        let mut changed = record.clone();
        changed.data.insert("fullName".into(), json!("Ana Silva"));
        storage.update_process(changed.clone()).await.unwrap();
        assert_eq!(storage.get_process(&id).await.unwrap(), Some(changed));

        assert!(storage.delete_process(&id).await.unwrap());
        assert!(!storage.delete_process(&id).await.unwrap());
        assert_eq!(storage.get_process(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_of_missing_record_fails() {
        let storage = InMemoryStorage::new();
        let record = ProcessRecord::custom("Groceries");
        let err = storage.update_process(record).await.unwrap_err();
        assert!(matches!(err, HrWorkflowError::ProcessNotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let storage = InMemoryStorage::new();
        let record = ProcessRecord::custom("Groceries");
        storage.create_process(record.clone()).await.unwrap();
        assert!(storage.create_process(record).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters_by_kind() {
        let storage = InMemoryStorage::new();
        storage
            .create_process(Process::new(ProcessType::Admission, "a").to_record())
            .await
            .unwrap();
        storage
            .create_process(Process::new(ProcessType::Demission, "d").to_record())
            .await
            .unwrap();
        storage.create_process(ProcessRecord::custom("c")).await.unwrap();

        assert_eq!(storage.list_processes(None).await.unwrap().len(), 3);
        let demissions = storage
            .list_processes(Some(ChecklistKind::Demission))
            .await
            .unwrap();
        assert_eq!(demissions.len(), 1);
        assert_eq!(demissions[0].title, "d");
    }

    #[tokio::test]
    async fn test_task_rows() {
        let storage = InMemoryStorage::new();
        let list = ProcessId::new();
        let other = ProcessId::new();

        let first = storage
            .create_task(ChecklistTaskRecord::new(list, "Buy cake"))
            .await
            .unwrap();
        storage
            .create_task(ChecklistTaskRecord::new(list, "Book room"))
            .await
            .unwrap();
        storage
            .create_task(ChecklistTaskRecord::new(other, "Unrelated"))
            .await
            .unwrap();

        assert_eq!(storage.list_tasks(&list).await.unwrap().len(), 2);

        let mut toggled = first.clone();
        toggled.completed = true;
        storage.update_task(toggled).await.unwrap();
        assert!(storage.get_task(&first.id).await.unwrap().unwrap().completed);

        assert_eq!(storage.delete_tasks_for(&list).await.unwrap(), 2);
        assert_eq!(storage.list_tasks(&other).await.unwrap().len(), 1);
    }
}
