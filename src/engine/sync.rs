// Change propagation - optimistic view plus debounced persistence

//! # Sync Coordinator
//!
//! Edits are applied in memory first and written to the record store later:
//!
//! 1. [`SyncCoordinator::schedule_sync`] replaces the live view of the process
//!    at once, so readers see the edit without waiting on I/O.
//! 2. A write of the process record is scheduled after a quiet period.
//! 3. Another call for the same process before the period ends cancels the
//!    pending write and schedules a new one. Only the last snapshot of a burst
//!    reaches the store.
//!
//! The live view only holds a process while one of its writes is pending or in
//! flight. Once the latest snapshot has landed the entry is evicted, so the
//! next read goes back to the record store and picks up changes made by other
//! writers in the meantime.
//!
//! Writes for one process never overlap: each process has a write gate, and a
//! write that starts while another is in flight waits for it. A failed write is
//! logged and published as [`WorkflowEventKind::SyncFailed`]; the live view is
//! kept as it is (last write wins) until a later write lands or the process is
//! forgotten.
//!
//! ## Rust Learning Notes:
//!
//! ### Cancel and Reschedule
//! Each pending write is a spawned task sleeping out the quiet period. Its
//! `JoinHandle` is kept next to a generation number; a newer call `abort()`s
//! the old handle, and the generation check makes a task that already woke up
//! step aside when it is no longer the latest.
//!
//! ### `Arc<Inner>`
//! Spawned tasks must be `'static`, so everything they touch lives in an
//! `Arc`-shared inner struct rather than borrowing from `self`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::engine::events::{EventBus, WorkflowEventKind};
use crate::engine::storage::ProcessStore;
use crate::models::{Process, ProcessId, ProcessRecord};
use crate::Result;

/// Coordinator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Time without edits before the latest snapshot is written
    pub quiet_period: Duration,
}

impl SyncConfig {
    pub fn from_millis(millis: u64) -> Self {
        Self {
            quiet_period: Duration::from_millis(millis),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}

struct PendingWrite {
    generation: u64,
    snapshot: ProcessRecord,
    handle: JoinHandle<()>,
}

struct LiveEntry {
    generation: u64,
    process: Process,
}

struct Inner {
    store: Arc<dyn ProcessStore>,
    events: EventBus,
    config: SyncConfig,
    live: DashMap<ProcessId, LiveEntry>,
    pending: DashMap<ProcessId, PendingWrite>,
    write_gates: DashMap<ProcessId, Arc<Mutex<()>>>,
    generation: AtomicU64,
}

impl Inner {
    /// Write one snapshot and settle the maps for its process
    async fn persist(&self, generation: u64, record: ProcessRecord) -> Result<()> {
        let id = record.id;
        let gate = self
            .write_gates
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = gate.lock().await;
        let result = self.store.update_process(record).await;
        drop(guard);

        // Only the map and this write hold the gate when nobody else waits on it
        self.write_gates
            .remove_if(&id, |_, held| Arc::ptr_eq(held, &gate) && Arc::strong_count(held) == 2);

        match result {
            Ok(_) => {
                // A newer edit keeps its own entry until its write lands
                self.live.remove_if(&id, |_, entry| entry.generation == generation);
                debug!(process_id = %id, "Process snapshot persisted");
                self.events.emit(id, WorkflowEventKind::SyncPersisted);
                Ok(())
            }
            Err(e) => {
                error!(process_id = %id, error = %e, "Failed to persist process snapshot");
                self.events.emit(
                    id,
                    WorkflowEventKind::SyncFailed {
                        error: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }
}

/// Optimistic view of live processes with debounced writes to the store
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn ProcessStore>, events: EventBus, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                events,
                config,
                live: DashMap::new(),
                pending: DashMap::new(),
                write_gates: DashMap::new(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Publish the new state now and persist it after the quiet period
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_sync(&self, process: &Process) {
        let id = process.id();
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.live.insert(
            id,
            LiveEntry {
                generation,
                process: process.clone(),
            },
        );

        let snapshot = process.to_record();

        // The entry guard is held while spawning so the new task cannot look
        // for its own entry before it is in place.
        let previous = match self.inner.pending.entry(id) {
            Entry::Occupied(mut slot) => {
                let handle = self.spawn_write(id, generation, snapshot.clone());
                Some(slot.insert(PendingWrite {
                    generation,
                    snapshot,
                    handle,
                }))
            }
            Entry::Vacant(slot) => {
                let handle = self.spawn_write(id, generation, snapshot.clone());
                slot.insert(PendingWrite {
                    generation,
                    snapshot,
                    handle,
                });
                None
            }
        };

        if let Some(previous) = previous {
            previous.handle.abort();
            debug!(process_id = %id, "Pending write rescheduled");
        }
    }

    fn spawn_write(&self, id: ProcessId, generation: u64, snapshot: ProcessRecord) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(inner.config.quiet_period).await;

            // Once removed, this write can no longer be aborted by a newer call
            let still_latest = inner
                .pending
                .remove_if(&id, |_, pending| pending.generation == generation)
                .is_some();

            if still_latest {
                // Failures are reported through logs and events
                let _ = inner.persist(generation, snapshot).await;
            }
        })
    }

    /// Persist the pending snapshot of one process right away
    ///
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn flush(&self, id: &ProcessId) -> Result<bool> {
        match self.inner.pending.remove(id) {
            Some((_, pending)) => {
                pending.handle.abort();
                self.inner.persist(pending.generation, pending.snapshot).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist every pending snapshot right away
    ///
    /// Processes are flushed concurrently; each one still goes through its own
    /// write gate. Every pending write is attempted and the first failure is
    /// returned.
    pub async fn flush_all(&self) -> Result<usize> {
        let ids: Vec<ProcessId> = self.inner.pending.iter().map(|entry| *entry.key()).collect();
        let results = join_all(ids.iter().map(|id| self.flush(id))).await;
        let mut flushed = 0;
        let mut first_error = None;

        for result in results {
            match result {
                Ok(true) => flushed += 1,
                Ok(false) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(flushed),
        }
    }

    /// Number of writes waiting out their quiet period
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Optimistic state of a process whose write has not landed yet
    ///
    /// `None` means the record store is up to date for this process.
    pub fn view(&self, id: &ProcessId) -> Option<Process> {
        self.inner.live.get(id).map(|entry| entry.process.clone())
    }

    /// Drop a process from the view and cancel its pending write
    pub fn forget(&self, id: &ProcessId) {
        self.inner.live.remove(id);
        if let Some((_, pending)) = self.inner.pending.remove(id) {
            pending.handle.abort();
        }
        self.inner.write_gates.remove(id);
    }
}
