use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::{ClusterError, ClusterResult};
use crate::id::{FrameworkId, TaskId};
use crate::store::{Worker, WorkerStore};

/// A worker store that keeps all records in memory.
///
/// It provides no durability across processes and exists for tests and
/// single-process deployments. Clones share the same underlying state,
/// which lets tests inspect the store while the manager owns it.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkerStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    started: bool,
    framework_id: Option<FrameworkId>,
    next_task_id: u64,
    workers: BTreeMap<TaskId, Worker>,
}

impl MemoryWorkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of persisted worker records.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.workers.len(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_worker(&self, task_id: TaskId) -> Option<Worker> {
        match self.inner.lock() {
            Ok(inner) => inner.workers.get(&task_id).cloned(),
            Err(_) => None,
        }
    }
}

impl WorkerStore for MemoryWorkerStore {
    fn start(&self) -> ClusterResult<()> {
        let mut inner = self.inner.lock()?;
        inner.started = true;
        Ok(())
    }

    fn stop(&self, cleanup: bool) -> ClusterResult<()> {
        let mut inner = self.inner.lock()?;
        inner.started = false;
        if cleanup {
            inner.workers.clear();
            inner.framework_id = None;
        }
        Ok(())
    }

    fn framework_id(&self) -> ClusterResult<Option<FrameworkId>> {
        let inner = self.inner.lock()?;
        Ok(inner.framework_id.clone())
    }

    fn set_framework_id(&self, framework_id: &FrameworkId) -> ClusterResult<()> {
        let mut inner = self.inner.lock()?;
        inner.framework_id = Some(framework_id.clone());
        Ok(())
    }

    fn new_task_id(&self) -> ClusterResult<TaskId> {
        let mut inner = self.inner.lock()?;
        let value = inner
            .next_task_id
            .checked_add(1)
            .ok_or_else(|| ClusterError::StoreError("task ID overflow".to_string()))?;
        inner.next_task_id = value;
        Ok(value.into())
    }

    fn put_worker(&self, worker: &Worker) -> ClusterResult<()> {
        let mut inner = self.inner.lock()?;
        inner.workers.insert(worker.task_id, worker.clone());
        Ok(())
    }

    fn remove_worker(&self, task_id: TaskId) -> ClusterResult<bool> {
        let mut inner = self.inner.lock()?;
        Ok(inner.workers.remove(&task_id).is_some())
    }

    fn recover_workers(&self) -> ClusterResult<Vec<Worker>> {
        let inner = self.inner.lock()?;
        Ok(inner.workers.values().cloned().collect())
    }
}
