mod fs;
mod memory;

pub use fs::FsWorkerStore;
pub use memory::MemoryWorkerStore;

use serde::{Deserialize, Serialize};

use crate::error::ClusterResult;
use crate::id::{FrameworkId, SlaveId, TaskId};

/// The CPU/memory shape requested for a worker.
/// Unspecified dimensions are filled from static deployment defaults
/// when the launch spec is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub cpu_cores: Option<f64>,
    pub memory_mb: Option<u64>,
    pub heap_mb: Option<u64>,
    pub direct_mb: Option<u64>,
}

impl ResourceProfile {
    pub fn unknown() -> Self {
        Self {
            cpu_cores: None,
            memory_mb: None,
            heap_mb: None,
            direct_mb: None,
        }
    }
}

/// The persisted lifecycle state of a worker.
///
/// The agent placement is carried inside the variants so that a worker
/// can only have a `slave_id` and `hostname` once it has been launched.
/// Termination is modeled as deletion of the record, not as a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerState {
    New,
    Launched { slave_id: SlaveId, hostname: String },
    Released { slave_id: SlaveId, hostname: String },
}

/// A logical compute unit requested from the external scheduler.
///
/// The record keeps its identity for its whole lifetime; transitions
/// mutate the state in place rather than replacing the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub task_id: TaskId,
    pub profile: ResourceProfile,
    pub state: WorkerState,
}

impl Worker {
    pub fn new(task_id: TaskId, profile: ResourceProfile) -> Self {
        Self {
            task_id,
            profile,
            state: WorkerState::New,
        }
    }

    /// Transitions the worker to `Launched` on the given agent.
    pub fn launch(self, slave_id: SlaveId, hostname: String) -> Self {
        Self {
            state: WorkerState::Launched { slave_id, hostname },
            ..self
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match &self.state {
            WorkerState::New => None,
            WorkerState::Launched { hostname, .. } | WorkerState::Released { hostname, .. } => {
                Some(hostname)
            }
        }
    }

    pub fn slave_id(&self) -> Option<&SlaveId> {
        match &self.state {
            WorkerState::New => None,
            WorkerState::Launched { slave_id, .. } | WorkerState::Released { slave_id, .. } => {
                Some(slave_id)
            }
        }
    }
}

/// Durable storage for worker records and the framework identity.
///
/// Every write is atomic per worker record. The resource manager blocks
/// its single logical thread on these calls, so the write-ahead ordering
/// of its protocol holds without further synchronization.
pub trait WorkerStore: Send + 'static {
    /// Must be called before any other store operation.
    fn start(&self) -> ClusterResult<()>;
    /// Flushes and closes the store. With `cleanup`, all persisted state
    /// is discarded; this is only done when the application shuts down
    /// for good and there is nothing left to recover.
    fn stop(&self, cleanup: bool) -> ClusterResult<()>;
    /// The framework identity from a prior registration, if any.
    fn framework_id(&self) -> ClusterResult<Option<FrameworkId>>;
    /// Records the framework identity assigned by the external scheduler.
    fn set_framework_id(&self, framework_id: &FrameworkId) -> ClusterResult<()>;
    /// Issues a task identifier that is unique within the framework registration.
    fn new_task_id(&self) -> ClusterResult<TaskId>;
    /// Inserts or replaces the record with the same task identifier.
    fn put_worker(&self, worker: &Worker) -> ClusterResult<()>;
    /// Returns whether a record existed for the task identifier.
    fn remove_worker(&self, task_id: TaskId) -> ClusterResult<bool>;
    /// All records surviving a prior run, ordered by task identifier.
    fn recover_workers(&self) -> ClusterResult<Vec<Worker>>;
}
