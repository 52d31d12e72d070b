use std::collections::HashMap;

use crate::error::{ClusterError, ClusterResult};
use crate::id::TaskId;
use crate::store::{Worker, WorkerState};

/// The bookkeeping view a worker belongs to, derived from its persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSet {
    /// Allocation requested; not yet matched to an offer.
    New,
    /// Launch committed (or about to be committed) to the external scheduler.
    InLaunch,
    /// Release initiated; awaiting the termination notice.
    BeingReturned,
}

impl std::fmt::Display for WorkerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerSet::New => "new",
            WorkerSet::InLaunch => "in launch",
            WorkerSet::BeingReturned => "being returned",
        };
        write!(f, "{name}")
    }
}

fn view_of(state: &WorkerState) -> WorkerSet {
    match state {
        WorkerState::New => WorkerSet::New,
        WorkerState::Launched { .. } => WorkerSet::InLaunch,
        WorkerState::Released { .. } => WorkerSet::BeingReturned,
    }
}

/// The in-memory index of workers, mirroring the persistent store.
///
/// One authoritative map holds every tracked worker; the three views are
/// derived from each worker's state, so a task identifier can never
/// appear in more than one view. The registry must only be mutated after
/// the corresponding store write has completed.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: HashMap<TaskId, Worker>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn get(&self, task_id: TaskId) -> Option<&Worker> {
        self.workers.get(&task_id)
    }

    /// The view the worker currently belongs to, if it is tracked at all.
    pub fn membership(&self, task_id: TaskId) -> Option<WorkerSet> {
        self.workers.get(&task_id).map(|x| view_of(&x.state))
    }

    pub fn count(&self, set: WorkerSet) -> usize {
        self.workers
            .values()
            .filter(|x| view_of(&x.state) == set)
            .count()
    }

    /// Tracks a worker under the view derived from its state.
    /// A duplicate task identifier means the store and the registry have
    /// diverged, which has no local repair path.
    pub fn insert(&mut self, worker: Worker) -> ClusterResult<()> {
        let task_id = worker.task_id;
        if self.workers.insert(task_id, worker).is_some() {
            return Err(ClusterError::InvariantViolation(format!(
                "worker {task_id} is already tracked"
            )));
        }
        Ok(())
    }

    /// Removes and returns the worker regardless of the view it is in.
    pub fn remove(&mut self, task_id: TaskId) -> Option<Worker> {
        self.workers.remove(&task_id)
    }

    /// Removes the worker only if it is in the `New` view.
    pub fn remove_new(&mut self, task_id: TaskId) -> Option<Worker> {
        match self.membership(task_id) {
            Some(WorkerSet::New) => self.workers.remove(&task_id),
            _ => None,
        }
    }
}
