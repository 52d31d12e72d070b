use crate::id::{SlaveId, TaskId};
use crate::scheduler::{Disconnected, ReRegistered, Registered, TaskStatus};
use crate::store::{Worker, WorkerState};

/// The locally-desired lifecycle state of a task, reconciled against
/// scheduler-reported reality by the goal-state router.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskGoalState {
    New {
        task_id: TaskId,
    },
    Launched {
        task_id: TaskId,
        slave_id: SlaveId,
    },
    Released {
        task_id: TaskId,
        slave_id: SlaveId,
    },
}

/// Derives the goal state from the persisted worker state.
/// The tagged worker state makes this mapping total: a launched or
/// released worker always carries its agent placement.
impl From<&Worker> for TaskGoalState {
    fn from(worker: &Worker) -> Self {
        match &worker.state {
            WorkerState::New => TaskGoalState::New {
                task_id: worker.task_id,
            },
            WorkerState::Launched { slave_id, .. } => TaskGoalState::Launched {
                task_id: worker.task_id,
                slave_id: slave_id.clone(),
            },
            WorkerState::Released { slave_id, .. } => TaskGoalState::Released {
                task_id: worker.task_id,
                slave_id: slave_id.clone(),
            },
        }
    }
}

impl TaskGoalState {
    pub fn task_id(&self) -> TaskId {
        match self {
            TaskGoalState::New { task_id }
            | TaskGoalState::Launched { task_id, .. }
            | TaskGoalState::Released { task_id, .. } => *task_id,
        }
    }
}

/// Messages consumed by the task goal-state router, which tracks the
/// desired state of each task against what the scheduler reports and
/// emits termination notices (delivered to the manager as
/// `TaskTerminated` events).
#[derive(Debug, Clone, PartialEq)]
pub enum RouterMessage {
    Registered(Registered),
    Reregistered(ReRegistered),
    Disconnected(Disconnected),
    GoalStateUpdated(TaskGoalState),
    StatusUpdate(TaskStatus),
}
