use async_trait::async_trait;

use crate::error::ClusterResult;
use crate::id::{FrameworkId, OfferId, SlaveId, TaskId};

/// A time-bounded grant of resources on a specific host.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub offer_id: OfferId,
    pub slave_id: SlaveId,
    pub hostname: String,
    pub cpu_cores: f64,
    pub memory_mb: u64,
}

/// The lifecycle state of a task as reported by the external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Staging,
    Starting,
    Running,
    Finished,
    Failed,
    Killed,
    Lost,
    Error,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskState::Staging => "STAGING",
            TaskState::Starting => "STARTING",
            TaskState::Running => "RUNNING",
            TaskState::Finished => "FINISHED",
            TaskState::Failed => "FAILED",
            TaskState::Killed => "KILLED",
            TaskState::Lost => "LOST",
            TaskState::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

/// A task status report from the external scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
    pub task_id: TaskId,
    pub slave_id: SlaveId,
    pub state: TaskState,
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// A task to start as part of accepting an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub task_id: TaskId,
    pub slave_id: SlaveId,
}

/// An action applied to accepted offers.
#[derive(Debug, Clone, PartialEq)]
pub enum OfferOperation {
    Launch { tasks: Vec<TaskSpec> },
}

/// A batch decision from the launch coordinator pairing offers with
/// launch operations, to be committed to the external scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedOffers {
    pub hostname: String,
    pub offer_ids: Vec<OfferId>,
    pub operations: Vec<OfferOperation>,
}

/// The first successful registration with the external scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct Registered {
    pub framework_id: FrameworkId,
    pub master: String,
}

/// A re-registration following a scheduler failover.
#[derive(Debug, Clone, PartialEq)]
pub struct ReRegistered {
    pub master: String,
}

/// The connection to the external scheduler was lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disconnected;

/// The capability to talk to the external scheduler.
///
/// Implementations wrap the actual protocol client; the resource manager
/// never waits on these calls as part of handling a message.
#[async_trait]
pub trait SchedulerDriver: Send + Sync + 'static {
    /// Starts the protocol client and registers (or re-registers) the framework.
    async fn start(&self) -> ClusterResult<()>;

    /// Commits accepted offers, asking the scheduler to start the referenced tasks.
    async fn accept_offers(&self, offers: AcceptedOffers) -> ClusterResult<()>;

    /// Acknowledges a status update so the scheduler stops resending it.
    async fn acknowledge_status_update(&self, status: TaskStatus) -> ClusterResult<()>;

    /// Stops the protocol client. Without `failover`, the framework is
    /// unregistered and the scheduler tears down all of its tasks.
    async fn stop(&self, failover: bool) -> ClusterResult<()>;
}
