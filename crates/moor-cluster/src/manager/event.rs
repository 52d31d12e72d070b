use tokio::sync::oneshot;

use crate::id::{OfferId, TaskId};
use crate::scheduler::{
    AcceptedOffers, Disconnected, Offer, ReRegistered, Registered, TaskStatus,
};
use crate::store::{ResourceProfile, Worker};

/// A message that drives the resource manager actor.
///
/// Events originate from the surrounding runtime (allocation and release
/// requests, shutdown), from the external scheduler (registration,
/// offers, status updates, protocol errors), and from the collaborators
/// (accept decisions, termination notices, reconciliation requests).
pub enum ManagerEvent {
    /// Request a new worker with the given resource profile.
    StartWorker { profile: ResourceProfile },
    /// Request the release of a worker.
    StopWorker { task_id: TaskId },
    /// A launched worker process has registered with the surrounding
    /// runtime; reply with its record iff it is known to be in launch.
    WorkerStarted {
        task_id: TaskId,
        result: oneshot::Sender<Option<Worker>>,
    },
    Registered(Registered),
    Reregistered(ReRegistered),
    Disconnected(Disconnected),
    ResourceOffers(Vec<Offer>),
    OfferRescinded(OfferId),
    /// The launch coordinator's decision pairing offers with launch operations.
    OffersAccepted(AcceptedOffers),
    StatusUpdate(TaskStatus),
    /// A reconciliation request from the goal-state router.
    Reconcile(Vec<TaskStatus>),
    /// A termination notice from the goal-state router.
    TaskTerminated(TaskStatus),
    /// A protocol-level error reported by the scheduler connection.
    SchedulerError { message: String },
    Shutdown,
    /// The framework has been unregistered; finish shutting down.
    ShutdownCompleted,
}

/// A notification to the surrounding system.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerNotification {
    /// The connection to a worker is closed; the worker terminated with
    /// the given scheduler-reported reason.
    WorkerConnectionClosed { task_id: TaskId, reason: String },
}
