use crate::scheduler::{Disconnected, ReRegistered, Registered, TaskStatus};

/// Messages consumed by the connection monitor, which tracks liveness of
/// the scheduler connection. The manager forwards connection events to it
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionMessage {
    /// Begin monitoring; sent once, when initialization completes.
    Start,
    Registered(Registered),
    Reregistered(ReRegistered),
    Disconnected(Disconnected),
}

/// Messages consumed by the reconciliation coordinator, which confirms
/// after a disconnect or restart that the scheduler's view of running
/// tasks matches the local persisted view.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationMessage {
    Registered(Registered),
    Reregistered(ReRegistered),
    Disconnected(Disconnected),
    StatusUpdate(TaskStatus),
    /// An explicit request to reconcile the given task statuses.
    Reconcile(Vec<TaskStatus>),
}
