use std::sync::Arc;

use moor_common::config::ClusterConfig;
use tokio::sync::mpsc;

use crate::launch::{LaunchMessage, WorkerDefaults};
use crate::manager::ManagerNotification;
use crate::monitor::{ConnectionMessage, ReconciliationMessage};
use crate::router::RouterMessage;
use crate::scheduler::SchedulerDriver;
use crate::store::WorkerStore;

/// Handles to the collaborators the manager routes messages to.
///
/// Each collaborator runs independently and single-threaded; the manager
/// only ever talks to it through its unbounded queue, so sends are
/// ordered and never block the manager's own thread of control.
pub struct Collaborators {
    pub launch_coordinator: mpsc::UnboundedSender<LaunchMessage>,
    pub task_router: mpsc::UnboundedSender<RouterMessage>,
    pub connection_monitor: mpsc::UnboundedSender<ConnectionMessage>,
    pub reconciliation_coordinator: mpsc::UnboundedSender<ReconciliationMessage>,
    /// Notifications to the surrounding system (e.g. worker connection closed).
    pub notifications: mpsc::UnboundedSender<ManagerNotification>,
}

pub struct ManagerOptions {
    pub store: Box<dyn WorkerStore>,
    pub driver: Arc<dyn SchedulerDriver>,
    pub defaults: WorkerDefaults,
    pub collaborators: Collaborators,
}

impl ManagerOptions {
    pub fn new(
        config: &ClusterConfig,
        store: Box<dyn WorkerStore>,
        driver: Arc<dyn SchedulerDriver>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            store,
            driver,
            defaults: WorkerDefaults::new(config),
            collaborators,
        }
    }
}
