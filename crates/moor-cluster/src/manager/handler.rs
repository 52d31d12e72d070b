use std::sync::Arc;

use log::info;
use moor_server::actor::{ActorAction, ActorContext};
use tokio::sync::oneshot;

use crate::error::{ClusterError, ClusterResult};
use crate::id::{OfferId, TaskId};
use crate::launch::{LaunchMessage, LaunchableWorker};
use crate::manager::{ManagerActor, ManagerEvent, ManagerNotification};
use crate::monitor::{ConnectionMessage, ReconciliationMessage};
use crate::router::{RouterMessage, TaskGoalState};
use crate::scheduler::{
    AcceptedOffers, Disconnected, Offer, OfferOperation, ReRegistered, Registered, TaskStatus,
};
use crate::store::{ResourceProfile, Worker, WorkerState};

impl ManagerActor {
    /// Rebuilds the bookkeeping from the records persisted by a prior
    /// incarnation. Runs once, before the manager accepts any work.
    pub(super) fn recover_workers(&mut self) -> ClusterResult<()> {
        let recovered = self.store.recover_workers().map_err(|e| {
            ClusterError::StoreError(format!("unable to recover the worker state: {e}"))
        })?;
        debug_assert!(self.registry.is_empty());
        if recovered.is_empty() {
            return Ok(());
        }
        info!("retrieved {} workers from a previous attempt", recovered.len());

        let mut to_assign = vec![];
        for worker in recovered {
            match &worker.state {
                WorkerState::New => {
                    // Allocation requests are transient; drop them rather
                    // than re-request resources nobody is waiting for.
                    self.store.remove_worker(worker.task_id)?;
                    continue;
                }
                WorkerState::Launched { hostname, .. } => {
                    let launchable = LaunchableWorker::from_profile(
                        worker.task_id,
                        &worker.profile,
                        &self.defaults,
                    );
                    to_assign.push((launchable, hostname.clone()));
                }
                WorkerState::Released { .. } => {}
            }
            let goal = TaskGoalState::from(&worker);
            self.registry.insert(worker)?;
            self.collaborators
                .task_router
                .send(RouterMessage::GoalStateUpdated(goal))?;
        }

        // One batched notice so the launch coordinator's accounting can
        // match offers against work that is already running.
        if !to_assign.is_empty() {
            self.collaborators
                .launch_coordinator
                .send(LaunchMessage::Assign(to_assign))?;
        }
        Ok(())
    }

    pub(super) fn handle_start_worker(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        profile: ResourceProfile,
    ) -> ClusterResult<ActorAction> {
        info!("starting a new worker");
        let task_id = self.store.new_task_id()?;
        let worker = Worker::new(task_id, profile);
        // The record must be durable before anything else learns of it.
        self.store.put_worker(&worker)?;

        let launchable = LaunchableWorker::from_profile(task_id, &worker.profile, &self.defaults);
        let goal = TaskGoalState::from(&worker);
        self.registry.insert(worker)?;

        info!(
            "scheduling task {task_id} with ({} MB, {} cpus)",
            launchable.memory_mb, launchable.cpu_cores
        );
        self.collaborators
            .task_router
            .send(RouterMessage::GoalStateUpdated(goal))?;
        self.collaborators
            .launch_coordinator
            .send(LaunchMessage::Launch(vec![launchable]))?;
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_stop_worker(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        task_id: TaskId,
    ) -> ClusterResult<ActorAction> {
        // TODO: implement worker release
        // Workers only enter the "being returned" view through recovery of
        // persisted `Released` records today; a live release protocol
        // needs a decision on who persists the transition and when.
        Ok(ActorAction::warn(format!(
            "ignoring release request for worker {task_id}: worker release is not implemented"
        )))
    }

    pub(super) fn handle_worker_started(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        task_id: TaskId,
        result: oneshot::Sender<Option<Worker>>,
    ) -> ClusterResult<ActorAction> {
        // This may occur more than once for a given worker. Unrecognized
        // or already released workers are declined.
        let out = match self.registry.get(task_id) {
            Some(worker) if matches!(worker.state, WorkerState::Launched { .. }) => {
                Some(worker.clone())
            }
            _ => None,
        };
        let _ = result.send(out);
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_registered(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        message: Registered,
    ) -> ClusterResult<ActorAction> {
        info!(
            "registered with framework ID {} at master {}",
            message.framework_id, message.master
        );
        self.collaborators
            .connection_monitor
            .send(ConnectionMessage::Registered(message.clone()))?;
        // Persist the identity before anything depends on it; restarts
        // must re-register as the same framework.
        self.store
            .set_framework_id(&message.framework_id)
            .map_err(|e| {
                ClusterError::StoreError(format!(
                    "unable to store the assigned framework ID: {e}"
                ))
            })?;
        self.collaborators
            .launch_coordinator
            .send(LaunchMessage::Registered(message.clone()))?;
        self.collaborators
            .reconciliation_coordinator
            .send(ReconciliationMessage::Registered(message.clone()))?;
        self.collaborators
            .task_router
            .send(RouterMessage::Registered(message))?;
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_reregistered(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        message: ReRegistered,
    ) -> ClusterResult<ActorAction> {
        info!("re-registered at master {}", message.master);
        self.collaborators
            .connection_monitor
            .send(ConnectionMessage::Reregistered(message.clone()))?;
        self.collaborators
            .launch_coordinator
            .send(LaunchMessage::Reregistered(message.clone()))?;
        self.collaborators
            .reconciliation_coordinator
            .send(ReconciliationMessage::Reregistered(message.clone()))?;
        self.collaborators
            .task_router
            .send(RouterMessage::Reregistered(message))?;
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_disconnected(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        message: Disconnected,
    ) -> ClusterResult<ActorAction> {
        info!("disconnected from the scheduler");
        self.collaborators
            .connection_monitor
            .send(ConnectionMessage::Disconnected(message))?;
        self.collaborators
            .launch_coordinator
            .send(LaunchMessage::Disconnected(message))?;
        self.collaborators
            .reconciliation_coordinator
            .send(ReconciliationMessage::Disconnected(message))?;
        self.collaborators
            .task_router
            .send(RouterMessage::Disconnected(message))?;
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_resource_offers(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        offers: Vec<Offer>,
    ) -> ClusterResult<ActorAction> {
        self.collaborators
            .launch_coordinator
            .send(LaunchMessage::Offers(offers))?;
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_offer_rescinded(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        offer_id: OfferId,
    ) -> ClusterResult<ActorAction> {
        self.collaborators
            .launch_coordinator
            .send(LaunchMessage::OfferRescinded(offer_id))?;
        Ok(ActorAction::Continue)
    }

    /// Acceptance is routed through the manager so the persistent state
    /// can transition to `Launched` before the scheduler commits the
    /// launch. A crash after persisting but before committing is safe:
    /// recovery reconciles the launched workers against the scheduler.
    /// The reverse order would risk a scheduler-side launch with no
    /// durable record, which cannot be recovered.
    pub(super) fn handle_offers_accepted(
        &mut self,
        ctx: &mut ActorContext<Self>,
        decision: AcceptedOffers,
    ) -> ClusterResult<ActorAction> {
        let mut launched = vec![];
        for operation in &decision.operations {
            let OfferOperation::Launch { tasks } = operation;
            for task in tasks {
                let worker = self.registry.remove_new(task.task_id).ok_or_else(|| {
                    ClusterError::InvariantViolation(format!(
                        "worker {} accepted for launch is not awaiting allocation",
                        task.task_id
                    ))
                })?;
                let worker = worker.launch(task.slave_id.clone(), decision.hostname.clone());
                self.store.put_worker(&worker)?;
                launched.push(worker);
            }
        }

        // Every record in the batch is durable at this point; only now
        // update the in-memory view and the goal states.
        for worker in launched {
            info!(
                "launching task {} on host {}",
                worker.task_id, decision.hostname
            );
            let goal = TaskGoalState::from(&worker);
            self.registry.insert(worker)?;
            self.collaborators
                .task_router
                .send(RouterMessage::GoalStateUpdated(goal))?;
        }

        // Commit the launch to the external scheduler.
        let driver = Arc::clone(&self.driver);
        let handle = ctx.handle().clone();
        ctx.spawn(async move {
            if let Err(e) = driver.accept_offers(decision).await {
                let _ = handle
                    .send(ManagerEvent::SchedulerError {
                        message: e.to_string(),
                    })
                    .await;
            }
        });
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_status_update(
        &mut self,
        ctx: &mut ActorContext<Self>,
        status: TaskStatus,
    ) -> ClusterResult<ActorAction> {
        self.collaborators
            .task_router
            .send(RouterMessage::StatusUpdate(status.clone()))?;
        self.collaborators
            .reconciliation_coordinator
            .send(ReconciliationMessage::StatusUpdate(status.clone()))?;
        let driver = Arc::clone(&self.driver);
        let handle = ctx.handle().clone();
        ctx.spawn(async move {
            if let Err(e) = driver.acknowledge_status_update(status).await {
                let _ = handle
                    .send(ManagerEvent::SchedulerError {
                        message: e.to_string(),
                    })
                    .await;
            }
        });
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_reconcile(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        statuses: Vec<TaskStatus>,
    ) -> ClusterResult<ActorAction> {
        self.collaborators
            .reconciliation_coordinator
            .send(ReconciliationMessage::Reconcile(statuses))?;
        Ok(ActorAction::Continue)
    }

    /// This notice arrives for failed workers and released workers alike,
    /// and it is the only path that deletes a worker record.
    pub(super) fn handle_task_terminated(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        status: TaskStatus,
    ) -> ClusterResult<ActorAction> {
        let task_id = status.task_id;
        let existed = self.store.remove_worker(task_id).map_err(|e| {
            ClusterError::StoreError(format!("unable to remove worker {task_id}: {e}"))
        })?;
        if !existed {
            // Duplicate or stale notice; already handled.
            info!("received a termination notice for an unrecognized worker: {task_id}");
            return Ok(ActorAction::Continue);
        }

        let reason = status
            .message
            .clone()
            .unwrap_or_else(|| format!("task {task_id} reported {}", status.state));
        match self.registry.remove(task_id) {
            Some(Worker {
                state: WorkerState::Released { .. },
                ..
            }) => {
                // A worker we released, finishing as planned.
                info!("worker {task_id} finished successfully with message: {reason}");
            }
            Some(Worker {
                state: WorkerState::Launched { .. },
                ..
            }) => {
                // An unplanned failure, at startup or while running.
                // Requesting a replacement is left to the policy layer.
                info!(
                    "worker {task_id} failed with state: {}, reason: {}, message: {}",
                    status.state,
                    status.reason.as_deref().unwrap_or("unknown"),
                    status.message.as_deref().unwrap_or("none"),
                );
            }
            Some(Worker {
                state: WorkerState::New,
                ..
            }) => {
                return Err(ClusterError::InvariantViolation(format!(
                    "worker {task_id} received a termination notice before a launch was attempted"
                )));
            }
            None => {
                return Err(ClusterError::InvariantViolation(format!(
                    "terminated worker {task_id} is not tracked in any bookkeeping view"
                )));
            }
        }

        self.collaborators
            .notifications
            .send(ManagerNotification::WorkerConnectionClosed { task_id, reason })?;
        Ok(ActorAction::Continue)
    }

    pub(super) fn handle_scheduler_error(
        &mut self,
        _ctx: &mut ActorContext<Self>,
        message: String,
    ) -> ClusterResult<ActorAction> {
        // The scheduler connection is unrecoverable at this layer; the
        // supervising process restarts the whole manager.
        Err(ClusterError::SchedulerError(format!(
            "connection to the scheduler failed: {message}"
        )))
    }

    pub(super) fn handle_shutdown(
        &mut self,
        ctx: &mut ActorContext<Self>,
    ) -> ClusterResult<ActorAction> {
        info!("shutting down and unregistering the framework");
        let driver = Arc::clone(&self.driver);
        let handle = ctx.handle().clone();
        ctx.spawn(async move {
            // Unregistering implicitly removes all tasks on the scheduler side.
            if let Err(e) = driver.stop(false).await {
                log::warn!("unable to unregister the framework: {e}");
            }
            let _ = handle.send(ManagerEvent::ShutdownCompleted).await;
        });
        Ok(ActorAction::Continue)
    }

    /// The store must outlive the unregistration so a crash in between
    /// still leaves records the next incarnation can recover.
    pub(super) fn handle_shutdown_completed(
        &mut self,
        _ctx: &mut ActorContext<Self>,
    ) -> ClusterResult<ActorAction> {
        if let Err(e) = self.store.stop(true) {
            log::warn!("unable to stop the worker store: {e}");
        }
        info!("shutdown completed");
        Ok(ActorAction::Stop)
    }
}
