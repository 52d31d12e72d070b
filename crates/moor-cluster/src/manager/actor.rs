use std::sync::Arc;

use log::info;
use moor_server::actor::{Actor, ActorAction, ActorContext};

use crate::error::{ClusterError, ClusterResult};
use crate::launch::WorkerDefaults;
use crate::manager::options::Collaborators;
use crate::manager::state::WorkerRegistry;
use crate::manager::{ManagerEvent, ManagerOptions};
use crate::scheduler::SchedulerDriver;
use crate::store::WorkerStore;

/// The resource manager actor.
///
/// It owns the authoritative worker bookkeeping and mediates every
/// message that changes a worker's state between the store, the external
/// scheduler, and the collaborators. All state mutation happens on the
/// actor's single logical thread; correctness rests on write-ordering
/// against the store, not on locks.
pub struct ManagerActor {
    pub(super) store: Box<dyn WorkerStore>,
    pub(super) driver: Arc<dyn SchedulerDriver>,
    pub(super) defaults: WorkerDefaults,
    pub(super) collaborators: Collaborators,
    pub(super) registry: WorkerRegistry,
}

impl Actor for ManagerActor {
    type Message = ManagerEvent;
    type Options = ManagerOptions;
    type Error = ClusterError;

    fn new(options: ManagerOptions) -> Self {
        Self {
            store: options.store,
            driver: options.driver,
            defaults: options.defaults,
            collaborators: options.collaborators,
            registry: WorkerRegistry::new(),
        }
    }

    /// Initializes the manager: store, framework identity, recovery.
    /// Any failure here aborts startup before the manager accepts work.
    fn start(&mut self, ctx: &mut ActorContext<Self>) -> ClusterResult<()> {
        self.store.start().map_err(|e| {
            ClusterError::StoreError(format!("unable to initialize the worker store: {e}"))
        })?;

        match self.store.framework_id().map_err(|e| {
            ClusterError::StoreError(format!("unable to recover the framework ID: {e}"))
        })? {
            Some(framework_id) => {
                info!("recovery scenario: re-registering with framework ID {framework_id}");
            }
            None => {
                info!("registering as a new framework");
            }
        }

        self.recover_workers()?;

        // Begin monitoring and connect to the scheduler.
        self.collaborators
            .connection_monitor
            .send(crate::monitor::ConnectionMessage::Start)?;
        let driver = Arc::clone(&self.driver);
        let handle = ctx.handle().clone();
        ctx.spawn(async move {
            if let Err(e) = driver.start().await {
                let _ = handle
                    .send(ManagerEvent::SchedulerError {
                        message: e.to_string(),
                    })
                    .await;
            }
        });

        info!("resource manager initialized");
        Ok(())
    }

    fn receive(&mut self, ctx: &mut ActorContext<Self>, message: ManagerEvent) -> ActorAction {
        let out = match message {
            ManagerEvent::StartWorker { profile } => self.handle_start_worker(ctx, profile),
            ManagerEvent::StopWorker { task_id } => self.handle_stop_worker(ctx, task_id),
            ManagerEvent::WorkerStarted { task_id, result } => {
                self.handle_worker_started(ctx, task_id, result)
            }
            ManagerEvent::Registered(message) => self.handle_registered(ctx, message),
            ManagerEvent::Reregistered(message) => self.handle_reregistered(ctx, message),
            ManagerEvent::Disconnected(message) => self.handle_disconnected(ctx, message),
            ManagerEvent::ResourceOffers(offers) => self.handle_resource_offers(ctx, offers),
            ManagerEvent::OfferRescinded(offer_id) => self.handle_offer_rescinded(ctx, offer_id),
            ManagerEvent::OffersAccepted(decision) => self.handle_offers_accepted(ctx, decision),
            ManagerEvent::StatusUpdate(status) => self.handle_status_update(ctx, status),
            ManagerEvent::Reconcile(statuses) => self.handle_reconcile(ctx, statuses),
            ManagerEvent::TaskTerminated(status) => self.handle_task_terminated(ctx, status),
            ManagerEvent::SchedulerError { message } => self.handle_scheduler_error(ctx, message),
            ManagerEvent::Shutdown => self.handle_shutdown(ctx),
            ManagerEvent::ShutdownCompleted => self.handle_shutdown_completed(ctx),
        };
        // Errors that reach this point are fatal by design: the process
        // restarts and resumes from the store instead of repairing state.
        out.unwrap_or_else(ActorAction::fail)
    }

    fn stop(self) -> ClusterResult<()> {
        Ok(())
    }
}
