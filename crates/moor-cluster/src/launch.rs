use moor_common::config::ClusterConfig;

use crate::id::{OfferId, TaskId};
use crate::scheduler::{Disconnected, Offer, ReRegistered, Registered};
use crate::store::ResourceProfile;

/// Static per-deployment launch parameters, used to fill the dimensions
/// a resource profile leaves unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerDefaults {
    pub cpu_cores: f64,
    pub memory_mb: u64,
    pub heap_mb: u64,
    pub direct_mb: u64,
}

impl WorkerDefaults {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            cpu_cores: config.worker_cpu_cores,
            memory_mb: config.worker_memory_mb,
            heap_mb: config.worker_heap_mb,
            direct_mb: config.worker_direct_mb,
        }
    }
}

/// The concrete task shape handed to the launch coordinator for matching
/// against resource offers.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchableWorker {
    pub task_id: TaskId,
    pub cpu_cores: f64,
    pub memory_mb: u64,
    pub heap_mb: u64,
    pub direct_mb: u64,
}

impl LaunchableWorker {
    pub fn from_profile(
        task_id: TaskId,
        profile: &ResourceProfile,
        defaults: &WorkerDefaults,
    ) -> Self {
        Self {
            task_id,
            cpu_cores: profile.cpu_cores.unwrap_or(defaults.cpu_cores),
            memory_mb: profile.memory_mb.unwrap_or(defaults.memory_mb),
            heap_mb: profile.heap_mb.unwrap_or(defaults.heap_mb),
            direct_mb: profile.direct_mb.unwrap_or(defaults.direct_mb),
        }
    }
}

/// Messages consumed by the launch coordinator, which batches pending
/// launch requests against incoming offers and replies with accept
/// decisions (delivered to the manager as `OffersAccepted` events).
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchMessage {
    Registered(Registered),
    Reregistered(ReRegistered),
    Disconnected(Disconnected),
    /// Resource offers to match against pending launch requests.
    Offers(Vec<Offer>),
    /// A previously forwarded offer is no longer valid.
    OfferRescinded(OfferId),
    /// New workers to launch.
    Launch(Vec<LaunchableWorker>),
    /// Workers already running on the given hostnames, recovered from a
    /// prior incarnation; lets the coordinator's accounting match offers
    /// against work that is already placed.
    Assign(Vec<(LaunchableWorker, String)>),
}
