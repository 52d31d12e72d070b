use std::sync::PoisonError;

use thiserror::Error;
use tokio::sync::mpsc;

pub type ClusterResult<T> = Result<T, ClusterError>;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// A read, write, or delete against the worker store failed.
    /// Store failures are never retried; they abort the operation that
    /// triggered them and escalate.
    #[error("error in worker store: {0}")]
    StoreError(String),
    /// The in-memory bookkeeping and the persistent store have diverged.
    /// There is no local repair path; the process restarts and recovers
    /// from the store.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// The connection to the external scheduler is broken at the protocol level.
    #[error("error in scheduler connection: {0}")]
    SchedulerError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl<T> From<mpsc::error::SendError<T>> for ClusterError {
    fn from(error: mpsc::error::SendError<T>) -> Self {
        ClusterError::InternalError(error.to_string())
    }
}

impl<T> From<PoisonError<T>> for ClusterError {
    fn from(error: PoisonError<T>) -> Self {
        ClusterError::InternalError(error.to_string())
    }
}
