pub mod error;
pub mod id;
pub mod launch;
pub mod manager;
pub mod monitor;
pub mod router;
pub mod scheduler;
pub mod store;
