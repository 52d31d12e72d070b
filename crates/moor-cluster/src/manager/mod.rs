mod actor;
mod event;
mod handler;
mod options;
mod state;

pub use actor::ManagerActor;
pub use event::{ManagerEvent, ManagerNotification};
pub use options::{Collaborators, ManagerOptions};
pub use state::{WorkerRegistry, WorkerSet};
