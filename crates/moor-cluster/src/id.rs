use serde::{Deserialize, Serialize};

macro_rules! define_numeric_id_type {
    ($name:ident, $value_type:ty) => {
        #[derive(
            Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
        )]
        pub struct $name($value_type);

        impl From<$value_type> for $name {
            fn from(id: $value_type) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $value_type {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! define_string_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// The identifier of a logical worker, issued by the worker store.
/// It maps 1:1 to the task identifier known to the external scheduler
/// and is unique for the lifetime of a framework registration.
define_numeric_id_type!(TaskId, u64);

/// The identifier of the host agent a task is placed on.
define_string_id_type!(SlaveId);

/// The identifier of a resource offer from the external scheduler.
define_string_id_type!(OfferId);

/// The framework identity assigned by the external scheduler on first
/// registration and persisted so that restarts re-register as the same framework.
define_string_id_type!(FrameworkId);
