use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

/// Store operation kinds, as reported in events and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Fetch,
    Add,
    Update,
    Remove,
    Restore,
    SignIn,
    SignOut,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Add => "add",
            Operation::Update => "update",
            Operation::Remove => "remove",
            Operation::Restore => "restore",
            Operation::SignIn => "sign-in",
            Operation::SignOut => "sign-out",
        };
        f.write_str(name)
    }
}

/// Notification pushed to subscribers.
///
/// Events carry no state; read a fresh snapshot on `Changed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// State moved to `version`.
    Changed { family: &'static str, version: u64 },
    /// An operation failed. Delivered once; never retained.
    Failed {
        family: &'static str,
        operation: Operation,
        message: String,
    },
    /// The store was cleared back to `Uninitialized`.
    Reset { family: &'static str },
}

/// Receiver half handed to consumers.
pub type StoreEvents = broadcast::Receiver<StoreEvent>;
