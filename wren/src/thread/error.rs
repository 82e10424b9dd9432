use std::io;

use thiserror::Error;

/// Errors related to starting an actor.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Failed to start worker thread {name}: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Errors related to Mailbox operations.
///
/// These never reach the sender of a message: a failed delivery is logged
/// and the message is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailboxError {
    #[error("Mailbox is closed")]
    Closed,
    #[error("Mailbox worker is gone")]
    Disconnected,
}
