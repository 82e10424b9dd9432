#![doc = " Thread-per-actor runtime: mailboxes, the actor tree and the ask protocol."]

pub mod actor;
pub mod address;
pub mod ask;
pub mod config;
pub mod context;
pub mod error;
pub mod mailbox;
pub mod reply;

// Re-export key types for easier usage
pub use actor::{Behavior, ThreadActor, current_actor};
pub use address::ThreadActorRef;
pub use ask::{Ask, AskEnvelope, AskTimer, ReplyReceiver, ask_channel, ask_once};
pub use config::{PMapOptions, ThreadActorConfig};
pub use context::ThreadContext;
pub use error::{MailboxError, SpawnError};
pub use reply::AskState;
