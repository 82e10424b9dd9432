// Wren Actor Runtime
//
// Lightweight actors on dedicated OS threads. Each actor owns a FIFO mailbox
// drained by its own worker, may spawn children that it alone can reach, and
// answers request/reply exchanges through one-shot reply slots. Alongside it
// sits a bounded parallel map that shares the same fan-out/fan-in plumbing.

pub mod logging;
pub mod pmap;
pub mod thread;

// Re-export commonly used types
pub use pmap::{ParallelMap, pmap};
pub use thread::{
    Ask, AskEnvelope, AskState, AskTimer, PMapOptions, ReplyReceiver, SpawnError, ThreadActor, ThreadActorConfig,
    ThreadActorRef, ThreadContext, ask_channel, ask_once,
};
pub use wren_api::{ActorId, BoxedMessage, CoerceError, coerce};

#[doc(hidden)]
pub use tracing;
