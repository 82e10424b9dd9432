use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, error};
use wren_api::types::{ActorId, BoxedMessage};

use crate::log_lifecycle;
use crate::thread::address::ThreadActorRef;
use crate::thread::config::ThreadActorConfig;
use crate::thread::context::ThreadContext;
use crate::thread::error::SpawnError;
use crate::thread::mailbox::{self, Mailbox};

/// A behavior function: invoked once per message, always on the actor's own
/// worker thread, never concurrently with itself.
pub type Behavior = Box<dyn FnMut(&mut ThreadContext, BoxedMessage) + Send + 'static>;

thread_local! {
    static CURRENT_ACTOR: Cell<Option<ActorId>> = const { Cell::new(None) };
}

/// Id of the actor whose worker is running on the calling thread, if any.
pub fn current_actor() -> Option<ActorId> {
    CURRENT_ACTOR.with(Cell::get)
}

/// State shared between an actor's handles and its worker.
#[derive(Debug)]
pub(crate) struct ActorCell {
    id: ActorId,
    closed: AtomicBool,
    /// Held by the worker for the whole of each dispatch.
    gate: Mutex<()>,
}

impl ActorCell {
    fn new() -> Self {
        Self {
            id: ActorId::new(),
            closed: AtomicBool::new(false),
            gate: Mutex::new(()),
        }
    }

    pub(crate) fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns true for the call that actually closed the actor.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn lock_gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An actor: a behavior, its context and the receiving end of its mailbox,
/// driven by one dedicated OS thread.
///
/// Use [`ThreadActor::new`] for root actors and
/// [`ThreadContext::spawn`] for children.
pub struct ThreadActor {
    behavior: Behavior,
    context: ThreadContext,
    mailbox: Mailbox,
}

impl ThreadActor {
    /// Starts a root actor with the default configuration.
    pub fn new<F>(behavior: F) -> Result<ThreadActorRef, SpawnError>
    where
        F: FnMut(&mut ThreadContext, BoxedMessage) + Send + 'static,
    {
        Self::with_config(ThreadActorConfig::default(), behavior)
    }

    /// Starts a root actor with an explicit configuration.
    pub fn with_config<F>(config: ThreadActorConfig, behavior: F) -> Result<ThreadActorRef, SpawnError>
    where
        F: FnMut(&mut ThreadContext, BoxedMessage) + Send + 'static,
    {
        Self::start(config, Box::new(behavior))
    }

    pub(crate) fn start(config: ThreadActorConfig, behavior: Behavior) -> Result<ThreadActorRef, SpawnError> {
        let cell = Arc::new(ActorCell::new());
        let (sender, mailbox) = mailbox::channel(config.mailbox_capacity);
        let actor_ref = ThreadActorRef::new(Arc::clone(&cell), sender);
        let name = format!("{}-{}", config.thread_name_prefix, cell.id());

        let actor = ThreadActor {
            behavior,
            context: ThreadContext::new(cell, config),
            mailbox,
        };

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || actor.run())
            .map_err(|source| SpawnError::ThreadSpawn { name, source })?;

        Ok(actor_ref)
    }

    /// The worker loop. Exits when the actor is closed, when its behavior
    /// panics, or when every handle is gone and the mailbox is drained.
    fn run(mut self) {
        let cell = Arc::clone(self.context.cell());
        let id = cell.id();
        CURRENT_ACTOR.with(|current| current.set(Some(id)));
        log_lifecycle!(id, "started", capacity = ?self.mailbox.capacity());

        while let Some(msg) = self.mailbox.pop() {
            let _gate = cell.lock_gate();
            if cell.is_closed() {
                break;
            }

            let behavior = &mut self.behavior;
            let context = &mut self.context;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| behavior(context, msg)));

            if let Err(payload) = outcome {
                error!(actor_id = %id, panic = %panic_message(payload.as_ref()), "behavior panicked, closing actor");
                cell.mark_closed();
                break;
            }
            if cell.is_closed() {
                break;
            }
        }

        cell.mark_closed();
        let dropped = self.mailbox.len();
        if dropped > 0 {
            debug!(actor_id = %id, dropped, "discarding undelivered messages");
        }
        log_lifecycle!(id, "stopped", children = self.context.children().len());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
