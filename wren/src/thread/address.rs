use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::trace;
use wren_api::types::{ActorId, BoxedMessage};

use crate::thread::actor::{ActorCell, current_actor};
use crate::thread::error::MailboxError;
use crate::thread::mailbox::MailboxSender;

/// Handle to a running actor.
///
/// Handles are cheap to clone. Sending through a handle never fails from the
/// caller's point of view: messages for a closed actor are silently dropped.
/// Once every handle to an actor is dropped, the actor finishes what is
/// already queued and stops.
#[derive(Debug, Clone)]
pub struct ThreadActorRef {
    cell: Arc<ActorCell>,
    mailbox: MailboxSender,
}

impl ThreadActorRef {
    pub(crate) fn new(cell: Arc<ActorCell>, mailbox: MailboxSender) -> Self {
        Self { cell, mailbox }
    }

    pub fn id(&self) -> ActorId {
        self.cell.id()
    }

    /// Enqueues `msg` for the actor.
    ///
    /// Blocks only while a bounded mailbox is full. A message that is already
    /// a [`BoxedMessage`] is passed through without boxing it again.
    pub fn send<M: Any + Send>(&self, msg: M) {
        let boxed: BoxedMessage = Box::new(msg);
        let boxed = match boxed.downcast::<BoxedMessage>() {
            Ok(inner) => *inner,
            Err(boxed) => boxed,
        };
        self.send_boxed(boxed);
    }

    pub fn send_boxed(&self, msg: BoxedMessage) {
        if let Err(err) = self.deliver(msg) {
            trace!(actor_id = %self.id(), %err, "dropping message");
        }
    }

    pub(crate) fn deliver(&self, msg: BoxedMessage) -> Result<(), MailboxError> {
        if self.cell.is_closed() {
            return Err(MailboxError::Closed);
        }
        self.mailbox.push(msg)
    }

    /// Closes the actor. Children are not closed automatically.
    ///
    /// Called from a plain thread, this waits for the message currently being
    /// processed (if any), so once it returns the behavior never runs again.
    /// Called from inside a behavior, it only marks the actor closed and the
    /// worker stops after its current message.
    ///
    /// A plain thread that the running behavior is itself waiting on must not
    /// call this: a `pmap` worker started by the behavior, or a consumer
    /// draining a bounded channel the behavior is blocked sending into, would
    /// wait on the behavior while the behavior waits on it.
    pub fn close(&self) {
        let closed = if current_actor().is_some() {
            self.cell.mark_closed()
        } else {
            let _gate = self.cell.lock_gate();
            self.cell.mark_closed()
        };
        if closed {
            trace!(actor_id = %self.id(), "close requested");
        }
        self.mailbox.signal_stop();
    }

    pub fn is_closed(&self) -> bool {
        self.cell.is_closed()
    }

    pub fn mailbox_capacity(&self) -> Option<usize> {
        self.mailbox.capacity()
    }

    /// Messages queued but not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.mailbox.len()
    }
}

impl PartialEq for ThreadActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ThreadActorRef {}

impl Hash for ThreadActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
