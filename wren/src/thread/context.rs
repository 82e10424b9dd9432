use std::any::Any;
use std::sync::Arc;

use tracing::debug;
use wren_api::types::{ActorId, BoxedMessage};

use crate::thread::actor::{ActorCell, ThreadActor};
use crate::thread::address::ThreadActorRef;
use crate::thread::config::ThreadActorConfig;
use crate::thread::error::SpawnError;

/// The `self` of a behavior function.
///
/// A context is owned by its actor's worker thread, so the child collection is
/// only ever touched by that thread. There is no way to reach a parent from
/// a child.
#[derive(Debug)]
pub struct ThreadContext {
    cell: Arc<ActorCell>,
    config: ThreadActorConfig,
    children: Vec<ThreadActorRef>,
}

impl ThreadContext {
    pub(crate) fn new(cell: Arc<ActorCell>, config: ThreadActorConfig) -> Self {
        Self {
            cell,
            config,
            children: Vec::new(),
        }
    }

    pub(crate) fn cell(&self) -> &Arc<ActorCell> {
        &self.cell
    }

    pub fn id(&self) -> ActorId {
        self.cell.id()
    }

    pub fn config(&self) -> &ThreadActorConfig {
        &self.config
    }

    /// Starts a child actor with this actor's configuration and adds it to
    /// the child collection.
    pub fn spawn<F>(&mut self, behavior: F) -> Result<ThreadActorRef, SpawnError>
    where
        F: FnMut(&mut ThreadContext, BoxedMessage) + Send + 'static,
    {
        let config = self.config.clone();
        self.spawn_with_config(config, behavior)
    }

    pub fn spawn_with_config<F>(&mut self, config: ThreadActorConfig, behavior: F) -> Result<ThreadActorRef, SpawnError>
    where
        F: FnMut(&mut ThreadContext, BoxedMessage) + Send + 'static,
    {
        let child = ThreadActor::start(config, Box::new(behavior))?;
        debug!(parent = %self.id(), child = %child.id(), "spawned child");
        self.children.push(child.clone());
        Ok(child)
    }

    /// Children in spawn order.
    pub fn children(&self) -> &[ThreadActorRef] {
        &self.children
    }

    pub fn child(&self, id: ActorId) -> Option<&ThreadActorRef> {
        self.children.iter().find(|child| child.id() == id)
    }

    /// Sends a copy of `msg` to every child.
    pub fn broadcast<M: Any + Send + Clone>(&self, msg: M) {
        for child in &self.children {
            child.send(msg.clone());
        }
    }

    /// Stops this actor after the current message. Children keep running
    /// until they are told to stop or every handle to them is gone.
    pub fn close(&self) {
        self.cell.mark_closed();
    }

    pub fn is_closed(&self) -> bool {
        self.cell.is_closed()
    }
}
