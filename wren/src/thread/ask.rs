//! # Ask
//!
//! Request/reply on top of fire-and-forget messaging.
//!
//! An [`Ask`] wraps a payload in an [`AskEnvelope`] and sends it like any other
//! message. The target's behavior downcasts the message to the envelope and
//! calls [`AskEnvelope::reply`]. The asker either blocks for the reply
//! ([`Ask::once`]) or gets a [`ReplyReceiver`] to poll later
//! ([`Ask::channel`]).
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use wren::thread::{Ask, AskEnvelope, ThreadActor};
//!
//! let doubler = ThreadActor::new(|_ctx, msg| {
//!     if let Ok(ask) = msg.downcast::<AskEnvelope<i64, i64>>() {
//!         ask.reply(ask.message() * 2);
//!     }
//! })?;
//!
//! let reply: Option<i64> = Ask::new(21i64).timeout(Duration::from_millis(50)).once(&doubler);
//! assert_eq!(reply, Some(42));
//! # Ok::<(), wren::thread::SpawnError>(())
//! ```
//!
//! ## Timeouts
//!
//! A timeout only cancels the wait. The target may still process the request
//! and reply later; that reply is discarded. A timed-out ask and an ask that
//! was never answered both look like `None` to the caller.
//!
//! Without a timeout the wait is unbounded: if the target never replies
//! (it is closed, it ignores the envelope, or it drops it) the asker blocks
//! forever. Always set a timeout unless the target is known to answer.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, trace, warn};
use wren_api::types::BoxedMessage;

use crate::thread::address::ThreadActorRef;
use crate::thread::reply::{AskState, ReplySlot};

/// A request travelling to the target actor together with its reply slot.
///
/// `T` is the request payload and `R` the reply type. The behavior must
/// downcast to exactly `AskEnvelope<T, R>`; both default to [`BoxedMessage`]
/// for fully untyped exchanges.
pub struct AskEnvelope<T = BoxedMessage, R = BoxedMessage> {
    message: T,
    slot: Arc<ReplySlot<R>>,
    timeout: Option<Duration>,
}

impl<T, R> AskEnvelope<T, R> {
    pub fn message(&self) -> &T {
        &self.message
    }

    /// The asker's timeout, if it set one.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Answers the ask.
    ///
    /// Only the first reply counts; later ones, and replies that arrive after
    /// the asker gave up, are dropped. Never blocks. Returns whether the value
    /// was handed to the asker.
    pub fn reply(&self, value: R) -> bool {
        let delivered = self.slot.resolve(value);
        if !delivered {
            trace!(state = ?self.slot.state(), "reply discarded");
        }
        delivered
    }

    pub fn state(&self) -> AskState {
        self.slot.state()
    }
}

impl<T, R> fmt::Debug for AskEnvelope<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskEnvelope")
            .field("message", &"<message>")
            .field("state", &self.slot.state())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for one request/reply exchange.
pub struct Ask<T, R = BoxedMessage> {
    message: T,
    timeout: Option<Duration>,
    _reply: PhantomData<fn() -> R>,
}

impl<T, R> Ask<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// An ask with no timeout.
    pub fn new(message: T) -> Self {
        Self::with_optional_timeout(message, None)
    }

    pub fn with_optional_timeout(message: T, timeout: Option<Duration>) -> Self {
        Self {
            message,
            timeout,
            _reply: PhantomData,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn dispatch(self, target: &ThreadActorRef) -> (Arc<ReplySlot<R>>, Receiver<R>, Option<Duration>) {
        let (slot, receiver) = ReplySlot::new();
        let envelope = AskEnvelope {
            message: self.message,
            slot: Arc::clone(&slot),
            timeout: self.timeout,
        };
        if let Err(err) = target.deliver(Box::new(envelope)) {
            debug!(actor_id = %target.id(), %err, "ask was not delivered");
        }
        (slot, receiver, self.timeout)
    }

    /// Sends the request and blocks until the reply arrives or the timeout
    /// expires. `None` means no reply in time.
    pub fn once(self, target: &ThreadActorRef) -> Option<R> {
        let (slot, receiver, timeout) = self.dispatch(target);
        let Some(timeout) = timeout else {
            return receiver.recv().ok();
        };

        match receiver.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(_) if slot.abandon() => {
                debug!(actor_id = %target.id(), ?timeout, "ask timed out");
                None
            }
            // The reply won the race against the deadline.
            Err(_) => receiver.try_recv().ok(),
        }
    }

    /// Sends the request and returns at once with a receiver for the reply.
    ///
    /// When the ask has a timeout a timer is returned too; once it fires the
    /// receiver yields `None`. Call [`AskTimer::stop`] after the reply arrives
    /// to release the timer early.
    pub fn channel(self, target: &ThreadActorRef) -> (ReplyReceiver<R>, Option<AskTimer>) {
        let (slot, receiver, timeout) = self.dispatch(target);
        let reply = ReplyReceiver {
            receiver,
            slot: Arc::downgrade(&slot),
        };
        let timer = timeout.and_then(|timeout| AskTimer::start(timeout, slot));
        (reply, timer)
    }
}

impl<T, R> fmt::Debug for Ask<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ask").field("timeout", &self.timeout).finish()
    }
}

/// Shorthand for `Ask::with_optional_timeout(message, timeout).once(target)`.
pub fn ask_once<T, R>(target: &ThreadActorRef, message: T, timeout: Option<Duration>) -> Option<R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    Ask::with_optional_timeout(message, timeout).once(target)
}

/// Shorthand for `Ask::with_optional_timeout(message, timeout).channel(target)`.
pub fn ask_channel<T, R>(
    target: &ThreadActorRef,
    message: T,
    timeout: Option<Duration>,
) -> (ReplyReceiver<R>, Option<AskTimer>)
where
    T: Send + 'static,
    R: Send + 'static,
{
    Ask::with_optional_timeout(message, timeout).channel(target)
}

/// Receiving end of [`Ask::channel`]. Yields at most one value.
#[derive(Debug)]
pub struct ReplyReceiver<R> {
    receiver: Receiver<R>,
    // Does not keep the slot, and so the reply sender, alive.
    slot: Weak<ReplySlot<R>>,
}

impl<R> ReplyReceiver<R> {
    /// Blocks until the reply arrives or the ask times out.
    pub fn recv(&self) -> Option<R> {
        self.receiver.recv().ok()
    }

    /// The reply, if it has already arrived.
    pub fn try_recv(&self) -> Option<R> {
        self.receiver.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<R> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Awaits the reply from async code.
    pub async fn recv_async(&self) -> Option<R> {
        self.receiver.recv_async().await.ok()
    }

    /// True once no reply can arrive anymore: it was already taken, the ask
    /// timed out, or the target dropped the envelope unanswered.
    pub fn is_finished(&self) -> bool {
        let settled = match self.slot.upgrade() {
            Some(slot) => slot.state() != AskState::Pending,
            // Nobody can resolve a slot that no longer exists.
            None => true,
        };
        settled && self.receiver.is_empty()
    }

    /// The underlying channel, for use with `flume::Selector`.
    pub fn into_inner(self) -> Receiver<R> {
        self.receiver
    }
}

const TIMER_PENDING: u8 = 0;
const TIMER_FIRED: u8 = 1;
const TIMER_STOPPED: u8 = 2;

/// Deadline for an [`Ask::channel`] exchange, running on its own thread.
///
/// Dropping the timer does not cancel it; it still fires at the deadline.
#[derive(Debug)]
pub struct AskTimer {
    state: Arc<AtomicU8>,
    cancel: Sender<()>,
}

impl AskTimer {
    fn start<R: Send + 'static>(after: Duration, slot: Arc<ReplySlot<R>>) -> Option<Self> {
        let deadline = Instant::now() + after;
        let state = Arc::new(AtomicU8::new(TIMER_PENDING));
        let (cancel, cancelled) = flume::bounded::<()>(1);

        let timer_state = Arc::clone(&state);
        let spawned = thread::Builder::new()
            .name("wren-ask-timer".to_string())
            .spawn(move || {
                match cancelled.recv_deadline(deadline) {
                    Ok(()) => return,
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        let now = Instant::now();
                        if now < deadline {
                            thread::sleep(deadline - now);
                        }
                    }
                }
                let fired = timer_state
                    .compare_exchange(TIMER_PENDING, TIMER_FIRED, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok();
                if fired && slot.abandon() {
                    debug!(?after, "ask timed out");
                }
            });

        match spawned {
            Ok(_) => Some(Self { state, cancel }),
            Err(err) => {
                warn!(%err, "failed to start ask timer, waiting without timeout");
                None
            }
        }
    }

    /// Stops the timer. Returns false if it had already fired or been stopped.
    pub fn stop(&self) -> bool {
        let stopped = self
            .state
            .compare_exchange(TIMER_PENDING, TIMER_STOPPED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if stopped {
            let _ = self.cancel.try_send(());
        }
        stopped
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::SeqCst) == TIMER_FIRED
    }
}
