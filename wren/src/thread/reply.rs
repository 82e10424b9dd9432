use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use flume::{Receiver, Sender};

/// Where a single ask currently stands. `Replied` and `TimedOut` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskState {
    Pending,
    Replied,
    TimedOut,
}

enum Slot<R> {
    Pending(Sender<R>),
    Replied,
    TimedOut,
}

/// One-shot reply slot shared by an ask envelope and its asker.
///
/// The first of `resolve` and `abandon` wins and the slot never changes again.
/// The channel behind it has room for exactly one value, so resolving never
/// blocks the replying actor even when nobody is listening anymore.
pub(crate) struct ReplySlot<R> {
    slot: Mutex<Slot<R>>,
}

impl<R> ReplySlot<R> {
    pub(crate) fn new() -> (Arc<Self>, Receiver<R>) {
        let (tx, rx) = flume::bounded(1);
        let slot = Arc::new(Self {
            slot: Mutex::new(Slot::Pending(tx)),
        });
        (slot, rx)
    }

    fn lock(&self) -> MutexGuard<'_, Slot<R>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers `value` if the ask is still pending. Returns whether the value
    /// reached the reply channel.
    ///
    /// The value is in the channel before the state reads `Replied`, and the
    /// sender is gone by the time the lock is released.
    pub(crate) fn resolve(&self, value: R) -> bool {
        let mut slot = self.lock();
        let delivered = match &*slot {
            Slot::Pending(sender) => sender.try_send(value).is_ok(),
            _ => return false,
        };
        *slot = Slot::Replied;
        delivered
    }

    /// Gives up on a pending ask; the reply channel disconnects empty.
    /// Returns false when a reply got there first.
    pub(crate) fn abandon(&self) -> bool {
        let mut slot = self.lock();
        match *slot {
            Slot::Pending(_) => {
                *slot = Slot::TimedOut;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn state(&self) -> AskState {
        match *self.lock() {
            Slot::Pending(_) => AskState::Pending,
            Slot::Replied => AskState::Replied,
            Slot::TimedOut => AskState::TimedOut,
        }
    }
}

impl<R> fmt::Debug for ReplySlot<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplySlot").field("state", &self.state()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_first_reply_wins() {
        let (slot, rx) = ReplySlot::new();
        assert_eq!(slot.state(), AskState::Pending);

        assert!(slot.resolve(1));
        assert!(!slot.resolve(2));
        assert_eq!(slot.state(), AskState::Replied);

        assert_eq!(rx.recv(), Ok(1));
        // The sender went away with the first reply.
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_reply_after_abandon_is_discarded() {
        let (slot, rx) = ReplySlot::new();
        assert!(slot.abandon());
        assert!(!slot.abandon());
        assert!(!slot.resolve("late"));
        assert_eq!(slot.state(), AskState::TimedOut);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_abandon_after_reply_keeps_value() {
        let (slot, rx) = ReplySlot::new();
        assert!(slot.resolve(7));
        assert!(!slot.abandon());
        assert_eq!(rx.try_recv(), Ok(7));
    }

    #[test]
    fn test_reply_without_listener_does_not_block() {
        let (slot, rx) = ReplySlot::new();
        drop(rx);
        let replier = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.resolve(5u32))
        };
        assert!(!replier.join().unwrap());
        assert_eq!(slot.state(), AskState::Replied);
    }

    #[test]
    fn test_racing_replies_deliver_once() {
        let (slot, rx) = ReplySlot::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.resolve(i))
            })
            .collect();
        let delivered = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|delivered| *delivered)
            .count();
        assert_eq!(delivered, 1);
        drop(slot);
        assert_eq!(rx.iter().count(), 1);
    }

    #[test]
    fn test_losing_abandon_always_finds_the_reply() {
        for i in 0..500 {
            let (slot, rx) = ReplySlot::new();
            let replier = {
                let slot = Arc::clone(&slot);
                thread::spawn(move || slot.resolve(i))
            };
            if slot.abandon() {
                assert!(rx.try_recv().is_err());
            } else {
                assert_eq!(rx.try_recv(), Ok(i));
            }
            replier.join().unwrap();
        }
    }
}
